//! Database pool configuration.

use std::env;

/// Connection pool settings
///
/// Server binaries usually build this from their own config layer; the
/// constructors here cover tools and tests.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub database_url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,

    /// Connection timeout in seconds
    pub connection_timeout_secs: u64,

    /// Idle connection timeout in seconds
    pub idle_timeout_secs: u64,

    /// Maximum connection lifetime in seconds
    pub max_lifetime_secs: u64,
}

impl DatabaseConfig {
    /// Read configuration from the environment
    ///
    /// `DATABASE_URL` is required. The pool knobs (`DB_MAX_CONNECTIONS`,
    /// `DB_MIN_CONNECTIONS`, `DB_CONNECTION_TIMEOUT`, `DB_IDLE_TIMEOUT`,
    /// `DB_MAX_LIFETIME`) fall back to the development defaults when unset
    /// or unparsable.
    ///
    /// # Panics
    ///
    /// Panics if `DATABASE_URL` is not set
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            max_connections: var_or("DB_MAX_CONNECTIONS", 20),
            min_connections: var_or("DB_MIN_CONNECTIONS", 5),
            connection_timeout_secs: var_or("DB_CONNECTION_TIMEOUT", 10),
            idle_timeout_secs: var_or("DB_IDLE_TIMEOUT", 600),
            max_lifetime_secs: var_or("DB_MAX_LIFETIME", 1800),
        }
    }

    /// Development defaults against a local `betbook_db`
    pub fn development() -> Self {
        Self {
            database_url: "postgres://postgres@localhost/betbook_db".to_string(),
            max_connections: 20,
            min_connections: 5,
            connection_timeout_secs: 10,
            idle_timeout_secs: 600,
            max_lifetime_secs: 1800,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self::development()
    }
}

fn var_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_development_defaults() {
        let config = DatabaseConfig::development();
        assert!(config.database_url.ends_with("/betbook_db"));
        assert_eq!(config.max_connections, 20);
        assert!(config.min_connections <= config.max_connections);
    }

    #[test]
    fn test_default_is_development() {
        let config = DatabaseConfig::default();
        assert_eq!(config.database_url, DatabaseConfig::development().database_url);
    }
}
