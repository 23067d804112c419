//! Enhanced structured logging configuration.
//!
//! This module provides structured logging with request correlation and
//! security event tracking.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize structured logging with enhanced features
///
/// Features:
/// - Request ID correlation
/// - Security event tracking
/// - Configurable log levels via RUST_LOG env var
///
/// # Example
///
/// ```no_run
/// use bb_server::logging;
///
/// #[tokio::main]
/// async fn main() {
///     logging::init();
///     tracing::info!("Server starting");
/// }
/// ```
pub fn init() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn,hyper=warn"));

    // Console layer for development
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    tracing::info!("Structured logging initialized");
}

/// Log security event with structured data
///
/// # Arguments
///
/// * `event_type` - Type of security event
/// * `user_id` - Optional user ID
/// * `detail` - Event message
///
/// # Example
///
/// ```
/// use bb_server::logging::log_security_event;
///
/// log_security_event("failed_login", Some(123), "Invalid password attempt");
/// ```
pub fn log_security_event(event_type: &str, user_id: Option<i64>, detail: &str) {
    tracing::warn!(
        event_type = event_type,
        user_id = user_id,
        "SECURITY: {}",
        detail
    );
}

/// Log a balance-affecting wallet operation
///
/// # Arguments
///
/// * `operation` - Operation name (deposit, withdraw, winning, stake)
/// * `user_id` - Affected user
/// * `amount` - Amount in minor units
/// * `balance` - Balance in minor units after the operation
pub fn log_wallet_operation(operation: &str, user_id: i64, amount: i64, balance: i64) {
    tracing::info!(
        operation = operation,
        user_id = user_id,
        amount_minor = amount,
        balance_minor = balance,
        "Wallet operation completed"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_security_event() {
        // Just ensure it doesn't panic
        log_security_event("test_event", Some(1), "Test message");
        log_security_event("stale_session", None, "Token displaced");
    }

    #[test]
    fn test_log_wallet_operation() {
        log_wallet_operation("deposit", 1, 5000, 10_000);
        log_wallet_operation("withdraw", 1, 5000, 5000);
    }
}
