//! Add-on error types.

use thiserror::Error;

/// Errors from add-on operations
#[derive(Debug, Error)]
pub enum AddonError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Addon not found")]
    AddonNotFound,

    #[error("This addon is free")]
    AddonFree,

    #[error("No addons provided")]
    NoAddons,

    #[error("All fields are required")]
    MissingField(&'static str),
}

impl AddonError {
    /// Message safe to show a client
    pub fn client_message(&self) -> String {
        match self {
            Self::Database(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

pub type AddonResult<T> = Result<T, AddonError>;
