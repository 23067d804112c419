//! Notification error types.

use thiserror::Error;

/// Errors from notification operations
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Phone and token are required")]
    MissingToken,

    #[error("No push token registered for this phone")]
    TokenNotFound,
}

impl NotifyError {
    /// Message safe to show a client
    pub fn client_message(&self) -> String {
        match self {
            Self::Database(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

pub type NotifyResult<T> = Result<T, NotifyError>;
