//! Wallet error types.

use thiserror::Error;

/// Wallet errors
#[derive(Debug, Error)]
pub enum WalletError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Insufficient balance
    #[error("Insufficient balance: available {available}, required {required}")]
    InsufficientBalance { available: i64, required: i64 },

    /// No balance record for user
    #[error("No balance found for user {0}")]
    BalanceNotFound(i64),

    /// Invalid amount (must be positive)
    #[error("Invalid amount: {0}")]
    InvalidAmount(i64),

    /// Balance arithmetic overflow
    #[error("Balance overflow")]
    BalanceOverflow,

    /// History record not found
    #[error("Transaction {0} not found")]
    TransactionNotFound(i64),

    /// History kind that cannot be deleted
    #[error("Transactions of type {0} cannot be deleted")]
    UndeletableKind(String),
}

impl WalletError {
    /// Get a client-safe error message that doesn't leak sensitive information
    ///
    /// Database errors are sanitized to prevent information disclosure about
    /// the internal system structure, and user IDs are redacted.
    pub fn client_message(&self) -> String {
        match self {
            WalletError::Database(_) => "Internal server error".to_string(),
            WalletError::BalanceNotFound(_) => "No balance found".to_string(),
            WalletError::InsufficientBalance { .. } => "Insufficient balance".to_string(),
            _ => self.to_string(),
        }
    }
}

/// Result type for wallet operations
pub type WalletResult<T> = Result<T, WalletError>;
