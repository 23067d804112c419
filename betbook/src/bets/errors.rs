//! Bet workflow error types.

use crate::wallet::WalletError;
use thiserror::Error;

/// Bet workflow errors
#[derive(Debug, Error)]
pub enum BetError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Balance operation failed
    #[error(transparent)]
    Wallet(#[from] WalletError),

    /// Bet not found
    #[error("Bet not found")]
    BetNotFound,

    /// Leg not found
    #[error("Bet not found")]
    LegNotFound,

    /// User has no bets
    #[error("No bets found for this user.")]
    NoBetsForUser,

    /// Slip contained no legs
    #[error("No valid bets found.")]
    NoLegs,

    /// Stake missing, non-numeric or not positive
    #[error("Invalid stake value")]
    InvalidStake,

    /// Odd not positive
    #[error("Invalid odd value")]
    InvalidOdd,

    /// Odd missing from an odd quote update
    #[error("Odd value is required")]
    MissingOdd,

    /// Display date does not match the ticket shape
    #[error("Invalid date format. Expected DD/MM, HH:mm")]
    InvalidDate,

    /// Percentage outside 0-100
    #[error("Percentage must be a number between 0 and 100")]
    InvalidPercentage,

    /// Bet code blank
    #[error("Invalid betCode value")]
    InvalidBetCode,

    /// A required field was blank
    #[error("All fields are required")]
    MissingField(&'static str),

    /// Stake increase exceeds the available balance
    #[error("Insufficient balance to increase stake")]
    InsufficientStakeIncrease,

    /// No balance record exists for the bet's owner
    #[error("Deposit record not found for user")]
    DepositRecordNotFound,

    /// No bet carries this booking code
    #[error("No bet found with this booking code")]
    BookingNotFound,

    /// Verify code not found
    #[error("Verify code not found.")]
    VerifyCodeNotFound,

    /// Verify code older than its validity window
    #[error("Verify code expired.")]
    VerifyCodeExpired,

    /// No cash-out record for this bet
    #[error("No record found")]
    CashoutNotFound,

    /// No odd quote for this bet
    #[error("No odd value found for this betId")]
    OddQuoteNotFound,
}

impl BetError {
    /// Get a client-safe error message
    pub fn client_message(&self) -> String {
        match self {
            BetError::Database(_) => "Internal server error".to_string(),
            BetError::Wallet(err) => err.client_message(),
            other => other.to_string(),
        }
    }
}

/// Result type for bet operations
pub type BetResult<T> = Result<T, BetError>;
