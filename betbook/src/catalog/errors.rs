//! Catalog error types.

use thiserror::Error;

/// Errors from catalog operations
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Match not found")]
    MatchNotFound,

    #[error("No matches provided")]
    NoMatches,

    #[error("No update fields provided")]
    NoUpdateFields,

    #[error("No status fields provided")]
    NoStatusFields,

    #[error("Manual card not found")]
    CardNotFound,

    #[error("Missing required fields: phone, amount, minute, duration")]
    MissingCardFields,

    #[error("Amount must be a positive number")]
    InvalidCardAmount,

    #[error("Minute must be a non-negative number")]
    InvalidCardMinute,

    #[error("Duration must be a positive number")]
    InvalidCardDuration,

    #[error("Please upload at least one image.")]
    NoBanners,

    #[error("An array of image objects is required.")]
    NoImages,

    #[error("Each image must have an \"imageUrl\".")]
    MissingImageUrl,

    #[error("Image not found")]
    ImageNotFound,

    #[error("No image selected for user")]
    NoSelection,
}

impl CatalogError {
    /// Message safe to show a client
    pub fn client_message(&self) -> String {
        match self {
            Self::Database(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

pub type CatalogResult<T> = Result<T, CatalogError>;
