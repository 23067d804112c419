//! Authentication error types.

use thiserror::Error;

/// Authentication errors
#[derive(Debug, Error)]
pub enum AuthError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Password hashing failed
    #[error("Password hashing failed")]
    HashingFailed,

    /// Identifier/password pair did not match a user
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// User not found
    #[error("User not found")]
    UserNotFound,

    /// Username already exists
    #[error("User with this username already exists")]
    UsernameTaken,

    /// Email already exists
    #[error("User with this email already exists")]
    EmailTaken,

    /// Mobile number already exists
    #[error("User with this mobile number already exists")]
    MobileTaken,

    /// A required field was blank
    #[error("All fields are required")]
    MissingField(&'static str),

    /// Username failed validation
    #[error("Invalid username: {0}")]
    InvalidUsername(String),

    /// Password failed validation
    #[error("Weak password: {0}")]
    WeakPassword(String),

    /// Expiry period missing or not a positive day count
    #[error("Select expiry period")]
    InvalidExpiry,

    /// JWT error
    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    /// Token failed signature or claims validation
    #[error("Invalid token")]
    InvalidToken,

    /// Token is valid but no longer the stored session token
    #[error("Session expired. Please log in again.")]
    SessionStale,

    /// No OTP has been issued for this mobile number
    #[error("Invalid OTP")]
    OtpNotFound,

    /// Submitted OTP did not match the issued one
    #[error("Incorrect OTP")]
    OtpMismatch,

    /// OTP was issued too long ago
    #[error("OTP expired")]
    OtpExpired,

    /// Device not found
    #[error("Device not found")]
    DeviceNotFound,

    /// Password change request not found
    #[error("Request not found")]
    RequestNotFound,

    /// Password change request already approved or rejected
    #[error("Request already resolved")]
    RequestAlreadyResolved,

    /// Account is already deactivated
    #[error("Account is already deactivated")]
    AlreadyDeactivated,

    /// Account is not deactivated
    #[error("Account is not deactivated")]
    NotDeactivated,
}

impl AuthError {
    /// Get a client-safe error message
    pub fn client_message(&self) -> String {
        match self {
            AuthError::Database(_) => "Internal server error".to_string(),
            AuthError::Jwt(_) => "Invalid token".to_string(),
            AuthError::HashingFailed => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

/// Result type for authentication operations
pub type AuthResult<T> = Result<T, AuthError>;
