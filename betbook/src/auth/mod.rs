//! Authentication module providing user registration, login, and session management.
//!
//! This module implements secure authentication with:
//! - Argon2id password hashing with server-side pepper
//! - JWT access tokens (7-day expiry)
//! - Single-session enforcement via a stored session token; a new login
//!   displaces the previous session
//! - One-time codes for mobile number verification
//! - Per-user device registry with login counters
//! - Admin-approved password changes and account deactivation with banked
//!   subscription days
//!
//! ## Example
//!
//! ```no_run
//! use betbook::auth::{AuthManager, RegisterRequest};
//! use betbook::db::Database;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::new(&Default::default()).await?;
//!     let auth = AuthManager::new(
//!         Arc::new(db.pool().clone()),
//!         "secret_pepper".to_string(),
//!         "jwt_secret".to_string()
//!     );
//!
//!     let request = RegisterRequest {
//!         name: "Kwame Mensah".to_string(),
//!         username: "kwame1".to_string(),
//!         email: "kwame@example.com".to_string(),
//!         mobile: Some("0244000000".to_string()),
//!         password: "SecurePass123".to_string(),
//!         expiry_days: 30,
//!         subscription: None,
//!         role: None,
//!     };
//!
//!     let user = auth.register(request).await?;
//!     println!("Registered user: {}", user.username);
//!
//!     let (user, token) = auth.login("kwame@example.com", "SecurePass123").await?;
//!     let authed = auth.authenticate(&token).await?;
//!     assert_eq!(authed.id, user.id);
//!     Ok(())
//! }
//! ```

pub mod errors;
pub mod manager;
pub mod models;

pub use errors::{AuthError, AuthResult};
pub use manager::AuthManager;
pub use models::{
    AccessTokenClaims, AccountStatus, DeactivationRecord, Device, DeviceInfo, LoginRequest,
    OtpChallenge, PasswordChangeRequest, RegisterRequest, RequestStatus, Role, Subscription, User,
    UserId,
};

pub(crate) use models::USER_COLUMNS;
