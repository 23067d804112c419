//! Feature add-ons and per-user purchases.
//!
//! The catalog is admin-managed; users buy priced add-ons and can toggle
//! them after purchase. Free add-ons are always on and reject purchase
//! attempts.

pub mod errors;
pub mod manager;
pub mod models;

pub use errors::{AddonError, AddonResult};
pub use manager::AddonManager;
pub use models::{Addon, AddonSpec, AddonWithState, PurchaseAction, UserAddon};
