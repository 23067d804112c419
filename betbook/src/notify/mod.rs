//! Push tokens and notification balances.

pub mod errors;
pub mod manager;
pub mod models;

pub use errors::{NotifyError, NotifyResult};
pub use manager::NotifyManager;
pub use models::{NotificationBalance, PushToken};
