//! Wallet module providing balance management and transaction history.
//!
//! This module implements:
//! - Per-user balance records with integer minor-unit amounts
//! - Atomic conditional debits (balance can never go negative)
//! - Deposit / withdrawal / winning transaction records
//! - Currency labels (GHS/NGN) with no conversion semantics
//! - Normalized, date-descending transaction history
//!
//! ## Example
//!
//! ```no_run
//! use betbook::wallet::WalletManager;
//! use betbook::db::Database;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::new(&Default::default()).await?;
//!     let wallet = WalletManager::new(Arc::new(db.pool().clone()));
//!
//!     // Deposit 50.00 (5000 minor units) for user 1
//!     let (deposit, new_balance) = wallet.deposit(1, 5000, None).await?;
//!     println!("Deposit {} accepted, balance is now {}", deposit.id, new_balance);
//!
//!     Ok(())
//! }
//! ```

pub mod errors;
pub mod manager;
pub mod models;

pub use errors::{WalletError, WalletResult};
pub use manager::WalletManager;
pub use models::{
    Balance, Currency, Deposit, HistoryEntry, HistoryFilter, TxKind, TxStatus, WithdrawMethod,
    Withdrawal, Winning, to_major_units, to_minor_units,
};
