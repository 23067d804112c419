//! # Betbook
//!
//! Core library for a sports-betting companion backend: accounts and
//! sessions, wallets with an append-only transaction history, bet tickets
//! with multibet legs, shareable booking and verify codes, cash-out offers,
//! content catalogs, feature add-ons, and push-notification records.
//!
//! All money is carried as integer minor units (pesewas/kobo); conversion to
//! decimal display units happens at the HTTP edge. Correctness under
//! concurrent requests comes from the storage layer: debits are conditional
//! single-statement updates, credits are upserts, and every multi-step
//! workflow runs inside one transaction.
//!
//! ## Core Modules
//!
//! - [`db`]: Connection pooling, configuration, and the admin user repository
//! - [`auth`]: Registration, login, JWT sessions, OTP, devices, account lifecycle
//! - [`wallet`]: Balances, deposits/withdrawals/winnings, history aggregation
//! - [`bets`]: Tickets, legs, booking/verify codes, cash-outs, odd quotes
//! - [`catalog`]: Match cards, top matches, manual cards, banners, avatars
//! - [`addons`]: Feature add-on catalog and per-user purchases
//! - [`notify`]: Push tokens with TTL and notification balances
//!
//! ## Example
//!
//! ```no_run
//! use betbook::bets::BetManager;
//! use betbook::db::{Database, DatabaseConfig};
//! use betbook::wallet::WalletManager;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::new(&DatabaseConfig::from_env()).await?;
//!     let pool = Arc::new(db.pool().clone());
//!
//!     let wallet = WalletManager::new(Arc::clone(&pool));
//!     let bets = BetManager::new(pool, wallet.clone());
//!
//!     // Fund user 1 with 100.00 and place a 40.00 single
//!     wallet.deposit(1, 10_000, None).await?;
//!     let placed = bets
//!         .place_bet(1, "22/08, 19:45", 4_000, Some(2.35), None, None, vec![])
//!         .await?;
//!     println!("ticket {} placed, balance {}", placed.bet.bet_code, placed.balance);
//!
//!     Ok(())
//! }
//! ```

/// Database connection pooling and admin repositories.
pub mod db;
pub use db::{Database, DatabaseConfig};

/// Accounts, sessions, devices, and account lifecycle.
pub mod auth;
pub use auth::{AuthManager, User, UserId};

/// Balances and the transaction ledger.
pub mod wallet;
pub use wallet::WalletManager;

/// Bet tickets, legs, and their side records.
pub mod bets;
pub use bets::BetManager;

/// Content catalogs shown in the app.
pub mod catalog;
pub use catalog::CatalogManager;

/// Feature add-ons and per-user purchases.
pub mod addons;
pub use addons::AddonManager;

/// Push tokens and notification balances.
pub mod notify;
pub use notify::NotifyManager;
