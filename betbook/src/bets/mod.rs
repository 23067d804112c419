//! Bet tickets and their side records.
//!
//! A ticket ([`Bet`]) is a stake at an aggregate odd with shareable bet and
//! booking codes; its selections live in [`BetLeg`] rows. Placement debits
//! the stake and sets up the booking and cash-out records in one
//! transaction, stake edits settle the difference against the wallet, and
//! deletion refunds. Verify codes resolve a ticket for third parties for a
//! limited window and are invalidated by any edit to the ticket's codes,
//! stake or odd.

pub mod errors;
pub mod manager;
pub mod models;

pub use errors::{BetError, BetResult};
pub use manager::BetManager;
pub use models::{
    Bet, BetId, BetLeg, Booking, Cashout, CashoutStatus, LegSpec, LegSport, LegUpdate,
    NormalizedLeg, OddQuote, PlacedBet, TicketUpdate, VerifyCode, aggregate_odd, derive_status,
    format_ticket_date, is_valid_ticket_date,
};
