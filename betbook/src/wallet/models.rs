//! Wallet data models.
//!
//! Amounts are integer minor units (pesewas/kobo) to match the BIGINT
//! columns; conversion to decimal major units happens at the API boundary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Supported wallet currencies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Ghs,
    Ngn,
}

impl Currency {
    /// Parse a currency code as sent by clients
    pub fn parse(code: &str) -> Option<Currency> {
        match code.to_ascii_uppercase().as_str() {
            "GHS" => Some(Currency::Ghs),
            "NGN" => Some(Currency::Ngn),
            _ => None,
        }
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Currency::Ghs => write!(f, "GHS"),
            Currency::Ngn => write!(f, "NGN"),
        }
    }
}

/// Balance model (one row per user)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Balance {
    pub user_id: i64,
    pub amount: i64,
    pub currency: Currency,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Transaction status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxStatus {
    Pending,
    Completed,
}

impl std::fmt::Display for TxStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TxStatus::Pending => write!(f, "pending"),
            TxStatus::Completed => write!(f, "completed"),
        }
    }
}

/// History entry categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxKind {
    Deposit,
    Withdraw,
    Winning,
    Bet,
}

impl TxKind {
    pub fn parse(kind: &str) -> Option<TxKind> {
        match kind.to_ascii_lowercase().as_str() {
            "deposit" => Some(TxKind::Deposit),
            "withdraw" => Some(TxKind::Withdraw),
            "winning" => Some(TxKind::Winning),
            "bet" => Some(TxKind::Bet),
            _ => None,
        }
    }
}

impl std::fmt::Display for TxKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TxKind::Deposit => write!(f, "deposit"),
            TxKind::Withdraw => write!(f, "withdraw"),
            TxKind::Winning => write!(f, "winning"),
            TxKind::Bet => write!(f, "bet"),
        }
    }
}

/// Withdrawal payout method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WithdrawMethod {
    MobileMoney,
    Bank,
}

impl WithdrawMethod {
    pub fn parse(method: &str) -> Option<WithdrawMethod> {
        match method.to_ascii_lowercase().as_str() {
            "mobile_money" => Some(WithdrawMethod::MobileMoney),
            "bank" => Some(WithdrawMethod::Bank),
            _ => None,
        }
    }
}

impl std::fmt::Display for WithdrawMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WithdrawMethod::MobileMoney => write!(f, "mobile_money"),
            WithdrawMethod::Bank => write!(f, "bank"),
        }
    }
}

/// Deposit record (append-only)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deposit {
    pub id: i64,
    pub user_id: i64,
    pub amount: i64,
    pub currency: Currency,
    pub status: TxStatus,
    pub created_at: DateTime<Utc>,
}

/// Withdrawal record (append-only)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Withdrawal {
    pub id: i64,
    pub user_id: i64,
    pub amount: i64,
    pub method: WithdrawMethod,
    pub currency: Currency,
    pub status: TxStatus,
    pub created_at: DateTime<Utc>,
}

/// Winning record (append-only)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Winning {
    pub id: i64,
    pub user_id: i64,
    pub amount: i64,
    pub currency: Currency,
    pub status: TxStatus,
    pub created_at: DateTime<Utc>,
}

/// Normalized history entry; withdrawals and bet stakes carry negative
/// amounts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: TxKind,
    pub amount: i64,
    pub status: TxStatus,
    pub date: DateTime<Utc>,
}

/// Optional filters for history aggregation
#[derive(Debug, Clone, Default)]
pub struct HistoryFilter {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub kind: Option<TxKind>,
}

/// Convert a decimal major-unit amount (e.g. `50.0` GHS) into integer minor
/// units. Returns `None` for non-finite or out-of-range inputs.
pub fn to_minor_units(major: f64) -> Option<i64> {
    if !major.is_finite() {
        return None;
    }
    let minor = (major * 100.0).round();
    if minor.abs() > i64::MAX as f64 {
        return None;
    }
    Some(minor as i64)
}

/// Convert integer minor units back to a decimal major-unit amount.
pub fn to_major_units(minor: i64) -> f64 {
    minor as f64 / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minor_unit_conversion() {
        assert_eq!(to_minor_units(50.0), Some(5000));
        assert_eq!(to_minor_units(0.01), Some(1));
        assert_eq!(to_minor_units(40.555), Some(4056));
        assert_eq!(to_minor_units(f64::NAN), None);
        assert_eq!(to_minor_units(f64::INFINITY), None);
        assert_eq!(to_major_units(12345), 123.45);
    }

    #[test]
    fn test_currency_parse() {
        assert_eq!(Currency::parse("GHS"), Some(Currency::Ghs));
        assert_eq!(Currency::parse("ngn"), Some(Currency::Ngn));
        assert_eq!(Currency::parse("USD"), None);
        assert_eq!(Currency::Ghs.to_string(), "GHS");
    }

    #[test]
    fn test_tx_kind_parse() {
        assert_eq!(TxKind::parse("Deposit"), Some(TxKind::Deposit));
        assert_eq!(TxKind::parse("bet"), Some(TxKind::Bet));
        assert_eq!(TxKind::parse("transfer"), None);
    }
}
