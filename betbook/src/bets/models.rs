//! Bet ticket and line item data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Row, postgres::PgRow};

use crate::auth::UserId;

/// Bet ticket ID type
pub type BetId = i64;

/// Bet ticket
///
/// The stake is in minor currency units. Ticket status is not stored; derive
/// it from the legs with [`derive_status`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bet {
    pub id: BetId,
    pub user_id: UserId,
    pub bet_code: String,
    /// Client display date, "DD/MM, HH:mm"
    pub date: String,
    pub stake: i64,
    pub odd: f64,
    pub booking_code: String,
    pub percentage: f64,
    #[serde(rename = "timestamp")]
    pub placed_at: DateTime<Utc>,
}

impl Bet {
    pub fn from_row(row: &PgRow) -> Bet {
        Bet {
            id: row.get("id"),
            user_id: row.get("user_id"),
            bet_code: row.get("bet_code"),
            date: row.get("date"),
            stake: row.get("stake"),
            odd: row.get("odd"),
            booking_code: row.get("booking_code"),
            percentage: row.get("percentage"),
            placed_at: row.get::<chrono::NaiveDateTime, _>("placed_at").and_utc(),
        }
    }
}

/// Sport a leg belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LegSport {
    Football,
    #[serde(rename = "eFootball")]
    EFootball,
    #[serde(rename = "VFootball")]
    VFootball,
}

impl LegSport {
    pub fn parse(sport: &str) -> LegSport {
        match sport {
            "eFootball" => LegSport::EFootball,
            "VFootball" => LegSport::VFootball,
            _ => LegSport::Football,
        }
    }
}

impl std::fmt::Display for LegSport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LegSport::Football => write!(f, "Football"),
            LegSport::EFootball => write!(f, "eFootball"),
            LegSport::VFootball => write!(f, "VFootball"),
        }
    }
}

/// One selection within a bet ticket
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BetLeg {
    pub id: i64,
    pub bet_id: BetId,
    /// Owning user, denormalized for per-user listings
    pub user_id: Option<UserId>,
    pub game_id: String,
    #[serde(rename = "dateTime")]
    pub kickoff: String,
    pub teams: String,
    pub ft_score: String,
    pub pick: String,
    pub market: String,
    pub outcome: String,
    pub status: String,
    pub odd: f64,
    #[serde(rename = "type")]
    pub sport: LegSport,
    pub live_odd: Option<f64>,
    #[serde(rename = "chatNumber")]
    pub chat_count: i32,
    pub created_at: DateTime<Utc>,
}

impl BetLeg {
    pub fn from_row(row: &PgRow) -> BetLeg {
        BetLeg {
            id: row.get("id"),
            bet_id: row.get("bet_id"),
            user_id: row.get("user_id"),
            game_id: row.get("game_id"),
            kickoff: row.get("kickoff"),
            teams: row.get("teams"),
            ft_score: row.get("ft_score"),
            pick: row.get("pick"),
            market: row.get("market"),
            outcome: row.get("outcome"),
            status: row.get("status"),
            odd: row.get("odd"),
            sport: LegSport::parse(&row.get::<String, _>("sport")),
            live_odd: row.get("live_odd"),
            chat_count: row.get("chat_count"),
            created_at: row.get::<chrono::NaiveDateTime, _>("created_at").and_utc(),
        }
    }
}

/// Incoming leg from a bet slip; absent fields take slip defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegSpec {
    #[serde(default)]
    pub game_id: Option<String>,
    #[serde(default, rename = "date", alias = "dateTime")]
    pub kickoff: Option<String>,
    #[serde(default)]
    pub teams: Option<String>,
    #[serde(default)]
    pub ft_score: Option<String>,
    #[serde(default)]
    pub pick: Option<String>,
    #[serde(default)]
    pub market: Option<String>,
    #[serde(default)]
    pub outcome: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub odd: Option<f64>,
    #[serde(default, rename = "type")]
    pub sport: Option<LegSport>,
}

impl LegSpec {
    /// Apply slip defaults to absent fields
    pub fn normalize(self) -> NormalizedLeg {
        NormalizedLeg {
            game_id: self.game_id.unwrap_or_else(|| "N/A".to_string()),
            kickoff: self.kickoff.unwrap_or_else(|| "N/A".to_string()),
            teams: self.teams.unwrap_or_else(|| "N/A".to_string()),
            ft_score: self.ft_score.unwrap_or_else(|| "N/A".to_string()),
            pick: self.pick.unwrap_or_else(|| "N/A".to_string()),
            market: self.market.unwrap_or_else(|| "N/A".to_string()),
            outcome: self.outcome.unwrap_or_else(|| "N/A".to_string()),
            status: self.status.unwrap_or_else(|| "Not Started".to_string()),
            odd: self.odd.unwrap_or(1.0),
            sport: self.sport.unwrap_or(LegSport::Football),
        }
    }
}

/// A leg with all slip defaults applied, ready for insertion
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedLeg {
    pub game_id: String,
    pub kickoff: String,
    pub teams: String,
    pub ft_score: String,
    pub pick: String,
    pub market: String,
    pub outcome: String,
    pub status: String,
    pub odd: f64,
    pub sport: LegSport,
}

/// Partial update to a leg; `None` fields keep their current value
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegUpdate {
    #[serde(default)]
    pub market: Option<String>,
    #[serde(default)]
    pub pick: Option<String>,
    #[serde(default)]
    pub ft_score: Option<String>,
    #[serde(default)]
    pub outcome: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub odd: Option<f64>,
    #[serde(default, rename = "chatNumber")]
    pub chat_count: Option<i32>,
    #[serde(default)]
    pub live_odd: Option<f64>,
    #[serde(default)]
    pub teams: Option<String>,
    #[serde(default)]
    pub game_id: Option<String>,
    #[serde(default, rename = "dateTime")]
    pub kickoff: Option<String>,
}

/// Partial update to a ticket's editable fields; stake is in minor units
#[derive(Debug, Clone, Default)]
pub struct TicketUpdate {
    pub bet_code: Option<String>,
    pub date: Option<String>,
    pub stake: Option<i64>,
    pub percentage: Option<f64>,
}

/// Marker row recording that a ticket has been placed/booked
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub bet_id: BetId,
    pub created_at: DateTime<Utc>,
}

impl Booking {
    pub fn from_row(row: &PgRow) -> Booking {
        Booking {
            bet_id: row.get("bet_id"),
            created_at: row.get::<chrono::NaiveDateTime, _>("created_at").and_utc(),
        }
    }
}

/// Verification code attached to a ticket; expires 24 hours after issue
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyCode {
    #[serde(rename = "verifyCode")]
    pub code: String,
    pub bet_id: BetId,
    pub created_at: DateTime<Utc>,
}

impl VerifyCode {
    pub fn from_row(row: &PgRow) -> VerifyCode {
        VerifyCode {
            code: row.get("code"),
            bet_id: row.get("bet_id"),
            created_at: row.get::<chrono::NaiveDateTime, _>("created_at").and_utc(),
        }
    }
}

/// Availability of a cash-out offer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CashoutStatus {
    Cashout,
    Unavailable,
}

impl CashoutStatus {
    pub fn parse(status: &str) -> CashoutStatus {
        match status {
            "unavailable" => CashoutStatus::Unavailable,
            _ => CashoutStatus::Cashout,
        }
    }
}

impl std::fmt::Display for CashoutStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CashoutStatus::Cashout => write!(f, "cashout"),
            CashoutStatus::Unavailable => write!(f, "unavailable"),
        }
    }
}

/// Cash-out offer for a ticket; amount is in minor units
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cashout {
    pub bet_id: BetId,
    pub amount: i64,
    #[serde(rename = "cashStatus")]
    pub status: CashoutStatus,
    pub updated_at: DateTime<Utc>,
}

impl Cashout {
    pub fn from_row(row: &PgRow) -> Cashout {
        Cashout {
            bet_id: row.get("bet_id"),
            amount: row.get("amount"),
            status: CashoutStatus::parse(&row.get::<String, _>("status")),
            updated_at: row.get::<chrono::NaiveDateTime, _>("updated_at").and_utc(),
        }
    }
}

/// Posted odd for a ticket, upserted by bet id
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OddQuote {
    pub bet_id: BetId,
    pub odd: f64,
    pub updated_at: DateTime<Utc>,
}

impl OddQuote {
    pub fn from_row(row: &PgRow) -> OddQuote {
        OddQuote {
            bet_id: row.get("bet_id"),
            odd: row.get("odd"),
            updated_at: row.get::<chrono::NaiveDateTime, _>("updated_at").and_utc(),
        }
    }
}

/// Result of placing a bet: the ticket, its legs and the balance after the
/// stake debit
#[derive(Debug, Clone)]
pub struct PlacedBet {
    pub bet: Bet,
    pub legs: Vec<BetLeg>,
    pub balance: i64,
}

/// Product of leg odds, rounded to 2 decimals
pub fn aggregate_odd(legs: &[NormalizedLeg]) -> f64 {
    let product: f64 = legs.iter().map(|leg| leg.odd).product();
    (product * 100.0).round() / 100.0
}

/// Derive a ticket's status from its leg statuses
///
/// Any lost leg loses the ticket; a ticket with every leg won is won; a
/// running leg makes the ticket live; otherwise it has not started.
pub fn derive_status(statuses: &[&str]) -> &'static str {
    if statuses.iter().any(|s| *s == "Lost") {
        "Lost"
    } else if !statuses.is_empty() && statuses.iter().all(|s| *s == "Won") {
        "Won"
    } else if statuses.iter().any(|s| *s == "Running") {
        "Running"
    } else {
        "Not Started"
    }
}

/// Check a ticket display date has the "DD/MM, HH:mm" shape
pub fn is_valid_ticket_date(date: &str) -> bool {
    let b = date.as_bytes();
    b.len() == 12
        && b[0].is_ascii_digit()
        && b[1].is_ascii_digit()
        && b[2] == b'/'
        && b[3].is_ascii_digit()
        && b[4].is_ascii_digit()
        && b[5] == b','
        && b[6] == b' '
        && b[7].is_ascii_digit()
        && b[8].is_ascii_digit()
        && b[9] == b':'
        && b[10].is_ascii_digit()
        && b[11].is_ascii_digit()
}

/// Format a timestamp as a ticket display date
pub fn format_ticket_date(at: DateTime<Utc>) -> String {
    at.format("%d/%m, %H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn normalize_applies_slip_defaults() {
        let leg = LegSpec::default().normalize();
        assert_eq!(leg.game_id, "N/A");
        assert_eq!(leg.teams, "N/A");
        assert_eq!(leg.status, "Not Started");
        assert_eq!(leg.odd, 1.0);
        assert_eq!(leg.sport, LegSport::Football);
    }

    #[test]
    fn normalize_keeps_provided_fields() {
        let leg = LegSpec {
            teams: Some("Arsenal vs Chelsea".to_string()),
            odd: Some(2.35),
            sport: Some(LegSport::EFootball),
            ..Default::default()
        }
        .normalize();
        assert_eq!(leg.teams, "Arsenal vs Chelsea");
        assert_eq!(leg.odd, 2.35);
        assert_eq!(leg.sport, LegSport::EFootball);
    }

    #[test]
    fn aggregate_odd_multiplies_and_rounds() {
        let legs: Vec<NormalizedLeg> = [1.5, 2.0, 1.33]
            .iter()
            .map(|&odd| LegSpec {
                odd: Some(odd),
                ..Default::default()
            }
            .normalize())
            .collect();
        assert_eq!(aggregate_odd(&legs), 3.99);
    }

    #[test]
    fn aggregate_odd_of_empty_slip_is_one() {
        assert_eq!(aggregate_odd(&[]), 1.0);
    }

    #[test]
    fn derive_status_rules() {
        assert_eq!(derive_status(&[]), "Not Started");
        assert_eq!(derive_status(&["Not Started", "Not Started"]), "Not Started");
        assert_eq!(derive_status(&["Won", "Lost"]), "Lost");
        assert_eq!(derive_status(&["Won", "Won"]), "Won");
        assert_eq!(derive_status(&["Won", "Running"]), "Running");
    }

    #[test]
    fn ticket_date_shape() {
        assert!(is_valid_ticket_date("14/03, 18:30"));
        assert!(!is_valid_ticket_date("14/3, 18:30"));
        assert!(!is_valid_ticket_date("14-03, 18:30"));
        assert!(!is_valid_ticket_date("tomorrow"));
        assert!(!is_valid_ticket_date(""));
    }

    #[test]
    fn ticket_date_formatting() {
        let at = Utc.with_ymd_and_hms(2025, 3, 14, 18, 30, 0).unwrap();
        let formatted = format_ticket_date(at);
        assert_eq!(formatted, "14/03, 18:30");
        assert!(is_valid_ticket_date(&formatted));
    }

    #[test]
    fn leg_sport_parse_round_trip() {
        assert_eq!(LegSport::parse("eFootball"), LegSport::EFootball);
        assert_eq!(LegSport::parse("VFootball"), LegSport::VFootball);
        assert_eq!(LegSport::parse("anything"), LegSport::Football);
        assert_eq!(LegSport::EFootball.to_string(), "eFootball");
    }
}
