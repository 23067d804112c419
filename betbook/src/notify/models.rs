//! Notification data models.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::Row;
use sqlx::postgres::PgRow;

/// A device push token registered against a phone number
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PushToken {
    pub phone: String,
    pub token: String,
    pub platform: Option<String>,
    pub updated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl PushToken {
    pub(crate) fn from_row(row: &PgRow) -> Self {
        Self {
            phone: row.get("phone"),
            token: row.get("token"),
            platform: row.get("platform"),
            updated_at: row.get::<chrono::NaiveDateTime, _>("updated_at").and_utc(),
            expires_at: row.get::<chrono::NaiveDateTime, _>("expires_at").and_utc(),
        }
    }
}

/// A user's virtual airtime balance for notification delivery
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationBalance {
    pub user_id: i64,
    /// Minor currency units, signed; adjustments apply deltas without a floor
    pub current_balance: i64,
    pub updated_at: DateTime<Utc>,
}

impl NotificationBalance {
    pub(crate) fn from_row(row: &PgRow) -> Self {
        Self {
            user_id: row.get("user_id"),
            current_balance: row.get("current_balance"),
            updated_at: row.get::<chrono::NaiveDateTime, _>("updated_at").and_utc(),
        }
    }
}
