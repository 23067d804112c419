//! Add-on data models.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::Row;
use sqlx::postgres::PgRow;

/// A purchasable feature add-on
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Addon {
    pub id: i64,
    /// Stable identifier clients key features off, e.g. "verify_code"
    pub key: String,
    pub title: String,
    pub description: String,
    pub image_url: String,
    /// Minor currency units; 0 means free
    pub price: i64,
}

impl Addon {
    pub(crate) fn from_row(row: &PgRow) -> Self {
        Self {
            id: row.get("id"),
            key: row.get("key"),
            title: row.get("title"),
            description: row.get("description"),
            image_url: row.get("image_url"),
            price: row.get("price"),
        }
    }
}

/// Fields for creating an add-on; price is minor units
#[derive(Debug, Clone)]
pub struct AddonSpec {
    pub key: String,
    pub title: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub price: i64,
}

/// A user's ownership row for one add-on
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAddon {
    pub id: i64,
    pub user_id: i64,
    pub addon_id: i64,
    pub status: String,
    pub purchased_at: DateTime<Utc>,
}

impl UserAddon {
    pub(crate) fn from_row(row: &PgRow) -> Self {
        Self {
            id: row.get("id"),
            user_id: row.get("user_id"),
            addon_id: row.get("addon_id"),
            status: row.get("status"),
            purchased_at: row.get::<chrono::NaiveDateTime, _>("purchased_at").and_utc(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == "active"
    }
}

/// What a buy call did to the ownership row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurchaseAction {
    /// First purchase; the add-on is now active
    Purchased,
    /// Existing row toggled back on
    Activated,
    /// Existing row toggled off
    Deactivated,
}

/// An add-on merged with one user's ownership state
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddonWithState {
    #[serde(flatten)]
    pub addon: Addon,
    pub is_active: bool,
}
