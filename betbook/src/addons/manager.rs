//! Add-on manager implementation.

use super::{
    errors::{AddonError, AddonResult},
    models::{Addon, AddonSpec, AddonWithState, PurchaseAction, UserAddon},
};
use crate::auth::UserId;
use sqlx::{PgPool, Row};
use std::sync::Arc;

/// Column list matching [`Addon::from_row`]
const ADDON_COLUMNS: &str = "id, key, title, description, image_url, price";

/// Column list matching [`UserAddon::from_row`]
const USER_ADDON_COLUMNS: &str = "id, user_id, addon_id, status, purchased_at";

/// Add-on catalog and per-user ownership manager
#[derive(Clone)]
pub struct AddonManager {
    pool: Arc<PgPool>,
}

impl AddonManager {
    /// Create a new add-on manager
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// List the add-on catalog
    pub async fn list_addons(&self) -> AddonResult<Vec<Addon>> {
        let rows = sqlx::query(&format!("SELECT {ADDON_COLUMNS} FROM addons ORDER BY id"))
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok(rows.iter().map(Addon::from_row).collect())
    }

    /// Bulk-create add-ons, skipping keys already on file
    ///
    /// Returns only the rows actually inserted.
    pub async fn create_addons(&self, specs: Vec<AddonSpec>) -> AddonResult<Vec<Addon>> {
        if specs.is_empty() {
            return Err(AddonError::NoAddons);
        }

        let mut inserted = Vec::with_capacity(specs.len());
        for spec in specs {
            if spec.key.trim().is_empty() {
                return Err(AddonError::MissingField("key"));
            }
            if spec.title.trim().is_empty() {
                return Err(AddonError::MissingField("title"));
            }

            let row = sqlx::query(&format!(
                r#"
                INSERT INTO addons (key, title, description, image_url, price)
                VALUES ($1, $2, $3, $4, $5)
                ON CONFLICT (key) DO NOTHING
                RETURNING {ADDON_COLUMNS}
                "#,
            ))
            .bind(&spec.key)
            .bind(&spec.title)
            .bind(spec.description.as_deref().unwrap_or(""))
            .bind(spec.image_url.as_deref().unwrap_or(""))
            .bind(spec.price)
            .fetch_optional(self.pool.as_ref())
            .await?;

            if let Some(row) = row {
                inserted.push(Addon::from_row(&row));
            }
        }

        Ok(inserted)
    }

    /// Buy a priced add-on, or toggle one the user already owns
    ///
    /// # Errors
    ///
    /// * `AddonError::AddonNotFound` - No such add-on
    /// * `AddonError::AddonFree` - Free add-ons are always on and cannot be
    ///   bought or toggled
    pub async fn buy_addon(
        &self,
        user_id: UserId,
        addon_id: i64,
    ) -> AddonResult<(UserAddon, PurchaseAction)> {
        let addon = sqlx::query(&format!("SELECT {ADDON_COLUMNS} FROM addons WHERE id = $1"))
            .bind(addon_id)
            .fetch_optional(self.pool.as_ref())
            .await?
            .ok_or(AddonError::AddonNotFound)?;
        let addon = Addon::from_row(&addon);

        if addon.price == 0 {
            return Err(AddonError::AddonFree);
        }

        let existing = sqlx::query(&format!(
            "SELECT {USER_ADDON_COLUMNS} FROM user_addons WHERE user_id = $1 AND addon_id = $2",
        ))
        .bind(user_id)
        .bind(addon_id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        if existing.is_some() {
            let row = sqlx::query(&format!(
                r#"
                UPDATE user_addons
                SET status = CASE WHEN status = 'active' THEN 'inactive' ELSE 'active' END
                WHERE user_id = $1 AND addon_id = $2
                RETURNING {USER_ADDON_COLUMNS}
                "#,
            ))
            .bind(user_id)
            .bind(addon_id)
            .fetch_one(self.pool.as_ref())
            .await?;
            let owned = UserAddon::from_row(&row);
            let action = if owned.is_active() {
                PurchaseAction::Activated
            } else {
                PurchaseAction::Deactivated
            };
            return Ok((owned, action));
        }

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO user_addons (user_id, addon_id, status)
            VALUES ($1, $2, 'active')
            RETURNING {USER_ADDON_COLUMNS}
            "#,
        ))
        .bind(user_id)
        .bind(addon_id)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok((UserAddon::from_row(&row), PurchaseAction::Purchased))
    }

    /// List the whole catalog with one user's ownership merged in
    ///
    /// Free add-ons always read active; paid ones are active only while the
    /// user's ownership row is.
    pub async fn addons_for_user(&self, user_id: UserId) -> AddonResult<Vec<AddonWithState>> {
        let rows = sqlx::query(
            r#"
            SELECT a.id, a.key, a.title, a.description, a.image_url, a.price, ua.status
            FROM addons a
            LEFT JOIN user_addons ua ON ua.addon_id = a.id AND ua.user_id = $1
            ORDER BY a.id
            "#,
        )
        .bind(user_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows
            .iter()
            .map(|row| {
                let addon = Addon::from_row(row);
                let status: Option<String> = row.get("status");
                let is_active = addon.price == 0 || status.as_deref() == Some("active");
                AddonWithState { addon, is_active }
            })
            .collect())
    }
}
