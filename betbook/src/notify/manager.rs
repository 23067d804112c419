//! Notification manager implementation.

use super::{
    errors::{NotifyError, NotifyResult},
    models::{NotificationBalance, PushToken},
};
use crate::auth::UserId;
use chrono::{Duration, Utc};
use sqlx::PgPool;
use std::sync::Arc;

/// Registered tokens drop out of lookups this long after their last refresh
const TOKEN_TTL_DAYS: i64 = 30;

/// Push token and notification balance manager
///
/// Tokens live in the database instead of process memory so they survive
/// restarts; every registration refreshes the expiry.
#[derive(Clone)]
pub struct NotifyManager {
    pool: Arc<PgPool>,
}

impl NotifyManager {
    /// Create a new notification manager
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Register or refresh the push token for a phone number
    ///
    /// Expired rows are swept opportunistically before the upsert.
    pub async fn register_token(
        &self,
        phone: &str,
        token: &str,
        platform: Option<&str>,
    ) -> NotifyResult<PushToken> {
        if phone.trim().is_empty() || token.trim().is_empty() {
            return Err(NotifyError::MissingToken);
        }

        sqlx::query("DELETE FROM push_tokens WHERE expires_at <= NOW()")
            .execute(self.pool.as_ref())
            .await?;

        let expires_at = Utc::now() + Duration::days(TOKEN_TTL_DAYS);
        let row = sqlx::query(
            r#"
            INSERT INTO push_tokens (phone, token, platform, expires_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (phone) DO UPDATE
            SET token = EXCLUDED.token,
                platform = COALESCE(EXCLUDED.platform, push_tokens.platform),
                updated_at = NOW(),
                expires_at = EXCLUDED.expires_at
            RETURNING phone, token, platform, updated_at, expires_at
            "#,
        )
        .bind(phone)
        .bind(token)
        .bind(platform)
        .bind(expires_at.naive_utc())
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(PushToken::from_row(&row))
    }

    /// Fetch the live token for a phone number; expired rows do not resolve
    pub async fn get_token(&self, phone: &str) -> NotifyResult<PushToken> {
        let row = sqlx::query(
            "SELECT phone, token, platform, updated_at, expires_at FROM push_tokens \
             WHERE phone = $1 AND expires_at > NOW()",
        )
        .bind(phone)
        .fetch_optional(self.pool.as_ref())
        .await?
        .ok_or(NotifyError::TokenNotFound)?;

        Ok(PushToken::from_row(&row))
    }

    /// Fetch a user's notification balance, creating a zero record on first
    /// access
    pub async fn get_balance(&self, user_id: UserId) -> NotifyResult<NotificationBalance> {
        sqlx::query(
            "INSERT INTO notification_balances (user_id) VALUES ($1) \
             ON CONFLICT (user_id) DO NOTHING",
        )
        .bind(user_id)
        .execute(self.pool.as_ref())
        .await?;

        let row = sqlx::query(
            "SELECT user_id, current_balance, updated_at FROM notification_balances \
             WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(NotificationBalance::from_row(&row))
    }

    /// Apply a signed delta to a user's notification balance, creating the
    /// record when absent
    pub async fn adjust_balance(
        &self,
        user_id: UserId,
        delta: i64,
    ) -> NotifyResult<NotificationBalance> {
        sqlx::query(
            "INSERT INTO notification_balances (user_id) VALUES ($1) \
             ON CONFLICT (user_id) DO NOTHING",
        )
        .bind(user_id)
        .execute(self.pool.as_ref())
        .await?;

        let row = sqlx::query(
            r#"
            UPDATE notification_balances
            SET current_balance = current_balance + $2, updated_at = NOW()
            WHERE user_id = $1
            RETURNING user_id, current_balance, updated_at
            "#,
        )
        .bind(user_id)
        .bind(delta)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(NotificationBalance::from_row(&row))
    }
}
