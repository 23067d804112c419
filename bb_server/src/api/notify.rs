//! Push notification API handlers.
//!
//! Device push tokens keyed by phone number with a 30-day TTL, and the
//! per-user virtual airtime balance the notification sender draws from.
//! Balance adjustments are signed deltas; the admin panel sends negative
//! amounts to charge for deliveries.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use betbook::notify::{NotifyError, PushToken};
use betbook::wallet::{to_major_units, to_minor_units};

use super::{AppState, MessageResponse};

fn notify_error(err: &NotifyError) -> (StatusCode, Json<MessageResponse>) {
    let status = match err {
        NotifyError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        NotifyError::TokenNotFound => StatusCode::NOT_FOUND,
        _ => StatusCode::BAD_REQUEST,
    };
    (
        status,
        Json(MessageResponse {
            message: err.client_message(),
        }),
    )
}

#[derive(Debug, Deserialize)]
pub struct RegisterTokenPayload {
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub platform: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub message: String,
    pub token: PushToken,
}

/// Register or refresh a device push token. Re-registering bumps the
/// expiry.
///
/// # Errors
///
/// - `400 Bad Request`: `{"message": "Phone and token are required"}`
pub async fn register_push_token(
    State(state): State<AppState>,
    Json(payload): Json<RegisterTokenPayload>,
) -> Result<Json<TokenResponse>, (StatusCode, Json<MessageResponse>)> {
    match state
        .notify
        .register_token(&payload.phone, &payload.token, payload.platform.as_deref())
        .await
    {
        Ok(token) => Ok(Json(TokenResponse {
            message: "Push token saved successfully".to_string(),
            token,
        })),
        Err(e) => Err(notify_error(&e)),
    }
}

/// Fetch the live push token for a phone number; expired tokens read as
/// absent.
pub async fn get_push_token(
    State(state): State<AppState>,
    Path(phone): Path<String>,
) -> Result<Json<PushToken>, (StatusCode, Json<MessageResponse>)> {
    match state.notify.get_token(&phone).await {
        Ok(token) => Ok(Json(token)),
        Err(e) => Err(notify_error(&e)),
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationBalanceResponse {
    pub current_balance: f64,
}

/// Fetch a user's notification balance, creating a zero row on first
/// access.
pub async fn get_notification_balance(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<NotificationBalanceResponse>, (StatusCode, Json<MessageResponse>)> {
    match state.notify.get_balance(user_id).await {
        Ok(balance) => Ok(Json(NotificationBalanceResponse {
            current_balance: to_major_units(balance.current_balance),
        })),
        Err(e) => Err(notify_error(&e)),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustBalancePayload {
    pub user_id: Option<i64>,
    pub amount: Option<f64>,
}

/// Apply a signed delta to a user's notification balance.
pub async fn adjust_notification_balance(
    State(state): State<AppState>,
    Json(payload): Json<AdjustBalancePayload>,
) -> Result<Json<NotificationBalanceResponse>, (StatusCode, Json<MessageResponse>)> {
    let invalid = (
        StatusCode::BAD_REQUEST,
        Json(MessageResponse {
            message: "User ID and amount are required".to_string(),
        }),
    );
    let (Some(user_id), Some(amount)) = (payload.user_id, payload.amount) else {
        return Err(invalid);
    };
    let Some(delta) = to_minor_units(amount) else {
        return Err(invalid);
    };

    match state.notify.adjust_balance(user_id, delta).await {
        Ok(balance) => Ok(Json(NotificationBalanceResponse {
            current_balance: to_major_units(balance.current_balance),
        })),
        Err(e) => Err(notify_error(&e)),
    }
}
