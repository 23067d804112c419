//! Feature add-on API handlers.
//!
//! The add-on catalog (bulk creation, listing) and per-user purchases.
//! Buying a priced add-on the first time records ownership; buying it again
//! toggles it on or off. Free add-ons cannot be bought and always show as
//! active in the per-user listing.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use betbook::addons::{Addon, AddonError, AddonSpec, PurchaseAction, UserAddon};
use betbook::wallet::{to_major_units, to_minor_units};

use super::{AppState, MessageResponse};

fn addon_error(err: &AddonError) -> (StatusCode, Json<MessageResponse>) {
    let status = match err {
        AddonError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        AddonError::AddonNotFound => StatusCode::NOT_FOUND,
        _ => StatusCode::BAD_REQUEST,
    };
    (
        status,
        Json(MessageResponse {
            message: err.client_message(),
        }),
    )
}

/// Add-on as clients expect it: decimal price
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddonDto {
    pub id: i64,
    pub key: String,
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub price: f64,
}

impl From<Addon> for AddonDto {
    fn from(addon: Addon) -> Self {
        Self {
            id: addon.id,
            key: addon.key,
            title: addon.title,
            description: addon.description,
            image_url: addon.image_url,
            price: to_major_units(addon.price),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddonWithStateDto {
    #[serde(flatten)]
    pub addon: AddonDto,
    pub is_active: bool,
}

/// List the add-on catalog.
pub async fn list_addons(
    State(state): State<AppState>,
) -> Result<Json<Vec<AddonDto>>, (StatusCode, Json<MessageResponse>)> {
    match state.addons.list_addons().await {
        Ok(addons) => Ok(Json(addons.into_iter().map(Into::into).collect())),
        Err(e) => Err(addon_error(&e)),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddonSpecPayload {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub price: f64,
}

#[derive(Debug, Deserialize)]
pub struct CreateAddonsPayload {
    #[serde(default)]
    pub addons: Vec<AddonSpecPayload>,
}

#[derive(Debug, Serialize)]
pub struct AddonsCreatedResponse {
    pub message: String,
    pub data: Vec<AddonDto>,
}

/// Create add-ons in bulk; rows whose key already exists are skipped.
///
/// # Errors
///
/// - `400 Bad Request`: `{"message": "No addons provided"}` or
///   `{"message": "All fields are required"}`
pub async fn create_addons(
    State(state): State<AppState>,
    Json(payload): Json<CreateAddonsPayload>,
) -> Result<(StatusCode, Json<AddonsCreatedResponse>), (StatusCode, Json<MessageResponse>)> {
    let mut specs = Vec::with_capacity(payload.addons.len());
    for addon in payload.addons {
        let Some(price) = to_minor_units(addon.price).filter(|p| *p >= 0) else {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(MessageResponse {
                    message: "Price must be a non-negative number".to_string(),
                }),
            ));
        };
        specs.push(AddonSpec {
            key: addon.key,
            title: addon.title,
            description: addon.description,
            image_url: addon.image_url,
            price,
        });
    }

    match state.addons.create_addons(specs).await {
        Ok(created) => Ok((
            StatusCode::CREATED,
            Json(AddonsCreatedResponse {
                message: "Addons created successfully".to_string(),
                data: created.into_iter().map(Into::into).collect(),
            }),
        )),
        Err(e) => Err(addon_error(&e)),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuyAddonPayload {
    pub user_id: Option<i64>,
    pub addon_id: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct BuyAddonResponse {
    pub message: String,
    pub addon: UserAddon,
}

/// Buy an add-on, or toggle one already owned.
///
/// # Errors
///
/// - `400 Bad Request`: `{"message": "This addon is free"}`
/// - `404 Not Found`: `{"message": "Addon not found"}`
pub async fn buy_addon(
    State(state): State<AppState>,
    Json(payload): Json<BuyAddonPayload>,
) -> Result<Json<BuyAddonResponse>, (StatusCode, Json<MessageResponse>)> {
    let (Some(user_id), Some(addon_id)) = (payload.user_id, payload.addon_id) else {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(MessageResponse {
                message: "User ID and addon ID are required".to_string(),
            }),
        ));
    };

    match state.addons.buy_addon(user_id, addon_id).await {
        Ok((owned, action)) => {
            let message = match action {
                PurchaseAction::Purchased => "Addon purchased and activated successfully",
                PurchaseAction::Activated => "Addon has been activated",
                PurchaseAction::Deactivated => "Addon has been deactivated",
            };
            Ok(Json(BuyAddonResponse {
                message: message.to_string(),
                addon: owned,
            }))
        }
        Err(e) => Err(addon_error(&e)),
    }
}

/// List the whole catalog with one user's ownership state merged in.
/// Free add-ons always show active.
pub async fn addons_for_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<Vec<AddonWithStateDto>>, (StatusCode, Json<MessageResponse>)> {
    match state.addons.addons_for_user(user_id).await {
        Ok(addons) => Ok(Json(
            addons
                .into_iter()
                .map(|entry| AddonWithStateDto {
                    addon: entry.addon.into(),
                    is_active: entry.is_active,
                })
                .collect(),
        )),
        Err(e) => Err(addon_error(&e)),
    }
}
