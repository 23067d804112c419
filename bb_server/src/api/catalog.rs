//! Content catalog API handlers.
//!
//! Feed match cards, featured top matches, manual winner cards, home-screen
//! banners and the avatar catalog with per-user selection. Everything here
//! is display content; image fields carry already-hosted URLs.
//!
//! Manual card responses carry a `success` flag next to the message, which
//! the deployed admin panel checks. The other sections answer with plain
//! `message` bodies or the raw records.
//!
//! # Examples
//!
//! Publish a winner card that stays up for an hour:
//! ```bash
//! curl -X POST http://localhost:8080/api/manual-cards \
//!   -H "Content-Type: application/json" \
//!   -d '{"phone": "024XXXX221", "amount": 1250.0, "minute": 3, "duration": 60}'
//! ```

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use betbook::catalog::{
    CatalogError, ManualCard, ManualCardSpec, ManualCardUpdate, MatchCard, MatchSpec, MatchUpdate,
    ProfileImage, TopMatch, TopMatchSpec, TopMatchUpdate, UserImageView,
};
use betbook::wallet::{to_major_units, to_minor_units};

use super::{AppState, MessageResponse, StatusMessage};

fn catalog_error(err: &CatalogError) -> (StatusCode, Json<MessageResponse>) {
    let status = match err {
        CatalogError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        CatalogError::MatchNotFound
        | CatalogError::CardNotFound
        | CatalogError::ImageNotFound
        | CatalogError::NoSelection => StatusCode::NOT_FOUND,
        _ => StatusCode::BAD_REQUEST,
    };
    (
        status,
        Json(MessageResponse {
            message: err.client_message(),
        }),
    )
}

/// Manual card failures answer with a success flag
fn card_error(err: &CatalogError) -> (StatusCode, Json<StatusMessage>) {
    let status = match err {
        CatalogError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        CatalogError::CardNotFound => StatusCode::NOT_FOUND,
        _ => StatusCode::BAD_REQUEST,
    };
    (
        status,
        Json(StatusMessage {
            success: false,
            message: err.client_message(),
        }),
    )
}

#[derive(Debug, Deserialize)]
pub struct MatchesPayload {
    #[serde(default)]
    pub matches: Vec<MatchSpec>,
}

/// Bulk-upload feed matches.
///
/// # Errors
///
/// - `400 Bad Request`: `{"message": "No matches provided"}`
pub async fn create_matches(
    State(state): State<AppState>,
    Json(payload): Json<MatchesPayload>,
) -> Result<(StatusCode, Json<Vec<MatchCard>>), (StatusCode, Json<MessageResponse>)> {
    match state.catalog.create_matches(payload.matches).await {
        Ok(saved) => Ok((StatusCode::CREATED, Json(saved))),
        Err(e) => Err(catalog_error(&e)),
    }
}

/// Create one feed match by hand; manual entries go up flagged hot and
/// best-odd.
pub async fn create_single_match(
    State(state): State<AppState>,
    Json(spec): Json<MatchSpec>,
) -> Result<(StatusCode, Json<MatchCard>), (StatusCode, Json<MessageResponse>)> {
    let mut saved = match state.catalog.create_matches(vec![spec]).await {
        Ok(saved) => saved,
        Err(e) => return Err(catalog_error(&e)),
    };
    let Some(card) = saved.pop() else {
        return Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(MessageResponse {
                message: "Internal server error".to_string(),
            }),
        ));
    };

    match state
        .catalog
        .set_match_status(card.id, Some(true), Some(true))
        .await
    {
        Ok(card) => Ok((StatusCode::CREATED, Json(card))),
        Err(e) => Err(catalog_error(&e)),
    }
}

/// List feed matches ordered by kickoff time.
pub async fn list_matches(
    State(state): State<AppState>,
) -> Result<Json<Vec<MatchCard>>, (StatusCode, Json<MessageResponse>)> {
    match state.catalog.list_matches().await {
        Ok(matches) => Ok(Json(matches)),
        Err(e) => Err(catalog_error(&e)),
    }
}

/// Fetch one feed match.
pub async fn get_match(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MatchCard>, (StatusCode, Json<MessageResponse>)> {
    match state.catalog.get_match(id).await {
        Ok(card) => Ok(Json(card)),
        Err(e) => Err(catalog_error(&e)),
    }
}

/// Patch a feed match; absent fields keep their values.
///
/// # Errors
///
/// - `400 Bad Request`: `{"message": "No update fields provided"}`
/// - `404 Not Found`: `{"message": "Match not found"}`
pub async fn update_match(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(update): Json<MatchUpdate>,
) -> Result<Json<MatchCard>, (StatusCode, Json<MessageResponse>)> {
    match state.catalog.update_match(id, update).await {
        Ok(card) => Ok(Json(card)),
        Err(e) => Err(catalog_error(&e)),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusFlagsPayload {
    pub best_odd: Option<bool>,
    pub hot: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct MatchStatusResponse {
    pub message: String,
    pub r#match: MatchCard,
}

/// Flip a feed match's hot / best-odd flags.
pub async fn set_match_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<StatusFlagsPayload>,
) -> Result<Json<MatchStatusResponse>, (StatusCode, Json<MessageResponse>)> {
    match state
        .catalog
        .set_match_status(id, payload.best_odd, payload.hot)
        .await
    {
        Ok(card) => Ok(Json(MatchStatusResponse {
            message: "Match status updated successfully".to_string(),
            r#match: card,
        })),
        Err(e) => Err(catalog_error(&e)),
    }
}

/// Delete a feed match.
pub async fn delete_match(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, (StatusCode, Json<MessageResponse>)> {
    match state.catalog.delete_match(id).await {
        Ok(()) => Ok(Json(MessageResponse {
            message: "Match deleted successfully".to_string(),
        })),
        Err(e) => Err(catalog_error(&e)),
    }
}

/// List the featured top matches.
pub async fn list_top_matches(
    State(state): State<AppState>,
) -> Result<Json<Vec<TopMatch>>, (StatusCode, Json<MessageResponse>)> {
    match state.catalog.list_top_matches().await {
        Ok(matches) => Ok(Json(matches)),
        Err(e) => Err(catalog_error(&e)),
    }
}

/// Create a featured top match.
pub async fn create_top_match(
    State(state): State<AppState>,
    Json(spec): Json<TopMatchSpec>,
) -> Result<(StatusCode, Json<TopMatch>), (StatusCode, Json<MessageResponse>)> {
    match state.catalog.create_top_match(spec).await {
        Ok(top) => Ok((StatusCode::CREATED, Json(top))),
        Err(e) => Err(catalog_error(&e)),
    }
}

/// Patch a featured top match; both the PUT and the legacy PATCH path land
/// here.
pub async fn update_top_match(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(update): Json<TopMatchUpdate>,
) -> Result<Json<TopMatch>, (StatusCode, Json<MessageResponse>)> {
    match state.catalog.update_top_match(id, update).await {
        Ok(top) => Ok(Json(top)),
        Err(e) => Err(catalog_error(&e)),
    }
}

#[derive(Debug, Serialize)]
pub struct TopMatchStatusResponse {
    pub message: String,
    pub r#match: TopMatch,
}

/// Flip a top match's hot / best-odd flags.
pub async fn set_top_match_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<StatusFlagsPayload>,
) -> Result<Json<TopMatchStatusResponse>, (StatusCode, Json<MessageResponse>)> {
    match state
        .catalog
        .set_top_match_status(id, payload.best_odd, payload.hot)
        .await
    {
        Ok(top) => Ok(Json(TopMatchStatusResponse {
            message: "Match status updated successfully".to_string(),
            r#match: top,
        })),
        Err(e) => Err(catalog_error(&e)),
    }
}

/// Delete a featured top match.
pub async fn delete_top_match(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, (StatusCode, Json<MessageResponse>)> {
    match state.catalog.delete_top_match(id).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(e) => Err(catalog_error(&e)),
    }
}

/// Manual card as clients expect it: decimal amount, `duration` key
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualCardDto {
    pub id: i64,
    pub phone: String,
    pub amount: f64,
    pub minute: i32,
    pub sport: String,
    #[serde(rename = "duration")]
    pub duration_mins: i32,
    pub time_ago: String,
    pub is_manual: bool,
    pub is_active: bool,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl From<ManualCard> for ManualCardDto {
    fn from(card: ManualCard) -> Self {
        Self {
            id: card.id,
            phone: card.phone,
            amount: to_major_units(card.amount),
            minute: card.minute,
            sport: card.sport,
            duration_mins: card.duration_mins,
            time_ago: card.time_ago,
            is_manual: card.is_manual,
            is_active: card.is_active,
            expires_at: card.expires_at,
            created_at: card.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CardResponse {
    pub success: bool,
    pub message: String,
    pub data: ManualCardDto,
}

#[derive(Debug, Serialize)]
pub struct CardsResponse {
    pub success: bool,
    pub data: Vec<ManualCardDto>,
    pub count: usize,
}

#[derive(Debug, Deserialize)]
pub struct CreateCardPayload {
    #[serde(default)]
    pub phone: Option<String>,
    pub amount: Option<f64>,
    pub minute: Option<i32>,
    #[serde(default)]
    pub sport: Option<String>,
    pub duration: Option<i32>,
}

/// Publish a manual winner card; it stays visible for `duration` minutes.
///
/// # Errors
///
/// - `400 Bad Request`: missing fields or non-positive amount/duration,
///   with `success: false`
pub async fn create_manual_card(
    State(state): State<AppState>,
    Json(payload): Json<CreateCardPayload>,
) -> Result<(StatusCode, Json<CardResponse>), (StatusCode, Json<StatusMessage>)> {
    let (Some(phone), Some(amount), Some(minute), Some(duration)) = (
        payload.phone,
        payload.amount,
        payload.minute,
        payload.duration,
    ) else {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(StatusMessage {
                success: false,
                message: "Missing required fields: phone, amount, minute, duration".to_string(),
            }),
        ));
    };
    let Some(minor) = to_minor_units(amount) else {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(StatusMessage {
                success: false,
                message: "Amount must be a positive number".to_string(),
            }),
        ));
    };

    let spec = ManualCardSpec {
        phone,
        amount: minor,
        minute,
        sport: payload.sport,
        duration_mins: duration,
    };

    match state.catalog.create_manual_card(spec).await {
        Ok(card) => Ok((
            StatusCode::CREATED,
            Json(CardResponse {
                success: true,
                message: "Manual card created successfully".to_string(),
                data: card.into(),
            }),
        )),
        Err(e) => Err(card_error(&e)),
    }
}

/// List the active, unexpired manual cards.
pub async fn list_manual_cards(
    State(state): State<AppState>,
) -> Result<Json<CardsResponse>, (StatusCode, Json<StatusMessage>)> {
    match state.catalog.list_active_cards().await {
        Ok(cards) => {
            let data: Vec<ManualCardDto> = cards.into_iter().map(Into::into).collect();
            let count = data.len();
            Ok(Json(CardsResponse {
                success: true,
                data,
                count,
            }))
        }
        Err(e) => Err(card_error(&e)),
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastCard {
    pub phone: String,
    /// Formatted for display, two decimal places
    pub amount: String,
    pub time_ago: String,
    pub sport: String,
    pub is_manual: bool,
}

#[derive(Debug, Serialize)]
pub struct BroadcastResponse {
    pub success: bool,
    pub data: Vec<BroadcastCard>,
    pub count: usize,
}

/// List the active cards shaped for the winners ticker.
pub async fn broadcast_manual_cards(
    State(state): State<AppState>,
) -> Result<Json<BroadcastResponse>, (StatusCode, Json<StatusMessage>)> {
    match state.catalog.list_active_cards().await {
        Ok(cards) => {
            let data: Vec<BroadcastCard> = cards
                .into_iter()
                .map(|card| BroadcastCard {
                    phone: card.phone,
                    amount: format!("{:.2}", to_major_units(card.amount)),
                    time_ago: card.time_ago,
                    sport: card.sport,
                    is_manual: true,
                })
                .collect();
            let count = data.len();
            Ok(Json(BroadcastResponse {
                success: true,
                data,
                count,
            }))
        }
        Err(e) => Err(card_error(&e)),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCardPayload {
    #[serde(default)]
    pub phone: Option<String>,
    pub amount: Option<f64>,
    pub minute: Option<i32>,
    #[serde(default)]
    pub sport: Option<String>,
    pub duration: Option<i32>,
    pub is_active: Option<bool>,
}

/// Patch a manual card; duration or minute changes recompute the expiry
/// and display text.
pub async fn update_manual_card(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateCardPayload>,
) -> Result<Json<CardResponse>, (StatusCode, Json<StatusMessage>)> {
    let amount = match payload.amount {
        None => None,
        Some(major) => match to_minor_units(major) {
            Some(minor) => Some(minor),
            None => {
                return Err((
                    StatusCode::BAD_REQUEST,
                    Json(StatusMessage {
                        success: false,
                        message: "Amount must be a positive number".to_string(),
                    }),
                ));
            }
        },
    };
    let update = ManualCardUpdate {
        phone: payload.phone,
        amount,
        minute: payload.minute,
        sport: payload.sport,
        duration_mins: payload.duration,
        is_active: payload.is_active,
    };

    match state.catalog.update_card(id, update).await {
        Ok(card) => Ok(Json(CardResponse {
            success: true,
            message: "Manual card updated successfully".to_string(),
            data: card.into(),
        })),
        Err(e) => Err(card_error(&e)),
    }
}

/// Delete a manual card outright.
pub async fn delete_manual_card(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<StatusMessage>, (StatusCode, Json<StatusMessage>)> {
    match state.catalog.delete_card(id).await {
        Ok(()) => Ok(Json(StatusMessage {
            success: true,
            message: "Manual card deleted successfully".to_string(),
        })),
        Err(e) => Err(card_error(&e)),
    }
}

/// Take a manual card off the feed without deleting it.
pub async fn deactivate_manual_card(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<CardResponse>, (StatusCode, Json<StatusMessage>)> {
    match state.catalog.deactivate_card(id).await {
        Ok(card) => Ok(Json(CardResponse {
            success: true,
            message: "Manual card deactivated successfully".to_string(),
            data: card.into(),
        })),
        Err(e) => Err(card_error(&e)),
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupResponse {
    pub success: bool,
    pub message: String,
    pub modified_count: u64,
}

/// Deactivate every expired card in one sweep.
pub async fn cleanup_manual_cards(
    State(state): State<AppState>,
) -> Result<Json<CleanupResponse>, (StatusCode, Json<StatusMessage>)> {
    match state.catalog.cleanup_expired_cards().await {
        Ok(count) => Ok(Json(CleanupResponse {
            success: true,
            message: format!("Cleaned up {count} expired cards"),
            modified_count: count,
        })),
        Err(e) => Err(card_error(&e)),
    }
}

#[derive(Debug, Deserialize)]
pub struct UploadImagesPayload {
    #[serde(default)]
    pub images: Vec<String>,
}

/// Banner URLs in the single-document shape the home screen reads
#[derive(Debug, Serialize)]
pub struct BannersData {
    pub images: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct BannersResponse {
    pub message: String,
    pub data: BannersData,
}

/// Replace the banner set with the given URLs, in order.
///
/// # Errors
///
/// - `400 Bad Request`: `{"message": "Please upload at least one image."}`
pub async fn upload_banners(
    State(state): State<AppState>,
    Json(payload): Json<UploadImagesPayload>,
) -> Result<Json<BannersResponse>, (StatusCode, Json<MessageResponse>)> {
    match state.catalog.replace_banners(payload.images).await {
        Ok(banners) => Ok(Json(BannersResponse {
            message: "Images uploaded successfully!".to_string(),
            data: BannersData {
                images: banners.into_iter().map(|b| b.url).collect(),
            },
        })),
        Err(e) => Err(catalog_error(&e)),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadSingleImagePayload {
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub banner_index: Option<usize>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SingleBannerResponse {
    pub message: String,
    pub image_url: String,
    pub data: BannersData,
}

/// Replace one banner slot, keeping the others.
pub async fn upload_single_banner(
    State(state): State<AppState>,
    Json(payload): Json<UploadSingleImagePayload>,
) -> Result<Json<SingleBannerResponse>, (StatusCode, Json<MessageResponse>)> {
    let url = payload.image_url.trim().to_string();
    if url.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(MessageResponse {
                message: "Please upload an image.".to_string(),
            }),
        ));
    }

    let mut urls: Vec<String> = match state.catalog.list_banners().await {
        Ok(banners) => banners.into_iter().map(|b| b.url).collect(),
        Err(e) => return Err(catalog_error(&e)),
    };
    let index = payload.banner_index.unwrap_or(0);
    if index < urls.len() {
        urls[index] = url.clone();
    } else {
        urls.push(url.clone());
    }

    match state.catalog.replace_banners(urls).await {
        Ok(banners) => Ok(Json(SingleBannerResponse {
            message: "Banner image updated successfully!".to_string(),
            image_url: url,
            data: BannersData {
                images: banners.into_iter().map(|b| b.url).collect(),
            },
        })),
        Err(e) => Err(catalog_error(&e)),
    }
}

/// Fetch the banner set. An empty catalog is a 200 with an empty array,
/// not a 404.
pub async fn get_banners(
    State(state): State<AppState>,
) -> Result<Json<BannersResponse>, (StatusCode, Json<MessageResponse>)> {
    match state.catalog.list_banners().await {
        Ok(banners) => {
            let message = if banners.is_empty() {
                "No images found"
            } else {
                "Images retrieved successfully"
            };
            Ok(Json(BannersResponse {
                message: message.to_string(),
                data: BannersData {
                    images: banners.into_iter().map(|b| b.url).collect(),
                },
            }))
        }
        Err(e) => Err(catalog_error(&e)),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageUrlPayload {
    #[serde(default)]
    pub image_url: String,
}

/// Add avatars to the catalog. The body is a raw array of
/// `{"imageUrl": ...}` objects.
///
/// # Errors
///
/// - `400 Bad Request`: `{"message": "An array of image objects is required."}`
///   or `{"message": "Each image must have an \"imageUrl\"."}`
pub async fn add_profile_images(
    State(state): State<AppState>,
    Json(payload): Json<Vec<ImageUrlPayload>>,
) -> Result<(StatusCode, Json<Vec<ProfileImage>>), (StatusCode, Json<MessageResponse>)> {
    let urls: Vec<String> = payload.into_iter().map(|img| img.image_url).collect();

    match state.catalog.add_profile_images(urls).await {
        Ok(images) => Ok((StatusCode::CREATED, Json(images))),
        Err(e) => Err(catalog_error(&e)),
    }
}

/// List the avatar catalog, newest first.
pub async fn list_profile_images(
    State(state): State<AppState>,
) -> Result<Json<Vec<ProfileImage>>, (StatusCode, Json<MessageResponse>)> {
    match state.catalog.list_profile_images().await {
        Ok(images) => Ok(Json(images)),
        Err(e) => Err(catalog_error(&e)),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectImagePayload {
    pub image_id: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserImageResponse {
    pub message: String,
    pub user_image: UserImageView,
}

/// Set a user's avatar, replacing any previous pick.
///
/// # Errors
///
/// - `400 Bad Request`: `{"message": "imageId is required"}`
/// - `404 Not Found`: `{"message": "Image not found"}`
pub async fn select_user_image(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Json(payload): Json<SelectImagePayload>,
) -> Result<Json<UserImageResponse>, (StatusCode, Json<MessageResponse>)> {
    let Some(image_id) = payload.image_id else {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(MessageResponse {
                message: "imageId is required".to_string(),
            }),
        ));
    };

    match state.catalog.select_user_image(user_id, image_id).await {
        Ok(view) => Ok(Json(UserImageResponse {
            message: "User image updated".to_string(),
            user_image: view,
        })),
        Err(e) => Err(catalog_error(&e)),
    }
}

/// Fetch a user's selected avatar.
pub async fn get_user_image(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<UserImageView>, (StatusCode, Json<MessageResponse>)> {
    match state.catalog.get_user_image(user_id).await {
        Ok(view) => Ok(Json(view)),
        Err(e) => Err(catalog_error(&e)),
    }
}
