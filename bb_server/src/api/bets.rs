//! Bet ticket API handlers.
//!
//! Ticket placement (fresh slips, booked slips, and copies of existing
//! tickets), listings, stake/odd/booking-code edits, deletion with refund,
//! multibet leg CRUD, verify codes, cash-out offers and posted odds.
//!
//! Stakes and cash-out amounts cross the wire in major units; every mutation
//! that touches the balance runs inside one library transaction.
//!
//! # Examples
//!
//! Place a 40.00 single:
//! ```bash
//! curl -X POST http://localhost:8080/api/bets \
//!   -H "Content-Type: application/json" \
//!   -d '{"userId": 1, "date": "22/08, 19:45", "betCode": "A1B2C3", "stake": 40.0, "odd": 2.35}'
//! ```

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use betbook::bets::{
    Bet, BetError, BetLeg, Cashout, CashoutStatus, LegSpec, LegUpdate, OddQuote, TicketUpdate,
    VerifyCode,
};
use betbook::wallet::{WalletError, to_major_units, to_minor_units};

use super::{AppState, MessageResponse};
use crate::metrics;

fn bet_error(err: &BetError) -> (StatusCode, Json<MessageResponse>) {
    let status = match err {
        BetError::Database(_)
        | BetError::Wallet(WalletError::Database(_) | WalletError::BalanceOverflow) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        BetError::BetNotFound
        | BetError::LegNotFound
        | BetError::NoBetsForUser
        | BetError::BookingNotFound
        | BetError::VerifyCodeNotFound
        | BetError::CashoutNotFound
        | BetError::OddQuoteNotFound
        | BetError::DepositRecordNotFound
        | BetError::Wallet(WalletError::BalanceNotFound(_)) => StatusCode::NOT_FOUND,
        _ => StatusCode::BAD_REQUEST,
    };
    (
        status,
        Json(MessageResponse {
            message: err.client_message(),
        }),
    )
}

/// Ticket as clients expect it: decimal stake, `timestamp` key for the
/// placement time
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BetDto {
    pub id: i64,
    pub user_id: i64,
    pub bet_code: String,
    pub date: String,
    pub stake: f64,
    pub odd: f64,
    pub booking_code: String,
    pub percentage: f64,
    #[serde(rename = "timestamp")]
    pub placed_at: DateTime<Utc>,
}

impl From<Bet> for BetDto {
    fn from(bet: Bet) -> Self {
        Self {
            id: bet.id,
            user_id: bet.user_id,
            bet_code: bet.bet_code,
            date: bet.date,
            stake: to_major_units(bet.stake),
            odd: bet.odd,
            booking_code: bet.booking_code,
            percentage: bet.percentage,
            placed_at: bet.placed_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CashoutDto {
    pub bet_id: i64,
    pub amount: f64,
    #[serde(rename = "cashStatus")]
    pub status: CashoutStatus,
    pub updated_at: DateTime<Utc>,
}

impl From<Cashout> for CashoutDto {
    fn from(cashout: Cashout) -> Self {
        Self {
            bet_id: cashout.bet_id,
            amount: to_major_units(cashout.amount),
            status: cashout.status,
            updated_at: cashout.updated_at,
        }
    }
}

/// List every ticket (admin dashboards).
pub async fn list_bets(
    State(state): State<AppState>,
) -> Result<Json<Vec<BetDto>>, (StatusCode, Json<MessageResponse>)> {
    match state.bets.list_bets().await {
        Ok(bets) => Ok(Json(bets.into_iter().map(Into::into).collect())),
        Err(e) => Err(bet_error(&e)),
    }
}

/// List one user's tickets, newest first.
pub async fn bets_for_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<Vec<BetDto>>, (StatusCode, Json<MessageResponse>)> {
    match state.bets.bets_for_user(user_id).await {
        Ok(bets) => Ok(Json(bets.into_iter().map(Into::into).collect())),
        Err(e) => Err(bet_error(&e)),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBetPayload {
    pub user_id: Option<i64>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub bet_code: Option<String>,
    pub stake: Option<f64>,
    pub odd: Option<f64>,
}

/// Place a fresh ticket; the stake is debited atomically.
///
/// # Errors
///
/// - `400 Bad Request`: "All fields are required", "Invalid stake value",
///   "Invalid date format. Expected DD/MM, HH:mm", or
///   "Insufficient balance"
pub async fn create_bet(
    State(state): State<AppState>,
    Json(payload): Json<CreateBetPayload>,
) -> Result<(StatusCode, Json<BetDto>), (StatusCode, Json<MessageResponse>)> {
    let (Some(user_id), Some(date), Some(bet_code), Some(stake), Some(odd)) = (
        payload.user_id,
        payload.date,
        payload.bet_code,
        payload.stake,
        payload.odd,
    ) else {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(MessageResponse {
                message: "All fields are required".to_string(),
            }),
        ));
    };
    let Some(minor) = to_minor_units(stake).filter(|m| *m > 0) else {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(MessageResponse {
                message: "Invalid stake value".to_string(),
            }),
        ));
    };

    match state
        .bets
        .place_bet(user_id, &date, minor, Some(odd), Some(bet_code), None, vec![])
        .await
    {
        Ok(placed) => {
            metrics::bets_placed_total();
            metrics::stake_minor_units(minor);
            Ok((StatusCode::CREATED, Json(placed.bet.into())))
        }
        // No balance row reads the same as an empty one here
        Err(BetError::Wallet(WalletError::BalanceNotFound(_))) => Err((
            StatusCode::BAD_REQUEST,
            Json(MessageResponse {
                message: "Insufficient balance".to_string(),
            }),
        )),
        Err(e) => Err(bet_error(&e)),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookedBetPayload {
    pub user_id: Option<i64>,
    #[serde(default)]
    pub date: Option<String>,
    pub stake: Option<f64>,
    pub odd: Option<f64>,
    #[serde(default)]
    pub booking_code: Option<String>,
}

/// Place a ticket from a booked slip; the booking code is recorded and the
/// stake is debited the same way as a fresh ticket.
pub async fn create_booked_bet(
    State(state): State<AppState>,
    Json(payload): Json<CreateBookedBetPayload>,
) -> Result<(StatusCode, Json<BetDto>), (StatusCode, Json<MessageResponse>)> {
    let (Some(user_id), Some(date), Some(stake), Some(odd), Some(booking_code)) = (
        payload.user_id,
        payload.date,
        payload.stake,
        payload.odd,
        payload.booking_code,
    ) else {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(MessageResponse {
                message: "All fields are required".to_string(),
            }),
        ));
    };
    let Some(minor) = to_minor_units(stake).filter(|m| *m > 0) else {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(MessageResponse {
                message: "Invalid stake value".to_string(),
            }),
        ));
    };

    match state
        .bets
        .place_bet(
            user_id,
            &date,
            minor,
            Some(odd),
            None,
            Some(booking_code),
            vec![],
        )
        .await
    {
        Ok(placed) => {
            metrics::bets_placed_total();
            metrics::stake_minor_units(minor);
            Ok((StatusCode::CREATED, Json(placed.bet.into())))
        }
        Err(BetError::Wallet(WalletError::BalanceNotFound(_))) => Err((
            StatusCode::BAD_REQUEST,
            Json(MessageResponse {
                message: "Insufficient balance".to_string(),
            }),
        )),
        Err(e) => Err(bet_error(&e)),
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateOddPayload {
    pub odd: Option<f64>,
}

/// Replace a ticket's odd; any verify code on the ticket is dropped so the
/// old code cannot vouch for the new odd.
pub async fn update_bet_odd(
    State(state): State<AppState>,
    Path(bet_id): Path<i64>,
    Json(payload): Json<UpdateOddPayload>,
) -> Result<Json<BetDto>, (StatusCode, Json<MessageResponse>)> {
    let Some(odd) = payload.odd.filter(|o| o.is_finite() && *o > 0.0) else {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(MessageResponse {
                message: "Invalid odd value".to_string(),
            }),
        ));
    };

    match state.bets.update_odd(bet_id, odd).await {
        Ok(bet) => Ok(Json(bet.into())),
        Err(e) => Err(bet_error(&e)),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketUpdatePayload {
    #[serde(default)]
    pub bet_code: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    pub stake: Option<f64>,
    pub percentage: Option<f64>,
}

/// Fetch a ticket by id.
pub async fn get_bet(
    State(state): State<AppState>,
    Path(bet_id): Path<i64>,
) -> Result<Json<BetDto>, (StatusCode, Json<MessageResponse>)> {
    match state.bets.get_bet(bet_id).await {
        Ok(bet) => Ok(Json(bet.into())),
        Err(e) => Err(bet_error(&e)),
    }
}

/// Edit a ticket's code, display date, stake, or win percentage.
///
/// A stake change settles the difference against the owner's balance:
/// an increase debits it (and fails without mutation if short), a decrease
/// refunds it.
pub async fn update_ticket(
    State(state): State<AppState>,
    Path(bet_id): Path<i64>,
    Json(payload): Json<TicketUpdatePayload>,
) -> Result<Json<BetDto>, (StatusCode, Json<MessageResponse>)> {
    let stake = match payload.stake {
        None => None,
        Some(major) => match to_minor_units(major).filter(|m| *m > 0) {
            Some(minor) => Some(minor),
            None => {
                return Err((
                    StatusCode::BAD_REQUEST,
                    Json(MessageResponse {
                        message: "Invalid stake value".to_string(),
                    }),
                ));
            }
        },
    };
    let update = TicketUpdate {
        bet_code: payload.bet_code,
        date: payload.date,
        stake,
        percentage: payload.percentage,
    };

    match state.bets.update_ticket(bet_id, update).await {
        Ok(bet) => Ok(Json(bet.into())),
        Err(e) => Err(bet_error(&e)),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingCodePayload {
    #[serde(default)]
    pub booking_code: String,
}

/// Replace a ticket's booking code.
pub async fn update_booking_code(
    State(state): State<AppState>,
    Path(bet_id): Path<i64>,
    Json(payload): Json<BookingCodePayload>,
) -> Result<Json<BetDto>, (StatusCode, Json<MessageResponse>)> {
    match state
        .bets
        .update_booking_code(bet_id, &payload.booking_code)
        .await
    {
        Ok(bet) => Ok(Json(bet.into())),
        Err(e) => Err(bet_error(&e)),
    }
}

/// Delete a ticket, refunding its stake and removing its legs and side
/// records.
pub async fn delete_bet(
    State(state): State<AppState>,
    Path(bet_id): Path<i64>,
) -> Result<Json<MessageResponse>, (StatusCode, Json<MessageResponse>)> {
    match state.bets.delete_bet(bet_id).await {
        Ok(_) => {
            metrics::bets_deleted_total();
            Ok(Json(MessageResponse {
                message: "Bet and related matches deleted successfully".to_string(),
            }))
        }
        Err(e) => Err(bet_error(&e)),
    }
}

/// Delete every ticket a user owns, legs included. No refunds here; this
/// is the admin cleanup path.
pub async fn delete_all_bets(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<MessageResponse>, (StatusCode, Json<MessageResponse>)> {
    match state.bets.delete_all_bets(user_id).await {
        Ok(_) => Ok(Json(MessageResponse {
            message: format!(
                "All bets and related matches for user {user_id} deleted successfully."
            ),
        })),
        Err(e) => Err(bet_error(&e)),
    }
}

/// Look a ticket up by its booking code.
pub async fn find_by_booking_code(
    State(state): State<AppState>,
    Path(booking_code): Path<String>,
) -> Result<Json<BetDto>, (StatusCode, Json<MessageResponse>)> {
    match state.bets.find_by_booking_code(&booking_code).await {
        Ok(bet) => Ok(Json(bet.into())),
        Err(e) => Err(bet_error(&e)),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceExistingPayload {
    pub bet_id: Option<i64>,
    pub stake: Option<f64>,
    pub user_id: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct PlaceExistingResponse {
    pub message: String,
    pub bet: BetDto,
}

/// Place a ticket from an existing one.
///
/// The owner re-placing their own ticket gets a stake update; anyone else
/// gets a copy under a fresh code, legs included. Either way the stake is
/// debited from the caller's balance.
pub async fn place_existing(
    State(state): State<AppState>,
    Json(payload): Json<PlaceExistingPayload>,
) -> Result<Json<PlaceExistingResponse>, (StatusCode, Json<MessageResponse>)> {
    let invalid = (
        StatusCode::BAD_REQUEST,
        Json(MessageResponse {
            message: "Invalid input".to_string(),
        }),
    );
    let (Some(bet_id), Some(stake), Some(user_id)) =
        (payload.bet_id, payload.stake, payload.user_id)
    else {
        return Err(invalid);
    };
    let Some(minor) = to_minor_units(stake).filter(|m| *m > 0) else {
        return Err(invalid);
    };

    match state.bets.place_from_existing(bet_id, user_id, minor).await {
        Ok((bet, copied)) => {
            metrics::bets_placed_total();
            metrics::stake_minor_units(minor);
            let message = if copied {
                "Bet copied and placed successfully in your account. Matches added."
            } else {
                "Bet placed successfully. Matches updated."
            };
            Ok(Json(PlaceExistingResponse {
                message: message.to_string(),
                bet: bet.into(),
            }))
        }
        Err(BetError::Wallet(WalletError::BalanceNotFound(_))) => Err((
            StatusCode::BAD_REQUEST,
            Json(MessageResponse {
                message: "Insufficient balance".to_string(),
            }),
        )),
        Err(e) => Err(bet_error(&e)),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddLegsPayload {
    /// Ticket id; the historical key name is kept for the deployed clients
    pub user_id: Option<i64>,
    #[serde(default)]
    pub text: Vec<LegSpec>,
    /// Owning user for per-user leg listings
    #[serde(default, rename = "userId1")]
    pub owner_id: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct AddLegsResponse {
    pub message: String,
    pub bets: Vec<BetLeg>,
}

/// Attach a slip of legs to a ticket. The ticket's cash-out record is
/// reset in the same transaction.
pub async fn add_legs(
    State(state): State<AppState>,
    Json(payload): Json<AddLegsPayload>,
) -> Result<Json<AddLegsResponse>, (StatusCode, Json<MessageResponse>)> {
    let Some(bet_id) = payload.user_id else {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(MessageResponse {
                message: "User ID is required".to_string(),
            }),
        ));
    };

    match state
        .bets
        .add_legs(bet_id, payload.owner_id, payload.text)
        .await
    {
        Ok(legs) => {
            metrics::bet_legs_total(legs.len() as u64);
            Ok(Json(AddLegsResponse {
                message: "Bets stored successfully".to_string(),
                bets: legs,
            }))
        }
        Err(e) => Err(bet_error(&e)),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddMatchPayload {
    /// Ticket id, as the clients send it
    pub user_id: Option<i64>,
    #[serde(default)]
    pub game_id: Option<String>,
    #[serde(default)]
    pub date_time: Option<String>,
    #[serde(default)]
    pub teams: Option<String>,
    #[serde(default, rename = "userId1")]
    pub owner_id: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct AddMatchResponse {
    pub message: String,
    pub r#match: BetLeg,
}

/// Add a single leg to a ticket.
pub async fn add_match(
    State(state): State<AppState>,
    Json(payload): Json<AddMatchPayload>,
) -> Result<(StatusCode, Json<AddMatchResponse>), (StatusCode, Json<MessageResponse>)> {
    let (Some(bet_id), Some(game_id), Some(date_time), Some(teams)) = (
        payload.user_id,
        payload.game_id,
        payload.date_time,
        payload.teams,
    ) else {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(MessageResponse {
                message: "All fields are required".to_string(),
            }),
        ));
    };

    let spec = LegSpec {
        game_id: Some(game_id),
        kickoff: Some(date_time),
        teams: Some(teams),
        ..Default::default()
    };

    match state.bets.add_leg(bet_id, payload.owner_id, spec).await {
        Ok(leg) => {
            metrics::bet_legs_total(1);
            Ok((
                StatusCode::CREATED,
                Json(AddMatchResponse {
                    message: "Match added successfully".to_string(),
                    r#match: leg,
                }),
            ))
        }
        Err(e) => Err(bet_error(&e)),
    }
}

/// List a ticket's legs.
pub async fn legs_for_bet(
    State(state): State<AppState>,
    Path(bet_id): Path<i64>,
) -> Result<Json<Vec<BetLeg>>, (StatusCode, Json<MessageResponse>)> {
    match state.bets.legs_for_bet(bet_id).await {
        Ok(legs) if legs.is_empty() => Err((
            StatusCode::NOT_FOUND,
            Json(MessageResponse {
                message: "No bets found for this user.".to_string(),
            }),
        )),
        Ok(legs) => Ok(Json(legs)),
        Err(e) => Err(bet_error(&e)),
    }
}

/// List every leg owned by a user, across tickets.
pub async fn legs_for_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<Vec<BetLeg>>, (StatusCode, Json<MessageResponse>)> {
    match state.bets.legs_for_user(user_id).await {
        Ok(legs) if legs.is_empty() => Err((
            StatusCode::NOT_FOUND,
            Json(MessageResponse {
                message: "No bets found for this user.".to_string(),
            }),
        )),
        Ok(legs) => Ok(Json(legs)),
        Err(e) => Err(bet_error(&e)),
    }
}

/// Patch a leg's result fields; absent fields keep their values.
pub async fn update_leg(
    State(state): State<AppState>,
    Path(leg_id): Path<i64>,
    Json(update): Json<LegUpdate>,
) -> Result<Json<BetLeg>, (StatusCode, Json<MessageResponse>)> {
    match state.bets.update_leg(leg_id, update).await {
        Ok(leg) => Ok(Json(leg)),
        Err(BetError::LegNotFound) => Err((
            StatusCode::NOT_FOUND,
            Json(MessageResponse {
                message: "Bet not found.".to_string(),
            }),
        )),
        Err(e) => Err(bet_error(&e)),
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatedLegResponse {
    pub message: String,
    pub updated_bet: BetLeg,
}

/// Patch a leg and wrap the result in a message, for the fixture/chat/live
/// odd client paths.
pub async fn update_leg_with_message(
    State(state): State<AppState>,
    Path(leg_id): Path<i64>,
    Json(update): Json<LegUpdate>,
) -> Result<Json<UpdatedLegResponse>, (StatusCode, Json<MessageResponse>)> {
    match state.bets.update_leg(leg_id, update).await {
        Ok(leg) => Ok(Json(UpdatedLegResponse {
            message: "Bet updated successfully".to_string(),
            updated_bet: leg,
        })),
        Err(BetError::LegNotFound) => Err((
            StatusCode::NOT_FOUND,
            Json(MessageResponse {
                message: "Bet not found.".to_string(),
            }),
        )),
        Err(e) => Err(bet_error(&e)),
    }
}

/// Fetch a ticket's verify code.
///
/// A ticket without one answers 200 with a "No Code Found" marker, which is
/// what the deployed clients key off.
pub async fn get_verify_code(
    State(state): State<AppState>,
    Path(bet_id): Path<i64>,
) -> Result<Json<Value>, (StatusCode, Json<MessageResponse>)> {
    match state.bets.get_verify_code(bet_id).await {
        Ok(Some(code)) => Ok(Json(json!(code))),
        Ok(None) => Ok(Json(json!({ "verifyCode": "No Code Found" }))),
        Err(e) => Err(bet_error(&e)),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyCodePayload {
    #[serde(default)]
    pub verify_code: String,
}

#[derive(Debug, Serialize)]
pub struct VerifyCodeResponse {
    pub message: String,
    #[serde(flatten)]
    pub code: VerifyCode,
}

/// Attach a verify code to a ticket, or re-point an existing code.
pub async fn upsert_verify_code(
    State(state): State<AppState>,
    Path(bet_id): Path<i64>,
    Json(payload): Json<VerifyCodePayload>,
) -> Result<Json<VerifyCodeResponse>, (StatusCode, Json<MessageResponse>)> {
    match state
        .bets
        .upsert_verify_code(bet_id, &payload.verify_code)
        .await
    {
        Ok((code, created)) => {
            let message = if created {
                "New Verify Code added"
            } else {
                "Verify Code updated successfully"
            };
            Ok(Json(VerifyCodeResponse {
                message: message.to_string(),
                code,
            }))
        }
        Err(e) => Err(bet_error(&e)),
    }
}

#[derive(Debug, Serialize)]
pub struct VerifiedBetResponse {
    pub r#match: BetDto,
}

/// Resolve a verify code to its ticket; codes lapse 24 hours after issue.
pub async fn find_by_verify_code(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<VerifiedBetResponse>, (StatusCode, Json<MessageResponse>)> {
    match state.bets.find_bet_by_verify_code(&code).await {
        Ok(bet) => Ok(Json(VerifiedBetResponse { r#match: bet.into() })),
        Err(e) => Err(bet_error(&e)),
    }
}

#[derive(Debug, Serialize)]
pub struct CashoutResponse {
    pub success: bool,
    pub bet: CashoutDto,
}

#[derive(Debug, Serialize)]
pub struct CashoutsResponse {
    pub success: bool,
    pub bet: Vec<CashoutDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashoutPayload {
    #[serde(default, rename = "cashStatus")]
    pub status: Option<String>,
    pub amount: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct CashoutUpsertResponse {
    pub success: bool,
    pub message: String,
    pub bet: CashoutDto,
}

/// Fetch a ticket's cash-out offer.
pub async fn get_cashout(
    State(state): State<AppState>,
    Path(bet_id): Path<i64>,
) -> Result<Json<CashoutResponse>, (StatusCode, Json<MessageResponse>)> {
    match state.bets.get_cashout(bet_id).await {
        Ok(cashout) => Ok(Json(CashoutResponse {
            success: true,
            bet: cashout.into(),
        })),
        Err(e) => Err(bet_error(&e)),
    }
}

/// List every cash-out offer.
pub async fn list_cashouts(
    State(state): State<AppState>,
) -> Result<Json<CashoutsResponse>, (StatusCode, Json<MessageResponse>)> {
    match state.bets.list_cashouts().await {
        Ok(cashouts) => Ok(Json(CashoutsResponse {
            success: true,
            bet: cashouts.into_iter().map(Into::into).collect(),
        })),
        Err(e) => Err(bet_error(&e)),
    }
}

/// Create or update a ticket's cash-out offer.
pub async fn upsert_cashout(
    State(state): State<AppState>,
    Path(bet_id): Path<i64>,
    Json(payload): Json<CashoutPayload>,
) -> Result<Json<CashoutUpsertResponse>, (StatusCode, Json<MessageResponse>)> {
    let amount = match payload.amount {
        None => None,
        Some(major) => match to_minor_units(major).filter(|m| *m >= 0) {
            Some(minor) => Some(minor),
            None => {
                return Err((
                    StatusCode::BAD_REQUEST,
                    Json(MessageResponse {
                        message: "Invalid amount".to_string(),
                    }),
                ));
            }
        },
    };
    let status = payload.status.as_deref().map(CashoutStatus::parse);

    match state.bets.upsert_cashout(bet_id, amount, status).await {
        Ok((cashout, created)) => {
            let message = if created {
                "record added"
            } else {
                "Cashout status updated"
            };
            Ok(Json(CashoutUpsertResponse {
                success: true,
                message: message.to_string(),
                bet: cashout.into(),
            }))
        }
        Err(e) => Err(bet_error(&e)),
    }
}

/// Fetch the posted odd for a ticket.
pub async fn get_odd_quote(
    State(state): State<AppState>,
    Path(bet_id): Path<i64>,
) -> Result<Json<OddQuote>, (StatusCode, Json<MessageResponse>)> {
    match state.bets.get_odd_quote(bet_id).await {
        Ok(quote) => Ok(Json(quote)),
        Err(e) => Err(bet_error(&e)),
    }
}

#[derive(Debug, Deserialize)]
pub struct OddQuotePayload {
    pub odd: Option<f64>,
}

/// Post or update the odd for a ticket.
pub async fn upsert_odd_quote(
    State(state): State<AppState>,
    Path(bet_id): Path<i64>,
    Json(payload): Json<OddQuotePayload>,
) -> Result<Json<Value>, (StatusCode, Json<MessageResponse>)> {
    let Some(odd) = payload.odd else {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(MessageResponse {
                message: "Odd value is required".to_string(),
            }),
        ));
    };

    match state.bets.upsert_odd_quote(bet_id, odd).await {
        Ok((quote, true)) => Ok(Json(json!({
            "message": "New odd value added",
            "newOdd": quote,
        }))),
        Ok((quote, false)) => Ok(Json(json!({
            "message": "Odd value updated successfully",
            "updatedOdd": quote,
        }))),
        Err(e) => Err(bet_error(&e)),
    }
}
