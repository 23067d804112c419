//! Wallet API handlers.
//!
//! Deposits, withdrawals, winnings, balance fetch, currency switch, and the
//! merged transaction history. Amounts cross the wire as decimal major
//! units and are converted to integer minor units at this boundary; the
//! library never sees floats.
//!
//! # Examples
//!
//! Deposit 50.00:
//! ```bash
//! curl -X POST http://localhost:8080/api/deposit \
//!   -H "Content-Type: application/json" \
//!   -d '{"userId": 1, "amount": 50.0, "currencyType": "GHS"}'
//! ```

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use betbook::wallet::{
    Balance, Currency, HistoryEntry, HistoryFilter, TxKind, TxStatus, WalletError, WithdrawMethod,
    Winning, to_major_units, to_minor_units,
};

use super::{AppState, MessageResponse};
use crate::{logging, metrics};

fn wallet_error(err: &WalletError) -> (StatusCode, Json<MessageResponse>) {
    let status = match err {
        WalletError::Database(_) | WalletError::BalanceOverflow => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        WalletError::BalanceNotFound(_) | WalletError::TransactionNotFound(_) => {
            StatusCode::NOT_FOUND
        }
        _ => StatusCode::BAD_REQUEST,
    };
    (
        status,
        Json(MessageResponse {
            message: err.client_message(),
        }),
    )
}

/// Balance row as clients expect it: decimal amount under a `currencyType`
/// key
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceDto {
    pub user_id: i64,
    pub amount: f64,
    pub currency_type: Currency,
}

impl From<Balance> for BalanceDto {
    fn from(balance: Balance) -> Self {
        Self {
            user_id: balance.user_id,
            amount: to_major_units(balance.amount),
            currency_type: balance.currency,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WinningDto {
    pub id: i64,
    pub user_id: i64,
    pub amount: f64,
    pub currency_type: Currency,
    pub status: TxStatus,
    pub created_at: DateTime<Utc>,
}

impl From<Winning> for WinningDto {
    fn from(winning: Winning) -> Self {
        Self {
            id: winning.id,
            user_id: winning.user_id,
            amount: to_major_units(winning.amount),
            currency_type: winning.currency,
            status: winning.status,
            created_at: winning.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HistoryEntryDto {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: TxKind,
    pub amount: f64,
    pub status: TxStatus,
    pub date: DateTime<Utc>,
}

impl From<HistoryEntry> for HistoryEntryDto {
    fn from(entry: HistoryEntry) -> Self {
        Self {
            id: entry.id,
            kind: entry.kind,
            amount: to_major_units(entry.amount),
            status: entry.status,
            date: entry.date,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositPayload {
    pub user_id: Option<i64>,
    pub amount: Option<f64>,
    #[serde(default)]
    pub currency_type: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BalanceChangeResponse {
    pub message: String,
    /// New balance in major units
    pub balance: f64,
}

/// Credit a user's wallet, creating the balance row on first deposit.
///
/// # Errors
///
/// - `400 Bad Request`: "Invalid deposit data" for a missing user id,
///   non-positive amount, or unknown currency code
pub async fn deposit(
    State(state): State<AppState>,
    Json(payload): Json<DepositPayload>,
) -> Result<Json<BalanceChangeResponse>, (StatusCode, Json<MessageResponse>)> {
    let invalid = (
        StatusCode::BAD_REQUEST,
        Json(MessageResponse {
            message: "Invalid deposit data".to_string(),
        }),
    );
    let (Some(user_id), Some(amount)) = (payload.user_id, payload.amount) else {
        return Err(invalid);
    };
    let Some(minor) = to_minor_units(amount).filter(|m| *m > 0) else {
        return Err(invalid);
    };
    let currency = match payload.currency_type.as_deref() {
        None | Some("") => None,
        Some(code) => match Currency::parse(code) {
            Some(currency) => Some(currency),
            None => return Err(invalid),
        },
    };

    match state.wallet.deposit(user_id, minor, currency).await {
        Ok((_, new_balance)) => {
            metrics::deposits_total();
            logging::log_wallet_operation("deposit", user_id, minor, new_balance);
            Ok(Json(BalanceChangeResponse {
                message: "Deposit successful".to_string(),
                balance: to_major_units(new_balance),
            }))
        }
        Err(e) => Err(wallet_error(&e)),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawPayload {
    pub user_id: Option<i64>,
    pub amount: Option<f64>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub currency_type: Option<String>,
}

/// Debit a user's wallet.
///
/// The debit is a single conditional update, so two concurrent withdrawals
/// can never overdraw the balance.
///
/// # Errors
///
/// - `400 Bad Request`: "Invalid withdrawal data" or "Insufficient balance"
/// - `404 Not Found`: No balance row for the user
pub async fn withdraw(
    State(state): State<AppState>,
    Json(payload): Json<WithdrawPayload>,
) -> Result<Json<BalanceChangeResponse>, (StatusCode, Json<MessageResponse>)> {
    let invalid = (
        StatusCode::BAD_REQUEST,
        Json(MessageResponse {
            message: "Invalid withdrawal data".to_string(),
        }),
    );
    let (Some(user_id), Some(amount)) = (payload.user_id, payload.amount) else {
        return Err(invalid);
    };
    let Some(minor) = to_minor_units(amount).filter(|m| *m > 0) else {
        return Err(invalid);
    };
    let method = match payload.method.as_deref() {
        None | Some("") => WithdrawMethod::MobileMoney,
        Some(name) => match WithdrawMethod::parse(name) {
            Some(method) => method,
            None => return Err(invalid),
        },
    };
    let currency = match payload.currency_type.as_deref() {
        None | Some("") => None,
        Some(code) => match Currency::parse(code) {
            Some(currency) => Some(currency),
            None => return Err(invalid),
        },
    };

    match state.wallet.withdraw(user_id, minor, method, currency).await {
        Ok((_, new_balance)) => {
            metrics::withdrawals_total();
            logging::log_wallet_operation("withdraw", user_id, minor, new_balance);
            Ok(Json(BalanceChangeResponse {
                message: "Withdrawal successful".to_string(),
                balance: to_major_units(new_balance),
            }))
        }
        Err(e) => Err(wallet_error(&e)),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WinningPayload {
    pub user_id: Option<i64>,
    pub amount: Option<f64>,
    #[serde(default)]
    pub currency_type: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct WinningResponse {
    pub message: String,
    pub deposit: BalanceDto,
    pub winning: WinningDto,
}

/// Credit a winning payout and return both the winning record and the
/// updated balance row.
pub async fn winning(
    State(state): State<AppState>,
    Json(payload): Json<WinningPayload>,
) -> Result<Json<WinningResponse>, (StatusCode, Json<MessageResponse>)> {
    let invalid = (
        StatusCode::BAD_REQUEST,
        Json(MessageResponse {
            message: "Invalid winning data".to_string(),
        }),
    );
    let (Some(user_id), Some(amount)) = (payload.user_id, payload.amount) else {
        return Err(invalid);
    };
    let Some(minor) = to_minor_units(amount).filter(|m| *m > 0) else {
        return Err(invalid);
    };
    let currency = match payload.currency_type.as_deref() {
        None | Some("") => None,
        Some(code) => match Currency::parse(code) {
            Some(currency) => Some(currency),
            None => return Err(invalid),
        },
    };

    let (winning, new_balance) = match state
        .wallet
        .record_winning(user_id, minor, currency)
        .await
    {
        Ok(pair) => pair,
        Err(e) => return Err(wallet_error(&e)),
    };
    metrics::winnings_total();
    logging::log_wallet_operation("winning", user_id, minor, new_balance);

    let balance = match state.wallet.get_balance(user_id).await {
        Ok(balance) => balance,
        Err(e) => return Err(wallet_error(&e)),
    };

    Ok(Json(WinningResponse {
        message: "Winning processed successfully".to_string(),
        deposit: balance.into(),
        winning: winning.into(),
    }))
}

#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    pub balance: BalanceDto,
}

/// Fetch a user's balance row.
///
/// The route keeps the historical `/deposite/` spelling the deployed
/// clients call.
pub async fn get_balance(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<BalanceResponse>, (StatusCode, Json<MessageResponse>)> {
    match state.wallet.get_balance(user_id).await {
        Ok(balance) => Ok(Json(BalanceResponse {
            balance: balance.into(),
        })),
        Err(e) => Err(wallet_error(&e)),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCurrencyPayload {
    pub user_id: Option<i64>,
    #[serde(default)]
    pub currency_type: String,
}

#[derive(Debug, Serialize)]
pub struct UpdateCurrencyResponse {
    pub message: String,
    pub deposit: BalanceDto,
}

/// Switch the display currency on a user's balance row; the stored amount
/// is not converted.
pub async fn update_currency(
    State(state): State<AppState>,
    Json(payload): Json<UpdateCurrencyPayload>,
) -> Result<Json<UpdateCurrencyResponse>, (StatusCode, Json<MessageResponse>)> {
    let invalid = (
        StatusCode::BAD_REQUEST,
        Json(MessageResponse {
            message: "Invalid request data".to_string(),
        }),
    );
    let Some(user_id) = payload.user_id else {
        return Err(invalid);
    };
    let Some(currency) = Currency::parse(&payload.currency_type) else {
        return Err(invalid);
    };

    match state.wallet.update_currency(user_id, currency).await {
        Ok(balance) => Ok(Json(UpdateCurrencyResponse {
            message: "Currency updated successfully".to_string(),
            deposit: balance.into(),
        })),
        Err(WalletError::BalanceNotFound(_)) => Err((
            StatusCode::NOT_FOUND,
            Json(MessageResponse {
                message: "Deposit record not found".to_string(),
            }),
        )),
        Err(e) => Err(wallet_error(&e)),
    }
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub history: Vec<HistoryEntryDto>,
}

fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// Merged transaction history for a user, newest first.
///
/// Accepts `from`/`to` date bounds and a `type` filter
/// (deposit/withdraw/winning/bet). An unrecognized `type` matches nothing.
pub async fn history(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<HistoryResponse>, (StatusCode, Json<MessageResponse>)> {
    let kind = match query.kind.as_deref() {
        None | Some("") => None,
        Some(name) => match TxKind::parse(name) {
            Some(kind) => Some(kind),
            None => return Ok(Json(HistoryResponse { history: vec![] })),
        },
    };
    let filter = HistoryFilter {
        from: query.from.as_deref().and_then(parse_date),
        to: query.to.as_deref().and_then(parse_date),
        kind,
    };

    match state.wallet.history(user_id, &filter).await {
        Ok(entries) => Ok(Json(HistoryResponse {
            history: entries.into_iter().map(Into::into).collect(),
        })),
        Err(e) => Err(wallet_error(&e)),
    }
}

/// Remove a history record (admin). Bet stake entries live on their bets
/// and cannot be deleted here.
pub async fn delete_transaction(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, i64)>,
) -> Result<Json<MessageResponse>, (StatusCode, Json<MessageResponse>)> {
    let Some(kind) = TxKind::parse(&kind) else {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(MessageResponse {
                message: "Invalid transaction type".to_string(),
            }),
        ));
    };

    match state.wallet.delete_transaction(kind, id).await {
        Ok(()) => Ok(Json(MessageResponse {
            message: "Transaction deleted successfully".to_string(),
        })),
        Err(e) => Err(wallet_error(&e)),
    }
}
