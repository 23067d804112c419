//! HTTP API for the betting companion server.
//!
//! This module provides the complete REST API the mobile clients and the
//! admin panel talk to: accounts and sessions, the wallet, bet tickets with
//! their multibet legs, the content catalog, feature add-ons and push
//! notification bookkeeping.
//!
//! # Architecture
//!
//! The API is built with:
//! - **Axum**: Async web framework for HTTP
//! - **Tower**: Middleware for CORS and request correlation
//! - **JWT**: Bearer tokens with single-session enforcement
//! - **sqlx/Postgres**: All state lives in the database; handlers stay
//!   stateless apart from the OTP rate limiter
//!
//! # Modules
//!
//! - [`auth`]: Registration, login, OTP, profile, devices, password change
//!   requests, account lifecycle, admin user management
//! - [`wallet`]: Deposits, withdrawals, winnings, currency and history
//! - [`bets`]: Tickets, multibet legs, verify codes, cash-outs, posted odds
//! - [`catalog`]: Feed matches, top matches, manual cards, banners, avatars
//! - [`addons`]: Feature add-on catalog and per-user purchases
//! - [`notify`]: Push tokens and notification balances
//! - [`middleware`]: Bearer authentication and the admin gate
//!
//! # Endpoints Overview
//!
//! ## Accounts (public)
//! - `POST /api/register` - Create account
//! - `POST /api/login` - Login with email/username/mobile + password
//! - `POST /api/send-otp` / `POST /api/verify-otp` - One-time codes
//! - `POST /api/admin/login` - Admin login
//! - `POST /api/account/reactivate` - Reactivate with credentials
//!
//! ## Accounts (Bearer token)
//! - `GET /api/user/profile` - Own profile
//! - `POST/GET /api/devices`, `PUT /api/devices/{deviceId}/deactivate`
//! - `POST /api/password-change` - File a password change request
//! - `POST /api/account/deactivate` - Freeze own account
//!
//! ## Admin (Bearer token, role=admin)
//! - `/api/admin/getAllUsers`, `/api/admin/getAllUsersByStatus`,
//!   `/api/admin/getExpiredUsers`, user hold/activate/delete
//! - `/api/admin/password-requests` list/approve/reject
//! - `DELETE /api/admin/transaction/{txType}/{id}`
//!
//! ## Wallet, bets, catalog, add-ons, notify
//! - Trusted-by-userId resource routes; see the module docs for the full
//!   path list. Amounts cross the wire in major currency units.
//!
//! ## Health Check
//! - `GET /health` - DB ping, version, timestamp
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use bb_server::api::{AppState, create_router};
//! use bb_server::api::rate_limiter::KeyedRateLimiter;
//! use std::sync::Arc;
//! use std::time::Duration;
//! # use betbook::db::PgUserAdminRepository;
//! # use betbook::{AddonManager, AuthManager, BetManager, CatalogManager, NotifyManager, WalletManager};
//! # use sqlx::PgPool;
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! # let pool: PgPool = unimplemented!();
//! let pool = Arc::new(pool);
//! let wallet = WalletManager::new(pool.clone());
//!
//! let state = AppState {
//!     auth: AuthManager::new(pool.clone(), "pepper".into(), "secret".into()),
//!     wallet: wallet.clone(),
//!     bets: BetManager::new(pool.clone(), wallet),
//!     catalog: CatalogManager::new(pool.clone()),
//!     addons: AddonManager::new(pool.clone()),
//!     notify: NotifyManager::new(pool.clone()),
//!     users: Arc::new(PgUserAdminRepository::new(pool.as_ref().clone())),
//!     otp_limiter: Arc::new(tokio::sync::Mutex::new(KeyedRateLimiter::new(
//!         5,
//!         Duration::from_secs(300),
//!     ))),
//!     pool,
//! };
//!
//! let app = create_router(state);
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Security
//!
//! - Bearer tokens expire after 7 days and are displaced by each new login
//! - Passwords are hashed with peppered Argon2id before storage
//! - OTP issuance is rate limited per mobile number
//! - Admin mutations require a session whose account has role admin
//!
//! # CORS
//!
//! CORS is configured permissively for development. In production, configure
//! appropriate origins, methods, and headers.

pub mod addons;
pub mod auth;
pub mod bets;
pub mod catalog;
pub mod middleware;
pub mod notify;
pub mod rate_limiter;
pub mod request_id;
pub mod wallet;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{delete, get, patch, post, put},
};
use betbook::db::UserAdminRepository;
use betbook::{
    AddonManager, AuthManager, BetManager, CatalogManager, NotifyManager, WalletManager,
};
use serde::Serialize;
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;

use rate_limiter::KeyedRateLimiter;

/// The `{"message": ...}` body every failure answers with
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Message with a success flag, for the endpoints whose clients check it
#[derive(Debug, Serialize)]
pub struct StatusMessage {
    pub success: bool,
    pub message: String,
}

/// Application state shared across all HTTP handlers.
///
/// Cloned per request; every field is an Arc or an Arc-backed manager.
///
/// # Fields
///
/// - `auth`: Sessions, OTP, devices, account lifecycle
/// - `wallet`: Balances and the transaction ledger
/// - `bets`: Tickets, legs and their side records
/// - `catalog`: Display content
/// - `addons`: Feature add-ons
/// - `notify`: Push tokens and notification balances
/// - `users`: Admin user listing/mutation repository
/// - `otp_limiter`: Sliding-window limit on OTP issuance per mobile number
/// - `pool`: Database pool for the health check
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthManager,
    pub wallet: WalletManager,
    pub bets: BetManager,
    pub catalog: CatalogManager,
    pub addons: AddonManager,
    pub notify: NotifyManager,
    pub users: Arc<dyn UserAdminRepository>,
    pub otp_limiter: Arc<Mutex<KeyedRateLimiter>>,
    pub pool: Arc<PgPool>,
}

/// Create the complete API router with all endpoints and middleware.
///
/// Three route classes, matching how the deployed clients call the API:
/// open routes (the resource routes are trusted-by-userId), Bearer routes
/// for the account-sensitive flows, and admin routes gated on role.
///
/// # Example
///
/// ```rust,no_run
/// # use bb_server::api::{create_router, AppState};
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// # let state: AppState = unimplemented!();
/// let app = create_router(state);
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```
pub fn create_router(state: AppState) -> Router {
    // Bearer-token routes: the caller acts on their own account
    let protected_routes = Router::new()
        .route("/api/user/profile", get(auth::profile))
        .route(
            "/api/devices",
            post(auth::register_device).get(auth::list_devices),
        )
        .route(
            "/api/devices/{device_id}/deactivate",
            put(auth::deactivate_device),
        )
        .route("/api/password-change", post(auth::request_password_change))
        .route("/api/account/deactivate", post(auth::deactivate_account))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth_middleware,
        ));

    // Admin routes; /api/admin/login stays public below
    let admin_routes = Router::new()
        .route("/api/admin/getAllUsers", get(auth::get_all_users))
        .route("/api/admin/deleteUser/{id}", delete(auth::delete_user))
        .route(
            "/api/admin/getAllUsersByStatus",
            get(auth::get_users_by_status),
        )
        .route(
            "/api/admin/disableUserAccountStatus/{id}",
            put(auth::disable_user),
        )
        .route(
            "/api/admin/activeUserAccountStatus/{id}",
            put(auth::activate_user_status),
        )
        .route("/api/admin/getExpiredUsers", get(auth::get_expired_users))
        .route(
            "/api/admin/activeUserAccount/{id}",
            put(auth::activate_user_account),
        )
        .route(
            "/api/admin/password-requests",
            get(auth::list_password_requests),
        )
        .route(
            "/api/admin/password-requests/{id}/approve",
            put(auth::approve_password_change),
        )
        .route(
            "/api/admin/password-requests/{id}/reject",
            put(auth::reject_password_change),
        )
        .route(
            "/api/admin/transaction/{tx_type}/{id}",
            delete(wallet::delete_transaction),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::require_admin,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/api", get(api_root))
        // Accounts
        .route("/api/register", post(auth::register))
        .route("/api/login", post(auth::login))
        .route("/api/send-otp", post(auth::send_otp))
        .route("/api/verify-otp", post(auth::verify_otp))
        .route("/api/admin/login", post(auth::admin_login))
        .route("/api/account/reactivate", post(auth::reactivate_account))
        .route("/api/update-name", put(auth::update_name))
        .route("/api/update-user-icon", put(auth::update_user_icon))
        // Wallet
        .route("/api/deposit", post(wallet::deposit))
        .route("/api/withdraw", post(wallet::withdraw))
        .route("/api/winning", post(wallet::winning))
        .route("/api/deposite/{user_id}", get(wallet::get_balance))
        .route("/api/update-currency", put(wallet::update_currency))
        .route("/api/history/{user_id}", get(wallet::history))
        // Bet tickets
        .route("/api/bets", get(bets::list_bets).post(bets::create_bet))
        .route("/api/bets1", post(bets::create_booked_bet))
        .route(
            "/api/bets/{bet_id}",
            get(bets::bets_for_user)
                .put(bets::update_bet_odd)
                .delete(bets::delete_bet),
        )
        .route("/api/aLLbets/{user_id}", delete(bets::delete_all_bets))
        .route(
            "/api/bets/booking/{booking_code}",
            get(bets::find_by_booking_code),
        )
        .route(
            "/api/ticketId/{bet_id}",
            get(bets::get_bet).put(bets::update_ticket),
        )
        .route(
            "/api/bookingcode/{bet_id}",
            get(bets::get_bet).put(bets::update_booking_code),
        )
        .route("/api/place", post(bets::place_existing))
        // Multibet legs
        .route("/api/multibets", post(bets::add_legs))
        .route("/api/add-match", post(bets::add_match))
        .route(
            "/api/multibets/{bet_id}",
            get(bets::legs_for_bet).put(bets::update_leg),
        )
        .route("/api/multibet/{user_id}", get(bets::legs_for_user))
        .route(
            "/api/multibets/update/{leg_id}",
            put(bets::update_leg_with_message),
        )
        .route(
            "/api/multibets/chat/{leg_id}",
            put(bets::update_leg_with_message),
        )
        .route(
            "/api/multibets/liveodd/{leg_id}",
            put(bets::update_leg_with_message),
        )
        // Verify codes, cash-outs, posted odds
        .route(
            "/api/verify-code/{bet_id}",
            get(bets::get_verify_code).put(bets::upsert_verify_code),
        )
        .route("/api/betverify-code/{code}", get(bets::find_by_verify_code))
        .route("/api/cashout", get(bets::list_cashouts))
        .route(
            "/api/cashout/{bet_id}",
            get(bets::get_cashout).put(bets::upsert_cashout),
        )
        .route(
            "/api/odd/{bet_id}",
            get(bets::get_odd_quote).put(bets::upsert_odd_quote),
        )
        // Feed matches
        .route(
            "/api/matches",
            get(catalog::list_matches).post(catalog::create_matches),
        )
        .route("/api/matches/single", post(catalog::create_single_match))
        .route(
            "/api/matches/{id}",
            get(catalog::get_match)
                .put(catalog::update_match)
                .patch(catalog::update_match)
                .delete(catalog::delete_match),
        )
        .route("/api/matches/{id}/status", patch(catalog::set_match_status))
        // Top matches
        .route(
            "/api/topmatches",
            get(catalog::list_top_matches).post(catalog::create_top_match),
        )
        .route(
            "/api/topmatches/{id}",
            put(catalog::update_top_match).delete(catalog::delete_top_match),
        )
        .route("/api/topmatch/{id}", patch(catalog::update_top_match))
        .route("/api/matchTop/{id}", patch(catalog::set_top_match_status))
        // Manual winner cards
        .route(
            "/api/manual-cards",
            get(catalog::list_manual_cards).post(catalog::create_manual_card),
        )
        .route(
            "/api/manual-cards/broadcast",
            get(catalog::broadcast_manual_cards),
        )
        .route(
            "/api/manual-cards/cleanup",
            post(catalog::cleanup_manual_cards),
        )
        .route(
            "/api/manual-cards/{id}",
            put(catalog::update_manual_card).delete(catalog::delete_manual_card),
        )
        .route(
            "/api/manual-cards/{id}/deactivate",
            patch(catalog::deactivate_manual_card),
        )
        // Banners and avatars
        .route("/api/uploadImages", post(catalog::upload_banners))
        .route("/api/uploadSingleImage", post(catalog::upload_single_banner))
        .route("/api/getImages", get(catalog::get_banners))
        .route(
            "/api/proimages",
            get(catalog::list_profile_images).post(catalog::add_profile_images),
        )
        .route("/api/profile-images", get(catalog::list_profile_images))
        .route(
            "/api/user-image/{user_id}",
            get(catalog::get_user_image).put(catalog::select_user_image),
        )
        // Add-ons
        .route(
            "/api/addons",
            get(addons::list_addons).post(addons::create_addons),
        )
        .route("/api/addons/bulk", post(addons::create_addons))
        .route("/api/addon/buy", post(addons::buy_addon))
        .route("/api/all/{user_id}", get(addons::addons_for_user))
        // Notify
        .route("/api/push-token", post(notify::register_push_token))
        .route("/api/push-token/{phone}", get(notify::get_push_token))
        .route(
            "/api/notification/{user_id}",
            get(notify::get_notification_balance),
        )
        .route(
            "/api/notification/update-balance",
            put(notify::adjust_notification_balance).post(notify::adjust_notification_balance),
        )
        .merge(protected_routes)
        .merge(admin_routes)
        .layer(axum::middleware::from_fn(request_id::request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Liveness ping the deployed clients hit on startup.
async fn api_root() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "API running successfully".to_string(),
    })
}

/// Health check endpoint for monitoring and load balancers.
///
/// Pings the database and reports the crate version.
///
/// # Response
///
/// Returns `200 OK` when the database answers, `503 Service Unavailable`
/// otherwise.
///
/// # Example
///
/// ```bash
/// curl http://localhost:8080/health
/// # {"status":"healthy","version":"2.1.0","database":true,"timestamp":"2025-08-22T10:30:00Z"}
/// ```
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let db_healthy = sqlx::query("SELECT 1")
        .fetch_one(&*state.pool)
        .await
        .is_ok();

    let status_code = if db_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = json!({
        "status": if db_healthy { "healthy" } else { "unhealthy" },
        "version": env!("CARGO_PKG_VERSION"),
        "database": db_healthy,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    (status_code, Json(response))
}
