//! Account and session API handlers.
//!
//! This module provides the HTTP endpoints for accounts:
//! - Registration with a subscription window, login by email/username/mobile
//! - OTP issue/verify for mobile numbers (rate limited per number)
//! - Admin login (admin-role accounts only) and the admin user listings
//! - Profile fetch, name and avatar updates
//! - Device registry, admin-approved password changes, account
//!   deactivation/reactivation with banked subscription days
//!
//! All responses are JSON; failures carry a `message` field.
//!
//! # Examples
//!
//! Register a new user:
//! ```bash
//! curl -X POST http://localhost:8080/api/register \
//!   -H "Content-Type: application/json" \
//!   -d '{"name": "Kwame Mensah", "username": "kwame1", "email": "kwame@example.com", "password": "SecurePass123", "expiryDate": "30"}'
//! ```
//!
//! Login:
//! ```bash
//! curl -X POST http://localhost:8080/api/login \
//!   -H "Content-Type: application/json" \
//!   -d '{"email": "kwame@example.com", "password": "SecurePass123"}'
//! ```

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use betbook::auth::{
    AccountStatus, AuthError, DeactivationRecord, Device, DeviceInfo, PasswordChangeRequest,
    RegisterRequest, Subscription, User,
};

use super::{AppState, MessageResponse, StatusMessage, middleware::AuthUser};
use crate::{logging, metrics};

/// Map a library auth error to a status and client-safe message.
///
/// Handlers whose original wire contract disagrees with these defaults
/// (login reports a missing user as 400, admin login collapses everything
/// into one message) match explicitly instead.
fn auth_error(err: &AuthError) -> (StatusCode, Json<MessageResponse>) {
    let status = match err {
        AuthError::Database(_) | AuthError::HashingFailed | AuthError::Jwt(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        AuthError::UserNotFound | AuthError::DeviceNotFound | AuthError::RequestNotFound => {
            StatusCode::NOT_FOUND
        }
        AuthError::InvalidToken | AuthError::SessionStale => StatusCode::UNAUTHORIZED,
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
#[serde(rename_all = "camelCase")]
pub struct SendOtpPayload {
    #[serde(default)]
    pub mobile_number: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOtpPayload {
    #[serde(default)]
    pub mobile_number: String,
    #[serde(default)]
    pub otp: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterPayload {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub mobile_number: Option<String>,
    #[serde(default)]
    pub password: String,
    /// Subscription window in days, as a string ("30"); "none" is rejected
    #[serde(default)]
    pub expiry_date: String,
    #[serde(default)]
    pub subscription: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginPayload {
    /// Historical key; matches email, username or mobile
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub identifier: Option<String>,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
    pub token: String,
}

/// Issue a one-time code for a mobile number.
///
/// Issuance is rate limited per number; over-limit requests get `429`.
/// The code is returned in the response body for the client to forward,
/// matching the existing app contract (no SMS gateway here).
pub async fn send_otp(
    State(state): State<AppState>,
    Json(payload): Json<SendOtpPayload>,
) -> Result<Json<StatusMessage>, (StatusCode, Json<MessageResponse>)> {
    {
        let mut limiter = state.otp_limiter.lock().await;
        if !limiter.check(&payload.mobile_number) {
            metrics::rate_limit_hits_total("send-otp");
            logging::log_security_event("otp_rate_limited", None, &payload.mobile_number);
            return Err((
                StatusCode::TOO_MANY_REQUESTS,
                Json(MessageResponse {
                    message: "Too many OTP requests. Try again later.".to_string(),
                }),
            ));
        }
    }

    match state.auth.send_otp(&payload.mobile_number).await {
        Ok(challenge) => {
            metrics::otp_issued_total();
            Ok(Json(StatusMessage {
                success: true,
                message: format!("OTP generated: {}", challenge.code),
            }))
        }
        Err(AuthError::MissingField(_)) => Err((
            StatusCode::BAD_REQUEST,
            Json(MessageResponse {
                message: "Mobile number is required".to_string(),
            }),
        )),
        Err(e) => Err(auth_error(&e)),
    }
}

/// Verify a one-time code; the code is consumed on success.
pub async fn verify_otp(
    State(state): State<AppState>,
    Json(payload): Json<VerifyOtpPayload>,
) -> Result<Json<StatusMessage>, (StatusCode, Json<MessageResponse>)> {
    match state
        .auth
        .verify_otp(&payload.mobile_number, &payload.otp)
        .await
    {
        Ok(()) => Ok(Json(StatusMessage {
            success: true,
            message: "OTP verified successfully".to_string(),
        })),
        Err(e) => Err(auth_error(&e)),
    }
}

/// Register a new user account.
///
/// # Request Body
///
/// ```json
/// {
///   "name": "Kwame Mensah",
///   "username": "kwame1",
///   "email": "kwame@example.com",
///   "mobileNumber": "0244000000",  // Optional
///   "password": "SecurePass123",
///   "expiryDate": "30",
///   "subscription": "Basic"        // Optional
/// }
/// ```
///
/// # Response
///
/// On success, returns `201 Created`:
/// ```json
/// { "success": true, "message": "User registered successfully" }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Blank fields, invalid expiry period, or a
///   username/email/mobile already on file
/// - `500 Internal Server Error`: Database or hashing failure
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterPayload>,
) -> Result<(StatusCode, Json<StatusMessage>), (StatusCode, Json<StatusMessage>)> {
    let expiry = payload.expiry_date.trim();
    if payload.name.trim().is_empty()
        || payload.username.trim().is_empty()
        || payload.email.trim().is_empty()
        || payload.password.is_empty()
        || expiry.is_empty()
    {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(StatusMessage {
                success: false,
                message: "All fields are required.".to_string(),
            }),
        ));
    }

    let expiry_days = match expiry.parse::<i64>() {
        Ok(days) if days > 0 => days,
        _ => {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(StatusMessage {
                    success: false,
                    message: "Select expiry period".to_string(),
                }),
            ));
        }
    };

    let request = RegisterRequest {
        name: payload.name,
        username: payload.username,
        email: payload.email,
        mobile: payload
            .mobile_number
            .filter(|mobile| !mobile.trim().is_empty()),
        password: payload.password,
        expiry_days,
        subscription: payload.subscription.as_deref().map(Subscription::parse),
        // Self-service accounts are always plain users
        role: None,
    };

    match state.auth.register(request).await {
        Ok(user) => {
            tracing::info!(user_id = user.id, username = %user.username, "User registered");
            Ok((
                StatusCode::CREATED,
                Json(StatusMessage {
                    success: true,
                    message: "User registered successfully".to_string(),
                }),
            ))
        }
        Err(e @ (AuthError::Database(_) | AuthError::HashingFailed | AuthError::Jwt(_))) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(StatusMessage {
                success: false,
                message: e.client_message(),
            }),
        )),
        Err(e) => Err((
            StatusCode::BAD_REQUEST,
            Json(StatusMessage {
                success: false,
                message: e.client_message(),
            }),
        )),
    }
}

/// Authenticate a user and issue an access token.
///
/// The identifier (sent under `email` or `identifier`) matches email,
/// username or mobile number. The issued token becomes the stored session
/// token, displacing any earlier session.
///
/// # Errors
///
/// - `400 Bad Request`: "User not found" or "Invalid credentials"
/// - `500 Internal Server Error`: Database or hashing failure
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<Json<LoginResponse>, (StatusCode, Json<MessageResponse>)> {
    let identifier = payload.identifier.or(payload.email).unwrap_or_default();

    match state.auth.login(&identifier, &payload.password).await {
        Ok((user, token)) => {
            metrics::login_attempts_total(true);
            tracing::info!(user_id = user.id, "User logged in");
            Ok(Json(LoginResponse {
                success: true,
                message: "Login successful".to_string(),
                token,
            }))
        }
        Err(e) => {
            metrics::login_attempts_total(false);
            logging::log_security_event("login_failed", None, &identifier);
            let status = match e {
                AuthError::Database(_) | AuthError::HashingFailed | AuthError::Jwt(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
                _ => StatusCode::BAD_REQUEST,
            };
            Err((
                status,
                Json(MessageResponse {
                    message: e.client_message(),
                }),
            ))
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AdminLoginPayload {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Authenticate an admin account.
///
/// Only matches accounts with the admin role. Every credential failure is
/// reported with the same message so the endpoint does not confirm which
/// admin emails exist.
pub async fn admin_login(
    State(state): State<AppState>,
    Json(payload): Json<AdminLoginPayload>,
) -> Result<Json<LoginResponse>, (StatusCode, Json<MessageResponse>)> {
    match state
        .auth
        .admin_login(&payload.email, &payload.password)
        .await
    {
        Ok((user, token)) => {
            metrics::login_attempts_total(true);
            tracing::info!(user_id = user.id, "Admin logged in");
            Ok(Json(LoginResponse {
                success: true,
                message: "Login successful".to_string(),
                token,
            }))
        }
        Err(AuthError::MissingField(_)) => Err((
            StatusCode::BAD_REQUEST,
            Json(MessageResponse {
                message: "email and password are required.".to_string(),
            }),
        )),
        Err(e @ (AuthError::Database(_) | AuthError::HashingFailed | AuthError::Jwt(_))) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(MessageResponse {
                message: e.client_message(),
            }),
        )),
        Err(_) => {
            metrics::login_attempts_total(false);
            logging::log_security_event("admin_login_failed", None, &payload.email);
            Err((
                StatusCode::BAD_REQUEST,
                Json(MessageResponse {
                    message: "email or password is wrong.".to_string(),
                }),
            ))
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub success: bool,
    pub user: User,
}

/// Fetch the authenticated user's profile.
pub async fn profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<ProfileResponse>, (StatusCode, Json<MessageResponse>)> {
    match state.auth.get_profile(auth.id).await {
        Ok(user) => Ok(Json(ProfileResponse {
            success: true,
            user,
        })),
        Err(e) => Err(auth_error(&e)),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNamePayload {
    pub user_id: Option<i64>,
    #[serde(default)]
    pub new_name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNameResponse {
    pub message: String,
    pub updated_name: String,
}

/// Update a user's display name.
pub async fn update_name(
    State(state): State<AppState>,
    Json(payload): Json<UpdateNamePayload>,
) -> Result<Json<UpdateNameResponse>, (StatusCode, Json<MessageResponse>)> {
    let missing = (
        StatusCode::BAD_REQUEST,
        Json(MessageResponse {
            message: "User ID and new name are required".to_string(),
        }),
    );
    let Some(user_id) = payload.user_id else {
        return Err(missing);
    };
    if payload.new_name.trim().is_empty() {
        return Err(missing);
    }

    match state.auth.update_name(user_id, &payload.new_name).await {
        Ok(user) => Ok(Json(UpdateNameResponse {
            message: "Name updated successfully".to_string(),
            updated_name: user.name,
        })),
        Err(AuthError::MissingField(_)) => Err((
            StatusCode::BAD_REQUEST,
            Json(MessageResponse {
                message: "User ID and new name are required".to_string(),
            }),
        )),
        Err(e) => Err(auth_error(&e)),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateIconPayload {
    pub user_id: Option<i64>,
    #[serde(default)]
    pub image_url: String,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub success: bool,
    pub message: String,
    pub user: User,
}

/// Update a user's avatar URL.
pub async fn update_user_icon(
    State(state): State<AppState>,
    Json(payload): Json<UpdateIconPayload>,
) -> Result<Json<UserResponse>, (StatusCode, Json<MessageResponse>)> {
    let missing = (
        StatusCode::BAD_REQUEST,
        Json(MessageResponse {
            message: "User ID and image URL are required".to_string(),
        }),
    );
    let Some(user_id) = payload.user_id else {
        return Err(missing);
    };
    if payload.image_url.trim().is_empty() {
        return Err(missing);
    }

    match state
        .auth
        .update_user_icon(user_id, &payload.image_url)
        .await
    {
        Ok(user) => Ok(Json(UserResponse {
            success: true,
            message: "User icon updated successfully".to_string(),
            user,
        })),
        Err(e) => Err(auth_error(&e)),
    }
}

#[derive(Debug, Serialize)]
pub struct DeviceResponse {
    pub message: String,
    pub device: Device,
}

#[derive(Debug, Serialize)]
pub struct DevicesResponse {
    pub success: bool,
    pub devices: Vec<Device>,
}

/// Register or refresh the calling user's device record.
pub async fn register_device(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(info): Json<DeviceInfo>,
) -> Result<(StatusCode, Json<DeviceResponse>), (StatusCode, Json<MessageResponse>)> {
    if info.device_id.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(MessageResponse {
                message: "Device ID is required".to_string(),
            }),
        ));
    }

    match state.auth.register_device(auth.id, &info).await {
        Ok(device) => Ok((
            StatusCode::CREATED,
            Json(DeviceResponse {
                message: "Device registered successfully".to_string(),
                device,
            }),
        )),
        Err(e) => Err(auth_error(&e)),
    }
}

/// List the calling user's registered devices.
pub async fn list_devices(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<DevicesResponse>, (StatusCode, Json<MessageResponse>)> {
    match state.auth.list_devices(auth.id).await {
        Ok(devices) => Ok(Json(DevicesResponse {
            success: true,
            devices,
        })),
        Err(e) => Err(auth_error(&e)),
    }
}

/// Deactivate one of the calling user's devices.
pub async fn deactivate_device(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(device_id): Path<String>,
) -> Result<Json<DeviceResponse>, (StatusCode, Json<MessageResponse>)> {
    match state.auth.deactivate_device(auth.id, &device_id).await {
        Ok(device) => Ok(Json(DeviceResponse {
            message: "Device deactivated successfully".to_string(),
            device,
        })),
        Err(e) => Err(auth_error(&e)),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChangePayload {
    #[serde(default)]
    pub new_password: String,
}

#[derive(Debug, Serialize)]
pub struct RequestResponse {
    pub message: String,
    pub request: PasswordChangeRequest,
}

#[derive(Debug, Serialize)]
pub struct RequestsResponse {
    pub success: bool,
    pub requests: Vec<PasswordChangeRequest>,
}

/// File a password change request for admin review.
///
/// The proposed password is hashed immediately; only the hash is stored
/// with the pending request.
pub async fn request_password_change(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<PasswordChangePayload>,
) -> Result<(StatusCode, Json<RequestResponse>), (StatusCode, Json<MessageResponse>)> {
    match state
        .auth
        .request_password_change(auth.id, &payload.new_password)
        .await
    {
        Ok(request) => Ok((
            StatusCode::CREATED,
            Json(RequestResponse {
                message: "Password change request submitted".to_string(),
                request,
            }),
        )),
        Err(e) => Err(auth_error(&e)),
    }
}

/// List pending password change requests (admin).
pub async fn list_password_requests(
    State(state): State<AppState>,
) -> Result<Json<RequestsResponse>, (StatusCode, Json<MessageResponse>)> {
    match state.auth.list_pending_password_requests().await {
        Ok(requests) => Ok(Json(RequestsResponse {
            success: true,
            requests,
        })),
        Err(e) => Err(auth_error(&e)),
    }
}

/// Approve a pending password change (admin); the stored hash is swapped
/// and the user's session token is cleared.
pub async fn approve_password_change(
    State(state): State<AppState>,
    Extension(admin): Extension<AuthUser>,
    Path(request_id): Path<i64>,
) -> Result<Json<RequestResponse>, (StatusCode, Json<MessageResponse>)> {
    match state.auth.approve_password_change(request_id).await {
        Ok(request) => {
            logging::log_security_event(
                "password_change_approved",
                Some(admin.id),
                &format!("request {request_id} for user {}", request.user_id),
            );
            Ok(Json(RequestResponse {
                message: "Password change approved".to_string(),
                request,
            }))
        }
        Err(e) => Err(auth_error(&e)),
    }
}

#[derive(Debug, Deserialize)]
pub struct RejectPayload {
    #[serde(default)]
    pub reason: String,
}

/// Reject a pending password change (admin).
pub async fn reject_password_change(
    State(state): State<AppState>,
    Path(request_id): Path<i64>,
    Json(payload): Json<RejectPayload>,
) -> Result<Json<RequestResponse>, (StatusCode, Json<MessageResponse>)> {
    match state
        .auth
        .reject_password_change(request_id, &payload.reason)
        .await
    {
        Ok(request) => Ok(Json(RequestResponse {
            message: "Password change rejected".to_string(),
            request,
        })),
        Err(e) => Err(auth_error(&e)),
    }
}

#[derive(Debug, Deserialize)]
pub struct DeactivatePayload {
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Serialize)]
pub struct DeactivationResponse {
    pub message: String,
    pub deactivation: DeactivationRecord,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactivationResponse {
    pub message: String,
    pub user: User,
    pub restored_days: i64,
}

/// Deactivate the calling user's account.
///
/// Unused subscription days are banked on the deactivation record and the
/// stored session token is cleared, so the current token stops working.
pub async fn deactivate_account(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<DeactivatePayload>,
) -> Result<Json<DeactivationResponse>, (StatusCode, Json<MessageResponse>)> {
    match state.auth.deactivate_account(auth.id, &payload.reason).await {
        Ok(record) => {
            logging::log_security_event("account_deactivated", Some(auth.id), &payload.reason);
            Ok(Json(DeactivationResponse {
                message: "Account deactivated successfully".to_string(),
                deactivation: record,
            }))
        }
        Err(e) => Err(auth_error(&e)),
    }
}

/// Reactivate a deactivated account.
///
/// Deactivation clears the stored session token, so this endpoint takes
/// credentials instead of a Bearer token. Banked days are restored onto a
/// fresh expiry.
pub async fn reactivate_account(
    State(state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<Json<ReactivationResponse>, (StatusCode, Json<MessageResponse>)> {
    let identifier = payload.identifier.or(payload.email).unwrap_or_default();

    let (user, _token) = match state.auth.login(&identifier, &payload.password).await {
        Ok(pair) => pair,
        Err(e) => {
            let status = match e {
                AuthError::Database(_) | AuthError::HashingFailed | AuthError::Jwt(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
                _ => StatusCode::BAD_REQUEST,
            };
            return Err((
                status,
                Json(MessageResponse {
                    message: e.client_message(),
                }),
            ));
        }
    };

    match state.auth.reactivate_account(user.id).await {
        Ok((user, record)) => {
            logging::log_security_event("account_reactivated", Some(user.id), "");
            Ok(Json(ReactivationResponse {
                message: "Account reactivated successfully".to_string(),
                user,
                restored_days: record.remaining_days,
            }))
        }
        Err(e) => Err(auth_error(&e)),
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllUsersResponse {
    pub success: bool,
    pub all_users: Vec<User>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsersByStatusResponse {
    pub success: bool,
    pub all_active_users: Vec<User>,
    pub all_disable_users: Vec<User>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpiredUsersResponse {
    pub success: bool,
    pub expired_users: Vec<User>,
}

/// List every user (admin).
pub async fn get_all_users(
    State(state): State<AppState>,
) -> Result<Json<AllUsersResponse>, (StatusCode, Json<MessageResponse>)> {
    match state.users.list_users().await {
        Ok(all_users) => Ok(Json(AllUsersResponse {
            success: true,
            all_users,
        })),
        Err(e) => Err(auth_error(&e)),
    }
}

/// List users split into active and on-hold groups (admin).
pub async fn get_users_by_status(
    State(state): State<AppState>,
) -> Result<Json<UsersByStatusResponse>, (StatusCode, Json<MessageResponse>)> {
    let active = match state.users.list_by_status(AccountStatus::Active).await {
        Ok(users) => users,
        Err(e) => return Err(auth_error(&e)),
    };
    let held = match state.users.list_by_status(AccountStatus::Hold).await {
        Ok(users) => users,
        Err(e) => return Err(auth_error(&e)),
    };

    Ok(Json(UsersByStatusResponse {
        success: true,
        all_active_users: active,
        all_disable_users: held,
    }))
}

/// Put a user's account on hold (admin); their session token is cleared.
pub async fn disable_user(
    State(state): State<AppState>,
    Extension(admin): Extension<AuthUser>,
    Path(user_id): Path<i64>,
) -> Result<Json<StatusMessage>, (StatusCode, Json<MessageResponse>)> {
    match state.users.find_by_id(user_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return Err((
                StatusCode::NOT_FOUND,
                Json(MessageResponse {
                    message: "User not found".to_string(),
                }),
            ));
        }
        Err(e) => return Err(auth_error(&e)),
    }

    match state
        .users
        .set_account_status(user_id, AccountStatus::Hold)
        .await
    {
        Ok(()) => {
            logging::log_security_event("user_disabled", Some(admin.id), &user_id.to_string());
            Ok(Json(StatusMessage {
                success: true,
                message: "User disabled successfully.".to_string(),
            }))
        }
        Err(e) => Err(auth_error(&e)),
    }
}

/// Lift a hold (admin); only accounts currently on hold qualify.
pub async fn activate_user_status(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<StatusMessage>, (StatusCode, Json<MessageResponse>)> {
    let on_hold = match state.users.find_by_id(user_id).await {
        Ok(Some(user)) => user.account_status == AccountStatus::Hold,
        Ok(None) => false,
        Err(e) => return Err(auth_error(&e)),
    };
    if !on_hold {
        return Err((
            StatusCode::NOT_FOUND,
            Json(MessageResponse {
                message: "User not found or not on Hold".to_string(),
            }),
        ));
    }

    match state
        .users
        .set_account_status(user_id, AccountStatus::Active)
        .await
    {
        Ok(()) => Ok(Json(StatusMessage {
            success: true,
            message: "User activated successfully.".to_string(),
        })),
        Err(e) => Err(auth_error(&e)),
    }
}

/// List users whose subscription window has lapsed (admin).
pub async fn get_expired_users(
    State(state): State<AppState>,
) -> Result<Json<ExpiredUsersResponse>, (StatusCode, Json<MessageResponse>)> {
    match state.users.list_expired().await {
        Ok(expired_users) => Ok(Json(ExpiredUsersResponse {
            success: true,
            expired_users,
        })),
        Err(e) => Err(auth_error(&e)),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivateUserPayload {
    #[serde(default)]
    pub expiry_date: String,
    #[serde(default)]
    pub subscription: Option<String>,
}

/// Renew a user's subscription window (admin).
pub async fn activate_user_account(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Json(payload): Json<ActivateUserPayload>,
) -> Result<Json<StatusMessage>, (StatusCode, Json<MessageResponse>)> {
    let expiry = payload.expiry_date.trim();
    if expiry.is_empty() || expiry == "none" {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(MessageResponse {
                message: "Select a valid expiry period".to_string(),
            }),
        ));
    }
    let expiry_days = match expiry.parse::<i64>() {
        Ok(days) if days > 0 => days,
        _ => {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(MessageResponse {
                    message: "Invalid expiry date".to_string(),
                }),
            ));
        }
    };

    match state.users.find_by_id(user_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return Err((
                StatusCode::NOT_FOUND,
                Json(MessageResponse {
                    message: "User not found".to_string(),
                }),
            ));
        }
        Err(e) => return Err(auth_error(&e)),
    }

    let subscription = payload.subscription.as_deref().map(Subscription::parse);
    match state.users.activate(user_id, expiry_days, subscription).await {
        Ok(()) => Ok(Json(StatusMessage {
            success: true,
            message: "User activated successfully.".to_string(),
        })),
        Err(e) => Err(auth_error(&e)),
    }
}

/// Hard-delete a user (admin).
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(admin): Extension<AuthUser>,
    Path(user_id): Path<i64>,
) -> Result<Json<StatusMessage>, (StatusCode, Json<StatusMessage>)> {
    match state.users.delete_user(user_id).await {
        Ok(true) => {
            logging::log_security_event("user_deleted", Some(admin.id), &user_id.to_string());
            Ok(Json(StatusMessage {
                success: true,
                message: "User deleted successfully.".to_string(),
            }))
        }
        Ok(false) => Err((
            StatusCode::NOT_FOUND,
            Json(StatusMessage {
                success: false,
                message: "User not found".to_string(),
            }),
        )),
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(StatusMessage {
                success: false,
                message: e.client_message(),
            }),
        )),
    }
}
