//! Authentication and account data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Row, postgres::PgRow};

/// User ID type
pub type UserId = i64;

/// Column list matching [`User::from_row`]
pub(crate) const USER_COLUMNS: &str = "id, name, username, email, mobile, role, subscription, \
     expiry, account_status, grand_audit_limit, user_icon, created_at, last_login";

/// Account role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn parse(role: &str) -> Role {
        match role {
            "admin" => Role::Admin,
            _ => Role::User,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

/// Subscription tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Subscription {
    Basic,
    Premium,
}

impl Subscription {
    pub fn parse(tier: &str) -> Subscription {
        match tier {
            "Premium" => Subscription::Premium,
            _ => Subscription::Basic,
        }
    }
}

impl std::fmt::Display for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Subscription::Basic => write!(f, "Basic"),
            Subscription::Premium => write!(f, "Premium"),
        }
    }
}

/// Account status; Hold and Deactivated accounts keep their data but lose
/// their stored session token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountStatus {
    Active,
    Hold,
    Deactivated,
}

impl AccountStatus {
    pub fn parse(status: &str) -> AccountStatus {
        match status {
            "Hold" => AccountStatus::Hold,
            "Deactivated" => AccountStatus::Deactivated,
            _ => AccountStatus::Active,
        }
    }
}

impl std::fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccountStatus::Active => write!(f, "Active"),
            AccountStatus::Hold => write!(f, "Hold"),
            AccountStatus::Deactivated => write!(f, "Deactivated"),
        }
    }
}

/// User model; the password hash and stored session token are never part of
/// this struct
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub username: String,
    pub email: String,
    pub mobile: Option<String>,
    pub role: Role,
    pub subscription: Subscription,
    pub expiry: Option<DateTime<Utc>>,
    pub account_status: AccountStatus,
    pub grand_audit_limit: i64,
    pub user_icon: String,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

impl User {
    /// Build a user from a row selecting the standard user columns
    pub fn from_row(row: &PgRow) -> User {
        User {
            id: row.get("id"),
            name: row.get("name"),
            username: row.get("username"),
            email: row.get("email"),
            mobile: row.get("mobile"),
            role: Role::parse(&row.get::<String, _>("role")),
            subscription: Subscription::parse(&row.get::<String, _>("subscription")),
            expiry: row
                .get::<Option<chrono::NaiveDateTime>, _>("expiry")
                .map(|dt| dt.and_utc()),
            account_status: AccountStatus::parse(&row.get::<String, _>("account_status")),
            grand_audit_limit: row.get("grand_audit_limit"),
            user_icon: row.get("user_icon"),
            created_at: row.get::<chrono::NaiveDateTime, _>("created_at").and_utc(),
            last_login: row
                .get::<Option<chrono::NaiveDateTime>, _>("last_login")
                .map(|dt| dt.and_utc()),
        }
    }
}

/// User registration request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub mobile: Option<String>,
    pub password: String,
    /// Subscription window in days
    pub expiry_days: i64,
    #[serde(default)]
    pub subscription: Option<Subscription>,
    #[serde(default)]
    pub role: Option<Role>,
}

/// User login request; the identifier matches email, username or mobile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub identifier: String,
    pub password: String,
}

/// JWT claims for access tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    pub sub: UserId,
    pub username: String,
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
}

/// OTP challenge issued for a mobile number
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OtpChallenge {
    pub mobile: String,
    pub code: String,
    pub expires_at: DateTime<Utc>,
}

/// Device metadata supplied by a client at registration/login
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInfo {
    pub device_id: String,
    pub device_name: String,
    #[serde(default)]
    pub device_type: Option<String>,
    pub platform: String,
    #[serde(default)]
    pub os_version: Option<String>,
    #[serde(default)]
    pub app_version: Option<String>,
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

/// Registered device row
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub id: i64,
    pub user_id: UserId,
    pub device_id: String,
    pub device_name: String,
    pub device_type: String,
    pub platform: String,
    pub os_version: Option<String>,
    pub app_version: Option<String>,
    pub ip_address: Option<String>,
    pub location: Option<String>,
    pub is_active: bool,
    pub login_count: i32,
    pub last_login_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Device {
    pub fn from_row(row: &PgRow) -> Device {
        Device {
            id: row.get("id"),
            user_id: row.get("user_id"),
            device_id: row.get("device_id"),
            device_name: row.get("device_name"),
            device_type: row.get("device_type"),
            platform: row.get("platform"),
            os_version: row.get("os_version"),
            app_version: row.get("app_version"),
            ip_address: row.get("ip_address"),
            location: row.get("location"),
            is_active: row.get("is_active"),
            login_count: row.get("login_count"),
            last_login_at: row
                .get::<chrono::NaiveDateTime, _>("last_login_at")
                .and_utc(),
            created_at: row.get::<chrono::NaiveDateTime, _>("created_at").and_utc(),
        }
    }
}

/// Password change request status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    pub fn parse(status: &str) -> RequestStatus {
        match status {
            "approved" => RequestStatus::Approved,
            "rejected" => RequestStatus::Rejected,
            _ => RequestStatus::Pending,
        }
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestStatus::Pending => write!(f, "pending"),
            RequestStatus::Approved => write!(f, "approved"),
            RequestStatus::Rejected => write!(f, "rejected"),
        }
    }
}

/// Pending/resolved password change request; the proposed hash stays in the
/// database only
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChangeRequest {
    pub id: i64,
    pub user_id: UserId,
    pub status: RequestStatus,
    pub rejected_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl PasswordChangeRequest {
    pub fn from_row(row: &PgRow) -> PasswordChangeRequest {
        PasswordChangeRequest {
            id: row.get("id"),
            user_id: row.get("user_id"),
            status: RequestStatus::parse(&row.get::<String, _>("status")),
            rejected_reason: row.get("rejected_reason"),
            created_at: row.get::<chrono::NaiveDateTime, _>("created_at").and_utc(),
            resolved_at: row
                .get::<Option<chrono::NaiveDateTime>, _>("resolved_at")
                .map(|dt| dt.and_utc()),
        }
    }
}

/// Deactivation bookkeeping: the unused part of the subscription window is
/// banked in days and restored on reactivation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeactivationRecord {
    pub user_id: UserId,
    pub is_deactivated: bool,
    pub deactivated_at: Option<DateTime<Utc>>,
    pub remaining_days: i64,
    pub original_expiry: Option<DateTime<Utc>>,
    pub reason: String,
    pub reactivated_at: Option<DateTime<Utc>>,
    pub reactivation_count: i32,
}

impl DeactivationRecord {
    pub fn from_row(row: &PgRow) -> DeactivationRecord {
        DeactivationRecord {
            user_id: row.get("user_id"),
            is_deactivated: row.get("is_deactivated"),
            deactivated_at: row
                .get::<Option<chrono::NaiveDateTime>, _>("deactivated_at")
                .map(|dt| dt.and_utc()),
            remaining_days: row.get("remaining_days"),
            original_expiry: row
                .get::<Option<chrono::NaiveDateTime>, _>("original_expiry")
                .map(|dt| dt.and_utc()),
            reason: row.get("reason"),
            reactivated_at: row
                .get::<Option<chrono::NaiveDateTime>, _>("reactivated_at")
                .map(|dt| dt.and_utc()),
            reactivation_count: row.get("reactivation_count"),
        }
    }
}
