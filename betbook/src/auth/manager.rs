//! Authentication manager implementation.

use super::{
    errors::{AuthError, AuthResult},
    models::{
        AccessTokenClaims, AccountStatus, DeactivationRecord, Device, DeviceInfo, OtpChallenge,
        PasswordChangeRequest, RegisterRequest, RequestStatus, Role, Subscription, USER_COLUMNS,
        User, UserId,
    },
};
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand::Rng;
use sqlx::{PgPool, Row};
use std::sync::Arc;
use subtle::ConstantTimeEq;

/// Column list matching [`Device::from_row`]
const DEVICE_COLUMNS: &str = "id, user_id, device_id, device_name, device_type, platform, \
     os_version, app_version, ip_address, location, is_active, login_count, last_login_at, \
     created_at";

/// Column list matching [`PasswordChangeRequest::from_row`]
const REQUEST_COLUMNS: &str = "id, user_id, status, rejected_reason, created_at, resolved_at";

/// Column list matching [`DeactivationRecord::from_row`]
const DEACTIVATION_COLUMNS: &str = "user_id, is_deactivated, deactivated_at, remaining_days, \
     original_expiry, reason, reactivated_at, reactivation_count";

/// Daily bet volume cap applied to accounts created without an explicit limit
const DEFAULT_GRAND_AUDIT_LIMIT: i64 = 2_000_000;

/// Authentication manager
#[derive(Clone)]
pub struct AuthManager {
    pool: Arc<PgPool>,
    pepper: String,
    jwt_secret: String,
    token_duration: Duration,
    otp_ttl: Duration,
}

impl AuthManager {
    /// Create a new authentication manager
    ///
    /// # Arguments
    ///
    /// * `pool` - Database connection pool
    /// * `pepper` - Server-side pepper for password hashing
    /// * `jwt_secret` - Secret key for JWT signing
    ///
    /// # Returns
    ///
    /// * `AuthManager` - New authentication manager instance
    pub fn new(pool: Arc<PgPool>, pepper: String, jwt_secret: String) -> Self {
        Self {
            pool,
            pepper,
            jwt_secret,
            token_duration: Duration::days(7),
            otp_ttl: Duration::minutes(5),
        }
    }

    /// Register a new user
    ///
    /// # Arguments
    ///
    /// * `request` - Registration request with account details and the
    ///   subscription window in days
    ///
    /// # Returns
    ///
    /// * `AuthResult<User>` - Created user or error
    ///
    /// # Errors
    ///
    /// * `AuthError::UsernameTaken` - Username already exists
    /// * `AuthError::EmailTaken` - Email already exists
    /// * `AuthError::MobileTaken` - Mobile number already exists
    /// * `AuthError::InvalidExpiry` - Expiry day count missing or out of range
    pub async fn register(&self, request: RegisterRequest) -> AuthResult<User> {
        // Required fields
        if request.name.trim().is_empty() {
            return Err(AuthError::MissingField("name"));
        }
        if request.email.trim().is_empty() {
            return Err(AuthError::MissingField("email"));
        }

        // Validate username
        self.validate_username(&request.username)?;

        // Validate password strength
        self.validate_password(&request.password)?;

        // Accounts always carry a subscription window
        if !(1..=3650).contains(&request.expiry_days) {
            return Err(AuthError::InvalidExpiry);
        }

        // Check if username exists
        let existing_user = sqlx::query("SELECT id FROM users WHERE username = $1")
            .bind(&request.username)
            .fetch_optional(self.pool.as_ref())
            .await?;

        if existing_user.is_some() {
            return Err(AuthError::UsernameTaken);
        }

        // Check if email exists
        let existing_email = sqlx::query("SELECT id FROM users WHERE email = $1")
            .bind(&request.email)
            .fetch_optional(self.pool.as_ref())
            .await?;

        if existing_email.is_some() {
            return Err(AuthError::EmailTaken);
        }

        // Check if mobile exists (if provided)
        if let Some(ref mobile) = request.mobile {
            let existing_mobile = sqlx::query("SELECT id FROM users WHERE mobile = $1")
                .bind(mobile)
                .fetch_optional(self.pool.as_ref())
                .await?;

            if existing_mobile.is_some() {
                return Err(AuthError::MobileTaken);
            }
        }

        // Hash password with Argon2id + pepper
        let password_hash = self.hash_password(&request.password)?;

        let role = request.role.unwrap_or(Role::User);
        let subscription = request.subscription.unwrap_or(Subscription::Basic);

        // Insert user; account status and icon take their defaults
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO users (name, username, email, mobile, password_hash, role,
                               subscription, expiry, grand_audit_limit)
            VALUES ($1, $2, $3, $4, $5, $6, $7, NOW() + make_interval(days => $8), $9)
            RETURNING {USER_COLUMNS}
            "#,
        ))
        .bind(&request.name)
        .bind(&request.username)
        .bind(&request.email)
        .bind(&request.mobile)
        .bind(&password_hash)
        .bind(role.to_string())
        .bind(subscription.to_string())
        .bind(request.expiry_days as i32)
        .bind(DEFAULT_GRAND_AUDIT_LIMIT)
        .fetch_one(self.pool.as_ref())
        .await?;

        let user = User::from_row(&row);
        log::info!("Registered user {} ({})", user.id, user.username);
        Ok(user)
    }

    /// Login a user
    ///
    /// The identifier matches against email, username or mobile number. On
    /// success the issued token replaces any previously stored session token,
    /// so earlier sessions stop validating.
    ///
    /// # Returns
    ///
    /// * `AuthResult<(User, String)>` - User and access token or error
    ///
    /// # Errors
    ///
    /// * `AuthError::UserNotFound` - No account matches the identifier
    /// * `AuthError::InvalidCredentials` - Incorrect password
    pub async fn login(&self, identifier: &str, password: &str) -> AuthResult<(User, String)> {
        if identifier.trim().is_empty() {
            return Err(AuthError::MissingField("identifier"));
        }
        if password.is_empty() {
            return Err(AuthError::MissingField("password"));
        }

        // Fetch user with password hash
        let user_row = sqlx::query(&format!(
            r#"
            SELECT {USER_COLUMNS}, password_hash
            FROM users
            WHERE email = $1 OR username = $1 OR mobile = $1
            "#,
        ))
        .bind(identifier)
        .fetch_optional(self.pool.as_ref())
        .await?
        .ok_or(AuthError::UserNotFound)?;

        // Verify password
        let password_hash: String = user_row.get("password_hash");
        self.verify_password(password, &password_hash)?;

        let user_id: UserId = user_row.get("id");
        let username: String = user_row.get("username");
        let role = Role::parse(&user_row.get::<String, _>("role"));

        self.issue_session(user_id, &username, role).await
    }

    /// Login an admin account
    ///
    /// Same flow as [`login`](Self::login) but only matches accounts with the
    /// admin role, and reports any failure as invalid credentials.
    pub async fn admin_login(&self, email: &str, password: &str) -> AuthResult<(User, String)> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(AuthError::MissingField("email"));
        }

        let user_row = sqlx::query(&format!(
            r#"
            SELECT {USER_COLUMNS}, password_hash
            FROM users
            WHERE email = $1 AND role = 'admin'
            "#,
        ))
        .bind(email)
        .fetch_optional(self.pool.as_ref())
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

        let password_hash: String = user_row.get("password_hash");
        self.verify_password(password, &password_hash)?;

        let user_id: UserId = user_row.get("id");
        let username: String = user_row.get("username");

        self.issue_session(user_id, &username, Role::Admin).await
    }

    /// Generate a token, persist it as the stored session token and stamp the
    /// login time
    async fn issue_session(
        &self,
        user_id: UserId,
        username: &str,
        role: Role,
    ) -> AuthResult<(User, String)> {
        let token = self.generate_access_token(user_id, username, role)?;

        let row = sqlx::query(&format!(
            r#"
            UPDATE users
            SET session_token = $1, last_login = NOW()
            WHERE id = $2
            RETURNING {USER_COLUMNS}
            "#,
        ))
        .bind(&token)
        .bind(user_id)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok((User::from_row(&row), token))
    }

    /// Authenticate a bearer token against the stored session token
    ///
    /// A token that decodes but no longer matches the stored one belongs to a
    /// session displaced by a newer login (or cleared by an admin), and is
    /// rejected as stale.
    ///
    /// # Errors
    ///
    /// * `AuthError::InvalidToken` - Signature or claims validation failed
    /// * `AuthError::SessionStale` - Token is no longer the active session
    pub async fn authenticate(&self, token: &str) -> AuthResult<User> {
        let claims = self.verify_access_token(token)?;

        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS}, session_token FROM users WHERE id = $1",
        ))
        .bind(claims.sub)
        .fetch_optional(self.pool.as_ref())
        .await?
        .ok_or(AuthError::UserNotFound)?;

        let stored: Option<String> = row.get("session_token");
        let stored = stored.ok_or(AuthError::SessionStale)?;
        if !bool::from(stored.as_bytes().ct_eq(token.as_bytes())) {
            return Err(AuthError::SessionStale);
        }

        Ok(User::from_row(&row))
    }

    /// Verify an access token's signature and expiry without touching the
    /// database
    pub fn verify_access_token(&self, token: &str) -> AuthResult<AccessTokenClaims> {
        let token_data = decode::<AccessTokenClaims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|_| AuthError::InvalidToken)?;

        Ok(token_data.claims)
    }

    /// Issue a one-time code for a mobile number
    ///
    /// Re-issuing replaces any outstanding code for the same number. The code
    /// is returned to the caller; delivery happens out of band.
    pub async fn send_otp(&self, mobile: &str) -> AuthResult<OtpChallenge> {
        if mobile.trim().is_empty() {
            return Err(AuthError::MissingField("mobile"));
        }

        let code = Self::generate_otp();
        let expires_at = Utc::now() + self.otp_ttl;

        sqlx::query(
            r#"
            INSERT INTO otp_codes (mobile, code, expires_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (mobile) DO UPDATE
            SET code = EXCLUDED.code, expires_at = EXCLUDED.expires_at, created_at = NOW()
            "#,
        )
        .bind(mobile)
        .bind(&code)
        .bind(expires_at.naive_utc())
        .execute(self.pool.as_ref())
        .await?;

        Ok(OtpChallenge {
            mobile: mobile.to_string(),
            code,
            expires_at,
        })
    }

    /// Verify a one-time code; a correct code is consumed
    ///
    /// # Errors
    ///
    /// * `AuthError::OtpNotFound` - No code issued for this number
    /// * `AuthError::OtpMismatch` - Submitted code does not match
    /// * `AuthError::OtpExpired` - Code was issued too long ago
    pub async fn verify_otp(&self, mobile: &str, code: &str) -> AuthResult<()> {
        let row = sqlx::query("SELECT code, expires_at FROM otp_codes WHERE mobile = $1")
            .bind(mobile)
            .fetch_optional(self.pool.as_ref())
            .await?
            .ok_or(AuthError::OtpNotFound)?;

        let stored: String = row.get("code");
        if !bool::from(stored.as_bytes().ct_eq(code.as_bytes())) {
            return Err(AuthError::OtpMismatch);
        }

        let expires_at = row.get::<chrono::NaiveDateTime, _>("expires_at").and_utc();
        if expires_at < Utc::now() {
            return Err(AuthError::OtpExpired);
        }

        sqlx::query("DELETE FROM otp_codes WHERE mobile = $1")
            .bind(mobile)
            .execute(self.pool.as_ref())
            .await?;

        Ok(())
    }

    /// Fetch a user's profile
    pub async fn get_profile(&self, user_id: UserId) -> AuthResult<User> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(user_id)
            .fetch_optional(self.pool.as_ref())
            .await?
            .ok_or(AuthError::UserNotFound)?;

        Ok(User::from_row(&row))
    }

    /// Update a user's display name
    pub async fn update_name(&self, user_id: UserId, name: &str) -> AuthResult<User> {
        if name.trim().is_empty() {
            return Err(AuthError::MissingField("newName"));
        }

        let row = sqlx::query(&format!(
            "UPDATE users SET name = $1 WHERE id = $2 RETURNING {USER_COLUMNS}",
        ))
        .bind(name)
        .bind(user_id)
        .fetch_optional(self.pool.as_ref())
        .await?
        .ok_or(AuthError::UserNotFound)?;

        Ok(User::from_row(&row))
    }

    /// Update a user's avatar URL
    pub async fn update_user_icon(&self, user_id: UserId, image_url: &str) -> AuthResult<User> {
        if image_url.trim().is_empty() {
            return Err(AuthError::MissingField("imageUrl"));
        }

        let row = sqlx::query(&format!(
            "UPDATE users SET user_icon = $1 WHERE id = $2 RETURNING {USER_COLUMNS}",
        ))
        .bind(image_url)
        .bind(user_id)
        .fetch_optional(self.pool.as_ref())
        .await?
        .ok_or(AuthError::UserNotFound)?;

        Ok(User::from_row(&row))
    }

    /// Register or refresh a device for a user
    ///
    /// A device already registered under the same (user, device id) pair gets
    /// its metadata refreshed, its login counter bumped and its active flag
    /// restored.
    pub async fn register_device(
        &self,
        user_id: UserId,
        info: &DeviceInfo,
    ) -> AuthResult<Device> {
        if info.device_id.trim().is_empty() {
            return Err(AuthError::MissingField("deviceId"));
        }
        if info.device_name.trim().is_empty() {
            return Err(AuthError::MissingField("deviceName"));
        }
        if info.platform.trim().is_empty() {
            return Err(AuthError::MissingField("platform"));
        }

        let exists = sqlx::query("SELECT id FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(self.pool.as_ref())
            .await?;
        if exists.is_none() {
            return Err(AuthError::UserNotFound);
        }

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO devices (user_id, device_id, device_name, device_type, platform,
                                 os_version, app_version, ip_address, location, last_login_at)
            VALUES ($1, $2, $3, COALESCE($4, 'mobile'), $5, $6, $7, $8, $9, NOW())
            ON CONFLICT (user_id, device_id) DO UPDATE
            SET device_name = EXCLUDED.device_name,
                device_type = EXCLUDED.device_type,
                platform = EXCLUDED.platform,
                os_version = EXCLUDED.os_version,
                app_version = EXCLUDED.app_version,
                ip_address = EXCLUDED.ip_address,
                location = EXCLUDED.location,
                is_active = TRUE,
                login_count = devices.login_count + 1,
                last_login_at = NOW()
            RETURNING {DEVICE_COLUMNS}
            "#,
        ))
        .bind(user_id)
        .bind(&info.device_id)
        .bind(&info.device_name)
        .bind(&info.device_type)
        .bind(&info.platform)
        .bind(&info.os_version)
        .bind(&info.app_version)
        .bind(&info.ip_address)
        .bind(&info.location)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(Device::from_row(&row))
    }

    /// List a user's devices, active ones first
    pub async fn list_devices(&self, user_id: UserId) -> AuthResult<Vec<Device>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {DEVICE_COLUMNS}
            FROM devices
            WHERE user_id = $1
            ORDER BY is_active DESC, last_login_at DESC
            "#,
        ))
        .bind(user_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.iter().map(Device::from_row).collect())
    }

    /// Mark a device inactive
    pub async fn deactivate_device(
        &self,
        user_id: UserId,
        device_id: &str,
    ) -> AuthResult<Device> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE devices
            SET is_active = FALSE
            WHERE user_id = $1 AND device_id = $2
            RETURNING {DEVICE_COLUMNS}
            "#,
        ))
        .bind(user_id)
        .bind(device_id)
        .fetch_optional(self.pool.as_ref())
        .await?
        .ok_or(AuthError::DeviceNotFound)?;

        Ok(Device::from_row(&row))
    }

    /// File a password change request for admin approval
    ///
    /// The proposed password is hashed immediately; the plaintext is never
    /// stored. The account keeps its current password until an admin approves
    /// the request.
    pub async fn request_password_change(
        &self,
        user_id: UserId,
        new_password: &str,
    ) -> AuthResult<PasswordChangeRequest> {
        self.validate_password(new_password)?;

        let exists = sqlx::query("SELECT id FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(self.pool.as_ref())
            .await?;
        if exists.is_none() {
            return Err(AuthError::UserNotFound);
        }

        let new_password_hash = self.hash_password(new_password)?;

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO password_change_requests (user_id, new_password_hash)
            VALUES ($1, $2)
            RETURNING {REQUEST_COLUMNS}
            "#,
        ))
        .bind(user_id)
        .bind(&new_password_hash)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(PasswordChangeRequest::from_row(&row))
    }

    /// List unresolved password change requests, oldest first
    pub async fn list_pending_password_requests(
        &self,
    ) -> AuthResult<Vec<PasswordChangeRequest>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {REQUEST_COLUMNS}
            FROM password_change_requests
            WHERE status = 'pending'
            ORDER BY created_at ASC
            "#,
        ))
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.iter().map(PasswordChangeRequest::from_row).collect())
    }

    /// Approve a password change request
    ///
    /// Swaps in the proposed hash and clears the stored session token, so the
    /// user has to log in again with the new password.
    pub async fn approve_password_change(
        &self,
        request_id: i64,
    ) -> AuthResult<PasswordChangeRequest> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(&format!(
            r#"
            SELECT {REQUEST_COLUMNS}, new_password_hash
            FROM password_change_requests
            WHERE id = $1
            FOR UPDATE
            "#,
        ))
        .bind(request_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(AuthError::RequestNotFound)?;

        if RequestStatus::parse(&row.get::<String, _>("status")) != RequestStatus::Pending {
            return Err(AuthError::RequestAlreadyResolved);
        }

        let user_id: UserId = row.get("user_id");
        let new_password_hash: String = row.get("new_password_hash");

        sqlx::query("UPDATE users SET password_hash = $1, session_token = NULL WHERE id = $2")
            .bind(&new_password_hash)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        let updated = sqlx::query(&format!(
            r#"
            UPDATE password_change_requests
            SET status = 'approved', resolved_at = NOW()
            WHERE id = $1
            RETURNING {REQUEST_COLUMNS}
            "#,
        ))
        .bind(request_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(PasswordChangeRequest::from_row(&updated))
    }

    /// Reject a password change request with a reason
    pub async fn reject_password_change(
        &self,
        request_id: i64,
        reason: &str,
    ) -> AuthResult<PasswordChangeRequest> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query("SELECT status FROM password_change_requests WHERE id = $1 FOR UPDATE")
            .bind(request_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(AuthError::RequestNotFound)?;

        if RequestStatus::parse(&row.get::<String, _>("status")) != RequestStatus::Pending {
            return Err(AuthError::RequestAlreadyResolved);
        }

        let updated = sqlx::query(&format!(
            r#"
            UPDATE password_change_requests
            SET status = 'rejected', rejected_reason = $2, resolved_at = NOW()
            WHERE id = $1
            RETURNING {REQUEST_COLUMNS}
            "#,
        ))
        .bind(request_id)
        .bind(reason)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(PasswordChangeRequest::from_row(&updated))
    }

    /// Deactivate an account, banking the unused subscription days
    ///
    /// The remaining whole days until expiry are recorded so reactivation can
    /// restore them. The stored session token is cleared.
    pub async fn deactivate_account(
        &self,
        user_id: UserId,
        reason: &str,
    ) -> AuthResult<DeactivationRecord> {
        let mut tx = self.pool.begin().await?;

        let user_row = sqlx::query("SELECT expiry, account_status FROM users WHERE id = $1 FOR UPDATE")
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let status = AccountStatus::parse(&user_row.get::<String, _>("account_status"));
        if status == AccountStatus::Deactivated {
            return Err(AuthError::AlreadyDeactivated);
        }

        let expiry = user_row
            .get::<Option<chrono::NaiveDateTime>, _>("expiry")
            .map(|dt| dt.and_utc());
        let remaining_days = expiry
            .map(|e| (e - Utc::now()).num_days().max(0))
            .unwrap_or(0);

        // reactivation_count survives repeat deactivations
        let record = sqlx::query(&format!(
            r#"
            INSERT INTO deactivations (user_id, is_deactivated, deactivated_at, remaining_days,
                                       original_expiry, reason)
            VALUES ($1, TRUE, NOW(), $2, $3, $4)
            ON CONFLICT (user_id) DO UPDATE
            SET is_deactivated = TRUE,
                deactivated_at = NOW(),
                remaining_days = EXCLUDED.remaining_days,
                original_expiry = EXCLUDED.original_expiry,
                reason = EXCLUDED.reason,
                reactivated_at = NULL
            RETURNING {DEACTIVATION_COLUMNS}
            "#,
        ))
        .bind(user_id)
        .bind(remaining_days)
        .bind(expiry.map(|e| e.naive_utc()))
        .bind(reason)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE users SET account_status = 'Deactivated', session_token = NULL WHERE id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        log::info!("Deactivated user {} with {} days banked", user_id, remaining_days);

        Ok(DeactivationRecord::from_row(&record))
    }

    /// Reactivate a deactivated account, restoring the banked days
    pub async fn reactivate_account(
        &self,
        user_id: UserId,
    ) -> AuthResult<(User, DeactivationRecord)> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(&format!(
            "SELECT {DEACTIVATION_COLUMNS} FROM deactivations WHERE user_id = $1 FOR UPDATE",
        ))
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(AuthError::NotDeactivated)?;

        let record = DeactivationRecord::from_row(&row);
        if !record.is_deactivated {
            return Err(AuthError::NotDeactivated);
        }

        let user_row = sqlx::query(&format!(
            r#"
            UPDATE users
            SET account_status = 'Active', expiry = NOW() + make_interval(days => $2)
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#,
        ))
        .bind(user_id)
        .bind(record.remaining_days as i32)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(AuthError::UserNotFound)?;

        let updated = sqlx::query(&format!(
            r#"
            UPDATE deactivations
            SET is_deactivated = FALSE,
                reactivated_at = NOW(),
                reactivation_count = reactivation_count + 1,
                remaining_days = 0
            WHERE user_id = $1
            RETURNING {DEACTIVATION_COLUMNS}
            "#,
        ))
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        log::info!("Reactivated user {} with {} days restored", user_id, record.remaining_days);

        Ok((User::from_row(&user_row), DeactivationRecord::from_row(&updated)))
    }

    /// Fetch a user's deactivation record, if any
    pub async fn get_deactivation(
        &self,
        user_id: UserId,
    ) -> AuthResult<Option<DeactivationRecord>> {
        let row = sqlx::query(&format!(
            "SELECT {DEACTIVATION_COLUMNS} FROM deactivations WHERE user_id = $1",
        ))
        .bind(user_id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.as_ref().map(DeactivationRecord::from_row))
    }

    /// Hash password with Argon2id + pepper
    fn hash_password(&self, password: &str) -> AuthResult<String> {
        // Add pepper to password
        let peppered = format!("{}{}", password, self.pepper);
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        Ok(argon2
            .hash_password(peppered.as_bytes(), &salt)
            .map_err(|_| AuthError::HashingFailed)?
            .to_string())
    }

    /// Verify password against hash
    fn verify_password(&self, password: &str, hash: &str) -> AuthResult<()> {
        let peppered = format!("{}{}", password, self.pepper);
        let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
        let argon2 = Argon2::default();

        argon2
            .verify_password(peppered.as_bytes(), &parsed_hash)
            .map_err(|_| AuthError::InvalidCredentials)
    }

    /// Generate JWT access token
    fn generate_access_token(
        &self,
        user_id: UserId,
        username: &str,
        role: Role,
    ) -> AuthResult<String> {
        let now = Utc::now();
        let claims = AccessTokenClaims {
            sub: user_id,
            username: username.to_string(),
            role,
            exp: (now + self.token_duration).timestamp(),
            iat: now.timestamp(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )?;

        Ok(token)
    }

    /// Generate a six digit one-time code
    fn generate_otp() -> String {
        let mut rng = rand::rng();
        rng.random_range(100_000..=999_999).to_string()
    }

    /// Validate username format
    fn validate_username(&self, username: &str) -> AuthResult<()> {
        let len = username.len();
        if len < 3 || len > 20 {
            return Err(AuthError::InvalidUsername(
                "Username must be 3-20 characters".to_string(),
            ));
        }

        if !username.chars().all(|c| c.is_alphanumeric() || c == '_') {
            return Err(AuthError::InvalidUsername(
                "Username can only contain letters, numbers, and underscores".to_string(),
            ));
        }

        Ok(())
    }

    /// Validate password strength
    fn validate_password(&self, password: &str) -> AuthResult<()> {
        if password.len() < 8 {
            return Err(AuthError::WeakPassword(
                "Password must be at least 8 characters".to_string(),
            ));
        }

        Ok(())
    }
}
