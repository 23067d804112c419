//! Repository trait definitions for testability and dependency injection.
//!
//! This module provides trait-based abstractions over the admin-facing user
//! management queries, enabling better testing through mock implementations
//! and dependency injection.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::auth::{AccountStatus, AuthResult, Subscription, USER_COLUMNS, User};

/// Trait for admin user-management operations
#[async_trait]
pub trait UserAdminRepository: Send + Sync {
    /// List all users, newest first
    async fn list_users(&self) -> AuthResult<Vec<User>>;

    /// List users with a given account status
    async fn list_by_status(&self, status: AccountStatus) -> AuthResult<Vec<User>>;

    /// List users whose subscription window has lapsed
    async fn list_expired(&self) -> AuthResult<Vec<User>>;

    /// Find user by ID
    async fn find_by_id(&self, user_id: i64) -> AuthResult<Option<User>>;

    /// Set account status; any non-Active status also clears the stored
    /// session token so the user is logged out everywhere
    async fn set_account_status(&self, user_id: i64, status: AccountStatus) -> AuthResult<()>;

    /// Activate a user with a fresh subscription window of `expiry_days`
    async fn activate(
        &self,
        user_id: i64,
        expiry_days: i64,
        subscription: Option<Subscription>,
    ) -> AuthResult<()>;

    /// Set the per-user audit limit
    async fn set_grand_audit_limit(&self, user_id: i64, limit: i64) -> AuthResult<()>;

    /// Hard-delete a user; returns whether a row was removed
    async fn delete_user(&self, user_id: i64) -> AuthResult<bool>;
}

/// Default PostgreSQL implementation of `UserAdminRepository`
pub struct PgUserAdminRepository {
    pool: PgPool,
}

impl PgUserAdminRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserAdminRepository for PgUserAdminRepository {
    async fn list_users(&self) -> AuthResult<Vec<User>> {
        let rows = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(User::from_row).collect())
    }

    async fn list_by_status(&self, status: AccountStatus) -> AuthResult<Vec<User>> {
        let rows = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE account_status = $1 ORDER BY created_at DESC"
        ))
        .bind(status.to_string())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(User::from_row).collect())
    }

    async fn list_expired(&self) -> AuthResult<Vec<User>> {
        let rows = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE expiry IS NOT NULL AND expiry < NOW() \
             ORDER BY expiry ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(User::from_row).collect())
    }

    async fn find_by_id(&self, user_id: i64) -> AuthResult<Option<User>> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(User::from_row))
    }

    async fn set_account_status(&self, user_id: i64, status: AccountStatus) -> AuthResult<()> {
        sqlx::query(
            "UPDATE users
             SET account_status = $1,
                 session_token = CASE WHEN $1 = 'Active' THEN session_token ELSE NULL END
             WHERE id = $2",
        )
        .bind(status.to_string())
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn activate(
        &self,
        user_id: i64,
        expiry_days: i64,
        subscription: Option<Subscription>,
    ) -> AuthResult<()> {
        sqlx::query(
            "UPDATE users
             SET account_status = 'Active',
                 expiry = NOW() + make_interval(days => $1::int),
                 subscription = COALESCE($2, subscription)
             WHERE id = $3",
        )
        .bind(expiry_days)
        .bind(subscription.map(|s| s.to_string()))
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn set_grand_audit_limit(&self, user_id: i64, limit: i64) -> AuthResult<()> {
        sqlx::query("UPDATE users SET grand_audit_limit = $1 WHERE id = $2")
            .bind(limit)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_user(&self, user_id: i64) -> AuthResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// Mock implementation for testing
#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    pub struct MockUserAdminRepository {
        users: Arc<Mutex<HashMap<i64, User>>>,
    }

    impl Default for MockUserAdminRepository {
        fn default() -> Self {
            Self::new()
        }
    }

    impl MockUserAdminRepository {
        pub fn new() -> Self {
            Self {
                users: Arc::new(Mutex::new(HashMap::new())),
            }
        }

        pub fn with_user(self, user: User) -> Self {
            self.users.lock().unwrap().insert(user.id, user);
            self
        }
    }

    #[async_trait]
    impl UserAdminRepository for MockUserAdminRepository {
        async fn list_users(&self) -> AuthResult<Vec<User>> {
            let mut users: Vec<User> = self.users.lock().unwrap().values().cloned().collect();
            users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Ok(users)
        }

        async fn list_by_status(&self, status: AccountStatus) -> AuthResult<Vec<User>> {
            let users = self.users.lock().unwrap();
            Ok(users
                .values()
                .filter(|u| u.account_status == status)
                .cloned()
                .collect())
        }

        async fn list_expired(&self) -> AuthResult<Vec<User>> {
            let now = chrono::Utc::now();
            let users = self.users.lock().unwrap();
            Ok(users
                .values()
                .filter(|u| u.expiry.is_some_and(|e| e < now))
                .cloned()
                .collect())
        }

        async fn find_by_id(&self, user_id: i64) -> AuthResult<Option<User>> {
            Ok(self.users.lock().unwrap().get(&user_id).cloned())
        }

        async fn set_account_status(&self, user_id: i64, status: AccountStatus) -> AuthResult<()> {
            if let Some(user) = self.users.lock().unwrap().get_mut(&user_id) {
                user.account_status = status;
            }
            Ok(())
        }

        async fn activate(
            &self,
            user_id: i64,
            expiry_days: i64,
            subscription: Option<Subscription>,
        ) -> AuthResult<()> {
            if let Some(user) = self.users.lock().unwrap().get_mut(&user_id) {
                user.account_status = AccountStatus::Active;
                user.expiry = Some(chrono::Utc::now() + chrono::Duration::days(expiry_days));
                if let Some(sub) = subscription {
                    user.subscription = sub;
                }
            }
            Ok(())
        }

        async fn set_grand_audit_limit(&self, user_id: i64, limit: i64) -> AuthResult<()> {
            if let Some(user) = self.users.lock().unwrap().get_mut(&user_id) {
                user.grand_audit_limit = limit;
            }
            Ok(())
        }

        async fn delete_user(&self, user_id: i64) -> AuthResult<bool> {
            Ok(self.users.lock().unwrap().remove(&user_id).is_some())
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::auth::Role;

        fn sample_user(id: i64, username: &str) -> User {
            User {
                id,
                name: format!("User {id}"),
                username: username.to_string(),
                email: format!("{username}@example.com"),
                mobile: None,
                role: Role::User,
                subscription: Subscription::Basic,
                expiry: Some(chrono::Utc::now() + chrono::Duration::days(30)),
                account_status: AccountStatus::Active,
                grand_audit_limit: 0,
                user_icon: String::new(),
                created_at: chrono::Utc::now(),
                last_login: None,
            }
        }

        #[tokio::test]
        async fn test_mock_find_by_id() {
            let repo = MockUserAdminRepository::new().with_user(sample_user(7, "punter"));

            let found = repo.find_by_id(7).await.unwrap();
            assert!(found.is_some(), "Should find preloaded user");
            assert_eq!(found.unwrap().username, "punter");

            let missing = repo.find_by_id(999).await.unwrap();
            assert!(missing.is_none(), "Should not find non-existent ID");
        }

        #[tokio::test]
        async fn test_mock_status_filter() {
            let mut held = sample_user(2, "held");
            held.account_status = AccountStatus::Hold;

            let repo = MockUserAdminRepository::new()
                .with_user(sample_user(1, "active"))
                .with_user(held);

            let held_users = repo.list_by_status(AccountStatus::Hold).await.unwrap();
            assert_eq!(held_users.len(), 1);
            assert_eq!(held_users[0].username, "held");

            repo.set_account_status(2, AccountStatus::Active).await.unwrap();
            let held_users = repo.list_by_status(AccountStatus::Hold).await.unwrap();
            assert!(held_users.is_empty(), "No held users after reactivation");
        }

        #[tokio::test]
        async fn test_mock_expired_listing() {
            let mut lapsed = sample_user(3, "lapsed");
            lapsed.expiry = Some(chrono::Utc::now() - chrono::Duration::days(1));

            let repo = MockUserAdminRepository::new()
                .with_user(sample_user(1, "fresh"))
                .with_user(lapsed);

            let expired = repo.list_expired().await.unwrap();
            assert_eq!(expired.len(), 1);
            assert_eq!(expired[0].username, "lapsed");
        }

        #[tokio::test]
        async fn test_mock_activate_extends_expiry() {
            let mut lapsed = sample_user(4, "renewed");
            lapsed.expiry = Some(chrono::Utc::now() - chrono::Duration::days(10));
            lapsed.account_status = AccountStatus::Hold;

            let repo = MockUserAdminRepository::new().with_user(lapsed);
            repo.activate(4, 30, Some(Subscription::Premium)).await.unwrap();

            let user = repo.find_by_id(4).await.unwrap().unwrap();
            assert_eq!(user.account_status, AccountStatus::Active);
            assert_eq!(user.subscription, Subscription::Premium);
            assert!(user.expiry.unwrap() > chrono::Utc::now());
        }

        #[tokio::test]
        async fn test_mock_delete_user() {
            let repo = MockUserAdminRepository::new().with_user(sample_user(5, "gone"));

            assert!(repo.delete_user(5).await.unwrap(), "Delete should report a removed row");
            assert!(!repo.delete_user(5).await.unwrap(), "Second delete should be a no-op");
            assert!(repo.find_by_id(5).await.unwrap().is_none());
        }
    }
}
