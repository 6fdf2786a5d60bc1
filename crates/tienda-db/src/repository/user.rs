//! # User Repository
//!
//! Accounts, credentials and last-access tracking. Password hashing lives
//! in the API crate; this layer only stores the PHC string.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::info;

use crate::error::{DbError, DbResult};
use tienda_core::{NewUser, User, UserCredentials};

const USER_SELECT: &str = r#"
    SELECT u.id, u.name, u.email, u.role_id, r.name AS role_name,
           u.is_active, u.last_access_at, u.created_at
    FROM users u
    JOIN roles r ON r.id = u.role_id
"#;

/// Repository for user database operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Creates a new UserRepository.
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Looks up the active account for an email, with its password hash.
    ///
    /// Inactive accounts are invisible here, so they cannot log in. Email
    /// matching ignores ASCII case.
    pub async fn find_active_credentials_by_email(
        &self,
        email: &str,
    ) -> DbResult<Option<UserCredentials>> {
        let credentials = sqlx::query_as::<_, UserCredentials>(
            r#"
            SELECT u.id, u.name, u.email, u.role_id, r.name AS role_name,
                   u.is_active, u.last_access_at, u.created_at, u.password_hash
            FROM users u
            JOIN roles r ON r.id = u.role_id
            WHERE u.email = ?1 AND u.is_active = 1
            "#,
        )
        .bind(email.trim())
        .fetch_optional(&self.pool)
        .await?;

        Ok(credentials)
    }

    /// Gets a user by id, active or not.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<User>> {
        let sql = format!("{USER_SELECT} WHERE u.id = ?1");

        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// True when an active account already uses this email.
    pub async fn email_in_use(&self, email: &str) -> DbResult<bool> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = ?1 AND is_active = 1")
                .bind(email.trim())
                .fetch_one(&self.pool)
                .await?;

        Ok(count > 0)
    }

    /// Creates an active account.
    ///
    /// ## Returns
    /// * `Ok(id)` - The new user id
    /// * `Err(DbError::UniqueViolation)` - Email taken by an active account
    /// * `Err(DbError::ForeignKeyViolation)` - Unknown role
    pub async fn insert(&self, user: &NewUser) -> DbResult<i64> {
        let email = user.email.trim();

        let result = sqlx::query(
            r#"
            INSERT INTO users (name, email, password_hash, role_id, is_active, created_at)
            VALUES (?1, ?2, ?3, ?4, 1, ?5)
            "#,
        )
        .bind(user.name.trim())
        .bind(email)
        .bind(&user.password_hash)
        .bind(user.role_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            err if err.is_unique_violation_on("users.email") => DbError::duplicate("email", email),
            err => err,
        })?;

        let id = result.last_insert_rowid();
        info!(user_id = id, role_id = user.role_id, "User registered");
        Ok(id)
    }

    /// Stamps a successful login.
    pub async fn touch_last_access(&self, id: i64, at: DateTime<Utc>) -> DbResult<()> {
        sqlx::query("UPDATE users SET last_access_at = ?1 WHERE id = ?2")
            .bind(at)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::fixtures::database;
    use tienda_core::{Role, CLERK_ROLE_ID};

    fn clerk(email: &str) -> NewUser {
        NewUser {
            name: "Cajera Uno".to_string(),
            email: email.to_string(),
            password_hash: "$argon2id$fake".to_string(),
            role_id: CLERK_ROLE_ID,
        }
    }

    #[tokio::test]
    async fn test_insert_and_find_credentials() {
        let db = database().await;
        let repo = db.users();
        let id = repo.insert(&clerk("caja1@tienda.local")).await.unwrap();

        let found = repo
            .find_active_credentials_by_email("caja1@tienda.local")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(found.user.id, id);
        assert_eq!(found.user.role_name, Role::Cajero.as_str());
        assert_eq!(found.password_hash, "$argon2id$fake");
        assert!(found.user.last_access_at.is_none());
        assert!(repo.email_in_use("caja1@tienda.local").await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_active_email_is_rejected() {
        let db = database().await;
        let repo = db.users();
        repo.insert(&clerk("dup@tienda.local")).await.unwrap();

        let err = repo.insert(&clerk("dup@tienda.local")).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { ref field, .. } if field == "email"));
    }

    #[tokio::test]
    async fn test_email_matching_ignores_case() {
        let db = database().await;
        let repo = db.users();
        let id = repo.insert(&clerk("caja1@tienda.local")).await.unwrap();

        let found = repo
            .find_active_credentials_by_email("CAJA1@Tienda.Local")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.user.id, id);
        assert!(repo.email_in_use("CAJA1@TIENDA.LOCAL").await.unwrap());

        let err = repo.insert(&clerk("Caja1@tienda.local")).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { ref field, .. } if field == "email"));
    }

    #[tokio::test]
    async fn test_inactive_account_is_invisible_and_frees_email() {
        let db = database().await;
        let repo = db.users();
        let old = repo.insert(&clerk("rehire@tienda.local")).await.unwrap();
        sqlx::query("UPDATE users SET is_active = 0 WHERE id = ?1")
            .bind(old)
            .execute(db.pool())
            .await
            .unwrap();

        assert!(repo
            .find_active_credentials_by_email("rehire@tienda.local")
            .await
            .unwrap()
            .is_none());
        assert!(!repo.email_in_use("rehire@tienda.local").await.unwrap());
        assert!(repo.insert(&clerk("rehire@tienda.local")).await.is_ok());
    }

    #[tokio::test]
    async fn test_touch_last_access() {
        let db = database().await;
        let repo = db.users();
        let id = repo.insert(&clerk("touch@tienda.local")).await.unwrap();
        let at = Utc::now();

        repo.touch_last_access(id, at).await.unwrap();

        let user = repo.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(
            user.last_access_at.map(|t| t.timestamp()),
            Some(at.timestamp())
        );
    }

    #[tokio::test]
    async fn test_unknown_role_is_rejected() {
        let db = database().await;
        let mut user = clerk("norole@tienda.local");
        user.role_id = 99;

        let err = db.users().insert(&user).await.unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    }
}
