//! User accounts.

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: String,
}

impl User {
    /// Create a user. Username/email uniqueness is enforced by the schema;
    /// violations surface as a UNIQUE constraint error.
    pub async fn create(
        db: &SqlitePool,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, sqlx::Error> {
        let now = chrono::Utc::now().to_rfc3339();

        let result = sqlx::query(
            r#"
            INSERT INTO users (username, email, password_hash, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .bind(&now)
        .execute(db)
        .await?;

        Self::find_by_id(db, result.last_insert_rowid())
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    pub async fn find_by_id(db: &SqlitePool, id: i64) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(db)
            .await
    }

    /// Find a user by username, or by e-mail after lower-casing the
    /// identifier. This is the login lookup.
    pub async fn find_by_identifier(
        db: &SqlitePool,
        identifier: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM users WHERE username = ? OR email = ?")
            .bind(identifier)
            .bind(identifier.to_lowercase())
            .fetch_optional(db)
            .await
    }

    /// Whether another user already holds this username or e-mail.
    /// `exclude_id` skips the given user, for profile edits.
    pub async fn identity_taken(
        db: &SqlitePool,
        username: &str,
        email: &str,
        exclude_id: Option<i64>,
    ) -> Result<bool, sqlx::Error> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM users
            WHERE (username = ? OR email = ?) AND id != ?
            "#,
        )
        .bind(username)
        .bind(email)
        .bind(exclude_id.unwrap_or(-1))
        .fetch_one(db)
        .await?;

        Ok(count > 0)
    }

    /// Update username/e-mail, and the password hash when one is supplied.
    pub async fn update_profile(
        db: &SqlitePool,
        id: i64,
        username: &str,
        email: &str,
        password_hash: Option<&str>,
    ) -> Result<User, sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE users
            SET username = ?, email = ?, password_hash = COALESCE(?, password_hash)
            WHERE id = ?
            "#,
        )
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .bind(id)
        .execute(db)
        .await?;

        Self::find_by_id(db, id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    #[tokio::test]
    async fn identifier_lookup_matches_username_or_lowercased_email() {
        let db = test_pool().await;
        let user = User::create(&db, "priya", "priya@example.com", "hash")
            .await
            .unwrap();

        let by_name = User::find_by_identifier(&db, "priya").await.unwrap();
        assert_eq!(by_name.map(|u| u.id), Some(user.id));

        // E-mail is matched case-insensitively; username is not.
        let by_email = User::find_by_identifier(&db, "PRIYA@EXAMPLE.COM")
            .await
            .unwrap();
        assert_eq!(by_email.map(|u| u.id), Some(user.id));

        assert!(User::find_by_identifier(&db, "PRIYA").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn identity_taken_respects_exclusion() {
        let db = test_pool().await;
        let a = User::create(&db, "amit", "amit@example.com", "h").await.unwrap();
        User::create(&db, "neha", "neha@example.com", "h").await.unwrap();

        assert!(User::identity_taken(&db, "amit", "new@example.com", None)
            .await
            .unwrap());
        // A user does not conflict with itself.
        assert!(!User::identity_taken(&db, "amit", "amit@example.com", Some(a.id))
            .await
            .unwrap());
        // But does conflict with someone else's identity.
        assert!(User::identity_taken(&db, "neha", "amit@example.com", Some(a.id))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn duplicate_username_is_rejected_by_schema() {
        let db = test_pool().await;
        User::create(&db, "rohan", "rohan@example.com", "h").await.unwrap();

        let err = User::create(&db, "rohan", "other@example.com", "h").await;
        assert!(err.is_err());

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&db)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }
}
