//! Server-side login sessions. The browser holds only the opaque token;
//! rows store its SHA-256 digest.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Session {
    pub id: String,
    pub user_id: i64,
    pub token_hash: String,
    pub expires_at: String,
    pub created_at: String,
}

impl Session {
    pub async fn create(
        db: &SqlitePool,
        user_id: i64,
        token_hash: &str,
        ttl_days: i64,
    ) -> Result<Session, sqlx::Error> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now();
        let expires_at = (now + chrono::Duration::days(ttl_days)).to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO sessions (id, user_id, token_hash, expires_at, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(user_id)
        .bind(token_hash)
        .bind(&expires_at)
        .bind(now.to_rfc3339())
        .execute(db)
        .await?;

        sqlx::query_as("SELECT * FROM sessions WHERE id = ?")
            .bind(&id)
            .fetch_one(db)
            .await
    }

    /// Resolve a token digest to a live session. Expired rows never resolve.
    pub async fn find_active(
        db: &SqlitePool,
        token_hash: &str,
    ) -> Result<Option<Session>, sqlx::Error> {
        let session: Option<Session> = sqlx::query_as("SELECT * FROM sessions WHERE token_hash = ?")
            .bind(token_hash)
            .fetch_optional(db)
            .await?;

        Ok(session.filter(|s| !s.is_expired()))
    }

    pub async fn delete_by_token(db: &SqlitePool, token_hash: &str) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM sessions WHERE token_hash = ?")
            .bind(token_hash)
            .execute(db)
            .await?;
        Ok(())
    }

    fn is_expired(&self) -> bool {
        match DateTime::parse_from_rfc3339(&self.expires_at) {
            Ok(expires) => expires <= Utc::now(),
            // An unparseable expiry counts as expired.
            Err(_) => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{test_pool, User};

    #[tokio::test]
    async fn active_session_resolves_until_expiry() {
        let db = test_pool().await;
        let user = User::create(&db, "ishita", "ishita@example.com", "h").await.unwrap();

        Session::create(&db, user.id, "digest-1", 7).await.unwrap();
        let found = Session::find_active(&db, "digest-1").await.unwrap();
        assert_eq!(found.map(|s| s.user_id), Some(user.id));

        assert!(Session::find_active(&db, "unknown").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn expired_session_does_not_resolve() {
        let db = test_pool().await;
        let user = User::create(&db, "simran", "simran@example.com", "h").await.unwrap();

        // A negative TTL produces an expiry in the past.
        Session::create(&db, user.id, "digest-2", -1).await.unwrap();
        assert!(Session::find_active(&db, "digest-2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_by_token_logs_the_session_out() {
        let db = test_pool().await;
        let user = User::create(&db, "ved", "ved@example.com", "h").await.unwrap();

        Session::create(&db, user.id, "digest-3", 7).await.unwrap();
        Session::delete_by_token(&db, "digest-3").await.unwrap();
        assert!(Session::find_active(&db, "digest-3").await.unwrap().is_none());
    }
}
