//! Template reviews. Insert-only: a review is never edited or removed.

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use std::collections::HashMap;

use super::template::round_rating;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Review {
    pub id: i64,
    pub user_id: Option<i64>,
    pub template_id: i64,
    pub rating: i64,
    pub comment: String,
    pub display_name: Option<String>,
    pub created_at: String,
}

/// Real review aggregates for one template, used by the display layer.
#[derive(Debug, Clone, Copy)]
pub struct ReviewStats {
    pub count: i64,
    pub average: f64,
}

impl Review {
    pub async fn create(
        db: &SqlitePool,
        user_id: Option<i64>,
        template_id: i64,
        rating: i64,
        comment: &str,
        display_name: Option<&str>,
    ) -> Result<Review, sqlx::Error> {
        let now = chrono::Utc::now().to_rfc3339();

        let result = sqlx::query(
            r#"
            INSERT INTO reviews (user_id, template_id, rating, comment, display_name, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(user_id)
        .bind(template_id)
        .bind(rating)
        .bind(comment)
        .bind(display_name)
        .bind(&now)
        .execute(db)
        .await?;

        sqlx::query_as("SELECT * FROM reviews WHERE id = ?")
            .bind(result.last_insert_rowid())
            .fetch_one(db)
            .await
    }

    pub async fn list_for_template(
        db: &SqlitePool,
        template_id: i64,
    ) -> Result<Vec<Review>, sqlx::Error> {
        sqlx::query_as(
            "SELECT * FROM reviews WHERE template_id = ? ORDER BY created_at DESC, id DESC",
        )
        .bind(template_id)
        .fetch_all(db)
        .await
    }

    pub async fn list_for_user(db: &SqlitePool, user_id: i64) -> Result<Vec<Review>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM reviews WHERE user_id = ? ORDER BY created_at DESC, id DESC")
            .bind(user_id)
            .fetch_all(db)
            .await
    }

    pub async fn list_recent(db: &SqlitePool, limit: i64) -> Result<Vec<Review>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM reviews ORDER BY created_at DESC, id DESC LIMIT ?")
            .bind(limit)
            .fetch_all(db)
            .await
    }

    /// Count and one-decimal mean rating per template, for every template
    /// that has at least one review.
    pub async fn stats_by_template(
        db: &SqlitePool,
    ) -> Result<HashMap<i64, ReviewStats>, sqlx::Error> {
        let rows: Vec<(i64, i64, f64)> = sqlx::query_as(
            "SELECT template_id, COUNT(*), AVG(rating) FROM reviews GROUP BY template_id",
        )
        .fetch_all(db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(template_id, count, avg)| {
                (
                    template_id,
                    ReviewStats {
                        count,
                        average: round_rating(avg),
                    },
                )
            })
            .collect())
    }
}
