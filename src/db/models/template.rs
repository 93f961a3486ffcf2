//! Card template catalog.

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Template {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub thumbnail: String,
    pub bg_color: String,
    pub bg_image: Option<String>,
    pub title_text: String,
    pub line1_text: String,
    pub line2_text: String,
    pub likes: i64,
    pub rating: f64,
    pub review_count: i64,
}

/// Round to one decimal, the precision ratings are stored and displayed at.
pub fn round_rating(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

impl Template {
    pub async fn count(db: &SqlitePool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM templates")
            .fetch_one(db)
            .await
    }

    pub async fn find_by_id(db: &SqlitePool, id: i64) -> Result<Option<Template>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM templates WHERE id = ?")
            .bind(id)
            .fetch_optional(db)
            .await
    }

    pub async fn list_all(db: &SqlitePool) -> Result<Vec<Template>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM templates ORDER BY id ASC")
            .fetch_all(db)
            .await
    }

    pub async fn list_by_category(
        db: &SqlitePool,
        category: &str,
    ) -> Result<Vec<Template>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM templates WHERE category = ? ORDER BY id ASC")
            .bind(category)
            .fetch_all(db)
            .await
    }

    /// The oldest rows in the catalog, shown as the featured strip.
    pub async fn list_featured(db: &SqlitePool, limit: i64) -> Result<Vec<Template>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM templates ORDER BY id ASC LIMIT ?")
            .bind(limit)
            .fetch_all(db)
            .await
    }

    pub async fn list_recent(db: &SqlitePool, limit: i64) -> Result<Vec<Template>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM templates ORDER BY id DESC LIMIT ?")
            .bind(limit)
            .fetch_all(db)
            .await
    }

    pub async fn distinct_categories(db: &SqlitePool) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar("SELECT DISTINCT category FROM templates ORDER BY category ASC")
            .fetch_all(db)
            .await
    }

    /// Recompute the stored review aggregates from scratch.
    ///
    /// Runs after every review insert, in the same request. The read and the
    /// write are not wrapped in a transaction; concurrent submissions resolve
    /// last-write-wins, which is fine for advisory display data.
    pub async fn recompute_rating(db: &SqlitePool, template_id: i64) -> Result<(), sqlx::Error> {
        let (count, avg): (i64, Option<f64>) =
            sqlx::query_as("SELECT COUNT(*), AVG(rating) FROM reviews WHERE template_id = ?")
                .bind(template_id)
                .fetch_one(db)
                .await?;

        if let Some(avg) = avg {
            sqlx::query("UPDATE templates SET rating = ?, review_count = ? WHERE id = ?")
                .bind(round_rating(avg))
                .bind(count)
                .bind(template_id)
                .execute(db)
                .await?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{test_pool, Review};

    async fn bare_template(db: &SqlitePool) -> Template {
        sqlx::query(
            r#"
            INSERT INTO templates (name, category, title_text, line1_text, line2_text)
            VALUES ('Test Invite', 'Birthday', 'Title', 'Line 1', 'Line 2')
            "#,
        )
        .execute(db)
        .await
        .unwrap();
        Template::find_by_id(db, 1).await.unwrap().unwrap()
    }

    #[test]
    fn rounding_is_one_decimal() {
        assert_eq!(round_rating(4.25), 4.3);
        assert_eq!(round_rating(4.4333333), 4.4);
        assert_eq!(round_rating(5.0), 5.0);
    }

    #[tokio::test]
    async fn recompute_matches_mean_and_count() {
        let db = test_pool().await;
        let tpl = bare_template(&db).await;

        for rating in [5, 4, 4] {
            Review::create(&db, None, tpl.id, rating, "nice", Some("Ved"))
                .await
                .unwrap();
            Template::recompute_rating(&db, tpl.id).await.unwrap();
        }

        let tpl = Template::find_by_id(&db, tpl.id).await.unwrap().unwrap();
        assert_eq!(tpl.review_count, 3);
        // mean(5, 4, 4) = 4.333... -> 4.3
        assert_eq!(tpl.rating, 4.3);
    }

    #[tokio::test]
    async fn recompute_without_reviews_leaves_row_untouched() {
        let db = test_pool().await;
        let tpl = bare_template(&db).await;
        let before = (tpl.rating, tpl.review_count);

        Template::recompute_rating(&db, tpl.id).await.unwrap();

        let tpl = Template::find_by_id(&db, tpl.id).await.unwrap().unwrap();
        assert_eq!((tpl.rating, tpl.review_count), before);
    }
}
