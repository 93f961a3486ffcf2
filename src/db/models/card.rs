//! Saved cards: a user's customization of a template.

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Card {
    pub id: i64,
    pub user_id: i64,
    pub template_id: i64,
    pub title_text: String,
    pub line1_text: String,
    pub line2_text: String,
    pub label_text: Option<String>,
    pub bg_color: String,
    pub created_at: String,
}

/// Editable text/color fields of a card.
#[derive(Debug, Clone)]
pub struct CardFields {
    pub title_text: String,
    pub line1_text: String,
    pub line2_text: String,
    pub label_text: String,
    pub bg_color: String,
}

impl Card {
    pub async fn create(
        db: &SqlitePool,
        user_id: i64,
        template_id: i64,
        fields: &CardFields,
    ) -> Result<Card, sqlx::Error> {
        let now = chrono::Utc::now().to_rfc3339();

        let result = sqlx::query(
            r#"
            INSERT INTO cards (user_id, template_id, title_text, line1_text, line2_text,
                               label_text, bg_color, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(user_id)
        .bind(template_id)
        .bind(&fields.title_text)
        .bind(&fields.line1_text)
        .bind(&fields.line2_text)
        .bind(&fields.label_text)
        .bind(&fields.bg_color)
        .bind(&now)
        .execute(db)
        .await?;

        Self::find_by_id(db, result.last_insert_rowid())
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    pub async fn find_by_id(db: &SqlitePool, id: i64) -> Result<Option<Card>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM cards WHERE id = ?")
            .bind(id)
            .fetch_optional(db)
            .await
    }

    pub async fn list_for_user(db: &SqlitePool, user_id: i64) -> Result<Vec<Card>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM cards WHERE user_id = ? ORDER BY created_at DESC, id DESC")
            .bind(user_id)
            .fetch_all(db)
            .await
    }

    pub async fn update_fields(
        db: &SqlitePool,
        id: i64,
        fields: &CardFields,
    ) -> Result<Card, sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE cards
            SET title_text = ?, line1_text = ?, line2_text = ?, label_text = ?, bg_color = ?
            WHERE id = ?
            "#,
        )
        .bind(&fields.title_text)
        .bind(&fields.line1_text)
        .bind(&fields.line2_text)
        .bind(&fields.label_text)
        .bind(&fields.bg_color)
        .bind(id)
        .execute(db)
        .await?;

        Self::find_by_id(db, id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    pub async fn delete(db: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM cards WHERE id = ?")
            .bind(id)
            .execute(db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{test_pool, User};

    fn fields(title: &str) -> CardFields {
        CardFields {
            title_text: title.to_string(),
            line1_text: "line one".to_string(),
            line2_text: "line two".to_string(),
            label_text: "Custom invitation".to_string(),
            bg_color: "#fde68a".to_string(),
        }
    }

    async fn fixture(db: &SqlitePool) -> (i64, i64) {
        let user = User::create(db, "karan", "karan@example.com", "h").await.unwrap();
        let template_id = sqlx::query(
            "INSERT INTO templates (name, category, title_text, line1_text, line2_text)
             VALUES ('T', 'Birthday', 't', 'l1', 'l2')",
        )
        .execute(db)
        .await
        .unwrap()
        .last_insert_rowid();
        (user.id, template_id)
    }

    #[tokio::test]
    async fn update_changes_fields_in_place() {
        let db = test_pool().await;
        let (user_id, template_id) = fixture(&db).await;

        let card = Card::create(&db, user_id, template_id, &fields("Before")).await.unwrap();
        let updated = Card::update_fields(&db, card.id, &fields("After")).await.unwrap();

        assert_eq!(updated.id, card.id);
        assert_eq!(updated.title_text, "After");

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM cards")
            .fetch_one(&db)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn delete_reports_whether_a_row_went_away() {
        let db = test_pool().await;
        let (user_id, template_id) = fixture(&db).await;
        let card = Card::create(&db, user_id, template_id, &fields("X")).await.unwrap();

        assert!(Card::delete(&db, card.id).await.unwrap());
        assert!(!Card::delete(&db, card.id).await.unwrap());
    }
}
