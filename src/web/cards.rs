//! Card editor routes: create-or-update, owner-gated edit and delete.

use axum::extract::{Path, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Form;
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use std::sync::Arc;

use crate::db::{Card, CardFields, DbPool, Template};
use crate::AppState;

use super::auth::AuthUser;
use super::error::PageError;
use super::flash::{self, Flash};
use super::views::{self, PageContext};

#[derive(Debug, Deserialize)]
pub struct CardForm {
    card_id: Option<String>,
    title: Option<String>,
    line1: Option<String>,
    line2: Option<String>,
    label: Option<String>,
    bg: Option<String>,
}

/// Load a card and require it to belong to `user_id`.
async fn owned_card(db: &DbPool, card_id: i64, user_id: i64) -> Result<Card, PageError> {
    let card = Card::find_by_id(db, card_id)
        .await?
        .ok_or(PageError::NotFound)?;
    if card.user_id != user_id {
        return Err(PageError::Forbidden);
    }
    Ok(card)
}

/// Update the card named by `card_id` when it exists and belongs to the
/// user; in every other case create a fresh card. Returns the card and
/// whether an existing one was updated.
async fn save_or_create(
    db: &DbPool,
    user_id: i64,
    template_id: i64,
    card_id: Option<&str>,
    fields: &CardFields,
) -> Result<(Card, bool), PageError> {
    if let Some(id) = card_id.and_then(|raw| raw.trim().parse::<i64>().ok()) {
        if let Some(card) = Card::find_by_id(db, id).await? {
            if card.user_id == user_id {
                let card = Card::update_fields(db, id, fields).await?;
                return Ok((card, true));
            }
        }
    }

    let card = Card::create(db, user_id, template_id, fields).await?;
    Ok((card, false))
}

pub async fn editor(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(template_id): Path<i64>,
    jar: CookieJar,
) -> Result<Response, PageError> {
    let template = Template::find_by_id(&state.db, template_id)
        .await?
        .ok_or(PageError::NotFound)?;

    let (jar, flash) = flash::take(jar);
    let ctx = PageContext {
        user: Some(user),
        flash,
    };
    Ok((jar, views::editor_page(&ctx, &template, None)).into_response())
}

pub async fn edit_card(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(card_id): Path<i64>,
    jar: CookieJar,
) -> Result<Response, PageError> {
    let card = owned_card(&state.db, card_id, user.id).await?;
    let template = Template::find_by_id(&state.db, card.template_id)
        .await?
        .ok_or(PageError::NotFound)?;

    let (jar, flash) = flash::take(jar);
    let ctx = PageContext {
        user: Some(user),
        flash,
    };
    Ok((jar, views::editor_page(&ctx, &template, Some(&card))).into_response())
}

pub async fn save_card(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(template_id): Path<i64>,
    jar: CookieJar,
    Form(form): Form<CardForm>,
) -> Result<Response, PageError> {
    let template = Template::find_by_id(&state.db, template_id)
        .await?
        .ok_or(PageError::NotFound)?;

    // Missing fields fall back to the template's own text and colour.
    let fields = CardFields {
        title_text: form.title.unwrap_or_else(|| template.title_text.clone()),
        line1_text: form.line1.unwrap_or_else(|| template.line1_text.clone()),
        line2_text: form.line2.unwrap_or_else(|| template.line2_text.clone()),
        label_text: form
            .label
            .unwrap_or_else(|| "Custom invitation".to_string()),
        bg_color: form.bg.unwrap_or_else(|| template.bg_color.clone()),
    };

    let (_, updated) = save_or_create(
        &state.db,
        user.id,
        template.id,
        form.card_id.as_deref(),
        &fields,
    )
    .await?;

    let message = if updated {
        "Card updated successfully."
    } else {
        "Card saved to your profile."
    };
    let jar = flash::push(jar, &Flash::success(message));
    Ok((jar, Redirect::to("/profile")).into_response())
}

pub async fn delete_card(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(card_id): Path<i64>,
    jar: CookieJar,
) -> Result<Response, PageError> {
    let card = owned_card(&state.db, card_id, user.id).await?;
    Card::delete(&state.db, card.id).await?;

    let jar = flash::push(jar, &Flash::info("Card deleted successfully."));
    Ok((jar, Redirect::to("/profile")).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{test_pool, User};

    fn fields(title: &str) -> CardFields {
        CardFields {
            title_text: title.to_string(),
            line1_text: "l1".to_string(),
            line2_text: "l2".to_string(),
            label_text: "Custom invitation".to_string(),
            bg_color: "#ffffff".to_string(),
        }
    }

    async fn fixture(db: &DbPool) -> (User, User, i64) {
        let owner = User::create(db, "owner", "owner@example.com", "h").await.unwrap();
        let other = User::create(db, "other", "other@example.com", "h").await.unwrap();
        let template_id = sqlx::query(
            "INSERT INTO templates (name, category, title_text, line1_text, line2_text)
             VALUES ('T', 'Birthday', 't', 'l1', 'l2')",
        )
        .execute(db)
        .await
        .unwrap()
        .last_insert_rowid();
        (owner, other, template_id)
    }

    async fn card_count(db: &DbPool) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM cards")
            .fetch_one(db)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn owned_card_id_updates_in_place() {
        let db = test_pool().await;
        let (owner, _, template_id) = fixture(&db).await;
        let existing = Card::create(&db, owner.id, template_id, &fields("Old")).await.unwrap();

        let (card, updated) = save_or_create(
            &db,
            owner.id,
            template_id,
            Some(&existing.id.to_string()),
            &fields("New"),
        )
        .await
        .unwrap();

        assert!(updated);
        assert_eq!(card.id, existing.id);
        assert_eq!(card.title_text, "New");
        assert_eq!(card_count(&db).await, 1);
    }

    #[tokio::test]
    async fn missing_or_foreign_card_id_creates_one_card() {
        let db = test_pool().await;
        let (owner, other, template_id) = fixture(&db).await;
        let foreign = Card::create(&db, other.id, template_id, &fields("Theirs")).await.unwrap();

        // No card_id at all.
        let (_, updated) = save_or_create(&db, owner.id, template_id, None, &fields("A"))
            .await
            .unwrap();
        assert!(!updated);

        // Empty string, as an untouched form field posts it.
        let (_, updated) = save_or_create(&db, owner.id, template_id, Some(""), &fields("B"))
            .await
            .unwrap();
        assert!(!updated);

        // Someone else's card: falls through to create, theirs is untouched.
        let (_, updated) = save_or_create(
            &db,
            owner.id,
            template_id,
            Some(&foreign.id.to_string()),
            &fields("C"),
        )
        .await
        .unwrap();
        assert!(!updated);

        let theirs = Card::find_by_id(&db, foreign.id).await.unwrap().unwrap();
        assert_eq!(theirs.title_text, "Theirs");
        assert_eq!(card_count(&db).await, 4);
    }

    #[tokio::test]
    async fn foreign_card_access_is_forbidden() {
        let db = test_pool().await;
        let (owner, other, template_id) = fixture(&db).await;
        let card = Card::create(&db, owner.id, template_id, &fields("Mine")).await.unwrap();

        let err = owned_card(&db, card.id, other.id).await;
        assert!(matches!(err, Err(PageError::Forbidden)));

        let err = owned_card(&db, 9999, other.id).await;
        assert!(matches!(err, Err(PageError::NotFound)));

        // The failed access left the card alone.
        let mine = Card::find_by_id(&db, card.id).await.unwrap().unwrap();
        assert_eq!(mine.title_text, "Mine");
    }
}
