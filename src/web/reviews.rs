//! Review submission and the rating aggregator trigger.

use axum::extract::{Path, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Form;
use axum_extra::extract::cookie::CookieJar;
use rand::Rng;
use serde::Deserialize;
use std::sync::Arc;

use crate::db::{Review, Template, REVIEW_NAMES};
use crate::AppState;

use super::auth::OptionalUser;
use super::error::PageError;
use super::flash::{self, Flash};

const MAX_COMMENT_CHARS: usize = 400;

#[derive(Debug, Deserialize)]
pub struct ReviewForm {
    rating: Option<String>,
    comment: Option<String>,
    name: Option<String>,
}

/// Parse the submitted rating, defaulting malformed input to 5 and clamping
/// to the valid range.
fn parse_rating(raw: Option<&str>) -> i64 {
    raw.unwrap_or("5")
        .trim()
        .parse::<i64>()
        .unwrap_or(5)
        .clamp(1, 5)
}

/// Cut a comment at the storage limit without splitting a character.
fn truncate_comment(comment: &str) -> String {
    comment.chars().take(MAX_COMMENT_CHARS).collect()
}

pub async fn add_review(
    State(state): State<Arc<AppState>>,
    OptionalUser(user): OptionalUser,
    Path(template_id): Path<i64>,
    jar: CookieJar,
    Form(form): Form<ReviewForm>,
) -> Result<Response, PageError> {
    let template = Template::find_by_id(&state.db, template_id)
        .await?
        .ok_or(PageError::NotFound)?;
    let detail_url = format!("/template/{}", template.id);

    let comment = form.comment.as_deref().unwrap_or("").trim().to_string();
    if comment.is_empty() {
        let jar = flash::push(jar, &Flash::error("Please write a short review."));
        return Ok((jar, Redirect::to(&detail_url)).into_response());
    }

    let rating = parse_rating(form.rating.as_deref());

    let display_name = match &user {
        Some(user) => user.username.clone(),
        None => {
            let supplied = form.name.as_deref().unwrap_or("").trim();
            if supplied.is_empty() {
                REVIEW_NAMES[rand::rng().random_range(0..REVIEW_NAMES.len())].to_string()
            } else {
                supplied.to_string()
            }
        }
    };

    Review::create(
        &state.db,
        user.as_ref().map(|u| u.id),
        template.id,
        rating,
        &truncate_comment(&comment),
        Some(&display_name),
    )
    .await?;

    // Keep the stored aggregates in step with the reviews that exist.
    Template::recompute_rating(&state.db, template.id).await?;

    let jar = flash::push(
        jar,
        &Flash::success("Review added. Thank you for your feedback!"),
    );
    Ok((jar, Redirect::to(&detail_url)).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    #[test]
    fn rating_is_clamped_and_defaulted() {
        assert_eq!(parse_rating(Some("7")), 5);
        assert_eq!(parse_rating(Some("abc")), 5);
        assert_eq!(parse_rating(Some("0")), 1);
        assert_eq!(parse_rating(Some("-3")), 1);
        assert_eq!(parse_rating(Some("3")), 3);
        assert_eq!(parse_rating(None), 5);
    }

    #[test]
    fn comment_truncation_counts_characters() {
        let long = "é".repeat(500);
        let cut = truncate_comment(&long);
        assert_eq!(cut.chars().count(), MAX_COMMENT_CHARS);

        assert_eq!(truncate_comment("short"), "short");
    }

    #[tokio::test]
    async fn aggregates_follow_each_insert() {
        let db = test_pool().await;
        sqlx::query(
            "INSERT INTO templates (name, category, title_text, line1_text, line2_text, rating, review_count)
             VALUES ('T', 'Birthday', 't', 'l1', 'l2', 4.7, 99)",
        )
        .execute(&db)
        .await
        .unwrap();

        for (rating, expected_avg, expected_count) in [(5, 5.0, 1), (4, 4.5, 2), (3, 4.0, 3)] {
            Review::create(&db, None, 1, rating, "ok", Some("Neha")).await.unwrap();
            Template::recompute_rating(&db, 1).await.unwrap();

            let tpl = Template::find_by_id(&db, 1).await.unwrap().unwrap();
            assert_eq!(tpl.rating, expected_avg);
            assert_eq!(tpl.review_count, expected_count);
        }
    }
}
