//! The profile page and profile editing.

use axum::extract::State;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Form;
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use std::sync::Arc;

use crate::db::{Card, Review, User};
use crate::AppState;

use super::auth::{hash_password, AuthUser};
use super::error::PageError;
use super::flash::{self, Flash};
use super::views::{self, PageContext};

pub async fn profile(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    jar: CookieJar,
) -> Result<Response, PageError> {
    let cards = Card::list_for_user(&state.db, user.id).await?;
    let reviews = Review::list_for_user(&state.db, user.id).await?;

    let (jar, flash) = flash::take(jar);
    let ctx = PageContext {
        user: Some(user.clone()),
        flash,
    };
    Ok((jar, views::profile_page(&ctx, &user, &cards, &reviews)).into_response())
}

pub async fn edit_profile_page(
    AuthUser(user): AuthUser,
    jar: CookieJar,
) -> Result<Response, PageError> {
    let (jar, flash) = flash::take(jar);
    let ctx = PageContext {
        user: Some(user.clone()),
        flash,
    };
    Ok((jar, views::edit_profile_page(&ctx, &user)).into_response())
}

#[derive(Debug, Deserialize)]
pub struct EditProfileForm {
    #[serde(default)]
    username: String,
    #[serde(default)]
    email: String,
    password: Option<String>,
}

pub async fn edit_profile_submit(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    jar: CookieJar,
    Form(form): Form<EditProfileForm>,
) -> Result<Response, PageError> {
    let username = form.username.trim();
    let email = form.email.trim().to_lowercase();

    if username.is_empty() || email.is_empty() {
        let jar = flash::push(jar, &Flash::error("Username and email cannot be empty."));
        return Ok((jar, Redirect::to("/edit-profile")).into_response());
    }

    if User::identity_taken(&state.db, username, &email, Some(user.id)).await? {
        let jar = flash::push(jar, &Flash::error("Username or email already in use."));
        return Ok((jar, Redirect::to("/edit-profile")).into_response());
    }

    let password_hash = match form.password.as_deref().map(str::trim) {
        Some(password) if !password.is_empty() => {
            Some(hash_password(password).map_err(|e| PageError::Internal(e.to_string()))?)
        }
        _ => None,
    };

    User::update_profile(
        &state.db,
        user.id,
        username,
        &email,
        password_hash.as_deref(),
    )
    .await?;

    let jar = flash::push(jar, &Flash::success("Profile updated successfully."));
    Ok((jar, Redirect::to("/profile")).into_response())
}

#[cfg(test)]
mod tests {
    use crate::db::{test_pool, User};

    #[tokio::test]
    async fn profile_update_keeps_password_when_blank() {
        let db = test_pool().await;
        let user = User::create(&db, "ved", "ved@example.com", "original-hash")
            .await
            .unwrap();

        let updated = User::update_profile(&db, user.id, "ved2", "ved2@example.com", None)
            .await
            .unwrap();
        assert_eq!(updated.username, "ved2");
        assert_eq!(updated.password_hash, "original-hash");

        let updated = User::update_profile(&db, user.id, "ved2", "ved2@example.com", Some("new-hash"))
            .await
            .unwrap();
        assert_eq!(updated.password_hash, "new-hash");
    }
}
