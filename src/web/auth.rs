//! Authentication: argon2 password hashes, DB-backed cookie sessions, the
//! current-user extractors and the register/login/logout routes.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    async_trait,
    extract::{FromRequestParts, Query, State},
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use rand::Rng;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::sync::Arc;

use crate::db::{DbPool, Session, User};
use crate::AppState;

use super::error::PageError;
use super::flash::{self, Flash};
use super::views::{self, PageContext};

pub const SESSION_COOKIE: &str = "cardhub_session";

/// Hash a password using Argon2
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2.hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Verify a password against a hash
pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

/// Generate a random session token
fn generate_token() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 32] = rng.random();
    hex::encode(bytes)
}

/// Hash a token for storage
fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// Create an account. Empty fields are a validation error, a taken username
/// or e-mail a conflict.
pub async fn register_user(
    db: &DbPool,
    username: &str,
    email: &str,
    password: &str,
) -> Result<User, PageError> {
    if username.is_empty() || email.is_empty() || password.is_empty() {
        return Err(PageError::Validation("All fields are required.".to_string()));
    }
    if User::identity_taken(db, username, email, None).await? {
        return Err(PageError::Conflict(
            "Username or email already exists.".to_string(),
        ));
    }

    let password_hash =
        hash_password(password).map_err(|e| PageError::Internal(e.to_string()))?;

    // A concurrent registration can still slip past the check above; the
    // UNIQUE constraint maps back to Conflict.
    User::create(db, username, email, &password_hash)
        .await
        .map_err(PageError::from)
}

/// Resolve an identifier (username, or e-mail matched lower-cased) and verify
/// the password.
pub async fn authenticate(
    db: &DbPool,
    identifier: &str,
    password: &str,
) -> Result<User, PageError> {
    let user = User::find_by_identifier(db, identifier).await?;
    match user {
        Some(user) if verify_password(password, &user.password_hash) => Ok(user),
        _ => Err(PageError::Auth),
    }
}

/// Open a session for the user and set the session cookie.
pub async fn open_session(
    db: &DbPool,
    jar: CookieJar,
    user_id: i64,
    ttl_days: i64,
) -> Result<CookieJar, PageError> {
    let token = generate_token();
    Session::create(db, user_id, &hash_token(&token), ttl_days).await?;

    let cookie = Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();
    Ok(jar.add(cookie))
}

/// Delete the session row and clear the cookie.
pub async fn close_session(db: &DbPool, jar: CookieJar) -> Result<CookieJar, PageError> {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        Session::delete_by_token(db, &hash_token(cookie.value())).await?;
    }
    Ok(jar.remove(Cookie::build((SESSION_COOKIE, "")).path("/").build()))
}

/// Resolve the session cookie to a user, if any.
async fn resolve_user(db: &DbPool, jar: &CookieJar) -> Result<Option<User>, sqlx::Error> {
    let Some(cookie) = jar.get(SESSION_COOKIE) else {
        return Ok(None);
    };
    let Some(session) = Session::find_active(db, &hash_token(cookie.value())).await? else {
        return Ok(None);
    };
    User::find_by_id(db, session.user_id).await
}

/// The current user when logged in, `None` otherwise. Never rejects an
/// anonymous request.
pub struct OptionalUser(pub Option<User>);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for OptionalUser {
    type Rejection = PageError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let user = resolve_user(&state.db, &jar).await?;
        Ok(OptionalUser(user))
    }
}

/// The current user on routes that require one. Anonymous callers are
/// redirected to the login form, keeping the requested path for the
/// post-login redirect.
pub struct AuthUser(pub User);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        match resolve_user(&state.db, &jar).await {
            Ok(Some(user)) => Ok(AuthUser(user)),
            Ok(None) => {
                let jar = flash::push(jar, &Flash::warning("Please log in to continue."));
                let target = format!("/login?next={}", parts.uri.path());
                Err((jar, Redirect::to(&target)).into_response())
            }
            Err(err) => Err(PageError::from(err).into_response()),
        }
    }
}

/// Only path-local redirect targets are honored; anything else goes home.
fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(path) if path.starts_with('/') && !path.starts_with("//") => path,
        _ => "/",
    }
}

#[derive(Debug, Deserialize)]
pub struct NextParam {
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    username: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    username_or_email: String,
    #[serde(default)]
    password: String,
}

pub async fn register_page(
    OptionalUser(user): OptionalUser,
    Query(query): Query<NextParam>,
    jar: CookieJar,
) -> Result<Response, PageError> {
    let (jar, flash) = flash::take(jar);
    let ctx = PageContext { user, flash };
    Ok((jar, views::register_page(&ctx, query.next.as_deref())).into_response())
}

pub async fn register_submit(
    State(state): State<Arc<AppState>>,
    Query(query): Query<NextParam>,
    jar: CookieJar,
    Form(form): Form<RegisterForm>,
) -> Result<Response, PageError> {
    let username = form.username.trim();
    let email = form.email.trim().to_lowercase();

    match register_user(&state.db, username, &email, &form.password).await {
        Ok(user) => {
            let jar = open_session(
                &state.db,
                jar,
                user.id,
                state.config.auth.session_ttl_days,
            )
            .await?;
            let jar = flash::push(jar, &Flash::success("Account created and logged in!"));
            Ok((jar, Redirect::to(safe_next(query.next.as_deref()))).into_response())
        }
        Err(err @ (PageError::Validation(_) | PageError::Conflict(_))) => {
            let jar = flash::push(jar, &Flash::error(err.to_string()));
            Ok((jar, Redirect::to("/register")).into_response())
        }
        Err(err) => Err(err),
    }
}

pub async fn login_page(
    OptionalUser(user): OptionalUser,
    Query(query): Query<NextParam>,
    jar: CookieJar,
) -> Result<Response, PageError> {
    let (jar, flash) = flash::take(jar);
    let ctx = PageContext { user, flash };
    Ok((jar, views::login_page(&ctx, query.next.as_deref())).into_response())
}

pub async fn login_submit(
    State(state): State<Arc<AppState>>,
    Query(query): Query<NextParam>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<Response, PageError> {
    match authenticate(&state.db, form.username_or_email.trim(), &form.password).await {
        Ok(user) => {
            let jar = open_session(
                &state.db,
                jar,
                user.id,
                state.config.auth.session_ttl_days,
            )
            .await?;
            let jar = flash::push(jar, &Flash::success("Logged in successfully."));
            Ok((jar, Redirect::to(safe_next(query.next.as_deref()))).into_response())
        }
        Err(PageError::Auth) => {
            let jar = flash::push(jar, &Flash::error("Invalid credentials."));
            Ok((jar, Redirect::to("/login")).into_response())
        }
        Err(err) => Err(err),
    }
}

pub async fn logout(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<Response, PageError> {
    let jar = close_session(&state.db, jar).await?;
    let jar = flash::push(jar, &Flash::info("Logged out."));
    Ok((jar, Redirect::to("/")).into_response())
}
