pub mod auth;
mod cards;
pub mod error;
pub mod flash;
pub mod meta;
mod pages;
mod profile;
mod reviews;
mod views;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{compression::CompressionLayer, services::ServeDir, trace::TraceLayer};

use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Browsing
        .route("/", get(pages::home))
        .route("/templates", get(pages::templates_gallery))
        .route("/template/:id", get(pages::template_detail))
        .route("/reviews", get(pages::reviews_index))
        .route("/discover", get(pages::discover))
        .route("/about", get(pages::about))
        // Accounts
        .route("/register", get(auth::register_page).post(auth::register_submit))
        .route("/login", get(auth::login_page).post(auth::login_submit))
        .route("/logout", get(auth::logout))
        .route("/profile", get(profile::profile))
        .route(
            "/edit-profile",
            get(profile::edit_profile_page).post(profile::edit_profile_submit),
        )
        // Cards
        .route("/editor/:template_id", get(cards::editor))
        .route("/save-card/:template_id", post(cards::save_card))
        .route("/edit-card/:card_id", get(cards::edit_card))
        .route("/delete-card/:card_id", post(cards::delete_card))
        // Reviews
        .route("/review/:template_id", post(reviews::add_review))
        .route("/health", get(health_check))
        .nest_service("/static", ServeDir::new("static"))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
