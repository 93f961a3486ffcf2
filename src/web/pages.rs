//! Public browsing pages: home, gallery, detail, reviews, discover, about.

use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use std::sync::Arc;

use crate::db::{round_rating, Review, Template};
use crate::AppState;

use super::auth::OptionalUser;
use super::error::PageError;
use super::flash;
use super::meta::{attach_meta, rank_for_discover, DiscoverMode, ThreadDisplayRng};
use super::views::{self, PageContext};

/// Listing sizes: featured/recent strips on home, discover ranking cut-off.
const HOME_STRIP: i64 = 12;
const DISCOVER_LIMIT: usize = 24;
const RECENT_REVIEWS: i64 = 60;

pub async fn home(
    State(state): State<Arc<AppState>>,
    OptionalUser(user): OptionalUser,
    jar: CookieJar,
) -> Result<Response, PageError> {
    let categories = Template::distinct_categories(&state.db).await?;
    let featured = Template::list_featured(&state.db, HOME_STRIP).await?;
    let recent = Template::list_recent(&state.db, HOME_STRIP).await?;
    let stats = Review::stats_by_template(&state.db).await?;

    let mut rng = ThreadDisplayRng;
    let featured = attach_meta(featured, &stats, &mut rng);
    let recent = attach_meta(recent, &stats, &mut rng);

    let (jar, flash) = flash::take(jar);
    let ctx = PageContext { user, flash };
    Ok((jar, views::home_page(&ctx, &categories, &featured, &recent)).into_response())
}

#[derive(Debug, Deserialize)]
pub struct GalleryParams {
    category: Option<String>,
}

pub async fn templates_gallery(
    State(state): State<Arc<AppState>>,
    OptionalUser(user): OptionalUser,
    Query(params): Query<GalleryParams>,
    jar: CookieJar,
) -> Result<Response, PageError> {
    let category = params.category.as_deref().filter(|c| !c.is_empty());

    let templates = match category {
        Some(category) => Template::list_by_category(&state.db, category).await?,
        None => Template::list_all(&state.db).await?,
    };
    let categories = Template::distinct_categories(&state.db).await?;
    let stats = Review::stats_by_template(&state.db).await?;
    let metas = attach_meta(templates, &stats, &mut ThreadDisplayRng);

    let (jar, flash) = flash::take(jar);
    let ctx = PageContext { user, flash };
    Ok((jar, views::gallery_page(&ctx, &metas, &categories, category)).into_response())
}

pub async fn template_detail(
    State(state): State<Arc<AppState>>,
    OptionalUser(user): OptionalUser,
    Path(template_id): Path<i64>,
    jar: CookieJar,
) -> Result<Response, PageError> {
    let template = Template::find_by_id(&state.db, template_id)
        .await?
        .ok_or(PageError::NotFound)?;

    let stats = Review::stats_by_template(&state.db).await?;
    let metas = attach_meta(vec![template], &stats, &mut ThreadDisplayRng);
    let meta = metas.into_iter().next().ok_or(PageError::NotFound)?;

    let reviews = Review::list_for_template(&state.db, template_id).await?;
    let avg_rating = if reviews.is_empty() {
        None
    } else {
        let sum: i64 = reviews.iter().map(|r| r.rating).sum();
        Some(round_rating(sum as f64 / reviews.len() as f64))
    };

    let (jar, flash) = flash::take(jar);
    let ctx = PageContext { user, flash };
    Ok((
        jar,
        views::template_detail_page(&ctx, &meta, &reviews, avg_rating),
    )
        .into_response())
}

pub async fn reviews_index(
    State(state): State<Arc<AppState>>,
    OptionalUser(user): OptionalUser,
    jar: CookieJar,
) -> Result<Response, PageError> {
    let reviews = Review::list_recent(&state.db, RECENT_REVIEWS).await?;

    let (jar, flash) = flash::take(jar);
    let ctx = PageContext { user, flash };
    Ok((jar, views::reviews_page(&ctx, &reviews)).into_response())
}

#[derive(Debug, Deserialize)]
pub struct DiscoverParams {
    mode: Option<String>,
}

pub async fn discover(
    State(state): State<Arc<AppState>>,
    OptionalUser(user): OptionalUser,
    Query(params): Query<DiscoverParams>,
    jar: CookieJar,
) -> Result<Response, PageError> {
    let mode = DiscoverMode::from_param(params.mode.as_deref());

    let templates = Template::list_all(&state.db).await?;
    let stats = Review::stats_by_template(&state.db).await?;
    let metas = attach_meta(templates, &stats, &mut ThreadDisplayRng);
    let ranked = rank_for_discover(metas, mode, DISCOVER_LIMIT);

    let (jar, flash) = flash::take(jar);
    let ctx = PageContext { user, flash };
    Ok((jar, views::discover_page(&ctx, mode, &ranked)).into_response())
}

pub async fn about(OptionalUser(user): OptionalUser, jar: CookieJar) -> Response {
    let (jar, flash) = flash::take(jar);
    let ctx = PageContext { user, flash };
    (jar, views::about_page(&ctx)).into_response()
}
