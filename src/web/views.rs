//! Server-rendered pages.
//!
//! Plain string rendering behind a shared layout; every interpolated value
//! goes through `esc`. Handlers pass an explicit `PageContext` (current user
//! + pending flash) instead of any ambient request state.

use axum::http::StatusCode;
use axum::response::Html;

use crate::db::{Card, Review, Template, User};

use super::flash::Flash;
use super::meta::{DiscoverMode, TemplateMeta};

/// Per-render context threaded into every page.
pub struct PageContext {
    pub user: Option<User>,
    pub flash: Option<Flash>,
}

/// Escape text for interpolation into HTML bodies and attributes.
fn esc(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(ctx: &PageContext, title: &str, body: &str) -> Html<String> {
    let nav_auth = match &ctx.user {
        Some(user) => format!(
            r#"<a href="/profile">{}</a><a href="/logout">Logout</a>"#,
            esc(&user.username)
        ),
        None => r#"<a href="/login">Login</a><a href="/register">Register</a>"#.to_string(),
    };

    let flash_html = match &ctx.flash {
        Some(flash) => format!(
            r#"<div class="flash flash-{}">{}</div>"#,
            flash.level.as_str(),
            esc(&flash.message)
        ),
        None => String::new(),
    };

    Html(format!(
        r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} · CardHub</title>
<link rel="stylesheet" href="/static/css/style.css">
</head>
<body>
<header class="site-header">
<a class="brand" href="/">CardHub</a>
<nav>
<a href="/templates">Templates</a>
<a href="/discover">Discover</a>
<a href="/reviews">Reviews</a>
<a href="/about">About</a>
{nav_auth}
</nav>
</header>
{flash_html}
<main>
{body}
</main>
<footer class="site-footer">Made for every celebration.</footer>
</body>
</html>"#,
        title = esc(title),
    ))
}

fn template_tile(meta: &TemplateMeta) -> String {
    let t = &meta.template;
    let preview_style = match &t.bg_image {
        Some(image) => format!("background-image:url('{}')", esc(image)),
        None => format!("background-color:{}", esc(&t.bg_color)),
    };

    format!(
        r#"<article class="tile">
<a href="/template/{id}">
<div class="tile-preview" style="{preview_style}">
<h3>{title}</h3>
<p>{line1}</p>
<p>{line2}</p>
</div>
</a>
<div class="tile-meta">
<strong>{name}</strong>
<span class="tile-category">{category}</span>
<span class="tile-stats">&#9829; {likes} &middot; &#9733; {rating:.1} &middot; {reviews} reviews</span>
<em class="tile-quote">&ldquo;{comment}&rdquo;</em>
</div>
</article>"#,
        id = t.id,
        title = esc(&t.title_text),
        line1 = esc(&t.line1_text),
        line2 = esc(&t.line2_text),
        name = esc(&t.name),
        category = esc(&t.category),
        likes = meta.likes,
        rating = meta.rating,
        reviews = meta.reviews,
        comment = esc(meta.sample_comment),
    )
}

fn tile_grid(metas: &[TemplateMeta]) -> String {
    let tiles: Vec<String> = metas.iter().map(template_tile).collect();
    format!(r#"<div class="grid">{}</div>"#, tiles.join("\n"))
}

fn category_nav(categories: &[String], active: Option<&str>) -> String {
    let mut links = vec![format!(
        r#"<a href="/templates" class="{}">All</a>"#,
        if active.is_none() { "active" } else { "" }
    )];
    for category in categories {
        let class = if active == Some(category.as_str()) {
            "active"
        } else {
            ""
        };
        links.push(format!(
            r#"<a href="/templates?category={cat}" class="{class}">{cat}</a>"#,
            cat = esc(category),
        ));
    }
    format!(r#"<nav class="categories">{}</nav>"#, links.join("\n"))
}

fn review_entry(review: &Review) -> String {
    format!(
        r#"<li class="review">
<span class="review-stars">{stars}</span>
<p>{comment}</p>
<span class="review-byline">&mdash; {name}</span>
</li>"#,
        stars = "★".repeat(review.rating.clamp(0, 5) as usize),
        comment = esc(&review.comment),
        name = esc(review.display_name.as_deref().unwrap_or("Guest")),
    )
}

pub fn home_page(
    ctx: &PageContext,
    categories: &[String],
    featured: &[TemplateMeta],
    recent: &[TemplateMeta],
) -> Html<String> {
    let body = format!(
        r#"<section class="hero">
<h1>Beautiful invites, ready in minutes</h1>
<p>Pick a template, make it yours, share it anywhere.</p>
</section>
{categories}
<h2>Featured templates</h2>
{featured}
<h2>Fresh in the gallery</h2>
{recent}"#,
        categories = category_nav(categories, None),
        featured = tile_grid(featured),
        recent = tile_grid(recent),
    );
    layout(ctx, "Home", &body)
}

pub fn gallery_page(
    ctx: &PageContext,
    metas: &[TemplateMeta],
    categories: &[String],
    active_category: Option<&str>,
) -> Html<String> {
    let heading = match active_category {
        Some(category) => format!("{} templates", esc(category)),
        None => "All templates".to_string(),
    };
    let body = format!(
        "{}<h1>{heading}</h1>{}",
        category_nav(categories, active_category),
        tile_grid(metas),
    );
    layout(ctx, "Templates", &body)
}

pub fn template_detail_page(
    ctx: &PageContext,
    meta: &TemplateMeta,
    reviews: &[Review],
    avg_rating: Option<f64>,
) -> Html<String> {
    let t = &meta.template;
    let rating_line = match avg_rating {
        Some(avg) => format!("&#9733; {avg:.1} from {} reviews", reviews.len()),
        None => "No reviews yet &mdash; be the first!".to_string(),
    };
    let review_items: Vec<String> = reviews.iter().map(review_entry).collect();

    let name_field = if ctx.user.is_none() {
        r#"<label>Your name (optional) <input type="text" name="name" maxlength="80"></label>"#
    } else {
        ""
    };

    let body = format!(
        r#"<article class="detail">
{tile}
<p class="detail-rating">{rating_line}</p>
<a class="button" href="/editor/{id}">Customize this template</a>
</article>
<section class="reviews">
<h2>Reviews</h2>
<form method="post" action="/review/{id}" class="review-form">
<label>Rating
<select name="rating">
<option value="5">5 - Excellent</option>
<option value="4">4 - Great</option>
<option value="3">3 - Okay</option>
<option value="2">2 - Meh</option>
<option value="1">1 - Poor</option>
</select>
</label>
{name_field}
<label>Comment <textarea name="comment" maxlength="400" required></textarea></label>
<button type="submit">Post review</button>
</form>
<ul class="review-list">
{reviews}
</ul>
</section>"#,
        tile = template_tile(meta),
        id = t.id,
        reviews = review_items.join("\n"),
    );
    layout(ctx, &t.name, &body)
}

pub fn reviews_page(ctx: &PageContext, reviews: &[Review]) -> Html<String> {
    let items: Vec<String> = reviews.iter().map(review_entry).collect();
    let body = format!(
        r#"<h1>Latest reviews</h1>
<ul class="review-list">
{}
</ul>"#,
        items.join("\n")
    );
    layout(ctx, "Reviews", &body)
}

pub fn discover_page(ctx: &PageContext, mode: DiscoverMode, metas: &[TemplateMeta]) -> Html<String> {
    let tabs: Vec<String> = [
        (DiscoverMode::Trending, "Trending"),
        (DiscoverMode::TopLiked, "Top liked"),
        (DiscoverMode::MostComments, "Most comments"),
    ]
    .iter()
    .map(|(tab, label)| {
        format!(
            r#"<a href="/discover?mode={}" class="{}">{label}</a>"#,
            tab.as_str(),
            if *tab == mode { "active" } else { "" },
        )
    })
    .collect();

    let body = format!(
        r#"<h1>{}</h1>
<nav class="categories">{}</nav>
{}"#,
        mode.title(),
        tabs.join("\n"),
        tile_grid(metas),
    );
    layout(ctx, mode.title(), &body)
}

pub fn about_page(ctx: &PageContext) -> Html<String> {
    let body = r#"<h1>About CardHub</h1>
<p>CardHub is a gallery of greeting-card and invitation templates. Browse by
occasion, customize the text and colours in the editor, and keep your finished
cards on your profile.</p>
<p>Reviews come from people who used a template for a real event; ratings are
averaged per template.</p>"#;
    layout(ctx, "About", body)
}

pub fn register_page(ctx: &PageContext, next: Option<&str>) -> Html<String> {
    let action = match next {
        Some(next) => format!("/register?next={}", esc(next)),
        None => "/register".to_string(),
    };
    let body = format!(
        r#"<h1>Create your account</h1>
<form method="post" action="{action}" class="auth-form">
<label>Username <input type="text" name="username" required></label>
<label>Email <input type="email" name="email" required></label>
<label>Password <input type="password" name="password" required></label>
<button type="submit">Register</button>
</form>
<p>Already have an account? <a href="/login">Log in</a>.</p>"#,
    );
    layout(ctx, "Register", &body)
}

pub fn login_page(ctx: &PageContext, next: Option<&str>) -> Html<String> {
    let action = match next {
        Some(next) => format!("/login?next={}", esc(next)),
        None => "/login".to_string(),
    };
    let body = format!(
        r#"<h1>Welcome back</h1>
<form method="post" action="{action}" class="auth-form">
<label>Username or email <input type="text" name="username_or_email" required></label>
<label>Password <input type="password" name="password" required></label>
<button type="submit">Log in</button>
</form>
<p>New here? <a href="/register">Create an account</a>.</p>"#,
    );
    layout(ctx, "Login", &body)
}

pub fn editor_page(ctx: &PageContext, template: &Template, card: Option<&Card>) -> Html<String> {
    let title = card.map(|c| c.title_text.as_str()).unwrap_or(&template.title_text);
    let line1 = card.map(|c| c.line1_text.as_str()).unwrap_or(&template.line1_text);
    let line2 = card.map(|c| c.line2_text.as_str()).unwrap_or(&template.line2_text);
    let label = card
        .and_then(|c| c.label_text.as_deref())
        .unwrap_or("Custom invitation");
    let bg = card.map(|c| c.bg_color.as_str()).unwrap_or(&template.bg_color);
    let card_id = card.map(|c| c.id.to_string()).unwrap_or_default();

    let body = format!(
        r#"<h1>Card editor</h1>
<p class="editor-source">Based on <a href="/template/{tid}">{name}</a></p>
<form method="post" action="/save-card/{tid}" class="editor-form">
<input type="hidden" name="card_id" value="{card_id}">
<label>Title <input type="text" name="title" value="{title}" maxlength="200"></label>
<label>Line 1 <input type="text" name="line1" value="{line1}" maxlength="200"></label>
<label>Line 2 <input type="text" name="line2" value="{line2}" maxlength="200"></label>
<label>Label <input type="text" name="label" value="{label}" maxlength="80"></label>
<label>Background <input type="color" name="bg" value="{bg}"></label>
<button type="submit">Save card</button>
</form>"#,
        tid = template.id,
        name = esc(&template.name),
        title = esc(title),
        line1 = esc(line1),
        line2 = esc(line2),
        label = esc(label),
        bg = esc(bg),
    );
    layout(ctx, "Editor", &body)
}

pub fn profile_page(
    ctx: &PageContext,
    user: &User,
    cards: &[Card],
    reviews: &[Review],
) -> Html<String> {
    let card_items: Vec<String> = cards
        .iter()
        .map(|card| {
            format!(
                r#"<li class="card-row">
<div class="card-swatch" style="background-color:{bg}"></div>
<div class="card-text">
<strong>{title}</strong>
<span>{line1}</span>
</div>
<a class="button" href="/edit-card/{id}">Edit</a>
<form method="post" action="/delete-card/{id}">
<button type="submit" class="danger">Delete</button>
</form>
</li>"#,
                bg = esc(&card.bg_color),
                title = esc(&card.title_text),
                line1 = esc(&card.line1_text),
                id = card.id,
            )
        })
        .collect();

    let review_items: Vec<String> = reviews.iter().map(review_entry).collect();

    let body = format!(
        r#"<h1>{username}&rsquo;s profile</h1>
<p>{email} &middot; member since {since} &middot; <a href="/edit-profile">Edit profile</a></p>
<h2>Your cards</h2>
<ul class="card-list">
{cards}
</ul>
<h2>Your reviews</h2>
<ul class="review-list">
{reviews}
</ul>"#,
        username = esc(&user.username),
        email = esc(&user.email),
        since = esc(&user.created_at),
        cards = card_items.join("\n"),
        reviews = review_items.join("\n"),
    );
    layout(ctx, "Profile", &body)
}

pub fn edit_profile_page(ctx: &PageContext, user: &User) -> Html<String> {
    let body = format!(
        r#"<h1>Edit profile</h1>
<form method="post" action="/edit-profile" class="auth-form">
<label>Username <input type="text" name="username" value="{username}" required></label>
<label>Email <input type="email" name="email" value="{email}" required></label>
<label>New password (leave blank to keep) <input type="password" name="password"></label>
<button type="submit">Save changes</button>
</form>"#,
        username = esc(&user.username),
        email = esc(&user.email),
    );
    layout(ctx, "Edit profile", &body)
}

pub fn error_page(status: StatusCode, message: &str) -> Html<String> {
    let ctx = PageContext {
        user: None,
        flash: None,
    };
    let body = format!(
        r#"<section class="error-box">
<h1>{code}</h1>
<p>{message}</p>
<a href="/">Back to the gallery</a>
</section>"#,
        code = status.as_u16(),
        message = esc(message),
    );
    layout(&ctx, status.canonical_reason().unwrap_or("Error"), &body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escaping_covers_markup_characters() {
        assert_eq!(
            esc(r#"<b a="1">&'x'</b>"#),
            "&lt;b a=&quot;1&quot;&gt;&amp;&#39;x&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn layout_shows_login_state() {
        let anon = PageContext {
            user: None,
            flash: None,
        };
        let html = layout(&anon, "T", "body").0;
        assert!(html.contains(r#"<a href="/login">Login</a>"#));

        let user = User {
            id: 1,
            username: "priya<script>".to_string(),
            email: "p@example.com".to_string(),
            password_hash: String::new(),
            created_at: String::new(),
        };
        let ctx = PageContext {
            user: Some(user),
            flash: Some(Flash::success("Saved & done")),
        };
        let html = layout(&ctx, "T", "body").0;
        assert!(html.contains("priya&lt;script&gt;"));
        assert!(html.contains(r#"class="flash flash-success""#));
        assert!(html.contains("Saved &amp; done"));
    }
}
