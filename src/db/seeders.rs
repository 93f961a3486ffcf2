//! Database seeders for demo content.
//!
//! The catalog is inserted once, on first startup against an empty database.
//! Subsequent startups are a no-op.

use anyhow::Result;
use rand::Rng;
use sqlx::SqlitePool;
use tracing::info;

/// Canned review comments, shared by the seeder and the display layer.
pub const REVIEW_SNIPPETS: [&str; 8] = [
    "Loved the colours and layout!",
    "Perfect for WhatsApp sharing.",
    "Clean design, easy to edit.",
    "My family really liked this invite.",
    "Simple and modern, just what I needed.",
    "Fonts and spacing look very premium.",
    "Great for last-minute invites.",
    "So much better than typing in Word.",
];

/// Fallback display names for anonymous and seeded reviews.
pub const REVIEW_NAMES: [&str; 10] = [
    "Priya", "Rahul", "Sneha", "Amit", "Neha", "Rohan", "Ishita", "Karan", "Ved", "Simran",
];

/// Seed the template catalog and a first batch of reviews.
///
/// Idempotent: returns immediately when any template row exists.
pub async fn seed_demo_data(pool: &SqlitePool) -> Result<()> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM templates")
        .fetch_one(pool)
        .await?;
    if count > 0 {
        return Ok(());
    }

    info!("Empty catalog, seeding demo templates...");

    // Named catalog entries.
    // Format: (name, category, bg_color, bg_image, title, line1, line2, likes, rating, review_count)
    #[allow(clippy::type_complexity)]
    let catalog: Vec<(
        &str,
        &str,
        &str,
        Option<&str>,
        &str,
        &str,
        &str,
        i64,
        f64,
        i64,
    )> = vec![
        (
            "Blue Floral Frame",
            "Engagement",
            "#ffffff",
            Some("/static/img/floral_frame.jpg"),
            "Engagement Ceremony",
            "We invite you to share our joy",
            "Date • Time • Venue",
            210,
            4.9,
            58,
        ),
        (
            "Pastel Birthday Bash",
            "Birthday",
            "#fde68a",
            None,
            "Birthday Bash!",
            "You’re invited to celebrate with us",
            "Saturday, 8 PM • Mumbai",
            180,
            4.8,
            42,
        ),
        (
            "Kids Birthday Fun",
            "Birthday",
            "#bfdbfe",
            None,
            "Fun-tastic Birthday!",
            "Games, cake and surprises await",
            "Sunday, 4 PM • Playzone",
            150,
            4.7,
            36,
        ),
        (
            "Minimal Birthday Invite",
            "Birthday",
            "#fee2e2",
            None,
            "You’re Invited",
            "Join us for a simple celebration",
            "Friday, 7 PM • Home",
            120,
            4.6,
            28,
        ),
        (
            "Elegant Birthday Night",
            "Birthday",
            "#0f172a",
            None,
            "Birthday Dinner",
            "An intimate evening with close friends",
            "Saturday, 8 PM • Rooftop Cafe",
            140,
            4.7,
            34,
        ),
        (
            "Elegant Wedding Invite",
            "Wedding",
            "#f3e8ff",
            None,
            "A New Chapter",
            "Join us for the wedding of",
            "Amit & Priya",
            210,
            4.9,
            60,
        ),
        (
            "Royal Wedding Card",
            "Wedding",
            "#fef3c7",
            None,
            "Wedding Celebration",
            "With blessings of our families",
            "We tie the knot",
            175,
            4.8,
            49,
        ),
        (
            "Minimal Engagement",
            "Engagement",
            "#e0f2fe",
            None,
            "We Are Engaged",
            "Celebrate the beginning of forever",
            "Date • Time • Venue",
            130,
            4.6,
            30,
        ),
        (
            "Baby Shower Blue",
            "Baby Shower",
            "#dbeafe",
            None,
            "Oh Boy!",
            "A little miracle is on the way",
            "Join us for a baby shower",
            110,
            4.5,
            25,
        ),
        (
            "Baby Shower Pink",
            "Baby Shower",
            "#fee2f2",
            None,
            "It’s a Girl!",
            "Let’s shower the mom-to-be with love",
            "Date • Time • Venue",
            125,
            4.6,
            27,
        ),
        (
            "Classic Anniversary",
            "Anniversary",
            "#fef9c3",
            None,
            "Anniversary Celebration",
            "Celebrating years of togetherness",
            "Join us for dinner & memories",
            140,
            4.7,
            35,
        ),
        (
            "Silver Jubilee",
            "Anniversary",
            "#e5e7eb",
            None,
            "25 Years of Love",
            "Please join us to celebrate",
            "Our Silver Jubilee",
            160,
            4.8,
            40,
        ),
        (
            "Corporate Meetup",
            "Corporate",
            "#e0f2fe",
            None,
            "Networking Evening",
            "Connect • Collaborate • Grow",
            "Friday, 6 PM • Business Lounge",
            100,
            4.4,
            22,
        ),
        (
            "Workshop Invite",
            "Corporate",
            "#fee2e2",
            None,
            "Skill-Building Workshop",
            "Hands-on learning session",
            "Register now · Limited seats",
            115,
            4.5,
            24,
        ),
        (
            "Diwali Celebration",
            "Festival",
            "#f97316",
            None,
            "Diwali Get-Together",
            "Lights, sweets & smiles",
            "Let’s celebrate the festival of lights",
            200,
            4.9,
            70,
        ),
        (
            "Christmas Party",
            "Festival",
            "#22c55e",
            None,
            "Christmas Celebration",
            "Carols, cocoa & cheer",
            "Join us for a festive evening",
            150,
            4.7,
            38,
        ),
        (
            "New Year Bash",
            "Festival",
            "#0ea5e9",
            None,
            "New Year Bash",
            "Goodbye old · Hello new",
            "Countdown starts at 11 PM",
            220,
            4.9,
            75,
        ),
        (
            "Housewarming Invite",
            "Housewarming",
            "#bbf7d0",
            None,
            "New Home, New Beginnings",
            "Come see our new place",
            "Snacks & smiles guaranteed",
            130,
            4.6,
            32,
        ),
        (
            "Graduation Party",
            "Graduation",
            "#e5e7eb",
            None,
            "Graduation Celebration",
            "Tossing caps & starting new journeys",
            "Party details here",
            125,
            4.5,
            29,
        ),
        (
            "Farewell Party",
            "Farewell",
            "#fecaca",
            None,
            "Farewell Get-Together",
            "Let’s say goodbye in style",
            "Speeches · Photos · Memories",
            135,
            4.6,
            31,
        ),
        (
            "Kitty Party Invite",
            "Kitty Party",
            "#f9a8d4",
            None,
            "Kitty Party",
            "Fun, food & gossip",
            "Dress code: Casual chic",
            118,
            4.5,
            26,
        ),
        (
            "Friends Get-Together",
            "Get-Together",
            "#bfdbfe",
            None,
            "Let’s Catch Up",
            "It’s been too long",
            "Snacks on us, stories on you",
            142,
            4.7,
            33,
        ),
        (
            "Haldi Ceremony",
            "Wedding Function",
            "#facc15",
            None,
            "Haldi Ceremony",
            "Join us for haldi & happiness",
            "Wear yellow & be ready for fun",
            160,
            4.8,
            41,
        ),
        (
            "Mehndi Night",
            "Wedding Function",
            "#4ade80",
            None,
            "Mehndi Night",
            "Dhol, dance & mehndi",
            "Let’s colour our hands & hearts",
            170,
            4.8,
            44,
        ),
        (
            "Sangeet Evening",
            "Wedding Function",
            "#c4b5fd",
            None,
            "Sangeet Evening",
            "Music, dance & masti",
            "Family performances all night",
            165,
            4.8,
            43,
        ),
        (
            "Bachelor Party",
            "Party",
            "#111827",
            None,
            "Bachelor’s Night Out",
            "One last wild night",
            "Venue & time details",
            155,
            4.7,
            37,
        ),
    ];

    for (name, category, bg_color, bg_image, title, line1, line2, likes, rating, review_count) in
        &catalog
    {
        insert_template(
            pool,
            name,
            category,
            bg_color,
            *bg_image,
            title,
            line1,
            line2,
            *likes,
            *rating,
            *review_count,
        )
        .await?;
    }

    // Generated filler styles, seven per category.
    let extra_categories: [(&str, &str); 10] = [
        ("Birthday", "#fee2e2"),
        ("Wedding", "#fef9c3"),
        ("Engagement", "#e0f2fe"),
        ("Baby Shower", "#fee2f2"),
        ("Anniversary", "#e5e7eb"),
        ("Festival", "#f97316"),
        ("Housewarming", "#bbf7d0"),
        ("Graduation", "#e5e7eb"),
        ("Farewell", "#fecaca"),
        ("Party", "#0f172a"),
    ];

    for (category, color) in extra_categories {
        for i in 1..=7_i64 {
            insert_template(
                pool,
                &format!("{category} Card Style {i}"),
                category,
                color,
                None,
                &format!("{category} Celebration"),
                "Personalise this line with your own details",
                "Date · Time · Venue",
                90 + i * 3,
                4.4 + (i % 3) as f64 * 0.1,
                15 + i,
            )
            .await?;
        }
    }

    // A first batch of reviews over the head of the catalog.
    let template_ids: Vec<i64> =
        sqlx::query_scalar("SELECT id FROM templates ORDER BY id ASC LIMIT 25")
            .fetch_all(pool)
            .await?;

    let mut rng = rand::rng();
    let now = chrono::Utc::now().to_rfc3339();
    for template_id in template_ids {
        for _ in 0..rng.random_range(2..=6) {
            let rating: i64 = rng.random_range(4..=5);
            let comment = REVIEW_SNIPPETS[rng.random_range(0..REVIEW_SNIPPETS.len())];
            let name = REVIEW_NAMES[rng.random_range(0..REVIEW_NAMES.len())];

            sqlx::query(
                r#"
                INSERT INTO reviews (user_id, template_id, rating, comment, display_name, created_at)
                VALUES (NULL, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(template_id)
            .bind(rating)
            .bind(comment)
            .bind(name)
            .bind(&now)
            .execute(pool)
            .await?;
        }
    }

    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM templates")
        .fetch_one(pool)
        .await?;
    info!("Seeded {} demo templates", total);

    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn insert_template(
    pool: &SqlitePool,
    name: &str,
    category: &str,
    bg_color: &str,
    bg_image: Option<&str>,
    title: &str,
    line1: &str,
    line2: &str,
    likes: i64,
    rating: f64,
    review_count: i64,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO templates (name, category, thumbnail, bg_color, bg_image,
                               title_text, line1_text, line2_text, likes, rating, review_count)
        VALUES (?, ?, '', ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(name)
    .bind(category)
    .bind(bg_color)
    .bind(bg_image)
    .bind(title)
    .bind(line1)
    .bind(line2)
    .bind(likes)
    .bind(rating)
    .bind(review_count)
    .execute(pool)
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    #[tokio::test]
    async fn seeding_twice_is_idempotent() {
        let db = test_pool().await;

        seed_demo_data(&db).await.unwrap();
        let after_first: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM templates")
            .fetch_one(&db)
            .await
            .unwrap();

        seed_demo_data(&db).await.unwrap();
        let after_second: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM templates")
            .fetch_one(&db)
            .await
            .unwrap();

        // 26 named + 10 categories x 7 filler styles
        assert_eq!(after_first, 96);
        assert_eq!(after_second, after_first);
    }

    #[tokio::test]
    async fn seeded_reviews_stay_in_range() {
        let db = test_pool().await;
        seed_demo_data(&db).await.unwrap();

        let rows: Vec<(i64, i64)> =
            sqlx::query_as("SELECT template_id, COUNT(*) FROM reviews GROUP BY template_id")
                .fetch_all(&db)
                .await
                .unwrap();
        assert_eq!(rows.len(), 25);
        for (_, count) in &rows {
            assert!((2..=6).contains(count));
        }

        let out_of_range: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM reviews WHERE rating < 4 OR rating > 5")
                .fetch_one(&db)
                .await
                .unwrap();
        assert_eq!(out_of_range, 0);
    }
}
