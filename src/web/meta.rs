//! Transient display metadata for template listings.
//!
//! Templates without real engagement data get plausible synthesized numbers
//! so listings never look empty. Real review aggregates always win, stored
//! placeholder values come second, random defaults last. Nothing computed
//! here is ever persisted.

use rand::Rng;
use std::cmp::Ordering;
use std::collections::HashMap;

use crate::db::{round_rating, ReviewStats, Template, REVIEW_SNIPPETS};

/// Source of display randomness. Injectable so tests can pin values.
pub trait DisplayRng {
    /// Uniform integer in `[lo, hi]`.
    fn int_in(&mut self, lo: i64, hi: i64) -> i64;
    /// Uniform float in `[lo, hi]`.
    fn float_in(&mut self, lo: f64, hi: f64) -> f64;
}

/// Thread-local RNG, the production source.
#[derive(Debug, Default)]
pub struct ThreadDisplayRng;

impl DisplayRng for ThreadDisplayRng {
    fn int_in(&mut self, lo: i64, hi: i64) -> i64 {
        rand::rng().random_range(lo..=hi)
    }

    fn float_in(&mut self, lo: f64, hi: f64) -> f64 {
        rand::rng().random_range(lo..=hi)
    }
}

/// A template joined with its display metadata for one render.
#[derive(Debug, Clone)]
pub struct TemplateMeta {
    pub template: Template,
    pub likes: i64,
    pub reviews: i64,
    pub rating: f64,
    pub sample_comment: &'static str,
}

/// Compute display metadata for a batch of templates.
///
/// `stats` holds the real per-template review aggregates; templates absent
/// from it fall back to stored placeholders, then to random defaults.
pub fn attach_meta(
    templates: Vec<Template>,
    stats: &HashMap<i64, ReviewStats>,
    rng: &mut dyn DisplayRng,
) -> Vec<TemplateMeta> {
    templates
        .into_iter()
        .map(|template| {
            let likes = if template.likes != 0 {
                template.likes
            } else {
                rng.int_in(35, 220)
            };

            let (reviews, rating) = match stats.get(&template.id) {
                Some(real) => (real.count, real.average),
                None => {
                    let reviews = if template.review_count != 0 {
                        template.review_count
                    } else {
                        rng.int_in(4, 45)
                    };
                    let rating = if template.rating != 0.0 {
                        template.rating
                    } else {
                        round_rating(rng.float_in(4.2, 4.9))
                    };
                    (reviews, rating)
                }
            };

            let sample_comment =
                REVIEW_SNIPPETS[rng.int_in(0, REVIEW_SNIPPETS.len() as i64 - 1) as usize];

            TemplateMeta {
                template,
                likes,
                reviews,
                rating,
                sample_comment,
            }
        })
        .collect()
}

/// Ranking orders for the discover page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoverMode {
    Trending,
    TopLiked,
    MostComments,
}

impl DiscoverMode {
    pub fn from_param(mode: Option<&str>) -> Self {
        match mode {
            Some("top-liked") => DiscoverMode::TopLiked,
            Some("most-comments") => DiscoverMode::MostComments,
            _ => DiscoverMode::Trending,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DiscoverMode::Trending => "trending",
            DiscoverMode::TopLiked => "top-liked",
            DiscoverMode::MostComments => "most-comments",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            DiscoverMode::Trending => "Trending templates",
            DiscoverMode::TopLiked => "Most liked templates",
            DiscoverMode::MostComments => "Most commented templates",
        }
    }
}

/// Sort by the requested order and keep the head of the list.
pub fn rank_for_discover(
    mut metas: Vec<TemplateMeta>,
    mode: DiscoverMode,
    limit: usize,
) -> Vec<TemplateMeta> {
    match mode {
        DiscoverMode::TopLiked => metas.sort_by(|a, b| b.likes.cmp(&a.likes)),
        DiscoverMode::MostComments => metas.sort_by(|a, b| b.reviews.cmp(&a.reviews)),
        DiscoverMode::Trending => metas.sort_by(|a, b| {
            b.rating
                .partial_cmp(&a.rating)
                .unwrap_or(Ordering::Equal)
                .then(b.likes.cmp(&a.likes))
        }),
    }
    metas.truncate(limit);
    metas
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Deterministic generator: every draw returns the lower bound.
    struct LowerBoundRng;

    impl DisplayRng for LowerBoundRng {
        fn int_in(&mut self, lo: i64, _hi: i64) -> i64 {
            lo
        }

        fn float_in(&mut self, lo: f64, _hi: f64) -> f64 {
            lo
        }
    }

    fn template(id: i64, likes: i64, rating: f64, review_count: i64) -> Template {
        Template {
            id,
            name: format!("Template {id}"),
            category: "Birthday".to_string(),
            thumbnail: String::new(),
            bg_color: "#ffffff".to_string(),
            bg_image: None,
            title_text: "t".to_string(),
            line1_text: "l1".to_string(),
            line2_text: "l2".to_string(),
            likes,
            rating,
            review_count,
        }
    }

    fn meta(id: i64, likes: i64, reviews: i64, rating: f64) -> TemplateMeta {
        TemplateMeta {
            template: template(id, likes, rating, reviews),
            likes,
            reviews,
            rating,
            sample_comment: REVIEW_SNIPPETS[0],
        }
    }

    #[test]
    fn real_aggregates_override_stored_placeholders() {
        let stats = HashMap::from([(1, ReviewStats { count: 3, average: 3.7 })]);
        let metas = attach_meta(vec![template(1, 50, 4.9, 99)], &stats, &mut LowerBoundRng);

        assert_eq!(metas[0].reviews, 3);
        assert_eq!(metas[0].rating, 3.7);
        // Likes are independent of reviews and keep the stored value.
        assert_eq!(metas[0].likes, 50);
    }

    #[test]
    fn stored_values_beat_random_defaults() {
        let metas = attach_meta(
            vec![template(1, 120, 4.6, 30)],
            &HashMap::new(),
            &mut LowerBoundRng,
        );

        assert_eq!(metas[0].likes, 120);
        assert_eq!(metas[0].reviews, 30);
        assert_eq!(metas[0].rating, 4.6);
    }

    #[test]
    fn zeroed_template_gets_random_defaults_in_range() {
        let mut rng = ThreadDisplayRng;
        for _ in 0..50 {
            let metas = attach_meta(vec![template(1, 0, 0.0, 0)], &HashMap::new(), &mut rng);
            assert!((35..=220).contains(&metas[0].likes));
            assert!((4..=45).contains(&metas[0].reviews));
            assert!((4.2..=4.9).contains(&metas[0].rating));
            assert_eq!(metas[0].rating, round_rating(metas[0].rating));
            assert!(REVIEW_SNIPPETS.contains(&metas[0].sample_comment));
        }
    }

    #[test]
    fn top_liked_orders_by_descending_likes() {
        let ranked = rank_for_discover(
            vec![meta(1, 10, 5, 4.0), meta(2, 30, 1, 3.0), meta(3, 20, 9, 5.0)],
            DiscoverMode::TopLiked,
            24,
        );
        let ids: Vec<i64> = ranked.iter().map(|m| m.template.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn trending_breaks_rating_ties_by_likes() {
        let ranked = rank_for_discover(
            vec![meta(1, 10, 5, 4.5), meta(2, 30, 1, 4.5), meta(3, 20, 9, 4.9)],
            DiscoverMode::Trending,
            24,
        );
        let ids: Vec<i64> = ranked.iter().map(|m| m.template.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[test]
    fn ranking_truncates_to_the_limit() {
        let metas = (0..40).map(|i| meta(i, i, 1, 4.0)).collect();
        let ranked = rank_for_discover(metas, DiscoverMode::MostComments, 24);
        assert_eq!(ranked.len(), 24);
    }

    #[test]
    fn unknown_mode_falls_back_to_trending() {
        assert_eq!(DiscoverMode::from_param(None), DiscoverMode::Trending);
        assert_eq!(
            DiscoverMode::from_param(Some("nonsense")),
            DiscoverMode::Trending
        );
        assert_eq!(
            DiscoverMode::from_param(Some("top-liked")),
            DiscoverMode::TopLiked
        );
    }
}
