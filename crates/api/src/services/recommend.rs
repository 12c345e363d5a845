//! The recommendation filter.
//!
//! A thin filter/sort over catalog fields: no model, no learned state. The
//! "match score" attached to results is synthetic display metadata drawn from
//! a caller-supplied RNG, so handlers pass fresh entropy while tests pass a
//! seeded generator and get deterministic output. Scores are never persisted
//! and never feed back into ranking beyond the current response.

use chrono::{DateTime, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;

use clementine_core::{Category, ProductId, UserId};

use crate::db::RepositoryError;
use crate::db::products::ProductRepository;
use crate::db::users::UserRepository;
use crate::models::Product;

/// Reason attached to history-based recommendations.
pub const HISTORY_REASON: &str = "Based on your browsing history";

/// Reason attached to best-seller fallback recommendations.
pub const TRENDING_REASON: &str = "Trending now";

/// Candidate price band multipliers around the observed history range.
const BAND_LOWER: Decimal = Decimal::from_parts(5, 0, 0, false, 1);
const BAND_UPPER: Decimal = Decimal::from_parts(15, 0, 0, false, 1);

/// How many similar products the similar-products endpoint returns.
pub const SIMILAR_LIMIT: i64 = 4;

/// How many results a search returns.
pub const SEARCH_LIMIT: i64 = 10;

/// A product tagged with synthetic relevance metadata.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredProduct {
    #[serde(flatten)]
    pub product: Product,
    /// Synthetic, display-only. See the module docs.
    pub match_score: u8,
    pub reason: &'static str,
}

/// Synthetic headline numbers attached to recommendation responses.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AiStats {
    pub confidence: u8,
    pub data_points: u32,
    pub last_updated: DateTime<Utc>,
}

/// What a user's interaction history says about their tastes.
#[derive(Debug, Clone)]
pub struct HistoryProfile {
    /// Categories seen across browsing and purchases, insertion-ordered.
    pub categories: Vec<Category>,
    /// Min/max price over browsed products. `None` when the user purchased
    /// but never browsed; the candidate query then matches nothing and the
    /// trending fallback takes over.
    pub price_range: Option<(Decimal, Decimal)>,
    /// Products already viewed, excluded from candidates.
    pub viewed: Vec<ProductId>,
}

impl HistoryProfile {
    /// Derive a profile from the products behind the user's browsing and
    /// purchase logs. Returns `None` when there is no usable history.
    #[must_use]
    pub fn build(browsed: &[Product], purchased: &[Product]) -> Option<Self> {
        if browsed.is_empty() && purchased.is_empty() {
            return None;
        }

        let mut categories: Vec<Category> = Vec::new();
        for product in browsed.iter().chain(purchased) {
            if !categories.contains(&product.category) {
                categories.push(product.category);
            }
        }

        let price_range = browsed.iter().map(|p| p.price).fold(None::<(Decimal, Decimal)>, |range, price| {
            Some(match range {
                None => (price, price),
                Some((min, max)) => (min.min(price), max.max(price)),
            })
        });

        Some(Self {
            categories,
            price_range,
            viewed: browsed.iter().map(|p| p.id).collect(),
        })
    }

    /// The widened price band candidates must fall into.
    #[must_use]
    pub fn candidate_price_band(&self) -> Option<(Decimal, Decimal)> {
        self.price_range
            .map(|(min, max)| (min * BAND_LOWER, max * BAND_UPPER))
    }
}

/// Tag history candidates with scores in [85, 100), keep the top `limit` by
/// that score. The ranking is noise by construction.
pub fn score_history_matches(
    products: Vec<Product>,
    limit: usize,
    rng: &mut (impl Rng + ?Sized),
) -> Vec<ScoredProduct> {
    let mut scored: Vec<ScoredProduct> = products
        .into_iter()
        .map(|product| ScoredProduct {
            product,
            match_score: rng.random_range(85..100),
            reason: HISTORY_REASON,
        })
        .collect();

    scored.sort_by(|a, b| b.match_score.cmp(&a.match_score));
    scored.truncate(limit);
    scored
}

/// Tag fallback best-sellers with scores in [70, 90).
pub fn score_trending(
    products: Vec<Product>,
    rng: &mut (impl Rng + ?Sized),
) -> Vec<ScoredProduct> {
    products
        .into_iter()
        .map(|product| ScoredProduct {
            product,
            match_score: rng.random_range(70..90),
            reason: TRENDING_REASON,
        })
        .collect()
}

/// Synthesize the headline stats shown next to recommendations.
pub fn synthesize_stats(rng: &mut (impl Rng + ?Sized)) -> AiStats {
    AiStats {
        confidence: rng.random_range(85..95),
        data_points: rng.random_range(2000..3000),
        last_updated: Utc::now(),
    }
}

/// Fixed query expansions returned with every search, regardless of results.
#[must_use]
pub fn expand_query(term: &str) -> Vec<String> {
    vec![
        format!("{term} premium"),
        format!("{term} luxury"),
        format!("best {term}"),
        format!("{term} sale"),
    ]
}

/// The recommendation filter service.
pub struct RecommendationService<'a> {
    pool: &'a PgPool,
}

impl<'a> RecommendationService<'a> {
    /// Create a new recommendation service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Return up to `limit` scored products for the (optional) user.
    ///
    /// With usable history: candidates are active products in the history's
    /// categories and widened price band, excluding already-viewed products,
    /// fetched at twice the limit and cut down by synthetic score. Any
    /// shortfall is filled from the globally best-selling active products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if a catalog or history query fails.
    pub async fn recommend(
        &self,
        user_id: Option<UserId>,
        limit: usize,
        rng: &mut (impl Rng + ?Sized),
    ) -> Result<Vec<ScoredProduct>, RepositoryError> {
        let products = ProductRepository::new(self.pool);
        let mut recommendations: Vec<ScoredProduct> = Vec::new();

        if let Some(user_id) = user_id {
            let users = UserRepository::new(self.pool);
            let browsing = users.browsing_history(user_id).await?;
            let purchases = users.purchase_history(user_id).await?;

            let browsed_ids: Vec<ProductId> = browsing.iter().map(|e| e.product).collect();
            let purchased_ids: Vec<ProductId> = purchases.iter().map(|p| p.product).collect();
            let browsed = products.get_many(&browsed_ids).await?;
            let purchased = products.get_many(&purchased_ids).await?;

            if let Some(profile) = HistoryProfile::build(&browsed, &purchased)
                && let Some((min_price, max_price)) = profile.candidate_price_band()
            {
                let pool_size = i64::try_from(limit * 2).unwrap_or(i64::MAX);
                let candidates = products
                    .recommendation_candidates(
                        &profile.categories,
                        &profile.viewed,
                        min_price,
                        max_price,
                        pool_size,
                    )
                    .await?;
                recommendations = score_history_matches(candidates, limit, rng);
            }
        }

        if recommendations.len() < limit {
            let exclude: Vec<ProductId> = recommendations.iter().map(|s| s.product.id).collect();
            let shortfall = i64::try_from(limit - recommendations.len()).unwrap_or(i64::MAX);
            let fill = products.best_sellers(&exclude, shortfall).await?;
            recommendations.extend(score_trending(fill, rng));
        }

        Ok(recommendations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clementine_core::ProductStatus;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn product(id: i32, category: Category, price: &str) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("product-{id}"),
            description: "test".to_string(),
            price: price.parse().expect("decimal literal"),
            original_price: None,
            images: Vec::new(),
            category,
            stock: 20,
            rating: 4.0,
            reviews: 3,
            features: Vec::new(),
            specifications: None,
            status: ProductStatus::Active,
            sales: 10,
            tags: Vec::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_profile_none_without_history() {
        assert!(HistoryProfile::build(&[], &[]).is_none());
    }

    #[test]
    fn test_profile_categories_deduped_across_logs() {
        let browsed = [
            product(1, Category::Electronics, "100"),
            product(2, Category::Electronics, "40"),
        ];
        let purchased = [
            product(3, Category::Books, "15"),
            product(4, Category::Electronics, "70"),
        ];

        let profile = HistoryProfile::build(&browsed, &purchased).expect("profile");
        assert_eq!(
            profile.categories,
            vec![Category::Electronics, Category::Books]
        );
        assert_eq!(profile.viewed, vec![ProductId::new(1), ProductId::new(2)]);
    }

    #[test]
    fn test_profile_price_band_from_browsing_only() {
        let browsed = [
            product(1, Category::Electronics, "40"),
            product(2, Category::Electronics, "100"),
        ];
        let profile = HistoryProfile::build(&browsed, &[]).expect("profile");

        let (min, max) = profile.candidate_price_band().expect("band");
        assert_eq!(min, "20".parse::<Decimal>().expect("decimal"));
        assert_eq!(max, "150".parse::<Decimal>().expect("decimal"));
    }

    #[test]
    fn test_profile_purchases_alone_have_no_band() {
        let purchased = [product(3, Category::Books, "15")];
        let profile = HistoryProfile::build(&[], &purchased).expect("profile");
        assert!(profile.candidate_price_band().is_none());
        assert!(profile.viewed.is_empty());
    }

    #[test]
    fn test_history_scores_in_range_and_sorted() {
        let mut rng = StdRng::seed_from_u64(7);
        let candidates: Vec<Product> = (1..=8)
            .map(|id| product(id, Category::Electronics, "50"))
            .collect();

        let scored = score_history_matches(candidates, 4, &mut rng);
        assert_eq!(scored.len(), 4);
        for pair in scored.windows(2) {
            assert!(pair[0].match_score >= pair[1].match_score);
        }
        for item in &scored {
            assert!((85..100).contains(&item.match_score));
            assert_eq!(item.reason, HISTORY_REASON);
        }
    }

    #[test]
    fn test_trending_scores_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        let fill: Vec<Product> = (1..=4)
            .map(|id| product(id, Category::Sports, "30"))
            .collect();

        let scored = score_trending(fill, &mut rng);
        assert_eq!(scored.len(), 4);
        for item in &scored {
            assert!((70..90).contains(&item.match_score));
            assert_eq!(item.reason, TRENDING_REASON);
        }
    }

    #[test]
    fn test_seeded_rng_is_deterministic() {
        let products: Vec<Product> = (1..=4)
            .map(|id| product(id, Category::Beauty, "25"))
            .collect();

        let mut first_rng = StdRng::seed_from_u64(42);
        let mut second_rng = StdRng::seed_from_u64(42);
        let first = score_trending(products.clone(), &mut first_rng);
        let second = score_trending(products, &mut second_rng);

        let first_scores: Vec<u8> = first.iter().map(|s| s.match_score).collect();
        let second_scores: Vec<u8> = second.iter().map(|s| s.match_score).collect();
        assert_eq!(first_scores, second_scores);
    }

    #[test]
    fn test_synthesized_stats_ranges() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..50 {
            let stats = synthesize_stats(&mut rng);
            assert!((85..95).contains(&stats.confidence));
            assert!((2000..3000).contains(&stats.data_points));
        }
    }

    #[test]
    fn test_query_expansion_is_fixed() {
        assert_eq!(
            expand_query("headphones"),
            vec![
                "headphones premium",
                "headphones luxury",
                "best headphones",
                "headphones sale",
            ]
        );
    }
}
