//! Recommendation, search, and insights route handlers.
//!
//! Handlers seed a fresh small RNG per request; everything downstream takes
//! the RNG as an argument so the synthetic scoring stays test-controllable.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::Utc;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};

use clementine_core::{ProductId, UserId};

use crate::db::ProductRepository;
use crate::db::products::{CategorySales, PriceBucket, TrendingProduct};
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::Product;
use crate::services::RecommendationService;
use crate::services::recommend::{
    self, AiStats, SEARCH_LIMIT, SIMILAR_LIMIT, ScoredProduct, synthesize_stats,
};
use crate::state::AppState;

/// How many recommendations are returned when the client does not ask for a
/// specific count.
const DEFAULT_RECOMMENDATION_LIMIT: usize = 4;

/// How many trending products the insights endpoint lists.
const INSIGHTS_TRENDING_LIMIT: i64 = 5;

/// How many category aggregates the insights endpoint lists.
const INSIGHTS_CATEGORY_LIMIT: i64 = 5;

/// Query parameters for the recommendations endpoint.
#[derive(Debug, Deserialize)]
pub struct RecommendationParams {
    pub limit: Option<usize>,
}

/// Recommendations plus synthetic headline stats.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationResponse {
    pub recommendations: Vec<ScoredProduct>,
    pub ai_stats: AiStats,
}

/// Query parameters for the search endpoint.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

/// Search results with fixed query expansions.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub results: Vec<Product>,
    pub query: String,
    pub ai_enhanced: bool,
    pub suggestions: Vec<String>,
}

/// Catalog aggregates for the admin dashboard.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightsResponse {
    pub category_stats: Vec<CategorySales>,
    pub price_ranges: Vec<PriceBucket>,
    pub trending: Vec<TrendingProduct>,
    pub ai_recommendations_enabled: bool,
    pub last_analysis: chrono::DateTime<Utc>,
}

/// Recommendations for an anonymous caller (trending only).
pub async fn recommendations_anonymous(
    State(state): State<AppState>,
    Query(params): Query<RecommendationParams>,
) -> Result<Json<RecommendationResponse>> {
    recommend_for(state, None, params).await
}

/// Recommendations for a known user.
pub async fn recommendations(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
    Query(params): Query<RecommendationParams>,
) -> Result<Json<RecommendationResponse>> {
    recommend_for(state, Some(user_id), params).await
}

async fn recommend_for(
    state: AppState,
    user_id: Option<UserId>,
    params: RecommendationParams,
) -> Result<Json<RecommendationResponse>> {
    let limit = params
        .limit
        .unwrap_or(DEFAULT_RECOMMENDATION_LIMIT)
        .clamp(1, 50);
    let mut rng = SmallRng::from_os_rng();

    let recommendations = RecommendationService::new(state.pool())
        .recommend(user_id, limit, &mut rng)
        .await?;

    Ok(Json(RecommendationResponse {
        recommendations,
        ai_stats: synthesize_stats(&mut rng),
    }))
}

/// Active products in the same category and price band as the given product.
pub async fn similar(
    State(state): State<AppState>,
    Path(product_id): Path<ProductId>,
) -> Result<Json<Vec<Product>>> {
    let repo = ProductRepository::new(state.pool());
    let product = repo
        .get(product_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

    let similar = repo.similar_to(&product, SIMILAR_LIMIT).await?;
    Ok(Json(similar))
}

/// Full-text search, falling back to a case-insensitive substring match.
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>> {
    let term = params
        .q
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or_else(|| AppError::Validation("Search query required".to_string()))?;

    let repo = ProductRepository::new(state.pool());
    let mut results = repo.search_fulltext(term, SEARCH_LIMIT).await?;
    if results.is_empty() {
        results = repo.search_substring(term, SEARCH_LIMIT).await?;
    }

    Ok(Json(SearchResponse {
        results,
        query: term.to_string(),
        ai_enhanced: true,
        suggestions: recommend::expand_query(term),
    }))
}

/// Catalog aggregates for the admin dashboard (admin).
pub async fn insights(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<InsightsResponse>> {
    let repo = ProductRepository::new(state.pool());

    let category_stats = repo.category_stats(INSIGHTS_CATEGORY_LIMIT).await?;
    let price_ranges = repo.price_buckets().await?;
    let trending = repo.trending(INSIGHTS_TRENDING_LIMIT).await?;

    Ok(Json(InsightsResponse {
        category_stats,
        price_ranges,
        trending,
        ai_recommendations_enabled: true,
        last_analysis: Utc::now(),
    }))
}
