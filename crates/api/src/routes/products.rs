//! Catalog route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use clementine_core::{Category, ProductId};

use crate::db::{ProductQuery, ProductRepository, ProductSort};
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::{Product, ProductDraft, ProductPatch};
use crate::state::AppState;

/// Page size when the client does not specify one.
const DEFAULT_PAGE_SIZE: u32 = 12;

/// How many products the featured list returns.
const FEATURED_LIMIT: i64 = 8;

/// Query parameters for the catalog listing.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub category: Option<String>,
    pub search: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub sort: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// Paginated catalog listing response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse {
    pub products: Vec<Product>,
    pub total_pages: i64,
    pub current_page: u32,
    pub total: i64,
}

/// List products with filtering, sorting, and pagination.
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<ListResponse>> {
    // The literal "All" means no category filter.
    let category = match params.category.as_deref() {
        None | Some("All") => None,
        Some(raw) => Some(
            raw.parse::<Category>()
                .map_err(|e| AppError::Validation(e.to_string()))?,
        ),
    };

    let page = params.page.unwrap_or(1).max(1);
    let limit = params.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, 100);

    let query = ProductQuery {
        category,
        search: params.search.filter(|s| !s.trim().is_empty()),
        min_price: params.min_price,
        max_price: params.max_price,
        sort: ProductSort::from_query(params.sort.as_deref()),
        page,
        limit,
    };

    let (products, total) = ProductRepository::new(state.pool()).list(&query).await?;
    let total_pages = (total + i64::from(limit) - 1) / i64::from(limit);

    Ok(Json(ListResponse {
        products,
        total_pages,
        current_page: page,
        total,
    }))
}

/// Get a single product.
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Product>> {
    let product = ProductRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

    Ok(Json(product))
}

/// Create a product (admin).
pub async fn create(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Json(draft): Json<ProductDraft>,
) -> Result<(StatusCode, Json<Product>)> {
    draft.validate().map_err(AppError::Validation)?;

    let product = ProductRepository::new(state.pool()).insert(&draft).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// Update a product (admin). Absent fields keep their current values; status
/// is re-derived from the resulting stock.
pub async fn update(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    Json(patch): Json<ProductPatch>,
) -> Result<Json<Product>> {
    let repo = ProductRepository::new(state.pool());
    let existing = repo
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

    let draft = patch.apply(&existing);
    draft.validate().map_err(AppError::Validation)?;

    let product = repo
        .replace(id, &draft)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

    Ok(Json(product))
}

/// Delete a product (admin).
pub async fn remove(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<serde_json::Value>> {
    let removed = ProductRepository::new(state.pool()).delete(id).await?;
    if !removed {
        return Err(AppError::NotFound("Product not found".to_string()));
    }

    Ok(Json(serde_json::json!({ "message": "Product removed" })))
}

/// Top-selling active products.
pub async fn featured(State(state): State<AppState>) -> Result<Json<Vec<Product>>> {
    let products = ProductRepository::new(state.pool())
        .featured(FEATURED_LIMIT)
        .await?;
    Ok(Json(products))
}

/// Distinct categories present in the catalog.
pub async fn categories(State(state): State<AppState>) -> Result<Json<Vec<String>>> {
    let categories = ProductRepository::new(state.pool()).categories().await?;
    Ok(Json(categories))
}
