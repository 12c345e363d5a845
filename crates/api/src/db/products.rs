//! Product repository for catalog database operations.
//!
//! Also carries the read queries the recommendation filter and the insights
//! endpoint are built on, so every catalog access lives in one place.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::postgres::Postgres;
use sqlx::{PgConnection, PgPool, QueryBuilder};

use clementine_core::{Category, LOW_STOCK_THRESHOLD, ProductId, ProductStatus};

use super::RepositoryError;
use crate::models::{Product, ProductDraft};

/// Column list matching [`ProductRow`].
const PRODUCT_COLUMNS: &str = "id, name, description, price, original_price, images, category, \
     stock, rating, reviews, features, specifications, status, sales, tags, created_at, updated_at";

/// Full-text search vector over name, description, and tags.
///
/// Must stay in sync with the GIN index expression in the migrations.
const SEARCH_VECTOR: &str =
    "to_tsvector('english', name || ' ' || description || ' ' || array_to_string(tags, ' '))";

/// Sort orders accepted by the product listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProductSort {
    /// Sales count, descending. The listing default.
    #[default]
    BestSelling,
    PriceAsc,
    PriceDesc,
    Rating,
    Newest,
}

impl ProductSort {
    /// Parse the `sort` query parameter; unknown values fall back to the
    /// default ordering.
    #[must_use]
    pub fn from_query(value: Option<&str>) -> Self {
        match value {
            Some("price_asc") => Self::PriceAsc,
            Some("price_desc") => Self::PriceDesc,
            Some("rating") => Self::Rating,
            Some("newest") => Self::Newest,
            _ => Self::BestSelling,
        }
    }

    const fn order_clause(self) -> &'static str {
        match self {
            Self::BestSelling => " ORDER BY sales DESC",
            Self::PriceAsc => " ORDER BY price ASC",
            Self::PriceDesc => " ORDER BY price DESC",
            Self::Rating => " ORDER BY rating DESC",
            Self::Newest => " ORDER BY created_at DESC",
        }
    }
}

/// Filters and pagination for the product listing.
#[derive(Debug, Clone, Default)]
pub struct ProductQuery {
    pub category: Option<Category>,
    pub search: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub sort: ProductSort,
    /// 1-based page number.
    pub page: u32,
    pub limit: u32,
}

/// Category aggregate for the insights endpoint.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CategorySales {
    pub category: String,
    pub total_sales: i64,
    pub revenue: Decimal,
}

/// Price-band aggregate for the insights endpoint.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PriceBucket {
    pub label: String,
    pub count: i64,
    pub avg_rating: Option<f64>,
}

/// Trimmed product projection for the insights trending list.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TrendingProduct {
    pub name: String,
    pub category: String,
    pub sales: i32,
    pub rating: f32,
    pub price: Decimal,
}

/// Database row for a product; converted to [`Product`] explicitly.
#[derive(sqlx::FromRow)]
struct ProductRow {
    id: i32,
    name: String,
    description: String,
    price: Decimal,
    original_price: Option<Decimal>,
    images: Vec<String>,
    category: String,
    stock: i32,
    rating: f32,
    reviews: i32,
    features: Vec<String>,
    specifications: Option<serde_json::Value>,
    status: String,
    sales: i32,
    tags: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ProductRow {
    fn into_domain(self) -> Result<Product, RepositoryError> {
        let category = self.category.parse::<Category>().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid category in database: {e}"))
        })?;
        let status = self.status.parse::<ProductStatus>().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid product status in database: {e}"))
        })?;

        Ok(Product {
            id: ProductId::new(self.id),
            name: self.name,
            description: self.description,
            price: self.price,
            original_price: self.original_price,
            images: self.images,
            category,
            stock: self.stock,
            rating: self.rating,
            reviews: self.reviews,
            features: self.features,
            specifications: self.specifications,
            status,
            sales: self.sales,
            tags: self.tags,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn rows_into_domain(rows: Vec<ProductRow>) -> Result<Vec<Product>, RepositoryError> {
    rows.into_iter().map(ProductRow::into_domain).collect()
}

/// Repository for catalog database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List products matching the query, with the total match count.
    ///
    /// Only listed (active/low stock) products are returned.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(
        &self,
        query: &ProductQuery,
    ) -> Result<(Vec<Product>, i64), RepositoryError> {
        let mut count_builder =
            QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM products WHERE ");
        push_listing_filters(&mut count_builder, query);
        let total: i64 = count_builder
            .build_query_scalar()
            .fetch_one(self.pool)
            .await?;

        let mut builder = QueryBuilder::<Postgres>::new(format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE "
        ));
        push_listing_filters(&mut builder, query);
        builder.push(query.sort.order_clause());

        let limit = i64::from(query.limit.max(1));
        let offset = i64::from(query.page.max(1) - 1) * limit;
        builder.push(" LIMIT ").push_bind(limit);
        builder.push(" OFFSET ").push_bind(offset);

        let rows: Vec<ProductRow> = builder.build_query_as().fetch_all(self.pool).await?;
        Ok((rows_into_domain(rows)?, total))
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row: Option<ProductRow> = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(ProductRow::into_domain).transpose()
    }

    /// Get several products by ID, in no particular order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_many(&self, ids: &[ProductId]) -> Result<Vec<Product>, RepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let raw_ids: Vec<i32> = ids.iter().map(ProductId::as_i32).collect();
        let rows: Vec<ProductRow> = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ANY($1)"
        ))
        .bind(&raw_ids)
        .fetch_all(self.pool)
        .await?;

        rows_into_domain(rows)
    }

    /// Insert a new product. Status is derived from the draft's stock.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn insert(&self, draft: &ProductDraft) -> Result<Product, RepositoryError> {
        let status = ProductStatus::from_stock(draft.stock);
        let row: ProductRow = sqlx::query_as(&format!(
            "INSERT INTO products \
                 (name, description, price, original_price, images, category, stock, rating, \
                  reviews, features, specifications, status, sales, tags) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, 0, $13) \
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(&draft.name)
        .bind(&draft.description)
        .bind(draft.price)
        .bind(draft.original_price)
        .bind(&draft.images)
        .bind(draft.category.as_str())
        .bind(draft.stock)
        .bind(draft.rating)
        .bind(draft.reviews)
        .bind(&draft.features)
        .bind(&draft.specifications)
        .bind(status.to_string())
        .bind(&draft.tags)
        .fetch_one(self.pool)
        .await?;

        row.into_domain()
    }

    /// Overwrite a product's writable fields. Status is re-derived from the
    /// draft's stock. Returns `None` if the product does not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn replace(
        &self,
        id: ProductId,
        draft: &ProductDraft,
    ) -> Result<Option<Product>, RepositoryError> {
        let status = ProductStatus::from_stock(draft.stock);
        let row: Option<ProductRow> = sqlx::query_as(&format!(
            "UPDATE products SET \
                 name = $2, description = $3, price = $4, original_price = $5, images = $6, \
                 category = $7, stock = $8, rating = $9, reviews = $10, features = $11, \
                 specifications = $12, status = $13, tags = $14, updated_at = now() \
             WHERE id = $1 \
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(id.as_i32())
        .bind(&draft.name)
        .bind(&draft.description)
        .bind(draft.price)
        .bind(draft.original_price)
        .bind(&draft.images)
        .bind(draft.category.as_str())
        .bind(draft.stock)
        .bind(draft.rating)
        .bind(draft.reviews)
        .bind(&draft.features)
        .bind(&draft.specifications)
        .bind(status.to_string())
        .bind(&draft.tags)
        .fetch_optional(self.pool)
        .await?;

        row.map(ProductRow::into_domain).transpose()
    }

    /// Delete a product. Returns whether a row was removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id.as_i32())
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Top active products by sales, for the featured list.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn featured(&self, limit: i64) -> Result<Vec<Product>, RepositoryError> {
        let rows: Vec<ProductRow> = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE status = 'active' ORDER BY sales DESC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        rows_into_domain(rows)
    }

    /// Distinct categories currently present in the catalog.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn categories(&self) -> Result<Vec<String>, RepositoryError> {
        let categories = sqlx::query_scalar("SELECT DISTINCT category FROM products ORDER BY 1")
            .fetch_all(self.pool)
            .await?;
        Ok(categories)
    }

    /// Active products in the given categories and price band, excluding the
    /// given ids. Candidate pool for history-based recommendations.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn recommendation_candidates(
        &self,
        categories: &[Category],
        exclude: &[ProductId],
        min_price: Decimal,
        max_price: Decimal,
        limit: i64,
    ) -> Result<Vec<Product>, RepositoryError> {
        let category_names: Vec<String> =
            categories.iter().map(|c| c.as_str().to_owned()).collect();
        let exclude_ids: Vec<i32> = exclude.iter().map(ProductId::as_i32).collect();

        let rows: Vec<ProductRow> = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE status = 'active' \
               AND category = ANY($1) \
               AND NOT (id = ANY($2)) \
               AND price >= $3 AND price <= $4 \
             LIMIT $5"
        ))
        .bind(&category_names)
        .bind(&exclude_ids)
        .bind(min_price)
        .bind(max_price)
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        rows_into_domain(rows)
    }

    /// Globally best-selling active products, excluding the given ids.
    /// Fallback pool for recommendations.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn best_sellers(
        &self,
        exclude: &[ProductId],
        limit: i64,
    ) -> Result<Vec<Product>, RepositoryError> {
        let exclude_ids: Vec<i32> = exclude.iter().map(ProductId::as_i32).collect();
        let rows: Vec<ProductRow> = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE status = 'active' AND NOT (id = ANY($1)) \
             ORDER BY sales DESC, rating DESC LIMIT $2"
        ))
        .bind(&exclude_ids)
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        rows_into_domain(rows)
    }

    /// Active products in the same category and within half to one-and-a-half
    /// times the price of the given product, excluding itself.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn similar_to(
        &self,
        product: &Product,
        limit: i64,
    ) -> Result<Vec<Product>, RepositoryError> {
        let half = product.price * Decimal::new(5, 1);
        let one_and_a_half = product.price * Decimal::new(15, 1);

        let rows: Vec<ProductRow> = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE status = 'active' \
               AND category = $1 \
               AND id <> $2 \
               AND price >= $3 AND price <= $4 \
             LIMIT $5"
        ))
        .bind(product.category.as_str())
        .bind(product.id.as_i32())
        .bind(half)
        .bind(one_and_a_half)
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        rows_into_domain(rows)
    }

    /// Full-text search ranked by relevance.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn search_fulltext(
        &self,
        term: &str,
        limit: i64,
    ) -> Result<Vec<Product>, RepositoryError> {
        let rows: Vec<ProductRow> = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE {SEARCH_VECTOR} @@ plainto_tsquery('english', $1) \
             ORDER BY ts_rank({SEARCH_VECTOR}, plainto_tsquery('english', $1)) DESC \
             LIMIT $2"
        ))
        .bind(term)
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        rows_into_domain(rows)
    }

    /// Case-insensitive substring fallback over name, description, and tags.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn search_substring(
        &self,
        term: &str,
        limit: i64,
    ) -> Result<Vec<Product>, RepositoryError> {
        let pattern = format!("%{}%", escape_like(term));
        let rows: Vec<ProductRow> = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE status = 'active' \
               AND (name ILIKE $1 \
                    OR description ILIKE $1 \
                    OR EXISTS (SELECT 1 FROM unnest(tags) AS tag WHERE tag ILIKE $1)) \
             LIMIT $2"
        ))
        .bind(&pattern)
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        rows_into_domain(rows)
    }

    /// Top categories by units sold, with revenue.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn category_stats(&self, limit: i64) -> Result<Vec<CategorySales>, RepositoryError> {
        let stats = sqlx::query_as(
            "SELECT category, \
                    SUM(sales)::BIGINT AS total_sales, \
                    SUM(sales * price) AS revenue \
             FROM products WHERE sales > 0 \
             GROUP BY category ORDER BY total_sales DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(self.pool)
        .await?;
        Ok(stats)
    }

    /// Distribution of active products across fixed price bands.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn price_buckets(&self) -> Result<Vec<PriceBucket>, RepositoryError> {
        let buckets = sqlx::query_as(
            "SELECT CASE \
                      WHEN price < 50 THEN '0-50' \
                      WHEN price < 100 THEN '50-100' \
                      WHEN price < 250 THEN '100-250' \
                      WHEN price < 500 THEN '250-500' \
                      WHEN price < 1000 THEN '500-1000' \
                      ELSE '1000+' \
                    END AS label, \
                    COUNT(*) AS count, \
                    AVG(rating)::DOUBLE PRECISION AS avg_rating \
             FROM products WHERE status = 'active' \
             GROUP BY 1 ORDER BY MIN(price)",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(buckets)
    }

    /// Top active products by sales, trimmed to the insights projection.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn trending(&self, limit: i64) -> Result<Vec<TrendingProduct>, RepositoryError> {
        let trending = sqlx::query_as(
            "SELECT name, category, sales, rating, price FROM products \
             WHERE status = 'active' ORDER BY sales DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(self.pool)
        .await?;
        Ok(trending)
    }

    /// Debit stock and credit sales for one line item, re-deriving status in
    /// the same statement so the stock/status invariant holds at rest.
    ///
    /// Takes a connection rather than the pool so the order engine can run
    /// every line item and the order insert inside one transaction. There is
    /// deliberately no sufficiency check; stock can go negative.
    ///
    /// Returns `false` when the product does not exist (the line item is then
    /// kept as a pure snapshot).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn debit_stock(
        conn: &mut PgConnection,
        id: ProductId,
        quantity: i32,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(&format!(
            "UPDATE products SET \
                 stock = stock - $2, \
                 sales = sales + $2, \
                 status = CASE \
                     WHEN stock - $2 <= 0 THEN 'out_of_stock' \
                     WHEN stock - $2 < {LOW_STOCK_THRESHOLD} THEN 'low_stock' \
                     ELSE 'active' \
                 END, \
                 updated_at = now() \
             WHERE id = $1"
        ))
        .bind(id.as_i32())
        .bind(quantity)
        .execute(conn)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Push the shared listing WHERE clauses onto a query builder.
fn push_listing_filters<'args>(
    builder: &mut QueryBuilder<'args, Postgres>,
    query: &'args ProductQuery,
) {
    builder.push("status IN ('active', 'low_stock')");

    if let Some(category) = query.category {
        builder.push(" AND category = ").push_bind(category.as_str());
    }

    if let Some(search) = &query.search {
        builder
            .push(format!(" AND {SEARCH_VECTOR} @@ plainto_tsquery('english', "))
            .push_bind(search.as_str())
            .push(")");
    }

    if let Some(min_price) = query.min_price {
        builder.push(" AND price >= ").push_bind(min_price);
    }

    if let Some(max_price) = query.max_price {
        builder.push(" AND price <= ").push_bind(max_price);
    }
}

/// Escape LIKE metacharacters in user-supplied search terms.
fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_from_query() {
        assert_eq!(
            ProductSort::from_query(Some("price_asc")),
            ProductSort::PriceAsc
        );
        assert_eq!(ProductSort::from_query(Some("rating")), ProductSort::Rating);
        assert_eq!(ProductSort::from_query(Some("newest")), ProductSort::Newest);
        assert_eq!(
            ProductSort::from_query(Some("bogus")),
            ProductSort::BestSelling
        );
        assert_eq!(ProductSort::from_query(None), ProductSort::BestSelling);
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("50% off_now"), "50\\% off\\_now");
        assert_eq!(escape_like("plain"), "plain");
    }
}
