//! HTTP route handlers for the API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /api/health                     - Liveness check
//! GET  /api/health/ready               - Readiness check (database ping)
//!
//! # Products
//! GET    /api/products                 - Catalog listing with filters/pagination
//! POST   /api/products                 - Create product (admin)
//! GET    /api/products/{id}            - Product detail
//! PUT    /api/products/{id}            - Update product (admin)
//! DELETE /api/products/{id}            - Delete product (admin)
//! GET    /api/products/featured/list   - Top sellers
//! GET    /api/products/categories/all  - Distinct categories
//!
//! # Users
//! POST /api/users/register             - Create account, returns bearer token
//! POST /api/users/login                - Login, returns bearer token
//! GET  /api/users/profile              - Current account with wishlist (auth)
//! PUT  /api/users/preferences          - Replace preferences (auth)
//! POST /api/users/history              - Append browsing event (auth)
//! GET  /api/users                      - All accounts (admin)
//!
//! # Orders
//! POST /api/orders                     - Place order
//! GET  /api/orders                     - All orders (admin)
//! GET  /api/orders/myorders/{userId}   - Orders for a user, newest first
//! GET  /api/orders/{id}                - Single order, user populated
//! PUT  /api/orders/{id}/status         - Overwrite status (admin)
//! GET  /api/orders/stats/summary       - Count, paid revenue, recent (admin)
//!
//! # AI
//! GET /api/ai/recommendations[/{userId}] - Scored recommendations
//! GET /api/ai/similar/{productId}        - Same-category price-band products
//! GET /api/ai/search?q=                  - Full-text search with fallback
//! GET /api/ai/insights                   - Catalog aggregates (admin)
//! ```

pub mod ai;
pub mod orders;
pub mod products;
pub mod users;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::state::AppState;

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::list).post(products::create))
        .route(
            "/{id}",
            get(products::show)
                .put(products::update)
                .delete(products::remove),
        )
        .route("/featured/list", get(products::featured))
        .route("/categories/all", get(products::categories))
}

/// Create the user routes router.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(users::list))
        .route("/register", post(users::register))
        .route("/login", post(users::login))
        .route("/profile", get(users::profile))
        .route("/preferences", put(users::update_preferences))
        .route("/history", post(users::add_history))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(orders::create).get(orders::list))
        .route("/myorders/{user_id}", get(orders::my_orders))
        .route("/stats/summary", get(orders::stats))
        .route("/{id}", get(orders::show))
        .route("/{id}/status", put(orders::update_status))
}

/// Create the AI routes router.
pub fn ai_routes() -> Router<AppState> {
    Router::new()
        .route("/recommendations", get(ai::recommendations_anonymous))
        .route("/recommendations/{user_id}", get(ai::recommendations))
        .route("/similar/{product_id}", get(ai::similar))
        .route("/search", get(ai::search))
        .route("/insights", get(ai::insights))
}

/// Create all routes for the API.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/api/products", product_routes())
        .nest("/api/users", user_routes())
        .nest("/api/orders", order_routes())
        .nest("/api/ai", ai_routes())
}
