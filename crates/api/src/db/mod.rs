//! Database operations for the Clementine Market `PostgreSQL` store.
//!
//! ## Tables
//!
//! - `products` - Catalog with stock, sales, and derived status
//! - `users` - Accounts, roles, hashed credentials, JSON preferences
//! - `orders` - Placed orders with line-item snapshots and price breakdown
//! - `browsing_history` / `purchase_history` - Interaction logs feeding the
//!   recommendation filter
//! - `wishlist` - Saved products per user
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p clementine-cli -- migrate
//! ```
//!
//! Queries are bound at runtime and rows are converted to domain types
//! explicitly; values that fail conversion surface as
//! [`RepositoryError::DataCorruption`].

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

pub mod orders;
pub mod products;
pub mod users;

pub use orders::{NewOrder, OrderRepository, OrderStats};
pub use products::{ProductQuery, ProductRepository, ProductSort};
pub use users::UserRepository;

/// Errors from repository operations.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
