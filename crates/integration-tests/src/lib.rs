//! Integration tests for Clementine Market.
//!
//! # Running Tests
//!
//! ```bash
//! # Start PostgreSQL, run migrations, seed, and start the API
//! cargo run -p clementine-cli -- migrate
//! cargo run -p clementine-cli -- seed
//! cargo run -p clementine-api
//!
//! # Run integration tests (ignored by default)
//! cargo test -p clementine-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `api_products` - Catalog listing, CRUD, featured, categories
//! - `api_users` - Registration, login, profile, history
//! - `api_orders` - Checkout, pricing, status updates, stats
//! - `api_ai` - Recommendations, similar products, search, insights

/// Base URL for the API (configurable via environment).
#[must_use]
pub fn api_base_url() -> String {
    std::env::var("CLEMENTINE_API_URL").unwrap_or_else(|_| "http://localhost:5000".to_string())
}

/// A plain HTTP client.
///
/// # Panics
///
/// Panics if the client cannot be constructed.
#[must_use]
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .build()
        .expect("Failed to create HTTP client")
}

/// Register a throwaway user and return `(user id, bearer token)`.
///
/// # Panics
///
/// Panics if the request fails or the response is not the expected shape.
pub async fn register_test_user(client: &reqwest::Client, email: &str) -> (i64, String) {
    let base_url = api_base_url();
    let resp = client
        .post(format!("{base_url}/api/users/register"))
        .json(&serde_json::json!({
            "name": "Test Shopper",
            "email": email,
            "password": "integration-pass",
        }))
        .send()
        .await
        .expect("Failed to register test user");

    assert_eq!(resp.status(), 201, "registration should return 201");
    let body: serde_json::Value = resp.json().await.expect("Failed to read response");
    let id = body["id"].as_i64().expect("user id");
    let token = body["token"].as_str().expect("bearer token").to_string();
    (id, token)
}

/// A unique email per test run, so reruns do not collide.
#[must_use]
pub fn unique_email(prefix: &str) -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    format!("{prefix}-{nanos}@integration.test")
}
