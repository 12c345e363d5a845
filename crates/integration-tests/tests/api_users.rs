//! Integration tests for accounts and authentication.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The API server running (cargo run -p clementine-api)
//!
//! Run with: cargo test -p clementine-integration-tests -- --ignored

use serde_json::{Value, json};

use clementine_integration_tests::{api_base_url, client, register_test_user, unique_email};

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_register_then_login() {
    let client = client();
    let base_url = api_base_url();
    let email = unique_email("users-login");

    let (_id, register_token) = register_test_user(&client, &email).await;
    assert!(!register_token.is_empty());

    let resp = client
        .post(format!("{base_url}/api/users/login"))
        .json(&json!({ "email": email, "password": "integration-pass" }))
        .send()
        .await
        .expect("Failed to login");

    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.expect("Failed to read body");
    assert_eq!(body["email"], email);
    assert_eq!(body["role"], "user");
    assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_duplicate_registration_rejected() {
    let client = client();
    let base_url = api_base_url();
    let email = unique_email("users-dup");

    register_test_user(&client, &email).await;

    let resp = client
        .post(format!("{base_url}/api/users/register"))
        .json(&json!({
            "name": "Test Shopper",
            "email": email,
            "password": "integration-pass",
        }))
        .send()
        .await
        .expect("Failed to send registration");

    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.expect("Failed to read body");
    assert_eq!(body["message"], "User already exists");
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_wrong_password_rejected() {
    let client = client();
    let base_url = api_base_url();
    let email = unique_email("users-wrongpw");

    register_test_user(&client, &email).await;

    let resp = client
        .post(format!("{base_url}/api/users/login"))
        .json(&json!({ "email": email, "password": "not-the-password" }))
        .send()
        .await
        .expect("Failed to login");

    assert_eq!(resp.status(), 401);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_profile_requires_token() {
    let client = client();
    let base_url = api_base_url();

    let resp = client
        .get(format!("{base_url}/api/users/profile"))
        .send()
        .await
        .expect("Failed to fetch profile");
    assert_eq!(resp.status(), 401);

    let resp = client
        .get(format!("{base_url}/api/users/profile"))
        .header("Authorization", "Bearer not-a-real-token")
        .send()
        .await
        .expect("Failed to fetch profile");
    assert_eq!(resp.status(), 401);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_profile_with_token() {
    let client = client();
    let base_url = api_base_url();
    let email = unique_email("users-profile");
    let (id, token) = register_test_user(&client, &email).await;

    let resp = client
        .get(format!("{base_url}/api/users/profile"))
        .header("Authorization", format!("Bearer {token}"))
        .send()
        .await
        .expect("Failed to fetch profile");

    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.expect("Failed to read body");
    assert_eq!(body["id"].as_i64().expect("id"), id);
    assert_eq!(body["email"], email);
    assert!(body["wishlist"].is_array());
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_preferences_roundtrip() {
    let client = client();
    let base_url = api_base_url();
    let (_id, token) = register_test_user(&client, &unique_email("users-prefs")).await;

    let preferences = json!({
        "categories": ["Electronics"],
        "priceRange": { "min": "10", "max": "200" },
        "notifications": { "email": false, "sms": true },
    });

    let resp = client
        .put(format!("{base_url}/api/users/preferences"))
        .header("Authorization", format!("Bearer {token}"))
        .json(&preferences)
        .send()
        .await
        .expect("Failed to update preferences");

    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.expect("Failed to read body");
    assert_eq!(body["categories"][0], "Electronics");
    assert_eq!(body["notifications"]["sms"], true);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_browsing_history_recorded() {
    let client = client();
    let base_url = api_base_url();
    let (_id, token) = register_test_user(&client, &unique_email("users-history")).await;

    let resp = client
        .post(format!("{base_url}/api/users/history"))
        .header("Authorization", format!("Bearer {token}"))
        .json(&json!({ "productId": 1, "timeSpent": 42 }))
        .send()
        .await
        .expect("Failed to record history");

    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.expect("Failed to read body");
    assert_eq!(body["message"], "History updated");
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_user_listing_requires_admin() {
    let client = client();
    let base_url = api_base_url();
    let (_id, token) = register_test_user(&client, &unique_email("users-admin")).await;

    let resp = client
        .get(format!("{base_url}/api/users"))
        .header("Authorization", format!("Bearer {token}"))
        .send()
        .await
        .expect("Failed to fetch users");

    // Fresh registrations get the plain user role
    assert_eq!(resp.status(), 403);
}
