//! Integration tests for recommendations, search, and insights.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The API server running (cargo run -p clementine-api)
//! - A seeded catalog with at least 4 active products
//!
//! Run with: cargo test -p clementine-integration-tests -- --ignored

use serde_json::Value;

use clementine_integration_tests::{api_base_url, client, register_test_user, unique_email};

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_anonymous_recommendations_fall_back_to_trending() {
    let client = client();
    let base_url = api_base_url();

    let resp = client
        .get(format!("{base_url}/api/ai/recommendations?limit=4"))
        .send()
        .await
        .expect("Failed to fetch recommendations");

    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.expect("Failed to read body");
    let recommendations = body["recommendations"].as_array().expect("recommendations");
    assert_eq!(recommendations.len(), 4);

    for item in recommendations {
        assert_eq!(item["reason"], "Trending now");
        let score = item["matchScore"].as_i64().expect("matchScore");
        assert!((70..90).contains(&score), "score {score} out of range");
    }

    let confidence = body["aiStats"]["confidence"].as_i64().expect("confidence");
    assert!((85..95).contains(&confidence));
    assert!(body["aiStats"]["dataPoints"].as_i64().is_some());
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_user_without_history_gets_trending() {
    let client = client();
    let base_url = api_base_url();
    let (user_id, _token) = register_test_user(&client, &unique_email("ai-fresh")).await;

    let resp = client
        .get(format!("{base_url}/api/ai/recommendations/{user_id}?limit=4"))
        .send()
        .await
        .expect("Failed to fetch recommendations");

    let body: Value = resp.json().await.expect("Failed to read body");
    let recommendations = body["recommendations"].as_array().expect("recommendations");
    assert_eq!(recommendations.len(), 4);
    for item in recommendations {
        assert_eq!(item["reason"], "Trending now");
    }
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_browsing_history_changes_reasons() {
    let client = client();
    let base_url = api_base_url();
    let (user_id, token) = register_test_user(&client, &unique_email("ai-history")).await;

    // View a product so the profile has a category and price band
    let resp = client
        .post(format!("{base_url}/api/users/history"))
        .header("Authorization", format!("Bearer {token}"))
        .json(&serde_json::json!({ "productId": 1, "timeSpent": 30 }))
        .send()
        .await
        .expect("Failed to record history");
    assert_eq!(resp.status(), 200);

    let body: Value = client
        .get(format!("{base_url}/api/ai/recommendations/{user_id}?limit=4"))
        .send()
        .await
        .expect("Failed to fetch recommendations")
        .json()
        .await
        .expect("Failed to read body");

    for item in body["recommendations"].as_array().expect("recommendations") {
        let reason = item["reason"].as_str().expect("reason");
        assert!(
            reason == "Based on your browsing history" || reason == "Trending now",
            "unexpected reason: {reason}"
        );
        // History matches never include the viewed product itself
        if reason == "Based on your browsing history" {
            assert_ne!(item["id"].as_i64(), Some(1));
        }
    }
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_similar_products_same_category() {
    let client = client();
    let base_url = api_base_url();

    let product: Value = client
        .get(format!("{base_url}/api/products/1"))
        .send()
        .await
        .expect("Failed to fetch product")
        .json()
        .await
        .expect("Failed to read product");

    let similar: Value = client
        .get(format!("{base_url}/api/ai/similar/1"))
        .send()
        .await
        .expect("Failed to fetch similar")
        .json()
        .await
        .expect("Failed to read similar");

    let similar = similar.as_array().expect("similar array");
    assert!(similar.len() <= 4);
    for item in similar {
        assert_eq!(item["category"], product["category"]);
        assert_ne!(item["id"], product["id"]);
    }
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_search_returns_fixed_suggestions() {
    let client = client();
    let base_url = api_base_url();

    let body: Value = client
        .get(format!("{base_url}/api/ai/search?q=headphones"))
        .send()
        .await
        .expect("Failed to search")
        .json()
        .await
        .expect("Failed to read body");

    assert_eq!(body["query"], "headphones");
    assert_eq!(body["aiEnhanced"], true);
    assert_eq!(
        body["suggestions"],
        serde_json::json!([
            "headphones premium",
            "headphones luxury",
            "best headphones",
            "headphones sale",
        ])
    );
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_search_without_query_is_400() {
    let client = client();
    let base_url = api_base_url();

    let resp = client
        .get(format!("{base_url}/api/ai/search"))
        .send()
        .await
        .expect("Failed to search");
    assert_eq!(resp.status(), 400);

    let body: Value = resp.json().await.expect("Failed to read body");
    assert_eq!(body["message"], "Search query required");
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_insights_require_admin() {
    let client = client();
    let base_url = api_base_url();

    let resp = client
        .get(format!("{base_url}/api/ai/insights"))
        .send()
        .await
        .expect("Failed to fetch insights");
    assert_eq!(resp.status(), 401);
}
