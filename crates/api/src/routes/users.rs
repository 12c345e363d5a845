//! Account route handlers.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use clementine_core::{Email, ProductId, UserId, UserRole};

use crate::db::{ProductRepository, UserRepository};
use crate::error::Result;
use crate::middleware::{CurrentUser, RequireAdmin};
use crate::models::{Preferences, Product, User};
use crate::services::AuthService;
use crate::state::AppState;

/// Registration payload.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Login payload.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Account summary plus bearer token, returned by register and login.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub role: UserRole,
    pub token: String,
}

impl AuthResponse {
    fn new(user: User, token: String) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            token,
        }
    }
}

/// Current account with its wishlist populated.
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    #[serde(flatten)]
    pub user: User,
    pub wishlist: Vec<Product>,
}

/// Browsing event payload.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRequest {
    pub product_id: ProductId,
    #[serde(default)]
    pub time_spent: Option<i32>,
}

/// Register a new account.
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>)> {
    let auth = AuthService::new(
        state.pool(),
        state.token_keys(),
        state.config().token_ttl_days,
    );
    let (user, token) = auth.register(&body.name, &body.email, &body.password).await?;

    Ok((StatusCode::CREATED, Json(AuthResponse::new(user, token))))
}

/// Login with email and password.
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<AuthResponse>> {
    let auth = AuthService::new(
        state.pool(),
        state.token_keys(),
        state.config().token_ttl_days,
    );
    let (user, token) = auth.login(&body.email, &body.password).await?;

    Ok(Json(AuthResponse::new(user, token)))
}

/// Current account with wishlist populated.
pub async fn profile(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<ProfileResponse>> {
    let wishlist_ids = UserRepository::new(state.pool()).wishlist_ids(user.id).await?;
    let wishlist = ProductRepository::new(state.pool())
        .get_many(&wishlist_ids)
        .await?;

    Ok(Json(ProfileResponse { user, wishlist }))
}

/// Replace the current account's preferences.
pub async fn update_preferences(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(preferences): Json<Preferences>,
) -> Result<Json<Preferences>> {
    UserRepository::new(state.pool())
        .set_preferences(user.id, &preferences)
        .await?;

    Ok(Json(preferences))
}

/// Append a browsing event to the current account's history.
pub async fn add_history(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(body): Json<HistoryRequest>,
) -> Result<Json<serde_json::Value>> {
    UserRepository::new(state.pool())
        .add_browsing_event(user.id, body.product_id, body.time_spent)
        .await?;

    Ok(Json(serde_json::json!({ "message": "History updated" })))
}

/// All accounts (admin). Credential hashes are never serialized.
pub async fn list(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<User>>> {
    let users = UserRepository::new(state.pool()).list().await?;
    Ok(Json(users))
}
