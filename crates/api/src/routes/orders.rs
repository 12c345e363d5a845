//! Order route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use clementine_core::{OrderId, OrderStatus, UserId};

use crate::db::OrderRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::{Order, OrderLineItem, OrderWithUser, PaymentInfo, ShippingAddress};
use crate::services::OrderService;
use crate::services::orders::PlaceOrder;
use crate::state::AppState;

/// Checkout payload. Any client-supplied totals are ignored; the engine
/// recomputes pricing from the line items.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub user_id: UserId,
    #[serde(default)]
    pub order_items: Vec<OrderLineItem>,
    pub shipping_address: ShippingAddress,
    pub payment_info: PaymentInfo,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Status update payload.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
    #[serde(default)]
    pub tracking_number: Option<String>,
}

/// Response for the stats endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub total_orders: i64,
    pub total_revenue: Decimal,
    pub recent_orders: Vec<OrderWithUser>,
}

/// Place an order.
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<Order>)> {
    let order = OrderService::new(state.pool())
        .place_order(PlaceOrder {
            user_id: body.user_id,
            items: body.order_items,
            shipping_address: body.shipping_address,
            payment: body.payment_info,
            notes: body.notes,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(order)))
}

/// Orders for a user, newest first.
pub async fn my_orders(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> Result<Json<Vec<Order>>> {
    let orders = OrderRepository::new(state.pool())
        .list_by_user(user_id)
        .await?;
    Ok(Json(orders))
}

/// Single order with the owning user populated.
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<Json<OrderWithUser>> {
    let order = OrderRepository::new(state.pool())
        .get_with_user(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;

    Ok(Json(order))
}

/// Overwrite an order's status (admin).
pub async fn update_status(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    Json(body): Json<UpdateStatusRequest>,
) -> Result<Json<Order>> {
    let order = OrderService::new(state.pool())
        .update_status(id, body.status, body.tracking_number.as_deref())
        .await?;

    Ok(Json(order))
}

/// All orders, newest first (admin).
pub async fn list(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<OrderWithUser>>> {
    let orders = OrderRepository::new(state.pool()).list_all().await?;
    Ok(Json(orders))
}

/// Order count, paid revenue, and the five most recent orders (admin).
pub async fn stats(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<StatsResponse>> {
    let stats = OrderRepository::new(state.pool()).stats().await?;

    Ok(Json(StatsResponse {
        total_orders: stats.total_orders,
        total_revenue: stats.total_revenue,
        recent_orders: stats.recent_orders,
    }))
}
