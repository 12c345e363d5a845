//! Order repository for database operations.
//!
//! Line items, shipping address, and payment descriptor are stored as JSONB
//! snapshots; the price breakdown and lifecycle fields are columns.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};

use clementine_core::{
    Email, OrderId, OrderStatus, PriceBreakdown, ShippingStatus, UserId,
};

use super::RepositoryError;
use crate::models::{Order, OrderUser, OrderWithUser};
use crate::models::order::{OrderLineItem, PaymentInfo, ShippingAddress};

/// Column list matching [`OrderRow`].
const ORDER_COLUMNS: &str = "id, user_id, line_items, shipping_address, payment, items_price, \
     shipping_price, tax_price, total_price, status, shipping_status, tracking_number, notes, \
     is_paid, paid_at, delivered_at, created_at, updated_at";

/// A fully-derived order ready to insert; built by the order engine.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: UserId,
    pub line_items: Vec<OrderLineItem>,
    pub shipping_address: ShippingAddress,
    pub payment: PaymentInfo,
    pub prices: PriceBreakdown,
    pub is_paid: bool,
    pub paid_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

/// Aggregate figures for the order stats endpoint.
#[derive(Debug, Clone)]
pub struct OrderStats {
    pub total_orders: i64,
    pub total_revenue: Decimal,
    pub recent_orders: Vec<OrderWithUser>,
}

/// Database row for an order; converted to [`Order`] explicitly.
#[derive(sqlx::FromRow)]
struct OrderRow {
    id: i32,
    user_id: i32,
    line_items: serde_json::Value,
    shipping_address: serde_json::Value,
    payment: serde_json::Value,
    items_price: Decimal,
    shipping_price: Decimal,
    tax_price: Decimal,
    total_price: Decimal,
    status: String,
    shipping_status: String,
    tracking_number: Option<String>,
    notes: Option<String>,
    is_paid: bool,
    paid_at: Option<DateTime<Utc>>,
    delivered_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Order row joined with the owning user's name and email.
#[derive(sqlx::FromRow)]
struct OrderUserRow {
    #[sqlx(flatten)]
    order: OrderRow,
    user_name: String,
    user_email: String,
}

impl OrderRow {
    fn into_domain(self) -> Result<Order, RepositoryError> {
        let corrupt = |what: &str, e: &dyn std::fmt::Display| {
            RepositoryError::DataCorruption(format!("invalid {what} in database: {e}"))
        };

        let line_items: Vec<OrderLineItem> = serde_json::from_value(self.line_items)
            .map_err(|e| corrupt("order line items", &e))?;
        let shipping_address: ShippingAddress = serde_json::from_value(self.shipping_address)
            .map_err(|e| corrupt("shipping address", &e))?;
        let payment: PaymentInfo =
            serde_json::from_value(self.payment).map_err(|e| corrupt("payment info", &e))?;
        let status = self
            .status
            .parse::<OrderStatus>()
            .map_err(|e| corrupt("order status", &e))?;
        let shipping_status = self
            .shipping_status
            .parse::<ShippingStatus>()
            .map_err(|e| corrupt("shipping status", &e))?;

        Ok(Order {
            id: OrderId::new(self.id),
            user_id: UserId::new(self.user_id),
            line_items,
            shipping_address,
            payment,
            prices: PriceBreakdown {
                items_price: self.items_price,
                shipping_price: self.shipping_price,
                tax_price: self.tax_price,
                total_price: self.total_price,
            },
            status,
            shipping_status,
            tracking_number: self.tracking_number,
            notes: self.notes,
            is_paid: self.is_paid,
            paid_at: self.paid_at,
            delivered_at: self.delivered_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl OrderUserRow {
    fn into_domain(self) -> Result<OrderWithUser, RepositoryError> {
        let user_id = UserId::new(self.order.user_id);
        let email = Email::parse(&self.user_email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        let order = self.order.into_domain()?;

        Ok(OrderWithUser {
            order,
            user: OrderUser {
                id: user_id,
                name: self.user_name,
                email,
            },
        })
    }
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert an order inside the caller's transaction.
    ///
    /// Takes a connection so the order engine can pair the insert with the
    /// stock debits it belongs with.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails, or
    /// `RepositoryError::DataCorruption` if a snapshot cannot be serialized.
    pub async fn insert(
        conn: &mut PgConnection,
        order: &NewOrder,
    ) -> Result<Order, RepositoryError> {
        let serialize = |what: &str, value: Result<serde_json::Value, serde_json::Error>| {
            value.map_err(|e| {
                RepositoryError::DataCorruption(format!("cannot serialize {what}: {e}"))
            })
        };
        let line_items = serialize("line items", serde_json::to_value(&order.line_items))?;
        let shipping_address = serialize(
            "shipping address",
            serde_json::to_value(&order.shipping_address),
        )?;
        let payment = serialize("payment info", serde_json::to_value(&order.payment))?;

        let row: OrderRow = sqlx::query_as(&format!(
            "INSERT INTO orders \
                 (user_id, line_items, shipping_address, payment, items_price, shipping_price, \
                  tax_price, total_price, is_paid, paid_at, notes) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(order.user_id.as_i32())
        .bind(line_items)
        .bind(shipping_address)
        .bind(payment)
        .bind(order.prices.items_price)
        .bind(order.prices.shipping_price)
        .bind(order.prices.tax_price)
        .bind(order.prices.total_price)
        .bind(order.is_paid)
        .bind(order.paid_at)
        .bind(&order.notes)
        .fetch_one(conn)
        .await?;

        row.into_domain()
    }

    /// Get an order by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row: Option<OrderRow> = sqlx::query_as(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"
        ))
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(OrderRow::into_domain).transpose()
    }

    /// Get an order by ID with the owning user populated.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_with_user(
        &self,
        id: OrderId,
    ) -> Result<Option<OrderWithUser>, RepositoryError> {
        let row: Option<OrderUserRow> = sqlx::query_as(&format!(
            "SELECT o.*, u.name AS user_name, u.email AS user_email \
             FROM (SELECT {ORDER_COLUMNS} FROM orders) o \
             JOIN users u ON u.id = o.user_id \
             WHERE o.id = $1"
        ))
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(OrderUserRow::into_domain).transpose()
    }

    /// All orders for a user, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let rows: Vec<OrderRow> = sqlx::query_as(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(OrderRow::into_domain).collect()
    }

    /// All orders, newest first, users populated.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<OrderWithUser>, RepositoryError> {
        let rows: Vec<OrderUserRow> = sqlx::query_as(&format!(
            "SELECT o.*, u.name AS user_name, u.email AS user_email \
             FROM (SELECT {ORDER_COLUMNS} FROM orders) o \
             JOIN users u ON u.id = o.user_id \
             ORDER BY o.created_at DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(OrderUserRow::into_domain).collect()
    }

    /// Overwrite an order's lifecycle fields.
    ///
    /// No transition validation happens here; the order engine decides what
    /// to write. Returns `None` if the order does not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
        shipping_status: Option<ShippingStatus>,
        tracking_number: Option<&str>,
        delivered_at: Option<DateTime<Utc>>,
    ) -> Result<Option<Order>, RepositoryError> {
        let row: Option<OrderRow> = sqlx::query_as(&format!(
            "UPDATE orders SET \
                 status = $2, \
                 shipping_status = COALESCE($3, shipping_status), \
                 tracking_number = COALESCE($4, tracking_number), \
                 delivered_at = COALESCE($5, delivered_at), \
                 updated_at = now() \
             WHERE id = $1 \
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(id.as_i32())
        .bind(status.to_string())
        .bind(shipping_status.map(|s| s.to_string()))
        .bind(tracking_number)
        .bind(delivered_at)
        .fetch_optional(self.pool)
        .await?;

        row.map(OrderRow::into_domain).transpose()
    }

    /// Aggregate order count, paid revenue, and the five most recent orders.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn stats(&self) -> Result<OrderStats, RepositoryError> {
        let total_orders: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(self.pool)
            .await?;

        let total_revenue: Decimal = sqlx::query_scalar(
            "SELECT COALESCE(SUM(total_price), 0) FROM orders WHERE is_paid",
        )
        .fetch_one(self.pool)
        .await?;

        let rows: Vec<OrderUserRow> = sqlx::query_as(&format!(
            "SELECT o.*, u.name AS user_name, u.email AS user_email \
             FROM (SELECT {ORDER_COLUMNS} FROM orders) o \
             JOIN users u ON u.id = o.user_id \
             ORDER BY o.created_at DESC LIMIT 5"
        ))
        .fetch_all(self.pool)
        .await?;
        let recent_orders: Vec<OrderWithUser> = rows
            .into_iter()
            .map(OrderUserRow::into_domain)
            .collect::<Result<_, _>>()?;

        Ok(OrderStats {
            total_orders,
            total_revenue,
            recent_orders,
        })
    }
}
