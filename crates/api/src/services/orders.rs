//! The order engine.
//!
//! Takes a cart (line-item snapshots, shipping address, payment descriptor),
//! validates it at the boundary, debits catalog stock, recomputes pricing
//! from the stored snapshots (client totals are ignored), and persists the
//! order. The stock debits and the order insert share one transaction, so a
//! failed insert cannot leak debited stock.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use clementine_core::{OrderId, OrderStatus, PaymentStatus, PriceBreakdown, ShippingStatus, UserId};

use crate::db::orders::{NewOrder, OrderRepository};
use crate::db::products::ProductRepository;
use crate::db::RepositoryError;
use crate::models::order::{OrderLineItem, PaymentInfo, ShippingAddress};
use crate::models::Order;

/// Order engine errors.
#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("No order items")]
    EmptyOrder,

    #[error("Order item {line} has an invalid quantity")]
    InvalidQuantity { line: usize },

    #[error("Order item {line} has a negative price")]
    InvalidPrice { line: usize },

    #[error("Shipping address is missing {0}")]
    MissingAddressField(&'static str),

    #[error("Order not found")]
    NotFound,

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// A checkout request after deserialization, before validation.
#[derive(Debug, Clone)]
pub struct PlaceOrder {
    pub user_id: UserId,
    pub items: Vec<OrderLineItem>,
    pub shipping_address: ShippingAddress,
    pub payment: PaymentInfo,
    pub notes: Option<String>,
}

/// The order engine service.
pub struct OrderService<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderService<'a> {
    /// Create a new order service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Place an order.
    ///
    /// For each line item whose product still exists, stock is debited and
    /// the sales counter credited by the requested quantity; items whose
    /// product has vanished are kept as pure snapshots. There is no
    /// sufficiency check, so stock can go negative. Pricing is recomputed
    /// from the submitted snapshots. `is_paid` is set iff the payment
    /// descriptor reports `completed`.
    ///
    /// # Errors
    ///
    /// Returns a validation error (and persists nothing) for an empty item
    /// list, a non-positive quantity, a negative price, or a blank required
    /// address field, and `OrderError::Repository` if the database fails.
    pub async fn place_order(&self, input: PlaceOrder) -> Result<Order, OrderError> {
        validate_order(&input)?;

        let mut tx = self.pool.begin().await.map_err(RepositoryError::from)?;

        for item in &input.items {
            // Quantities were validated to fit i32 above.
            #[allow(clippy::cast_possible_wrap)]
            let quantity = item.quantity as i32;
            let existed =
                ProductRepository::debit_stock(&mut *tx, item.product, quantity).await?;
            if !existed {
                tracing::debug!(product = %item.product, "order references missing product, snapshot kept");
            }
        }

        let prices =
            PriceBreakdown::compute(input.items.iter().map(|item| (item.price, item.quantity)));
        let is_paid = input.payment.status == PaymentStatus::Completed;
        let paid_at = if is_paid {
            Some(input.payment.paid_at.unwrap_or_else(Utc::now))
        } else {
            None
        };

        let order = OrderRepository::insert(
            &mut *tx,
            &NewOrder {
                user_id: input.user_id,
                line_items: input.items,
                shipping_address: input.shipping_address,
                payment: input.payment,
                prices,
                is_paid,
                paid_at,
                notes: input.notes,
            },
        )
        .await?;

        tx.commit().await.map_err(RepositoryError::from)?;

        tracing::info!(order = %order.id, user = %order.user_id, total = %order.prices.total_price, "order placed");
        Ok(order)
    }

    /// Overwrite an order's status, optionally attaching a tracking number.
    ///
    /// Any target status is accepted from any current status. Moving to
    /// `delivered` also stamps the delivery time and sets the shipping
    /// status to delivered.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::NotFound` for an unknown order id and
    /// `OrderError::Repository` if the database fails.
    pub async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
        tracking_number: Option<&str>,
    ) -> Result<Order, OrderError> {
        let repo = OrderRepository::new(self.pool);
        let existing = repo.get(id).await?.ok_or(OrderError::NotFound)?;

        if existing.status.is_terminal() && !status.is_terminal() {
            tracing::warn!(
                order = %id,
                from = %existing.status,
                to = %status,
                "order moved out of a terminal status"
            );
        }

        let (shipping_status, delivered_at): (Option<ShippingStatus>, Option<DateTime<Utc>>) =
            if status == OrderStatus::Delivered {
                (Some(ShippingStatus::Delivered), Some(Utc::now()))
            } else {
                (None, None)
            };

        repo.update_status(id, status, shipping_status, tracking_number, delivered_at)
            .await?
            .ok_or(OrderError::NotFound)
    }
}

/// Boundary validation, applied before any mutation.
fn validate_order(input: &PlaceOrder) -> Result<(), OrderError> {
    if input.items.is_empty() {
        return Err(OrderError::EmptyOrder);
    }

    for (index, item) in input.items.iter().enumerate() {
        if item.quantity < 1 || i32::try_from(item.quantity).is_err() {
            return Err(OrderError::InvalidQuantity { line: index });
        }
        if item.price < Decimal::ZERO {
            return Err(OrderError::InvalidPrice { line: index });
        }
    }

    let address = &input.shipping_address;
    for (value, field) in [
        (&address.first_name, "firstName"),
        (&address.last_name, "lastName"),
        (&address.address, "address"),
        (&address.city, "city"),
        (&address.zip_code, "zipCode"),
    ] {
        if value.trim().is_empty() {
            return Err(OrderError::MissingAddressField(field));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clementine_core::{PaymentMethod, ProductId};

    fn line_item(id: i32, price: &str, quantity: u32) -> OrderLineItem {
        OrderLineItem {
            product: ProductId::new(id),
            name: format!("product-{id}"),
            price: price.parse().expect("decimal literal"),
            quantity,
            image: Some("/img/p.jpg".to_string()),
        }
    }

    fn address() -> ShippingAddress {
        ShippingAddress {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            address: "12 Analytical Row".to_string(),
            city: "London".to_string(),
            zip_code: "EC1A".to_string(),
            country: "UK".to_string(),
        }
    }

    fn payment(status: PaymentStatus) -> PaymentInfo {
        PaymentInfo {
            method: PaymentMethod::Card,
            status,
            transaction_id: None,
            paid_at: None,
        }
    }

    fn place_order(items: Vec<OrderLineItem>) -> PlaceOrder {
        PlaceOrder {
            user_id: UserId::new(1),
            items,
            shipping_address: address(),
            payment: payment(PaymentStatus::Pending),
            notes: None,
        }
    }

    #[test]
    fn test_empty_order_rejected() {
        assert!(matches!(
            validate_order(&place_order(Vec::new())),
            Err(OrderError::EmptyOrder)
        ));
    }

    #[test]
    fn test_zero_quantity_rejected() {
        let order = place_order(vec![line_item(1, "20", 1), line_item(2, "5", 0)]);
        assert!(matches!(
            validate_order(&order),
            Err(OrderError::InvalidQuantity { line: 1 })
        ));
    }

    #[test]
    fn test_negative_price_rejected() {
        let order = place_order(vec![line_item(1, "-0.01", 1)]);
        assert!(matches!(
            validate_order(&order),
            Err(OrderError::InvalidPrice { line: 0 })
        ));
    }

    #[test]
    fn test_blank_address_field_rejected() {
        let mut order = place_order(vec![line_item(1, "20", 1)]);
        order.shipping_address.city = "  ".to_string();
        assert!(matches!(
            validate_order(&order),
            Err(OrderError::MissingAddressField("city"))
        ));
    }

    #[test]
    fn test_valid_order_passes() {
        let order = place_order(vec![line_item(1, "60", 1), line_item(2, "50", 1)]);
        assert!(validate_order(&order).is_ok());
    }

    #[test]
    fn test_pricing_matches_engine_formula() {
        // The engine recomputes from snapshots with the shared formula.
        let items = [line_item(1, "60", 1), line_item(2, "50", 1)];
        let prices = PriceBreakdown::compute(items.iter().map(|i| (i.price, i.quantity)));
        assert_eq!(prices.total_price, "118.80".parse::<Decimal>().expect("decimal"));

        let items = [line_item(1, "20", 2)];
        let prices = PriceBreakdown::compute(items.iter().map(|i| (i.price, i.quantity)));
        assert_eq!(prices.total_price, "53.20".parse::<Decimal>().expect("decimal"));
    }

    #[test]
    fn test_is_paid_follows_payment_status() {
        assert!(payment(PaymentStatus::Completed).status == PaymentStatus::Completed);
        assert!(payment(PaymentStatus::Pending).status != PaymentStatus::Completed);
        assert!(payment(PaymentStatus::Failed).status != PaymentStatus::Completed);
    }
}
