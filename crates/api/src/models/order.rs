//! Order domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use clementine_core::{
    Email, OrderId, OrderStatus, PaymentMethod, PaymentStatus, PriceBreakdown, ProductId,
    ShippingStatus, UserId,
};

/// A snapshot of a product captured at order time.
///
/// Intentionally decoupled from live product state: later catalog edits do
/// not rewrite history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineItem {
    /// The referenced product.
    pub product: ProductId,
    /// Product name at order time.
    pub name: String,
    /// Unit price at order time.
    pub price: Decimal,
    /// Requested quantity, at least 1.
    pub quantity: u32,
    /// Primary product image at order time.
    #[serde(default)]
    pub image: Option<String>,
}

/// Shipping destination for an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    pub city: String,
    pub zip_code: String,
    #[serde(default = "default_country")]
    pub country: String,
}

fn default_country() -> String {
    "USA".to_string()
}

/// Payment descriptor supplied at checkout.
///
/// Not verified against a real payment processor; `status` is taken at face
/// value.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentInfo {
    pub method: PaymentMethod,
    #[serde(default)]
    pub status: PaymentStatus,
    #[serde(default)]
    pub transaction_id: Option<String>,
    #[serde(default)]
    pub paid_at: Option<DateTime<Utc>>,
}

/// A placed order (domain type).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    #[serde(rename = "orderItems")]
    pub line_items: Vec<OrderLineItem>,
    pub shipping_address: ShippingAddress,
    #[serde(rename = "paymentInfo")]
    pub payment: PaymentInfo,
    pub prices: PriceBreakdown,
    pub status: OrderStatus,
    pub shipping_status: ShippingStatus,
    pub tracking_number: Option<String>,
    pub notes: Option<String>,
    pub is_paid: bool,
    pub paid_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The slice of account data attached to populated order responses.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderUser {
    pub id: UserId,
    pub name: String,
    pub email: Email,
}

/// An order with its owning user populated.
#[derive(Debug, Clone, Serialize)]
pub struct OrderWithUser {
    #[serde(flatten)]
    pub order: Order,
    pub user: OrderUser,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_item_json_shape() {
        let json = serde_json::json!({
            "product": 3,
            "name": "Desk Lamp",
            "price": "24.99",
            "quantity": 2
        });
        let item: OrderLineItem = serde_json::from_value(json).expect("deserialize");
        assert_eq!(item.product, ProductId::new(3));
        assert_eq!(item.quantity, 2);
        assert_eq!(item.image, None);
    }

    #[test]
    fn test_shipping_address_country_defaults() {
        let json = serde_json::json!({
            "firstName": "Ada",
            "lastName": "Lovelace",
            "address": "12 Analytical Row",
            "city": "London",
            "zipCode": "EC1A"
        });
        let address: ShippingAddress = serde_json::from_value(json).expect("deserialize");
        assert_eq!(address.country, "USA");
    }

    #[test]
    fn test_payment_status_defaults_to_pending() {
        let json = serde_json::json!({ "method": "card" });
        let payment: PaymentInfo = serde_json::from_value(json).expect("deserialize");
        assert_eq!(payment.status, PaymentStatus::Pending);
        assert_eq!(payment.method, PaymentMethod::Card);
    }
}
