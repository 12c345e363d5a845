//! Status and role enums for catalog, order, and account entities.

use serde::{Deserialize, Serialize};

/// Stock level below which a product is flagged as low stock.
pub const LOW_STOCK_THRESHOLD: i32 = 10;

/// Catalog product status.
///
/// Derived from the stock count on every persist; see [`ProductStatus::from_stock`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    #[default]
    Active,
    Inactive,
    OutOfStock,
    LowStock,
}

impl ProductStatus {
    /// Derive the status a product must carry at rest for a given stock count.
    ///
    /// stock = 0 is out of stock, stock below [`LOW_STOCK_THRESHOLD`] is low
    /// stock, anything else is active. Negative stock counts as sold out.
    #[must_use]
    pub const fn from_stock(stock: i32) -> Self {
        if stock <= 0 {
            Self::OutOfStock
        } else if stock < LOW_STOCK_THRESHOLD {
            Self::LowStock
        } else {
            Self::Active
        }
    }

    /// Whether products with this status are sellable and listed.
    #[must_use]
    pub const fn is_listed(&self) -> bool {
        matches!(self, Self::Active | Self::LowStock)
    }
}

/// Order lifecycle status.
///
/// No transition graph is enforced between these values; `update_status`
/// overwrites whatever was there before.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
    Refunded,
}

impl OrderStatus {
    /// Whether this status normally ends the lifecycle.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled | Self::Refunded)
    }
}

/// Delivery-tracking state, distinct from the order's overall status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ShippingStatus {
    #[default]
    NotShipped,
    Shipped,
    InTransit,
    Delivered,
}

/// Accepted payment methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Card,
    Paypal,
    ApplePay,
    GooglePay,
}

/// State of a payment as reported by the (unverified) payment descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Completed,
    Failed,
    Refunded,
}

/// Account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    #[default]
    User,
    Admin,
}

macro_rules! impl_str_conv {
    ($type:ident { $($variant:ident => $name:literal),+ $(,)? }) => {
        impl std::fmt::Display for $type {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(Self::$variant => write!(f, $name)),+
                }
            }
        }

        impl std::str::FromStr for $type {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($name => Ok(Self::$variant),)+
                    _ => Err(format!(concat!("invalid ", stringify!($type), ": {}"), s)),
                }
            }
        }
    };
}

impl_str_conv!(ProductStatus {
    Active => "active",
    Inactive => "inactive",
    OutOfStock => "out_of_stock",
    LowStock => "low_stock",
});

impl_str_conv!(OrderStatus {
    Pending => "pending",
    Processing => "processing",
    Shipped => "shipped",
    Delivered => "delivered",
    Cancelled => "cancelled",
    Refunded => "refunded",
});

impl_str_conv!(ShippingStatus {
    NotShipped => "not_shipped",
    Shipped => "shipped",
    InTransit => "in_transit",
    Delivered => "delivered",
});

impl_str_conv!(PaymentMethod {
    Card => "card",
    Paypal => "paypal",
    ApplePay => "apple_pay",
    GooglePay => "google_pay",
});

impl_str_conv!(PaymentStatus {
    Pending => "pending",
    Completed => "completed",
    Failed => "failed",
    Refunded => "refunded",
});

impl_str_conv!(UserRole {
    User => "user",
    Admin => "admin",
});

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_status_from_stock() {
        assert_eq!(ProductStatus::from_stock(0), ProductStatus::OutOfStock);
        assert_eq!(ProductStatus::from_stock(-3), ProductStatus::OutOfStock);
        assert_eq!(ProductStatus::from_stock(1), ProductStatus::LowStock);
        assert_eq!(ProductStatus::from_stock(9), ProductStatus::LowStock);
        assert_eq!(ProductStatus::from_stock(10), ProductStatus::Active);
        assert_eq!(ProductStatus::from_stock(500), ProductStatus::Active);
    }

    #[test]
    fn test_listed_statuses() {
        assert!(ProductStatus::Active.is_listed());
        assert!(ProductStatus::LowStock.is_listed());
        assert!(!ProductStatus::OutOfStock.is_listed());
        assert!(!ProductStatus::Inactive.is_listed());
    }

    #[test]
    fn test_str_roundtrip() {
        assert_eq!(
            OrderStatus::from_str("delivered").expect("parse"),
            OrderStatus::Delivered
        );
        assert_eq!(OrderStatus::Delivered.to_string(), "delivered");
        assert_eq!(
            PaymentMethod::from_str("apple_pay").expect("parse"),
            PaymentMethod::ApplePay
        );
        assert_eq!(
            ShippingStatus::from_str("in_transit").expect("parse"),
            ShippingStatus::InTransit
        );
        assert!(OrderStatus::from_str("lost").is_err());
    }

    #[test]
    fn test_serde_snake_case() {
        assert_eq!(
            serde_json::to_string(&PaymentStatus::Completed).expect("serialize"),
            "\"completed\""
        );
        let status: OrderStatus = serde_json::from_str("\"processing\"").expect("deserialize");
        assert_eq!(status, OrderStatus::Processing);
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(OrderStatus::Delivered.is_terminal());
        assert!(OrderStatus::Refunded.is_terminal());
        assert!(!OrderStatus::Pending.is_terminal());
        assert!(!OrderStatus::Shipped.is_terminal());
    }
}
