//! Account domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use clementine_core::{Email, ProductId, UserId, UserRole};

/// An account (domain type). The credential hash is never part of this type;
/// it is fetched separately where verification needs it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub role: UserRole,
    pub avatar: Option<String>,
    pub phone: Option<String>,
    pub address: Option<Address>,
    pub preferences: Preferences,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Postal address attached to an account.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(default)]
    pub street: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub zip_code: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

/// Shopping preferences used as recommendation filters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub price_range: Option<PriceRange>,
    #[serde(default)]
    pub notifications: Notifications,
}

/// Preferred price band.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceRange {
    pub min: Decimal,
    pub max: Decimal,
}

/// Notification opt-ins.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notifications {
    #[serde(default = "default_true")]
    pub email: bool,
    #[serde(default)]
    pub sms: bool,
}

impl Default for Notifications {
    fn default() -> Self {
        Self {
            email: true,
            sms: false,
        }
    }
}

const fn default_true() -> bool {
    true
}

/// A product view recorded in the browsing log.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BrowsingEvent {
    pub product: ProductId,
    pub viewed_at: DateTime<Utc>,
    pub time_spent: Option<i32>,
}

/// A purchase recorded in the interaction log.
///
/// Recorded independently of orders and allowed to diverge from them.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRecord {
    pub product: ProductId,
    pub quantity: i32,
    pub purchase_date: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preferences_defaults() {
        let preferences: Preferences = serde_json::from_value(serde_json::json!({}))
            .expect("deserialize empty preferences");
        assert!(preferences.categories.is_empty());
        assert!(preferences.price_range.is_none());
        assert!(preferences.notifications.email);
        assert!(!preferences.notifications.sms);
    }

    #[test]
    fn test_preferences_roundtrip() {
        let json = serde_json::json!({
            "categories": ["Electronics", "Books"],
            "priceRange": { "min": "10", "max": "250" },
            "notifications": { "email": false, "sms": true }
        });
        let preferences: Preferences = serde_json::from_value(json).expect("deserialize");
        assert_eq!(preferences.categories.len(), 2);
        assert!(!preferences.notifications.email);
        let range = preferences.price_range.as_ref().expect("price range");
        assert_eq!(range.max, Decimal::from(250));
    }
}
