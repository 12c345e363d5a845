//! Catalog product domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use clementine_core::{Category, ProductId, ProductStatus};

/// Maximum product name length.
pub const MAX_NAME_LENGTH: usize = 100;

/// Maximum product description length.
pub const MAX_DESCRIPTION_LENGTH: usize = 2000;

/// A catalog product (domain type).
///
/// `status` is derived from `stock` on every persist; see
/// [`ProductStatus::from_stock`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub original_price: Option<Decimal>,
    pub images: Vec<String>,
    pub category: Category,
    pub stock: i32,
    pub rating: f32,
    pub reviews: i32,
    pub features: Vec<String>,
    pub specifications: Option<serde_json::Value>,
    pub status: ProductStatus,
    pub sales: i32,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The full writable field set of a product.
///
/// Used both as the create payload and as the result of applying a
/// [`ProductPatch`] to an existing product before persisting it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    #[serde(default)]
    pub original_price: Option<Decimal>,
    #[serde(default)]
    pub images: Vec<String>,
    pub category: Category,
    #[serde(default)]
    pub stock: i32,
    #[serde(default)]
    pub rating: f32,
    #[serde(default)]
    pub reviews: i32,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub specifications: Option<serde_json::Value>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl ProductDraft {
    /// Validate field constraints before any mutation.
    ///
    /// # Errors
    ///
    /// Returns a human-readable message describing the first violated
    /// constraint.
    pub fn validate(&self) -> Result<(), String> {
        validate_fields(
            &self.name,
            &self.description,
            self.price,
            self.original_price,
            self.rating,
            self.stock,
        )
    }
}

/// Payload for partially updating a product. Absent fields are left as-is.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub original_price: Option<Decimal>,
    pub images: Option<Vec<String>>,
    pub category: Option<Category>,
    pub stock: Option<i32>,
    pub rating: Option<f32>,
    pub reviews: Option<i32>,
    pub features: Option<Vec<String>>,
    pub specifications: Option<serde_json::Value>,
    pub tags: Option<Vec<String>>,
}

impl ProductPatch {
    /// Merge this patch over an existing product, yielding the draft to
    /// validate and persist. Absent fields keep the existing values.
    #[must_use]
    pub fn apply(self, existing: &Product) -> ProductDraft {
        ProductDraft {
            name: self.name.unwrap_or_else(|| existing.name.clone()),
            description: self
                .description
                .unwrap_or_else(|| existing.description.clone()),
            price: self.price.unwrap_or(existing.price),
            original_price: self.original_price.or(existing.original_price),
            images: self.images.unwrap_or_else(|| existing.images.clone()),
            category: self.category.unwrap_or(existing.category),
            stock: self.stock.unwrap_or(existing.stock),
            rating: self.rating.unwrap_or(existing.rating),
            reviews: self.reviews.unwrap_or(existing.reviews),
            features: self.features.unwrap_or_else(|| existing.features.clone()),
            specifications: self
                .specifications
                .or_else(|| existing.specifications.clone()),
            tags: self.tags.unwrap_or_else(|| existing.tags.clone()),
        }
    }
}

/// Shared field validation for create and update payloads.
pub(crate) fn validate_fields(
    name: &str,
    description: &str,
    price: Decimal,
    original_price: Option<Decimal>,
    rating: f32,
    stock: i32,
) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("Product name is required".to_string());
    }
    if name.len() > MAX_NAME_LENGTH {
        return Err(format!(
            "Product name cannot exceed {MAX_NAME_LENGTH} characters"
        ));
    }
    if description.trim().is_empty() {
        return Err("Product description is required".to_string());
    }
    if description.len() > MAX_DESCRIPTION_LENGTH {
        return Err(format!(
            "Description cannot exceed {MAX_DESCRIPTION_LENGTH} characters"
        ));
    }
    if price < Decimal::ZERO {
        return Err("Price cannot be negative".to_string());
    }
    if original_price.is_some_and(|p| p < Decimal::ZERO) {
        return Err("Original price cannot be negative".to_string());
    }
    if !(0.0..=5.0).contains(&rating) {
        return Err("Rating must be between 0 and 5".to_string());
    }
    if stock < 0 {
        return Err("Stock cannot be negative".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_product() -> ProductDraft {
        ProductDraft {
            name: "Wireless Headphones".to_string(),
            description: "Over-ear, 30h battery".to_string(),
            price: Decimal::new(12999, 2),
            original_price: None,
            images: vec!["/img/headphones.jpg".to_string()],
            category: Category::Electronics,
            stock: 25,
            rating: 4.5,
            reviews: 12,
            features: Vec::new(),
            specifications: None,
            tags: vec!["audio".to_string()],
        }
    }

    #[test]
    fn test_valid_product_passes() {
        assert!(new_product().validate().is_ok());
    }

    #[test]
    fn test_empty_name_rejected() {
        let mut product = new_product();
        product.name = "  ".to_string();
        assert_eq!(
            product.validate().unwrap_err(),
            "Product name is required"
        );
    }

    #[test]
    fn test_overlong_description_rejected() {
        let mut product = new_product();
        product.description = "x".repeat(MAX_DESCRIPTION_LENGTH + 1);
        assert!(product.validate().is_err());
    }

    #[test]
    fn test_negative_price_rejected() {
        let mut product = new_product();
        product.price = Decimal::new(-1, 0);
        assert_eq!(product.validate().unwrap_err(), "Price cannot be negative");
    }

    #[test]
    fn test_rating_out_of_range_rejected() {
        let mut product = new_product();
        product.rating = 5.5;
        assert!(product.validate().is_err());
    }

    #[test]
    fn test_patch_apply_keeps_absent_fields() {
        let draft = new_product();
        let existing = Product {
            id: ProductId::new(1),
            name: draft.name.clone(),
            description: draft.description.clone(),
            price: draft.price,
            original_price: draft.original_price,
            images: draft.images.clone(),
            category: draft.category,
            stock: draft.stock,
            rating: draft.rating,
            reviews: draft.reviews,
            features: draft.features.clone(),
            specifications: draft.specifications.clone(),
            status: ProductStatus::Active,
            sales: 4,
            tags: draft.tags.clone(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let patch = ProductPatch {
            price: Some(Decimal::new(9999, 2)),
            stock: Some(5),
            ..ProductPatch::default()
        };
        let merged = patch.apply(&existing);

        assert_eq!(merged.price, Decimal::new(9999, 2));
        assert_eq!(merged.stock, 5);
        assert_eq!(merged.name, existing.name);
        assert_eq!(merged.tags, existing.tags);
    }

    #[test]
    fn test_camel_case_payload() {
        let json = serde_json::json!({
            "name": "Desk Lamp",
            "description": "Warm light",
            "price": "24.99",
            "originalPrice": "39.99",
            "category": "Home & Living",
            "stock": 3
        });
        let product: ProductDraft = serde_json::from_value(json).expect("deserialize");
        assert_eq!(product.original_price, Some(Decimal::new(3999, 2)));
        assert_eq!(product.category, Category::HomeLiving);
    }
}
