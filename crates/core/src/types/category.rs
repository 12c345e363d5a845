//! Product category taxonomy.

use serde::{Deserialize, Serialize};

/// Error returned when parsing an unknown category name.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown category: {0}")]
pub struct CategoryError(pub String);

/// The closed set of catalog categories.
///
/// Serialized with the display names the storefront uses (e.g. "Home & Living"),
/// which are also the values stored in the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Electronics,
    Fashion,
    Accessories,
    #[serde(rename = "Home & Living")]
    HomeLiving,
    Sports,
    Beauty,
    Books,
}

impl Category {
    /// All categories, in display order.
    pub const ALL: [Self; 7] = [
        Self::Electronics,
        Self::Fashion,
        Self::Accessories,
        Self::HomeLiving,
        Self::Sports,
        Self::Beauty,
        Self::Books,
    ];

    /// The display (and storage) name of the category.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Electronics => "Electronics",
            Self::Fashion => "Fashion",
            Self::Accessories => "Accessories",
            Self::HomeLiving => "Home & Living",
            Self::Sports => "Sports",
            Self::Beauty => "Beauty",
            Self::Books => "Books",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = CategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Electronics" => Ok(Self::Electronics),
            "Fashion" => Ok(Self::Fashion),
            "Accessories" => Ok(Self::Accessories),
            "Home & Living" => Ok(Self::HomeLiving),
            "Sports" => Ok(Self::Sports),
            "Beauty" => Ok(Self::Beauty),
            "Books" => Ok(Self::Books),
            other => Err(CategoryError(other.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_roundtrip_all() {
        for category in Category::ALL {
            assert_eq!(
                Category::from_str(category.as_str()).expect("roundtrip"),
                category
            );
        }
    }

    #[test]
    fn test_serde_uses_display_names() {
        let json = serde_json::to_string(&Category::HomeLiving).expect("serialize");
        assert_eq!(json, "\"Home & Living\"");
        let parsed: Category = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed, Category::HomeLiving);
    }

    #[test]
    fn test_unknown_category() {
        assert!(Category::from_str("Groceries").is_err());
    }
}
