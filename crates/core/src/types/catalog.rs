//! Catalog classification enums.

use serde::{Deserialize, Serialize};

/// Error parsing a [`Category`] from a string.
#[derive(thiserror::Error, Debug, Clone)]
#[error("invalid category: {0}")]
pub struct CategoryError(pub String);

/// Product category.
///
/// Categories are a closed set; the storefront navigation is built from
/// them, so adding a variant is a product decision, not a data migration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "category", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Smartphones,
    Tablets,
    Smartwatches,
    Accessories,
}

impl Category {
    /// All categories, in navigation order.
    pub const ALL: [Self; 4] = [
        Self::Smartphones,
        Self::Tablets,
        Self::Smartwatches,
        Self::Accessories,
    ];
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Smartphones => write!(f, "smartphones"),
            Self::Tablets => write!(f, "tablets"),
            Self::Smartwatches => write!(f, "smartwatches"),
            Self::Accessories => write!(f, "accessories"),
        }
    }
}

impl std::str::FromStr for Category {
    type Err = CategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "smartphones" => Ok(Self::Smartphones),
            "tablets" => Ok(Self::Tablets),
            "smartwatches" => Ok(Self::Smartwatches),
            "accessories" => Ok(Self::Accessories),
            _ => Err(CategoryError(s.to_owned())),
        }
    }
}

/// Error parsing a [`ProductTag`] from a string.
#[derive(thiserror::Error, Debug, Clone)]
#[error("invalid tag: {0}")]
pub struct ProductTagError(pub String);

/// Promotional label on a product, distinct from category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "product_tag", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum ProductTag {
    New,
    Sale,
    Popular,
}

impl std::fmt::Display for ProductTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::New => write!(f, "new"),
            Self::Sale => write!(f, "sale"),
            Self::Popular => write!(f, "popular"),
        }
    }
}

impl std::str::FromStr for ProductTag {
    type Err = ProductTagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(Self::New),
            "sale" => Ok(Self::Sale),
            "popular" => Ok(Self::Popular),
            _ => Err(ProductTagError(s.to_owned())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_category_roundtrip() {
        for c in Category::ALL {
            assert_eq!(Category::from_str(&c.to_string()).unwrap(), c);
        }
    }

    #[test]
    fn test_category_invalid() {
        assert!(Category::from_str("laptops").is_err());
    }

    #[test]
    fn test_category_serde_snake_case() {
        let json = serde_json::to_string(&Category::Smartwatches).unwrap();
        assert_eq!(json, "\"smartwatches\"");
    }

    #[test]
    fn test_tag_roundtrip() {
        for t in [ProductTag::New, ProductTag::Sale, ProductTag::Popular] {
            assert_eq!(ProductTag::from_str(&t.to_string()).unwrap(), t);
        }
    }
}
