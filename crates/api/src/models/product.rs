//! Product domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use voltline_core::{Category, ProductId, ProductTag, Slug};

/// A catalog product.
///
/// `slug` is derived from `name` and recomputed whenever the name changes;
/// the store enforces its uniqueness. `stock` is informational: it is not
/// decremented on order placement unless the order policy enables it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique product ID.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// URL-safe identifier derived from `name`.
    pub slug: Slug,
    /// Navigation category.
    pub category: Category,
    /// Current price.
    pub price: Decimal,
    /// Previous price, shown struck through when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_price: Option<Decimal>,
    /// Average rating, 0-5.
    pub rating: Decimal,
    /// Units on hand.
    pub stock: i32,
    /// Stored-asset reference URL from the media collaborator.
    pub image: String,
    /// Promotional tag, distinct from category.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<ProductTag>,
    /// Long-form description.
    pub description: String,
    /// When the product was created.
    pub created_at: DateTime<Utc>,
}

/// Fields required to create a product.
///
/// The slug is derived by the catalog service, not supplied by the caller.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub slug: Slug,
    pub category: Category,
    pub price: Decimal,
    pub old_price: Option<Decimal>,
    pub stock: i32,
    pub image: String,
    pub tag: Option<ProductTag>,
    pub description: String,
}

/// A partial product update.
///
/// `None` fields are left untouched. `slug` is set by the catalog service
/// iff `name` is present. The nested options on `old_price` and `tag`
/// distinguish "leave alone" (`None`) from "clear" (`Some(None)`).
#[derive(Debug, Clone, Default)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub slug: Option<Slug>,
    pub category: Option<Category>,
    pub price: Option<Decimal>,
    pub old_price: Option<Option<Decimal>>,
    pub stock: Option<i32>,
    pub image: Option<String>,
    pub tag: Option<Option<ProductTag>>,
    pub description: Option<String>,
}

impl ProductPatch {
    /// Whether the patch carries no changes at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.slug.is_none()
            && self.category.is_none()
            && self.price.is_none()
            && self.old_price.is_none()
            && self.stock.is_none()
            && self.image.is_none()
            && self.tag.is_none()
            && self.description.is_none()
    }
}
