//! Catalog service: product CRUD, category filtering, and search.

use std::sync::Arc;

use rust_decimal::Decimal;
use thiserror::Error;

use voltline_core::{Category, ProductId, ProductTag, Slug};

use crate::error::FieldError;
use crate::media::{MediaError, MediaStore};
use crate::models::{NewProduct, Product, ProductPatch};
use crate::services::auth::{AuthContext, AuthError};
use crate::store::{Store, StoreError};

/// Errors that can occur during catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Malformed or missing fields.
    #[error("validation failed")]
    Validation(Vec<FieldError>),

    /// No image attached on create.
    #[error("image is required")]
    MediaMissing,

    /// The attached image was rejected by the media collaborator.
    #[error("media error: {0}")]
    Media(#[from] MediaError),

    /// Referenced product does not exist.
    #[error("product not found")]
    NotFound,

    /// Caller lacks the required capability.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Store error, including slug uniqueness conflicts.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Raw product fields as submitted by the admin form (multipart text
/// parts). Everything arrives as optional strings; the service decides
/// what is required and how each field parses.
#[derive(Debug, Clone, Default)]
pub struct ProductForm {
    pub name: Option<String>,
    pub category: Option<String>,
    pub price: Option<String>,
    pub old_price: Option<String>,
    pub stock: Option<String>,
    pub tag: Option<String>,
    pub description: Option<String>,
}

/// An uploaded image file from the multipart form.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Catalog service.
pub struct CatalogService {
    store: Arc<dyn Store>,
    media: Arc<dyn MediaStore>,
}

impl CatalogService {
    /// Create a new catalog service.
    #[must_use]
    pub fn new(store: Arc<dyn Store>, media: Arc<dyn MediaStore>) -> Self {
        Self { store, media }
    }

    /// Create a product.
    ///
    /// The slug is derived from the name; the image is stored via the
    /// media collaborator and its reference URL persisted with the
    /// product.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Auth` for non-admin callers,
    /// `CatalogError::Validation` when required fields are missing or
    /// malformed, `CatalogError::MediaMissing` when no image is attached,
    /// and `CatalogError::Store` with a conflict when the slug is taken.
    pub async fn create(
        &self,
        ctx: &AuthContext,
        form: ProductForm,
        image: Option<UploadedImage>,
    ) -> Result<Product, CatalogError> {
        ctx.require_admin().map_err(CatalogError::Auth)?;

        let mut errors = Vec::new();

        let name = require_text(&mut errors, "name", form.name.as_deref());
        let category = require_parsed::<Category>(&mut errors, "category", form.category.as_deref());
        let price = require_decimal(&mut errors, "price", form.price.as_deref());
        let stock = require_stock(&mut errors, form.stock.as_deref());
        let description = require_text(&mut errors, "description", form.description.as_deref());
        let old_price = optional_decimal(&mut errors, "oldPrice", form.old_price.as_deref());
        let tag = optional_parsed::<ProductTag>(&mut errors, "tag", form.tag.as_deref());

        let slug = name.as_deref().and_then(|n| match Slug::from_name(n) {
            Ok(slug) => Some(slug),
            Err(e) => {
                errors.push(FieldError::new("name", e.to_string()));
                None
            }
        });

        if !errors.is_empty() {
            return Err(CatalogError::Validation(errors));
        }
        let (Some(name), Some(slug), Some(category), Some(price), Some(stock), Some(description)) =
            (name, slug, category, price, stock, description)
        else {
            return Err(CatalogError::Validation(errors));
        };

        // Field validation passes before the image check, mirroring the
        // admin form's error ordering
        let image = image.ok_or(CatalogError::MediaMissing)?;
        let asset = self.media.store(&image.filename, image.bytes).await?;

        let product = self
            .store
            .insert_product(NewProduct {
                name,
                slug,
                category,
                price,
                old_price,
                stock,
                image: asset.0,
                tag,
                description,
            })
            .await?;

        tracing::info!(product_id = %product.id, slug = %product.slug, "product created");
        Ok(product)
    }

    /// Apply a partial update to a product.
    ///
    /// Recomputes the slug iff the name changes. A new image replaces the
    /// stored reference; an absent one leaves it untouched.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if the id is absent, plus the
    /// create-time validation errors for any malformed supplied field.
    pub async fn update(
        &self,
        ctx: &AuthContext,
        id: ProductId,
        form: ProductForm,
        image: Option<UploadedImage>,
    ) -> Result<Product, CatalogError> {
        ctx.require_admin().map_err(CatalogError::Auth)?;

        let mut errors = Vec::new();
        let mut patch = ProductPatch::default();

        if let Some(name) = form.name {
            match Slug::from_name(&name) {
                Ok(slug) => {
                    patch.name = Some(name);
                    patch.slug = Some(slug);
                }
                Err(e) => errors.push(FieldError::new("name", e.to_string())),
            }
        }
        if form.category.is_some() {
            patch.category = optional_parsed::<Category>(&mut errors, "category", form.category.as_deref());
        }
        if form.price.is_some() {
            patch.price = optional_decimal(&mut errors, "price", form.price.as_deref());
        }
        if form.old_price.is_some() {
            patch.old_price =
                optional_decimal(&mut errors, "oldPrice", form.old_price.as_deref()).map(Some);
        }
        if form.stock.is_some() {
            patch.stock = require_stock(&mut errors, form.stock.as_deref());
        }
        if form.tag.is_some() {
            patch.tag = optional_parsed::<ProductTag>(&mut errors, "tag", form.tag.as_deref()).map(Some);
        }
        if let Some(description) = form.description {
            if description.trim().is_empty() {
                errors.push(FieldError::new("description", "description is required"));
            } else {
                patch.description = Some(description);
            }
        }

        if !errors.is_empty() {
            return Err(CatalogError::Validation(errors));
        }

        if let Some(image) = image {
            let asset = self.media.store(&image.filename, image.bytes).await?;
            patch.image = Some(asset.0);
        }

        let product = self.store.update_product(id, patch).await.map_err(not_found)?;

        tracing::info!(product_id = %product.id, slug = %product.slug, "product updated");
        Ok(product)
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if the id is absent.
    pub async fn delete(&self, ctx: &AuthContext, id: ProductId) -> Result<(), CatalogError> {
        ctx.require_admin().map_err(CatalogError::Auth)?;
        self.store.delete_product(id).await.map_err(not_found)?;
        tracing::info!(product_id = %id, "product deleted");
        Ok(())
    }

    /// Fetch a product by slug.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if no product has the slug.
    pub async fn get_by_slug(&self, slug: &str) -> Result<Product, CatalogError> {
        self.store
            .product_by_slug(slug)
            .await?
            .ok_or(CatalogError::NotFound)
    }

    /// List all products.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Store` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Product>, CatalogError> {
        Ok(self.store.list_products().await?)
    }

    /// List products in one category.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Store` if the query fails.
    pub async fn list_by_category(&self, category: Category) -> Result<Vec<Product>, CatalogError> {
        Ok(self.store.list_products_by_category(category).await?)
    }

    /// Case-insensitive substring search against name and description.
    ///
    /// No match is an empty vec, not an error.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Store` if the query fails.
    pub async fn search(&self, query: &str) -> Result<Vec<Product>, CatalogError> {
        Ok(self.store.search_products(query).await?)
    }
}

fn not_found(e: StoreError) -> CatalogError {
    match e {
        StoreError::NotFound => CatalogError::NotFound,
        other => CatalogError::Store(other),
    }
}

// =============================================================================
// Field parsing helpers
// =============================================================================

fn require_text(errors: &mut Vec<FieldError>, field: &str, value: Option<&str>) -> Option<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Some(v.to_owned()),
        _ => {
            errors.push(FieldError::new(field, format!("{field} is required")));
            None
        }
    }
}

fn require_parsed<T: std::str::FromStr>(
    errors: &mut Vec<FieldError>,
    field: &str,
    value: Option<&str>,
) -> Option<T> {
    match value {
        Some(v) => optional_parsed(errors, field, Some(v)),
        None => {
            errors.push(FieldError::new(field, format!("{field} is required")));
            None
        }
    }
}

fn optional_parsed<T: std::str::FromStr>(
    errors: &mut Vec<FieldError>,
    field: &str,
    value: Option<&str>,
) -> Option<T> {
    let v = value?;
    match v.parse::<T>() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            errors.push(FieldError::new(field, format!("invalid {field}: {v}")));
            None
        }
    }
}

fn require_decimal(
    errors: &mut Vec<FieldError>,
    field: &str,
    value: Option<&str>,
) -> Option<Decimal> {
    match value {
        Some(v) => optional_decimal(errors, field, Some(v)),
        None => {
            errors.push(FieldError::new(field, format!("{field} is required")));
            None
        }
    }
}

fn optional_decimal(
    errors: &mut Vec<FieldError>,
    field: &str,
    value: Option<&str>,
) -> Option<Decimal> {
    let v = value?;
    match v.parse::<Decimal>() {
        Ok(d) if d >= Decimal::ZERO => Some(d),
        Ok(_) => {
            errors.push(FieldError::new(field, format!("{field} must not be negative")));
            None
        }
        Err(_) => {
            errors.push(FieldError::new(field, format!("{field} must be numeric")));
            None
        }
    }
}

fn require_stock(errors: &mut Vec<FieldError>, value: Option<&str>) -> Option<i32> {
    match value {
        Some(v) => match v.parse::<i32>() {
            Ok(n) if n >= 0 => Some(n),
            Ok(_) => {
                errors.push(FieldError::new("stock", "stock must not be negative"));
                None
            }
            Err(_) => {
                errors.push(FieldError::new("stock", "stock must be numeric"));
                None
            }
        },
        None => {
            errors.push(FieldError::new("stock", "stock is required"));
            None
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::media::NullMediaStore;
    use crate::store::MemoryStore;
    use voltline_core::{Role, UserId};

    fn service() -> CatalogService {
        CatalogService::new(Arc::new(MemoryStore::new()), Arc::new(NullMediaStore))
    }

    fn admin() -> AuthContext {
        AuthContext {
            user_id: UserId::new(1),
            role: Role::Admin,
        }
    }

    fn shopper() -> AuthContext {
        AuthContext {
            user_id: UserId::new(2),
            role: Role::User,
        }
    }

    fn pixel_form() -> ProductForm {
        ProductForm {
            name: Some("Pixel 9".to_owned()),
            category: Some("smartphones".to_owned()),
            price: Some("999".to_owned()),
            old_price: None,
            stock: Some("5".to_owned()),
            tag: None,
            description: Some("Latest flagship".to_owned()),
        }
    }

    fn image() -> UploadedImage {
        UploadedImage {
            filename: "pixel.jpg".to_owned(),
            bytes: vec![0xFF, 0xD8],
        }
    }

    #[tokio::test]
    async fn test_create_derives_slug() {
        let catalog = service();
        let product = catalog
            .create(&admin(), pixel_form(), Some(image()))
            .await
            .unwrap();

        assert_eq!(product.slug.as_str(), "pixel-9");
        assert_eq!(product.category, Category::Smartphones);
        assert_eq!(product.rating, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_create_requires_admin() {
        let catalog = service();
        let err = catalog
            .create(&shopper(), pixel_form(), Some(image()))
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::Auth(AuthError::Forbidden)));
    }

    #[tokio::test]
    async fn test_create_missing_fields_lists_them_all() {
        let catalog = service();
        let err = catalog
            .create(&admin(), ProductForm::default(), Some(image()))
            .await
            .unwrap_err();

        let CatalogError::Validation(errors) = err else {
            panic!("expected validation error");
        };
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert!(fields.contains(&"name"));
        assert!(fields.contains(&"category"));
        assert!(fields.contains(&"price"));
        assert!(fields.contains(&"stock"));
        assert!(fields.contains(&"description"));
    }

    #[tokio::test]
    async fn test_create_without_image() {
        let catalog = service();
        let err = catalog
            .create(&admin(), pixel_form(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::MediaMissing));
    }

    #[tokio::test]
    async fn test_create_duplicate_slug_conflicts() {
        let catalog = service();
        catalog
            .create(&admin(), pixel_form(), Some(image()))
            .await
            .unwrap();

        let err = catalog
            .create(&admin(), pixel_form(), Some(image()))
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::Store(StoreError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_update_name_recomputes_slug() {
        let catalog = service();
        let product = catalog
            .create(&admin(), pixel_form(), Some(image()))
            .await
            .unwrap();

        let updated = catalog
            .update(
                &admin(),
                product.id,
                ProductForm {
                    name: Some("Pixel 9 Pro".to_owned()),
                    ..ProductForm::default()
                },
                None,
            )
            .await
            .unwrap();

        assert_eq!(updated.slug.as_str(), "pixel-9-pro");
        // Untouched fields survive
        assert_eq!(updated.price, product.price);
    }

    #[tokio::test]
    async fn test_update_missing_product() {
        let catalog = service();
        let err = catalog
            .update(&admin(), ProductId::new(404), ProductForm::default(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::NotFound));
    }

    #[tokio::test]
    async fn test_delete_then_get_by_slug() {
        let catalog = service();
        let product = catalog
            .create(&admin(), pixel_form(), Some(image()))
            .await
            .unwrap();

        assert!(catalog.get_by_slug("pixel-9").await.is_ok());
        catalog.delete(&admin(), product.id).await.unwrap();
        assert!(matches!(
            catalog.get_by_slug("pixel-9").await.unwrap_err(),
            CatalogError::NotFound
        ));
    }

    #[tokio::test]
    async fn test_search_matches_name_only_where_present() {
        let catalog = service();
        catalog
            .create(
                &admin(),
                ProductForm {
                    name: Some("Smartphone X".to_owned()),
                    ..pixel_form()
                },
                Some(image()),
            )
            .await
            .unwrap();
        catalog
            .create(
                &admin(),
                ProductForm {
                    name: Some("Charging Cable".to_owned()),
                    category: Some("accessories".to_owned()),
                    description: Some("Braided USB-C cable".to_owned()),
                    ..pixel_form()
                },
                Some(image()),
            )
            .await
            .unwrap();

        let hits = catalog.search("phone").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits.first().unwrap().name, "Smartphone X");

        assert!(catalog.search("nonexistent").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_by_category() {
        let catalog = service();
        catalog
            .create(&admin(), pixel_form(), Some(image()))
            .await
            .unwrap();

        let phones = catalog
            .list_by_category(Category::Smartphones)
            .await
            .unwrap();
        assert_eq!(phones.len(), 1);

        let tablets = catalog.list_by_category(Category::Tablets).await.unwrap();
        assert!(tablets.is_empty());
    }
}
