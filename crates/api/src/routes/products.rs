//! Product route handlers.
//!
//! Create and update accept multipart form data so the admin console can
//! attach the product image alongside the text fields.

use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
};
use serde_json::json;

use voltline_core::{Category, ProductId};

use crate::error::{AppError, FieldError, Result};
use crate::middleware::RequireAuth;
use crate::models::Product;
use crate::services::catalog::{ProductForm, UploadedImage};
use crate::state::AppState;

/// List all products.
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Product>>> {
    let products = state.catalog().list_all().await?;
    Ok(Json(products))
}

/// Fetch a single product by slug.
pub async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Product>> {
    let product = state.catalog().get_by_slug(&slug).await?;
    Ok(Json(product))
}

/// List products in one category.
pub async fn by_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> Result<Json<Vec<Product>>> {
    let category: Category = category.parse().map_err(|_| {
        AppError::Validation(vec![FieldError::new(
            "category",
            format!("unknown category: {category}"),
        )])
    })?;

    let products = state.catalog().list_by_category(category).await?;
    Ok(Json(products))
}

/// Create a product from a multipart form. Admin only.
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(ctx): RequireAuth,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Product>)> {
    let (form, image) = parse_product_form(multipart).await?;
    let product = state.catalog().create(&ctx, form, image).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// Update a product from a multipart form. Admin only.
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(ctx): RequireAuth,
    Path(id): Path<ProductId>,
    multipart: Multipart,
) -> Result<Json<Product>> {
    let (form, image) = parse_product_form(multipart).await?;
    let product = state.catalog().update(&ctx, id, form, image).await?;
    Ok(Json(product))
}

/// Delete a product. Admin only.
pub async fn delete(
    State(state): State<AppState>,
    RequireAuth(ctx): RequireAuth,
    Path(id): Path<ProductId>,
) -> Result<Json<serde_json::Value>> {
    state.catalog().delete(&ctx, id).await?;
    Ok(Json(json!({ "message": "product deleted" })))
}

/// Pull the known text fields and the image attachment out of a multipart
/// form, ignoring anything unrecognized.
async fn parse_product_form(
    mut multipart: Multipart,
) -> Result<(ProductForm, Option<UploadedImage>)> {
    let mut form = ProductForm::default();
    let mut image = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("malformed multipart body: {e}")))?
    {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };

        if name == "image" {
            let filename = field.file_name().unwrap_or("upload").to_owned();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(format!("failed to read upload: {e}")))?;
            if !bytes.is_empty() {
                image = Some(UploadedImage {
                    filename,
                    bytes: bytes.to_vec(),
                });
            }
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| AppError::BadRequest(format!("failed to read field {name}: {e}")))?;

        match name.as_str() {
            "name" => form.name = Some(value),
            "category" => form.category = Some(value),
            "price" => form.price = Some(value),
            "oldPrice" => form.old_price = Some(value),
            "stock" => form.stock = Some(value),
            "tag" => form.tag = Some(value),
            "description" => form.description = Some(value),
            _ => {}
        }
    }

    Ok((form, image))
}
