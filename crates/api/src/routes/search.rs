//! Search route handler.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;

use crate::error::Result;
use crate::models::Product;
use crate::state::AppState;

/// Search query parameters.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    /// Substring to match against product names and descriptions. An
    /// absent or empty query matches everything.
    #[serde(default)]
    pub q: String,
}

/// Case-insensitive substring search over the catalog.
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<Product>>> {
    let products = state.catalog().search(&query.q).await?;
    Ok(Json(products))
}
