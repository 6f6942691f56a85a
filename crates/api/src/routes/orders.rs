//! Order route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;

use voltline_core::OrderId;

use crate::error::Result;
use crate::middleware::{OptionalAuth, RequireAuth};
use crate::models::Order;
use crate::services::orders::OrderRequest;
use crate::state::AppState;

/// Create an order. Guests welcome; a bearer token stamps the owner.
pub async fn create(
    State(state): State<AppState>,
    OptionalAuth(ctx): OptionalAuth,
    Json(req): Json<OrderRequest>,
) -> Result<(StatusCode, Json<Order>)> {
    let order = state.orders().create(ctx.as_ref(), req).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// List the calling user's orders.
pub async fn list_own(
    State(state): State<AppState>,
    RequireAuth(ctx): RequireAuth,
) -> Result<Json<Vec<Order>>> {
    let orders = state.orders().list_for_user(&ctx).await?;
    Ok(Json(orders))
}

/// List every order. Admin only.
pub async fn list_all(
    State(state): State<AppState>,
    RequireAuth(ctx): RequireAuth,
) -> Result<Json<Vec<Order>>> {
    let orders = state.orders().list_all(&ctx).await?;
    Ok(Json(orders))
}

/// Status update input.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

/// Overwrite an order's status. Admin only.
pub async fn update_status(
    State(state): State<AppState>,
    RequireAuth(ctx): RequireAuth,
    Path(id): Path<OrderId>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<Order>> {
    let order = state.orders().update_status(&ctx, id, &req.status).await?;
    Ok(Json(order))
}
