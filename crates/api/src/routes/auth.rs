//! Auth route handlers.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;

use voltline_core::UserId;

use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::models::User;
use crate::services::auth::{AuthResponse, LoginRequest, RegisterRequest};
use crate::state::AppState;

/// Register a user account.
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>)> {
    let response = state.auth().register(req).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Login with email and password.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>> {
    let response = state.auth().login(req).await?;
    Ok(Json(response))
}

/// Register an admin account. Admin only.
pub async fn register_admin(
    State(state): State<AppState>,
    RequireAuth(ctx): RequireAuth,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>)> {
    let response = state.auth().register_admin(&ctx, req).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Role toggle input.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleRoleRequest {
    pub user_id: UserId,
    pub role: String,
}

/// Set a user's role. Admin only.
pub async fn toggle_role(
    State(state): State<AppState>,
    RequireAuth(ctx): RequireAuth,
    Json(req): Json<ToggleRoleRequest>,
) -> Result<Json<User>> {
    let user = state
        .auth()
        .toggle_role(&ctx, req.user_id, &req.role)
        .await?;
    Ok(Json(user))
}
