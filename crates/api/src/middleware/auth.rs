//! Authentication extractors.
//!
//! These extractors *identify* the caller from the `Authorization: Bearer`
//! header; they deliberately do not enforce roles. Authorization decisions
//! belong to the services, which take the extracted
//! [`AuthContext`](crate::services::auth::AuthContext) and perform their
//! own capability checks, so a misconfigured route cannot skip them.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use crate::error::AppError;
use crate::services::auth::{AuthContext, AuthError};
use crate::state::AppState;

/// Extractor that requires a valid bearer token.
///
/// # Example
///
/// ```rust,ignore
/// async fn my_orders(
///     State(state): State<AppState>,
///     RequireAuth(ctx): RequireAuth,
/// ) -> Result<Json<Vec<Order>>> {
///     Ok(Json(state.orders().list_for_user(&ctx).await?))
/// }
/// ```
pub struct RequireAuth(pub AuthContext);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(AppError::Auth(AuthError::MissingToken))?;
        let ctx = state.tokens().verify(token).map_err(AppError::Auth)?;
        Ok(Self(ctx))
    }
}

/// Extractor that optionally identifies the caller.
///
/// Used where guests are welcome (order creation): a missing header yields
/// `None`, but a *malformed or expired* token is still rejected rather
/// than silently treated as a guest.
pub struct OptionalAuth(pub Option<AuthContext>);

impl FromRequestParts<AppState> for OptionalAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match bearer_token(parts) {
            None => Ok(Self(None)),
            Some(token) => {
                let ctx = state.tokens().verify(token).map_err(AppError::Auth)?;
                Ok(Self(Some(ctx)))
            }
        }
    }
}

/// Pull the token out of `Authorization: Bearer <token>`.
fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}
