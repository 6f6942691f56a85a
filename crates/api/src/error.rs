//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server-side errors to
//! Sentry before responding to the client. All route handlers return
//! `Result<T, AppError>`; service errors convert via `From`.
//!
//! The JSON body shape is `{"message": ..., "errors": [{field, message}]?}`
//! so form-level failures carry field detail the client can render inline.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::media::MediaError;
use crate::services::auth::AuthError;
use crate::services::catalog::CatalogError;
use crate::services::orders::OrderError;
use crate::store::StoreError;

/// A field-level validation failure.
#[derive(Debug, Clone, Serialize)]
pub struct FieldError {
    /// The offending input field, in wire casing (e.g. `totalPrice`).
    pub field: String,
    /// Human-readable description.
    pub message: String,
}

impl FieldError {
    /// Create a field error.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Malformed or missing input, client-correctable.
    #[error("validation failed")]
    Validation(Vec<FieldError>),

    /// Referenced entity absent.
    #[error("not found: {0}")]
    NotFound(String),

    /// Missing/invalid/expired credential or insufficient role.
    #[error("auth error: {0}")]
    Auth(#[from] AuthError),

    /// Required image absent on product create.
    #[error("image is required")]
    MediaMissing,

    /// Attached image rejected by the media collaborator.
    #[error("media error: {0}")]
    Media(#[from] MediaError),

    /// Malformed request at the transport level (bad multipart, etc).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Unique-index violation from the store.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Store operation failed.
    #[error("store error: {0}")]
    Store(StoreError),

    /// Unclassified server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound => Self::NotFound("entity".to_owned()),
            StoreError::Conflict(what) => Self::Conflict(what),
            other => Self::Store(other),
        }
    }
}

impl From<CatalogError> for AppError {
    fn from(e: CatalogError) -> Self {
        match e {
            CatalogError::Validation(errors) => Self::Validation(errors),
            CatalogError::MediaMissing => Self::MediaMissing,
            CatalogError::Media(e) => Self::Media(e),
            CatalogError::NotFound => Self::NotFound("product".to_owned()),
            CatalogError::Auth(e) => Self::Auth(e),
            CatalogError::Store(e) => e.into(),
        }
    }
}

impl From<OrderError> for AppError {
    fn from(e: OrderError) -> Self {
        match e {
            OrderError::Validation(errors) => Self::Validation(errors),
            OrderError::NotFound => Self::NotFound("order".to_owned()),
            OrderError::Auth(e) => Self::Auth(e),
            OrderError::Store(e) => e.into(),
        }
    }
}

/// JSON error body.
#[derive(Serialize)]
struct ErrorBody {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<Vec<FieldError>>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if matches!(self, Self::Store(_) | Self::Internal(_))
            || matches!(
                self,
                Self::Auth(AuthError::Store(_) | AuthError::PasswordHash)
            )
        {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &self {
            Self::Validation(_) | Self::MediaMissing | Self::Media(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Auth(err) => match err {
                AuthError::Validation(_) => StatusCode::BAD_REQUEST,
                AuthError::InvalidCredentials
                | AuthError::MissingToken
                | AuthError::InvalidToken
                | AuthError::TokenExpired => StatusCode::UNAUTHORIZED,
                AuthError::Forbidden => StatusCode::FORBIDDEN,
                AuthError::UserAlreadyExists => StatusCode::CONFLICT,
                AuthError::UserNotFound => StatusCode::NOT_FOUND,
                AuthError::Store(_) | AuthError::PasswordHash => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Store(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Don't expose internal error details to clients
        let (message, errors) = match self {
            Self::Validation(errors) => ("validation failed".to_owned(), Some(errors)),
            Self::Auth(AuthError::Validation(errors)) => {
                ("validation failed".to_owned(), Some(errors))
            }
            Self::Store(_) | Self::Internal(_) => ("Internal server error".to_owned(), None),
            Self::Auth(AuthError::Store(_) | AuthError::PasswordHash) => {
                ("Internal server error".to_owned(), None)
            }
            other => (other.to_string(), None),
        };

        (status, Json(ErrorBody { message, errors })).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
