//! Client error types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::storage::StorageError;

/// A field-level problem, either found client-side before submission or
/// returned by the API in an error body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldError {
    /// The offending input field.
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

/// Errors surfaced by the client library.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Client-side validation blocked submission.
    #[error("validation failed")]
    Validation(Vec<FieldError>),

    /// The API answered with an error status.
    #[error("api error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Message from the error body.
        message: String,
        /// Field-level detail, when the API provided any.
        errors: Vec<FieldError>,
    },

    /// Transport-level failure.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Local storage failure.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// A persisted snapshot failed to decode.
    #[error("corrupt local state: {0}")]
    CorruptState(#[from] serde_json::Error),
}
