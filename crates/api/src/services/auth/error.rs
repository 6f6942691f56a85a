//! Authentication error types.

use thiserror::Error;

use crate::error::FieldError;
use crate::store::StoreError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Malformed registration input (missing name, bad email, short password).
    #[error("validation failed")]
    Validation(Vec<FieldError>),

    /// Invalid credentials (wrong password or unknown user).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// User not found (role toggle target).
    #[error("user not found")]
    UserNotFound,

    /// User already exists.
    #[error("user already exists")]
    UserAlreadyExists,

    /// No bearer token on a request that requires one.
    #[error("no token provided")]
    MissingToken,

    /// Bearer token failed signature or structural checks.
    #[error("invalid token")]
    InvalidToken,

    /// Bearer token has expired.
    #[error("token expired")]
    TokenExpired,

    /// Caller's role does not permit the operation.
    #[error("admin access required")]
    Forbidden,

    /// Store error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}
