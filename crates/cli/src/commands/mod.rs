//! CLI command implementations.

pub mod admin;
pub mod migrate;
pub mod seed;

use secrecy::SecretString;
use thiserror::Error;

/// Errors surfaced by CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// Missing or invalid environment.
    #[error("configuration error: {0}")]
    Config(String),

    /// Database error.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration error.
    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    /// Store error from the API crate.
    #[error("store error: {0}")]
    Store(#[from] voltline_api::store::StoreError),

    /// Auth error from the API crate.
    #[error("auth error: {0}")]
    Auth(#[from] voltline_api::services::auth::AuthError),

    /// Slug derivation failed for a seed product name.
    #[error("slug error: {0}")]
    Slug(#[from] voltline_core::SlugError),

    /// Email parse failed.
    #[error("email error: {0}")]
    Email(#[from] voltline_core::EmailError),
}

/// Resolve the database URL from the environment, loading `.env` first.
///
/// Checks `VOLTLINE_DATABASE_URL` then falls back to `DATABASE_URL`.
pub fn database_url() -> Result<SecretString, CliError> {
    let _ = dotenvy::dotenv();

    std::env::var("VOLTLINE_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| {
            CliError::Config("VOLTLINE_DATABASE_URL (or DATABASE_URL) must be set".to_owned())
        })
}
