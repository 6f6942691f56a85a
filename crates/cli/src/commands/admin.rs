//! `admin create` command: bootstrap an admin account.
//!
//! The API's admin-register endpoint requires an existing admin, so the
//! first one has to be written straight through the store.

use voltline_api::services::auth::hash_password;
use voltline_api::store::{PgStore, StoreError, UserStore, create_pool};
use voltline_core::{Email, Role};

use super::{CliError, database_url};

/// Create an admin user.
///
/// # Errors
///
/// Returns `CliError::Config` for a short password or taken email, and
/// `CliError` variants for database problems.
pub async fn create(name: &str, email: &str, password: &str) -> Result<(), CliError> {
    if password.len() < 6 {
        return Err(CliError::Config(
            "password must be at least 6 characters".to_owned(),
        ));
    }
    let email = Email::parse(email)?;

    let pool = create_pool(&database_url()?).await?;
    let store = PgStore::new(pool);

    let password_hash = hash_password(password)?;
    let user = store
        .insert_user(name, &email, &password_hash, Role::Admin)
        .await
        .map_err(|e| match e {
            StoreError::Conflict(_) => {
                CliError::Config(format!("an account for {email} already exists"))
            }
            other => other.into(),
        })?;

    tracing::info!(user_id = %user.id, email = %user.email, "admin account created");
    Ok(())
}
