//! `migrate` command: apply the API crate's embedded migrations.

use voltline_api::store::{create_pool, postgres};

use super::{CliError, database_url};

/// Run all pending migrations.
///
/// # Errors
///
/// Returns `CliError` if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), CliError> {
    let pool = create_pool(&database_url()?).await?;

    tracing::info!("running migrations");
    postgres::migrator().run(&pool).await?;
    tracing::info!("migrations complete");

    Ok(())
}
