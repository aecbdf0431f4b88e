//! Session table migrations.
//!
//! # Usage
//!
//! ```bash
//! fw-cli migrate storefront   # tower_sessions.session
//! fw-cli migrate admin        # admin.session
//! fw-cli migrate all
//! ```
//!
//! # Environment Variables
//!
//! - `STOREFRONT_DATABASE_URL` - storefront sessions (falls back to `DATABASE_URL`)
//! - `ADMIN_DATABASE_URL` - admin sessions (falls back to `DATABASE_URL`)
//!
//! Both migrations are idempotent.

use freshwater_admin::middleware::admin_session_store;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tower_sessions_sqlx_store::PostgresStore;

use super::CommandError;

fn database_url(key: &'static str) -> Result<String, CommandError> {
    std::env::var(key)
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map_err(|_| CommandError::MissingEnvVar(key))
}

async fn connect(key: &'static str) -> Result<PgPool, CommandError> {
    let url = database_url(key)?;
    Ok(PgPoolOptions::new().max_connections(1).connect(&url).await?)
}

/// Create the storefront session table.
///
/// # Errors
///
/// Returns an error if the database is unreachable or the migration fails.
pub async fn storefront() -> Result<(), CommandError> {
    tracing::info!("Connecting to storefront database...");
    let pool = connect("STOREFRONT_DATABASE_URL").await?;

    tracing::info!("Creating storefront session table...");
    PostgresStore::new(pool).migrate().await?;

    tracing::info!("Storefront migrations complete");
    Ok(())
}

/// Create the admin session schema and table.
///
/// # Errors
///
/// Returns an error if the database is unreachable or the migration fails.
pub async fn admin() -> Result<(), CommandError> {
    tracing::info!("Connecting to admin database...");
    let pool = connect("ADMIN_DATABASE_URL").await?;

    tracing::info!("Creating admin session table...");
    admin_session_store(pool)
        .map_err(CommandError::SessionStore)?
        .migrate()
        .await?;

    tracing::info!("Admin migrations complete");
    Ok(())
}
