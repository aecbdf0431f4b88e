//! Database connection for admin.
//!
//! Products, orders, users and articles are managed through the backend
//! admin API. `PostgreSQL` only holds the `admin.session` table, created by:
//! ```bash
//! cargo run -p freshwater-cli -- migrate admin
//! ```

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

/// Create a small `PostgreSQL` pool; the admin console has few operators.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(3)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url.expose_secret())
        .await
}
