//! Session middleware configuration for admin.
//!
//! Sessions live in the `admin.session` table, apart from storefront
//! sessions, with stricter cookie settings (SameSite=Strict, 8 hour
//! inactivity expiry).

use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha512};
use sqlx::PgPool;
use tower_sessions::cookie::{Key, SameSite};
use tower_sessions::service::SignedCookie;
use tower_sessions::{Expiry, SessionManagerLayer, SessionStore};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::AdminConfig;

/// Session cookie name for admin.
pub const SESSION_COOKIE_NAME: &str = "fw_admin_session";

/// Schema holding the admin session table.
pub const SESSION_SCHEMA: &str = "admin";

/// Admin session table name.
pub const SESSION_TABLE: &str = "session";

/// Session expiry time in seconds (8 hours - stricter than storefront).
const SESSION_EXPIRY_SECONDS: i64 = 8 * 60 * 60;

/// Derive the 64-byte cookie signing key from the configured secret.
#[must_use]
pub fn signing_key(secret: &SecretString) -> Key {
    let digest = Sha512::digest(secret.expose_secret().as_bytes());
    Key::from(digest.as_slice())
}

/// `PostgreSQL` store over `admin.session`.
///
/// The table is created by `freshwater-cli migrate admin`.
///
/// # Errors
///
/// Returns an error if the schema or table name is rejected.
pub fn admin_session_store(pool: PgPool) -> Result<PostgresStore, String> {
    PostgresStore::new(pool)
        .with_schema_name(SESSION_SCHEMA)
        .and_then(|store| store.with_table_name(SESSION_TABLE))
}

/// Create the session layer over `store`.
#[must_use]
pub fn create_session_layer<Store: SessionStore>(
    store: Store,
    config: &AdminConfig,
) -> SessionManagerLayer<Store, SignedCookie> {
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_secure())
        // SameSite=Strict for admin (stricter than storefront's Lax)
        .with_same_site(SameSite::Strict)
        .with_http_only(true)
        .with_path("/")
        .with_signed(signing_key(&config.session_secret))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signing_key_is_deterministic() {
        let secret = SecretString::from("kX9$mQ2!vL7@pR4#tW8%zN3^bF6&hJ1*");
        assert_eq!(signing_key(&secret).master(), signing_key(&secret).master());
    }
}
