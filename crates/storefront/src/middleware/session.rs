//! Session middleware configuration.
//!
//! Sessions are stored server-side (`PostgreSQL` in production, memory in
//! tests); the browser only holds a signed session id cookie.

use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha512};
use tower_sessions::cookie::{Key, SameSite};
use tower_sessions::service::SignedCookie;
use tower_sessions::{Expiry, SessionManagerLayer, SessionStore};

use crate::config::StorefrontConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "fw_session";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Derive the 64-byte cookie signing key from the configured secret.
#[must_use]
pub fn signing_key(secret: &SecretString) -> Key {
    let digest = Sha512::digest(secret.expose_secret().as_bytes());
    Key::from(digest.as_slice())
}

/// Create the session layer over `store`.
///
/// The sessions table for the `PostgreSQL` store is created by
/// `freshwater-cli migrate`.
#[must_use]
pub fn create_session_layer<Store: SessionStore>(
    store: Store,
    config: &StorefrontConfig,
) -> SessionManagerLayer<Store, SignedCookie> {
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_secure())
        .with_same_site(SameSite::Lax)
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
        assert_eq!(
            signing_key(&secret).master(),
            signing_key(&secret).master()
        );
        let other = SecretString::from("a different but equally random key!");
        assert_ne!(signing_key(&secret).master(), signing_key(&other).master());
    }
}
