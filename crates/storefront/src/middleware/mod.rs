//! HTTP middleware stack for the storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, transaction tracing)
//! 2. Session layer (signed cookie, `PostgreSQL` store)
//! 3. `TraceLayer` (request tracing)
//! 4. Request ID (add unique ID to each request)
//! 5. Security headers (CSP, frame denial, etc.)
//! 6. Stale auth cleanup (drop rejected tokens, keep the cart)
//! 7. Rate limiting on auth and cart routes (governor)

pub mod auth;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use auth::{OptionalAuth, RequireAuth, clear_stale_auth, login_url, safe_next};
pub use rate_limit::{auth_rate_limiter, cart_rate_limiter};
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::create_session_layer;
