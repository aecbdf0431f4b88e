//! HTTP middleware stack for admin.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, transaction tracing)
//! 2. Session layer (signed cookie, `admin.session` table)
//! 3. `TraceLayer` (request span with status and latency)
//! 4. Request ID
//! 5. Security headers (stricter CSP, no caching)
//! 6. Stale admin cleanup (drop rejected tokens)
//! 7. Rate limiting on the login form (governor)

pub mod auth;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use auth::{OptionalAdmin, RequireAdmin, clear_stale_admin};
pub use rate_limit::login_rate_limiter;
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::{admin_session_store, create_session_layer};
