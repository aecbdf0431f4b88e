//! Rate limiting for the admin sign-in form using governor and
//! `tower_governor`.
//!
//! The admin console sits behind a single reverse proxy, so the stock
//! `SmartIpKeyExtractor` (`X-Forwarded-For`, `X-Real-IP`, `Forwarded`, then
//! the peer address) is enough to find the client.

use std::sync::Arc;

use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use tower_governor::{
    GovernorLayer, governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor,
};

/// Rate limiter layer type for Axum.
pub type RateLimiterLayer =
    GovernorLayer<SmartIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Create rate limiter for the login endpoint: ~5 requests per minute per IP.
///
/// Configuration: 1 request every 12 seconds (replenish), burst of 3.
///
/// # Panics
///
/// This function will not panic. The configuration uses only valid positive
/// integers (`per_second(12)` and `burst_size(3)`), which are always accepted
/// by `GovernorConfigBuilder`.
#[must_use]
pub fn login_rate_limiter() -> RateLimiterLayer {
    let config = GovernorConfigBuilder::default()
        .key_extractor(SmartIpKeyExtractor)
        .per_second(12) // Replenish 1 token every 12 seconds (~5/minute)
        .burst_size(3)
        .finish()
        .expect("rate limiter config with per_second(12) and burst_size(3) is valid");
    GovernorLayer::new(Arc::new(config))
}
