//! Rate limiting middleware using governor and `tower_governor`.
//!
//! One limiter covers the whole `/api` surface: roughly 100 requests per
//! 15-minute window per client IP, allowed as an initial burst that
//! replenishes one request every 9 seconds.

use std::sync::Arc;
use std::time::Duration;

use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use tower_governor::key_extractor::SmartIpKeyExtractor;
use tower_governor::{GovernorLayer, governor::GovernorConfigBuilder};

/// Rate limiter layer type for Axum.
///
/// Uses `SmartIpKeyExtractor`, which prefers standard proxy headers and falls
/// back to the peer address (the server is started with connect info for
/// exactly this reason).
pub type RateLimiterLayer =
    GovernorLayer<SmartIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Create the rate limiter for the `/api` surface.
///
/// # Panics
///
/// This function will not panic. The configuration uses only valid positive
/// values (`period(9s)` and `burst_size(100)`), which are always accepted by
/// `GovernorConfigBuilder`.
#[must_use]
pub fn api_rate_limiter() -> RateLimiterLayer {
    let config = GovernorConfigBuilder::default()
        .key_extractor(SmartIpKeyExtractor)
        .period(Duration::from_secs(9)) // Replenish 1 token every 9 seconds (~100/15min)
        .burst_size(100)
        .finish()
        .expect("rate limiter config with period(9s) and burst_size(100) is valid");
    GovernorLayer::new(Arc::new(config))
}
