//! HTTP middleware stack for the API.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. `TraceLayer` (request tracing)
//! 2. CORS (restricted to the configured frontend origin)
//! 3. Security headers
//! 4. Rate limiting (governor)
//!
//! Authentication is handled by extractors ([`CurrentUser`],
//! [`RequireAdmin`]) rather than a layer, so each handler states what it
//! requires and the token is decoded exactly once per request.

pub mod auth;
pub mod rate_limit;
pub mod security_headers;

pub use auth::{CurrentUser, RequireAdmin};
pub use rate_limit::api_rate_limiter;
pub use security_headers::security_headers_middleware;
