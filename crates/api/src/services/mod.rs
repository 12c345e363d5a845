//! Business services sitting between the routes and the repositories.
//!
//! - [`auth`] - Registration, login, and bearer-token issue/verify
//! - [`orders`] - The order engine: validation, stock effects, pricing
//! - [`recommend`] - The recommendation filter and its synthetic scoring

pub mod auth;
pub mod orders;
pub mod recommend;

pub use auth::AuthService;
pub use orders::OrderService;
pub use recommend::RecommendationService;
