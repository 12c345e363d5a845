//! Clementine Core - Shared types library.
//!
//! This crate provides common types used across all Clementine Market
//! components:
//! - `api` - JSON REST API serving the catalog, accounts, and orders
//! - `cli` - Command-line tools for migrations, seeding, and the local cart
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no
//! database access, no HTTP clients. This keeps it lightweight and allows it
//! to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, emails, and domain enums
//! - [`money`] - Two-decimal currency rounding
//! - [`pricing`] - The order price breakdown shared by server and client
//! - [`cart`] - Client-local cart state, unique by product

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod money;
pub mod pricing;
pub mod types;

pub use cart::{Cart, CartItem};
pub use pricing::PriceBreakdown;
pub use types::*;
