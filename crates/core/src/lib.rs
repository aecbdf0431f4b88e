//! Freshwater Core - Shared types library.
//!
//! This crate provides common types used across all Freshwater components:
//! - `backend` - REST client for the catalogue/orders/CMS backend
//! - `storefront` - Customer-facing catalogue, cart and checkout
//! - `admin` - Back-office console for products, orders, users and articles
//! - `cli` - Command-line tools for migrations and seeding
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no database
//! access, no HTTP clients. This keeps it lightweight and allows it to be
//! used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, emails, and statuses
//! - [`cart`] - Cart line items with derived totals
//! - [`filters`] - Product listing filter state and its query-string form
//! - [`pagination`] - The `{results, count, next, previous}` list envelope
//! - [`slug`] - URL slugs for categories and articles

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod filters;
pub mod pagination;
pub mod slug;
pub mod types;

pub use cart::{Cart, CartItem, CartProduct, CheckoutLine};
pub use filters::{ActiveFilter, ProductFilter};
pub use pagination::Page;
pub use types::*;
