//! Freshwater Aquatics backend client.
//!
//! Typed access to the REST backend that owns products, categories, orders,
//! addresses, users and articles. Both the storefront and the admin console
//! talk to the backend only through this crate.
//!
//! # Authentication
//!
//! The client holds no credentials. Endpoints that need a signed-in user take
//! the caller's access token as `&SecretString`, so one client can be shared
//! by every request handler.
//!
//! # Caching
//!
//! Anonymous catalogue reads (categories, article categories and single
//! products) are cached in-memory for [`client::CACHE_TTL`]. Nothing fetched
//! with a token is cached.

#![cfg_attr(not(test), forbid(unsafe_code))]

mod account;
mod admin;
mod articles;
mod cache;
mod catalog;
pub mod client;
pub mod error;
pub mod types;

pub use client::{BackendClient, BackendConfig, DEFAULT_BASE_URL};
pub use error::BackendError;
pub use types::*;
