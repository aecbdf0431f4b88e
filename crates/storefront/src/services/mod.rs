//! Per-visitor stores kept in the session.
//!
//! - [`auth`] - signed-in user and backend tokens
//! - [`cart`] - cart lines and derived totals

pub mod auth;
pub mod cart;

pub use auth::{AuthError, AuthStore};
pub use cart::{CartError, CartStore};
