//! Freshwater Aquatics storefront library.
//!
//! The customer-facing site as a library: the binary wires it to
//! `PostgreSQL` sessions and Sentry, tests wire it to an in-memory store.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod content;
pub mod db;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

use axum::{Router, extract::Request, middleware::from_fn};
use tower_http::{services::ServeDir, trace::TraceLayer};
use tower_sessions::SessionStore;

use crate::error::AppError;
use crate::state::AppState;

/// Directory served under `/static`.
pub const STATIC_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/static");

async fn not_found() -> AppError {
    AppError::NotFound("page".to_string())
}

/// Build the storefront application over a session store.
///
/// Layers, outermost first: session, request tracing, request ID, security
/// headers, stale-auth cleanup.
pub fn app<Store>(state: AppState, store: Store) -> Router
where
    Store: SessionStore + Clone,
{
    let session_layer = middleware::create_session_layer(store, state.config());

    routes::routes()
        .nest_service("/static", ServeDir::new(STATIC_DIR))
        .fallback(not_found)
        .layer(from_fn(middleware::clear_stale_auth))
        .layer(from_fn(middleware::security_headers_middleware))
        .layer(from_fn(middleware::request_id_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request| {
            tracing::info_span!(
                "request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = tracing::field::Empty,
            )
        }))
        .layer(session_layer)
        .with_state(state)
}
