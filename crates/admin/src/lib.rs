//! Freshwater Aquatics admin console library.
//!
//! This crate provides the back-office console as a library, allowing it to
//! be tested over an in-memory session store.
//!
//! # Security
//!
//! Every page except sign-in and the health checks requires an operator
//! whose backend role is `admin`. The console holds no credentials of its
//! own; each request acts with the signed-in operator's backend token.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;

use std::time::Duration;

use axum::{
    Router,
    extract::Request,
    http::Response,
    middleware::from_fn,
};
use tower_http::{
    services::ServeDir,
    trace::{DefaultOnResponse, OnResponse, TraceLayer},
};
use tower_sessions::SessionStore;
use tracing::Span;

use crate::error::AppError;
use crate::state::AppState;

/// Directory served under `/static`.
pub const STATIC_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/static");

async fn not_found() -> AppError {
    AppError::NotFound("page".to_string())
}

/// Build the admin application over a session store.
///
/// Layers, outermost first: session, request tracing, request ID, security
/// headers, stale-admin cleanup.
pub fn app<Store>(state: AppState, store: Store) -> Router
where
    Store: SessionStore + Clone,
{
    let session_layer = middleware::create_session_layer(store, state.config());

    routes::routes()
        .nest_service("/static", ServeDir::new(STATIC_DIR))
        .fallback(not_found)
        .layer(from_fn(middleware::clear_stale_admin))
        .layer(from_fn(middleware::security_headers_middleware))
        .layer(from_fn(middleware::request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(|response: &Response<_>, latency: Duration, span: &Span| {
                    span.record("status", response.status().as_u16());
                    span.record(
                        "latency_ms",
                        u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                    );
                    DefaultOnResponse::default().on_response(response, latency, span);
                }),
        )
        .layer(session_layer)
        .with_state(state)
}
