//! Liveness and readiness endpoints.

use axum::{extract::State, http::StatusCode};
use tracing::warn;

use crate::state::AppState;

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
pub async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Checks the session database (when configured) and the backend API.
/// Returns 503 Service Unavailable if either is unreachable.
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    if let Some(pool) = state.pool()
        && let Err(e) = sqlx::query("SELECT 1").fetch_one(pool).await
    {
        warn!(error = %e, "Readiness: database unreachable");
        return StatusCode::SERVICE_UNAVAILABLE;
    }

    match state.backend().ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            warn!(error = %e, "Readiness: backend unreachable");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
