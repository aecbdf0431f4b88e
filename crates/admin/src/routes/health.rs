//! Liveness and readiness endpoints.

use axum::{extract::State, http::StatusCode};
use tracing::warn;

use crate::state::AppState;

/// Liveness: the process is up.
pub async fn health() -> &'static str {
    "ok"
}

/// Readiness: the session database (when configured) and the backend answer.
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    if let Some(pool) = state.pool()
        && let Err(e) = sqlx::query("SELECT 1").fetch_one(pool).await
    {
        warn!(error = %e, "Readiness: database unreachable");
        return StatusCode::SERVICE_UNAVAILABLE;
    }

    if let Err(e) = state.backend().ping().await {
        warn!(error = %e, "Readiness: backend unreachable");
        return StatusCode::SERVICE_UNAVAILABLE;
    }
    StatusCode::OK
}
