//! Backend reachability check.

use freshwater_backend::BackendClient;

use super::CommandError;

/// Ping the backend once.
///
/// # Errors
///
/// Returns the backend error when the API does not answer.
pub async fn check(backend: &BackendClient) -> Result<(), CommandError> {
    tracing::info!(base_url = %backend.base_url(), "Checking backend...");
    backend.ping().await?;
    tracing::info!("Backend is reachable");
    Ok(())
}
