//! Application state shared across handlers.

use std::sync::Arc;

use freshwater_backend::BackendClient;
use sqlx::PgPool;

use crate::config::AdminConfig;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. The pool is optional so tests can run the
/// router over an in-memory session store.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    backend: BackendClient,
    pool: Option<PgPool>,
}

impl AppState {
    #[must_use]
    pub fn new(config: AdminConfig, backend: BackendClient, pool: Option<PgPool>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                backend,
                pool,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    /// The REST backend client shared by every operator.
    #[must_use]
    pub fn backend(&self) -> &BackendClient {
        &self.inner.backend
    }

    #[must_use]
    pub fn pool(&self) -> Option<&PgPool> {
        self.inner.pool.as_ref()
    }
}
