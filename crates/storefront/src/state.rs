//! Application state shared across handlers.

use std::sync::Arc;

use freshwater_backend::BackendClient;
use sqlx::PgPool;

use crate::config::StorefrontConfig;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. The pool is optional so the router can run
/// against an in-memory session store in tests.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    backend: BackendClient,
    pool: Option<PgPool>,
}

impl AppState {
    /// Create state without a database pool.
    #[must_use]
    pub fn new(config: StorefrontConfig, backend: BackendClient) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                backend,
                pool: None,
            }),
        }
    }

    /// Create state backed by a `PostgreSQL` pool (used for sessions).
    #[must_use]
    pub fn with_pool(config: StorefrontConfig, backend: BackendClient, pool: PgPool) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                backend,
                pool: Some(pool),
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// The REST backend client.
    #[must_use]
    pub fn backend(&self) -> &BackendClient {
        &self.inner.backend
    }

    #[must_use]
    pub fn pool(&self) -> Option<&PgPool> {
        self.inner.pool.as_ref()
    }
}
