//! HTTP plumbing shared by every endpoint module.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderValue, RETRY_AFTER};
use reqwest::{Method, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use freshwater_core::Page;

use crate::BackendError;
use crate::cache::{CacheKey, CacheValue};

/// Default backend base URL.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000/api";

/// How long anonymous catalogue responses are cached.
pub const CACHE_TTL: Duration = Duration::from_secs(300);

/// Connection settings for [`BackendClient`].
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Base URL including the `/api` prefix, without a trailing slash.
    pub base_url: String,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(10),
            user_agent: format!("freshwater/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Client for the backend REST API.
///
/// Cheap to clone. Every call takes the caller's access token, if any, so a
/// single client serves every visitor.
#[derive(Clone)]
pub struct BackendClient {
    pub(crate) inner: Arc<BackendClientInner>,
}

pub(crate) struct BackendClientInner {
    client: reqwest::Client,
    base_url: String,
    pub(crate) cache: Cache<CacheKey, CacheValue>,
}

impl BackendClient {
    /// Create a client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built (TLS backend
    /// initialisation failure).
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .build()?;

        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(CACHE_TTL)
            .build();

        Ok(Self {
            inner: Arc::new(BackendClientInner {
                client,
                base_url: config.base_url.trim_end_matches('/').to_string(),
                cache,
            }),
        })
    }

    /// The configured base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.inner.base_url, path.trim_start_matches('/'))
    }

    /// Start a request with the standard headers.
    ///
    /// `Authorization: Bearer` is attached only when a token is given.
    pub(crate) fn request(
        &self,
        method: Method,
        path: &str,
        token: Option<&SecretString>,
    ) -> RequestBuilder {
        let mut builder = self
            .inner
            .client
            .request(method, self.url(path))
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .header(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(token) = token {
            builder = builder.bearer_auth(token.expose_secret());
        }
        builder
    }

    /// Send a request and decode the body.
    ///
    /// Empty bodies (204) decode as JSON `null`, so `T = ()` works for
    /// delete and logout calls.
    pub(crate) async fn execute<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, BackendError> {
        let response = request.send().await?;
        let status = response.status();

        let retry_after = (status == StatusCode::TOO_MANY_REQUESTS)
            .then(|| {
                response
                    .headers()
                    .get(RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|s| s.trim().parse::<u64>().ok())
            })
            .flatten();

        // Read the body as text first for better error diagnostics
        let body = response.text().await?;

        if !status.is_success() {
            if status.is_server_error() {
                error!(
                    status = %status,
                    body = %body.chars().take(500).collect::<String>(),
                    "Backend returned server error"
                );
            } else {
                debug!(
                    status = %status,
                    body = %body.chars().take(500).collect::<String>(),
                    "Backend returned non-success status"
                );
            }
            return Err(BackendError::from_response(status, &body, retry_after));
        }

        let text = if body.trim().is_empty() { "null" } else { body.as_str() };
        serde_json::from_str(text).map_err(|e| {
            error!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse backend response"
            );
            BackendError::Parse(e)
        })
    }

    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        token: Option<&SecretString>,
    ) -> Result<T, BackendError> {
        self.execute(self.request(Method::GET, path, token)).await
    }

    pub(crate) async fn get_with_query<T, Q>(
        &self,
        path: &str,
        token: Option<&SecretString>,
        query: &Q,
    ) -> Result<T, BackendError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        self.execute(self.request(Method::GET, path, token).query(query))
            .await
    }

    pub(crate) async fn send_json<T, B>(
        &self,
        method: Method,
        path: &str,
        token: Option<&SecretString>,
        body: &B,
    ) -> Result<T, BackendError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.execute(self.request(method, path, token).json(body))
            .await
    }

    pub(crate) async fn delete(
        &self,
        path: &str,
        token: Option<&SecretString>,
    ) -> Result<(), BackendError> {
        self.execute(self.request(Method::DELETE, path, token)).await
    }

    /// Fetch a list endpoint that may or may not be paginated.
    pub(crate) async fn get_list<T, Q>(
        &self,
        path: &str,
        token: Option<&SecretString>,
        query: &Q,
    ) -> Result<Page<T>, BackendError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let body: ListBody<T> = self.get_with_query(path, token, query).await?;
        Ok(body.into_page())
    }

    /// Check that the backend answers, bypassing the cache.
    ///
    /// # Errors
    ///
    /// Returns the classified error when the backend is unreachable or
    /// unhealthy.
    pub async fn ping(&self) -> Result<(), BackendError> {
        let _: serde_json::Value = self
            .get_with_query("categories/", None, &[("page_size", "1")])
            .await?;
        Ok(())
    }

    /// Drop every cached catalogue response.
    pub async fn invalidate_cache(&self) {
        self.inner.cache.invalidate_all();
        self.inner.cache.run_pending_tasks().await;
    }
}

/// List endpoints answer with a page envelope or, when pagination is
/// disabled server-side, a bare array.
#[derive(Deserialize)]
#[serde(untagged)]
enum ListBody<T> {
    Paged(Page<T>),
    Bare(Vec<T>),
}

impl<T> ListBody<T> {
    fn into_page(self) -> Page<T> {
        match self {
            Self::Paged(page) => page,
            Self::Bare(results) => Page {
                count: u64::try_from(results.len()).unwrap_or(u64::MAX),
                results,
                next: None,
                previous: None,
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use reqwest::header::AUTHORIZATION;

    use super::*;

    #[test]
    fn test_url_joining() {
        let client = BackendClient::new(&BackendConfig {
            base_url: "http://backend.test/api/".to_string(),
            ..BackendConfig::default()
        })
        .unwrap();
        assert_eq!(client.base_url(), "http://backend.test/api");
        assert_eq!(client.url("/products/"), "http://backend.test/api/products/");
        assert_eq!(client.url("auth/me/"), "http://backend.test/api/auth/me/");
    }

    #[test]
    fn test_request_headers() {
        let client = BackendClient::new(&BackendConfig::default()).unwrap();
        let token = SecretString::from("abc123");

        let with_token = client
            .request(Method::GET, "auth/me/", Some(&token))
            .build()
            .unwrap();
        assert_eq!(
            with_token.headers().get(AUTHORIZATION).unwrap(),
            "Bearer abc123"
        );
        assert_eq!(
            with_token.headers().get(CONTENT_TYPE).unwrap(),
            "application/json"
        );

        let anonymous = client.request(Method::GET, "products/", None).build().unwrap();
        assert!(anonymous.headers().get(AUTHORIZATION).is_none());
        assert_eq!(
            anonymous.headers().get(CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }

    #[test]
    fn test_list_body_accepts_bare_array() {
        let bare: ListBody<u32> = serde_json::from_str("[1, 2]").unwrap();
        let page = bare.into_page();
        assert_eq!(page.count, 2);
        assert!(!page.has_next());

        let paged: ListBody<u32> =
            serde_json::from_str(r#"{"count": 9, "next": "http://x/?page=2", "previous": null, "results": [1]}"#)
                .unwrap();
        assert_eq!(paged.into_page().next_page(), Some(2));
    }
}
