//! Integration tests for Freshwater Aquatics.
//!
//! The storefront and admin routers run in-process over an in-memory
//! session store. Both talk to [`FakeBackend`], a small Axum server on a
//! random local port that answers the REST endpoints they use with fixed
//! fixtures and records every request it sees.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p freshwater-integration-tests
//! ```
//!
//! No database or real backend is needed.

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::missing_panics_doc, clippy::unwrap_used)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Json, Router,
    body::Body,
    extract::{Path, Request, State},
    http::{HeaderMap, Method, StatusCode, header},
    middleware::{Next, from_fn_with_state},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use freshwater_backend::{BackendClient, BackendConfig};
use serde_json::{Value, json};
use tokio::task::JoinHandle;
use tower::ServiceExt;
use tower_sessions::MemoryStore;

/// Password the fake backend accepts for every account.
pub const PASSWORD: &str = "correct-horse-battery";

/// Accounts whose email starts with this prefix sign in as admins.
pub const ADMIN_EMAIL: &str = "admin@aquatics.test";

/// A regular customer account.
pub const CUSTOMER_EMAIL: &str = "guppy@aquatics.test";

/// The one product in the fake catalogue.
pub const NEON_TETRA_ID: &str = "6f1c2a9e-3b4d-4c5e-8f70-1a2b3c4d5e6f";

const CATEGORY_ID: &str = "0b7e4c1d-2a3f-4e5d-9c8b-7a6f5e4d3c2b";
const ADMIN_ID: &str = "9d8c7b6a-5f4e-4d3c-8b2a-1f0e9d8c7b6a";
const CUSTOMER_ID: &str = "1a2b3c4d-5e6f-4a7b-8c9d-0e1f2a3b4c5d";

const SESSION_SECRET: &str = "q7Lm2Vx9Rt4Kw8Zp3Nc6Hb1Jf5Gd0Sy";

/// A request as the fake backend received it.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub authorization: Option<String>,
}

#[derive(Default)]
struct FakeState {
    requests: Mutex<Vec<RecordedRequest>>,
    expire_tokens: AtomicBool,
}

/// In-process stand-in for the backend REST API.
pub struct FakeBackend {
    base_url: String,
    state: Arc<FakeState>,
    handle: JoinHandle<()>,
}

impl FakeBackend {
    /// Bind to a random local port and start serving.
    pub async fn start() -> Self {
        let state = Arc::new(FakeState::default());
        let router = fake_routes()
            .layer(from_fn_with_state(state.clone(), record))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}/api"),
            state,
            handle,
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn backend_config(&self) -> BackendConfig {
        BackendConfig {
            base_url: self.base_url.clone(),
            timeout: Duration::from_secs(5),
            user_agent: "freshwater-integration-tests".to_string(),
        }
    }

    #[must_use]
    pub fn client(&self) -> BackendClient {
        BackendClient::new(&self.backend_config()).unwrap()
    }

    /// Everything received so far, oldest first.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    /// Requests whose path ends with `suffix`.
    #[must_use]
    pub fn requests_to(&self, suffix: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.path.ends_with(suffix))
            .collect()
    }

    /// From now on every authenticated endpoint answers 401 `TOKEN_EXPIRED`.
    pub fn expire_tokens(&self) {
        self.state.expire_tokens.store(true, Ordering::SeqCst);
    }

    /// Storefront router over a fresh in-memory session store.
    #[must_use]
    pub fn storefront(&self) -> Router {
        use freshwater_storefront::config::{LogFormat, StorefrontConfig};
        use freshwater_storefront::state::AppState;

        let config = StorefrontConfig {
            database_url: "postgres://unused@localhost/storefront".into(),
            host: [127, 0, 0, 1].into(),
            port: 0,
            base_url: "http://localhost:3000".to_string(),
            session_secret: SESSION_SECRET.into(),
            backend: self.backend_config(),
            log_format: LogFormat::Text,
            sentry_dsn: None,
            sentry_environment: None,
        };
        let state = AppState::new(config, self.client());
        freshwater_storefront::app(state, MemoryStore::default())
    }

    /// Admin router over a fresh in-memory session store.
    #[must_use]
    pub fn admin(&self) -> Router {
        use freshwater_admin::config::{AdminConfig, LogFormat};
        use freshwater_admin::state::AppState;

        let config = AdminConfig {
            database_url: "postgres://unused@localhost/admin".into(),
            host: [127, 0, 0, 1].into(),
            port: 0,
            base_url: "http://localhost:3001".to_string(),
            session_secret: SESSION_SECRET.into(),
            backend: self.backend_config(),
            log_format: LogFormat::Text,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        };
        let state = AppState::new(config, self.client(), None);
        freshwater_admin::app(state, MemoryStore::default())
    }
}

impl Drop for FakeBackend {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

// =============================================================================
// Driving the in-process apps
// =============================================================================

/// A buffered response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    /// `Location` header, if any.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.headers
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
    }

    /// The session cookie as a `name=value` pair, if one was set.
    #[must_use]
    pub fn session_cookie(&self) -> Option<String> {
        self.headers
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .map(str::to_string)
    }
}

/// Client IP attached to every request so the rate limiters have a key.
const CLIENT_IP: &str = "203.0.113.10";

/// Build a GET request, optionally carrying a session cookie.
#[must_use]
pub fn get_request(uri: &str, cookie: Option<&str>) -> Request {
    let mut builder = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .header("x-forwarded-for", CLIENT_IP);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

/// Build a form POST, optionally carrying a session cookie.
#[must_use]
pub fn form_request(uri: &str, form: &str, cookie: Option<&str>) -> Request {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .header("x-forwarded-for", CLIENT_IP);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(form.to_string())).unwrap()
}

/// Run one request through `app` and buffer the response.
pub async fn send(app: &Router, request: Request) -> TestResponse {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    TestResponse {
        status,
        headers,
        body: String::from_utf8_lossy(&bytes).into_owned(),
    }
}

// =============================================================================
// Fake backend routes
// =============================================================================

async fn record(State(state): State<Arc<FakeState>>, request: Request, next: Next) -> Response {
    let recorded = RecordedRequest {
        method: request.method().clone(),
        path: request.uri().path().to_string(),
        authorization: request
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    };
    state.requests.lock().unwrap().push(recorded);
    next.run(request).await
}

fn fake_routes() -> Router<Arc<FakeState>> {
    Router::new()
        .route("/api/auth/login/", post(login))
        .route("/api/auth/register/", post(register))
        .route("/api/auth/logout/", post(logout))
        .route("/api/auth/me/", get(me))
        .route("/api/products/", get(products))
        .route("/api/products/{id}/", get(product))
        .route("/api/categories/", get(categories))
        .route("/api/articles/", get(empty_page))
        .route("/api/orders/", get(orders))
        .route("/api/addresses/", get(empty_page))
        .route("/api/admin/products/", get(admin_products))
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Caller {
    Admin,
    Customer,
}

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

/// Resolve the caller from the bearer token, or the 401 to answer with.
fn authenticate(state: &FakeState, headers: &HeaderMap) -> Result<Caller, Response> {
    if state.expire_tokens.load(Ordering::SeqCst) {
        return Err(unauthorized("Given token not valid for any token type", "TOKEN_EXPIRED"));
    }
    match bearer(headers) {
        Some("access-admin") => Ok(Caller::Admin),
        Some("access-user") => Ok(Caller::Customer),
        _ => Err(unauthorized("Authentication credentials were not provided.", "NOT_AUTHENTICATED")),
    }
}

fn unauthorized(detail: &str, code: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "detail": detail, "code": code })),
    )
        .into_response()
}

fn user_json(caller: Caller) -> Value {
    match caller {
        Caller::Admin => json!({
            "id": ADMIN_ID,
            "username": "rita",
            "email": ADMIN_EMAIL,
            "first_name": "Rita",
            "last_name": "Loach",
            "phone": null,
            "role": "admin",
            "is_active": true,
        }),
        Caller::Customer => json!({
            "id": CUSTOMER_ID,
            "username": "guppy",
            "email": CUSTOMER_EMAIL,
            "first_name": "Gil",
            "last_name": "Guppy",
            "phone": "",
            "role": "user",
            "is_active": true,
        }),
    }
}

fn neon_tetra() -> Value {
    json!({
        "id": NEON_TETRA_ID,
        "species_name": "Neon Tetra",
        "scientific_name": "Paracheirodon innesi",
        "description": "A bright blue and red schooling fish.",
        "price": "2.99",
        "stock_quantity": 40,
        "is_available": true,
        "difficulty_level": "beginner",
        "min_tank_size_gallons": 10,
        "ph_range_min": "6.0",
        "ph_range_max": "7.0",
        "temperature_range_min": 70,
        "temperature_range_max": 81,
        "diet_type": "omnivore",
        "care_instructions": "Keep in groups of six or more.",
        "image_url": "",
        "categories": [tetras()],
    })
}

fn tetras() -> Value {
    json!({
        "id": CATEGORY_ID,
        "name": "Tetras",
        "slug": "tetras",
        "description": "Small schooling fish.",
        "display_order": 1,
        "is_active": true,
    })
}

fn page(results: Vec<Value>) -> Value {
    json!({
        "count": results.len(),
        "next": null,
        "previous": null,
        "results": results,
    })
}

async fn login(Json(body): Json<Value>) -> Response {
    let email = body.get("email").and_then(Value::as_str).unwrap_or_default();
    let password = body.get("password").and_then(Value::as_str).unwrap_or_default();
    if password != PASSWORD {
        return unauthorized(
            "No active account found with the given credentials",
            "INVALID_CREDENTIALS",
        );
    }

    let (caller, role) = if email == ADMIN_EMAIL {
        (Caller::Admin, "admin")
    } else {
        (Caller::Customer, "user")
    };
    Json(json!({
        "user": user_json(caller),
        "tokens": {
            "access": format!("access-{role}"),
            "refresh": format!("refresh-{role}"),
        },
    }))
    .into_response()
}

async fn register() -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({
            "user_errors": { "email": ["A user with this email already exists."] },
        })),
    )
        .into_response()
}

async fn logout() -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn me(State(state): State<Arc<FakeState>>, headers: HeaderMap) -> Response {
    match authenticate(&state, &headers) {
        Ok(caller) => Json(json!({
            "user": user_json(caller),
            "profile": {
                "experience_level": "beginner",
                "preferred_tank_size": 20,
                "newsletter_subscribed": true,
                "marketing_emails": false,
            },
        }))
        .into_response(),
        Err(response) => response,
    }
}

async fn products() -> Json<Value> {
    Json(page(vec![neon_tetra()]))
}

async fn product(Path(id): Path<String>) -> Response {
    if id == NEON_TETRA_ID {
        Json(neon_tetra()).into_response()
    } else {
        (StatusCode::NOT_FOUND, Json(json!({ "detail": "Not found." }))).into_response()
    }
}

/// Categories come back as a bare array, as with pagination disabled.
async fn categories() -> Json<Value> {
    Json(json!([tetras()]))
}

async fn empty_page() -> Json<Value> {
    Json(page(Vec::new()))
}

async fn orders() -> Response {
    (
        StatusCode::TOO_MANY_REQUESTS,
        [(header::RETRY_AFTER, "7")],
        Json(json!({ "detail": "Request was throttled." })),
    )
        .into_response()
}

async fn admin_products(State(state): State<Arc<FakeState>>, headers: HeaderMap) -> Response {
    match authenticate(&state, &headers) {
        Ok(Caller::Admin) => Json(page(vec![json!({
            "id": NEON_TETRA_ID,
            "species_name": "Neon Tetra",
            "scientific_name": "Paracheirodon innesi",
            "price": "2.99",
            "stock_quantity": 40,
            "is_available": true,
            "difficulty_level": "beginner",
            "primary_image_url": null,
            "category_names": ["Tetras"],
        })]))
        .into_response(),
        Ok(Caller::Customer) => (
            StatusCode::FORBIDDEN,
            Json(json!({ "detail": "You do not have permission to perform this action." })),
        )
            .into_response(),
        Err(response) => response,
    }
}
