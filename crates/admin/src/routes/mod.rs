//! HTTP route handlers for the admin console.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                          - Dashboard
//! GET  /health                    - Liveness
//! GET  /health/ready              - Readiness (database + backend)
//!
//! # Auth
//! GET  /auth/login                - Login page
//! POST /auth/login                - Login action (rate limited)
//! POST /auth/logout               - Logout action
//!
//! # Catalogue (requires admin)
//! GET  /products                  - List (?search=, ?is_available=, ?difficulty_level=, ?diet_type=)
//! GET  /products/new              - New product form
//! POST /products                  - Create
//! GET  /products/{id}             - Edit form
//! POST /products/{id}             - Update
//! POST /products/{id}/delete      - Delete
//! GET  /categories ...            - Same shape as /products (?is_active=, ?parent_category=)
//!
//! # Customers (requires admin)
//! GET  /users ...                 - Same shape as /products (?role=, ?is_active=)
//! POST /users/{id}/profile        - Update the hobbyist profile
//!
//! # Orders (requires admin)
//! GET  /orders                    - List (?search=, ?status=, ?payment_status=)
//! GET  /orders/{id}               - Detail with fulfilment form
//! POST /orders/{id}               - Update status, payment, tracking, notes
//!
//! # Content (requires admin)
//! GET  /articles ...              - Same shape as /products (?status=, ?category=)
//! POST /articles/categories       - Add an article category
//! ```

pub mod articles;
pub mod auth;
pub mod categories;
pub mod dashboard;
pub mod health;
pub mod orders;
pub mod products;
pub mod users;

use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::login_rate_limiter;
use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route_layer(login_rate_limiter())
        .route("/logout", post(auth::logout))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index).post(products::create))
        .route("/new", get(products::new))
        .route("/{id}", get(products::edit).post(products::update))
        .route("/{id}/delete", post(products::delete))
}

/// Create the category routes router.
pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(categories::index).post(categories::create))
        .route("/new", get(categories::new))
        .route("/{id}", get(categories::edit).post(categories::update))
        .route("/{id}/delete", post(categories::delete))
}

/// Create the user routes router.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(users::index).post(users::create))
        .route("/new", get(users::new))
        .route("/{id}", get(users::edit).post(users::update))
        .route("/{id}/profile", post(users::update_profile))
        .route("/{id}/delete", post(users::delete))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::index))
        .route("/{id}", get(orders::show).post(orders::update))
}

/// Create the article routes router.
pub fn article_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(articles::index).post(articles::create))
        .route("/new", get(articles::new))
        .route("/categories", post(articles::create_category))
        .route("/{id}", get(articles::edit).post(articles::update))
        .route("/{id}/delete", post(articles::delete))
}

/// Create all routes for the admin console.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard::dashboard))
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/auth", auth_routes())
        .nest("/products", product_routes())
        .nest("/categories", category_routes())
        .nest("/users", user_routes())
        .nest("/orders", order_routes())
        .nest("/articles", article_routes())
}
