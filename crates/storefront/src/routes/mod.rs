//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                          - Home page
//! GET  /health                    - Liveness
//! GET  /health/ready              - Readiness (database + backend)
//!
//! # Products
//! GET  /products                  - Listing; filters live in the query string
//! GET  /products/{id}             - Product detail
//!
//! # Cart
//! GET  /cart                      - Cart page
//! POST /cart/add                  - Add a product
//! POST /cart/update               - Change a line's quantity
//! POST /cart/remove               - Remove a line
//! POST /cart/clear                - Empty the cart
//! GET  /cart/count                - Cart count badge (fragment)
//!
//! # Checkout (requires auth)
//! GET  /checkout                  - Order summary
//! POST /checkout                  - Place the order
//!
//! # Auth
//! GET  /auth/login                - Login page
//! POST /auth/login                - Login action
//! GET  /auth/register             - Register page
//! POST /auth/register             - Register action
//! POST /auth/logout               - Logout action
//! POST /auth/refresh              - Refresh the access token
//!
//! # Account (requires auth)
//! GET  /account                   - Profile
//! POST /account                   - Update profile
//! GET  /account/orders            - Order history
//! GET  /account/orders/{id}       - Order detail
//! GET  /account/addresses         - Address book
//! POST /account/addresses         - Add an address
//! GET  /account/addresses/{id}/edit   - Edit form
//! POST /account/addresses/{id}        - Update an address
//! POST /account/addresses/{id}/delete - Delete an address
//!
//! # Articles
//! GET  /articles                  - Published articles (?category=, ?cursor=)
//! GET  /articles/category/{slug}  - One category
//! GET  /articles/{slug}           - Article detail
//! ```

pub mod account;
pub mod articles;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod health;
pub mod home;
pub mod products;

use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::{auth_rate_limiter, cart_rate_limiter};
use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/refresh", post(auth::refresh))
        .route_layer(auth_rate_limiter())
        .route("/logout", post(auth::logout))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{id}", get(products::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
        .route_layer(cart_rate_limiter())
        .route("/", get(cart::show))
        .route("/count", get(cart::count))
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(account::profile).post(account::update_profile))
        .route("/orders", get(account::orders))
        .route("/orders/{id}", get(account::order))
        .route(
            "/addresses",
            get(account::addresses).post(account::create_address),
        )
        .route("/addresses/{id}", post(account::update_address))
        .route("/addresses/{id}/edit", get(account::edit_address))
        .route("/addresses/{id}/delete", post(account::delete_address))
}

/// Create the article routes router.
pub fn article_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(articles::index))
        .route("/category/{slug}", get(articles::category))
        .route("/{slug}", get(articles::show))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/products", product_routes())
        .nest("/cart", cart_routes())
        .route(
            "/checkout",
            get(checkout::show).post(checkout::place_order),
        )
        .nest("/account", account_routes())
        .nest("/auth", auth_routes())
        .nest("/articles", article_routes())
}
