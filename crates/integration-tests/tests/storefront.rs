//! Storefront flows driven through the full router.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use freshwater_integration_tests::{
    CUSTOMER_EMAIL, FakeBackend, NEON_TETRA_ID, PASSWORD, form_request, get_request, send,
};

#[tokio::test]
async fn test_health() {
    let fake = FakeBackend::start().await;
    let app = fake.storefront();

    let response = send(&app, get_request("/health", None)).await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_home_features_in_stock_fish() {
    let fake = FakeBackend::start().await;
    let app = fake.storefront();

    let response = send(&app, get_request("/", None)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Neon Tetra"));
    assert!(response.body.contains("Tetras"));
}

#[tokio::test]
async fn test_product_detail_and_missing_product() {
    let fake = FakeBackend::start().await;
    let app = fake.storefront();

    let response = send(&app, get_request(&format!("/products/{NEON_TETRA_ID}"), None)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Paracheirodon innesi"));

    let missing = send(
        &app,
        get_request("/products/00000000-0000-0000-0000-000000000000", None),
    )
    .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_cart_survives_between_requests() {
    let fake = FakeBackend::start().await;
    let app = fake.storefront();

    let added = send(
        &app,
        form_request(
            "/cart/add",
            &format!("product_id={NEON_TETRA_ID}&quantity=3"),
            None,
        ),
    )
    .await;
    assert_eq!(added.status, StatusCode::SEE_OTHER);
    assert_eq!(added.location(), Some("/cart"));
    let cookie = added.session_cookie().unwrap();

    let count = send(&app, get_request("/cart/count", Some(&cookie))).await;
    assert!(count.body.contains(">3<"));

    let cart = send(&app, get_request("/cart", Some(&cookie))).await;
    assert_eq!(cart.status, StatusCode::OK);
    assert!(cart.body.contains("Neon Tetra"));
}

#[tokio::test]
async fn test_cart_rejects_more_than_stock() {
    let fake = FakeBackend::start().await;
    let app = fake.storefront();

    let added = send(
        &app,
        form_request(
            "/cart/add",
            &format!("product_id={NEON_TETRA_ID}&quantity=41"),
            None,
        ),
    )
    .await;
    assert_eq!(added.status, StatusCode::SEE_OTHER);
    let cookie = added.session_cookie().unwrap();

    let count = send(&app, get_request("/cart/count", Some(&cookie))).await;
    assert!(count.body.contains(">0<"));
}

#[tokio::test]
async fn test_checkout_requires_sign_in() {
    let fake = FakeBackend::start().await;
    let app = fake.storefront();

    let response = send(&app, get_request("/checkout", None)).await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some("/auth/login?next=%2Fcheckout"));
}

#[tokio::test]
async fn test_nested_account_pages_keep_full_path_in_next() {
    let fake = FakeBackend::start().await;
    let app = fake.storefront();

    let orders = send(&app, get_request("/account/orders", None)).await;
    assert_eq!(orders.status, StatusCode::SEE_OTHER);
    assert_eq!(
        orders.location(),
        Some("/auth/login?next=%2Faccount%2Forders")
    );

    let account = send(&app, get_request("/account", None)).await;
    assert_eq!(account.location(), Some("/auth/login?next=%2Faccount"));
}

/// Sign in as the customer and return the session cookie.
async fn sign_in(app: &axum::Router) -> String {
    let form = format!(
        "email={}&password={PASSWORD}",
        CUSTOMER_EMAIL.replace('@', "%40")
    );
    let response = send(app, form_request("/auth/login", &form, None)).await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    response.session_cookie().unwrap()
}

#[tokio::test]
async fn test_logout_revokes_and_forgets_user() {
    let fake = FakeBackend::start().await;
    let app = fake.storefront();
    let cookie = sign_in(&app).await;

    let response = send(&app, form_request("/auth/logout", "", Some(&cookie))).await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some("/"));

    let logouts = fake.requests_to("/auth/logout/");
    assert_eq!(logouts.len(), 1);
    assert_eq!(
        logouts[0].authorization.as_deref(),
        Some("Bearer access-user")
    );

    let account = send(&app, get_request("/account", Some(&cookie))).await;
    assert_eq!(account.status, StatusCode::SEE_OTHER);
    assert_eq!(account.location(), Some("/auth/login?next=%2Faccount"));
}

#[tokio::test]
async fn test_expired_token_signs_out_but_keeps_cart() {
    let fake = FakeBackend::start().await;
    let app = fake.storefront();
    let cookie = sign_in(&app).await;

    send(
        &app,
        form_request(
            "/cart/add",
            &format!("product_id={NEON_TETRA_ID}&quantity=2"),
            Some(&cookie),
        ),
    )
    .await;

    fake.expire_tokens();
    let rejected = send(&app, get_request("/account", Some(&cookie))).await;
    assert_eq!(rejected.status, StatusCode::SEE_OTHER);
    assert_eq!(rejected.location(), Some("/auth/login"));
    assert_eq!(fake.requests_to("/auth/me/").len(), 1);

    // The auth record is gone, so the backend is not asked again.
    let again = send(&app, get_request("/account", Some(&cookie))).await;
    assert_eq!(again.location(), Some("/auth/login?next=%2Faccount"));
    assert_eq!(fake.requests_to("/auth/me/").len(), 1);

    let count = send(&app, get_request("/cart/count", Some(&cookie))).await;
    assert!(count.body.contains(">2<"));
}

#[tokio::test]
async fn test_login_then_account_page() {
    let fake = FakeBackend::start().await;
    let app = fake.storefront();

    let form = format!(
        "email={}&password={PASSWORD}&next=%2Faccount",
        CUSTOMER_EMAIL.replace('@', "%40")
    );
    let response = send(&app, form_request("/auth/login", &form, None)).await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some("/account"));
    let cookie = response.session_cookie().unwrap();

    let account = send(&app, get_request("/account", Some(&cookie))).await;
    assert_eq!(account.status, StatusCode::OK);
    assert!(account.body.contains(CUSTOMER_EMAIL));

    let me_calls = fake.requests_to("/auth/me/");
    assert!(
        me_calls
            .iter()
            .all(|r| r.authorization.as_deref() == Some("Bearer access-user"))
    );
}

#[tokio::test]
async fn test_wrong_password_rerenders_form() {
    let fake = FakeBackend::start().await;
    let app = fake.storefront();

    let response = send(
        &app,
        form_request("/auth/login", "email=guppy%40aquatics.test&password=nope", None),
    )
    .await;
    assert!(response.location().is_none());
    assert!(response.body.contains("Invalid email or password."));
}
