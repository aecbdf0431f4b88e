//! Admin console access control and session handling.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use freshwater_integration_tests::{
    ADMIN_EMAIL, CUSTOMER_EMAIL, FakeBackend, PASSWORD, form_request, get_request, send,
};

fn login_form(email: &str, password: &str) -> String {
    format!("email={}&password={password}", email.replace('@', "%40"))
}

/// Sign in as the admin and return the session cookie.
async fn sign_in(fake: &FakeBackend, app: &axum::Router) -> String {
    let response = send(
        app,
        form_request("/auth/login", &login_form(ADMIN_EMAIL, PASSWORD), None),
    )
    .await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some("/"));
    assert_eq!(fake.requests_to("/auth/login/").len(), 1);
    response.session_cookie().unwrap()
}

#[tokio::test]
async fn test_anonymous_requests_go_to_login() {
    let fake = FakeBackend::start().await;
    let app = fake.admin();

    for path in ["/products", "/categories", "/users", "/orders", "/articles"] {
        let response = send(&app, get_request(path, None)).await;
        assert_eq!(response.status, StatusCode::SEE_OTHER, "{path}");
        assert_eq!(response.location(), Some("/auth/login"), "{path}");
    }
    assert!(fake.requests_to("/admin/products/").is_empty());
}

#[tokio::test]
async fn test_login_page_and_health_are_public() {
    let fake = FakeBackend::start().await;
    let app = fake.admin();

    let login = send(&app, get_request("/auth/login", None)).await;
    assert_eq!(login.status, StatusCode::OK);

    let health = send(&app, get_request("/health", None)).await;
    assert_eq!(health.status, StatusCode::OK);
}

#[tokio::test]
async fn test_customer_accounts_are_refused() {
    let fake = FakeBackend::start().await;
    let app = fake.admin();

    let response = send(
        &app,
        form_request("/auth/login", &login_form(CUSTOMER_EMAIL, PASSWORD), None),
    )
    .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert!(response.body.contains("for administrators only"));

    // The tokens the backend issued are revoked straight away
    let logouts = fake.requests_to("/auth/logout/");
    assert_eq!(logouts.len(), 1);
    assert_eq!(
        logouts.first().and_then(|r| r.authorization.as_deref()),
        Some("Bearer access-user")
    );
}

#[tokio::test]
async fn test_wrong_password_is_unauthorized() {
    let fake = FakeBackend::start().await;
    let app = fake.admin();

    let response = send(
        &app,
        form_request("/auth/login", &login_form(ADMIN_EMAIL, "nope"), None),
    )
    .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert!(response.body.contains("Invalid email or password."));
}

#[tokio::test]
async fn test_admin_lists_products_with_own_token() {
    let fake = FakeBackend::start().await;
    let app = fake.admin();
    let cookie = sign_in(&fake, &app).await;

    let response = send(&app, get_request("/products", Some(&cookie))).await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Neon Tetra"));

    let calls = fake.requests_to("/admin/products/");
    assert_eq!(calls.len(), 1);
    assert_eq!(
        calls.first().and_then(|r| r.authorization.as_deref()),
        Some("Bearer access-admin")
    );
}

#[tokio::test]
async fn test_expired_backend_token_ends_the_session() {
    let fake = FakeBackend::start().await;
    let app = fake.admin();
    let cookie = sign_in(&fake, &app).await;

    fake.expire_tokens();
    let response = send(&app, get_request("/products", Some(&cookie))).await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some("/auth/login"));

    // The session id was cycled; the old cookie no longer carries an admin
    let cookie = response.session_cookie().unwrap_or(cookie);
    let again = send(&app, get_request("/products", Some(&cookie))).await;
    assert_eq!(again.status, StatusCode::SEE_OTHER);
    assert_eq!(fake.requests_to("/admin/products/").len(), 1);
}

#[tokio::test]
async fn test_logout_clears_the_session() {
    let fake = FakeBackend::start().await;
    let app = fake.admin();
    let cookie = sign_in(&fake, &app).await;

    let response = send(&app, form_request("/auth/logout", "", Some(&cookie))).await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(fake.requests_to("/auth/logout/").len(), 1);

    let after = send(&app, get_request("/products", Some(&cookie))).await;
    assert_eq!(after.location(), Some("/auth/login"));
}

#[tokio::test]
async fn test_security_headers_present() {
    let fake = FakeBackend::start().await;
    let app = fake.admin();

    let response = send(&app, get_request("/auth/login", None)).await;
    assert!(response.headers.contains_key("x-frame-options"));
    assert!(response.headers.contains_key("x-request-id"));
}
