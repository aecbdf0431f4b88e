//! Authentication extractors and stale-session cleanup.

use axum::{
    extract::{FromRequestParts, OriginalUri, Request},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::error::{LOGIN_PATH, SessionExpired, clear_sentry_user};
use crate::models::{AuthSession, Flash, keys, set_flash};

/// Extractor that requires a signed-in customer.
///
/// Anonymous visitors are redirected to the login page with the current
/// path as `next`.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireAuth(auth): RequireAuth) -> impl IntoResponse {
///     format!("Hello, {}!", auth.user.display_name())
/// }
/// ```
pub struct RequireAuth(pub AuthSession);

/// Rejection for [`RequireAuth`].
pub struct LoginRedirect(String);

impl IntoResponse for LoginRedirect {
    fn into_response(self) -> Response {
        Redirect::to(&self.0).into_response()
    }
}

/// Login URL that returns to `path` afterwards.
#[must_use]
pub fn login_url(path: &str) -> String {
    if path.is_empty() || path == "/" {
        LOGIN_PATH.to_string()
    } else {
        format!("{LOGIN_PATH}?next={}", urlencoding::encode(path))
    }
}

/// Accept only same-site relative paths as redirect targets.
#[must_use]
pub fn safe_next<'a>(next: Option<&'a str>, fallback: &'a str) -> &'a str {
    match next {
        Some(path) if path.starts_with('/') && !path.starts_with("//") && !path.contains('\\') => {
            path
        }
        _ => fallback,
    }
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = LoginRedirect;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Nested routers see a stripped URI; `next` needs the full path.
        let uri = parts
            .extensions
            .get::<OriginalUri>()
            .map_or(&parts.uri, |original| &original.0);
        let path = uri
            .path_and_query()
            .map_or("/", |pq| pq.as_str())
            .to_string();

        let Some(session) = parts.extensions.get::<Session>() else {
            return Err(LoginRedirect(login_url(&path)));
        };

        session
            .get::<AuthSession>(keys::AUTH)
            .await
            .ok()
            .flatten()
            .map(Self)
            .ok_or_else(|| LoginRedirect(login_url(&path)))
    }
}

/// Extractor that optionally gets the signed-in customer.
///
/// Unlike `RequireAuth`, this does not reject anonymous visitors.
pub struct OptionalAuth(pub Option<AuthSession>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth = match parts.extensions.get::<Session>() {
            Some(session) => session
                .get::<AuthSession>(keys::AUTH)
                .await
                .ok()
                .flatten(),
            None => None,
        };

        Ok(Self(auth))
    }
}

/// Forget the stored user when a handler reported a rejected token.
///
/// Runs inside the session layer. The cart is kept so a shopper who signs
/// back in can continue to checkout.
pub async fn clear_stale_auth(request: Request, next: Next) -> Response {
    let session = request.extensions().get::<Session>().cloned();
    let response = next.run(request).await;

    if response.extensions().get::<SessionExpired>().is_some()
        && let Some(session) = session
    {
        if let Err(e) = session.remove::<AuthSession>(keys::AUTH).await {
            tracing::error!(error = %e, "Failed to clear stale auth record");
        }
        if let Err(e) = set_flash(
            &session,
            Flash::info("Your session has expired. Please sign in again."),
        )
        .await
        {
            tracing::warn!(error = %e, "Failed to set session-expired message");
        }
        clear_sentry_user();
    }

    response
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::Request as HttpRequest;

    use super::*;

    #[test]
    fn test_login_url_carries_next() {
        assert_eq!(login_url("/"), "/auth/login");
        assert_eq!(login_url("/checkout"), "/auth/login?next=%2Fcheckout");
        assert_eq!(
            login_url("/account/orders?page=2"),
            "/auth/login?next=%2Faccount%2Forders%3Fpage%3D2"
        );
    }

    #[test]
    fn test_safe_next_rejects_offsite_targets() {
        assert_eq!(safe_next(Some("/checkout"), "/account"), "/checkout");
        assert_eq!(safe_next(Some("//evil.example"), "/account"), "/account");
        assert_eq!(safe_next(Some("https://evil.example"), "/account"), "/account");
        assert_eq!(safe_next(Some("/\\evil.example"), "/cart"), "/cart");
        assert_eq!(safe_next(None, "/account"), "/account");
    }

    #[tokio::test]
    async fn test_anonymous_redirect_keeps_nested_prefix() {
        let (mut parts, ()) = HttpRequest::builder()
            .uri("/orders?page=2")
            .body(())
            .unwrap()
            .into_parts();
        parts
            .extensions
            .insert(OriginalUri("/account/orders?page=2".parse().unwrap()));

        let Err(LoginRedirect(location)) = RequireAuth::from_request_parts(&mut parts, &()).await
        else {
            panic!("anonymous request was accepted");
        };
        assert_eq!(location, "/auth/login?next=%2Faccount%2Forders%3Fpage%3D2");
    }
}
