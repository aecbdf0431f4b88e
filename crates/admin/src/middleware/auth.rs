//! Authentication extractors and stale-session cleanup for admin.

use axum::{
    extract::{FromRequestParts, Request},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::error::{LOGIN_PATH, SessionExpired, clear_sentry_user};
use crate::models::{CurrentAdmin, Flash, keys, set_flash};

/// Extractor that requires a signed-in administrator.
///
/// Only admin-role accounts are ever stored in the session, so presence of
/// the record is enough.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireAdmin(admin): RequireAdmin) -> impl IntoResponse {
///     format!("Hello, {}!", admin.name)
/// }
/// ```
pub struct RequireAdmin(pub CurrentAdmin);

/// Rejection for [`RequireAdmin`]: back to the login page.
pub struct AdminAuthRejection;

impl IntoResponse for AdminAuthRejection {
    fn into_response(self) -> Response {
        Redirect::to(LOGIN_PATH).into_response()
    }
}

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AdminAuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AdminAuthRejection)?;

        session
            .get::<CurrentAdmin>(keys::CURRENT_ADMIN)
            .await
            .ok()
            .flatten()
            .map(Self)
            .ok_or(AdminAuthRejection)
    }
}

/// Extractor that optionally gets the current admin.
pub struct OptionalAdmin(pub Option<CurrentAdmin>);

impl<S> FromRequestParts<S> for OptionalAdmin
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let admin = match parts.extensions.get::<Session>() {
            Some(session) => session
                .get::<CurrentAdmin>(keys::CURRENT_ADMIN)
                .await
                .ok()
                .flatten(),
            None => None,
        };

        Ok(Self(admin))
    }
}

/// Drop the stored admin when a handler reported a rejected token.
pub async fn clear_stale_admin(request: Request, next: Next) -> Response {
    let session = request.extensions().get::<Session>().cloned();
    let response = next.run(request).await;

    if response.extensions().get::<SessionExpired>().is_some()
        && let Some(session) = session
    {
        if let Err(e) = session.remove::<CurrentAdmin>(keys::CURRENT_ADMIN).await {
            tracing::error!(error = %e, "Failed to clear stale admin record");
        }
        if let Err(e) = session.cycle_id().await {
            tracing::warn!(error = %e, "Failed to cycle session id");
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
