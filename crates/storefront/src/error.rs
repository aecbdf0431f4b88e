//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.
//!
//! A backend 401 means the stored access token is no longer accepted. The
//! response redirects to the login page and carries a [`SessionExpired`]
//! marker; [`crate::middleware::clear_stale_auth`] sees the marker and drops
//! the auth record while keeping the cart.

use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use freshwater_backend::BackendError;
use thiserror::Error;

use crate::filters;
use crate::models::LayoutContext;
use crate::services::{AuthError, CartError};

/// Where visitors land when their session is missing or stale.
pub const LOGIN_PATH: &str = "/auth/login";

/// Response extension marking a rejected access token.
#[derive(Debug, Clone, Copy)]
pub struct SessionExpired;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Backend request failed.
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// Auth store operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Cart store operation failed.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Session read or write failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error page template.
#[derive(Template)]
#[template(path = "error.html")]
struct ErrorTemplate {
    layout: LayoutContext,
    status: u16,
    title: &'static str,
    message: String,
}

impl AppError {
    /// The backend error behind this one, if any.
    fn backend(&self) -> Option<&BackendError> {
        match self {
            Self::Backend(e)
            | Self::Auth(AuthError::Backend(e))
            | Self::Cart(CartError::Backend(e)) => Some(e),
            _ => None,
        }
    }

    /// Whether the visitor must sign in (again).
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Auth(AuthError::NotSignedIn))
            || self.backend().is_some_and(BackendError::is_unauthorized)
    }

    /// HTTP status for the error page.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        if let Some(e) = self.backend() {
            return match e {
                BackendError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
                BackendError::Forbidden(_) => StatusCode::FORBIDDEN,
                BackendError::NotFound(_) => StatusCode::NOT_FOUND,
                BackendError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
                BackendError::Api { status, .. } if *status < 500 => StatusCode::BAD_REQUEST,
                _ => StatusCode::BAD_GATEWAY,
            };
        }
        match self {
            Self::Auth(AuthError::Validation(_) | AuthError::InvalidCredentials)
            | Self::Cart(
                CartError::InvalidQuantity
                | CartError::Unavailable(_)
                | CartError::InsufficientStock { .. },
            )
            | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Auth(AuthError::NotSignedIn) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show to the visitor.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Backend(e) => e.user_message(),
            Self::Auth(e) => e.user_message(),
            Self::Cart(e) => e.user_message(),
            Self::NotFound(_) => "The page you were looking for could not be found.".to_string(),
            Self::BadRequest(message) => message.clone(),
            Self::Session(_) | Self::Internal(_) => {
                "Something went wrong on our end. Please try again later.".to_string()
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.is_unauthorized() {
            let mut response = Redirect::to(LOGIN_PATH).into_response();
            // Only a rejected token means there was a session to expire.
            if self.backend().is_some_and(BackendError::is_unauthorized) {
                tracing::info!(error = %self, "Access token rejected; redirecting to login");
                response.extensions_mut().insert(SessionExpired);
            } else {
                tracing::debug!(error = %self, "Not signed in; redirecting to login");
            }
            return response;
        }

        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else {
            tracing::debug!(error = %self, status = %status, "Request rejected");
        }

        let title = match status {
            StatusCode::NOT_FOUND => "Page not found",
            StatusCode::FORBIDDEN => "Access denied",
            StatusCode::TOO_MANY_REQUESTS => "Slow down",
            StatusCode::BAD_REQUEST => "Something's not right",
            _ => "Something went wrong",
        };

        let page = ErrorTemplate {
            layout: LayoutContext::default(),
            status: status.as_u16(),
            title,
            message: self.user_message(),
        };

        match page.render() {
            Ok(body) => (status, Html(body)).into_response(),
            Err(e) => {
                tracing::error!(error = %e, "Failed to render error page");
                (status, title).into_response()
            }
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::header::LOCATION;

    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("product-123".to_string());
        assert_eq!(err.to_string(), "Not found: product-123");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_app_error_status_codes() {
        fn get_status(err: AppError) -> StatusCode {
            err.into_response().status()
        }

        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Backend(BackendError::RateLimited { retry_after: None })),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            get_status(AppError::Backend(BackendError::Server {
                status: 503,
                message: "down".to_string()
            })),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            get_status(AppError::Backend(BackendError::Forbidden("no".to_string()))),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_unauthorized_redirects_to_login_with_marker() {
        let err = AppError::Backend(BackendError::Unauthorized {
            message: "Token is invalid or expired".to_string(),
            code: Some(freshwater_backend::error::TOKEN_EXPIRED.to_string()),
        });
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers().get(LOCATION).unwrap(), LOGIN_PATH);
        assert!(response.extensions().get::<SessionExpired>().is_some());
    }

    #[test]
    fn test_not_signed_in_redirects_without_expiry_marker() {
        let response = AppError::Auth(AuthError::NotSignedIn).into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers().get(LOCATION).unwrap(), LOGIN_PATH);
        assert!(response.extensions().get::<SessionExpired>().is_none());
    }

    #[test]
    fn test_rejected_token_inside_auth_error_carries_marker() {
        let err = AppError::Auth(AuthError::Backend(BackendError::Unauthorized {
            message: "Token is invalid or expired".to_string(),
            code: None,
        }));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert!(response.extensions().get::<SessionExpired>().is_some());
    }

    #[test]
    fn test_backend_validation_message_is_shown() {
        let err = AppError::Backend(BackendError::Api {
            status: 400,
            message: "Insufficient stock for Cardinal Tetra".to_string(),
            details: None,
        });
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.user_message(), "Insufficient stock for Cardinal Tetra");
    }
}
