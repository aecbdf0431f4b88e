//! Unified error handling for admin.
//!
//! A backend 401 means the stored admin token is no longer accepted. The
//! response redirects to the login page and carries a [`SessionExpired`]
//! marker, which [`crate::middleware::clear_stale_admin`] turns into a
//! cleared session.

use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use freshwater_backend::BackendError;
use thiserror::Error;

use crate::filters;

/// Where operators land when their session is missing or stale.
pub const LOGIN_PATH: &str = "/auth/login";

/// Response extension marking a rejected access token.
#[derive(Debug, Clone, Copy)]
pub struct SessionExpired;

/// Application-level error type for the admin panel.
#[derive(Debug, Error)]
pub enum AppError {
    /// Backend request failed.
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// Session read or write failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User lacks permission.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Standalone error page.
#[derive(Template)]
#[template(path = "error.html")]
struct ErrorTemplate {
    status: u16,
    title: &'static str,
    message: String,
}

impl AppError {
    /// Whether the operator must sign in again.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Backend(e) if e.is_unauthorized())
    }

    /// HTTP status for the error page.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Backend(BackendError::Unauthorized { .. }) => StatusCode::UNAUTHORIZED,
            Self::Backend(BackendError::Forbidden(_)) | Self::Forbidden(_) => {
                StatusCode::FORBIDDEN
            }
            Self::Backend(BackendError::NotFound(_)) | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Backend(BackendError::RateLimited { .. }) => StatusCode::TOO_MANY_REQUESTS,
            Self::Backend(BackendError::Api { status, .. }) if *status < 500 => {
                StatusCode::BAD_REQUEST
            }
            Self::Backend(_) => StatusCode::BAD_GATEWAY,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Session(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show to the operator.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Backend(e) => e.user_message(),
            Self::NotFound(what) => format!("The {what} you were looking for could not be found."),
            Self::Forbidden(message) | Self::BadRequest(message) => message.clone(),
            // Don't expose internal error details to clients
            Self::Session(_) | Self::Internal(_) => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.is_unauthorized() {
            tracing::info!(error = %self, "Admin token rejected; redirecting to login");
            let mut response = Redirect::to(LOGIN_PATH).into_response();
            response.extensions_mut().insert(SessionExpired);
            return response;
        }

        let status = self.status();

        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Admin request error"
            );
        } else {
            tracing::debug!(error = %self, status = %status, "Admin request rejected");
        }

        let title = match status {
            StatusCode::NOT_FOUND => "Not found",
            StatusCode::FORBIDDEN => "Access denied",
            StatusCode::TOO_MANY_REQUESTS => "Too many requests",
            StatusCode::BAD_REQUEST => "Bad request",
            StatusCode::BAD_GATEWAY => "Backend unavailable",
            _ => "Internal server error",
        };

        let page = ErrorTemplate {
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

/// Set the Sentry user context for the signed-in admin.
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
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::header::LOCATION;

    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("order".to_string());
        assert_eq!(err.to_string(), "Not found: order");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_app_error_status_codes() {
        fn get_status(err: AppError) -> StatusCode {
            err.into_response().status()
        }

        assert_eq!(
            get_status(AppError::NotFound("product".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Forbidden("test".to_string())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(AppError::Backend(BackendError::Forbidden(
                "You cannot delete your own account".to_string()
            ))),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(AppError::Backend(BackendError::Server {
                status: 502,
                message: "bad gateway".to_string()
            })),
            StatusCode::BAD_GATEWAY
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
            code: None,
        });
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers().get(LOCATION).unwrap(), LOGIN_PATH);
        assert!(response.extensions().get::<SessionExpired>().is_some());
    }

    #[test]
    fn test_internal_details_hidden() {
        let err = AppError::Internal("connection refused to 10.0.0.3".to_string());
        assert_eq!(err.user_message(), "Internal server error");
    }
}
