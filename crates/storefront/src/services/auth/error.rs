//! Authentication error types.

use freshwater_backend::{BackendError, FieldErrors};
use thiserror::Error;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The form failed local checks before reaching the backend.
    #[error("invalid form: {0:?}")]
    Validation(FieldErrors),

    /// Wrong email or password.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// An operation needed a signed-in user and there is none.
    #[error("not signed in")]
    NotSignedIn,

    /// The backend refused or failed the request.
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),

    /// Reading or writing the session failed.
    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),
}

impl AuthError {
    /// Message to show next to the form.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(_) => "Please correct the highlighted fields.".to_string(),
            Self::InvalidCredentials => "Invalid email or password.".to_string(),
            Self::NotSignedIn => "Please sign in to continue.".to_string(),
            Self::Backend(e) => e.user_message(),
            Self::Session(_) => "Something went wrong on our end. Please try again.".to_string(),
        }
    }
}
