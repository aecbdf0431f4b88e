//! Session-backed auth store.
//!
//! Holds the signed-in user and their backend tokens in the visitor's
//! session under [`keys::AUTH`]. Reloading a page keeps the visitor signed
//! in; logging out or a stale token removes the record.

mod error;

pub use error::AuthError;

use freshwater_backend::{BackendClient, BackendError, FieldErrors, RegisterRequest, User};
use tower_sessions::Session;
use tracing::{info, instrument, warn};

use crate::error::{clear_sentry_user, set_sentry_user};
use crate::models::{AuthSession, keys};

/// Auth state for one visitor.
pub struct AuthStore<'a> {
    session: &'a Session,
    backend: &'a BackendClient,
}

impl<'a> AuthStore<'a> {
    #[must_use]
    pub const fn new(session: &'a Session, backend: &'a BackendClient) -> Self {
        Self { session, backend }
    }

    /// The stored auth record, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be read.
    pub async fn current(&self) -> Result<Option<AuthSession>, AuthError> {
        Ok(self.session.get::<AuthSession>(keys::AUTH).await?)
    }

    pub async fn is_authenticated(&self) -> bool {
        matches!(self.current().await, Ok(Some(_)))
    }

    /// Sign in with email and password and persist the result.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] when the backend rejects
    /// the credentials.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        let email = email.trim();
        let mut errors = FieldErrors::new();
        if email.is_empty() {
            errors.insert("email", "Email is required.".to_string());
        }
        if password.is_empty() {
            errors.insert("password", "Password is required.".to_string());
        }
        if !errors.is_empty() {
            return Err(AuthError::Validation(errors));
        }

        let response = self
            .backend
            .login(email, password)
            .await
            .map_err(|e| match e {
                BackendError::Unauthorized { .. } => AuthError::InvalidCredentials,
                other => AuthError::Backend(other),
            })?;

        self.persist(AuthSession::from(response)).await
    }

    /// Create an account, then persist like [`Self::login`].
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Validation`] when the form fails local checks
    /// (password length or confirmation mismatch) and
    /// [`AuthError::Backend`] when the backend rejects it.
    #[instrument(skip(self, form), fields(email = %form.email))]
    pub async fn register(&self, form: &RegisterRequest) -> Result<AuthSession, AuthError> {
        form.validate().map_err(AuthError::Validation)?;
        let response = self.backend.register(form).await?;
        self.persist(AuthSession::from(response)).await
    }

    /// Revoke the refresh token (best effort) and forget the user.
    ///
    /// The cart is left alone.
    ///
    /// # Errors
    ///
    /// Returns an error only if the session cannot be written.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<(), AuthError> {
        if let Some(auth) = self.current().await? {
            self.backend
                .logout(&auth.access_token(), &auth.refresh_token())
                .await;
            info!(user_id = %auth.user.id, "User logged out");
        }
        self.clear().await?;
        clear_sentry_user();
        Ok(())
    }

    /// Drop the auth record without calling the backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be written.
    pub async fn clear(&self) -> Result<(), AuthError> {
        self.session.remove::<AuthSession>(keys::AUTH).await?;
        Ok(())
    }

    /// Replace the stored user after a profile edit.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::NotSignedIn`] when there is no auth record.
    pub async fn set_user(&self, user: User) -> Result<AuthSession, AuthError> {
        let mut auth = self.current().await?.ok_or(AuthError::NotSignedIn)?;
        auth.user = user;
        self.session.insert(keys::AUTH, &auth).await?;
        Ok(auth)
    }

    /// Exchange the refresh token for a new access token.
    ///
    /// A rejected refresh token clears the record.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::NotSignedIn`] without a record and
    /// [`AuthError::Backend`] when the backend refuses.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<AuthSession, AuthError> {
        let mut auth = self.current().await?.ok_or(AuthError::NotSignedIn)?;

        match self.backend.refresh(&auth.refresh_token()).await {
            Ok(tokens) => {
                auth.set_tokens(&tokens.access, tokens.refresh.as_ref());
                self.session.insert(keys::AUTH, &auth).await?;
                Ok(auth)
            }
            Err(e) => {
                if e.is_unauthorized() {
                    warn!("Refresh token rejected; clearing session");
                    self.clear().await?;
                }
                Err(e.into())
            }
        }
    }

    async fn persist(&self, auth: AuthSession) -> Result<AuthSession, AuthError> {
        // New identity, new session id.
        self.session.cycle_id().await?;
        self.session.insert(keys::AUTH, &auth).await?;
        set_sentry_user(&auth.user.id, Some(&auth.user.email));
        info!(user_id = %auth.user.id, "User signed in");
        Ok(auth)
    }
}
