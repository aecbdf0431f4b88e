//! Session-stored types.
//!
//! The session stands in for the browser storage a client-rendered shop
//! would use: it survives reloads and is scoped to one visitor.

use std::fmt;

use freshwater_backend::{AuthResponse, User};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

/// Session keys.
pub mod keys {
    /// Signed-in user and tokens.
    pub const AUTH: &str = "auth";

    /// Cart lines and totals.
    pub const CART: &str = "cart";

    /// One-shot message shown on the next rendered page.
    pub const FLASH: &str = "flash";
}

/// The signed-in user and their backend tokens.
///
/// Tokens are kept as plain strings because the session store needs to
/// serialize them; they are only handed out as [`SecretString`].
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthSession {
    pub user: User,
    access_token: String,
    refresh_token: String,
}

impl AuthSession {
    #[must_use]
    pub fn new(user: User, access: &SecretString, refresh: &SecretString) -> Self {
        Self {
            user,
            access_token: access.expose_secret().to_string(),
            refresh_token: refresh.expose_secret().to_string(),
        }
    }

    #[must_use]
    pub fn access_token(&self) -> SecretString {
        SecretString::from(self.access_token.clone())
    }

    #[must_use]
    pub fn refresh_token(&self) -> SecretString {
        SecretString::from(self.refresh_token.clone())
    }

    /// Replace the access token, and the refresh token when rotated.
    pub fn set_tokens(&mut self, access: &SecretString, refresh: Option<&SecretString>) {
        self.access_token = access.expose_secret().to_string();
        if let Some(refresh) = refresh {
            self.refresh_token = refresh.expose_secret().to_string();
        }
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.user.is_admin()
    }
}

impl From<AuthResponse> for AuthSession {
    fn from(response: AuthResponse) -> Self {
        Self::new(
            response.user,
            &response.tokens.access,
            &response.tokens.refresh,
        )
    }
}

impl fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthSession")
            .field("user", &self.user.email)
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .finish()
    }
}

/// Flash message severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlashLevel {
    Success,
    Info,
    Error,
}

impl FlashLevel {
    /// CSS modifier class.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Info => "info",
            Self::Error => "error",
        }
    }
}

/// A message carried across a redirect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Success,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Error,
            message: message.into(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use freshwater_core::{UserId, UserRole};

    use super::*;

    fn user() -> User {
        User {
            id: UserId::new(uuid::Uuid::new_v4()),
            username: "tetra".to_string(),
            email: "tetra@aquatics.example".to_string(),
            first_name: String::new(),
            last_name: String::new(),
            phone: String::new(),
            role: UserRole::User,
            is_active: true,
            date_joined: None,
        }
    }

    #[test]
    fn test_auth_session_survives_serialization() {
        let session = AuthSession::new(
            user(),
            &SecretString::from("access-1"),
            &SecretString::from("refresh-1"),
        );
        let json = serde_json::to_string(&session).unwrap();
        let restored: AuthSession = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.user, session.user);
        assert_eq!(restored.access_token().expose_secret(), "access-1");
        assert_eq!(restored.refresh_token().expose_secret(), "refresh-1");
    }

    #[test]
    fn test_set_tokens_keeps_refresh_unless_rotated() {
        let mut session = AuthSession::new(
            user(),
            &SecretString::from("access-1"),
            &SecretString::from("refresh-1"),
        );
        session.set_tokens(&SecretString::from("access-2"), None);
        assert_eq!(session.access_token().expose_secret(), "access-2");
        assert_eq!(session.refresh_token().expose_secret(), "refresh-1");

        session.set_tokens(
            &SecretString::from("access-3"),
            Some(&SecretString::from("refresh-3")),
        );
        assert_eq!(session.refresh_token().expose_secret(), "refresh-3");
    }

    #[test]
    fn test_debug_redacts_tokens() {
        let session = AuthSession::new(
            user(),
            &SecretString::from("very-secret-access"),
            &SecretString::from("very-secret-refresh"),
        );
        let debug = format!("{session:?}");
        assert!(debug.contains("tetra@aquatics.example"));
        assert!(!debug.contains("very-secret"));
    }
}
