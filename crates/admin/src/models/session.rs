//! Session-related types for admin authentication.
//!
//! Types stored in the session for authentication state.

use std::fmt;

use freshwater_backend::AuthResponse;
use freshwater_core::UserId;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

/// Session keys for admin authentication data.
pub mod keys {
    /// Key for storing the current logged-in admin.
    pub const CURRENT_ADMIN: &str = "current_admin";

    /// One-shot message shown on the next rendered page.
    pub const FLASH: &str = "flash";
}

/// Session-stored admin identity and backend tokens.
///
/// Only users whose backend role is `admin` are ever stored. Tokens are
/// plain strings so the session store can serialize them; they are only
/// handed out as [`SecretString`].
#[derive(Clone, Serialize, Deserialize)]
pub struct CurrentAdmin {
    /// Backend user ID.
    pub id: UserId,
    pub email: String,
    /// Display name for the header.
    pub name: String,
    access_token: String,
    refresh_token: String,
}

impl CurrentAdmin {
    /// Build the session record from a login response.
    ///
    /// Returns `None` when the account is not an administrator.
    #[must_use]
    pub fn from_login(response: &AuthResponse) -> Option<Self> {
        if !response.user.is_admin() {
            return None;
        }
        Some(Self {
            id: response.user.id,
            email: response.user.email.clone(),
            name: response.user.display_name(),
            access_token: response.tokens.access.expose_secret().to_string(),
            refresh_token: response.tokens.refresh.expose_secret().to_string(),
        })
    }

    #[must_use]
    pub fn access_token(&self) -> SecretString {
        SecretString::from(self.access_token.clone())
    }

    #[must_use]
    pub fn refresh_token(&self) -> SecretString {
        SecretString::from(self.refresh_token.clone())
    }
}

impl fmt::Debug for CurrentAdmin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CurrentAdmin")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("name", &self.name)
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
    use super::*;

    fn login_response(role: &str) -> AuthResponse {
        serde_json::from_value(serde_json::json!({
            "user": {
                "id": "5f0c6a4e-8d0b-4c8e-9a43-3c1f2b7e9d10",
                "username": "keeper",
                "email": "keeper@aquatics.example",
                "first_name": "Rita",
                "last_name": "Loach",
                "role": role,
            },
            "tokens": { "access": "access-1", "refresh": "refresh-1" }
        }))
        .unwrap()
    }

    #[test]
    fn test_admin_login_is_stored() {
        let admin = CurrentAdmin::from_login(&login_response("admin")).unwrap();
        assert_eq!(admin.email, "keeper@aquatics.example");
        assert_eq!(admin.name, "Rita Loach");
        assert_eq!(admin.access_token().expose_secret(), "access-1");
        assert_eq!(admin.refresh_token().expose_secret(), "refresh-1");
    }

    #[test]
    fn test_customer_login_is_refused() {
        assert!(CurrentAdmin::from_login(&login_response("user")).is_none());
    }

    #[test]
    fn test_survives_serialization_and_redacts_debug() {
        let admin = CurrentAdmin::from_login(&login_response("admin")).unwrap();
        let json = serde_json::to_string(&admin).unwrap();
        let restored: CurrentAdmin = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.access_token().expose_secret(), "access-1");

        let debug = format!("{restored:?}");
        assert!(!debug.contains("access-1"));
        assert!(!debug.contains("refresh-1"));
    }
}
