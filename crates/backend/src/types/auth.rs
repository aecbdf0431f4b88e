//! Authentication and account types.

use chrono::{DateTime, Utc};
use freshwater_core::{Email, ExperienceLevel, UserId, UserRole};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use super::{FieldErrors, default_true, max_len, null_as_empty, require};

/// Minimum password length accepted by the backend.
pub const MIN_PASSWORD_LEN: usize = 8;

/// A user account as the backend returns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub username: String,
    pub email: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub first_name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub last_name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub phone: String,
    #[serde(default)]
    pub role: UserRole,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub date_joined: Option<DateTime<Utc>>,
}

impl User {
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// Full name, falling back to the username, then the email.
    #[must_use]
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        let full = full.trim();
        if !full.is_empty() {
            full.to_string()
        } else if !self.username.is_empty() {
            self.username.clone()
        } else {
            self.email.clone()
        }
    }
}

/// Hobbyist preferences stored alongside the account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub experience_level: Option<ExperienceLevel>,
    /// Gallons.
    #[serde(default)]
    pub preferred_tank_size: Option<u32>,
    #[serde(default)]
    pub newsletter_subscribed: bool,
    #[serde(default)]
    pub marketing_emails: bool,
}

/// JWT pair issued on login and registration.
#[derive(Debug, Deserialize)]
pub struct TokenPair {
    pub access: SecretString,
    pub refresh: SecretString,
}

/// Body of a successful login or registration.
#[derive(Debug, Deserialize)]
pub struct AuthResponse {
    pub user: User,
    pub tokens: TokenPair,
}

/// Body of `/auth/refresh/`. The backend may rotate the refresh token.
#[derive(Debug, Deserialize)]
pub struct RefreshResponse {
    pub access: SecretString,
    #[serde(default)]
    pub refresh: Option<SecretString>,
}

/// Body of `GET /auth/me/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeResponse {
    pub user: User,
    #[serde(default)]
    pub profile: UserProfile,
}

#[derive(Debug, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// A registration form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password_confirm: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

impl RegisterRequest {
    /// Check the form before sending it.
    ///
    /// # Errors
    ///
    /// Returns the failing fields with a message for each.
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        require(&mut errors, "username", &self.username);
        max_len(&mut errors, "username", &self.username, 150);
        if let Err(e) = Email::parse(&self.email) {
            errors.insert("email", e.to_string());
        }
        validate_password(&mut errors, &self.password, &self.password_confirm);
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Shared password rules for registration and admin user creation.
pub(crate) fn validate_password(errors: &mut FieldErrors, password: &str, confirm: &str) {
    if password.chars().count() < MIN_PASSWORD_LEN {
        errors.insert(
            "password",
            format!("Password must be at least {MIN_PASSWORD_LEN} characters."),
        );
    }
    if password != confirm {
        errors.insert("password_confirm", "Passwords do not match.".to_string());
    }
}

/// Editable account fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserUpdate {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
}

/// Body of `PATCH /auth/me/`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateMeRequest {
    pub user: UserUpdate,
    pub profile: UserProfile,
}

impl UpdateMeRequest {
    /// # Errors
    ///
    /// Returns the failing fields with a message for each.
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        max_len(&mut errors, "first_name", &self.user.first_name, 150);
        max_len(&mut errors, "last_name", &self.user.last_name, 150);
        max_len(&mut errors, "phone", &self.user.phone, 15);
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    fn registration() -> RegisterRequest {
        RegisterRequest {
            username: "reefkeeper".to_string(),
            email: "keeper@aquatics.example".to_string(),
            password: "bristlenose".to_string(),
            password_confirm: "bristlenose".to_string(),
            ..RegisterRequest::default()
        }
    }

    #[test]
    fn test_registration_valid() {
        assert!(registration().validate().is_ok());
    }

    #[test]
    fn test_registration_short_password() {
        let mut form = registration();
        form.password = "guppy".to_string();
        form.password_confirm = "guppy".to_string();
        let errors = form.validate().unwrap_err();
        assert!(errors.contains_key("password"));
        assert!(!errors.contains_key("password_confirm"));
    }

    #[test]
    fn test_registration_mismatched_confirmation() {
        let mut form = registration();
        form.password_confirm = "bristlenoses".to_string();
        let errors = form.validate().unwrap_err();
        assert_eq!(
            errors.get("password_confirm").map(String::as_str),
            Some("Passwords do not match.")
        );
    }

    #[test]
    fn test_registration_bad_email() {
        let mut form = registration();
        form.email = "keeper".to_string();
        assert!(form.validate().unwrap_err().contains_key("email"));
    }

    #[test]
    fn test_auth_response_parses_tokens() {
        let json = r#"{
            "user": {"id": "7d6c0f5e-3a44-4a8e-9a55-3e8f2b2f9c11", "username": "reefkeeper",
                     "email": "keeper@aquatics.example", "first_name": "", "last_name": "",
                     "phone": "", "date_joined": "2024-05-01T12:00:00Z", "is_active": true},
            "tokens": {"refresh": "r-token", "access": "a-token"}
        }"#;
        let auth: AuthResponse = serde_json::from_str(json).unwrap();
        assert_eq!(auth.user.role, UserRole::User);
        assert_eq!(auth.user.display_name(), "reefkeeper");
        assert_eq!(auth.tokens.access.expose_secret(), "a-token");
        assert!(!format!("{:?}", auth.tokens).contains("a-token"));
    }

    #[test]
    fn test_display_name_prefers_full_name() {
        let user: User = serde_json::from_str(
            r#"{"id": "7d6c0f5e-3a44-4a8e-9a55-3e8f2b2f9c11", "email": "a@b.example",
                "first_name": "Ada", "last_name": "Lovelace", "role": "admin"}"#,
        )
        .unwrap();
        assert_eq!(user.display_name(), "Ada Lovelace");
        assert!(user.is_admin());
    }
}
