//! Inline form feedback.

use std::collections::BTreeMap;

use freshwater_backend::{BackendError, FieldErrors};

use crate::services::AuthError;

/// Per-field messages plus an optional summary shown above a form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors {
    fields: BTreeMap<String, String>,
    pub message: Option<String>,
}

impl FormErrors {
    /// A summary message with no field annotations.
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            fields: BTreeMap::new(),
            message: Some(message.into()),
        }
    }

    /// Locally detected field problems.
    #[must_use]
    pub fn from_fields(fields: FieldErrors) -> Self {
        Self {
            fields: fields
                .into_iter()
                .map(|(field, message)| (field.to_string(), message))
                .collect(),
            message: Some("Please correct the highlighted fields.".to_string()),
        }
    }

    /// Field errors reported by the backend, with its summary message.
    #[must_use]
    pub fn from_backend(error: &BackendError) -> Self {
        Self {
            fields: error.field_errors(),
            message: Some(error.user_message()),
        }
    }

    #[must_use]
    pub fn from_auth(error: &AuthError) -> Self {
        match error {
            AuthError::Validation(fields) => Self::from_fields(fields.clone()),
            AuthError::Backend(e) => Self::from_backend(e),
            other => Self::message(other.user_message()),
        }
    }

    /// Message for one field, if it failed.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.message.is_none()
    }
}

/// One `<option>` of a dropdown or radio group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

impl SelectOption {
    #[must_use]
    pub fn new(value: &str, label: &str, selected: bool) -> Self {
        Self {
            value: value.to_string(),
            label: label.to_string(),
            selected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_field_errors_are_kept() {
        let error = BackendError::Api {
            status: 400,
            message: "email: user with this email already exists.".to_string(),
            details: Some(serde_json::json!({
                "email": ["user with this email already exists."]
            })),
        };
        let errors = FormErrors::from_backend(&error);
        assert!(errors.field("email").is_some());
        assert!(errors.field("username").is_none());
        assert!(errors.message.is_some());
    }

    #[test]
    fn test_invalid_credentials_has_no_fields() {
        let errors = FormErrors::from_auth(&AuthError::InvalidCredentials);
        assert_eq!(errors.message.as_deref(), Some("Invalid email or password."));
        assert!(errors.field("email").is_none());
        assert!(!errors.is_empty());
        assert!(FormErrors::default().is_empty());
    }
}
