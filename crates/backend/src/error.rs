//! Backend error classification.

use std::collections::BTreeMap;

use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Error code the backend attaches to a 401 caused by an expired access token.
pub const TOKEN_EXPIRED: &str = "TOKEN_EXPIRED";

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The request never produced a response (connect, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// 401: missing, invalid or expired credentials.
    #[error("Unauthorized: {message}")]
    Unauthorized {
        message: String,
        code: Option<String>,
    },

    /// 403: authenticated but not allowed.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// 404.
    #[error("Not found: {0}")]
    NotFound(String),

    /// 429, with the `Retry-After` value in seconds when present.
    #[error("Rate limited, retry after {} seconds", retry_after.unwrap_or(1))]
    RateLimited { retry_after: Option<u64> },

    /// 5xx.
    #[error("Backend server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// Any other non-success status, usually a 400 validation failure.
    #[error("API error ({status}): {message}")]
    Api {
        status: u16,
        message: String,
        details: Option<Value>,
    },

    /// A success response whose body could not be decoded.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

impl BackendError {
    /// Classify a non-success response.
    #[must_use]
    pub fn from_response(status: StatusCode, body: &str, retry_after: Option<u64>) -> Self {
        let json: Option<Value> = serde_json::from_str(body).ok();
        let message = json
            .as_ref()
            .and_then(extract_message)
            .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));

        match status {
            StatusCode::UNAUTHORIZED => Self::Unauthorized {
                message,
                code: json
                    .as_ref()
                    .and_then(|v| v.get("code"))
                    .and_then(Value::as_str)
                    .map(str::to_string),
            },
            StatusCode::FORBIDDEN => Self::Forbidden(message),
            StatusCode::NOT_FOUND => Self::NotFound(message),
            StatusCode::TOO_MANY_REQUESTS => Self::RateLimited { retry_after },
            s if s.is_server_error() => Self::Server {
                status: s.as_u16(),
                message,
            },
            s => Self::Api {
                status: s.as_u16(),
                message,
                details: json,
            },
        }
    }

    /// HTTP status of the backend response, if there was one.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            Self::Unauthorized { .. } => Some(401),
            Self::Forbidden(_) => Some(403),
            Self::NotFound(_) => Some(404),
            Self::RateLimited { .. } => Some(429),
            Self::Server { status, .. } | Self::Api { status, .. } => Some(*status),
            Self::Parse(_) => None,
        }
    }

    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    /// Whether this is a 401 caused by an expired access token.
    #[must_use]
    pub fn is_token_expired(&self) -> bool {
        matches!(self, Self::Unauthorized { code: Some(code), .. } if code == TOKEN_EXPIRED)
    }

    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Message safe to show to a shopper or admin.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Unauthorized { code: Some(code), .. } if code == TOKEN_EXPIRED => {
                "Your session has expired. Please log in again.".to_string()
            }
            Self::Unauthorized { code: Some(code), .. } if code == "INVALID_CREDENTIALS" => {
                "Invalid email or password. Please check your credentials.".to_string()
            }
            Self::Unauthorized { message, .. } => non_generic(message)
                .unwrap_or("Authentication failed. Please log in again.")
                .to_string(),
            Self::Forbidden(message) => non_generic(message).unwrap_or("Access denied.").to_string(),
            Self::NotFound(_) => "The requested item could not be found.".to_string(),
            Self::RateLimited { .. } => {
                "Too many requests. Please wait a moment before trying again.".to_string()
            }
            Self::Http(_) => {
                "Unable to connect to the server. Please try again shortly.".to_string()
            }
            Self::Server { .. } | Self::Parse(_) => {
                "Something went wrong on our end. Please try again later.".to_string()
            }
            Self::Api { message, .. } => non_generic(message)
                .unwrap_or("Please check your input and try again.")
                .to_string(),
        }
    }

    /// Per-field validation messages from a 400 body, keyed by field name.
    ///
    /// Nested objects (`{"user_errors": {"email": [..]}}`) are flattened to
    /// their inner field names.
    #[must_use]
    pub fn field_errors(&self) -> BTreeMap<String, String> {
        let mut out = BTreeMap::new();
        if let Self::Api {
            details: Some(Value::Object(map)),
            ..
        } = self
        {
            collect_field_errors(map, &mut out);
        }
        out
    }
}

/// Skip the `HTTP <status>` fallback so friendlier text is used instead.
fn non_generic(message: &str) -> Option<&str> {
    if message.is_empty() || message.starts_with("HTTP ") {
        None
    } else {
        Some(message)
    }
}

const META_KEYS: &[&str] = &["message", "error", "detail", "code", "details", "non_field_errors"];

/// Pick the most useful human message out of an error body.
///
/// Order: `message`, `error`, `detail`, the first field error as
/// `"field: msg"`, then `non_field_errors`.
///
/// "First" is by field name, not body position: field errors are
/// collected into a sorted map, so several of them resolve to the
/// alphabetically smallest field name.
fn extract_message(body: &Value) -> Option<String> {
    match body {
        Value::Object(map) => {
            for key in ["message", "error", "detail"] {
                if let Some(text) = map.get(key).and_then(first_text) {
                    return Some(text);
                }
            }
            let mut fields = BTreeMap::new();
            collect_field_errors(map, &mut fields);
            if let Some((field, msg)) = fields.into_iter().next() {
                return Some(format!("{field}: {msg}"));
            }
            map.get("non_field_errors").and_then(first_text)
        }
        Value::Array(_) | Value::String(_) => first_text(body),
        _ => None,
    }
}

fn collect_field_errors(map: &serde_json::Map<String, Value>, out: &mut BTreeMap<String, String>) {
    for (key, value) in map {
        if META_KEYS.contains(&key.as_str()) {
            continue;
        }
        match value {
            Value::Object(inner) => collect_field_errors(inner, out),
            other => {
                if let Some(text) = first_text(other) {
                    out.entry(key.clone()).or_insert(text);
                }
            }
        }
    }
}

fn first_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Array(items) => items.iter().find_map(first_text),
        _ => None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn classify(status: u16, body: &str) -> BackendError {
        BackendError::from_response(StatusCode::from_u16(status).unwrap(), body, None)
    }

    #[test]
    fn test_message_preference_order() {
        let err = classify(400, r#"{"detail": "d", "error": "e", "message": "m"}"#);
        assert_eq!(err.to_string(), "API error (400): m");
        let err = classify(400, r#"{"detail": "d", "error": "e"}"#);
        assert!(err.to_string().ends_with(": e"));
        let err = classify(400, r#"{"detail": "d"}"#);
        assert!(err.to_string().ends_with(": d"));
    }

    #[test]
    fn test_field_error_then_non_field_errors() {
        let err = classify(400, r#"{"email": ["Enter a valid email address."]}"#);
        assert_eq!(err.user_message(), "email: Enter a valid email address.");

        let err = classify(
            400,
            r#"{"species": ["This field is required."], "common_name": ["Too long."]}"#,
        );
        assert_eq!(err.user_message(), "common_name: Too long.");

        let err = classify(400, r#"{"non_field_errors": ["Invalid shipping address"]}"#);
        assert_eq!(err.user_message(), "Invalid shipping address");
    }

    #[test]
    fn test_non_json_body_falls_back_to_status() {
        let err = classify(502, "<html>Bad Gateway</html>");
        assert!(matches!(err, BackendError::Server { status: 502, ref message } if message == "HTTP 502"));
        assert_eq!(
            err.user_message(),
            "Something went wrong on our end. Please try again later."
        );
    }

    #[test]
    fn test_unauthorized_with_token_expired_code() {
        let err = classify(401, r#"{"error": "Token has expired", "code": "TOKEN_EXPIRED"}"#);
        assert!(err.is_unauthorized());
        assert!(err.is_token_expired());
        assert_eq!(err.status(), Some(401));
        assert_eq!(
            err.user_message(),
            "Your session has expired. Please log in again."
        );
    }

    #[test]
    fn test_unauthorized_invalid_credentials_keeps_backend_message() {
        let err = classify(401, r#"{"error": "Invalid credentials"}"#);
        assert!(!err.is_token_expired());
        assert_eq!(err.user_message(), "Invalid credentials");
    }

    #[test]
    fn test_status_classes() {
        assert!(matches!(classify(403, "{}"), BackendError::Forbidden(_)));
        assert!(classify(404, "").is_not_found());
        assert!(matches!(
            BackendError::from_response(StatusCode::TOO_MANY_REQUESTS, "", Some(30)),
            BackendError::RateLimited {
                retry_after: Some(30)
            }
        ));
        assert!(matches!(
            classify(409, r#"{"error": "conflict"}"#),
            BackendError::Api { status: 409, .. }
        ));
    }

    #[test]
    fn test_forbidden_default_message() {
        assert_eq!(classify(403, "").user_message(), "Access denied.");
        assert_eq!(
            classify(403, r#"{"error": "Cannot change user roles"}"#).user_message(),
            "Cannot change user roles"
        );
    }

    #[test]
    fn test_field_errors_flatten_nested() {
        let err = classify(
            400,
            r#"{"user_errors": {"email": ["taken"]}, "profile_errors": {"preferred_tank_size": ["A valid integer is required."]}}"#,
        );
        let fields = err.field_errors();
        assert_eq!(fields.get("email").map(String::as_str), Some("taken"));
        assert_eq!(
            fields.get("preferred_tank_size").map(String::as_str),
            Some("A valid integer is required.")
        );
    }
}
