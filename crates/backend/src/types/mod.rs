//! Request and response bodies of the backend REST API.
//!
//! Response types are lenient: optional and blank fields default rather
//! than fail, and unknown fields are ignored, so a backend that adds a
//! column never breaks page rendering.

pub mod address;
pub mod admin;
pub mod article;
pub mod auth;
pub mod order;
pub mod product;

pub use address::*;
pub use admin::*;
pub use article::*;
pub use auth::*;
pub use order::*;
pub use product::*;

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer};

/// Field name to message, for rendering form errors next to inputs.
pub type FieldErrors = BTreeMap<&'static str, String>;

/// Treat `null` and blank strings as `None`.
pub(crate) fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

/// Treat `null` as an empty string.
pub(crate) fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

pub(crate) const fn default_true() -> bool {
    true
}

/// Add a "required" error when `value` is blank.
pub(crate) fn require(errors: &mut FieldErrors, field: &'static str, value: &str) {
    if value.trim().is_empty() {
        errors.insert(field, "This field is required.".to_string());
    }
}

/// Add an error when `value` is longer than `max` characters.
pub(crate) fn max_len(errors: &mut FieldErrors, field: &'static str, value: &str, max: usize) {
    if value.chars().count() > max {
        errors
            .entry(field)
            .or_insert_with(|| format!("Must be at most {max} characters."));
    }
}
