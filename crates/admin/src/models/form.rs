//! Form parsing helpers and inline form feedback.
//!
//! Admin forms post every field as text. Values are parsed here so a typo
//! becomes a field message instead of a rejected request.

use std::collections::BTreeMap;
use std::str::FromStr;

use freshwater_backend::{BackendError, FieldErrors};

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

/// Whether a backend failure belongs on the form rather than an error page.
///
/// Validation problems (4xx other than auth and not-found) are shown inline.
#[must_use]
pub fn is_inline(error: &BackendError) -> bool {
    matches!(error, BackendError::Api { status, .. } if *status < 500)
}

/// One `<option>` of a dropdown.
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

/// Options for `choices`, marking the one equal to `selected`.
pub fn options<'a>(
    choices: impl IntoIterator<Item = (&'a str, &'a str)>,
    selected: Option<&str>,
) -> Vec<SelectOption> {
    choices
        .into_iter()
        .map(|(value, label)| SelectOption::new(value, label, selected == Some(value)))
        .collect()
}

/// A submitted form as ordered key/value pairs.
///
/// `axum::Form` cannot collect repeated keys into a struct, and a product's
/// category checkboxes post `category_ids` once per ticked box.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData(Vec<(String, String)>);

impl FormData {
    #[must_use]
    pub const fn new(pairs: Vec<(String, String)>) -> Self {
        Self(pairs)
    }

    /// First value for `key`, or an empty string.
    #[must_use]
    pub fn get(&self, key: &str) -> &str {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map_or("", |(_, v)| v.as_str())
    }

    /// Trimmed owned copy of [`Self::get`].
    #[must_use]
    pub fn text(&self, key: &str) -> String {
        self.get(key).trim().to_string()
    }

    /// Every non-blank value for `key`, in submission order.
    #[must_use]
    pub fn all(&self, key: &str) -> Vec<String> {
        self.0
            .iter()
            .filter(|(k, v)| k == key && !v.trim().is_empty())
            .map(|(_, v)| v.trim().to_string())
            .collect()
    }

    /// Whether a checkbox named `key` was ticked.
    #[must_use]
    pub fn checked(&self, key: &str) -> bool {
        self.0.iter().any(|(k, v)| k == key && checkbox(Some(v.as_str())))
    }
}

/// An HTML checkbox posts `on` when ticked and nothing otherwise.
#[must_use]
pub fn checkbox(value: Option<&str>) -> bool {
    matches!(value, Some("on" | "true" | "1"))
}

/// Parse a field that must be present.
///
/// Records `message` against `field` and returns `fallback` when the value is
/// blank or unparseable.
pub fn parse_required<T: FromStr>(
    errors: &mut FieldErrors,
    field: &'static str,
    raw: &str,
    fallback: T,
    message: &str,
) -> T {
    match raw.trim().parse() {
        Ok(value) => value,
        Err(_) => {
            errors.insert(field, message.to_string());
            fallback
        }
    }
}

/// Parse a field that may be left blank.
pub fn parse_optional<T: FromStr>(
    errors: &mut FieldErrors,
    field: &'static str,
    raw: &str,
    message: &str,
) -> Option<T> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            errors.insert(field, message.to_string());
            None
        }
    }
}

/// Lenient page number from the query string.
#[must_use]
pub fn page_number(raw: Option<&str>) -> u32 {
    raw.and_then(|p| p.trim().parse::<u32>().ok())
        .unwrap_or(1)
        .max(1)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use freshwater_core::{OrderStatus, Price};

    use super::*;

    #[test]
    fn test_backend_field_errors_are_kept() {
        let error = BackendError::Api {
            status: 400,
            message: "slug: category with this slug already exists.".to_string(),
            details: Some(serde_json::json!({
                "slug": ["category with this slug already exists."]
            })),
        };
        assert!(is_inline(&error));
        let errors = FormErrors::from_backend(&error);
        assert!(errors.field("slug").is_some());
        assert!(errors.field("name").is_none());
        assert!(!errors.is_empty());
    }

    #[test]
    fn test_server_errors_are_not_inline() {
        assert!(!is_inline(&BackendError::Server {
            status: 500,
            message: "boom".to_string()
        }));
        assert!(!is_inline(&BackendError::Forbidden("no".to_string())));
    }

    #[test]
    fn test_parse_required_and_optional() {
        let mut errors = FieldErrors::new();
        let price: Price = parse_required(&mut errors, "price", "12.50", Price::ZERO, "bad");
        assert_eq!(price, Price::from_cents(1250));
        let stock: u32 = parse_required(&mut errors, "stock_quantity", "-3", 0, "Whole number");
        assert_eq!(stock, 0);
        assert_eq!(errors.get("stock_quantity").map(String::as_str), Some("Whole number"));

        let lifespan: Option<u32> = parse_optional(&mut errors, "lifespan_years", "  ", "bad");
        assert!(lifespan.is_none());
        let size: Option<u32> = parse_optional(&mut errors, "max_size_inches", "big", "Number");
        assert!(size.is_none());
        assert!(errors.contains_key("max_size_inches"));
    }

    #[test]
    fn test_negative_price_rejected() {
        let mut errors = FieldErrors::new();
        let _: Price = parse_required(&mut errors, "price", "-1.00", Price::ZERO, "Invalid price");
        assert!(errors.contains_key("price"));
    }

    #[test]
    fn test_options_mark_selection() {
        let opts = options(
            OrderStatus::ALL.iter().map(|s| (s.as_str(), s.label())),
            Some("shipped"),
        );
        assert_eq!(opts.len(), OrderStatus::ALL.len());
        assert_eq!(opts.iter().filter(|o| o.selected).count(), 1);
        assert!(opts.iter().any(|o| o.value == "shipped" && o.selected));
    }

    #[test]
    fn test_form_data_repeated_keys() {
        let form = FormData::new(vec![
            ("species_name".to_string(), " Neon Tetra ".to_string()),
            ("category_ids".to_string(), "a".to_string()),
            ("category_ids".to_string(), String::new()),
            ("category_ids".to_string(), "b".to_string()),
            ("is_available".to_string(), "on".to_string()),
        ]);
        assert_eq!(form.text("species_name"), "Neon Tetra");
        assert_eq!(form.all("category_ids"), vec!["a".to_string(), "b".to_string()]);
        assert!(form.checked("is_available"));
        assert!(!form.checked("is_active"));
        assert_eq!(form.get("missing"), "");
    }

    #[test]
    fn test_checkbox_and_page_number() {
        assert!(checkbox(Some("on")));
        assert!(!checkbox(None));
        assert_eq!(page_number(Some("3")), 3);
        assert_eq!(page_number(Some("0")), 1);
        assert_eq!(page_number(Some("abc")), 1);
        assert_eq!(page_number(None), 1);
    }
}
