//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Content hash of admin.css, computed at build time.
///
/// Usage in templates: `{{ ""|css_hash }}`
#[askama::filter_fn]
pub fn css_hash(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<&'static str> {
    Ok(env!("CSS_HASH"))
}

/// Short date for list columns, e.g. `2026-03-14`.
///
/// Usage in templates: `{{ order.created_at|date }}`
#[askama::filter_fn]
pub fn date(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    let value = value.to_string();
    Ok(value.get(..10).unwrap_or(&value).to_string())
}
