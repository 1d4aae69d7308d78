//! Declarative field validation shared by every form schema.
//!
//! Step validators are plain functions of the record, but most of them boil
//! down to "this text field is required, between N and M characters, and
//! looks like an email". [`FieldRules`] captures those constraints once so
//! each form only has to walk its own slice of the record and label failures.

use chrono::{DateTime, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value as JsonValue;

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

/// Well-known text shapes checked after length and pattern rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextFormat {
    /// `local@domain.tld`
    Email,
    /// Absolute URI with a scheme.
    Uri,
    /// `YYYY-MM-DD` calendar date or an RFC 3339 timestamp.
    IsoDate,
}

/// Constraints attached to a single text field.
///
/// Patterns are borrowed from `Lazy<Regex>` statics so rule sets built once
/// never recompile them.
#[derive(Debug, Clone, Default)]
pub struct FieldRules {
    /// Whether non-blank text must be present.
    pub required: bool,
    /// Regular expression the text must match.
    pub pattern: Option<&'static Regex>,
    /// Minimum length in characters.
    pub min_length: Option<usize>,
    /// Maximum length in characters.
    pub max_length: Option<usize>,
    /// Structural format the text must satisfy.
    pub format: Option<TextFormat>,
}

impl FieldRules {
    pub fn required() -> Self {
        Self {
            required: true,
            ..Self::default()
        }
    }

    pub fn optional() -> Self {
        Self::default()
    }

    pub fn length(mut self, min_length: usize, max_length: usize) -> Self {
        self.min_length = Some(min_length);
        self.max_length = Some(max_length);
        self
    }

    pub fn pattern(mut self, pattern: &'static Regex) -> Self {
        self.pattern = Some(pattern);
        self
    }

    pub fn format(mut self, format: TextFormat) -> Self {
        self.format = Some(format);
        self
    }
}

/// Returns true when a JSON value carries user-supplied content.
///
/// Null, blank strings, and empty arrays or objects count as missing.
pub fn has_meaningful_value(value: &JsonValue) -> bool {
    match value {
        JsonValue::Null => false,
        JsonValue::String(text) => !text.trim().is_empty(),
        JsonValue::Array(items) => !items.is_empty(),
        JsonValue::Object(map) => !map.is_empty(),
        _ => true,
    }
}

/// Checks a labelled text field, prefixing any failure with `label`.
///
/// Blank text is treated as missing: it fails required fields and skips the
/// remaining rules for optional ones.
pub fn check_text(label: &str, value: Option<&str>, rules: &FieldRules) -> Result<(), String> {
    match value.map(str::trim).filter(|text| !text.is_empty()) {
        None if rules.required => Err(format!("{label}: is required")),
        None => Ok(()),
        Some(text) => validate_text(text, rules).map_err(|message| format!("{label}: {message}")),
    }
}

/// Validates present text against length, pattern, and format rules.
pub fn validate_text(text: &str, rules: &FieldRules) -> Result<(), String> {
    let length = text.chars().count();
    if let Some(min_length) = rules.min_length
        && length < min_length
    {
        return Err(format!("must be at least {min_length} characters"));
    }
    if let Some(max_length) = rules.max_length
        && length > max_length
    {
        return Err(format!("must be at most {max_length} characters"));
    }

    if let Some(pattern) = rules.pattern
        && !pattern.is_match(text)
    {
        return Err(format!("must match the pattern {}", pattern.as_str()));
    }

    match rules.format {
        Some(TextFormat::Email) if !EMAIL_PATTERN.is_match(text) => Err("must be a valid email".to_string()),
        Some(TextFormat::Uri) if !is_absolute_uri(text) => Err("must be a valid uri".to_string()),
        Some(TextFormat::IsoDate) if !is_iso_date(text) => Err("must be a valid ISO 8601 date".to_string()),
        _ => Ok(()),
    }
}

/// Returns true for `YYYY-MM-DD` calendar dates and RFC 3339 timestamps.
pub fn is_iso_date(text: &str) -> bool {
    NaiveDate::parse_from_str(text, "%Y-%m-%d").is_ok() || DateTime::parse_from_rfc3339(text).is_ok()
}

fn is_absolute_uri(text: &str) -> bool {
    url::Url::parse(text).is_ok_and(|parsed| !parsed.cannot_be_a_base() || parsed.scheme() == "mailto")
}
