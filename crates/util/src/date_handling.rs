//! # Date Handling Utilities
//!
//! Date fields store ISO `YYYY-MM-DD` strings in the record and show a
//! friendlier form to the user. Parsing is strict: the text must name a real
//! calendar day, so `2023-02-29` is rejected rather than rolled over.

use chrono::{Datelike, NaiveDate};

const MONTH_ABBREVIATIONS: [&str; 12] = ["Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec"];

/// Parses a strict `YYYY-MM-DD` calendar date.
///
/// # Example
/// ```rust
/// use stepwise_util::date_handling::parse_iso_date;
///
/// assert!(parse_iso_date("2024-02-29").is_some());
/// assert!(parse_iso_date("2023-02-29").is_none());
/// assert!(parse_iso_date("2024-2-9").is_none());
/// ```
pub fn parse_iso_date(date_string: &str) -> Option<NaiveDate> {
    let trimmed = date_string.trim();
    let bytes = trimmed.as_bytes();
    if bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
        return None;
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").ok()
}

/// Formats a date the way the record stores it.
pub fn to_iso_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Formats a stored date as `Mon D, YYYY`; unparsable input yields an empty string.
///
/// # Example
/// ```rust
/// use stepwise_util::date_handling::format_display_date;
///
/// assert_eq!(format_display_date("2024-01-05"), "Jan 5, 2024");
/// assert_eq!(format_display_date("not a date"), "");
/// ```
pub fn format_display_date(date_string: &str) -> String {
    parse_iso_date(date_string)
        .map(|date| {
            let month = MONTH_ABBREVIATIONS[date.month0() as usize];
            format!("{month} {}, {}", date.day(), date.year())
        })
        .unwrap_or_default()
}
