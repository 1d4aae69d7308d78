//! Field value producers.
//!
//! A producer turns raw user input into the value a step writes back into the
//! record, and renders the stored value for display. Producers hold no state
//! of their own; the record stays the source of truth and a step decides
//! which key a produced value lands under.

use stepwise_types::registration::SelectOption;

use crate::date_handling::{format_display_date, parse_iso_date, to_iso_date};

/// Contract shared by every field widget.
pub trait FieldProducer {
    type Value;

    fn label(&self) -> &str;

    fn is_required(&self) -> bool;

    /// Normalizes raw input. `Ok(None)` means the user cleared the field.
    fn produce(&self, raw: &str) -> Result<Option<Self::Value>, String>;

    /// Renders a stored value for display.
    fn display(&self, value: &Self::Value) -> String;

    /// Shown in place of a blank value.
    fn hint(&self) -> Option<String> {
        None
    }
}

/// Free text; surrounding whitespace is trimmed.
#[derive(Debug, Clone)]
pub struct TextField {
    pub label: String,
    pub required: bool,
    pub placeholder: Option<String>,
}

impl TextField {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            required: false,
            placeholder: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }
}

impl FieldProducer for TextField {
    type Value = String;

    fn label(&self) -> &str {
        &self.label
    }

    fn is_required(&self) -> bool {
        self.required
    }

    fn produce(&self, raw: &str) -> Result<Option<String>, String> {
        let trimmed = raw.trim();
        Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
    }

    fn display(&self, value: &String) -> String {
        value.clone()
    }

    fn hint(&self) -> Option<String> {
        self.placeholder.clone()
    }
}

/// Calendar date stored as `YYYY-MM-DD`.
#[derive(Debug, Clone)]
pub struct DateField {
    pub label: String,
    pub required: bool,
}

impl DateField {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            required: false,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

impl FieldProducer for DateField {
    type Value = String;

    fn label(&self) -> &str {
        &self.label
    }

    fn is_required(&self) -> bool {
        self.required
    }

    fn produce(&self, raw: &str) -> Result<Option<String>, String> {
        if raw.trim().is_empty() {
            return Ok(None);
        }
        parse_iso_date(raw)
            .map(|date| Some(to_iso_date(date)))
            .ok_or_else(|| format!("{}: enter a date as YYYY-MM-DD", self.label))
    }

    fn display(&self, value: &String) -> String {
        format_display_date(value)
    }

    fn hint(&self) -> Option<String> {
        Some("YYYY-MM-DD".to_string())
    }
}

/// Phone number stored as the country code followed by ten digits.
#[derive(Debug, Clone)]
pub struct PhoneField {
    pub label: String,
    pub required: bool,
    pub country_code: String,
}

impl PhoneField {
    pub fn new(label: impl Into<String>, country_code: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            required: false,
            country_code: country_code.into(),
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

impl FieldProducer for PhoneField {
    type Value = String;

    fn label(&self) -> &str {
        &self.label
    }

    fn is_required(&self) -> bool {
        self.required
    }

    fn produce(&self, raw: &str) -> Result<Option<String>, String> {
        let local = raw.trim().strip_prefix(self.country_code.as_str()).unwrap_or(raw);
        let digits: String = local.chars().filter(char::is_ascii_digit).take(10).collect();
        match digits.len() {
            0 => Ok(None),
            10 => Ok(Some(format!("{}{digits}", self.country_code))),
            _ => Err("Please enter a valid phone number".to_string()),
        }
    }

    fn display(&self, value: &String) -> String {
        let local = value.strip_prefix(self.country_code.as_str()).unwrap_or(value);
        format!("{} {}", self.country_code, format_phone_number(local))
    }
}

/// Formats digits as `(XXX) XXX-XXXX`, progressively for partial input.
pub fn format_phone_number(input: &str) -> String {
    let digits: String = input.chars().filter(char::is_ascii_digit).take(10).collect();
    match digits.len() {
        0..=3 => digits,
        4..=6 => format!("({}) {}", &digits[..3], &digits[3..]),
        _ => format!("({}) {}-{}", &digits[..3], &digits[3..6], &digits[6..]),
    }
}

/// One of a fixed set of options, matched by value or label.
#[derive(Debug, Clone)]
pub struct SelectField {
    pub label: String,
    pub required: bool,
    pub options: &'static [SelectOption],
}

impl SelectField {
    pub fn new(label: impl Into<String>, options: &'static [SelectOption]) -> Self {
        Self {
            label: label.into(),
            required: false,
            options,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn option_labels(&self) -> Vec<&'static str> {
        self.options.iter().map(|option| option.label).collect()
    }
}

impl FieldProducer for SelectField {
    type Value = String;

    fn label(&self) -> &str {
        &self.label
    }

    fn is_required(&self) -> bool {
        self.required
    }

    fn produce(&self, raw: &str) -> Result<Option<String>, String> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        self.options
            .iter()
            .find(|option| option.value.eq_ignore_ascii_case(trimmed) || option.label.eq_ignore_ascii_case(trimmed))
            .map(|option| Some(option.value.to_string()))
            .ok_or_else(|| format!("{}: choose one of {}", self.label, self.option_labels().join(", ")))
    }

    fn display(&self, value: &String) -> String {
        self.options
            .iter()
            .find(|option| option.value == value.as_str())
            .map(|option| option.label.to_string())
            .unwrap_or_else(|| value.clone())
    }

    fn hint(&self) -> Option<String> {
        Some(self.option_labels().join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stepwise_types::registration::JOB_TITLE_OPTIONS;

    #[test]
    fn text_field_trims_and_clears() {
        let field = TextField::new("Full Name").required();
        assert_eq!(field.produce("  Ada  "), Ok(Some("Ada".to_string())));
        assert_eq!(field.produce("   "), Ok(None));
        assert!(field.is_required());
    }

    #[test]
    fn date_field_rejects_impossible_dates() {
        let field = DateField::new("Start Date");
        assert_eq!(field.produce("2024-02-29"), Ok(Some("2024-02-29".to_string())));
        assert!(field.produce("2023-02-29").is_err());
        assert_eq!(field.display(&"2024-02-29".to_string()), "Feb 29, 2024");
    }

    #[test]
    fn phone_field_formats_and_prefixes_country_code() {
        let field = PhoneField::new("Phone Number", "+1");
        assert_eq!(field.produce("(555) 123-4567"), Ok(Some("+15551234567".to_string())));
        assert_eq!(field.produce("+1 555 123 4567"), Ok(Some("+15551234567".to_string())));
        assert_eq!(field.produce("555-12"), Err("Please enter a valid phone number".to_string()));
        assert_eq!(field.produce(""), Ok(None));
        assert_eq!(field.display(&"+15551234567".to_string()), "+1 (555) 123-4567");
    }

    #[test]
    fn partial_phone_numbers_format_progressively() {
        assert_eq!(format_phone_number("55"), "55");
        assert_eq!(format_phone_number("55512"), "(555) 12");
        assert_eq!(format_phone_number("555123456789"), "(555) 123-4567");
    }

    #[test]
    fn select_field_matches_value_or_label() {
        let field = SelectField::new("Job Title", JOB_TITLE_OPTIONS).required();
        assert_eq!(field.produce("Developer"), Ok(Some("developer".to_string())));
        assert_eq!(field.produce("MANAGER"), Ok(Some("manager".to_string())));
        assert!(field.produce("astronaut").is_err());
        assert_eq!(field.display(&"director".to_string()), "Director");
    }

    #[test]
    fn hints_describe_blank_fields() {
        assert_eq!(TextField::new("Website").placeholder("https://example.com").hint().as_deref(), Some("https://example.com"));
        assert_eq!(TextField::new("Location").hint(), None);
        assert_eq!(DateField::new("Start Date").hint().as_deref(), Some("YYYY-MM-DD"));
        assert_eq!(
            SelectField::new("Job Title", JOB_TITLE_OPTIONS).hint().as_deref(),
            Some("Developer/Designer/Manager/Director/Other")
        );
        assert_eq!(PhoneField::new("Phone Number", "+1").hint(), None);
    }
}
