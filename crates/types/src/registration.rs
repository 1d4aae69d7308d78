//! Open-record registration form: three steps over a [`JsonRecord`].
//!
//! Unlike the resume, this form keeps every answer as a flat top-level key
//! (`fullName`, `company`, ...), so each edit is a one-key [`JsonPatch`].

use crate::record::JsonRecord;
use crate::validation::has_meaningful_value;

pub const PERSONAL_INFO_STEP_ID: &str = "personal-info";
pub const WORK_INFO_STEP_ID: &str = "work-info";
pub const ADDITIONAL_INFO_STEP_ID: &str = "additional-info";

/// A selectable option: stored value plus display label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectOption {
    pub value: &'static str,
    pub label: &'static str,
}

const fn option(value: &'static str, label: &'static str) -> SelectOption {
    SelectOption { value, label }
}

pub const JOB_TITLE_OPTIONS: &[SelectOption] = &[
    option("developer", "Developer"),
    option("designer", "Designer"),
    option("manager", "Manager"),
    option("director", "Director"),
    option("other", "Other"),
];

pub const DEPARTMENT_OPTIONS: &[SelectOption] = &[
    option("engineering", "Engineering"),
    option("design", "Design"),
    option("product", "Product"),
    option("marketing", "Marketing"),
    option("sales", "Sales"),
    option("other", "Other"),
];

pub const CATEGORY_OPTIONS: &[SelectOption] = &[
    option("technology", "Technology"),
    option("finance", "Finance"),
    option("healthcare", "Healthcare"),
    option("education", "Education"),
    option("other", "Other"),
];

pub const LEVEL_OPTIONS: &[SelectOption] = &[
    option("beginner", "Beginner"),
    option("intermediate", "Intermediate"),
    option("advanced", "Advanced"),
    option("expert", "Expert"),
];

pub fn validate_personal_info(record: &JsonRecord) -> Option<String> {
    first_missing(
        record,
        &[
            ("fullName", "Full name is required"),
            ("email", "Email is required"),
            ("phone", "Phone number is required"),
        ],
    )
}

pub fn validate_work_info(record: &JsonRecord) -> Option<String> {
    first_missing(
        record,
        &[
            ("company", "Company name is required"),
            ("jobTitle", "Job title is required"),
            ("startDate", "Start date is required"),
        ],
    )
}

fn first_missing(record: &JsonRecord, required: &[(&str, &str)]) -> Option<String> {
    required
        .iter()
        .find(|(key, _)| !record.get(key).is_some_and(has_meaningful_value))
        .map(|(_, message)| message.to_string())
}
