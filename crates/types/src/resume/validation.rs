//! Per-step validators for the resume wizard.
//!
//! Each validator inspects only its own group of the record and returns the
//! first failure as a human-readable message, labelled with the field path
//! (`education[1].degree: ...`) so the shell can point at the offending entry.

use once_cell::sync::Lazy;
use regex::Regex;

use super::{EducationEntry, ResumeRecord, WorkExperience};
use crate::validation::{FieldRules, TextFormat, check_text};

static MOBILE_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\+?[\d\s-]{10,}$").expect("mobile pattern compiles"));
static CGPA_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+(\.\d{1,2})?$").expect("cgpa pattern compiles"));

static NAME_RULES: Lazy<FieldRules> = Lazy::new(|| FieldRules::required().length(2, 100));
static EMAIL_RULES: Lazy<FieldRules> = Lazy::new(|| FieldRules::required().format(TextFormat::Email));
static MOBILE_RULES: Lazy<FieldRules> = Lazy::new(|| FieldRules::required().pattern(&MOBILE_PATTERN));
static PROFILE_URL_RULES: Lazy<FieldRules> = Lazy::new(|| FieldRules::optional().format(TextFormat::Uri));
static ADDRESS_RULES: Lazy<FieldRules> = Lazy::new(|| FieldRules::required().length(5, 200));
static OBJECTIVE_RULES: Lazy<FieldRules> = Lazy::new(|| FieldRules::required().length(50, 500));
static SHORT_TEXT_RULES: Lazy<FieldRules> = Lazy::new(|| FieldRules::required().length(2, 100));
static LOCATION_RULES: Lazy<FieldRules> = Lazy::new(|| FieldRules::required().length(2, 200));
static DATE_RULES: Lazy<FieldRules> = Lazy::new(|| FieldRules::required().format(TextFormat::IsoDate));
static CGPA_RULES: Lazy<FieldRules> = Lazy::new(|| FieldRules::optional().pattern(&CGPA_PATTERN));

pub fn validate_personal_details(record: &ResumeRecord) -> Option<String> {
    let details = &record.personal_details;
    check_text("personal_details.name", Some(&details.name), &NAME_RULES)
        .and_then(|_| check_text("personal_details.email", Some(&details.email), &EMAIL_RULES))
        .and_then(|_| check_text("personal_details.mobile", Some(&details.mobile), &MOBILE_RULES))
        .and_then(|_| check_text("personal_details.linkedin", details.linkedin.as_deref(), &PROFILE_URL_RULES))
        .and_then(|_| check_text("personal_details.github", details.github.as_deref(), &PROFILE_URL_RULES))
        .and_then(|_| check_text("personal_details.address", Some(&details.address), &ADDRESS_RULES))
        .err()
}

pub fn validate_objective(record: &ResumeRecord) -> Option<String> {
    check_text("objective.description", Some(&record.objective.description), &OBJECTIVE_RULES).err()
}

pub fn validate_education(record: &ResumeRecord) -> Option<String> {
    if record.education.is_empty() {
        return Some("education: at least one entry is required".to_string());
    }
    record
        .education
        .iter()
        .enumerate()
        .find_map(|(index, entry)| validate_education_entry(index, entry).err())
}

pub fn validate_work_experiences(record: &ResumeRecord) -> Option<String> {
    if record.work_experiences.is_empty() {
        return Some("work_experiences: at least one entry is required".to_string());
    }
    let primary = record
        .work_experiences
        .iter()
        .enumerate()
        .find_map(|(index, entry)| validate_experience("work_experiences", index, entry).err());
    primary.or_else(|| {
        record
            .other_experiences
            .iter()
            .flatten()
            .enumerate()
            .find_map(|(index, entry)| validate_experience("other_experiences", index, entry).err())
    })
}

pub fn validate_skills_and_certificates(record: &ResumeRecord) -> Option<String> {
    let has_item = record
        .skills_and_certificates
        .items
        .iter()
        .any(|item| !item.trim().is_empty());
    if has_item {
        None
    } else {
        Some("skills_and_certificates.items: at least one item is required".to_string())
    }
}

fn validate_education_entry(index: usize, entry: &EducationEntry) -> Result<(), String> {
    let label = |field: &str| format!("education[{index}].{field}");
    check_text(&label("college"), Some(&entry.college), &SHORT_TEXT_RULES)?;
    check_text(&label("location"), Some(&entry.location), &SHORT_TEXT_RULES)?;
    check_text(&label("degree"), Some(&entry.degree), &SHORT_TEXT_RULES)?;
    check_text(&label("from"), Some(&entry.from), &DATE_RULES)?;
    check_text(&label("to"), Some(&entry.to), &DATE_RULES)?;
    check_text(&label("cgpa"), entry.cgpa.as_deref(), &CGPA_RULES)
}

fn validate_experience(group: &str, index: usize, entry: &WorkExperience) -> Result<(), String> {
    let label = |field: &str| format!("{group}[{index}].{field}");
    check_text(&label("title"), Some(&entry.title), &SHORT_TEXT_RULES)?;
    check_text(&label("sub_title"), Some(&entry.sub_title), &SHORT_TEXT_RULES)?;
    check_text(&label("address"), Some(&entry.address), &LOCATION_RULES)?;
    check_text(&label("start_date"), Some(&entry.start_date), &DATE_RULES)?;
    check_text(&label("end_date"), Some(&entry.end_date), &DATE_RULES)?;
    if entry.description.iter().all(|point| point.trim().is_empty()) {
        return Err(format!("{}: at least one description point is required", label("description")));
    }
    Ok(())
}
