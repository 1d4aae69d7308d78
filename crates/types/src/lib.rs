//! Shared definitions for Stepwise wizards.
//!
//! This crate holds everything a presentation layer and the navigation engine
//! need to agree on without depending on each other: the aggregate record
//! contract, navigation outcomes and change events, declarative field
//! validation, and the two bundled form schemas (resume and registration).

pub mod navigation;
pub mod record;
pub mod registration;
pub mod resume;
pub mod validation;

pub use navigation::{AdvanceOutcome, JumpOutcome, NavigatorEvent, StepStatus};
pub use record::{AggregateRecord, JsonPatch, JsonRecord};
pub use resume::{
    EducationEntry, Objective, PersonalDetails, ResumePatch, ResumeRecord, SkillsAndCertificates, WorkExperience,
};
pub use validation::{FieldRules, TextFormat, check_text, has_meaningful_value, validate_text};
