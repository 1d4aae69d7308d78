//! Step sequences for the bundled forms.

use stepwise_types::{
    JsonRecord, ResumeRecord,
    registration::{self, ADDITIONAL_INFO_STEP_ID, PERSONAL_INFO_STEP_ID, WORK_INFO_STEP_ID},
    resume::validation as resume_validation,
};

use crate::step::StepDefinition;

pub const PERSONAL_DETAILS_STEP_ID: &str = "personal-details";
pub const OBJECTIVE_STEP_ID: &str = "objective";
pub const EDUCATION_STEP_ID: &str = "education";
pub const WORK_EXPERIENCE_STEP_ID: &str = "work-experience";
pub const SKILLS_STEP_ID: &str = "skills-and-certificates";

/// The five resume steps, each validating only its own group.
pub fn resume_steps() -> Vec<StepDefinition<ResumeRecord>> {
    vec![
        StepDefinition::new(PERSONAL_DETAILS_STEP_ID, "Personal Details").validator(resume_validation::validate_personal_details),
        StepDefinition::new(OBJECTIVE_STEP_ID, "Objective").validator(resume_validation::validate_objective),
        StepDefinition::new(EDUCATION_STEP_ID, "Education").validator(resume_validation::validate_education),
        StepDefinition::new(WORK_EXPERIENCE_STEP_ID, "Work Experience").validator(resume_validation::validate_work_experiences),
        StepDefinition::new(SKILLS_STEP_ID, "Skills & Certificates").validator(resume_validation::validate_skills_and_certificates),
    ]
}

/// The three registration steps; the last one is optional and has no validator.
pub fn registration_steps() -> Vec<StepDefinition<JsonRecord>> {
    vec![
        StepDefinition::new(PERSONAL_INFO_STEP_ID, "Personal Information")
            .description("Tell us about yourself")
            .validator(registration::validate_personal_info),
        StepDefinition::new(WORK_INFO_STEP_ID, "Work Information")
            .description("Your work details")
            .validator(registration::validate_work_info),
        StepDefinition::new(ADDITIONAL_INFO_STEP_ID, "Additional Information").description("Other relevant details"),
    ]
}
