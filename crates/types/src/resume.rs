//! Typed resume record: one named field group per wizard step.
//!
//! Every top-level group is replaced wholesale by a [`ResumePatch`] variant,
//! so two steps can only clobber each other if they deliberately emit the same
//! variant. The collection helpers on [`ResumeRecord`] compute the next value
//! of a whole group from the current one, which is how step widgets turn a
//! single edit ("remove description point 2") into a shallow patch.

pub mod validation;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::record::AggregateRecord;

/// Template used when neither the seed nor the configuration names one.
pub const DEFAULT_TEMPLATE_NAME: &str = "modern";

/// Inline bold markers keyed by phrase.
pub type BoldMarkers = IndexMap<String, bool>;

/// Inline hyperlinks keyed by phrase.
pub type HyperlinkMap = IndexMap<String, String>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeRecord {
    pub template_name: String,
    pub personal_details: PersonalDetails,
    pub objective: Objective,
    pub education: Vec<EducationEntry>,
    pub work_experiences: Vec<WorkExperience>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other_experiences: Option<Vec<WorkExperience>>,
    pub skills_and_certificates: SkillsAndCertificates,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonalDetails {
    pub name: String,
    pub email: String,
    pub mobile: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github: Option<String>,
    pub address: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Objective {
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bolds: Option<BoldMarkers>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hyperlinks: Option<HyperlinkMap>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EducationEntry {
    pub college: String,
    pub location: String,
    pub degree: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub major: Option<String>,
    pub from: String,
    pub to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cgpa: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bolds: Option<BoldMarkers>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hyperlinks: Option<HyperlinkMap>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkExperience {
    pub title: String,
    pub sub_title: String,
    pub address: String,
    pub start_date: String,
    pub end_date: String,
    pub description: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bolds: Option<BoldMarkers>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hyperlinks: Option<HyperlinkMap>,
}

impl Default for WorkExperience {
    /// A blank experience starts with one empty description point to fill in.
    fn default() -> Self {
        Self {
            title: String::new(),
            sub_title: String::new(),
            address: String::new(),
            start_date: String::new(),
            end_date: String::new(),
            description: vec![String::new()],
            bolds: None,
            hyperlinks: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillsAndCertificates {
    pub items: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bolds: Option<BoldMarkers>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hyperlinks: Option<HyperlinkMap>,
}

impl Default for ResumeRecord {
    fn default() -> Self {
        Self::with_template(DEFAULT_TEMPLATE_NAME)
    }
}

/// Replacement for exactly one top-level group of a [`ResumeRecord`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "key", content = "value", rename_all = "snake_case")]
pub enum ResumePatch {
    TemplateName(String),
    PersonalDetails(PersonalDetails),
    Objective(Objective),
    Education(Vec<EducationEntry>),
    WorkExperiences(Vec<WorkExperience>),
    OtherExperiences(Option<Vec<WorkExperience>>),
    SkillsAndCertificates(SkillsAndCertificates),
}

impl ResumePatch {
    /// Serialized name of the group this patch replaces.
    pub fn key(&self) -> &'static str {
        match self {
            Self::TemplateName(_) => "template_name",
            Self::PersonalDetails(_) => "personal_details",
            Self::Objective(_) => "objective",
            Self::Education(_) => "education",
            Self::WorkExperiences(_) => "work_experiences",
            Self::OtherExperiences(_) => "other_experiences",
            Self::SkillsAndCertificates(_) => "skills_and_certificates",
        }
    }
}

impl From<ResumePatch> for Vec<ResumePatch> {
    fn from(patch: ResumePatch) -> Self {
        vec![patch]
    }
}

impl AggregateRecord for ResumeRecord {
    type Patch = Vec<ResumePatch>;

    fn merge(&mut self, patch: Self::Patch) {
        for group in patch {
            match group {
                ResumePatch::TemplateName(value) => self.template_name = value,
                ResumePatch::PersonalDetails(value) => self.personal_details = value,
                ResumePatch::Objective(value) => self.objective = value,
                ResumePatch::Education(value) => self.education = value,
                ResumePatch::WorkExperiences(value) => self.work_experiences = value,
                ResumePatch::OtherExperiences(value) => self.other_experiences = value,
                ResumePatch::SkillsAndCertificates(value) => self.skills_and_certificates = value,
            }
        }
    }

    fn patch_keys(patch: &Self::Patch) -> Vec<String> {
        patch.iter().map(|group| group.key().to_string()).collect()
    }
}

impl ResumeRecord {
    /// Seed record: one blank education entry, one blank experience, no skills.
    pub fn with_template(template_name: impl Into<String>) -> Self {
        Self {
            template_name: template_name.into(),
            personal_details: PersonalDetails::default(),
            objective: Objective::default(),
            education: vec![EducationEntry::default()],
            work_experiences: vec![WorkExperience::default()],
            other_experiences: None,
            skills_and_certificates: SkillsAndCertificates::default(),
        }
    }

    pub fn add_education(&self) -> ResumePatch {
        let mut entries = self.education.clone();
        entries.push(EducationEntry::default());
        ResumePatch::Education(entries)
    }

    /// Removes an education entry. Out-of-range indices leave the list as is.
    pub fn remove_education(&self, index: usize) -> ResumePatch {
        ResumePatch::Education(without_index(&self.education, index))
    }

    pub fn add_work_experience(&self) -> ResumePatch {
        let mut experiences = self.work_experiences.clone();
        experiences.push(WorkExperience::default());
        ResumePatch::WorkExperiences(experiences)
    }

    /// Removes an experience; the last remaining experience is kept.
    pub fn remove_work_experience(&self, index: usize) -> ResumePatch {
        if self.work_experiences.len() <= 1 {
            return ResumePatch::WorkExperiences(self.work_experiences.clone());
        }
        ResumePatch::WorkExperiences(without_index(&self.work_experiences, index))
    }

    pub fn add_other_experience(&self) -> ResumePatch {
        let mut experiences = self.other_experiences.clone().unwrap_or_default();
        experiences.push(WorkExperience::default());
        ResumePatch::OtherExperiences(Some(experiences))
    }

    /// Removes an other experience; removing the last one clears the group.
    pub fn remove_other_experience(&self, index: usize) -> ResumePatch {
        let remaining = without_index(self.other_experiences.as_deref().unwrap_or_default(), index);
        ResumePatch::OtherExperiences((!remaining.is_empty()).then_some(remaining))
    }

    pub fn add_description_point(&self, experience: usize) -> ResumePatch {
        self.edit_experience(experience, |entry| entry.description.push(String::new()))
    }

    pub fn update_description_point(&self, experience: usize, point: usize, text: impl Into<String>) -> ResumePatch {
        let text = text.into();
        self.edit_experience(experience, |entry| {
            if let Some(slot) = entry.description.get_mut(point) {
                *slot = text;
            }
        })
    }

    pub fn remove_description_point(&self, experience: usize, point: usize) -> ResumePatch {
        self.edit_experience(experience, |entry| {
            if point < entry.description.len() {
                entry.description.remove(point);
            }
        })
    }

    pub fn add_skill(&self) -> ResumePatch {
        let mut skills = self.skills_and_certificates.clone();
        skills.items.push(String::new());
        ResumePatch::SkillsAndCertificates(skills)
    }

    pub fn update_skill(&self, index: usize, text: impl Into<String>) -> ResumePatch {
        let mut skills = self.skills_and_certificates.clone();
        if let Some(slot) = skills.items.get_mut(index) {
            *slot = text.into();
        }
        ResumePatch::SkillsAndCertificates(skills)
    }

    pub fn remove_skill(&self, index: usize) -> ResumePatch {
        let mut skills = self.skills_and_certificates.clone();
        skills.items = without_index(&skills.items, index);
        ResumePatch::SkillsAndCertificates(skills)
    }

    fn edit_experience(&self, index: usize, edit: impl FnOnce(&mut WorkExperience)) -> ResumePatch {
        let mut experiences = self.work_experiences.clone();
        if let Some(entry) = experiences.get_mut(index) {
            edit(entry);
        }
        ResumePatch::WorkExperiences(experiences)
    }
}

fn without_index<T: Clone>(items: &[T], index: usize) -> Vec<T> {
    items
        .iter()
        .enumerate()
        .filter(|(position, _)| *position != index)
        .map(|(_, item)| item.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_matches_blank_form() {
        let record = ResumeRecord::default();

        assert_eq!(record.template_name, "modern");
        assert_eq!(record.education.len(), 1);
        assert_eq!(record.work_experiences.len(), 1);
        assert_eq!(record.work_experiences[0].description, vec![String::new()]);
        assert!(record.skills_and_certificates.items.is_empty());
        assert!(record.other_experiences.is_none());
    }

    #[test]
    fn merge_replaces_whole_group_only() {
        let mut record = ResumeRecord::default();
        record.merge(
            ResumePatch::PersonalDetails(PersonalDetails {
                name: "Ada".into(),
                ..PersonalDetails::default()
            })
            .into(),
        );
        record.merge(vec![ResumePatch::PersonalDetails(PersonalDetails {
            email: "ada@example.com".into(),
            ..PersonalDetails::default()
        })]);

        assert_eq!(record.personal_details.name, "");
        assert_eq!(record.personal_details.email, "ada@example.com");
        assert_eq!(record.template_name, "modern");
        assert_eq!(record.education, vec![EducationEntry::default()]);
    }

    #[test]
    fn last_experience_cannot_be_removed() {
        let record = ResumeRecord::default();
        assert_eq!(record.remove_work_experience(0), ResumePatch::WorkExperiences(record.work_experiences.clone()));

        let mut record = record;
        record.merge(record.add_work_experience().into());
        let ResumePatch::WorkExperiences(remaining) = record.remove_work_experience(0) else {
            panic!("expected work experience patch");
        };
        assert_eq!(remaining.len(), 1);
    }

    #[test]
    fn description_point_helpers_edit_one_experience() {
        let mut record = ResumeRecord::default();
        record.merge(record.update_description_point(0, 0, "Shipped the thing").into());
        record.merge(record.add_description_point(0).into());
        record.merge(record.update_description_point(0, 1, "Led the team").into());
        record.merge(record.remove_description_point(0, 0).into());

        assert_eq!(record.work_experiences[0].description, vec!["Led the team".to_string()]);
    }

    #[test]
    fn skill_helpers_round_out_the_list() {
        let mut record = ResumeRecord::default();
        record.merge(record.add_skill().into());
        record.merge(record.update_skill(0, "Rust").into());
        record.merge(record.add_skill().into());
        record.merge(record.remove_skill(1).into());

        assert_eq!(record.skills_and_certificates.items, vec!["Rust".to_string()]);
    }

    #[test]
    fn patch_keys_follow_serialized_names() {
        let patch = vec![ResumePatch::TemplateName("classic".into()), ResumePatch::OtherExperiences(None)];
        assert_eq!(ResumeRecord::patch_keys(&patch), vec!["template_name", "other_experiences"]);
    }

    #[test]
    fn deserializes_full_document_shape() {
        let document = serde_json::json!({
            "template_name": "modern",
            "personal_details": {"name": "Ada", "email": "ada@example.com", "mobile": "+15551234567", "address": "1 Main St"},
            "objective": {"description": "Build things", "bolds": {"things": true}},
            "education": [{"college": "MIT", "location": "Cambridge", "degree": "BSc", "from": "2010-09-01", "to": "2014-06-01"}],
            "work_experiences": [],
            "skills_and_certificates": {"items": ["Rust"]}
        });

        let record: ResumeRecord = serde_json::from_value(document).expect("deserialize resume");
        assert_eq!(record.personal_details.name, "Ada");
        assert_eq!(record.objective.bolds.as_ref().and_then(|bolds| bolds.get("things")), Some(&true));
        assert!(record.work_experiences.is_empty());
    }

    #[test]
    fn other_experiences_appear_and_clear() {
        let mut record = ResumeRecord::default();
        record.merge(record.add_other_experience().into());
        record.merge(record.add_other_experience().into());
        assert_eq!(record.other_experiences.as_ref().map(Vec::len), Some(2));

        record.merge(record.remove_other_experience(0).into());
        assert_eq!(record.other_experiences.as_ref().map(Vec::len), Some(1));
        record.merge(record.remove_other_experience(0).into());
        assert!(record.other_experiences.is_none());
    }
}
