use anyhow::{Context, Result, bail};
use serde_json::{Value, json};
use stepwise_engine::{
    StepDefinition, resume_steps,
    forms::{EDUCATION_STEP_ID, OBJECTIVE_STEP_ID, PERSONAL_DETAILS_STEP_ID, SKILLS_STEP_ID, WORK_EXPERIENCE_STEP_ID},
};
use stepwise_types::{EducationEntry, PersonalDetails, ResumePatch, ResumeRecord, WorkExperience};
use stepwise_util::{DateField, FieldProducer, TextField};

use crate::form::{FormDefinition, ListTarget, Prompt, non_empty};

/// The five-step resume builder over a typed record.
#[derive(Debug, Clone)]
pub struct ResumeForm {
    pub template_name: String,
}

impl ResumeForm {
    pub fn new(template_name: impl Into<String>) -> Self {
        Self {
            template_name: template_name.into(),
        }
    }
}

impl FormDefinition for ResumeForm {
    type Record = ResumeRecord;

    fn name(&self) -> &'static str {
        "resume"
    }

    fn title(&self) -> &'static str {
        "Resume Builder"
    }

    fn steps(&self) -> Vec<StepDefinition<ResumeRecord>> {
        resume_steps()
    }

    fn seed(&self) -> ResumeRecord {
        ResumeRecord::with_template(self.template_name.as_str())
    }

    /// Each top-level key of `value` becomes one group replacement.
    fn patch_from_value(&self, value: Value) -> Result<Vec<ResumePatch>> {
        let map = match value {
            Value::Object(map) => map,
            Value::Null => return Ok(Vec::new()),
            other => bail!("resume updates must be a mapping of group names to values, got {other}"),
        };
        map.into_iter()
            .map(|(key, value)| {
                serde_json::from_value(json!({ "key": key, "value": value }))
                    .with_context(|| format!("invalid value for resume group '{key}'"))
            })
            .collect()
    }

    fn prompts(&self, step_id: &str, record: &ResumeRecord) -> Vec<Prompt<ResumeRecord>> {
        match step_id {
            PERSONAL_DETAILS_STEP_ID => personal_prompts(&record.personal_details),
            OBJECTIVE_STEP_ID => vec![Prompt::from_field(
                TextField::new("Objective").required().placeholder("50 to 500 characters"),
                non_empty(&record.objective.description).as_ref(),
                |record: &ResumeRecord, value| {
                    let mut objective = record.objective.clone();
                    objective.description = value.unwrap_or_default();
                    vec![ResumePatch::Objective(objective)]
                },
            )],
            EDUCATION_STEP_ID => record
                .education
                .iter()
                .enumerate()
                .flat_map(|(index, entry)| education_prompts(index, entry))
                .collect(),
            WORK_EXPERIENCE_STEP_ID => {
                let work = record.work_experiences.iter().map(|entry| (ExperienceList::Work, entry));
                let other = record.other_experiences.iter().flatten().map(|entry| (ExperienceList::Other, entry));
                work.enumerate()
                    .chain(other.enumerate())
                    .flat_map(|(index, (list, entry))| experience_prompts(list, index, entry))
                    .collect()
            }
            SKILLS_STEP_ID => skill_prompts(&record.skills_and_certificates.items),
            _ => Vec::new(),
        }
    }

    fn add_entry(&self, step_id: &str, list: ListTarget, record: &ResumeRecord) -> Option<Vec<ResumePatch>> {
        let patch = match (step_id, list) {
            (EDUCATION_STEP_ID, ListTarget::Entries) => record.add_education(),
            (WORK_EXPERIENCE_STEP_ID, ListTarget::Entries) => record.add_work_experience(),
            (WORK_EXPERIENCE_STEP_ID, ListTarget::Points(experience)) if experience < record.work_experiences.len() => {
                record.add_description_point(experience)
            }
            (WORK_EXPERIENCE_STEP_ID, ListTarget::Other) => record.add_other_experience(),
            (SKILLS_STEP_ID, ListTarget::Entries) => record.add_skill(),
            _ => return None,
        };
        Some(patch.into())
    }

    fn remove_entry(&self, step_id: &str, list: ListTarget, record: &ResumeRecord, index: usize) -> Option<Vec<ResumePatch>> {
        let patch = match (step_id, list) {
            (EDUCATION_STEP_ID, ListTarget::Entries) => record.remove_education(index),
            (WORK_EXPERIENCE_STEP_ID, ListTarget::Entries) => record.remove_work_experience(index),
            (WORK_EXPERIENCE_STEP_ID, ListTarget::Points(experience)) if experience < record.work_experiences.len() => {
                record.remove_description_point(experience, index)
            }
            (WORK_EXPERIENCE_STEP_ID, ListTarget::Other) => record.remove_other_experience(index),
            (SKILLS_STEP_ID, ListTarget::Entries) => record.remove_skill(index),
            _ => return None,
        };
        Some(patch.into())
    }
}

type Setter<T> = fn(&mut T, Option<String>);

fn personal_prompts(details: &PersonalDetails) -> Vec<Prompt<ResumeRecord>> {
    fn bind(field: TextField, current: Option<String>, set: Setter<PersonalDetails>) -> Prompt<ResumeRecord> {
        Prompt::from_field(field, current.as_ref(), move |record: &ResumeRecord, value| {
            let mut details = record.personal_details.clone();
            set(&mut details, value);
            vec![ResumePatch::PersonalDetails(details)]
        })
    }

    vec![
        bind(TextField::new("Full Name").required(), non_empty(&details.name), |details, value| {
            details.name = value.unwrap_or_default()
        }),
        bind(TextField::new("Email").required(), non_empty(&details.email), |details, value| {
            details.email = value.unwrap_or_default()
        }),
        bind(TextField::new("Mobile").required(), non_empty(&details.mobile), |details, value| {
            details.mobile = value.unwrap_or_default()
        }),
        bind(TextField::new("LinkedIn"), details.linkedin.clone(), |details, value| details.linkedin = value),
        bind(TextField::new("GitHub"), details.github.clone(), |details, value| details.github = value),
        bind(TextField::new("Address").required(), non_empty(&details.address), |details, value| {
            details.address = value.unwrap_or_default()
        }),
    ]
}

fn education_prompts(index: usize, entry: &EducationEntry) -> Vec<Prompt<ResumeRecord>> {
    fn bind<P>(index: usize, field: P, current: Option<String>, set: Setter<EducationEntry>) -> Prompt<ResumeRecord>
    where
        P: FieldProducer<Value = String> + Send + Sync + 'static,
    {
        Prompt::from_field(field, current.as_ref(), move |record: &ResumeRecord, value| {
            let mut entries = record.education.clone();
            if let Some(entry) = entries.get_mut(index) {
                set(entry, value);
            }
            vec![ResumePatch::Education(entries)]
        })
    }

    let label = |field: &str| format!("Education {} {field}", index + 1);
    vec![
        bind(index, TextField::new(label("college")).required(), non_empty(&entry.college), |entry, value| {
            entry.college = value.unwrap_or_default()
        }),
        bind(index, TextField::new(label("location")).required(), non_empty(&entry.location), |entry, value| {
            entry.location = value.unwrap_or_default()
        }),
        bind(index, TextField::new(label("degree")).required(), non_empty(&entry.degree), |entry, value| {
            entry.degree = value.unwrap_or_default()
        }),
        bind(index, TextField::new(label("major")), entry.major.clone(), |entry, value| entry.major = value),
        bind(index, DateField::new(label("from")).required(), non_empty(&entry.from), |entry, value| {
            entry.from = value.unwrap_or_default()
        }),
        bind(index, DateField::new(label("to")).required(), non_empty(&entry.to), |entry, value| {
            entry.to = value.unwrap_or_default()
        }),
        bind(index, TextField::new(label("CGPA")), entry.cgpa.clone(), |entry, value| entry.cgpa = value),
    ]
}

/// The two experience lists share one prompt layout.
#[derive(Debug, Clone, Copy)]
enum ExperienceList {
    Work,
    Other,
}

impl ExperienceList {
    fn entries(self, record: &ResumeRecord) -> Vec<WorkExperience> {
        match self {
            Self::Work => record.work_experiences.clone(),
            Self::Other => record.other_experiences.clone().unwrap_or_default(),
        }
    }

    fn patch(self, entries: Vec<WorkExperience>) -> ResumePatch {
        match self {
            Self::Work => ResumePatch::WorkExperiences(entries),
            Self::Other => ResumePatch::OtherExperiences(Some(entries)),
        }
    }

    fn label(self, index: usize, field: &str) -> String {
        match self {
            Self::Work => format!("Experience {} {field}", index + 1),
            Self::Other => format!("Other experience {} {field}", index + 1),
        }
    }
}

fn experience_prompts(list: ExperienceList, index: usize, entry: &WorkExperience) -> Vec<Prompt<ResumeRecord>> {
    fn bind<P>(
        list: ExperienceList,
        index: usize,
        field: P,
        current: Option<String>,
        set: Setter<WorkExperience>,
    ) -> Prompt<ResumeRecord>
    where
        P: FieldProducer<Value = String> + Send + Sync + 'static,
    {
        Prompt::from_field(field, current.as_ref(), move |record: &ResumeRecord, value| {
            let mut experiences = list.entries(record);
            if let Some(entry) = experiences.get_mut(index) {
                set(entry, value);
            }
            vec![list.patch(experiences)]
        })
    }

    let label = |field: &str| list.label(index, field);
    let mut prompts = vec![
        bind(list, index, TextField::new(label("title")).required(), non_empty(&entry.title), |entry, value| {
            entry.title = value.unwrap_or_default()
        }),
        bind(list, index, TextField::new(label("organisation")).required(), non_empty(&entry.sub_title), |entry, value| {
            entry.sub_title = value.unwrap_or_default()
        }),
        bind(list, index, TextField::new(label("address")).required(), non_empty(&entry.address), |entry, value| {
            entry.address = value.unwrap_or_default()
        }),
        bind(list, index, DateField::new(label("start date")).required(), non_empty(&entry.start_date), |entry, value| {
            entry.start_date = value.unwrap_or_default()
        }),
        bind(list, index, DateField::new(label("end date")).required(), non_empty(&entry.end_date), |entry, value| {
            entry.end_date = value.unwrap_or_default()
        }),
    ];

    for (point, text) in entry.description.iter().enumerate() {
        prompts.push(Prompt::from_field(
            TextField::new(label(&format!("point {}", point + 1))),
            non_empty(text).as_ref(),
            move |record: &ResumeRecord, value| match list {
                ExperienceList::Work => vec![record.update_description_point(index, point, value.unwrap_or_default())],
                ExperienceList::Other => {
                    let mut experiences = list.entries(record);
                    if let Some(slot) = experiences.get_mut(index).and_then(|entry| entry.description.get_mut(point)) {
                        *slot = value.unwrap_or_default();
                    }
                    vec![list.patch(experiences)]
                }
            },
        ));
    }
    prompts
}

fn skill_prompts(items: &[String]) -> Vec<Prompt<ResumeRecord>> {
    let mut prompts: Vec<_> = items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            Prompt::from_field(
                TextField::new(format!("Skill {}", index + 1)),
                non_empty(item).as_ref(),
                move |record: &ResumeRecord, value| vec![record.update_skill(index, value.unwrap_or_default())],
            )
        })
        .collect();

    let next = items.len();
    prompts.push(Prompt::from_field(
        TextField::new(format!("Skill {} (blank to finish)", next + 1)),
        None,
        move |record: &ResumeRecord, value| {
            let mut skills = record.skills_and_certificates.clone();
            skills.items.extend(value);
            vec![ResumePatch::SkillsAndCertificates(skills)]
        },
    ));
    prompts
}

#[cfg(test)]
mod tests {
    use super::*;
    use stepwise_types::AggregateRecord;

    #[test]
    fn update_documents_become_group_patches() {
        let form = ResumeForm::new("modern");
        let patch = form
            .patch_from_value(json!({
                "template_name": "classic",
                "skills_and_certificates": {"items": ["Rust"]}
            }))
            .expect("valid groups");

        let mut record = form.seed();
        record.merge(patch);
        assert_eq!(record.template_name, "classic");
        assert_eq!(record.skills_and_certificates.items, vec!["Rust".to_string()]);
        assert_eq!(record.education.len(), 1);
    }

    #[test]
    fn unknown_groups_are_reported_by_name() {
        let error = ResumeForm::new("modern").patch_from_value(json!({"hobbies": []})).expect_err("unknown group");
        assert!(error.to_string().contains("hobbies"));
    }

    #[test]
    fn education_prompts_edit_one_entry() {
        let form = ResumeForm::new("modern");
        let mut record = form.seed();
        record.merge(form.add_entry(EDUCATION_STEP_ID, ListTarget::Entries, &record).expect("education is a list"));

        let prompts = form.prompts(EDUCATION_STEP_ID, &record);
        assert_eq!(prompts.len(), 14);
        assert_eq!(prompts[7].label, "Education 2 college");

        let patch = prompts[7].apply(&record, "Trinity College").expect("text accepted");
        record.merge(patch);
        assert_eq!(record.education[0].college, "");
        assert_eq!(record.education[1].college, "Trinity College");

        assert!(prompts[4].apply(&record, "2023-02-30").is_err());
    }

    #[test]
    fn skills_grow_from_the_trailing_prompt() {
        let form = ResumeForm::new("modern");
        let mut record = form.seed();

        let prompts = form.prompts(SKILLS_STEP_ID, &record);
        assert_eq!(prompts.len(), 1);
        record.merge(prompts[0].apply(&record, "Rust").expect("text accepted"));

        let prompts = form.prompts(SKILLS_STEP_ID, &record);
        assert_eq!(prompts[0].current, "Rust");
        record.merge(prompts[1].apply(&record, "   ").expect("blank accepted"));
        assert_eq!(record.skills_and_certificates.items, vec!["Rust".to_string()]);
    }

    #[test]
    fn last_work_experience_cannot_be_removed() {
        let form = ResumeForm::new("modern");
        let mut record = form.seed();
        record.merge(form.remove_entry(WORK_EXPERIENCE_STEP_ID, ListTarget::Entries, &record, 0).expect("experience is a list"));
        assert_eq!(record.work_experiences.len(), 1);
        assert!(form.remove_entry(OBJECTIVE_STEP_ID, ListTarget::Entries, &record, 0).is_none());
    }

    #[test]
    fn description_points_are_added_edited_and_removed() {
        let form = ResumeForm::new("modern");
        let mut record = form.seed();
        record.merge(form.add_entry(WORK_EXPERIENCE_STEP_ID, ListTarget::Points(0), &record).expect("points are a list"));
        assert_eq!(record.work_experiences[0].description, vec![String::new(), String::new()]);

        let prompts = form.prompts(WORK_EXPERIENCE_STEP_ID, &record);
        assert_eq!(prompts.len(), 7);
        assert_eq!(prompts[6].label, "Experience 1 point 2");
        record.merge(prompts[6].apply(&record, "Shipped the compiler").expect("text accepted"));

        record.merge(form.remove_entry(WORK_EXPERIENCE_STEP_ID, ListTarget::Points(0), &record, 0).expect("points are a list"));
        assert_eq!(record.work_experiences[0].description, vec!["Shipped the compiler".to_string()]);
        assert!(form.add_entry(WORK_EXPERIENCE_STEP_ID, ListTarget::Points(3), &record).is_none());
        assert!(form.add_entry(EDUCATION_STEP_ID, ListTarget::Points(0), &record).is_none());
    }

    #[test]
    fn other_experiences_get_their_own_prompts() {
        let form = ResumeForm::new("modern");
        let mut record = form.seed();
        record.merge(form.add_entry(WORK_EXPERIENCE_STEP_ID, ListTarget::Other, &record).expect("other is a list"));

        let prompts = form.prompts(WORK_EXPERIENCE_STEP_ID, &record);
        assert_eq!(prompts.len(), 12);
        assert_eq!(prompts[6].label, "Other experience 1 title");
        record.merge(prompts[6].apply(&record, "Volunteer").expect("text accepted"));
        record.merge(prompts[11].apply(&record, "Taught COBOL").expect("text accepted"));

        let other = record.other_experiences.as_ref().expect("other experiences present");
        assert_eq!(other[0].title, "Volunteer");
        assert_eq!(other[0].description, vec!["Taught COBOL".to_string()]);
        assert_eq!(record.work_experiences[0].title, "");

        record.merge(form.remove_entry(WORK_EXPERIENCE_STEP_ID, ListTarget::Other, &record, 0).expect("other is a list"));
        assert!(record.other_experiences.is_none());
    }
}
