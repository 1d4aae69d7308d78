use anyhow::{Result, bail};
use indexmap::indexmap;
use serde_json::Value;
use stepwise_engine::{StepDefinition, registration_steps};
use stepwise_types::{
    JsonPatch, JsonRecord,
    registration::{
        ADDITIONAL_INFO_STEP_ID, CATEGORY_OPTIONS, DEPARTMENT_OPTIONS, JOB_TITLE_OPTIONS, LEVEL_OPTIONS, PERSONAL_INFO_STEP_ID,
        WORK_INFO_STEP_ID,
    },
};
use stepwise_util::{DateField, FieldProducer, PhoneField, SelectField, TextField};

use crate::form::{FormDefinition, Prompt};

/// The three-step registration form over an open JSON record.
#[derive(Debug, Clone)]
pub struct RegistrationForm {
    pub country_code: String,
}

impl RegistrationForm {
    pub fn new(country_code: impl Into<String>) -> Self {
        Self {
            country_code: country_code.into(),
        }
    }

    fn prompt<P>(record: &JsonRecord, key: &'static str, field: P) -> Prompt<JsonRecord>
    where
        P: FieldProducer<Value = String> + Send + Sync + 'static,
    {
        let current = record.get_str(key).map(str::to_string);
        Prompt::from_field(field, current.as_ref(), move |_, value: Option<String>| {
            indexmap! { key.to_string() => value.map(Value::String).unwrap_or(Value::Null) }
        })
    }
}

impl FormDefinition for RegistrationForm {
    type Record = JsonRecord;

    fn name(&self) -> &'static str {
        "registration"
    }

    fn title(&self) -> &'static str {
        "Multi-Step Form Example"
    }

    fn steps(&self) -> Vec<StepDefinition<JsonRecord>> {
        registration_steps()
    }

    fn seed(&self) -> JsonRecord {
        JsonRecord::new()
    }

    fn patch_from_value(&self, value: Value) -> Result<JsonPatch> {
        match value {
            Value::Object(map) => Ok(map.into_iter().collect()),
            Value::Null => Ok(JsonPatch::new()),
            other => bail!("registration updates must be a mapping of field names to values, got {other}"),
        }
    }

    fn prompts(&self, step_id: &str, record: &JsonRecord) -> Vec<Prompt<JsonRecord>> {
        match step_id {
            PERSONAL_INFO_STEP_ID => vec![
                Self::prompt(record, "fullName", TextField::new("Full Name").required().placeholder("John Doe")),
                Self::prompt(record, "email", TextField::new("Email Address").required().placeholder("john@example.com")),
                Self::prompt(record, "phone", PhoneField::new("Phone Number", self.country_code.as_str()).required()),
                Self::prompt(record, "about", TextField::new("About").placeholder("Tell us a bit about yourself")),
            ],
            WORK_INFO_STEP_ID => vec![
                Self::prompt(record, "company", TextField::new("Company Name").required()),
                Self::prompt(record, "jobTitle", SelectField::new("Job Title", JOB_TITLE_OPTIONS).required()),
                Self::prompt(record, "department", SelectField::new("Department", DEPARTMENT_OPTIONS)),
                Self::prompt(record, "startDate", DateField::new("Start Date").required()),
                Self::prompt(record, "location", TextField::new("Location")),
            ],
            ADDITIONAL_INFO_STEP_ID => vec![
                Self::prompt(record, "website", TextField::new("Website").placeholder("https://example.com")),
                Self::prompt(record, "category", SelectField::new("Category", CATEGORY_OPTIONS)),
                Self::prompt(record, "level", SelectField::new("Level", LEVEL_OPTIONS)),
                Self::prompt(record, "comments", TextField::new("Additional Comments")),
            ],
            _ => Vec::new(),
        }
    }
}
