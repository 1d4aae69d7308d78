//! Scripted runs: a YAML list of actions applied to a wizard in order.
//!
//! ```yaml
//! - update: { fullName: Ada Lovelace, email: ada@example.com }
//! - next
//! - goto: 1
//! - back
//! ```

use std::{fs, path::Path};

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use serde_json::Value;
use stepwise_engine::WizardShell;
use stepwise_types::{AdvanceOutcome, JumpOutcome};
use tracing::{info, warn};

use crate::{form::FormDefinition, host::SessionEnd};

/// A step named by 1-based position or by id.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum StepRef {
    Number(usize),
    Id(String),
}

impl StepRef {
    pub fn parse(text: &str) -> Self {
        text.parse().map_or_else(|_| Self::Id(text.to_string()), Self::Number)
    }

    /// Zero-based index among `step_ids`, if the reference names a step.
    pub fn resolve<S: AsRef<str>>(&self, step_ids: &[S]) -> Option<usize> {
        match self {
            Self::Number(number) => number.checked_sub(1).filter(|&index| index < step_ids.len()),
            Self::Id(id) => step_ids.iter().position(|step_id| step_id.as_ref() == id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptAction {
    Update(Value),
    Next,
    Back,
    Goto(StepRef),
    Show,
}

pub fn parse_script(text: &str) -> Result<Vec<ScriptAction>> {
    serde_yaml::from_str(text).context("script must be a YAML list of actions")
}

pub fn load_script(path: &Path) -> Result<Vec<ScriptAction>> {
    let text = fs::read_to_string(path).with_context(|| format!("reading script {}", path.display()))?;
    parse_script(&text).with_context(|| format!("parsing script {}", path.display()))
}

/// Applies `actions` until the wizard completes.
///
/// Validation failures are logged and the script carries on, so a later
/// `update` can fix the record. Running out of actions before completion is
/// an error naming the step the wizard stopped on.
pub async fn run_script<F: FormDefinition>(
    form: &F,
    shell: &WizardShell<F::Record>,
    actions: Vec<ScriptAction>,
) -> Result<SessionEnd> {
    let total = actions.len();
    for (position, action) in actions.into_iter().enumerate() {
        match action {
            ScriptAction::Update(value) => {
                let patch = form
                    .patch_from_value(value)
                    .with_context(|| format!("action {}: invalid update", position + 1))?;
                shell.update(patch).await;
            }
            ScriptAction::Next => match shell.next().await? {
                AdvanceOutcome::Completed => {
                    let remaining = total - position - 1;
                    if remaining > 0 {
                        warn!(remaining, "ignoring actions after completion");
                    }
                    return Ok(SessionEnd::Completed);
                }
                AdvanceOutcome::ValidationFailed(message) => warn!(action = position + 1, %message, "next refused"),
                AdvanceOutcome::Advanced => {}
            },
            ScriptAction::Back => shell.back().await?,
            ScriptAction::Goto(target) => {
                let step_ids = shell.session().read(|navigator| step_ids_of(navigator.steps())).await;
                let Some(index) = target.resolve(&step_ids) else {
                    bail!("action {}: no step matches {target:?}", position + 1);
                };
                match shell.select(index).await? {
                    JumpOutcome::Jumped => {}
                    JumpOutcome::Rejected => warn!(action = position + 1, step = %step_ids[index], "step is locked"),
                    JumpOutcome::ValidationFailed(message) => warn!(action = position + 1, %message, "jump refused"),
                }
            }
            ScriptAction::Show => {
                let record = shell.session().record().await;
                info!(record = %serde_json::to_string(&record)?, "current record");
            }
        }
    }

    let view = shell.view().await;
    match view.error {
        Some(error) => bail!("script ended on step '{}' before completion: {error}", view.current_step_id),
        None => bail!("script ended on step '{}' before completion", view.current_step_id),
    }
}

pub(crate) fn step_ids_of<R: 'static>(steps: &[stepwise_engine::StepDefinition<R>]) -> Vec<String> {
    steps.iter().map(|step| step.id().to_string()).collect()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::registration_form::RegistrationForm;
    use async_trait::async_trait;
    use stepwise_engine::{CompletionHandler, StepNavigator, WizardSession};
    use stepwise_types::JsonRecord;
    use tokio::sync::Mutex;

    #[derive(Default)]
    struct Collect(Mutex<Vec<JsonRecord>>);

    #[async_trait]
    impl CompletionHandler<JsonRecord> for Collect {
        async fn complete(&self, record: &JsonRecord) -> Result<()> {
            self.0.lock().await.push(record.clone());
            Ok(())
        }
    }

    fn shell(form: &RegistrationForm, collect: Arc<Collect>) -> WizardShell<JsonRecord> {
        let navigator = StepNavigator::new(form.steps(), form.seed()).expect("valid steps");
        WizardShell::new(form.title(), WizardSession::new(navigator), collect)
    }

    #[test]
    fn parses_unit_and_mapping_actions() {
        let actions = parse_script(
            r#"
- update: { fullName: Ada }
- next
- goto: 2
- goto: work-info
- back
- show
"#,
        )
        .expect("valid script");

        assert_eq!(
            actions,
            vec![
                ScriptAction::Update(serde_json::json!({"fullName": "Ada"})),
                ScriptAction::Next,
                ScriptAction::Goto(StepRef::Number(2)),
                ScriptAction::Goto(StepRef::Id("work-info".into())),
                ScriptAction::Back,
                ScriptAction::Show,
            ]
        );
        assert!(parse_script("- jump").is_err());
    }

    #[test]
    fn step_refs_are_one_based_or_ids() {
        let ids = ["personal-info", "work-info", "additional-info"];
        assert_eq!(StepRef::parse("1").resolve(&ids), Some(0));
        assert_eq!(StepRef::parse("work-info").resolve(&ids), Some(1));
        assert_eq!(StepRef::parse("0").resolve(&ids), None);
        assert_eq!(StepRef::parse("4").resolve(&ids), None);
    }

    #[tokio::test]
    async fn script_recovers_from_validation_failures_and_completes() {
        let form = RegistrationForm::new("+1");
        let collect = Arc::new(Collect::default());
        let shell = shell(&form, collect.clone());
        let actions = parse_script(
            r#"
- next
- update: { fullName: Ada Lovelace, email: ada@example.com, phone: "+15551234567" }
- next
- update: { company: Analytical Engines, jobTitle: developer, startDate: "1842-01-01" }
- goto: 1
- goto: work-info
- next
- next
"#,
        )
        .expect("valid script");

        assert_eq!(run_script(&form, &shell, actions).await.expect("script completes"), SessionEnd::Completed);

        let records = collect.0.lock().await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get_str("company"), Some("Analytical Engines"));
    }

    #[tokio::test]
    async fn running_out_of_actions_reports_where_it_stopped() {
        let form = RegistrationForm::new("+1");
        let shell = shell(&form, Arc::new(Collect::default()));
        let actions = parse_script("- update: { fullName: Ada }\n- next\n").expect("valid script");

        let error = run_script(&form, &shell, actions).await.expect_err("incomplete");
        assert_eq!(
            error.to_string(),
            "script ended on step 'personal-info' before completion: Email is required"
        );
    }
}
