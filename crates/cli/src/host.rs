//! Interactive terminal host: renders the shell view and reads answers line by line.

use std::io::Write;

use anyhow::Result;
use stepwise_engine::{ShellView, WizardShell};
use stepwise_types::{AdvanceOutcome, JumpOutcome, StepStatus};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};

use crate::{
    form::{FormDefinition, ListTarget, PatchOf},
    script::{StepRef, step_ids_of},
};

const HELP: &str = "Commands: :next  :back  :goto N|ID  :show  :add [point N|other]  :remove [point N] M|other M  :quit  \
                    (blank answer keeps the current value)";

/// How a host run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    Completed,
    Quit,
    EndOfInput,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Next,
    Back,
    GoTo(StepRef),
    Show,
    Add(ListTarget),
    /// Zero-based item index within the list.
    Remove(ListTarget, usize),
    Quit,
    Help,
}

/// Parses a `:command` line. Entry, point and step numbers are 1-based.
///
/// `:add` and `:remove M` edit the step's own entries, `:add point N` and
/// `:remove point N M` edit the description points of entry N, and
/// `:add other` / `:remove other M` edit the other experiences.
pub fn parse_command(line: &str) -> Result<Command, String> {
    let body = line.trim().trim_start_matches(':');
    let words: Vec<&str> = body.split_whitespace().collect();
    let Some((&name, arguments)) = words.split_first() else {
        return Err("empty command; type :help for a list".to_string());
    };

    match (name, arguments) {
        ("next" | "n", []) => Ok(Command::Next),
        ("back" | "b", []) => Ok(Command::Back),
        ("goto" | "g", [target]) => Ok(Command::GoTo(StepRef::parse(target))),
        ("show" | "s", []) => Ok(Command::Show),
        ("add", []) => Ok(Command::Add(ListTarget::Entries)),
        ("add", ["point", entry]) => Ok(Command::Add(ListTarget::Points(ordinal(entry)?))),
        ("add", ["other"]) => Ok(Command::Add(ListTarget::Other)),
        ("remove", [item]) => Ok(Command::Remove(ListTarget::Entries, ordinal(item)?)),
        ("remove", ["point", entry, item]) => Ok(Command::Remove(ListTarget::Points(ordinal(entry)?), ordinal(item)?)),
        ("remove", ["other", item]) => Ok(Command::Remove(ListTarget::Other, ordinal(item)?)),
        ("quit" | "q", []) => Ok(Command::Quit),
        ("help" | "h" | "?", []) => Ok(Command::Help),
        _ => Err(format!("unknown command ':{body}'; type :help for a list")),
    }
}

/// 1-based number to zero-based index.
fn ordinal(text: &str) -> Result<usize, String> {
    text.parse::<usize>()
        .ok()
        .and_then(|number| number.checked_sub(1))
        .ok_or_else(|| format!("'{text}' is not an entry number"))
}

enum StepInput {
    Finished,
    Command(Command),
    EndOfInput,
}

pub struct TerminalHost<'a, F: FormDefinition, W: Write> {
    form: &'a F,
    shell: &'a WizardShell<F::Record>,
    out: W,
}

impl<'a, F: FormDefinition, W: Write> TerminalHost<'a, F, W> {
    pub fn new(form: &'a F, shell: &'a WizardShell<F::Record>, out: W) -> Self {
        Self { form, shell, out }
    }

    pub fn into_output(self) -> W {
        self.out
    }

    /// Runs until the wizard completes, the user quits, or input ends.
    ///
    /// Answering the last field of a step acts like `:next`.
    pub async fn run<I: AsyncBufRead + Unpin>(&mut self, input: I) -> Result<SessionEnd> {
        let mut lines = input.lines();
        writeln!(self.out, "{HELP}")?;
        loop {
            let view = self.shell.view().await;
            self.render(&view)?;
            let command = match self.fill_step(&view.current_step_id, &mut lines).await? {
                StepInput::Finished => Command::Next,
                StepInput::Command(command) => command,
                StepInput::EndOfInput => return Ok(SessionEnd::EndOfInput),
            };
            if let Some(end) = self.execute(&view, command).await? {
                return Ok(end);
            }
        }
    }

    fn render(&mut self, view: &ShellView) -> Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "{}  {} ({:.0}%)", view.title, view.progress.label(), view.progress.percent)?;
        for entry in &view.sidebar {
            let marker = match entry.status {
                StepStatus::Active => ">",
                StepStatus::Completed => "x",
                StepStatus::Available => " ",
                StepStatus::Locked => "-",
            };
            let suffix = if entry.clickable { "" } else { " (locked)" };
            writeln!(self.out, "  [{marker}] {}. {}{suffix}", entry.index + 1, entry.title)?;
        }
        writeln!(self.out, "== {} ==", view.current_title)?;
        if let Some(description) = view.sidebar.get(view.progress.position - 1).and_then(|entry| entry.description.as_deref()) {
            writeln!(self.out, "{description}")?;
        }
        if let Some(error) = &view.error {
            writeln!(self.out, "  ! {error}")?;
        }
        Ok(())
    }

    async fn fill_step<I: AsyncBufRead + Unpin>(&mut self, step_id: &str, lines: &mut Lines<I>) -> Result<StepInput> {
        let record = self.shell.session().record().await;
        let prompts = self.form.prompts(step_id, &record);

        for prompt in &prompts {
            loop {
                let required = if prompt.required { "*" } else { "" };
                match prompt.hint.as_deref().filter(|_| prompt.current.is_empty()) {
                    Some(hint) => write!(self.out, "  {}{required} ({hint}): ", prompt.label)?,
                    None => write!(self.out, "  {}{required} [{}]: ", prompt.label, prompt.current)?,
                }
                self.out.flush()?;

                let Some(line) = lines.next_line().await? else {
                    return Ok(StepInput::EndOfInput);
                };
                let answer = line.trim();
                if answer.starts_with(':') {
                    match parse_command(answer) {
                        Ok(Command::Show) => self.show().await?,
                        Ok(Command::Help) => writeln!(self.out, "{HELP}")?,
                        Ok(command) => return Ok(StepInput::Command(command)),
                        Err(message) => writeln!(self.out, "  ! {message}")?,
                    }
                    continue;
                }
                if answer.is_empty() {
                    break;
                }

                let record = self.shell.session().record().await;
                match prompt.apply(&record, answer) {
                    Ok(patch) => {
                        self.shell.update(patch).await;
                        break;
                    }
                    Err(message) => writeln!(self.out, "  ! {message}")?,
                }
            }
        }
        Ok(StepInput::Finished)
    }

    async fn execute(&mut self, view: &ShellView, command: Command) -> Result<Option<SessionEnd>> {
        match command {
            Command::Next => {
                if self.shell.next().await? == AdvanceOutcome::Completed {
                    writeln!(self.out, "{} submitted.", view.title)?;
                    return Ok(Some(SessionEnd::Completed));
                }
            }
            Command::Back => self.shell.back().await?,
            Command::GoTo(target) => {
                let step_ids = self.shell.session().read(|navigator| step_ids_of(navigator.steps())).await;
                match target.resolve(&step_ids) {
                    None => writeln!(self.out, "  ! no step matches {target:?}")?,
                    Some(index) => match self.shell.select(index).await? {
                        JumpOutcome::Jumped => {}
                        JumpOutcome::Rejected => writeln!(self.out, "  ! step {} is locked", index + 1)?,
                        JumpOutcome::ValidationFailed(message) => writeln!(self.out, "  ! {message}")?,
                    },
                }
            }
            Command::Show => self.show().await?,
            Command::Add(list) => {
                let record = self.shell.session().record().await;
                let patch = self.form.add_entry(&view.current_step_id, list, &record);
                self.apply_list_edit(patch).await?;
            }
            Command::Remove(list, index) => {
                let record = self.shell.session().record().await;
                let patch = self.form.remove_entry(&view.current_step_id, list, &record, index);
                self.apply_list_edit(patch).await?;
            }
            Command::Quit => return Ok(Some(SessionEnd::Quit)),
            Command::Help => writeln!(self.out, "{HELP}")?,
        }
        Ok(None)
    }

    async fn apply_list_edit(&mut self, patch: Option<PatchOf<F::Record>>) -> Result<()> {
        match patch {
            Some(patch) => self.shell.update(patch).await,
            None => writeln!(self.out, "  ! this step has no such list to edit")?,
        }
        Ok(())
    }

    async fn show(&mut self) -> Result<()> {
        let record = self.shell.session().record().await;
        writeln!(self.out, "{}", serde_json::to_string_pretty(&record)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{registration_form::RegistrationForm, resume_form::ResumeForm};
    use async_trait::async_trait;
    use stepwise_engine::{CompletionHandler, StepNavigator, WizardSession};
    use stepwise_types::{EducationEntry, JsonRecord, Objective, PersonalDetails, ResumeRecord};
    use tokio::sync::Mutex;

    struct Collect<R>(Mutex<Vec<R>>);

    impl<R> Default for Collect<R> {
        fn default() -> Self {
            Self(Mutex::new(Vec::new()))
        }
    }

    #[async_trait]
    impl<R: Clone + Send + Sync + 'static> CompletionHandler<R> for Collect<R> {
        async fn complete(&self, record: &R) -> Result<()> {
            self.0.lock().await.push(record.clone());
            Ok(())
        }
    }

    fn registration_shell(collect: Arc<Collect<JsonRecord>>) -> (RegistrationForm, WizardShell<JsonRecord>) {
        let form = RegistrationForm::new("+1");
        let navigator = StepNavigator::new(form.steps(), form.seed()).expect("valid steps");
        let shell = WizardShell::new(form.title(), WizardSession::new(navigator), collect);
        (form, shell)
    }

    #[test]
    fn commands_parse_with_one_based_numbers() {
        assert_eq!(parse_command(":next"), Ok(Command::Next));
        assert_eq!(parse_command(" :goto 3 "), Ok(Command::GoTo(StepRef::Number(3))));
        assert_eq!(parse_command(":goto work-info"), Ok(Command::GoTo(StepRef::Id("work-info".into()))));
        assert_eq!(parse_command(":add"), Ok(Command::Add(ListTarget::Entries)));
        assert_eq!(parse_command(":remove 2"), Ok(Command::Remove(ListTarget::Entries, 1)));
        assert_eq!(parse_command(":add point 1"), Ok(Command::Add(ListTarget::Points(0))));
        assert_eq!(parse_command(":remove point 2 3"), Ok(Command::Remove(ListTarget::Points(1), 2)));
        assert_eq!(parse_command(":add other"), Ok(Command::Add(ListTarget::Other)));
        assert_eq!(parse_command(":remove other 1"), Ok(Command::Remove(ListTarget::Other, 0)));
        assert!(parse_command(":remove 0").is_err());
        assert!(parse_command(":remove point 1").is_err());
        assert!(parse_command(":").is_err());
        assert!(parse_command(":goto").is_err());
        assert!(parse_command(":next now").is_err());
        assert!(parse_command(":fly").is_err());
    }

    #[tokio::test]
    async fn answering_every_field_walks_to_completion() {
        let collect = Arc::new(Collect::default());
        let (form, shell) = registration_shell(collect.clone());
        let input = "Ada Lovelace\nada@example.com\n(555) 123-4567\n\n\
                     Analytical Engines\nDeveloper\n\n1842-01-01\n\n\
                     :next\n";

        let mut host = TerminalHost::new(&form, &shell, Vec::new());
        assert_eq!(host.run(input.as_bytes()).await.expect("run succeeds"), SessionEnd::Completed);

        let records = collect.0.lock().await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get_str("phone"), Some("+15551234567"));
        assert_eq!(records[0].get_str("jobTitle"), Some("developer"));
        assert!(!records[0].contains_key("about"));
        let output = String::from_utf8(host.into_output()).expect("utf-8 output");
        assert!(output.contains("Step 3 of 3"));
        assert!(output.contains("Full Name* (John Doe): "));
        assert!(output.contains("Start Date* (YYYY-MM-DD): "));
        assert!(output.contains("Multi-Step Form Example submitted."));
    }

    #[tokio::test]
    async fn invalid_answers_and_locked_steps_are_reported() {
        let (form, shell) = registration_shell(Arc::new(Collect::default()));
        let input = ":goto 3\n\n\nnot a phone\n\n\n:quit\n";

        let mut host = TerminalHost::new(&form, &shell, Vec::new());
        assert_eq!(host.run(input.as_bytes()).await.expect("run succeeds"), SessionEnd::Quit);

        let output = String::from_utf8(host.into_output()).expect("utf-8 output");
        assert!(output.contains("step 3 is locked"));
        assert!(output.contains("Please enter a valid phone number"));
        assert!(output.contains("! Full name is required"));
        assert_eq!(shell.view().await.current_step_id, "personal-info");
    }

    #[tokio::test]
    async fn list_commands_edit_resume_collections() {
        let collect = Arc::new(Collect::<ResumeRecord>::default());
        let form = ResumeForm::new("modern");
        let navigator = StepNavigator::new(form.steps(), form.seed()).expect("valid steps");
        let shell = WizardShell::new(form.title(), WizardSession::new(navigator), collect);

        let mut host = TerminalHost::new(&form, &shell, Vec::new());
        let end = host.run(":add\n:add\n:show\n:quit\n".as_bytes()).await.expect("run succeeds");
        assert_eq!(end, SessionEnd::Quit);
        let output = String::from_utf8(host.into_output()).expect("utf-8 output");
        assert!(output.contains("this step has no such list to edit"));
        assert!(output.contains("\"template_name\": \"modern\""));

        shell.session().read(|navigator| assert_eq!(navigator.record().education.len(), 1)).await;
    }

    fn resume_ready_for_experience() -> ResumeRecord {
        ResumeRecord {
            personal_details: PersonalDetails {
                name: "Grace Hopper".into(),
                email: "grace@example.com".into(),
                mobile: "+1 555 123 4567".into(),
                address: "1 Navy Yard, Arlington".into(),
                ..PersonalDetails::default()
            },
            objective: Objective {
                description: "Build compilers that let people write programs in something close to English.".into(),
                ..Objective::default()
            },
            education: vec![EducationEntry {
                college: "Vassar College".into(),
                location: "Poughkeepsie".into(),
                degree: "BA".into(),
                from: "1924-09-01".into(),
                to: "1928-06-01".into(),
                ..EducationEntry::default()
            }],
            ..ResumeRecord::with_template("modern")
        }
    }

    #[tokio::test]
    async fn point_and_other_commands_edit_experiences() {
        let form = ResumeForm::new("modern");
        let navigator = StepNavigator::new(form.steps(), resume_ready_for_experience()).expect("valid steps");
        let shell = WizardShell::new(form.title(), WizardSession::new(navigator), Arc::new(Collect::<ResumeRecord>::default()));

        let input = ":next\n:next\n:next\n:add point 1\n:add other\n:remove point 1 1\n:add point 9\n:quit\n";
        let mut host = TerminalHost::new(&form, &shell, Vec::new());
        assert_eq!(host.run(input.as_bytes()).await.expect("run succeeds"), SessionEnd::Quit);

        let output = String::from_utf8(host.into_output()).expect("utf-8 output");
        assert!(output.contains("== Work Experience =="));
        assert!(output.contains("this step has no such list to edit"));
        let record = shell.session().record().await;
        assert_eq!(record.work_experiences[0].description, vec![String::new()]);
        assert_eq!(record.other_experiences.as_ref().map(Vec::len), Some(1));
    }

    #[tokio::test]
    async fn end_of_input_stops_cleanly() {
        let (form, shell) = registration_shell(Arc::new(Collect::default()));
        let mut host = TerminalHost::new(&form, &shell, Vec::new());
        assert_eq!(host.run("Ada\n".as_bytes()).await.expect("run succeeds"), SessionEnd::EndOfInput);
        assert_eq!(shell.session().record().await.get_str("fullName"), Some("Ada"));
    }
}
