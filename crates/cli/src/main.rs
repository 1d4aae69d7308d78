use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use stepwise_engine::{StepNavigator, WizardSession, WizardShell};
use stepwise_types::AggregateRecord;
use stepwise_util::{WizardConfig, expand_tilde};
use tokio::io::BufReader;
use tracing::{debug, info, warn};

mod form;
mod host;
mod output;
mod registration_form;
mod resume_form;
mod script;

use crate::{
    form::FormDefinition,
    host::{SessionEnd, TerminalHost},
    output::{Destination, JsonOutput},
    registration_form::RegistrationForm,
    resume_form::ResumeForm,
};

#[derive(Debug, Parser)]
#[command(name = "stepwise", version, about = "Fill in multi-step forms from the terminal")]
struct Cli {
    /// Path to the JSON config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: FormCommand,
}

#[derive(Debug, Subcommand)]
enum FormCommand {
    /// Build a resume in five steps.
    Resume {
        #[command(flatten)]
        run: RunArgs,
        /// Resume template name stored on the record.
        #[arg(long)]
        template: Option<String>,
    },
    /// Walk through the three-step registration form.
    Registration(RunArgs),
}

#[derive(Debug, Args)]
struct RunArgs {
    /// YAML or JSON document merged over the empty record before the first step.
    #[arg(long)]
    seed: Option<PathBuf>,
    /// YAML list of actions to run instead of prompting.
    #[arg(long)]
    script: Option<PathBuf>,
    /// File the completed record is written to.
    #[arg(long)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => WizardConfig::load_from(&expand_tilde(&path.to_string_lossy()))?,
        None => WizardConfig::load()?,
    };
    init_tracing(&config.log_filter);
    debug!(?config, "loaded configuration");

    let end = match cli.command {
        FormCommand::Resume { run, template } => {
            let form = ResumeForm::new(template.unwrap_or_else(|| config.default_template.clone()));
            run_form(&form, &config, run).await?
        }
        FormCommand::Registration(run) => {
            let form = RegistrationForm::new(config.country_code.as_str());
            run_form(&form, &config, run).await?
        }
    };

    match end {
        SessionEnd::Completed => info!("form completed"),
        SessionEnd::Quit => info!("form abandoned"),
        SessionEnd::EndOfInput => warn!("input ended before the form was completed"),
    }
    Ok(())
}

fn init_tracing(default_filter: &str) {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.to_string());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

async fn run_form<F: FormDefinition>(form: &F, config: &WizardConfig, args: RunArgs) -> Result<SessionEnd> {
    let mut seed = form.seed();
    if let Some(path) = &args.seed {
        seed.merge(form.patch_from_value(read_document(path)?).with_context(|| format!("applying seed {}", path.display()))?);
    }

    let navigator = StepNavigator::new(form.steps(), seed).context("building the step list")?;
    let destination = Destination::resolve(args.output, config, form.name());
    debug!(form = form.name(), ?destination, "starting wizard");
    let shell = WizardShell::new(form.title(), WizardSession::new(navigator), Arc::new(JsonOutput::new(destination)));

    match &args.script {
        Some(path) => script::run_script(form, &shell, script::load_script(path)?).await,
        None => {
            let mut host = TerminalHost::new(form, &shell, io::stderr());
            let end = host.run(BufReader::new(tokio::io::stdin())).await?;
            writeln!(host.into_output())?;
            Ok(end)
        }
    }
}

fn read_document(path: &Path) -> Result<Value> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_yaml::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn resume_flags_parse() {
        let cli = Cli::try_parse_from(["stepwise", "resume", "--template", "classic", "--script", "run.yaml"]).expect("valid args");
        let FormCommand::Resume { run, template } = cli.command else {
            panic!("expected the resume subcommand");
        };
        assert_eq!(template.as_deref(), Some("classic"));
        assert_eq!(run.script, Some(PathBuf::from("run.yaml")));
        assert!(run.seed.is_none());
    }

    #[tokio::test]
    async fn seeded_script_run_writes_the_record() {
        let dir = tempfile::tempdir().expect("tempdir");
        let seed = dir.path().join("seed.yaml");
        fs::write(&seed, "fullName: Ada Lovelace\nemail: ada@example.com\nphone: \"+15551234567\"\n").expect("write seed");
        let script = dir.path().join("run.yaml");
        fs::write(
            &script,
            "- next\n- update: { company: Acme, jobTitle: manager, startDate: \"2024-01-15\" }\n- next\n- next\n",
        )
        .expect("write script");
        let output = dir.path().join("out").join("registration.json");

        let args = RunArgs {
            seed: Some(seed),
            script: Some(script),
            output: Some(output.clone()),
        };
        let end = run_form(&RegistrationForm::new("+1"), &WizardConfig::default(), args).await.expect("run completes");
        assert_eq!(end, SessionEnd::Completed);

        let written: Value = serde_json::from_str(&fs::read_to_string(output).expect("output written")).expect("json");
        assert_eq!(written["fullName"], "Ada Lovelace");
        assert_eq!(written["company"], "Acme");
    }
}
