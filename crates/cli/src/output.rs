//! Where completed records go.

use std::{
    fs,
    io::{self, Write},
    path::PathBuf,
};

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use stepwise_engine::CompletionHandler;
use stepwise_util::WizardConfig;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    Stdout,
    File(PathBuf),
}

impl Destination {
    /// `--output` wins, then the configured output directory, then stdout.
    pub fn resolve(explicit: Option<PathBuf>, config: &WizardConfig, form_name: &str) -> Self {
        if let Some(path) = explicit {
            return Self::File(path);
        }
        let stamp = Utc::now().format("%Y%m%dT%H%M%S").to_string();
        config
            .output_path_for(form_name, &stamp)
            .map_or(Self::Stdout, Self::File)
    }
}

/// Completion handler that writes the record as pretty JSON.
#[derive(Debug, Clone)]
pub struct JsonOutput {
    destination: Destination,
}

impl JsonOutput {
    pub fn new(destination: Destination) -> Self {
        Self { destination }
    }
}

#[async_trait]
impl<R> CompletionHandler<R> for JsonOutput
where
    R: Serialize + Send + Sync + 'static,
{
    async fn complete(&self, record: &R) -> Result<()> {
        let json = serde_json::to_string_pretty(record).context("serializing completed record")?;
        match &self.destination {
            Destination::Stdout => {
                let mut stdout = io::stdout().lock();
                writeln!(stdout, "{json}").context("writing completed record to stdout")?;
            }
            Destination::File(path) => {
                if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
                    fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
                }
                fs::write(path, format!("{json}\n")).with_context(|| format!("writing {}", path.display()))?;
                info!(path = %path.display(), "wrote completed record");
            }
        }
        Ok(())
    }
}
