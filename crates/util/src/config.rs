//! User configuration for the Stepwise CLI.
//!
//! Settings live in a small JSON file under the standard configuration
//! directory (`~/.config/stepwise/config.json` on most platforms). Every field
//! has a default, so a missing file, or a file that only sets some keys, is
//! fine. A file that exists but cannot be parsed is reported as an error
//! rather than silently ignored.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use dirs_next::config_dir;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::expand_tilde;

/// Environment variable allowing callers to override the config file path.
pub const CONFIG_PATH_ENV: &str = "STEPWISE_CONFIG_PATH";

/// Default filename for the JSON payload.
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Error surfaced when reading or writing configuration fails.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("config file {path} is not valid JSON: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Persisted configuration values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WizardConfig {
    /// Resume template name used when the seed record does not set one.
    pub default_template: String,
    /// Directory completed records are written to when no explicit output is given.
    pub output_dir: Option<PathBuf>,
    /// `tracing` filter directive used when `RUST_LOG` is unset.
    pub log_filter: String,
    /// Country code prefixed to phone numbers.
    pub country_code: String,
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            default_template: "modern".to_string(),
            output_dir: None,
            log_filter: "info".to_string(),
            country_code: "+1".to_string(),
        }
    }
}

impl WizardConfig {
    /// Loads the config from [`default_config_path`].
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&default_config_path())
    }

    /// Loads the config from `path`, falling back to defaults when the file is absent.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match fs::read_to_string(path) {
            Ok(data) => {
                let mut config: WizardConfig = serde_json::from_str(&data).map_err(|source| ConfigError::Parse {
                    path: path.to_path_buf(),
                    source,
                })?;
                config.output_dir = config.output_dir.map(|dir| expand_tilde(&dir.to_string_lossy()));
                debug!(path = %path.display(), "loaded configuration");
                Ok(config)
            }
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Path a completed record of `form_name` is written to, if an output dir is configured.
    pub fn output_path_for(&self, form_name: &str, stamp: &str) -> Option<PathBuf> {
        self.output_dir
            .as_ref()
            .map(|dir| dir.join(format!("{form_name}-{stamp}.json")))
    }
}

/// Resolves the config path, honouring [`CONFIG_PATH_ENV`].
pub fn default_config_path() -> PathBuf {
    if let Ok(path) = env::var(CONFIG_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return expand_tilde(trimmed);
        }
    }

    config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("stepwise")
        .join(CONFIG_FILE_NAME)
}
