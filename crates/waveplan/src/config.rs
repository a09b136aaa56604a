//! `waveplan.toml` loading.
//!
//! ```toml
//! state_file = "workflow-state.json"
//!
//! [durations]
//! backend = 10
//!
//! [durations.tasks]
//! migrate-db = 3
//! ```

use crate::cli::CliError;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use waveplan_task_graph::DurationTable;

/// Configuration file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "waveplan.toml";

/// State document used when neither the CLI nor the config names one.
pub const DEFAULT_STATE_FILE: &str = "workflow-state.json";

/// Settings read from `waveplan.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Workflow state document.
    pub state_file: Option<PathBuf>,
    /// Duration table used by `estimate`.
    pub durations: DurationTable,
}

impl Config {
    /// Load configuration.
    ///
    /// An explicit `path` must exist. Without one, `waveplan.toml` in the
    /// working directory is used if present and defaults apply otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::Config`] if the file cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, CliError> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if fallback.is_file() {
                    Self::from_file(fallback)
                } else {
                    debug!("No configuration file found, using defaults");
                    Ok(Self::default())
                }
            }
        }
    }

    /// Read and parse one configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::Config`] if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, CliError> {
        let content = fs::read_to_string(path).map_err(|e| {
            CliError::config_with_help(
                format!("Failed to read config file {}: {e}", path.display()),
                "Pass --config with an existing file or unset WAVEPLAN_CONFIG",
            )
        })?;
        let config = Self::parse(&content).map_err(|e| match e {
            CliError::Config { message, help } => CliError::Config {
                message: format!("{}: {message}", path.display()),
                help,
            },
            other => other,
        })?;
        debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Parse configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::Config`] on malformed TOML or unknown keys.
    pub fn parse(content: &str) -> Result<Self, CliError> {
        toml::from_str(content).map_err(|e| {
            CliError::config_with_help(
                format!("Invalid configuration: {}", e.message()),
                "Known keys are state_file and [durations]",
            )
        })
    }

    /// Resolve the state document path: the CLI (or environment) value wins,
    /// then the config file, then [`DEFAULT_STATE_FILE`].
    #[must_use]
    pub fn resolve_state_file(&self, cli: Option<&Path>) -> PathBuf {
        cli.map(Path::to_path_buf)
            .or_else(|| self.state_file.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_FILE))
    }
}
