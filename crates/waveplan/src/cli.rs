use crate::tracing::{LogLevel, TracingFormat};
use clap::{Parser, Subcommand, ValueEnum};
use miette::{Diagnostic, Report};
use serde::{Deserialize, Serialize};
use std::io::{self, Write};
use std::path::PathBuf;
use thiserror::Error;
use waveplan_task_graph::{Error as PlanError, StuckDiagnosis};

/// Exit codes for the CLI application
pub const EXIT_OK: i32 = 0;
/// CLI, configuration or state-file error exit code
pub const EXIT_CLI: i32 = 2;
/// Planning error exit code (stuck tasks, unknown task, invalid snapshot)
pub const EXIT_PLAN: i32 = 3;
/// Internal invariant violation exit code
pub const EXIT_INTERNAL: i32 = 70;

/// CLI-specific error types with proper exit code mapping
#[derive(Error, Debug, Clone, Diagnostic)]
pub enum CliError {
    /// CLI, configuration or state-file error (exit code 2)
    #[error("Configuration error: {message}")]
    #[diagnostic(code(waveplan::cli::config))]
    Config {
        /// The error message
        message: String,
        /// Optional help text
        #[help]
        help: Option<String>,
    },
    /// The snapshot cannot be planned (exit code 3)
    #[error("Planning failed: {message}")]
    #[diagnostic(code(waveplan::cli::plan))]
    Plan {
        /// The error message
        message: String,
        /// Optional help text
        #[help]
        help: Option<String>,
    },
    /// The planner broke one of its own invariants (exit code 70)
    #[error("Internal error: {message}")]
    #[diagnostic(code(waveplan::cli::internal))]
    Internal {
        /// The error message
        message: String,
        /// Optional help text
        #[help]
        help: Option<String>,
    },
}

impl CliError {
    /// Create a new configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            help: None,
        }
    }

    /// Create a new configuration error with help text
    #[must_use]
    pub fn config_with_help(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            help: Some(help.into()),
        }
    }

    /// Create a planning error carrying a stuck-task diagnosis as help text.
    #[must_use]
    pub fn stuck(err: &PlanError, diagnosis: &StuckDiagnosis) -> Self {
        let help = if diagnosis.is_empty() {
            None
        } else {
            Some(diagnosis.to_string())
        };
        Self::Plan {
            message: err.to_string(),
            help,
        }
    }

    /// Short machine-readable category.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Config { .. } => "config",
            Self::Plan { .. } => "plan",
            Self::Internal { .. } => "internal",
        }
    }
}

/// Convert planner errors to the CLI category that matches their cause.
///
/// Stuck tasks converted this way carry no diagnosis; use
/// [`CliError::stuck`] when the task graph is at hand.
impl From<PlanError> for CliError {
    fn from(err: PlanError) -> Self {
        match &err {
            PlanError::InvariantViolation { .. } => Self::Internal {
                message: err.to_string(),
                help: Some(
                    "This is a bug in the wave planner, please report it with the state file"
                        .to_string(),
                ),
            },
            PlanError::StuckTasks { .. }
            | PlanError::UnknownTask { .. }
            | PlanError::DuplicateTask { .. } => Self::Plan {
                message: err.to_string(),
                help: None,
            },
        }
    }
}

/// Map CLI error to appropriate exit code
#[must_use]
pub const fn exit_code_for(err: &CliError) -> i32 {
    match err {
        CliError::Config { .. } => EXIT_CLI,
        CliError::Plan { .. } => EXIT_PLAN,
        CliError::Internal { .. } => EXIT_INTERNAL,
    }
}

/// Error response envelope for JSON output
#[derive(Debug, Clone, Serialize)]
pub struct ErrorEnvelope<E> {
    /// Status indicator - always "error" for failures
    pub status: &'static str,
    /// The error details
    pub error: E,
}

impl<E> ErrorEnvelope<E> {
    /// Create a new error envelope
    #[must_use]
    pub const fn new(error: E) -> Self {
        Self {
            status: "error",
            error,
        }
    }
}

/// Render error appropriately based on output format
#[allow(clippy::print_stdout, clippy::print_stderr)]
pub fn render_error(err: &CliError, json_mode: bool) {
    if json_mode {
        let error_envelope = ErrorEnvelope::new(serde_json::json!({
            "code": err.code(),
            "message": err.to_string(),
        }));

        match serde_json::to_string(&error_envelope) {
            Ok(json) => println!("{json}"),
            Err(_) => eprintln!("Error serializing error response"),
        }
    }

    // Human-friendly diagnostics always go to stderr
    let report = Report::new(err.clone());
    eprintln!("{report:?}");
    let _ = io::stderr().flush();
}

/// Output format for command results
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, ValueEnum, Serialize, Deserialize, Default)]
pub enum OutputFormat {
    /// Pretty-printed JSON
    #[default]
    Json,
    /// Plain text
    Text,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Json => "json",
            Self::Text => "text",
        };
        write!(f, "{s}")
    }
}

/// Plan task execution waves from a workflow state snapshot.
#[derive(Parser, Debug)]
#[command(name = "waveplan")]
#[command(about = "Plan dependency-ordered execution waves for workflow tasks")]
#[command(long_about = None)]
#[command(version)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Path to the workflow state document.
    #[arg(long, global = true, env = "WAVEPLAN_STATE_FILE", value_name = "PATH")]
    pub state_file: Option<PathBuf>,

    /// Path to the waveplan.toml configuration file.
    #[arg(long, global = true, env = "WAVEPLAN_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Output format for command results.
    #[arg(long, global = true, default_value = "json", value_enum)]
    pub format: OutputFormat,

    /// Logging verbosity level.
    #[arg(
        short = 'L',
        long,
        global = true,
        help = "Set logging level",
        default_value = "warn",
        value_enum
    )]
    pub level: LogLevel,

    /// Log output format.
    #[arg(long, global = true, default_value = "compact", value_enum)]
    pub log_format: TracingFormat,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Full execution plan with capability pool assignments.
    #[command(about = "Show the full execution plan")]
    Plan,

    /// Execution waves only.
    #[command(about = "Show execution waves")]
    Waves,

    /// Completion estimate for one task.
    #[command(about = "Estimate completion time for a task and its dependencies")]
    Estimate {
        /// Task to estimate.
        #[arg(long, value_name = "ID")]
        task_id: String,
    },

    /// Pending tasks whose dependencies are all completed.
    #[command(about = "List tasks that are ready to start now")]
    Ready,

    /// Task counts per status.
    #[command(about = "Summarize workflow status")]
    Status,

    /// Tasks that depend on the given task.
    #[command(about = "List tasks that depend on a task")]
    Dependents {
        /// Task whose dependents to list.
        #[arg(long, value_name = "ID")]
        task_id: String,
    },
}

/// Parse command-line arguments.
#[must_use]
pub fn parse() -> Cli {
    Cli::parse()
}
