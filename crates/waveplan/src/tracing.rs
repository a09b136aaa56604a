//! Tracing configuration for the waveplan CLI
//!
//! Diagnostics are written to stderr so that stdout carries only command
//! output. `RUST_LOG` wins over the `--level` flag when it is set.

use crate::cli::CliError;
use std::io;
pub use tracing::Level;
use tracing_subscriber::{filter::EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Tracing output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum TracingFormat {
    /// Pretty-printed human-readable format
    Pretty,
    /// Compact single-line format
    Compact,
    /// Structured JSON format
    Json,
}

/// Log level options for CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum LogLevel {
    /// Show all logs (trace level)
    Trace,
    /// Show debug and above
    Debug,
    /// Show info and above
    Info,
    /// Show warnings and above (default)
    Warn,
    /// Show errors only
    Error,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Self::TRACE,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Info => Self::INFO,
            LogLevel::Warn => Self::WARN,
            LogLevel::Error => Self::ERROR,
        }
    }
}

/// Tracing configuration
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Output format
    pub format: TracingFormat,
    /// Minimum level for waveplan crates
    pub level: Level,
}

fn default_directive(level: Level) -> String {
    let level_str = level.as_str().to_ascii_lowercase();
    format!("waveplan={level_str},waveplan_task_graph={level_str}")
}

/// Initialize tracing with the given configuration
///
/// # Errors
///
/// Returns an error if the filter directive is invalid or a global
/// subscriber is already installed.
pub fn init_tracing(config: TracingConfig) -> Result<(), CliError> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directive(config.level)))
        .map_err(|e| CliError::config(format!("Failed to create tracing filter: {e}")))?;

    let registry = tracing_subscriber::registry().with(env_filter);

    let installed = match config.format {
        TracingFormat::Pretty => {
            let layer = tracing_subscriber::fmt::layer()
                .pretty()
                .with_writer(io::stderr)
                .with_target(true);
            registry.with(layer).try_init()
        }
        TracingFormat::Compact => {
            let layer = tracing_subscriber::fmt::layer()
                .compact()
                .with_writer(io::stderr)
                .with_target(false)
                .with_thread_ids(false);
            registry.with(layer).try_init()
        }
        TracingFormat::Json => {
            let layer = tracing_subscriber::fmt::layer()
                .json()
                .with_writer(io::stderr)
                .with_current_span(true)
                .with_span_list(true);
            registry.with(layer).try_init()
        }
    };
    installed.map_err(|e| CliError::config(format!("Failed to install tracing subscriber: {e}")))?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        format = ?config.format,
        "Tracing initialized for waveplan CLI"
    );

    Ok(())
}
