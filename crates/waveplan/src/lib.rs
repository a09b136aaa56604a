//! Command-line front end for the waveplan task scheduler.
//!
//! Reads a workflow state document, plans its pending tasks into waves with
//! [`waveplan_task_graph`], and prints the result as JSON or text.

pub mod cli;
pub mod commands;
pub mod config;
pub mod render;
pub mod state;
pub mod tracing;

use cli::{Cli, CliError};
use config::Config;
use state::WorkflowState;

/// Load configuration and state for `cli`, then run its subcommand.
///
/// Tracing is not initialised here.
///
/// # Errors
///
/// Returns a [`CliError`] for configuration, state-file and planning failures.
pub fn run(cli: &Cli) -> Result<String, CliError> {
    let config = Config::load(cli.config.as_deref())?;
    let state_path = config.resolve_state_file(cli.state_file.as_deref());
    let state = WorkflowState::load(&state_path)?;
    commands::execute(&cli.command, &state, &config.durations, cli.format)
}
