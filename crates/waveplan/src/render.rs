//! Command output rendering.

use crate::cli::{CliError, OutputFormat};
use crate::state::QaSummary;
use serde::Serialize;
use std::fmt::Write;
use waveplan_task_graph::{ExecutionPlan, StatusSummary, TaskStatus, TaskType};

/// Plain-text rendering of a command result.
pub trait TextRender {
    /// Render as human-readable lines, without a trailing newline.
    fn render_text(&self) -> String;
}

/// Render `value` in the requested format.
///
/// # Errors
///
/// Returns [`CliError::Internal`] if JSON serialization fails.
pub fn render<T: Serialize + TextRender>(
    value: &T,
    format: OutputFormat,
) -> Result<String, CliError> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(value).map_err(|e| {
            CliError::Internal {
                message: format!("Failed to serialize output: {e}"),
                help: None,
            }
        }),
        OutputFormat::Text => Ok(value.render_text()),
    }
}

/// Result of `waveplan waves`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WavesReport {
    /// Task ids per wave, in execution order.
    pub waves: Vec<Vec<String>>,
    /// Number of waves.
    pub total_waves: usize,
}

/// Result of `waveplan estimate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EstimateReport {
    /// Estimated task.
    pub task_id: String,
    /// Critical-path duration in duration-table units.
    pub estimated_hours: u64,
}

/// A task that can start now.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReadyTask {
    /// Task id.
    pub id: String,
    /// Task type.
    #[serde(rename = "type")]
    pub task_type: TaskType,
}

/// Result of `waveplan ready`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReadyReport {
    /// Ready tasks in id order.
    pub ready: Vec<ReadyTask>,
    /// Number of ready tasks.
    pub count: usize,
}

/// Result of `waveplan status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    /// Change request being tracked.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_cr: Option<String>,
    /// Description of the change.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Workflow phase.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,
    /// Task counts.
    #[serde(flatten)]
    pub summary: StatusSummary,
    /// QA review counts.
    #[serde(flatten)]
    pub qa: QaSummary,
    /// When the workflow was created.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// When the workflow last changed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// Result of `waveplan dependents`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependentsReport {
    /// Queried task.
    pub task_id: String,
    /// Tasks that list it as a dependency, in id order.
    pub dependents: Vec<String>,
}

impl TextRender for ExecutionPlan {
    fn render_text(&self) -> String {
        let mut out = format!(
            "Execution plan: {} wave(s), {} pending task(s)",
            self.total_waves, self.total_tasks
        );
        for wave in &self.waves {
            let mode = if wave.can_parallelize {
                "parallel"
            } else {
                "sequential"
            };
            let _ = write!(
                out,
                "\n\nWave {} ({} task(s), {mode})",
                wave.wave_number, wave.task_count
            );
            for (pool, ids) in &wave.pool_assignments {
                let ids: Vec<&str> = ids.iter().map(String::as_str).collect();
                let _ = write!(out, "\n  {pool}: {}", ids.join(", "));
            }
        }
        out
    }
}

impl TextRender for WavesReport {
    fn render_text(&self) -> String {
        if self.waves.is_empty() {
            return "No pending tasks".to_string();
        }
        self.waves
            .iter()
            .enumerate()
            .map(|(i, ids)| format!("Wave {}: {}", i + 1, ids.join(", ")))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl TextRender for EstimateReport {
    fn render_text(&self) -> String {
        format!("{}: {} hour(s)", self.task_id, self.estimated_hours)
    }
}

impl TextRender for ReadyReport {
    fn render_text(&self) -> String {
        if self.ready.is_empty() {
            return "No tasks are ready".to_string();
        }
        self.ready
            .iter()
            .map(|task| format!("{} ({})", task.id, task.task_type))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl TextRender for StatusReport {
    fn render_text(&self) -> String {
        let mut out = String::new();
        if let Some(cr) = &self.current_cr {
            let _ = writeln!(out, "Change request: {cr}");
        }
        if let Some(description) = &self.description {
            let _ = writeln!(out, "Description: {description}");
        }
        if let Some(phase) = &self.phase {
            let _ = writeln!(out, "Phase: {phase}");
        }
        if let Some(created_at) = &self.created_at {
            let _ = writeln!(out, "Created: {created_at}");
        }
        if let Some(updated_at) = &self.updated_at {
            let _ = writeln!(out, "Updated: {updated_at}");
        }
        let _ = write!(out, "Tasks: {}", self.summary.total_tasks);
        for status in TaskStatus::ALL {
            let _ = write!(out, "\n  {status}: {}", self.summary.count(status));
        }
        let _ = write!(
            out,
            "\nQA pending: {}\nChanges requested: {}",
            self.qa.qa_pending, self.qa.changes_requested
        );
        out
    }
}

impl TextRender for DependentsReport {
    fn render_text(&self) -> String {
        if self.dependents.is_empty() {
            return format!("No tasks depend on {}", self.task_id);
        }
        self.dependents.join("\n")
    }
}
