//! Workflow state document.
//!
//! The document is JSON written by the surrounding workflow tooling. Only the
//! task list matters for planning; the other top-level fields and the QA
//! review state of each task are surfaced by `waveplan status`. Anything
//! unrecognised is ignored.

use crate::cli::CliError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;
use waveplan_task_graph::{Task, TaskSet, TaskStatus};

/// QA verdict that sends a task back for rework.
pub const QA_CHANGES_REQUESTED: &str = "CHANGES_REQUESTED";

/// A task entry of the state document: the planning record plus its QA
/// review state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    /// Fields the planner reads.
    #[serde(flatten)]
    pub task: Task,
    /// Latest QA verdict, absent until the task has been reviewed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qa_status: Option<String>,
}

impl TaskRecord {
    /// Completed but not yet reviewed by QA.
    #[must_use]
    pub fn awaits_qa(&self) -> bool {
        self.task.status == TaskStatus::Completed
            && self.qa_status.as_deref().is_none_or(str::is_empty)
    }

    /// QA asked for changes.
    #[must_use]
    pub fn changes_requested(&self) -> bool {
        self.qa_status.as_deref() == Some(QA_CHANGES_REQUESTED)
    }
}

impl From<Task> for TaskRecord {
    fn from(task: Task) -> Self {
        Self {
            task,
            qa_status: None,
        }
    }
}

/// QA review counts across the document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct QaSummary {
    /// Completed tasks without a QA verdict.
    pub qa_pending: usize,
    /// Tasks whose QA verdict is `CHANGES_REQUESTED`.
    pub changes_requested: usize,
}

/// Parsed workflow state document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowState {
    /// Change request the workflow is tracking.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_cr: Option<String>,
    /// Free-form description of the change.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Workflow phase label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,
    /// Creation timestamp, kept verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// Last update timestamp, kept verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    /// Task records in document order.
    #[serde(default)]
    pub tasks: Vec<TaskRecord>,
}

impl WorkflowState {
    /// Read a state document from disk.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::Config`] if the file is missing or is not a valid
    /// state document.
    pub fn load(path: &Path) -> Result<Self, CliError> {
        let content = fs::read_to_string(path).map_err(|e| {
            CliError::config_with_help(
                format!("Failed to read state file {}: {e}", path.display()),
                "Pass --state-file, set WAVEPLAN_STATE_FILE, or set state_file in waveplan.toml",
            )
        })?;
        let state = Self::parse(&content).map_err(|e| match e {
            CliError::Config { message, help } => CliError::Config {
                message: format!("{}: {message}", path.display()),
                help,
            },
            other => other,
        })?;
        debug!(
            path = %path.display(),
            tasks = state.tasks.len(),
            "Loaded workflow state"
        );
        Ok(state)
    }

    /// Parse a state document from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::Config`] on malformed JSON or invalid task records.
    pub fn parse(content: &str) -> Result<Self, CliError> {
        serde_json::from_str(content).map_err(|e| {
            CliError::config_with_help(
                format!("Invalid workflow state: {e}"),
                "Task status must be one of pending, in_progress, completed, blocked, cancelled",
            )
        })
    }

    /// Snapshot the task list for planning.
    ///
    /// # Errors
    ///
    /// Returns a planning error if two records share an id.
    pub fn task_set(&self) -> Result<TaskSet, CliError> {
        TaskSet::new(self.tasks.iter().map(|record| record.task.clone()))
            .map_err(CliError::from)
    }

    /// Count tasks awaiting QA and tasks sent back by QA.
    #[must_use]
    pub fn qa_summary(&self) -> QaSummary {
        self.tasks
            .iter()
            .fold(QaSummary::default(), |mut summary, record| {
                if record.awaits_qa() {
                    summary.qa_pending += 1;
                }
                if record.changes_requested() {
                    summary.changes_requested += 1;
                }
                summary
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use waveplan_task_graph::{TaskStatus, TaskType};

    const SAMPLE: &str = r#"{
        "current_cr": "CR-42",
        "phase": "implementation",
        "created_at": "2024-05-01T09:00:00",
        "history": [{"event": "created"}],
        "tasks": [
            {"id": "t1", "title": "API", "type": "backend", "status": "completed", "dependencies": []},
            {"id": "t2", "type": "frontend", "dependencies": ["t1"], "assigned_to": "alex"},
            {"id": "t3", "type": "design"}
        ]
    }"#;

    #[test]
    fn test_parse_ignores_extra_fields() {
        let state = WorkflowState::parse(SAMPLE).unwrap();
        assert_eq!(state.current_cr.as_deref(), Some("CR-42"));
        assert_eq!(state.phase.as_deref(), Some("implementation"));
        assert_eq!(state.tasks.len(), 3);

        let tasks = state.task_set().unwrap();
        assert_eq!(tasks.get("t1").unwrap().status, TaskStatus::Completed);
        assert_eq!(tasks.get("t2").unwrap().status, TaskStatus::Pending);
        assert_eq!(tasks.get("t3").unwrap().task_type, TaskType::Other);
    }

    #[test]
    fn test_qa_summary() {
        let state = WorkflowState::parse(
            r#"{"tasks": [
                {"id": "a", "status": "completed"},
                {"id": "b", "status": "completed", "qa_status": "APPROVED"},
                {"id": "c", "status": "in_progress", "qa_status": "CHANGES_REQUESTED"},
                {"id": "d", "status": "completed", "qa_status": null},
                {"id": "e", "status": "pending"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(
            state.qa_summary(),
            QaSummary {
                qa_pending: 2,
                changes_requested: 1,
            }
        );
        assert_eq!(state.tasks[2].qa_status.as_deref(), Some("CHANGES_REQUESTED"));
        assert_eq!(state.task_set().unwrap().len(), 5);
    }

    #[test]
    fn test_missing_tasks_is_empty() {
        let state = WorkflowState::parse("{}").unwrap();
        assert!(state.task_set().unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let state =
            WorkflowState::parse(r#"{"tasks": [{"id": "a"}, {"id": "a"}]}"#).unwrap();
        let err = state.task_set().unwrap_err();
        assert_eq!(err.code(), "plan");
    }

    #[test]
    fn test_invalid_status_rejected() {
        let err = WorkflowState::parse(r#"{"tasks": [{"id": "a", "status": "done"}]}"#)
            .unwrap_err();
        assert_eq!(err.code(), "config");
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = WorkflowState::load(&dir.path().join("missing.json")).unwrap_err();
        assert!(err.to_string().contains("missing.json"));
    }

    #[test]
    fn test_load_from_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, SAMPLE).unwrap();
        assert_eq!(WorkflowState::load(&path).unwrap().tasks.len(), 3);
    }
}
