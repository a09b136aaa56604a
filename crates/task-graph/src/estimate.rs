//! Critical-path completion estimates.
//!
//! A task's estimate is computed over its dependency closure: the closure is
//! layered into waves, every wave lasts as long as its slowest member, and the
//! wave durations are summed. Resource contention between pools is ignored.

use crate::{Result, Task, TaskGraph, TaskType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Estimated duration per task type, with optional per-task overrides.
///
/// Units are up to the caller (hours in the default table).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DurationTable {
    /// Duration of a frontend task.
    pub frontend: u64,
    /// Duration of a backend task.
    pub backend: u64,
    /// Duration of a fullstack task.
    pub fullstack: u64,
    /// Duration of a QA task.
    pub qa: u64,
    /// Duration of a documentation task.
    pub docs: u64,
    /// Duration of any other task.
    pub other: u64,
    /// Per-task overrides keyed by task id. These win over the type table.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub tasks: BTreeMap<String, u64>,
}

impl Default for DurationTable {
    fn default() -> Self {
        Self {
            frontend: 4,
            backend: 6,
            fullstack: 8,
            qa: 2,
            docs: 1,
            other: 4,
            tasks: BTreeMap::new(),
        }
    }
}

impl DurationTable {
    /// Duration for a task type.
    #[must_use]
    pub const fn for_type(&self, task_type: TaskType) -> u64 {
        match task_type {
            TaskType::Frontend => self.frontend,
            TaskType::Backend => self.backend,
            TaskType::Fullstack => self.fullstack,
            TaskType::Qa => self.qa,
            TaskType::Docs => self.docs,
            TaskType::Other => self.other,
        }
    }

    /// Duration for a specific task, honouring per-task overrides.
    #[must_use]
    pub fn for_task(&self, task: &Task) -> u64 {
        self.tasks
            .get(&task.id)
            .copied()
            .unwrap_or_else(|| self.for_type(task.task_type))
    }
}

impl TaskGraph<'_> {
    /// Estimate how long until `task_id` completes, assuming every wave of
    /// its dependency closure runs fully in parallel.
    ///
    /// Every closure member that is not completed is planned with
    /// [`TaskGraph::waves_for`] and counts as remaining work, whatever its
    /// status. Completed members satisfy dependencies and cost nothing; a
    /// completed `task_id` estimates to zero.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownTask`](crate::Error::UnknownTask) if `task_id`
    /// is absent, and [`Error::StuckTasks`](crate::Error::StuckTasks) if the
    /// closure contains a cycle or depends on a missing task.
    pub fn estimate_completion(&self, task_id: &str, durations: &DurationTable) -> Result<u64> {
        let tasks = self.tasks;
        let closure = self.dependency_closure(task_id)?;
        if tasks.is_completed(task_id) {
            debug!(task = task_id, "Task already completed");
            return Ok(0);
        }

        let remaining = closure.into_iter().filter(|&id| !tasks.is_completed(id));
        let waves = self.waves_for(remaining)?;

        let mut total: u64 = 0;
        for wave in &waves {
            let slowest = wave
                .iter()
                .filter_map(|id| tasks.get(id))
                .map(|task| durations.for_task(task))
                .max()
                .unwrap_or(0);
            debug!(task = task_id, wave = wave.number, duration = slowest, "Wave estimate");
            total = total.saturating_add(slowest);
        }

        debug!(task = task_id, waves = waves.len(), total, "Estimated completion");
        Ok(total)
    }
}
