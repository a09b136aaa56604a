//! Execution plan assembly.

use crate::{CapabilityAssignment, Error, Result, TaskGraph, TaskSet, TaskStatus, Wave};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

/// Summary of a single wave within an [`ExecutionPlan`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaveSummary {
    /// 1-based wave number.
    pub wave_number: usize,
    /// Number of tasks in the wave.
    pub task_count: usize,
    /// Whether no task in the wave depends on another task of the wave.
    pub can_parallelize: bool,
    /// Task ids, sorted.
    pub tasks: Vec<String>,
    /// Task ids grouped by the capability pool that must execute them.
    pub pool_assignments: CapabilityAssignment,
}

/// Complete wave plan for every pending task of a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionPlan {
    /// Number of waves.
    pub total_waves: usize,
    /// Number of pending tasks scheduled across all waves.
    pub total_tasks: usize,
    /// Waves in execution order.
    pub waves: Vec<WaveSummary>,
}

impl ExecutionPlan {
    /// Plan a snapshot in one call.
    ///
    /// # Errors
    ///
    /// See [`TaskGraph::execution_plan`].
    pub fn assemble(tasks: &TaskSet) -> Result<Self> {
        TaskGraph::new(tasks).execution_plan()
    }
}

impl TaskGraph<'_> {
    /// Find a task of `wave` that depends on another task of the same wave.
    ///
    /// Returns `(task, dependency)` for the first offending pair in id order.
    #[must_use]
    pub fn intra_wave_dependency(&self, wave: &Wave) -> Option<(String, String)> {
        let members: HashSet<&str> = wave.iter().collect();
        wave.iter()
            .filter_map(|id| self.tasks.get(id))
            .find_map(|task| {
                task.dependencies
                    .iter()
                    .find(|dep| members.contains(dep.as_str()))
                    .map(|dep| (task.id.clone(), dep.clone()))
            })
    }

    /// Layer all pending tasks and describe each wave.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StuckTasks`] when the pending set cannot be fully
    /// layered, and [`Error::InvariantViolation`] if a planned wave ever
    /// contains a task together with one of its dependencies.
    pub fn execution_plan(&self) -> Result<ExecutionPlan> {
        let waves = self.waves()?;

        let mut summaries = Vec::with_capacity(waves.len());
        for wave in waves {
            let conflict = self.intra_wave_dependency(&wave);
            let can_parallelize = conflict.is_none();
            if let Some((task, dependency)) = conflict {
                return Err(Error::InvariantViolation {
                    wave: wave.number,
                    task,
                    dependency,
                });
            }
            let pool_assignments = self.group_by_capability(wave.iter());
            summaries.push(WaveSummary {
                wave_number: wave.number,
                task_count: wave.len(),
                can_parallelize,
                tasks: wave.tasks,
                pool_assignments,
            });
        }

        let total_tasks = self.tasks.ids_with_status(TaskStatus::Pending).count();
        debug!(waves = summaries.len(), tasks = total_tasks, "Assembled execution plan");

        Ok(ExecutionPlan {
            total_waves: summaries.len(),
            total_tasks,
            waves: summaries,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CapabilityPool, Task, TaskType};

    fn sample() -> TaskSet {
        TaskSet::new([
            Task::new("schema", TaskType::Backend).with_status(TaskStatus::Completed),
            Task::new("api", TaskType::Backend).with_dependencies(["schema"]),
            Task::new("ui", TaskType::Frontend),
            Task::new("checkout", TaskType::Fullstack).with_dependencies(["api", "ui"]),
            Task::new("e2e", TaskType::Qa).with_dependencies(["checkout"]),
            Task::new("guide", TaskType::Docs).with_dependencies(["checkout"]),
            Task::new("old", TaskType::Other).with_status(TaskStatus::Cancelled),
        ])
        .unwrap()
    }

    #[test]
    fn test_plan_shape() {
        let plan = ExecutionPlan::assemble(&sample()).unwrap();
        assert_eq!(plan.total_waves, 3);
        assert_eq!(plan.total_tasks, 5);

        let first = &plan.waves[0];
        assert_eq!(first.wave_number, 1);
        assert_eq!(first.task_count, 2);
        assert_eq!(first.tasks, vec!["api", "ui"]);
        assert!(first.can_parallelize);

        let second = &plan.waves[1];
        assert_eq!(second.tasks, vec!["checkout"]);
        assert!(second.pool_assignments[&CapabilityPool::Frontend].contains("checkout"));
        assert!(second.pool_assignments[&CapabilityPool::Backend].contains("checkout"));

        let third = &plan.waves[2];
        assert_eq!(third.tasks, vec!["e2e", "guide"]);
        assert_eq!(third.pool_assignments.len(), 2);
    }

    #[test]
    fn test_parallel_flag_reflects_independence_check() {
        let tasks = sample();
        let graph = TaskGraph::new(&tasks);
        let plan = graph.execution_plan().unwrap();
        for (summary, wave) in plan.waves.iter().zip(graph.waves().unwrap()) {
            assert_eq!(
                summary.can_parallelize,
                graph.intra_wave_dependency(&wave).is_none()
            );
            assert!(summary.can_parallelize);
        }
    }

    #[test]
    fn test_plan_task_count_matches_waves() {
        let plan = ExecutionPlan::assemble(&sample()).unwrap();
        let scheduled: usize = plan.waves.iter().map(|w| w.task_count).sum();
        assert_eq!(scheduled, plan.total_tasks);
    }

    #[test]
    fn test_plan_propagates_stuck_tasks() {
        let tasks = TaskSet::new([
            Task::new("a", TaskType::Backend).with_dependencies(["b"]),
            Task::new("b", TaskType::Backend).with_dependencies(["a"]),
        ])
        .unwrap();
        assert_eq!(
            ExecutionPlan::assemble(&tasks).unwrap_err(),
            Error::stuck(["a", "b"])
        );
    }

    #[test]
    fn test_empty_plan() {
        let plan = ExecutionPlan::assemble(&TaskSet::default()).unwrap();
        assert_eq!(plan.total_waves, 0);
        assert_eq!(plan.total_tasks, 0);
        assert!(plan.waves.is_empty());
    }

    #[test]
    fn test_intra_wave_dependency_detected() {
        let tasks = sample();
        let graph = TaskGraph::new(&tasks);
        let bogus = Wave {
            number: 1,
            tasks: vec!["api".to_string(), "checkout".to_string()],
        };
        assert_eq!(
            graph.intra_wave_dependency(&bogus),
            Some(("checkout".to_string(), "api".to_string()))
        );
    }

    #[test]
    fn test_plan_json_round_trip() {
        let plan = ExecutionPlan::assemble(&sample()).unwrap();
        let json = serde_json::to_string(&plan).unwrap();
        assert!(json.contains("\"frontend-pool\""));
        let decoded: ExecutionPlan = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, plan);
    }
}
