//! Wave planning: layered topological sort over pending tasks.
//!
//! Each wave holds every not-yet-scheduled task whose dependencies are all
//! completed or scheduled in an earlier wave. Tasks inside a wave carry no
//! ordering guarantee between each other; ids are kept sorted so output is
//! deterministic.

use crate::{Error, Result, TaskGraph, TaskStatus};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use tracing::debug;

/// One batch of tasks that can run concurrently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wave {
    /// 1-based position.
    pub number: usize,
    /// Task ids in this wave, sorted.
    pub tasks: Vec<String>,
}

impl Wave {
    /// Number of tasks in the wave.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether the wave is empty. Planned waves never are.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Iterate over the task ids.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tasks.iter().map(String::as_str)
    }
}

impl<'a> TaskGraph<'a> {
    /// Partition every pending task into ordered waves.
    ///
    /// Completed tasks seed the satisfied set; all other non-pending tasks
    /// are never scheduled and never satisfy a dependency.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StuckTasks`] listing every unscheduled id when
    /// pending tasks remain but none is ready.
    pub fn waves(&self) -> Result<Vec<Wave>> {
        let pending = self.tasks.ids_with_status(TaskStatus::Pending).collect();
        self.layer(pending)
    }

    /// Plan waves for exactly the given ids, regardless of their status.
    ///
    /// The completed seed is the same as for [`TaskGraph::waves`]; ids that
    /// are themselves completed are scheduled again if listed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownTask`] for an id absent from the snapshot and
    /// [`Error::StuckTasks`] when the restricted set cannot be layered.
    pub fn waves_for<'i>(&self, ids: impl IntoIterator<Item = &'i str>) -> Result<Vec<Wave>> {
        let mut pending = BTreeSet::new();
        for id in ids {
            let task = self.tasks.get(id).ok_or_else(|| Error::unknown_task(id))?;
            pending.insert(task.id.as_str());
        }
        self.layer(pending)
    }

    /// Generalized Kahn's algorithm over `pending`.
    pub(crate) fn layer(&self, mut pending: BTreeSet<&'a str>) -> Result<Vec<Wave>> {
        let tasks = self.tasks;
        let mut satisfied: HashSet<&'a str> = tasks
            .ids_with_status(TaskStatus::Completed)
            .filter(|id| !pending.contains(id))
            .collect();
        let mut waves = Vec::new();

        while !pending.is_empty() {
            let ready: Vec<&'a str> = pending
                .iter()
                .copied()
                .filter(|id| {
                    tasks.get(id).is_some_and(|task| {
                        task.dependencies
                            .iter()
                            .all(|dep| satisfied.contains(dep.as_str()))
                    })
                })
                .collect();

            if ready.is_empty() {
                debug!(
                    remaining = pending.len(),
                    scheduled_waves = waves.len(),
                    "No pending task is ready"
                );
                return Err(Error::stuck(pending));
            }

            for &id in &ready {
                pending.remove(id);
                satisfied.insert(id);
            }

            let number = waves.len() + 1;
            debug!(wave = number, tasks = ready.len(), "Planned wave");
            waves.push(Wave {
                number,
                tasks: ready.into_iter().map(String::from).collect(),
            });
        }

        Ok(waves)
    }
}
