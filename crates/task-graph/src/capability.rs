//! Capability pools: which category of worker may execute a task.

use crate::{TaskGraph, TaskType};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tracing::trace;

/// A named category of worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CapabilityPool {
    /// Frontend developers.
    #[serde(rename = "frontend-pool")]
    Frontend,
    /// Backend developers.
    #[serde(rename = "backend-pool")]
    Backend,
    /// QA validators.
    #[serde(rename = "qa-pool")]
    Qa,
    /// Documentation writers.
    #[serde(rename = "docs-pool")]
    Docs,
    /// General-purpose workers.
    #[serde(rename = "general-pool")]
    General,
}

impl CapabilityPool {
    /// Pools required by a task type.
    ///
    /// Fullstack work needs both frontend and backend capability at once.
    #[must_use]
    pub const fn for_type(task_type: TaskType) -> &'static [Self] {
        match task_type {
            TaskType::Frontend => &[Self::Frontend],
            TaskType::Backend => &[Self::Backend],
            TaskType::Fullstack => &[Self::Frontend, Self::Backend],
            TaskType::Qa => &[Self::Qa],
            TaskType::Docs => &[Self::Docs],
            TaskType::Other => &[Self::General],
        }
    }

    /// The pool name as used in plans.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Frontend => "frontend-pool",
            Self::Backend => "backend-pool",
            Self::Qa => "qa-pool",
            Self::Docs => "docs-pool",
            Self::General => "general-pool",
        }
    }
}

impl fmt::Display for CapabilityPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Task ids of one wave grouped by the pool that must execute them.
pub type CapabilityAssignment = BTreeMap<CapabilityPool, BTreeSet<String>>;

impl TaskGraph<'_> {
    /// Group task ids by capability pool.
    ///
    /// Ids not present in the snapshot are skipped.
    #[must_use]
    pub fn group_by_capability<'i>(
        &self,
        ids: impl IntoIterator<Item = &'i str>,
    ) -> CapabilityAssignment {
        let mut grouped = CapabilityAssignment::new();
        for id in ids {
            let Some(task) = self.tasks.get(id) else {
                trace!(task = id, "Skipping unknown task while grouping");
                continue;
            };
            for &pool in CapabilityPool::for_type(task.task_type) {
                grouped.entry(pool).or_default().insert(task.id.clone());
            }
        }
        grouped
    }
}
