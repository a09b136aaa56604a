//! Secondary diagnosis of tasks reported by [`Error::StuckTasks`].
//!
//! The planner deliberately reports stuck ids without classifying them. This
//! pass walks the dependency index restricted to those ids and separates
//! dependency cycles from tasks that wait on something outside the stuck set.
//!
//! [`Error::StuckTasks`]: crate::Error::StuckTasks

use crate::{Task, TaskGraph, TaskStatus};
use petgraph::algo::tarjan_scc;
use petgraph::graph::DiGraph;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;

/// Why a stuck task cannot run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BlockReason {
    /// The dependency has no task record.
    Missing {
        /// The dangling id.
        dependency: String,
    },
    /// The dependency exists but is not pending and will never complete
    /// within this plan.
    NotCompleted {
        /// The dependency id.
        dependency: String,
        /// Its status.
        status: TaskStatus,
    },
    /// The dependency is itself stuck.
    Upstream {
        /// The dependency id.
        dependency: String,
    },
}

impl fmt::Display for BlockReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing { dependency } => write!(f, "depends on missing task '{dependency}'"),
            Self::NotCompleted { dependency, status } => {
                write!(f, "depends on '{dependency}' which is {status}")
            }
            Self::Upstream { dependency } => {
                write!(f, "waits on stuck task '{dependency}'")
            }
        }
    }
}

/// A stuck task outside any cycle, with what holds it back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockedTask {
    /// The stuck task.
    pub task: String,
    /// Every unsatisfied dependency.
    pub reasons: Vec<BlockReason>,
}

/// Classification of a stuck id set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StuckDiagnosis {
    /// Dependency cycles, each sorted, including single-task self-loops.
    pub cycles: Vec<Vec<String>>,
    /// Stuck tasks that are not part of a cycle.
    pub blocked: Vec<BlockedTask>,
}

impl StuckDiagnosis {
    /// Whether nothing was diagnosed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cycles.is_empty() && self.blocked.is_empty()
    }
}

impl fmt::Display for StuckDiagnosis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for cycle in &self.cycles {
            if !first {
                writeln!(f)?;
            }
            first = false;
            write!(f, "cycle: {}", cycle.join(" -> "))?;
        }
        for blocked in &self.blocked {
            if !first {
                writeln!(f)?;
            }
            first = false;
            let reasons: Vec<String> = blocked.reasons.iter().map(ToString::to_string).collect();
            write!(f, "{}: {}", blocked.task, reasons.join("; "))?;
        }
        Ok(())
    }
}

impl TaskGraph<'_> {
    /// Classify stuck task ids into cycles and blocked tasks.
    ///
    /// Ids not present in the snapshot are ignored.
    #[must_use]
    pub fn diagnose_stuck(&self, stuck: &[String]) -> StuckDiagnosis {
        let stuck_ids: BTreeSet<&str> = stuck
            .iter()
            .map(String::as_str)
            .filter(|id| self.node(id).is_some())
            .collect();

        // Induced subgraph over the stuck ids.
        let mut sub = DiGraph::<&str, ()>::with_capacity(stuck_ids.len(), 0);
        let mut sub_nodes = HashMap::with_capacity(stuck_ids.len());
        for &id in &stuck_ids {
            sub_nodes.insert(id, sub.add_node(id));
        }
        let full = self.inner();
        for &id in &stuck_ids {
            let Some(node) = self.node(id) else { continue };
            for edge_target in full.neighbors(node) {
                let dependent = full[edge_target];
                if let (Some(&from), Some(&to)) = (sub_nodes.get(id), sub_nodes.get(dependent)) {
                    sub.add_edge(from, to, ());
                }
            }
        }

        let mut in_cycle: BTreeSet<&str> = BTreeSet::new();
        let mut cycles = Vec::new();
        for component in tarjan_scc(&sub) {
            let is_cycle = component.len() > 1
                || component
                    .first()
                    .and_then(|&node| self.tasks.get(sub[node]))
                    .is_some_and(Task::depends_on_itself);
            if !is_cycle {
                continue;
            }
            let mut members: Vec<String> =
                component.iter().map(|&node| sub[node].to_string()).collect();
            members.sort();
            in_cycle.extend(component.iter().map(|&node| sub[node]));
            cycles.push(members);
        }
        cycles.sort();

        let blocked = stuck_ids
            .iter()
            .filter(|id| !in_cycle.contains(*id))
            .filter_map(|id| self.tasks.get(id))
            .map(|task| {
                let reasons = task
                    .dependencies
                    .iter()
                    .filter_map(|dep| match self.tasks.get(dep) {
                        None => Some(BlockReason::Missing {
                            dependency: dep.clone(),
                        }),
                        Some(_) if stuck_ids.contains(dep.as_str()) => {
                            Some(BlockReason::Upstream {
                                dependency: dep.clone(),
                            })
                        }
                        Some(dep_task) if dep_task.status == TaskStatus::Completed => None,
                        Some(dep_task) => Some(BlockReason::NotCompleted {
                            dependency: dep.clone(),
                            status: dep_task.status,
                        }),
                    })
                    .collect();
                BlockedTask {
                    task: task.id.clone(),
                    reasons,
                }
            })
            .collect();

        StuckDiagnosis { cycles, blocked }
    }
}
