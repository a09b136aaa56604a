//! Dependency-aware wave planning for task snapshots.
//!
//! Given a snapshot of tasks with a type, a status and declared
//! dependencies, this crate partitions pending tasks into ordered waves,
//! assigns every wave's tasks to capability pools, and estimates completion
//! time under a fork-join model where a wave lasts as long as its slowest
//! task.
//!
//! # Key Types
//!
//! - [`TaskSet`]: immutable snapshot of [`Task`] records
//! - [`TaskGraph`]: dependency index built once per planning run; all
//!   planning operations hang off it
//! - [`ExecutionPlan`]: waves with pool assignments, ready for rendering
//! - [`DurationTable`]: per-type (and per-task) duration estimates
//!
//! # Example
//!
//! ```
//! use waveplan_task_graph::{DurationTable, Task, TaskGraph, TaskSet, TaskType};
//!
//! let tasks = TaskSet::new([
//!     Task::new("api", TaskType::Backend),
//!     Task::new("worker", TaskType::Backend),
//!     Task::new("verify", TaskType::Qa).with_dependencies(["api", "worker"]),
//! ])?;
//!
//! let graph = TaskGraph::new(&tasks);
//! let waves = graph.waves()?;
//! assert_eq!(waves.len(), 2);
//!
//! let hours = graph.estimate_completion("verify", &DurationTable::default())?;
//! assert_eq!(hours, 8);
//! # Ok::<(), waveplan_task_graph::Error>(())
//! ```

mod capability;
mod diagnosis;
mod error;
mod estimate;
mod graph;
mod plan;
mod task;
mod traversal;
mod waves;

pub use capability::{CapabilityAssignment, CapabilityPool};
pub use diagnosis::{BlockReason, BlockedTask, StuckDiagnosis};
pub use error::{Error, Result};
pub use estimate::DurationTable;
pub use graph::TaskGraph;
pub use plan::{ExecutionPlan, WaveSummary};
pub use task::{StatusSummary, Task, TaskSet, TaskStatus, TaskType};
pub use waves::Wave;
