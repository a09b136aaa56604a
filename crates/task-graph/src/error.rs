//! Error types for wave planning and estimation.

use miette::Diagnostic;
use thiserror::Error;

/// Result type for task graph operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while planning over a task snapshot.
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
pub enum Error {
    /// Pending tasks remain but none of them has all dependencies satisfied.
    ///
    /// The ids are either part of a dependency cycle or wait on a task that
    /// will never reach `completed`. No attempt is made to tell the two apart
    /// here; see [`TaskGraph::diagnose_stuck`](crate::TaskGraph::diagnose_stuck).
    #[error("{count} task(s) cannot be scheduled: {list}", count = .tasks.len(), list = .tasks.join(", "))]
    #[diagnostic(
        code(waveplan::task_graph::stuck_tasks),
        help(
            "each listed task is part of a dependency cycle or depends on a task that is missing or will never complete"
        )
    )]
    StuckTasks {
        /// Ids of every task left unscheduled, sorted.
        tasks: Vec<String>,
    },

    /// A task id was requested that is not part of the snapshot.
    #[error("Task '{task}' does not exist in the snapshot")]
    #[diagnostic(code(waveplan::task_graph::unknown_task))]
    UnknownTask {
        /// The requested id.
        task: String,
    },

    /// A wave contains a task that depends on another task of the same wave.
    ///
    /// This is a planner defect, never a data problem.
    #[error(
        "Internal invariant violated: wave {wave} schedules '{task}' together with its dependency '{dependency}'"
    )]
    #[diagnostic(
        code(waveplan::task_graph::invariant_violation),
        help("this is a bug in the wave planner, please report it with the input snapshot")
    )]
    InvariantViolation {
        /// 1-based wave number.
        wave: usize,
        /// The dependent task.
        task: String,
        /// The dependency scheduled in the same wave.
        dependency: String,
    },

    /// Two task records share the same id.
    #[error("Task id '{task}' appears more than once in the snapshot")]
    #[diagnostic(code(waveplan::task_graph::duplicate_task))]
    DuplicateTask {
        /// The duplicated id.
        task: String,
    },
}

impl Error {
    /// Create a stuck-tasks error from any collection of ids.
    ///
    /// The ids are sorted so the message is stable across runs.
    pub fn stuck<I, S>(tasks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut tasks: Vec<String> = tasks.into_iter().map(Into::into).collect();
        tasks.sort();
        tasks.dedup();
        Self::StuckTasks { tasks }
    }

    /// Create an unknown-task error.
    pub fn unknown_task(task: impl Into<String>) -> Self {
        Self::UnknownTask { task: task.into() }
    }

    /// Create a duplicate-task error.
    pub fn duplicate_task(task: impl Into<String>) -> Self {
        Self::DuplicateTask { task: task.into() }
    }

    /// Returns the stuck ids if this is a [`Error::StuckTasks`].
    #[must_use]
    pub fn stuck_tasks(&self) -> Option<&[String]> {
        match self {
            Self::StuckTasks { tasks } => Some(tasks),
            _ => None,
        }
    }
}
