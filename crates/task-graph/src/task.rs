//! Task records and the immutable snapshot the planner works on.

use crate::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Kind of work a task represents.
///
/// Deserializing an unrecognised type name yields [`TaskType::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    /// User interface work.
    Frontend,
    /// Server-side work.
    Backend,
    /// Work that needs both frontend and backend capability.
    Fullstack,
    /// Validation and testing.
    Qa,
    /// Documentation.
    Docs,
    /// Anything else.
    #[default]
    Other,
}

impl TaskType {
    /// Every task type, in declaration order.
    pub const ALL: [Self; 6] = [
        Self::Frontend,
        Self::Backend,
        Self::Fullstack,
        Self::Qa,
        Self::Docs,
        Self::Other,
    ];

    /// Parse a type name, falling back to [`TaskType::Other`].
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "frontend" => Self::Frontend,
            "backend" => Self::Backend,
            "fullstack" => Self::Fullstack,
            "qa" => Self::Qa,
            "docs" => Self::Docs,
            _ => Self::Other,
        }
    }

    /// The canonical lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Frontend => "frontend",
            Self::Backend => "backend",
            Self::Fullstack => "fullstack",
            Self::Qa => "qa",
            Self::Docs => "docs",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TaskType {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        Ok(Self::from_name(&name))
    }
}

/// Lifecycle status of a task at snapshot time.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Waiting to be scheduled. The only status the wave planner schedules.
    #[default]
    Pending,
    /// Currently being worked on.
    InProgress,
    /// Done; satisfies dependencies.
    Completed,
    /// Manually held back.
    Blocked,
    /// Abandoned; never satisfies dependencies.
    Cancelled,
}

impl TaskStatus {
    /// Every status, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::Pending,
        Self::InProgress,
        Self::Completed,
        Self::Blocked,
        Self::Cancelled,
    ];

    /// The canonical snake_case name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Blocked => "blocked",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single task record as supplied by the state store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier.
    pub id: String,
    /// Kind of work.
    #[serde(rename = "type", default)]
    pub task_type: TaskType,
    /// Status at snapshot time.
    #[serde(default)]
    pub status: TaskStatus,
    /// Ids that must be completed before this task may run.
    #[serde(default)]
    pub dependencies: BTreeSet<String>,
}

impl Task {
    /// Create a pending task with no dependencies.
    pub fn new(id: impl Into<String>, task_type: TaskType) -> Self {
        Self {
            id: id.into(),
            task_type,
            status: TaskStatus::Pending,
            dependencies: BTreeSet::new(),
        }
    }

    /// Set the status.
    #[must_use]
    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    /// Add dependencies. Duplicates collapse.
    #[must_use]
    pub fn with_dependencies<I, S>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies.extend(deps.into_iter().map(Into::into));
        self
    }

    /// Whether this task lists itself as a dependency.
    #[must_use]
    pub fn depends_on_itself(&self) -> bool {
        self.dependencies.contains(&self.id)
    }
}

/// Per-status task counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatusSummary {
    /// Number of tasks in the snapshot.
    pub total_tasks: usize,
    /// Pending tasks.
    pub pending: usize,
    /// In-progress tasks.
    pub in_progress: usize,
    /// Completed tasks.
    pub completed: usize,
    /// Blocked tasks.
    pub blocked: usize,
    /// Cancelled tasks.
    pub cancelled: usize,
}

impl StatusSummary {
    /// Count for a single status.
    #[must_use]
    pub const fn count(&self, status: TaskStatus) -> usize {
        match status {
            TaskStatus::Pending => self.pending,
            TaskStatus::InProgress => self.in_progress,
            TaskStatus::Completed => self.completed,
            TaskStatus::Blocked => self.blocked,
            TaskStatus::Cancelled => self.cancelled,
        }
    }
}

/// Immutable snapshot of tasks captured for one planning run.
///
/// Tasks are keyed by id; iteration is in id order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskSet {
    tasks: BTreeMap<String, Task>,
}

impl TaskSet {
    /// Build a snapshot from task records.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateTask`] if two records share an id.
    pub fn new(tasks: impl IntoIterator<Item = Task>) -> Result<Self> {
        let mut map = BTreeMap::new();
        for task in tasks {
            if map.contains_key(&task.id) {
                return Err(Error::duplicate_task(task.id));
            }
            map.insert(task.id.clone(), task);
        }
        Ok(Self { tasks: map })
    }

    /// Look up a task by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.get(id)
    }

    /// Whether a task with this id exists.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.tasks.contains_key(id)
    }

    /// Number of tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether the snapshot is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Iterate over tasks in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.tasks.values()
    }

    /// Ids of all tasks with the given status.
    pub fn ids_with_status(&self, status: TaskStatus) -> impl Iterator<Item = &str> {
        self.iter()
            .filter(move |task| task.status == status)
            .map(|task| task.id.as_str())
    }

    /// Whether `id` refers to a task that is completed.
    #[must_use]
    pub fn is_completed(&self, id: &str) -> bool {
        self.get(id)
            .is_some_and(|task| task.status == TaskStatus::Completed)
    }

    /// Pending tasks whose dependencies are all completed right now.
    ///
    /// Unlike a full wave plan this never fails: stuck tasks are simply not
    /// ready.
    #[must_use]
    pub fn ready_tasks(&self) -> Vec<&Task> {
        self.iter()
            .filter(|task| task.status == TaskStatus::Pending)
            .filter(|task| task.dependencies.iter().all(|dep| self.is_completed(dep)))
            .collect()
    }

    /// Count tasks per status.
    #[must_use]
    pub fn status_summary(&self) -> StatusSummary {
        let mut summary = StatusSummary {
            total_tasks: self.len(),
            ..StatusSummary::default()
        };
        for task in self.iter() {
            let slot = match task.status {
                TaskStatus::Pending => &mut summary.pending,
                TaskStatus::InProgress => &mut summary.in_progress,
                TaskStatus::Completed => &mut summary.completed,
                TaskStatus::Blocked => &mut summary.blocked,
                TaskStatus::Cancelled => &mut summary.cancelled,
            };
            *slot += 1;
        }
        summary
    }
}

impl<'a> IntoIterator for &'a TaskSet {
    type Item = &'a Task;
    type IntoIter = std::collections::btree_map::Values<'a, String, Task>;

    fn into_iter(self) -> Self::IntoIter {
        self.tasks.values()
    }
}
