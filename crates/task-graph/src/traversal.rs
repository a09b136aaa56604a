//! Dependency closure traversal.

use crate::{Error, Result, Task, TaskGraph};
use std::collections::HashSet;
use tracing::trace;

impl<'a> TaskGraph<'a> {
    /// The task and everything it transitively depends on, in post-order.
    ///
    /// Dependencies are emitted before the tasks that need them and `task_id`
    /// comes last. A visited set guards against cycles, so the traversal
    /// always terminates; a cycle simply stops expanding at the first
    /// revisited node. Dependency ids with no task record are left out.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownTask`] if `task_id` is not in the snapshot.
    pub fn dependency_closure(&self, task_id: &str) -> Result<Vec<&'a str>> {
        let tasks = self.tasks;
        let root = tasks
            .get(task_id)
            .ok_or_else(|| Error::unknown_task(task_id))?;

        let mut order = Vec::new();
        let mut visited: HashSet<&'a str> = HashSet::new();
        // (task, children already pushed)
        let mut stack: Vec<(&'a Task, bool)> = vec![(root, false)];

        while let Some((task, expanded)) = stack.pop() {
            if expanded {
                order.push(task.id.as_str());
                continue;
            }
            if !visited.insert(task.id.as_str()) {
                continue;
            }
            stack.push((task, true));

            // Reversed so dependencies are visited in id order.
            for dep in task.dependencies.iter().rev() {
                if visited.contains(dep.as_str()) {
                    continue;
                }
                match tasks.get(dep) {
                    Some(dep_task) => stack.push((dep_task, false)),
                    None => trace!(task = %task.id, dependency = %dep, "Dependency has no task record"),
                }
            }
        }

        Ok(order)
    }
}
