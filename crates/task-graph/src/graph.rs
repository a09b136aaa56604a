//! Dependency index over a task snapshot, built with petgraph.
//!
//! The index holds one node per task and one edge per resolvable dependency,
//! pointing from the dependency to its dependent. It answers reverse-edge
//! queries and backs the stuck-task diagnosis; the wave planner itself only
//! looks at each task's own dependency set.

use crate::TaskSet;
use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

/// Planning view over one [`TaskSet`].
///
/// Construction builds the dependency index once; every planning method
/// borrows the snapshot and leaves it untouched, so a `TaskGraph` can be
/// shared freely between threads.
#[derive(Debug, Clone)]
pub struct TaskGraph<'a> {
    pub(crate) tasks: &'a TaskSet,
    /// Edges run dependency -> dependent.
    graph: DiGraph<&'a str, ()>,
    id_to_node: HashMap<&'a str, NodeIndex>,
    /// Dependency ids that do not name any task in the snapshot.
    dangling: BTreeSet<&'a str>,
}

impl<'a> TaskGraph<'a> {
    /// Build the dependency index for a snapshot.
    #[must_use]
    pub fn new(tasks: &'a TaskSet) -> Self {
        let mut graph = DiGraph::with_capacity(tasks.len(), 0);
        let mut id_to_node = HashMap::with_capacity(tasks.len());

        for task in tasks {
            let node = graph.add_node(task.id.as_str());
            id_to_node.insert(task.id.as_str(), node);
        }

        let mut dangling = BTreeSet::new();
        for task in tasks {
            let dependent = id_to_node[task.id.as_str()];
            for dep in &task.dependencies {
                if let Some(&dependency) = id_to_node.get(dep.as_str()) {
                    graph.add_edge(dependency, dependent, ());
                } else {
                    dangling.insert(dep.as_str());
                }
            }
        }

        debug!(
            tasks = graph.node_count(),
            edges = graph.edge_count(),
            dangling = dangling.len(),
            "Built dependency index"
        );

        Self {
            tasks,
            graph,
            id_to_node,
            dangling,
        }
    }

    /// Number of tasks in the graph.
    #[must_use]
    pub fn task_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of dependency edges between tasks of the snapshot.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Ids of tasks that list `id` as a dependency.
    ///
    /// Returns an empty set for unknown ids.
    #[must_use]
    pub fn dependents(&self, id: &str) -> BTreeSet<&'a str> {
        self.id_to_node
            .get(id)
            .map(|&node| {
                self.graph
                    .neighbors_directed(node, Direction::Outgoing)
                    .map(|dependent| self.graph[dependent])
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Dependency ids referenced by some task but absent from the snapshot.
    #[must_use]
    pub const fn dangling_dependencies(&self) -> &BTreeSet<&'a str> {
        &self.dangling
    }

    pub(crate) fn node(&self, id: &str) -> Option<NodeIndex> {
        self.id_to_node.get(id).copied()
    }

    pub(crate) const fn inner(&self) -> &DiGraph<&'a str, ()> {
        &self.graph
    }
}
