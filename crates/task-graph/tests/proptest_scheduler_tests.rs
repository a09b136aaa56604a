//! Property-based tests for wave planning invariants.
//!
//! These tests verify the behavioral contracts of the planner:
//! - Waves partition the pending set exactly
//! - Every pending dependency lands in an earlier wave
//! - Planning is deterministic for an unchanged snapshot
//! - Cycles and dangling dependencies surface as stuck tasks

use proptest::prelude::*;
use std::collections::{HashMap, HashSet};
use waveplan_task_graph::{
    DurationTable, Error, ExecutionPlan, Task, TaskGraph, TaskSet, TaskStatus, TaskType,
};

// =============================================================================
// Strategies for generating test data
// =============================================================================

/// Generate a valid task id (lowercase alphanumeric with underscores).
fn task_name_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,10}".prop_map(String::from)
}

fn task_type_strategy() -> impl Strategy<Value = TaskType> {
    proptest::sample::select(TaskType::ALL.to_vec())
}

/// Pending or completed: the statuses that keep a DAG fully resolvable.
fn resolvable_status_strategy() -> impl Strategy<Value = TaskStatus> {
    prop_oneof![
        3 => Just(TaskStatus::Pending),
        1 => Just(TaskStatus::Completed),
    ]
}

/// Generate an acyclic snapshot with a specified number of tasks.
///
/// The strategy ensures no cycles by only allowing dependencies on tasks
/// with lower indices (tasks added earlier in the sequence).
fn dag_strategy(min_tasks: usize, max_tasks: usize) -> impl Strategy<Value = Vec<Task>> {
    (min_tasks..=max_tasks).prop_flat_map(|task_count| {
        (
            proptest::collection::vec(task_name_strategy(), task_count),
            proptest::collection::vec(task_type_strategy(), task_count),
            proptest::collection::vec(resolvable_status_strategy(), task_count),
        )
            .prop_flat_map(move |(names, types, statuses)| {
                // Deduplicate names by appending index
                let unique_names: Vec<String> = names
                    .into_iter()
                    .enumerate()
                    .map(|(i, name)| format!("{name}_{i}"))
                    .collect();

                let dep_strategies: Vec<_> = (0..task_count)
                    .map(|i| {
                        if i == 0 {
                            Just(vec![]).boxed()
                        } else {
                            let earlier: Vec<String> = unique_names[..i].to_vec();
                            proptest::collection::vec(
                                proptest::sample::select(earlier),
                                0..=i.min(3),
                            )
                            .boxed()
                        }
                    })
                    .collect();

                let names = unique_names.clone();
                dep_strategies.prop_map(move |all_deps| {
                    names
                        .iter()
                        .zip(&types)
                        .zip(&statuses)
                        .zip(all_deps)
                        .map(|(((name, &ty), &status), deps)| {
                            Task::new(name.clone(), ty)
                                .with_status(status)
                                .with_dependencies(deps)
                        })
                        .collect::<Vec<_>>()
                })
            })
    })
}

/// Generate a pending ring of tasks: each depends on the previous, the first
/// on the last.
fn cyclic_strategy() -> impl Strategy<Value = Vec<Task>> {
    (1..=6_usize).prop_flat_map(|task_count| {
        proptest::collection::vec(task_name_strategy(), task_count).prop_map(move |names| {
            let unique: Vec<String> = names
                .into_iter()
                .enumerate()
                .map(|(i, name)| format!("{name}_{i}"))
                .collect();
            (0..task_count)
                .map(|i| {
                    let dep = if i == 0 {
                        unique[task_count - 1].clone()
                    } else {
                        unique[i - 1].clone()
                    };
                    Task::new(unique[i].clone(), TaskType::Backend).with_dependencies([dep])
                })
                .collect()
        })
    })
}

// =============================================================================
// Helper Functions
// =============================================================================

fn pending_ids(tasks: &[Task]) -> HashSet<String> {
    tasks
        .iter()
        .filter(|t| t.status == TaskStatus::Pending)
        .map(|t| t.id.clone())
        .collect()
}

// =============================================================================
// Property Tests: Wave Planning
// =============================================================================

proptest! {
    /// Contract: The union of all waves is exactly the pending set, with no
    /// id repeated.
    #[test]
    fn waves_partition_pending_set(tasks in dag_strategy(1, 20)) {
        let expected = pending_ids(&tasks);
        let snapshot = TaskSet::new(tasks).expect("ids are unique");
        let waves = TaskGraph::new(&snapshot).waves().expect("DAG should plan");

        let mut seen = HashSet::new();
        for wave in &waves {
            prop_assert!(!wave.is_empty(), "Planned waves are never empty");
            for id in wave.iter() {
                prop_assert!(seen.insert(id.to_string()), "Task '{}' scheduled twice", id);
            }
        }
        prop_assert_eq!(seen, expected);
    }

    /// Contract: Every pending dependency appears in a strictly earlier wave.
    #[test]
    fn waves_respect_dependency_order(tasks in dag_strategy(2, 20)) {
        let snapshot = TaskSet::new(tasks).expect("ids are unique");
        let waves = TaskGraph::new(&snapshot).waves().expect("DAG should plan");

        let wave_of: HashMap<&str, usize> = waves
            .iter()
            .flat_map(|w| w.iter().map(move |id| (id, w.number)))
            .collect();

        for (id, &number) in &wave_of {
            let task = snapshot.get(id).expect("scheduled ids exist");
            for dep in &task.dependencies {
                let dep_task = snapshot.get(dep).expect("generated deps exist");
                if dep_task.status == TaskStatus::Pending {
                    let dep_number = wave_of[dep.as_str()];
                    prop_assert!(
                        dep_number < number,
                        "Dependency '{}' (wave {}) should precede '{}' (wave {})",
                        dep, dep_number, id, number
                    );
                }
            }
        }
    }

    /// Contract: Assembled plans never flag a wave as non-parallel and count
    /// every pending task once.
    #[test]
    fn plan_waves_are_independent(tasks in dag_strategy(1, 20)) {
        let pending = pending_ids(&tasks).len();
        let snapshot = TaskSet::new(tasks).expect("ids are unique");
        let plan = ExecutionPlan::assemble(&snapshot).expect("DAG should plan");

        prop_assert_eq!(plan.total_tasks, pending);
        prop_assert_eq!(plan.total_waves, plan.waves.len());
        prop_assert!(plan.waves.iter().all(|w| w.can_parallelize));
        let scheduled: usize = plan.waves.iter().map(|w| w.task_count).sum();
        prop_assert_eq!(scheduled, pending);
    }

    /// Contract: Planning twice over the same snapshot yields the same waves.
    #[test]
    fn planning_is_idempotent(tasks in dag_strategy(2, 12)) {
        let snapshot = TaskSet::new(tasks).expect("ids are unique");
        let first = ExecutionPlan::assemble(&snapshot).expect("DAG should plan");
        let second = ExecutionPlan::assemble(&snapshot.clone()).expect("DAG should plan");
        prop_assert_eq!(first, second);
    }
}

// =============================================================================
// Property Tests: Stuck Detection
// =============================================================================

proptest! {
    /// Contract: Every member of a pending ring is reported stuck.
    #[test]
    fn cycles_are_reported_stuck(tasks in cyclic_strategy()) {
        let mut expected: Vec<String> = tasks.iter().map(|t| t.id.clone()).collect();
        expected.sort();
        let snapshot = TaskSet::new(tasks).expect("ids are unique");
        let graph = TaskGraph::new(&snapshot);

        let err = graph.waves().expect_err("cycle must not plan");
        prop_assert_eq!(&err, &Error::StuckTasks { tasks: expected.clone() });

        let diagnosis = graph.diagnose_stuck(err.stuck_tasks().unwrap_or_default());
        prop_assert_eq!(diagnosis.cycles, vec![expected]);
        prop_assert!(diagnosis.blocked.is_empty());
    }

    /// Contract: A dangling dependency makes its task stuck.
    #[test]
    fn dangling_dependency_is_stuck(mut tasks in dag_strategy(1, 12)) {
        tasks.push(Task::new("orphan", TaskType::Qa).with_dependencies(["__missing__"]));
        let snapshot = TaskSet::new(tasks).expect("ids are unique");

        let err = TaskGraph::new(&snapshot).waves().expect_err("orphan cannot plan");
        let stuck = err.stuck_tasks().unwrap_or_default();
        prop_assert_eq!(stuck, &["orphan".to_string()][..]);
    }
}

// =============================================================================
// Property Tests: Estimation
// =============================================================================

proptest! {
    /// Contract: An estimate is at least the task's own duration and at most
    /// the serial sum of its unfinished closure. Completed tasks cost zero.
    #[test]
    fn estimate_is_bounded(tasks in dag_strategy(1, 15)) {
        let snapshot = TaskSet::new(tasks).expect("ids are unique");
        let graph = TaskGraph::new(&snapshot);
        let table = DurationTable::default();

        for task in &snapshot {
            let estimate = graph
                .estimate_completion(&task.id, &table)
                .expect("DAG closures always layer");
            let closure = graph.dependency_closure(&task.id).expect("task exists");
            if task.status == TaskStatus::Completed {
                prop_assert_eq!(estimate, 0);
                continue;
            }

            let serial: u64 = closure
                .iter()
                .filter_map(|id| snapshot.get(id))
                .filter(|t| t.status != TaskStatus::Completed)
                .map(|t| table.for_task(t))
                .sum();

            prop_assert!(estimate <= serial, "{} > serial {}", estimate, serial);
            prop_assert!(estimate >= table.for_task(task));
        }
    }
}
