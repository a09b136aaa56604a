//! Subcommand execution.

use crate::cli::{CliError, Commands, OutputFormat};
use crate::render::{
    DependentsReport, EstimateReport, ReadyReport, ReadyTask, StatusReport, WavesReport, render,
};
use crate::state::WorkflowState;
use tracing::{info, warn};
use waveplan_task_graph::{DurationTable, Error as PlanError, TaskGraph};

/// Run one subcommand against a loaded workflow state and return its
/// rendered output.
///
/// # Errors
///
/// Returns a [`CliError`] when the snapshot is invalid, cannot be planned,
/// or names an unknown task.
pub fn execute(
    command: &Commands,
    state: &WorkflowState,
    durations: &DurationTable,
    format: OutputFormat,
) -> Result<String, CliError> {
    let tasks = state.task_set()?;
    let graph = TaskGraph::new(&tasks);

    for dangling in graph.dangling_dependencies() {
        warn!(dependency = *dangling, "Dependency does not match any task");
    }

    match command {
        Commands::Plan => {
            let plan = graph
                .execution_plan()
                .map_err(|e| planning_error(&graph, e))?;
            info!(
                waves = plan.total_waves,
                tasks = plan.total_tasks,
                "Planned execution"
            );
            render(&plan, format)
        }
        Commands::Waves => {
            let waves = graph.waves().map_err(|e| planning_error(&graph, e))?;
            let report = WavesReport {
                total_waves: waves.len(),
                waves: waves.into_iter().map(|wave| wave.tasks).collect(),
            };
            render(&report, format)
        }
        Commands::Estimate { task_id } => {
            let estimated_hours = graph
                .estimate_completion(task_id, durations)
                .map_err(|e| planning_error(&graph, e))?;
            render(
                &EstimateReport {
                    task_id: task_id.clone(),
                    estimated_hours,
                },
                format,
            )
        }
        Commands::Ready => {
            let ready: Vec<ReadyTask> = tasks
                .ready_tasks()
                .into_iter()
                .map(|task| ReadyTask {
                    id: task.id.clone(),
                    task_type: task.task_type,
                })
                .collect();
            let report = ReadyReport {
                count: ready.len(),
                ready,
            };
            render(&report, format)
        }
        Commands::Status => render(
            &StatusReport {
                current_cr: state.current_cr.clone(),
                description: state.description.clone(),
                phase: state.phase.clone(),
                summary: tasks.status_summary(),
                qa: state.qa_summary(),
                created_at: state.created_at.clone(),
                updated_at: state.updated_at.clone(),
            },
            format,
        ),
        Commands::Dependents { task_id } => {
            if !tasks.contains(task_id) {
                return Err(PlanError::unknown_task(task_id.as_str()).into());
            }
            let dependents = graph
                .dependents(task_id)
                .into_iter()
                .map(str::to_string)
                .collect();
            render(
                &DependentsReport {
                    task_id: task_id.clone(),
                    dependents,
                },
                format,
            )
        }
    }
}

/// Attach a stuck-task diagnosis to planner failures where one applies.
fn planning_error(graph: &TaskGraph<'_>, err: PlanError) -> CliError {
    match err.stuck_tasks() {
        Some(stuck) => {
            let diagnosis = graph.diagnose_stuck(stuck);
            warn!(
                stuck = stuck.len(),
                cycles = diagnosis.cycles.len(),
                "Tasks cannot be scheduled"
            );
            CliError::stuck(&err, &diagnosis)
        }
        None => err.into(),
    }
}
