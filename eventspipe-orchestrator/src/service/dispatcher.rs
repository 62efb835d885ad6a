//! Dispatcher
//!
//! Top-level orchestration entry point. Receives an event, matches it
//! against the enabled definitions, creates the pipeline and task records,
//! builds the execution chain, and hands it to the execution backend.
//! Bookkeeping is synchronous; step execution is not.

use eventspipe_core::domain::chain::{build_chain, initial_context};
use eventspipe_core::domain::definition::{TaskBinding, execution_plan};
use eventspipe_core::domain::event::Event;
use eventspipe_core::domain::pipeline::Pipeline;
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::repository::{binding_repository, pipeline_repository, task_repository};
use crate::service::execution::{ExecutionBackend, ExecutionError};
use crate::service::matcher;
use crate::service::tracking::{self, TrackingError};

/// Service error type
#[derive(Debug)]
pub enum DispatchError {
    DatabaseError(sqlx::Error),
    TrackingError(TrackingError),
    ExecutionError(ExecutionError),
}

impl From<sqlx::Error> for DispatchError {
    fn from(err: sqlx::Error) -> Self {
        DispatchError::DatabaseError(err)
    }
}

impl From<TrackingError> for DispatchError {
    fn from(err: TrackingError) -> Self {
        DispatchError::TrackingError(err)
    }
}

impl From<ExecutionError> for DispatchError {
    fn from(err: ExecutionError) -> Self {
        DispatchError::ExecutionError(err)
    }
}

/// Identity of the node creating pipeline records
pub fn node_name() -> String {
    std::env::var("NODE_NAME")
        .or_else(|_| std::env::var("HOSTNAME"))
        .unwrap_or_else(|_| "undefined".to_string())
}

/// Submit an event for a principal.
///
/// Creates one pipeline per matched definition and returns the created
/// instances; execution is already running asynchronously when this returns.
/// An empty result means no enabled definition matched, which is a normal
/// outcome, not an error.
pub async fn submit(
    pool: &PgPool,
    backend: &Arc<dyn ExecutionBackend>,
    principal: &str,
    event: &Event,
) -> Result<Vec<Pipeline>, DispatchError> {
    let definitions = matcher::matching_definitions(pool, event).await?;

    if definitions.is_empty() {
        tracing::debug!("No enabled definition matches event '{}'", event.name);
        return Ok(Vec::new());
    }

    let run_name = event.run_name();
    let node = node_name();
    let mut pipelines = Vec::with_capacity(definitions.len());

    for definition in definitions {
        let pipeline =
            pipeline_repository::create(pool, &run_name, principal, &node, definition.id).await?;

        tracing::info!(
            "Pipeline {} created for event '{}' (definition {})",
            pipeline.id,
            event.name,
            definition.id
        );

        tracking::log(
            pool,
            pipeline.id,
            &format!(
                "Event received {}",
                serde_json::to_string(event).unwrap_or_default()
            ),
        )
        .await?;

        // Resolve the execution plan and create one queued task per step.
        let bound = binding_repository::find_bound_tasks(pool, definition.id).await?;
        let bindings: Vec<TaskBinding> = bound.iter().map(|b| b.binding.clone()).collect();
        let functions: HashMap<Uuid, String> = bound
            .into_iter()
            .map(|b| (b.binding.id, b.function))
            .collect();

        let plan = execution_plan(&bindings);
        let plan_binding_ids: Vec<Uuid> = plan.iter().map(|binding| binding.id).collect();
        let tasks = task_repository::create_for_plan(pool, pipeline.id, &plan_binding_ids).await?;

        if tasks.is_empty() {
            // A plan with no enabled bindings completes immediately without
            // ever entering running state.
            pipeline_repository::finalize_empty(pool, pipeline.id).await?;
            tracking::log(pool, pipeline.id, "No tasks defined, pipeline complete.").await?;
            pipelines.push(refreshed(pool, pipeline).await?);
            continue;
        }

        pipeline_repository::set_plan_size(pool, pipeline.id, tasks.len() as i32).await?;

        let context = initial_context(pipeline.id, event, &definition.options);
        let steps: Vec<(Uuid, String)> = tasks
            .iter()
            .zip(plan.iter())
            .map(|(task, binding)| {
                (
                    task.id,
                    functions.get(&binding.id).cloned().unwrap_or_default(),
                )
            })
            .collect();

        let chain = build_chain(pipeline.id, steps, context);
        backend.submit(chain).await?;

        pipelines.push(refreshed(pool, pipeline).await?);
    }

    Ok(pipelines)
}

/// Re-read a pipeline so callers observe the bookkeeping applied above;
/// falls back to the in-memory copy if the row vanished meanwhile.
async fn refreshed(pool: &PgPool, pipeline: Pipeline) -> Result<Pipeline, DispatchError> {
    let current = pipeline_repository::find_by_id(pool, pipeline.id).await?;
    Ok(current.unwrap_or(pipeline))
}
