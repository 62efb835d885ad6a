//! Execution Backend
//!
//! Boundary to the asynchronous execution substrate. The engine only builds
//! and submits chains; the backend owns step execution. `submit` returns as
//! soon as the chain is handed off, before any step has run.
//!
//! The local backend walks each chain in its own tokio task: steps of one
//! pipeline run strictly sequentially, chains of different pipelines run
//! concurrently. Every step is wrapped in the tracking transitions, so a
//! failing step body is logged against the pipeline, converted into the
//! failure cascade, and re-raised as a step-failed error. The engine never
//! retries.

use async_trait::async_trait;
use eventspipe_core::domain::chain::TaskChain;
use sqlx::PgPool;
use std::sync::Arc;

use crate::service::registry::{TaskContext, TaskRegistry};
use crate::service::tracking::{self, TrackingError};

/// Execution error type
#[derive(Debug)]
pub enum ExecutionError {
    StepFailed(String),
    Tracking(TrackingError),
}

impl From<TrackingError> for ExecutionError {
    fn from(err: TrackingError) -> Self {
        ExecutionError::Tracking(err)
    }
}

/// Asynchronous execution substrate accepting linear chains.
///
/// Each step's return value becomes the next step's sole input; step
/// exceptions surface through the tracking transitions.
#[async_trait]
pub trait ExecutionBackend: Send + Sync {
    async fn submit(&self, chain: TaskChain) -> Result<(), ExecutionError>;
}

/// In-process backend executing chains on the tokio runtime
pub struct LocalExecutionBackend {
    pool: PgPool,
    registry: Arc<TaskRegistry>,
    node: String,
}

impl LocalExecutionBackend {
    pub fn new(pool: PgPool, registry: Arc<TaskRegistry>, node: String) -> Self {
        Self {
            pool,
            registry,
            node,
        }
    }
}

#[async_trait]
impl ExecutionBackend for LocalExecutionBackend {
    async fn submit(&self, chain: TaskChain) -> Result<(), ExecutionError> {
        let pool = self.pool.clone();
        let registry = Arc::clone(&self.registry);
        let node = self.node.clone();
        let pipeline_id = chain.pipeline_id;

        tracing::debug!(
            "Submitting chain of {} step(s) for pipeline {}",
            chain.steps.len(),
            pipeline_id
        );

        tokio::spawn(async move {
            if let Err(e) = run_chain(&pool, &registry, &node, chain).await {
                tracing::error!("Chain for pipeline {} aborted: {:?}", pipeline_id, e);
            }
        });

        Ok(())
    }
}

/// Walk a chain step by step through the tracking wrapper.
///
/// The first step receives its bound argument, every later step the previous
/// step's return value. A step failure is recorded (log entry, task error,
/// pipeline cascade) and then re-raised so the substrate observes it; the
/// remaining steps never start.
async fn run_chain(
    pool: &PgPool,
    registry: &TaskRegistry,
    node: &str,
    chain: TaskChain,
) -> Result<(), ExecutionError> {
    let ctx = TaskContext {
        pool: pool.clone(),
        pipeline_id: chain.pipeline_id,
    };

    let mut carried = serde_json::Value::Null;

    for step in chain.steps {
        let input = match step.argument {
            Some(argument) => argument,
            None => std::mem::take(&mut carried),
        };

        tracking::log(
            pool,
            chain.pipeline_id,
            &format!("executing '{}'...", step.function),
        )
        .await?;

        tracking::start_task(pool, step.task_id, node).await?;

        let outcome = match registry.get(&step.function) {
            Ok(task) => task.run(&ctx, input).await,
            Err(err) => Err(err),
        };

        match outcome {
            Ok(output) => {
                tracking::complete_task_success(pool, step.task_id).await?;
                tracking::log(
                    pool,
                    chain.pipeline_id,
                    &format!("'{}' execution complete.", step.function),
                )
                .await?;
                carried = output;
            }
            Err(err) => {
                tracking::log(pool, chain.pipeline_id, &err.to_string()).await?;
                tracking::complete_task_failure(pool, step.task_id).await?;
                return Err(ExecutionError::StepFailed(step.function));
            }
        }
    }

    Ok(())
}
