//! Tracking Service
//!
//! The pipeline/task state machine. Tracks the lifecycle of a pipeline
//! instance and its tasks through start/complete/fail transitions, including
//! the cascading failure of still-queued tasks.
//!
//! Transitions are one-directional: queued -> running -> success | error.
//! Per-pipeline counters are updated through atomic per-row statements so
//! overlapping tracking calls from the execution substrate cannot lose
//! updates.

use eventspipe_core::domain::task::TaskStatus;
use sqlx::PgPool;
use uuid::Uuid;

use crate::repository::{log_repository, pipeline_repository, task_repository};

/// Service error type
#[derive(Debug)]
pub enum TrackingError {
    PipelineNotFound(Uuid),
    TaskNotFound(Uuid),
    DatabaseError(sqlx::Error),
}

impl From<sqlx::Error> for TrackingError {
    fn from(err: sqlx::Error) -> Self {
        TrackingError::DatabaseError(err)
    }
}

pub type Result<T> = std::result::Result<T, TrackingError>;

/// Append an entry to a pipeline's log stream, prefixed with its
/// `[current/total]` progress marker.
pub async fn log(pool: &PgPool, pipeline_id: Uuid, entry: &str) -> Result<()> {
    let pipeline = pipeline_repository::find_by_id(pool, pipeline_id)
        .await?
        .ok_or(TrackingError::PipelineNotFound(pipeline_id))?;

    let message = format!("{}{}", pipeline.progress_prefix(), entry);
    log_repository::append(pool, pipeline_id, &message).await?;

    Ok(())
}

/// Start tracking a task: mark it running on a node, stamp its start time,
/// and atomically advance the owning pipeline's `current_task` counter,
/// moving the pipeline to running if it is not already.
pub async fn start_task(pool: &PgPool, task_id: Uuid, node: &str) -> Result<()> {
    let task = task_repository::find_by_id(pool, task_id)
        .await?
        .ok_or(TrackingError::TaskNotFound(task_id))?;

    task_repository::start(pool, task_id, node).await?;

    pipeline_repository::begin_task(pool, task.pipeline_id)
        .await?
        .ok_or(TrackingError::PipelineNotFound(task.pipeline_id))?;

    Ok(())
}

/// Complete a task successfully. When the pipeline's running count has
/// reached its task total this was the last step, so the pipeline is
/// finalized as success with its end time stamped exactly once.
pub async fn complete_task_success(pool: &PgPool, task_id: Uuid) -> Result<()> {
    let task = task_repository::find_by_id(pool, task_id)
        .await?
        .ok_or(TrackingError::TaskNotFound(task_id))?;

    task_repository::complete(pool, task_id, TaskStatus::Success).await?;

    if pipeline_repository::finalize_success(pool, task.pipeline_id).await? {
        tracing::info!("Pipeline {} completed successfully", task.pipeline_id);
    }

    Ok(())
}

/// Complete a task as failed and cascade-fail its pipeline: the pipeline is
/// marked error with its end time stamped, and every task still queued is
/// marked error. Tasks already running are left alone; state reflects last
/// known status, not current remote execution.
pub async fn complete_task_failure(pool: &PgPool, task_id: Uuid) -> Result<()> {
    let task = task_repository::find_by_id(pool, task_id)
        .await?
        .ok_or(TrackingError::TaskNotFound(task_id))?;

    task_repository::complete(pool, task_id, TaskStatus::Error).await?;

    fail_pipeline(pool, task.pipeline_id).await?;

    Ok(())
}

/// Mark a pipeline and all of its still-queued tasks as failed
pub async fn fail_pipeline(pool: &PgPool, pipeline_id: Uuid) -> Result<()> {
    pipeline_repository::fail(pool, pipeline_id).await?;

    let failed = task_repository::fail_queued(pool, pipeline_id).await?;
    if failed > 0 {
        tracing::debug!(
            "Marked {} queued task(s) of pipeline {} as failed",
            failed,
            pipeline_id
        );
    }

    tracing::warn!("Pipeline {} failed", pipeline_id);

    Ok(())
}
