//! Pipeline Service
//!
//! Read-side business logic for pipeline instances: status, tasks, log
//! stream and artifacts. Failure visibility goes through these queries; the
//! engine never deletes an instance.

use eventspipe_core::domain::artifact::PipelineArtifact;
use eventspipe_core::domain::log::PipelineLogEntry;
use eventspipe_core::domain::pipeline::Pipeline;
use eventspipe_core::domain::task::Task;
use sqlx::PgPool;
use uuid::Uuid;

use crate::repository::{artifact_repository, log_repository, pipeline_repository, task_repository};

/// Service error type
#[derive(Debug)]
pub enum PipelineError {
    NotFound(Uuid),
    DatabaseError(sqlx::Error),
}

impl From<sqlx::Error> for PipelineError {
    fn from(err: sqlx::Error) -> Self {
        PipelineError::DatabaseError(err)
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;

/// Get a pipeline by ID
pub async fn get_pipeline(pool: &PgPool, id: Uuid) -> Result<Pipeline> {
    let pipeline = pipeline_repository::find_by_id(pool, id)
        .await?
        .ok_or(PipelineError::NotFound(id))?;

    Ok(pipeline)
}

/// List all pipelines, newest first
pub async fn list_pipelines(pool: &PgPool) -> Result<Vec<Pipeline>> {
    let pipelines = pipeline_repository::list_all(pool).await?;
    Ok(pipelines)
}

/// List the tasks of a pipeline in plan order
pub async fn list_tasks(pool: &PgPool, pipeline_id: Uuid) -> Result<Vec<Task>> {
    let _pipeline = get_pipeline(pool, pipeline_id).await?;

    let tasks = task_repository::list_by_pipeline(pool, pipeline_id).await?;
    Ok(tasks)
}

/// Get the log stream of a pipeline
pub async fn get_pipeline_logs(pool: &PgPool, pipeline_id: Uuid) -> Result<Vec<PipelineLogEntry>> {
    let _pipeline = get_pipeline(pool, pipeline_id).await?;

    let logs = log_repository::find_by_pipeline(pool, pipeline_id).await?;
    Ok(logs)
}

/// List the stored artifacts of a pipeline
pub async fn list_artifacts(pool: &PgPool, pipeline_id: Uuid) -> Result<Vec<PipelineArtifact>> {
    let _pipeline = get_pipeline(pool, pipeline_id).await?;

    let artifacts = artifact_repository::list_by_pipeline(pool, pipeline_id).await?;
    Ok(artifacts)
}
