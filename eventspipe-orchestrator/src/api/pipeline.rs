//! Pipeline API Handlers
//!
//! HTTP endpoints for observing pipeline instances: status, tasks, log
//! stream and artifacts.

use axum::{
    Json,
    extract::{Path, State},
};
use eventspipe_core::domain::artifact::PipelineArtifact;
use eventspipe_core::domain::log::PipelineLogEntry;
use eventspipe_core::domain::pipeline::Pipeline;
use eventspipe_core::domain::task::Task;
use uuid::Uuid;

use crate::api::AppState;
use crate::api::error::{ApiError, ApiResult};
use crate::service::pipeline_service;

fn map_error(e: pipeline_service::PipelineError) -> ApiError {
    match e {
        pipeline_service::PipelineError::NotFound(id) => {
            ApiError::NotFound(format!("Pipeline {} not found", id))
        }
        pipeline_service::PipelineError::DatabaseError(err) => ApiError::DatabaseError(err),
    }
}

/// GET /pipeline/list
/// List all pipelines
pub async fn list_pipelines(State(state): State<AppState>) -> ApiResult<Json<Vec<Pipeline>>> {
    tracing::debug!("Listing all pipelines");

    let pipelines = pipeline_service::list_pipelines(&state.pool)
        .await
        .map_err(map_error)?;

    Ok(Json(pipelines))
}

/// GET /pipeline/{id}
/// Get pipeline by ID
pub async fn get_pipeline(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Pipeline>> {
    tracing::debug!("Getting pipeline: {}", id);

    let pipeline = pipeline_service::get_pipeline(&state.pool, id)
        .await
        .map_err(map_error)?;

    Ok(Json(pipeline))
}

/// GET /pipeline/{id}/tasks
/// List the tasks of a pipeline in plan order
pub async fn get_pipeline_tasks(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<Task>>> {
    tracing::debug!("Listing tasks of pipeline: {}", id);

    let tasks = pipeline_service::list_tasks(&state.pool, id)
        .await
        .map_err(map_error)?;

    Ok(Json(tasks))
}

/// GET /pipeline/{id}/logs
/// Get the log stream of a pipeline
pub async fn get_pipeline_logs(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<PipelineLogEntry>>> {
    tracing::debug!("Getting logs of pipeline: {}", id);

    let logs = pipeline_service::get_pipeline_logs(&state.pool, id)
        .await
        .map_err(map_error)?;

    Ok(Json(logs))
}

/// GET /pipeline/{id}/artifacts
/// List the stored artifacts of a pipeline
pub async fn get_pipeline_artifacts(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<PipelineArtifact>>> {
    tracing::debug!("Listing artifacts of pipeline: {}", id);

    let artifacts = pipeline_service::list_artifacts(&state.pool, id)
        .await
        .map_err(map_error)?;

    Ok(Json(artifacts))
}
