//! Definition API Handlers
//!
//! HTTP endpoints for operator CRUD on pipeline definitions, their task
//! bindings and the registered task definitions.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use eventspipe_core::domain::definition::{PipelineDefinition, TaskBinding, TaskDefinition};
use eventspipe_core::dto::definition::{CreateBinding, CreateDefinition};
use uuid::Uuid;

use crate::api::AppState;
use crate::api::error::{ApiError, ApiResult};
use crate::service::definition_service;

fn map_error(e: definition_service::DefinitionError) -> ApiError {
    match e {
        definition_service::DefinitionError::NotFound(id) => {
            ApiError::NotFound(format!("Definition {} not found", id))
        }
        definition_service::DefinitionError::TaskDefinitionNotFound(id) => {
            ApiError::NotFound(format!("Task definition {} not found", id))
        }
        definition_service::DefinitionError::ValidationError(msg) => ApiError::BadRequest(msg),
        definition_service::DefinitionError::DatabaseError(err) => ApiError::DatabaseError(err),
    }
}

/// POST /definition/create
/// Create a new pipeline definition
pub async fn create_definition(
    State(state): State<AppState>,
    Json(req): Json<CreateDefinition>,
) -> ApiResult<Json<PipelineDefinition>> {
    tracing::info!("Creating definition for event: {}", req.event);

    let definition = definition_service::create_definition(&state.pool, req)
        .await
        .map_err(map_error)?;

    Ok(Json(definition))
}

/// GET /definition/list
/// List all definitions
pub async fn list_definitions(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<PipelineDefinition>>> {
    tracing::debug!("Listing all definitions");

    let definitions = definition_service::list_definitions(&state.pool)
        .await
        .map_err(map_error)?;

    Ok(Json(definitions))
}

/// GET /definition/{id}
/// Get definition by ID
pub async fn get_definition(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<PipelineDefinition>> {
    tracing::debug!("Getting definition: {}", id);

    let definition = definition_service::get_definition(&state.pool, id)
        .await
        .map_err(map_error)?;

    Ok(Json(definition))
}

/// DELETE /definition/{id}
/// Delete a definition
pub async fn delete_definition(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    tracing::info!("Deleting definition: {}", id);

    definition_service::delete_definition(&state.pool, id)
        .await
        .map_err(map_error)?;

    Ok(StatusCode::NO_CONTENT)
}

/// POST /definition/{id}/bindings
/// Bind a task definition into a definition's plan
pub async fn create_binding(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<CreateBinding>,
) -> ApiResult<Json<TaskBinding>> {
    tracing::info!("Creating binding on definition: {}", id);

    let binding = definition_service::create_binding(&state.pool, id, req)
        .await
        .map_err(map_error)?;

    Ok(Json(binding))
}

/// GET /definition/{id}/bindings
/// List the bindings of a definition in plan order
pub async fn list_bindings(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<TaskBinding>>> {
    tracing::debug!("Listing bindings of definition: {}", id);

    let bindings = definition_service::list_bindings(&state.pool, id)
        .await
        .map_err(map_error)?;

    Ok(Json(bindings))
}

/// GET /task/list
/// List all registered task definitions
pub async fn list_task_definitions(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<TaskDefinition>>> {
    tracing::debug!("Listing all task definitions");

    let task_definitions = definition_service::list_task_definitions(&state.pool)
        .await
        .map_err(map_error)?;

    Ok(Json(task_definitions))
}
