//! Definition Service
//!
//! Business logic for operator CRUD on pipeline definitions and their task
//! bindings.

use eventspipe_core::domain::definition::{PipelineDefinition, TaskBinding, TaskDefinition};
use eventspipe_core::dto::definition::{CreateBinding, CreateDefinition};
use sqlx::PgPool;
use uuid::Uuid;

use crate::repository::{binding_repository, definition_repository, task_definition_repository};

/// Service error type
#[derive(Debug)]
pub enum DefinitionError {
    NotFound(Uuid),
    TaskDefinitionNotFound(Uuid),
    ValidationError(String),
    DatabaseError(sqlx::Error),
}

impl From<sqlx::Error> for DefinitionError {
    fn from(err: sqlx::Error) -> Self {
        DefinitionError::DatabaseError(err)
    }
}

pub type Result<T> = std::result::Result<T, DefinitionError>;

/// Create a new pipeline definition
pub async fn create_definition(pool: &PgPool, req: CreateDefinition) -> Result<PipelineDefinition> {
    validate_definition_request(&req)?;

    let definition = definition_repository::create(pool, req).await?;

    tracing::info!(
        "Definition created: {} for event '{}'",
        definition.id,
        definition.event
    );

    Ok(definition)
}

/// Get a definition by ID
pub async fn get_definition(pool: &PgPool, id: Uuid) -> Result<PipelineDefinition> {
    let definition = definition_repository::find_by_id(pool, id)
        .await?
        .ok_or(DefinitionError::NotFound(id))?;

    Ok(definition)
}

/// List all definitions
pub async fn list_definitions(pool: &PgPool) -> Result<Vec<PipelineDefinition>> {
    let definitions = definition_repository::list_all(pool).await?;
    Ok(definitions)
}

/// Delete a definition.
///
/// Its bindings are cascade-deleted; pipeline instances keep running with a
/// nullified definition reference.
pub async fn delete_definition(pool: &PgPool, id: Uuid) -> Result<()> {
    let deleted = definition_repository::delete(pool, id).await?;

    if !deleted {
        return Err(DefinitionError::NotFound(id));
    }

    tracing::info!("Definition deleted: {}", id);

    Ok(())
}

/// Bind a task definition into a definition's execution plan
pub async fn create_binding(
    pool: &PgPool,
    definition_id: Uuid,
    req: CreateBinding,
) -> Result<TaskBinding> {
    let _definition = definition_repository::find_by_id(pool, definition_id)
        .await?
        .ok_or(DefinitionError::NotFound(definition_id))?;

    let _task_definition = task_definition_repository::find_by_id(pool, req.task_definition_id)
        .await?
        .ok_or(DefinitionError::TaskDefinitionNotFound(
            req.task_definition_id,
        ))?;

    let binding = binding_repository::create(pool, definition_id, req).await?;

    tracing::info!(
        "Binding created: {} on definition {}",
        binding.id,
        definition_id
    );

    Ok(binding)
}

/// List the bindings of a definition in plan order
pub async fn list_bindings(pool: &PgPool, definition_id: Uuid) -> Result<Vec<TaskBinding>> {
    let _definition = definition_repository::find_by_id(pool, definition_id)
        .await?
        .ok_or(DefinitionError::NotFound(definition_id))?;

    let bindings = binding_repository::list_by_definition(pool, definition_id).await?;
    Ok(bindings)
}

/// List all task definitions known to the registry
pub async fn list_task_definitions(pool: &PgPool) -> Result<Vec<TaskDefinition>> {
    let task_definitions = task_definition_repository::list_all(pool).await?;
    Ok(task_definitions)
}

// =============================================================================
// Validation
// =============================================================================

fn validate_definition_request(req: &CreateDefinition) -> Result<()> {
    if req.event.trim().is_empty() {
        return Err(DefinitionError::ValidationError(
            "Event name cannot be empty".to_string(),
        ));
    }

    if req.event.len() > 256 {
        return Err(DefinitionError::ValidationError(
            "Event name is too long (max 256 characters)".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn request(event: &str) -> CreateDefinition {
        CreateDefinition {
            event: event.to_string(),
            filters: HashMap::new(),
            options: HashMap::new(),
            enabled: true,
        }
    }

    #[test]
    fn test_validate_definition_request() {
        assert!(validate_definition_request(&request("deploy")).is_ok());
        assert!(validate_definition_request(&request("")).is_err());
        assert!(validate_definition_request(&request("   ")).is_err());
        assert!(validate_definition_request(&request(&"x".repeat(257))).is_err());
    }
}
