//! Pipeline Definition Repository
//!
//! Handles all database operations related to pipeline definitions.

use eventspipe_core::domain::definition::PipelineDefinition;
use eventspipe_core::dto::definition::CreateDefinition;
use sqlx::PgPool;
use uuid::Uuid;

/// Create a new pipeline definition in the database
pub async fn create(pool: &PgPool, req: CreateDefinition) -> Result<PipelineDefinition, sqlx::Error> {
    let id = Uuid::new_v4();
    let now = chrono::Utc::now();

    let definition = PipelineDefinition {
        id,
        event: req.event.clone(),
        filters: req.filters.clone(),
        options: req.options.clone(),
        enabled: req.enabled,
        created_at: now,
        updated_at: now,
    };

    sqlx::query(
        r#"
        INSERT INTO pipeline_definitions (id, event, filters, options, enabled, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(id)
    .bind(&req.event)
    .bind(serde_json::to_value(&req.filters).unwrap_or_default())
    .bind(serde_json::to_value(&req.options).unwrap_or_default())
    .bind(req.enabled)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(definition)
}

/// Find a definition by ID
pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<PipelineDefinition>, sqlx::Error> {
    let row = sqlx::query_as::<_, DefinitionRow>(
        r#"
        SELECT id, event, filters, options, enabled, created_at, updated_at
        FROM pipeline_definitions
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| r.into()))
}

/// Find all enabled definitions reacting to an event name
pub async fn find_enabled_by_event(
    pool: &PgPool,
    event: &str,
) -> Result<Vec<PipelineDefinition>, sqlx::Error> {
    let rows = sqlx::query_as::<_, DefinitionRow>(
        r#"
        SELECT id, event, filters, options, enabled, created_at, updated_at
        FROM pipeline_definitions
        WHERE event = $1 AND enabled = TRUE
        ORDER BY created_at ASC
        "#,
    )
    .bind(event)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|r| r.into()).collect())
}

/// List all definitions
pub async fn list_all(pool: &PgPool) -> Result<Vec<PipelineDefinition>, sqlx::Error> {
    let rows = sqlx::query_as::<_, DefinitionRow>(
        r#"
        SELECT id, event, filters, options, enabled, created_at, updated_at
        FROM pipeline_definitions
        ORDER BY created_at DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|r| r.into()).collect())
}

/// Delete a definition by ID
pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM pipeline_definitions WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

// =============================================================================
// Database Row Types
// =============================================================================

#[derive(sqlx::FromRow)]
struct DefinitionRow {
    id: Uuid,
    event: String,
    filters: serde_json::Value,
    options: serde_json::Value,
    enabled: bool,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<DefinitionRow> for PipelineDefinition {
    fn from(row: DefinitionRow) -> Self {
        PipelineDefinition {
            id: row.id,
            event: row.event,
            filters: serde_json::from_value(row.filters).unwrap_or_default(),
            options: serde_json::from_value(row.options).unwrap_or_default(),
            enabled: row.enabled,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
