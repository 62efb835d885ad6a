//! Task Binding Repository
//!
//! Handles all database operations related to definition/task bindings.

use eventspipe_core::domain::definition::TaskBinding;
use eventspipe_core::dto::definition::CreateBinding;
use sqlx::PgPool;
use uuid::Uuid;

/// A binding joined with the function name of its task definition.
#[derive(Debug, Clone)]
pub struct BoundTask {
    pub binding: TaskBinding,
    pub function: String,
}

/// Create a new binding for a definition
pub async fn create(
    pool: &PgPool,
    definition_id: Uuid,
    req: CreateBinding,
) -> Result<TaskBinding, sqlx::Error> {
    let id = Uuid::new_v4();
    let now = chrono::Utc::now();

    let binding = TaskBinding {
        id,
        definition_id,
        task_definition_id: req.task_definition_id,
        ordering: req.ordering,
        enabled: req.enabled,
        created_at: now,
    };

    sqlx::query(
        r#"
        INSERT INTO task_bindings (id, definition_id, task_definition_id, ordering, enabled, created_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(id)
    .bind(definition_id)
    .bind(req.task_definition_id)
    .bind(req.ordering)
    .bind(req.enabled)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(binding)
}

/// List all bindings of a definition
pub async fn list_by_definition(
    pool: &PgPool,
    definition_id: Uuid,
) -> Result<Vec<TaskBinding>, sqlx::Error> {
    let rows = sqlx::query_as::<_, BindingRow>(
        r#"
        SELECT id, definition_id, task_definition_id, ordering, enabled, created_at
        FROM task_bindings
        WHERE definition_id = $1
        ORDER BY ordering ASC, created_at ASC
        "#,
    )
    .bind(definition_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|r| r.into()).collect())
}

/// Fetch all bindings of a definition joined with their task function names.
///
/// Returns every binding regardless of its enabled flag; plan ordering and
/// filtering happen in the core [`execution_plan`] logic.
///
/// [`execution_plan`]: eventspipe_core::domain::definition::execution_plan
pub async fn find_bound_tasks(
    pool: &PgPool,
    definition_id: Uuid,
) -> Result<Vec<BoundTask>, sqlx::Error> {
    let rows = sqlx::query_as::<_, BoundTaskRow>(
        r#"
        SELECT b.id, b.definition_id, b.task_definition_id, b.ordering, b.enabled, b.created_at,
               td.function
        FROM task_bindings b
        JOIN task_definitions td ON td.id = b.task_definition_id
        WHERE b.definition_id = $1
        "#,
    )
    .bind(definition_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|r| r.into()).collect())
}

/// Delete a binding by ID
pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM task_bindings WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

// =============================================================================
// Database Row Types
// =============================================================================

#[derive(sqlx::FromRow)]
struct BindingRow {
    id: Uuid,
    definition_id: Uuid,
    task_definition_id: Uuid,
    ordering: i32,
    enabled: bool,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl From<BindingRow> for TaskBinding {
    fn from(row: BindingRow) -> Self {
        TaskBinding {
            id: row.id,
            definition_id: row.definition_id,
            task_definition_id: row.task_definition_id,
            ordering: row.ordering,
            enabled: row.enabled,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct BoundTaskRow {
    id: Uuid,
    definition_id: Uuid,
    task_definition_id: Uuid,
    ordering: i32,
    enabled: bool,
    created_at: chrono::DateTime<chrono::Utc>,
    function: String,
}

impl From<BoundTaskRow> for BoundTask {
    fn from(row: BoundTaskRow) -> Self {
        BoundTask {
            binding: TaskBinding {
                id: row.id,
                definition_id: row.definition_id,
                task_definition_id: row.task_definition_id,
                ordering: row.ordering,
                enabled: row.enabled,
                created_at: row.created_at,
            },
            function: row.function,
        }
    }
}
