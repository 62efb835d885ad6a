//! Task Definition Repository
//!
//! Handles all database operations related to task definitions. Rows mirror
//! the registered functions of the task registry and are reconciled against
//! it at startup.

use eventspipe_core::domain::definition::TaskDefinition;
use sqlx::PgPool;
use uuid::Uuid;

/// Create a new task definition
pub async fn create(
    pool: &PgPool,
    function: &str,
    description: Option<&str>,
) -> Result<TaskDefinition, sqlx::Error> {
    let id = Uuid::new_v4();
    let now = chrono::Utc::now();

    let definition = TaskDefinition {
        id,
        function: function.to_string(),
        description: description.map(|d| d.to_string()),
        created_at: now,
    };

    sqlx::query(
        r#"
        INSERT INTO task_definitions (id, function, description, created_at)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(id)
    .bind(function)
    .bind(description)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(definition)
}

/// Find a task definition by ID
pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<TaskDefinition>, sqlx::Error> {
    let row = sqlx::query_as::<_, TaskDefinitionRow>(
        r#"
        SELECT id, function, description, created_at
        FROM task_definitions
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| r.into()))
}

/// Check whether a task definition exists for a function name
pub async fn exists_by_function(pool: &PgPool, function: &str) -> Result<bool, sqlx::Error> {
    let row: (bool,) =
        sqlx::query_as("SELECT EXISTS(SELECT 1 FROM task_definitions WHERE function = $1)")
            .bind(function)
            .fetch_one(pool)
            .await?;

    Ok(row.0)
}

/// List all task definitions
pub async fn list_all(pool: &PgPool) -> Result<Vec<TaskDefinition>, sqlx::Error> {
    let rows = sqlx::query_as::<_, TaskDefinitionRow>(
        r#"
        SELECT id, function, description, created_at
        FROM task_definitions
        ORDER BY function ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|r| r.into()).collect())
}

/// Delete every task definition whose function is not in the given set.
///
/// Returns the number of rows removed. Bindings referencing removed rows are
/// cascade-deleted by the schema.
pub async fn delete_unregistered(pool: &PgPool, functions: &[String]) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM task_definitions WHERE function != ALL($1)")
        .bind(functions)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

// =============================================================================
// Database Row Types
// =============================================================================

#[derive(sqlx::FromRow)]
struct TaskDefinitionRow {
    id: Uuid,
    function: String,
    description: Option<String>,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl From<TaskDefinitionRow> for TaskDefinition {
    fn from(row: TaskDefinitionRow) -> Self {
        TaskDefinition {
            id: row.id,
            function: row.function,
            description: row.description,
            created_at: row.created_at,
        }
    }
}
