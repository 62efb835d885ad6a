//! Pipeline Repository
//!
//! Handles all database operations related to pipeline instances. Status
//! transitions that can race across tracking calls are expressed as single
//! conditional UPDATE statements so they serialize on the row.

use eventspipe_core::domain::pipeline::{Pipeline, PipelineStatus};
use sqlx::PgPool;
use uuid::Uuid;

/// Create a new pipeline instance in queued state
pub async fn create(
    pool: &PgPool,
    name: &str,
    principal: &str,
    node: &str,
    definition_id: Uuid,
) -> Result<Pipeline, sqlx::Error> {
    let id = Uuid::new_v4();
    let now = chrono::Utc::now();

    let pipeline = Pipeline {
        id,
        name: name.to_string(),
        node: node.to_string(),
        status: PipelineStatus::Queued,
        definition_id: Some(definition_id),
        tasks_count: 0,
        current_task: 0,
        principal: principal.to_string(),
        start_ts: now,
        end_ts: None,
    };

    sqlx::query(
        r#"
        INSERT INTO pipelines (id, name, node, status, definition_id, tasks_count, current_task, principal, start_ts)
        VALUES ($1, $2, $3, $4, $5, 0, 0, $6, $7)
        "#,
    )
    .bind(id)
    .bind(name)
    .bind(node)
    .bind(PipelineStatus::Queued.code())
    .bind(definition_id)
    .bind(principal)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(pipeline)
}

/// Find a pipeline by ID
pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Pipeline>, sqlx::Error> {
    let row = sqlx::query_as::<_, PipelineRow>(
        r#"
        SELECT id, name, node, status, definition_id, tasks_count, current_task, principal, start_ts, end_ts
        FROM pipelines
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| r.into()))
}

/// List all pipelines, newest first
pub async fn list_all(pool: &PgPool) -> Result<Vec<Pipeline>, sqlx::Error> {
    let rows = sqlx::query_as::<_, PipelineRow>(
        r#"
        SELECT id, name, node, status, definition_id, tasks_count, current_task, principal, start_ts, end_ts
        FROM pipelines
        ORDER BY start_ts DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|r| r.into()).collect())
}

/// Record the resolved plan size on a queued pipeline
pub async fn set_plan_size(pool: &PgPool, id: Uuid, tasks_count: i32) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE pipelines
        SET tasks_count = $1, status = $2
        WHERE id = $3
        "#,
    )
    .bind(tasks_count)
    .bind(PipelineStatus::Queued.code())
    .bind(id)
    .execute(pool)
    .await?;

    Ok(())
}

/// Finalize a zero-step pipeline as success without entering running state
pub async fn finalize_empty(pool: &PgPool, id: Uuid) -> Result<(), sqlx::Error> {
    let now = chrono::Utc::now();

    sqlx::query(
        r#"
        UPDATE pipelines
        SET status = $1, tasks_count = 0, current_task = 0, end_ts = $2
        WHERE id = $3
        "#,
    )
    .bind(PipelineStatus::Success.code())
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;

    Ok(())
}

/// Atomically register a task start: increment `current_task` and move the
/// pipeline to running. Returns the updated (current_task, tasks_count) pair.
///
/// This is the only mutation shared across tracking calls of the same
/// pipeline; the single UPDATE serializes it per row.
pub async fn begin_task(pool: &PgPool, id: Uuid) -> Result<Option<(i32, i32)>, sqlx::Error> {
    let row: Option<(i32, i32)> = sqlx::query_as(
        r#"
        UPDATE pipelines
        SET current_task = current_task + 1, status = $1
        WHERE id = $2
        RETURNING current_task, tasks_count
        "#,
    )
    .bind(PipelineStatus::Running.code())
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Finalize a running pipeline as success once every task has started.
///
/// The transition only applies while the pipeline is running and
/// `current_task` has reached `tasks_count`; returns whether it fired, so a
/// completion signal for a non-final step is a no-op.
pub async fn finalize_success(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let now = chrono::Utc::now();

    let result = sqlx::query(
        r#"
        UPDATE pipelines
        SET status = $1, end_ts = $2
        WHERE id = $3 AND status = $4 AND current_task = tasks_count
        "#,
    )
    .bind(PipelineStatus::Success.code())
    .bind(now)
    .bind(id)
    .bind(PipelineStatus::Running.code())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Mark a pipeline as failed and stamp its end time
pub async fn fail(pool: &PgPool, id: Uuid) -> Result<(), sqlx::Error> {
    let now = chrono::Utc::now();

    sqlx::query(
        r#"
        UPDATE pipelines
        SET status = $1, end_ts = $2
        WHERE id = $3
        "#,
    )
    .bind(PipelineStatus::Error.code())
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;

    Ok(())
}

// =============================================================================
// Database Row Types
// =============================================================================

#[derive(sqlx::FromRow)]
struct PipelineRow {
    id: Uuid,
    name: String,
    node: String,
    status: i32,
    definition_id: Option<Uuid>,
    tasks_count: i32,
    current_task: i32,
    principal: String,
    start_ts: chrono::DateTime<chrono::Utc>,
    end_ts: Option<chrono::DateTime<chrono::Utc>>,
}

impl From<PipelineRow> for Pipeline {
    fn from(row: PipelineRow) -> Self {
        Pipeline {
            id: row.id,
            name: row.name,
            node: row.node,
            status: PipelineStatus::from_code(row.status),
            definition_id: row.definition_id,
            tasks_count: row.tasks_count,
            current_task: row.current_task,
            principal: row.principal,
            start_ts: row.start_ts,
            end_ts: row.end_ts,
        }
    }
}
