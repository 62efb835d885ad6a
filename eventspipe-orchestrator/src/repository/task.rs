//! Task Repository
//!
//! Handles all database operations related to task instances.

use eventspipe_core::domain::task::{Task, TaskStatus};
use sqlx::PgPool;
use uuid::Uuid;

/// Create one queued task per plan step, in plan order.
pub async fn create_for_plan(
    pool: &PgPool,
    pipeline_id: Uuid,
    binding_ids: &[Uuid],
) -> Result<Vec<Task>, sqlx::Error> {
    let mut tasks = Vec::with_capacity(binding_ids.len());

    for (position, binding_id) in binding_ids.iter().enumerate() {
        let id = Uuid::new_v4();

        sqlx::query(
            r#"
            INSERT INTO tasks (id, pipeline_id, binding_id, position, status, node)
            VALUES ($1, $2, $3, $4, $5, 'undefined')
            "#,
        )
        .bind(id)
        .bind(pipeline_id)
        .bind(binding_id)
        .bind(position as i32)
        .bind(TaskStatus::Queued.code())
        .execute(pool)
        .await?;

        tasks.push(Task {
            id,
            pipeline_id,
            binding_id: Some(*binding_id),
            position: position as i32,
            status: TaskStatus::Queued,
            node: "undefined".to_string(),
            start_ts: None,
            end_ts: None,
        });
    }

    Ok(tasks)
}

/// Find a task by ID
pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Task>, sqlx::Error> {
    let row = sqlx::query_as::<_, TaskRow>(
        r#"
        SELECT id, pipeline_id, binding_id, position, status, node, start_ts, end_ts
        FROM tasks
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| r.into()))
}

/// List all tasks of a pipeline in plan order
pub async fn list_by_pipeline(pool: &PgPool, pipeline_id: Uuid) -> Result<Vec<Task>, sqlx::Error> {
    let rows = sqlx::query_as::<_, TaskRow>(
        r#"
        SELECT id, pipeline_id, binding_id, position, status, node, start_ts, end_ts
        FROM tasks
        WHERE pipeline_id = $1
        ORDER BY position ASC
        "#,
    )
    .bind(pipeline_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|r| r.into()).collect())
}

/// Mark a task as running on a node and stamp its start time
pub async fn start(pool: &PgPool, id: Uuid, node: &str) -> Result<(), sqlx::Error> {
    let now = chrono::Utc::now();

    sqlx::query(
        r#"
        UPDATE tasks
        SET status = $1, node = $2, start_ts = $3
        WHERE id = $4
        "#,
    )
    .bind(TaskStatus::Running.code())
    .bind(node)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;

    Ok(())
}

/// Mark a task as completed with a terminal status and stamp its end time
pub async fn complete(pool: &PgPool, id: Uuid, status: TaskStatus) -> Result<(), sqlx::Error> {
    let now = chrono::Utc::now();

    sqlx::query(
        r#"
        UPDATE tasks
        SET status = $1, end_ts = $2
        WHERE id = $3
        "#,
    )
    .bind(status.code())
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;

    Ok(())
}

/// Mark every still-queued task of a pipeline as failed.
///
/// Bookkeeping only: tasks already running elsewhere are not touched, the
/// engine cannot preempt in-flight work.
pub async fn fail_queued(pool: &PgPool, pipeline_id: Uuid) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE tasks
        SET status = $1
        WHERE pipeline_id = $2 AND status = $3
        "#,
    )
    .bind(TaskStatus::Error.code())
    .bind(pipeline_id)
    .bind(TaskStatus::Queued.code())
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

// =============================================================================
// Database Row Types
// =============================================================================

#[derive(sqlx::FromRow)]
struct TaskRow {
    id: Uuid,
    pipeline_id: Uuid,
    binding_id: Option<Uuid>,
    position: i32,
    status: i32,
    node: String,
    start_ts: Option<chrono::DateTime<chrono::Utc>>,
    end_ts: Option<chrono::DateTime<chrono::Utc>>,
}

impl From<TaskRow> for Task {
    fn from(row: TaskRow) -> Self {
        Task {
            id: row.id,
            pipeline_id: row.pipeline_id,
            binding_id: row.binding_id,
            position: row.position,
            status: TaskStatus::from_code(row.status),
            node: row.node,
            start_ts: row.start_ts,
            end_ts: row.end_ts,
        }
    }
}
