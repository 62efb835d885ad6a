//! Pipeline Log Repository
//!
//! Handles all database operations related to pipeline log streams.

use eventspipe_core::domain::log::PipelineLogEntry;
use sqlx::PgPool;
use uuid::Uuid;

/// Append an entry to a pipeline's log stream
pub async fn append(pool: &PgPool, pipeline_id: Uuid, message: &str) -> Result<(), sqlx::Error> {
    let now = chrono::Utc::now();

    sqlx::query(
        r#"
        INSERT INTO pipeline_logs (pipeline_id, timestamp, message)
        VALUES ($1, $2, $3)
        "#,
    )
    .bind(pipeline_id)
    .bind(now)
    .bind(message)
    .execute(pool)
    .await?;

    Ok(())
}

/// Get all log entries for a pipeline in insertion order
pub async fn find_by_pipeline(
    pool: &PgPool,
    pipeline_id: Uuid,
) -> Result<Vec<PipelineLogEntry>, sqlx::Error> {
    let rows = sqlx::query_as::<_, LogRow>(
        r#"
        SELECT timestamp, message
        FROM pipeline_logs
        WHERE pipeline_id = $1
        ORDER BY id ASC
        "#,
    )
    .bind(pipeline_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|r| r.into()).collect())
}

// =============================================================================
// Database Row Types
// =============================================================================

#[derive(sqlx::FromRow)]
struct LogRow {
    timestamp: chrono::DateTime<chrono::Utc>,
    message: String,
}

impl From<LogRow> for PipelineLogEntry {
    fn from(row: LogRow) -> Self {
        PipelineLogEntry {
            timestamp: row.timestamp,
            message: row.message,
        }
    }
}
