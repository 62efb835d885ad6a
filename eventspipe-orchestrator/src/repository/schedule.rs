//! Event Schedule Repository
//!
//! Handles all database operations related to event schedules.

use eventspipe_core::domain::schedule::{CronSpec, EventSchedule};
use eventspipe_core::dto::schedule::CreateSchedule;
use sqlx::PgPool;
use uuid::Uuid;

/// Create a new event schedule in the database
pub async fn create(pool: &PgPool, req: CreateSchedule) -> Result<EventSchedule, sqlx::Error> {
    let id = Uuid::new_v4();
    let now = chrono::Utc::now();
    let cron = req.cron.normalized();

    let schedule = EventSchedule {
        id,
        event: req.event.clone(),
        principal: req.principal.clone(),
        enabled: req.enabled,
        cron: cron.clone(),
        created_at: now,
    };

    sqlx::query(
        r#"
        INSERT INTO event_schedules (id, event, principal, enabled, minute, hour, day_of_month, month_of_year, day_of_week, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        "#,
    )
    .bind(id)
    .bind(&req.event)
    .bind(&req.principal)
    .bind(req.enabled)
    .bind(&cron.minute)
    .bind(&cron.hour)
    .bind(&cron.day_of_month)
    .bind(&cron.month_of_year)
    .bind(&cron.day_of_week)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(schedule)
}

/// Find a schedule by ID
pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<EventSchedule>, sqlx::Error> {
    let row = sqlx::query_as::<_, ScheduleRow>(
        r#"
        SELECT id, event, principal, enabled, minute, hour, day_of_month, month_of_year, day_of_week, created_at
        FROM event_schedules
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| r.into()))
}

/// List all schedules
pub async fn list_all(pool: &PgPool) -> Result<Vec<EventSchedule>, sqlx::Error> {
    let rows = sqlx::query_as::<_, ScheduleRow>(
        r#"
        SELECT id, event, principal, enabled, minute, hour, day_of_month, month_of_year, day_of_week, created_at
        FROM event_schedules
        ORDER BY created_at DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|r| r.into()).collect())
}

/// List enabled schedules in a stable order for digest computation
pub async fn find_enabled(pool: &PgPool) -> Result<Vec<EventSchedule>, sqlx::Error> {
    let rows = sqlx::query_as::<_, ScheduleRow>(
        r#"
        SELECT id, event, principal, enabled, minute, hour, day_of_month, month_of_year, day_of_week, created_at
        FROM event_schedules
        WHERE enabled = TRUE
        ORDER BY id ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|r| r.into()).collect())
}

/// Delete a schedule by ID
pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM event_schedules WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

// =============================================================================
// Database Row Types
// =============================================================================

#[derive(sqlx::FromRow)]
struct ScheduleRow {
    id: Uuid,
    event: serde_json::Value,
    principal: String,
    enabled: bool,
    minute: String,
    hour: String,
    day_of_month: String,
    month_of_year: String,
    day_of_week: String,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl From<ScheduleRow> for EventSchedule {
    fn from(row: ScheduleRow) -> Self {
        EventSchedule {
            id: row.id,
            event: row.event,
            principal: row.principal,
            enabled: row.enabled,
            cron: CronSpec {
                minute: row.minute,
                hour: row.hour,
                day_of_month: row.day_of_month,
                month_of_year: row.month_of_year,
                day_of_week: row.day_of_week,
            },
            created_at: row.created_at,
        }
    }
}
