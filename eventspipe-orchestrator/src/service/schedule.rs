//! Schedule Service
//!
//! Business logic for operator CRUD on event schedules.

use eventspipe_core::domain::schedule::EventSchedule;
use eventspipe_core::dto::schedule::CreateSchedule;
use sqlx::PgPool;
use uuid::Uuid;

use crate::repository::schedule_repository;

/// Service error type
#[derive(Debug)]
pub enum ScheduleError {
    NotFound(Uuid),
    ValidationError(String),
    DatabaseError(sqlx::Error),
}

impl From<sqlx::Error> for ScheduleError {
    fn from(err: sqlx::Error) -> Self {
        ScheduleError::DatabaseError(err)
    }
}

pub type Result<T> = std::result::Result<T, ScheduleError>;

/// Create a new event schedule
pub async fn create_schedule(pool: &PgPool, req: CreateSchedule) -> Result<EventSchedule> {
    validate_schedule_request(&req)?;

    let schedule = schedule_repository::create(pool, req).await?;

    tracing::info!(
        "Schedule created: {} ({}), enabled: {}",
        schedule.id,
        schedule.cron,
        schedule.enabled
    );

    Ok(schedule)
}

/// Get a schedule by ID
pub async fn get_schedule(pool: &PgPool, id: Uuid) -> Result<EventSchedule> {
    let schedule = schedule_repository::find_by_id(pool, id)
        .await?
        .ok_or(ScheduleError::NotFound(id))?;

    Ok(schedule)
}

/// List all schedules
pub async fn list_schedules(pool: &PgPool) -> Result<Vec<EventSchedule>> {
    let schedules = schedule_repository::list_all(pool).await?;
    Ok(schedules)
}

/// Delete a schedule. Its live entry disappears on the next sync.
pub async fn delete_schedule(pool: &PgPool, id: Uuid) -> Result<()> {
    let deleted = schedule_repository::delete(pool, id).await?;

    if !deleted {
        return Err(ScheduleError::NotFound(id));
    }

    tracing::info!("Schedule deleted: {}", id);

    Ok(())
}

// =============================================================================
// Validation
// =============================================================================

fn validate_schedule_request(req: &CreateSchedule) -> Result<()> {
    let Some(payload) = req.event.as_object() else {
        return Err(ScheduleError::ValidationError(
            "Event payload must be an object".to_string(),
        ));
    };

    match payload.get("name").and_then(|name| name.as_str()) {
        Some(name) if !name.trim().is_empty() => {}
        _ => {
            return Err(ScheduleError::ValidationError(
                "Event payload must carry a non-empty 'name' field".to_string(),
            ));
        }
    }

    if req.principal.trim().is_empty() {
        return Err(ScheduleError::ValidationError(
            "Principal cannot be empty".to_string(),
        ));
    }

    req.cron.validate().map_err(ScheduleError::ValidationError)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use eventspipe_core::domain::schedule::CronSpec;
    use serde_json::json;

    fn request(event: serde_json::Value) -> CreateSchedule {
        CreateSchedule {
            event,
            principal: "ops".to_string(),
            enabled: false,
            cron: CronSpec::default(),
        }
    }

    #[test]
    fn test_valid_request_passes() {
        assert!(validate_schedule_request(&request(json!({"name": "nightly"}))).is_ok());
    }

    #[test]
    fn test_payload_must_be_an_object_with_name() {
        assert!(validate_schedule_request(&request(json!("nightly"))).is_err());
        assert!(validate_schedule_request(&request(json!({"env": "prod"}))).is_err());
        assert!(validate_schedule_request(&request(json!({"name": ""}))).is_err());
    }

    #[test]
    fn test_principal_must_not_be_empty() {
        let mut req = request(json!({"name": "nightly"}));
        req.principal = String::new();

        assert!(validate_schedule_request(&req).is_err());
    }

    #[test]
    fn test_invalid_cron_field_is_rejected() {
        let mut req = request(json!({"name": "nightly"}));
        req.cron.minute = "every-so-often".to_string();

        assert!(validate_schedule_request(&req).is_err());
    }
}
