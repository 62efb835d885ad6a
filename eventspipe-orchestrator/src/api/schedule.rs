//! Schedule API Handlers
//!
//! HTTP endpoints for operator CRUD on event schedules. The synchronizer
//! picks up changes on its next tick; no endpoint touches live entries
//! directly.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use eventspipe_core::domain::schedule::EventSchedule;
use eventspipe_core::dto::schedule::CreateSchedule;
use uuid::Uuid;

use crate::api::AppState;
use crate::api::error::{ApiError, ApiResult};
use crate::service::schedule_service;

fn map_error(e: schedule_service::ScheduleError) -> ApiError {
    match e {
        schedule_service::ScheduleError::NotFound(id) => {
            ApiError::NotFound(format!("Schedule {} not found", id))
        }
        schedule_service::ScheduleError::ValidationError(msg) => ApiError::BadRequest(msg),
        schedule_service::ScheduleError::DatabaseError(err) => ApiError::DatabaseError(err),
    }
}

/// POST /schedule/create
/// Create a new event schedule
pub async fn create_schedule(
    State(state): State<AppState>,
    Json(req): Json<CreateSchedule>,
) -> ApiResult<Json<EventSchedule>> {
    tracing::info!("Creating schedule for principal: {}", req.principal);

    let schedule = schedule_service::create_schedule(&state.pool, req)
        .await
        .map_err(map_error)?;

    Ok(Json(schedule))
}

/// GET /schedule/list
/// List all schedules
pub async fn list_schedules(State(state): State<AppState>) -> ApiResult<Json<Vec<EventSchedule>>> {
    tracing::debug!("Listing all schedules");

    let schedules = schedule_service::list_schedules(&state.pool)
        .await
        .map_err(map_error)?;

    Ok(Json(schedules))
}

/// GET /schedule/{id}
/// Get schedule by ID
pub async fn get_schedule(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<EventSchedule>> {
    tracing::debug!("Getting schedule: {}", id);

    let schedule = schedule_service::get_schedule(&state.pool, id)
        .await
        .map_err(map_error)?;

    Ok(Json(schedule))
}

/// DELETE /schedule/{id}
/// Delete a schedule
pub async fn delete_schedule(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    tracing::info!("Deleting schedule: {}", id);

    schedule_service::delete_schedule(&state.pool, id)
        .await
        .map_err(map_error)?;

    Ok(StatusCode::NO_CONTENT)
}
