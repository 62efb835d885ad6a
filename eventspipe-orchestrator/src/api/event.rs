//! Event API Handlers
//!
//! The inbound event submission endpoint.

use axum::{Json, extract::State};
use eventspipe_core::domain::pipeline::Pipeline;
use eventspipe_core::dto::event::SubmitEvent;

use crate::api::AppState;
use crate::api::error::{ApiError, ApiResult};
use crate::service::dispatcher::{self, DispatchError};

/// POST /event/submit
/// Submit an event for a principal.
///
/// Returns the created pipeline instances; an empty array means no enabled
/// definition matched, which is a normal outcome.
pub async fn submit_event(
    State(state): State<AppState>,
    Json(req): Json<SubmitEvent>,
) -> ApiResult<Json<Vec<Pipeline>>> {
    tracing::info!(
        "Event '{}' submitted by principal '{}'",
        req.event.name,
        req.principal
    );

    let pipelines = dispatcher::submit(&state.pool, &state.backend, &req.principal, &req.event)
        .await
        .map_err(|e| match e {
            DispatchError::DatabaseError(err) => ApiError::DatabaseError(err),
            DispatchError::TrackingError(err) => {
                ApiError::InternalError(format!("Tracking failed: {:?}", err))
            }
            DispatchError::ExecutionError(err) => {
                ApiError::InternalError(format!("Chain submission failed: {:?}", err))
            }
        })?;

    Ok(Json(pipelines))
}
