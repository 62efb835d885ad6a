//! Artifact API Handlers
//!
//! Binary artifact download delivery.

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use crate::api::AppState;
use crate::api::error::{ApiError, ApiResult};
use crate::service::artifact_service;

/// GET /artifact/{id}
/// Download an artifact as an attachment
pub async fn download_artifact(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Response> {
    tracing::debug!("Downloading artifact: {}", id);

    let download = artifact_service::get_download(&state.pool, id)
        .await
        .map_err(|e| match e {
            artifact_service::ArtifactError::NotFound(id) => {
                ApiError::NotFound(format!("Artifact {} not found", id))
            }
            artifact_service::ArtifactError::DatabaseError(err) => ApiError::DatabaseError(err),
        })?;

    let headers = [
        (
            header::CONTENT_TYPE,
            "application/octet-stream".to_string(),
        ),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", download.file_name),
        ),
    ];

    Ok((headers, download.data).into_response())
}
