//! Artifact Service
//!
//! Business logic for pipeline artifacts. Storage is content-addressed:
//! identical payloads share one blob, associations carry the file name.

use eventspipe_core::domain::artifact::PipelineArtifact;
use sqlx::PgPool;
use uuid::Uuid;

use crate::repository::artifact_repository;
pub use crate::repository::artifact::ArtifactDownload;

/// Service error type
#[derive(Debug)]
pub enum ArtifactError {
    NotFound(Uuid),
    DatabaseError(sqlx::Error),
}

impl From<sqlx::Error> for ArtifactError {
    fn from(err: sqlx::Error) -> Self {
        ArtifactError::DatabaseError(err)
    }
}

pub type Result<T> = std::result::Result<T, ArtifactError>;

/// Store an artifact for a pipeline under a file name
pub async fn save_artifact(
    pool: &PgPool,
    pipeline_id: Uuid,
    file_name: &str,
    data: &[u8],
) -> Result<PipelineArtifact> {
    let artifact = artifact_repository::get_or_create(pool, data).await?;
    let association = artifact_repository::attach(pool, pipeline_id, artifact.id, file_name).await?;

    tracing::debug!(
        "Artifact '{}' ({} bytes) stored for pipeline {}",
        file_name,
        data.len(),
        pipeline_id
    );

    Ok(association)
}

/// Resolve an artifact association for download delivery
pub async fn get_download(pool: &PgPool, pipeline_artifact_id: Uuid) -> Result<ArtifactDownload> {
    let download = artifact_repository::find_download(pool, pipeline_artifact_id)
        .await?
        .ok_or(ArtifactError::NotFound(pipeline_artifact_id))?;

    Ok(download)
}
