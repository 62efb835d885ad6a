//! Artifact Repository
//!
//! Handles all database operations related to artifacts. Artifact blobs are
//! content-addressed by sha256 checksum, so identical payloads are stored
//! once and shared across pipelines.

use eventspipe_core::domain::artifact::{Artifact, PipelineArtifact};
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use uuid::Uuid;

/// An artifact association resolved to its payload for download delivery.
#[derive(Debug, Clone)]
pub struct ArtifactDownload {
    pub file_name: String,
    pub data: Vec<u8>,
}

/// Fetch the artifact for a checksum, storing the data first if unseen
pub async fn get_or_create(pool: &PgPool, data: &[u8]) -> Result<Artifact, sqlx::Error> {
    let checksum = hex::encode(Sha256::digest(data));

    let existing = sqlx::query_as::<_, ArtifactRow>(
        r#"
        SELECT id, data, checksum
        FROM artifacts
        WHERE checksum = $1
        "#,
    )
    .bind(&checksum)
    .fetch_optional(pool)
    .await?;

    if let Some(row) = existing {
        return Ok(row.into());
    }

    let id = Uuid::new_v4();

    sqlx::query(
        r#"
        INSERT INTO artifacts (id, data, checksum)
        VALUES ($1, $2, $3)
        "#,
    )
    .bind(id)
    .bind(data)
    .bind(&checksum)
    .execute(pool)
    .await?;

    Ok(Artifact {
        id,
        data: data.to_vec(),
        checksum,
    })
}

/// Associate an artifact with a pipeline under a file name
pub async fn attach(
    pool: &PgPool,
    pipeline_id: Uuid,
    artifact_id: Uuid,
    file_name: &str,
) -> Result<PipelineArtifact, sqlx::Error> {
    let id = Uuid::new_v4();
    let now = chrono::Utc::now();

    sqlx::query(
        r#"
        INSERT INTO pipeline_artifacts (id, pipeline_id, artifact_id, file_name, created_at)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(id)
    .bind(pipeline_id)
    .bind(artifact_id)
    .bind(file_name)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(PipelineArtifact {
        id,
        pipeline_id,
        artifact_id,
        file_name: file_name.to_string(),
        created_at: now,
    })
}

/// List the artifact associations of a pipeline
pub async fn list_by_pipeline(
    pool: &PgPool,
    pipeline_id: Uuid,
) -> Result<Vec<PipelineArtifact>, sqlx::Error> {
    let rows = sqlx::query_as::<_, PipelineArtifactRow>(
        r#"
        SELECT id, pipeline_id, artifact_id, file_name, created_at
        FROM pipeline_artifacts
        WHERE pipeline_id = $1
        ORDER BY created_at ASC
        "#,
    )
    .bind(pipeline_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|r| r.into()).collect())
}

/// Resolve an artifact association to its file name and payload
pub async fn find_download(
    pool: &PgPool,
    pipeline_artifact_id: Uuid,
) -> Result<Option<ArtifactDownload>, sqlx::Error> {
    let row: Option<(String, Vec<u8>)> = sqlx::query_as(
        r#"
        SELECT pa.file_name, a.data
        FROM pipeline_artifacts pa
        JOIN artifacts a ON a.id = pa.artifact_id
        WHERE pa.id = $1
        "#,
    )
    .bind(pipeline_artifact_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|(file_name, data)| ArtifactDownload { file_name, data }))
}

// =============================================================================
// Database Row Types
// =============================================================================

#[derive(sqlx::FromRow)]
struct ArtifactRow {
    id: Uuid,
    data: Vec<u8>,
    checksum: String,
}

impl From<ArtifactRow> for Artifact {
    fn from(row: ArtifactRow) -> Self {
        Artifact {
            id: row.id,
            data: row.data,
            checksum: row.checksum,
        }
    }
}

#[derive(sqlx::FromRow)]
struct PipelineArtifactRow {
    id: Uuid,
    pipeline_id: Uuid,
    artifact_id: Uuid,
    file_name: String,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl From<PipelineArtifactRow> for PipelineArtifact {
    fn from(row: PipelineArtifactRow) -> Self {
        PipelineArtifact {
            id: row.id,
            pipeline_id: row.pipeline_id,
            artifact_id: row.artifact_id,
            file_name: row.file_name,
            created_at: row.created_at,
        }
    }
}
