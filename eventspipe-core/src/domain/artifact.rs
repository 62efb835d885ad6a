//! Artifact domain types

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Content-addressed binary blob.
///
/// Deduplicated by checksum: storing the same bytes twice yields the same
/// artifact row. Not serialized over the API; downloads stream raw bytes.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub id: Uuid,
    pub data: Vec<u8>,
    pub checksum: String,
}

impl Artifact {
    /// Size of the stored data in kilobytes.
    pub fn size_kb(&self) -> f64 {
        self.data.len() as f64 / 1000.0
    }
}

/// Named association between a pipeline run and an artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineArtifact {
    pub id: Uuid,
    pub pipeline_id: Uuid,
    pub artifact_id: Uuid,
    pub file_name: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
