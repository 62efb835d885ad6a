//! Pipeline log domain types

use serde::{Deserialize, Serialize};

/// One entry in a pipeline's log stream.
///
/// Messages are already prefixed with the `[current/total]` progress marker
/// when written by the tracking layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineLogEntry {
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub message: String,
}
