//! Pipeline domain types

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Pipeline instance status.
///
/// Persisted as integer codes. Transitions are one-directional:
/// queued -> running -> success | error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelineStatus {
    Running,
    Success,
    Error,
    Queued,
}

impl PipelineStatus {
    pub fn code(self) -> i32 {
        match self {
            PipelineStatus::Running => 0,
            PipelineStatus::Success => 1,
            PipelineStatus::Error => 2,
            PipelineStatus::Queued => 3,
        }
    }

    pub fn from_code(code: i32) -> Self {
        match code {
            0 => PipelineStatus::Running,
            1 => PipelineStatus::Success,
            2 => PipelineStatus::Error,
            _ => PipelineStatus::Queued,
        }
    }
}

/// One pipeline run.
///
/// Created when an event matches a definition, mutated by task tracking
/// calls, never deleted by the engine. The originating definition is nullable
/// so instances survive definition deletion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pipeline {
    pub id: Uuid,
    pub name: String,
    pub node: String,
    pub status: PipelineStatus,
    pub definition_id: Option<Uuid>,
    pub tasks_count: i32,
    pub current_task: i32,
    pub principal: String,
    pub start_ts: chrono::DateTime<chrono::Utc>,
    pub end_ts: Option<chrono::DateTime<chrono::Utc>>,
}

impl Pipeline {
    /// `[current/total]` prefix for log entries, empty for zero-step runs.
    ///
    /// Uses `current_task + 1` so that entries written before a step starts
    /// already carry the number of the step about to run.
    pub fn progress_prefix(&self) -> String {
        if self.tasks_count > 0 {
            format!("[{}/{}]", self.current_task + 1, self.tasks_count)
        } else {
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes_roundtrip() {
        for status in [
            PipelineStatus::Running,
            PipelineStatus::Success,
            PipelineStatus::Error,
            PipelineStatus::Queued,
        ] {
            assert_eq!(PipelineStatus::from_code(status.code()), status);
        }
    }

    #[test]
    fn test_unknown_code_maps_to_queued() {
        assert_eq!(PipelineStatus::from_code(42), PipelineStatus::Queued);
    }

    #[test]
    fn test_progress_prefix() {
        let mut pipeline = Pipeline {
            id: Uuid::new_v4(),
            name: "deploy".to_string(),
            node: "undefined".to_string(),
            status: PipelineStatus::Queued,
            definition_id: None,
            tasks_count: 3,
            current_task: 0,
            principal: "ops".to_string(),
            start_ts: chrono::Utc::now(),
            end_ts: None,
        };

        assert_eq!(pipeline.progress_prefix(), "[1/3]");

        pipeline.current_task = 2;
        assert_eq!(pipeline.progress_prefix(), "[3/3]");

        pipeline.tasks_count = 0;
        assert_eq!(pipeline.progress_prefix(), "");
    }
}
