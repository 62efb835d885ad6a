//! Task domain types

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Task instance status, persisted as integer codes.
///
/// `Skipped` is a valid state reserved for steps intentionally bypassed; no
/// current transition produces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskStatus {
    Running,
    Success,
    Error,
    Queued,
    Skipped,
}

impl TaskStatus {
    pub fn code(self) -> i32 {
        match self {
            TaskStatus::Running => 0,
            TaskStatus::Success => 1,
            TaskStatus::Error => 2,
            TaskStatus::Queued => 3,
            TaskStatus::Skipped => 4,
        }
    }

    pub fn from_code(code: i32) -> Self {
        match code {
            0 => TaskStatus::Running,
            1 => TaskStatus::Success,
            2 => TaskStatus::Error,
            4 => TaskStatus::Skipped,
            _ => TaskStatus::Queued,
        }
    }
}

/// One step of a pipeline run.
///
/// Created in bulk when the pipeline is created, one per enabled binding in
/// plan order, all initially queued. The binding reference is nullable so
/// tasks survive binding deletion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub pipeline_id: Uuid,
    pub binding_id: Option<Uuid>,
    pub position: i32,
    pub status: TaskStatus,
    pub node: String,
    pub start_ts: Option<chrono::DateTime<chrono::Utc>>,
    pub end_ts: Option<chrono::DateTime<chrono::Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes_roundtrip() {
        for status in [
            TaskStatus::Running,
            TaskStatus::Success,
            TaskStatus::Error,
            TaskStatus::Queued,
            TaskStatus::Skipped,
        ] {
            assert_eq!(TaskStatus::from_code(status.code()), status);
        }
    }

    #[test]
    fn test_skipped_code_is_reserved() {
        assert_eq!(TaskStatus::Skipped.code(), 4);
    }
}
