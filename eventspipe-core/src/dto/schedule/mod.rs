//! Event schedule DTOs

use serde::{Deserialize, Serialize};

use crate::domain::schedule::CronSpec;

/// Request to create a new event schedule.
///
/// `event` is the payload emitted when the schedule fires and must be an
/// object with at least a `name` field. Schedules are created disabled unless
/// stated otherwise.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSchedule {
    pub event: serde_json::Value,
    pub principal: String,
    #[serde(default)]
    pub enabled: bool,
    #[serde(flatten)]
    pub cron: CronSpec,
}
