//! Event submission DTOs

use serde::{Deserialize, Serialize};

use crate::domain::event::Event;

/// Request to submit an event for a principal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitEvent {
    pub principal: String,
    pub event: Event,
}
