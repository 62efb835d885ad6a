//! Definition DTOs

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

fn default_enabled() -> bool {
    true
}

fn default_ordering() -> i32 {
    20
}

/// Request to create a new pipeline definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDefinition {
    pub event: String,
    #[serde(default)]
    pub filters: HashMap<String, serde_json::Value>,
    #[serde(default)]
    pub options: HashMap<String, serde_json::Value>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

/// Request to bind a task definition into a definition's plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBinding {
    pub task_definition_id: Uuid,
    #[serde(default = "default_ordering")]
    pub ordering: i32,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}
