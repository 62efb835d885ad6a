//! Event domain types

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// An inbound event.
///
/// Events carry a name plus an arbitrary key/value payload. The name selects
/// which pipeline definitions apply; the remaining fields feed the initial
/// execution context and are compared against definition filters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub name: String,
    #[serde(flatten)]
    pub fields: HashMap<String, serde_json::Value>,
}

impl Event {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            fields: HashMap::new(),
        }
    }

    pub fn with_field(mut self, key: &str, value: serde_json::Value) -> Self {
        self.fields.insert(key.to_string(), value);
        self
    }

    /// Look up a payload field by key. `name` is not a payload field.
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        if key == "name" {
            return None;
        }
        self.fields.get(key)
    }

    /// Optional `info` qualifier used when resolving a run name.
    pub fn info(&self) -> Option<&str> {
        self.fields.get("info").and_then(|v| v.as_str())
    }

    /// Human-readable run name: `"{name} {info}"` when info is present.
    pub fn run_name(&self) -> String {
        match self.info() {
            Some(info) => format!("{} {}", self.name, info),
            None => self.name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_run_name_without_info() {
        let event = Event::new("deploy");
        assert_eq!(event.run_name(), "deploy");
    }

    #[test]
    fn test_run_name_with_info() {
        let event = Event::new("deploy").with_field("info", json!("release 1.2"));
        assert_eq!(event.run_name(), "deploy release 1.2");
    }

    #[test]
    fn test_flattened_deserialization() {
        let event: Event =
            serde_json::from_value(json!({"name": "deploy", "env": "prod", "region": "eu"}))
                .unwrap();

        assert_eq!(event.name, "deploy");
        assert_eq!(event.get("env"), Some(&json!("prod")));
        assert_eq!(event.get("region"), Some(&json!("eu")));
        assert_eq!(event.get("name"), None);
    }
}
