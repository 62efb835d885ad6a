//! Definition domain types
//!
//! Pipeline definitions are operator-authored templates describing when a
//! pipeline runs (event name + filter constraints) and how (the ordered set
//! of task bindings). The matching and plan-ordering rules live here so they
//! can be exercised without a database.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::domain::event::Event;

/// Template describing which events spawn pipelines and with what options.
///
/// Definitions with a non-empty filter set are "custom" and take precedence
/// over "generic" (unfiltered) definitions for the same event name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineDefinition {
    pub id: Uuid,
    pub event: String,
    pub filters: HashMap<String, serde_json::Value>,
    pub options: HashMap<String, serde_json::Value>,
    pub enabled: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl PipelineDefinition {
    /// A custom definition matches iff every filter key that is also present
    /// in the event carries an equal value. Filter keys absent from the event
    /// are ignored, so this is a conjunctive partial match, not a subset check.
    /// The event name counts as a present key.
    pub fn matches(&self, event: &Event) -> bool {
        self.filters.iter().all(|(key, value)| {
            if key == "name" {
                return value.as_str() == Some(event.name.as_str());
            }
            match event.get(key) {
                Some(actual) => actual == value,
                None => true,
            }
        })
    }
}

/// Reference to an invokable unit of work in the task registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskDefinition {
    pub id: Uuid,
    pub function: String,
    pub description: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Ordered, enable-able association between a definition and a task definition.
///
/// The enabled bindings of a definition, sorted by ordering key, are the
/// execution plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskBinding {
    pub id: Uuid,
    pub definition_id: Uuid,
    pub task_definition_id: Uuid,
    pub ordering: i32,
    pub enabled: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Select the definitions applicable to an event.
///
/// Fetches nothing itself: the caller supplies the candidate definitions for
/// the event name. Custom (filtered) definitions that match win outright;
/// generic definitions apply only when no custom definition matched. An empty
/// result is a normal outcome meaning "no pipeline to run".
pub fn select_definitions<'a>(
    definitions: &'a [PipelineDefinition],
    event: &Event,
) -> Vec<&'a PipelineDefinition> {
    let mut generic = Vec::new();
    let mut custom = Vec::new();

    for definition in definitions {
        if !definition.enabled || definition.event != event.name {
            continue;
        }

        if definition.filters.is_empty() {
            generic.push(definition);
        } else if definition.matches(event) {
            custom.push(definition);
        }
    }

    if custom.is_empty() { generic } else { custom }
}

/// Order a definition's bindings into its execution plan.
///
/// Disabled bindings are excluded; the rest are sorted by ordering key
/// ascending, ties broken by creation order then id.
pub fn execution_plan(bindings: &[TaskBinding]) -> Vec<&TaskBinding> {
    let mut plan: Vec<&TaskBinding> = bindings.iter().filter(|b| b.enabled).collect();
    plan.sort_by(|a, b| {
        a.ordering
            .cmp(&b.ordering)
            .then(a.created_at.cmp(&b.created_at))
            .then(a.id.cmp(&b.id))
    });
    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn definition(event: &str, filters: &[(&str, serde_json::Value)]) -> PipelineDefinition {
        let now = chrono::Utc::now();
        PipelineDefinition {
            id: Uuid::new_v4(),
            event: event.to_string(),
            filters: filters
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
            options: HashMap::new(),
            enabled: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn binding(ordering: i32, enabled: bool) -> TaskBinding {
        TaskBinding {
            id: Uuid::new_v4(),
            definition_id: Uuid::new_v4(),
            task_definition_id: Uuid::new_v4(),
            ordering,
            enabled,
            created_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_custom_beats_generic() {
        let generic = definition("deploy", &[]);
        let custom = definition("deploy", &[("env", json!("prod"))]);
        let definitions = vec![generic, custom.clone()];

        let event = Event::new("deploy").with_field("env", json!("prod"));
        let selected = select_definitions(&definitions, &event);

        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].id, custom.id);
    }

    #[test]
    fn test_generic_when_no_custom_matches() {
        let generic = definition("deploy", &[]);
        let custom = definition("deploy", &[("env", json!("prod"))]);
        let definitions = vec![generic.clone(), custom];

        let event = Event::new("deploy").with_field("env", json!("staging"));
        let selected = select_definitions(&definitions, &event);

        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].id, generic.id);
    }

    #[test]
    fn test_filter_keys_absent_from_event_are_ignored() {
        let custom = definition(
            "deploy",
            &[("env", json!("prod")), ("region", json!("eu"))],
        );
        let definitions = vec![custom.clone()];

        // "region" is not in the event, so only "env" is compared.
        let event = Event::new("deploy").with_field("env", json!("prod"));
        let selected = select_definitions(&definitions, &event);

        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].id, custom.id);
    }

    #[test]
    fn test_no_match_returns_empty() {
        let definitions = vec![definition("deploy", &[])];
        let event = Event::new("build");

        assert!(select_definitions(&definitions, &event).is_empty());
    }

    #[test]
    fn test_disabled_definitions_are_skipped() {
        let mut disabled = definition("deploy", &[]);
        disabled.enabled = false;
        let definitions = vec![disabled];

        let event = Event::new("deploy");
        assert!(select_definitions(&definitions, &event).is_empty());
    }

    #[test]
    fn test_all_matching_generic_definitions_are_returned() {
        let definitions = vec![definition("deploy", &[]), definition("deploy", &[])];

        let event = Event::new("deploy");
        assert_eq!(select_definitions(&definitions, &event).len(), 2);
    }

    #[test]
    fn test_execution_plan_ordering_and_enabled_filter() {
        let b20 = binding(20, true);
        let b10 = binding(10, true);
        let b30 = binding(30, false);
        let bindings = vec![b20.clone(), b10.clone(), b30];

        let plan = execution_plan(&bindings);

        assert_eq!(plan.len(), 2);
        assert_eq!(plan[0].id, b10.id);
        assert_eq!(plan[1].id, b20.id);
    }

    #[test]
    fn test_execution_plan_ties_break_by_creation_order() {
        let older = TaskBinding {
            created_at: chrono::Utc::now() - chrono::Duration::seconds(60),
            ..binding(20, true)
        };
        let newer = binding(20, true);
        let bindings = vec![newer.clone(), older.clone()];

        let plan = execution_plan(&bindings);

        assert_eq!(plan[0].id, older.id);
        assert_eq!(plan[1].id, newer.id);
    }
}
