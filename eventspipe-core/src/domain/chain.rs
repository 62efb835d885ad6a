//! Task chain construction
//!
//! A chain is the linear, dependency-ordered sequence of step invocations
//! built from a definition's execution plan. Construction only wires data:
//! the initial context is bound to the first step, every later step receives
//! its predecessor's return value at execution time. Building a chain never
//! invokes a step.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::domain::event::Event;

/// One invocation in a chain.
///
/// `argument` is `Some` only for the first step; `None` means "take the
/// previous step's return value as sole input".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainStep {
    pub task_id: Uuid,
    pub function: String,
    pub argument: Option<serde_json::Value>,
}

/// Executable linear chain for one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskChain {
    pub pipeline_id: Uuid,
    pub steps: Vec<ChainStep>,
}

impl TaskChain {
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Build the initial context for a pipeline run.
///
/// The pipeline id comes first, then every event field (including the event
/// name), then the definition's options layered on top. Option keys win on
/// conflict: they are operator-declared intent for all instances of the
/// definition.
pub fn initial_context(
    pipeline_id: Uuid,
    event: &Event,
    options: &HashMap<String, serde_json::Value>,
) -> serde_json::Map<String, serde_json::Value> {
    let mut context = serde_json::Map::new();
    context.insert(
        "pipeline".to_string(),
        serde_json::Value::String(pipeline_id.to_string()),
    );
    context.insert(
        "name".to_string(),
        serde_json::Value::String(event.name.clone()),
    );

    for (key, value) in &event.fields {
        context.insert(key.clone(), value.clone());
    }

    for (key, value) in options {
        context.insert(key.clone(), value.clone());
    }

    context
}

/// Compose a chain from steps in plan order.
///
/// The whole context map is bound as the first step's argument; subsequent
/// steps carry no explicit argument. An empty step list yields an empty
/// chain, which callers treat as an immediately successful pipeline.
pub fn build_chain(
    pipeline_id: Uuid,
    steps: Vec<(Uuid, String)>,
    context: serde_json::Map<String, serde_json::Value>,
) -> TaskChain {
    let steps = steps
        .into_iter()
        .enumerate()
        .map(|(index, (task_id, function))| ChainStep {
            task_id,
            function,
            argument: if index == 0 {
                Some(serde_json::Value::Object(context.clone()))
            } else {
                None
            },
        })
        .collect();

    TaskChain { pipeline_id, steps }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_initial_context_merges_event_and_options() {
        let pipeline_id = Uuid::new_v4();
        let event = Event::new("deploy")
            .with_field("env", json!("prod"))
            .with_field("retries", json!(1));
        let options = HashMap::from([
            ("retries".to_string(), json!(5)),
            ("notify".to_string(), json!(true)),
        ]);

        let context = initial_context(pipeline_id, &event, &options);

        assert_eq!(context["pipeline"], json!(pipeline_id.to_string()));
        assert_eq!(context["name"], json!("deploy"));
        assert_eq!(context["env"], json!("prod"));
        // Options override event fields.
        assert_eq!(context["retries"], json!(5));
        assert_eq!(context["notify"], json!(true));
    }

    #[test]
    fn test_context_bound_to_first_step_only() {
        let pipeline_id = Uuid::new_v4();
        let context = initial_context(pipeline_id, &Event::new("deploy"), &HashMap::new());
        let steps = vec![
            (Uuid::new_v4(), "builtin.echo".to_string()),
            (Uuid::new_v4(), "builtin.save_context".to_string()),
            (Uuid::new_v4(), "builtin.echo".to_string()),
        ];

        let chain = build_chain(pipeline_id, steps, context.clone());

        assert_eq!(chain.steps.len(), 3);
        assert_eq!(
            chain.steps[0].argument,
            Some(serde_json::Value::Object(context))
        );
        assert_eq!(chain.steps[1].argument, None);
        assert_eq!(chain.steps[2].argument, None);
    }

    #[test]
    fn test_empty_plan_yields_empty_chain() {
        let pipeline_id = Uuid::new_v4();
        let context = initial_context(pipeline_id, &Event::new("deploy"), &HashMap::new());

        let chain = build_chain(pipeline_id, Vec::new(), context);

        assert!(chain.is_empty());
    }
}
