//! Task Registry
//!
//! Typed mapping from stable function identifiers to registered invocables,
//! populated once at process start. Lookup by exact key; a missing key is a
//! dedicated "not registered" error rather than a generic failure.
//!
//! The `task_definitions` table mirrors the registry and is reconciled
//! against it at startup: rows whose function is no longer registered are
//! deleted, newly registered functions are inserted with their description.

use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::repository::task_definition_repository;

/// Error raised by registry lookups and task bodies
#[derive(Debug)]
pub enum TaskError {
    NotRegistered(String),
    Failed(String),
}

impl std::fmt::Display for TaskError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskError::NotRegistered(function) => {
                write!(f, "task '{}' is not registered", function)
            }
            TaskError::Failed(message) => write!(f, "{}", message),
        }
    }
}

/// Execution-time handle passed to task bodies.
///
/// Gives a task access to the store and the pipeline it runs under, e.g. for
/// saving artifacts or writing log entries.
#[derive(Clone)]
pub struct TaskContext {
    pub pool: PgPool,
    pub pipeline_id: Uuid,
}

/// An invokable unit of work.
///
/// A task receives its sole input value (the bound initial context for the
/// first chain step, the previous step's return value otherwise) and returns
/// the value handed to the next step.
#[async_trait]
pub trait PipelineTask: Send + Sync {
    async fn run(
        &self,
        ctx: &TaskContext,
        input: serde_json::Value,
    ) -> Result<serde_json::Value, TaskError>;
}

struct Registration {
    description: Option<String>,
    task: Arc<dyn PipelineTask>,
}

/// Registry of invokable tasks keyed by function identifier
#[derive(Default)]
pub struct TaskRegistry {
    tasks: HashMap<String, Registration>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a task under a function identifier. A later registration for
    /// the same identifier replaces the earlier one.
    pub fn register(&mut self, function: &str, description: Option<&str>, task: Arc<dyn PipelineTask>) {
        self.tasks.insert(
            function.to_string(),
            Registration {
                description: description.map(|d| d.to_string()),
                task,
            },
        );
    }

    /// Resolve a function identifier to its task
    pub fn get(&self, function: &str) -> Result<Arc<dyn PipelineTask>, TaskError> {
        self.tasks
            .get(function)
            .map(|registration| Arc::clone(&registration.task))
            .ok_or_else(|| TaskError::NotRegistered(function.to_string()))
    }

    /// Registered (function, description) pairs
    pub fn registered(&self) -> Vec<(String, Option<String>)> {
        self.tasks
            .iter()
            .map(|(function, registration)| (function.clone(), registration.description.clone()))
            .collect()
    }
}

/// Reconcile the `task_definitions` table against the registry.
///
/// Unregistered rows are removed (their bindings cascade away); registered
/// functions without a row get one, carrying the registration's description.
pub async fn reconcile_task_definitions(
    pool: &PgPool,
    registry: &TaskRegistry,
) -> Result<(), sqlx::Error> {
    let registered = registry.registered();
    let functions: Vec<String> = registered.iter().map(|(f, _)| f.clone()).collect();

    let removed = task_definition_repository::delete_unregistered(pool, &functions).await?;
    if removed > 0 {
        tracing::info!("Removed {} unregistered task definition(s)", removed);
    }

    for (function, description) in &registered {
        if !task_definition_repository::exists_by_function(pool, function).await? {
            task_definition_repository::create(pool, function, description.as_deref()).await?;
            tracing::info!("Imported task definition: {}", function);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoopTask;

    #[async_trait]
    impl PipelineTask for NoopTask {
        async fn run(
            &self,
            _ctx: &TaskContext,
            input: serde_json::Value,
        ) -> Result<serde_json::Value, TaskError> {
            Ok(input)
        }
    }

    #[test]
    fn test_lookup_of_registered_task() {
        let mut registry = TaskRegistry::new();
        registry.register("builtin.noop", Some("Do nothing."), Arc::new(NoopTask));

        assert!(registry.get("builtin.noop").is_ok());
    }

    #[test]
    fn test_lookup_of_unknown_task_fails() {
        let registry = TaskRegistry::new();

        match registry.get("missing.task") {
            Err(TaskError::NotRegistered(function)) => assert_eq!(function, "missing.task"),
            other => panic!("expected NotRegistered, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_registered_lists_descriptions() {
        let mut registry = TaskRegistry::new();
        registry.register("builtin.noop", Some("Do nothing."), Arc::new(NoopTask));
        registry.register("builtin.other", None, Arc::new(NoopTask));

        let mut registered = registry.registered();
        registered.sort();

        assert_eq!(
            registered,
            vec![
                ("builtin.noop".to_string(), Some("Do nothing.".to_string())),
                ("builtin.other".to_string(), None),
            ]
        );
    }
}
