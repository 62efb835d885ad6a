//! Built-in pipeline tasks
//!
//! Tasks registered by default at process start. Deployments extend the
//! registry with their own implementations before the orchestrator boots.

use async_trait::async_trait;
use std::sync::Arc;

use crate::service::artifact_service;
use crate::service::registry::{PipelineTask, TaskContext, TaskError, TaskRegistry};

pub fn register_builtin_tasks(registry: &mut TaskRegistry) {
    registry.register(
        "builtin.echo",
        Some("Return the input context unchanged."),
        Arc::new(EchoTask),
    );
    registry.register(
        "builtin.save_context",
        Some("Store the current context as a JSON artifact on the pipeline."),
        Arc::new(SaveContextTask),
    );
}

/// Pass-through step, useful as a plan placeholder and in tests
struct EchoTask;

#[async_trait]
impl PipelineTask for EchoTask {
    async fn run(
        &self,
        _ctx: &TaskContext,
        input: serde_json::Value,
    ) -> Result<serde_json::Value, TaskError> {
        Ok(input)
    }
}

/// Snapshot the step input as a `context.json` artifact
struct SaveContextTask;

#[async_trait]
impl PipelineTask for SaveContextTask {
    async fn run(
        &self,
        ctx: &TaskContext,
        input: serde_json::Value,
    ) -> Result<serde_json::Value, TaskError> {
        let data = serde_json::to_vec_pretty(&input)
            .map_err(|e| TaskError::Failed(format!("failed to serialize context: {}", e)))?;

        artifact_service::save_artifact(&ctx.pool, ctx.pipeline_id, "context.json", &data)
            .await
            .map_err(|e| TaskError::Failed(format!("failed to store context artifact: {:?}", e)))?;

        Ok(input)
    }
}
