//! API Module
//!
//! HTTP API layer for the orchestrator.
//! Each submodule handles endpoints for a specific domain.

pub mod artifact;
pub mod definition;
pub mod error;
pub mod event;
pub mod health;
pub mod pipeline;
pub mod schedule;

use axum::{
    Router,
    routing::{delete, get, post},
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::service::execution::ExecutionBackend;

/// Shared handler state, constructed once in `main`
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub backend: Arc<dyn ExecutionBackend>,
}

/// Create the main API router with all endpoints
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Inbound event API
        .route("/event/submit", post(event::submit_event))
        // Pipeline endpoints
        .route("/pipeline/list", get(pipeline::list_pipelines))
        .route("/pipeline/{id}", get(pipeline::get_pipeline))
        .route("/pipeline/{id}/tasks", get(pipeline::get_pipeline_tasks))
        .route("/pipeline/{id}/logs", get(pipeline::get_pipeline_logs))
        .route(
            "/pipeline/{id}/artifacts",
            get(pipeline::get_pipeline_artifacts),
        )
        // Artifact download
        .route("/artifact/{id}", get(artifact::download_artifact))
        // Definition endpoints
        .route("/definition/create", post(definition::create_definition))
        .route("/definition/list", get(definition::list_definitions))
        .route("/definition/{id}", get(definition::get_definition))
        .route("/definition/{id}", delete(definition::delete_definition))
        .route(
            "/definition/{id}/bindings",
            get(definition::list_bindings),
        )
        .route(
            "/definition/{id}/bindings",
            post(definition::create_binding),
        )
        .route("/task/list", get(definition::list_task_definitions))
        // Schedule endpoints
        .route("/schedule/create", post(schedule::create_schedule))
        .route("/schedule/list", get(schedule::list_schedules))
        .route("/schedule/{id}", get(schedule::get_schedule))
        .route("/schedule/{id}", delete(schedule::delete_schedule))
        // Add state and middleware
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
