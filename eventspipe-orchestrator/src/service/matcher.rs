//! Definition Matcher
//!
//! Selects the pipeline definitions applicable to an inbound event. Fetches
//! the enabled candidates for the event name and applies the core precedence
//! rule: matching custom (filtered) definitions win outright, generic
//! definitions apply only when no custom definition matched.

use eventspipe_core::domain::definition::{PipelineDefinition, select_definitions};
use eventspipe_core::domain::event::Event;
use sqlx::PgPool;

use crate::repository::definition_repository;

/// Definitions to instantiate for an event. An empty result means "no
/// pipeline to run" and is not an error.
pub async fn matching_definitions(
    pool: &PgPool,
    event: &Event,
) -> Result<Vec<PipelineDefinition>, sqlx::Error> {
    let candidates = definition_repository::find_enabled_by_event(pool, &event.name).await?;
    let selected = select_definitions(&candidates, event);

    Ok(selected.into_iter().cloned().collect())
}
