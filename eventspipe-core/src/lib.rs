//! Eventspipe Core
//!
//! Core types and abstractions for the Eventspipe orchestration engine.
//!
//! This crate contains:
//! - Domain types: Core business entities (PipelineDefinition, Pipeline, Task, EventSchedule, etc.)
//! - Pure engine logic: definition matching, plan ordering, chain construction, schedule digests
//! - DTOs: Data transfer objects for the HTTP API

pub mod domain;
pub mod dto;
