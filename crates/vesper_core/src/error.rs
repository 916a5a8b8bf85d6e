//! # Core Error Types
//!
//! Errors surfaced by the ECS data layer and the task scheduler.
//!
//! Stale handles and missing lookups are *not* errors: they are reported as
//! `false`/`None`. Only rejected requests and setup failures end up here.

use thiserror::Error;

use crate::ecs::Entity;

/// Errors that can occur in the core runtime.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EcsError {
    /// A single-instance manager already holds a component for this entity.
    #[error("entity {entity:?} already has a component in single-instance manager {manager}")]
    ComponentAlreadyPresent {
        /// The entity that was passed to `add_component`.
        entity: Entity,
        /// Name of the component kind managed by the rejecting manager.
        manager: &'static str,
    },

    /// The entity handle is null or its generation no longer matches.
    #[error("stale or null entity handle {0:?}")]
    StaleEntity(Entity),

    /// A worker thread could not be started.
    #[error("failed to spawn scheduler worker: {0}")]
    WorkerSpawn(String),

    /// Invalid configuration value.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for core operations.
pub type EcsResult<T> = Result<T, EcsError>;
