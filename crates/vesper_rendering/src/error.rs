//! # Rendering Errors
//!
//! Lookups never fail: a missing or stale handle yields a view whose state says
//! so. Errors are reserved for rejected requests and construction failures.

use std::path::PathBuf;

use thiserror::Error;
use vesper_core::EcsError;

use crate::resource::{ResourceId, ResourceKind, ResourceState};

/// Failure reported by a [`GraphicsBackend`](crate::backend::GraphicsBackend).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// The descriptor or data passed to a construction call is malformed.
    #[error("Invalid descriptor: {0}")]
    InvalidDescriptor(String),

    /// The device refused the operation.
    #[error("Device error: {0}")]
    Device(String),
}

/// Errors from the resource manager and the mesh component manager.
#[derive(Error, Debug)]
pub enum ResourceError {
    /// No resource with this id or name exists (or the id is stale).
    #[error("{kind} resource {key} not found")]
    NotFound {
        /// Category searched.
        kind: ResourceKind,
        /// Id or name looked up.
        key: String,
    },

    /// The resource exists but is not in the state the operation needs.
    #[error("{kind} resource {key} is {state:?}")]
    WrongState {
        /// Category of the resource.
        kind: ResourceKind,
        /// Id or name of the resource.
        key: String,
        /// State found.
        state: ResourceState,
    },

    /// GPU-side construction failed.
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// An asset file could not be read.
    #[error("Failed to read asset {path}: {source}")]
    AssetRead {
        /// Path handed to the asset source.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// New mesh data does not fit in the range reserved for it.
    #[error(
        "Mesh data needs {requested_vertices} vertices / {requested_indices} indices, \
         only {available_vertices} / {available_indices} reserved"
    )]
    MeshCapacity {
        /// Vertices in the new data.
        requested_vertices: usize,
        /// Indices in the new data.
        requested_indices: usize,
        /// Vertices reserved.
        available_vertices: usize,
        /// Indices reserved.
        available_indices: usize,
    },

    /// New mesh data cannot be written into the mesh holding its range.
    #[error("Mesh data does not fit mesh {resource}: {reason}")]
    MeshLayout {
        /// Mesh holding the range.
        resource: ResourceId,
        /// What differs.
        reason: String,
    },

    /// Component bookkeeping rejected the request.
    #[error(transparent)]
    Ecs(#[from] EcsError),

    /// A configuration value is out of range.
    #[error("Invalid rendering config: {0}")]
    InvalidConfig(String),
}

/// Result type for resource operations.
pub type ResourceResult<T> = Result<T, ResourceError>;
