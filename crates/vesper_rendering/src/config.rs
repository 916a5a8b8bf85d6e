//! # Rendering Configuration
//!
//! The `[rendering]` section of the runtime TOML.

use serde::Deserialize;

use crate::error::{ResourceError, ResourceResult};

/// Default vertex capacity of a shared mesh batch.
pub const DEFAULT_BATCH_VERTEX_CAPACITY: usize = 1_500_000;

/// Default index capacity of a shared mesh batch.
pub const DEFAULT_BATCH_INDEX_CAPACITY: usize = 2_000_000;

/// Capacities of newly allocated mesh batches.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MeshBatchConfig {
    /// Vertices per batch.
    pub vertex_capacity: usize,
    /// Indices per batch.
    pub index_capacity: usize,
}

impl Default for MeshBatchConfig {
    fn default() -> Self {
        Self {
            vertex_capacity: DEFAULT_BATCH_VERTEX_CAPACITY,
            index_capacity: DEFAULT_BATCH_INDEX_CAPACITY,
        }
    }
}

/// The `[rendering]` configuration section.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RenderingConfig {
    /// Maximum deferred tasks executed per category per drain. `None` drains everything.
    pub drain_budget: Option<usize>,
    /// Mesh batch sizing.
    pub mesh_batch: MeshBatchConfig,
}

impl RenderingConfig {
    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::InvalidConfig`] for zero batch capacities or a zero drain budget.
    pub fn validate(&self) -> ResourceResult<()> {
        if self.mesh_batch.vertex_capacity == 0 || self.mesh_batch.index_capacity == 0 {
            return Err(ResourceError::InvalidConfig(
                "mesh batch capacities must be greater than zero".to_string(),
            ));
        }
        if self.drain_budget == Some(0) {
            return Err(ResourceError::InvalidConfig(
                "drain_budget of 0 would never run deferred work".to_string(),
            ));
        }
        Ok(())
    }
}
