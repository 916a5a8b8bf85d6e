//! # Core Configuration
//!
//! Tunables for storage paging, the worker pool and bucketed systems.
//! Loaded once at startup (usually as the `[core]` table of the runtime TOML).

use serde::Deserialize;

use crate::error::{EcsError, EcsResult};

/// Default number of records per component storage page.
pub const DEFAULT_PAGE_SIZE: usize = 1000;

/// Default number of buckets a system splits its component range into.
pub const DEFAULT_BUCKET_COUNT: usize = 6;

/// Worker pool settings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Number of worker threads. `0` picks `available_parallelism - 1` (at least one).
    pub worker_threads: usize,
}

impl SchedulerConfig {
    /// Resolves the configured worker count against the host.
    #[must_use]
    pub fn resolved_worker_threads(&self) -> usize {
        if self.worker_threads > 0 {
            return self.worker_threads;
        }
        std::thread::available_parallelism()
            .map_or(1, |n| n.get().saturating_sub(1))
            .max(1)
    }
}

/// Component storage settings.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Records per storage page.
    pub page_size: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Settings shared by the built-in bucketed systems.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    /// Number of buckets (and therefore scheduler tasks) per system invocation.
    pub bucket_count: usize,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            bucket_count: DEFAULT_BUCKET_COUNT,
        }
    }
}

/// The `[core]` configuration section.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Worker pool settings.
    pub scheduler: SchedulerConfig,
    /// Storage settings.
    pub storage: StorageConfig,
    /// System settings.
    pub systems: SystemConfig,
}

impl CoreConfig {
    /// Checks value ranges that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::InvalidConfig`] for a zero page size or bucket count.
    pub fn validate(&self) -> EcsResult<()> {
        if self.storage.page_size == 0 {
            return Err(EcsError::InvalidConfig("storage.page_size must be > 0".into()));
        }
        if self.systems.bucket_count == 0 {
            return Err(EcsError::InvalidConfig("systems.bucket_count must be > 0".into()));
        }
        Ok(())
    }
}
