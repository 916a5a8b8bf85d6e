//! # Runtime Configuration
//!
//! One TOML file, loaded once at startup. Every section and key is optional.
//!
//! ```toml
//! [core.scheduler]
//! worker_threads = 4
//!
//! [core.storage]
//! page_size = 1000
//!
//! [core.systems]
//! bucket_count = 6
//!
//! [rendering]
//! drain_budget = 64
//!
//! [rendering.mesh_batch]
//! vertex_capacity = 1500000
//! index_capacity = 2000000
//! ```

use std::path::Path;

use serde::Deserialize;
use vesper_core::CoreConfig;
use vesper_rendering::RenderingConfig;

use crate::error::ConfigError;

/// Complete runtime configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// `[core]` section.
    pub core: CoreConfig,
    /// `[rendering]` section.
    pub rendering: RenderingConfig,
}

impl RuntimeConfig {
    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, otherwise the
    /// errors of [`from_toml_str`](Self::from_toml_str).
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::info!(path = %path.display(), "runtime config loaded");
        Ok(config)
    }

    /// Parses and validates TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML or unknown value types,
    /// [`ConfigError::Invalid`] for out-of-range values.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks value ranges of every section.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.core
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        self.rendering
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }
}
