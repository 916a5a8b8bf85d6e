//! # Facade Errors

use std::path::PathBuf;

use thiserror::Error;
use vesper_core::EcsError;
use vesper_rendering::ResourceError;

/// Errors loading the runtime configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("Failed to read config {path}: {source}")]
    Io {
        /// Path that was opened.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML for [`RuntimeConfig`](crate::RuntimeConfig).
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is out of range.
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Any error surfaced while assembling or running the engine.
#[derive(Error, Debug)]
pub enum VesperError {
    /// Configuration problem.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Entity/component or scheduler problem.
    #[error(transparent)]
    Ecs(#[from] EcsError),

    /// Resource or mesh problem.
    #[error(transparent)]
    Resource(#[from] ResourceError),
}

/// Result type for facade operations.
pub type VesperResult<T> = Result<T, VesperError>;
