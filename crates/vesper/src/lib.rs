//! # VESPER
//!
//! The facade crate: configuration, world state and the frame driver.
//!
//! ## Frame
//!
//! ```text
//! Frame N:
//! ┌─────────────────────────────────────────────────────────────┐
//! │ 1. SYSTEMS (registration order)                             │
//! │    └─ each splits its work into buckets on the scheduler    │
//! │       and returns after the barrier                         │
//! │                                                             │
//! │ 2. DRAIN (context thread)                                   │
//! │    └─ deferred resource creation and mesh uploads, up to    │
//! │       `drain_budget` per category                           │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `config`: TOML runtime configuration
//! - `world`: entity manager plus every component manager
//! - `frame`: system registry and per-frame orchestration

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod error;
pub mod frame;
pub mod world;

// Re-export the units
pub use vesper_core as core;
pub use vesper_rendering as rendering;

pub use config::RuntimeConfig;
pub use error::{ConfigError, VesperError, VesperResult};
pub use frame::{FrameDriver, FrameStats};
pub use world::WorldState;
