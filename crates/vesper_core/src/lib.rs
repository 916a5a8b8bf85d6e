//! # VESPER Core Runtime
//!
//! The data layer and the parallel execution substrate of the engine:
//! - Generational entity identifiers that detect stale references
//! - Paged component storage whose records never move once written
//! - Reader-writer locked component managers (single- and multi-instance)
//! - A fixed worker pool with a single "block until idle" barrier
//!
//! ## Architecture Rules
//!
//! 1. **Entities own nothing** - they are `{index, generation}` pairs
//! 2. **One lock per manager** - reads share, structural changes are exclusive
//! 3. **Systems fan out, then join** - bucketed tasks never outlive the barrier
//!
//! ## Example
//!
//! ```rust,ignore
//! use vesper_core::{EntityManager, TaskScheduler, TransformComponentManager, Transform, Vec3};
//!
//! let entities = EntityManager::new();
//! let transforms = TransformComponentManager::default();
//! let scheduler = TaskScheduler::with_workers(4)?;
//!
//! let e = entities.create();
//! transforms.add_component(e, Transform::at(Vec3::new(1.0, 0.0, 0.0)))?;
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod components;
pub mod config;
pub mod ecs;
pub mod error;
pub mod sched;
pub mod systems;

pub use components::{
    MoveTo, MoveToComponentManager, ProximityCallback, ProximityTrigger,
    ProximityTriggerComponentManager, Space, Transform, TransformComponentManager,
};
pub use config::{CoreConfig, SchedulerConfig, StorageConfig, SystemConfig};
pub use ecs::{
    Component, ComponentData, ComponentKind, ComponentManager, ComponentRecord, ComponentStorage,
    Entity, EntityManager, IndexTable, MultiInstanceIndex, MultiInstanceManager,
    SingleInstanceIndex, SingleInstanceManager, Vec3,
};
pub use error::{EcsError, EcsResult};
pub use sched::{bucket_ranges, TaskScheduler, TaskScope};
pub use systems::{animate_move_to, check_proximity_triggers};
