//! # Entity Component System
//!
//! The data layer shared by systems and asset-loading code.
//!
//! ## Design Philosophy
//!
//! - Entity IDs are simple indices with generation counters
//! - Component records live in pages that are never reallocated
//! - Each manager guards its storage and index table with one reader-writer lock
//! - Component kinds are a closed, compile-time enum

mod component;
mod entity;
mod manager;
mod storage;

pub use component::{Component, ComponentKind, Vec3};
pub use entity::{Entity, EntityManager};
pub use manager::{
    ComponentData, ComponentManager, ComponentRecord, IndexTable, MultiInstanceIndex,
    MultiInstanceManager, SingleInstanceIndex, SingleInstanceManager,
};
pub use storage::ComponentStorage;
