//! # Built-in Components
//!
//! Component types shipped with the runtime and the managers that hold them:
//! - [`Transform`] in a single-instance manager
//! - [`MoveTo`] in a single-instance manager
//! - [`ProximityTrigger`] in a multi-instance manager (one entity may watch several targets)

mod move_to;
mod proximity;
mod transform;

pub use move_to::{MoveTo, MoveToComponentManager, Space};
pub use proximity::{ProximityCallback, ProximityTrigger, ProximityTriggerComponentManager};
pub use transform::{Transform, TransformComponentManager};
