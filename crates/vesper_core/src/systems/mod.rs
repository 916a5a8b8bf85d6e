//! # Systems
//!
//! Per-frame functions that process a component range in parallel.
//!
//! Every system follows the same shape:
//! 1. Take the manager locks it needs, once
//! 2. Split the slot range into buckets with [`bucket_ranges`](crate::sched::bucket_ranges)
//! 3. Run one scheduler task per bucket and wait for all of them
//! 4. Apply side effects that need other locks on the calling thread

mod movement;
mod proximity;

pub use movement::animate_move_to;
pub use proximity::check_proximity_triggers;

use crate::ecs::{ComponentData, Entity, SingleInstanceIndex, Vec3};
use crate::components::Transform;

/// World position of `entity`, if it has a transform.
fn position_of(transforms: &ComponentData<Transform, SingleInstanceIndex>, entity: Entity) -> Option<Vec3> {
    let index = transforms.index_of(entity)?;
    transforms.get(index).map(|record| record.data.position)
}
