//! Linear movement toward a target position.

use crate::ecs::{Component, ComponentKind, Entity, SingleInstanceManager, Vec3};

/// Frame in which a [`MoveTo`] target is expressed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Space {
    /// The target is a world-space position.
    Global,
    /// The target is an offset from the entity's position when movement starts.
    #[default]
    Local,
}

/// Moves an entity toward a target at constant speed.
#[derive(Clone, Debug, PartialEq)]
pub struct MoveTo {
    /// Target position (or offset, for [`Space::Local`]).
    pub target_position: Vec3,
    /// Movement speed in units per second.
    pub speed: f32,
    /// Frame the target is expressed in.
    pub move_orientation: Space,
    /// World-space target, fixed on the first update after the target was set.
    pub(crate) resolved_target: Option<Vec3>,
}

impl MoveTo {
    /// Creates a local-space movement with the given speed.
    #[must_use]
    pub fn new(target_position: Vec3, speed: f32) -> Self {
        Self {
            target_position,
            speed,
            move_orientation: Space::Local,
            resolved_target: None,
        }
    }

    /// Creates a world-space movement with the given speed.
    #[must_use]
    pub fn global(target_position: Vec3, speed: f32) -> Self {
        Self {
            move_orientation: Space::Global,
            ..Self::new(target_position, speed)
        }
    }

    /// Returns the world-space target once it has been resolved.
    #[must_use]
    pub fn resolved_target(&self) -> Option<Vec3> {
        self.resolved_target
    }

    /// World-space target for an entity currently at `position`.
    pub(crate) fn resolve(&mut self, position: Vec3) -> Vec3 {
        let (space, target) = (self.move_orientation, self.target_position);
        *self.resolved_target.get_or_insert_with(|| match space {
            Space::Global => target,
            Space::Local => position + target,
        })
    }

    fn retarget(&mut self, target_position: Vec3) {
        self.target_position = target_position;
        self.resolved_target = None;
    }
}

impl Default for MoveTo {
    fn default() -> Self {
        Self::new(Vec3::ZERO, 1.0)
    }
}

impl Component for MoveTo {
    const KIND: ComponentKind = ComponentKind::MoveTo;
}

/// Single-instance manager for [`MoveTo`].
pub type MoveToComponentManager = SingleInstanceManager<MoveTo>;

impl MoveToComponentManager {
    /// Replaces the target of `entity`'s movement.
    ///
    /// # Returns
    ///
    /// `false` if the entity has no [`MoveTo`] component.
    pub fn set_target_position(&self, entity: Entity, target_position: Vec3) -> bool {
        self.with_component_mut(entity, |m| m.retarget(target_position))
            .is_some()
    }

    /// Replaces the target of the movement stored at `index`.
    ///
    /// # Returns
    ///
    /// `false` if the slot is vacant.
    pub fn set_target_position_at(&self, index: usize, target_position: Vec3) -> bool {
        self.get_component_mut(index)
            .map(|mut m| m.retarget(target_position))
            .is_some()
    }
}
