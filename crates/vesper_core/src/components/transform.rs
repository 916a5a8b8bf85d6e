//! World-space placement.

use bytemuck::{Pod, Zeroable};

use crate::ecs::{Component, ComponentKind, SingleInstanceManager, Vec3};

/// Position and scale of an entity in world space.
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Transform {
    /// World-space position.
    pub position: Vec3,
    /// Per-axis scale.
    pub scale: Vec3,
}

impl Transform {
    /// Creates a unit-scale transform at `position`.
    #[inline]
    #[must_use]
    pub const fn at(position: Vec3) -> Self {
        Self {
            position,
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::at(Vec3::ZERO)
    }
}

impl Component for Transform {
    const KIND: ComponentKind = ComponentKind::Transform;
}

/// Single-instance manager for [`Transform`].
pub type TransformComponentManager = SingleInstanceManager<Transform>;

impl TransformComponentManager {
    /// Returns the world position stored at `index`.
    #[must_use]
    pub fn world_position(&self, index: usize) -> Option<Vec3> {
        self.get_component(index).map(|t| t.position)
    }

    /// Overwrites the world position stored at `index`.
    ///
    /// # Returns
    ///
    /// `false` if the slot is vacant.
    pub fn set_world_position(&self, index: usize, position: Vec3) -> bool {
        self.get_component_mut(index)
            .map(|mut t| t.position = position)
            .is_some()
    }

    /// Moves the transform at `index` by `delta`.
    ///
    /// # Returns
    ///
    /// `false` if the slot is vacant.
    pub fn translate(&self, index: usize, delta: Vec3) -> bool {
        self.get_component_mut(index)
            .map(|mut t| t.position += delta)
            .is_some()
    }
}
