//! # Component System
//!
//! Components are data records owned by a component manager.
//! Each component type carries a compile-time kind tag instead of an ID
//! assigned at first use, so tags never depend on initialization order.

use bytemuck::{Pod, Zeroable};
use std::ops::{Add, AddAssign, Mul, Sub};

/// Closed set of component kinds known to the runtime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum ComponentKind {
    /// World-space placement.
    Transform = 0,
    /// Linear movement toward a target position.
    MoveTo = 1,
    /// Distance-based enter/leave callbacks.
    ProximityTrigger = 2,
    /// Sub-mesh range inside a GPU mesh resource.
    Mesh = 3,
}

impl ComponentKind {
    /// Human readable name, used in logs and errors.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Transform => "Transform",
            Self::MoveTo => "MoveTo",
            Self::ProximityTrigger => "ProximityTrigger",
            Self::Mesh => "Mesh",
        }
    }
}

/// Marker trait for ECS components.
///
/// Components must be:
/// - `Send + Sync`: records are read from worker threads
/// - `'static`: records live inside long-lived managers
///
/// # Example
///
/// ```rust,ignore
/// #[derive(Clone, Copy, Default, Pod, Zeroable)]
/// #[repr(C)]
/// struct Health {
///     value: f32,
/// }
///
/// impl Component for Health {
///     const KIND: ComponentKind = ComponentKind::Transform;
/// }
/// ```
pub trait Component: Send + Sync + 'static {
    /// Compile-time kind tag for this component type.
    const KIND: ComponentKind;
}

/// Three-component vector used by the built-in components.
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Vec3 {
    /// X coordinate.
    pub x: f32,
    /// Y coordinate.
    pub y: f32,
    /// Z coordinate.
    pub z: f32,
}

impl Vec3 {
    /// The zero vector.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    /// Creates a new vector.
    #[inline]
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Returns the squared length.
    ///
    /// This avoids the sqrt call for distance comparisons.
    #[inline]
    #[must_use]
    pub fn length_squared(self) -> f32 {
        self.x * self.x + self.y * self.y + self.z * self.z
    }

    /// Returns the length.
    #[inline]
    #[must_use]
    pub fn length(self) -> f32 {
        self.length_squared().sqrt()
    }

    /// Returns the distance to another point.
    #[inline]
    #[must_use]
    pub fn distance(self, other: Self) -> f32 {
        (self - other).length()
    }
}

impl Add for Vec3 {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign for Vec3 {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for Vec3 {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f32> for Vec3 {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}
