//! Resource handles and weak views.

use std::fmt;
use std::sync::{Arc, Weak};

/// Resource categories, in drain order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceKind {
    /// Linked shader programs.
    ShaderProgram,
    /// Vertex + index meshes.
    Mesh,
    /// 2D textures.
    Texture2D,
    /// 2D texture arrays.
    Texture2DArray,
    /// 3D textures.
    Texture3D,
    /// Buffer objects.
    Buffer,
    /// Framebuffers.
    Framebuffer,
}

impl ResourceKind {
    /// Number of categories.
    pub const COUNT: usize = 7;

    /// Every category in drain order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::ShaderProgram,
        Self::Mesh,
        Self::Texture2D,
        Self::Texture2DArray,
        Self::Texture3D,
        Self::Buffer,
        Self::Framebuffer,
    ];

    /// Position in [`ResourceKind::ALL`].
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Human readable name, used in logs and errors.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::ShaderProgram => "shader program",
            Self::Mesh => "mesh",
            Self::Texture2D => "texture 2D",
            Self::Texture2DArray => "texture 2D array",
            Self::Texture3D => "texture 3D",
            Self::Buffer => "buffer",
            Self::Framebuffer => "framebuffer",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Opaque handle to a manager-owned resource.
///
/// `generation` is the manager epoch at creation time; every
/// `clear_all_resources` starts a new epoch, so older ids never match again.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId {
    /// Per-epoch counter.
    pub value: u32,
    /// Manager epoch.
    pub generation: u32,
}

impl ResourceId {
    /// Id that never refers to a resource.
    pub const INVALID: Self = Self {
        value: u32::MAX,
        generation: u32::MAX,
    };

    /// Creates an id.
    #[inline]
    #[must_use]
    pub const fn new(value: u32, generation: u32) -> Self {
        Self { value, generation }
    }

    /// Checks whether this is not [`ResourceId::INVALID`].
    #[inline]
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.value != u32::MAX || self.generation != u32::MAX
    }
}

impl Default for ResourceId {
    fn default() -> Self {
        Self::INVALID
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "#{}@{}", self.value, self.generation)
        } else {
            f.write_str("#invalid")
        }
    }
}

/// Construction state of a resource.
///
/// Moves `Pending -> Ready` or `Pending -> Failed` once and never back.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResourceState {
    /// Queued for construction on the context thread.
    Pending,
    /// Constructed and usable.
    Ready,
    /// Construction failed, or the lookup found nothing.
    Failed,
}

/// Non-owning snapshot of a resource.
///
/// The state is captured at lookup time; look the resource up again instead of
/// caching "ready". The weak pointer dies when the manager releases the payload
/// (clear, or a buffer update swapping it out).
pub struct WeakResource<T> {
    /// Handle of the resource ([`ResourceId::INVALID`] if the lookup missed).
    pub id: ResourceId,
    /// Payload pointer; empty unless the resource was ready.
    pub resource: Weak<T>,
    /// State at lookup time.
    pub state: ResourceState,
}

impl<T> WeakResource<T> {
    /// View returned for a lookup that found nothing.
    #[must_use]
    pub fn missing() -> Self {
        Self {
            id: ResourceId::INVALID,
            resource: Weak::new(),
            state: ResourceState::Failed,
        }
    }

    /// Checks whether the resource was ready at lookup time.
    #[inline]
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.state == ResourceState::Ready
    }

    /// Borrows the payload if it is still alive.
    #[must_use]
    pub fn upgrade(&self) -> Option<Arc<T>> {
        self.resource.upgrade()
    }
}

impl<T> Clone for WeakResource<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            resource: Weak::clone(&self.resource),
            state: self.state,
        }
    }
}

impl<T> fmt::Debug for WeakResource<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakResource")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("alive", &(self.resource.strong_count() > 0))
            .finish()
    }
}
