//! # VESPER Rendering
//!
//! GPU resource management that bridges many producer threads to the one
//! thread allowed to talk to the graphics context.
//!
//! ## Architecture
//!
//! ```text
//! asset threads ──create_*_async──> [ per-category queue ] ──drain()──> GraphicsBackend
//!       │                                                       │
//!       └──── get_*(id | name) ── WeakResource{id, weak, state} ┘
//! ```
//!
//! - Every category (shader program, mesh, textures, buffer, framebuffer) has
//!   its own locks and its own queue; categories never block each other.
//! - Names are deduplicated: asking twice for "prog" yields one resource.
//! - Handles carry a generation, so ids issued before `clear_all_resources`
//!   are detected as stale without touching any payload.
//!
//! ## Example
//!
//! ```rust,ignore
//! let resources = ResourceManager::new(HeadlessBackend::new());
//! let id = resources.create_buffer_object_async("camera", BufferUsage::Uniform, vec![0; 64]);
//! assert_eq!(resources.get_buffer_object(id).state, ResourceState::Pending);
//! resources.drain();
//! assert_eq!(resources.get_buffer_object(id).state, ResourceState::Ready);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod asset;
pub mod backend;
pub mod config;
pub mod error;
pub mod mesh;
pub mod resource;

pub use asset::{inject_compute_defines, AssetSource, FileSystemSource, MemorySource};
pub use backend::{
    BufferUsage, FramebufferDescriptor, GraphicsBackend, HeadlessBackend, HeadlessBuffer,
    HeadlessFramebuffer, HeadlessMesh, HeadlessShaderProgram, HeadlessTexture, IndexFormat,
    MeshDescriptor, PrimitiveTopology, ShaderFile, ShaderSource, ShaderStage, TextureDimension,
    TextureFormat, TextureLayout, VertexAttribute, VertexFormat, VertexLayout,
};
#[cfg(feature = "wgpu")]
pub use backend::WgpuBackend;
pub use config::{MeshBatchConfig, RenderingConfig};
pub use error::{BackendError, ResourceError, ResourceResult};
pub use mesh::{DrawIndexedParams, MeshComponent, MeshComponentManager, MeshData};
pub use resource::{ResourceId, ResourceKind, ResourceManager, ResourceState, WeakResource};
