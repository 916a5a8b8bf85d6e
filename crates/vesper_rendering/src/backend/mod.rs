//! # Graphics Backends
//!
//! The seam between the resource manager and a concrete graphics API.
//!
//! A backend only constructs and mutates GPU objects; bookkeeping (handles,
//! names, states, queues) stays in the [`ResourceManager`](crate::resource::ResourceManager).
//! Every method is called from the context-owning thread.

mod descriptor;
mod headless;
#[cfg(feature = "wgpu")]
mod wgpu_backend;

pub use descriptor::{
    interface_variables, validate_shader_sources, vertex_byte_size, BufferUsage,
    FramebufferDescriptor, IndexFormat, MeshDescriptor, PrimitiveTopology, ShaderFile,
    ShaderSource, ShaderStage, TextureDimension, TextureFormat, TextureLayout, VertexAttribute,
    VertexFormat, VertexLayout,
};
pub use headless::{
    HeadlessBackend, HeadlessBuffer, HeadlessFramebuffer, HeadlessMesh, HeadlessShaderProgram,
    HeadlessTexture,
};
#[cfg(feature = "wgpu")]
pub use wgpu_backend::{WgpuBackend, WgpuBuffer, WgpuFramebuffer, WgpuMesh, WgpuShaderProgram, WgpuTexture};

use crate::error::BackendError;

/// Constructs GPU objects for the resource manager.
///
/// Payload types are owned by the manager behind `Arc` and handed out as
/// `Weak` views, so they must be shareable across threads.
pub trait GraphicsBackend: Send + Sync + 'static {
    /// Linked shader program.
    type ShaderProgram: Send + Sync + 'static;
    /// Vertex + index buffers with a fixed layout.
    type Mesh: Send + Sync + 'static;
    /// 2D texture.
    type Texture2D: Send + Sync + 'static;
    /// 2D texture array.
    type Texture2DArray: Send + Sync + 'static;
    /// 3D texture.
    type Texture3D: Send + Sync + 'static;
    /// Generic buffer object.
    type Buffer: Send + Sync + 'static;
    /// Framebuffer with its attachments.
    type Framebuffer: Send + Sync + 'static;

    /// Compiles and links a program from loaded sources.
    ///
    /// # Errors
    ///
    /// Returns a [`BackendError`] if the stages are invalid or fail to compile.
    fn create_shader_program(
        &self,
        label: &str,
        sources: &[ShaderSource],
    ) -> Result<Self::ShaderProgram, BackendError>;

    /// Allocates a mesh, uploading initial data when the descriptor has any.
    ///
    /// # Errors
    ///
    /// Returns a [`BackendError`] if the descriptor is invalid or allocation fails.
    fn create_mesh(&self, label: &str, descriptor: &MeshDescriptor) -> Result<Self::Mesh, BackendError>;

    /// Writes vertex and index data into an existing mesh.
    ///
    /// `vertex_offset` and `index_offset` count elements, not bytes.
    ///
    /// # Errors
    ///
    /// Returns a [`BackendError`] if the write does not fit the mesh.
    fn update_mesh(
        &self,
        mesh: &Self::Mesh,
        vertex_offset: usize,
        index_offset: usize,
        vertex_data: &[Vec<u8>],
        index_data: &[u8],
    ) -> Result<(), BackendError>;

    /// Creates a 2D texture.
    ///
    /// # Errors
    ///
    /// Returns a [`BackendError`] if the layout or data size is invalid.
    fn create_texture_2d(
        &self,
        label: &str,
        layout: &TextureLayout,
        data: Option<&[u8]>,
    ) -> Result<Self::Texture2D, BackendError>;

    /// Creates a 2D texture array.
    ///
    /// # Errors
    ///
    /// Returns a [`BackendError`] if the layout or data size is invalid.
    fn create_texture_2d_array(
        &self,
        label: &str,
        layout: &TextureLayout,
        data: Option<&[u8]>,
    ) -> Result<Self::Texture2DArray, BackendError>;

    /// Creates a 3D texture.
    ///
    /// # Errors
    ///
    /// Returns a [`BackendError`] if the layout or data size is invalid.
    fn create_texture_3d(
        &self,
        label: &str,
        layout: &TextureLayout,
        data: Option<&[u8]>,
    ) -> Result<Self::Texture3D, BackendError>;

    /// Creates a buffer object holding `data`.
    ///
    /// # Errors
    ///
    /// Returns a [`BackendError`] if allocation fails.
    fn create_buffer(&self, label: &str, usage: BufferUsage, data: &[u8]) -> Result<Self::Buffer, BackendError>;

    /// Usage a buffer was created with (kept when its contents are replaced).
    fn buffer_usage(buffer: &Self::Buffer) -> BufferUsage;

    /// Creates a framebuffer and its attachments.
    ///
    /// # Errors
    ///
    /// Returns a [`BackendError`] if the descriptor is invalid.
    fn create_framebuffer(
        &self,
        label: &str,
        descriptor: &FramebufferDescriptor,
    ) -> Result<Self::Framebuffer, BackendError>;
}
