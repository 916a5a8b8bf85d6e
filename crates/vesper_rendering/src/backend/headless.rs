//! CPU-side backend used for tests, tools and servers without a GPU.
//!
//! Payloads keep their bytes in memory so callers can inspect what would have
//! been uploaded. Every successful construction is counted per category.

use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;

use super::descriptor::{
    interface_variables, validate_shader_sources, BufferUsage, FramebufferDescriptor,
    MeshDescriptor, ShaderSource, ShaderStage, TextureDimension, TextureLayout,
};
use super::GraphicsBackend;
use crate::error::BackendError;
use crate::resource::ResourceKind;

/// Linked program: its sources and the interface names found in them.
#[derive(Debug)]
pub struct HeadlessShaderProgram {
    /// Debug label.
    pub label: String,
    /// Sources per stage, in submission order.
    pub sources: Vec<ShaderSource>,
    /// Vertex inputs in declaration order (attribute locations).
    pub vertex_inputs: Vec<String>,
    /// Fragment outputs in declaration order (draw buffer locations).
    pub fragment_outputs: Vec<String>,
}

/// Mesh with in-memory vertex and index buffers.
#[derive(Debug)]
pub struct HeadlessMesh {
    descriptor: MeshDescriptor,
    vertex_buffers: Mutex<Vec<Vec<u8>>>,
    index_buffer: Mutex<Vec<u8>>,
}

impl HeadlessMesh {
    /// Layout, capacities and format the mesh was created with.
    #[must_use]
    pub fn descriptor(&self) -> &MeshDescriptor {
        &self.descriptor
    }

    /// Copy of one vertex buffer.
    #[must_use]
    pub fn vertex_bytes(&self, buffer: usize) -> Option<Vec<u8>> {
        self.vertex_buffers.lock().get(buffer).cloned()
    }

    /// Copy of the index buffer.
    #[must_use]
    pub fn index_bytes(&self) -> Vec<u8> {
        self.index_buffer.lock().clone()
    }
}

/// Texture of any dimension.
#[derive(Debug)]
pub struct HeadlessTexture {
    /// Debug label.
    pub label: String,
    /// Shape.
    pub dimension: TextureDimension,
    /// Extent and format.
    pub layout: TextureLayout,
    /// Base level texels (zeroed when created without data).
    pub data: Vec<u8>,
}

/// Buffer object.
#[derive(Debug)]
pub struct HeadlessBuffer {
    /// Debug label.
    pub label: String,
    /// Binding usage.
    pub usage: BufferUsage,
    /// Contents.
    pub data: Vec<u8>,
}

/// Framebuffer description.
#[derive(Debug)]
pub struct HeadlessFramebuffer {
    /// Debug label.
    pub label: String,
    /// Attachments.
    pub descriptor: FramebufferDescriptor,
}

/// Backend that builds CPU-side payloads and validates every descriptor.
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    constructions: [AtomicUsize; ResourceKind::COUNT],
    mesh_updates: AtomicUsize,
}

impl HeadlessBackend {
    /// Creates a backend with zeroed counters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Successful constructions in one category.
    #[must_use]
    pub fn construction_count(&self, kind: ResourceKind) -> usize {
        self.constructions[kind.index()].load(Ordering::Acquire)
    }

    /// Successful constructions across all categories.
    #[must_use]
    pub fn total_constructions(&self) -> usize {
        self.constructions
            .iter()
            .map(|count| count.load(Ordering::Acquire))
            .sum()
    }

    /// Successful mesh updates.
    #[must_use]
    pub fn mesh_update_count(&self) -> usize {
        self.mesh_updates.load(Ordering::Acquire)
    }

    fn built<T>(&self, kind: ResourceKind, payload: T) -> Result<T, BackendError> {
        self.constructions[kind.index()].fetch_add(1, Ordering::AcqRel);
        Ok(payload)
    }

    fn texture(
        label: &str,
        dimension: TextureDimension,
        layout: &TextureLayout,
        data: Option<&[u8]>,
    ) -> Result<HeadlessTexture, BackendError> {
        layout.validate(dimension, data)?;
        Ok(HeadlessTexture {
            label: label.to_string(),
            dimension,
            layout: layout.clone(),
            data: data.map_or_else(|| vec![0; layout.base_level_bytes()], <[u8]>::to_vec),
        })
    }
}

impl GraphicsBackend for HeadlessBackend {
    type ShaderProgram = HeadlessShaderProgram;
    type Mesh = HeadlessMesh;
    type Texture2D = HeadlessTexture;
    type Texture2DArray = HeadlessTexture;
    type Texture3D = HeadlessTexture;
    type Buffer = HeadlessBuffer;
    type Framebuffer = HeadlessFramebuffer;

    fn create_shader_program(
        &self,
        label: &str,
        sources: &[ShaderSource],
    ) -> Result<Self::ShaderProgram, BackendError> {
        validate_shader_sources(sources)?;

        let stage_source = |stage: ShaderStage| {
            sources
                .iter()
                .find(|s| s.stage == stage)
                .map_or("", |s| s.source.as_str())
        };
        let program = HeadlessShaderProgram {
            label: label.to_string(),
            sources: sources.to_vec(),
            vertex_inputs: interface_variables(stage_source(ShaderStage::Vertex), "in"),
            fragment_outputs: interface_variables(stage_source(ShaderStage::Fragment), "out"),
        };
        self.built(ResourceKind::ShaderProgram, program)
    }

    fn create_mesh(&self, _label: &str, descriptor: &MeshDescriptor) -> Result<Self::Mesh, BackendError> {
        descriptor.validate()?;

        let vertex_buffers = if descriptor.vertex_buffers.is_empty() {
            descriptor
                .vertex_layouts
                .iter()
                .map(|layout| vec![0; layout.stride as usize * descriptor.vertex_count])
                .collect()
        } else {
            descriptor.vertex_buffers.clone()
        };
        let index_buffer = if descriptor.index_buffer.is_empty() {
            vec![0; descriptor.index_count * descriptor.index_format.byte_size()]
        } else {
            descriptor.index_buffer.clone()
        };

        let mesh = HeadlessMesh {
            descriptor: MeshDescriptor {
                vertex_buffers: Vec::new(),
                index_buffer: Vec::new(),
                ..descriptor.clone()
            },
            vertex_buffers: Mutex::new(vertex_buffers),
            index_buffer: Mutex::new(index_buffer),
        };
        self.built(ResourceKind::Mesh, mesh)
    }

    fn update_mesh(
        &self,
        mesh: &Self::Mesh,
        vertex_offset: usize,
        index_offset: usize,
        vertex_data: &[Vec<u8>],
        index_data: &[u8],
    ) -> Result<(), BackendError> {
        mesh.descriptor
            .validate_update(vertex_offset, index_offset, vertex_data, index_data)?;

        let mut buffers = mesh.vertex_buffers.lock();
        for ((buffer, bytes), layout) in buffers
            .iter_mut()
            .zip(vertex_data)
            .zip(&mesh.descriptor.vertex_layouts)
        {
            let start = vertex_offset * layout.stride as usize;
            buffer[start..start + bytes.len()].copy_from_slice(bytes);
        }
        drop(buffers);

        let start = index_offset * mesh.descriptor.index_format.byte_size();
        mesh.index_buffer.lock()[start..start + index_data.len()].copy_from_slice(index_data);

        self.mesh_updates.fetch_add(1, Ordering::AcqRel);
        Ok(())
    }

    fn create_texture_2d(
        &self,
        label: &str,
        layout: &TextureLayout,
        data: Option<&[u8]>,
    ) -> Result<Self::Texture2D, BackendError> {
        let texture = Self::texture(label, TextureDimension::D2, layout, data)?;
        self.built(ResourceKind::Texture2D, texture)
    }

    fn create_texture_2d_array(
        &self,
        label: &str,
        layout: &TextureLayout,
        data: Option<&[u8]>,
    ) -> Result<Self::Texture2DArray, BackendError> {
        let texture = Self::texture(label, TextureDimension::D2Array, layout, data)?;
        self.built(ResourceKind::Texture2DArray, texture)
    }

    fn create_texture_3d(
        &self,
        label: &str,
        layout: &TextureLayout,
        data: Option<&[u8]>,
    ) -> Result<Self::Texture3D, BackendError> {
        let texture = Self::texture(label, TextureDimension::D3, layout, data)?;
        self.built(ResourceKind::Texture3D, texture)
    }

    fn create_buffer(&self, label: &str, usage: BufferUsage, data: &[u8]) -> Result<Self::Buffer, BackendError> {
        let buffer = HeadlessBuffer {
            label: label.to_string(),
            usage,
            data: data.to_vec(),
        };
        self.built(ResourceKind::Buffer, buffer)
    }

    fn buffer_usage(buffer: &Self::Buffer) -> BufferUsage {
        buffer.usage
    }

    fn create_framebuffer(
        &self,
        label: &str,
        descriptor: &FramebufferDescriptor,
    ) -> Result<Self::Framebuffer, BackendError> {
        descriptor.validate()?;
        let framebuffer = HeadlessFramebuffer {
            label: label.to_string(),
            descriptor: descriptor.clone(),
        };
        self.built(ResourceKind::Framebuffer, framebuffer)
    }
}
