//! wgpu implementation of [`GraphicsBackend`].
//!
//! Shader sources are WGSL. Buffer writes go through `Queue::write_buffer`, so
//! mesh updates must keep byte offsets and sizes 4-byte aligned.

use std::sync::Arc;

use wgpu::util::DeviceExt;

use super::descriptor::{
    validate_shader_sources, BufferUsage, FramebufferDescriptor, IndexFormat, MeshDescriptor,
    ShaderSource, ShaderStage, TextureDimension, TextureFormat, TextureLayout,
};
use super::GraphicsBackend;
use crate::error::BackendError;

/// Shader modules, one per stage.
#[derive(Debug)]
pub struct WgpuShaderProgram {
    /// Compiled modules with their stage.
    pub modules: Vec<(ShaderStage, wgpu::ShaderModule)>,
}

/// Vertex and index buffers of one mesh.
#[derive(Debug)]
pub struct WgpuMesh {
    /// Layout and capacities the buffers were sized for.
    pub descriptor: MeshDescriptor,
    /// One buffer per vertex layout.
    pub vertex_buffers: Vec<wgpu::Buffer>,
    /// Index buffer.
    pub index_buffer: wgpu::Buffer,
}

impl WgpuMesh {
    /// Index format for `set_index_buffer`.
    #[must_use]
    pub fn index_format(&self) -> wgpu::IndexFormat {
        match self.descriptor.index_format {
            IndexFormat::Uint16 => wgpu::IndexFormat::Uint16,
            IndexFormat::Uint32 => wgpu::IndexFormat::Uint32,
        }
    }
}

/// Texture with its default view.
#[derive(Debug)]
pub struct WgpuTexture {
    /// Texture object.
    pub texture: wgpu::Texture,
    /// Default view over all layers and mips.
    pub view: wgpu::TextureView,
}

/// Buffer with the usage it was created for.
#[derive(Debug)]
pub struct WgpuBuffer {
    /// Buffer object.
    pub buffer: wgpu::Buffer,
    /// Binding usage.
    pub usage: BufferUsage,
}

/// Render targets of a framebuffer.
#[derive(Debug)]
pub struct WgpuFramebuffer {
    /// Color attachments in binding order.
    pub color: Vec<WgpuTexture>,
    /// Depth attachment.
    pub depth: Option<WgpuTexture>,
}

/// Backend on top of a wgpu device and queue.
pub struct WgpuBackend {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
}

impl WgpuBackend {
    /// Wraps an existing device and queue.
    #[must_use]
    pub fn new(device: Arc<wgpu::Device>, queue: Arc<wgpu::Queue>) -> Self {
        Self { device, queue }
    }

    /// The wrapped device.
    #[must_use]
    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    fn texture(
        &self,
        label: &str,
        dimension: TextureDimension,
        layout: &TextureLayout,
        data: Option<&[u8]>,
        usage: wgpu::TextureUsages,
    ) -> Result<WgpuTexture, BackendError> {
        layout.validate(dimension, data)?;

        let size = wgpu::Extent3d {
            width: layout.width,
            height: layout.height,
            depth_or_array_layers: layout.depth_or_layers,
        };
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: layout.mip_levels,
            sample_count: 1,
            dimension: match dimension {
                TextureDimension::D2 | TextureDimension::D2Array => wgpu::TextureDimension::D2,
                TextureDimension::D3 => wgpu::TextureDimension::D3,
            },
            format: texture_format(layout.format),
            usage,
            view_formats: &[],
        });

        if let Some(data) = data {
            let bytes_per_row = u32::try_from(layout.width as usize * layout.format.bytes_per_texel())
                .map_err(|_| BackendError::InvalidDescriptor("texture row too wide".to_string()))?;
            self.queue.write_texture(
                wgpu::ImageCopyTexture {
                    texture: &texture,
                    mip_level: 0,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                },
                data,
                wgpu::ImageDataLayout {
                    offset: 0,
                    bytes_per_row: Some(bytes_per_row),
                    rows_per_image: Some(layout.height),
                },
                size,
            );
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            dimension: Some(match dimension {
                TextureDimension::D2 => wgpu::TextureViewDimension::D2,
                TextureDimension::D2Array => wgpu::TextureViewDimension::D2Array,
                TextureDimension::D3 => wgpu::TextureViewDimension::D3,
            }),
            ..Default::default()
        });
        Ok(WgpuTexture { texture, view })
    }
}

fn texture_format(format: TextureFormat) -> wgpu::TextureFormat {
    match format {
        TextureFormat::Rgba8Unorm => wgpu::TextureFormat::Rgba8Unorm,
        TextureFormat::Rgba16Float => wgpu::TextureFormat::Rgba16Float,
        TextureFormat::Rgba32Float => wgpu::TextureFormat::Rgba32Float,
        TextureFormat::R32Float => wgpu::TextureFormat::R32Float,
        TextureFormat::Depth32Float => wgpu::TextureFormat::Depth32Float,
    }
}

fn buffer_usages(usage: BufferUsage) -> wgpu::BufferUsages {
    let binding = match usage {
        BufferUsage::Vertex => wgpu::BufferUsages::VERTEX,
        BufferUsage::Index => wgpu::BufferUsages::INDEX,
        BufferUsage::Uniform => wgpu::BufferUsages::UNIFORM,
        BufferUsage::Storage => wgpu::BufferUsages::STORAGE,
    };
    binding | wgpu::BufferUsages::COPY_DST
}

fn check_alignment(what: &str, offset: usize, len: usize) -> Result<(), BackendError> {
    let align = wgpu::COPY_BUFFER_ALIGNMENT as usize;
    if offset % align != 0 || len % align != 0 {
        return Err(BackendError::InvalidDescriptor(format!(
            "{what} write at byte {offset} of {len} bytes is not {align}-byte aligned"
        )));
    }
    Ok(())
}

/// Validates a mesh update and returns the byte offset of every write.
///
/// All checks run before anything is written, so a rejected update leaves
/// the mesh untouched.
fn update_offsets(
    descriptor: &MeshDescriptor,
    vertex_offset: usize,
    index_offset: usize,
    vertex_data: &[Vec<u8>],
    index_data: &[u8],
) -> Result<(Vec<usize>, usize), BackendError> {
    descriptor.validate_update(vertex_offset, index_offset, vertex_data, index_data)?;

    let mut vertex_starts = Vec::with_capacity(vertex_data.len());
    for (bytes, layout) in vertex_data.iter().zip(&descriptor.vertex_layouts) {
        let start = vertex_offset * layout.stride as usize;
        check_alignment("vertex", start, bytes.len())?;
        vertex_starts.push(start);
    }
    let index_start = index_offset * descriptor.index_format.byte_size();
    check_alignment("index", index_start, index_data.len())?;
    Ok((vertex_starts, index_start))
}

impl GraphicsBackend for WgpuBackend {
    type ShaderProgram = WgpuShaderProgram;
    type Mesh = WgpuMesh;
    type Texture2D = WgpuTexture;
    type Texture2DArray = WgpuTexture;
    type Texture3D = WgpuTexture;
    type Buffer = WgpuBuffer;
    type Framebuffer = WgpuFramebuffer;

    fn create_shader_program(
        &self,
        label: &str,
        sources: &[ShaderSource],
    ) -> Result<Self::ShaderProgram, BackendError> {
        validate_shader_sources(sources)?;

        let modules = sources
            .iter()
            .map(|source| {
                let module = self.device.create_shader_module(wgpu::ShaderModuleDescriptor {
                    label: Some(label),
                    source: wgpu::ShaderSource::Wgsl(source.source.as_str().into()),
                });
                (source.stage, module)
            })
            .collect();
        Ok(WgpuShaderProgram { modules })
    }

    fn create_mesh(&self, label: &str, descriptor: &MeshDescriptor) -> Result<Self::Mesh, BackendError> {
        descriptor.validate()?;

        let vertex_buffers = descriptor
            .vertex_layouts
            .iter()
            .enumerate()
            .map(|(i, layout)| match descriptor.vertex_buffers.get(i) {
                Some(bytes) => self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(label),
                    contents: bytes,
                    usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                }),
                None => self.device.create_buffer(&wgpu::BufferDescriptor {
                    label: Some(label),
                    size: (layout.stride as usize * descriptor.vertex_count) as u64,
                    usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                    mapped_at_creation: false,
                }),
            })
            .collect();

        let index_buffer = if descriptor.index_buffer.is_empty() {
            self.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(label),
                size: (descriptor.index_count * descriptor.index_format.byte_size()) as u64,
                usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            })
        } else {
            self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: &descriptor.index_buffer,
                usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
            })
        };

        Ok(WgpuMesh {
            descriptor: MeshDescriptor {
                vertex_buffers: Vec::new(),
                index_buffer: Vec::new(),
                ..descriptor.clone()
            },
            vertex_buffers,
            index_buffer,
        })
    }

    fn update_mesh(
        &self,
        mesh: &Self::Mesh,
        vertex_offset: usize,
        index_offset: usize,
        vertex_data: &[Vec<u8>],
        index_data: &[u8],
    ) -> Result<(), BackendError> {
        let (vertex_starts, index_start) =
            update_offsets(&mesh.descriptor, vertex_offset, index_offset, vertex_data, index_data)?;

        for ((buffer, bytes), start) in mesh.vertex_buffers.iter().zip(vertex_data).zip(vertex_starts) {
            self.queue.write_buffer(buffer, start as u64, bytes);
        }
        self.queue.write_buffer(&mesh.index_buffer, index_start as u64, index_data);
        Ok(())
    }

    fn create_texture_2d(
        &self,
        label: &str,
        layout: &TextureLayout,
        data: Option<&[u8]>,
    ) -> Result<Self::Texture2D, BackendError> {
        self.texture(
            label,
            TextureDimension::D2,
            layout,
            data,
            wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        )
    }

    fn create_texture_2d_array(
        &self,
        label: &str,
        layout: &TextureLayout,
        data: Option<&[u8]>,
    ) -> Result<Self::Texture2DArray, BackendError> {
        self.texture(
            label,
            TextureDimension::D2Array,
            layout,
            data,
            wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        )
    }

    fn create_texture_3d(
        &self,
        label: &str,
        layout: &TextureLayout,
        data: Option<&[u8]>,
    ) -> Result<Self::Texture3D, BackendError> {
        self.texture(
            label,
            TextureDimension::D3,
            layout,
            data,
            wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        )
    }

    fn create_buffer(&self, label: &str, usage: BufferUsage, data: &[u8]) -> Result<Self::Buffer, BackendError> {
        let buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: data,
            usage: buffer_usages(usage),
        });
        Ok(WgpuBuffer { buffer, usage })
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

        let attachment = |format: TextureFormat| {
            self.texture(
                label,
                TextureDimension::D2,
                &TextureLayout::new_2d(format, descriptor.width, descriptor.height),
                None,
                wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            )
        };

        let color = descriptor
            .color_attachments
            .iter()
            .map(|format| attachment(*format))
            .collect::<Result<Vec<_>, _>>()?;
        let depth = descriptor.depth_attachment.map(attachment).transpose()?;
        Ok(WgpuFramebuffer { color, depth })
    }
}
