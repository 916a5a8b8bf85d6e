//! Backend-neutral descriptions of GPU objects.

use std::path::PathBuf;

use crate::error::BackendError;

/// Format of one vertex attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VertexFormat {
    /// One `f32`.
    Float32,
    /// Two `f32`.
    Float32x2,
    /// Three `f32`.
    Float32x3,
    /// Four `f32`.
    Float32x4,
    /// One `u32`.
    Uint32,
    /// Four normalized `u8`.
    Unorm8x4,
}

impl VertexFormat {
    /// Size of the attribute in bytes.
    #[must_use]
    pub const fn byte_size(self) -> u32 {
        match self {
            Self::Float32 | Self::Uint32 | Self::Unorm8x4 => 4,
            Self::Float32x2 => 8,
            Self::Float32x3 => 12,
            Self::Float32x4 => 16,
        }
    }
}

/// One attribute inside a vertex buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct VertexAttribute {
    /// Attribute format.
    pub format: VertexFormat,
    /// Byte offset inside one vertex.
    pub offset: u32,
    /// Shader input location.
    pub shader_location: u32,
}

/// Layout of one vertex buffer.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct VertexLayout {
    /// Bytes between consecutive vertices.
    pub stride: u32,
    /// Attributes read from the buffer.
    pub attributes: Vec<VertexAttribute>,
}

impl VertexLayout {
    /// Builds a tightly packed layout, assigning locations from `first_location`.
    #[must_use]
    pub fn packed(formats: &[VertexFormat], first_location: u32) -> Self {
        let mut offset = 0;
        let mut attributes = Vec::with_capacity(formats.len());
        for (location, format) in (first_location..).zip(formats) {
            attributes.push(VertexAttribute {
                format: *format,
                offset,
                shader_location: location,
            });
            offset += format.byte_size();
        }
        Self {
            stride: offset,
            attributes,
        }
    }

    fn validate(&self) -> Result<(), BackendError> {
        if self.stride == 0 {
            return Err(BackendError::InvalidDescriptor(
                "vertex layout stride is zero".to_string(),
            ));
        }
        for attribute in &self.attributes {
            if attribute.offset + attribute.format.byte_size() > self.stride {
                return Err(BackendError::InvalidDescriptor(format!(
                    "attribute at location {} overruns stride {}",
                    attribute.shader_location, self.stride
                )));
            }
        }
        Ok(())
    }
}

/// Combined byte size of one vertex across all buffers.
#[must_use]
pub fn vertex_byte_size(layouts: &[VertexLayout]) -> usize {
    layouts.iter().map(|l| l.stride as usize).sum()
}

/// Width of an index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IndexFormat {
    /// 16-bit indices.
    Uint16,
    /// 32-bit indices.
    Uint32,
}

impl IndexFormat {
    /// Size of one index in bytes.
    #[must_use]
    pub const fn byte_size(self) -> usize {
        match self {
            Self::Uint16 => 2,
            Self::Uint32 => 4,
        }
    }
}

/// How indices are assembled into primitives.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PrimitiveTopology {
    /// Independent points.
    PointList,
    /// Independent lines.
    LineList,
    /// Connected line strip.
    LineStrip,
    /// Independent triangles.
    #[default]
    TriangleList,
    /// Connected triangle strip.
    TriangleStrip,
}

/// Everything needed to build a mesh.
///
/// With empty `vertex_buffers`/`index_buffer` the mesh is allocated with the
/// given capacities and filled later through `update_mesh`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MeshDescriptor {
    /// One layout per vertex buffer.
    pub vertex_layouts: Vec<VertexLayout>,
    /// Vertex capacity of every vertex buffer.
    pub vertex_count: usize,
    /// Index capacity.
    pub index_count: usize,
    /// Index width.
    pub index_format: IndexFormat,
    /// Primitive assembly.
    pub topology: PrimitiveTopology,
    /// Initial vertex bytes, one entry per layout (or empty).
    pub vertex_buffers: Vec<Vec<u8>>,
    /// Initial index bytes (or empty).
    pub index_buffer: Vec<u8>,
}

impl MeshDescriptor {
    /// Describes an empty mesh with room for `vertex_count` vertices and `index_count` indices.
    #[must_use]
    pub fn allocate(
        vertex_layouts: Vec<VertexLayout>,
        vertex_count: usize,
        index_count: usize,
        index_format: IndexFormat,
        topology: PrimitiveTopology,
    ) -> Self {
        Self {
            vertex_layouts,
            vertex_count,
            index_count,
            index_format,
            topology,
            vertex_buffers: Vec::new(),
            index_buffer: Vec::new(),
        }
    }

    /// Describes a mesh sized exactly to its data.
    ///
    /// The vertex count is taken from the first buffer; [`validate`](Self::validate)
    /// catches buffers that disagree.
    #[must_use]
    pub fn with_data(
        vertex_layouts: Vec<VertexLayout>,
        vertex_buffers: Vec<Vec<u8>>,
        index_buffer: Vec<u8>,
        index_format: IndexFormat,
        topology: PrimitiveTopology,
    ) -> Self {
        let vertex_count = match (vertex_layouts.first(), vertex_buffers.first()) {
            (Some(layout), Some(buffer)) if layout.stride > 0 => buffer.len() / layout.stride as usize,
            _ => 0,
        };
        let index_count = index_buffer.len() / index_format.byte_size();
        Self {
            vertex_layouts,
            vertex_count,
            index_count,
            index_format,
            topology,
            vertex_buffers,
            index_buffer,
        }
    }

    /// Checks layouts, capacities and initial data sizes.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::InvalidDescriptor`] describing the first problem found.
    pub fn validate(&self) -> Result<(), BackendError> {
        if self.vertex_layouts.is_empty() {
            return Err(BackendError::InvalidDescriptor(
                "mesh has no vertex layout".to_string(),
            ));
        }
        for layout in &self.vertex_layouts {
            layout.validate()?;
        }
        if self.vertex_count == 0 || self.index_count == 0 {
            return Err(BackendError::InvalidDescriptor(
                "mesh capacity is zero".to_string(),
            ));
        }

        if !self.vertex_buffers.is_empty() {
            if self.vertex_buffers.len() != self.vertex_layouts.len() {
                return Err(BackendError::InvalidDescriptor(format!(
                    "{} vertex buffers for {} layouts",
                    self.vertex_buffers.len(),
                    self.vertex_layouts.len()
                )));
            }
            for (buffer, layout) in self.vertex_buffers.iter().zip(&self.vertex_layouts) {
                if buffer.len() != layout.stride as usize * self.vertex_count {
                    return Err(BackendError::InvalidDescriptor(format!(
                        "vertex buffer of {} bytes does not hold {} vertices of stride {}",
                        buffer.len(),
                        self.vertex_count,
                        layout.stride
                    )));
                }
            }
        }

        if !self.index_buffer.is_empty()
            && self.index_buffer.len() != self.index_count * self.index_format.byte_size()
        {
            return Err(BackendError::InvalidDescriptor(format!(
                "index buffer of {} bytes does not hold {} indices",
                self.index_buffer.len(),
                self.index_count
            )));
        }
        Ok(())
    }

    /// Checks that a sub-range update fits inside this mesh.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::InvalidDescriptor`] if buffer counts disagree or
    /// any write would run past the allocated capacity.
    pub fn validate_update(
        &self,
        vertex_offset: usize,
        index_offset: usize,
        vertex_data: &[Vec<u8>],
        index_data: &[u8],
    ) -> Result<(), BackendError> {
        if vertex_data.len() != self.vertex_layouts.len() {
            return Err(BackendError::InvalidDescriptor(format!(
                "update has {} vertex buffers, mesh has {}",
                vertex_data.len(),
                self.vertex_layouts.len()
            )));
        }
        for (bytes, layout) in vertex_data.iter().zip(&self.vertex_layouts) {
            let stride = layout.stride as usize;
            if bytes.len() % stride != 0 {
                return Err(BackendError::InvalidDescriptor(format!(
                    "vertex update of {} bytes is not a multiple of stride {stride}",
                    bytes.len()
                )));
            }
            if vertex_offset + bytes.len() / stride > self.vertex_count {
                return Err(BackendError::InvalidDescriptor(format!(
                    "vertex update at {vertex_offset} overruns capacity {}",
                    self.vertex_count
                )));
            }
        }

        let index_size = self.index_format.byte_size();
        if index_data.len() % index_size != 0
            || index_offset + index_data.len() / index_size > self.index_count
        {
            return Err(BackendError::InvalidDescriptor(format!(
                "index update of {} bytes at {index_offset} does not fit capacity {}",
                index_data.len(),
                self.index_count
            )));
        }
        Ok(())
    }
}

/// Texel format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    /// 8-bit RGBA, normalized.
    Rgba8Unorm,
    /// 16-bit float RGBA.
    Rgba16Float,
    /// 32-bit float RGBA.
    Rgba32Float,
    /// Single 32-bit float channel.
    R32Float,
    /// 32-bit float depth.
    Depth32Float,
}

impl TextureFormat {
    /// Bytes per texel.
    #[must_use]
    pub const fn bytes_per_texel(self) -> usize {
        match self {
            Self::Rgba8Unorm | Self::R32Float | Self::Depth32Float => 4,
            Self::Rgba16Float => 8,
            Self::Rgba32Float => 16,
        }
    }
}

/// Shape of a texture resource.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextureDimension {
    /// Single 2D image.
    D2,
    /// Stack of 2D layers.
    D2Array,
    /// Volume.
    D3,
}

/// Size and format of a texture.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextureLayout {
    /// Texel format.
    pub format: TextureFormat,
    /// Width in texels.
    pub width: u32,
    /// Height in texels.
    pub height: u32,
    /// Layers (2D arrays) or depth (3D). Must be 1 for plain 2D textures.
    pub depth_or_layers: u32,
    /// Mip levels.
    pub mip_levels: u32,
}

impl TextureLayout {
    /// A single-mip 2D layout.
    #[must_use]
    pub const fn new_2d(format: TextureFormat, width: u32, height: u32) -> Self {
        Self {
            format,
            width,
            height,
            depth_or_layers: 1,
            mip_levels: 1,
        }
    }

    /// Bytes needed for the base mip level.
    #[must_use]
    pub fn base_level_bytes(&self) -> usize {
        self.width as usize
            * self.height as usize
            * self.depth_or_layers as usize
            * self.format.bytes_per_texel()
    }

    /// Checks extents against `dimension` and the size of optional initial data.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::InvalidDescriptor`] describing the problem.
    pub fn validate(&self, dimension: TextureDimension, data: Option<&[u8]>) -> Result<(), BackendError> {
        if self.width == 0 || self.height == 0 || self.depth_or_layers == 0 || self.mip_levels == 0 {
            return Err(BackendError::InvalidDescriptor(format!(
                "texture extent {}x{}x{} with {} mips",
                self.width, self.height, self.depth_or_layers, self.mip_levels
            )));
        }
        if dimension == TextureDimension::D2 && self.depth_or_layers != 1 {
            return Err(BackendError::InvalidDescriptor(
                "2D texture with more than one layer".to_string(),
            ));
        }
        if let Some(data) = data {
            if data.len() != self.base_level_bytes() {
                return Err(BackendError::InvalidDescriptor(format!(
                    "texture data is {} bytes, expected {}",
                    data.len(),
                    self.base_level_bytes()
                )));
            }
        }
        Ok(())
    }
}

/// What a buffer object is bound as.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BufferUsage {
    /// Vertex data.
    Vertex,
    /// Index data.
    Index,
    /// Uniform block.
    Uniform,
    /// Shader storage.
    Storage,
}

/// Attachments of a framebuffer object.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FramebufferDescriptor {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Color attachment formats, in binding order.
    pub color_attachments: Vec<TextureFormat>,
    /// Optional depth attachment format.
    pub depth_attachment: Option<TextureFormat>,
}

impl FramebufferDescriptor {
    /// Checks extent and attachments.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::InvalidDescriptor`] describing the problem.
    pub fn validate(&self) -> Result<(), BackendError> {
        if self.width == 0 || self.height == 0 {
            return Err(BackendError::InvalidDescriptor(format!(
                "framebuffer extent {}x{}",
                self.width, self.height
            )));
        }
        if self.color_attachments.is_empty() && self.depth_attachment.is_none() {
            return Err(BackendError::InvalidDescriptor(
                "framebuffer without attachments".to_string(),
            ));
        }
        if self.color_attachments.contains(&TextureFormat::Depth32Float) {
            return Err(BackendError::InvalidDescriptor(
                "depth format used as color attachment".to_string(),
            ));
        }
        Ok(())
    }
}

/// Pipeline stage of a shader.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    /// Vertex stage.
    Vertex,
    /// Tessellation control stage.
    TessControl,
    /// Tessellation evaluation stage.
    TessEvaluation,
    /// Geometry stage.
    Geometry,
    /// Fragment stage.
    Fragment,
    /// Compute stage.
    Compute,
}

/// A shader file to load through an [`AssetSource`](crate::asset::AssetSource).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShaderFile {
    /// Path relative to the asset source.
    pub path: PathBuf,
    /// Stage the file is compiled for.
    pub stage: ShaderStage,
}

impl ShaderFile {
    /// Creates a shader file entry.
    pub fn new(path: impl Into<PathBuf>, stage: ShaderStage) -> Self {
        Self {
            path: path.into(),
            stage,
        }
    }
}

/// Loaded shader text for one stage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShaderSource {
    /// Stage.
    pub stage: ShaderStage,
    /// Source text.
    pub source: String,
}

/// Checks a set of stages for a linkable combination.
///
/// # Errors
///
/// Returns [`BackendError::InvalidDescriptor`] for an empty set, an empty
/// source, a repeated stage, compute mixed with graphics stages, or a graphics
/// program without a vertex stage.
pub fn validate_shader_sources(sources: &[ShaderSource]) -> Result<(), BackendError> {
    if sources.is_empty() {
        return Err(BackendError::InvalidDescriptor(
            "shader program without stages".to_string(),
        ));
    }
    for (i, source) in sources.iter().enumerate() {
        if source.source.trim().is_empty() {
            return Err(BackendError::InvalidDescriptor(format!(
                "{:?} stage has empty source",
                source.stage
            )));
        }
        if sources[..i].iter().any(|s| s.stage == source.stage) {
            return Err(BackendError::InvalidDescriptor(format!(
                "{:?} stage given twice",
                source.stage
            )));
        }
    }

    let has_compute = sources.iter().any(|s| s.stage == ShaderStage::Compute);
    if has_compute && sources.len() > 1 {
        return Err(BackendError::InvalidDescriptor(
            "compute stage mixed with graphics stages".to_string(),
        ));
    }
    if !has_compute && !sources.iter().any(|s| s.stage == ShaderStage::Vertex) {
        return Err(BackendError::InvalidDescriptor(
            "graphics program without vertex stage".to_string(),
        ));
    }
    Ok(())
}

/// Names declared with `qualifier` (`in` or `out`) at the start of a line.
///
/// Used to bind vertex inputs and fragment outputs in declaration order.
#[must_use]
pub fn interface_variables(source: &str, qualifier: &str) -> Vec<String> {
    source
        .lines()
        .filter_map(|line| {
            let mut tokens = line.split_whitespace();
            if tokens.next()? != qualifier {
                return None;
            }
            let _type = tokens.next()?;
            let name = tokens.next()?.trim_end_matches(';');
            (!name.is_empty()).then(|| name.to_string())
        })
        .collect()
}
