//! # Resource Manager
//!
//! Owns every GPU object, keyed by id and by name, per category.
//!
//! ## Threading
//!
//! - Any thread may look resources up and request deferred creation.
//! - Immediate creation, [`ResourceManager::drain`] and buffer replacement talk to
//!   the backend and must run on the context-owning thread.
//!
//! ## Handles
//!
//! Lookups return a [`WeakResource`]: id, weak payload and state. Lookups never
//! block on pending construction and never fail; a missing or stale key reads
//! as [`ResourceState::Failed`] with [`ResourceId::INVALID`].

mod category;
mod handle;
mod queue;

pub use handle::{ResourceId, ResourceKind, ResourceState, WeakResource};

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use self::category::{Claim, ResourceCategory};
use self::queue::{ContextQueue, ContextTask};
use crate::asset::{inject_compute_defines, AssetSource, FileSystemSource};
use crate::backend::{
    BufferUsage, FramebufferDescriptor, GraphicsBackend, IndexFormat, MeshDescriptor,
    PrimitiveTopology, ShaderFile, ShaderSource, ShaderStage, TextureLayout, VertexLayout,
};
use crate::error::{ResourceError, ResourceResult};

/// Selects one category of a manager.
type Select<B, T> = fn(&ResourceManager<B>) -> &ResourceCategory<T>;

/// Central store of GPU resources.
pub struct ResourceManager<B: GraphicsBackend> {
    backend: B,
    assets: Arc<dyn AssetSource>,
    /// Generation stamped into new ids; bumped by `clear_all_resources`.
    epoch: AtomicU32,
    next_value: AtomicU32,
    shader_programs: ResourceCategory<B::ShaderProgram>,
    meshes: ResourceCategory<B::Mesh>,
    textures_2d: ResourceCategory<B::Texture2D>,
    texture_2d_arrays: ResourceCategory<B::Texture2DArray>,
    textures_3d: ResourceCategory<B::Texture3D>,
    buffers: ResourceCategory<B::Buffer>,
    framebuffers: ResourceCategory<B::Framebuffer>,
    queues: [ContextQueue<B>; ResourceKind::COUNT],
    drain_lock: Mutex<()>,
}

impl<B: GraphicsBackend> ResourceManager<B> {
    /// Creates a manager reading shader files from the working directory.
    #[must_use]
    pub fn new(backend: B) -> Self {
        Self::with_assets(backend, Arc::new(FileSystemSource::default()))
    }

    /// Creates a manager with a custom asset source.
    #[must_use]
    pub fn with_assets(backend: B, assets: Arc<dyn AssetSource>) -> Self {
        Self {
            backend,
            assets,
            epoch: AtomicU32::new(0),
            next_value: AtomicU32::new(0),
            shader_programs: ResourceCategory::new(ResourceKind::ShaderProgram),
            meshes: ResourceCategory::new(ResourceKind::Mesh),
            textures_2d: ResourceCategory::new(ResourceKind::Texture2D),
            texture_2d_arrays: ResourceCategory::new(ResourceKind::Texture2DArray),
            textures_3d: ResourceCategory::new(ResourceKind::Texture3D),
            buffers: ResourceCategory::new(ResourceKind::Buffer),
            framebuffers: ResourceCategory::new(ResourceKind::Framebuffer),
            queues: std::array::from_fn(|_| ContextQueue::new()),
            drain_lock: Mutex::new(()),
        }
    }

    /// The backend resources are built with.
    #[inline]
    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// The source shader files are read from.
    #[inline]
    #[must_use]
    pub fn assets(&self) -> &Arc<dyn AssetSource> {
        &self.assets
    }

    fn next_id(&self) -> ResourceId {
        ResourceId::new(
            self.next_value.fetch_add(1, Ordering::AcqRel),
            self.epoch.load(Ordering::Acquire),
        )
    }

    /// Claims `name` and builds the payload right away.
    fn create_now<T>(
        &self,
        category: &ResourceCategory<T>,
        name: &str,
        build: impl FnOnce(&Self) -> ResourceResult<T>,
    ) -> WeakResource<T> {
        match category.claim(name, || self.next_id()) {
            Claim::Existing(slot) => category.view(slot),
            Claim::New { id, slot } => {
                category.complete(id, slot, build(self));
                category.view(slot)
            }
        }
    }

    /// Claims `name` and queues the build for the next drain.
    fn create_later<T: 'static>(
        &self,
        select: Select<B, T>,
        name: &str,
        build: impl FnOnce(&Self) -> ResourceResult<T> + Send + 'static,
    ) -> ResourceId {
        match self.claim_later(select, name, build) {
            Ok(id) | Err(id) => id,
        }
    }

    /// Claims `name` and queues the build, or returns `Err` with the id that
    /// already owns the name. The build is dropped in that case.
    fn claim_later<T: 'static>(
        &self,
        select: Select<B, T>,
        name: &str,
        build: impl FnOnce(&Self) -> ResourceResult<T> + Send + 'static,
    ) -> Result<ResourceId, ResourceId> {
        let category = select(self);
        match category.claim(name, || self.next_id()) {
            Claim::Existing(slot) => Err(category.view(slot).id),
            Claim::New { id, slot } => {
                self.enqueue(
                    category.kind(),
                    Box::new(move |manager: &Self| {
                        let result = build(manager);
                        select(manager).complete(id, slot, result);
                    }),
                );
                Ok(id)
            }
        }
    }

    fn enqueue(&self, kind: ResourceKind, task: ContextTask<B>) {
        self.queues[kind.index()].push(task);
    }

    // ------------------------------------------------------------------
    // Shader programs
    // ------------------------------------------------------------------

    /// Reads, prepares and links a shader program.
    ///
    /// `compute_defines` is inserted after the `#version` line of every
    /// compute stage. An unreadable file leaves the program `Failed`.
    pub fn create_shader_program(
        &self,
        name: &str,
        files: &[ShaderFile],
        compute_defines: &str,
    ) -> WeakResource<B::ShaderProgram> {
        self.create_now(&self.shader_programs, name, |manager| {
            let sources = load_shader_sources(manager.assets.as_ref(), files, compute_defines)?;
            Ok(manager.backend.create_shader_program(name, &sources)?)
        })
    }

    /// Deferred [`create_shader_program`](Self::create_shader_program).
    ///
    /// Files are read when the task runs.
    pub fn create_shader_program_async(
        &self,
        name: &str,
        files: Vec<ShaderFile>,
        compute_defines: String,
    ) -> ResourceId {
        let label = name.to_string();
        self.create_later(
            |m| &m.shader_programs,
            name,
            move |manager| {
                let sources = load_shader_sources(manager.assets.as_ref(), &files, &compute_defines)?;
                Ok(manager.backend.create_shader_program(&label, &sources)?)
            },
        )
    }

    /// Looks a shader program up by id.
    #[must_use]
    pub fn get_shader_program(&self, id: ResourceId) -> WeakResource<B::ShaderProgram> {
        self.shader_programs.get(id)
    }

    /// Looks a shader program up by name.
    #[must_use]
    pub fn get_shader_program_by_name(&self, name: &str) -> WeakResource<B::ShaderProgram> {
        self.shader_programs.get_by_name(name)
    }

    // ------------------------------------------------------------------
    // Meshes
    // ------------------------------------------------------------------

    /// Builds a mesh from a descriptor.
    pub fn create_mesh(&self, name: &str, descriptor: &MeshDescriptor) -> WeakResource<B::Mesh> {
        self.create_now(&self.meshes, name, |manager| {
            Ok(manager.backend.create_mesh(name, descriptor)?)
        })
    }

    /// Deferred [`create_mesh`](Self::create_mesh).
    pub fn create_mesh_async(&self, name: &str, descriptor: MeshDescriptor) -> ResourceId {
        let label = name.to_string();
        self.create_later(
            |m| &m.meshes,
            name,
            move |manager| Ok(manager.backend.create_mesh(&label, &descriptor)?),
        )
    }

    /// Queues allocation of an empty mesh with the given capacities.
    pub fn allocate_mesh_async(
        &self,
        name: &str,
        vertex_capacity: usize,
        index_capacity: usize,
        vertex_layouts: Vec<VertexLayout>,
        index_format: IndexFormat,
        topology: PrimitiveTopology,
    ) -> ResourceId {
        let descriptor = MeshDescriptor::allocate(
            vertex_layouts,
            vertex_capacity,
            index_capacity,
            index_format,
            topology,
        );
        self.create_mesh_async(name, descriptor)
    }

    /// [`allocate_mesh_async`](Self::allocate_mesh_async) that never hands back
    /// an existing mesh.
    ///
    /// # Returns
    ///
    /// The id of the new mesh, or `None` if `name` is already taken. Nothing
    /// is queued in that case.
    pub fn try_allocate_mesh_async(
        &self,
        name: &str,
        vertex_capacity: usize,
        index_capacity: usize,
        vertex_layouts: Vec<VertexLayout>,
        index_format: IndexFormat,
        topology: PrimitiveTopology,
    ) -> Option<ResourceId> {
        let descriptor = MeshDescriptor::allocate(
            vertex_layouts,
            vertex_capacity,
            index_capacity,
            index_format,
            topology,
        );
        let label = name.to_string();
        self.claim_later(
            |m| &m.meshes,
            name,
            move |manager| Ok(manager.backend.create_mesh(&label, &descriptor)?),
        )
        .ok()
    }

    /// Queues a write of vertex and index data into a mesh.
    ///
    /// Offsets count elements. The write runs after any creation queued
    /// before it; if the mesh is not ready by then it is dropped with a warning.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::NotFound`] if `id` is unknown or stale.
    pub fn update_mesh_async(
        &self,
        id: ResourceId,
        vertex_offset: usize,
        index_offset: usize,
        vertex_data: Vec<Vec<u8>>,
        index_data: Vec<u8>,
    ) -> ResourceResult<()> {
        if self.meshes.slot_of(id).is_none() {
            return Err(self.meshes.not_found(id));
        }
        self.enqueue(
            ResourceKind::Mesh,
            Box::new(move |manager: &Self| match manager.meshes.ready_payload(id) {
                Ok((mesh, name)) => {
                    if let Err(error) = manager.backend.update_mesh(
                        &mesh,
                        vertex_offset,
                        index_offset,
                        &vertex_data,
                        &index_data,
                    ) {
                        tracing::error!(id = %id, name = %name, error = %error, "mesh update failed");
                    }
                }
                Err(error) => {
                    tracing::warn!(id = %id, error = %error, "mesh update skipped");
                }
            }),
        );
        Ok(())
    }

    /// Looks a mesh up by id.
    #[must_use]
    pub fn get_mesh(&self, id: ResourceId) -> WeakResource<B::Mesh> {
        self.meshes.get(id)
    }

    /// Looks a mesh up by name.
    #[must_use]
    pub fn get_mesh_by_name(&self, name: &str) -> WeakResource<B::Mesh> {
        self.meshes.get_by_name(name)
    }

    // ------------------------------------------------------------------
    // Textures
    // ------------------------------------------------------------------

    /// Creates a 2D texture, optionally with base-level data.
    pub fn create_texture_2d(
        &self,
        name: &str,
        layout: &TextureLayout,
        data: Option<&[u8]>,
    ) -> WeakResource<B::Texture2D> {
        self.create_now(&self.textures_2d, name, |manager| {
            Ok(manager.backend.create_texture_2d(name, layout, data)?)
        })
    }

    /// Deferred [`create_texture_2d`](Self::create_texture_2d).
    pub fn create_texture_2d_async(
        &self,
        name: &str,
        layout: TextureLayout,
        data: Option<Vec<u8>>,
    ) -> ResourceId {
        let label = name.to_string();
        self.create_later(
            |m| &m.textures_2d,
            name,
            move |manager| Ok(manager.backend.create_texture_2d(&label, &layout, data.as_deref())?),
        )
    }

    /// Looks a 2D texture up by id.
    #[must_use]
    pub fn get_texture_2d(&self, id: ResourceId) -> WeakResource<B::Texture2D> {
        self.textures_2d.get(id)
    }

    /// Looks a 2D texture up by name.
    #[must_use]
    pub fn get_texture_2d_by_name(&self, name: &str) -> WeakResource<B::Texture2D> {
        self.textures_2d.get_by_name(name)
    }

    /// Creates a 2D texture array; `layout.depth_or_layers` is the layer count.
    pub fn create_texture_2d_array(
        &self,
        name: &str,
        layout: &TextureLayout,
        data: Option<&[u8]>,
    ) -> WeakResource<B::Texture2DArray> {
        self.create_now(&self.texture_2d_arrays, name, |manager| {
            Ok(manager.backend.create_texture_2d_array(name, layout, data)?)
        })
    }

    /// Deferred [`create_texture_2d_array`](Self::create_texture_2d_array).
    pub fn create_texture_2d_array_async(
        &self,
        name: &str,
        layout: TextureLayout,
        data: Option<Vec<u8>>,
    ) -> ResourceId {
        let label = name.to_string();
        self.create_later(
            |m| &m.texture_2d_arrays,
            name,
            move |manager| {
                Ok(manager
                    .backend
                    .create_texture_2d_array(&label, &layout, data.as_deref())?)
            },
        )
    }

    /// Looks a 2D texture array up by id.
    #[must_use]
    pub fn get_texture_2d_array(&self, id: ResourceId) -> WeakResource<B::Texture2DArray> {
        self.texture_2d_arrays.get(id)
    }

    /// Looks a 2D texture array up by name.
    #[must_use]
    pub fn get_texture_2d_array_by_name(&self, name: &str) -> WeakResource<B::Texture2DArray> {
        self.texture_2d_arrays.get_by_name(name)
    }

    /// Creates a 3D texture.
    pub fn create_texture_3d(
        &self,
        name: &str,
        layout: &TextureLayout,
        data: Option<&[u8]>,
    ) -> WeakResource<B::Texture3D> {
        self.create_now(&self.textures_3d, name, |manager| {
            Ok(manager.backend.create_texture_3d(name, layout, data)?)
        })
    }

    /// Deferred [`create_texture_3d`](Self::create_texture_3d).
    pub fn create_texture_3d_async(
        &self,
        name: &str,
        layout: TextureLayout,
        data: Option<Vec<u8>>,
    ) -> ResourceId {
        let label = name.to_string();
        self.create_later(
            |m| &m.textures_3d,
            name,
            move |manager| Ok(manager.backend.create_texture_3d(&label, &layout, data.as_deref())?),
        )
    }

    /// Looks a 3D texture up by id.
    #[must_use]
    pub fn get_texture_3d(&self, id: ResourceId) -> WeakResource<B::Texture3D> {
        self.textures_3d.get(id)
    }

    /// Looks a 3D texture up by name.
    #[must_use]
    pub fn get_texture_3d_by_name(&self, name: &str) -> WeakResource<B::Texture3D> {
        self.textures_3d.get_by_name(name)
    }

    // ------------------------------------------------------------------
    // Buffer objects
    // ------------------------------------------------------------------

    /// Creates a buffer holding `data`.
    pub fn create_buffer_object(
        &self,
        name: &str,
        usage: BufferUsage,
        data: &[u8],
    ) -> WeakResource<B::Buffer> {
        self.create_now(&self.buffers, name, |manager| {
            Ok(manager.backend.create_buffer(name, usage, data)?)
        })
    }

    /// Deferred [`create_buffer_object`](Self::create_buffer_object).
    pub fn create_buffer_object_async(&self, name: &str, usage: BufferUsage, data: Vec<u8>) -> ResourceId {
        let label = name.to_string();
        self.create_later(
            |m| &m.buffers,
            name,
            move |manager| Ok(manager.backend.create_buffer(&label, usage, &data)?),
        )
    }

    /// Replaces a buffer's contents.
    ///
    /// The buffer is rebuilt with its previous usage and keeps its id and
    /// name; weak views taken before the update go stale.
    ///
    /// # Errors
    ///
    /// - [`ResourceError::NotFound`] if `id` is unknown or stale
    /// - [`ResourceError::WrongState`] if the buffer is not ready
    /// - [`ResourceError::Backend`] if the new buffer cannot be built (the old one is kept)
    pub fn update_buffer_object(&self, id: ResourceId, data: &[u8]) -> ResourceResult<WeakResource<B::Buffer>> {
        let (current, name) = self.buffers.ready_payload(id)?;
        let usage = B::buffer_usage(&current);
        drop(current);

        let buffer = self.backend.create_buffer(&name, usage, data)?;
        let view = self.buffers.replace(id, buffer)?;
        tracing::debug!(id = %id, name = %name, bytes = data.len(), "buffer contents replaced");
        Ok(view)
    }

    /// [`update_buffer_object`](Self::update_buffer_object) keyed by name.
    ///
    /// # Errors
    ///
    /// Same as [`update_buffer_object`](Self::update_buffer_object).
    pub fn update_buffer_object_by_name(
        &self,
        name: &str,
        data: &[u8],
    ) -> ResourceResult<WeakResource<B::Buffer>> {
        let id = self.buffers.id_of_name(name).ok_or_else(|| ResourceError::NotFound {
            kind: ResourceKind::Buffer,
            key: name.to_string(),
        })?;
        self.update_buffer_object(id, data)
    }

    /// Queues [`update_buffer_object`](Self::update_buffer_object) for the next drain.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::NotFound`] if `id` is unknown or stale.
    pub fn update_buffer_object_async(&self, id: ResourceId, data: Vec<u8>) -> ResourceResult<()> {
        if self.buffers.slot_of(id).is_none() {
            return Err(self.buffers.not_found(id));
        }
        self.enqueue(
            ResourceKind::Buffer,
            Box::new(move |manager: &Self| {
                if let Err(error) = manager.update_buffer_object(id, &data) {
                    tracing::warn!(id = %id, error = %error, "deferred buffer update skipped");
                }
            }),
        );
        Ok(())
    }

    /// Looks a buffer up by id.
    #[must_use]
    pub fn get_buffer_object(&self, id: ResourceId) -> WeakResource<B::Buffer> {
        self.buffers.get(id)
    }

    /// Looks a buffer up by name.
    #[must_use]
    pub fn get_buffer_object_by_name(&self, name: &str) -> WeakResource<B::Buffer> {
        self.buffers.get_by_name(name)
    }

    // ------------------------------------------------------------------
    // Framebuffers
    // ------------------------------------------------------------------

    /// Creates a framebuffer and its attachments.
    pub fn create_framebuffer_object(
        &self,
        name: &str,
        descriptor: &FramebufferDescriptor,
    ) -> WeakResource<B::Framebuffer> {
        self.create_now(&self.framebuffers, name, |manager| {
            Ok(manager.backend.create_framebuffer(name, descriptor)?)
        })
    }

    /// Deferred [`create_framebuffer_object`](Self::create_framebuffer_object).
    pub fn create_framebuffer_object_async(&self, name: &str, descriptor: FramebufferDescriptor) -> ResourceId {
        let label = name.to_string();
        self.create_later(
            |m| &m.framebuffers,
            name,
            move |manager| Ok(manager.backend.create_framebuffer(&label, &descriptor)?),
        )
    }

    /// Looks a framebuffer up by id.
    #[must_use]
    pub fn get_framebuffer_object(&self, id: ResourceId) -> WeakResource<B::Framebuffer> {
        self.framebuffers.get(id)
    }

    /// Looks a framebuffer up by name.
    #[must_use]
    pub fn get_framebuffer_object_by_name(&self, name: &str) -> WeakResource<B::Framebuffer> {
        self.framebuffers.get_by_name(name)
    }

    // ------------------------------------------------------------------
    // Context thread
    // ------------------------------------------------------------------

    /// Runs every queued task. See [`drain_with_budget`](Self::drain_with_budget).
    pub fn drain(&self) -> usize {
        self.drain_queues(None)
    }

    /// Runs at most `budget` queued tasks per category.
    ///
    /// Categories are visited in [`ResourceKind::ALL`] order and tasks run
    /// FIFO within a category. Tasks queued while draining wait for the next
    /// call. Must be called from the context-owning thread; a concurrent
    /// second caller returns 0 without running anything.
    ///
    /// # Returns
    ///
    /// Number of tasks executed.
    pub fn drain_with_budget(&self, budget: usize) -> usize {
        self.drain_queues(Some(budget))
    }

    fn drain_queues(&self, budget: Option<usize>) -> usize {
        let Some(_guard) = self.drain_lock.try_lock() else {
            tracing::warn!("drain already running on another thread");
            return 0;
        };

        let mut executed = 0;
        for kind in ResourceKind::ALL {
            let queue = &self.queues[kind.index()];
            let queued = queue.len();
            let limit = budget.map_or(queued, |b| b.min(queued));
            for _ in 0..limit {
                let Some(task) = queue.pop() else { break };
                task(self);
                executed += 1;
            }
        }

        if executed > 0 {
            tracing::debug!(executed, remaining = self.pending_task_count(), "context queue drained");
        }
        executed
    }

    /// Releases every resource, resets all indices and drops queued tasks.
    ///
    /// Ids handed out before the call are stale afterwards, even when a new
    /// resource reuses the same value. Only call this when no other thread is
    /// using the manager.
    pub fn clear_all_resources(&self) {
        let discarded: usize = self.queues.iter().map(ContextQueue::discard).sum();
        self.epoch.fetch_add(1, Ordering::AcqRel);
        self.next_value.store(0, Ordering::Release);

        let released = self.shader_programs.clear()
            + self.meshes.clear()
            + self.textures_2d.clear()
            + self.texture_2d_arrays.clear()
            + self.textures_3d.clear()
            + self.buffers.clear()
            + self.framebuffers.clear();

        tracing::info!(released, discarded, "all resources cleared");
    }

    // ------------------------------------------------------------------
    // Diagnostics
    // ------------------------------------------------------------------

    /// Records in every category, whatever their state.
    #[must_use]
    pub fn resource_count(&self) -> usize {
        ResourceKind::ALL.iter().map(|&kind| self.resource_count_of(kind)).sum()
    }

    /// Records in one category.
    #[must_use]
    pub fn resource_count_of(&self, kind: ResourceKind) -> usize {
        match kind {
            ResourceKind::ShaderProgram => self.shader_programs.len(),
            ResourceKind::Mesh => self.meshes.len(),
            ResourceKind::Texture2D => self.textures_2d.len(),
            ResourceKind::Texture2DArray => self.texture_2d_arrays.len(),
            ResourceKind::Texture3D => self.textures_3d.len(),
            ResourceKind::Buffer => self.buffers.len(),
            ResourceKind::Framebuffer => self.framebuffers.len(),
        }
    }

    /// Tasks waiting for the next drain, over all categories.
    #[must_use]
    pub fn pending_task_count(&self) -> usize {
        self.queues.iter().map(ContextQueue::len).sum()
    }

    /// Tasks waiting in one category.
    #[must_use]
    pub fn pending_task_count_of(&self, kind: ResourceKind) -> usize {
        self.queues[kind.index()].len()
    }
}

/// Reads each file and applies compute defines.
fn load_shader_sources(
    assets: &dyn AssetSource,
    files: &[ShaderFile],
    compute_defines: &str,
) -> ResourceResult<Vec<ShaderSource>> {
    files
        .iter()
        .map(|file| {
            let source = assets
                .read_to_string(&file.path)
                .map_err(|source| ResourceError::AssetRead {
                    path: file.path.clone(),
                    source,
                })?;
            let source = if file.stage == ShaderStage::Compute && !compute_defines.is_empty() {
                inject_compute_defines(&source, compute_defines)
            } else {
                source
            };
            Ok(ShaderSource {
                stage: file.stage,
                source,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::MemorySource;
    use crate::backend::{HeadlessBackend, TextureFormat, VertexFormat};

    fn manager() -> ResourceManager<HeadlessBackend> {
        ResourceManager::new(HeadlessBackend::new())
    }

    fn layout() -> Vec<VertexLayout> {
        vec![VertexLayout::packed(&[VertexFormat::Float32x3], 0)]
    }

    #[test]
    fn test_immediate_create_dedups() {
        let rm = manager();
        let a = rm.create_buffer_object("ubo", BufferUsage::Uniform, &[0; 16]);
        let b = rm.create_buffer_object("ubo", BufferUsage::Uniform, &[1; 32]);

        assert!(a.is_ready());
        assert_eq!(a.id, b.id);
        assert_eq!(rm.backend().construction_count(ResourceKind::Buffer), 1);
        assert_eq!(rm.get_buffer_object_by_name("ubo").id, a.id);
    }

    #[test]
    fn test_async_create_is_pending_until_drain() {
        let rm = manager();
        let id = rm.create_texture_2d_async("albedo", TextureLayout::new_2d(TextureFormat::Rgba8Unorm, 4, 4), None);

        assert!(id.is_valid());
        assert_eq!(rm.get_texture_2d(id).state, ResourceState::Pending);
        assert!(rm.get_texture_2d(id).upgrade().is_none());
        assert_eq!(rm.pending_task_count(), 1);

        assert_eq!(rm.drain(), 1);
        assert!(rm.get_texture_2d(id).is_ready());
        assert_eq!(rm.pending_task_count(), 0);
    }

    #[test]
    fn test_failed_construction_is_reported_in_state() {
        let rm = manager();
        let bad = MeshDescriptor::allocate(Vec::new(), 3, 3, IndexFormat::Uint32, PrimitiveTopology::TriangleList);
        let view = rm.create_mesh("broken", &bad);

        assert_eq!(view.state, ResourceState::Failed);
        assert!(view.id.is_valid());
        assert!(view.upgrade().is_none());
        // The name stays taken by the failed record
        assert_eq!(rm.create_mesh("broken", &bad).id, view.id);
    }

    #[test]
    fn test_missing_lookup() {
        let rm = manager();
        let view = rm.get_mesh_by_name("nothing");
        assert_eq!(view.state, ResourceState::Failed);
        assert_eq!(view.id, ResourceId::INVALID);
    }

    #[test]
    fn test_update_buffer_keeps_identity() {
        let rm = manager();
        let before = rm.create_buffer_object("ssbo", BufferUsage::Storage, &[0; 8]);
        let after = rm.update_buffer_object_by_name("ssbo", &[7; 64]).unwrap();

        assert_eq!(before.id, after.id);
        assert!(before.upgrade().is_none());
        let buffer = after.upgrade().unwrap();
        assert_eq!(buffer.usage, BufferUsage::Storage);
        assert_eq!(buffer.data.len(), 64);
    }

    #[test]
    fn test_update_pending_buffer_is_rejected() {
        let rm = manager();
        let id = rm.create_buffer_object_async("late", BufferUsage::Vertex, vec![0; 4]);
        assert!(matches!(
            rm.update_buffer_object(id, &[1; 4]),
            Err(ResourceError::WrongState { state: ResourceState::Pending, .. })
        ));
        assert!(matches!(
            rm.update_buffer_object_by_name("missing", &[1; 4]),
            Err(ResourceError::NotFound { .. })
        ));
    }

    #[test]
    fn test_clear_makes_ids_stale() {
        let rm = manager();
        let old = rm.create_buffer_object("a", BufferUsage::Uniform, &[0; 4]);
        rm.create_mesh_async("queued", MeshDescriptor::allocate(layout(), 3, 3, IndexFormat::Uint16, PrimitiveTopology::TriangleList));

        rm.clear_all_resources();
        assert_eq!(rm.resource_count(), 0);
        assert_eq!(rm.pending_task_count(), 0);
        assert!(old.upgrade().is_none());

        let fresh = rm.create_buffer_object("a", BufferUsage::Uniform, &[0; 4]);
        assert_eq!(fresh.id.value, old.id.value);
        assert_ne!(fresh.id, old.id);
        assert_eq!(rm.get_buffer_object(old.id).state, ResourceState::Failed);
    }

    #[test]
    fn test_drain_budget_per_category() {
        let rm = manager();
        for i in 0..3 {
            rm.create_buffer_object_async(&format!("b{i}"), BufferUsage::Uniform, vec![0; 4]);
            rm.create_texture_3d_async(
                &format!("t{i}"),
                TextureLayout {
                    depth_or_layers: 2,
                    ..TextureLayout::new_2d(TextureFormat::R32Float, 2, 2)
                },
                None,
            );
        }

        assert_eq!(rm.drain_with_budget(2), 4);
        assert_eq!(rm.pending_task_count_of(ResourceKind::Buffer), 1);
        assert_eq!(rm.pending_task_count_of(ResourceKind::Texture3D), 1);
        assert_eq!(rm.drain(), 2);
    }

    #[test]
    fn test_mesh_update_after_allocation() {
        let rm = manager();
        let id = rm.allocate_mesh_async("batch", 8, 8, layout(), IndexFormat::Uint16, PrimitiveTopology::TriangleList);
        let vertices: Vec<u8> = bytemuck::cast_slice(&[1.0f32; 9]).to_vec();
        let indices: Vec<u8> = bytemuck::cast_slice(&[0u16, 1, 2]).to_vec();
        rm.update_mesh_async(id, 2, 4, vec![vertices.clone()], indices.clone()).unwrap();

        assert_eq!(rm.drain(), 2);
        let mesh = rm.get_mesh(id).upgrade().unwrap();
        assert_eq!(&mesh.vertex_bytes(0).unwrap()[24..60], vertices.as_slice());
        assert_eq!(&mesh.index_bytes()[8..14], indices.as_slice());
        assert_eq!(rm.backend().mesh_update_count(), 1);

        assert!(matches!(
            rm.update_mesh_async(ResourceId::new(99, 0), 0, 0, Vec::new(), Vec::new()),
            Err(ResourceError::NotFound { .. })
        ));
    }

    #[test]
    fn test_try_allocate_refuses_taken_name() {
        let rm = manager();
        let taken = rm.allocate_mesh_async("batch_0", 8, 8, layout(), IndexFormat::Uint32, PrimitiveTopology::TriangleList);

        assert_eq!(
            rm.try_allocate_mesh_async("batch_0", 8, 8, layout(), IndexFormat::Uint32, PrimitiveTopology::TriangleList),
            None
        );
        assert_eq!(rm.pending_task_count(), 1);

        let fresh = rm
            .try_allocate_mesh_async("batch_1", 8, 8, layout(), IndexFormat::Uint32, PrimitiveTopology::TriangleList)
            .unwrap();
        assert_ne!(fresh, taken);
        assert_eq!(rm.drain(), 2);
        assert!(rm.get_mesh_by_name("batch_1").is_ready());
    }

    #[test]
    fn test_shader_sources_get_compute_defines() {
        let assets = Arc::new(MemorySource::new());
        assets.insert("cull.comp", "#version 450\nvoid main() {}\n");
        let rm = ResourceManager::with_assets(HeadlessBackend::new(), assets);

        let view = rm.create_shader_program(
            "cull",
            &[ShaderFile::new("cull.comp", ShaderStage::Compute)],
            "#define GROUP 64",
        );
        let program = view.upgrade().unwrap();
        assert_eq!(
            program.sources[0].source,
            "#version 450\n#define GROUP 64\nvoid main() {}\n"
        );
    }

    #[test]
    fn test_unreadable_shader_fails() {
        let rm = ResourceManager::with_assets(HeadlessBackend::new(), Arc::new(MemorySource::new()));
        let id = rm.create_shader_program_async(
            "missing",
            vec![ShaderFile::new("nope.vert", ShaderStage::Vertex)],
            String::new(),
        );
        rm.drain();
        assert_eq!(rm.get_shader_program(id).state, ResourceState::Failed);
        assert_eq!(rm.backend().construction_count(ResourceKind::ShaderProgram), 0);
    }
}
