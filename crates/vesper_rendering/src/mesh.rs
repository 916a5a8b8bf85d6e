//! # Mesh Components
//!
//! Mesh components do not own a GPU mesh each. Geometry is appended into
//! large shared batches, one per vertex layout / index format / topology
//! combination in use, and every component records the range it occupies.
//!
//! ## Placement
//!
//! - First fit over existing batches; no best fit, no compaction.
//! - A new batch is allocated only when nothing compatible has room.
//! - Uploads go through [`ResourceManager::update_mesh_async`] and land on
//!   the next drain, after the batch allocation queued before them.
//! - Deleting a component leaves its range unused until the batch is cleared.
//! - 16-bit index ranges are reserved in pairs so every index write starts and
//!   ends on a 4-byte boundary; the pad index is never drawn.
//! - Batch names are claimed fresh: an ordinal whose name is already taken in
//!   the resource manager is skipped.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use bytemuck::Pod;
use parking_lot::{Mutex, MappedRwLockReadGuard};
use vesper_core::{Component, ComponentKind, EcsError, Entity, MultiInstanceManager};

use crate::backend::{GraphicsBackend, IndexFormat, MeshDescriptor, PrimitiveTopology, VertexLayout};
use crate::config::MeshBatchConfig;
use crate::error::{BackendError, ResourceError, ResourceResult};
use crate::resource::{ResourceId, ResourceKind, ResourceManager};

/// Default prefix of batch resource names.
pub const DEFAULT_BATCH_PREFIX: &str = "mesh_batch";

/// One sub-mesh of an entity: a range inside a mesh resource.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MeshComponent {
    /// Free-form label.
    pub description: String,
    /// Mesh resource holding the geometry.
    pub mesh_resource: ResourceId,
    /// First index of the range.
    pub first_index: usize,
    /// Indices drawn.
    pub index_count: usize,
    /// Added to every index when drawing.
    pub base_vertex: usize,
    /// Vertices uploaded.
    pub vertex_count: usize,
    /// Vertices reserved at `base_vertex`.
    pub vertex_capacity: usize,
    /// Indices reserved at `first_index`, pad index included.
    pub index_capacity: usize,
}

impl Component for MeshComponent {
    const KIND: ComponentKind = ComponentKind::Mesh;
}

/// Arguments of an indexed draw with base vertex.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DrawIndexedParams {
    /// Indices to draw.
    pub index_count: usize,
    /// Offset into the index buffer, in indices.
    pub first_index: usize,
    /// Added to each index.
    pub base_vertex: usize,
}

/// CPU-side geometry of one sub-mesh. Indices are local to the sub-mesh.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MeshData {
    /// One layout per vertex buffer.
    pub vertex_layouts: Vec<VertexLayout>,
    /// Vertex bytes, one entry per layout.
    pub vertex_buffers: Vec<Vec<u8>>,
    /// Index bytes.
    pub index_buffer: Vec<u8>,
    /// Index width.
    pub index_format: IndexFormat,
    /// Primitive assembly.
    pub topology: PrimitiveTopology,
}

impl MeshData {
    /// Single interleaved vertex buffer with 32-bit triangle-list indices.
    #[must_use]
    pub fn from_pod<V: Pod>(layout: VertexLayout, vertices: &[V], indices: &[u32]) -> Self {
        Self {
            vertex_layouts: vec![layout],
            vertex_buffers: vec![bytemuck::cast_slice(vertices).to_vec()],
            index_buffer: bytemuck::cast_slice(indices).to_vec(),
            index_format: IndexFormat::Uint32,
            topology: PrimitiveTopology::TriangleList,
        }
    }

    /// Vertices in the first buffer.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        match (self.vertex_layouts.first(), self.vertex_buffers.first()) {
            (Some(layout), Some(buffer)) if layout.stride > 0 => buffer.len() / layout.stride as usize,
            _ => 0,
        }
    }

    /// Indices in the index buffer.
    #[must_use]
    pub fn index_count(&self) -> usize {
        self.index_buffer.len() / self.index_format.byte_size()
    }

    /// Checks that every buffer holds whole, equally many elements.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::InvalidDescriptor`] for empty or inconsistent data.
    pub fn validate(&self) -> Result<(), BackendError> {
        let vertex_count = self.vertex_count();
        let descriptor = MeshDescriptor::allocate(
            self.vertex_layouts.clone(),
            vertex_count,
            self.index_count(),
            self.index_format,
            self.topology,
        );
        descriptor.validate()?;
        descriptor.validate_update(0, 0, &self.vertex_buffers, &self.index_buffer)?;

        for (buffer, layout) in self.vertex_buffers.iter().zip(&self.vertex_layouts) {
            if buffer.len() != layout.stride as usize * vertex_count {
                return Err(BackendError::InvalidDescriptor(format!(
                    "vertex buffers disagree: {} bytes, expected {} vertices of stride {}",
                    buffer.len(),
                    vertex_count,
                    layout.stride
                )));
            }
        }
        Ok(())
    }
}

/// A shared mesh resource and how much of it is used.
#[derive(Debug)]
struct MeshBatch {
    resource: ResourceId,
    vertex_layouts: Vec<VertexLayout>,
    index_format: IndexFormat,
    topology: PrimitiveTopology,
    vertex_capacity: usize,
    index_capacity: usize,
    used_vertices: usize,
    used_indices: usize,
    /// False for dedicated batches created with `store_separate`.
    shared: bool,
}

impl MeshBatch {
    fn accepts(&self, data: &MeshData, vertices: usize, indices: usize) -> bool {
        self.shared
            && self.mismatch(data).is_none()
            && self.used_vertices + vertices <= self.vertex_capacity
            && self.used_indices + indices <= self.index_capacity
    }

    /// Describes why `data` cannot be written into this batch.
    fn mismatch(&self, data: &MeshData) -> Option<String> {
        if self.index_format != data.index_format {
            Some(format!(
                "index format {:?}, batch uses {:?}",
                data.index_format, self.index_format
            ))
        } else if self.topology != data.topology {
            Some(format!("topology {:?}, batch uses {:?}", data.topology, self.topology))
        } else if self.vertex_layouts != data.vertex_layouts {
            Some("vertex layouts differ from the batch".to_string())
        } else {
            None
        }
    }
}

/// Indices to reserve for `count`: 16-bit ranges are rounded up to even.
fn reserved_indices(format: IndexFormat, count: usize) -> usize {
    match format {
        IndexFormat::Uint16 => count + count % 2,
        IndexFormat::Uint32 => count,
    }
}

/// Zero-fills `bytes` up to the reserved size of `count` indices.
fn pad_indices(format: IndexFormat, mut bytes: Vec<u8>, count: usize) -> Vec<u8> {
    bytes.resize(reserved_indices(format, count) * format.byte_size(), 0);
    bytes
}

/// Multi-instance manager of [`MeshComponent`]s that packs geometry into batches.
pub struct MeshComponentManager<B: GraphicsBackend> {
    components: MultiInstanceManager<MeshComponent>,
    batches: Mutex<Vec<MeshBatch>>,
    resources: Arc<ResourceManager<B>>,
    config: MeshBatchConfig,
    batch_prefix: String,
    next_ordinal: AtomicUsize,
}

impl<B: GraphicsBackend> MeshComponentManager<B> {
    /// Creates a manager allocating batches from `resources`.
    #[must_use]
    pub fn new(resources: Arc<ResourceManager<B>>, config: MeshBatchConfig, page_size: usize) -> Self {
        Self {
            components: MultiInstanceManager::new(page_size),
            batches: Mutex::new(Vec::new()),
            resources,
            config,
            batch_prefix: DEFAULT_BATCH_PREFIX.to_string(),
            next_ordinal: AtomicUsize::new(0),
        }
    }

    /// Sets the prefix of batch resource names.
    ///
    /// Names already taken in the resource manager, by another manager or by
    /// user resources, are skipped, so sharing a prefix never shares a batch.
    #[must_use]
    pub fn with_batch_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.batch_prefix = prefix.into();
        self
    }

    /// Adds a sub-mesh to `entity` and queues its upload.
    ///
    /// # Arguments
    ///
    /// * `store_separate` - Put the data in its own exactly sized batch that
    ///   nothing else is appended to.
    ///
    /// # Returns
    ///
    /// The mesh resource holding the data. It becomes ready on the next drain.
    ///
    /// # Errors
    ///
    /// - [`ResourceError::Ecs`] for a null entity
    /// - [`ResourceError::Backend`] for empty or inconsistent mesh data
    pub fn add_component(
        &self,
        entity: Entity,
        description: impl Into<String>,
        data: MeshData,
        store_separate: bool,
    ) -> ResourceResult<ResourceId> {
        if entity.is_null() {
            return Err(EcsError::StaleEntity(entity).into());
        }
        data.validate()?;

        let vertices = data.vertex_count();
        let indices = data.index_count();
        let reserved = reserved_indices(data.index_format, indices);

        let mut batches = self.batches.lock();
        let existing = if store_separate {
            None
        } else {
            batches.iter().position(|b| b.accepts(&data, vertices, reserved))
        };
        let slot = match existing {
            Some(slot) => slot,
            None => {
                let batch = self.allocate_batch(&data, vertices, reserved, store_separate);
                batches.push(batch);
                batches.len() - 1
            }
        };

        let batch = &mut batches[slot];
        let (base_vertex, first_index) = (batch.used_vertices, batch.used_indices);
        let resource = batch.resource;
        self.resources.update_mesh_async(
            resource,
            base_vertex,
            first_index,
            data.vertex_buffers,
            pad_indices(data.index_format, data.index_buffer, indices),
        )?;
        batch.used_vertices += vertices;
        batch.used_indices += reserved;
        drop(batches);

        let description = description.into();
        tracing::debug!(
            ?entity,
            description = %description,
            batch = slot,
            base_vertex,
            first_index,
            "mesh component placed"
        );
        self.components.add_component(
            entity,
            MeshComponent {
                description,
                mesh_resource: resource,
                first_index,
                index_count: indices,
                base_vertex,
                vertex_count: vertices,
                vertex_capacity: vertices,
                index_capacity: reserved,
            },
        )?;
        Ok(resource)
    }

    /// Allocates a batch under the first `{prefix}_{n}` name nobody owns yet.
    fn allocate_batch(
        &self,
        data: &MeshData,
        vertices: usize,
        indices: usize,
        store_separate: bool,
    ) -> MeshBatch {
        let (vertex_capacity, index_capacity) = if store_separate {
            (vertices, indices)
        } else {
            (
                self.config.vertex_capacity.max(vertices),
                reserved_indices(data.index_format, self.config.index_capacity.max(indices)),
            )
        };
        let (name, resource) = loop {
            let ordinal = self.next_ordinal.fetch_add(1, Ordering::Relaxed);
            let name = format!("{}_{ordinal}", self.batch_prefix);
            if let Some(resource) = self.resources.try_allocate_mesh_async(
                &name,
                vertex_capacity,
                index_capacity,
                data.vertex_layouts.clone(),
                data.index_format,
                data.topology,
            ) {
                break (name, resource);
            }
            tracing::debug!(batch = %name, "mesh batch name taken, trying next");
        };
        tracing::info!(
            batch = %name,
            id = %resource,
            vertex_capacity,
            index_capacity,
            dedicated = store_separate,
            "mesh batch allocated"
        );

        MeshBatch {
            resource,
            vertex_layouts: data.vertex_layouts.clone(),
            index_format: data.index_format,
            topology: data.topology,
            vertex_capacity,
            index_capacity,
            used_vertices: 0,
            used_indices: 0,
            shared: !store_separate,
        }
    }

    /// Registers a sub-mesh that already lives in `mesh_resource`. Nothing is uploaded.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Ecs`] for a null entity.
    pub fn add_component_with_range(
        &self,
        entity: Entity,
        description: impl Into<String>,
        mesh_resource: ResourceId,
        first_index: usize,
        index_count: usize,
        base_vertex: usize,
    ) -> ResourceResult<usize> {
        let index = self.components.add_component(
            entity,
            MeshComponent {
                description: description.into(),
                mesh_resource,
                first_index,
                index_count,
                base_vertex,
                vertex_count: 0,
                vertex_capacity: 0,
                index_capacity: index_count,
            },
        )?;
        Ok(index)
    }

    /// Rewrites the first sub-mesh of `entity` in place.
    ///
    /// The new data must fit the range reserved when the sub-mesh was added
    /// and match the layouts, index format and topology of its batch. Nothing
    /// is queued and the draw counts stay unchanged when a check fails.
    ///
    /// # Errors
    ///
    /// - [`ResourceError::NotFound`] if `entity` has no mesh component
    /// - [`ResourceError::MeshLayout`] if the data does not match the batch, or
    ///   the range lives in a mesh this manager did not allocate
    /// - [`ResourceError::MeshCapacity`] if the data is larger than the range
    /// - [`ResourceError::Backend`] for inconsistent data
    pub fn update_component(&self, entity: Entity, data: MeshData) -> ResourceResult<()> {
        let index = self
            .components
            .get_indices(entity)
            .first()
            .copied()
            .ok_or_else(|| ResourceError::NotFound {
                kind: ResourceKind::Mesh,
                key: format!("{entity:?}"),
            })?;
        data.validate()?;

        let vertices = data.vertex_count();
        let indices = data.index_count();

        // Same lock order as `add_component`: batches, then components
        let batches = self.batches.lock();
        let mut data_guard = self.components.write();
        let record = data_guard.get_mut(index).ok_or_else(|| ResourceError::NotFound {
            kind: ResourceKind::Mesh,
            key: format!("{entity:?}"),
        })?;
        let component = &mut record.data;

        let batch = batches
            .iter()
            .find(|b| b.resource == component.mesh_resource)
            .ok_or_else(|| ResourceError::MeshLayout {
                resource: component.mesh_resource,
                reason: "not a batch of this manager".to_string(),
            })?;
        if let Some(reason) = batch.mismatch(&data) {
            return Err(ResourceError::MeshLayout {
                resource: component.mesh_resource,
                reason,
            });
        }

        if vertices > component.vertex_capacity
            || reserved_indices(data.index_format, indices) > component.index_capacity
        {
            return Err(ResourceError::MeshCapacity {
                requested_vertices: vertices,
                requested_indices: indices,
                available_vertices: component.vertex_capacity,
                available_indices: component.index_capacity,
            });
        }

        self.resources.update_mesh_async(
            component.mesh_resource,
            component.base_vertex,
            component.first_index,
            data.vertex_buffers,
            pad_indices(data.index_format, data.index_buffer, indices),
        )?;
        component.vertex_count = vertices;
        component.index_count = indices;
        Ok(())
    }

    /// Mesh resource of the `sub_index`-th sub-mesh of `entity`.
    #[must_use]
    pub fn get_mesh_resource_id(&self, entity: Entity, sub_index: usize) -> Option<ResourceId> {
        let data = self.components.read();
        let index = *data.indices_of(entity).get(sub_index)?;
        data.get(index).map(|record| record.data.mesh_resource)
    }

    /// Draw arguments of the component at storage `index`.
    #[must_use]
    pub fn get_draw_indexed_params(&self, index: usize) -> Option<DrawIndexedParams> {
        self.components.get_component(index).map(|c| DrawIndexedParams {
            index_count: c.index_count,
            first_index: c.first_index,
            base_vertex: c.base_vertex,
        })
    }

    /// Component at storage `index`.
    #[must_use]
    pub fn get_component(&self, index: usize) -> Option<MappedRwLockReadGuard<'_, MeshComponent>> {
        self.components.get_component(index)
    }

    /// Removes every sub-mesh of `entity`. Their batch ranges are not reused.
    pub fn delete_component(&self, entity: Entity) -> bool {
        self.components.delete_component(entity)
    }

    /// Batches allocated so far.
    #[must_use]
    pub fn batch_count(&self) -> usize {
        self.batches.lock().len()
    }

    /// Underlying component storage.
    #[must_use]
    pub fn components(&self) -> &MultiInstanceManager<MeshComponent> {
        &self.components
    }

    /// Resource manager the batches live in.
    #[must_use]
    pub fn resources(&self) -> &Arc<ResourceManager<B>> {
        &self.resources
    }

    /// Forgets every component and batch.
    ///
    /// Call after [`ResourceManager::clear_all_resources`]; batch ids from
    /// before the clear are stale.
    pub fn clear(&self) {
        self.components.clear();
        self.batches.lock().clear();
        self.next_ordinal.store(0, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{HeadlessBackend, VertexFormat};
    use vesper_core::EntityManager;

    fn layout() -> VertexLayout {
        VertexLayout::packed(&[VertexFormat::Float32x3], 0)
    }

    fn triangle() -> MeshData {
        MeshData::from_pod(layout(), &[[0.0f32; 3]; 3], &[0, 1, 2])
    }

    fn manager(vertex_capacity: usize, index_capacity: usize) -> MeshComponentManager<HeadlessBackend> {
        MeshComponentManager::new(
            Arc::new(ResourceManager::new(HeadlessBackend::new())),
            MeshBatchConfig {
                vertex_capacity,
                index_capacity,
            },
            16,
        )
    }

    #[test]
    fn test_meshes_share_a_batch() {
        let meshes = manager(100, 100);
        let entities = EntityManager::new();
        let a = entities.create();
        let b = entities.create();

        let ra = meshes.add_component(a, "a", triangle(), false).unwrap();
        let rb = meshes.add_component(b, "b", triangle(), false).unwrap();

        assert_eq!(ra, rb);
        assert_eq!(meshes.batch_count(), 1);
        let pb = meshes.get_draw_indexed_params(meshes.components().get_indices(b)[0]).unwrap();
        assert_eq!(pb, DrawIndexedParams { index_count: 3, first_index: 3, base_vertex: 3 });
    }

    #[test]
    fn test_full_batch_spills_into_new_one() {
        let meshes = manager(4, 100);
        let entities = EntityManager::new();
        let first = meshes.add_component(entities.create(), "a", triangle(), false).unwrap();
        let second = meshes.add_component(entities.create(), "b", triangle(), false).unwrap();

        assert_ne!(first, second);
        assert_eq!(meshes.batch_count(), 2);
        assert!(meshes.resources().get_mesh_by_name("mesh_batch_1").id.is_valid());
    }

    #[test]
    fn test_store_separate_is_exactly_sized() {
        let meshes = manager(100, 100);
        let entities = EntityManager::new();
        let shared = meshes.add_component(entities.create(), "a", triangle(), false).unwrap();
        let own = meshes.add_component(entities.create(), "b", triangle(), true).unwrap();
        let later = meshes.add_component(entities.create(), "c", triangle(), false).unwrap();

        assert_ne!(shared, own);
        assert_eq!(shared, later);

        meshes.resources().drain();
        let mesh = meshes.resources().get_mesh(own).upgrade().unwrap();
        assert_eq!(mesh.descriptor().vertex_count, 3);
        assert_eq!(mesh.descriptor().index_count, 3);
    }

    #[test]
    fn test_layout_mismatch_gets_own_batch() {
        let meshes = manager(100, 100);
        let entities = EntityManager::new();
        meshes.add_component(entities.create(), "a", triangle(), false).unwrap();

        let mut wide = MeshData::from_pod(
            VertexLayout::packed(&[VertexFormat::Float32x3, VertexFormat::Float32x2], 0),
            &[[0.0f32; 5]; 3],
            &[0, 1, 2],
        );
        meshes.add_component(entities.create(), "b", wide.clone(), false).unwrap();
        assert_eq!(meshes.batch_count(), 2);

        wide.index_format = IndexFormat::Uint16;
        wide.index_buffer = bytemuck::cast_slice(&[0u16, 1, 2]).to_vec();
        meshes.add_component(entities.create(), "c", wide, false).unwrap();
        assert_eq!(meshes.batch_count(), 3);
    }

    #[test]
    fn test_update_component_respects_range() {
        let meshes = manager(100, 100);
        let entities = EntityManager::new();
        let e = entities.create();
        meshes.add_component(e, "a", triangle(), false).unwrap();

        let smaller = MeshData::from_pod(layout(), &[[1.0f32; 3]; 2], &[0, 1]);
        meshes.update_component(e, smaller).unwrap();
        let index = meshes.components().get_index(e).unwrap();
        assert_eq!(meshes.get_draw_indexed_params(index).unwrap().index_count, 2);

        let bigger = MeshData::from_pod(layout(), &[[1.0f32; 3]; 4], &[0, 1, 2, 3]);
        assert!(matches!(
            meshes.update_component(e, bigger),
            Err(ResourceError::MeshCapacity { requested_vertices: 4, .. })
        ));
    }

    #[test]
    fn test_update_component_must_match_batch() {
        let meshes = manager(100, 100);
        let entities = EntityManager::new();
        let e = entities.create();
        meshes.add_component(e, "a", triangle(), false).unwrap();
        meshes.resources().drain();
        let updates = meshes.resources().backend().mesh_update_count();

        let mut narrow = MeshData::from_pod(layout(), &[[1.0f32; 3]; 2], &[]);
        narrow.index_format = IndexFormat::Uint16;
        narrow.index_buffer = bytemuck::cast_slice(&[2u16, 1]).to_vec();
        assert!(matches!(
            meshes.update_component(e, narrow),
            Err(ResourceError::MeshLayout { .. })
        ));

        let mut strip = triangle();
        strip.topology = PrimitiveTopology::TriangleStrip;
        assert!(matches!(
            meshes.update_component(e, strip),
            Err(ResourceError::MeshLayout { .. })
        ));

        // Rejected updates leave the range and the GPU data untouched
        let index = meshes.components().get_index(e).unwrap();
        assert_eq!(meshes.get_draw_indexed_params(index).unwrap().index_count, 3);
        assert_eq!(meshes.resources().pending_task_count(), 0);
        meshes.resources().drain();
        assert_eq!(meshes.resources().backend().mesh_update_count(), updates);
    }

    #[test]
    fn test_update_outside_own_batches_is_rejected() {
        let meshes = manager(100, 100);
        let entities = EntityManager::new();
        let e = entities.create();
        let foreign = meshes.resources().allocate_mesh_async(
            "foreign",
            8,
            8,
            vec![layout()],
            IndexFormat::Uint32,
            PrimitiveTopology::TriangleList,
        );
        meshes.add_component_with_range(e, "borrowed", foreign, 0, 3, 0).unwrap();

        assert!(matches!(
            meshes.update_component(e, triangle()),
            Err(ResourceError::MeshLayout { resource, .. }) if resource == foreign
        ));
    }

    #[test]
    fn test_sixteen_bit_update_fits_padded_range() {
        let meshes = manager(100, 100);
        let entities = EntityManager::new();
        let e = entities.create();
        let mut data = triangle();
        data.index_format = IndexFormat::Uint16;
        data.index_buffer = bytemuck::cast_slice(&[0u16, 1, 2]).to_vec();
        let batch = meshes.add_component(e, "a", data.clone(), false).unwrap();

        let index = meshes.components().get_index(e).unwrap();
        assert_eq!(meshes.get_component(index).unwrap().index_capacity, 4);

        data.index_buffer = bytemuck::cast_slice(&[2u16, 1, 0]).to_vec();
        meshes.update_component(e, data).unwrap();
        meshes.resources().drain();
        let bytes = meshes.resources().get_mesh(batch).upgrade().unwrap().index_bytes();
        let indices: &[u16] = bytemuck::cast_slice(&bytes[..8]);
        assert_eq!(indices, &[2, 1, 0, 0]);
    }

    #[test]
    fn test_rejects_bad_input() {
        let meshes = manager(100, 100);
        assert!(matches!(
            meshes.add_component(Entity::NULL, "a", triangle(), false),
            Err(ResourceError::Ecs(EcsError::StaleEntity(_)))
        ));

        let entities = EntityManager::new();
        let mut broken = triangle();
        broken.vertex_buffers[0].pop();
        assert!(matches!(
            meshes.add_component(entities.create(), "b", broken, false),
            Err(ResourceError::Backend(_))
        ));
        assert_eq!(meshes.batch_count(), 0);
        assert!(matches!(
            meshes.update_component(entities.create(), triangle()),
            Err(ResourceError::NotFound { .. })
        ));
    }

    #[test]
    fn test_sub_mesh_lookup() {
        let meshes = manager(100, 100);
        let entities = EntityManager::new();
        let e = entities.create();
        let batch = meshes.add_component(e, "body", triangle(), false).unwrap();
        meshes
            .add_component_with_range(e, "detail", batch, 0, 3, 0)
            .unwrap();

        assert_eq!(meshes.get_mesh_resource_id(e, 0), Some(batch));
        assert_eq!(meshes.get_mesh_resource_id(e, 1), Some(batch));
        assert_eq!(meshes.get_mesh_resource_id(e, 2), None);

        assert!(meshes.delete_component(e));
        assert_eq!(meshes.get_mesh_resource_id(e, 0), None);
        assert_eq!(meshes.batch_count(), 1);
    }
}
