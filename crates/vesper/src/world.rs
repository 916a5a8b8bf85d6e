//! # World State
//!
//! The entity manager and every component manager of a running world.

use std::sync::Arc;

use vesper_core::{
    Entity, EntityManager, MoveToComponentManager, ProximityTriggerComponentManager,
    TransformComponentManager,
};
use vesper_rendering::{GraphicsBackend, MeshComponentManager, ResourceManager};

use crate::config::RuntimeConfig;

/// Entities plus all built-in component managers.
///
/// Everything is behind shared references: systems running on the frame
/// driver read and write through the managers' own locks.
pub struct WorldState<B: GraphicsBackend> {
    entities: EntityManager,
    transforms: TransformComponentManager,
    move_to: MoveToComponentManager,
    proximity_triggers: ProximityTriggerComponentManager,
    meshes: MeshComponentManager<B>,
    resources: Arc<ResourceManager<B>>,
    bucket_count: usize,
}

impl<B: GraphicsBackend> WorldState<B> {
    /// Creates an empty world with its own resource manager.
    #[must_use]
    pub fn new(backend: B, config: &RuntimeConfig) -> Self {
        Self::with_resources(Arc::new(ResourceManager::new(backend)), config)
    }

    /// Creates an empty world sharing an existing resource manager.
    ///
    /// Each world batches its meshes into batches of its own.
    #[must_use]
    pub fn with_resources(resources: Arc<ResourceManager<B>>, config: &RuntimeConfig) -> Self {
        let page_size = config.core.storage.page_size;
        Self {
            entities: EntityManager::new(),
            transforms: TransformComponentManager::new(page_size),
            move_to: MoveToComponentManager::new(page_size),
            proximity_triggers: ProximityTriggerComponentManager::new(page_size),
            meshes: MeshComponentManager::new(
                Arc::clone(&resources),
                config.rendering.mesh_batch.clone(),
                page_size,
            ),
            resources,
            bucket_count: config.core.systems.bucket_count,
        }
    }

    /// Entity allocator.
    #[inline]
    #[must_use]
    pub fn entities(&self) -> &EntityManager {
        &self.entities
    }

    /// Positions and scales.
    #[inline]
    #[must_use]
    pub fn transforms(&self) -> &TransformComponentManager {
        &self.transforms
    }

    /// Movement targets.
    #[inline]
    #[must_use]
    pub fn move_to(&self) -> &MoveToComponentManager {
        &self.move_to
    }

    /// Proximity triggers.
    #[inline]
    #[must_use]
    pub fn proximity_triggers(&self) -> &ProximityTriggerComponentManager {
        &self.proximity_triggers
    }

    /// Batched sub-meshes.
    #[inline]
    #[must_use]
    pub fn meshes(&self) -> &MeshComponentManager<B> {
        &self.meshes
    }

    /// GPU resources.
    #[inline]
    #[must_use]
    pub fn resources(&self) -> &Arc<ResourceManager<B>> {
        &self.resources
    }

    /// Buckets used by the bucketed systems.
    #[inline]
    #[must_use]
    pub fn bucket_count(&self) -> usize {
        self.bucket_count
    }

    /// Creates an entity.
    #[must_use]
    pub fn spawn(&self) -> Entity {
        self.entities.create()
    }

    /// Removes every component of `entity` and releases it.
    ///
    /// # Returns
    ///
    /// `false` if the entity was already dead.
    pub fn despawn(&self, entity: Entity) -> bool {
        self.transforms.delete_component(entity);
        self.move_to.delete_component(entity);
        self.proximity_triggers.delete_component(entity);
        self.meshes.delete_component(entity);
        self.entities.destroy(entity)
    }

    /// Drops every component and GPU resource. Entities stay allocated.
    pub fn clear(&self) {
        self.transforms.clear();
        self.move_to.clear();
        self.proximity_triggers.clear();
        self.resources.clear_all_resources();
        self.meshes.clear();
    }
}
