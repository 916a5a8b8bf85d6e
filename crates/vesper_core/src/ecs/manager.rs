//! # Component Managers
//!
//! A component manager maps entities to storage slots and owns the records.
//!
//! Two index-table flavors exist:
//! - [`SingleInstanceIndex`]: at most one record per entity
//! - [`MultiInstanceIndex`]: any number of records per entity, kept in insertion order
//!
//! Storage and index table sit behind one reader-writer lock. Queries take the
//! shared mode and never block each other; `add_component`/`delete_component`
//! take the exclusive mode.

use std::collections::HashMap;

use parking_lot::{
    MappedRwLockReadGuard, MappedRwLockWriteGuard, RwLock, RwLockReadGuard, RwLockWriteGuard,
};

use super::component::Component;
use super::entity::Entity;
use super::storage::ComponentStorage;
use crate::config::DEFAULT_PAGE_SIZE;
use crate::error::{EcsError, EcsResult};

/// A stored component together with its owning entity.
#[derive(Clone, Debug, PartialEq)]
pub struct ComponentRecord<T> {
    /// Entity that owns the component.
    pub entity: Entity,
    /// The component value.
    pub data: T,
}

/// Mapping from entity to storage slot(s).
///
/// Invariant: every index stored in the table refers to an occupied slot.
pub trait IndexTable: Default + Send + Sync + 'static {
    /// Whether an entity may own more than one record.
    const MULTI_INSTANCE: bool;

    /// Checks whether the entity has at least one entry.
    fn contains(&self, entity: Entity) -> bool;

    /// Records `index` for `entity`, appending for multi-instance tables.
    fn insert(&mut self, entity: Entity, index: usize);

    /// Removes every entry of `entity`, returning the released indices in insertion order.
    fn remove(&mut self, entity: Entity) -> Vec<usize>;

    /// Returns the entity's indices in insertion order (empty if none).
    fn indices(&self, entity: Entity) -> &[usize];

    /// Number of entities with at least one entry.
    fn entity_count(&self) -> usize;

    /// Removes every entry.
    fn clear(&mut self);
}

/// Index table allowing one record per entity.
#[derive(Default, Debug)]
pub struct SingleInstanceIndex {
    map: HashMap<Entity, usize>,
}

impl IndexTable for SingleInstanceIndex {
    const MULTI_INSTANCE: bool = false;

    fn contains(&self, entity: Entity) -> bool {
        self.map.contains_key(&entity)
    }

    fn insert(&mut self, entity: Entity, index: usize) {
        self.map.insert(entity, index);
    }

    fn remove(&mut self, entity: Entity) -> Vec<usize> {
        self.map.remove(&entity).into_iter().collect()
    }

    fn indices(&self, entity: Entity) -> &[usize] {
        self.map
            .get(&entity)
            .map_or(&[][..], std::slice::from_ref)
    }

    fn entity_count(&self) -> usize {
        self.map.len()
    }

    fn clear(&mut self) {
        self.map.clear();
    }
}

/// Index table allowing many records per entity, in insertion order.
#[derive(Default, Debug)]
pub struct MultiInstanceIndex {
    map: HashMap<Entity, Vec<usize>>,
}

impl IndexTable for MultiInstanceIndex {
    const MULTI_INSTANCE: bool = true;

    fn contains(&self, entity: Entity) -> bool {
        self.map.contains_key(&entity)
    }

    fn insert(&mut self, entity: Entity, index: usize) {
        self.map.entry(entity).or_default().push(index);
    }

    fn remove(&mut self, entity: Entity) -> Vec<usize> {
        self.map.remove(&entity).unwrap_or_default()
    }

    fn indices(&self, entity: Entity) -> &[usize] {
        self.map.get(&entity).map_or(&[][..], Vec::as_slice)
    }

    fn entity_count(&self) -> usize {
        self.map.len()
    }

    fn clear(&mut self) {
        self.map.clear();
    }
}

/// Storage plus index table, as seen through a manager's lock guard.
///
/// Systems take a guard once via [`ComponentManager::read`] or
/// [`ComponentManager::write`] and then work on this type directly.
pub struct ComponentData<T, I> {
    storage: ComponentStorage<ComponentRecord<T>>,
    table: I,
}

impl<T, I: IndexTable> ComponentData<T, I> {
    /// Returns the record stored at `index`.
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&ComponentRecord<T>> {
        self.storage.get(index)
    }

    /// Returns the record stored at `index` mutably.
    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut ComponentRecord<T>> {
        self.storage.get_mut(index)
    }

    /// Returns the first slot index of `entity`.
    #[inline]
    #[must_use]
    pub fn index_of(&self, entity: Entity) -> Option<usize> {
        self.table.indices(entity).first().copied()
    }

    /// Returns all slot indices of `entity` in insertion order.
    #[inline]
    #[must_use]
    pub fn indices_of(&self, entity: Entity) -> &[usize] {
        self.table.indices(entity)
    }

    /// Returns the iteration bound for index-based loops.
    #[inline]
    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.storage.slot_count()
    }

    /// Returns the number of stored components.
    #[inline]
    #[must_use]
    pub fn component_count(&self) -> usize {
        self.storage.component_count()
    }

    /// Iterates over occupied slots.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &ComponentRecord<T>)> {
        self.storage.iter()
    }

    /// Splits occupied slots into disjoint mutable buckets.
    pub fn buckets_mut(
        &mut self,
        ranges: &[std::ops::Range<usize>],
    ) -> Vec<Vec<(usize, &mut ComponentRecord<T>)>> {
        self.storage.buckets_mut(ranges)
    }
}

/// Reader-writer locked component manager.
///
/// # Type Parameters
///
/// * `T` - The component type
/// * `I` - The index table flavor ([`SingleInstanceIndex`] or [`MultiInstanceIndex`])
///
/// # Example
///
/// ```rust,ignore
/// let moves = MoveToComponentManager::default();
/// moves.add_component(entity, MoveTo::new(Vec3::new(1.0, 0.0, 0.0), 1.0))?;
/// assert!(moves.check_component(entity));
/// ```
pub struct ComponentManager<T, I> {
    data: RwLock<ComponentData<T, I>>,
}

/// Manager holding at most one component per entity.
pub type SingleInstanceManager<T> = ComponentManager<T, SingleInstanceIndex>;

/// Manager holding an ordered list of components per entity.
pub type MultiInstanceManager<T> = ComponentManager<T, MultiInstanceIndex>;

impl<T: Component, I: IndexTable> ComponentManager<T, I> {
    /// Creates an empty manager whose storage uses `page_size` records per page.
    ///
    /// # Panics
    ///
    /// Panics if `page_size` is zero.
    #[must_use]
    pub fn new(page_size: usize) -> Self {
        Self {
            data: RwLock::new(ComponentData {
                storage: ComponentStorage::new(page_size),
                table: I::default(),
            }),
        }
    }

    /// Adds a component for `entity`.
    ///
    /// Single-instance managers reject a second component for the same entity;
    /// multi-instance managers append it after the existing ones.
    ///
    /// # Returns
    ///
    /// The storage index of the new record.
    ///
    /// # Errors
    ///
    /// - [`EcsError::StaleEntity`] for a null entity
    /// - [`EcsError::ComponentAlreadyPresent`] for a duplicate on a single-instance manager
    pub fn add_component(&self, entity: Entity, component: T) -> EcsResult<usize> {
        if entity.is_null() {
            return Err(EcsError::StaleEntity(entity));
        }

        let mut data = self.data.write();

        if !I::MULTI_INSTANCE && data.table.contains(entity) {
            tracing::warn!(
                entity = ?entity,
                kind = T::KIND.name(),
                "rejected duplicate component on single-instance manager"
            );
            return Err(EcsError::ComponentAlreadyPresent {
                entity,
                manager: T::KIND.name(),
            });
        }

        let index = data.storage.insert(ComponentRecord {
            entity,
            data: component,
        });
        data.table.insert(entity, index);
        Ok(index)
    }

    /// Removes every component of `entity` and frees the slots.
    ///
    /// # Returns
    ///
    /// `true` if the entity had at least one component.
    pub fn delete_component(&self, entity: Entity) -> bool {
        let mut data = self.data.write();
        let released = data.table.remove(entity);
        for index in &released {
            data.storage.remove(*index);
        }
        !released.is_empty()
    }

    /// Checks whether `entity` has a component in this manager.
    #[must_use]
    pub fn check_component(&self, entity: Entity) -> bool {
        self.data.read().table.contains(entity)
    }

    /// Checks whether storage slot `index` currently holds a component.
    #[must_use]
    pub fn is_occupied(&self, index: usize) -> bool {
        self.data.read().storage.is_occupied(index)
    }

    /// Returns the (first) storage index of `entity`'s component.
    #[must_use]
    pub fn get_index(&self, entity: Entity) -> Option<usize> {
        self.data.read().index_of(entity)
    }

    /// Returns all storage indices of `entity`'s components in insertion order.
    #[must_use]
    pub fn get_indices(&self, entity: Entity) -> Vec<usize> {
        self.data.read().indices_of(entity).to_vec()
    }

    /// Returns the entity owning slot `index`.
    #[must_use]
    pub fn get_entity(&self, index: usize) -> Option<Entity> {
        self.data.read().get(index).map(|record| record.entity)
    }

    /// Borrows the component at `index` under the shared lock.
    ///
    /// The returned guard holds the lock; drop it before adding or deleting.
    #[must_use]
    pub fn get_component(&self, index: usize) -> Option<MappedRwLockReadGuard<'_, T>> {
        RwLockReadGuard::try_map(self.data.read(), |data| {
            data.storage.get(index).map(|record| &record.data)
        })
        .ok()
    }

    /// Borrows the component at `index` under the exclusive lock.
    #[must_use]
    pub fn get_component_mut(&self, index: usize) -> Option<MappedRwLockWriteGuard<'_, T>> {
        RwLockWriteGuard::try_map(self.data.write(), |data| {
            data.storage.get_mut(index).map(|record| &mut record.data)
        })
        .ok()
    }

    /// Runs `f` on the (first) component of `entity`.
    pub fn with_component<R>(&self, entity: Entity, f: impl FnOnce(&T) -> R) -> Option<R> {
        let data = self.data.read();
        let index = data.index_of(entity)?;
        data.get(index).map(|record| f(&record.data))
    }

    /// Runs `f` on the (first) component of `entity` under the exclusive lock.
    pub fn with_component_mut<R>(&self, entity: Entity, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        let mut data = self.data.write();
        let index = data.index_of(entity)?;
        data.get_mut(index).map(|record| f(&mut record.data))
    }

    /// Returns the number of stored components.
    #[must_use]
    pub fn component_count(&self) -> usize {
        self.data.read().component_count()
    }

    /// Returns the number of entities with at least one component.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.data.read().table.entity_count()
    }

    /// Takes the shared lock for a batch of reads.
    pub fn read(&self) -> RwLockReadGuard<'_, ComponentData<T, I>> {
        self.data.read()
    }

    /// Takes the exclusive lock for a batch of writes.
    pub fn write(&self) -> RwLockWriteGuard<'_, ComponentData<T, I>> {
        self.data.write()
    }

    /// Drops every component.
    pub fn clear(&self) {
        let mut data = self.data.write();
        data.storage.clear();
        data.table.clear();
    }
}

impl<T: Component, I: IndexTable> Default for ComponentManager<T, I> {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}
