//! # Entity Management
//!
//! Entities are lightweight identifiers consisting of:
//! - An index that may be recycled after destruction
//! - A generation counter for detecting stale references

use std::collections::VecDeque;

use parking_lot::Mutex;

/// Unique identifier for an entity.
///
/// The ID is split into two parts:
/// - Lower 32 bits: Index, reused after the entity is destroyed
/// - Upper 32 bits: Generation counter for detecting stale references
///
/// Identity is the pair: two values with the same index but different
/// generations never compare equal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Entity(u64);

impl Entity {
    /// Creates an entity from index and generation.
    ///
    /// # Arguments
    ///
    /// * `index` - The recyclable slot index (0 to 2^32-2)
    /// * `generation` - The generation counter (0 to 2^32-1)
    #[inline]
    #[must_use]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self(((generation as u64) << 32) | (index as u64))
    }

    /// Returns the index portion of the entity.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0 as u32
    }

    /// Returns the generation portion of the entity.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        (self.0 >> 32) as u32
    }

    /// Null/invalid entity.
    pub const NULL: Self = Self(u64::MAX);

    /// Checks if this entity is null/invalid.
    #[inline]
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0 == u64::MAX
    }
}

impl Default for Entity {
    fn default() -> Self {
        Self::NULL
    }
}

/// Slot bookkeeping behind the manager's lock.
#[derive(Default)]
struct EntitySlots {
    /// Current generation per index.
    generations: Vec<u32>,
    /// Whether the index is currently handed out.
    alive: Vec<bool>,
    /// Destroyed indices waiting for reuse, oldest first.
    free_indices: VecDeque<u32>,
    /// Number of currently alive entities.
    alive_count: usize,
}

/// Allocates and recycles entity identifiers.
///
/// Destroying an entity bumps the generation of its index, so every copy of
/// the old handle becomes permanently invalid. A later `create` that reuses
/// the index hands out the bumped generation. An index whose generation has
/// reached `u32::MAX` is retired instead of recycled, so generations never wrap.
///
/// The manager knows nothing about components. It is safe to share between
/// threads; all operations take one short internal lock.
///
/// # Example
///
/// ```rust,ignore
/// let entities = EntityManager::new();
/// let e = entities.create();
/// entities.destroy(e);
/// assert!(!entities.is_alive(e));
/// ```
#[derive(Default)]
pub struct EntityManager {
    slots: Mutex<EntitySlots>,
}

/// Largest usable index. `u32::MAX` is reserved for [`Entity::NULL`].
const MAX_INDEX: u32 = u32::MAX - 1;

impl EntityManager {
    /// Creates an empty entity manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an entity manager with room for `capacity` indices before
    /// its bookkeeping vectors grow.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Mutex::new(EntitySlots {
                generations: Vec::with_capacity(capacity),
                alive: Vec::with_capacity(capacity),
                free_indices: VecDeque::new(),
                alive_count: 0,
            }),
        }
    }

    /// Returns a fresh entity.
    ///
    /// Reuses the oldest freed index (with its already-bumped generation) when
    /// one is available, otherwise allocates a new index at generation 0.
    ///
    /// # Returns
    ///
    /// The new entity, or [`Entity::NULL`] if the 32-bit index space is exhausted.
    pub fn create(&self) -> Entity {
        let mut slots = self.slots.lock();

        if let Some(index) = slots.free_indices.pop_front() {
            let idx = index as usize;
            slots.alive[idx] = true;
            slots.alive_count += 1;
            return Entity::new(index, slots.generations[idx]);
        }

        let Ok(index) = u32::try_from(slots.generations.len()) else {
            tracing::warn!("entity index space exhausted");
            return Entity::NULL;
        };
        if index > MAX_INDEX {
            tracing::warn!("entity index space exhausted");
            return Entity::NULL;
        }

        slots.generations.push(0);
        slots.alive.push(true);
        slots.alive_count += 1;
        Entity::new(index, 0)
    }

    /// Destroys an entity, freeing its index for reuse.
    ///
    /// A stale or null handle is ignored. The index is retired for good once
    /// its generation is exhausted.
    ///
    /// # Returns
    ///
    /// `true` if the entity was alive and has been destroyed.
    pub fn destroy(&self, entity: Entity) -> bool {
        if entity.is_null() {
            return false;
        }

        let mut slots = self.slots.lock();
        let idx = entity.index() as usize;

        // Generation check rejects stale copies of an already recycled index
        if idx >= slots.generations.len()
            || !slots.alive[idx]
            || slots.generations[idx] != entity.generation()
        {
            return false;
        }

        slots.alive[idx] = false;
        slots.alive_count -= 1;
        match slots.generations[idx].checked_add(1) {
            Some(next) => {
                slots.generations[idx] = next;
                slots.free_indices.push_back(entity.index());
            }
            None => {
                tracing::debug!(index = entity.index(), "entity index retired");
            }
        }
        true
    }

    /// Checks index bounds and generation match.
    #[must_use]
    pub fn is_alive(&self, entity: Entity) -> bool {
        if entity.is_null() {
            return false;
        }

        let slots = self.slots.lock();
        let idx = entity.index() as usize;
        idx < slots.generations.len()
            && slots.alive[idx]
            && slots.generations[idx] == entity.generation()
    }

    /// Returns the number of currently alive entities.
    #[must_use]
    pub fn alive_count(&self) -> usize {
        self.slots.lock().alive_count
    }

    /// Returns the number of indices ever allocated (alive or free).
    #[must_use]
    pub fn index_count(&self) -> usize {
        self.slots.lock().generations.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_entity_roundtrip() {
        let e = Entity::new(12345, 67890);
        assert_eq!(e.index(), 12345);
        assert_eq!(e.generation(), 67890);
        assert!(!e.is_null());
        assert!(Entity::default().is_null());
    }

    #[test]
    fn test_create_destroy() {
        let entities = EntityManager::new();

        let e1 = entities.create();
        let e2 = entities.create();
        assert_ne!(e1, e2);
        assert!(entities.is_alive(e1));
        assert_eq!(entities.alive_count(), 2);

        assert!(entities.destroy(e1));
        assert!(!entities.is_alive(e1));
        assert_eq!(entities.alive_count(), 1);

        // Second destroy of the same handle is a no-op
        assert!(!entities.destroy(e1));
        assert_eq!(entities.alive_count(), 1);
    }

    #[test]
    fn test_reuse_bumps_generation() {
        let entities = EntityManager::new();
        let old = entities.create();
        entities.destroy(old);

        let reused = entities.create();
        assert_eq!(reused.index(), old.index()); // Same slot
        assert_ne!(reused.generation(), old.generation()); // Different generation
        assert_ne!(reused, old);

        // The stale copy can neither pass the liveness check nor destroy the new one
        assert!(!entities.is_alive(old));
        assert!(!entities.destroy(old));
        assert!(entities.is_alive(reused));
    }

    #[test]
    fn test_alive_entities_are_unique() {
        let entities = EntityManager::new();
        let mut alive = Vec::new();

        for round in 0..50 {
            for _ in 0..20 {
                alive.push(entities.create());
            }
            // Destroy every third entity
            let mut i = 0;
            alive.retain(|e| {
                i += 1;
                if (i + round) % 3 == 0 {
                    assert!(entities.destroy(*e));
                    false
                } else {
                    true
                }
            });

            let unique: HashSet<_> = alive.iter().copied().collect();
            assert_eq!(unique.len(), alive.len());
            assert_eq!(entities.alive_count(), alive.len());
        }
    }

    #[test]
    fn test_exhausted_generation_retires_index() {
        let entities = EntityManager::new();
        let first = entities.create();
        entities.slots.lock().generations[0] = u32::MAX - 1;
        let first = Entity::new(first.index(), u32::MAX - 1);
        assert!(entities.is_alive(first));

        assert!(entities.destroy(first));
        let last = entities.create();
        assert_eq!(last, Entity::new(0, u32::MAX));

        // No generation left: the index is never handed out again
        assert!(entities.destroy(last));
        let fresh = entities.create();
        assert_eq!(fresh.index(), 1);
        assert_eq!(entities.index_count(), 2);
        for stale in [Entity::new(0, 0), first, last] {
            assert!(!entities.is_alive(stale));
            assert!(!entities.destroy(stale));
        }
        assert_eq!(entities.alive_count(), 1);
    }

    #[test]
    fn test_null_is_never_alive() {
        let entities = EntityManager::new();
        let _ = entities.create();
        assert!(!entities.is_alive(Entity::NULL));
        assert!(!entities.destroy(Entity::NULL));
        assert!(!entities.is_alive(Entity::new(99, 0)));
    }
}
