//! # Component Storage
//!
//! Paged, append-mostly storage for component records.
//!
//! The storage uses a page strategy:
//! - Every page is allocated with its full capacity up front and never grows
//! - New pages are appended when the last one fills up
//! - A record therefore never moves once written; only growth allocates
//! - Removed slots go to a free list and are refilled by later inserts

use std::ops::Range;

use crate::config::DEFAULT_PAGE_SIZE;

/// Paged storage for a single component record type.
///
/// This storage guarantees:
/// - Stable addresses for occupied slots across growth
/// - O(1) access by slot index
/// - Slot indices stay valid until the slot is removed
///
/// # Type Parameters
///
/// * `T` - The record type to store
///
/// # Example
///
/// ```rust,ignore
/// let mut storage: ComponentStorage<Transform> = ComponentStorage::new(1000);
/// let index = storage.insert(Transform::default());
/// assert!(storage.is_occupied(index));
/// ```
pub struct ComponentStorage<T> {
    /// Fixed-capacity pages. All pages but the last are full.
    pages: Vec<Vec<Option<T>>>,
    /// Slots per page.
    page_size: usize,
    /// Number of slots ever handed out (occupied or free).
    slot_count: usize,
    /// Number of occupied slots.
    occupied: usize,
    /// Removed slots available for reuse.
    free_slots: Vec<usize>,
}

impl<T> ComponentStorage<T> {
    /// Creates empty storage with the given page size.
    ///
    /// No page is allocated until the first insert.
    ///
    /// # Panics
    ///
    /// Panics if `page_size` is zero.
    #[must_use]
    pub fn new(page_size: usize) -> Self {
        assert!(page_size > 0, "Page size must be greater than zero");

        Self {
            pages: Vec::new(),
            page_size,
            slot_count: 0,
            occupied: 0,
            free_slots: Vec::new(),
        }
    }

    /// Creates storage with `pages` pages allocated up front.
    ///
    /// # Panics
    ///
    /// Panics if `page_size` is zero.
    #[must_use]
    pub fn with_pages(page_size: usize, pages: usize) -> Self {
        let mut storage = Self::new(page_size);
        storage.pages.reserve(pages);
        for _ in 0..pages {
            storage.pages.push(Vec::with_capacity(page_size));
        }
        storage
    }

    /// Returns the number of slots per page.
    #[inline]
    #[must_use]
    pub const fn page_size(&self) -> usize {
        self.page_size
    }

    /// Returns the number of allocated pages.
    #[inline]
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Returns the number of slots ever handed out.
    ///
    /// This is the iteration bound for index-based loops: every occupied slot
    /// has an index below it, but some indices below it may be vacant.
    #[inline]
    #[must_use]
    pub const fn slot_count(&self) -> usize {
        self.slot_count
    }

    /// Returns the number of occupied slots.
    #[inline]
    #[must_use]
    pub const fn component_count(&self) -> usize {
        self.occupied
    }

    /// Splits a slot index into `(page, index in page)`.
    ///
    /// # Returns
    ///
    /// `None` if the slot was never handed out.
    #[inline]
    #[must_use]
    pub fn page_indices(&self, index: usize) -> Option<(usize, usize)> {
        (index < self.slot_count).then(|| (index / self.page_size, index % self.page_size))
    }

    /// Stores a record and returns its slot index.
    ///
    /// Reuses a removed slot when one is available, otherwise appends,
    /// allocating a new page if the last one is full. Existing records never move.
    pub fn insert(&mut self, value: T) -> usize {
        self.occupied += 1;

        if let Some(index) = self.free_slots.pop() {
            let (page, offset) = (index / self.page_size, index % self.page_size);
            self.pages[page][offset] = Some(value);
            return index;
        }

        let index = self.slot_count;
        let page = index / self.page_size;
        if page == self.pages.len() {
            self.pages.push(Vec::with_capacity(self.page_size));
        }
        // Never exceeds the reserved capacity, so the page buffer is not reallocated
        self.pages[page].push(Some(value));
        self.slot_count += 1;
        index
    }

    /// Removes the record at `index`.
    ///
    /// # Returns
    ///
    /// The removed record, or `None` if the slot was vacant or out of range.
    pub fn remove(&mut self, index: usize) -> Option<T> {
        let (page, offset) = self.page_indices(index)?;
        let value = self.pages[page][offset].take()?;
        self.occupied -= 1;
        self.free_slots.push(index);
        Some(value)
    }

    /// Checks whether `index` holds a record.
    #[inline]
    #[must_use]
    pub fn is_occupied(&self, index: usize) -> bool {
        self.get(index).is_some()
    }

    /// Gets a record by slot index.
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        let (page, offset) = self.page_indices(index)?;
        self.pages[page][offset].as_ref()
    }

    /// Gets a mutable record by slot index.
    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        let (page, offset) = self.page_indices(index)?;
        self.pages[page][offset].as_mut()
    }

    /// Iterates over all occupied slots with their indices.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &T)> {
        self.pages
            .iter()
            .flatten()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|v| (index, v)))
    }

    /// Iterates mutably over all occupied slots with their indices.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (usize, &mut T)> {
        self.pages
            .iter_mut()
            .flatten()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_mut().map(|v| (index, v)))
    }

    /// Splits the occupied slots into disjoint mutable buckets.
    ///
    /// `ranges` must be sorted and non-overlapping (as produced by
    /// [`bucket_ranges`](crate::sched::bucket_ranges)). Bucket `i` receives the
    /// occupied slots whose index lies in `ranges[i]`.
    pub fn buckets_mut(&mut self, ranges: &[Range<usize>]) -> Vec<Vec<(usize, &mut T)>> {
        let mut buckets: Vec<Vec<(usize, &mut T)>> = ranges.iter().map(|_| Vec::new()).collect();
        let mut bucket = 0;

        for (index, slot) in self.pages.iter_mut().flatten().enumerate() {
            while bucket < ranges.len() && index >= ranges[bucket].end {
                bucket += 1;
            }
            if bucket == ranges.len() {
                break;
            }
            if index < ranges[bucket].start {
                continue;
            }
            if let Some(value) = slot.as_mut() {
                buckets[bucket].push((index, value));
            }
        }

        buckets
    }

    /// Drops every record and releases all pages.
    pub fn clear(&mut self) {
        self.pages.clear();
        self.free_slots.clear();
        self.slot_count = 0;
        self.occupied = 0;
    }
}

impl<T> Default for ComponentStorage<T> {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_insert_get() {
        let mut storage: ComponentStorage<u32> = ComponentStorage::new(4);

        let a = storage.insert(10);
        let b = storage.insert(20);
        assert_eq!(storage.get(a), Some(&10));
        assert_eq!(storage.get(b), Some(&20));
        assert_eq!(storage.component_count(), 2);
        assert_eq!(storage.page_count(), 1);
    }

    #[test]
    fn test_storage_grows_by_pages() {
        let mut storage: ComponentStorage<u32> = ComponentStorage::new(4);
        for i in 0..10 {
            storage.insert(i);
        }
        assert_eq!(storage.page_count(), 3);
        assert_eq!(storage.page_indices(9), Some((2, 1)));
        assert_eq!(storage.page_indices(10), None);
    }

    #[test]
    fn test_records_do_not_move_on_growth() {
        let mut storage: ComponentStorage<[u64; 4]> = ComponentStorage::new(8);
        let first = storage.insert([1; 4]);
        let before = storage.get(first).unwrap() as *const [u64; 4] as usize;

        for i in 0..1000 {
            storage.insert([i; 4]);
        }

        let after = storage.get(first).unwrap() as *const [u64; 4] as usize;
        assert_eq!(before, after);
        assert_eq!(storage.get(first), Some(&[1; 4]));
    }

    #[test]
    fn test_remove_frees_slot_for_reuse() {
        let mut storage: ComponentStorage<u32> = ComponentStorage::new(4);
        let a = storage.insert(1);
        let _b = storage.insert(2);

        assert_eq!(storage.remove(a), Some(1));
        assert!(!storage.is_occupied(a));
        assert_eq!(storage.remove(a), None);
        assert_eq!(storage.component_count(), 1);

        let c = storage.insert(3);
        assert_eq!(c, a); // Same slot reused
        assert_eq!(storage.slot_count(), 2);
    }

    #[test]
    fn test_buckets_mut_are_disjoint() {
        let mut storage: ComponentStorage<u32> = ComponentStorage::new(3);
        for i in 0..10 {
            storage.insert(i);
        }
        storage.remove(4);

        let ranges = [0..3, 3..6, 6..10];
        let buckets = storage.buckets_mut(&ranges);
        assert_eq!(buckets.len(), 3);
        assert_eq!(buckets[0].len(), 3);
        assert_eq!(buckets[1].len(), 2); // slot 4 is vacant
        assert_eq!(buckets[2].len(), 4);

        for bucket in buckets {
            for (_, value) in bucket {
                *value += 100;
            }
        }
        assert_eq!(storage.get(9), Some(&109));
    }
}
