//! Storage and lookup indices of one resource category.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use super::handle::{ResourceId, ResourceKind, ResourceState, WeakResource};
use crate::error::{ResourceError, ResourceResult};

struct Record<T> {
    id: ResourceId,
    name: String,
    state: ResourceState,
    resource: Option<Arc<T>>,
}

impl<T> Record<T> {
    fn view(&self) -> WeakResource<T> {
        WeakResource {
            id: self.id,
            resource: self.resource.as_ref().map_or_else(Default::default, Arc::downgrade),
            state: self.state,
        }
    }
}

/// Outcome of [`ResourceCategory::claim`].
pub(crate) enum Claim {
    /// The name was already taken by the record in this slot.
    Existing(usize),
    /// A pending record was inserted; the caller must complete it.
    New { id: ResourceId, slot: usize },
}

/// Records plus name and id indices, each behind its own lock.
///
/// Lock order is `by_name`, then `records`, then `by_id`. Readers never hold
/// more than one lock at a time.
pub(crate) struct ResourceCategory<T> {
    kind: ResourceKind,
    by_name: RwLock<HashMap<String, usize>>,
    by_id: RwLock<HashMap<u32, usize>>,
    records: RwLock<Vec<Record<T>>>,
}

impl<T> ResourceCategory<T> {
    pub(crate) fn new(kind: ResourceKind) -> Self {
        Self {
            kind,
            by_name: RwLock::new(HashMap::new()),
            by_id: RwLock::new(HashMap::new()),
            records: RwLock::new(Vec::new()),
        }
    }

    pub(crate) fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// Finds `name` or reserves a pending record for it.
    ///
    /// The placeholder is inserted while the name index is held exclusively,
    /// so two racing callers with the same name always end up on one record.
    pub(crate) fn claim(&self, name: &str, next_id: impl FnOnce() -> ResourceId) -> Claim {
        if let Some(&slot) = self.by_name.read().get(name) {
            return Claim::Existing(slot);
        }

        let mut by_name = self.by_name.write();
        if let Some(&slot) = by_name.get(name) {
            return Claim::Existing(slot);
        }

        let id = next_id();
        let slot = {
            let mut records = self.records.write();
            records.push(Record {
                id,
                name: name.to_string(),
                state: ResourceState::Pending,
                resource: None,
            });
            records.len() - 1
        };
        self.by_id.write().insert(id.value, slot);
        by_name.insert(name.to_string(), slot);

        tracing::debug!(kind = %self.kind, id = %id, name, "resource claimed");
        Claim::New { id, slot }
    }

    /// Stores the outcome of construction for a pending record.
    ///
    /// A record that was cleared (or replaced by another epoch) in the meantime
    /// is left untouched and the payload is dropped.
    pub(crate) fn complete(&self, id: ResourceId, slot: usize, result: ResourceResult<T>) -> ResourceState {
        let mut records = self.records.write();
        let Some(record) = records.get_mut(slot).filter(|r| r.id == id) else {
            tracing::debug!(kind = %self.kind, id = %id, "construction finished for a cleared resource");
            return ResourceState::Failed;
        };
        if record.state != ResourceState::Pending {
            tracing::warn!(kind = %self.kind, id = %id, state = ?record.state, "resource completed twice");
            return record.state;
        }

        match result {
            Ok(payload) => {
                record.resource = Some(Arc::new(payload));
                record.state = ResourceState::Ready;
                tracing::debug!(kind = %self.kind, id = %id, name = %record.name, "resource ready");
            }
            Err(error) => {
                record.state = ResourceState::Failed;
                tracing::error!(
                    kind = %self.kind,
                    id = %id,
                    name = %record.name,
                    error = %error,
                    "resource construction failed"
                );
            }
        }
        record.state
    }

    /// Slot of a live id of the current epoch.
    pub(crate) fn slot_of(&self, id: ResourceId) -> Option<usize> {
        let slot = self.by_id.read().get(&id.value).copied()?;
        let records = self.records.read();
        (records.get(slot)?.id == id).then_some(slot)
    }

    pub(crate) fn id_of_name(&self, name: &str) -> Option<ResourceId> {
        let slot = self.by_name.read().get(name).copied()?;
        self.records.read().get(slot).map(|r| r.id)
    }

    pub(crate) fn view(&self, slot: usize) -> WeakResource<T> {
        self.records
            .read()
            .get(slot)
            .map_or_else(WeakResource::missing, Record::view)
    }

    pub(crate) fn get(&self, id: ResourceId) -> WeakResource<T> {
        let Some(slot) = self.by_id.read().get(&id.value).copied() else {
            return WeakResource::missing();
        };
        match self.records.read().get(slot) {
            Some(record) if record.id == id => record.view(),
            _ => WeakResource::missing(),
        }
    }

    pub(crate) fn get_by_name(&self, name: &str) -> WeakResource<T> {
        let Some(slot) = self.by_name.read().get(name).copied() else {
            return WeakResource::missing();
        };
        self.view(slot)
    }

    /// Payload and name of a ready resource.
    ///
    /// # Errors
    ///
    /// [`ResourceError::NotFound`] for unknown or stale ids,
    /// [`ResourceError::WrongState`] if the resource is not ready.
    pub(crate) fn ready_payload(&self, id: ResourceId) -> ResourceResult<(Arc<T>, String)> {
        let slot = self.slot_of(id).ok_or_else(|| self.not_found(id))?;
        let records = self.records.read();
        let record = records.get(slot).ok_or_else(|| self.not_found(id))?;
        match (&record.resource, record.state) {
            (Some(payload), ResourceState::Ready) => Ok((Arc::clone(payload), record.name.clone())),
            (_, state) => Err(ResourceError::WrongState {
                kind: self.kind,
                key: id.to_string(),
                state,
            }),
        }
    }

    /// Swaps the payload of a ready resource, keeping its id and name.
    ///
    /// Outstanding weak views of the old payload go stale.
    pub(crate) fn replace(&self, id: ResourceId, payload: T) -> ResourceResult<WeakResource<T>> {
        let slot = self.slot_of(id).ok_or_else(|| self.not_found(id))?;
        let mut records = self.records.write();
        let record = records
            .get_mut(slot)
            .filter(|r| r.id == id)
            .ok_or_else(|| self.not_found(id))?;
        if record.state != ResourceState::Ready {
            return Err(ResourceError::WrongState {
                kind: self.kind,
                key: id.to_string(),
                state: record.state,
            });
        }
        record.resource = Some(Arc::new(payload));
        Ok(record.view())
    }

    pub(crate) fn not_found(&self, id: ResourceId) -> ResourceError {
        ResourceError::NotFound {
            kind: self.kind,
            key: id.to_string(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Drops every record and both indices.
    pub(crate) fn clear(&self) -> usize {
        let mut by_name = self.by_name.write();
        let mut records = self.records.write();
        let mut by_id = self.by_id.write();
        let released = records.len();
        by_name.clear();
        records.clear();
        by_id.clear();
        released
    }
}
