//! Application-level snapshot cache keyed by entity kind.
//!
//! Each fetched collection is stored as an immutable [`Snapshot`]. Mutations
//! invalidate the slot of their kind; a fetch that was already running when
//! the invalidation happened is not allowed to repopulate the slot.

use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use supplydesk_core::{EntityKind, Lifecycle};

/// Immutable view of a collection as returned by one remote `list()` call.
#[derive(Debug)]
pub struct Snapshot<T> {
    items: Arc<[T]>,
}

impl<T> Clone for Snapshot<T> {
    fn clone(&self) -> Self {
        Self {
            items: Arc::clone(&self.items),
        }
    }
}

impl<T> Snapshot<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items: items.into(),
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn shared(&self) -> Arc<[T]> {
        Arc::clone(&self.items)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T: Lifecycle> Snapshot<T> {
    pub fn find(&self, id: T::Id) -> Option<&T> {
        self.items.iter().find(|item| item.id() == id)
    }
}

#[derive(Default)]
struct Slot {
    generation: u64,
    snapshot: Option<Box<dyn Any + Send + Sync>>,
}

/// Cache of the last snapshot per entity kind.
#[derive(Default)]
pub struct SnapshotCache {
    slots: RwLock<HashMap<EntityKind, Slot>>,
}

impl SnapshotCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached snapshot for `T`, if one is present and still valid.
    pub fn get<T>(&self) -> Option<Snapshot<T>>
    where
        T: Lifecycle + Send + Sync + 'static,
    {
        let slots = self.slots.read().ok()?;
        slots
            .get(&T::KIND)?
            .snapshot
            .as_deref()?
            .downcast_ref::<Snapshot<T>>()
            .cloned()
    }

    /// Current generation of a kind; pass it back to [`Self::store_if_current`].
    pub fn generation(&self, kind: EntityKind) -> u64 {
        self.slots
            .read()
            .ok()
            .and_then(|slots| slots.get(&kind).map(|slot| slot.generation))
            .unwrap_or(0)
    }

    /// Store a snapshot fetched under `generation`.
    ///
    /// Returns `false` (and drops the snapshot) if the kind was invalidated
    /// since the fetch started.
    pub fn store_if_current<T>(&self, generation: u64, snapshot: Snapshot<T>) -> bool
    where
        T: Lifecycle + Send + Sync + 'static,
    {
        let Ok(mut slots) = self.slots.write() else {
            return false;
        };
        let slot = slots.entry(T::KIND).or_default();
        if slot.generation != generation {
            return false;
        }
        slot.snapshot = Some(Box::new(snapshot));
        true
    }

    /// Drop the cached snapshot of `kind` and bump its generation.
    pub fn invalidate(&self, kind: EntityKind) {
        if let Ok(mut slots) = self.slots.write() {
            let slot = slots.entry(kind).or_default();
            slot.generation += 1;
            slot.snapshot = None;
        }
    }
}

impl core::fmt::Debug for SnapshotCache {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let cached: Vec<EntityKind> = self
            .slots
            .read()
            .map(|slots| {
                slots
                    .iter()
                    .filter(|(_, slot)| slot.snapshot.is_some())
                    .map(|(kind, _)| *kind)
                    .collect()
            })
            .unwrap_or_default();
        f.debug_struct("SnapshotCache").field("cached", &cached).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use supplydesk_access::{Role, User};
    use supplydesk_core::{RoleId, UserId};

    fn role(id: i64) -> Role {
        Role {
            id: RoleId::new(id),
            name: format!("role {id}"),
            active: true,
            permissions: vec![],
            members: vec![],
        }
    }

    #[test]
    fn stores_and_returns_snapshot_per_kind() {
        let cache = SnapshotCache::new();
        let generation = cache.generation(EntityKind::Role);
        assert!(cache.store_if_current(generation, Snapshot::new(vec![role(1), role(2)])));

        let roles = cache.get::<Role>().unwrap();
        assert_eq!(roles.len(), 2);
        assert!(roles.find(RoleId::new(2)).is_some());
        assert!(cache.get::<User>().is_none());
    }

    #[test]
    fn invalidation_drops_snapshot() {
        let cache = SnapshotCache::new();
        cache.store_if_current(0, Snapshot::new(vec![role(1)]));
        cache.invalidate(EntityKind::Role);
        assert!(cache.get::<Role>().is_none());
    }

    #[test]
    fn fetch_started_before_invalidation_is_discarded() {
        let cache = SnapshotCache::new();
        let generation = cache.generation(EntityKind::User);

        // A mutation lands while the list call is in flight.
        cache.invalidate(EntityKind::User);

        let stale: Snapshot<User> = Snapshot::new(vec![User {
            id: UserId::new(1),
            name: "Old".into(),
            email: "old@mail.com".into(),
            role_id: RoleId::new(1),
            active: true,
        }]);
        assert!(!cache.store_if_current(generation, stale));
        assert!(cache.get::<User>().is_none());
    }

    #[test]
    fn snapshots_share_storage() {
        let snapshot = Snapshot::new(vec![role(1)]);
        let copy = snapshot.clone();
        assert!(Arc::ptr_eq(&snapshot.shared(), &copy.shared()));
    }
}
