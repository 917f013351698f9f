//! Data-access layer: remote gateways behind a snapshot cache.

use std::sync::{Arc, RwLock};

use supplydesk_access::{Permission, Role};

use crate::cache::{Snapshot, SnapshotCache};
use crate::error::RemoteError;
use crate::gateway::{Backend, Gateway};
use crate::managed::Managed;

/// Single entry point for reading remote collections.
///
/// Queries return immutable [`Snapshot`]s. A kind's snapshot is served from
/// the cache until a mutation invalidates it.
#[derive(Debug)]
pub struct DataStore {
    backend: Backend,
    cache: SnapshotCache,
    permissions: RwLock<Option<Arc<[Permission]>>>,
}

impl DataStore {
    pub fn new(backend: Backend) -> Self {
        Self {
            backend,
            cache: SnapshotCache::new(),
            permissions: RwLock::new(None),
        }
    }

    pub fn gateway<E: Managed>(&self) -> &dyn Gateway<E> {
        E::gateway(&self.backend)
    }

    /// Snapshot of `E`, fetched only when nothing valid is cached.
    pub async fn snapshot<E: Managed>(&self) -> Result<Snapshot<E>, RemoteError> {
        if let Some(snapshot) = self.cache.get::<E>() {
            return Ok(snapshot);
        }
        self.refresh::<E>().await
    }

    /// Fetch `E` from the remote service, bypassing the cache.
    ///
    /// The full collection replaces whatever was cached; there is no
    /// incremental merge.
    pub async fn refresh<E: Managed>(&self) -> Result<Snapshot<E>, RemoteError> {
        let generation = self.cache.generation(E::KIND);
        let items = self.gateway::<E>().list().await?;
        let snapshot = Snapshot::new(items);

        if !self.cache.store_if_current(generation, snapshot.clone()) {
            tracing::debug!(kind = %E::KIND, "discarding snapshot fetched before invalidation");
        }
        tracing::debug!(kind = %E::KIND, count = snapshot.len(), "snapshot refreshed");
        Ok(snapshot)
    }

    /// Mark the kind stale; the next [`Self::snapshot`] refetches.
    pub fn invalidate(&self, kind: supplydesk_core::EntityKind) {
        self.cache.invalidate(kind);
    }

    /// Role catalog used to resolve user role names.
    pub async fn role_catalog(&self) -> Result<Snapshot<Role>, RemoteError> {
        self.snapshot::<Role>().await
    }

    /// Permission catalog; read-only, cached for the life of the store.
    pub async fn permissions(&self) -> Result<Arc<[Permission]>, RemoteError> {
        if let Some(cached) = self.permissions.read().ok().and_then(|p| p.clone()) {
            return Ok(cached);
        }
        let fetched: Arc<[Permission]> = self.backend.permissions.list_permissions().await?.into();
        if let Ok(mut slot) = self.permissions.write() {
            *slot = Some(Arc::clone(&fetched));
        }
        Ok(fetched)
    }
}
