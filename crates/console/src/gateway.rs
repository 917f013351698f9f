//! Seams to the remote persistence service.

use std::sync::Arc;

use supplydesk_access::{Permission, Role, User};
use supplydesk_categories::Category;

use crate::error::RemoteError;
use crate::managed::Managed;

/// Request/response contract of the remote service for one entity kind.
///
/// Identifiers are assigned by the service; `create` therefore returns
/// nothing and callers refetch the list afterwards.
#[async_trait::async_trait]
pub trait Gateway<E: Managed>: Send + Sync {
    async fn list(&self) -> Result<Vec<E>, RemoteError>;

    async fn create(&self, draft: &E::Draft) -> Result<(), RemoteError>;

    async fn update(&self, id: E::Id, draft: &E::Draft) -> Result<(), RemoteError>;

    /// May fail with [`RemoteError::Conflict`] when the entity is referenced elsewhere.
    async fn delete(&self, id: E::Id) -> Result<(), RemoteError>;

    async fn set_active(&self, id: E::Id, active: bool) -> Result<(), RemoteError>;
}

/// Read-only permission catalog used by the role form.
#[async_trait::async_trait]
pub trait PermissionCatalog: Send + Sync {
    async fn list_permissions(&self) -> Result<Vec<Permission>, RemoteError>;
}

/// One gateway per entity kind plus the permission catalog.
#[derive(Clone)]
pub struct Backend {
    pub categories: Arc<dyn Gateway<Category>>,
    pub roles: Arc<dyn Gateway<Role>>,
    pub users: Arc<dyn Gateway<User>>,
    pub permissions: Arc<dyn PermissionCatalog>,
}

impl Backend {
    /// Wire every seam to the same service implementation.
    pub fn shared<S>(service: Arc<S>) -> Self
    where
        S: Gateway<Category> + Gateway<Role> + Gateway<User> + PermissionCatalog + 'static,
    {
        Self {
            categories: service.clone(),
            roles: service.clone(),
            users: service.clone(),
            permissions: service,
        }
    }
}

impl core::fmt::Debug for Backend {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Backend").finish_non_exhaustive()
    }
}
