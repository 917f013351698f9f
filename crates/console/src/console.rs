//! The three management screens wired to one backend.

use std::sync::Arc;

use supplydesk_access::{Role, User};
use supplydesk_categories::Category;
use supplydesk_core::EntityKind;

use crate::capability::Capabilities;
use crate::config::ConsoleConfig;
use crate::gateway::Backend;
use crate::inflight::InFlight;
use crate::lifecycle::LifecycleController;
use crate::store::DataStore;

/// Categories, roles and users screens sharing one data store, one set of
/// capabilities and one in-flight registry.
#[derive(Debug)]
pub struct Console {
    store: Arc<DataStore>,
    pub categories: LifecycleController<Category>,
    pub roles: LifecycleController<Role>,
    pub users: LifecycleController<User>,
}

impl Console {
    pub fn new(backend: Backend, caps: Capabilities, config: &ConsoleConfig) -> Self {
        let store = Arc::new(DataStore::new(backend));
        let inflight = InFlight::new();

        let categories = LifecycleController::new(
            Arc::clone(&store),
            caps.clone(),
            Arc::clone(&inflight),
            config.page_size(EntityKind::Category),
        );
        let roles = LifecycleController::new(
            Arc::clone(&store),
            caps.clone(),
            Arc::clone(&inflight),
            config.page_size(EntityKind::Role),
        );
        let users = LifecycleController::new(
            Arc::clone(&store),
            caps,
            inflight,
            config.page_size(EntityKind::User),
        );
        users.hide(config.current_user_id);

        Self {
            store,
            categories,
            roles,
            users,
        }
    }

    pub fn store(&self) -> &Arc<DataStore> {
        &self.store
    }

    /// Load every screen's list.
    pub async fn load_all(&self) -> crate::ConsoleResult<()> {
        self.categories.load().await?;
        self.roles.load().await?;
        self.users.load().await?;
        tracing::info!("console lists loaded");
        Ok(())
    }
}
