//! In-memory stand-in for the remote persistence service.
//!
//! Behaves like the real service where the console can observe it: ids and
//! timestamps are assigned on create, passwords are accepted but never
//! listed, and deletes of still-referenced rows fail with a conflict. Every
//! call is recorded so tests can assert on what was (not) sent.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::Utc;

use supplydesk_access::{Permission, Role, RoleDraft, RoleMember, User, UserDraft};
use supplydesk_categories::{Category, CategoryDraft, SupplyItemRef};
use supplydesk_core::{CategoryId, EntityKind, PermissionId, RoleId, SupplyItemId, UserId};

use crate::error::RemoteError;
use crate::gateway::{Gateway, PermissionCatalog};

/// One request received by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteCall {
    List(EntityKind),
    ListPermissions,
    Create(EntityKind),
    Update(EntityKind, i64),
    Delete(EntityKind, i64),
    SetActive(EntityKind, i64, bool),
}

impl RemoteCall {
    /// True for calls that change remote state.
    pub fn is_write(&self) -> bool {
        !matches!(self, RemoteCall::List(_) | RemoteCall::ListPermissions)
    }
}

#[derive(Debug, Clone)]
struct StoredUser {
    user: User,
    password: String,
}

#[derive(Debug, Default)]
struct Tables {
    next_id: i64,
    categories: Vec<Category>,
    roles: Vec<Role>,
    users: Vec<StoredUser>,
    permissions: Vec<Permission>,
    /// Rows referenced by records the console does not manage (purchases...).
    referenced: HashSet<(EntityKind, i64)>,
    calls: Vec<RemoteCall>,
    fail_next: Option<RemoteError>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    /// Record `call`, then fail it if a failure was armed.
    fn enter(&mut self, call: RemoteCall) -> Result<(), RemoteError> {
        self.calls.push(call);
        match self.fail_next.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn permissions_for(&self, ids: &[PermissionId]) -> Vec<Permission> {
        ids.iter()
            .filter_map(|id| self.permissions.iter().find(|p| p.id == *id).cloned())
            .collect()
    }

    fn role_with_members(&self, role: &Role) -> Role {
        let mut role = role.clone();
        role.members = self
            .users
            .iter()
            .filter(|stored| stored.user.role_id == role.id)
            .map(|stored| RoleMember {
                id: stored.user.id,
                name: stored.user.name.clone(),
            })
            .collect();
        role
    }

    fn is_referenced(&self, kind: EntityKind, id: i64) -> bool {
        self.referenced.contains(&(kind, id))
    }
}

#[derive(Debug, Default)]
pub struct InMemoryBackend {
    tables: Mutex<Tables>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ---- seeding ----

    pub fn seed_permission(&self, name: &str) -> Permission {
        let mut tables = self.tables();
        let permission = Permission::new(PermissionId::new(tables.next_id()), name);
        tables.permissions.push(permission.clone());
        permission
    }

    pub fn seed_category(&self, name: &str, description: &str) -> Category {
        self.seed_category_with_items(name, description, &[])
    }

    /// Category with supply items pointing at it, as `(name, current_stock)`.
    pub fn seed_category_with_items(&self, name: &str, description: &str, items: &[(&str, i64)]) -> Category {
        let mut tables = self.tables();
        let id = CategoryId::new(tables.next_id());
        let supply_items = items
            .iter()
            .map(|(item, stock)| SupplyItemRef {
                id: SupplyItemId::new(tables.next_id()),
                name: item.to_string(),
                current_stock: *stock,
            })
            .collect();
        let now = Utc::now();
        let category = Category {
            id,
            name: name.to_string(),
            description: description.to_string(),
            active: true,
            created_at: Some(now),
            updated_at: Some(now),
            supply_items,
        };
        tables.categories.push(category.clone());
        category
    }

    pub fn seed_role(&self, name: &str, permissions: &[PermissionId]) -> Role {
        let mut tables = self.tables();
        let role = Role {
            id: RoleId::new(tables.next_id()),
            name: name.to_string(),
            active: true,
            permissions: tables.permissions_for(permissions),
            members: Vec::new(),
        };
        tables.roles.push(role.clone());
        role
    }

    pub fn seed_user(&self, name: &str, email: &str, password: &str, role_id: RoleId) -> User {
        let mut tables = self.tables();
        let user = User {
            id: UserId::new(tables.next_id()),
            name: name.to_string(),
            email: email.to_string(),
            role_id,
            active: true,
        };
        tables.users.push(StoredUser {
            user: user.clone(),
            password: password.to_string(),
        });
        user
    }

    /// Pretend a record outside the console (a purchase, a log...) points at this row.
    pub fn mark_referenced(&self, kind: EntityKind, id: i64) {
        self.tables().referenced.insert((kind, id));
    }

    /// Assign `user_id` to another role behind the console's back.
    pub fn reassign_user(&self, user_id: UserId, role_id: RoleId) {
        let mut tables = self.tables();
        if let Some(stored) = tables.users.iter_mut().find(|s| s.user.id == user_id) {
            stored.user.role_id = role_id;
        }
    }

    /// Fail the next call of any kind with `error`.
    pub fn fail_next(&self, error: RemoteError) {
        self.tables().fail_next = Some(error);
    }

    // ---- inspection ----

    pub fn calls(&self) -> Vec<RemoteCall> {
        self.tables().calls.clone()
    }

    pub fn write_calls(&self) -> Vec<RemoteCall> {
        self.tables().calls.iter().filter(|c| c.is_write()).cloned().collect()
    }

    pub fn count_calls(&self, predicate: impl Fn(&RemoteCall) -> bool) -> usize {
        self.tables().calls.iter().filter(|c| predicate(c)).count()
    }

    pub fn password_of(&self, id: UserId) -> Option<String> {
        self.tables()
            .users
            .iter()
            .find(|s| s.user.id == id)
            .map(|s| s.password.clone())
    }

    pub fn category(&self, id: CategoryId) -> Option<Category> {
        self.tables().categories.iter().find(|c| c.id == id).cloned()
    }

    pub fn role(&self, id: RoleId) -> Option<Role> {
        let tables = self.tables();
        tables.roles.iter().find(|r| r.id == id).map(|r| tables.role_with_members(r))
    }

    pub fn user(&self, id: UserId) -> Option<User> {
        self.tables().users.iter().find(|s| s.user.id == id).map(|s| s.user.clone())
    }
}

fn not_found() -> RemoteError {
    RemoteError::NotFound
}

#[async_trait::async_trait]
impl Gateway<Category> for InMemoryBackend {
    async fn list(&self) -> Result<Vec<Category>, RemoteError> {
        tokio::task::yield_now().await;
        let mut tables = self.tables();
        tables.enter(RemoteCall::List(EntityKind::Category))?;
        Ok(tables.categories.clone())
    }

    async fn create(&self, draft: &CategoryDraft) -> Result<(), RemoteError> {
        tokio::task::yield_now().await;
        let mut tables = self.tables();
        tables.enter(RemoteCall::Create(EntityKind::Category))?;
        let now = Utc::now();
        let category = Category {
            id: CategoryId::new(tables.next_id()),
            name: draft.name.trim().to_string(),
            description: draft.description.trim().to_string(),
            active: true,
            created_at: Some(now),
            updated_at: Some(now),
            supply_items: Vec::new(),
        };
        tables.categories.push(category);
        Ok(())
    }

    async fn update(&self, id: CategoryId, draft: &CategoryDraft) -> Result<(), RemoteError> {
        tokio::task::yield_now().await;
        let mut tables = self.tables();
        tables.enter(RemoteCall::Update(EntityKind::Category, id.get()))?;
        let category = tables.categories.iter_mut().find(|c| c.id == id).ok_or_else(not_found)?;
        category.name = draft.name.trim().to_string();
        category.description = draft.description.trim().to_string();
        category.updated_at = Some(Utc::now());
        Ok(())
    }

    async fn delete(&self, id: CategoryId) -> Result<(), RemoteError> {
        tokio::task::yield_now().await;
        let mut tables = self.tables();
        tables.enter(RemoteCall::Delete(EntityKind::Category, id.get()))?;
        let pos = tables.categories.iter().position(|c| c.id == id).ok_or_else(not_found)?;
        if tables.categories[pos].has_supply_items() || tables.is_referenced(EntityKind::Category, id.get()) {
            return Err(RemoteError::Conflict(format!("category {id} is still referenced")));
        }
        tables.categories.remove(pos);
        Ok(())
    }

    async fn set_active(&self, id: CategoryId, active: bool) -> Result<(), RemoteError> {
        tokio::task::yield_now().await;
        let mut tables = self.tables();
        tables.enter(RemoteCall::SetActive(EntityKind::Category, id.get(), active))?;
        let category = tables.categories.iter_mut().find(|c| c.id == id).ok_or_else(not_found)?;
        category.active = active;
        category.updated_at = Some(Utc::now());
        Ok(())
    }
}

#[async_trait::async_trait]
impl Gateway<Role> for InMemoryBackend {
    async fn list(&self) -> Result<Vec<Role>, RemoteError> {
        tokio::task::yield_now().await;
        let mut tables = self.tables();
        tables.enter(RemoteCall::List(EntityKind::Role))?;
        Ok(tables.roles.iter().map(|r| tables.role_with_members(r)).collect())
    }

    async fn create(&self, draft: &RoleDraft) -> Result<(), RemoteError> {
        tokio::task::yield_now().await;
        let mut tables = self.tables();
        tables.enter(RemoteCall::Create(EntityKind::Role))?;
        let role = Role {
            id: RoleId::new(tables.next_id()),
            name: draft.name.trim().to_string(),
            active: true,
            permissions: tables.permissions_for(&draft.permission_ids),
            members: Vec::new(),
        };
        tables.roles.push(role);
        Ok(())
    }

    async fn update(&self, id: RoleId, draft: &RoleDraft) -> Result<(), RemoteError> {
        tokio::task::yield_now().await;
        let mut tables = self.tables();
        tables.enter(RemoteCall::Update(EntityKind::Role, id.get()))?;
        let permissions = tables.permissions_for(&draft.permission_ids);
        let role = tables.roles.iter_mut().find(|r| r.id == id).ok_or_else(not_found)?;
        role.name = draft.name.trim().to_string();
        role.permissions = permissions;
        Ok(())
    }

    async fn delete(&self, id: RoleId) -> Result<(), RemoteError> {
        tokio::task::yield_now().await;
        let mut tables = self.tables();
        tables.enter(RemoteCall::Delete(EntityKind::Role, id.get()))?;
        let pos = tables.roles.iter().position(|r| r.id == id).ok_or_else(not_found)?;
        let in_use = tables.users.iter().any(|s| s.user.role_id == id)
            || !tables.roles[pos].permissions.is_empty()
            || tables.is_referenced(EntityKind::Role, id.get());
        if in_use {
            return Err(RemoteError::Conflict(format!("role {id} is still referenced")));
        }
        tables.roles.remove(pos);
        Ok(())
    }

    async fn set_active(&self, id: RoleId, active: bool) -> Result<(), RemoteError> {
        tokio::task::yield_now().await;
        let mut tables = self.tables();
        tables.enter(RemoteCall::SetActive(EntityKind::Role, id.get(), active))?;
        let role = tables.roles.iter_mut().find(|r| r.id == id).ok_or_else(not_found)?;
        role.active = active;
        Ok(())
    }
}

#[async_trait::async_trait]
impl Gateway<User> for InMemoryBackend {
    async fn list(&self) -> Result<Vec<User>, RemoteError> {
        tokio::task::yield_now().await;
        let mut tables = self.tables();
        tables.enter(RemoteCall::List(EntityKind::User))?;
        Ok(tables.users.iter().map(|s| s.user.clone()).collect())
    }

    async fn create(&self, draft: &UserDraft) -> Result<(), RemoteError> {
        tokio::task::yield_now().await;
        let mut tables = self.tables();
        tables.enter(RemoteCall::Create(EntityKind::User))?;
        let role_id = draft
            .role_id
            .ok_or_else(|| RemoteError::Api(400, "role is required".into()))?;
        let user = User {
            id: UserId::new(tables.next_id()),
            name: draft.name.trim().to_string(),
            email: draft.email.trim().to_string(),
            role_id,
            active: true,
        };
        tables.users.push(StoredUser {
            user,
            password: draft.password.clone(),
        });
        Ok(())
    }

    async fn update(&self, id: UserId, draft: &UserDraft) -> Result<(), RemoteError> {
        tokio::task::yield_now().await;
        let mut tables = self.tables();
        tables.enter(RemoteCall::Update(EntityKind::User, id.get()))?;
        let stored = tables.users.iter_mut().find(|s| s.user.id == id).ok_or_else(not_found)?;
        stored.user.name = draft.name.trim().to_string();
        stored.user.email = draft.email.trim().to_string();
        if let Some(role_id) = draft.role_id {
            stored.user.role_id = role_id;
        }
        if let Some(password) = draft.password_change() {
            stored.password = password.to_string();
        }
        Ok(())
    }

    async fn delete(&self, id: UserId) -> Result<(), RemoteError> {
        tokio::task::yield_now().await;
        let mut tables = self.tables();
        tables.enter(RemoteCall::Delete(EntityKind::User, id.get()))?;
        let pos = tables.users.iter().position(|s| s.user.id == id).ok_or_else(not_found)?;
        if tables.is_referenced(EntityKind::User, id.get()) {
            return Err(RemoteError::Conflict(format!("user {id} is still referenced")));
        }
        tables.users.remove(pos);
        Ok(())
    }

    async fn set_active(&self, id: UserId, active: bool) -> Result<(), RemoteError> {
        tokio::task::yield_now().await;
        let mut tables = self.tables();
        tables.enter(RemoteCall::SetActive(EntityKind::User, id.get(), active))?;
        let stored = tables.users.iter_mut().find(|s| s.user.id == id).ok_or_else(not_found)?;
        stored.user.active = active;
        Ok(())
    }
}

#[async_trait::async_trait]
impl PermissionCatalog for InMemoryBackend {
    async fn list_permissions(&self) -> Result<Vec<Permission>, RemoteError> {
        tokio::task::yield_now().await;
        let mut tables = self.tables();
        tables.enter(RemoteCall::ListPermissions)?;
        Ok(tables.permissions.clone())
    }
}
