//! Roles and their permission assignments.

use serde::{Deserialize, Serialize};

use supplydesk_core::{EntityKind, FieldErrors, Lifecycle, PermissionId, RoleId, UserId};

use crate::Permission;

pub mod fields {
    pub const NAME: &str = "name";
}

pub mod messages {
    pub const NAME_REQUIRED: &str = "Please enter a name for the role.";

    pub const CREATED: &str = "Role created successfully.";
    pub const UPDATED: &str = "Role updated successfully.";
    pub const DELETED: &str = "Role deleted successfully.";
    pub const SAVE_FAILED: &str = "There was a problem saving the role.";
    pub const DELETE_CONFLICT: &str = "This role cannot be deleted because it is associated with a user and/or has permissions assigned.";
    pub const DELETE_FAILED: &str = "There was a problem deleting the role.";
    pub const TOGGLE_FAILED: &str = "There was a problem changing the role status.";
}

/// Names under which the built-in administrator role is stored.
const ADMINISTRATOR_NAMES: [&str; 2] = ["administrador", "administrator"];

/// User holding a role (read-only back-reference).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleMember {
    pub id: UserId,
    pub name: String,
}

/// Role as served by the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: RoleId,
    pub name: String,
    pub active: bool,
    /// Assigned permissions, in the order the service returned them.
    #[serde(default)]
    pub permissions: Vec<Permission>,
    #[serde(default)]
    pub members: Vec<RoleMember>,
}

impl Role {
    pub fn is_administrator(&self) -> bool {
        is_administrator_name(&self.name)
    }

    /// Comma separated permission names, as shown on the details surface.
    pub fn permission_summary(&self) -> String {
        self.permissions
            .iter()
            .map(|p| p.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl Lifecycle for Role {
    type Id = RoleId;

    const KIND: EntityKind = EntityKind::Role;

    fn id(&self) -> RoleId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

fn is_administrator_name(name: &str) -> bool {
    let name = name.trim();
    ADMINISTRATOR_NAMES
        .iter()
        .any(|admin| name.eq_ignore_ascii_case(admin))
}

/// Edit buffer for a role form.
///
/// Carries no status: a role only changes state through the activation toggle,
/// and new roles are always created active.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleDraft {
    #[serde(skip)]
    pub id: Option<RoleId>,
    pub name: String,
    /// Ordered set: no duplicates, insertion order preserved.
    pub permission_ids: Vec<PermissionId>,
}

impl RoleDraft {
    /// New roles start out with no permissions.
    pub fn blank() -> Self {
        Self::default()
    }

    pub fn is_new(&self) -> bool {
        self.id.is_none()
    }

    pub fn from_role(role: &Role) -> Self {
        let mut draft = Self {
            id: Some(role.id),
            name: role.name.clone(),
            permission_ids: Vec::with_capacity(role.permissions.len()),
        };
        for permission in &role.permissions {
            if !draft.permission_ids.contains(&permission.id) {
                draft.permission_ids.push(permission.id);
            }
        }
        draft
    }

    pub fn has_permission(&self, id: PermissionId) -> bool {
        self.permission_ids.contains(&id)
    }

    /// The administrator role can never lose role management.
    pub fn is_permission_locked(&self, permission: &Permission) -> bool {
        is_administrator_name(&self.name) && permission.is_role_management()
    }

    /// Flip a permission in or out of the set.
    ///
    /// Returns `false` (and leaves the draft unchanged) for locked permissions.
    pub fn toggle_permission(&mut self, permission: &Permission) -> bool {
        if self.is_permission_locked(permission) {
            return false;
        }
        if let Some(pos) = self.permission_ids.iter().position(|id| *id == permission.id) {
            self.permission_ids.remove(pos);
        } else {
            self.permission_ids.push(permission.id);
        }
        true
    }

    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        if self.name.trim().is_empty() {
            errors.reject(fields::NAME, messages::NAME_REQUIRED);
        }
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn perm(id: i64, name: &str) -> Permission {
        Permission::new(PermissionId::new(id), name)
    }

    fn role(name: &str, permissions: Vec<Permission>) -> Role {
        Role {
            id: RoleId::new(1),
            name: name.to_string(),
            active: true,
            permissions,
            members: vec![],
        }
    }

    #[test]
    fn blank_draft_is_new_and_empty() {
        let draft = RoleDraft::blank();
        assert!(draft.is_new());
        assert!(draft.permission_ids.is_empty());
        assert_eq!(draft.validate().get(fields::NAME), Some(messages::NAME_REQUIRED));
    }

    #[test]
    fn from_role_keeps_permission_order_without_duplicates() {
        let r = role("Bodega", vec![perm(3, "compras"), perm(1, "insumos"), perm(3, "compras")]);
        let draft = RoleDraft::from_role(&r);
        assert_eq!(draft.permission_ids, vec![PermissionId::new(3), PermissionId::new(1)]);
    }

    #[test]
    fn toggle_adds_then_removes() {
        let mut draft = RoleDraft::blank();
        let compras = perm(2, "compras");

        assert!(draft.toggle_permission(&compras));
        assert!(draft.has_permission(compras.id));
        assert!(draft.toggle_permission(&compras));
        assert!(!draft.has_permission(compras.id));
    }

    #[test]
    fn administrator_cannot_drop_role_management() {
        let roles_perm = perm(9, "Roles");
        let mut draft = RoleDraft::from_role(&role("Administrador", vec![roles_perm.clone()]));

        assert!(draft.is_permission_locked(&roles_perm));
        assert!(!draft.toggle_permission(&roles_perm));
        assert!(draft.has_permission(roles_perm.id));

        let other = perm(4, "usuarios");
        assert!(draft.toggle_permission(&other));
    }

    #[test]
    fn whitespace_name_is_rejected() {
        let mut draft = RoleDraft::blank();
        draft.name = "   ".into();
        assert!(draft.validate().contains(fields::NAME));
        draft.name = "Cajero".into();
        assert!(draft.validate().is_empty());
    }

    #[test]
    fn permission_summary_joins_names() {
        let r = role("Ventas", vec![perm(1, "ventas"), perm(2, "clientes")]);
        assert_eq!(r.permission_summary(), "ventas, clientes");
    }
}
