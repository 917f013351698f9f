//! JSON shapes of the remote service.
//!
//! The service speaks Spanish field names; these types only exist at the
//! boundary and are converted into the domain read models right away.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use supplydesk_access::{Permission, Role, RoleDraft, RoleMember, User, UserDraft};
use supplydesk_categories::{Category, CategoryDraft, SupplyItemRef};
use supplydesk_core::{CategoryId, PermissionId, RoleId, SupplyItemId, UserId};

#[derive(Debug, Clone, Deserialize)]
pub struct SupplyItemWire {
    pub id_insumo: i64,
    pub nombre: String,
    #[serde(default)]
    pub stock_actual: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryWire {
    pub id_categoria: i64,
    pub nombre: String,
    #[serde(default)]
    pub descripcion: String,
    pub activo: bool,
    #[serde(default, rename = "createdAt")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, rename = "updatedAt")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub insumos: Vec<SupplyItemWire>,
}

impl From<CategoryWire> for Category {
    fn from(wire: CategoryWire) -> Self {
        Category {
            id: CategoryId::new(wire.id_categoria),
            name: wire.nombre,
            description: wire.descripcion,
            active: wire.activo,
            created_at: wire.created_at,
            updated_at: wire.updated_at,
            supply_items: wire
                .insumos
                .into_iter()
                .map(|item| SupplyItemRef {
                    id: SupplyItemId::new(item.id_insumo),
                    name: item.nombre,
                    current_stock: item.stock_actual,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PermissionWire {
    pub id_permiso: i64,
    pub nombre_permiso: String,
}

impl From<PermissionWire> for Permission {
    fn from(wire: PermissionWire) -> Self {
        Permission::new(PermissionId::new(wire.id_permiso), wire.nombre_permiso)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RoleMemberWire {
    pub id_usuario: i64,
    pub nombre: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RoleWire {
    pub id_rol: i64,
    pub nombre: String,
    pub activo: bool,
    #[serde(default, rename = "permisosRol")]
    pub permisos_rol: Option<Vec<PermissionWire>>,
    #[serde(default)]
    pub usuarios: Vec<RoleMemberWire>,
}

impl From<RoleWire> for Role {
    fn from(wire: RoleWire) -> Self {
        Role {
            id: RoleId::new(wire.id_rol),
            name: wire.nombre,
            active: wire.activo,
            permissions: wire
                .permisos_rol
                .unwrap_or_default()
                .into_iter()
                .map(Permission::from)
                .collect(),
            members: wire
                .usuarios
                .into_iter()
                .map(|m| RoleMember {
                    id: UserId::new(m.id_usuario),
                    name: m.nombre,
                })
                .collect(),
        }
    }
}

/// Users as listed. Any password hash the service might include is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct UserWire {
    pub id_usuario: i64,
    pub nombre: String,
    pub email: String,
    pub id_rol: i64,
    pub activo: bool,
}

impl From<UserWire> for User {
    fn from(wire: UserWire) -> Self {
        User {
            id: UserId::new(wire.id_usuario),
            name: wire.nombre,
            email: wire.email,
            role_id: RoleId::new(wire.id_rol),
            active: wire.activo,
        }
    }
}

// ---- request bodies ----

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CategoryBody<'a> {
    pub nombre: &'a str,
    pub descripcion: &'a str,
}

impl<'a> From<&'a CategoryDraft> for CategoryBody<'a> {
    fn from(draft: &'a CategoryDraft) -> Self {
        Self {
            nombre: draft.name.trim(),
            descripcion: draft.description.trim(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RoleBody<'a> {
    pub nombre: &'a str,
    pub permisos: Vec<i64>,
    /// Sent on create only; updates never change the status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activo: Option<bool>,
}

impl<'a> From<&'a RoleDraft> for RoleBody<'a> {
    fn from(draft: &'a RoleDraft) -> Self {
        Self {
            nombre: draft.name.trim(),
            permisos: draft.permission_ids.iter().map(|id| id.get()).collect(),
            activo: draft.is_new().then_some(true),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct UserBody<'a> {
    pub nombre: &'a str,
    pub email: &'a str,
    /// Omitted on update when no new password was entered.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<&'a str>,
    pub id_rol: Option<i64>,
}

impl<'a> From<&'a UserDraft> for UserBody<'a> {
    fn from(draft: &'a UserDraft) -> Self {
        Self {
            nombre: draft.name.trim(),
            email: draft.email.trim(),
            password: draft.password_change(),
            id_rol: draft.role_id.map(|id| id.get()),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct StatusBody {
    pub activo: bool,
}
