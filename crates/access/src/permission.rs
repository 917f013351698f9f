use serde::{Deserialize, Serialize};

use supplydesk_core::PermissionId;

/// Entry of the permission catalog.
///
/// The catalog is owned by the remote service; roles only reference entries
/// by id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Permission {
    pub id: PermissionId,
    pub name: String,
}

impl Permission {
    pub fn new(id: PermissionId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    /// The permission that grants access to role management itself.
    pub fn is_role_management(&self) -> bool {
        self.name.eq_ignore_ascii_case("roles")
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.name)
    }
}
