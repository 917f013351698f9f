//! Entity kinds and the shared lifecycle capability.

use serde::{Deserialize, Serialize};

/// The three kinds of entity managed by the console.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Category,
    Role,
    User,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Category => "category",
            EntityKind::Role => "role",
            EntityKind::User => "user",
        }
    }

    /// Rows per page on the list screen of this kind.
    pub fn default_page_size(&self) -> usize {
        match self {
            EntityKind::Category => 6,
            EntityKind::Role => 5,
            EntityKind::User => 3,
        }
    }
}

impl core::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Capability shared by every managed entity: identity, a display name and
/// exactly one authoritative active flag.
pub trait Lifecycle {
    /// Strongly-typed entity identifier.
    type Id: Copy + Eq + core::hash::Hash + core::fmt::Debug + core::fmt::Display + Send + Sync + 'static;

    const KIND: EntityKind;

    fn id(&self) -> Self::Id;

    /// Name used for search filtering and prompts.
    fn name(&self) -> &str;

    fn is_active(&self) -> bool;
}
