//! Tagged records: one variant per entity kind.

use supplydesk_access::{Role, RoleDraft, User, UserDraft};
use supplydesk_categories::{Category, CategoryDraft};
use supplydesk_core::{EntityKind, Lifecycle};

/// A loaded entity of any kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    Category(Category),
    Role(Role),
    User(User),
}

impl Record {
    pub fn kind(&self) -> EntityKind {
        match self {
            Record::Category(_) => EntityKind::Category,
            Record::Role(_) => EntityKind::Role,
            Record::User(_) => EntityKind::User,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Record::Category(c) => c.name(),
            Record::Role(r) => r.name(),
            Record::User(u) => u.name(),
        }
    }

    pub fn is_active(&self) -> bool {
        match self {
            Record::Category(c) => c.is_active(),
            Record::Role(r) => r.is_active(),
            Record::User(u) => u.is_active(),
        }
    }
}

/// An edit buffer of any kind; the input of the validation engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Draft {
    Category(CategoryDraft),
    Role(RoleDraft),
    User(UserDraft),
}

impl Draft {
    pub fn kind(&self) -> EntityKind {
        match self {
            Draft::Category(_) => EntityKind::Category,
            Draft::Role(_) => EntityKind::Role,
            Draft::User(_) => EntityKind::User,
        }
    }
}
