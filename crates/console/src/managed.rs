//! Per-kind strategy table.
//!
//! The lifecycle controller is written once, generically over [`Managed`];
//! each entity kind plugs in its draft type, validation rules, gateway and
//! user-facing messages here.

use supplydesk_access::{Role, RoleDraft, User, UserDraft, role, user};
use supplydesk_categories::{Category, CategoryDraft, messages as category_messages};
use supplydesk_core::Lifecycle;

use crate::gateway::{Backend, Gateway};
use crate::record::{Draft, Record};

/// Texts surfaced after lifecycle operations on one entity kind.
#[derive(Debug, Clone, Copy)]
pub struct OutcomeMessages {
    /// Article + noun used in prompts ("the category").
    pub noun: &'static str,
    pub created: &'static str,
    pub updated: &'static str,
    pub deleted: &'static str,
    pub save_failed: &'static str,
    pub delete_conflict: &'static str,
    pub delete_failed: &'static str,
    pub toggle_failed: &'static str,
    /// Extra error notification when the form fails validation.
    pub invalid_form: Option<&'static str>,
}

impl OutcomeMessages {
    pub fn delete_prompt(&self, name: &str) -> String {
        format!("Are you sure you want to delete {} {name}?", self.noun)
    }

    pub fn toggled(&self, now_active: bool) -> String {
        let state = if now_active { "activated" } else { "deactivated" };
        let mut noun = self.noun.to_string();
        if let Some(first) = noun.get_mut(0..1) {
            first.make_ascii_uppercase();
        }
        format!("{noun} has been {state} successfully.")
    }
}

/// An entity the console can manage end to end.
pub trait Managed: Lifecycle + Clone + core::fmt::Debug + Send + Sync + 'static {
    /// Detached edit buffer for this kind.
    type Draft: Clone + core::fmt::Debug + Send + Sync + 'static;

    fn blank_draft() -> Self::Draft;

    /// Copy this entity into a fresh edit buffer (write-only fields left empty).
    fn to_draft(&self) -> Self::Draft;

    /// `None` for a draft that has never been persisted.
    fn draft_id(draft: &Self::Draft) -> Option<Self::Id>;

    fn gateway(backend: &Backend) -> &dyn Gateway<Self>;

    fn messages() -> &'static OutcomeMessages;

    fn into_record(self) -> Record;

    /// Tag a buffer for the validation engine.
    fn tag_draft(draft: Self::Draft) -> Draft;
}

static CATEGORY_MESSAGES: OutcomeMessages = OutcomeMessages {
    noun: "the category",
    created: category_messages::CREATED,
    updated: category_messages::UPDATED,
    deleted: category_messages::DELETED,
    save_failed: category_messages::SAVE_FAILED,
    delete_conflict: category_messages::DELETE_CONFLICT,
    delete_failed: category_messages::DELETE_FAILED,
    toggle_failed: category_messages::TOGGLE_FAILED,
    invalid_form: None,
};

static ROLE_MESSAGES: OutcomeMessages = OutcomeMessages {
    noun: "the role",
    created: role::messages::CREATED,
    updated: role::messages::UPDATED,
    deleted: role::messages::DELETED,
    save_failed: role::messages::SAVE_FAILED,
    delete_conflict: role::messages::DELETE_CONFLICT,
    delete_failed: role::messages::DELETE_FAILED,
    toggle_failed: role::messages::TOGGLE_FAILED,
    invalid_form: None,
};

static USER_MESSAGES: OutcomeMessages = OutcomeMessages {
    noun: "the user",
    created: user::messages::CREATED,
    updated: user::messages::UPDATED,
    deleted: user::messages::DELETED,
    save_failed: user::messages::SAVE_FAILED,
    delete_conflict: user::messages::DELETE_CONFLICT,
    delete_failed: user::messages::DELETE_FAILED,
    toggle_failed: user::messages::TOGGLE_FAILED,
    invalid_form: Some(user::messages::INVALID_FORM),
};

impl Managed for Category {
    type Draft = CategoryDraft;

    fn blank_draft() -> CategoryDraft {
        CategoryDraft::blank()
    }

    fn to_draft(&self) -> CategoryDraft {
        CategoryDraft::from_category(self)
    }

    fn draft_id(draft: &CategoryDraft) -> Option<Self::Id> {
        draft.id
    }

    fn gateway(backend: &Backend) -> &dyn Gateway<Self> {
        &*backend.categories
    }

    fn messages() -> &'static OutcomeMessages {
        &CATEGORY_MESSAGES
    }

    fn into_record(self) -> Record {
        Record::Category(self)
    }

    fn tag_draft(draft: CategoryDraft) -> Draft {
        Draft::Category(draft)
    }
}

impl Managed for Role {
    type Draft = RoleDraft;

    fn blank_draft() -> RoleDraft {
        RoleDraft::blank()
    }

    fn to_draft(&self) -> RoleDraft {
        RoleDraft::from_role(self)
    }

    fn draft_id(draft: &RoleDraft) -> Option<Self::Id> {
        draft.id
    }

    fn gateway(backend: &Backend) -> &dyn Gateway<Self> {
        &*backend.roles
    }

    fn messages() -> &'static OutcomeMessages {
        &ROLE_MESSAGES
    }

    fn into_record(self) -> Record {
        Record::Role(self)
    }

    fn tag_draft(draft: RoleDraft) -> Draft {
        Draft::Role(draft)
    }
}

impl Managed for User {
    type Draft = UserDraft;

    fn blank_draft() -> UserDraft {
        UserDraft::blank()
    }

    fn to_draft(&self) -> UserDraft {
        UserDraft::from_user(self)
    }

    fn draft_id(draft: &UserDraft) -> Option<Self::Id> {
        draft.id
    }

    fn gateway(backend: &Backend) -> &dyn Gateway<Self> {
        &*backend.users
    }

    fn messages() -> &'static OutcomeMessages {
        &USER_MESSAGES
    }

    fn into_record(self) -> Record {
        Record::User(self)
    }

    fn tag_draft(draft: UserDraft) -> Draft {
        Draft::User(draft)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompts_name_the_entity() {
        let prompt = Category::messages().delete_prompt("Lácteos");
        assert_eq!(prompt, "Are you sure you want to delete the category Lácteos?");
    }

    #[test]
    fn toggle_messages_capitalize_the_noun() {
        assert_eq!(Role::messages().toggled(false), "The role has been deactivated successfully.");
        assert_eq!(User::messages().toggled(true), "The user has been activated successfully.");
    }
}
