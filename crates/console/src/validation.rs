//! Validation engine: candidate draft in, field → message map out.
//!
//! Pure and synchronous. The rules themselves live next to each draft type in
//! the domain crates; this module only dispatches on the draft's kind.

use supplydesk_core::FieldErrors;

use crate::record::Draft;

/// Validate a candidate. An empty map means the candidate may be persisted.
pub fn validate(candidate: &Draft) -> FieldErrors {
    match candidate {
        Draft::Category(d) => d.validate(),
        Draft::Role(d) => d.validate(),
        Draft::User(d) => d.validate(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use supplydesk_access::{RoleDraft, UserDraft, role, user};
    use supplydesk_categories::{CategoryDraft, fields, messages};
    use supplydesk_core::{EntityKind, RoleId};

    fn category(name: &str, description: &str) -> Draft {
        Draft::Category(CategoryDraft {
            id: None,
            name: name.into(),
            description: description.into(),
        })
    }

    #[test]
    fn category_examples() {
        let errors = validate(&category("Lácteos123", "Leche"));
        assert_eq!(errors.get(fields::NAME), Some(messages::NAME_LETTERS_ONLY));

        let errors = validate(&category("Lácteos", ""));
        assert_eq!(errors.get(fields::DESCRIPTION), Some(messages::DESCRIPTION_REQUIRED));
        assert_eq!(errors.len(), 1);

        assert!(validate(&category("Lácteos", "Leche y quesos")).is_empty());
    }

    #[test]
    fn role_requires_a_name() {
        let draft = Draft::Role(RoleDraft::blank());
        assert_eq!(draft.kind(), EntityKind::Role);
        assert_eq!(
            validate(&draft).get(role::fields::NAME),
            Some(role::messages::NAME_REQUIRED)
        );
    }

    #[test]
    fn blank_user_reports_every_field() {
        let errors = validate(&Draft::User(UserDraft::blank()));
        let fields: Vec<_> = errors.fields().collect();
        assert_eq!(
            fields,
            vec![user::fields::EMAIL, user::fields::NAME, user::fields::PASSWORD, user::fields::ROLE]
        );
    }

    #[test]
    fn validation_never_mutates_the_candidate() {
        let draft = Draft::User(UserDraft {
            id: None,
            name: "  Ana  ".into(),
            email: "ana@mail.com".into(),
            password: "abc123!@".into(),
            role_id: Some(RoleId::new(1)),
        });
        let before = draft.clone();
        let _ = validate(&draft);
        assert_eq!(draft, before);
    }
}
