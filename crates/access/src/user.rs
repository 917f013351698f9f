//! Console users.
//!
//! The password is write-only: [`User`] has no password field at all, and a
//! [`UserDraft`] built from a loaded user always starts with an empty one.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use supplydesk_core::{EntityKind, FieldErrors, Lifecycle, RoleId, UserId};

use crate::Role;

pub mod fields {
    pub const NAME: &str = "name";
    pub const EMAIL: &str = "email";
    pub const PASSWORD: &str = "password";
    pub const ROLE: &str = "role";
}

pub mod messages {
    pub const NAME_REQUIRED: &str = "Name is required.";
    pub const NAME_TOO_SHORT: &str = "Name must contain at least 3 letters.";
    pub const NAME_TOO_LONG: &str = "Name must not exceed 30 characters.";
    pub const NAME_INVALID_CHARS: &str = "Name must not include special characters or numbers.";

    pub const EMAIL_REQUIRED: &str = "Email is required.";
    pub const EMAIL_TOO_SHORT: &str = "Email must contain at least 5 characters.";
    pub const EMAIL_TOO_LONG: &str = "Email must not exceed 30 characters.";
    pub const EMAIL_LOCAL_PART: &str = "The local part of the email (before @) must be alphanumeric and may include ._%+-";
    pub const EMAIL_MISSING_AT: &str = "Email must contain an @ symbol.";
    pub const EMAIL_DOMAIN: &str = "The email domain (after @) must have a valid format.";

    pub const PASSWORD_REQUIRED: &str = "Password is required.";
    pub const PASSWORD_TOO_SHORT: &str = "Password must be at least 8 characters.";
    pub const PASSWORD_TOO_LONG: &str = "Password must not exceed 15 characters.";
    pub const PASSWORD_NEEDS_LETTER: &str = "Password must contain at least one letter (a-z, A-Z).";
    pub const PASSWORD_NEEDS_DIGIT: &str = "Password must contain at least one number (0-9).";
    pub const PASSWORD_NEEDS_SPECIAL: &str = "Password must contain at least one special character: !@#$%^&*()_+={}[]:;'\"<>,.?/\\|-";

    pub const ROLE_REQUIRED: &str = "A role must be selected.";
    pub const ROLE_NOT_FOUND: &str = "Role not found";

    pub const CREATED: &str = "User created successfully.";
    pub const UPDATED: &str = "User updated successfully.";
    pub const DELETED: &str = "The user has been deleted.";
    pub const SAVE_FAILED: &str = "Error saving the user. Please try again.";
    pub const DELETE_CONFLICT: &str = "This user cannot be deleted because it is referenced by other records.";
    pub const DELETE_FAILED: &str = "Error deleting the user. Please try again.";
    pub const TOGGLE_FAILED: &str = "There was a problem changing the user status.";
    pub const INVALID_FORM: &str = "Please fill in all fields correctly.";
}

/// Characters that satisfy the "special character" password rule.
pub const SPECIAL_CHARACTERS: &str = "!@#$%^&*()_+={}[]:;'\"<>,.?/\\|-";

const NAME_MIN: usize = 3;
const NAME_MAX: usize = 30;
const EMAIL_MIN: usize = 5;
const EMAIL_MAX: usize = 30;
const PASSWORD_MIN: usize = 8;
const PASSWORD_MAX: usize = 15;

static NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-ZáéíóúÁÉÍÓÚüÜñÑ\s]+$").expect("static user name pattern"));

// Only the leading character of the local part is constrained.
static LOCAL_PART_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9._%+-]+").expect("static email local part pattern"));

static DOMAIN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("static email domain pattern"));

/// User as served by the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role_id: RoleId,
    pub active: bool,
}

impl User {
    /// Display name of this user's role, resolved against the role catalog.
    pub fn role_name<'a>(&self, roles: &'a [Role]) -> &'a str {
        resolve_role_name(self.role_id, roles)
    }
}

impl Lifecycle for User {
    type Id = UserId;

    const KIND: EntityKind = EntityKind::User;

    fn id(&self) -> UserId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

/// Look up a role's display name, falling back to a "not found" label.
pub fn resolve_role_name(role_id: RoleId, roles: &[Role]) -> &str {
    roles
        .iter()
        .find(|r| r.id == role_id)
        .map(|r| r.name.as_str())
        .unwrap_or(messages::ROLE_NOT_FOUND)
}

/// Edit buffer for a user form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDraft {
    #[serde(skip)]
    pub id: Option<UserId>,
    pub name: String,
    pub email: String,
    /// Write-only. Empty on an update means "keep the current password".
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub password: String,
    pub role_id: Option<RoleId>,
}

impl UserDraft {
    pub fn blank() -> Self {
        Self::default()
    }

    pub fn from_user(user: &User) -> Self {
        Self {
            id: Some(user.id),
            name: user.name.clone(),
            email: user.email.clone(),
            password: String::new(),
            role_id: Some(user.role_id),
        }
    }

    pub fn is_new(&self) -> bool {
        self.id.is_none()
    }

    /// New password to send, if one was entered.
    pub fn password_change(&self) -> Option<&str> {
        (!self.password.is_empty()).then_some(self.password.as_str())
    }

    /// Password rules apply on create, and on update when a new password was entered.
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();

        if let Some(message) = check_name(&self.name) {
            errors.reject(fields::NAME, message);
        }
        if let Some(message) = check_email(&self.email) {
            errors.reject(fields::EMAIL, message);
        }
        if self.is_new() || self.password_change().is_some() {
            if let Some(message) = check_password(&self.password) {
                errors.reject(fields::PASSWORD, message);
            }
        }
        if self.role_id.is_none() {
            errors.reject(fields::ROLE, messages::ROLE_REQUIRED);
        }

        errors
    }
}

fn check_name(name: &str) -> Option<&'static str> {
    let len = name.chars().count();
    if name.trim().is_empty() {
        Some(messages::NAME_REQUIRED)
    } else if len < NAME_MIN {
        Some(messages::NAME_TOO_SHORT)
    } else if len > NAME_MAX {
        Some(messages::NAME_TOO_LONG)
    } else if !NAME_PATTERN.is_match(name) {
        Some(messages::NAME_INVALID_CHARS)
    } else {
        None
    }
}

fn check_email(email: &str) -> Option<&'static str> {
    let len = email.chars().count();
    let mut parts = email.split('@');
    let local = parts.next().unwrap_or_default();
    let domain = parts.next();

    if email.is_empty() {
        Some(messages::EMAIL_REQUIRED)
    } else if len < EMAIL_MIN {
        Some(messages::EMAIL_TOO_SHORT)
    } else if len > EMAIL_MAX {
        Some(messages::EMAIL_TOO_LONG)
    } else if !LOCAL_PART_PATTERN.is_match(local) {
        Some(messages::EMAIL_LOCAL_PART)
    } else if domain.is_none() {
        Some(messages::EMAIL_MISSING_AT)
    } else if !domain.is_some_and(|d| DOMAIN_PATTERN.is_match(d)) {
        Some(messages::EMAIL_DOMAIN)
    } else {
        None
    }
}

fn check_password(password: &str) -> Option<&'static str> {
    let len = password.chars().count();
    if password.is_empty() {
        Some(messages::PASSWORD_REQUIRED)
    } else if len < PASSWORD_MIN {
        Some(messages::PASSWORD_TOO_SHORT)
    } else if len > PASSWORD_MAX {
        Some(messages::PASSWORD_TOO_LONG)
    } else if !password.chars().any(|c| c.is_ascii_alphabetic()) {
        Some(messages::PASSWORD_NEEDS_LETTER)
    } else if !password.chars().any(|c| c.is_ascii_digit()) {
        Some(messages::PASSWORD_NEEDS_DIGIT)
    } else if !password.chars().any(|c| SPECIAL_CHARACTERS.contains(c)) {
        Some(messages::PASSWORD_NEEDS_SPECIAL)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_draft() -> UserDraft {
        UserDraft {
            id: None,
            name: "María José".into(),
            email: "maria.jose@mail.com".into(),
            password: "abc123!@".into(),
            role_id: Some(RoleId::new(2)),
        }
    }

    fn password_error(password: &str) -> Option<String> {
        let mut draft = valid_draft();
        draft.password = password.to_string();
        draft.validate().get(fields::PASSWORD).map(str::to_string)
    }

    fn email_error(email: &str) -> Option<String> {
        let mut draft = valid_draft();
        draft.email = email.to_string();
        draft.validate().get(fields::EMAIL).map(str::to_string)
    }

    fn name_error(name: &str) -> Option<String> {
        let mut draft = valid_draft();
        draft.name = name.to_string();
        draft.validate().get(fields::NAME).map(str::to_string)
    }

    #[test]
    fn valid_draft_passes() {
        assert!(valid_draft().validate().is_empty());
    }

    #[test]
    fn password_without_special_character_fails() {
        assert_eq!(password_error("abc12345").as_deref(), Some(messages::PASSWORD_NEEDS_SPECIAL));
        assert_eq!(password_error("abc123!@"), None);
    }

    #[test]
    fn password_rules_in_order() {
        assert_eq!(password_error("").as_deref(), Some(messages::PASSWORD_REQUIRED));
        assert_eq!(password_error("a1!").as_deref(), Some(messages::PASSWORD_TOO_SHORT));
        assert_eq!(password_error("abcdefgh1!abcdef").as_deref(), Some(messages::PASSWORD_TOO_LONG));
        assert_eq!(password_error("12345678!").as_deref(), Some(messages::PASSWORD_NEEDS_LETTER));
        assert_eq!(password_error("abcdefgh!").as_deref(), Some(messages::PASSWORD_NEEDS_DIGIT));
    }

    #[test]
    fn name_rules_in_order() {
        assert_eq!(name_error("").as_deref(), Some(messages::NAME_REQUIRED));
        assert_eq!(name_error("Al").as_deref(), Some(messages::NAME_TOO_SHORT));
        assert_eq!(name_error(&"a".repeat(31)).as_deref(), Some(messages::NAME_TOO_LONG));
        assert_eq!(name_error("Ana3").as_deref(), Some(messages::NAME_INVALID_CHARS));
        assert_eq!(name_error("Ñandú Peña"), None);
    }

    #[test]
    fn name_length_counts_characters_not_bytes() {
        // 30 accented characters are 60 bytes.
        assert_eq!(name_error(&"á".repeat(30)), None);
    }

    #[test]
    fn email_rules_in_order() {
        assert_eq!(email_error("").as_deref(), Some(messages::EMAIL_REQUIRED));
        assert_eq!(email_error("a@b").as_deref(), Some(messages::EMAIL_TOO_SHORT));
        assert_eq!(
            email_error("averyveryverylongname@example.com").as_deref(),
            Some(messages::EMAIL_TOO_LONG)
        );
        assert_eq!(email_error("@mail.com").as_deref(), Some(messages::EMAIL_LOCAL_PART));
        assert_eq!(email_error("usermail.com").as_deref(), Some(messages::EMAIL_MISSING_AT));
        assert_eq!(email_error("user@mailcom").as_deref(), Some(messages::EMAIL_DOMAIN));
        assert_eq!(email_error("user@mail.c").as_deref(), Some(messages::EMAIL_DOMAIN));
        assert_eq!(email_error("user@mail.co"), None);
    }

    #[test]
    fn missing_role_is_reported() {
        let mut draft = valid_draft();
        draft.role_id = None;
        assert_eq!(draft.validate().get(fields::ROLE), Some(messages::ROLE_REQUIRED));
    }

    #[test]
    fn loaded_user_never_carries_a_password() {
        let user = User {
            id: UserId::new(5),
            name: "Carlos".into(),
            email: "carlos@mail.com".into(),
            role_id: RoleId::new(1),
            active: true,
        };
        let draft = UserDraft::from_user(&user);
        assert!(draft.password.is_empty());
        assert!(draft.password_change().is_none());
        // Editing without a new password skips the password rules.
        assert!(draft.validate().is_empty());
    }

    #[test]
    fn update_with_new_password_checks_it() {
        let mut draft = valid_draft();
        draft.id = Some(UserId::new(5));
        draft.password = "short".into();
        assert_eq!(draft.validate().get(fields::PASSWORD), Some(messages::PASSWORD_TOO_SHORT));
    }

    #[test]
    fn serialized_draft_omits_empty_password() {
        let mut draft = valid_draft();
        draft.password.clear();
        let json = serde_json::to_value(&draft).unwrap();
        assert!(json.get("password").is_none());
    }

    #[test]
    fn role_name_falls_back_when_missing() {
        let roles = vec![Role {
            id: RoleId::new(1),
            name: "Cocinero".into(),
            active: true,
            permissions: vec![],
            members: vec![],
        }];
        assert_eq!(resolve_role_name(RoleId::new(1), &roles), "Cocinero");
        assert_eq!(resolve_role_name(RoleId::new(9), &roles), messages::ROLE_NOT_FOUND);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: a password with a letter, a digit and a special character
            /// inside the length bounds always passes.
            #[test]
            fn well_formed_passwords_pass(
                letters in "[a-zA-Z]{1,5}",
                digits in "[0-9]{1,5}",
                special in "[!@#$%^&*]{1,3}",
                padding in "[a-z]{0,2}"
            ) {
                let password = format!("{letters}{digits}{special}{padding}");
                prop_assume!(password.len() >= 8);
                prop_assert_eq!(password_error(&password), None);
            }

            /// Property: passwords without any special character never pass.
            #[test]
            fn passwords_without_special_fail(password in "[a-zA-Z0-9]{8,15}") {
                prop_assert!(password_error(&password).is_some());
            }
        }
    }
}
