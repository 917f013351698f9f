use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use supplydesk_core::{CategoryId, EntityKind, FieldErrors, Lifecycle, SupplyItemId};

/// Field names used as keys in [`FieldErrors`].
pub mod fields {
    pub const NAME: &str = "name";
    pub const DESCRIPTION: &str = "description";
}

/// User-facing validation and outcome messages.
pub mod messages {
    pub const NAME_REQUIRED: &str = "Please enter the category name.";
    pub const NAME_LETTERS_ONLY: &str = "The name may only contain letters and spaces.";
    pub const DESCRIPTION_REQUIRED: &str = "Please enter the category description.";

    pub const CREATED: &str = "Category created successfully";
    pub const UPDATED: &str = "Category updated successfully";
    pub const DELETED: &str = "The category has been deleted successfully.";
    pub const SAVE_FAILED: &str = "There was a problem saving the category.";
    pub const DELETE_CONFLICT: &str = "This supply category cannot be deleted because it is associated with a purchase and/or a supply item.";
    pub const DELETE_FAILED: &str = "There was a problem deleting the category.";
    pub const TOGGLE_FAILED: &str = "There was a problem changing the category status.";
}

static NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-ZáéíóúüÁÉÍÓÚÜ\s]+$").expect("static category name pattern"));

/// Supply item attached to a category (read-only back-reference).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplyItemRef {
    pub id: SupplyItemId,
    pub name: String,
    pub current_stock: i64,
}

/// Supply category as served by the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub description: String,
    pub active: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub supply_items: Vec<SupplyItemRef>,
}

impl Category {
    /// True when at least one supply item still points at this category.
    pub fn has_supply_items(&self) -> bool {
        !self.supply_items.is_empty()
    }
}

impl Lifecycle for Category {
    type Id = CategoryId;

    const KIND: EntityKind = EntityKind::Category;

    fn id(&self) -> CategoryId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

/// Edit buffer for a category form.
///
/// Always a detached copy: editing a draft never touches the listed entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryDraft {
    /// `None` while creating; the remote service assigns the id.
    #[serde(skip)]
    pub id: Option<CategoryId>,
    pub name: String,
    pub description: String,
}

impl CategoryDraft {
    pub fn blank() -> Self {
        Self::default()
    }

    pub fn from_category(category: &Category) -> Self {
        Self {
            id: Some(category.id),
            name: category.name.clone(),
            description: category.description.clone(),
        }
    }

    /// Check the draft against the category rules.
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();

        if self.name.trim().is_empty() {
            errors.reject(fields::NAME, messages::NAME_REQUIRED);
        } else if !NAME_PATTERN.is_match(&self.name) {
            errors.reject(fields::NAME, messages::NAME_LETTERS_ONLY);
        }

        if self.description.trim().is_empty() {
            errors.reject(fields::DESCRIPTION, messages::DESCRIPTION_REQUIRED);
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(name: &str, description: &str) -> CategoryDraft {
        CategoryDraft {
            id: None,
            name: name.to_string(),
            description: description.to_string(),
        }
    }

    #[test]
    fn digits_in_name_are_rejected() {
        let errors = draft("Lácteos123", "Leche y derivados").validate();
        assert_eq!(errors.get(fields::NAME), Some(messages::NAME_LETTERS_ONLY));
        assert!(!errors.contains(fields::DESCRIPTION));
    }

    #[test]
    fn missing_description_is_rejected() {
        let errors = draft("Lácteos", "   ").validate();
        assert_eq!(errors.get(fields::DESCRIPTION), Some(messages::DESCRIPTION_REQUIRED));
        assert!(!errors.contains(fields::NAME));
    }

    #[test]
    fn blank_name_reports_required_not_pattern() {
        let errors = draft("  ", "x").validate();
        assert_eq!(errors.get(fields::NAME), Some(messages::NAME_REQUIRED));
    }

    #[test]
    fn accented_vowels_pass_but_enye_does_not() {
        assert!(draft("Lácteos y Cárnicos", "Productos frescos").validate().is_empty());
        assert!(draft("Pingüino Ñ", "x").validate().contains(fields::NAME));
    }

    #[test]
    fn draft_is_a_detached_copy() {
        let category = Category {
            id: CategoryId::new(3),
            name: "Harinas".into(),
            description: "Trigo".into(),
            active: true,
            created_at: None,
            updated_at: None,
            supply_items: vec![],
        };

        let mut d = CategoryDraft::from_category(&category);
        d.name.push_str(" integrales");

        assert_eq!(category.name, "Harinas");
        assert_eq!(d.id, Some(CategoryId::new(3)));
    }

    #[test]
    fn category_deserializes_without_optional_fields() {
        let json = r#"{"id":1,"name":"Bebidas","description":"Jugos","active":false}"#;
        let category: Category = serde_json::from_str(json).unwrap();
        assert!(!category.is_active());
        assert!(!category.has_supply_items());
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: letter/space names with a description are always valid.
            #[test]
            fn letter_names_are_valid(
                name in "[a-zA-ZáéíóúÁÉÍÓÚ][a-zA-Z áéíóú]{0,30}",
                description in "[a-z]{1,20}"
            ) {
                prop_assert!(draft(&name, &description).validate().is_empty());
            }

            /// Property: any digit in the name is reported on the name field.
            #[test]
            fn digits_always_fail(
                prefix in "[a-zA-Z]{0,10}",
                digit in "[0-9]",
                suffix in "[a-zA-Z]{0,10}"
            ) {
                let name = format!("{prefix}{digit}{suffix}");
                let errors = draft(&name, "desc").validate();
                prop_assert_eq!(errors.get(fields::NAME), Some(messages::NAME_LETTERS_ONLY));
            }
        }
    }
}
