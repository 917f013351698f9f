//! Plain-text rendering of lists and detail views.

use chrono::{DateTime, Utc};

use supplydesk_access::{Permission, Role, User};
use supplydesk_categories::Category;
use supplydesk_console::ListView;
use supplydesk_core::Lifecycle;

fn status(active: bool) -> &'static str {
    if active { "active" } else { "inactive" }
}

pub fn page_footer<T>(view: &ListView<T>) -> String {
    format!(
        "page {} of {} ({} matching)",
        view.page,
        view.page_count.max(1),
        view.filtered_total
    )
}

pub fn category_row(category: &Category) -> String {
    format!(
        "{:>5}  {:<24} {:<9} {}",
        category.id(),
        category.name,
        status(category.active),
        category.description
    )
}

pub fn role_row(role: &Role) -> String {
    format!(
        "{:>5}  {:<24} {:<9} {}",
        role.id(),
        role.name,
        status(role.active),
        role.permission_summary()
    )
}

pub fn user_row(user: &User, role_name: &str) -> String {
    format!(
        "{:>5}  {:<24} {:<30} {:<9} {}",
        user.id(),
        user.name,
        user.email,
        status(user.active),
        role_name
    )
}

pub fn permission_row(permission: &Permission) -> String {
    format!("{:>5}  {}", permission.id, permission.name)
}

pub fn category_details(category: &Category) -> Vec<String> {
    let when = |at: Option<DateTime<Utc>>| {
        at.map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "N/A".into())
    };
    let mut lines = vec![
        format!("Name:        {}", category.name),
        format!("Description: {}", category.description),
        format!("Created:     {}", when(category.created_at)),
        format!("Updated:     {}", when(category.updated_at)),
    ];
    if category.supply_items.is_empty() {
        lines.push("Supply items: none".into());
    } else {
        lines.push("Supply items:".into());
        lines.extend(
            category
                .supply_items
                .iter()
                .map(|item| format!("  - {} (Stock: {})", item.name, item.current_stock)),
        );
    }
    lines
}

pub fn role_details(role: &Role) -> Vec<String> {
    let mut lines = vec![
        format!("Name:        {}", role.name),
        format!("Permissions: {}", role.permission_summary()),
    ];
    if !role.members.is_empty() {
        let names: Vec<&str> = role.members.iter().map(|m| m.name.as_str()).collect();
        lines.push(format!("Users:       {}", names.join(", ")));
    }
    lines
}

pub fn user_details(user: &User, role_name: &str) -> Vec<String> {
    vec![
        format!("Name:  {}", user.name),
        format!("Email: {}", user.email),
        format!("Role:  {role_name}"),
    ]
}
