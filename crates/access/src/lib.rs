//! `supplydesk-access` — roles, the permission catalog and console users.
//!
//! This crate is intentionally decoupled from HTTP and storage: it holds the
//! read models, the detached edit drafts and their validation rules.

pub mod permission;
pub mod role;
pub mod user;

pub use permission::Permission;
pub use role::{Role, RoleDraft, RoleMember};
pub use user::{User, UserDraft, resolve_role_name};
