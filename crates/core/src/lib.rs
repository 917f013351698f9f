//! `supplydesk-core` — shared building blocks for the administrative console.
//!
//! This crate contains **pure domain** primitives (no IO, no async).

pub mod entity;
pub mod error;
pub mod id;

pub use entity::{EntityKind, Lifecycle};
pub use error::{DomainError, DomainResult, FieldErrors};
pub use id::{CategoryId, PermissionId, RoleId, SupplyItemId, UserId};
