//! Supply category domain module.
//!
//! Category read models as served by the remote service, the detached edit
//! draft, and the rules a draft must satisfy before it may be persisted.
//! Pure domain logic (no IO, no HTTP, no storage).

pub mod category;

pub use category::{Category, CategoryDraft, SupplyItemRef, fields, messages};
