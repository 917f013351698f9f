//! Guarded entity lifecycle for the SupplyDesk admin console.
//!
//! Supply categories, roles and users move through the same flows here:
//! validated create/update, confirmed delete with remote conflict detection,
//! and an activation toggle gated by the referential guard. Lists are served
//! from cached snapshots and projected through search and paging.

pub mod cache;
pub mod capability;
pub mod config;
pub mod console;
pub mod error;
pub mod gateway;
pub mod guard;
pub mod in_memory;
pub mod inflight;
pub mod lifecycle;
pub mod managed;
pub mod projection;
pub mod record;
pub mod store;
pub mod validation;

pub use cache::{Snapshot, SnapshotCache};
pub use capability::{
    Capabilities, Confirm, Notification, NotificationKind, Notify, RecordingNotifier, ScriptedConfirm, TracingNotifier,
};
pub use config::{ConfigError, ConsoleConfig};
pub use console::Console;
pub use error::{ConsoleError, ConsoleResult, RemoteError};
pub use gateway::{Backend, Gateway, PermissionCatalog};
pub use guard::{GuardDecision, check_deactivation};
pub use in_memory::{InMemoryBackend, RemoteCall};
pub use inflight::{InFlight, OpTarget, Stage};
pub use lifecycle::{DeleteOutcome, EditMode, LifecycleController, Phase};
pub use managed::{Managed, OutcomeMessages};
pub use projection::{ListProjection, ListView, project};
pub use record::{Draft, Record};
pub use store::DataStore;
pub use validation::validate;
