//! Error taxonomy of the console.
//!
//! - [`RemoteError`]: what the remote persistence service (or the transport to
//!   it) reported.
//! - [`ConsoleError`]: what a lifecycle operation surfaces to its caller. Every
//!   variant is recoverable; the screen is always left in a consistent state.

use thiserror::Error;

use supplydesk_core::{EntityKind, FieldErrors};

/// Failure reported by the remote collaborator.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RemoteError {
    /// The entity is still referenced elsewhere (delete-time integrity check).
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("not found")]
    NotFound,
    #[error("API error ({0}): {1}")]
    Api(u16, String),
    #[error("network error: {0}")]
    Network(String),
    #[error("parse error: {0}")]
    Parse(String),
}

impl RemoteError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, RemoteError::Conflict(_))
    }
}

/// Outcome of a rejected lifecycle operation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConsoleError {
    /// The edit buffer failed validation; nothing was sent.
    #[error("validation failed: {0}")]
    Validation(FieldErrors),

    /// The referential guard refused a deactivation before any remote call.
    #[error("{reason}")]
    GuardVeto { reason: String, blocking: usize },

    /// The remote service refused a delete because the entity is still referenced.
    #[error("{message}")]
    Conflict { message: String },

    /// Any other remote failure; local state is unchanged.
    #[error("remote call failed: {0}")]
    Transient(#[source] RemoteError),

    /// An operation on the same target is already in flight.
    #[error("another operation on this {0} is already in progress")]
    Busy(EntityKind),

    #[error("no edit session is open")]
    NoEditSession,

    /// Inactive rows only allow re-activation.
    #[error("this {0} is inactive; only re-activation is allowed")]
    Inactive(EntityKind),
}

impl From<RemoteError> for ConsoleError {
    fn from(value: RemoteError) -> Self {
        ConsoleError::Transient(value)
    }
}

pub type ConsoleResult<T> = Result<T, ConsoleError>;
