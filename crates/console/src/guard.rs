//! Referential guard: decides whether a deactivation or delete may proceed.
//!
//! Two tiers:
//! - deactivating a role is pre-checked against a fresh user list;
//! - deletes are attempted and a remote conflict is turned into a veto
//!   carrying the kind's domain message.

use supplydesk_access::User;
use supplydesk_core::{EntityKind, Lifecycle};

use crate::error::{ConsoleError, RemoteError};
use crate::managed::Managed;
use crate::record::Record;
use crate::store::DataStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allowed,
    Vetoed { reason: String, blocking: usize },
}

impl GuardDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, GuardDecision::Allowed)
    }

    pub fn into_error(self) -> Option<ConsoleError> {
        match self {
            GuardDecision::Allowed => None,
            GuardDecision::Vetoed { reason, blocking } => Some(ConsoleError::GuardVeto { reason, blocking }),
        }
    }
}

pub fn role_in_use_message(blocking: usize) -> String {
    format!("There are {blocking} user(s) with this role assigned.")
}

/// May `target` go from active to inactive?
///
/// Only roles are checked. Users are always refetched so that an assignment
/// made since the last list load is still seen. Re-activation never reaches
/// this function.
pub async fn check_deactivation(store: &DataStore, target: &Record) -> Result<GuardDecision, RemoteError> {
    let Record::Role(role) = target else {
        return Ok(GuardDecision::Allowed);
    };

    let users = store.refresh::<User>().await?;
    let blocking = users.items().iter().filter(|user| user.role_id == role.id()).count();

    if blocking == 0 {
        return Ok(GuardDecision::Allowed);
    }

    tracing::warn!(role = %role.id(), blocking, "role deactivation vetoed");
    Ok(GuardDecision::Vetoed {
        reason: role_in_use_message(blocking),
        blocking,
    })
}

/// Interpret a failed remote delete of an `E`.
pub fn delete_failure<E: Managed>(error: RemoteError) -> ConsoleError {
    match error {
        RemoteError::Conflict(detail) => {
            tracing::warn!(kind = %E::KIND, %detail, "delete refused: entity still referenced");
            ConsoleError::Conflict {
                message: delete_conflict_message(E::KIND).to_string(),
            }
        }
        other => ConsoleError::Transient(other),
    }
}

pub fn delete_conflict_message(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Category => supplydesk_categories::messages::DELETE_CONFLICT,
        EntityKind::Role => supplydesk_access::role::messages::DELETE_CONFLICT,
        EntityKind::User => supplydesk_access::user::messages::DELETE_CONFLICT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use supplydesk_access::Role;
    use supplydesk_categories::Category;

    #[test]
    fn conflict_becomes_domain_message() {
        let err = delete_failure::<Category>(RemoteError::Conflict("FK violation".into()));
        assert_eq!(
            err,
            ConsoleError::Conflict {
                message: "This supply category cannot be deleted because it is associated with a purchase and/or a supply item."
                    .into()
            }
        );
    }

    #[test]
    fn other_failures_stay_transient() {
        let err = delete_failure::<Role>(RemoteError::Network("connection reset".into()));
        assert!(matches!(err, ConsoleError::Transient(RemoteError::Network(_))));
    }

    #[test]
    fn veto_reason_names_the_count() {
        let decision = GuardDecision::Vetoed {
            reason: role_in_use_message(2),
            blocking: 2,
        };
        assert!(!decision.is_allowed());
        assert_eq!(
            decision.into_error(),
            Some(ConsoleError::GuardVeto {
                reason: "There are 2 user(s) with this role assigned.".into(),
                blocking: 2,
            })
        );
    }
}
