//! Registry of running operations, used to refuse double submits.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use supplydesk_core::EntityKind;

/// What an operation is acting on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OpTarget {
    /// The "create" form of a screen (there is no id yet).
    Create(EntityKind),
    /// One existing entity, keyed by its id.
    Entity(EntityKind, String),
}

impl OpTarget {
    pub fn entity(kind: EntityKind, id: impl core::fmt::Display) -> Self {
        OpTarget::Entity(kind, id.to_string())
    }
}

/// Where a running operation currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    AwaitingConfirmation,
    /// Guard check running before a toggle.
    ToggleRequested,
    /// Remote call running.
    Persisting,
}

#[derive(Debug, Default)]
pub struct InFlight {
    ops: Mutex<HashMap<OpTarget, Stage>>,
}

impl InFlight {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn ops(&self) -> MutexGuard<'_, HashMap<OpTarget, Stage>> {
        // The map stays consistent even if a holder panicked.
        self.ops.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Claim `target`; `None` when an operation on it is already running.
    pub fn try_begin(self: &Arc<Self>, target: OpTarget, stage: Stage) -> Option<InFlightGuard> {
        let mut ops = self.ops();
        if ops.contains_key(&target) {
            return None;
        }
        ops.insert(target.clone(), stage);
        Some(InFlightGuard {
            registry: Arc::clone(self),
            target,
        })
    }

    pub fn stage(&self, target: &OpTarget) -> Option<Stage> {
        self.ops().get(target).copied()
    }

    pub fn is_running(&self, target: &OpTarget) -> bool {
        self.ops().contains_key(target)
    }

    pub fn len(&self) -> usize {
        self.ops().len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops().is_empty()
    }
}

/// Releases its target when dropped, whatever path the operation took.
#[derive(Debug)]
pub struct InFlightGuard {
    registry: Arc<InFlight>,
    target: OpTarget,
}

impl InFlightGuard {
    pub fn advance(&self, stage: Stage) {
        self.registry.ops().insert(self.target.clone(), stage);
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.registry.ops().remove(&self.target);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_claim_on_same_target_is_refused() {
        let registry = InFlight::new();
        let target = OpTarget::entity(EntityKind::Role, 4);

        let guard = registry.try_begin(target.clone(), Stage::ToggleRequested).unwrap();
        assert!(registry.try_begin(target.clone(), Stage::Persisting).is_none());

        guard.advance(Stage::Persisting);
        assert_eq!(registry.stage(&target), Some(Stage::Persisting));

        drop(guard);
        assert!(!registry.is_running(&target));
        assert!(registry.try_begin(target, Stage::Persisting).is_some());
    }

    #[test]
    fn different_targets_run_side_by_side() {
        let registry = InFlight::new();
        let _a = registry.try_begin(OpTarget::Create(EntityKind::User), Stage::Persisting).unwrap();
        let _b = registry.try_begin(OpTarget::entity(EntityKind::User, 1), Stage::Persisting).unwrap();
        let _c = registry.try_begin(OpTarget::entity(EntityKind::Role, 1), Stage::Persisting).unwrap();
        assert_eq!(registry.len(), 3);
    }
}
