//! Injected side-effect capabilities: asking the operator and telling them.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use serde::Serialize;

/// Severity of an outcome notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
    Warning,
}

impl core::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            NotificationKind::Success => f.write_str("success"),
            NotificationKind::Error => f.write_str("error"),
            NotificationKind::Warning => f.write_str("warning"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

/// Yes/no question to the operator.
#[async_trait::async_trait]
pub trait Confirm: Send + Sync {
    async fn confirm(&self, prompt: &str) -> bool;
}

/// Outcome surface (toast, dialog, terminal line...).
pub trait Notify: Send + Sync {
    fn notify(&self, kind: NotificationKind, message: &str);
}

/// Capabilities handed to every lifecycle controller.
#[derive(Clone)]
pub struct Capabilities {
    pub confirm: Arc<dyn Confirm>,
    pub notify: Arc<dyn Notify>,
}

impl Capabilities {
    pub fn new(confirm: Arc<dyn Confirm>, notify: Arc<dyn Notify>) -> Self {
        Self { confirm, notify }
    }
}

impl core::fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Capabilities").finish_non_exhaustive()
    }
}

/// Answers confirmations from a queue, then falls back to a default answer.
#[derive(Debug)]
pub struct ScriptedConfirm {
    answers: Mutex<VecDeque<bool>>,
    fallback: bool,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedConfirm {
    pub fn always(answer: bool) -> Self {
        Self::with_answers([], answer)
    }

    pub fn with_answers(answers: impl IntoIterator<Item = bool>, fallback: bool) -> Self {
        Self {
            answers: Mutex::new(answers.into_iter().collect()),
            fallback,
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Every prompt shown so far, oldest first.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl Confirm for ScriptedConfirm {
    async fn confirm(&self, prompt: &str) -> bool {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
        self.answers
            .lock()
            .ok()
            .and_then(|mut answers| answers.pop_front())
            .unwrap_or(self.fallback)
    }
}

/// Keeps every notification in memory.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    seen: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.seen.lock().map(|n| n.clone()).unwrap_or_default()
    }

    pub fn last(&self) -> Option<Notification> {
        self.seen.lock().ok().and_then(|n| n.last().cloned())
    }

    pub fn count(&self, kind: NotificationKind) -> usize {
        self.seen
            .lock()
            .map(|n| n.iter().filter(|x| x.kind == kind).count())
            .unwrap_or(0)
    }
}

impl Notify for RecordingNotifier {
    fn notify(&self, kind: NotificationKind, message: &str) {
        if let Ok(mut seen) = self.seen.lock() {
            seen.push(Notification {
                kind,
                message: message.to_string(),
            });
        }
    }
}

/// Writes notifications to the tracing pipeline only.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notify for TracingNotifier {
    fn notify(&self, kind: NotificationKind, message: &str) {
        match kind {
            NotificationKind::Success => tracing::info!(%kind, "{message}"),
            NotificationKind::Warning => tracing::warn!(%kind, "{message}"),
            NotificationKind::Error => tracing::error!(%kind, "{message}"),
        }
    }
}
