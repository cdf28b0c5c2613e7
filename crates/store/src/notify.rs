//! Fire-and-forget user notification sink.
//!
//! The core reports outcomes ("added to cart", "order placed") through this
//! sink without awaiting or inspecting the result; delivery is purely
//! observational and never affects control flow.

use std::sync::{Arc, Mutex};

/// How a notification should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Severity::Info => "info",
            Severity::Success => "success",
            Severity::Error => "error",
        };
        write!(f, "{s}")
    }
}

/// Accepts a message and a severity; nothing more is promised.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, severity: Severity, message: &str);
}

/// Sink that forwards notifications to the tracing subscriber.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn notify(&self, severity: Severity, message: &str) {
        match severity {
            Severity::Error => tracing::warn!(target: "notifications", "{message}"),
            _ => tracing::info!(target: "notifications", %severity, "{message}"),
        }
    }
}

/// Sink that records notifications for assertions in tests.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    messages: Arc<Mutex<Vec<(Severity, String)>>>,
}

impl RecordingSink {
    /// Creates an empty recording sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of everything recorded so far.
    pub fn messages(&self) -> Vec<(Severity, String)> {
        self.messages.lock().unwrap().clone()
    }

    /// Returns the number of recorded notifications.
    pub fn count(&self) -> usize {
        self.messages.lock().unwrap().len()
    }
}

impl NotificationSink for RecordingSink {
    fn notify(&self, severity: Severity, message: &str) {
        self.messages
            .lock()
            .unwrap()
            .push((severity, message.to_string()));
    }
}
