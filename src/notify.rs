//! Notification surface: where user-facing messages go.
//!
//! The client never renders anything itself. It hands a [`Severity`] and a
//! message to a [`Notifier`], and the application decides how to show it.
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`Notifier`] | Trait for notification destinations |
//! | [`NoopNotifier`] | Drops everything |
//! | [`TracingNotifier`] | Emits each notification as a tracing event (default) |
//! | [`RecordingNotifier`] | Keeps notifications in memory, for tests and UI polling |
//! | [`DedupNotifier`] | Suppresses an identical notification repeated within a window |

use std::fmt;
use std::sync::{Arc, Mutex, RwLock};
use std::time::{Duration, Instant};

/// Presentation tier of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Success,
    Info,
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Success => "success",
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A destination for user-facing messages.
pub trait Notifier: Send + Sync {
    fn notify(&self, severity: Severity, message: &str);
}

/// No-op notifier.
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&self, _severity: Severity, _message: &str) {}
}

pub fn noop_notifier() -> Arc<dyn Notifier> {
    Arc::new(NoopNotifier)
}

/// Emits notifications through `tracing`, mapping severity to level.
#[derive(Debug, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, severity: Severity, message: &str) {
        match severity {
            Severity::Success | Severity::Info => {
                tracing::info!(target: "gossip_client::notify", %severity, "{}", message)
            }
            Severity::Warning => {
                tracing::warn!(target: "gossip_client::notify", %severity, "{}", message)
            }
            Severity::Error => {
                tracing::error!(target: "gossip_client::notify", %severity, "{}", message)
            }
        }
    }
}

/// A notification captured by [`RecordingNotifier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub severity: Severity,
    pub message: String,
}

/// In-memory notifier for tests.
pub struct RecordingNotifier {
    events: Arc<RwLock<Vec<Notification>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self {
            events: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.events
            .read()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.events.read().map(|events| events.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Ok(mut events) = self.events.write() {
            events.clear();
        }
    }
}

impl Default for RecordingNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, severity: Severity, message: &str) {
        if let Ok(mut events) = self.events.write() {
            events.push(Notification {
                severity,
                message: message.to_string(),
            });
        }
    }
}

/// Drops a notification when the same severity and message were delivered
/// less than `window` ago.
pub struct DedupNotifier {
    inner: Arc<dyn Notifier>,
    window: Duration,
    last: Mutex<Option<(Severity, String, Instant)>>,
}

impl DedupNotifier {
    pub const DEFAULT_WINDOW: Duration = Duration::from_secs(2);

    pub fn new(inner: Arc<dyn Notifier>, window: Duration) -> Self {
        Self {
            inner,
            window,
            last: Mutex::new(None),
        }
    }

    fn should_deliver(&self, severity: Severity, message: &str) -> bool {
        let Ok(mut last) = self.last.lock() else {
            return true;
        };
        let now = Instant::now();
        if let Some((prev_severity, prev_message, at)) = last.as_ref() {
            if *prev_severity == severity
                && prev_message == message
                && now.duration_since(*at) < self.window
            {
                return false;
            }
        }
        *last = Some((severity, message.to_string(), now));
        true
    }
}

impl Notifier for DedupNotifier {
    fn notify(&self, severity: Severity, message: &str) {
        if self.should_deliver(severity, message) {
            self.inner.notify(severity, message);
        } else {
            tracing::trace!(%severity, message, "duplicate notification suppressed");
        }
    }
}
