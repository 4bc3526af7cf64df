//! Append-only, capacity-bounded record of operational events.
//!
//! Every other component produces entries; the UI log panel consumes them.
//! Recording never fails and never blocks. Entries may additionally be
//! forwarded over an unbounded channel so a frontend can stream them live;
//! a dropped receiver is tolerated and simply skipped.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use tokio::sync::mpsc;

/// Maximum number of retained entries; inserting past capacity evicts the
/// oldest.
pub const LOG_CAPACITY: usize = 30;

/// Tag classifying where an entry came from.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LogCategory {
    Link,
    Job,
    Capture,
    Access,
    System,
}

/// One recorded operational event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: String,
    pub category: LogCategory,
    pub message: String,
    pub detail: Option<String>,
    pub timestamp: String,
}

/// Ordered sequence of log entries, newest first, capped at [`LOG_CAPACITY`].
#[derive(Debug, Default)]
pub struct EventLog {
    entries: VecDeque<LogEntry>,
    forwarder: Option<mpsc::UnboundedSender<LogEntry>>,
}

impl EventLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepends a new entry and truncates to capacity.
    ///
    /// Never fails; the returned entry carries the generated id and
    /// timestamp.
    pub fn record(
        &mut self,
        category: LogCategory,
        message: impl Into<String>,
        detail: Option<String>,
    ) -> LogEntry {
        let entry = LogEntry {
            id: uuid::Uuid::new_v4().to_string(),
            category,
            message: message.into(),
            detail,
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        self.entries.push_front(entry.clone());
        self.entries.truncate(LOG_CAPACITY);

        // Non-blocking forward - if the receiver is dropped, we just skip
        if let Some(sender) = &self.forwarder {
            let _ = sender.send(entry.clone());
        }

        entry
    }

    /// Empties the log.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Entries, newest first.
    pub fn entries(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn set_forwarder(&mut self, sender: mpsc::UnboundedSender<LogEntry>) {
        self.forwarder = Some(sender);
    }
}

/// Cloneable shared handle to the event log.
///
/// Recording must never throw or block, so the handle recovers from a
/// poisoned lock instead of panicking.
#[derive(Debug, Clone, Default)]
pub struct EventLogHandle {
    inner: Arc<Mutex<EventLog>>,
}

impl EventLogHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an entry. Infallible.
    pub fn record(
        &self,
        category: LogCategory,
        message: impl Into<String>,
        detail: Option<String>,
    ) -> LogEntry {
        self.lock().record(category, message, detail)
    }

    /// Empties the log.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// A snapshot of the current entries, newest first.
    pub fn snapshot(&self) -> Vec<LogEntry> {
        self.lock().entries().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Subscribes to future entries for live streaming.
    ///
    /// Only one subscriber is kept; a later call replaces the forwarder and
    /// the previous receiver stops seeing entries.
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<LogEntry> {
        let (sender, receiver) = mpsc::unbounded_channel();
        self.lock().set_forwarder(sender);
        receiver
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, EventLog> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
