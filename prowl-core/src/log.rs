//! Bounded, ordered progress log shared between the run loop and pollers.

use std::collections::VecDeque;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

/// Number of entries a [`LogBuffer`] retains by default.
pub const DEFAULT_LOG_CAPACITY: usize = 1000;

/// Severity of a log entry.
///
/// The minimal wire contract flattens entries to strings, but severity is
/// kept on every entry so a richer endpoint can expose it without reshaping
/// the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Routine progress.
    Info,
    /// A target passed its probe, or the job finished cleanly.
    Success,
    /// The job was stopped before completing.
    Warning,
    /// A target failed its probe, or the sweep itself faulted.
    Error,
}

/// One timestamped progress line. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    /// Wall-clock time the entry was appended.
    pub timestamp: DateTime<Local>,
    /// Human-readable progress message.
    pub message: String,
    /// Classification of the message.
    pub severity: Severity,
}

impl LogEntry {
    fn new(message: String, severity: Severity) -> Self {
        Self {
            timestamp: Local::now(),
            message,
            severity,
        }
    }

    /// The `"[HH:MM:SS] message"` form served by the logs endpoint.
    #[must_use]
    pub fn formatted(&self) -> String {
        format!("[{}] {}", self.timestamp.format("%H:%M:%S"), self.message)
    }
}

/// Capacity-bounded FIFO of [`LogEntry`] values.
///
/// Insertion order is chronological order. When appending at capacity the
/// oldest entry is evicted, so the buffer always holds the most recent
/// entries. One writer (the run loop) and any number of concurrent readers
/// are safe; readers never observe a partially-constructed entry.
#[derive(Debug)]
pub struct LogBuffer {
    capacity: usize,
    entries: RwLock<VecDeque<LogEntry>>,
}

impl LogBuffer {
    /// Creates a buffer with [`DEFAULT_LOG_CAPACITY`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_LOG_CAPACITY)
    }

    /// Creates a buffer bounded at `capacity` entries. Must be nonzero.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        debug_assert!(capacity > 0, "log buffer capacity must be nonzero");
        Self {
            capacity,
            entries: RwLock::new(VecDeque::with_capacity(capacity.min(64))),
        }
    }

    /// Appends a timestamped entry, evicting the oldest at capacity.
    /// Infallible; visible to every subsequent snapshot.
    pub async fn append(&self, message: impl Into<String>, severity: Severity) {
        let entry = LogEntry::new(message.into(), severity);
        let mut entries = self.entries.write().await;
        if entries.len() == self.capacity {
            entries.pop_front();
        }
        entries.push_back(entry);
    }

    /// Returns the current contents in insertion order.
    pub async fn snapshot(&self) -> Vec<LogEntry> {
        self.entries.read().await.iter().cloned().collect()
    }

    /// Snapshot in the `"[HH:MM:SS] message"` wire form.
    pub async fn formatted(&self) -> Vec<String> {
        self.entries
            .read()
            .await
            .iter()
            .map(LogEntry::formatted)
            .collect()
    }

    /// Clears all entries. Called only when a new job begins.
    pub async fn reset(&self) {
        self.entries.write().await.clear();
    }

    /// Number of retained entries.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// True when no entries are retained.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

impl Default for LogBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn append_preserves_insertion_order() {
        let buffer = LogBuffer::new();
        buffer.append("first", Severity::Info).await;
        buffer.append("second", Severity::Success).await;
        buffer.append("third", Severity::Error).await;

        let entries = buffer.snapshot().await;
        let messages: Vec<&str> =
            entries.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, ["first", "second", "third"]);
        assert_eq!(entries[1].severity, Severity::Success);
    }

    #[tokio::test]
    async fn capacity_evicts_oldest_first() {
        let buffer = LogBuffer::with_capacity(3);
        for i in 0..10 {
            buffer.append(format!("entry {i}"), Severity::Info).await;
        }

        assert_eq!(buffer.len().await, 3);
        let messages: Vec<String> = buffer
            .snapshot()
            .await
            .into_iter()
            .map(|e| e.message)
            .collect();
        assert_eq!(messages, ["entry 7", "entry 8", "entry 9"]);
    }

    #[tokio::test]
    async fn length_never_exceeds_capacity() {
        let buffer = LogBuffer::with_capacity(5);
        for i in 0..5 {
            buffer.append(format!("{i}"), Severity::Info).await;
            assert_eq!(buffer.len().await, i + 1);
        }
        for i in 5..20 {
            buffer.append(format!("{i}"), Severity::Info).await;
            assert_eq!(buffer.len().await, 5);
        }
    }

    #[tokio::test]
    async fn reset_clears_everything() {
        let buffer = LogBuffer::with_capacity(4);
        buffer.append("stale", Severity::Warning).await;
        buffer.reset().await;

        assert!(buffer.is_empty().await);
        assert!(buffer.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn formatted_lines_carry_wall_clock_prefix() {
        let buffer = LogBuffer::new();
        buffer.append("probing 1.2.3.4:8080", Severity::Info).await;

        let lines = buffer.formatted().await;
        assert_eq!(lines.len(), 1);
        // "[HH:MM:SS] message"
        let line = &lines[0];
        assert_eq!(&line[0..1], "[");
        assert_eq!(&line[9..11], "] ");
        assert!(line.ends_with("probing 1.2.3.4:8080"));
        assert!(line[1..9].chars().all(|c| c.is_ascii_digit() || c == ':'));
    }
}
