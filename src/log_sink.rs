// src/log_sink.rs

//! Append-only, timestamped event log shared by the validators and the
//! supervisor.
//!
//! This is the trail a debug console shows to the user. It is separate from
//! `tracing` (which is process diagnostics), but every entry is mirrored to
//! `tracing` as well so the trail also shows up on stderr.

use std::fmt;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Local};
use tokio::sync::broadcast;
use tracing::{debug, error, info};

/// Capacity of the live-follow channel. Slow subscribers lag, they never
/// block writers.
const FOLLOW_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogCategory {
    Info,
    Error,
    /// Text produced by the managed process itself.
    ManagedProcessOutput,
}

impl fmt::Display for LogCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogCategory::Info => "Info",
            LogCategory::Error => "Error",
            LogCategory::ManagedProcessOutput => "Redshift",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub category: LogCategory,
    pub message: String,
}

impl LogEntry {
    /// `"HH:MM:SS Category: message\n"`.
    pub fn render(&self) -> String {
        format!(
            "{} {}: {}\n",
            self.timestamp.format("%H:%M:%S"),
            self.category,
            self.message
        )
    }
}

/// Cheaply clonable handle; all clones append to the same log.
#[derive(Clone)]
pub struct LogSink {
    entries: Arc<Mutex<Vec<LogEntry>>>,
    follow: broadcast::Sender<LogEntry>,
}

impl fmt::Debug for LogSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogSink")
            .field("entries", &self.len())
            .finish_non_exhaustive()
    }
}

impl Default for LogSink {
    fn default() -> Self {
        Self::new()
    }
}

impl LogSink {
    pub fn new() -> Self {
        let (follow, _) = broadcast::channel(FOLLOW_CAPACITY);
        Self {
            entries: Arc::new(Mutex::new(Vec::new())),
            follow,
        }
    }

    /// Append one entry. Empty messages are dropped.
    pub fn write_log(&self, message: impl Into<String>, category: LogCategory) {
        let message = message.into();
        if message.is_empty() {
            return;
        }

        match category {
            LogCategory::Info => info!(target: "redshift_tray::log", "{message}"),
            LogCategory::Error => error!(target: "redshift_tray::log", "{message}"),
            LogCategory::ManagedProcessOutput => {
                debug!(target: "redshift_tray::log", "redshift: {message}")
            }
        }

        let entry = LogEntry {
            timestamp: Local::now(),
            category,
            message,
        };

        self.lock().push(entry.clone());
        // No subscribers is fine.
        let _ = self.follow.send(entry);
    }

    pub fn info(&self, message: impl Into<String>) {
        self.write_log(message, LogCategory::Info);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.write_log(message, LogCategory::Error);
    }

    pub fn output(&self, message: impl Into<String>) {
        self.write_log(message, LogCategory::ManagedProcessOutput);
    }

    /// Snapshot of everything logged so far, oldest first.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Whole trail as newline-terminated lines.
    pub fn render(&self) -> String {
        self.lock().iter().map(LogEntry::render).collect()
    }

    /// Follow entries written from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<LogEntry> {
        self.follow.subscribe()
    }

    pub fn contains(&self, category: LogCategory, needle: &str) -> bool {
        self.lock()
            .iter()
            .any(|e| e.category == category && e.message.contains(needle))
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<LogEntry>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
