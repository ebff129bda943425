//! In-memory log sink.
use std::sync::Mutex;

use super::types::{Level, Log};

/// A single recorded log entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    /// Severity of the entry.
    pub level: Level,
    /// Message text.
    pub message: String,
}

/// Records every message instead of printing it.
///
/// Used by tests to assert on fallback diagnostics, and by callers that want
/// to collect warnings for a machine and report them after composition.
/// Messages are also forwarded to `tracing` at debug level so they are not
/// lost when a subscriber is installed.
#[derive(Debug, Default)]
pub struct MemoryLog {
    entries: Mutex<Vec<LogEntry>>,
}

macro_rules! record_log_methods {
    ($($method:ident => $level:ident),+ $(,)?) => {
        $(
            fn $method(&self, msg: &str) {
                tracing::debug!("{msg}");
                if let Ok(mut guard) = self.entries.lock() {
                    guard.push(LogEntry {
                        level: Level::$level,
                        message: msg.to_string(),
                    });
                }
            }
        )+
    };
}

impl MemoryLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every recorded entry, in order.
    #[must_use]
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries
            .lock()
            .map_or_else(|_| Vec::new(), |guard| guard.clone())
    }

    /// Messages recorded at `level`, in order.
    #[must_use]
    pub fn messages(&self, level: Level) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|e| e.level == level)
            .map(|e| e.message)
            .collect()
    }

    /// Warning messages, in order.
    #[must_use]
    pub fn warnings(&self) -> Vec<String> {
        self.messages(Level::Warn)
    }

    /// Returns `true` if any entry at `level` contains `needle`.
    #[must_use]
    pub fn contains(&self, level: Level, needle: &str) -> bool {
        self.messages(level).iter().any(|m| m.contains(needle))
    }
}

impl Log for MemoryLog {
    record_log_methods!(
        stage => Stage,
        info => Info,
        debug => Debug,
        warn => Warn,
        error => Error,
    );
}
