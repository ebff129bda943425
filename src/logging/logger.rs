//! Logger that forwards every message to `tracing`.
use super::types::Log;

/// Target used for stage headers so the console formatter can style them.
pub(super) const STAGE_TARGET: &str = "smart_provision::stage";

/// Implement the methods of [`Log`] by delegating to inherent methods of
/// the same name on the implementing type.
macro_rules! forward_log_methods {
    ($($method:ident),+ $(,)?) => {
        $(
            fn $method(&self, msg: &str) {
                self.$method(msg);
            }
        )+
    };
}

/// Structured logger scoped to one machine.
///
/// Every message is emitted with a `machine` field so that interleaved
/// output from several provisioners in one process stays attributable.
#[derive(Debug, Clone)]
pub struct Logger {
    machine: String,
}

impl Logger {
    /// Create a logger for `machine`.
    #[must_use]
    pub fn new(machine: &str) -> Self {
        Self {
            machine: machine.to_string(),
        }
    }

    /// Machine this logger is scoped to.
    #[must_use]
    pub fn machine(&self) -> &str {
        &self.machine
    }

    /// Log an error message.
    pub fn error(&self, msg: &str) {
        tracing::error!(machine = %self.machine, "{msg}");
    }

    /// Log a warning message.
    pub fn warn(&self, msg: &str) {
        tracing::warn!(machine = %self.machine, "{msg}");
    }

    /// Log a stage header (major section).
    pub fn stage(&self, msg: &str) {
        tracing::info!(target: STAGE_TARGET, machine = %self.machine, "{msg}");
    }

    /// Log an informational message.
    pub fn info(&self, msg: &str) {
        tracing::info!(machine = %self.machine, "{msg}");
    }

    /// Log a debug message (suppressed on console unless verbose).
    pub fn debug(&self, msg: &str) {
        tracing::debug!(machine = %self.machine, "{msg}");
    }
}

impl Log for Logger {
    forward_log_methods!(stage, info, debug, warn, error);
}
