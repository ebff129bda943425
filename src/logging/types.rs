//! Core logging types: the [`Log`] trait and message levels.

/// Severity of a logged message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    /// Verbose detail, hidden on the console unless `--verbose`.
    Debug,
    /// Informational message.
    Info,
    /// Major section header.
    Stage,
    /// Something was skipped or degraded to a fallback.
    Warn,
    /// An operation failed.
    Error,
}

/// Abstraction over logging backends.
///
/// [`Logger`](super::logger::Logger) forwards to `tracing`;
/// [`MemoryLog`](super::memory::MemoryLog) keeps entries in memory so tests
/// can assert on diagnostics.  The engine only ever talks to this trait.
pub trait Log: Send + Sync + std::fmt::Debug {
    /// Log a stage header (major section).
    fn stage(&self, msg: &str);
    /// Log an informational message.
    fn info(&self, msg: &str);
    /// Log a debug message (may be suppressed on console).
    fn debug(&self, msg: &str);
    /// Log a warning message.
    fn warn(&self, msg: &str);
    /// Log an error message.
    fn error(&self, msg: &str);
}
