//! Logging sink the engine calls into, backed by `tracing`.

mod logger;
mod memory;
mod subscriber;
mod types;

pub use logger::Logger;
pub use memory::{LogEntry, MemoryLog};
pub use subscriber::init_subscriber;
pub use types::{Level, Log};
