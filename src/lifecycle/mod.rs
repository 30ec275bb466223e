//! Process lifecycle.
//!
//! # Data Flow
//! ```text
//! startup.rs:  open stores → spawn flusher + revocation pruner
//! signals.rs:  SIGTERM/Ctrl+C → Shutdown::trigger
//! shutdown.rs: broadcast → server drains, flusher saves, pruner exits
//! ```

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
