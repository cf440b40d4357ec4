//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Validate → Page registry → Mount table → Start listener
//!
//! Reload:
//!     Config watcher → startup.rs rebuilds the mount table → MountRegistry swap
//!
//! Shutdown (shutdown.rs, signals.rs):
//!     SIGINT/SIGTERM → broadcast → stop accepting → drain → exit
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then registries, then the listener
//! - A reload that fails to build keeps the current mount table

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use signals::shutdown_on_signal;
pub use startup::{build_mount_table, build_page_registry, build_strategy, StartupError};
