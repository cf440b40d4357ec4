//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request path
//!     → registry.rs (current MountTable snapshot)
//!     → mounts.rs (entries in descending path order)
//!     → matcher.rs (prefix + segment boundary)
//!     → matched strategy, ignored path, or no match
//!
//! Table construction (startup and reload):
//!     mount config
//!     → path.rs (validate mount paths)
//!     → MountTable::mount / ignore
//!     → MountRegistry::replace
//! ```
//!
//! # Design Decisions
//! - Tables are built once and frozen; reloads swap in a whole new table
//! - No regex: prefix matching only
//! - Deterministic: same input always matches the same mount

pub mod error;
pub mod matcher;
pub mod mounts;
pub mod path;
pub mod registry;

pub use error::MountError;
pub use matcher::PathMatcher;
pub use mounts::{MountEntry, MountInfo, MountTable};
pub use path::MountPath;
pub use registry::MountRegistry;
