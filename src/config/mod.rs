//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → MountsConfig (validated, immutable)
//!     → lifecycle::startup builds the page registry and mount table
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads and validates the new config
//!     → mpsc channel to the server
//!     → new MountTable swapped into the MountRegistry
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a full reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    EncodingKind, ListenerConfig, LogFormat, MountConfig, MountsConfig, ObservabilityConfig,
    PageConfig, SettingsConfig, StrategyKind,
};
pub use validation::{validate_config, ValidationError};
pub use watcher::ConfigWatcher;
