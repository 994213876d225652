//! Configuration Management
//!
//! Hierarchical resolution:
//! 1. Built-in defaults
//! 2. Global config (~/.config/repodoc/config.toml)
//! 3. Project config (<repo>/.repodoc.toml)
//! 4. Environment variables (REPODOC_*)
//! 5. CLI arguments (highest priority, applied by the command layer)

mod loader;
mod types;

pub use loader::{ConfigLoader, PROJECT_CONFIG_FILE};
pub use types::*;
