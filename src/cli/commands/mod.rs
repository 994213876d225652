pub mod config;
pub mod generate;
pub mod list;
pub mod scan;

use std::path::Path;

use crate::config::{Config, ConfigLoader};
use crate::types::Result;

/// Effective config for a repository, with an optional explicit file
pub(crate) fn load_config(repo: &Path, explicit: Option<&Path>) -> Result<Config> {
    let root = if repo.is_dir() { Some(repo) } else { None };
    ConfigLoader::load(root, explicit)
}
