//! Config Command
//!
//! Usage:
//!   repodoc config show [REPO] [-f json]
//!   repodoc config path [REPO]
//!   repodoc config init [REPO] [--global] [--force]

use std::path::Path;

use super::load_config;
use crate::cli::Output;
use crate::config::ConfigLoader;
use crate::types::Result;

/// Print the merged effective configuration
pub fn show(repo: &Path, explicit: Option<&Path>, format: &str) -> Result<()> {
    let config = load_config(repo, explicit)?;
    Output::new().raw(&ConfigLoader::render(&config, format == "json")?);
    Ok(())
}

/// Print where configuration is read from
pub fn path(repo: &Path) -> Result<()> {
    let out = Output::new();
    match ConfigLoader::global_config_path() {
        Some(global) => out.field(
            "Global",
            format!("{}{}", global.display(), missing(&global)),
        ),
        None => out.field("Global", "(no config directory)"),
    }
    let project = ConfigLoader::project_config_path(repo);
    out.field("Project", format!("{}{}", project.display(), missing(&project)));
    out.field("Env", "REPODOC_<SECTION>__<KEY>");
    Ok(())
}

fn missing(path: &Path) -> &'static str {
    if path.exists() { "" } else { " (not found)" }
}

pub fn init(repo: &Path, global: bool, force: bool) -> Result<()> {
    let path = if global {
        ConfigLoader::init_global(force)?
    } else {
        ConfigLoader::init_project(repo, force)?
    };
    Output::new().success(&format!("Configuration at {}", path.display()));
    Ok(())
}
