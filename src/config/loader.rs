//! Configuration Loader (Figment-based)
//!
//! Loads and merges configuration from multiple sources using Figment:
//! 1. Built-in defaults (Serialized)
//! 2. Global config (~/.config/repodoc/config.toml)
//! 3. Project config (<repo>/.repodoc.toml, or an explicit file)
//! 4. Environment variables (REPODOC_* prefix, `__` between sections)

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::types::Config;
use crate::types::{DocError, Result};

/// Project-level config file name, looked up in the repository root
pub const PROJECT_CONFIG_FILE: &str = ".repodoc.toml";

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with full resolution chain:
    /// defaults → global → project (or `explicit`) → env vars
    pub fn load(repo_root: Option<&Path>, explicit: Option<&Path>) -> Result<Config> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            debug!("Loading global config from: {}", global_path.display());
            figment = figment.merge(Toml::file(&global_path));
        }

        match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(DocError::Config(format!(
                        "config file not found: {}",
                        path.display()
                    )));
                }
                debug!("Loading config from: {}", path.display());
                figment = figment.merge(Toml::file(path));
            }
            None => {
                if let Some(root) = repo_root {
                    let project_path = Self::project_config_path(root);
                    if project_path.exists() {
                        debug!("Loading project config from: {}", project_path.display());
                        figment = figment.merge(Toml::file(&project_path));
                    }
                }
            }
        }

        // REPODOC_LLM__MODEL -> llm.model
        figment = figment.merge(Env::prefixed("REPODOC_").split("__"));

        let config: Config = figment
            .extract()
            .map_err(|e| DocError::Config(format!("Configuration error: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a specific file only (no global, no env)
    pub fn load_from_file(path: &Path) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .extract()
            .map_err(|e| DocError::Config(format!("Configuration error: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    // =========================================================================
    // Path Management
    // =========================================================================

    /// Get path to global config directory (~/.config/repodoc/)
    pub fn global_dir() -> Option<PathBuf> {
        env::var("XDG_CONFIG_HOME")
            .ok()
            .map(PathBuf::from)
            .or_else(|| {
                env::var("HOME")
                    .ok()
                    .map(|home| PathBuf::from(home).join(".config"))
            })
            .map(|p| p.join("repodoc"))
    }

    pub fn global_config_path() -> Option<PathBuf> {
        Self::global_dir().map(|dir| dir.join("config.toml"))
    }

    pub fn project_config_path(repo_root: &Path) -> PathBuf {
        repo_root.join(PROJECT_CONFIG_FILE)
    }

    // =========================================================================
    // Config Commands
    // =========================================================================

    /// Render the effective configuration as TOML or JSON
    pub fn render(config: &Config, as_json: bool) -> Result<String> {
        if as_json {
            Ok(serde_json::to_string_pretty(config)?)
        } else {
            toml::to_string_pretty(config).map_err(|e| DocError::Config(e.to_string()))
        }
    }

    // =========================================================================
    // Initialization
    // =========================================================================

    /// Write the default global config; keeps an existing file unless `force`
    pub fn init_global(force: bool) -> Result<PathBuf> {
        let global_dir = Self::global_dir().ok_or_else(|| {
            DocError::Config("Cannot determine global config directory".to_string())
        })?;
        fs::create_dir_all(&global_dir)?;

        let config_path = global_dir.join("config.toml");
        Self::write_default(&config_path, force)?;
        Ok(config_path)
    }

    /// Write the default project config into `repo_root`
    pub fn init_project(repo_root: &Path, force: bool) -> Result<PathBuf> {
        let config_path = Self::project_config_path(repo_root);
        Self::write_default(&config_path, force)?;
        Ok(config_path)
    }

    fn write_default(path: &Path, force: bool) -> Result<()> {
        if path.exists() && !force {
            info!("Config exists: {}", path.display());
            return Ok(());
        }
        fs::write(path, Self::default_config())?;
        info!("Created config: {}", path.display());
        Ok(())
    }

    fn default_config() -> &'static str {
        r#"# repodoc configuration
# Environment variables override these values, e.g. REPODOC_LLM__MODEL.

[scan]
# Extra name globs to skip, on top of the built-in set
ignore = []
include_hidden = false
follow_symlinks = false
respect_gitignore = true
max_file_size = 1048576

[generation]
workers = 3
dispatch_delay_ms = 1000
dependency_narrative = true

[llm]
provider = "openrouter"
model = "google/gemini-2.5-flash"
timeout_secs = 120
max_tokens = 4000
temperature = 0.3
max_attempts = 3

[site]
enabled = false
show_hidden = false
"#
    }
}
