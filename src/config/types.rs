//! Configuration Types
//!
//! All configuration structures with sensible defaults. A single [`Config`]
//! value is built once per invocation and passed down by reference.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::constants::{llm, orchestrator, retry, scanner};
use crate::types::{DocError, Result};

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Repository scanning rules
    pub scan: ScanConfig,

    /// Documentation generation settings
    pub generation: GenerationConfig,

    /// LLM provider settings
    pub llm: LlmConfig,

    /// Output location settings
    pub output: OutputConfig,

    /// Static site emission settings
    pub site: SiteConfig,
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub fn validate(&self) -> Result<()> {
        if self.generation.workers == 0 {
            return Err(DocError::Config(
                "generation.workers must be greater than 0".to_string(),
            ));
        }

        if self.llm.max_attempts == 0 {
            return Err(DocError::Config(
                "llm.max_attempts must be greater than 0".to_string(),
            ));
        }

        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(DocError::Config(format!(
                "llm.temperature must be between 0.0 and 2.0, got {}",
                self.llm.temperature
            )));
        }

        if self.llm.timeout_secs == 0 {
            return Err(DocError::Config(
                "llm.timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.llm.max_tokens == 0 {
            return Err(DocError::Config(
                "llm.max_tokens must be greater than 0".to_string(),
            ));
        }

        if let Some(base) = &self.llm.api_base {
            let parsed = url::Url::parse(base)
                .map_err(|e| DocError::Config(format!("llm.api_base '{}': {}", base, e)))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(DocError::Config(format!(
                    "llm.api_base must use http or https, got '{}'",
                    parsed.scheme()
                )));
            }
        }

        for pattern in &self.scan.ignore {
            glob::Pattern::new(pattern).map_err(|e| {
                DocError::Config(format!("scan.ignore pattern '{}': {}", pattern, e))
            })?;
        }

        if self.scan.max_depth == 0 {
            return Err(DocError::Config(
                "scan.max_depth must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

// =============================================================================
// Scan Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Extra name globs pruned in addition to the built-in set
    pub ignore: Vec<String>,

    /// Include entries whose name starts with `.`
    pub include_hidden: bool,

    /// Follow symlinked files and directories
    pub follow_symlinks: bool,

    /// Honour the root `.gitignore`
    pub respect_gitignore: bool,

    /// Files larger than this are skipped without being read
    pub max_file_size: u64,

    /// Maximum directory depth below the root
    pub max_depth: usize,

    /// Restrict scanning to these extensions (empty = every known language)
    pub extensions: Vec<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            ignore: Vec::new(),
            include_hidden: false,
            follow_symlinks: false,
            respect_gitignore: true,
            max_file_size: scanner::DEFAULT_MAX_FILE_SIZE,
            max_depth: scanner::DEFAULT_MAX_DEPTH,
            extensions: Vec::new(),
        }
    }
}

// =============================================================================
// Generation Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Worker pool width (simultaneous LLM calls)
    pub workers: usize,

    /// Delay between dispatches from the same worker (milliseconds)
    pub dispatch_delay_ms: u64,

    /// File content beyond this many characters is truncated in prompts
    pub max_file_chars: usize,

    /// Size budget for the concatenated per-file docs in the overview prompt
    pub overview_budget_chars: usize,

    /// Excerpt length per file when the overview budget is exceeded
    pub excerpt_chars: usize,

    /// Ask the model for an architecture narrative in dependencies.md
    pub dependency_narrative: bool,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            workers: orchestrator::DEFAULT_WORKERS,
            dispatch_delay_ms: orchestrator::DEFAULT_DISPATCH_DELAY_MS,
            max_file_chars: orchestrator::DEFAULT_MAX_FILE_CHARS,
            overview_budget_chars: orchestrator::DEFAULT_OVERVIEW_BUDGET_CHARS,
            excerpt_chars: orchestrator::DEFAULT_EXCERPT_CHARS,
            dependency_narrative: true,
        }
    }
}

impl GenerationConfig {
    pub fn dispatch_delay(&self) -> Duration {
        Duration::from_millis(self.dispatch_delay_ms)
    }
}

// =============================================================================
// LLM Configuration
// =============================================================================

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider name: openrouter, openai
    pub provider: String,

    /// Model identifier sent with every request
    pub model: String,

    /// Override for the provider's API base URL
    pub api_base: Option<String>,

    /// API key; prefer the provider's environment variable
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Timeout per HTTP request in seconds
    pub timeout_secs: u64,

    pub temperature: f32,

    /// Completion budget per request
    pub max_tokens: u32,

    /// Attempts per call for rate-limit and server errors
    pub max_attempts: u32,

    /// Base backoff delay in milliseconds
    pub base_delay_ms: u64,

    /// Backoff ceiling in seconds
    pub max_delay_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: llm::DEFAULT_PROVIDER.to_string(),
            model: llm::DEFAULT_MODEL.to_string(),
            api_base: None,
            api_key: None,
            timeout_secs: llm::DEFAULT_TIMEOUT_SECS,
            temperature: llm::DEFAULT_TEMPERATURE,
            max_tokens: llm::DEFAULT_MAX_TOKENS,
            max_attempts: retry::DEFAULT_MAX_ATTEMPTS,
            base_delay_ms: retry::BASE_DELAY_MS,
            max_delay_secs: retry::MAX_DELAY_SECS,
        }
    }
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("api_base", &self.api_base)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("timeout_secs", &self.timeout_secs)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("max_attempts", &self.max_attempts)
            .finish()
    }
}

// =============================================================================
// Output Configuration
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output root; defaults to a sibling `<project>-docs-<id>` directory
    pub dir: Option<PathBuf>,

    /// Project name shown in documents (defaults to the root directory name)
    pub project_name: Option<String>,
}

// =============================================================================
// Site Configuration
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Emit a Docusaurus site next to the markdown output
    pub enabled: bool,

    /// Keep hidden and `_`-prefixed docs in the sidebar
    pub show_hidden: bool,

    /// Site root; defaults to a sibling `<project>-docusaurus` directory
    pub dir: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.generation.workers, 3);
        assert_eq!(config.llm.max_attempts, 3);
        assert_eq!(config.scan.max_file_size, 1_048_576);
        assert!(!config.site.enabled);
    }

    #[test]
    fn test_zero_workers_rejected() {
        let mut config = Config::default();
        config.generation.workers = 0;
        assert!(matches!(config.validate(), Err(DocError::Config(_))));
    }

    #[test]
    fn test_temperature_range() {
        let mut config = Config::default();
        config.llm.temperature = 2.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_api_base_must_be_http() {
        let mut config = Config::default();
        config.llm.api_base = Some("ftp://example.com".to_string());
        assert!(config.validate().is_err());

        config.llm.api_base = Some("not a url".to_string());
        assert!(config.validate().is_err());

        config.llm.api_base = Some("http://localhost:8080/v1".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_bad_ignore_glob_rejected() {
        let mut config = Config::default();
        config.scan.ignore = vec!["[unclosed".to_string()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_api_key_redacted_and_not_serialized() {
        let mut config = Config::default();
        config.llm.api_key = Some("sk-secret".to_string());

        let debug = format!("{:?}", config.llm);
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("[REDACTED]"));

        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("sk-secret"));
    }
}
