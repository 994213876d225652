//! LLM Client Abstraction
//!
//! The documentation pipeline only needs plain text completion: a prompt
//! goes in, markdown comes out. Failures are [`LlmError`]s whose category
//! decides between retry, task failure and aborting the run.

mod openrouter;

pub use openrouter::OpenRouterClient;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::LlmConfig;
use crate::constants::llm;
use crate::types::{DocError, LlmError, Result};

/// One completion call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub prompt: String,
    /// Model identifier sent to the provider
    pub model: String,
    /// Completion budget
    pub max_tokens: u32,
}

impl CompletionRequest {
    pub fn new(prompt: impl Into<String>, model: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            prompt: prompt.into(),
            model: model.into(),
            max_tokens,
        }
    }

    /// Request using the model and token budget from `config`
    pub fn from_config(prompt: impl Into<String>, config: &LlmConfig) -> Self {
        Self::new(prompt, config.model.clone(), config.max_tokens)
    }
}

/// Text completion endpoint
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Returns the generated text. Empty output is a `MalformedResponse`.
    async fn complete(&self, request: &CompletionRequest) -> std::result::Result<String, LlmError>;

    /// Provider name for logging
    fn name(&self) -> &str;

    /// Default model of this client
    fn model(&self) -> &str;
}

/// Shared client handed to every worker
pub type SharedClient = Arc<dyn LlmClient>;

/// Build the configured client.
///
/// A missing credential is reported here, before any work is scheduled.
pub fn create_client(config: &LlmConfig) -> Result<SharedClient> {
    match config.provider.as_str() {
        "openrouter" | "openai" => Ok(Arc::new(OpenRouterClient::new(config)?)),
        other => Err(DocError::Config(format!(
            "Unknown provider: {}. Supported: openrouter, openai",
            other
        ))),
    }
}

/// Environment variable holding the key for `provider`
pub fn credential_env(provider: &str) -> &'static str {
    match provider {
        "openai" => llm::OPENAI_KEY_ENV,
        _ => llm::OPENROUTER_KEY_ENV,
    }
}

/// API key from config, falling back to the provider's environment variable
pub fn resolve_api_key(config: &LlmConfig) -> Result<String> {
    let env_name = credential_env(&config.provider);
    config
        .api_key
        .clone()
        .or_else(|| std::env::var(env_name).ok())
        .filter(|key| !key.trim().is_empty())
        .ok_or_else(|| {
            DocError::MissingCredential(format!(
                "{} API key not found. Set {} or llm.api_key in config",
                config.provider, env_name
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_from_config() {
        let config = LlmConfig::default();
        let req = CompletionRequest::from_config("hello", &config);
        assert_eq!(req.prompt, "hello");
        assert_eq!(req.model, llm::DEFAULT_MODEL);
        assert_eq!(req.max_tokens, llm::DEFAULT_MAX_TOKENS);
    }

    #[test]
    fn test_explicit_key_wins() {
        let config = LlmConfig {
            api_key: Some("sk-test".to_string()),
            ..Default::default()
        };
        assert_eq!(resolve_api_key(&config).unwrap(), "sk-test");
    }

    #[test]
    fn test_blank_key_is_missing() {
        let config = LlmConfig {
            provider: "openai".to_string(),
            api_key: Some("   ".to_string()),
            ..Default::default()
        };
        let err = resolve_api_key(&config).unwrap_err();
        assert!(err.is_auth_failure());
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn test_unknown_provider_rejected() {
        let config = LlmConfig {
            provider: "carrier-pigeon".to_string(),
            api_key: Some("k".to_string()),
            ..Default::default()
        };
        assert!(matches!(create_client(&config), Err(DocError::Config(_))));
    }

    #[test]
    fn test_credential_env() {
        assert_eq!(credential_env("openai"), "OPENAI_API_KEY");
        assert_eq!(credential_env("openrouter"), "OPENROUTER_API_KEY");
    }
}
