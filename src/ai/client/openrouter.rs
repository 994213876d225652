//! OpenAI-compatible Chat Completions client
//!
//! Talks to OpenRouter by default; `provider = "openai"` points the same
//! wire format at the OpenAI API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::RETRY_AFTER;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::{CompletionRequest, LlmClient, resolve_api_key};
use crate::config::LlmConfig;
use crate::constants::llm;
use crate::types::{DocError, ErrorClassifier, LlmError, Result};

const SYSTEM_PROMPT: &str =
    "You are a technical writer documenting source code. Respond with markdown only.";

/// HTTP client with the API key kept out of logs and debug output
pub struct OpenRouterClient {
    name: String,
    api_key: SecretString,
    api_base: String,
    model: String,
    temperature: f32,
    client: reqwest::Client,
}

impl std::fmt::Debug for OpenRouterClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenRouterClient")
            .field("name", &self.name)
            .field("api_key", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .finish()
    }
}

impl OpenRouterClient {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let api_key = resolve_api_key(config)?;

        let api_base = config
            .api_base
            .clone()
            .unwrap_or_else(|| default_api_base(&config.provider).to_string());

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DocError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            name: config.provider.clone(),
            api_key: SecretString::from(api_key),
            api_base: api_base.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
            client,
        })
    }

    fn build_request(&self, request: &CompletionRequest) -> ChatCompletionRequest {
        let model = if request.model.is_empty() {
            self.model.clone()
        } else {
            request.model.clone()
        };

        ChatCompletionRequest {
            model,
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: request.prompt.clone(),
                },
            ],
            temperature: self.temperature,
            max_tokens: Some(request.max_tokens),
        }
    }
}

fn default_api_base(provider: &str) -> &'static str {
    match provider {
        "openai" => llm::OPENAI_API_BASE,
        _ => llm::OPENROUTER_API_BASE,
    }
}

#[async_trait]
impl LlmClient for OpenRouterClient {
    async fn complete(&self, request: &CompletionRequest) -> std::result::Result<String, LlmError> {
        let body = self.build_request(request);
        let url = format!("{}/chat/completions", self.api_base);

        debug!(provider = %self.name, model = %body.model, chars = request.prompt.len(), "Sending completion request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.api_key.expose_secret())
            .header("X-Title", env!("CARGO_PKG_NAME"))
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() || e.is_connect() {
                    LlmError::server(format!("request failed: {}", e)).provider(&self.name)
                } else {
                    ErrorClassifier::classify(&e.to_string(), &self.name)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(ErrorClassifier::parse_retry_after);
            let text = response.text().await.unwrap_or_default();
            let mut err = ErrorClassifier::classify_http_status(
                status.as_u16(),
                &format!("HTTP {}: {}", status, text),
                &self.name,
            );
            if let Some(wait) = retry_after {
                err = err.retry_after(wait);
            }
            return Err(err);
        }

        let text = response.text().await.map_err(|e| {
            LlmError::server(format!("failed to read response body: {}", e)).provider(&self.name)
        })?;

        parse_completion(&text, &self.name)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// Extract the completion text from a 2xx response body.
///
/// OpenRouter reports some upstream failures as an `error` object inside a
/// successful response; those are classified like HTTP errors.
fn parse_completion(body: &str, provider: &str) -> std::result::Result<String, LlmError> {
    let parsed: ChatCompletionResponse = serde_json::from_str(body).map_err(|e| {
        LlmError::malformed(format!("unparseable response body: {}", e)).provider(provider)
    })?;

    if let Some(error) = parsed.error {
        let message = error.message.unwrap_or_else(|| "unknown provider error".to_string());
        return Err(match error.code.as_ref().and_then(Value::as_u64) {
            Some(code) => ErrorClassifier::classify_http_status(code as u16, &message, provider),
            None => ErrorClassifier::classify(&message, provider),
        });
    }

    let content = parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .unwrap_or_default();

    if content.trim().is_empty() {
        return Err(LlmError::malformed("empty completion").provider(provider));
    }
    Ok(content)
}

// Request/Response types

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: Option<String>,
    code: Option<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ErrorCategory;

    fn client() -> OpenRouterClient {
        OpenRouterClient::new(&LlmConfig {
            api_key: Some("sk-test".to_string()),
            api_base: Some("http://localhost:9/v1/".to_string()),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_debug_redacts_key() {
        let dbg = format!("{:?}", client());
        assert!(dbg.contains("[REDACTED]"));
        assert!(!dbg.contains("sk-test"));
    }

    #[test]
    fn test_api_base_trailing_slash_trimmed() {
        assert_eq!(client().api_base, "http://localhost:9/v1");
    }

    #[test]
    fn test_default_api_base_per_provider() {
        assert_eq!(default_api_base("openai"), llm::OPENAI_API_BASE);
        assert_eq!(default_api_base("openrouter"), llm::OPENROUTER_API_BASE);
    }

    #[test]
    fn test_request_body() {
        let c = client();
        let body = c.build_request(&CompletionRequest::new("doc this", "", 512));
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["model"], llm::DEFAULT_MODEL);
        assert_eq!(json["max_tokens"], 512);
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "doc this");
    }

    #[test]
    fn test_parse_completion_ok() {
        let body = r##"{"choices":[{"message":{"role":"assistant","content":"# Title"}}]}"##;
        assert_eq!(parse_completion(body, "openrouter").unwrap(), "# Title");
    }

    #[test]
    fn test_parse_completion_empty_is_malformed() {
        let body = r#"{"choices":[{"message":{"content":"  "}}]}"#;
        let err = parse_completion(body, "openrouter").unwrap_err();
        assert_eq!(err.category, ErrorCategory::MalformedResponse);

        let err = parse_completion(r#"{"choices":[]}"#, "openrouter").unwrap_err();
        assert_eq!(err.category, ErrorCategory::MalformedResponse);
    }

    #[test]
    fn test_parse_completion_garbage_is_malformed() {
        let err = parse_completion("<html>oops</html>", "openrouter").unwrap_err();
        assert_eq!(err.category, ErrorCategory::MalformedResponse);
    }

    #[test]
    fn test_parse_completion_embedded_error() {
        let body = r#"{"error":{"message":"No auth credentials found","code":401}}"#;
        let err = parse_completion(body, "openrouter").unwrap_err();
        assert_eq!(err.category, ErrorCategory::Auth);

        let body = r#"{"error":{"message":"upstream overloaded","code":502}}"#;
        let err = parse_completion(body, "openrouter").unwrap_err();
        assert_eq!(err.category, ErrorCategory::Server);
    }
}
