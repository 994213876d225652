//! Unified Error Type System
//!
//! Centralized error types for the documentation pipeline.
//! LLM failures carry a category used for retry and abort decisions.
//!
//! ## Error Categories
//!
//! - **Auth**: Bad or missing credential (fatal, aborts the run)
//! - **RateLimit**: Provider throttling (wait and retry)
//! - **Server**: Provider or transport failure (retry with backoff)
//! - **MalformedResponse**: Unusable completion (fail the call)
//! - **BadRequest**: Request rejected as invalid (fail the call)
//!
//! Non-fatal conditions (skipped files, degraded extraction, failed tasks)
//! are not errors here; they are collected as report values instead.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

// =============================================================================
// Error Categories
// =============================================================================

/// LLM error categories for retry and abort routing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Credential rejected or missing - abort the whole run
    Auth,
    /// Rate limited - wait then retry
    RateLimit,
    /// Server-side or transport failure - retry with backoff
    Server,
    /// Response could not be used - fail this call
    MalformedResponse,
    /// Request rejected by the provider - fail this call
    BadRequest,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Auth => write!(f, "AUTH"),
            Self::RateLimit => write!(f, "RATE_LIMIT"),
            Self::Server => write!(f, "SERVER"),
            Self::MalformedResponse => write!(f, "MALFORMED_RESPONSE"),
            Self::BadRequest => write!(f, "BAD_REQUEST"),
        }
    }
}

impl ErrorCategory {
    /// Check if this category may succeed when the same call is retried
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimit | Self::Server)
    }

    /// Check if this category must stop the entire run
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Auth)
    }
}

// =============================================================================
// LLM Error
// =============================================================================

/// LLM error with category, context, and retry hints
#[derive(Debug, Clone, PartialEq)]
pub struct LlmError {
    /// Error category for routing decisions
    pub category: ErrorCategory,
    /// Detailed error message
    pub message: String,
    /// Client that produced the error
    pub provider: Option<String>,
    /// Suggested wait time before retry (if the provider sent one)
    pub retry_after: Option<Duration>,
}

impl std::fmt::Display for LlmError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(provider) = &self.provider {
            write!(f, "[{}:{}] {}", provider, self.category, self.message)
        } else {
            write!(f, "[{}] {}", self.category, self.message)
        }
    }
}

impl std::error::Error for LlmError {}

impl LlmError {
    pub fn new(category: ErrorCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
            provider: None,
            retry_after: None,
        }
    }

    pub fn with_provider(
        category: ErrorCategory,
        message: impl Into<String>,
        provider: impl Into<String>,
    ) -> Self {
        Self {
            category,
            message: message.into(),
            provider: Some(provider.into()),
            retry_after: None,
        }
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Auth, message)
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::RateLimit, message)
    }

    pub fn server(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Server, message)
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::MalformedResponse, message)
    }

    /// Add provider context to existing error
    pub fn provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// Add suggested retry delay
    pub fn retry_after(mut self, duration: Duration) -> Self {
        self.retry_after = Some(duration);
        self
    }

    pub fn is_retryable(&self) -> bool {
        self.category.is_retryable()
    }

    pub fn is_fatal(&self) -> bool {
        self.category.is_fatal()
    }
}

// =============================================================================
// Error Classifier
// =============================================================================

/// Maps raw provider failures onto [`ErrorCategory`]
pub struct ErrorClassifier;

impl ErrorClassifier {
    /// Classify a transport-level error message
    pub fn classify(message: &str, provider: &str) -> LlmError {
        let lower = message.to_lowercase();

        if lower.contains("rate limit")
            || lower.contains("429")
            || lower.contains("too many requests")
            || lower.contains("quota exceeded")
        {
            return LlmError::with_provider(ErrorCategory::RateLimit, message, provider)
                .retry_after(Duration::from_secs(30));
        }

        if lower.contains("401")
            || lower.contains("403")
            || lower.contains("api key")
            || lower.contains("invalid key")
            || lower.contains("unauthorized")
            || lower.contains("authentication")
        {
            return LlmError::with_provider(ErrorCategory::Auth, message, provider);
        }

        if lower.contains("parse")
            || lower.contains("json")
            || lower.contains("unexpected token")
            || lower.contains("empty response")
        {
            return LlmError::with_provider(ErrorCategory::MalformedResponse, message, provider);
        }

        if lower.contains("400") || lower.contains("bad request") {
            return LlmError::with_provider(ErrorCategory::BadRequest, message, provider);
        }

        // Network failures, timeouts, 5xx and anything unrecognized are treated
        // as transient server trouble.
        LlmError::with_provider(ErrorCategory::Server, message, provider)
    }

    /// Classify HTTP status code directly (more accurate than string matching)
    pub fn classify_http_status(status: u16, message: &str, provider: &str) -> LlmError {
        match status {
            429 => LlmError::with_provider(ErrorCategory::RateLimit, message, provider)
                .retry_after(Duration::from_secs(30)),
            401 | 403 => LlmError::with_provider(ErrorCategory::Auth, message, provider),
            400 | 404 | 413 | 422 => {
                LlmError::with_provider(ErrorCategory::BadRequest, message, provider)
            }
            408 | 500..=599 => LlmError::with_provider(ErrorCategory::Server, message, provider)
                .retry_after(Duration::from_secs(5)),
            _ => LlmError::with_provider(ErrorCategory::Server, message, provider),
        }
    }

    /// Parse a `Retry-After` header value given in seconds
    pub fn parse_retry_after(value: &str) -> Option<Duration> {
        value
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|secs| secs.is_finite() && *secs >= 0.0)
            .map(Duration::from_secs_f64)
    }
}

// =============================================================================
// Application Error
// =============================================================================

/// Errors that stop a run. Anything recoverable is reported, not returned.
#[derive(Debug, Error)]
pub enum DocError {
    // -------------------------------------------------------------------------
    // System Errors (auto From impl)
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // -------------------------------------------------------------------------
    // Preflight Errors
    // -------------------------------------------------------------------------
    #[error("Config error: {0}")]
    Config(String),

    #[error("Missing credential: {0}")]
    MissingCredential(String),

    #[error("Repository not found or not a directory: {}", .0.display())]
    RepositoryNotFound(PathBuf),

    #[error("Output directory {} is not writable: {reason}", path.display())]
    OutputNotWritable { path: PathBuf, reason: String },

    // -------------------------------------------------------------------------
    // LLM Errors
    // -------------------------------------------------------------------------
    #[error("LLM error: {0}")]
    Llm(LlmError),

    #[error("Run aborted: {reason}")]
    Aborted { reason: String },

    // -------------------------------------------------------------------------
    // Output Errors
    // -------------------------------------------------------------------------
    #[error("Site generation failed: {0}")]
    Site(String),
}

impl From<LlmError> for DocError {
    fn from(err: LlmError) -> Self {
        DocError::Llm(err)
    }
}

pub type Result<T> = std::result::Result<T, DocError>;

impl DocError {
    pub fn aborted(reason: impl Into<String>) -> Self {
        Self::Aborted {
            reason: reason.into(),
        }
    }

    pub fn output_not_writable(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::OutputNotWritable {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// True for the credential failures that abort before or during a run
    pub fn is_auth_failure(&self) -> bool {
        match self {
            // the orchestrator only aborts on rejected credentials
            Self::MissingCredential(_) | Self::Aborted { .. } => true,
            Self::Llm(e) => e.is_fatal(),
            _ => false,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_category_display() {
        assert_eq!(ErrorCategory::RateLimit.to_string(), "RATE_LIMIT");
        assert_eq!(ErrorCategory::Auth.to_string(), "AUTH");
        assert_eq!(
            ErrorCategory::MalformedResponse.to_string(),
            "MALFORMED_RESPONSE"
        );
    }

    #[test]
    fn test_error_category_retryable() {
        assert!(ErrorCategory::RateLimit.is_retryable());
        assert!(ErrorCategory::Server.is_retryable());
        assert!(!ErrorCategory::Auth.is_retryable());
        assert!(!ErrorCategory::MalformedResponse.is_retryable());
        assert!(!ErrorCategory::BadRequest.is_retryable());
    }

    #[test]
    fn test_only_auth_is_fatal() {
        assert!(ErrorCategory::Auth.is_fatal());
        assert!(!ErrorCategory::RateLimit.is_fatal());
        assert!(!ErrorCategory::Server.is_fatal());
    }

    #[test]
    fn test_classify_rate_limit() {
        let err = ErrorClassifier::classify("Rate limit exceeded, please retry", "openrouter");
        assert_eq!(err.category, ErrorCategory::RateLimit);
        assert_eq!(err.retry_after, Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_classify_auth() {
        let err = ErrorClassifier::classify("Invalid API key provided", "openrouter");
        assert_eq!(err.category, ErrorCategory::Auth);
        assert!(err.is_fatal());
    }

    #[test]
    fn test_classify_unknown_defaults_to_server() {
        let err = ErrorClassifier::classify("connection reset by peer", "openrouter");
        assert_eq!(err.category, ErrorCategory::Server);
        assert!(err.is_retryable());
    }

    #[test]
    fn test_classify_http_status() {
        assert_eq!(
            ErrorClassifier::classify_http_status(429, "slow down", "x").category,
            ErrorCategory::RateLimit
        );
        assert_eq!(
            ErrorClassifier::classify_http_status(401, "no", "x").category,
            ErrorCategory::Auth
        );
        assert_eq!(
            ErrorClassifier::classify_http_status(403, "no", "x").category,
            ErrorCategory::Auth
        );
        assert_eq!(
            ErrorClassifier::classify_http_status(503, "down", "x").category,
            ErrorCategory::Server
        );
        assert_eq!(
            ErrorClassifier::classify_http_status(400, "bad", "x").category,
            ErrorCategory::BadRequest
        );
    }

    #[test]
    fn test_parse_retry_after() {
        assert_eq!(
            ErrorClassifier::parse_retry_after("12"),
            Some(Duration::from_secs(12))
        );
        assert_eq!(
            ErrorClassifier::parse_retry_after(" 1.5 "),
            Some(Duration::from_millis(1500))
        );
        assert_eq!(ErrorClassifier::parse_retry_after("soon"), None);
        assert_eq!(ErrorClassifier::parse_retry_after("-3"), None);
    }

    #[test]
    fn test_llm_error_display() {
        let err = LlmError::rate_limited("slow down").provider("openrouter");
        assert_eq!(err.to_string(), "[openrouter:RATE_LIMIT] slow down");

        let err = LlmError::server("boom");
        assert_eq!(err.to_string(), "[SERVER] boom");
    }

    #[test]
    fn test_doc_error_auth_detection() {
        assert!(DocError::MissingCredential("OPENROUTER_API_KEY".into()).is_auth_failure());
        assert!(DocError::Llm(LlmError::auth("bad key")).is_auth_failure());
        assert!(!DocError::Llm(LlmError::server("boom")).is_auth_failure());
        assert!(!DocError::Config("x".into()).is_auth_failure());
        assert!(DocError::aborted("authentication failed").is_auth_failure());
    }
}
