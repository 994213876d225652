//! Per-call retry policy
//!
//! Rate-limit and server errors are retried with exponential backoff plus
//! random jitter, honouring a provider `retry_after` hint when present.
//! Auth, malformed and bad-request errors return immediately; a blank
//! completion is malformed whatever the client. Every attempt
//! runs under its own timeout; an elapsed timeout counts as a server error.

use std::time::Duration;

use rand::Rng;
use tokio::time::{sleep, timeout};
use tracing::{debug, info, warn};

use super::client::{CompletionRequest, LlmClient};
use crate::config::LlmConfig;
use crate::constants::retry as retry_constants;
use crate::types::{ErrorCategory, LlmError};

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub backoff_factor: f32,
    /// Upper bound for a single attempt
    pub call_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&LlmConfig::default())
    }
}

impl RetryPolicy {
    pub fn from_config(config: &LlmConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            base_delay: Duration::from_millis(config.base_delay_ms),
            max_delay: Duration::from_secs(config.max_delay_secs),
            backoff_factor: retry_constants::BACKOFF_FACTOR,
            call_timeout: Duration::from_secs(config.timeout_secs),
        }
    }
}

/// Result of one logical call plus the number of attempts it took
#[derive(Debug)]
pub struct RetryOutcome {
    pub result: Result<String, LlmError>,
    pub attempts: u32,
}

/// Run `request` against `client` under `policy`.
///
/// Only the calling task sleeps between attempts; other workers are unaffected.
pub async fn complete_with_retry(
    client: &dyn LlmClient,
    request: &CompletionRequest,
    policy: &RetryPolicy,
) -> RetryOutcome {
    let mut current_delay = policy.base_delay;
    let mut attempt = 0;

    loop {
        attempt += 1;

        let result = match timeout(policy.call_timeout, client.complete(request)).await {
            Ok(result) => result,
            Err(_) => Err(LlmError::server(format!(
                "call timed out after {:?}",
                policy.call_timeout
            ))
            .provider(client.name())),
        };

        let err = match result {
            Ok(text) if text.trim().is_empty() => {
                LlmError::malformed("empty completion").provider(client.name())
            }
            Ok(text) => {
                if attempt > 1 {
                    debug!(attempt, "Call succeeded after retry");
                }
                return RetryOutcome {
                    result: Ok(text),
                    attempts: attempt,
                };
            }
            Err(err) => err,
        };

        if !err.is_retryable() || attempt >= policy.max_attempts {
            if err.is_retryable() {
                warn!(attempts = attempt, error = %err, "Retry budget exhausted");
            }
            return RetryOutcome {
                result: Err(err),
                attempts: attempt,
            };
        }

        let wait = match err.category {
            ErrorCategory::RateLimit => {
                let wait = err
                    .retry_after
                    .unwrap_or_else(|| current_delay + random_jitter(current_delay))
                    .min(policy.max_delay);
                info!(wait_ms = wait.as_millis() as u64, attempt, "Rate limited, waiting before retry");
                wait
            }
            _ => {
                let wait = current_delay + random_jitter(current_delay);
                debug!(wait_ms = wait.as_millis() as u64, attempt, error = %err, "Retrying after backoff");
                wait
            }
        };

        sleep(wait).await;
        current_delay = calculate_backoff(current_delay, policy.backoff_factor, policy.max_delay);
    }
}

/// Up to a quarter of `base_delay`
fn random_jitter(base_delay: Duration) -> Duration {
    let max_jitter_ms = (base_delay.as_millis() as u64) / 4;
    if max_jitter_ms == 0 {
        return Duration::ZERO;
    }
    Duration::from_millis(rand::rng().random_range(0..max_jitter_ms))
}

/// Exponential backoff with cap
fn calculate_backoff(current: Duration, factor: f32, max: Duration) -> Duration {
    let next = Duration::from_secs_f32(current.as_secs_f32() * factor);
    std::cmp::min(next, max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Fails with the queued errors, then succeeds
    struct ScriptedClient {
        failures: Mutex<Vec<LlmError>>,
        calls: AtomicU32,
    }

    impl ScriptedClient {
        fn new(mut failures: Vec<LlmError>) -> Self {
            failures.reverse();
            Self {
                failures: Mutex::new(failures),
                calls: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl LlmClient for ScriptedClient {
        async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.failures.lock().unwrap().pop() {
                Some(err) => Err(err),
                None => Ok(format!("ok: {}", request.prompt)),
            }
        }

        fn name(&self) -> &str {
            "scripted"
        }

        fn model(&self) -> &str {
            "mock-model"
        }
    }

    struct SlowClient;

    #[async_trait]
    impl LlmClient for SlowClient {
        async fn complete(&self, _request: &CompletionRequest) -> Result<String, LlmError> {
            sleep(Duration::from_secs(5)).await;
            Ok("late".to_string())
        }

        fn name(&self) -> &str {
            "slow"
        }

        fn model(&self) -> &str {
            "mock-model"
        }
    }

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(5),
            backoff_factor: 2.0,
            call_timeout: Duration::from_secs(5),
        }
    }

    fn request() -> CompletionRequest {
        CompletionRequest::new("p", "m", 10)
    }

    #[tokio::test]
    async fn test_rate_limit_twice_then_success() {
        let client = ScriptedClient::new(vec![
            LlmError::rate_limited("slow down"),
            LlmError::rate_limited("slow down"),
        ]);
        let outcome = complete_with_retry(&client, &request(), &fast_policy(3)).await;

        assert_eq!(outcome.result.unwrap(), "ok: p");
        assert_eq!(outcome.attempts, 3);
        assert_eq!(client.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_after_hint_is_capped() {
        let client = ScriptedClient::new(vec![
            LlmError::rate_limited("wait").retry_after(Duration::from_secs(3600)),
        ]);
        let started = std::time::Instant::now();
        let outcome = complete_with_retry(&client, &request(), &fast_policy(2)).await;

        assert!(outcome.result.is_ok());
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_server_errors_exhaust_budget() {
        let client = ScriptedClient::new(vec![
            LlmError::server("502"),
            LlmError::server("502"),
            LlmError::server("502"),
        ]);
        let outcome = complete_with_retry(&client, &request(), &fast_policy(3)).await;

        assert_eq!(outcome.result.unwrap_err().category, ErrorCategory::Server);
        assert_eq!(outcome.attempts, 3);
    }

    struct BlankClient {
        calls: AtomicU32,
    }

    #[async_trait]
    impl LlmClient for BlankClient {
        async fn complete(&self, _request: &CompletionRequest) -> Result<String, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok("   \n".to_string())
        }

        fn name(&self) -> &str {
            "blank"
        }

        fn model(&self) -> &str {
            "mock-model"
        }
    }

    #[tokio::test]
    async fn test_blank_completion_is_malformed() {
        let client = BlankClient {
            calls: AtomicU32::new(0),
        };
        let outcome = complete_with_retry(&client, &request(), &fast_policy(3)).await;

        let err = outcome.result.unwrap_err();
        assert_eq!(err.category, ErrorCategory::MalformedResponse);
        assert_eq!(err.provider.as_deref(), Some("blank"));
        assert_eq!(outcome.attempts, 1);
        assert_eq!(client.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_malformed_fails_immediately() {
        let client = ScriptedClient::new(vec![LlmError::malformed("empty completion")]);
        let outcome = complete_with_retry(&client, &request(), &fast_policy(3)).await;

        assert_eq!(
            outcome.result.unwrap_err().category,
            ErrorCategory::MalformedResponse
        );
        assert_eq!(outcome.attempts, 1);
    }

    #[tokio::test]
    async fn test_auth_not_retried() {
        let client = ScriptedClient::new(vec![LlmError::auth("bad key")]);
        let outcome = complete_with_retry(&client, &request(), &fast_policy(3)).await;

        assert!(outcome.result.unwrap_err().is_fatal());
        assert_eq!(client.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_timeout_counts_as_server_error() {
        let policy = RetryPolicy {
            call_timeout: Duration::from_millis(20),
            ..fast_policy(2)
        };
        let outcome = complete_with_retry(&SlowClient, &request(), &policy).await;

        let err = outcome.result.unwrap_err();
        assert_eq!(err.category, ErrorCategory::Server);
        assert!(err.message.contains("timed out"));
        assert_eq!(outcome.attempts, 2);
    }

    #[test]
    fn test_random_jitter() {
        let base = Duration::from_millis(1000);
        assert!(random_jitter(base) <= Duration::from_millis(250));
        assert_eq!(random_jitter(Duration::from_millis(3)), Duration::ZERO);
    }

    #[test]
    fn test_calculate_backoff() {
        let next = calculate_backoff(Duration::from_secs(1), 2.0, Duration::from_secs(30));
        assert_eq!(next, Duration::from_secs(2));

        let capped = calculate_backoff(Duration::from_secs(20), 2.0, Duration::from_secs(30));
        assert_eq!(capped, Duration::from_secs(30));
    }

    #[test]
    fn test_policy_from_config() {
        let config = LlmConfig {
            max_attempts: 0,
            ..Default::default()
        };
        let policy = RetryPolicy::from_config(&config);
        assert_eq!(policy.max_attempts, 1);
        assert_eq!(policy.call_timeout, Duration::from_secs(config.timeout_secs));
    }
}
