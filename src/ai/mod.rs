//! AI Integration Layer
//!
//! Text-completion client, per-call retry policy and prompt construction.

pub mod client;
pub mod prompt;
pub mod retry;

pub use client::{CompletionRequest, LlmClient, OpenRouterClient, SharedClient, create_client};
pub use prompt::{PromptBuilder, PromptSection, PromptTemplates, truncate_chars};
pub use retry::{RetryOutcome, RetryPolicy, complete_with_retry};
