//! Chat client abstraction.

use crate::types::{ChatRequest, ChatResponse};
use nexus_core::AppResult;

/// Trait for completion providers.
///
/// This trait abstracts the underlying provider (Groq, OpenAI, Gemini, ...)
/// behind a uniform completion call. A call either completes or returns an
/// error within the caller-imposed timeout; cancellation is left to the
/// transport boundary.
#[async_trait::async_trait]
pub trait ChatClient: Send + Sync + std::fmt::Debug {
    /// Get the provider name (e.g., "groq", "openai", "gemini").
    fn provider_name(&self) -> &str;

    /// Perform a non-streaming completion.
    async fn complete(&self, request: &ChatRequest) -> AppResult<ChatResponse>;
}
