//! Primary/fallback completion strategy.
//!
//! Generation and highlighting both run a primary provider with exactly one
//! fallback attempt against a secondary provider. The strategy is a plain
//! value over two fallible operations: no retries, no backoff, and a failure
//! of both is terminal for the request, reported with both causes.

use crate::client::ChatClient;
use crate::types::{ChatRequest, ChatResponse};
use nexus_core::AppError;
use std::sync::Arc;
use thiserror::Error;

/// Terminal failure of a fallback chain: both providers failed.
#[derive(Debug, Error)]
#[error("both providers failed; {primary_provider}: {primary}; {secondary_provider} (fallback): {secondary}")]
pub struct FallbackError {
    pub primary_provider: String,
    pub primary: AppError,
    pub secondary_provider: String,
    pub secondary: AppError,
}

impl From<FallbackError> for AppError {
    fn from(err: FallbackError) -> Self {
        AppError::Llm(err.to_string())
    }
}

/// A primary provider paired with a secondary fallback.
#[derive(Clone)]
pub struct FallbackChain {
    primary: Arc<dyn ChatClient>,
    secondary: Arc<dyn ChatClient>,
}

impl FallbackChain {
    pub fn new(primary: Arc<dyn ChatClient>, secondary: Arc<dyn ChatClient>) -> Self {
        Self { primary, secondary }
    }

    /// Run the request against the primary provider, falling back to the
    /// secondary on any provider-level failure.
    pub async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, FallbackError> {
        match self.primary.complete(request).await {
            Ok(response) => {
                tracing::debug!(provider = self.primary.provider_name(), "Completion succeeded");
                Ok(response)
            }
            Err(primary_err) => {
                tracing::warn!(
                    "Provider '{}' failed, falling back to '{}': {}",
                    self.primary.provider_name(),
                    self.secondary.provider_name(),
                    primary_err
                );

                match self.secondary.complete(request).await {
                    Ok(response) => {
                        tracing::info!(
                            provider = self.secondary.provider_name(),
                            "Fallback completion succeeded"
                        );
                        Ok(response)
                    }
                    Err(secondary_err) => {
                        tracing::error!(
                            "Fallback provider '{}' also failed: {}",
                            self.secondary.provider_name(),
                            secondary_err
                        );
                        Err(FallbackError {
                            primary_provider: self.primary.provider_name().to_string(),
                            primary: primary_err,
                            secondary_provider: self.secondary.provider_name().to_string(),
                            secondary: secondary_err,
                        })
                    }
                }
            }
        }
    }
}
