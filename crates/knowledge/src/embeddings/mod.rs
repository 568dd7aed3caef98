//! Embedding provider trait and factory.
//!
//! One fixed model identity per provider instance. An index built with one
//! embedding model must be queried with the same model; mixing models
//! invalidates similarity scores. That contract is documented here and
//! recorded in the index metadata, not enforced automatically.

pub mod providers;

use nexus_core::config::EmbeddingSettings;
use nexus_core::{AppError, AppResult};
use std::sync::Arc;

pub use providers::openai::OpenAiEmbeddings;
pub use providers::trigram::TrigramEmbeddings;

/// Trait for embedding providers.
#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync + std::fmt::Debug {
    /// Get provider name (e.g., "openai", "trigram")
    fn provider_name(&self) -> &str;

    /// Get model identifier
    fn model_name(&self) -> &str;

    /// Get embedding dimensionality
    fn dimensions(&self) -> usize;

    /// Generate embeddings for multiple texts in a batch.
    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>>;

    /// Generate embedding for a single text (convenience method).
    async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        let mut results = self.embed_batch(&[text.to_string()]).await?;
        results
            .pop()
            .ok_or_else(|| AppError::Llm("No embedding returned".to_string()))
    }
}

/// Create an embedding provider based on configuration.
pub fn create_provider(settings: &EmbeddingSettings) -> AppResult<Arc<dyn EmbeddingProvider>> {
    match settings.provider.as_str() {
        "openai" => {
            let api_key = std::env::var(&settings.api_key_env).map_err(|_| {
                AppError::Config(format!(
                    "API key not found in environment variable: {}",
                    settings.api_key_env
                ))
            })?;
            let provider = OpenAiEmbeddings::new(
                settings.base_url.as_deref(),
                settings.model.clone(),
                settings.dimensions,
                api_key,
            );
            Ok(Arc::new(provider))
        }

        "trigram" => {
            let provider = TrigramEmbeddings::new(settings.dimensions);
            Ok(Arc::new(provider))
        }

        other => Err(AppError::Config(format!(
            "Unknown embedding provider: '{}'. Supported providers: openai, trigram",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_trigram_provider() {
        let settings = EmbeddingSettings {
            provider: "trigram".to_string(),
            model: "trigram-v1".to_string(),
            dimensions: 256,
            base_url: None,
            api_key_env: "UNUSED".to_string(),
        };

        let provider = create_provider(&settings).unwrap();
        assert_eq!(provider.provider_name(), "trigram");
        assert_eq!(provider.dimensions(), 256);
    }

    #[test]
    fn test_create_unknown_provider() {
        let settings = EmbeddingSettings {
            provider: "unknown".to_string(),
            ..EmbeddingSettings::default()
        };

        let result = create_provider(&settings);
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Unknown embedding provider"));
    }

    #[tokio::test]
    async fn test_provider_embed_single() {
        let provider = TrigramEmbeddings::new(128);
        let embedding = provider.embed("handbook text").await.unwrap();
        assert_eq!(embedding.len(), 128);
    }
}
