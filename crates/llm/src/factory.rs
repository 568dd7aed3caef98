//! Completion provider factory.
//!
//! Builds [`ChatClient`] instances from configuration. Credential resolution
//! happens here, so a missing API key fails at initialization rather than on
//! the first request.

use crate::client::ChatClient;
use crate::providers::{GeminiClient, OpenAiCompatClient};
use nexus_core::config::{ProviderKind, ProviderSettings};
use nexus_core::AppResult;
use std::sync::Arc;

/// Create a chat client from provider settings.
///
/// # Errors
/// Returns a configuration error if the API key environment variable is
/// not set.
pub fn create_chat_client(settings: &ProviderSettings) -> AppResult<Arc<dyn ChatClient>> {
    let api_key = settings.resolve_api_key()?;

    match settings.kind {
        ProviderKind::OpenAiCompat => {
            let name = provider_label(&settings.api_key_env);
            let client = OpenAiCompatClient::new(
                name,
                settings.base_url.as_deref(),
                settings.model.clone(),
                api_key,
            );
            Ok(Arc::new(client))
        }
        ProviderKind::Gemini => {
            let client = GeminiClient::new(settings.model.clone(), api_key);
            Ok(Arc::new(client))
        }
    }
}

/// Derive a short provider label from its key variable name
/// (`GROQ_API_KEY` -> "groq").
fn provider_label(api_key_env: &str) -> String {
    api_key_env
        .trim_end_matches("_API_KEY")
        .replace('_', "-")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_label() {
        assert_eq!(provider_label("GROQ_API_KEY"), "groq");
        assert_eq!(provider_label("OPENAI_API_KEY"), "openai");
        assert_eq!(provider_label("MY_GATEWAY_API_KEY"), "my-gateway");
    }

    #[test]
    fn test_missing_key_is_config_error() {
        let settings = ProviderSettings {
            kind: ProviderKind::OpenAiCompat,
            model: "gpt-4o-mini".to_string(),
            base_url: None,
            api_key_env: "NEXUS_TEST_UNSET_KEY".to_string(),
        };

        let result = create_chat_client(&settings);
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("NEXUS_TEST_UNSET_KEY"));
    }

    #[test]
    fn test_create_openai_compat_client() {
        std::env::set_var("NEXUS_TEST_FACTORY_KEY", "secret");
        let settings = ProviderSettings {
            kind: ProviderKind::OpenAiCompat,
            model: "openai/gpt-oss-20b".to_string(),
            base_url: Some("https://api.groq.com/openai/v1".to_string()),
            api_key_env: "NEXUS_TEST_FACTORY_KEY".to_string(),
        };

        let client = create_chat_client(&settings).unwrap();
        assert_eq!(client.provider_name(), "nexus-test-factory");
    }
}
