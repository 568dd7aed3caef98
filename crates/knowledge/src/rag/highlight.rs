//! Verbatim highlight extraction.
//!
//! A secondary provider pass that, given a prior answer and one full
//! document, returns a small set of short phrases supporting the answer.
//! Phrases SHOULD be exact substrings of the document. That is asked of
//! the provider by prompt only and is not verified here; callers needing a
//! guaranteed-verbatim match must check containment themselves.
//!
//! This path never errors: one fallback attempt is made against the
//! secondary provider, and a double failure yields an empty list.

use nexus_core::{AppError, AppResult};
use nexus_llm::{ChatClient, ChatMessage, ChatRequest, ResponseFormat};
use serde_json::Value;
use std::sync::Arc;

const PRIMARY_SYSTEM_PROMPT: &str =
    "You are a precision text extraction engine. Return ONLY valid JSON objects.";

const FALLBACK_SYSTEM_PROMPT: &str = "You are a precision text extraction engine. Return ONLY a \
     JSON array of exact verbatim phrases found in the document.";

/// Extracts verbatim supporting phrases from a document.
pub struct HighlightExtractor {
    primary: Arc<dyn ChatClient>,

    /// Fallback provider; `None` when its credentials were not configured.
    fallback: Option<Arc<dyn ChatClient>>,
}

impl HighlightExtractor {
    pub fn new(primary: Arc<dyn ChatClient>, fallback: Option<Arc<dyn ChatClient>>) -> Self {
        Self { primary, fallback }
    }

    /// Find 5-8 short phrases in `document_text` that support `answer`.
    ///
    /// Returns an empty list when both providers fail; that is a valid
    /// non-error outcome meaning "no highlights available".
    pub async fn extract(&self, answer: &str, document_text: &str) -> Vec<String> {
        match self.extract_with_primary(answer, document_text).await {
            Ok(phrases) => {
                tracing::info!(
                    "Extracted {} highlight phrases with {}",
                    phrases.len(),
                    self.primary.provider_name()
                );
                phrases
            }
            Err(primary_err) => {
                tracing::warn!(
                    "Highlight provider '{}' failed: {}",
                    self.primary.provider_name(),
                    primary_err
                );

                let Some(fallback) = &self.fallback else {
                    tracing::warn!("No highlight fallback provider configured");
                    return Vec::new();
                };

                match self.extract_with_fallback(fallback, answer, document_text).await {
                    Ok(phrases) => {
                        tracing::info!(
                            "Extracted {} highlight phrases with {} (fallback)",
                            phrases.len(),
                            fallback.provider_name()
                        );
                        phrases
                    }
                    Err(fallback_err) => {
                        tracing::error!(
                            "Both highlight providers failed; {}: {}; {}: {}",
                            self.primary.provider_name(),
                            primary_err,
                            fallback.provider_name(),
                            fallback_err
                        );
                        Vec::new()
                    }
                }
            }
        }
    }

    async fn extract_with_primary(
        &self,
        answer: &str,
        document_text: &str,
    ) -> AppResult<Vec<String>> {
        let request = ChatRequest::new(vec![
            ChatMessage::system(PRIMARY_SYSTEM_PROMPT),
            ChatMessage::user(build_extraction_prompt(answer, document_text, false)),
        ])
        .with_temperature(0.0)
        .with_response_format(ResponseFormat::JsonObject);

        let response = self.primary.complete(&request).await?;
        parse_highlights(&response.content)
    }

    async fn extract_with_fallback(
        &self,
        fallback: &Arc<dyn ChatClient>,
        answer: &str,
        document_text: &str,
    ) -> AppResult<Vec<String>> {
        let request = ChatRequest::new(vec![
            ChatMessage::system(FALLBACK_SYSTEM_PROMPT),
            ChatMessage::user(build_extraction_prompt(answer, document_text, true)),
        ])
        .with_temperature(0.0)
        .with_response_format(ResponseFormat::JsonStringArray);

        let response = fallback.complete(&request).await?;
        parse_highlights(&response.content)
    }
}

/// Build the extraction prompt.
///
/// Phrases are asked to avoid markdown marker characters so raw-text
/// matching against the document has a chance of succeeding.
fn build_extraction_prompt(answer: &str, document_text: &str, array_shape: bool) -> String {
    let shape_rule = if array_shape {
        "1. Return a JSON array of strings.".to_string()
    } else {
        "1. Return a JSON object with a \"highlights\" key containing an array of strings.\n\
         Format: {\"highlights\": [\"phrase 1\", \"phrase 2\", ...]}"
            .to_string()
    };

    format!(
        "Find 5-8 short, key phrases (3-6 words each) in the DOCUMENT that specifically \
         support the claims in the ANSWER.\n\n\
         STRICT RULES:\n\
         {}\n\
         2. Each string MUST be a LITERALLY EXACT VERBATIM substring from the DOCUMENT.\n\
         3. Choose phrases that do not contain markdown characters like *, #, _ to ensure \
         better matching.\n\
         4. Be extremely precise with capitalization and punctuation.\n\n\
         ANSWER:\n\"{}\"\n\n\
         DOCUMENT:\n\"{}\"",
        shape_rule, answer, document_text
    )
}

/// Parse a provider response into highlight phrases.
///
/// Providers vary slightly in how they shape structured output, so a small
/// closed set of shapes is accepted, tried in priority order:
/// 1. a bare array of strings,
/// 2. an object with a `highlights` array,
/// 3. an object with a `phrases` array,
/// 4. the first array-valued field of an object.
/// An object with no array field yields an empty list; any other JSON value
/// (or unparseable text) is an error, which triggers the fallback provider.
pub(crate) fn parse_highlights(raw: &str) -> AppResult<Vec<String>> {
    let value: Value = serde_json::from_str(raw)
        .map_err(|e| AppError::Llm(format!("Highlight response is not valid JSON: {}", e)))?;

    match value {
        Value::Array(items) => Ok(string_items(items)),
        Value::Object(mut map) => {
            for key in ["highlights", "phrases"] {
                if let Some(Value::Array(items)) = map.remove(key) {
                    return Ok(string_items(items));
                }
            }

            let first_array = map.into_iter().find_map(|(_, v)| match v {
                Value::Array(items) => Some(items),
                _ => None,
            });

            Ok(first_array.map(string_items).unwrap_or_default())
        }
        other => Err(AppError::Llm(format!(
            "Unexpected highlight response shape: {}",
            other
        ))),
    }
}

fn string_items(items: Vec<Value>) -> Vec<String> {
    items
        .into_iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(s),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use nexus_core::AppResult;
    use nexus_llm::{ChatResponse, TokenUsage};

    #[derive(Debug)]
    struct ScriptedClient {
        name: &'static str,
        reply: Option<&'static str>,
    }

    #[async_trait::async_trait]
    impl ChatClient for ScriptedClient {
        fn provider_name(&self) -> &str {
            self.name
        }

        async fn complete(&self, _request: &ChatRequest) -> AppResult<ChatResponse> {
            match self.reply {
                Some(reply) => Ok(ChatResponse {
                    content: reply.to_string(),
                    model: self.name.to_string(),
                    usage: TokenUsage::default(),
                }),
                None => Err(AppError::Llm(format!("{} is down", self.name))),
            }
        }
    }

    fn working(reply: &'static str) -> Arc<dyn ChatClient> {
        Arc::new(ScriptedClient {
            name: "primary",
            reply: Some(reply),
        })
    }

    fn broken() -> Arc<dyn ChatClient> {
        Arc::new(ScriptedClient {
            name: "broken",
            reply: None,
        })
    }

    #[test]
    fn test_parse_bare_array() {
        let phrases = parse_highlights(r#"["25 vacation days", "per year"]"#).unwrap();
        assert_eq!(phrases, vec!["25 vacation days", "per year"]);
    }

    #[test]
    fn test_parse_highlights_key() {
        let phrases = parse_highlights(r#"{"highlights": ["full-time employees"]}"#).unwrap();
        assert_eq!(phrases, vec!["full-time employees"]);
    }

    #[test]
    fn test_parse_phrases_key() {
        let phrases = parse_highlights(r#"{"phrases": ["company VPN"]}"#).unwrap();
        assert_eq!(phrases, vec!["company VPN"]);
    }

    #[test]
    fn test_parse_first_array_field() {
        let phrases = parse_highlights(r#"{"note": "x", "matches": ["remote work"]}"#).unwrap();
        assert_eq!(phrases, vec!["remote work"]);
    }

    #[test]
    fn test_parse_object_without_array_is_empty() {
        let phrases = parse_highlights(r#"{"note": "nothing found"}"#).unwrap();
        assert!(phrases.is_empty());
    }

    #[test]
    fn test_parse_scalar_is_an_error() {
        assert!(parse_highlights(r#""just a string""#).is_err());
        assert!(parse_highlights("not json at all").is_err());
    }

    #[test]
    fn test_parse_skips_non_string_items() {
        let phrases = parse_highlights(r#"["good phrase", 42, null]"#).unwrap();
        assert_eq!(phrases, vec!["good phrase"]);
    }

    #[tokio::test]
    async fn test_extract_with_primary() {
        let extractor = HighlightExtractor::new(
            working(r#"{"highlights": ["25 vacation days per year"]}"#),
            Some(broken()),
        );

        let document = "All employees receive 25 vacation days per year.";
        let phrases = extractor.extract("You get 25 days", document).await;

        assert_eq!(phrases, vec!["25 vacation days per year"]);
        // The extractor itself does not verify this; check it here.
        assert!(phrases.iter().all(|phrase| document.contains(phrase)));
    }

    #[tokio::test]
    async fn test_extract_falls_back_on_primary_failure() {
        let extractor = HighlightExtractor::new(
            broken(),
            Some(working(r#"["25 vacation days per year"]"#)),
        );

        let phrases = extractor.extract("answer", "document").await;
        assert_eq!(phrases, vec!["25 vacation days per year"]);
    }

    #[tokio::test]
    async fn test_extract_empty_when_both_fail() {
        let extractor = HighlightExtractor::new(broken(), Some(broken()));
        let phrases = extractor.extract("answer", "document").await;
        assert!(phrases.is_empty());
    }

    #[tokio::test]
    async fn test_extract_empty_without_fallback() {
        let extractor = HighlightExtractor::new(broken(), None);
        let phrases = extractor.extract("answer", "document").await;
        assert!(phrases.is_empty());
    }
}
