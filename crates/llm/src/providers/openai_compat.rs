//! OpenAI-compatible chat completion provider.
//!
//! Speaks the `/chat/completions` protocol and therefore covers both OpenAI
//! itself and Groq (which exposes the same surface under its own base URL).

use crate::client::ChatClient;
use crate::types::{ChatMessage, ChatRequest, ChatResponse, ResponseFormat, TokenUsage};
use nexus_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Wire format of a chat completion request.
#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormatSpec>,
}

#[derive(Debug, Serialize)]
struct ResponseFormatSpec {
    #[serde(rename = "type")]
    kind: &'static str,
}

/// Wire format of a chat completion response.
#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    model: Option<String>,
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<TokenUsage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Chat client for OpenAI-compatible endpoints.
#[derive(Debug)]
pub struct OpenAiCompatClient {
    /// Short provider label used in logs and combined errors.
    name: String,

    /// Base URL of the API (e.g., `https://api.groq.com/openai/v1`).
    base_url: String,

    /// Model identifier sent with every request.
    model: String,

    /// Bearer token.
    api_key: String,

    /// HTTP client
    client: reqwest::Client,
}

impl OpenAiCompatClient {
    /// Create a new client against the given endpoint.
    ///
    /// `base_url` of `None` targets OpenAI's public API.
    pub fn new(
        name: impl Into<String>,
        base_url: Option<&str>,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.unwrap_or(DEFAULT_BASE_URL).trim_end_matches('/').to_string(),
            model: model.into(),
            api_key: api_key.into(),
            client: reqwest::Client::new(),
        }
    }

    fn to_wire_request<'a>(&'a self, request: &'a ChatRequest) -> CompletionRequest<'a> {
        // Both structured shapes map to the provider's JSON mode; the array
        // shape is enforced by the prompt on this protocol.
        let response_format = match request.response_format {
            ResponseFormat::Text => None,
            ResponseFormat::JsonObject | ResponseFormat::JsonStringArray => {
                Some(ResponseFormatSpec { kind: "json_object" })
            }
        };

        CompletionRequest {
            model: &self.model,
            messages: &request.messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            response_format,
        }
    }
}

#[async_trait::async_trait]
impl ChatClient for OpenAiCompatClient {
    fn provider_name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, request: &ChatRequest) -> AppResult<ChatResponse> {
        tracing::debug!(provider = %self.name, model = %self.model, "Sending completion request");

        let wire_request = self.to_wire_request(request);
        let url = format!("{}/chat/completions", self.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&wire_request)
            .send()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to send request to {}: {}", self.name, e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Llm(format!(
                "{} API error ({}): {}",
                self.name, status, error_text
            )));
        }

        let completion: CompletionResponse = response
            .json()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to parse {} response: {}", self.name, e)))?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                AppError::Llm(format!("{} returned a completion with no content", self.name))
            })?;

        tracing::debug!(provider = %self.name, "Received completion");

        Ok(ChatResponse {
            content,
            model: completion.model.unwrap_or_else(|| self.model.clone()),
            usage: completion.usage.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = OpenAiCompatClient::new(
            "groq",
            Some("https://api.groq.com/openai/v1/"),
            "openai/gpt-oss-20b",
            "key",
        );
        assert_eq!(client.provider_name(), "groq");
        assert_eq!(client.base_url, "https://api.groq.com/openai/v1");
    }

    #[test]
    fn test_default_base_url() {
        let client = OpenAiCompatClient::new("openai", None, "gpt-4o-mini", "key");
        assert_eq!(client.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_wire_request_json_mode() {
        let client = OpenAiCompatClient::new("groq", None, "m", "key");
        let request = ChatRequest::new(vec![ChatMessage::user("hi")])
            .with_temperature(0.0)
            .with_response_format(ResponseFormat::JsonObject);

        let wire = client.to_wire_request(&request);
        let body = serde_json::to_value(&wire).unwrap();

        assert_eq!(body["model"], "m");
        assert_eq!(body["temperature"], 0.0);
        assert_eq!(body["response_format"]["type"], "json_object");
        assert_eq!(body["messages"][0]["role"], "user");
    }

    #[test]
    fn test_wire_request_text_omits_format() {
        let client = OpenAiCompatClient::new("groq", None, "m", "key");
        let request = ChatRequest::new(vec![ChatMessage::user("hi")]);

        let wire = client.to_wire_request(&request);
        let body = serde_json::to_value(&wire).unwrap();

        assert!(body.get("response_format").is_none());
        assert!(body.get("max_tokens").is_none());
    }

    #[test]
    fn test_parse_completion_response() {
        let raw = r#"{
            "model": "openai/gpt-oss-20b",
            "choices": [{"message": {"role": "assistant", "content": "answer text"}}],
            "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
        }"#;

        let parsed: CompletionResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.choices[0].message.content.as_deref(), Some("answer text"));
        assert_eq!(parsed.usage.as_ref().unwrap().total_tokens, 15);
    }
}
