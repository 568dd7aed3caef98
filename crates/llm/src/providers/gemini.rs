//! Gemini chat completion provider.
//!
//! Serves as the highlight-extraction fallback: when asked for
//! [`ResponseFormat::JsonStringArray`], the request carries a response schema
//! that constrains the model to a bare JSON array of strings.

use crate::client::ChatClient;
use crate::types::{ChatRequest, ChatResponse, ChatRole, ResponseFormat, TokenUsage};
use nexus_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use serde_json::json;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Wire format of a `generateContent` request.
#[derive(Debug, Serialize)]
struct GenerateRequest {
    #[serde(rename = "systemInstruction", skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    contents: Vec<Content>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    generation_config: Option<serde_json::Value>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

/// Wire format of a `generateContent` response.
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}

/// Chat client for Google Gemini.
#[derive(Debug)]
pub struct GeminiClient {
    base_url: String,
    model: String,
    api_key: String,
    client: reqwest::Client,
}

impl GeminiClient {
    pub fn new(model: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: model.into(),
            api_key: api_key.into(),
            client: reqwest::Client::new(),
        }
    }

    fn to_wire_request(&self, request: &ChatRequest) -> GenerateRequest {
        // Gemini keeps the system instruction out of the turn list and names
        // the assistant role "model".
        let mut system_parts = Vec::new();
        let mut contents = Vec::new();

        for message in &request.messages {
            match message.role {
                ChatRole::System => system_parts.push(Part {
                    text: message.content.clone(),
                }),
                ChatRole::User => contents.push(Content {
                    role: Some("user".to_string()),
                    parts: vec![Part {
                        text: message.content.clone(),
                    }],
                }),
                ChatRole::Assistant => contents.push(Content {
                    role: Some("model".to_string()),
                    parts: vec![Part {
                        text: message.content.clone(),
                    }],
                }),
            }
        }

        let mut generation_config = serde_json::Map::new();
        if let Some(temperature) = request.temperature {
            generation_config.insert("temperature".to_string(), json!(temperature));
        }
        if let Some(max_tokens) = request.max_tokens {
            generation_config.insert("maxOutputTokens".to_string(), json!(max_tokens));
        }
        match request.response_format {
            ResponseFormat::Text => {}
            ResponseFormat::JsonObject => {
                generation_config
                    .insert("responseMimeType".to_string(), json!("application/json"));
            }
            ResponseFormat::JsonStringArray => {
                generation_config
                    .insert("responseMimeType".to_string(), json!("application/json"));
                generation_config.insert(
                    "responseSchema".to_string(),
                    json!({"type": "ARRAY", "items": {"type": "STRING"}}),
                );
            }
        }

        GenerateRequest {
            system_instruction: if system_parts.is_empty() {
                None
            } else {
                Some(Content {
                    role: None,
                    parts: system_parts,
                })
            },
            contents,
            generation_config: if generation_config.is_empty() {
                None
            } else {
                Some(serde_json::Value::Object(generation_config))
            },
        }
    }
}

#[async_trait::async_trait]
impl ChatClient for GeminiClient {
    fn provider_name(&self) -> &str {
        "gemini"
    }

    async fn complete(&self, request: &ChatRequest) -> AppResult<ChatResponse> {
        tracing::debug!(model = %self.model, "Sending generateContent request to Gemini");

        let wire_request = self.to_wire_request(request);
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );

        let response = self
            .client
            .post(&url)
            .json(&wire_request)
            .send()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to send request to Gemini: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Llm(format!(
                "Gemini API error ({}): {}",
                status, error_text
            )));
        }

        let generated: GenerateResponse = response
            .json()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to parse Gemini response: {}", e)))?;

        let content = generated
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content.parts.into_iter().next())
            .map(|part| part.text)
            .ok_or_else(|| AppError::Llm("Gemini returned no candidates".to_string()))?;

        tracing::debug!("Received Gemini completion");

        Ok(ChatResponse {
            content,
            model: self.model.clone(),
            usage: TokenUsage::default(),
        })
    }
}
