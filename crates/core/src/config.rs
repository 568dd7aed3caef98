//! Configuration management for the Nexus handbook assistant.
//!
//! Configuration is environment-driven with built-in defaults, merged with
//! command-line overrides. Provider credentials are referenced by the name
//! of the environment variable that holds them and resolved lazily, so the
//! config itself never stores secrets.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{AppError, AppResult};

/// Default location of the handbook corpus, relative to the working directory.
const DEFAULT_CORPUS_DIR: &str = "data/handbook";

/// Default location of the persisted vector index.
const DEFAULT_INDEX_PATH: &str = "data/index/nexus.db";

/// Kind of completion provider behind a [`ProviderSettings`] entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProviderKind {
    /// Any endpoint speaking the OpenAI chat-completions protocol
    /// (OpenAI itself, Groq, and compatible gateways).
    OpenAiCompat,
    /// Google Gemini `generateContent` protocol.
    Gemini,
}

/// Settings for a single completion provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSettings {
    pub kind: ProviderKind,

    /// Model identifier as the provider expects it.
    pub model: String,

    /// Base URL for OpenAI-compatible endpoints. Ignored for Gemini.
    pub base_url: Option<String>,

    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
}

impl ProviderSettings {
    /// Resolve the API key from the environment.
    pub fn resolve_api_key(&self) -> AppResult<String> {
        std::env::var(&self.api_key_env).map_err(|_| {
            AppError::Config(format!(
                "API key not found in environment variable: {}",
                self.api_key_env
            ))
        })
    }
}

/// Settings for the embedding provider.
///
/// The embedding model is a compatibility contract with the persisted index:
/// an index built with one model must be queried with the same model, or
/// similarity scores are meaningless.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingSettings {
    /// Provider identifier: "openai" or "trigram" (deterministic, offline).
    pub provider: String,

    /// Embedding model identifier.
    pub model: String,

    /// Embedding vector dimensionality.
    pub dimensions: usize,

    /// Base URL for the OpenAI embeddings endpoint.
    pub base_url: Option<String>,

    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "text-embedding-3-large".to_string(),
            dimensions: 3072,
            base_url: None,
            api_key_env: "OPENAI_API_KEY".to_string(),
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Root directory of the handbook corpus.
    pub corpus_dir: PathBuf,

    /// Path of the persisted vector index.
    pub index_path: PathBuf,

    /// Primary completion provider for answer generation.
    pub generation_primary: ProviderSettings,

    /// Fallback completion provider for answer generation.
    pub generation_fallback: ProviderSettings,

    /// Primary completion provider for highlight extraction.
    pub highlight_primary: ProviderSettings,

    /// Fallback completion provider for highlight extraction.
    pub highlight_fallback: ProviderSettings,

    /// Embedding provider settings.
    pub embedding: EmbeddingSettings,

    /// Maximum chunk length in bytes.
    pub chunk_size: usize,

    /// Overlap between consecutive chunks in bytes.
    pub chunk_overlap: usize,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            corpus_dir: PathBuf::from(DEFAULT_CORPUS_DIR),
            index_path: PathBuf::from(DEFAULT_INDEX_PATH),
            generation_primary: ProviderSettings {
                kind: ProviderKind::OpenAiCompat,
                model: "openai/gpt-oss-20b".to_string(),
                base_url: Some("https://api.groq.com/openai/v1".to_string()),
                api_key_env: "GROQ_API_KEY".to_string(),
            },
            generation_fallback: ProviderSettings {
                kind: ProviderKind::OpenAiCompat,
                model: "gpt-4o-mini".to_string(),
                base_url: None,
                api_key_env: "OPENAI_API_KEY".to_string(),
            },
            highlight_primary: ProviderSettings {
                kind: ProviderKind::OpenAiCompat,
                model: "openai/gpt-oss-20b".to_string(),
                base_url: Some("https://api.groq.com/openai/v1".to_string()),
                api_key_env: "GROQ_API_KEY".to_string(),
            },
            highlight_fallback: ProviderSettings {
                kind: ProviderKind::Gemini,
                model: "gemini-2.0-flash-exp".to_string(),
                base_url: None,
                api_key_env: "GEMINI_API_KEY".to_string(),
            },
            embedding: EmbeddingSettings::default(),
            chunk_size: 500,
            chunk_overlap: 200,
            log_level: None,
            verbose: false,
            no_color: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and defaults.
    ///
    /// Environment variables:
    /// - `NEXUS_CORPUS_DIR`: Root of the handbook corpus
    /// - `NEXUS_INDEX_PATH`: Path of the persisted vector index
    /// - `NEXUS_EMBEDDING_PROVIDER`: "openai" or "trigram"
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    ///
    /// Provider API keys (`GROQ_API_KEY`, `OPENAI_API_KEY`, `GEMINI_API_KEY`)
    /// are referenced here but only resolved when a client is built.
    pub fn load() -> AppResult<Self> {
        let mut config = Self::default();

        if let Ok(corpus) = std::env::var("NEXUS_CORPUS_DIR") {
            config.corpus_dir = PathBuf::from(corpus);
        }

        if let Ok(index) = std::env::var("NEXUS_INDEX_PATH") {
            config.index_path = PathBuf::from(index);
        }

        if let Ok(provider) = std::env::var("NEXUS_EMBEDDING_PROVIDER") {
            config.embedding.provider = provider;
        }

        config.log_level = std::env::var("RUST_LOG").ok();

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// Command-line flags take precedence over environment variables.
    pub fn with_overrides(
        mut self,
        corpus_dir: Option<PathBuf>,
        index_path: Option<PathBuf>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(corpus_dir) = corpus_dir {
            self.corpus_dir = corpus_dir;
        }

        if let Some(index_path) = index_path {
            self.index_path = index_path;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Validate the configuration for query serving.
    ///
    /// Required credentials must be present before any request is handled;
    /// the service refuses to start rather than serve degraded queries.
    /// The highlight fallback key is optional: a missing key surfaces later
    /// as the secondary failure of that chain.
    pub fn validate(&self) -> AppResult<()> {
        self.validate_embedding()?;

        for settings in [&self.generation_primary, &self.generation_fallback] {
            if std::env::var(&settings.api_key_env).is_err() {
                return Err(AppError::Config(format!(
                    "API key not found in environment variable: {}",
                    settings.api_key_env
                )));
            }
        }

        Ok(())
    }

    /// Validate the configuration for ingestion (embedding credentials only).
    pub fn validate_embedding(&self) -> AppResult<()> {
        match self.embedding.provider.as_str() {
            "openai" => {
                if std::env::var(&self.embedding.api_key_env).is_err() {
                    return Err(AppError::Config(format!(
                        "API key not found in environment variable: {}",
                        self.embedding.api_key_env
                    )));
                }
                Ok(())
            }
            "trigram" => Ok(()),
            other => Err(AppError::Config(format!(
                "Unknown embedding provider: {}. Supported: openai, trigram",
                other
            ))),
        }
    }
}
