//! Error types for the Nexus handbook assistant.
//!
//! This module defines a unified error enum that covers all error categories
//! in the application: configuration, I/O, ingestion, the vector index,
//! LLM providers, and serialization.

use thiserror::Error;

/// Unified error type for the Nexus handbook assistant.
///
/// All fallible functions in the workspace return `Result<T, AppError>`.
/// We never panic; errors must be represented and propagated.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors (missing credentials, bad settings).
    /// Fatal at initialization: the service refuses to start degraded.
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A required resource (corpus directory, persisted index, document)
    /// does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Document loading and chunking errors
    #[error("Ingest error: {0}")]
    Ingest(String),

    /// Vector index errors
    #[error("Index error: {0}")]
    Index(String),

    /// LLM and embedding provider errors
    #[error("LLM error: {0}")]
    Llm(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
