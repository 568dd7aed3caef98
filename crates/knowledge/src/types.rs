//! Knowledge system type definitions.

use serde::{Deserialize, Serialize};

/// A handbook document held in memory for the lifetime of the process.
///
/// Created once per ingestion run by the loader and immutable afterward.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Stable identifier, derived from the relative path or declared in
    /// front-matter. Unique within the corpus.
    pub id: String,

    /// Human-readable title.
    pub title: String,

    /// Category derived from folder structure or front-matter.
    pub category: String,

    /// Document body with front-matter stripped.
    pub content: String,

    /// Relative source path, kept for citation fallback.
    pub source_file: String,
}

/// A length-bounded segment of a document, the unit of retrieval.
///
/// Carries a copy of its parent's metadata so retrieval results are
/// self-describing without a join back to the document set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    /// Verbatim substring of the parent document's content.
    pub text: String,

    /// Parent document id.
    pub doc_id: String,

    /// Parent document title.
    pub title: String,

    /// Parent document category.
    pub category: String,

    /// Parent document source path.
    pub source_file: String,

    /// Position in emission order across the whole ingestion run.
    /// Used for traceability only; not stable across runs.
    pub chunk_index: u32,
}

/// Role of a conversation turn author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A single turn of conversation history, used only as generation context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Statistics from an ingestion run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestStats {
    /// Number of documents loaded.
    pub documents: u32,

    /// Number of chunks written to the index.
    pub chunks: u32,

    /// Embedding dimensionality of the rebuilt index.
    pub dimensions: usize,

    /// Duration in seconds.
    pub duration_secs: f64,
}

/// Statistics reported by the persisted index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexStats {
    /// Number of stored chunks.
    pub chunks: u32,

    /// Embedding dimensionality.
    pub dimensions: usize,

    /// Identity of the embedding model the index was built with.
    pub embedding_model: String,
}
