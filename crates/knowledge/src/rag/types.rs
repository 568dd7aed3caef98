//! RAG response types and pipeline constants.

use serde::{Deserialize, Serialize};

/// Number of chunks retrieved per query.
pub const RETRIEVAL_K: usize = 10;

/// Number of trailing history turns replayed to the model.
pub const HISTORY_WINDOW: usize = 5;

/// Maximum number of citations returned with an answer.
pub const MAX_CITATIONS: usize = 10;

/// Maximum snippet length in bytes.
pub const MAX_SNIPPET_LENGTH: usize = 800;

/// Fixed response when retrieval finds nothing relevant. No provider call
/// is made in that case.
pub const NO_CONTEXT_MESSAGE: &str = "I couldn't find any relevant information in the handbook \
     to answer your question. Could you rephrase or ask something else?";

/// Fixed user-safe response when the pipeline fails internally. Raw error
/// detail never reaches the caller.
pub const FAILURE_MESSAGE: &str =
    "I'm having trouble processing your request right now. Please try again in a moment.";

/// A citation referencing a specific snippet of a handbook document.
///
/// `doc_id` is not enforced against the document set: it may reference a
/// document that was since retired or renamed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceCitation {
    #[serde(rename = "docId")]
    pub doc_id: String,

    pub snippet: String,
}

/// An answer with the citations that grounded it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagResponse {
    /// Generated answer (markdown formatted).
    pub answer: String,

    /// Citations derived from the retrieved chunks, in retrieval order.
    pub citations: Vec<SourceCitation>,
}

impl RagResponse {
    /// Response for the empty-retrieval outcome.
    pub fn no_context() -> Self {
        Self {
            answer: NO_CONTEXT_MESSAGE.to_string(),
            citations: Vec::new(),
        }
    }

    /// User-safe response for an internal failure.
    pub fn failure() -> Self {
        Self {
            answer: FAILURE_MESSAGE.to_string(),
            citations: Vec::new(),
        }
    }
}
