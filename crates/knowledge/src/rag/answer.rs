//! Answer generation orchestration.
//!
//! The pipeline retrieves grounding chunks, generates an answer through the
//! primary/fallback provider chain, and derives citations from the same
//! chunk set that grounded the generation. It never raises to its caller:
//! every internal failure degrades to a static user-safe response.

use crate::rag::prompt::render_system_prompt;
use crate::rag::types::{
    RagResponse, SourceCitation, HISTORY_WINDOW, MAX_CITATIONS, MAX_SNIPPET_LENGTH, RETRIEVAL_K,
};
use crate::retriever::{combined_query, Retriever};
use crate::types::{ChatTurn, Chunk, Role};
use nexus_core::{AppError, AppResult};
use nexus_llm::{ChatMessage, ChatRequest, FallbackChain};

/// The generation orchestrator.
pub struct AnswerPipeline {
    retriever: Retriever,
    chain: FallbackChain,
}

impl AnswerPipeline {
    pub fn new(retriever: Retriever, chain: FallbackChain) -> Self {
        Self { retriever, chain }
    }

    /// Answer a query against the handbook corpus.
    ///
    /// Infallible by contract: provider failures (after one fallback) and
    /// any unexpected internal error are converted into the static failure
    /// response with empty citations.
    pub async fn answer(&self, query: &str, history: &[ChatTurn]) -> RagResponse {
        match self.try_answer(query, history).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!("Answer pipeline failed: {}", e);
                RagResponse::failure()
            }
        }
    }

    async fn try_answer(&self, query: &str, history: &[ChatTurn]) -> AppResult<RagResponse> {
        // Fold earlier user turns into the retrieval query.
        let retrieval_query = combined_query(query, history);
        let retrieved = self.retriever.search(&retrieval_query, RETRIEVAL_K).await?;

        // Empty retrieval is a defined outcome; no provider call is made.
        if retrieved.is_empty() {
            tracing::info!("No relevant chunks retrieved for query");
            return Ok(RagResponse::no_context());
        }

        let chunks: Vec<Chunk> = retrieved.into_iter().map(|(chunk, _)| chunk).collect();

        let context = chunks
            .iter()
            .map(|chunk| chunk.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        let system_prompt = render_system_prompt(&context)?;

        let mut messages = vec![ChatMessage::system(system_prompt)];

        let window_start = history.len().saturating_sub(HISTORY_WINDOW);
        for turn in &history[window_start..] {
            messages.push(match turn.role {
                Role::User => ChatMessage::user(&turn.content),
                Role::Assistant => ChatMessage::assistant(&turn.content),
            });
        }

        messages.push(ChatMessage::user(query));

        // Temperature 0 for consistent answers.
        let request = ChatRequest::new(messages).with_temperature(0.0);
        let response = self.chain.complete(&request).await.map_err(AppError::from)?;

        let citations = citations_from_chunks(&chunks);

        Ok(RagResponse {
            answer: response.content,
            citations,
        })
    }
}

/// Derive citations from the chunk set used for generation.
///
/// Duplicates from the same document are kept: several distinct sections of
/// one document may each be relevant. Capped at [`MAX_CITATIONS`].
fn citations_from_chunks(chunks: &[Chunk]) -> Vec<SourceCitation> {
    let mut citations = Vec::new();

    for chunk in chunks {
        let doc_id = if !chunk.doc_id.is_empty() {
            chunk.doc_id.clone()
        } else if !chunk.source_file.is_empty() {
            chunk.source_file.clone()
        } else {
            "unknown".to_string()
        };

        citations.push(SourceCitation {
            doc_id,
            snippet: truncate_snippet(chunk.text.trim()),
        });

        if citations.len() >= MAX_CITATIONS {
            break;
        }
    }

    citations
}

/// Truncate a snippet to at most [`MAX_SNIPPET_LENGTH`] bytes.
///
/// Cuts at the last sentence boundary before the limit when that boundary
/// lies past the halfway mark, otherwise hard-cuts with an ellipsis.
fn truncate_snippet(text: &str) -> String {
    if text.len() <= MAX_SNIPPET_LENGTH {
        return text.to_string();
    }

    let mut cut = MAX_SNIPPET_LENGTH;
    while cut > 0 && !text.is_char_boundary(cut) {
        cut -= 1;
    }
    let window = &text[..cut];

    match window.rfind('.') {
        Some(idx) if idx > MAX_SNIPPET_LENGTH / 2 => text[..=idx].to_string(),
        _ => format!("{}...", window),
    }
}
