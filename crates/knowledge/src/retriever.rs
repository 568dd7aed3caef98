//! Semantic retrieval over the persisted index.

use crate::embeddings::EmbeddingProvider;
use crate::index::SearchIndex;
use crate::types::{ChatTurn, Chunk, Role};
use nexus_core::AppResult;
use std::sync::Arc;

/// Retrieves the most similar chunks for free-text queries.
pub struct Retriever {
    index: SearchIndex,
    embeddings: Arc<dyn EmbeddingProvider>,
}

impl Retriever {
    pub fn new(index: SearchIndex, embeddings: Arc<dyn EmbeddingProvider>) -> Self {
        Self { index, embeddings }
    }

    /// Return the top-k most similar chunks with their similarity scores,
    /// ordered by descending similarity. An empty result is a first-class
    /// outcome, not an error.
    pub async fn search(&self, query: &str, top_k: usize) -> AppResult<Vec<(Chunk, f32)>> {
        let embedding = self.embeddings.embed(query).await?;
        let results = self.index.search(&embedding, top_k)?;

        if let Some((_, top_score)) = results.first() {
            tracing::debug!(
                "Retrieved {} chunks (top score: {:.3})",
                results.len(),
                top_score
            );
        } else {
            tracing::debug!("Retrieval returned no chunks");
        }

        Ok(results)
    }

    /// The persisted index behind this retriever.
    pub fn index(&self) -> &SearchIndex {
        &self.index
    }
}

/// Combine the current question with prior user-authored turns.
///
/// Follow-up questions often omit their subject ("what about vacation
/// days?"); folding earlier user turns into the query string broadens
/// retrieval recall. Assistant turns are excluded, newest text comes last.
pub fn combined_query(question: &str, history: &[ChatTurn]) -> String {
    let prior: Vec<&str> = history
        .iter()
        .filter(|turn| turn.role == Role::User)
        .map(|turn| turn.content.as_str())
        .collect();

    if prior.is_empty() {
        question.to_string()
    } else {
        format!("{}\n{}", prior.join("\n"), question)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combined_query_empty_history() {
        assert_eq!(combined_query("what is the policy?", &[]), "what is the policy?");
    }

    #[test]
    fn test_combined_query_excludes_assistant_turns() {
        let history = vec![
            ChatTurn::user("Tell me about benefits"),
            ChatTurn::assistant("Benefits include health insurance."),
            ChatTurn::user("What about dental?"),
        ];

        let combined = combined_query("And vision?", &history);
        assert_eq!(
            combined,
            "Tell me about benefits\nWhat about dental?\nAnd vision?"
        );
        assert!(!combined.contains("health insurance"));
    }

    #[test]
    fn test_combined_query_newest_last() {
        let history = vec![ChatTurn::user("first question")];
        let combined = combined_query("second question", &history);
        assert!(combined.ends_with("second question"));
        assert!(combined.starts_with("first question"));
    }
}
