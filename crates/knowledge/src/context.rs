//! Service context: the shared, read-only state behind every request.
//!
//! Built once at process startup in a single-writer initialization phase,
//! then only read. All fields are `Send + Sync`, so one context can serve
//! any number of concurrent requests without locking; no component mutates
//! shared state after initialization.

use crate::embeddings;
use crate::index::SearchIndex;
use crate::loader;
use crate::rag::{AnswerPipeline, HighlightExtractor, RagResponse};
use crate::retriever::Retriever;
use crate::types::{ChatTurn, Document};
use nexus_core::{AppConfig, AppError, AppResult};
use nexus_llm::{create_chat_client, FallbackChain};

/// Immutable application context passed to request handlers.
pub struct ServiceContext {
    documents: Vec<Document>,
    answer_pipeline: AnswerPipeline,
    highlighter: HighlightExtractor,
}

impl ServiceContext {
    /// Construct the context for query serving.
    ///
    /// Missing provider credentials or a missing persisted index fail here,
    /// before any request is served; the process refuses to start rather
    /// than serve degraded queries.
    pub async fn initialize(config: &AppConfig) -> AppResult<Self> {
        config.validate()?;

        let documents = loader::load_documents(&config.corpus_dir)?;

        let index = SearchIndex::open(&config.index_path)?;
        let embeddings = embeddings::create_provider(&config.embedding)?;
        let retriever = Retriever::new(index, embeddings);

        let generation_chain = FallbackChain::new(
            create_chat_client(&config.generation_primary)?,
            create_chat_client(&config.generation_fallback)?,
        );
        let answer_pipeline = AnswerPipeline::new(retriever, generation_chain);

        let highlight_primary = create_chat_client(&config.highlight_primary)?;
        // The highlight fallback is optional: without its key the chain
        // simply has no second attempt.
        let highlight_fallback = match create_chat_client(&config.highlight_fallback) {
            Ok(client) => Some(client),
            Err(e) => {
                tracing::warn!("Highlight fallback provider unavailable: {}", e);
                None
            }
        };
        let highlighter = HighlightExtractor::new(highlight_primary, highlight_fallback);

        tracing::info!(
            "Service context initialized: {} documents, index at {}",
            documents.len(),
            config.index_path.display()
        );

        Ok(Self {
            documents,
            answer_pipeline,
            highlighter,
        })
    }

    /// Answer a query with citations. Never fails; see [`AnswerPipeline`].
    pub async fn answer(&self, query: &str, history: &[ChatTurn]) -> RagResponse {
        self.answer_pipeline.answer(query, history).await
    }

    /// Extract verbatim highlight phrases from a document for a prior
    /// answer. Never fails; an empty list means no highlights available.
    pub async fn highlights(&self, answer: &str, document_text: &str) -> Vec<String> {
        self.highlighter.extract(answer, document_text).await
    }

    /// Read-only access to the loaded document collection.
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    /// Look up a document by id.
    pub fn find_document(&self, id: &str) -> AppResult<&Document> {
        self.documents
            .iter()
            .find(|doc| doc.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Document not found: {}", id)))
    }
}
