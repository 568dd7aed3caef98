//! Handbook knowledge system.
//!
//! Document ingestion (loading, front-matter metadata, chunking), a
//! SQLite-backed vector index, semantic retrieval, and the RAG pipeline
//! that turns retrieved chunks into grounded, cited answers.

pub mod chunker;
pub mod context;
pub mod embeddings;
pub mod index;
pub mod loader;
pub mod rag;
pub mod retriever;
pub mod types;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use context::ServiceContext;
pub use rag::{RagResponse, SourceCitation};
pub use types::{ChatTurn, Chunk, Document, IndexStats, IngestStats, Role};

use chunker::ChunkConfig;
use nexus_core::{AppConfig, AppResult};
use std::time::Instant;

/// Run ingestion over the corpus directory: load documents, chunk them, and
/// rebuild the persistent index (drop-and-recreate).
///
/// A missing corpus directory is fatal. Per-file load errors skip only the
/// affected file.
pub async fn ingest(config: &AppConfig) -> AppResult<IngestStats> {
    config.validate_embedding()?;

    let start = Instant::now();

    tracing::info!("Starting ingestion from {}", config.corpus_dir.display());

    let documents = loader::load_documents(&config.corpus_dir)?;

    let chunk_config = ChunkConfig {
        max_chunk_size: config.chunk_size,
        overlap: config.chunk_overlap,
    };
    let chunks = chunker::chunk_documents(&documents, &chunk_config);

    let provider = embeddings::create_provider(&config.embedding)?;
    let index_stats = index::rebuild(&config.index_path, &chunks, provider.as_ref()).await?;

    let duration = start.elapsed();

    tracing::info!(
        "Ingestion complete: {} documents, {} chunks, {} dimensions in {:.2}s",
        documents.len(),
        index_stats.chunks,
        index_stats.dimensions,
        duration.as_secs_f64()
    );

    Ok(IngestStats {
        documents: documents.len() as u32,
        chunks: index_stats.chunks,
        dimensions: index_stats.dimensions,
        duration_secs: duration.as_secs_f64(),
    })
}
