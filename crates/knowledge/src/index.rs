//! SQLite-backed vector index for handbook chunks.
//!
//! One on-disk file per index, replaced wholesale by [`rebuild`] and opened
//! read-only by [`SearchIndex::open`]. A `meta` table records the embedding
//! model identity and dimensionality the index was built with: querying
//! with a different model silently produces meaningless similarity scores,
//! so the identity is persisted for operators to check, not enforced.

use crate::embeddings::EmbeddingProvider;
use crate::types::{Chunk, IndexStats};
use chrono::Utc;
use nexus_core::{AppError, AppResult};
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};

/// Number of chunk texts sent to the embedding provider per batch.
const EMBED_BATCH_SIZE: usize = 64;

/// Rebuild the persistent index from scratch (drop-and-recreate).
///
/// Any existing index at `path` is deleted first; a deletion failure is
/// logged and the operation proceeds to overwrite in place. Every chunk is
/// embedded via `provider` and written with its metadata.
pub async fn rebuild(
    path: &Path,
    chunks: &[Chunk],
    provider: &dyn EmbeddingProvider,
) -> AppResult<IndexStats> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| AppError::Index(format!("Failed to create index directory: {}", e)))?;
    }

    if path.exists() {
        match std::fs::remove_file(path) {
            Ok(()) => tracing::info!("Deleted existing index at {}", path.display()),
            Err(e) => tracing::warn!(
                "Could not delete existing index at {}: {}",
                path.display(),
                e
            ),
        }
    }

    let conn = open_connection(path)?;
    create_schema(&conn)?;

    // If the stale file survived deletion, clear its rows before inserting.
    conn.execute("DELETE FROM chunks", [])
        .map_err(|e| AppError::Index(format!("Failed to clear chunks: {}", e)))?;
    conn.execute("DELETE FROM meta", [])
        .map_err(|e| AppError::Index(format!("Failed to clear metadata: {}", e)))?;

    let mut inserted = 0u32;

    for batch in chunks.chunks(EMBED_BATCH_SIZE) {
        let texts: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
        let embeddings = provider.embed_batch(&texts).await?;

        for (chunk, embedding) in batch.iter().zip(embeddings.iter()) {
            insert_chunk(&conn, chunk, embedding)?;
            inserted += 1;
        }

        tracing::debug!("Embedded and stored {}/{} chunks", inserted, chunks.len());
    }

    write_meta(&conn, provider.model_name(), provider.dimensions())?;

    tracing::info!(
        "Index rebuilt at {}: {} vectors with {} dimensions ({})",
        path.display(),
        inserted,
        provider.dimensions(),
        provider.model_name()
    );

    Ok(IndexStats {
        chunks: inserted,
        dimensions: provider.dimensions(),
        embedding_model: provider.model_name().to_string(),
    })
}

/// Handle to a persisted index.
///
/// Holds the path rather than a live connection: SQLite connections are
/// cheap to open and per-operation connections keep the handle freely
/// shareable across concurrent read-only requests.
pub struct SearchIndex {
    path: PathBuf,
    dimensions: usize,
    embedding_model: String,
}

impl SearchIndex {
    /// Connect to an existing persisted index without re-embedding.
    ///
    /// # Errors
    /// Returns `AppError::NotFound` if no index exists at `path`.
    pub fn open(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            return Err(AppError::NotFound(format!(
                "Vector index not found at {}. Run 'nexus ingest' first.",
                path.display()
            )));
        }

        let conn = open_connection(path)?;
        let (embedding_model, dimensions) = read_meta(&conn)?;

        tracing::debug!(
            "Opened index at {} ({}, {} dimensions)",
            path.display(),
            embedding_model,
            dimensions
        );

        Ok(Self {
            path: path.to_path_buf(),
            dimensions,
            embedding_model,
        })
    }

    /// Embedding dimensionality the index was built with.
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Identity of the embedding model the index was built with.
    pub fn embedding_model(&self) -> &str {
        &self.embedding_model
    }

    /// Query for the top-k most similar chunks.
    ///
    /// Returns chunks ordered by descending cosine similarity, at most
    /// `top_k` of them. An empty result is a normal outcome.
    pub fn search(&self, query_embedding: &[f32], top_k: usize) -> AppResult<Vec<(Chunk, f32)>> {
        if query_embedding.len() != self.dimensions {
            return Err(AppError::Index(format!(
                "Query embedding dimension mismatch: expected {}, got {}",
                self.dimensions,
                query_embedding.len()
            )));
        }

        let conn = open_connection(&self.path)?;

        let mut stmt = conn
            .prepare(
                "SELECT chunk_index, doc_id, title, category, source_file, text, embedding
                 FROM chunks",
            )
            .map_err(|e| AppError::Index(format!("Failed to prepare query: {}", e)))?;

        let rows = stmt
            .query_map([], |row| {
                let embedding_bytes: Vec<u8> = row.get(6)?;
                let embedding = bytes_to_embedding(&embedding_bytes)
                    .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;

                let chunk = Chunk {
                    chunk_index: row.get::<_, i64>(0)? as u32,
                    doc_id: row.get(1)?,
                    title: row.get(2)?,
                    category: row.get(3)?,
                    source_file: row.get(4)?,
                    text: row.get(5)?,
                };

                Ok((chunk, embedding))
            })
            .map_err(|e| AppError::Index(format!("Failed to query chunks: {}", e)))?;

        let mut results: Vec<(Chunk, f32)> = rows
            .filter_map(|r| r.ok())
            .map(|(chunk, embedding)| {
                let score = cosine_similarity(query_embedding, &embedding);
                (chunk, score)
            })
            .collect();

        results.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        results.truncate(top_k);

        tracing::debug!("Retrieved {} chunks (requested top-{})", results.len(), top_k);

        Ok(results)
    }

    /// Report index cardinality and dimensionality for validation.
    pub fn stats(&self) -> AppResult<IndexStats> {
        let conn = open_connection(&self.path)?;

        let chunks: u32 = conn
            .query_row("SELECT COUNT(*) FROM chunks", [], |row| {
                row.get::<_, i64>(0).map(|v| v as u32)
            })
            .map_err(|e| AppError::Index(format!("Failed to count chunks: {}", e)))?;

        Ok(IndexStats {
            chunks,
            dimensions: self.dimensions,
            embedding_model: self.embedding_model.clone(),
        })
    }
}

fn open_connection(path: &Path) -> AppResult<Connection> {
    Connection::open(path)
        .map_err(|e| AppError::Index(format!("Failed to open SQLite index: {}", e)))
}

fn create_schema(conn: &Connection) -> AppResult<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS chunks (
            chunk_index INTEGER PRIMARY KEY,
            doc_id TEXT NOT NULL,
            title TEXT NOT NULL,
            category TEXT NOT NULL,
            source_file TEXT NOT NULL,
            text TEXT NOT NULL,
            embedding BLOB NOT NULL
        );

        CREATE TABLE IF NOT EXISTS meta (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_chunks_doc ON chunks(doc_id);
        "#,
    )
    .map_err(|e| AppError::Index(format!("Failed to create tables: {}", e)))
}

fn insert_chunk(conn: &Connection, chunk: &Chunk, embedding: &[f32]) -> AppResult<()> {
    conn.execute(
        "INSERT OR REPLACE INTO chunks
         (chunk_index, doc_id, title, category, source_file, text, embedding)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            chunk.chunk_index as i64,
            chunk.doc_id,
            chunk.title,
            chunk.category,
            chunk.source_file,
            chunk.text,
            embedding_to_bytes(embedding),
        ],
    )
    .map_err(|e| AppError::Index(format!("Failed to insert chunk: {}", e)))?;

    Ok(())
}

fn write_meta(conn: &Connection, model: &str, dimensions: usize) -> AppResult<()> {
    let dimensions = dimensions.to_string();
    let built_at = Utc::now().to_rfc3339();
    for (key, value) in [
        ("embedding_model", model),
        ("dimensions", dimensions.as_str()),
        ("built_at", built_at.as_str()),
    ] {
        conn.execute(
            "INSERT OR REPLACE INTO meta (key, value) VALUES (?1, ?2)",
            params![key, value],
        )
        .map_err(|e| AppError::Index(format!("Failed to write metadata: {}", e)))?;
    }

    Ok(())
}

fn read_meta(conn: &Connection) -> AppResult<(String, usize)> {
    let get = |key: &str| -> AppResult<String> {
        conn.query_row("SELECT value FROM meta WHERE key = ?1", params![key], |row| {
            row.get::<_, String>(0)
        })
        .map_err(|_| AppError::Index(format!("Index is missing '{}' metadata", key)))
    };

    let model = get("embedding_model")?;
    let dimensions = get("dimensions")?
        .parse::<usize>()
        .map_err(|e| AppError::Index(format!("Invalid dimensions metadata: {}", e)))?;

    Ok((model, dimensions))
}

/// Convert embedding vector to little-endian bytes for storage.
fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(embedding.len() * 4);
    for &value in embedding {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    bytes
}

/// Convert stored bytes back to an embedding vector.
fn bytes_to_embedding(bytes: &[u8]) -> AppResult<Vec<f32>> {
    if bytes.len() % 4 != 0 {
        return Err(AppError::Index("Invalid embedding bytes length".to_string()));
    }

    let mut embedding = Vec::with_capacity(bytes.len() / 4);
    for chunk in bytes.chunks_exact(4) {
        embedding.push(f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]));
    }

    Ok(embedding)
}

/// Calculate cosine similarity between two vectors.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}
