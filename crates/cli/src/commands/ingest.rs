//! Ingest command handler.
//!
//! Runs the offline ingestion batch: load the corpus, chunk it, and rebuild
//! the persistent vector index. A missing corpus directory is fatal and
//! exits non-zero.

use clap::Args;
use nexus_core::{config::AppConfig, AppResult};

/// Rebuild the vector index from the handbook corpus
#[derive(Args, Debug)]
pub struct IngestCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl IngestCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ingest command");

        let stats = nexus_knowledge::ingest(config).await?;

        if self.json {
            let output = serde_json::json!({
                "documents": stats.documents,
                "chunks": stats.chunks,
                "dimensions": stats.dimensions,
                "durationSecs": stats.duration_secs,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!(
                "Ingested {} documents into {} vectors with {} dimensions in {:.2}s",
                stats.documents, stats.chunks, stats.dimensions, stats.duration_secs
            );
            println!("Index location: {}", config.index_path.display());
        }

        Ok(())
    }
}
