//! Stats command handler.

use clap::Args;
use nexus_core::{config::AppConfig, AppResult};
use nexus_knowledge::index::SearchIndex;

/// Show index statistics
#[derive(Args, Debug)]
pub struct StatsCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl StatsCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing stats command");

        let index = SearchIndex::open(&config.index_path)?;
        let stats = index.stats()?;

        if self.json {
            let output = serde_json::json!({
                "chunks": stats.chunks,
                "dimensions": stats.dimensions,
                "embeddingModel": stats.embedding_model,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!("Index: {}", config.index_path.display());
            println!("  Vectors: {}", stats.chunks);
            println!("  Dimensions: {}", stats.dimensions);
            println!("  Embedding model: {}", stats.embedding_model);
        }

        Ok(())
    }
}
