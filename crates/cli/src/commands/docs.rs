//! Docs command handler.
//!
//! Lists the loaded document collection the way the serving layer sees it,
//! for citation resolution and corpus inspection. Loads straight from the
//! corpus directory; no index or provider credentials are required.

use clap::Args;
use nexus_core::{config::AppConfig, AppResult};
use nexus_knowledge::loader;

/// List loaded handbook documents
#[derive(Args, Debug)]
pub struct DocsCommand {
    /// Output as JSON (includes full document content)
    #[arg(long)]
    pub json: bool,
}

impl DocsCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing docs command");

        let documents = loader::load_documents(&config.corpus_dir)?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&documents)?);
        } else {
            println!("{} documents in {}", documents.len(), config.corpus_dir.display());
            for doc in &documents {
                println!(
                    "- {} [{}] \"{}\" ({} bytes)",
                    doc.id,
                    doc.category,
                    doc.title,
                    doc.content.len()
                );
            }
        }

        Ok(())
    }
}
