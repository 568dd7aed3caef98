//! Highlight command handler.

use clap::Args;
use nexus_core::{config::AppConfig, AppResult};
use nexus_knowledge::ServiceContext;

/// Extract verbatim highlight phrases from a document
#[derive(Args, Debug)]
pub struct HighlightCommand {
    /// The previously generated answer to find support for
    #[arg(long)]
    pub answer: String,

    /// Id of the document to search (see `nexus docs`)
    #[arg(long)]
    pub doc: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl HighlightCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing highlight command for document '{}'", self.doc);

        let context = ServiceContext::initialize(config).await?;
        let document = context.find_document(&self.doc)?;

        let highlights = context.highlights(&self.answer, &document.content).await;

        if self.json {
            let output = serde_json::json!({ "highlights": highlights });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else if highlights.is_empty() {
            println!("No highlights available.");
        } else {
            for phrase in &highlights {
                println!("- {}", phrase);
            }
        }

        Ok(())
    }
}
