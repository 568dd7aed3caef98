//! Ask command handler.

use clap::Args;
use nexus_core::{config::AppConfig, AppError, AppResult};
use nexus_knowledge::{ChatTurn, ServiceContext};
use std::path::PathBuf;

/// Ask a question against the handbook
#[derive(Args, Debug)]
pub struct AskCommand {
    /// Question text
    pub query: String,

    /// Path to a JSON file with prior conversation turns
    /// (array of {"role": "user"|"assistant", "content": "..."})
    #[arg(long)]
    pub history: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");

        let history = match &self.history {
            Some(path) => read_history(path)?,
            None => Vec::new(),
        };

        let context = ServiceContext::initialize(config).await?;
        let response = context.answer(&self.query, &history).await;

        if self.json {
            let output = serde_json::json!({
                "content": response.answer,
                "sources": response.citations,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!("{}", response.answer);
            println!();

            if response.citations.is_empty() {
                println!("Sources: (none)");
            } else {
                println!("Sources:");
                for citation in &response.citations {
                    println!("- [{}] {}", citation.doc_id, citation.snippet);
                }
            }
        }

        Ok(())
    }
}

fn read_history(path: &PathBuf) -> AppResult<Vec<ChatTurn>> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| AppError::Other(format!("Failed to read history file: {}", e)))?;
    let turns: Vec<ChatTurn> = serde_json::from_str(&raw)?;
    Ok(turns)
}
