//! Nexus CLI
//!
//! Command-line entry points for the handbook assistant: corpus ingestion,
//! one-shot questions, highlight extraction, and index/document inspection.

mod commands;

use clap::{Parser, Subcommand};
use commands::{AskCommand, DocsCommand, HighlightCommand, IngestCommand, StatsCommand};
use nexus_core::{config::AppConfig, logging, AppResult};
use std::path::PathBuf;

/// Nexus - handbook question answering with retrieval-augmented generation
#[derive(Parser, Debug)]
#[command(name = "nexus")]
#[command(about = "Handbook question answering with retrieval-augmented generation", long_about = None)]
#[command(version)]
struct Cli {
    /// Root directory of the handbook corpus
    #[arg(long, global = true, env = "NEXUS_CORPUS_DIR")]
    corpus: Option<PathBuf>,

    /// Path of the persisted vector index
    #[arg(long, global = true, env = "NEXUS_INDEX_PATH")]
    index: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Rebuild the vector index from the handbook corpus
    Ingest(IngestCommand),

    /// Ask a question against the handbook
    Ask(AskCommand),

    /// Extract verbatim highlight phrases from a document
    Highlight(HighlightCommand),

    /// List loaded handbook documents
    Docs(DocsCommand),

    /// Show index statistics
    Stats(StatsCommand),
}

#[tokio::main]
async fn main() -> AppResult<()> {
    // Provider keys commonly live in a local .env file.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = AppConfig::load()?.with_overrides(
        cli.corpus,
        cli.index,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );

    logging::init_logging(config.log_level.as_deref(), config.no_color)?;

    tracing::debug!("Corpus: {}", config.corpus_dir.display());
    tracing::debug!("Index: {}", config.index_path.display());

    let command_name = match &cli.command {
        Commands::Ingest(_) => "ingest",
        Commands::Ask(_) => "ask",
        Commands::Highlight(_) => "highlight",
        Commands::Docs(_) => "docs",
        Commands::Stats(_) => "stats",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    let result = match cli.command {
        Commands::Ingest(cmd) => cmd.execute(&config).await,
        Commands::Ask(cmd) => cmd.execute(&config).await,
        Commands::Highlight(cmd) => cmd.execute(&config).await,
        Commands::Docs(cmd) => cmd.execute(&config).await,
        Commands::Stats(cmd) => cmd.execute(&config).await,
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}
