//! Command handlers for the Nexus CLI.

mod ask;
mod docs;
mod highlight;
mod ingest;
mod stats;

pub use ask::AskCommand;
pub use docs::DocsCommand;
pub use highlight::HighlightCommand;
pub use ingest::IngestCommand;
pub use stats::StatsCommand;
