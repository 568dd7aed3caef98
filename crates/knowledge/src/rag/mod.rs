//! Retrieval-augmented generation pipeline.
//!
//! Retrieval feeds a grounding prompt, a primary/fallback provider pair
//! generates the answer, and citations are derived from the chunks that
//! grounded it. A secondary pass extracts verbatim highlight phrases from a
//! single document.

pub mod answer;
pub mod highlight;
pub mod prompt;
pub mod types;

pub use answer::AnswerPipeline;
pub use highlight::HighlightExtractor;
pub use types::{RagResponse, SourceCitation};
