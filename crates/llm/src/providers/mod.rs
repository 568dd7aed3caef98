//! Completion provider implementations.

pub mod gemini;
pub mod openai_compat;

pub use gemini::GeminiClient;
pub use openai_compat::OpenAiCompatClient;
