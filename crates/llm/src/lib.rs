//! Nexus LLM Library
//!
//! Completion provider abstraction for the handbook assistant. Providers are
//! opaque text-completion services behind the [`ChatClient`] trait; the
//! [`FallbackChain`] pairs a primary with a secondary provider and performs
//! exactly one fallback attempt per logical operation.

pub mod client;
pub mod factory;
pub mod fallback;
pub mod providers;
pub mod types;

// Re-export commonly used types
pub use client::ChatClient;
pub use factory::create_chat_client;
pub use fallback::{FallbackChain, FallbackError};
pub use types::{ChatMessage, ChatRequest, ChatResponse, ChatRole, ResponseFormat, TokenUsage};
