//! # ai-adapters
//!
//! Language-model backends behind the `ProductRanker` port.
//!
//! `ChatRanker` talks to any OpenAI-compatible chat-completions endpoint and
//! asks for a strict JSON-schema answer. `DisabledRanker` stands in when no
//! model is configured, so semantic search degrades instead of failing.

mod chat;
mod prompt;

pub use chat::{ChatRanker, ChatRankerConfig, DisabledRanker, RankerError};
