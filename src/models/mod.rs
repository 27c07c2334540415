//! External model capabilities
//!
//! The engine consumes two external collaborators: a text-generation
//! capability and an embedding capability. Both are trait seams so the
//! loop can be driven by any backend; `OllamaClient` implements both
//! against a local Ollama endpoint.

pub mod client;
pub mod types;

pub use client::OllamaClient;

use crate::errors::Result;
use crate::tools::ToolSchema;
use crate::types::{ChatMessage, ModelTurn};
use async_trait::async_trait;

/// Text-generation capability: ordered message list plus optional tool
/// schemas, returning either free text or tool-call requests
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn chat(&self, messages: &[ChatMessage], tools: &[ToolSchema]) -> Result<ModelTurn>;
}

/// Embedding capability: text to a fixed-length numeric vector
#[async_trait]
pub trait EmbeddingModel: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}
