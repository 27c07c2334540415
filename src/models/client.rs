//! Ollama API client
//!
//! Non-streaming chat with function-calling tool schemas via
//! POST /api/chat, plus embeddings via POST /api/embeddings.

use crate::errors::{AgentError, Result};
use crate::models::types::{
    ChatRequest, ChatResponse, EmbeddingRequest, EmbeddingResponse, ModelsResponse, WireFunction,
    WireMessage, WireTool,
};
use crate::models::{ChatModel, EmbeddingModel};
use crate::tools::ToolSchema;
use crate::types::{ChatMessage, ModelTurn, ToolCallRequest};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Default Ollama API endpoint
pub const DEFAULT_OLLAMA_URL: &str = "http://127.0.0.1:11434";

/// Default chat model
pub const DEFAULT_CHAT_MODEL: &str = "qwen2.5:7b-instruct";

/// Default embedding model
pub const DEFAULT_EMBEDDING_MODEL: &str = "nomic-embed-text";

/// Request timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Ollama client implementing both model capabilities
#[derive(Debug, Clone)]
pub struct OllamaClient {
    client: Client,
    base_url: String,
    chat_model: String,
    embedding_model: String,
}

impl OllamaClient {
    /// Create a client with default settings
    pub fn new() -> Result<Self> {
        Self::with_config(DEFAULT_OLLAMA_URL, DEFAULT_CHAT_MODEL, DEFAULT_EMBEDDING_MODEL)
    }

    /// Create a client with custom endpoint and model names
    pub fn with_config(base_url: &str, chat_model: &str, embedding_model: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(AgentError::Http)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            chat_model: chat_model.to_string(),
            embedding_model: embedding_model.to_string(),
        })
    }

    /// Check if the endpoint is reachable
    pub async fn health_check(&self) -> Result<bool> {
        let url = format!("{}/api/version", self.base_url);

        match self.client.get(&url).send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    /// List models available at the endpoint
    pub async fn list_models(&self) -> Result<Vec<String>> {
        let url = format!("{}/api/tags", self.base_url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AgentError::ModelApi(format!("Failed to list models: {}", e)))?;

        if !response.status().is_success() {
            return Err(AgentError::ModelApi(
                "Failed to retrieve model list".to_string(),
            ));
        }

        let models: ModelsResponse = response
            .json()
            .await
            .map_err(|e| AgentError::ModelApi(format!("Failed to parse models: {}", e)))?;

        Ok(models.models.into_iter().map(|m| m.name).collect())
    }

    /// Get current chat model name
    pub fn chat_model(&self) -> &str {
        &self.chat_model
    }

    /// Get base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn wire_messages(messages: &[ChatMessage]) -> Vec<WireMessage> {
        messages
            .iter()
            .map(|m| WireMessage {
                role: m.role.as_str().to_string(),
                content: m.content.clone(),
            })
            .collect()
    }

    fn wire_tools(tools: &[ToolSchema]) -> Vec<WireTool> {
        tools
            .iter()
            .map(|t| WireTool {
                kind: "function".to_string(),
                function: WireFunction {
                    name: t.name.clone(),
                    description: t.description.clone(),
                    parameters: t.parameters.clone(),
                },
            })
            .collect()
    }
}

#[async_trait]
impl ChatModel for OllamaClient {
    async fn chat(&self, messages: &[ChatMessage], tools: &[ToolSchema]) -> Result<ModelTurn> {
        let url = format!("{}/api/chat", self.base_url);

        let request = ChatRequest {
            model: self.chat_model.clone(),
            messages: Self::wire_messages(messages),
            stream: false,
            tools: Self::wire_tools(tools),
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| AgentError::ModelApi(format!("Failed to send request: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AgentError::ModelApi(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| AgentError::ModelApi(format!("Failed to parse response: {}", e)))?;

        if body.message.tool_calls.is_empty() {
            Ok(ModelTurn::Text(body.message.content))
        } else {
            let calls = body
                .message
                .tool_calls
                .into_iter()
                .map(|c| ToolCallRequest {
                    tool: c.function.name,
                    args: c.function.arguments,
                })
                .collect();
            Ok(ModelTurn::ToolCalls(calls))
        }
    }
}

#[async_trait]
impl EmbeddingModel for OllamaClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let url = format!("{}/api/embeddings", self.base_url);

        let request = EmbeddingRequest {
            model: self.embedding_model.clone(),
            prompt: text.to_string(),
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| AgentError::Embedding(format!("Failed to send request: {}", e)))?;

        if !response.status().is_success() {
            return Err(AgentError::Embedding(format!(
                "HTTP {}",
                response.status()
            )));
        }

        let body: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| AgentError::Embedding(format!("Failed to parse response: {}", e)))?;

        Ok(body.embedding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = OllamaClient::new();
        assert!(client.is_ok());

        let client = client.unwrap();
        assert_eq!(client.base_url(), DEFAULT_OLLAMA_URL);
        assert_eq!(client.chat_model(), DEFAULT_CHAT_MODEL);
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let client =
            OllamaClient::with_config("http://localhost:11434/", "llama3.2", "nomic-embed-text")
                .unwrap();
        assert_eq!(client.base_url(), "http://localhost:11434");
    }

    #[test]
    fn test_wire_message_roles() {
        let messages = vec![
            ChatMessage::system("directive"),
            ChatMessage::user("goal"),
        ];
        let wire = OllamaClient::wire_messages(&messages);
        assert_eq!(wire[0].role, "system");
        assert_eq!(wire[1].role, "user");
    }
}
