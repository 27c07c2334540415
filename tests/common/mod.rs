//! Shared test doubles: deterministic models and embedders

#![allow(dead_code)]

use agenthive::agent::{AgentCore, AgentCoreConfig, AgentDefinition};
use agenthive::errors::{AgentError, Result};
use agenthive::memory::{MemoryConfig, MemoryStore};
use agenthive::models::{ChatModel, EmbeddingModel};
use agenthive::tools::{ToolRegistry, ToolSchema};
use agenthive::types::{ChatMessage, ModelTurn, Role};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Replays a fixed sequence of turns; errors when the script runs out
pub struct ScriptedModel {
    turns: Mutex<VecDeque<ModelTurn>>,
}

impl ScriptedModel {
    pub fn new(turns: Vec<ModelTurn>) -> Arc<Self> {
        Arc::new(Self {
            turns: Mutex::new(turns.into()),
        })
    }

    pub fn texts(replies: &[&str]) -> Arc<Self> {
        Self::new(replies.iter().map(|r| ModelTurn::Text(r.to_string())).collect())
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    async fn chat(&self, _: &[ChatMessage], _: &[ToolSchema]) -> Result<ModelTurn> {
        self.turns
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| AgentError::ModelApi("script exhausted".to_string()))
    }
}

/// Always replies with the same text
pub struct FixedModel(pub String);

impl FixedModel {
    pub fn new(reply: &str) -> Arc<Self> {
        Arc::new(Self(reply.to_string()))
    }
}

#[async_trait]
impl ChatModel for FixedModel {
    async fn chat(&self, _: &[ChatMessage], _: &[ToolSchema]) -> Result<ModelTurn> {
        Ok(ModelTurn::Text(self.0.clone()))
    }
}

/// Wraps the latest user message in `tag(...)`, making composition
/// order observable in the output
pub struct TagModel(pub String);

impl TagModel {
    pub fn new(tag: &str) -> Arc<Self> {
        Arc::new(Self(tag.to_string()))
    }
}

#[async_trait]
impl ChatModel for TagModel {
    async fn chat(&self, messages: &[ChatMessage], _: &[ToolSchema]) -> Result<ModelTurn> {
        let input = messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.clone())
            .unwrap_or_default();
        Ok(ModelTurn::Text(format!("{}({})", self.0, input)))
    }
}

/// Constant-direction embedder; every text is equally similar
pub struct FlatEmbedder;

#[async_trait]
impl EmbeddingModel for FlatEmbedder {
    async fn embed(&self, _: &str) -> Result<Vec<f32>> {
        Ok(vec![1.0, 0.0])
    }
}

pub fn make_agent(name: &str, role: &str, model: Arc<dyn ChatModel>) -> Arc<AgentCore> {
    make_agent_with(name, role, model, ToolRegistry::new(), AgentCoreConfig::default())
}

pub fn make_agent_with(
    name: &str,
    role: &str,
    model: Arc<dyn ChatModel>,
    tools: ToolRegistry,
    config: AgentCoreConfig,
) -> Arc<AgentCore> {
    Arc::new(AgentCore::new(
        AgentDefinition::new(name, role, "Complete the task you are given.", model),
        tools,
        MemoryStore::new(Arc::new(FlatEmbedder), MemoryConfig::default()),
        config,
    ))
}
