//! agenthive: bounded agent execution loops with multi-agent orchestration
//!
//! A single agent runs a reason/act/reflect loop against a local
//! Ollama-compatible model, calling registered tools and recalling from a
//! two-tier memory store. Multiple agents compose under five orchestration
//! strategies (sequential, parallel, hierarchical, debate, conversational)
//! with inter-agent handoffs published on an in-process message bus.

pub mod agent;
pub mod bus;
pub mod config;
pub mod errors;
pub mod memory;
pub mod models;
pub mod orchestrator;
pub mod tools;
pub mod types;

pub use agent::{AgentCore, AgentCoreConfig, AgentDefinition, AgentState};
pub use bus::{BusMessage, MessageBus, MessageHandler, MessageKind};
pub use config::Config;
pub use errors::{AgentError, Result};
pub use memory::{MemoryConfig, MemoryRecord, MemoryStore, MemoryTier};
pub use models::{ChatModel, EmbeddingModel, OllamaClient};
pub use orchestrator::{
    AgentOutput, OrchestrationResult, OrchestrationStatus, Orchestrator, Strategy,
};
pub use tools::{ToolRegistry, ToolResult, ToolSchema};
pub use types::{ChatMessage, IterationRecord, ModelTurn, Role, RunReport, RunStatus};
