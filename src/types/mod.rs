//! Shared data types for the agent engine

pub mod execution;
pub mod messages;

pub use execution::{IterationRecord, RunReport, RunStatus};
pub use messages::{ChatMessage, ModelTurn, Role, ToolCallRequest};
