//! Single-agent execution core: state machine and bounded loop

pub mod core;
pub mod state;

pub use self::core::{AgentCore, AgentCoreConfig, AgentDefinition};
pub use state::{AgentState, StateEvent};
