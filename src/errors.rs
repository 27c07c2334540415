//! Error types for the agenthive engine
//!
//! Tool- and plan-level failures are recovered locally and surfaced as
//! ordinary data to the reasoning loop; only timeouts and genuinely
//! unexpected errors terminate a run.

use thiserror::Error;

/// Main error type for the agent engine
#[derive(Error, Debug)]
pub enum AgentError {
    /// State machine transition errors
    #[error("Invalid state transition from {from} on {event}: {reason}")]
    InvalidTransition {
        from: String,
        event: String,
        reason: String,
    },

    /// Run-level wall-clock timeout
    #[error("Run timed out after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    /// Malformed plan text from a model response
    #[error("Plan parse error: {0}")]
    PlanParse(String),

    /// Reference to an agent name that is not registered
    #[error("Unknown agent: {0}")]
    UnknownAgent(String),

    /// Model API errors
    #[error("Model API error: {0}")]
    ModelApi(String),

    /// Embedding capability errors
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// HTTP client errors
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic errors with context
    #[error("Agent error: {0}")]
    Generic(String),
}

/// Result type alias for agent operations
pub type Result<T> = std::result::Result<T, AgentError>;

/// Convert anyhow errors to AgentError
impl From<anyhow::Error> for AgentError {
    fn from(err: anyhow::Error) -> Self {
        AgentError::Generic(err.to_string())
    }
}
