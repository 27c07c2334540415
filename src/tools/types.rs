//! Tool descriptor and invocation result types

use crate::errors::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Result of a tool invocation
///
/// Produced for every invocation, success or failure; failed invocations
/// carry the error text so the reasoning loop can recover from them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// Tool name that was invoked
    pub tool: String,

    /// Invocation output
    pub output: String,

    /// Whether the invocation succeeded
    pub success: bool,

    /// Invocation duration in milliseconds
    pub duration_ms: u64,

    /// Error text if failed
    pub error: Option<String>,
}

impl ToolResult {
    /// Create successful result
    pub fn success(tool: impl Into<String>, output: String, duration: Duration) -> Self {
        Self {
            tool: tool.into(),
            output,
            success: true,
            duration_ms: duration.as_millis() as u64,
            error: None,
        }
    }

    /// Create failed result
    pub fn failure(tool: impl Into<String>, error: String, duration: Duration) -> Self {
        Self {
            tool: tool.into(),
            output: String::new(),
            success: false,
            duration_ms: duration.as_millis() as u64,
            error: Some(error),
        }
    }

    /// Render the result as a transcript line for the next reasoning step
    pub fn transcript_line(&self) -> String {
        if self.success {
            format!("[OK] {}: {}", self.tool, self.output)
        } else {
            format!(
                "[FAILED] {}: {}",
                self.tool,
                self.error.as_deref().unwrap_or("unknown error")
            )
        }
    }
}

/// Tool descriptor: name, description, and JSON-schema parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSchema {
    pub name: String,
    pub description: String,

    /// Parameter schema (JSON Schema)
    pub parameters: serde_json::Value,
}

impl ToolSchema {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: serde_json::Value,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }
}

/// Executable bound to a registered tool name
#[async_trait]
pub trait ToolExecutable: Send + Sync {
    async fn call(&self, args: &serde_json::Value) -> Result<String>;
}

/// Adapter registering a plain function as a tool executable
pub struct FnTool<F>(pub F)
where
    F: Fn(&serde_json::Value) -> Result<String> + Send + Sync;

#[async_trait]
impl<F> ToolExecutable for FnTool<F>
where
    F: Fn(&serde_json::Value) -> Result<String> + Send + Sync,
{
    async fn call(&self, args: &serde_json::Value) -> Result<String> {
        (self.0)(args)
    }
}

/// Per-registry invocation statistics
#[derive(Debug, Clone, Default)]
pub struct ToolStats {
    pub total_invocations: u64,
    pub successful_invocations: u64,
    pub failed_invocations: u64,
    pub total_duration_ms: u64,
}

impl ToolStats {
    pub fn record_success(&mut self, duration_ms: u64) {
        self.total_invocations += 1;
        self.successful_invocations += 1;
        self.total_duration_ms += duration_ms;
    }

    pub fn record_failure(&mut self, duration_ms: u64) {
        self.total_invocations += 1;
        self.failed_invocations += 1;
        self.total_duration_ms += duration_ms;
    }

    pub fn success_rate(&self) -> f64 {
        if self.total_invocations == 0 {
            0.0
        } else {
            self.successful_invocations as f64 / self.total_invocations as f64
        }
    }
}
