//! Execution log and run report types
//!
//! A run produces an ordered execution log of iteration records plus a
//! terminal report. Reports are returned for every documented failure
//! mode; `run` never raises to its caller.

use crate::tools::ToolResult;
use crate::types::ToolCallRequest;
use serde::{Deserialize, Serialize};

/// Terminal status of an agent run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Reached a final answer (reflection, if enabled, judged the goal met)
    Completed,

    /// Iteration budget exhausted before a final answer (partial result)
    CompletedPartial,

    /// Timeout or unexpected error terminated the run
    Failed,
}

impl RunStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, RunStatus::Completed | RunStatus::CompletedPartial)
    }
}

/// Record of a single loop iteration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IterationRecord {
    /// 1-based iteration number
    pub iteration: usize,

    /// FSM state when the iteration started
    pub state: String,

    /// Free-text model output, when the model answered instead of calling tools
    pub model_output: Option<String>,

    /// Tool calls requested by the model this iteration
    pub tool_calls: Vec<ToolCallRequest>,

    /// Results of the tool calls executed this iteration
    pub tool_results: Vec<ToolResult>,

    /// Loop bookkeeping (deferred calls, reflection verdicts)
    pub note: Option<String>,
}

impl IterationRecord {
    pub fn new(iteration: usize, state: &str) -> Self {
        Self {
            iteration,
            state: state.to_string(),
            model_output: None,
            tool_calls: Vec::new(),
            tool_results: Vec::new(),
            note: None,
        }
    }
}

/// Result record returned by `AgentCore::run`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub status: RunStatus,

    /// Final (or partial) answer when the run did not fail
    pub output: Option<String>,

    /// Error text when the run failed
    pub error: Option<String>,

    /// Ordered iteration records accumulated up to termination
    pub execution_log: Vec<IterationRecord>,

    /// Iterations consumed against the budget
    pub iterations: usize,

    /// Wall-clock duration of the run
    pub duration_ms: u64,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}
