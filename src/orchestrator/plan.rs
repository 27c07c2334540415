//! Coordinator plan parsing
//!
//! Plans arrive as model text containing a JSON array of
//! `{"agent": ..., "subtask": ...}` assignments, usually wrapped in prose
//! or a code fence. Parsing extracts the outermost array and deserializes
//! it; anything else is a typed `PlanParse` error.

use crate::errors::{AgentError, Result};
use serde::{Deserialize, Serialize};

/// One unit of delegated work
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub agent: String,
    pub subtask: String,
}

/// A parsed decomposition of a task into per-agent assignments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    pub assignments: Vec<Assignment>,
}

impl Plan {
    /// Parse a plan out of raw model output
    pub fn parse(raw: &str) -> Result<Self> {
        let start = raw.find('[').ok_or_else(|| {
            AgentError::PlanParse(format!("no JSON array in plan output: {}", truncate(raw)))
        })?;
        let end = raw.rfind(']').ok_or_else(|| {
            AgentError::PlanParse(format!("unterminated JSON array in plan output: {}", truncate(raw)))
        })?;
        if end < start {
            return Err(AgentError::PlanParse(
                "mismatched brackets in plan output".to_string(),
            ));
        }

        let assignments: Vec<Assignment> = serde_json::from_str(&raw[start..=end])
            .map_err(|e| AgentError::PlanParse(format!("invalid plan JSON: {}", e)))?;

        if assignments.is_empty() {
            return Err(AgentError::PlanParse("plan contains no assignments".to_string()));
        }

        Ok(Self { assignments })
    }
}

fn truncate(raw: &str) -> String {
    const LIMIT: usize = 120;
    if raw.len() <= LIMIT {
        raw.to_string()
    } else {
        let mut end = LIMIT;
        while !raw.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &raw[..end])
    }
}

/// Prompt asking a coordinator model to decompose a task
pub fn decomposition_prompt(task: &str, agents: &[(String, String)]) -> String {
    let roster = agents
        .iter()
        .map(|(name, role)| format!("- {} ({})", name, role))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Decompose the following task into subtasks for the agents below.\n\
         Task: {}\n\
         Agents:\n{}\n\
         Respond with ONLY a JSON array of objects with keys \"agent\" and \
         \"subtask\". Use each agent at most once.",
        task, roster
    )
}
