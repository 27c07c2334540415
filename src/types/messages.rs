//! Message types for agent communication
//!
//! Defines the role-tagged conversation messages exchanged with the
//! text-generation capability and the tool-call requests parsed from
//! model output.

use serde::{Deserialize, Serialize};

/// Conversation roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

impl Role {
    /// Wire name used by the chat API
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Tool => "tool",
        }
    }
}

/// A single role-tagged message in a conversation transcript
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    pub fn tool(content: impl Into<String>) -> Self {
        Self {
            role: Role::Tool,
            content: content.into(),
        }
    }
}

/// A tool invocation requested by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRequest {
    /// Registered tool name
    pub tool: String,

    /// Arguments matching the tool's parameter schema
    pub args: serde_json::Value,
}

/// One model response: either free text or a batch of tool-call requests
#[derive(Debug, Clone, PartialEq)]
pub enum ModelTurn {
    Text(String),
    ToolCalls(Vec<ToolCallRequest>),
}

impl ModelTurn {
    /// Text content if this turn carries no tool calls
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ModelTurn::Text(text) => Some(text),
            ModelTurn::ToolCalls(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_constructors() {
        let msg = ChatMessage::system("directive");
        assert_eq!(msg.role, Role::System);
        assert_eq!(msg.content, "directive");

        let msg = ChatMessage::tool("[OK] read_file: data");
        assert_eq!(msg.role, Role::Tool);
    }

    #[test]
    fn test_role_wire_names() {
        assert_eq!(Role::System.as_str(), "system");
        assert_eq!(Role::Assistant.as_str(), "assistant");
    }

    #[test]
    fn test_model_turn_text_accessor() {
        let turn = ModelTurn::Text("answer".to_string());
        assert_eq!(turn.as_text(), Some("answer"));

        let turn = ModelTurn::ToolCalls(vec![ToolCallRequest {
            tool: "search".to_string(),
            args: serde_json::json!({"query": "x"}),
        }]);
        assert!(turn.as_text().is_none());
    }

    #[test]
    fn test_tool_call_request_roundtrip() {
        let req = ToolCallRequest {
            tool: "lookup".to_string(),
            args: serde_json::json!({"key": "value"}),
        };
        let json = serde_json::to_string(&req).unwrap();
        let back: ToolCallRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(back, req);
    }
}
