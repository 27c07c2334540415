//! Tool registry and invocation types

pub mod registry;
pub mod types;

pub use registry::ToolRegistry;
pub use types::{FnTool, ToolExecutable, ToolResult, ToolSchema, ToolStats};
