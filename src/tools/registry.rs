//! Tool registry: capability lookup and invocation wrapper
//!
//! `invoke` never raises to its caller. Executable errors are caught and
//! converted into failed results; an unregistered name yields a
//! deterministic "Unknown tool" failure. This keeps the reasoning loop
//! live across tool faults.

use crate::tools::types::{ToolExecutable, ToolResult, ToolSchema, ToolStats};
use crate::errors::{AgentError, Result};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Instant;

struct RegisteredTool {
    schema: ToolSchema,
    executable: Arc<dyn ToolExecutable>,
}

/// Registry of named tools, immutable after registration
pub struct ToolRegistry {
    tools: HashMap<String, RegisteredTool>,
    stats: Mutex<ToolStats>,
}

impl ToolRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
            stats: Mutex::new(ToolStats::default()),
        }
    }

    /// Register a tool descriptor with its bound executable
    ///
    /// Registering a name twice is an error; descriptors are immutable
    /// after registration.
    pub fn register(
        &mut self,
        schema: ToolSchema,
        executable: Arc<dyn ToolExecutable>,
    ) -> Result<()> {
        let name = schema.name.clone();
        if self.tools.contains_key(&name) {
            return Err(AgentError::Generic(format!(
                "Tool '{}' is already registered",
                name
            )));
        }
        self.tools.insert(name, RegisteredTool { schema, executable });
        Ok(())
    }

    /// Look up a tool descriptor by name
    pub fn resolve(&self, name: &str) -> Option<&ToolSchema> {
        self.tools.get(name).map(|t| &t.schema)
    }

    /// Invoke a tool by name
    ///
    /// Infallible surface: unknown names and executable errors both come
    /// back as failed `ToolResult`s carrying the error text.
    pub async fn invoke(&self, name: &str, args: &serde_json::Value) -> ToolResult {
        let started = Instant::now();

        let Some(tool) = self.tools.get(name) else {
            let result = ToolResult::failure(
                name,
                format!("Unknown tool: {}", name),
                started.elapsed(),
            );
            self.stats.lock().unwrap().record_failure(result.duration_ms);
            return result;
        };

        let result = match tool.executable.call(args).await {
            Ok(output) => ToolResult::success(name, output, started.elapsed()),
            Err(e) => ToolResult::failure(name, e.to_string(), started.elapsed()),
        };

        let mut stats = self.stats.lock().unwrap();
        if result.success {
            stats.record_success(result.duration_ms);
        } else {
            stats.record_failure(result.duration_ms);
        }

        result
    }

    /// Check if a tool name is registered
    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// All registered tool names
    pub fn tool_names(&self) -> Vec<String> {
        self.tools.keys().cloned().collect()
    }

    /// All registered schemas (cloned for chat requests)
    pub fn schemas(&self) -> Vec<ToolSchema> {
        self.tools.values().map(|t| t.schema.clone()).collect()
    }

    /// Snapshot of invocation statistics
    pub fn stats(&self) -> ToolStats {
        self.stats.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
