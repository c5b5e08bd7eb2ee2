//! Tool registry for managing MCP tools

use super::handler::McpToolHandler;
use crate::mcp::error::McpError;
use crate::mcp::protocol::ToolSchema;
use std::collections::BTreeMap;
use std::sync::Arc;

struct RegisteredTool {
    handler: Arc<dyn McpToolHandler>,
    schema: ToolSchema,
}

/// Registry for the tools of one server instance
///
/// Ordered by name so `tools/list` output is stable across server
/// instances (and therefore across process recycles).
pub struct ToolRegistry {
    tools: BTreeMap<String, RegisteredTool>,
}

impl ToolRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            tools: BTreeMap::new(),
        }
    }

    /// Register a tool handler
    ///
    /// Duplicate names and malformed schemas are configuration errors.
    pub fn register(&mut self, handler: Arc<dyn McpToolHandler>) -> Result<(), McpError> {
        let schema = handler.registration()?;
        let name = handler.name().to_string();

        if self.tools.contains_key(&name) {
            return Err(McpError::Configuration(format!(
                "Tool '{name}' is registered twice"
            )));
        }

        self.tools.insert(name, RegisteredTool { handler, schema });
        Ok(())
    }

    /// Get a tool handler by name
    pub fn get(&self, name: &str) -> Option<&Arc<dyn McpToolHandler>> {
        self.tools.get(name).map(|tool| &tool.handler)
    }

    /// List all available tool schemas
    pub fn list(&self) -> Vec<ToolSchema> {
        self.tools.values().map(|tool| tool.schema.clone()).collect()
    }

    /// Check if a tool exists
    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Get number of registered tools
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if registry is empty
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
