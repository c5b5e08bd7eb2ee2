//! Tool handler trait and common types

use crate::mcp::error::McpError;
use crate::mcp::protocol::{ContentBlock, ToolResult, ToolSchema};
use async_trait::async_trait;
use serde_json::Value;

/// Trait for MCP tool implementations
///
/// Each tool (web_search, news_search, etc.) implements this trait
/// to provide schema and execution logic.
#[async_trait]
pub trait McpToolHandler: Send + Sync {
    /// Tool name (e.g., "web_search")
    fn name(&self) -> &str;

    /// Tool schema for tools/list
    fn schema(&self) -> ToolSchema;

    /// Execute tool with arguments
    async fn execute(&self, args: Value) -> Result<ToolResult, McpError>;

    /// Produce the schema to register on a server.
    ///
    /// Fails when the tool describes itself inconsistently; the server
    /// factory aborts construction instead of skipping the tool.
    fn registration(&self) -> Result<ToolSchema, McpError> {
        let schema = self.schema();

        if self.name().trim().is_empty() {
            return Err(McpError::Configuration(
                "Tool name cannot be empty".to_string(),
            ));
        }
        if schema.name != self.name() {
            return Err(McpError::Configuration(format!(
                "Tool '{}' declares schema name '{}'",
                self.name(),
                schema.name
            )));
        }
        if !schema.input_schema.is_object() {
            return Err(McpError::Configuration(format!(
                "Tool '{}' input schema must be a JSON object",
                self.name()
            )));
        }

        Ok(schema)
    }
}

/// Helper function to create a text content block
pub fn text_content(text: String) -> ToolResult {
    ToolResult {
        content: vec![ContentBlock::Text { text }],
        is_error: false,
    }
}

/// Helper function to report a tool failure to the client
pub fn error_content(text: String) -> ToolResult {
    ToolResult {
        content: vec![ContentBlock::Text { text }],
        is_error: true,
    }
}
