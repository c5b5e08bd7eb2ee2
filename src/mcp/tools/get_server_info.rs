//! Get server info tool handler
//!
//! Returns version and routing information about the running server.

use super::handler::{text_content, McpToolHandler};
use crate::core::config::SessionPolicy;
use crate::mcp::error::McpError;
use crate::mcp::protocol::{ToolResult, ToolSchema, LATEST_PROTOCOL_VERSION};
use async_trait::async_trait;
use serde_json::{json, Value};

pub struct GetServerInfoHandler {
    policy: SessionPolicy,
}

impl GetServerInfoHandler {
    pub fn new(policy: SessionPolicy) -> Self {
        Self { policy }
    }

    fn format_info(&self) -> String {
        let version = env!("CARGO_PKG_VERSION");
        let rust_version = env!("CARGO_PKG_RUST_VERSION");

        let mut output = String::from("# websearch-mcp Server Information\n\n");

        output.push_str("## Version\n");
        output.push_str(&format!("- **Version:** {version}\n"));
        output.push_str(&format!("- **Rust Version:** {rust_version}\n\n"));

        output.push_str("## Server Details\n");
        output.push_str("- **Name:** websearch-mcp\n");
        output.push_str("- **Transport:** Streamable HTTP\n");
        output.push_str(&format!("- **Protocol:** MCP {LATEST_PROTOCOL_VERSION}\n"));
        output.push_str(&format!("- **Session policy:** {}\n\n", self.policy));

        output.push_str("## Available Tools\n");
        output.push_str("- web_search: Search the web\n");
        output.push_str("- news_search: Search recent news\n");
        output.push_str("- get_server_info: Show server version (this tool)\n");

        output
    }
}

#[async_trait]
impl McpToolHandler for GetServerInfoHandler {
    fn name(&self) -> &str {
        "get_server_info"
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "get_server_info".to_string(),
            description: "Get version and routing information about the running websearch-mcp server. \
                         Returns server version, protocol version, session policy and available tools. \
                         Does not call the search API."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {},
                "required": []
            }),
        }
    }

    async fn execute(&self, _args: Value) -> Result<ToolResult, McpError> {
        Ok(text_content(self.format_info()))
    }
}
