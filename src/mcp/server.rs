//! MCP server implementation
//!
//! A server instance owns one tool set and is bound to exactly one
//! transport. `ServerFactory` builds a fresh instance per transport.

use crate::core::services::Services;
use crate::mcp::error::McpError;
use crate::mcp::handlers::ProtocolHandlers;
use crate::mcp::protocol::*;
use crate::mcp::tools::{default_tools, McpToolHandler};
use std::sync::Arc;
use tracing::{debug, error};

pub const SERVER_NAME: &str = "websearch-mcp";

pub struct McpServer {
    handlers: ProtocolHandlers,
}

impl McpServer {
    pub fn new(server_info: ServerInfo) -> Self {
        Self {
            handlers: ProtocolHandlers::new(server_info),
        }
    }

    /// Register a tool, validating its self-description first
    pub fn register_tool(&mut self, tool: Arc<dyn McpToolHandler>) -> Result<(), McpError> {
        self.handlers.register_tool(tool)
    }

    /// Names of the registered tools, sorted
    pub fn tool_names(&self) -> Vec<String> {
        self.handlers
            .tools()
            .list()
            .into_iter()
            .map(|schema| schema.name)
            .collect()
    }

    pub fn is_initialized(&self) -> bool {
        self.handlers.is_initialized()
    }

    pub async fn log_level(&self) -> Option<LoggingLevel> {
        self.handlers.log_level().await
    }

    /// Answer one request. Handler errors become JSON-RPC error responses.
    pub async fn handle_request(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        debug!(method = %request.method, "Handling request");
        let id = request.id.clone();

        match self.route(request).await {
            Ok(response) => response,
            Err(e) => {
                error!(error = %e, "Error processing request");
                JsonRpcResponse::error(id, e.code(), e.to_string())
            }
        }
    }

    /// Process a notification; nothing is ever sent back
    pub async fn handle_notification(&self, notification: JsonRpcRequest) {
        match notification.method.as_str() {
            "notifications/initialized" | "initialized" => self.handlers.handle_initialized().await,
            other => debug!(method = %other, "Ignoring notification"),
        }
    }

    async fn route(&self, request: JsonRpcRequest) -> Result<JsonRpcResponse, McpError> {
        match request.method.as_str() {
            "initialize" => self.handlers.handle_initialize(request).await,
            "tools/list" => self.handlers.handle_tools_list(request).await,
            "tools/call" => self.handlers.handle_tools_call(request).await,
            "logging/setLevel" => self.handlers.handle_set_level(request).await,
            "ping" => self.handlers.handle_ping(request).await,
            _ => Ok(JsonRpcResponse::error(
                request.id,
                METHOD_NOT_FOUND,
                format!("Unknown method: {}", request.method),
            )),
        }
    }
}

/// Builds one server per transport
///
/// Construction does no I/O; the tool handlers share `Services`, which
/// is the only thing the factory holds.
#[derive(Clone)]
pub struct ServerFactory {
    tools: Vec<Arc<dyn McpToolHandler>>,
}

impl ServerFactory {
    /// Factory for the default capability set
    pub fn new(services: Arc<Services>) -> Self {
        Self {
            tools: default_tools(&services),
        }
    }

    /// Factory for an explicit capability set
    pub fn with_tools(tools: Vec<Arc<dyn McpToolHandler>>) -> Self {
        Self { tools }
    }

    pub fn server_info() -> ServerInfo {
        ServerInfo {
            name: SERVER_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Build a server with every tool registered
    ///
    /// Fails with `McpError::Configuration` on the first malformed tool.
    pub fn create_server(&self) -> Result<McpServer, McpError> {
        let mut server = McpServer::new(Self::server_info());
        for tool in &self.tools {
            server.register_tool(Arc::clone(tool))?;
        }
        Ok(server)
    }
}
