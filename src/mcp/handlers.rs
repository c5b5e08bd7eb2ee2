//! MCP protocol method handlers

use crate::mcp::error::McpError;
use crate::mcp::protocol::*;
use crate::mcp::tools::{error_content, McpToolHandler, ToolRegistry};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

pub struct ProtocolHandlers {
    server_info: ServerInfo,
    initialized: AtomicBool,
    log_level: RwLock<Option<LoggingLevel>>,
    tool_registry: ToolRegistry,
}

impl ProtocolHandlers {
    pub fn new(server_info: ServerInfo) -> Self {
        Self {
            server_info,
            initialized: AtomicBool::new(false),
            log_level: RwLock::new(None),
            tool_registry: ToolRegistry::new(),
        }
    }

    pub fn register_tool(&mut self, tool: Arc<dyn McpToolHandler>) -> Result<(), McpError> {
        self.tool_registry.register(tool)
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tool_registry
    }

    /// Whether the client has sent `notifications/initialized`
    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    /// Minimum level requested through `logging/setLevel`
    pub async fn log_level(&self) -> Option<LoggingLevel> {
        *self.log_level.read().await
    }

    /// Handle initialize request
    pub async fn handle_initialize(
        &self,
        request: JsonRpcRequest,
    ) -> Result<JsonRpcResponse, McpError> {
        let params: InitializeParams =
            serde_json::from_value(request.params.unwrap_or(Value::Null))
                .map_err(|e| McpError::InvalidParams(format!("Invalid initialize params: {e}")))?;

        let supported = SUPPORTED_PROTOCOL_VERSIONS.contains(&params.protocol_version.as_str());
        let protocol_version = if supported {
            params.protocol_version
        } else {
            warn!(
                requested = %params.protocol_version,
                "Unsupported protocol version requested, answering with latest"
            );
            LATEST_PROTOCOL_VERSION.to_string()
        };

        info!(
            client = %params.client_info.name,
            client_version = %params.client_info.version,
            protocol_version = %protocol_version,
            "Client initialized"
        );

        let result = InitializeResult {
            protocol_version,
            capabilities: ServerCapabilities {
                logging: Some(LoggingCapability::default()),
                tools: ToolsCapability {
                    list_changed: false,
                },
            },
            server_info: self.server_info.clone(),
        };

        Ok(JsonRpcResponse::success(
            request.id,
            serde_json::to_value(result)?,
        ))
    }

    /// Handle `notifications/initialized`
    pub async fn handle_initialized(&self) {
        self.initialized.store(true, Ordering::SeqCst);
        debug!("Server initialized");
    }

    /// Handle tools/list request
    pub async fn handle_tools_list(
        &self,
        request: JsonRpcRequest,
    ) -> Result<JsonRpcResponse, McpError> {
        let tools = self.tool_registry.list();
        Ok(JsonRpcResponse::success(request.id, json!({ "tools": tools })))
    }

    /// Handle tools/call request
    ///
    /// Argument problems are protocol errors (-32602). Failures inside
    /// the tool are returned as an `isError` result so the model sees them.
    pub async fn handle_tools_call(
        &self,
        request: JsonRpcRequest,
    ) -> Result<JsonRpcResponse, McpError> {
        let params_value = match request.params.clone() {
            Some(v) => v,
            None => {
                return Ok(JsonRpcResponse::error(
                    request.id,
                    INVALID_PARAMS,
                    "Missing params",
                ));
            }
        };

        let params: ToolCallParams = match serde_json::from_value(params_value) {
            Ok(p) => p,
            Err(e) => {
                return Ok(JsonRpcResponse::error(
                    request.id,
                    INVALID_PARAMS,
                    format!("Invalid params: {e}"),
                ));
            }
        };

        let handler = match self.tool_registry.get(&params.name) {
            Some(h) => h,
            None => {
                return Ok(JsonRpcResponse::error(
                    request.id,
                    INVALID_PARAMS,
                    format!("Unknown tool: {}", params.name),
                ));
            }
        };

        let arguments = if params.arguments.is_null() {
            json!({})
        } else {
            params.arguments
        };

        debug!(tool = %params.name, "Executing tool");

        match handler.execute(arguments).await {
            Ok(result) => Ok(JsonRpcResponse::success(
                request.id,
                serde_json::to_value(result)?,
            )),
            Err(McpError::InvalidParams(message)) => Ok(JsonRpcResponse::error(
                request.id,
                INVALID_PARAMS,
                message,
            )),
            Err(e) => {
                warn!(tool = %params.name, error = %e, "Tool execution failed");
                Ok(JsonRpcResponse::success(
                    request.id,
                    serde_json::to_value(error_content(e.to_string()))?,
                ))
            }
        }
    }

    /// Handle logging/setLevel request
    pub async fn handle_set_level(
        &self,
        request: JsonRpcRequest,
    ) -> Result<JsonRpcResponse, McpError> {
        let params: SetLevelParams = match request.params.map(serde_json::from_value) {
            Some(Ok(params)) => params,
            Some(Err(e)) => {
                return Ok(JsonRpcResponse::error(
                    request.id,
                    INVALID_PARAMS,
                    format!("Invalid params: {e}"),
                ))
            }
            None => {
                return Ok(JsonRpcResponse::error(
                    request.id,
                    INVALID_PARAMS,
                    "Missing params",
                ))
            }
        };

        *self.log_level.write().await = Some(params.level);
        debug!(level = ?params.level, "Client log level updated");

        Ok(JsonRpcResponse::success(request.id, json!({})))
    }

    /// Handle ping request
    pub async fn handle_ping(&self, request: JsonRpcRequest) -> Result<JsonRpcResponse, McpError> {
        Ok(JsonRpcResponse::success(request.id, json!({})))
    }
}
