//! JSON-RPC 2.0 and MCP message types

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const JSONRPC_VERSION: &str = "2.0";

/// Protocol version returned when the client asks for one we don't know
pub const LATEST_PROTOCOL_VERSION: &str = "2025-03-26";

pub const SUPPORTED_PROTOCOL_VERSIONS: &[&str] = &["2025-06-18", "2025-03-26", "2024-11-05"];

// Standard JSON-RPC error codes
pub const PARSE_ERROR: i32 = -32700;
pub const INVALID_REQUEST: i32 = -32600;
pub const METHOD_NOT_FOUND: i32 = -32601;
pub const INVALID_PARAMS: i32 = -32602;
pub const INTERNAL_ERROR: i32 = -32603;

// Transport-level error codes (implementation-defined range)
pub const SERVER_ERROR: i32 = -32000;
pub const SESSION_NOT_FOUND: i32 = -32001;

/// Incoming JSON-RPC request or notification (no `id`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl JsonRpcRequest {
    pub fn is_notification(&self) -> bool {
        matches!(self.id, None | Some(Value::Null))
    }
}

/// Outgoing JSON-RPC response
///
/// `id` is always serialized; error envelopes that cannot be tied to a
/// request carry `"id": null`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: Option<Value>, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
                data: None,
            }),
        }
    }
}

/// Build the `{id: null, jsonrpc, error}` envelope used for every
/// transport- and boundary-level failure.
pub fn error_envelope(code: i32, message: impl Into<String>) -> JsonRpcResponse {
    JsonRpcResponse::error(None, code, message)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// A single element of a POST body, before routing
#[derive(Debug, Clone)]
pub enum IncomingMessage {
    Request(JsonRpcRequest),
    Notification(JsonRpcRequest),
    /// Client reply to a server-initiated request; accepted and ignored
    Response(Value),
}

impl IncomingMessage {
    fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        if value.get("method").is_some() {
            let request: JsonRpcRequest = serde_json::from_value(value)?;
            if request.is_notification() {
                Ok(IncomingMessage::Notification(request))
            } else {
                Ok(IncomingMessage::Request(request))
            }
        } else if value.get("result").is_some() || value.get("error").is_some() {
            Ok(IncomingMessage::Response(value))
        } else {
            // Re-parse as a request to surface a descriptive serde error
            serde_json::from_value::<JsonRpcRequest>(value).map(IncomingMessage::Request)
        }
    }

    /// Parse a body that is either one message or a batch array.
    ///
    /// Returns the messages and whether the body was a batch.
    pub fn parse_body(body: &Value) -> Result<(Vec<IncomingMessage>, bool), serde_json::Error> {
        match body {
            Value::Array(items) => {
                let messages = items
                    .iter()
                    .cloned()
                    .map(IncomingMessage::from_value)
                    .collect::<Result<Vec<_>, _>>()?;
                Ok((messages, true))
            }
            other => Ok((vec![IncomingMessage::from_value(other.clone())?], false)),
        }
    }

    pub fn is_initialize(&self) -> bool {
        matches!(self, IncomingMessage::Request(r) if r.method == "initialize")
    }
}

/// Structural check: is `body` a single, well-formed `initialize` request?
pub fn is_initialize_request(body: &Value) -> bool {
    let Ok(request) = serde_json::from_value::<JsonRpcRequest>(body.clone()) else {
        return false;
    };
    if request.jsonrpc != JSONRPC_VERSION || request.is_notification() {
        return false;
    }
    if request.method != "initialize" {
        return false;
    }
    request
        .params
        .map(|params| serde_json::from_value::<InitializeParams>(params).is_ok())
        .unwrap_or(false)
}

/// Structural check: is `body` a single `tools/list` request?
pub fn is_list_tools_request(body: &Value) -> bool {
    match serde_json::from_value::<JsonRpcRequest>(body.clone()) {
        Ok(request) => {
            request.jsonrpc == JSONRPC_VERSION
                && !request.is_notification()
                && request.method == "tools/list"
        }
        Err(_) => false,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeParams {
    pub protocol_version: String,
    pub capabilities: Map<String, Value>,
    pub client_info: ClientInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientInfo {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResult {
    pub protocol_version: String,
    pub capabilities: ServerCapabilities,
    pub server_info: ServerInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerCapabilities {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingCapability>,
    pub tools: ToolsCapability,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingCapability {}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolsCapability {
    pub list_changed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolSchema {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallParams {
    pub name: String,
    #[serde(default)]
    pub arguments: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResult {
    pub content: Vec<ContentBlock>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_error: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentBlock {
    Text { text: String },
}

/// Syslog-style levels accepted by `logging/setLevel`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoggingLevel {
    Debug,
    Info,
    Notice,
    Warning,
    Error,
    Critical,
    Alert,
    Emergency,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetLevelParams {
    pub level: LoggingLevel,
}
