//! MCP-specific error types

use crate::mcp::protocol::{
    INTERNAL_ERROR, INVALID_PARAMS, INVALID_REQUEST, METHOD_NOT_FOUND, PARSE_ERROR,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum McpError {
    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Method not found: {0}")]
    MethodNotFound(String),

    #[error("Invalid params: {0}")]
    InvalidParams(String),

    #[error("Internal error: {0}")]
    InternalError(String),

    /// Tool execution failed; reported to the client as an `isError` result
    #[error("Tool error: {0}")]
    ToolError(String),

    /// Server could not be assembled (bad tool registration, missing credential)
    #[error("Server configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl McpError {
    /// JSON-RPC error code for this error
    pub fn code(&self) -> i32 {
        match self {
            McpError::ParseError(_) => PARSE_ERROR,
            McpError::InvalidRequest(_) => INVALID_REQUEST,
            McpError::MethodNotFound(_) => METHOD_NOT_FOUND,
            McpError::InvalidParams(_) => INVALID_PARAMS,
            McpError::InternalError(_)
            | McpError::ToolError(_)
            | McpError::Configuration(_)
            | McpError::Io(_)
            | McpError::Json(_) => INTERNAL_ERROR,
        }
    }
}

impl From<crate::core::error::WebSearchError> for McpError {
    fn from(err: crate::core::error::WebSearchError) -> Self {
        use crate::core::error::WebSearchError;
        match err {
            WebSearchError::InvalidQuery(s) => McpError::InvalidParams(format!("Invalid query: {s}")),
            WebSearchError::ConfigError(s) => McpError::Configuration(s),
            WebSearchError::MissingCredential(s) => {
                McpError::Configuration(format!("{s} is not set"))
            }
            WebSearchError::UpstreamStatus { status, message } => {
                McpError::ToolError(format!("Search API returned status {status}: {message}"))
            }
            WebSearchError::UpstreamTimeout(secs) => {
                McpError::ToolError(format!("Search API timed out after {secs}s"))
            }
            WebSearchError::UpstreamError(s) => McpError::ToolError(format!("Search API error: {s}")),
            WebSearchError::IoError(e) => McpError::InternalError(format!("I/O error: {e}")),
            WebSearchError::SerdeError(e) => {
                McpError::InternalError(format!("Serialization error: {e}"))
            }
            WebSearchError::TomlError(e) => {
                McpError::Configuration(format!("Configuration parse error: {e}"))
            }
        }
    }
}
