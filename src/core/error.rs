//! Error types and error handling for the websearch-mcp service.
//!
//! This module defines the domain error types used throughout the
//! application. Protocol-specific error handling (JSON-RPC error codes)
//! is handled in the respective adapter modules.

use thiserror::Error;

/// Result type alias for websearch-mcp operations
pub type Result<T> = std::result::Result<T, WebSearchError>;

/// Main error type for the websearch-mcp service
#[derive(Error, Debug)]
pub enum WebSearchError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Missing credential: {0} is not set")]
    MissingCredential(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Search API returned status {status}: {message}")]
    UpstreamStatus { status: u16, message: String },

    #[error("Search API timed out after {0}s")]
    UpstreamTimeout(u64),

    #[error("Search API error: {0}")]
    UpstreamError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),
}

impl WebSearchError {
    /// Get user-friendly error message
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Check if this is a configuration fault (never retried)
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            WebSearchError::ConfigError(_)
                | WebSearchError::MissingCredential(_)
                | WebSearchError::TomlError(_)
        )
    }

    /// Check if the failure came from the external search API
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            WebSearchError::UpstreamStatus { .. }
                | WebSearchError::UpstreamTimeout(_)
                | WebSearchError::UpstreamError(_)
        )
    }

    /// Check if this is a bad request error (invalid input)
    pub fn is_bad_request(&self) -> bool {
        matches!(self, WebSearchError::InvalidQuery(_))
    }
}
