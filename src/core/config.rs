//! Configuration management for the websearch-mcp service.
//!
//! This module handles loading configuration from TOML files and
//! environment variables, with sensible defaults for all settings.

use crate::core::error::{Result, WebSearchError};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Environment variable holding the search API credential
pub const API_KEY_ENV: &str = "SEARCH_API_KEY";

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP listener configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

/// Session lifecycle configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SessionConfig {
    /// How inbound requests are mapped onto sessions
    #[serde(default)]
    pub policy: SessionPolicy,

    /// How the transport writes JSON-RPC responses
    #[serde(default)]
    pub response_mode: ResponseMode,
}

/// Session routing strategy, selected once at startup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPolicy {
    /// Route by session id; `tools/list` without a session is served one-shot
    #[default]
    SessionAware,
    /// Route by session id; everything without a session except `initialize` is rejected
    SessionAwareStrict,
    /// Every request gets a disposable server and transport
    Stateless,
}

impl SessionPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionPolicy::SessionAware => "session_aware",
            SessionPolicy::SessionAwareStrict => "session_aware_strict",
            SessionPolicy::Stateless => "stateless",
        }
    }
}

impl fmt::Display for SessionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionPolicy {
    type Err = WebSearchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "session_aware" => Ok(SessionPolicy::SessionAware),
            "session_aware_strict" | "strict" => Ok(SessionPolicy::SessionAwareStrict),
            "stateless" => Ok(SessionPolicy::Stateless),
            other => Err(WebSearchError::ConfigError(format!(
                "Unknown session policy '{other}' \
                 (expected session_aware, session_aware_strict or stateless)"
            ))),
        }
    }
}

/// Response framing used by the transport
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseMode {
    /// Single `application/json` body (array for batches)
    #[default]
    Json,
    /// `text/event-stream` with one `message` event per response
    Sse,
}

impl FromStr for ResponseMode {
    type Err = WebSearchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(ResponseMode::Json),
            "sse" => Ok(ResponseMode::Sse),
            other => Err(WebSearchError::ConfigError(format!(
                "Unknown response mode '{other}' (expected json or sse)"
            ))),
        }
    }
}

/// External search API configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchConfig {
    /// API credential; `SEARCH_API_KEY` takes precedence
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Default number of results to return
    #[serde(default = "default_count")]
    pub default_count: usize,

    /// Maximum results per query
    #[serde(default = "default_max_count")]
    pub max_count: usize,

    /// Maximum query string length
    #[serde(default = "default_max_query_length")]
    pub max_query_length: usize,
}

/// CORS header values emitted by the boundary handler
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CorsConfig {
    #[serde(default = "default_allow_origin")]
    pub allow_origin: String,

    #[serde(default = "default_allow_methods")]
    pub allow_methods: String,

    #[serde(default = "default_allow_headers")]
    pub allow_headers: String,

    #[serde(default = "default_expose_headers")]
    pub expose_headers: String,

    #[serde(default = "default_max_age")]
    pub max_age_sec: u64,
}

/// Limits configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LimitsConfig {
    /// Timeout for outbound search API calls, in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_sec: u64,

    /// Maximum accepted request body size
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

/// Log output configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_base_url() -> String {
    "https://api.search.brave.com/res/v1".to_string()
}

fn default_count() -> usize {
    10
}

fn default_max_count() -> usize {
    20
}

fn default_max_query_length() -> usize {
    400
}

fn default_allow_origin() -> String {
    "*".to_string()
}

fn default_allow_methods() -> String {
    "GET, POST, OPTIONS".to_string()
}

fn default_allow_headers() -> String {
    "Content-Type, Authorization, Accept, mcp-session-id, mcp-protocol-version".to_string()
}

fn default_expose_headers() -> String {
    "mcp-session-id".to_string()
}

fn default_max_age() -> u64 {
    86_400
}

fn default_request_timeout() -> u64 {
    30
}

fn default_max_body_bytes() -> usize {
    1024 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            default_count: default_count(),
            max_count: default_max_count(),
            max_query_length: default_max_query_length(),
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allow_origin: default_allow_origin(),
            allow_methods: default_allow_methods(),
            allow_headers: default_allow_headers(),
            expose_headers: default_expose_headers(),
            max_age_sec: default_max_age(),
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            request_timeout_sec: default_request_timeout(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl Config {
    /// Load configuration from TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| WebSearchError::ConfigError(format!("Failed to read config file: {e}")))?;

        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load config with priority: env vars > TOML > defaults
    ///
    /// File lookup order:
    /// 1. `explicit` path (from `--config`)
    /// 2. WEBSEARCH_CONFIG env var
    /// 3. ./websearch.toml
    /// 4. Defaults
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = if let Some(path) = explicit {
            Self::from_file(path)?
        } else if let Ok(path) = env::var("WEBSEARCH_CONFIG") {
            Self::from_file(PathBuf::from(path))?
        } else if Path::new("websearch.toml").exists() {
            Self::from_file("websearch.toml")?
        } else {
            Self::default()
        };

        config.merge_env()?;
        config.validate()?;

        Ok(config)
    }

    /// Merge configuration with environment variables
    ///
    /// Numeric values that fail to parse are ignored. Enum values that
    /// fail to parse are reported, since a typo there changes routing.
    pub fn merge_env(&mut self) -> Result<()> {
        if let Ok(host) = env::var("WEBSEARCH_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = env::var("WEBSEARCH_PORT") {
            if let Ok(p) = port.parse() {
                self.server.port = p;
            }
        }

        if let Ok(policy) = env::var("WEBSEARCH_SESSION_POLICY") {
            self.session.policy = policy.parse()?;
        }
        if let Ok(mode) = env::var("WEBSEARCH_RESPONSE_MODE") {
            self.session.response_mode = mode.parse()?;
        }

        if let Ok(key) = env::var(API_KEY_ENV) {
            if !key.trim().is_empty() {
                self.search.api_key = Some(key);
            }
        }
        if let Ok(url) = env::var("WEBSEARCH_SEARCH_BASE_URL") {
            self.search.base_url = url;
        }

        if let Ok(timeout) = env::var("WEBSEARCH_REQUEST_TIMEOUT_SEC") {
            if let Ok(t) = timeout.parse() {
                self.limits.request_timeout_sec = t;
            }
        }
        if let Ok(max_body) = env::var("WEBSEARCH_MAX_BODY_BYTES") {
            if let Ok(b) = max_body.parse() {
                self.limits.max_body_bytes = b;
            }
        }

        if let Ok(format) = env::var("WEBSEARCH_LOG_FORMAT") {
            match format.to_ascii_lowercase().as_str() {
                "json" => self.logging.format = LogFormat::Json,
                "pretty" => self.logging.format = LogFormat::Pretty,
                _ => {}
            }
        }

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(WebSearchError::ConfigError(
                "Port must be non-zero".to_string(),
            ));
        }

        if self.search.default_count == 0 {
            return Err(WebSearchError::ConfigError(
                "Default count must be non-zero".to_string(),
            ));
        }

        if self.search.default_count > self.search.max_count {
            return Err(WebSearchError::ConfigError(
                "Default count cannot exceed max count".to_string(),
            ));
        }

        if self.search.max_query_length == 0 {
            return Err(WebSearchError::ConfigError(
                "Max query length must be non-zero".to_string(),
            ));
        }

        if self.limits.request_timeout_sec == 0 {
            return Err(WebSearchError::ConfigError(
                "Request timeout must be non-zero".to_string(),
            ));
        }

        if self.limits.max_body_bytes == 0 {
            return Err(WebSearchError::ConfigError(
                "Max body size must be non-zero".to_string(),
            ));
        }

        Ok(())
    }

    /// The search API credential, if one is configured and non-blank
    pub fn api_key(&self) -> Option<&str> {
        self.search
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
    }

    /// Log configuration (redacting sensitive values)
    pub fn log_config(&self) {
        tracing::info!("Configuration loaded:");
        tracing::info!("  Listen: {}:{}", self.server.host, self.server.port);
        tracing::info!("  Session policy: {}", self.session.policy);
        tracing::info!("  Response mode: {:?}", self.session.response_mode);
        tracing::info!("  Search base URL: {}", self.search.base_url);
        tracing::info!(
            "  API key: {}",
            if self.api_key().is_some() {
                "<redacted>"
            } else {
                "<not set>"
            }
        );
        tracing::info!("  Default count: {}", self.search.default_count);
        tracing::info!("  Max count: {}", self.search.max_count);
        tracing::info!("  Max query length: {}", self.search.max_query_length);
        tracing::info!("  CORS origin: {}", self.cors.allow_origin);
        tracing::info!("  Request timeout: {}s", self.limits.request_timeout_sec);
        tracing::info!("  Max body size: {} bytes", self.limits.max_body_bytes);
    }
}
