//! Core domain logic (protocol-agnostic)
//!
//! This module contains everything that is independent of the MCP
//! transport and the HTTP host.
//!
//! # Architecture
//!
//! - **config**: Configuration loading (TOML + environment)
//! - **error**: Error types and Result alias
//! - **search**: External search API client
//! - **services**: Unified service container

pub mod config;
pub mod error;
pub mod search;
pub mod services;

// Re-export key types for convenience
pub use config::Config;
pub use error::{Result, WebSearchError};
pub use services::Services;
