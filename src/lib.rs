//! websearch-mcp - Web search tools over MCP Streamable HTTP
//!
//! An MCP server exposing web and news search over JSON-RPC 2.0 on
//! HTTP, built for hosts that may recycle the process between any two
//! requests. Losing in-memory session state is reported to the client
//! as a normal protocol rejection.
//!
//! # Architecture
//!
//! - **core**: Domain logic (protocol-agnostic)
//!   - config, error
//!   - search (search API client)
//!   - services (service container)
//!
//! - **mcp**: MCP protocol (depends on core)
//!   - protocol, server, tools
//!   - adapter, transport (Streamable HTTP)
//!
//! - **session**: Session lifecycle (depends on mcp)
//!   - store (session registry)
//!   - dispatcher (per-request classification)
//!
//! - **http**: HTTP boundary (depends on session)
//!   - handlers, middleware, error, state

// Core domain logic (protocol-agnostic)
pub mod core;

// HTTP boundary
pub mod http;

// MCP (Model Context Protocol) protocol and transport
pub mod mcp;

// Session registry and lifecycle dispatch
pub mod session;

// Re-export commonly used types for convenience
pub use core::config::{Config, ResponseMode, SessionPolicy};
pub use core::error::{Result, WebSearchError};
pub use core::services::Services;
pub use http::{router, AppState};
pub use session::{InMemorySessionStore, LifecycleDispatcher, SessionStore};
