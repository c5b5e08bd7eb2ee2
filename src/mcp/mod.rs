//! MCP (Model Context Protocol) server module
//!
//! JSON-RPC 2.0 message types, the per-transport server, the tool set
//! and the Streamable HTTP transport that carries it.

pub mod adapter;
pub mod error;
pub mod handlers;
pub mod protocol;
pub mod server;
pub mod tools;
pub mod transport;

// Re-export main types
pub use adapter::{AdapterError, TransportRequest, TransportResponse};
pub use error::McpError;
pub use server::{McpServer, ServerFactory};
pub use tools::{McpToolHandler, ToolRegistry};
pub use transport::{
    SessionIdGenerator, SessionInitializedHook, StreamableHttpTransport, TransportError,
    TransportOptions,
};
