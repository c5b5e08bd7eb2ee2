//! MCP tool implementations
//!
//! This module contains the tool handlers that make up the capability
//! set registered on every server instance.

pub mod get_server_info;
pub mod handler;
pub mod helpers;
pub mod news_search;
pub mod registry;
pub mod web_search;

pub use get_server_info::GetServerInfoHandler;
pub use handler::{error_content, text_content, McpToolHandler};
pub use helpers::{format_hits, truncate_text};
pub use news_search::NewsSearchHandler;
pub use registry::ToolRegistry;
pub use web_search::WebSearchHandler;

use crate::core::services::Services;
use std::sync::Arc;

/// The default capability set
pub fn default_tools(services: &Arc<Services>) -> Vec<Arc<dyn McpToolHandler>> {
    vec![
        Arc::new(WebSearchHandler::new(Arc::clone(services))),
        Arc::new(NewsSearchHandler::new(Arc::clone(services))),
        Arc::new(GetServerInfoHandler::new(services.config.session.policy)),
    ]
}
