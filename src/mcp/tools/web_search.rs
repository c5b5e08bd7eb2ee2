//! Web search tool handler

use super::handler::{text_content, McpToolHandler};
use super::helpers::{format_hits, validate_count, validate_query};
use crate::core::search::SearchQuery;
use crate::core::services::Services;
use crate::mcp::error::McpError;
use crate::mcp::protocol::{ToolResult, ToolSchema};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

/// Highest page offset the search API accepts
const MAX_OFFSET: usize = 9;

pub struct WebSearchHandler {
    services: Arc<Services>,
}

impl WebSearchHandler {
    pub fn new(services: Arc<Services>) -> Self {
        Self { services }
    }
}

#[derive(Deserialize)]
struct WebSearchArgs {
    query: String,
    #[serde(default)]
    count: Option<usize>,
    #[serde(default)]
    offset: usize,
}

#[async_trait]
impl McpToolHandler for WebSearchHandler {
    fn name(&self) -> &str {
        "web_search"
    }

    fn schema(&self) -> ToolSchema {
        let search = &self.services.config.search;
        ToolSchema {
            name: "web_search".to_string(),
            description: "Search the web for pages matching a query. \
                         Returns ranked results with title, URL and a short description. \
                         Use for general information, documentation lookups and fact finding. \
                         Use offset to page through results (10 per page by default). \
                         For recent events prefer news_search."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "Search query, e.g. 'tokio graceful shutdown'",
                        "minLength": 1,
                        "maxLength": search.max_query_length
                    },
                    "count": {
                        "type": "integer",
                        "description": "Number of results to return",
                        "default": search.default_count,
                        "minimum": 1,
                        "maximum": search.max_count
                    },
                    "offset": {
                        "type": "integer",
                        "description": "Page offset for pagination",
                        "default": 0,
                        "minimum": 0,
                        "maximum": MAX_OFFSET
                    }
                },
                "required": ["query"]
            }),
        }
    }

    async fn execute(&self, args: Value) -> Result<ToolResult, McpError> {
        let args: WebSearchArgs =
            serde_json::from_value(args).map_err(|e| McpError::InvalidParams(e.to_string()))?;

        let config = &self.services.config.search;
        let query = validate_query(&args.query, config.max_query_length)?;
        let count = validate_count(args.count.unwrap_or(config.default_count), config.max_count)?;
        if args.offset > MAX_OFFSET {
            return Err(McpError::InvalidParams(format!(
                "offset must be between 0 and {MAX_OFFSET}"
            )));
        }

        let mut request = SearchQuery::web(query, count);
        request.offset = args.offset;

        let response = self.services.search.search(request).await?;
        Ok(text_content(format_hits("Web results", &response)))
    }
}
