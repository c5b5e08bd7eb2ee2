//! News search tool handler

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

/// Recency filters: past day, week, month, year
const FRESHNESS_VALUES: &[&str] = &["pd", "pw", "pm", "py"];

pub struct NewsSearchHandler {
    services: Arc<Services>,
}

impl NewsSearchHandler {
    pub fn new(services: Arc<Services>) -> Self {
        Self { services }
    }
}

#[derive(Deserialize)]
struct NewsSearchArgs {
    query: String,
    #[serde(default)]
    count: Option<usize>,
    #[serde(default)]
    freshness: Option<String>,
}

#[async_trait]
impl McpToolHandler for NewsSearchHandler {
    fn name(&self) -> &str {
        "news_search"
    }

    fn schema(&self) -> ToolSchema {
        let search = &self.services.config.search;
        ToolSchema {
            name: "news_search".to_string(),
            description: "Search recent news articles. \
                         Returns headlines with URL, publication age and summary. \
                         Use freshness to restrict to the past day (pd), week (pw), \
                         month (pm) or year (py)."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "News search query",
                        "minLength": 1,
                        "maxLength": search.max_query_length
                    },
                    "count": {
                        "type": "integer",
                        "description": "Number of articles to return",
                        "default": search.default_count,
                        "minimum": 1,
                        "maximum": search.max_count
                    },
                    "freshness": {
                        "type": "string",
                        "description": "Recency filter",
                        "enum": FRESHNESS_VALUES
                    }
                },
                "required": ["query"]
            }),
        }
    }

    async fn execute(&self, args: Value) -> Result<ToolResult, McpError> {
        let args: NewsSearchArgs =
            serde_json::from_value(args).map_err(|e| McpError::InvalidParams(e.to_string()))?;

        let config = &self.services.config.search;
        let query = validate_query(&args.query, config.max_query_length)?;
        let count = validate_count(args.count.unwrap_or(config.default_count), config.max_count)?;

        if let Some(freshness) = &args.freshness {
            if !FRESHNESS_VALUES.contains(&freshness.as_str()) {
                return Err(McpError::InvalidParams(format!(
                    "freshness must be one of: {}",
                    FRESHNESS_VALUES.join(", ")
                )));
            }
        }

        let mut request = SearchQuery::news(query, count);
        request.freshness = args.freshness;

        let response = self.services.search.search(request).await?;
        Ok(text_content(format_hits("News results", &response)))
    }
}
