//! Helper functions for MCP tools

use crate::core::search::SearchResponse;
use crate::mcp::error::McpError;

/// Descriptions longer than this are cut in formatted output
pub const MAX_DESCRIPTION_CHARS: usize = 500;

/// Truncate text if it exceeds max length (in chars, never bytes)
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    let total = text.chars().count();
    if total <= max_chars {
        return text.to_string();
    }

    let truncated: String = text.chars().take(max_chars).collect();
    format!("{}... [Truncated {} chars]", truncated, total - max_chars)
}

/// Validate a query string against the configured length limit
pub fn validate_query(query: &str, max_len: usize) -> Result<&str, McpError> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return Err(McpError::InvalidParams("Query cannot be empty".to_string()));
    }
    if trimmed.chars().count() > max_len {
        return Err(McpError::InvalidParams(format!(
            "Query exceeds maximum length of {max_len} characters"
        )));
    }
    Ok(trimmed)
}

/// Check a requested result count against the configured maximum
pub fn validate_count(count: usize, max: usize) -> Result<usize, McpError> {
    if count == 0 || count > max {
        return Err(McpError::InvalidParams(format!(
            "count must be between 1 and {max}"
        )));
    }
    Ok(count)
}

/// Render search hits as markdown
pub fn format_hits(heading: &str, response: &SearchResponse) -> String {
    let mut output = format!(
        "# {} for '{}'\n\nFound {} results ({}ms)\n\n",
        heading,
        response.query,
        response.hits.len(),
        response.duration_ms
    );

    if response.hits.is_empty() {
        output.push_str("No results found. Try different or broader keywords.");
        return output;
    }

    for (i, hit) in response.hits.iter().enumerate() {
        output.push_str(&format!("## {}. {}\n", i + 1, hit.title));
        output.push_str(&format!("**URL:** {}\n", hit.url));
        if let Some(age) = &hit.age {
            output.push_str(&format!("**Published:** {age}\n"));
        }
        if !hit.description.is_empty() {
            output.push('\n');
            output.push_str(&truncate_text(&hit.description, MAX_DESCRIPTION_CHARS));
            output.push('\n');
        }
        output.push('\n');
    }

    output
}
