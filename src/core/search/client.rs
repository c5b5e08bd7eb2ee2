//! HTTP client for the external search API.
//!
//! The client uses reqwest's built-in connection pooling, so a single
//! instance is shared by every tool and every session in the process.
//!
//! Errors are classified into `WebSearchError` variants:
//! - Timeout errors -> `UpstreamTimeout`
//! - Non-2xx responses -> `UpstreamStatus`
//! - Connection and decode errors -> `UpstreamError`
//!
//! No automatic retry. Clients retry at the MCP level.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use super::{SearchBackend, SearchHit, SearchKind, SearchQuery, SearchResponse};
use crate::core::error::{Result, WebSearchError};

/// Header carrying the API credential
const TOKEN_HEADER: &str = "X-Subscription-Token";

/// Upstream error bodies are truncated to this many chars in messages
const MAX_ERROR_BODY_CHARS: usize = 200;

pub struct HttpSearchClient {
    client: Client,
    base_url: String,
    api_key: String,
    timeout_sec: u64,
}

impl HttpSearchClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout_sec: u64,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_sec))
            .connect_timeout(Duration::from_secs(timeout_sec.min(5)))
            .build()
            .map_err(|e| WebSearchError::ConfigError(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            timeout_sec,
        })
    }

    fn endpoint(&self, kind: SearchKind) -> String {
        match kind {
            SearchKind::Web => format!("{}/web/search", self.base_url),
            SearchKind::News => format!("{}/news/search", self.base_url),
        }
    }

    fn classify(&self, err: reqwest::Error) -> WebSearchError {
        if err.is_timeout() {
            WebSearchError::UpstreamTimeout(self.timeout_sec)
        } else {
            WebSearchError::UpstreamError(err.to_string())
        }
    }
}

#[async_trait]
impl SearchBackend for HttpSearchClient {
    async fn search(&self, query: SearchQuery) -> Result<SearchResponse> {
        let start = Instant::now();
        let url = self.endpoint(query.kind);

        let mut params: Vec<(&str, String)> = vec![
            ("q", query.query.clone()),
            ("count", query.count.to_string()),
        ];
        if query.offset > 0 {
            params.push(("offset", query.offset.to_string()));
        }
        if let Some(freshness) = &query.freshness {
            params.push(("freshness", freshness.clone()));
        }

        debug!(url = %url, kind = ?query.kind, count = query.count, "Calling search API");

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .header(TOKEN_HEADER, &self.api_key)
            .query(&params)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
            warn!(status = status.as_u16(), "Search API returned error status");
            return Err(WebSearchError::UpstreamStatus {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await.map_err(|e| self.classify(e))?;
        let hits = parse_hits(query.kind, &body)?;

        Ok(SearchResponse {
            query: query.query,
            hits,
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }
}

#[derive(Deserialize)]
struct WebEnvelope {
    #[serde(default)]
    web: Option<ResultList>,
}

#[derive(Deserialize, Default)]
struct ResultList {
    #[serde(default)]
    results: Vec<SearchHit>,
}

/// Decode an API response body into normalized hits
pub(crate) fn parse_hits(kind: SearchKind, body: &str) -> Result<Vec<SearchHit>> {
    let decode = |e: serde_json::Error| {
        WebSearchError::UpstreamError(format!("Unexpected search API response: {e}"))
    };

    match kind {
        SearchKind::Web => {
            let envelope: WebEnvelope = serde_json::from_str(body).map_err(decode)?;
            Ok(envelope.web.unwrap_or_default().results)
        }
        SearchKind::News => {
            let list: ResultList = serde_json::from_str(body).map_err(decode)?;
            Ok(list.results)
        }
    }
}
