//! External search API integration
//!
//! Tools never talk to the network directly; they go through the
//! [`SearchBackend`] trait so tests can substitute a fake.

pub mod client;

pub use client::HttpSearchClient;

use crate::core::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Which index of the search API to query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchKind {
    Web,
    News,
}

/// A single outbound search request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub kind: SearchKind,
    pub query: String,
    pub count: usize,
    pub offset: usize,
    /// Recency filter (`pd`, `pw`, `pm`, `py`)
    pub freshness: Option<String>,
}

impl SearchQuery {
    pub fn web(query: impl Into<String>, count: usize) -> Self {
        Self {
            kind: SearchKind::Web,
            query: query.into(),
            count,
            offset: 0,
            freshness: None,
        }
    }

    pub fn news(query: impl Into<String>, count: usize) -> Self {
        Self {
            kind: SearchKind::News,
            query: query.into(),
            count,
            offset: 0,
            freshness: None,
        }
    }
}

/// A single search hit, normalized across web and news results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub description: String,
    /// Human-readable age ("2 hours ago"), news results only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<String>,
}

/// Search results returned by a backend
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub query: String,
    pub hits: Vec<SearchHit>,
    pub duration_ms: u64,
}

/// Capability to run searches against an external API
#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn search(&self, query: SearchQuery) -> Result<SearchResponse>;
}
