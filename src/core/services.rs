//! Unified service container for websearch-mcp
//!
//! Provides shared access to all core services.

use crate::core::config::{Config, API_KEY_ENV};
use crate::core::error::{Result, WebSearchError};
use crate::core::search::{HttpSearchClient, SearchBackend, SearchQuery, SearchResponse};
use async_trait::async_trait;
use std::sync::Arc;

/// Unified services container
///
/// Shared by every server instance the factory builds, so the HTTP
/// connection pool outlives individual sessions.
#[derive(Clone)]
pub struct Services {
    /// External search API
    pub search: Arc<dyn SearchBackend>,

    /// Application configuration
    pub config: Arc<Config>,
}

impl Services {
    /// Create services from configuration
    ///
    /// Without a credential the search backend reports
    /// `MissingCredential` on every call instead of failing startup;
    /// the HTTP boundary rejects such requests before they get here.
    pub fn new(config: Config) -> Result<Self> {
        let search: Arc<dyn SearchBackend> = match config.api_key() {
            Some(key) => Arc::new(HttpSearchClient::new(
                config.search.base_url.clone(),
                key,
                config.limits.request_timeout_sec,
            )?),
            None => Arc::new(UnconfiguredBackend),
        };

        Ok(Self {
            search,
            config: Arc::new(config),
        })
    }

    /// Create services around an explicit backend
    pub fn with_backend(config: Config, search: Arc<dyn SearchBackend>) -> Self {
        Self {
            search,
            config: Arc::new(config),
        }
    }

    /// Whether the search API credential is present
    pub fn has_credential(&self) -> bool {
        self.config.api_key().is_some()
    }
}

/// Backend used when no API credential is configured
struct UnconfiguredBackend;

#[async_trait]
impl SearchBackend for UnconfiguredBackend {
    async fn search(&self, _query: SearchQuery) -> Result<SearchResponse> {
        Err(WebSearchError::MissingCredential(API_KEY_ENV.to_string()))
    }
}
