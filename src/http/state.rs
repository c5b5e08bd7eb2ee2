//! Application state for the HTTP boundary
//!
//! Shared across all requests. The session store inside the dispatcher
//! is the only part that changes after startup.

use std::sync::Arc;

use axum::http::{HeaderMap, HeaderName, HeaderValue};
use tracing::warn;

use crate::core::config::{Config, CorsConfig};
use crate::core::error::Result;
use crate::core::services::Services;
use crate::mcp::server::ServerFactory;
use crate::mcp::transport::SessionIdGenerator;
use crate::session::{default_id_generator, InMemorySessionStore, LifecycleDispatcher, SessionStore};

/// Shared application state for Axum handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,

    pub services: Arc<Services>,

    pub dispatcher: Arc<LifecycleDispatcher>,

    /// CORS headers added to every response
    pub cors: Arc<HeaderMap>,
}

impl AppState {
    /// Build the production state: HTTP search client, in-memory
    /// session store and random session ids
    pub fn new(config: Config) -> Result<Self> {
        let services = Arc::new(Services::new(config)?);
        Ok(Self::with_services(
            services,
            Arc::new(InMemorySessionStore::new()),
            default_id_generator(),
        ))
    }

    /// Build state around explicit services, store and id generator
    pub fn with_services(
        services: Arc<Services>,
        store: Arc<dyn SessionStore>,
        id_generator: SessionIdGenerator,
    ) -> Self {
        let config = Arc::clone(&services.config);
        let session = &config.session;

        let dispatcher = LifecycleDispatcher::new(
            session.policy,
            ServerFactory::new(Arc::clone(&services)),
            store,
        )
        .with_id_generator(id_generator)
        .with_response_mode(session.response_mode);

        Self {
            cors: Arc::new(cors_headers(&config.cors)),
            config,
            services,
            dispatcher: Arc::new(dispatcher),
        }
    }
}

/// Render the configured CORS headers. Values that are not valid
/// header values are skipped with a warning.
pub fn cors_headers(cors: &CorsConfig) -> HeaderMap {
    let max_age = cors.max_age_sec.to_string();
    let entries = [
        ("access-control-allow-origin", cors.allow_origin.as_str()),
        ("access-control-allow-methods", cors.allow_methods.as_str()),
        ("access-control-allow-headers", cors.allow_headers.as_str()),
        ("access-control-expose-headers", cors.expose_headers.as_str()),
        ("access-control-max-age", max_age.as_str()),
    ];

    let mut headers = HeaderMap::new();
    for (name, value) in entries {
        match HeaderValue::from_str(value) {
            Ok(value) => {
                headers.insert(HeaderName::from_static(name), value);
            }
            Err(e) => warn!(header = name, error = %e, "Skipping invalid CORS header value"),
        }
    }
    headers
}
