//! Lifecycle dispatcher
//!
//! Classifies each request against the session registry, obtains the
//! transport that should serve it, and runs the exchange. Every path
//! ends in either a protocol response or exactly one error envelope.

use super::store::SessionStore;
use super::default_id_generator;
use crate::core::config::{ResponseMode, SessionPolicy};
use crate::mcp::adapter::{AdapterError, TransportRequest, TransportResponse};
use crate::mcp::error::McpError;
use crate::mcp::protocol::{
    error_envelope, is_initialize_request, is_list_tools_request, INTERNAL_ERROR, INVALID_REQUEST,
};
use crate::mcp::server::ServerFactory;
use crate::mcp::transport::{
    SessionIdGenerator, SessionInitializedHook, StreamableHttpTransport, TransportError,
    TransportOptions,
};
use axum::http::StatusCode;
use futures::FutureExt;
use std::any::Any;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Weak};
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Why a request was refused before reaching a transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// The id is unknown to this process (expired, recycled, or bogus)
    SessionNotFound(String),
    /// No id, and the request cannot be served without one
    MissingSession,
}

impl Rejection {
    /// Stable machine-readable reason
    pub fn reason(&self) -> &'static str {
        match self {
            Rejection::SessionNotFound(_) => "session_not_found",
            Rejection::MissingSession => "missing_session",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Rejection::SessionNotFound(_) => "Bad Request: Session not found",
            Rejection::MissingSession => "Bad Request: No valid session ID provided",
        }
    }

    pub fn code(&self) -> i32 {
        INVALID_REQUEST
    }

    pub fn status(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Outcome of classifying one request
#[derive(Debug)]
pub enum Classification {
    Reuse(Arc<StreamableHttpTransport>),
    CreateSession(Arc<StreamableHttpTransport>),
    Stateless(Arc<StreamableHttpTransport>),
    Rejected(Rejection),
}

impl Classification {
    pub fn label(&self) -> &'static str {
        match self {
            Classification::Reuse(_) => "reuse",
            Classification::CreateSession(_) => "create_session",
            Classification::Stateless(_) => "stateless",
            Classification::Rejected(_) => "rejected",
        }
    }

    pub fn transport(&self) -> Option<&Arc<StreamableHttpTransport>> {
        match self {
            Classification::Reuse(t)
            | Classification::CreateSession(t)
            | Classification::Stateless(t) => Some(t),
            Classification::Rejected(_) => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Failed to build server: {0}")]
    Server(#[from] McpError),

    #[error("Transport failure: {0}")]
    Transport(#[from] TransportError),

    #[error("Response failure: {0}")]
    Adapter(#[from] AdapterError),

    #[error("Request handler panicked: {0}")]
    Panic(String),
}

pub struct LifecycleDispatcher {
    policy: SessionPolicy,
    factory: ServerFactory,
    store: Arc<dyn SessionStore>,
    id_generator: SessionIdGenerator,
    response_mode: ResponseMode,
}

impl LifecycleDispatcher {
    pub fn new(policy: SessionPolicy, factory: ServerFactory, store: Arc<dyn SessionStore>) -> Self {
        Self {
            policy,
            factory,
            store,
            id_generator: default_id_generator(),
            response_mode: ResponseMode::default(),
        }
    }

    pub fn with_id_generator(mut self, id_generator: SessionIdGenerator) -> Self {
        self.id_generator = id_generator;
        self
    }

    pub fn with_response_mode(mut self, response_mode: ResponseMode) -> Self {
        self.response_mode = response_mode;
        self
    }

    pub fn policy(&self) -> SessionPolicy {
        self.policy
    }

    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    /// Decide how `req` is served
    ///
    /// A session header always wins over the body. Transports returned
    /// here are already connected to a fresh server, except for `Reuse`
    /// which hands back the registered one.
    pub async fn classify(&self, req: &TransportRequest) -> Result<Classification, DispatchError> {
        if self.policy == SessionPolicy::Stateless {
            return Ok(Classification::Stateless(self.stateless_transport()?));
        }

        if req.has_session_header() {
            // Blank or non-ASCII ids can never have been minted here
            let Some(id) = req.session_id() else {
                let raw = req.raw_session_id().unwrap_or_default();
                return Ok(Classification::Rejected(Rejection::SessionNotFound(raw)));
            };
            return Ok(match self.store.lookup(id).await {
                Some(transport) => Classification::Reuse(transport),
                None => Classification::Rejected(Rejection::SessionNotFound(id.to_string())),
            });
        }

        let body = req.body();
        if body.is_some_and(is_initialize_request) {
            return Ok(Classification::CreateSession(self.session_transport()?));
        }

        if body.is_some_and(is_list_tools_request) && self.policy == SessionPolicy::SessionAware {
            return Ok(Classification::Stateless(self.one_shot_transport()?));
        }

        Ok(Classification::Rejected(Rejection::MissingSession))
    }

    /// Classify and serve `req`, writing the outcome into `res`
    ///
    /// Faults (including panics) before anything was sent become a single
    /// 500 envelope. Once the response has started they are only logged.
    pub async fn dispatch(&self, req: &TransportRequest, res: &mut TransportResponse) {
        let outcome = AssertUnwindSafe(self.execute(req, res)).catch_unwind().await;

        let fault = match outcome {
            Ok(Ok(())) => return,
            Ok(Err(e)) => e,
            Err(payload) => DispatchError::Panic(panic_message(payload.as_ref())),
        };

        if res.headers_sent() {
            error!(
                policy = %self.policy,
                error = %fault,
                "Fault after response started"
            );
            if !res.is_sent() {
                let _ = res.end();
            }
            return;
        }

        error!(policy = %self.policy, error = %fault, "Request failed");
        let written = res
            .status(StatusCode::INTERNAL_SERVER_ERROR)
            .and_then(|res| res.json(&error_envelope(INTERNAL_ERROR, "Internal server error")));
        if let Err(e) = written {
            error!(error = %e, "Failed to write error response");
        }
    }

    async fn execute(
        &self,
        req: &TransportRequest,
        res: &mut TransportResponse,
    ) -> Result<(), DispatchError> {
        let classification = self.classify(req).await?;
        debug!(
            policy = %self.policy,
            classification = classification.label(),
            session_id = req.session_id().unwrap_or("-"),
            "Classified request"
        );

        let transport = match classification {
            Classification::Reuse(transport)
            | Classification::CreateSession(transport)
            | Classification::Stateless(transport) => transport,
            Classification::Rejected(rejection) => {
                warn!(
                    policy = %self.policy,
                    reason = rejection.reason(),
                    "Rejecting request"
                );
                res.status(rejection.status())?
                    .json(&error_envelope(rejection.code(), rejection.message()))?;
                return Ok(());
            }
        };

        transport.handle_request(req, res, req.body()).await?;
        Ok(())
    }

    /// Stateful transport that registers itself once the handshake mints an id
    fn session_transport(&self) -> Result<Arc<StreamableHttpTransport>, DispatchError> {
        let server = self.factory.create_server()?;
        let store = Arc::clone(&self.store);

        let transport = Arc::new_cyclic(|weak: &Weak<StreamableHttpTransport>| {
            let weak = weak.clone();
            let on_session_initialized: SessionInitializedHook = Box::new(move |id: String| {
                let store = Arc::clone(&store);
                let weak = weak.clone();
                async move {
                    match weak.upgrade() {
                        Some(transport) => store.register(id, transport).await,
                        None => warn!(session_id = %id, "Transport dropped before registration"),
                    }
                }
                .boxed()
            });

            StreamableHttpTransport::new(TransportOptions {
                session_id_generator: Some(Arc::clone(&self.id_generator)),
                on_session_initialized: Some(on_session_initialized),
                validate_session: true,
                response_mode: self.response_mode,
            })
        });

        transport.connect(server)?;
        info!(policy = %self.policy, "Creating session transport");
        Ok(transport)
    }

    /// Unregistered transport that never mints an id
    fn one_shot_transport(&self) -> Result<Arc<StreamableHttpTransport>, DispatchError> {
        let server = self.factory.create_server()?;
        let transport = Arc::new(StreamableHttpTransport::new(TransportOptions {
            response_mode: self.response_mode,
            ..Default::default()
        }));
        transport.connect(server)?;
        Ok(transport)
    }

    /// Disposable transport for the stateless policy
    fn stateless_transport(&self) -> Result<Arc<StreamableHttpTransport>, DispatchError> {
        let server = self.factory.create_server()?;
        let transport = Arc::new(StreamableHttpTransport::new(TransportOptions {
            session_id_generator: Some(Arc::clone(&self.id_generator)),
            on_session_initialized: None,
            validate_session: false,
            response_mode: self.response_mode,
        }));
        transport.connect(server)?;
        Ok(transport)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
