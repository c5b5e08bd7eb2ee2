//! Streamable HTTP transport for MCP protocol
//!
//! One transport serves one server instance. When it has a session id
//! generator it is stateful: the first `initialize` mints the session
//! id and every later request must carry it in `mcp-session-id`.
//! Without a generator it answers anything it is handed.

use crate::core::config::ResponseMode;
use crate::mcp::adapter::{AdapterError, TransportRequest, TransportResponse, SESSION_ID_HEADER};
use crate::mcp::protocol::*;
use crate::mcp::server::McpServer;
use axum::http::{header, Method, StatusCode};
use futures::future::BoxFuture;
use serde_json::Value;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use thiserror::Error;
use tracing::{debug, info};

/// Mints session ids for stateful transports
pub type SessionIdGenerator = Arc<dyn Fn() -> String + Send + Sync>;

/// Awaited with the new session id before the initialize response is written
pub type SessionInitializedHook = Box<dyn Fn(String) -> BoxFuture<'static, ()> + Send + Sync>;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Transport is not connected to a server")]
    NotConnected,

    #[error("Transport is already connected to a server")]
    AlreadyConnected,

    #[error(transparent)]
    Adapter(#[from] AdapterError),
}

pub struct TransportOptions {
    pub session_id_generator: Option<SessionIdGenerator>,
    pub on_session_initialized: Option<SessionInitializedHook>,
    /// Check `mcp-session-id` on non-initialize requests
    pub validate_session: bool,
    pub response_mode: ResponseMode,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            session_id_generator: None,
            on_session_initialized: None,
            validate_session: true,
            response_mode: ResponseMode::Json,
        }
    }
}

pub struct StreamableHttpTransport {
    options: TransportOptions,
    server: OnceLock<McpServer>,
    session_id: OnceLock<String>,
    initialized: AtomicBool,
}

impl StreamableHttpTransport {
    pub fn new(options: TransportOptions) -> Self {
        Self {
            options,
            server: OnceLock::new(),
            session_id: OnceLock::new(),
            initialized: AtomicBool::new(false),
        }
    }

    /// Bind the server this transport dispatches to. Only once.
    pub fn connect(&self, server: McpServer) -> Result<(), TransportError> {
        self.server
            .set(server)
            .map_err(|_| TransportError::AlreadyConnected)
    }

    pub fn is_connected(&self) -> bool {
        self.server.get().is_some()
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.get().map(String::as_str)
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    /// Whether this transport mints and checks session ids
    pub fn is_stateful(&self) -> bool {
        self.options.session_id_generator.is_some()
    }

    /// Serve one HTTP exchange
    ///
    /// `body` is the already-parsed JSON body; when `None` the request's
    /// own body is used. Protocol problems are written to `res` as error
    /// envelopes. `Err` is reserved for faults the caller must handle.
    pub async fn handle_request(
        &self,
        req: &TransportRequest,
        res: &mut TransportResponse,
        body: Option<&Value>,
    ) -> Result<(), TransportError> {
        let server = self.server.get().ok_or(TransportError::NotConnected)?;

        if *req.method() != Method::POST {
            res.set_header(header::ALLOW.as_str(), "POST")?;
            return reject(
                res,
                StatusCode::METHOD_NOT_ALLOWED,
                INVALID_REQUEST,
                "Method not allowed.",
            );
        }

        if !accepts_response(req) {
            return reject(
                res,
                StatusCode::NOT_ACCEPTABLE,
                SERVER_ERROR,
                "Not Acceptable: Client must accept application/json or text/event-stream",
            );
        }

        let Some(body) = body.or_else(|| req.body()) else {
            return reject(res, StatusCode::BAD_REQUEST, PARSE_ERROR, "Parse error: empty body");
        };

        let (messages, is_batch) = match IncomingMessage::parse_body(body) {
            Ok(parsed) => parsed,
            Err(e) => {
                return reject(
                    res,
                    StatusCode::BAD_REQUEST,
                    PARSE_ERROR,
                    &format!("Parse error: {e}"),
                );
            }
        };

        if messages.is_empty() {
            return reject(
                res,
                StatusCode::BAD_REQUEST,
                INVALID_REQUEST,
                "Invalid Request: empty batch",
            );
        }

        if messages.iter().any(IncomingMessage::is_initialize) {
            if messages.len() > 1 {
                return reject(
                    res,
                    StatusCode::BAD_REQUEST,
                    INVALID_REQUEST,
                    "Invalid Request: Only one initialization request is allowed",
                );
            }

            if self
                .initialized
                .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
                .is_err()
            {
                return reject(
                    res,
                    StatusCode::BAD_REQUEST,
                    INVALID_REQUEST,
                    "Invalid Request: Server already initialized",
                );
            }

            self.start_session().await;
        } else if let Some((status, code, message)) = self.check_session(req) {
            return reject(res, status, code, message);
        }

        let mut responses = Vec::new();
        for message in messages {
            match message {
                IncomingMessage::Request(request) => {
                    responses.push(server.handle_request(request).await);
                }
                IncomingMessage::Notification(notification) => {
                    server.handle_notification(notification).await;
                }
                IncomingMessage::Response(_) => {
                    debug!("Ignoring client response message");
                }
            }
        }

        if let Some(id) = self.session_id() {
            res.set_header(SESSION_ID_HEADER, id)?;
        }

        if responses.is_empty() {
            res.status(StatusCode::ACCEPTED)?;
            res.end()?;
            return Ok(());
        }

        match self.options.response_mode {
            ResponseMode::Json => {
                if is_batch {
                    res.json(&responses)?;
                } else {
                    res.json(&responses[0])?;
                }
            }
            ResponseMode::Sse => {
                res.set_header(header::CONTENT_TYPE.as_str(), "text/event-stream")?;
                res.set_header(header::CACHE_CONTROL.as_str(), "no-cache")?;
                res.flush_headers();
                for response in &responses {
                    let data = serde_json::to_string(response).map_err(AdapterError::from)?;
                    res.write(format!("event: message\ndata: {data}\n\n").as_bytes())?;
                }
                res.end()?;
            }
        }

        Ok(())
    }

    /// Mint the session id and run the initialization hook
    async fn start_session(&self) {
        let Some(generator) = &self.options.session_id_generator else {
            return;
        };

        let id = generator();
        // The initialize claim above guarantees this runs once per transport
        let _ = self.session_id.set(id.clone());
        info!(session_id = %id, "Session initialized");

        if let Some(hook) = &self.options.on_session_initialized {
            hook(id).await;
        }
    }

    fn check_session(&self, req: &TransportRequest) -> Option<(StatusCode, i32, &'static str)> {
        if !self.is_stateful() || !self.options.validate_session {
            return None;
        }

        if !self.is_initialized() {
            return Some((
                StatusCode::BAD_REQUEST,
                SERVER_ERROR,
                "Bad Request: Server not initialized",
            ));
        }

        match req.session_id() {
            None => Some((
                StatusCode::BAD_REQUEST,
                SERVER_ERROR,
                "Bad Request: Mcp-Session-Id header is required",
            )),
            Some(id) if Some(id) != self.session_id() => {
                Some((StatusCode::NOT_FOUND, SESSION_NOT_FOUND, "Session not found"))
            }
            Some(_) => None,
        }
    }
}

impl fmt::Debug for StreamableHttpTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamableHttpTransport")
            .field("session_id", &self.session_id())
            .field("stateful", &self.is_stateful())
            .field("initialized", &self.is_initialized())
            .field("connected", &self.is_connected())
            .finish()
    }
}

fn reject(
    res: &mut TransportResponse,
    status: StatusCode,
    code: i32,
    message: &str,
) -> Result<(), TransportError> {
    debug!(status = %status.as_u16(), code, reason = message, "Transport rejected request");
    res.status(status)?.json(&error_envelope(code, message))?;
    Ok(())
}

fn accepts_response(req: &TransportRequest) -> bool {
    match req.header(header::ACCEPT.as_str()) {
        None => true,
        Some(accept) => {
            let accept = accept.to_ascii_lowercase();
            accept.contains("application/json")
                || accept.contains("text/event-stream")
                || accept.contains("*/*")
        }
    }
}
