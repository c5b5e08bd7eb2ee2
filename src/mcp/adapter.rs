//! Bridge between axum requests/responses and the MCP transport
//!
//! The transport writes into a `TransportResponse` the way it would
//! write into a streaming HTTP response: headers and status first, then
//! either a single terminal body or a sequence of chunks closed by
//! `end()`. The boundary turns the result into an axum `Response`.

use axum::body::Body;
use axum::http::header::{self, HeaderMap, HeaderName, HeaderValue};
use axum::http::{request::Parts, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

pub const SESSION_ID_HEADER: &str = "mcp-session-id";

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("Response already sent")]
    AlreadySent,

    #[error("Headers already sent")]
    HeadersSent,

    #[error("Invalid header {name}: {reason}")]
    InvalidHeader { name: String, reason: String },

    #[error("Failed to serialize response body: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Read-only view of an inbound request
#[derive(Debug, Clone)]
pub struct TransportRequest {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Option<Value>,
}

impl TransportRequest {
    pub fn new(method: Method, uri: Uri, headers: HeaderMap, body: Option<Value>) -> Self {
        Self {
            method,
            uri,
            headers,
            body,
        }
    }

    pub fn from_parts(parts: &Parts, body: Option<Value>) -> Self {
        Self::new(
            parts.method.clone(),
            parts.uri.clone(),
            parts.headers.clone(),
            body,
        )
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Header value as a string; non-UTF-8 values read as absent
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// The client's session id, if a non-blank one was sent
    pub fn session_id(&self) -> Option<&str> {
        self.header(SESSION_ID_HEADER)
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }

    /// Whether an `mcp-session-id` header was sent at all, usable or not
    pub fn has_session_header(&self) -> bool {
        self.headers.contains_key(SESSION_ID_HEADER)
    }

    /// The session header exactly as sent, lossily decoded
    pub fn raw_session_id(&self) -> Option<String> {
        self.headers
            .get(SESSION_ID_HEADER)
            .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
    }

    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }
}

/// Mutable view of the outbound response
#[derive(Debug)]
pub struct TransportResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
    headers_sent: bool,
    sent: bool,
}

impl TransportResponse {
    pub fn new() -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: Vec::new(),
            headers_sent: false,
            sent: false,
        }
    }

    /// Set a header, replacing any previous value
    pub fn set_header(&mut self, name: &str, value: &str) -> Result<&mut Self, AdapterError> {
        if self.headers_sent {
            return Err(AdapterError::HeadersSent);
        }

        let header_name =
            HeaderName::from_bytes(name.as_bytes()).map_err(|e| AdapterError::InvalidHeader {
                name: name.to_string(),
                reason: e.to_string(),
            })?;
        let header_value = HeaderValue::from_str(value).map_err(|e| AdapterError::InvalidHeader {
            name: name.to_string(),
            reason: e.to_string(),
        })?;

        self.headers.insert(header_name, header_value);
        Ok(self)
    }

    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn status(&mut self, status: StatusCode) -> Result<&mut Self, AdapterError> {
        if self.headers_sent {
            return Err(AdapterError::HeadersSent);
        }
        self.status = status;
        Ok(self)
    }

    pub fn status_code(&self) -> StatusCode {
        self.status
    }

    /// Serialize `value` as the complete body
    pub fn json<T: Serialize>(&mut self, value: &T) -> Result<(), AdapterError> {
        if self.sent {
            return Err(AdapterError::AlreadySent);
        }
        let bytes = serde_json::to_vec(value)?;
        if !self.headers.contains_key(header::CONTENT_TYPE) {
            self.headers.insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/json"),
            );
        }
        self.finish(bytes);
        Ok(())
    }

    /// Send raw bytes as the final part of the body
    pub fn send(&mut self, bytes: impl Into<Vec<u8>>) -> Result<(), AdapterError> {
        if self.sent {
            return Err(AdapterError::AlreadySent);
        }
        self.finish(bytes.into());
        Ok(())
    }

    /// Finish the response without adding to the body
    pub fn end(&mut self) -> Result<(), AdapterError> {
        if self.sent {
            return Err(AdapterError::AlreadySent);
        }
        self.finish(Vec::new());
        Ok(())
    }

    /// Append a streamed chunk; commits the status and headers
    pub fn write(&mut self, chunk: &[u8]) -> Result<(), AdapterError> {
        if self.sent {
            return Err(AdapterError::AlreadySent);
        }
        self.headers_sent = true;
        self.body.extend_from_slice(chunk);
        Ok(())
    }

    /// Commit status and headers. axum sends them together with the
    /// body, so nothing is written here.
    pub fn flush_headers(&mut self) {
        self.headers_sent = true;
    }

    pub fn headers_sent(&self) -> bool {
        self.headers_sent
    }

    pub fn is_sent(&self) -> bool {
        self.sent
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    fn finish(&mut self, bytes: Vec<u8>) {
        self.body.extend(bytes);
        self.headers_sent = true;
        self.sent = true;
    }
}

impl Default for TransportResponse {
    fn default() -> Self {
        Self::new()
    }
}

impl IntoResponse for TransportResponse {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}
