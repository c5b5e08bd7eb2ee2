//! Errors raised at the HTTP boundary before a request reaches the
//! dispatcher. Each one renders as a JSON-RPC error envelope.

use axum::{
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::mcp::protocol::{error_envelope, INTERNAL_ERROR, INVALID_REQUEST, PARSE_ERROR};

#[derive(Debug, Error)]
pub enum BoundaryError {
    #[error("Server configuration error: SEARCH_API_KEY is not set")]
    MissingCredential,

    #[error("Method not allowed: {0}")]
    MethodNotAllowed(Method),

    #[error("Parse error: {0}")]
    UnreadableBody(String),

    #[error("Parse error: {0}")]
    InvalidJson(String),
}

impl BoundaryError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            BoundaryError::MissingCredential => StatusCode::INTERNAL_SERVER_ERROR,
            BoundaryError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            BoundaryError::UnreadableBody(_) | BoundaryError::InvalidJson(_) => {
                StatusCode::BAD_REQUEST
            }
        }
    }

    /// JSON-RPC error code carried in the envelope
    pub fn code(&self) -> i32 {
        match self {
            BoundaryError::MissingCredential => INTERNAL_ERROR,
            BoundaryError::MethodNotAllowed(_) => INVALID_REQUEST,
            BoundaryError::UnreadableBody(_) | BoundaryError::InvalidJson(_) => PARSE_ERROR,
        }
    }

    pub fn message(&self) -> String {
        self.to_string()
    }
}

impl IntoResponse for BoundaryError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(error_envelope(self.code(), self.message()));

        (status, body).into_response()
    }
}
