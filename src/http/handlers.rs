//! HTTP boundary handler
//!
//! Every path and method lands here. Preflight and health checks are
//! answered directly; everything else is validated and handed to the
//! lifecycle dispatcher.

use axum::{
    body::{self, Body},
    extract::State,
    http::{request::Parts, Method, Request, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use tracing::debug;

use crate::core::config::SessionPolicy;
use crate::http::error::BoundaryError;
use crate::http::state::AppState;
use crate::mcp::adapter::{TransportRequest, TransportResponse};

/// Fallback handler for all routes
///
/// CORS headers are added to every response, including errors.
pub async fn boundary_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let (parts, body) = request.into_parts();

    let mut response = match handle(&state, &parts, body).await {
        Ok(response) => response,
        Err(e) => {
            debug!(error = %e, "Request rejected at boundary");
            e.into_response()
        }
    };

    for (name, value) in state.cors.iter() {
        response.headers_mut().insert(name.clone(), value.clone());
    }
    response
}

async fn handle(state: &AppState, parts: &Parts, body: Body) -> Result<Response, BoundaryError> {
    if parts.method == Method::OPTIONS {
        return Ok(StatusCode::OK.into_response());
    }

    if (parts.method == Method::GET || parts.method == Method::POST) && is_ping(&parts.uri) {
        return Ok(ping_handler().await.into_response());
    }

    if !state.services.has_credential() {
        return Err(BoundaryError::MissingCredential);
    }

    if state.dispatcher.policy() == SessionPolicy::SessionAwareStrict
        && parts.method != Method::POST
    {
        return Err(BoundaryError::MethodNotAllowed(parts.method.clone()));
    }

    let bytes = body::to_bytes(body, state.config.limits.max_body_bytes)
        .await
        .map_err(|e| BoundaryError::UnreadableBody(e.to_string()))?;

    let body: Option<Value> = if bytes.is_empty() {
        None
    } else {
        let value = serde_json::from_slice(&bytes)
            .map_err(|e| BoundaryError::InvalidJson(e.to_string()))?;
        Some(value)
    };

    let req = TransportRequest::from_parts(parts, body);
    let mut res = TransportResponse::new();
    state.dispatcher.dispatch(&req, &mut res).await;

    Ok(res.into_response())
}

/// Health check handler
pub async fn ping_handler() -> impl IntoResponse {
    Json(json!({ "message": "pong" }))
}

/// `?ping` (with or without a value) or a path ending in `/ping`
fn is_ping(uri: &Uri) -> bool {
    if uri.path().trim_end_matches('/').ends_with("/ping") {
        return true;
    }

    uri.query()
        .map(|query| {
            query
                .split('&')
                .any(|pair| pair.split('=').next() == Some("ping"))
        })
        .unwrap_or(false)
}
