//! Integration tests for the HTTP boundary
//!
//! Drives the full router (boundary, dispatcher, transport, server)
//! with a fake search backend.

use axum::{
    body::Body,
    http::{HeaderMap, HeaderValue, Request, StatusCode},
};
use serde_json::json;
use tower::ServiceExt as TowerServiceExt;
use websearch_mcp::core::config::{Config, ResponseMode, SessionPolicy};
use websearch_mcp::session::SessionStore;

use crate::common::*;

fn cors_headers(headers: &HeaderMap) -> Vec<(String, String)> {
    let mut cors: Vec<(String, String)> = headers
        .iter()
        .filter(|(name, _)| name.as_str().starts_with("access-control-"))
        .map(|(name, value)| (name.to_string(), value.to_str().unwrap().to_string()))
        .collect();
    cors.sort();
    cors
}

#[tokio::test]
async fn test_scenario_initialize_then_call_tool() {
    let app = create_test_app(test_config(SessionPolicy::SessionAware));

    // Step 1: Initialize without a session
    let response = app
        .router
        .clone()
        .oneshot(post_json("/", &initialize_body(1), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let session_id = response
        .headers()
        .get("mcp-session-id")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert_eq!(session_id, "session-1");

    let init = read_json(response).await;
    assert_eq!(init["id"], 1);
    assert_eq!(init["result"]["serverInfo"]["name"], "websearch-mcp");
    assert_eq!(app.store.len().await, 1);

    // Step 2: Initialized notification
    let notification = json!({"jsonrpc": "2.0", "method": "notifications/initialized"});
    let response = app
        .router
        .clone()
        .oneshot(post_json("/", &notification, Some(&session_id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    // Step 3: Tool call on the same session
    let call = call_tool_body(2, "web_search", json!({"query": "rust async"}));
    let response = app
        .router
        .clone()
        .oneshot(post_json("/", &call, Some(&session_id)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("mcp-session-id").unwrap(),
        session_id.as_str()
    );

    let result = read_json(response).await;
    assert_eq!(result["id"], 2);
    assert!(result.get("error").is_none());
    assert!(result["result"].get("isError").is_none());
    let text = result["result"]["content"][0]["text"].as_str().unwrap();
    assert!(text.contains("Result for rust async"));

    let queries = app.backend.queries();
    assert_eq!(queries.len(), 1);
    assert_eq!(queries[0].query, "rust async");

    // No extra session was created along the way
    assert_eq!(app.store.len().await, 1);
}

#[tokio::test]
async fn test_scenario_unknown_session_rejected() {
    let app = create_test_app(test_config(SessionPolicy::SessionAware));

    let response = app
        .router
        .clone()
        .oneshot(post_json("/", &list_tools_body(1), Some("bogus-id")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json(response).await;
    assert_eq!(body["jsonrpc"], "2.0");
    assert!(body["id"].is_null());
    assert_eq!(body["error"]["code"], -32600);
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("Session not found"));

    assert_eq!(app.store.len().await, 0);
}

#[tokio::test]
async fn test_unknown_session_with_initialize_body_rejected() {
    let app = create_test_app(test_config(SessionPolicy::SessionAware));

    let response = app
        .router
        .clone()
        .oneshot(post_json("/", &initialize_body(1), Some("expired")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(response.headers().get("mcp-session-id").is_none());
    assert_eq!(app.store.len().await, 0);
}

#[tokio::test]
async fn test_non_ascii_session_with_initialize_body_rejected() {
    let app = create_test_app(test_config(SessionPolicy::SessionAware));

    let request = Request::builder()
        .method("POST")
        .uri("/")
        .header("content-type", "application/json")
        .header(
            "mcp-session-id",
            HeaderValue::from_bytes("sessión-stale".as_bytes()).unwrap(),
        )
        .body(Body::from(initialize_body(1).to_string()))
        .unwrap();

    let response = app.router.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(response.headers().get("mcp-session-id").is_none());
    let body = read_json(response).await;
    assert_eq!(body["error"]["code"], -32600);
    assert_eq!(body["error"]["message"], "Bad Request: Session not found");
    assert_eq!(app.store.len().await, 0);
}

#[tokio::test]
async fn test_get_on_live_session_is_method_not_allowed() {
    let app = create_test_app(test_config(SessionPolicy::SessionAware));

    let response = app
        .router
        .clone()
        .oneshot(post_json("/", &initialize_body(1), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let request = Request::builder()
        .method("GET")
        .uri("/")
        .header("mcp-session-id", "session-1")
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(response.headers().get("allow").unwrap(), "POST");
    let body = read_json(response).await;
    assert_eq!(body["error"]["code"], -32600);
}

#[tokio::test]
async fn test_scenario_ping_without_credential() {
    let app = create_test_app(Config::default());

    for uri in ["/?ping", "/health/ping"] {
        let response = app
            .router
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("access-control-allow-origin").unwrap(),
            "*"
        );
        assert_eq!(read_json(response).await, json!({"message": "pong"}));
    }
}

#[tokio::test]
async fn test_options_is_idempotent() {
    let app = create_test_app(test_config(SessionPolicy::SessionAware));
    let mut seen = Vec::new();

    for _ in 0..3 {
        let response = app
            .router
            .clone()
            .oneshot(
                Request::builder()
                    .method("OPTIONS")
                    .uri("/")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        seen.push(cors_headers(response.headers()));

        let body = axum::body::to_bytes(response.into_body(), 1_000)
            .await
            .unwrap();
        assert!(body.is_empty());
    }

    assert_eq!(seen[0].len(), 5);
    assert!(seen.iter().all(|headers| headers == &seen[0]));
    assert_eq!(app.store.len().await, 0);
}

#[tokio::test]
async fn test_options_without_credential() {
    let app = create_test_app(Config::default());

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/mcp")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_missing_credential() {
    let app = create_test_app(Config::default());

    let response = app
        .router
        .clone()
        .oneshot(post_json("/", &initialize_body(1), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(response.headers().get("access-control-allow-origin").is_some());

    let body = read_json(response).await;
    assert_eq!(body["error"]["code"], -32603);
    assert!(body["id"].is_null());
    assert_eq!(app.store.len().await, 0);
    assert!(app.backend.queries().is_empty());
}

#[tokio::test]
async fn test_invalid_json_body() {
    let app = create_test_app(test_config(SessionPolicy::SessionAware));

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/")
                .header("content-type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json(response).await;
    assert_eq!(body["error"]["code"], -32700);
}

#[tokio::test]
async fn test_strict_policy_rejects_non_post() {
    let app = create_test_app(test_config(SessionPolicy::SessionAwareStrict));

    let response = app
        .router
        .clone()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    let body = read_json(response).await;
    assert_eq!(body["error"]["code"], -32600);
}

#[tokio::test]
async fn test_list_tools_without_session_by_policy() {
    // Session-aware: served one-shot, nothing registered
    let app = create_test_app(test_config(SessionPolicy::SessionAware));
    let response = app
        .router
        .clone()
        .oneshot(post_json("/", &list_tools_body(1), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get("mcp-session-id").is_none());
    let body = read_json(response).await;
    let names: Vec<&str> = body["result"]["tools"]
        .as_array()
        .unwrap()
        .iter()
        .map(|tool| tool["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["get_server_info", "news_search", "web_search"]);
    assert_eq!(app.store.len().await, 0);

    // Strict: rejected
    let app = create_test_app(test_config(SessionPolicy::SessionAwareStrict));
    let response = app
        .router
        .clone()
        .oneshot(post_json("/", &list_tools_body(1), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json(response).await;
    assert_eq!(body["error"]["code"], -32600);
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("No valid session ID"));
    assert_eq!(app.store.len().await, 0);
}

#[tokio::test]
async fn test_tool_call_without_session_rejected() {
    let app = create_test_app(test_config(SessionPolicy::SessionAware));

    let call = call_tool_body(1, "web_search", json!({"query": "rust"}));
    let response = app
        .router
        .clone()
        .oneshot(post_json("/", &call, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(app.backend.queries().is_empty());
}

#[tokio::test]
async fn test_stateless_policy() {
    let app = create_test_app(test_config(SessionPolicy::Stateless));

    let response = app
        .router
        .clone()
        .oneshot(post_json("/", &initialize_body(1), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get("mcp-session-id").is_some());

    // Any session id is ignored for routing
    let call = call_tool_body(2, "news_search", json!({"query": "rust", "freshness": "pd"}));
    let response = app
        .router
        .clone()
        .oneshot(post_json("/", &call, Some("not-registered")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert!(body["result"]["content"][0]["text"]
        .as_str()
        .unwrap()
        .contains("News results"));

    assert_eq!(app.store.len().await, 0);
}

#[tokio::test]
async fn test_tool_argument_error() {
    let app = create_test_app(test_config(SessionPolicy::Stateless));

    let call = call_tool_body(1, "web_search", json!({"query": "   "}));
    let response = app
        .router
        .clone()
        .oneshot(post_json("/", &call, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["error"]["code"], -32602);
    assert!(app.backend.queries().is_empty());
}

#[tokio::test]
async fn test_sse_response_mode() {
    let mut config = test_config(SessionPolicy::SessionAware);
    config.session.response_mode = ResponseMode::Sse;
    let app = create_test_app(config);

    let response = app
        .router
        .clone()
        .oneshot(post_json("/", &initialize_body(1), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "text/event-stream"
    );
    assert!(response.headers().get("mcp-session-id").is_some());

    let bytes = axum::body::to_bytes(response.into_body(), 100_000)
        .await
        .unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.starts_with("event: message\ndata: "));
    assert!(text.contains("\"serverInfo\""));
}
