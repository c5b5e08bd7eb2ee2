//! Lifecycle dispatcher tests
//!
//! Session identity, rejection side effects and concurrent handshakes.

use std::collections::HashSet;
use std::sync::Arc;

use axum::http::{HeaderMap, HeaderValue, Method, StatusCode, Uri};
use serde_json::Value;
use tower::ServiceExt as TowerServiceExt;
use websearch_mcp::core::config::SessionPolicy;
use websearch_mcp::core::services::Services;
use websearch_mcp::mcp::adapter::{TransportRequest, TransportResponse};
use websearch_mcp::mcp::server::ServerFactory;
use websearch_mcp::session::{
    default_id_generator, Classification, InMemorySessionStore, LifecycleDispatcher, Rejection,
    SessionStore,
};

use crate::common::*;

fn dispatcher(policy: SessionPolicy) -> (LifecycleDispatcher, Arc<InMemorySessionStore>) {
    let backend = Arc::new(FakeSearchBackend::default());
    let services = Arc::new(Services::with_backend(test_config(policy), backend));
    let store = Arc::new(InMemorySessionStore::new());
    let dispatcher = LifecycleDispatcher::new(policy, ServerFactory::new(services), store.clone())
        .with_id_generator(sequential_ids());
    (dispatcher, store)
}

fn request(body: Value, session_id: Option<&str>) -> TransportRequest {
    let mut headers = HeaderMap::new();
    if let Some(id) = session_id {
        headers.insert("mcp-session-id", HeaderValue::from_str(id).unwrap());
    }
    TransportRequest::new(Method::POST, Uri::from_static("/"), headers, Some(body))
}

async fn initialize(dispatcher: &LifecycleDispatcher) -> String {
    let mut res = TransportResponse::new();
    dispatcher
        .dispatch(&request(initialize_body(1), None), &mut res)
        .await;
    assert_eq!(res.status_code(), StatusCode::OK);
    res.get_header("mcp-session-id").unwrap().to_string()
}

#[tokio::test]
async fn test_reuse_returns_registered_transport() {
    let (dispatcher, store) = dispatcher(SessionPolicy::SessionAware);
    let session_id = initialize(&dispatcher).await;

    let registered = store.lookup(&session_id).await.unwrap();

    for _ in 0..3 {
        let classification = dispatcher
            .classify(&request(list_tools_body(2), Some(&session_id)))
            .await
            .unwrap();
        match classification {
            Classification::Reuse(transport) => assert!(Arc::ptr_eq(&transport, &registered)),
            other => panic!("expected reuse, got {}", other.label()),
        }
    }
}

#[tokio::test]
async fn test_concurrent_reuse_observes_same_transport() {
    let (dispatcher, store) = dispatcher(SessionPolicy::SessionAware);
    let dispatcher = Arc::new(dispatcher);
    let session_id = initialize(&dispatcher).await;
    let registered = store.lookup(&session_id).await.unwrap();

    let mut handles = Vec::new();
    for i in 0..16 {
        let dispatcher = Arc::clone(&dispatcher);
        let session_id = session_id.clone();
        handles.push(tokio::spawn(async move {
            let req = request(list_tools_body(i), Some(&session_id));
            let classification = dispatcher.classify(&req).await.unwrap();
            let mut res = TransportResponse::new();
            dispatcher.dispatch(&req, &mut res).await;
            assert_eq!(res.status_code(), StatusCode::OK);
            classification.transport().cloned().unwrap()
        }));
    }

    for handle in handles {
        let transport = handle.await.unwrap();
        assert!(Arc::ptr_eq(&transport, &registered));
    }
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn test_stale_session_is_rejected_without_side_effects() {
    let (dispatcher, store) = dispatcher(SessionPolicy::SessionAware);
    initialize(&dispatcher).await;

    let classification = dispatcher
        .classify(&request(list_tools_body(2), Some("recycled-process-id")))
        .await
        .unwrap();
    assert!(matches!(
        classification,
        Classification::Rejected(Rejection::SessionNotFound(_))
    ));

    let mut res = TransportResponse::new();
    dispatcher
        .dispatch(&request(list_tools_body(2), Some("recycled-process-id")), &mut res)
        .await;

    assert_eq!(res.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_slice(res.body()).unwrap();
    assert_eq!(body["error"]["code"], -32600);
    assert_eq!(body["error"]["message"], "Bad Request: Session not found");
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn test_initialize_mints_one_id_and_registers_before_response() {
    let (dispatcher, store) = dispatcher(SessionPolicy::SessionAwareStrict);

    let session_id = initialize(&dispatcher).await;

    assert_eq!(session_id, "session-1");
    assert_eq!(store.len().await, 1);
    let transport = store.lookup(&session_id).await.unwrap();
    assert_eq!(transport.session_id(), Some("session-1"));
    assert!(transport.is_initialized());
}

#[tokio::test]
async fn test_list_tools_policy_is_consistent() {
    let (aware, aware_store) = dispatcher(SessionPolicy::SessionAware);
    let (strict, strict_store) = dispatcher(SessionPolicy::SessionAwareStrict);

    for i in 0..5 {
        let req = request(list_tools_body(i), None);

        let classification = aware.classify(&req).await.unwrap();
        assert_eq!(classification.label(), "stateless");
        assert!(!classification.transport().unwrap().is_stateful());

        let classification = strict.classify(&req).await.unwrap();
        assert!(matches!(
            classification,
            Classification::Rejected(Rejection::MissingSession)
        ));
    }

    assert_eq!(aware_store.len().await, 0);
    assert_eq!(strict_store.len().await, 0);
}

#[tokio::test]
async fn test_stateless_policy_never_touches_store() {
    let (dispatcher, store) = dispatcher(SessionPolicy::Stateless);

    for body in [initialize_body(1), list_tools_body(2)] {
        let classification = dispatcher.classify(&request(body, Some("ignored"))).await.unwrap();
        assert_eq!(classification.label(), "stateless");
    }

    let mut res = TransportResponse::new();
    dispatcher
        .dispatch(&request(initialize_body(3), None), &mut res)
        .await;
    assert_eq!(res.status_code(), StatusCode::OK);
    assert!(res.get_header("mcp-session-id").is_some());

    assert_eq!(store.len().await, 0);
}

#[tokio::test]
async fn test_concurrent_initializes_get_distinct_sessions() {
    const N: usize = 128;

    let app = create_test_app_with_ids(
        test_config(SessionPolicy::SessionAware),
        default_id_generator(),
    );

    let mut handles = Vec::with_capacity(N);
    for i in 0..N {
        let router = app.router.clone();
        handles.push(tokio::spawn(async move {
            let response = router
                .oneshot(post_json("/", &initialize_body(i as i64), None))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            response
                .headers()
                .get("mcp-session-id")
                .unwrap()
                .to_str()
                .unwrap()
                .to_string()
        }));
    }

    let mut ids = HashSet::new();
    for handle in handles {
        ids.insert(handle.await.unwrap());
    }

    assert_eq!(ids.len(), N);
    assert_eq!(app.store.len().await, N);
    for id in &ids {
        let transport = app.store.lookup(id).await.unwrap();
        assert_eq!(transport.session_id(), Some(id.as_str()));
    }
}
