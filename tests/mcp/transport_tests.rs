//! Streamable HTTP transport tests

#[cfg(test)]
mod tests {
    use axum::http::{HeaderMap, HeaderValue, Method, StatusCode, Uri};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use websearch_mcp::core::config::{ResponseMode, SessionPolicy};
    use websearch_mcp::core::services::Services;
    use websearch_mcp::mcp::adapter::{TransportRequest, TransportResponse};
    use websearch_mcp::mcp::server::ServerFactory;
    use websearch_mcp::mcp::transport::{StreamableHttpTransport, TransportOptions};

    use crate::common::{initialize_body, list_tools_body, test_config, FakeSearchBackend};

    fn connected(options: TransportOptions) -> StreamableHttpTransport {
        let services = Arc::new(Services::with_backend(
            test_config(SessionPolicy::SessionAware),
            Arc::new(FakeSearchBackend::default()),
        ));
        let transport = StreamableHttpTransport::new(options);
        transport
            .connect(ServerFactory::new(services).create_server().unwrap())
            .unwrap();
        transport
    }

    fn post(body: Option<Value>, session_id: Option<&str>) -> TransportRequest {
        let mut headers = HeaderMap::new();
        if let Some(id) = session_id {
            headers.insert("mcp-session-id", HeaderValue::from_str(id).unwrap());
        }
        TransportRequest::new(Method::POST, Uri::from_static("/"), headers, body)
    }

    #[tokio::test]
    async fn test_explicit_body_overrides_request_body() {
        let transport = connected(TransportOptions::default());
        let req = post(Some(json!({"garbage": true})), None);
        let mut res = TransportResponse::new();

        let body = list_tools_body(1);
        transport
            .handle_request(&req, &mut res, Some(&body))
            .await
            .unwrap();

        assert_eq!(res.status_code(), StatusCode::OK);
        let response: Value = serde_json::from_slice(res.body()).unwrap();
        assert_eq!(response["result"]["tools"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_missing_body_is_parse_error() {
        let transport = connected(TransportOptions::default());
        let mut res = TransportResponse::new();

        transport
            .handle_request(&post(None, None), &mut res, None)
            .await
            .unwrap();

        assert_eq!(res.status_code(), StatusCode::BAD_REQUEST);
        let response: Value = serde_json::from_slice(res.body()).unwrap();
        assert_eq!(response["error"]["code"], -32700);
    }

    #[tokio::test]
    async fn test_full_session_exchange() {
        let transport = connected(TransportOptions {
            session_id_generator: Some(Arc::new(|| "s-1".to_string())),
            ..Default::default()
        });

        let mut res = TransportResponse::new();
        transport
            .handle_request(&post(Some(initialize_body(1)), None), &mut res, None)
            .await
            .unwrap();
        assert_eq!(res.get_header("mcp-session-id"), Some("s-1"));

        let mut res = TransportResponse::new();
        let ping = json!({"jsonrpc": "2.0", "id": 2, "method": "ping"});
        transport
            .handle_request(&post(Some(ping), Some("s-1")), &mut res, None)
            .await
            .unwrap();

        assert_eq!(res.status_code(), StatusCode::OK);
        let response: Value = serde_json::from_slice(res.body()).unwrap();
        assert_eq!(response, json!({"jsonrpc": "2.0", "id": 2, "result": {}}));
    }

    #[tokio::test]
    async fn test_sse_batch_writes_one_frame_per_response() {
        let transport = connected(TransportOptions {
            response_mode: ResponseMode::Sse,
            ..Default::default()
        });

        let batch = json!([
            {"jsonrpc": "2.0", "id": 1, "method": "ping"},
            {"jsonrpc": "2.0", "id": 2, "method": "tools/list"}
        ]);
        let mut res = TransportResponse::new();
        transport
            .handle_request(&post(Some(batch), None), &mut res, None)
            .await
            .unwrap();

        assert!(res.is_sent());
        assert_eq!(res.get_header("cache-control"), Some("no-cache"));

        let text = String::from_utf8(res.body().to_vec()).unwrap();
        let frames: Vec<&str> = text.split("\n\n").filter(|f| !f.is_empty()).collect();
        assert_eq!(frames.len(), 2);
        for (i, frame) in frames.iter().enumerate() {
            let data = frame.strip_prefix("event: message\ndata: ").unwrap();
            let response: Value = serde_json::from_str(data).unwrap();
            assert_eq!(response["id"], i as i64 + 1);
        }
    }
}
