use ethrpc::*;
use serde_json::{json, Value};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn rpc_result(id: u64, result: Value) -> Value {
    json!({"jsonrpc": "2.0", "id": id, "result": result})
}

#[tokio::test]
async fn test_call_returns_raw_result() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(rpc_result(1, json!("0x1b4"))))
        .mount(&server)
        .await;

    let endpoint = RpcEndpoint::new(&server.uri()).unwrap();
    let raw = endpoint.call("eth_blockNumber", vec![]).await.unwrap();
    assert_eq!(raw, json!("0x1b4"));

    // and the typed wrapper decodes the hex quantity
    assert_eq!(endpoint.block_number().await.unwrap(), 436);
}

#[tokio::test]
async fn test_block_number_accepts_numeric_literal() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(rpc_result(1, json!(436))))
        .mount(&server)
        .await;

    let endpoint = RpcEndpoint::new(&server.uri()).unwrap();
    assert_eq!(endpoint.block_number().await.unwrap(), 436);
}

#[tokio::test]
async fn test_protocol_error_surfaces_code() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": {"code": -32601, "message": "the method does not exist"}
        })))
        .mount(&server)
        .await;

    let endpoint = RpcEndpoint::new(&server.uri()).unwrap();
    let err = endpoint.call("eth_madeUp", vec![]).await.unwrap_err();
    assert_eq!(err.protocol_code(), Some(-32601));
    assert!(matches!(err, RpcError::Protocol { .. }));
}

#[tokio::test]
async fn test_malformed_body_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let endpoint = RpcEndpoint::new(&server.uri()).unwrap();
    let err = endpoint.call("eth_blockNumber", vec![]).await.unwrap_err();
    assert!(matches!(err, RpcError::Decode { .. }));
}

#[tokio::test]
async fn test_null_result_is_a_valid_answer() {
    let server = MockServer::start().await;
    // unknown hashes legitimately answer with a null result
    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": null
        })))
        .mount(&server)
        .await;

    let endpoint = RpcEndpoint::new(&server.uri()).unwrap();
    let raw = endpoint
        .call("eth_getTransactionByHash", vec![json!("0xdead")])
        .await
        .expect("null result is not an error");
    assert_eq!(raw, Value::Null);

    let tx: Option<String> = endpoint
        .fetch("eth_getTransactionByHash", vec![json!("0xdead")])
        .await
        .unwrap();
    assert!(tx.is_none());
}

#[tokio::test]
async fn test_envelope_without_result_or_error_fails() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"jsonrpc": "2.0", "id": 1})))
        .mount(&server)
        .await;

    let endpoint = RpcEndpoint::new(&server.uri()).unwrap();
    let err = endpoint.call("eth_blockNumber", vec![]).await.unwrap_err();
    assert!(matches!(err, RpcError::EmptyEnvelope { .. }));
}

#[tokio::test]
async fn test_override_answers_without_host() {
    let mut endpoint = RpcEndpoint::local();
    endpoint.register_override("ping", |_: &[Value]| Ok(json!(42)));

    let raw = endpoint.call("ping", vec![]).await.unwrap();
    assert_eq!(raw, json!(42));
}

#[tokio::test]
async fn test_override_takes_precedence_over_network() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(rpc_result(1, json!("0xff"))))
        .mount(&server)
        .await;

    let mut endpoint = RpcEndpoint::new(&server.uri()).unwrap();
    endpoint.register_override("eth_chainId", |_: &[Value]| Ok(json!("0x1")));

    let raw = endpoint.call("eth_chainId", vec![]).await.unwrap();
    assert_eq!(raw, json!("0x1"));

    let received = server.received_requests().await.unwrap();
    assert!(received.is_empty(), "override must not hit the network");
}

#[tokio::test]
async fn test_override_receives_positional_args() {
    let mut endpoint = RpcEndpoint::local();
    endpoint.register_override("echo", |args: &[Value]| {
        args.first()
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("missing argument"))
    });

    let raw = endpoint.call("echo", vec![json!("abc")]).await.unwrap();
    assert_eq!(raw, json!("abc"));
}

#[tokio::test]
async fn test_override_rejects_named_params() {
    let mut endpoint = RpcEndpoint::local();
    endpoint.register_override("ping", |_: &[Value]| Ok(json!(42)));

    let req = JsonRpcRequest {
        jsonrpc: "2.0".into(),
        method: "ping".into(),
        params: json!({"style": "named"}),
        id: 9,
    };
    let err = endpoint.send(&req).await.unwrap_err();
    assert!(matches!(err, RpcError::PositionalParams(_)));
}

#[tokio::test]
async fn test_override_failure_is_wrapped() {
    let mut endpoint = RpcEndpoint::local();
    endpoint.register_override("boom", |_: &[Value]| Err(anyhow::anyhow!("kaput")));

    let err = endpoint.call("boom", vec![]).await.unwrap_err();
    assert!(matches!(err, RpcError::Override { .. }));
}

#[tokio::test]
async fn test_no_host_and_no_override_is_not_found() {
    let endpoint = RpcEndpoint::local();
    let err = endpoint.call("eth_blockNumber", vec![]).await.unwrap_err();
    assert!(matches!(err, RpcError::NotFound(_)));
}

#[tokio::test]
async fn test_basic_auth_header_is_attached() {
    let server = MockServer::start().await;
    // only answer requests carrying the expected credentials
    Mock::given(method("POST"))
        .and(path("/"))
        .and(header("authorization", "Basic dXNlcjpwYXNz"))
        .respond_with(ResponseTemplate::new(200).set_body_json(rpc_result(1, json!("0x1"))))
        .mount(&server)
        .await;

    let mut endpoint = RpcEndpoint::new(&server.uri()).unwrap();
    endpoint.set_basic_auth("user", "pass");
    let raw = endpoint.call("eth_blockNumber", vec![]).await.unwrap();
    assert_eq!(raw, json!("0x1"));
}

#[tokio::test]
async fn test_request_ids_increase_across_calls() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(rpc_result(1, json!("0x1"))))
        .mount(&server)
        .await;

    let endpoint = RpcEndpoint::new(&server.uri()).unwrap();
    endpoint.call("eth_blockNumber", vec![]).await.unwrap();
    endpoint.call("eth_blockNumber", vec![]).await.unwrap();

    let received = server.received_requests().await.unwrap();
    let ids: Vec<u64> = received
        .iter()
        .map(|r| {
            let body: Value = serde_json::from_slice(&r.body).unwrap();
            body["id"].as_u64().unwrap()
        })
        .collect();
    assert_eq!(ids, vec![1, 2]);
}
