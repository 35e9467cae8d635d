//! Streaming completions against a mock server.

use futures::StreamExt;
use mistral_client::{CallOptions, Error, Mistral};
use serde_json::{Map, Value, json};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Route dispatcher tracing through the test harness; `RUST_LOG` controls
/// verbosity. Safe to call from every test, first call wins.
fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn options_for(server: &MockServer) -> CallOptions {
    init_tracing();
    CallOptions::new()
        .api_key("test-key")
        .base_url(server.uri())
}

fn object(value: Value) -> Map<String, Value> {
    value.as_object().expect("object").clone()
}

fn chat_params() -> Map<String, Value> {
    object(json!({
        "model": "mistral-small-latest",
        "messages": [{"role": "user", "content": "stream please"}],
    }))
}

#[tokio::test]
async fn chat_stream_decodes_events_in_order() {
    let server = MockServer::start().await;
    let wire = "data: {\"choices\":[{\"delta\":{\"content\":\"Hel\"}}]}\n\n\
                data: {\"choices\":[{\"delta\":{\"content\":\"lo\"}}]}\n\n\
                data: [DONE]\n\n";

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        // The streaming entry point must force the flag into the payload.
        .and(body_partial_json(json!({"stream": true})))
        .respond_with(ResponseTemplate::new(200).set_body_raw(wire, "text/event-stream"))
        .mount(&server)
        .await;

    let client = Mistral::new().expect("client");
    let stream = client
        .chat()
        .stream(chat_params(), &options_for(&server))
        .await
        .expect("stream established");

    let events: Vec<_> = stream.collect().await;
    let deltas: Vec<String> = events
        .into_iter()
        .map(|e| {
            e.expect("event").payload["choices"][0]["delta"]["content"]
                .as_str()
                .expect("delta")
                .to_string()
        })
        .collect();
    assert_eq!(deltas, vec!["Hel".to_string(), "lo".to_string()]);
}

#[tokio::test]
async fn stream_error_status_is_reported_before_iteration() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(
            ResponseTemplate::new(422).set_body_string("{\"message\":\"bad request\"}"),
        )
        .mount(&server)
        .await;

    let client = Mistral::new().expect("client");
    let result = client
        .chat()
        .stream(chat_params(), &options_for(&server))
        .await;

    match result {
        Err(Error::Api { status_code, body }) => {
            assert_eq!(status_code, 422);
            assert_eq!(body, "{\"message\":\"bad request\"}");
        }
        other => panic!("expected Api error before streaming, got {other:?}"),
    }
}

#[tokio::test]
async fn truncated_stream_ends_with_decode_error() {
    let server = MockServer::start().await;
    let wire = "data: {\"choices\":[{\"delta\":{\"content\":\"ok\"}}]}\n\ndata: {\"choi";

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(wire, "text/event-stream"))
        .mount(&server)
        .await;

    let client = Mistral::new().expect("client");
    let mut stream = client
        .chat()
        .stream(chat_params(), &options_for(&server))
        .await
        .expect("stream established");

    let first = stream.next().await.expect("item").expect("event");
    assert_eq!(first.payload["choices"][0]["delta"]["content"], "ok");

    match stream.next().await {
        Some(Err(Error::Decode { .. })) => {}
        other => panic!("expected Decode error for truncated stream, got {other:?}"),
    }
    assert!(stream.next().await.is_none());
}

#[tokio::test]
async fn agent_stream_uses_agent_completions_path() {
    let server = MockServer::start().await;
    let wire = "data: {\"n\":1}\n\ndata: [DONE]\n\n";

    Mock::given(method("POST"))
        .and(path("/v1/agents/completions"))
        .and(body_partial_json(json!({"stream": true, "agent_id": "agent_7"})))
        .respond_with(ResponseTemplate::new(200).set_body_raw(wire, "text/event-stream"))
        .mount(&server)
        .await;

    let client = Mistral::new().expect("client");
    let params = object(json!({
        "agent_id": "agent_7",
        "messages": [{"role": "user", "content": "go"}],
    }));
    let stream = client
        .agents()
        .stream(params, &options_for(&server))
        .await
        .expect("stream established");

    let events: Vec<_> = stream.collect().await;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].as_ref().expect("event").payload["n"], 1);
}

#[tokio::test]
async fn abandoning_a_stream_is_not_an_error() {
    let server = MockServer::start().await;
    let wire = "data: {\"n\":1}\n\ndata: {\"n\":2}\n\ndata: [DONE]\n\n";

    Mock::given(method("POST"))
        .and(path("/v1/conversations"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(wire, "text/event-stream"))
        .mount(&server)
        .await;

    let client = Mistral::new().expect("client");
    let params = object(json!({"inputs": "hi", "model": "mistral-small-latest"}));
    let mut stream = client
        .conversations()
        .start_stream(params, &options_for(&server))
        .await
        .expect("stream established");

    // Pull one event, then drop the stream; the connection is released with
    // the response body.
    let first = stream.next().await.expect("item").expect("event");
    assert_eq!(first.payload["n"], 1);
    drop(stream);
}
