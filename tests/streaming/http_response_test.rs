use crate::support::stream_fixture::*;
use chatflux::prelude::*;
use futures_util::StreamExt;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn serve(template: ResponseTemplate) -> (MockServer, reqwest::Response) {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(template)
        .mount(&server)
        .await;

    let response = reqwest::Client::new()
        .post(format!("{}/v1/chat/completions", server.uri()))
        .json(&json!({"model": "deepseek-reasoner", "stream": true}))
        .send()
        .await
        .unwrap();
    (server, response)
}

fn sse_body(vendor: &str, name: &str) -> Vec<u8> {
    std::fs::read(fixture_path(vendor, name)).unwrap()
}

#[tokio::test]
async fn event_stream_response_is_normalized() {
    let template = ResponseTemplate::new(200)
        .set_body_raw(sse_body("deepseek", "reasoning.sse"), "text/event-stream");
    let (_server, response) = serve(template).await;

    let stream = StreamFactory::from_response(response, StreamConfig::new("deepseek"))
        .await
        .unwrap();
    let events: Vec<_> = stream.collect().await;

    assert_eq!(thinking_of(&events), "用户问 2+2。答案是 4。");
    assert_eq!(text_of(&events), "2 + 2 = 4");
    assert_eq!(completion_of(&events).finish_reason, Some(FinishReason::Stop));
}

#[tokio::test]
async fn collect_response_aggregates_http_stream() {
    let template = ResponseTemplate::new(200)
        .set_body_raw(sse_body("openai", "tool_calls.sse"), "text/event-stream");
    let (_server, response) = serve(template).await;

    let stream = StreamFactory::from_response(response, StreamConfig::new("openai"))
        .await
        .unwrap();
    let response = collect_response(stream).await.unwrap();

    assert!(response.has_tool_calls());
    assert_eq!(response.tool_calls[0].function.name, "get_weather");
    assert_eq!(response.tool_calls[0].function.arguments, r#"{"city":"Paris"}"#);
}

#[tokio::test]
async fn error_status_becomes_api_error() {
    let template = ResponseTemplate::new(401).set_body_json(json!({
        "error": {"message": "Invalid API key", "type": "invalid_request_error"}
    }));
    let (_server, response) = serve(template).await;

    match StreamFactory::from_response(response, StreamConfig::new("openai")).await {
        Err(LlmError::ApiError { code, message, details }) => {
            assert_eq!(code, 401);
            assert_eq!(message, "Invalid API key");
            assert!(details.is_some());
        }
        Err(other) => panic!("expected ApiError, got {other:?}"),
        Ok(_) => panic!("expected ApiError, got a stream"),
    }
}

#[tokio::test]
async fn plain_text_error_body_falls_back_to_status_reason() {
    let template = ResponseTemplate::new(503).set_body_string("upstream overloaded");
    let (_server, response) = serve(template).await;

    match StreamFactory::from_response(response, StreamConfig::new("groq")).await {
        Err(LlmError::ApiError { code, message, .. }) => {
            assert_eq!(code, 503);
            assert_eq!(message, "Service Unavailable");
        }
        Err(other) => panic!("expected ApiError, got {other:?}"),
        Ok(_) => panic!("expected ApiError, got a stream"),
    }
}

#[tokio::test]
async fn cancelled_stream_ends_without_terminal_event() {
    let template = ResponseTemplate::new(200)
        .set_body_raw(sse_body("openai", "text.sse"), "text/event-stream");
    let (_server, response) = serve(template).await;

    let handle = StreamFactory::from_response_with_cancel(response, StreamConfig::new("openai"))
        .await
        .unwrap();
    let ChatStreamHandle { mut stream, cancel } = handle;
    cancel.cancel();

    assert!(cancel.is_cancelled());
    assert!(stream.next().await.is_none());
}
