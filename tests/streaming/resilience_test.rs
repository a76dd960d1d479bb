use crate::support::stream_fixture::*;
use bytes::Bytes;
use chatflux::prelude::*;
use futures_util::StreamExt;
use proptest::prelude::*;
use proptest::sample::Index;

fn chunk(json: &str) -> Bytes {
    Bytes::from(format!("data: {json}\n\n"))
}

#[tokio::test]
async fn transport_error_ends_stream_with_error() {
    let bytes = futures_util::stream::iter(vec![
        Ok(chunk(r#"{"choices":[{"delta":{"content":"partial"}}]}"#)),
        Err(LlmError::HttpError("connection reset".to_string())),
        Ok(chunk(r#"{"choices":[{"delta":{"content":"never seen"}}]}"#)),
    ]);
    let events: Vec<_> = StreamFactory::create_unified_stream(bytes, StreamConfig::new("openai"))
        .collect()
        .await;

    assert_eq!(events.len(), 2);
    assert_eq!(events[0], ChatStreamEvent::text("partial"));
    assert_terminal_exclusive(&events);
    match &events[1] {
        ChatStreamEvent::Error { error } => {
            assert_eq!(error.stream_error_kind(), Some(StreamErrorKind::TransportFailure));
        }
        other => panic!("expected error, got {other:?}"),
    }
}

#[tokio::test]
async fn eof_without_finish_or_done_is_transport_failure() {
    let chunks = vec![chunk(r#"{"choices":[{"delta":{"content":"Hi"}}]}"#)];
    let events = collect_events(chunks, StreamConfig::new("openai")).await;

    assert_eq!(events[0], ChatStreamEvent::text("Hi"));
    assert_terminal_exclusive(&events);
    assert!(matches!(
        events.last(),
        Some(ChatStreamEvent::Error { error })
            if error.stream_error_kind() == Some(StreamErrorKind::TransportFailure)
    ));
}

#[tokio::test]
async fn finish_reason_without_done_completes() {
    let chunks = vec![
        chunk(r#"{"choices":[{"delta":{"content":"Hi"}}]}"#),
        chunk(r#"{"choices":[{"delta":{},"finish_reason":"length"}]}"#),
    ];
    let events = collect_events(chunks, StreamConfig::new("openai")).await;

    let response = completion_of(&events);
    assert_eq!(response.finish_reason, Some(FinishReason::Length));
    assert_eq!(response.text, "Hi");
}

#[tokio::test]
async fn nothing_is_read_after_done() {
    let bytes = futures_util::stream::iter(vec![
        Ok(chunk(r#"{"choices":[{"delta":{"content":"Hi"}}]}"#)),
        Ok(Bytes::from_static(b"data: [DONE]\n\n")),
        Err(LlmError::HttpError("late failure".to_string())),
    ]);
    let events: Vec<_> = StreamFactory::create_unified_stream(bytes, StreamConfig::new("openai"))
        .collect()
        .await;

    assert_eq!(events, vec![ChatStreamEvent::text("Hi")]);
}

#[tokio::test]
async fn truncated_codepoint_at_eof_is_discarded_and_reported() {
    let chunks = vec![
        chunk(r#"{"choices":[{"delta":{"content":"Hi"}}]}"#),
        Bytes::from_static(b"\xE4\xB8"),
    ];
    let (stream, diagnostics) = StreamFactory::create_unified_stream_with_diagnostics(
        byte_stream(chunks),
        StreamConfig::new("openai"),
    );
    let events: Vec<_> = stream.collect().await;

    assert_eq!(events[0], ChatStreamEvent::text("Hi"));
    assert!(matches!(events.last(), Some(ChatStreamEvent::Error { .. })));
    assert_eq!(diagnostics.discarded_trailing_bytes(), 2);
}

fn split_at(bytes: &[u8], cuts: &[Index]) -> Vec<Bytes> {
    let mut points: Vec<usize> = cuts.iter().map(|i| i.index(bytes.len())).collect();
    points.sort_unstable();
    points.dedup();

    let mut out = Vec::new();
    let mut start = 0;
    for point in points {
        out.push(Bytes::copy_from_slice(&bytes[start..point]));
        start = point;
    }
    out.push(Bytes::copy_from_slice(&bytes[start..]));
    out
}

proptest! {
    #[test]
    fn prop_random_splits_preserve_events(cuts in prop::collection::vec(any::<Index>(), 0..12)) {
        let fixture = load_sse_fixture_as_bytes("deepseek", "reasoning.sse").unwrap();
        let bytes = Bytes::from(fixture.concat());

        let config = StreamConfig::new("deepseek");
        let baseline = tokio_test::block_on(collect_events(vec![bytes.clone()], config.clone()));
        let events = tokio_test::block_on(collect_events(split_at(&bytes, &cuts), config));

        prop_assert_eq!(text_of(&events), text_of(&baseline));
        prop_assert_eq!(thinking_of(&events), thinking_of(&baseline));
        prop_assert_eq!(events.last(), baseline.last());
    }
}
