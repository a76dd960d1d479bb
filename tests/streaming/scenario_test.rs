use crate::support::stream_fixture::*;
use bytes::Bytes;
use chatflux::prelude::*;
use chatflux::utils::Utf8StreamDecoder;

#[test]
fn decoder_holds_split_codepoint_until_next_chunk() {
    let mut decoder = Utf8StreamDecoder::new();
    assert_eq!(decoder.decode(b"caf\xC3"), "caf");
    assert_eq!(decoder.pending_len(), 1);
    assert_eq!(decoder.decode(b"\xA9 done"), "é done");
    assert!(!decoder.has_pending());
}

#[tokio::test]
async fn codepoint_split_inside_data_line_yields_intact_text() {
    let chunks = vec![
        Bytes::from_static(b"data: {\"content\":\"caf\xC3"),
        Bytes::from_static(b"\xA9 done\"}\n\ndata: {\"finish_reason\":\"stop\"}\n\n"),
    ];
    let events = collect_events(chunks, StreamConfig::default()).await;

    assert_eq!(events[0], ChatStreamEvent::text("café done"));
    let response = completion_of(&events);
    assert_eq!(response.text, "café done");
    assert_eq!(response.finish_reason, Some(FinishReason::Stop));
}

#[tokio::test]
async fn flat_reasoning_chunks_become_thinking_then_text() {
    let chunks = load_sse_fixture_as_bytes("compatible", "flat_reasoning.sse").unwrap();
    let events = collect_events(chunks, StreamConfig::default()).await;

    assert_eq!(
        &events[..3],
        &[
            ChatStreamEvent::thinking("Let me "),
            ChatStreamEvent::thinking("think more"),
            ChatStreamEvent::text("Answer: 4"),
        ]
    );
    let response = completion_of(&events);
    assert_eq!(response.thinking.as_deref(), Some("Let me think more"));
    assert_eq!(response.text, "Answer: 4");
    assert_eq!(events.len(), 4);
}

#[tokio::test]
async fn malformed_frame_is_skipped_and_done_ends_quietly() {
    let chunks = load_sse_fixture_as_bytes("compatible", "malformed_then_done.sse").unwrap();
    let (stream, diagnostics) = StreamFactory::create_unified_stream_with_diagnostics(
        byte_stream(chunks),
        StreamConfig::default(),
    );
    let events: Vec<ChatStreamEvent> = futures_util::StreamExt::collect(stream).await;

    assert_eq!(events, vec![ChatStreamEvent::text("hi")]);
    assert_eq!(diagnostics.malformed_frames(), 1);
    assert_eq!(diagnostics.frames_seen(), 2);
}

#[tokio::test]
async fn done_marker_can_synthesize_completion() {
    let chunks = load_sse_fixture_as_bytes("compatible", "malformed_then_done.sse").unwrap();
    let config = StreamConfig::default().synthesize_completion_on_done(true);
    let events = collect_events(chunks, config).await;

    let response = completion_of(&events);
    assert_eq!(response.text, "hi");
    assert_eq!(response.finish_reason, None);
}
