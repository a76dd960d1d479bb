//! Test fixtures utilities: load `.sse` files and drive them through the unified stream

use bytes::Bytes;
use chatflux::prelude::*;
use futures_util::StreamExt;
use std::io;
use std::path::PathBuf;

pub fn fixture_path(vendor: &str, name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(vendor)
        .join(name)
}

/// Load an `.sse` fixture and split it into one chunk per SSE event
/// (separated by blank lines), mimicking how servers flush events.
pub fn load_sse_fixture_as_bytes(vendor: &str, name: &str) -> io::Result<Vec<Bytes>> {
    let raw = std::fs::read_to_string(fixture_path(vendor, name))?;
    let normalized = raw.replace("\r\n", "\n");
    let mut out = Vec::new();
    for chunk in normalized.split("\n\n") {
        let s = chunk.trim_end_matches('\n');
        if s.is_empty() {
            continue;
        }
        let mut owned = String::from(s);
        owned.push_str("\n\n");
        out.push(Bytes::from(owned));
    }
    Ok(out)
}

/// Concatenate chunks and re-split them every `size` bytes, ignoring UTF-8
/// and line boundaries.
pub fn rechunk(chunks: &[Bytes], size: usize) -> Vec<Bytes> {
    let all: Vec<u8> = chunks.iter().flat_map(|c| c.iter().copied()).collect();
    all.chunks(size.max(1)).map(Bytes::copy_from_slice).collect()
}

pub fn byte_stream(
    chunks: Vec<Bytes>,
) -> impl futures::Stream<Item = Result<Bytes, LlmError>> + Send + 'static {
    futures_util::stream::iter(chunks.into_iter().map(Ok))
}

/// Run `chunks` through a unified stream and collect every event.
pub async fn collect_events(chunks: Vec<Bytes>, config: StreamConfig) -> Vec<ChatStreamEvent> {
    StreamFactory::create_unified_stream(byte_stream(chunks), config)
        .collect()
        .await
}

pub fn text_of(events: &[ChatStreamEvent]) -> String {
    events
        .iter()
        .filter_map(|e| match e {
            ChatStreamEvent::TextDelta { delta } => Some(delta.as_str()),
            _ => None,
        })
        .collect()
}

pub fn thinking_of(events: &[ChatStreamEvent]) -> String {
    events
        .iter()
        .filter_map(|e| match e {
            ChatStreamEvent::ThinkingDelta { delta } => Some(delta.as_str()),
            _ => None,
        })
        .collect()
}

/// The completion response, asserting it is the last event and the only terminal one.
pub fn completion_of(events: &[ChatStreamEvent]) -> &FinalResponse {
    assert_terminal_exclusive(events);
    match events.last() {
        Some(ChatStreamEvent::Completion { response }) => response,
        other => panic!("expected completion as last event, got {other:?}"),
    }
}

pub fn assert_terminal_exclusive(events: &[ChatStreamEvent]) {
    let terminals: Vec<usize> = events
        .iter()
        .enumerate()
        .filter(|(_, e)| e.is_terminal())
        .map(|(i, _)| i)
        .collect();
    assert!(terminals.len() <= 1, "more than one terminal event: {events:?}");
    if let Some(&i) = terminals.first() {
        assert_eq!(i, events.len() - 1, "events after terminal: {events:?}");
    }
}
