//! Synchronous core of the unified stream.
//!
//! [`EventPipeline`] turns byte chunks into canonical events without doing any
//! I/O; the async driver in [`factory`](super::factory) only feeds it.

use super::config::StreamConfig;
use super::diagnostics::StreamDiagnostics;
use super::reasoning::ReasoningPhaseTracker;
use super::sse::SseFrameParser;
use super::tag_extractor::{InlineThinkSplitter, ThinkTagMode};
use crate::error::{LlmError, StreamErrorKind};
use crate::providers::ProviderEventMapper;
use crate::types::{ChatStreamEvent, RawDelta};
use crate::utils::Utf8StreamDecoder;

/// Byte-to-event pipeline for one stream.
pub struct EventPipeline<M> {
    decoder: Utf8StreamDecoder,
    parser: SseFrameParser,
    mapper: M,
    splitter: Option<InlineThinkSplitter>,
    tracker: ReasoningPhaseTracker,
    synthesize_completion_on_done: bool,
    diagnostics: StreamDiagnostics,
    done_handled: bool,
    terminated: bool,
}

impl<M: ProviderEventMapper> EventPipeline<M> {
    pub fn new(mapper: M, config: &StreamConfig, diagnostics: StreamDiagnostics) -> Self {
        let parser = SseFrameParser::new(config.line_buffering)
            .with_format(config.wire_format)
            .with_done_markers(config.done_markers.clone());
        let splitter = match config.think_tag_mode {
            ThinkTagMode::Streaming => Some(InlineThinkSplitter::new()),
            ThinkTagMode::PerFragment => None,
        };
        let tracker = ReasoningPhaseTracker::new(mapper.provider_id());
        Self {
            decoder: Utf8StreamDecoder::new(),
            parser,
            mapper,
            splitter,
            tracker,
            synthesize_completion_on_done: config.synthesize_completion_on_done,
            diagnostics,
            done_handled: false,
            terminated: false,
        }
    }

    /// Feed one transport chunk.
    pub fn push_bytes(&mut self, chunk: &[u8]) -> Vec<ChatStreamEvent> {
        if self.is_finished() {
            return Vec::new();
        }
        let text = self.decoder.decode(chunk);
        let payloads = self.parser.parse(&text);
        let mut events = self.handle_payloads(payloads);
        self.after_payloads(&mut events);
        events
    }

    /// Transport ended cleanly.
    ///
    /// Flushes the decoder and any unterminated line. A stream that saw neither
    /// a finish reason nor a done marker ends in a `TransportFailure` error.
    pub fn finish(&mut self) -> Vec<ChatStreamEvent> {
        if self.terminated {
            return Vec::new();
        }

        let tail = self.decoder.flush();
        self.diagnostics
            .set_discarded_trailing_bytes(self.decoder.discarded_bytes());

        let mut events = Vec::new();
        if !self.parser.is_done() {
            let mut payloads = self.parser.parse(&tail);
            payloads.extend(self.parser.finish());
            events = self.handle_payloads(payloads);
            self.after_payloads(&mut events);
        }

        if !self.terminated && !self.done_handled {
            events.extend(self.flush_splitter());
            if !self.terminated {
                tracing::warn!("transport ended before a finish reason or done marker");
                events.push(ChatStreamEvent::Error {
                    error: LlmError::transport_failure(
                        "stream ended before a finish reason or [DONE]",
                    ),
                });
                self.terminated = true;
            }
        }
        events
    }

    /// Transport failed mid-stream.
    pub fn fail(&mut self, error: LlmError) -> Option<ChatStreamEvent> {
        if self.terminated {
            return None;
        }
        self.terminated = true;
        let error = match error.stream_error_kind() {
            Some(StreamErrorKind::TransportFailure) => error,
            _ => LlmError::transport_failure(error.to_string()),
        };
        tracing::warn!("transport failure: {error}");
        Some(ChatStreamEvent::Error { error })
    }

    /// A terminal event was produced or the done marker was handled; the
    /// driver should stop reading the transport.
    pub fn is_finished(&self) -> bool {
        self.terminated || self.done_handled
    }

    pub fn diagnostics(&self) -> &StreamDiagnostics {
        &self.diagnostics
    }

    fn handle_payloads(&mut self, payloads: Vec<String>) -> Vec<ChatStreamEvent> {
        let mut events = Vec::new();
        for payload in payloads {
            if self.terminated {
                break;
            }
            self.diagnostics.record_frame();
            tracing::trace!(%payload, "SSE frame");

            let chunk: serde_json::Value = match serde_json::from_str(&payload) {
                Ok(v) => v,
                Err(e) => {
                    self.diagnostics.record_malformed_frame();
                    tracing::warn!("skipping malformed SSE frame: {e}");
                    continue;
                }
            };

            let mut delta = self.mapper.map_to_raw_delta(&chunk);
            if let Some(splitter) = self.splitter.as_mut() {
                delta = splitter.apply(delta);
                // Held-back tag prefixes belong before the completion.
                if delta.finish_reason.is_some() {
                    let rest = splitter.finish();
                    append_split_rest(&mut delta, rest.content, rest.reasoning);
                }
            }
            self.process_delta(&delta, &mut events);
        }
        events
    }

    fn after_payloads(&mut self, events: &mut Vec<ChatStreamEvent>) {
        if self.terminated || self.done_handled || !self.parser.is_done() {
            return;
        }
        self.done_handled = true;
        events.extend(self.flush_splitter());
        if self.terminated {
            return;
        }
        if self.synthesize_completion_on_done {
            tracing::debug!("done marker without finish reason; synthesizing completion");
            events.push(self.tracker.complete_without_finish_reason());
            self.terminated = true;
        } else {
            tracing::debug!("done marker without finish reason");
        }
    }

    fn flush_splitter(&mut self) -> Vec<ChatStreamEvent> {
        let mut events = Vec::new();
        let Some(splitter) = self.splitter.as_mut() else {
            return events;
        };
        let rest = splitter.finish();
        if rest.content.is_empty() && rest.reasoning.is_empty() {
            return events;
        }
        let mut delta = RawDelta::default();
        append_split_rest(&mut delta, rest.content, rest.reasoning);
        self.process_delta(&delta, &mut events);
        events
    }

    fn process_delta(&mut self, delta: &RawDelta, events: &mut Vec<ChatStreamEvent>) {
        for event in self.tracker.process(delta) {
            let terminal = event.is_terminal();
            events.push(event);
            if terminal {
                self.terminated = true;
                break;
            }
        }
        self.diagnostics
            .set_skipped_tool_fragments(self.tracker.state().skipped_tool_fragments());
    }
}

fn append_split_rest(delta: &mut RawDelta, content: String, reasoning: String) {
    if !reasoning.is_empty() {
        delta
            .reasoning_content
            .get_or_insert_with(String::new)
            .push_str(&reasoning);
    }
    if !content.is_empty() {
        delta
            .content
            .get_or_insert_with(String::new)
            .push_str(&content);
    }
}
