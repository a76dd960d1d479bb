//! Reasoning phase tracking
//!
//! Classifies streamed content as thinking or answer text and aggregates the
//! stream into a [`FinalResponse`]. The transition is a pure function over an
//! explicit [`ReasoningState`] value; [`ReasoningPhaseTracker`] owns a state
//! for the stream driver.

use crate::types::{
    ChatStreamEvent, FinalResponse, FinishReason, RawDelta, ResponseMetadata, ToolCall,
    ToolCallFragment, Usage,
};
use std::collections::BTreeMap;

/// Closing tag that ends an inline reasoning block.
pub const THINK_END_MARKER: &str = "</think>";
/// Heading some vendors emit between the reasoning and the answer.
pub const RESPONSE_MARKER: &str = "###Response";

/// Which kind of text the stream is currently producing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReasoningPhase {
    Thinking,
    /// Initial phase: thinking only starts once reasoning text shows up.
    #[default]
    Responding,
}

/// Accumulated pieces of one tool call, keyed by index in [`ReasoningState`].
#[derive(Debug, Clone, Default, PartialEq)]
struct ToolCallAccumulator {
    id: Option<String>,
    name: Option<String>,
    arguments: String,
}

/// Per-stream tracker state.
///
/// Owned by exactly one stream. Reset to its initial values after a
/// completion; only the provider id and the skipped-fragment counter survive.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReasoningState {
    phase: ReasoningPhase,
    thinking_buffer: String,
    last_content_fragment: String,
    // Set on the first Thinking -> Responding transition, never cleared
    // until reset.
    reasoning_closed: bool,
    text: String,
    tool_calls: BTreeMap<usize, ToolCallAccumulator>,
    usage: Option<Usage>,
    metadata: ResponseMetadata,
    skipped_tool_fragments: u64,
}

impl ReasoningState {
    /// Initial state for a stream normalized from `provider`.
    pub fn for_provider(provider: impl Into<String>) -> Self {
        Self {
            metadata: ResponseMetadata {
                provider: provider.into(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    pub fn phase(&self) -> ReasoningPhase {
        self.phase
    }

    /// All reasoning text seen since the last reset.
    pub fn thinking(&self) -> &str {
        &self.thinking_buffer
    }

    /// Answer text emitted since the last reset.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn last_content_fragment(&self) -> &str {
        &self.last_content_fragment
    }

    /// Whether the stream already moved from thinking to the answer.
    pub fn is_reasoning_closed(&self) -> bool {
        self.reasoning_closed
    }

    /// Tool-call fragments dropped because they could not be attributed.
    pub fn skipped_tool_fragments(&self) -> u64 {
        self.skipped_tool_fragments
    }

    /// Whether anything worth reporting has been accumulated.
    pub fn has_output(&self) -> bool {
        !self.text.is_empty() || !self.thinking_buffer.is_empty() || !self.tool_calls.is_empty()
    }

    /// Build the aggregated response from the current state.
    pub fn to_response(&self, finish_reason: Option<FinishReason>) -> FinalResponse {
        FinalResponse {
            text: self.text.clone(),
            tool_calls: self
                .tool_calls
                .values()
                .filter_map(|acc| {
                    let id = acc.id.clone()?;
                    Some(ToolCall::function(
                        id,
                        acc.name.clone().unwrap_or_default(),
                        acc.arguments.clone(),
                    ))
                })
                .collect(),
            usage: self.usage.clone(),
            thinking: (!self.thinking_buffer.is_empty()).then(|| self.thinking_buffer.clone()),
            finish_reason,
            metadata: self.metadata.clone(),
        }
    }

    fn reset(self) -> Self {
        Self {
            metadata: ResponseMetadata {
                provider: self.metadata.provider,
                ..Default::default()
            },
            skipped_tool_fragments: self.skipped_tool_fragments,
            ..Default::default()
        }
    }

    fn absorb_metadata(&mut self, delta: &RawDelta) {
        if self.metadata.id.is_none() {
            self.metadata.id.clone_from(&delta.id);
        }
        if self.metadata.model.is_none() {
            self.metadata.model.clone_from(&delta.model);
        }
        if self.metadata.created.is_none()
            && let Some(ts) = delta.created
        {
            self.metadata.created = chrono::DateTime::from_timestamp(ts, 0);
        }
        if let Some(usage) = &delta.usage {
            self.usage = Some(usage.clone());
        }
    }

    /// Emit text belonging to the side of a marker that precedes it.
    fn emit_before_marker(&mut self, before: &str, events: &mut Vec<ChatStreamEvent>) {
        if before.is_empty() {
            return;
        }
        if self.phase == ReasoningPhase::Thinking {
            self.thinking_buffer.push_str(before);
            events.push(ChatStreamEvent::thinking(before));
        } else {
            self.emit_text(before, events);
        }
    }

    fn emit_text(&mut self, text: &str, events: &mut Vec<ChatStreamEvent>) {
        if text.is_empty() {
            return;
        }
        self.text.push_str(text);
        events.push(ChatStreamEvent::text(text));
    }

    fn close_reasoning(&mut self) {
        if self.phase == ReasoningPhase::Thinking {
            tracing::debug!(
                thinking_len = self.thinking_buffer.len(),
                "reasoning phase closed"
            );
        }
        self.phase = ReasoningPhase::Responding;
        self.reasoning_closed = true;
    }

    /// Resolve the fragment's id and fold it into the accumulators.
    ///
    /// Returns the fragment as it should be emitted, or `None` when it cannot
    /// be attributed to any call.
    fn accept_tool_fragment(&mut self, fragment: &ToolCallFragment) -> Option<ToolCallFragment> {
        let known_id = self
            .tool_calls
            .get(&fragment.index)
            .and_then(|acc| acc.id.clone());
        let has_function_data = fragment.name.is_some() || fragment.arguments.is_some();

        let id = match (&fragment.id, known_id) {
            (Some(id), _) => id.clone(),
            (None, Some(known)) if has_function_data => known,
            (None, known) => {
                self.skipped_tool_fragments += 1;
                tracing::warn!(
                    index = fragment.index,
                    known_index = known.is_some(),
                    "skipping incomplete tool call fragment"
                );
                return None;
            }
        };

        let acc = self.tool_calls.entry(fragment.index).or_default();
        if acc.id.is_none() {
            acc.id = Some(id.clone());
        }
        if acc.name.is_none() {
            acc.name.clone_from(&fragment.name);
        }
        if let Some(args) = &fragment.arguments {
            acc.arguments.push_str(args);
        }

        Some(ToolCallFragment {
            index: fragment.index,
            id: Some(id),
            name: fragment.name.clone(),
            arguments: fragment.arguments.clone(),
        })
    }
}

/// Locate a phase marker in `content`.
///
/// Returns `(before, after)`: the text preceding the marker within this
/// fragment and the text following it. A `###Response` heading may straddle
/// the previous fragment; then `before` is empty and the heading's head has
/// already been emitted with that fragment.
fn find_marker<'a>(previous: &str, content: &'a str) -> Option<(&'a str, &'a str)> {
    if let Some(idx) = content.find(THINK_END_MARKER) {
        return Some((&content[..idx], &content[idx + THINK_END_MARKER.len()..]));
    }

    let mut combined = String::with_capacity(previous.len() + content.len());
    combined.push_str(previous);
    combined.push_str(content);

    // Only matches that end inside the current fragment count; a marker wholly
    // inside `previous` was already handled when that fragment arrived.
    let (idx, _) = combined
        .match_indices(RESPONSE_MARKER)
        .find(|(idx, m)| idx + m.len() > previous.len())?;

    let end = idx + RESPONSE_MARKER.len() - previous.len();
    if idx >= previous.len() {
        let start = idx - previous.len();
        Some((&content[..start], &content[end..]))
    } else {
        Some(("", &content[end..]))
    }
}

/// THINKING / RESPONDING state machine.
#[derive(Debug, Clone, Default)]
pub struct ReasoningPhaseTracker {
    state: ReasoningState,
}

impl ReasoningPhaseTracker {
    pub fn new(provider: impl Into<String>) -> Self {
        Self {
            state: ReasoningState::for_provider(provider),
        }
    }

    /// Pure transition: apply one delta to `state`.
    ///
    /// Rules run in order: reasoning, content (with marker detection), tool
    /// calls, finish reason. A finish reason emits `Completion` and returns a
    /// freshly reset state.
    pub fn step(
        mut state: ReasoningState,
        delta: &RawDelta,
    ) -> (ReasoningState, Vec<ChatStreamEvent>) {
        let mut events = Vec::new();
        state.absorb_metadata(delta);

        if let Some(reasoning) = delta.reasoning_content.as_deref().filter(|s| !s.is_empty()) {
            state.thinking_buffer.push_str(reasoning);
            if state.reasoning_closed {
                tracing::debug!("reasoning after answer started; buffered without emitting");
            } else {
                if state.phase != ReasoningPhase::Thinking {
                    tracing::debug!("entering thinking phase");
                }
                state.phase = ReasoningPhase::Thinking;
                events.push(ChatStreamEvent::thinking(reasoning));
            }
        }

        if let Some(content) = delta.content.as_deref().filter(|s| !s.is_empty()) {
            match find_marker(&state.last_content_fragment, content) {
                Some((before, after)) => {
                    state.emit_before_marker(before, &mut events);
                    state.close_reasoning();
                    state.emit_text(after, &mut events);
                }
                None => {
                    if state.phase == ReasoningPhase::Thinking {
                        state.close_reasoning();
                    }
                    state.emit_text(content, &mut events);
                }
            }
            state.last_content_fragment = content.to_string();
        }

        for fragment in &delta.tool_call_fragments {
            if let Some(resolved) = state.accept_tool_fragment(fragment) {
                events.push(ChatStreamEvent::ToolCallDelta { fragment: resolved });
            }
        }

        if let Some(reason) = &delta.finish_reason {
            tracing::debug!(finish_reason = %reason, "stream finished");
            let response = state.to_response(Some(FinishReason::parse(reason)));
            events.push(ChatStreamEvent::Completion { response });
            state = state.reset();
        }

        (state, events)
    }

    /// Apply `delta` to the owned state.
    pub fn process(&mut self, delta: &RawDelta) -> Vec<ChatStreamEvent> {
        let state = std::mem::take(&mut self.state);
        let (next, events) = Self::step(state, delta);
        self.state = next;
        events
    }

    /// Completion built from whatever has accumulated, for streams that end
    /// without a finish reason. Resets the state.
    pub fn complete_without_finish_reason(&mut self) -> ChatStreamEvent {
        let response = self.state.to_response(None);
        self.state = std::mem::take(&mut self.state).reset();
        ChatStreamEvent::Completion { response }
    }

    pub fn state(&self) -> &ReasoningState {
        &self.state
    }
}
