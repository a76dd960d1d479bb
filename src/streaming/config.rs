//! Stream configuration

use super::sse::{DONE_MARKER, LineBuffering, WireFormat};
use super::tag_extractor::ThinkTagMode;
use crate::providers::ProviderKind;
use serde::{Deserialize, Serialize};

/// Per-stream knobs.
///
/// The defaults reproduce the behavior callers see without any configuration:
/// an SSE body with buffered lines, per-fragment `<think>` extraction, `[DONE]` as the only
/// terminal sentinel and no synthesized completion on `[DONE]`.
///
/// # Example
///
/// ```rust,ignore
/// use chatflux::streaming::{StreamConfig, ThinkTagMode};
///
/// let config = StreamConfig::new("deepseek")
///     .think_tag_mode(ThinkTagMode::Streaming)
///     .synthesize_completion_on_done(true);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Vendor id used to pick the event mapper and label logs
    pub provider_id: String,
    /// Body framing: SSE `data:` lines or newline-delimited JSON
    pub wire_format: WireFormat,
    /// Handling of SSE lines split across network chunks
    pub line_buffering: LineBuffering,
    /// Recognition of inline `<think>` tags
    pub think_tag_mode: ThinkTagMode,
    /// Payloads that end the stream
    pub done_markers: Vec<String>,
    /// Emit a `Completion` when a done marker arrives before any finish reason
    pub synthesize_completion_on_done: bool,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            provider_id: ProviderKind::OpenAiCompatible.as_str().to_string(),
            wire_format: WireFormat::default(),
            line_buffering: LineBuffering::default(),
            think_tag_mode: ThinkTagMode::default(),
            done_markers: vec![DONE_MARKER.to_string()],
            synthesize_completion_on_done: false,
        }
    }
}

impl StreamConfig {
    pub fn new(provider_id: impl Into<String>) -> Self {
        Self::default().provider_id(provider_id)
    }

    pub fn provider_id(mut self, provider_id: impl Into<String>) -> Self {
        self.provider_id = provider_id.into();
        self
    }

    pub fn wire_format(mut self, format: WireFormat) -> Self {
        self.wire_format = format;
        self
    }

    pub fn line_buffering(mut self, line_buffering: LineBuffering) -> Self {
        self.line_buffering = line_buffering;
        self
    }

    pub fn think_tag_mode(mut self, mode: ThinkTagMode) -> Self {
        self.think_tag_mode = mode;
        self
    }

    pub fn done_markers<I, S>(mut self, markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.done_markers = markers.into_iter().map(Into::into).collect();
        self
    }

    pub fn synthesize_completion_on_done(mut self, enabled: bool) -> Self {
        self.synthesize_completion_on_done = enabled;
        self
    }

    /// Vendor the configured provider id resolves to.
    pub fn provider_kind(&self) -> ProviderKind {
        ProviderKind::from_id(&self.provider_id)
    }
}
