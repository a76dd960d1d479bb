//! SSE frame splitting
//!
//! Splits decoded text into `data:` payloads and watches for the terminal
//! sentinel. Only `data` lines matter for chat streaming; `event:`, `id:`,
//! `retry:` and comment lines are ignored. Newline-delimited JSON bodies
//! (Ollama `/api/chat`) are split the same way with [`WireFormat::JsonLines`].

use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Default terminal sentinel used by OpenAI-style vendors.
pub const DONE_MARKER: &str = "[DONE]";

/// How lines that straddle two decoded fragments are handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineBuffering {
    /// Carry an unterminated trailing line into the next fragment.
    #[default]
    Buffered,
    /// Treat every fragment independently. A `data:` line split across two
    /// network chunks is lost: its head fails to parse and its tail has no
    /// `data:` prefix.
    PerFragment,
}

/// Framing of the response body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WireFormat {
    /// `text/event-stream`; payloads are the `data:` lines.
    #[default]
    Sse,
    /// `application/x-ndjson`; every non-blank line is a payload.
    JsonLines,
}

/// Incremental `data:` line extractor.
#[derive(Debug, Clone)]
pub struct SseFrameParser {
    buffering: LineBuffering,
    format: WireFormat,
    done_markers: Vec<String>,
    partial: String,
    done: bool,
}

impl Default for SseFrameParser {
    fn default() -> Self {
        Self::new(LineBuffering::default())
    }
}

impl SseFrameParser {
    pub fn new(buffering: LineBuffering) -> Self {
        Self {
            buffering,
            format: WireFormat::default(),
            done_markers: vec![DONE_MARKER.to_string()],
            partial: String::new(),
            done: false,
        }
    }

    pub fn with_format(mut self, format: WireFormat) -> Self {
        self.format = format;
        self
    }

    /// Replace the set of payloads that terminate the stream.
    pub fn with_done_markers(mut self, markers: Vec<String>) -> Self {
        self.done_markers = markers;
        self
    }

    /// Extract the payloads of every complete `data:` line in `fragment`.
    ///
    /// Once a done marker is seen nothing further is returned, neither from the
    /// rest of this fragment nor from later ones.
    pub fn parse(&mut self, fragment: &str) -> Vec<String> {
        let mut payloads = Vec::new();
        if self.done || fragment.is_empty() {
            return payloads;
        }

        let text: Cow<'_, str> = match self.buffering {
            LineBuffering::Buffered if !self.partial.is_empty() => {
                let mut joined = std::mem::take(&mut self.partial);
                joined.push_str(fragment);
                Cow::Owned(joined)
            }
            _ => Cow::Borrowed(fragment),
        };

        let (complete, tail) = match text.rfind('\n') {
            Some(pos) => (&text[..pos], &text[pos + 1..]),
            None => ("", text.as_ref()),
        };

        for line in complete.split('\n') {
            if !self.process_line(line, &mut payloads) {
                return payloads;
            }
        }

        match self.buffering {
            LineBuffering::Buffered => self.partial = tail.to_string(),
            LineBuffering::PerFragment => {
                self.process_line(tail, &mut payloads);
            }
        }

        payloads
    }

    /// Flush a trailing line that never received its newline.
    pub fn finish(&mut self) -> Vec<String> {
        let mut payloads = Vec::new();
        let tail = std::mem::take(&mut self.partial);
        if !self.done && !tail.is_empty() {
            self.process_line(&tail, &mut payloads);
        }
        payloads
    }

    /// Whether a done marker has been seen.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Bytes of an unterminated line waiting for the next fragment.
    pub fn pending_len(&self) -> usize {
        self.partial.len()
    }

    /// Returns `false` when the line was a done marker.
    fn process_line(&mut self, line: &str, payloads: &mut Vec<String>) -> bool {
        let line = line.strip_suffix('\r').unwrap_or(line);
        let payload = match self.format {
            WireFormat::Sse => {
                let Some(payload) = line.strip_prefix("data:") else {
                    return true;
                };
                payload.strip_prefix(' ').unwrap_or(payload)
            }
            WireFormat::JsonLines => line,
        };

        if self.done_markers.iter().any(|m| m == payload.trim()) {
            tracing::trace!("SSE done marker received");
            self.done = true;
            self.partial.clear();
            return false;
        }
        if !payload.trim().is_empty() {
            payloads.push(payload.to_string());
        }
        true
    }
}
