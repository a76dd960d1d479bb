//! Cross-fragment `<think>` tag extraction.
//!
//! The vendor mappers only recognize `<think>...</think>` blocks that sit
//! wholly inside one content fragment. Some models stream the tags split over
//! several fragments (`"<thi"`, `"nk>plan"`, `"</th"`, `"ink>answer"`); this
//! module tracks whether the stream is inside a block and holds back text that
//! might be the start of a tag.

use crate::providers::common::{THINK_CLOSE_TAG, THINK_OPEN_TAG};
use crate::types::RawDelta;
use serde::{Deserialize, Serialize};

/// How inline `<think>` tags in content are recognized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThinkTagMode {
    /// Only complete blocks within a single fragment are extracted.
    #[default]
    PerFragment,
    /// Tags may span fragments; see [`InlineThinkSplitter`].
    Streaming,
}

/// Text separated into the two sides of the tags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplitOutput {
    pub content: String,
    pub reasoning: String,
}

/// Streaming `<think>` splitter.
///
/// # Example
///
/// ```rust,ignore
/// use chatflux::streaming::InlineThinkSplitter;
///
/// let mut splitter = InlineThinkSplitter::new();
/// let a = splitter.split("Hi <thi");
/// let b = splitter.split("nk>plan</think>done");
/// assert_eq!(a.content, "Hi ");
/// assert_eq!(b.reasoning, "plan");
/// assert_eq!(b.content, "done");
/// ```
#[derive(Debug, Clone, Default)]
pub struct InlineThinkSplitter {
    buffer: String,
    inside_tag: bool,
}

impl InlineThinkSplitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Split one content fragment.
    pub fn split(&mut self, text: &str) -> SplitOutput {
        self.buffer.push_str(text);
        let mut out = SplitOutput::default();

        loop {
            let tag = if self.inside_tag {
                THINK_CLOSE_TAG
            } else {
                THINK_OPEN_TAG
            };

            let Some(start) = potential_start_index(&self.buffer, tag) else {
                let rest = std::mem::take(&mut self.buffer);
                self.push_side(&mut out, &rest);
                break;
            };

            let before = self.buffer[..start].to_string();
            self.push_side(&mut out, &before);

            if start + tag.len() <= self.buffer.len() {
                self.buffer.drain(..start + tag.len());
                self.inside_tag = !self.inside_tag;
                tracing::trace!(inside_tag = self.inside_tag, "think tag boundary");
            } else {
                // Possible partial tag; wait for more text.
                self.buffer.drain(..start);
                break;
            }
        }

        out
    }

    /// Release text held back as a possible tag prefix at end of stream.
    pub fn finish(&mut self) -> SplitOutput {
        let mut out = SplitOutput::default();
        let rest = std::mem::take(&mut self.buffer);
        self.push_side(&mut out, &rest);
        out
    }

    /// Route the content of `delta` through the splitter.
    ///
    /// Extracted reasoning is appended after any reasoning the vendor sent in
    /// its dedicated field.
    pub fn apply(&mut self, mut delta: RawDelta) -> RawDelta {
        let Some(content) = delta.content.take() else {
            return delta;
        };
        let split = self.split(&content);

        delta.content = (!split.content.is_empty()).then_some(split.content);
        if !split.reasoning.is_empty() {
            match &mut delta.reasoning_content {
                Some(existing) => existing.push_str(&split.reasoning),
                None => delta.reasoning_content = Some(split.reasoning),
            }
        }
        delta
    }

    pub fn is_inside_tag(&self) -> bool {
        self.inside_tag
    }

    fn push_side(&self, out: &mut SplitOutput, text: &str) {
        if self.inside_tag {
            out.reasoning.push_str(text);
        } else {
            out.content.push_str(text);
        }
    }
}

/// Index where `tag` starts in `text`, or where a trailing prefix of it starts.
fn potential_start_index(text: &str, tag: &str) -> Option<usize> {
    if tag.is_empty() {
        return None;
    }
    if let Some(index) = text.find(tag) {
        return Some(index);
    }

    // Longest suffix of `text` that is a proper prefix of `tag`.
    let from = text.len().saturating_sub(tag.len() - 1);
    (from..text.len())
        .filter(|&i| text.is_char_boundary(i))
        .find(|&i| tag.starts_with(&text[i..]))
}
