//! Vendor-agnostic view of one SSE payload.

use super::{ToolCallFragment, Usage};
use serde::{Deserialize, Serialize};

/// What a vendor mapper extracted from one JSON chunk.
///
/// Built fresh for every payload and never mutated afterwards; the tracker only
/// reads it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawDelta {
    /// Ordinary answer text
    pub content: Option<String>,
    /// Reasoning text from any reasoning field or an inline `<think>` block
    pub reasoning_content: Option<String>,
    /// Tool-call fragments, in vendor order
    pub tool_call_fragments: Vec<ToolCallFragment>,
    /// Raw vendor finish reason; its presence ends the stream
    pub finish_reason: Option<String>,
    /// Usage block, passed through unmodified
    pub usage: Option<Usage>,
    /// Chunk id
    pub id: Option<String>,
    /// Model name reported by the chunk
    pub model: Option<String>,
    /// Unix timestamp reported by the chunk
    pub created: Option<i64>,
}

impl RawDelta {
    pub fn content(text: impl Into<String>) -> Self {
        Self {
            content: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn reasoning(text: impl Into<String>) -> Self {
        Self {
            reasoning_content: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn finish(reason: impl Into<String>) -> Self {
        Self {
            finish_reason: Some(reason.into()),
            ..Default::default()
        }
    }

    pub fn tool_call(fragment: ToolCallFragment) -> Self {
        Self {
            tool_call_fragments: vec![fragment],
            ..Default::default()
        }
    }

    pub fn with_usage(mut self, usage: Usage) -> Self {
        self.usage = Some(usage);
        self
    }

    /// True when the delta carries nothing the tracker would act on.
    pub fn is_empty(&self) -> bool {
        self.content.as_deref().is_none_or(str::is_empty)
            && self.reasoning_content.as_deref().is_none_or(str::is_empty)
            && self.tool_call_fragments.is_empty()
            && self.finish_reason.is_none()
            && self.usage.is_none()
    }
}
