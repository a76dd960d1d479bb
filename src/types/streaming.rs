#![allow(clippy::large_enum_variant)]
//! Canonical streaming events

use super::{FinalResponse, ToolCallFragment};
use crate::error::LlmError;

/// Chat streaming event.
///
/// Every vendor format converges on this enum. A stream yields any number of
/// delta variants followed by at most one terminal variant (`Completion` or
/// `Error`); nothing follows a terminal event.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatStreamEvent {
    /// Incremental answer text
    TextDelta {
        /// The incremental text content
        delta: String,
    },
    /// Incremental reasoning text (reasoning fields, `<think>` blocks)
    ThinkingDelta {
        /// The incremental thinking/reasoning content
        delta: String,
    },
    /// Incremental tool call
    ToolCallDelta {
        /// The fragment, with its id resolved from earlier fragments of the same index
        fragment: ToolCallFragment,
    },
    /// Stream finished normally
    Completion {
        /// Aggregated response
        response: FinalResponse,
    },
    /// Stream failed; terminal
    Error {
        /// What went wrong
        error: LlmError,
    },
}

impl ChatStreamEvent {
    pub fn text(delta: impl Into<String>) -> Self {
        Self::TextDelta {
            delta: delta.into(),
        }
    }

    pub fn thinking(delta: impl Into<String>) -> Self {
        Self::ThinkingDelta {
            delta: delta.into(),
        }
    }

    /// Whether this event ends the stream.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completion { .. } | Self::Error { .. })
    }
}
