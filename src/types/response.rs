//! Aggregated result of one streamed completion.

use super::{FinishReason, ResponseMetadata, ToolCall, Usage};
use serde::{Deserialize, Serialize};

/// Everything the stream accumulated up to its finish reason.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinalResponse {
    /// Concatenated answer text
    pub text: String,
    /// Tool calls assembled from fragments, ordered by index
    pub tool_calls: Vec<ToolCall>,
    /// Latest usage block seen on the stream
    pub usage: Option<Usage>,
    /// Reasoning transcript; `None` when the model produced none
    pub thinking: Option<String>,
    /// Parsed finish reason; `None` when completion was synthesized from `[DONE]`
    pub finish_reason: Option<FinishReason>,
    /// Id, model and creation time from the chunks
    pub metadata: ResponseMetadata,
}

impl FinalResponse {
    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }

    pub fn has_thinking(&self) -> bool {
        self.thinking.is_some()
    }
}
