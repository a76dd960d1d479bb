//! OpenAI chat-completions chunks.

use super::ProviderEventMapper;
use super::common::map_chat_chunk;
use crate::types::RawDelta;
use serde_json::Value;

/// OpenAI itself never sends reasoning text on chat completions, but proxies
/// in front of o-series models do; the documented field goes first.
const REASONING_ORDER: [&str; 3] = ["reasoning_content", "reasoning", "thinking"];

#[derive(Debug, Clone, Copy, Default)]
pub struct OpenAiEventMapper;

impl ProviderEventMapper for OpenAiEventMapper {
    fn provider_id(&self) -> &'static str {
        "openai"
    }

    fn map_to_raw_delta(&self, chunk: &Value) -> RawDelta {
        map_chat_chunk(chunk, &REASONING_ORDER)
    }
}
