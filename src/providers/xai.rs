//! xAI (Grok) chunks.

use super::ProviderEventMapper;
use super::common::map_chat_chunk;
use crate::types::RawDelta;
use serde_json::Value;

// grok-3-mini streams `reasoning_content`.
const REASONING_ORDER: [&str; 3] = ["reasoning_content", "reasoning", "thinking"];

#[derive(Debug, Clone, Copy, Default)]
pub struct XaiEventMapper;

impl ProviderEventMapper for XaiEventMapper {
    fn provider_id(&self) -> &'static str {
        "xai"
    }

    fn map_to_raw_delta(&self, chunk: &Value) -> RawDelta {
        map_chat_chunk(chunk, &REASONING_ORDER)
    }
}
