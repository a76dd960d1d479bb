//! OpenRouter chunks.
//!
//! OpenRouter normalizes upstream reasoning into a `reasoning` string and
//! interleaves `: OPENROUTER PROCESSING` comment lines, which the SSE splitter
//! already drops.

use super::ProviderEventMapper;
use super::common::map_chat_chunk;
use crate::types::RawDelta;
use serde_json::Value;

const REASONING_ORDER: [&str; 3] = ["reasoning", "reasoning_content", "thinking"];

#[derive(Debug, Clone, Copy, Default)]
pub struct OpenRouterEventMapper;

impl ProviderEventMapper for OpenRouterEventMapper {
    fn provider_id(&self) -> &'static str {
        "openrouter"
    }

    fn map_to_raw_delta(&self, chunk: &Value) -> RawDelta {
        map_chat_chunk(chunk, &REASONING_ORDER)
    }
}
