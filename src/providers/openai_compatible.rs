//! Generic OpenAI-compatible vendors (SiliconFlow, Together, vLLM, ...).
//!
//! These relay whatever upstream model they host, so every reasoning spelling
//! is accepted. Priority follows the most common one first.

use super::ProviderEventMapper;
use super::common::map_chat_chunk;
use crate::types::RawDelta;
use serde_json::Value;

const REASONING_ORDER: [&str; 3] = ["reasoning_content", "thinking", "reasoning"];

#[derive(Debug, Clone, Copy, Default)]
pub struct OpenAiCompatibleEventMapper;

impl ProviderEventMapper for OpenAiCompatibleEventMapper {
    fn provider_id(&self) -> &'static str {
        "openai-compatible"
    }

    fn map_to_raw_delta(&self, chunk: &Value) -> RawDelta {
        map_chat_chunk(chunk, &REASONING_ORDER)
    }
}
