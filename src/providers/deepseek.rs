//! DeepSeek chunks.
//!
//! `deepseek-reasoner` streams its chain of thought in `reasoning_content`
//! before the answer. Usage carries cache statistics
//! (`prompt_cache_hit_tokens`, `prompt_cache_miss_tokens`) that are kept in
//! [`Usage::extra`](crate::types::Usage).

use super::ProviderEventMapper;
use super::common::map_chat_chunk;
use crate::types::RawDelta;
use serde_json::Value;

const REASONING_ORDER: [&str; 3] = ["reasoning_content", "reasoning", "thinking"];

#[derive(Debug, Clone, Copy, Default)]
pub struct DeepSeekEventMapper;

impl ProviderEventMapper for DeepSeekEventMapper {
    fn provider_id(&self) -> &'static str {
        "deepseek"
    }

    fn map_to_raw_delta(&self, chunk: &Value) -> RawDelta {
        map_chat_chunk(chunk, &REASONING_ORDER)
    }
}
