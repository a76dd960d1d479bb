//! Groq chunks.
//!
//! Groq reports usage on the final chunk under `x_groq.usage` rather than at
//! the root, and its reasoning models use the `reasoning` field.

use super::ProviderEventMapper;
use super::common::{map_chat_chunk, parse_usage};
use crate::types::RawDelta;
use serde_json::Value;

const REASONING_ORDER: [&str; 3] = ["reasoning", "reasoning_content", "thinking"];

#[derive(Debug, Clone, Copy, Default)]
pub struct GroqEventMapper;

impl ProviderEventMapper for GroqEventMapper {
    fn provider_id(&self) -> &'static str {
        "groq"
    }

    fn map_to_raw_delta(&self, chunk: &Value) -> RawDelta {
        let mut delta = map_chat_chunk(chunk, &REASONING_ORDER);
        if delta.usage.is_none() {
            delta.usage = chunk
                .get("x_groq")
                .and_then(|x| x.get("usage"))
                .and_then(parse_usage);
        }
        delta
    }
}
