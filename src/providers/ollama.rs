//! Ollama chunks.
//!
//! Two shapes arrive here: the OpenAI-compatible `/v1/chat/completions`
//! stream, and native `/api/chat` objects carrying `message`, `done`,
//! `done_reason` and eval counters at the root. Ollama reports reasoning as
//! `thinking`.
//!
//! The native endpoint streams newline-delimited JSON, so it needs
//! [`WireFormat::JsonLines`](crate::streaming::WireFormat::JsonLines).

use super::ProviderEventMapper;
use super::common::{extract_reasoning, map_chat_chunk, split_inline_think};
use crate::types::{RawDelta, ToolCallFragment, Usage};
use serde_json::Value;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

const REASONING_ORDER: [&str; 3] = ["thinking", "reasoning", "reasoning_content"];

/// Mapper for one Ollama stream.
///
/// Native tool calls arrive whole and without ids, each chunk numbering its
/// calls from zero. The mapper keeps a running call count so every call gets
/// its own index and `call_{n}` id for the whole stream.
#[derive(Debug, Clone, Default)]
pub struct OllamaEventMapper {
    native_calls_seen: Arc<AtomicUsize>,
}

impl ProviderEventMapper for OllamaEventMapper {
    fn provider_id(&self) -> &'static str {
        "ollama"
    }

    fn map_to_raw_delta(&self, chunk: &Value) -> RawDelta {
        if chunk.get("choices").is_none()
            && let Some(message) = chunk.get("message").filter(|m| m.is_object())
        {
            return self.map_native_chunk(chunk, message);
        }

        let mut delta = map_chat_chunk(chunk, &REASONING_ORDER);
        if delta.finish_reason.is_none() {
            delta.finish_reason = native_finish_reason(chunk);
        }
        delta
    }
}

impl OllamaEventMapper {
    pub fn new() -> Self {
        Self::default()
    }

    fn map_native_chunk(&self, chunk: &Value, message: &Value) -> RawDelta {
        let field_reasoning = extract_reasoning(message, &REASONING_ORDER);
        let (content, inline_reasoning) = match message
            .get("content")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
        {
            Some(text) => split_inline_think(text),
            None => (None, None),
        };

        let reasoning_content = match (field_reasoning, inline_reasoning) {
            (Some(mut field), Some(inline)) => {
                field.push_str(&inline);
                Some(field)
            }
            (field, inline) => field.or(inline),
        };

        RawDelta {
            content,
            reasoning_content,
            tool_call_fragments: self.native_tool_calls(message),
            finish_reason: native_finish_reason(chunk),
            usage: native_usage(chunk),
            id: None,
            model: chunk.get("model").and_then(Value::as_str).map(String::from),
            created: chunk
                .get("created_at")
                .and_then(Value::as_str)
                .and_then(|s| chrono::DateTime::parse_from_rfc3339(s).ok())
                .map(|t| t.timestamp()),
        }
    }

    /// Native tool calls arrive whole; each one opens a new call.
    fn native_tool_calls(&self, message: &Value) -> Vec<ToolCallFragment> {
        let Some(calls) = message.get("tool_calls").and_then(Value::as_array) else {
            return Vec::new();
        };
        calls
            .iter()
            .filter_map(|call| {
                let function = call.get("function")?;
                let arguments = match function.get("arguments") {
                    Some(Value::String(s)) => s.clone(),
                    Some(other) => other.to_string(),
                    None => String::new(),
                };
                let index = self.native_calls_seen.fetch_add(1, Ordering::Relaxed);
                Some(ToolCallFragment {
                    index,
                    id: Some(format!("call_{index}")),
                    name: function.get("name").and_then(Value::as_str).map(String::from),
                    arguments: Some(arguments),
                })
            })
            .collect()
    }
}

/// `done_reason` once `done` is true; a bare `done: true` means a normal stop.
fn native_finish_reason(chunk: &Value) -> Option<String> {
    if chunk.get("done").and_then(Value::as_bool) != Some(true) {
        return None;
    }
    Some(
        chunk
            .get("done_reason")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .unwrap_or("stop")
            .to_string(),
    )
}

fn native_usage(chunk: &Value) -> Option<Usage> {
    let prompt = chunk.get("prompt_eval_count").and_then(Value::as_u64);
    let completion = chunk.get("eval_count").and_then(Value::as_u64);
    if prompt.is_none() && completion.is_none() {
        return None;
    }
    let prompt = prompt.and_then(|v| u32::try_from(v).ok());
    let completion = completion.and_then(|v| u32::try_from(v).ok());
    Some(Usage {
        prompt_tokens: prompt,
        completion_tokens: completion,
        total_tokens: Some(prompt.unwrap_or(0).saturating_add(completion.unwrap_or(0))),
        ..Default::default()
    })
}
