//! Extraction helpers shared by the OpenAI-style vendor mappers.
//!
//! Vendors differ in which reasoning field they fill, where usage lives and a
//! few finish-reason spellings; the chunk layout (`choices[0].delta`) is
//! otherwise the same, so the per-vendor mappers are thin wrappers over
//! [`map_chat_chunk`].

use crate::types::{RawDelta, ToolCallFragment, Usage};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

/// Every known spelling of the reasoning field.
pub const REASONING_FIELDS: [&str; 3] = ["reasoning_content", "reasoning", "thinking"];

pub const THINK_OPEN_TAG: &str = "<think>";
pub const THINK_CLOSE_TAG: &str = "</think>";

static THINK_BLOCK: Lazy<Regex> = Lazy::new(|| {
    // Non-greedy and dot-matches-newline so each block is matched separately.
    Regex::new(r"(?s)<think>(.*?)</think>").expect("valid think-tag regex")
});

/// Map an OpenAI-style chunk using `reasoning_fields` as the priority order.
pub fn map_chat_chunk(chunk: &Value, reasoning_fields: &[&str]) -> RawDelta {
    let delta = delta_object(chunk);

    let field_reasoning = delta.and_then(|d| extract_reasoning(d, reasoning_fields));
    let raw_content = delta
        .and_then(|d| d.get("content"))
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty());

    let (content, inline_reasoning) = match raw_content {
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
        tool_call_fragments: delta.map(extract_tool_call_fragments).unwrap_or_default(),
        finish_reason: extract_finish_reason(chunk),
        usage: chunk.get("usage").and_then(parse_usage),
        id: chunk.get("id").and_then(Value::as_str).map(String::from),
        model: chunk.get("model").and_then(Value::as_str).map(String::from),
        created: chunk.get("created").and_then(Value::as_i64),
    }
}

/// Locate the delta object: `choices[0].delta`, then `choices[0].message`,
/// then the chunk itself when it has no `choices` at all.
///
/// A chunk with an empty `choices` array (usage-only trailer) has no delta.
pub fn delta_object(chunk: &Value) -> Option<&Value> {
    match chunk.get("choices") {
        Some(choices) => {
            let first = choices.get(0)?;
            first
                .get("delta")
                .or_else(|| first.get("message"))
                .filter(|v| v.is_object())
        }
        None => chunk.is_object().then_some(chunk),
    }
}

/// First non-blank string among `fields`, in order.
pub fn extract_reasoning(delta: &Value, fields: &[&str]) -> Option<String> {
    fields.iter().find_map(|field| {
        delta
            .get(*field)
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
            .map(String::from)
    })
}

/// Pull complete `<think>...</think>` blocks out of a content fragment.
///
/// Returns `(content_without_blocks, concatenated_block_text)`. Content that
/// consisted only of blocks (and whitespace) becomes `None`. Tags split across
/// fragments are not recognized here; see
/// [`InlineThinkSplitter`](crate::streaming::InlineThinkSplitter).
pub fn split_inline_think(content: &str) -> (Option<String>, Option<String>) {
    if !content.contains(THINK_OPEN_TAG) || !content.contains(THINK_CLOSE_TAG) {
        return (Some(content.to_string()), None);
    }

    let mut reasoning = String::new();
    for caps in THINK_BLOCK.captures_iter(content) {
        if let Some(inner) = caps.get(1) {
            reasoning.push_str(inner.as_str());
        }
    }
    let stripped = THINK_BLOCK.replace_all(content, "");

    let content = (!stripped.trim().is_empty()).then(|| stripped.into_owned());
    let reasoning = (!reasoning.trim().is_empty()).then_some(reasoning);
    (content, reasoning)
}

/// `choices[0].finish_reason`, falling back to a root-level `finish_reason`.
pub fn extract_finish_reason(chunk: &Value) -> Option<String> {
    chunk
        .get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c0| c0.get("finish_reason"))
        .or_else(|| chunk.get("finish_reason"))
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

/// Deserialize a usage block; `null` and non-objects yield `None`.
pub fn parse_usage(value: &Value) -> Option<Usage> {
    if !value.is_object() {
        return None;
    }
    match serde_json::from_value::<Usage>(value.clone()) {
        Ok(usage) => Some(usage),
        Err(e) => {
            tracing::warn!("ignoring unparsable usage block: {e}");
            None
        }
    }
}

/// Convert `delta.tool_calls` entries into fragments.
///
/// Entries are kept even when incomplete; the phase tracker decides whether a
/// fragment can be attributed to a call.
pub fn extract_tool_call_fragments(delta: &Value) -> Vec<ToolCallFragment> {
    let Some(calls) = delta.get("tool_calls").and_then(Value::as_array) else {
        return Vec::new();
    };

    calls
        .iter()
        .enumerate()
        .filter(|(_, call)| call.is_object())
        .map(|(position, call)| {
            let function = call.get("function");
            ToolCallFragment {
                index: call
                    .get("index")
                    .and_then(Value::as_u64)
                    .map(|i| i as usize)
                    .unwrap_or(position),
                id: call
                    .get("id")
                    .and_then(Value::as_str)
                    .filter(|s| !s.is_empty())
                    .map(String::from),
                name: function
                    .and_then(|f| f.get("name"))
                    .and_then(Value::as_str)
                    .filter(|s| !s.is_empty())
                    .map(String::from),
                arguments: function
                    .and_then(|f| f.get("arguments"))
                    .and_then(Value::as_str)
                    .map(String::from),
            }
        })
        .collect()
}
