//! Common types shared by deltas, events and final responses.

use serde::{Deserialize, Serialize};

/// Reason why the model stopped generating tokens.
///
/// # Examples
///
/// ```rust,ignore
/// use chatflux::types::FinishReason;
///
/// assert_eq!(FinishReason::parse("stop"), FinishReason::Stop);
/// assert_eq!(FinishReason::parse("tool_calls"), FinishReason::ToolCalls);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// Model generated stop sequence or completed naturally.
    ///
    /// Maps to:
    /// - OpenAI / DeepSeek / xAI / Groq: `stop`
    /// - Ollama: `stop`
    Stop,

    /// Model reached the maximum number of tokens.
    ///
    /// Maps to:
    /// - OpenAI-style: `length`
    /// - Ollama: `length`
    Length,

    /// Model triggered tool/function calls.
    ///
    /// Maps to `tool_calls` and the legacy `function_call`.
    ToolCalls,

    /// Content was filtered due to safety/policy violations.
    ContentFilter,

    /// DeepSeek reports `insufficient_system_resource` when generation is cut short.
    InsufficientResources,

    /// Other provider-specific finish reason.
    Other(String),
}

impl FinishReason {
    /// Parse a vendor finish-reason string.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "stop" | "end_turn" | "eos" => Self::Stop,
            "length" | "max_tokens" => Self::Length,
            "tool_calls" | "function_call" | "tool_use" => Self::ToolCalls,
            "content_filter" => Self::ContentFilter,
            "insufficient_system_resource" => Self::InsufficientResources,
            other => Self::Other(other.to_string()),
        }
    }
}

/// Response metadata collected from stream chunks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseMetadata {
    /// Response ID
    pub id: Option<String>,
    /// Model name
    pub model: Option<String>,
    /// Creation time
    pub created: Option<chrono::DateTime<chrono::Utc>>,
    /// Provider id the stream was normalized for
    pub provider: String,
}

/// Token usage as reported by the vendor.
///
/// Keys this crate does not model (for example DeepSeek's
/// `prompt_cache_hit_tokens`) are preserved verbatim in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: Option<u32>,
    #[serde(default)]
    pub completion_tokens: Option<u32>,
    #[serde(default)]
    pub total_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_tokens_details: Option<PromptTokensDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_tokens_details: Option<CompletionTokensDetails>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PromptTokensDetails {
    #[serde(default)]
    pub cached_tokens: Option<u32>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompletionTokensDetails {
    #[serde(default)]
    pub reasoning_tokens: Option<u32>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Usage {
    /// Cached prompt tokens, if reported.
    pub fn cached_tokens(&self) -> Option<u32> {
        self.prompt_tokens_details
            .as_ref()
            .and_then(|d| d.cached_tokens)
    }

    /// Reasoning tokens, if reported.
    pub fn reasoning_tokens(&self) -> Option<u32> {
        self.completion_tokens_details
            .as_ref()
            .and_then(|d| d.reasoning_tokens)
    }
}
