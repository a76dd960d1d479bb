//! Vendor event mappers
//!
//! Each supported vendor gets a mapper from its raw JSON chunk to a
//! [`RawDelta`]. The set is closed: [`ProviderMapper`] is picked once per
//! stream from the provider id, and unknown ids fall back to the generic
//! OpenAI-compatible mapper.

pub mod common;
pub mod deepseek;
pub mod groq;
pub mod ollama;
pub mod openai;
pub mod openai_compatible;
pub mod openrouter;
pub mod xai;

pub use deepseek::DeepSeekEventMapper;
pub use groq::GroqEventMapper;
pub use ollama::OllamaEventMapper;
pub use openai::OpenAiEventMapper;
pub use openai_compatible::OpenAiCompatibleEventMapper;
pub use openrouter::OpenRouterEventMapper;
pub use xai::XaiEventMapper;

use crate::error::LlmError;
use crate::types::RawDelta;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Maps one vendor's streaming JSON chunk onto the canonical delta.
///
/// Mapping never fails: fields the mapper does not recognize are ignored and
/// an unrecognizable chunk yields an empty delta.
pub trait ProviderEventMapper: Send + Sync {
    /// Stable vendor id, e.g. `"deepseek"`.
    fn provider_id(&self) -> &'static str;

    fn map_to_raw_delta(&self, chunk: &serde_json::Value) -> RawDelta;
}

/// Supported vendors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProviderKind {
    #[serde(rename = "openai")]
    OpenAi,
    #[serde(rename = "deepseek")]
    DeepSeek,
    Xai,
    Groq,
    #[serde(rename = "openrouter")]
    OpenRouter,
    Ollama,
    #[serde(rename = "openai-compatible")]
    OpenAiCompatible,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 7] = [
        Self::OpenAi,
        Self::DeepSeek,
        Self::Xai,
        Self::Groq,
        Self::OpenRouter,
        Self::Ollama,
        Self::OpenAiCompatible,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::DeepSeek => "deepseek",
            Self::Xai => "xai",
            Self::Groq => "groq",
            Self::OpenRouter => "openrouter",
            Self::Ollama => "ollama",
            Self::OpenAiCompatible => "openai-compatible",
        }
    }

    /// Resolve a provider id, falling back to [`ProviderKind::OpenAiCompatible`]
    /// for vendors without a dedicated mapper.
    pub fn from_id(id: &str) -> Self {
        id.parse().unwrap_or_else(|_| {
            tracing::debug!(provider = id, "no dedicated mapper; using openai-compatible");
            Self::OpenAiCompatible
        })
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = LlmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" | "open-ai" => Ok(Self::OpenAi),
            "deepseek" | "deep-seek" => Ok(Self::DeepSeek),
            "xai" | "x-ai" | "grok" => Ok(Self::Xai),
            "groq" => Ok(Self::Groq),
            "openrouter" | "open-router" => Ok(Self::OpenRouter),
            "ollama" => Ok(Self::Ollama),
            "openai-compatible" | "openai_compatible" | "compatible" => {
                Ok(Self::OpenAiCompatible)
            }
            other => Err(LlmError::ConfigurationError(format!(
                "Unknown provider id: {other}"
            ))),
        }
    }
}

/// The closed set of vendor mappers.
#[derive(Debug, Clone)]
pub enum ProviderMapper {
    OpenAi(OpenAiEventMapper),
    DeepSeek(DeepSeekEventMapper),
    Xai(XaiEventMapper),
    Groq(GroqEventMapper),
    OpenRouter(OpenRouterEventMapper),
    Ollama(OllamaEventMapper),
    OpenAiCompatible(OpenAiCompatibleEventMapper),
}

impl ProviderMapper {
    pub fn for_kind(kind: ProviderKind) -> Self {
        match kind {
            ProviderKind::OpenAi => Self::OpenAi(OpenAiEventMapper),
            ProviderKind::DeepSeek => Self::DeepSeek(DeepSeekEventMapper),
            ProviderKind::Xai => Self::Xai(XaiEventMapper),
            ProviderKind::Groq => Self::Groq(GroqEventMapper),
            ProviderKind::OpenRouter => Self::OpenRouter(OpenRouterEventMapper),
            ProviderKind::Ollama => Self::Ollama(OllamaEventMapper::new()),
            ProviderKind::OpenAiCompatible => {
                Self::OpenAiCompatible(OpenAiCompatibleEventMapper)
            }
        }
    }

    pub fn for_provider(provider_id: &str) -> Self {
        Self::for_kind(ProviderKind::from_id(provider_id))
    }

    pub fn kind(&self) -> ProviderKind {
        match self {
            Self::OpenAi(_) => ProviderKind::OpenAi,
            Self::DeepSeek(_) => ProviderKind::DeepSeek,
            Self::Xai(_) => ProviderKind::Xai,
            Self::Groq(_) => ProviderKind::Groq,
            Self::OpenRouter(_) => ProviderKind::OpenRouter,
            Self::Ollama(_) => ProviderKind::Ollama,
            Self::OpenAiCompatible(_) => ProviderKind::OpenAiCompatible,
        }
    }

    fn inner(&self) -> &dyn ProviderEventMapper {
        match self {
            Self::OpenAi(m) => m,
            Self::DeepSeek(m) => m,
            Self::Xai(m) => m,
            Self::Groq(m) => m,
            Self::OpenRouter(m) => m,
            Self::Ollama(m) => m,
            Self::OpenAiCompatible(m) => m,
        }
    }
}

impl ProviderEventMapper for ProviderMapper {
    fn provider_id(&self) -> &'static str {
        self.inner().provider_id()
    }

    fn map_to_raw_delta(&self, chunk: &serde_json::Value) -> RawDelta {
        self.inner().map_to_raw_delta(chunk)
    }
}
