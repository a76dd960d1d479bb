//! chatflux
//!
//! Normalizes vendor streaming-chat wire formats (OpenAI, DeepSeek, xAI, Groq,
//! OpenRouter, Ollama and generic OpenAI-compatible endpoints) into one
//! canonical event stream.
//!
//! ```rust,ignore
//! use chatflux::prelude::*;
//! use futures::StreamExt;
//!
//! let response = reqwest::Client::new().post(url).json(&body).send().await?;
//! let mut stream = StreamFactory::from_response(response, StreamConfig::new("deepseek")).await?;
//! while let Some(event) = stream.next().await {
//!     match event {
//!         ChatStreamEvent::ThinkingDelta { delta } => eprint!("{delta}"),
//!         ChatStreamEvent::TextDelta { delta } => print!("{delta}"),
//!         ChatStreamEvent::Completion { response } => println!("\n{:?}", response.usage),
//!         ChatStreamEvent::Error { error } => eprintln!("\n{error}"),
//!         _ => {}
//!     }
//! }
//! ```
#![deny(unsafe_code)]

pub mod error;
pub mod providers;
pub mod streaming;
pub mod telemetry;
pub mod types;
pub mod utils;

pub use error::LlmError;

pub mod prelude {
    pub use crate::error::{LlmError, StreamErrorKind};
    pub use crate::providers::{ProviderEventMapper, ProviderKind, ProviderMapper};
    pub use crate::streaming::{
        ChatStream, ChatStreamHandle, LineBuffering, StreamConfig, StreamDiagnostics,
        StreamFactory, ThinkTagMode, WireFormat, collect_response,
    };
    pub use crate::types::{
        ChatStreamEvent, FinalResponse, FinishReason, RawDelta, ToolCall, ToolCallFragment, Usage,
    };
}
