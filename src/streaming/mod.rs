//! Streaming Module
//!
//! The unified event stream: bytes are decoded to UTF-8, split into SSE
//! `data:` payloads, mapped per vendor into [`RawDelta`](crate::types::RawDelta)
//! values and run through the reasoning phase tracker.
//!
//! ```text
//! bytes -> Utf8StreamDecoder -> SseFrameParser -> ProviderEventMapper
//!       -> [InlineThinkSplitter] -> ReasoningPhaseTracker -> ChatStream
//! ```

pub mod config;
pub mod diagnostics;
pub mod factory;
pub mod pipeline;
pub mod reasoning;
pub mod sse;
pub mod tag_extractor;
pub mod types;


pub use config::StreamConfig;
pub use diagnostics::{DiagnosticsSnapshot, StreamDiagnostics};
pub use factory::{StreamFactory, collect_response};
pub use pipeline::EventPipeline;
pub use reasoning::{
    RESPONSE_MARKER, ReasoningPhase, ReasoningPhaseTracker, ReasoningState, THINK_END_MARKER,
};
pub use sse::{DONE_MARKER, LineBuffering, SseFrameParser, WireFormat};
pub use tag_extractor::{InlineThinkSplitter, SplitOutput, ThinkTagMode};
pub use types::{ChatStream, ChatStreamEvent, ChatStreamHandle};
