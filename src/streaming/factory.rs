//! Stream Factory
//!
//! Builds the unified event stream from a vendor byte stream. The stream is
//! lazy: nothing is read from the transport until the consumer polls.

use super::config::StreamConfig;
use super::diagnostics::StreamDiagnostics;
use super::pipeline::EventPipeline;
use super::types::{ChatStream, ChatStreamHandle};
use crate::error::LlmError;
use crate::providers::{ProviderEventMapper, ProviderMapper};
use crate::types::{ChatStreamEvent, FinalResponse, ToolCall};
use futures::Stream;
use futures_util::StreamExt;
use serde_json::Value;
use std::collections::BTreeMap;

/// Stream Factory
pub struct StreamFactory;

impl StreamFactory {
    /// Unified stream over `bytes`, with the mapper chosen from
    /// `config.provider_id`.
    pub fn create_unified_stream<S, B>(bytes: S, config: StreamConfig) -> ChatStream
    where
        S: Stream<Item = Result<B, LlmError>> + Send + 'static,
        B: AsRef<[u8]> + Send + 'static,
    {
        Self::create_unified_stream_with_diagnostics(bytes, config).0
    }

    /// Like [`create_unified_stream`](Self::create_unified_stream), also
    /// returning the stream's diagnostics counters.
    pub fn create_unified_stream_with_diagnostics<S, B>(
        bytes: S,
        config: StreamConfig,
    ) -> (ChatStream, StreamDiagnostics)
    where
        S: Stream<Item = Result<B, LlmError>> + Send + 'static,
        B: AsRef<[u8]> + Send + 'static,
    {
        let mapper = ProviderMapper::for_provider(&config.provider_id);
        Self::create_with_mapper(bytes, mapper, config)
    }

    /// Unified stream using a caller-supplied mapper.
    pub fn create_with_mapper<S, B, M>(
        bytes: S,
        mapper: M,
        config: StreamConfig,
    ) -> (ChatStream, StreamDiagnostics)
    where
        S: Stream<Item = Result<B, LlmError>> + Send + 'static,
        B: AsRef<[u8]> + Send + 'static,
        M: ProviderEventMapper + 'static,
    {
        let diagnostics = StreamDiagnostics::new();
        let stream_id = uuid::Uuid::new_v4();
        let span = tracing::info_span!(
            "chat_stream",
            provider = mapper.provider_id(),
            stream_id = %stream_id
        );
        let mut pipeline = EventPipeline::new(mapper, &config, diagnostics.clone());

        let stream = async_stream::stream! {
            let mut bytes = Box::pin(bytes);
            span.in_scope(|| tracing::debug!("stream opened"));

            while let Some(chunk) = bytes.next().await {
                let events = match chunk {
                    Ok(chunk) => span.in_scope(|| pipeline.push_bytes(chunk.as_ref())),
                    Err(e) => span.in_scope(|| pipeline.fail(e)).into_iter().collect(),
                };
                for event in events {
                    yield event;
                }
                if pipeline.is_finished() {
                    break;
                }
            }

            for event in span.in_scope(|| pipeline.finish()) {
                yield event;
            }
            span.in_scope(|| {
                let snapshot = pipeline.diagnostics().snapshot();
                tracing::debug!(
                    frames = snapshot.frames_seen,
                    malformed = snapshot.malformed_frames,
                    skipped_tool_fragments = snapshot.skipped_tool_fragments,
                    discarded_bytes = snapshot.discarded_trailing_bytes,
                    "stream closed"
                );
            });
        };

        (Box::pin(stream), diagnostics)
    }

    /// Unified stream over an HTTP response.
    ///
    /// A non-success status is returned as [`LlmError::ApiError`] before any
    /// event is produced.
    pub async fn from_response(
        response: reqwest::Response,
        config: StreamConfig,
    ) -> Result<ChatStream, LlmError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(api_error_from_body(
                status.as_u16(),
                &body,
                status.canonical_reason(),
            ));
        }

        let bytes = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(|e| LlmError::transport_failure(format!("Stream error: {e}"))));
        Ok(Self::create_unified_stream(bytes, config))
    }

    /// [`from_response`](Self::from_response) with a cancellation handle.
    pub async fn from_response_with_cancel(
        response: reqwest::Response,
        config: StreamConfig,
    ) -> Result<ChatStreamHandle, LlmError> {
        let stream = Self::from_response(response, config).await?;
        let (stream, cancel) = crate::utils::cancel::make_cancellable_stream(stream);
        Ok(ChatStreamHandle { stream, cancel })
    }
}

/// Build an `ApiError` from an error response body.
///
/// Understands `{"error": {"message": ...}}`, `{"error": "..."}` and
/// `{"message": ...}`; anything else falls back to the status reason or a
/// body sample.
fn api_error_from_body(status: u16, body: &str, fallback: Option<&str>) -> LlmError {
    let json: Option<Value> = serde_json::from_str(body).ok();
    let message = json.as_ref().and_then(|v| {
        v.get("error")
            .and_then(|e| e.get("message").or(Some(e)))
            .and_then(Value::as_str)
            .or_else(|| v.get("message").and_then(Value::as_str))
            .map(String::from)
    });

    let message = message.unwrap_or_else(|| match fallback {
        Some(reason) => reason.to_string(),
        None => body.chars().take(200).collect(),
    });
    tracing::warn!(status, "vendor returned error status: {message}");

    LlmError::ApiError {
        code: status,
        message,
        details: json,
    }
}

/// Drive `stream` to its end and return the aggregated response.
///
/// A stream that ends without a terminal event (a done marker without a
/// finish reason) yields a response assembled from the deltas seen.
pub async fn collect_response(mut stream: ChatStream) -> Result<FinalResponse, LlmError> {
    let mut text = String::new();
    let mut thinking = String::new();
    let mut tool_calls: BTreeMap<usize, ToolCall> = BTreeMap::new();

    while let Some(event) = stream.next().await {
        match event {
            ChatStreamEvent::TextDelta { delta } => text.push_str(&delta),
            ChatStreamEvent::ThinkingDelta { delta } => thinking.push_str(&delta),
            ChatStreamEvent::ToolCallDelta { fragment } => {
                let call = tool_calls.entry(fragment.index).or_insert_with(|| {
                    ToolCall::function(fragment.id.clone().unwrap_or_default(), "", "")
                });
                if call.function.name.is_empty()
                    && let Some(name) = &fragment.name
                {
                    call.function.name.clone_from(name);
                }
                if let Some(args) = &fragment.arguments {
                    call.function.arguments.push_str(args);
                }
            }
            ChatStreamEvent::Completion { response } => return Ok(response),
            ChatStreamEvent::Error { error } => return Err(error),
        }
    }

    Ok(FinalResponse {
        text,
        tool_calls: tool_calls.into_values().collect(),
        thinking: (!thinking.is_empty()).then_some(thinking),
        ..Default::default()
    })
}
