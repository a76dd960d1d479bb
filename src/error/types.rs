//! Core error types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The unified error type for stream normalization.
///
/// Payloads are owned strings so the error is `Clone` and can travel inside a
/// terminal [`ChatStreamEvent::Error`](crate::types::ChatStreamEvent::Error).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LlmError {
    /// Transport-level failure (connection reset, body read error).
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// Non-success HTTP status returned by the vendor before streaming began.
    #[error("API error {code}: {message}")]
    ApiError {
        code: u16,
        message: String,
        details: Option<serde_json::Value>,
    },

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    JsonError(String),

    /// Streaming failure classified by [`StreamErrorKind`].
    #[error("Stream error ({kind}): {message}")]
    StreamError {
        kind: StreamErrorKind,
        message: String,
    },

    /// Invalid configuration value.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

/// Failure modes of a single stream.
///
/// Only `TransportFailure` terminates a stream; the other kinds are recorded in
/// diagnostics and the offending unit of input is skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamErrorKind {
    /// One SSE payload failed to parse as JSON.
    MalformedFrame,
    /// Bytes left at stream end were not valid UTF-8.
    InvalidTrailingBytes,
    /// The byte stream errored or closed before the completion was signalled.
    TransportFailure,
    /// A tool-call fragment lacked its required `id`/`function` fields.
    IncompleteToolCallFragment,
}

impl StreamErrorKind {
    /// Whether this kind ends the stream.
    pub const fn is_fatal(self) -> bool {
        matches!(self, Self::TransportFailure)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MalformedFrame => "malformed_frame",
            Self::InvalidTrailingBytes => "invalid_trailing_bytes",
            Self::TransportFailure => "transport_failure",
            Self::IncompleteToolCallFragment => "incomplete_tool_call_fragment",
        }
    }
}

impl std::fmt::Display for StreamErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse grouping used by callers that decide on retries or presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Client,
    Server,
    Parsing,
    Configuration,
}

impl LlmError {
    /// Create an API error from a status code and message.
    pub fn api_error(code: u16, message: impl Into<String>) -> Self {
        Self::ApiError {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Create a stream error of the given kind.
    pub fn stream(kind: StreamErrorKind, message: impl Into<String>) -> Self {
        Self::StreamError {
            kind,
            message: message.into(),
        }
    }

    /// Shorthand for a fatal transport failure.
    pub fn transport_failure(message: impl Into<String>) -> Self {
        Self::stream(StreamErrorKind::TransportFailure, message)
    }

    /// The stream classification of this error, if it has one.
    ///
    /// Raw HTTP errors surfacing mid-stream count as transport failures.
    pub fn stream_error_kind(&self) -> Option<StreamErrorKind> {
        match self {
            Self::StreamError { kind, .. } => Some(*kind),
            Self::HttpError(_) => Some(StreamErrorKind::TransportFailure),
            Self::JsonError(_) => Some(StreamErrorKind::MalformedFrame),
            _ => None,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::HttpError(_) => ErrorCategory::Network,
            Self::ApiError { code, .. } if *code >= 500 => ErrorCategory::Server,
            Self::ApiError { .. } => ErrorCategory::Client,
            Self::JsonError(_) => ErrorCategory::Parsing,
            Self::StreamError { kind, .. } => match kind {
                StreamErrorKind::TransportFailure => ErrorCategory::Network,
                _ => ErrorCategory::Parsing,
            },
            Self::ConfigurationError(_) => ErrorCategory::Configuration,
        }
    }

    /// Whether a caller-side retry could plausibly succeed.
    ///
    /// This crate never retries on its own.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::HttpError(_) => true,
            Self::ApiError { code, .. } => *code == 429 || *code >= 500,
            Self::StreamError { kind, .. } => kind.is_fatal(),
            _ => false,
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, LlmError>;
