//! Core Streaming Types

use futures::Stream;
use std::pin::Pin;

pub use crate::types::ChatStreamEvent;

/// Chat Stream - the unified event sequence
///
/// A pinned, boxed stream of canonical events. Errors arrive in-band as a
/// terminal [`ChatStreamEvent::Error`]; the stream yields nothing afterwards.
pub type ChatStream = Pin<Box<dyn Stream<Item = ChatStreamEvent> + Send>>;

/// Chat stream with first-class cancellation handle
///
/// # Example
/// ```rust,ignore
/// use chatflux::streaming::{StreamConfig, StreamFactory};
///
/// let handle = StreamFactory::from_response_with_cancel(response, StreamConfig::new("openai")).await?;
/// // consume handle.stream ...
/// handle.cancel.cancel();
/// ```
pub struct ChatStreamHandle {
    /// The underlying chat stream
    pub stream: ChatStream,
    /// Handle to cancel the stream
    pub cancel: crate::utils::cancel::CancelHandle,
}
