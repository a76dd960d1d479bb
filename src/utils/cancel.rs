//! Cancellation utilities
//!
//! First-class cancellation for unified streams. Cancelling ends the stream
//! without a terminal event and drops the transport, which closes the HTTP
//! connection so the vendor stops generating tokens.

use crate::streaming::ChatStream;
use tokio_util::sync::CancellationToken;

/// A handle that can be used to request cancellation.
#[derive(Clone, Debug)]
pub struct CancelHandle {
    token: CancellationToken,
}

impl CancelHandle {
    fn new() -> Self {
        Self {
            token: CancellationToken::new(),
        }
    }

    /// Request cancellation. The wrapped stream ends at its next poll.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// A future that resolves when cancellation is requested.
    pub fn cancelled(&self) -> tokio_util::sync::WaitForCancellationFuture<'_> {
        self.token.cancelled()
    }
}

/// Make a ChatStream cancellable and return its cancel handle.
pub fn make_cancellable_stream(stream: ChatStream) -> (ChatStream, CancelHandle) {
    let handle = CancelHandle::new();
    let token = handle.token.clone();
    let mut inner = stream;
    let s = async_stream::stream! {
        use futures::StreamExt;
        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => {
                    tracing::debug!("stream cancelled");
                    break;
                }
                item = inner.next() => {
                    let Some(item) = item else { break };
                    yield item;
                }
            }
        }
    };
    (Box::pin(s), handle)
}
