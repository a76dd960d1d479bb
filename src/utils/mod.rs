//! Utility modules
//!
//! Byte-level decoding and stream cancellation helpers used by the streaming
//! pipeline.

pub mod cancel;
pub mod utf8_decoder;

pub use cancel::{CancelHandle, make_cancellable_stream};
pub use utf8_decoder::Utf8StreamDecoder;
