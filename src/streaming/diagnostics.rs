//! Stream diagnostics
//!
//! Counters for the non-fatal problems a stream recovers from. They are
//! shared between the stream and whoever created it, so they can be read while
//! the stream is still being consumed.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
struct Counters {
    frames_seen: AtomicU64,
    malformed_frames: AtomicU64,
    skipped_tool_fragments: AtomicU64,
    discarded_trailing_bytes: AtomicU64,
}

/// Shared handle to one stream's counters. Cloning shares the counters.
#[derive(Debug, Clone, Default)]
pub struct StreamDiagnostics {
    inner: Arc<Counters>,
}

/// Point-in-time copy of [`StreamDiagnostics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticsSnapshot {
    /// `data:` payloads handed to the mapper (including malformed ones)
    pub frames_seen: u64,
    /// Payloads that were not valid JSON
    pub malformed_frames: u64,
    /// Tool-call fragments that could not be attributed to a call
    pub skipped_tool_fragments: u64,
    /// Bytes of an incomplete UTF-8 sequence dropped at end of stream
    pub discarded_trailing_bytes: u64,
}

impl StreamDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames_seen(&self) -> u64 {
        self.inner.frames_seen.load(Ordering::Relaxed)
    }

    pub fn malformed_frames(&self) -> u64 {
        self.inner.malformed_frames.load(Ordering::Relaxed)
    }

    pub fn skipped_tool_fragments(&self) -> u64 {
        self.inner.skipped_tool_fragments.load(Ordering::Relaxed)
    }

    pub fn discarded_trailing_bytes(&self) -> u64 {
        self.inner.discarded_trailing_bytes.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> DiagnosticsSnapshot {
        DiagnosticsSnapshot {
            frames_seen: self.frames_seen(),
            malformed_frames: self.malformed_frames(),
            skipped_tool_fragments: self.skipped_tool_fragments(),
            discarded_trailing_bytes: self.discarded_trailing_bytes(),
        }
    }

    pub(crate) fn record_frame(&self) {
        self.inner.frames_seen.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_malformed_frame(&self) {
        self.inner.malformed_frames.fetch_add(1, Ordering::Relaxed);
    }

    // The tracker owns the authoritative count; mirror it.
    pub(crate) fn set_skipped_tool_fragments(&self, count: u64) {
        self.inner
            .skipped_tool_fragments
            .store(count, Ordering::Relaxed);
    }

    pub(crate) fn set_discarded_trailing_bytes(&self, count: u64) {
        self.inner
            .discarded_trailing_bytes
            .store(count, Ordering::Relaxed);
    }
}
