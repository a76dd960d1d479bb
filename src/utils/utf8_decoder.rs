//! UTF-8 Stream Decoder
//!
//! Turns arbitrary byte chunks into valid UTF-8 text. Network chunks split
//! multi-byte characters at random points; the decoder holds back the trailing
//! incomplete sequence until the rest of it arrives.
//!
//! # Example
//!
//! ```rust,ignore
//! use chatflux::utils::Utf8StreamDecoder;
//!
//! let mut decoder = Utf8StreamDecoder::new();
//! assert_eq!(decoder.decode(b"caf\xC3"), "caf");
//! assert_eq!(decoder.decode(b"\xA9 done"), "é done");
//! assert_eq!(decoder.flush(), "");
//! ```

/// Longest UTF-8 encoding of a single codepoint.
const MAX_SEQUENCE_LEN: usize = 4;

/// Incremental, never-failing UTF-8 decoder.
///
/// After every [`decode`](Self::decode) the internal buffer holds at most
/// three bytes, and only ones that form an incomplete prefix of a codepoint.
#[derive(Debug, Default, Clone)]
pub struct Utf8StreamDecoder {
    buffer: Vec<u8>,
    discarded: u64,
}

impl Utf8StreamDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a chunk, returning the text of every complete codepoint seen so far.
    ///
    /// Invalid sequences inside the complete region become U+FFFD; they never
    /// cause an error.
    pub fn decode(&mut self, chunk: &[u8]) -> String {
        if chunk.is_empty() && self.buffer.is_empty() {
            return String::new();
        }
        self.buffer.extend_from_slice(chunk);

        let split = complete_prefix_len(&self.buffer);
        if split == 0 {
            return String::new();
        }

        let text = match std::str::from_utf8(&self.buffer[..split]) {
            Ok(s) => s.to_owned(),
            Err(_) => String::from_utf8_lossy(&self.buffer[..split]).into_owned(),
        };
        self.buffer.drain(..split);
        text
    }

    /// Decode whatever is left in the buffer at end of stream.
    ///
    /// Lossy: bytes that do not form valid UTF-8 are dropped and counted in
    /// [`discarded_bytes`](Self::discarded_bytes) instead of being reported as
    /// an error.
    pub fn flush(&mut self) -> String {
        if self.buffer.is_empty() {
            return String::new();
        }

        let pending = std::mem::take(&mut self.buffer);
        match std::str::from_utf8(&pending) {
            Ok(s) => s.to_owned(),
            Err(e) => {
                let valid = e.valid_up_to();
                let dropped = pending.len() - valid;
                self.discarded += dropped as u64;
                tracing::debug!(dropped, "discarding invalid trailing UTF-8 bytes");
                // valid_up_to guarantees this prefix is valid UTF-8
                String::from_utf8_lossy(&pending[..valid]).into_owned()
            }
        }
    }

    /// Number of bytes waiting for the rest of their codepoint.
    pub fn pending_len(&self) -> usize {
        self.buffer.len()
    }

    pub fn has_pending(&self) -> bool {
        !self.buffer.is_empty()
    }

    /// Total bytes dropped by [`flush`](Self::flush) over the decoder's lifetime.
    pub fn discarded_bytes(&self) -> u64 {
        self.discarded
    }

    /// Drop any buffered bytes and counters.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.discarded = 0;
    }
}

/// Length of the prefix of `buf` that ends on a codepoint boundary.
///
/// Scans at most the last four bytes backwards. The first non-continuation
/// byte found decides: ASCII or an invalid lead is a boundary, a lead byte
/// whose run is incomplete marks the split point.
fn complete_prefix_len(buf: &[u8]) -> usize {
    let len = buf.len();
    let window_start = len.saturating_sub(MAX_SEQUENCE_LEN);

    for i in (window_start..len).rev() {
        let byte = buf[i];
        if byte & 0x80 == 0 {
            return len;
        }
        if byte & 0xC0 == 0x80 {
            continue;
        }
        let Some(needed) = sequence_len(byte) else {
            return len;
        };
        return if len - i >= needed { len } else { i };
    }

    // Only continuation bytes in the window: they can never complete.
    len
}

/// Expected sequence length for a lead byte, `None` for invalid leads.
fn sequence_len(lead: u8) -> Option<usize> {
    match lead {
        0xC0..=0xDF => Some(2),
        0xE0..=0xEF => Some(3),
        0xF0..=0xF7 => Some(4),
        _ => None,
    }
}
