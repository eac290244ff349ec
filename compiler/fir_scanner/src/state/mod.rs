//! Persisted scanner state and its byte codec.
//!
//! The host parser snapshots the scanner after every token and may restore
//! any earlier snapshot to resume scanning (incremental reparsing, error
//! recovery). Restoring a snapshot and scanning the same input must give
//! the same tokens as the uninterrupted run.
//!
//! # Format
//!
//! ```text
//! byte 0      frame depth (1..=MAX_DEPTH)
//! byte 1      pending block closes
//! byte 2      in-string flag (0 or 1)
//! byte 3      end-of-input separator flag (0 or 1)
//! then depth × 3 bytes, bottom frame first:
//!   byte 0    frame kind tag (see FrameKind)
//!   byte 1-2  block column, little-endian u16 (0 for non-indented kinds)
//! ```
//!
//! An empty buffer decodes to the initial state.

use crate::{Frame, FrameKind, FrameStack, StateError, MAX_DEPTH};

/// Upper bound on an encoded state. Hosts may size their snapshot buffer
/// with it; every valid state fits.
pub const SERIALIZATION_BUFFER_SIZE: usize = 1024;

const HEADER_LEN: usize = 4;
const FRAME_LEN: usize = 3;

const _: () = assert!(
    HEADER_LEN + FRAME_LEN * MAX_DEPTH <= SERIALIZATION_BUFFER_SIZE,
    "a full stack must fit the snapshot buffer"
);

/// Everything the scanner persists between calls.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScannerState {
    pub(crate) stack: FrameStack,
    /// Block closes still owed after a separator announced a dedent.
    pub(crate) pending_dedents: u8,
    /// Lexing the literal part of a string.
    pub(crate) in_string: bool,
    /// The end-of-input separator has been produced.
    pub(crate) eof_separator_emitted: bool,
}

impl ScannerState {
    /// Root frame only, no pending closes, flags clear.
    pub fn new() -> Self {
        Self::default()
    }

    /// Size of this state once encoded.
    pub fn encoded_len(&self) -> usize {
        HEADER_LEN + FRAME_LEN * self.stack.depth()
    }

    /// Encode into `buf`, returning the number of bytes written.
    ///
    /// # Errors
    ///
    /// [`StateError::BufferTooSmall`] if `buf` cannot hold the encoding;
    /// `buf` is left untouched.
    pub fn encode(&self, buf: &mut [u8]) -> Result<usize, StateError> {
        let needed = self.encoded_len();
        if buf.len() < needed {
            return Err(StateError::BufferTooSmall {
                needed,
                available: buf.len(),
            });
        }

        let frames = self.stack.as_slice();
        buf[0] = u8::try_from(frames.len()).unwrap_or(u8::MAX);
        buf[1] = self.pending_dedents;
        buf[2] = u8::from(self.in_string);
        buf[3] = u8::from(self.eof_separator_emitted);
        for (chunk, frame) in buf[HEADER_LEN..needed]
            .chunks_exact_mut(FRAME_LEN)
            .zip(frames)
        {
            chunk[0] = frame.kind().tag();
            chunk[1..3].copy_from_slice(&frame.column().to_le_bytes());
        }
        Ok(needed)
    }

    /// Decode a state produced by [`encode`](Self::encode).
    ///
    /// # Errors
    ///
    /// Any structural problem: wrong length, depth out of range, unknown
    /// frame tag, non-boolean flag, or a bottom frame that is not the root.
    pub fn decode(buf: &[u8]) -> Result<Self, StateError> {
        if buf.is_empty() {
            return Ok(Self::new());
        }
        if buf.len() < HEADER_LEN {
            return Err(StateError::Truncated {
                len: buf.len(),
                expected: HEADER_LEN,
            });
        }

        let depth = usize::from(buf[0]);
        if depth == 0 || depth > MAX_DEPTH {
            return Err(StateError::DepthOutOfRange {
                depth,
                max: MAX_DEPTH,
            });
        }
        let expected = HEADER_LEN + FRAME_LEN * depth;
        if buf.len() < expected {
            return Err(StateError::Truncated {
                len: buf.len(),
                expected,
            });
        }
        if buf.len() > expected {
            return Err(StateError::TrailingBytes {
                count: buf.len() - expected,
            });
        }

        let in_string = decode_flag(buf, 2)?;
        let eof_separator_emitted = decode_flag(buf, 3)?;

        let mut frames = Vec::with_capacity(depth);
        for (index, chunk) in buf[HEADER_LEN..].chunks_exact(FRAME_LEN).enumerate() {
            let kind = FrameKind::from_tag(chunk[0])
                .ok_or(StateError::UnknownFrameKind { index, tag: chunk[0] })?;
            let column = u16::from_le_bytes([chunk[1], chunk[2]]);
            frames.push(Frame::from_parts(kind, column));
        }
        let stack = FrameStack::from_frames(&frames).ok_or(StateError::InvalidRoot)?;

        Ok(Self {
            stack,
            pending_dedents: buf[1],
            in_string,
            eof_separator_emitted,
        })
    }
}

fn decode_flag(buf: &[u8], offset: usize) -> Result<bool, StateError> {
    match buf[offset] {
        0 => Ok(false),
        1 => Ok(true),
        value => Err(StateError::InvalidFlag { offset, value }),
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap/expect for clarity"
)]
