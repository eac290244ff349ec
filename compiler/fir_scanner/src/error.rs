//! Scanner and state-codec errors.
//!
//! Every error is returned before anything is committed: the caller's
//! cursor and the scanner state are exactly as they were before the call.

use thiserror::Error;

use crate::{FrameKind, TokenKind, TokenSet};

/// Failure of a single scan call.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ScanError {
    /// No token of any requested kind can be formed at `pos`.
    #[error("no token matches at byte {pos}; expected {}", .requested.format_expected())]
    NoMatch { pos: u32, requested: TokenSet },

    /// Opening a delimiter, block or interpolation would exceed the
    /// nesting limit.
    #[error("nesting deeper than {limit} levels at byte {pos}")]
    NestingTooDeep { pos: u32, limit: usize },

    /// A closing delimiter does not match the innermost open frame.
    #[error("`{}` at byte {pos} does not close the innermost {top:?} frame", .closer.name())]
    MismatchedClose {
        pos: u32,
        closer: TokenKind,
        top: FrameKind,
    },
}

impl ScanError {
    /// Byte offset the failed scan started from.
    pub fn pos(&self) -> u32 {
        match self {
            ScanError::NoMatch { pos, .. }
            | ScanError::NestingTooDeep { pos, .. }
            | ScanError::MismatchedClose { pos, .. } => *pos,
        }
    }
}

/// Failure to serialize or restore scanner state.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum StateError {
    #[error("state needs {needed} bytes but the buffer holds {available}")]
    BufferTooSmall { needed: usize, available: usize },

    #[error("state is truncated: {len} bytes, expected {expected}")]
    Truncated { len: usize, expected: usize },

    #[error("frame depth {depth} is outside 1..={max}")]
    DepthOutOfRange { depth: usize, max: usize },

    #[error("unknown frame kind tag {tag} at frame {index}")]
    UnknownFrameKind { index: usize, tag: u8 },

    #[error("flag byte {offset} holds {value}, expected 0 or 1")]
    InvalidFlag { offset: usize, value: u8 },

    #[error("bottom frame must be an indented block at column 0")]
    InvalidRoot,

    #[error("{count} unexpected bytes after the last frame")]
    TrailingBytes { count: usize },
}
