//! Owned Fir source text, zero-terminated for the scanner.
//!
//! The bytes are copied into an allocation rounded up to a multiple of 64
//! with at least one zero byte after the source, so a [`Cursor`] can read
//! one byte ahead anywhere in the input.
//!
//! Construction also notes encoding problems that the scanner treats as
//! plain input: byte order marks and NUL bytes. `firc` reports them as
//! warnings.

use crate::Cursor;

const ALIGN: usize = 64;

/// Zero-terminated copy of one source text.
#[derive(Clone, Debug)]
pub struct SourceBuffer {
    /// `len` source bytes, then zeros up to a multiple of [`ALIGN`].
    bytes: Vec<u8>,
    len: u32,
    issues: Vec<EncodingIssue>,
}

/// An encoding problem found while building a [`SourceBuffer`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EncodingIssue {
    pub kind: EncodingIssueKind,
    /// Byte offset of the offending bytes.
    pub pos: u32,
    pub len: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EncodingIssueKind {
    /// `EF BB BF` at the start.
    Utf8Bom,
    /// `FF FE` at the start: the file is probably UTF-16LE.
    Utf16LeBom,
    /// `FE FF` at the start: the file is probably UTF-16BE.
    Utf16BeBom,
    /// A `0x00` byte inside the source.
    InteriorNull,
}

impl EncodingIssueKind {
    pub fn describe(self) -> &'static str {
        match self {
            EncodingIssueKind::Utf8Bom => "UTF-8 byte order mark",
            EncodingIssueKind::Utf16LeBom => "UTF-16 (little-endian) byte order mark",
            EncodingIssueKind::Utf16BeBom => "UTF-16 (big-endian) byte order mark",
            EncodingIssueKind::InteriorNull => "null byte in source",
        }
    }
}

impl SourceBuffer {
    /// Copy `source` into a new buffer.
    ///
    /// Offsets are `u32`; a source longer than `u32::MAX` bytes is cut off
    /// at that length.
    pub fn new(source: &str) -> Self {
        let text = source.as_bytes();
        let len = u32::try_from(text.len()).unwrap_or(u32::MAX);
        let kept = &text[..len as usize];

        let mut bytes = vec![0u8; (kept.len() / ALIGN + 1) * ALIGN];
        bytes[..kept.len()].copy_from_slice(kept);

        let mut issues: Vec<EncodingIssue> = byte_order_mark(kept).into_iter().collect();
        issues.extend(memchr::memchr_iter(0, kept).map(|pos| EncodingIssue {
            kind: EncodingIssueKind::InteriorNull,
            // `kept` is at most `u32::MAX` bytes long.
            pos: u32::try_from(pos).unwrap_or(u32::MAX),
            len: 1,
        }));

        SourceBuffer { bytes, len, issues }
    }

    /// The source text, without the trailing zeros.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len as usize]
    }

    /// A cursor at the start of the source.
    pub fn cursor(&self) -> Cursor<'_> {
        Cursor::new(&self.bytes, self.len)
    }

    pub fn len(&self) -> u32 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Byte order mark first, if any, then NUL bytes in source order.
    pub fn encoding_issues(&self) -> &[EncodingIssue] {
        &self.issues
    }

    #[cfg(test)]
    fn padded(&self) -> &[u8] {
        &self.bytes
    }
}

fn byte_order_mark(text: &[u8]) -> Option<EncodingIssue> {
    let (kind, len) = match text {
        [0xEF, 0xBB, 0xBF, ..] => (EncodingIssueKind::Utf8Bom, 3),
        [0xFF, 0xFE, ..] => (EncodingIssueKind::Utf16LeBom, 2),
        [0xFE, 0xFF, ..] => (EncodingIssueKind::Utf16BeBom, 2),
        _ => return None,
    };
    Some(EncodingIssue { kind, pos: 0, len })
}
