//! Position in a Fir source text.
//!
//! A [`Cursor`] reads bytes out of a [`SourceBuffer`](crate::SourceBuffer),
//! which always ends in at least one zero byte past the source. Reads at or
//! past the end of input therefore yield `0` instead of panicking, and the
//! hot loops in the scanner need no bounds checks of their own.
//!
//! A zero byte *inside* the source is not end of input. Only
//! [`Cursor::is_eof`] decides that, by comparing the position with the
//! source length.

/// Read position in a source buffer.
///
/// `Copy` so that the scanner can read ahead on a private copy and hand the
/// advanced copy back only when a token is accepted.
#[derive(Clone, Copy, Debug)]
pub struct Cursor<'a> {
    /// Source bytes followed by zero padding.
    bytes: &'a [u8],
    pos: u32,
    /// Number of real source bytes in `bytes`.
    len: u32,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(bytes: &'a [u8], len: u32) -> Self {
        debug_assert!(bytes.len() > len as usize, "missing zero terminator");
        Cursor { bytes, pos: 0, len }
    }

    /// Byte under the cursor, `0` once input is exhausted.
    #[inline]
    pub fn current(&self) -> u8 {
        self.byte_at(self.pos)
    }

    /// Byte after the current one.
    #[inline]
    pub fn peek(&self) -> u8 {
        self.byte_at(self.pos.saturating_add(1))
    }

    #[inline]
    fn byte_at(&self, pos: u32) -> u8 {
        self.bytes.get(pos as usize).copied().unwrap_or(0)
    }

    /// Step over one byte. Does nothing at end of input.
    #[inline]
    pub fn advance(&mut self) {
        if self.pos < self.len {
            self.pos += 1;
        }
    }

    /// Step over one UTF-8 encoded character, never past the end of input.
    #[inline]
    pub fn advance_char(&mut self) {
        let width = Self::utf8_char_width(self.current());
        self.pos = self.pos.saturating_add(width).min(self.len.max(self.pos));
    }

    /// Encoded length of the character whose first byte is `lead`.
    /// Continuation and invalid bytes count as one.
    #[inline]
    pub fn utf8_char_width(lead: u8) -> u32 {
        match lead.leading_ones() {
            width @ 2..=4 => width,
            _ => 1,
        }
    }

    #[inline]
    pub fn is_eof(&self) -> bool {
        self.pos >= self.len
    }

    #[inline]
    pub fn pos(&self) -> u32 {
        self.pos
    }

    /// Length of the source, in bytes.
    #[inline]
    pub fn source_len(&self) -> u32 {
        self.len
    }

    /// Jump to `pos`, clamped to the end of input.
    #[inline]
    pub fn reset_to(&mut self, pos: u32) {
        self.pos = pos.min(self.len);
    }

    /// Source text in `start..end`.
    ///
    /// The range is clamped to the source. A range that splits a character
    /// yields `""`.
    pub fn slice(&self, start: u32, end: u32) -> &'a str {
        let end = end.min(self.len) as usize;
        let start = (start as usize).min(end);
        std::str::from_utf8(&self.bytes[start..end]).unwrap_or_default()
    }

    /// Source text from `start` up to the cursor.
    pub fn slice_from(&self, start: u32) -> &'a str {
        self.slice(start, self.pos)
    }

    /// Step over bytes while `pred` holds, stopping at end of input.
    #[inline]
    pub fn eat_while(&mut self, pred: impl Fn(u8) -> bool) {
        while self.pos < self.len && pred(self.current()) {
            self.pos += 1;
        }
    }

    /// Spaces and tabs.
    #[inline]
    pub fn eat_whitespace(&mut self) {
        self.eat_while(|b| matches!(b, b' ' | b'\t'));
    }

    /// Move onto the next `\n`, or to end of input if there is none.
    pub fn eat_until_newline_or_eof(&mut self) {
        let from = self.pos.min(self.len);
        let rest = &self.bytes[from as usize..self.len as usize];
        let skipped = memchr::memchr(b'\n', rest).unwrap_or(rest.len());
        self.pos = from.saturating_add(u32::try_from(skipped).unwrap_or(u32::MAX));
    }

    /// Column of the cursor: the number of characters between the last
    /// `\n` and the cursor. A tab counts as one column.
    pub fn column(&self) -> u32 {
        let line = &self.bytes[..self.pos.min(self.len) as usize];
        let line = match memchr::memrchr(b'\n', line) {
            Some(newline) => &line[newline + 1..],
            None => line,
        };
        let chars = line.iter().filter(|&&b| (b & 0xC0) != 0x80).count();
        u32::try_from(chars).unwrap_or(u32::MAX)
    }
}
