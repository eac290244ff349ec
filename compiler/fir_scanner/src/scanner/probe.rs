//! Tentative lookahead for one scan call.
//!
//! A [`Probe`] owns a copy of the caller's cursor. Bytes can be *skipped*
//! (leading trivia, moves the token start) or *advanced* (token content).
//! Nothing reaches the caller until [`Probe::finish`] hands back the cursor
//! positioned at the token end. Recognizers stop exactly at the end of their
//! token.

use crate::{Cursor, ScanError, Span, Token, TokenKind, TokenSet};

pub(crate) struct Probe<'a> {
    cursor: Cursor<'a>,
    /// Where the scan call started; reported by errors.
    origin: u32,
    /// Start of the token: first byte not skipped as trivia.
    start: u32,
}

impl<'a> Probe<'a> {
    pub(crate) fn new(cursor: Cursor<'a>) -> Self {
        let pos = cursor.pos();
        Self {
            cursor,
            origin: pos,
            start: pos,
        }
    }

    /// Current byte; `0x00` at EOF.
    #[inline]
    pub(crate) fn lookahead(&self) -> u8 {
        self.cursor.current()
    }

    #[inline]
    pub(crate) fn peek(&self) -> u8 {
        self.cursor.peek()
    }

    #[inline]
    pub(crate) fn at_eof(&self) -> bool {
        self.cursor.is_eof()
    }

    #[inline]
    pub(crate) fn at(&self, byte: u8) -> bool {
        !self.at_eof() && self.lookahead() == byte
    }

    #[inline]
    pub(crate) fn at_newline(&self) -> bool {
        matches!(self.lookahead(), b'\n' | b'\r')
    }

    #[inline]
    pub(crate) fn pos(&self) -> u32 {
        self.cursor.pos()
    }

    /// Column of the lookahead byte.
    #[inline]
    pub(crate) fn column(&self) -> u32 {
        self.cursor.column()
    }

    /// Consume one byte of token content.
    #[inline]
    pub(crate) fn advance(&mut self) {
        self.cursor.advance();
    }

    /// Consume one UTF-8 character of token content.
    #[inline]
    pub(crate) fn advance_char(&mut self) {
        self.cursor.advance_char();
    }

    #[inline]
    pub(crate) fn eat_while(&mut self, pred: impl Fn(u8) -> bool) {
        self.cursor.eat_while(pred);
    }

    #[inline]
    pub(crate) fn eat_until_newline_or_eof(&mut self) {
        self.cursor.eat_until_newline_or_eof();
    }

    /// Consume one byte as trivia. Only valid before any token content.
    pub(crate) fn skip(&mut self) {
        self.cursor.advance();
        self.start = self.cursor.pos();
    }

    /// Skip spaces and tabs.
    pub(crate) fn skip_horizontal_ws(&mut self) {
        self.cursor.eat_whitespace();
        self.start = self.cursor.pos();
    }

    /// Skip all whitespace, newlines included.
    pub(crate) fn skip_all_ws(&mut self) {
        self.cursor
            .eat_while(|b| matches!(b, b' ' | b'\t' | b'\n' | b'\r'));
        self.start = self.cursor.pos();
    }

    /// Source text from `from` to the current position.
    pub(crate) fn text_from(&self, from: u32) -> &'a str {
        self.cursor.slice_from(from)
    }

    pub(crate) fn origin(&self) -> u32 {
        self.origin
    }

    pub(crate) fn no_match(&self, requested: TokenSet) -> ScanError {
        ScanError::NoMatch {
            pos: self.origin,
            requested,
        }
    }

    /// Close the token at the current position and return the cursor to
    /// commit.
    pub(crate) fn finish(self, kind: TokenKind) -> (Token, Cursor<'a>) {
        let end = self.cursor.pos();
        (Token::new(kind, Span::new(self.start, end)), self.cursor)
    }
}
