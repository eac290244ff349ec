//! String literal sub-lexer.
//!
//! Between the opening quote and the closing quote the scanner is in string
//! mode. Literal text runs up to the next `"` or `` ` ``; a backquote opens
//! an interpolated expression, which is lexed in normal mode until the
//! matching backquote returns to string mode.
//!
//! Escapes are not validated here: a backslash simply protects the next
//! character from ending the run. A backslash before a line break is a line
//! continuation: the break and the leading whitespace of the next line
//! belong to the content token.

use crate::{ScanError, TokenKind, TokenSet};

use super::{probe::Probe, Effect, Emit, Scanner};

impl Scanner {
    pub(super) fn scan_string(
        &self,
        p: &mut Probe<'_>,
        requested: TokenSet,
    ) -> Result<Emit, ScanError> {
        if p.at_eof() {
            return Err(p.no_match(requested));
        }
        match p.lookahead() {
            b'"' if requested.contains(TokenKind::EndStr) => {
                p.advance();
                Ok(Emit::new(TokenKind::EndStr, Effect::LeaveString))
            }
            b'`' if requested.contains(TokenKind::BeginInterpolation) => {
                self.check_push(p)?;
                p.advance();
                Ok(Emit::new(
                    TokenKind::BeginInterpolation,
                    Effect::OpenInterpolation,
                ))
            }
            b'"' | b'`' => Err(p.no_match(requested)),
            _ if requested.contains(TokenKind::StringContent) => {
                eat_content(p);
                Ok(Emit::plain(TokenKind::StringContent))
            }
            _ => Err(p.no_match(requested)),
        }
    }
}

/// Consume literal text up to a quote, a backquote or EOF.
fn eat_content(p: &mut Probe<'_>) {
    while !p.at_eof() {
        match p.lookahead() {
            b'"' | b'`' => break,
            b'\\' => {
                p.advance();
                if p.at_newline() {
                    p.eat_while(|b| matches!(b, b' ' | b'\t' | b'\n' | b'\r'));
                } else {
                    p.advance_char();
                }
            }
            _ => p.advance_char(),
        }
    }
}
