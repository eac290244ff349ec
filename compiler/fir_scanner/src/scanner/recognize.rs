//! Token recognition in normal mode.
//!
//! Dispatch is on the first byte. Every branch checks the requested set
//! before committing to a kind: a keyword that is not requested is an
//! identifier, and a two-byte operator that is not requested falls back to
//! its one-byte prefix (`==` → `=` `=`).

use tracing::debug;

use crate::{DelimiterPolicy, Frame, FrameKind, ScanError, TokenKind, TokenSet};

use super::{keywords, probe::Probe, Effect, Emit, Scanner};

/// Identifier continuation: `[A-Za-z0-9_]`.
#[inline]
fn is_ident_continue(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

impl Scanner {
    pub(super) fn recognize(
        &self,
        p: &mut Probe<'_>,
        requested: TokenSet,
    ) -> Result<Emit, ScanError> {
        if p.at_eof() {
            return self
                .end_of_input(requested)
                .ok_or_else(|| p.no_match(requested));
        }

        let want = |kind: TokenKind| requested.contains(kind);
        match p.lookahead() {
            b'#' => comment(p, requested),

            b'"' if want(TokenKind::BeginStr) => {
                p.advance();
                Ok(Emit::new(TokenKind::BeginStr, Effect::EnterString))
            }
            b'`' if want(TokenKind::EndInterpolation) => {
                let pop =
                    self.check_close(p, TokenKind::EndInterpolation, FrameKind::Interpolation)?;
                p.advance();
                Ok(Emit::new(
                    TokenKind::EndInterpolation,
                    Effect::CloseInterpolation { pop },
                ))
            }

            b'\\' if p.peek() == b'(' && want(TokenKind::BackslashLParen) => {
                self.check_push(p)?;
                p.advance();
                p.advance();
                Ok(Emit::new(
                    TokenKind::BackslashLParen,
                    Effect::Push(Frame::Paren),
                ))
            }
            b'(' if want(TokenKind::LParen) => self.open(p, TokenKind::LParen, Frame::Paren),
            b'[' if want(TokenKind::LBracket) => {
                self.open(p, TokenKind::LBracket, Frame::Bracket)
            }
            b'{' if want(TokenKind::LBrace) => {
                self.open(p, TokenKind::LBrace, Frame::Indented { column: 0 })
            }
            b')' if want(TokenKind::RParen) => {
                self.close(p, TokenKind::RParen, FrameKind::Paren)
            }
            b']' if want(TokenKind::RBracket) => {
                self.close(p, TokenKind::RBracket, FrameKind::Bracket)
            }
            b'}' if want(TokenKind::RBrace) => {
                self.close(p, TokenKind::RBrace, FrameKind::Indented)
            }

            b'\'' => quote(p, requested),
            b'_' | b'A'..=b'Z' | b'a'..=b'z' => identifier(p, requested),
            b'0'..=b'9' => number(p, requested),

            b'.' => operator(p, requested, TokenKind::Dot, &[(b'.', TokenKind::DotDot)]),
            b'=' => operator(p, requested, TokenKind::Eq, &[(b'=', TokenKind::EqEq)]),
            b'!' => operator(p, requested, TokenKind::Exclamation, &[(b'=', TokenKind::Neq)]),
            b'<' => operator(
                p,
                requested,
                TokenKind::Lt,
                &[(b'<', TokenKind::LShift), (b'=', TokenKind::LtEq)],
            ),
            b'>' => operator(
                p,
                requested,
                TokenKind::Gt,
                &[(b'>', TokenKind::RShift), (b'=', TokenKind::GtEq)],
            ),
            b'&' => operator(p, requested, TokenKind::Amp, &[(b'&', TokenKind::AmpAmp)]),
            b'+' => operator(p, requested, TokenKind::Plus, &[(b'=', TokenKind::PlusEq)]),
            b'-' => operator(p, requested, TokenKind::Minus, &[(b'=', TokenKind::MinusEq)]),
            b'*' => operator(p, requested, TokenKind::Star, &[(b'=', TokenKind::StarEq)]),
            b'^' => operator(p, requested, TokenKind::Caret, &[(b'=', TokenKind::CaretEq)]),

            b':' => single(p, requested, TokenKind::Colon),
            b',' => single(p, requested, TokenKind::Comma),
            b';' => single(p, requested, TokenKind::Semicolon),
            b'|' => single(p, requested, TokenKind::Pipe),
            b'~' => single(p, requested, TokenKind::Tilde),
            b'/' => single(p, requested, TokenKind::Slash),
            b'%' => single(p, requested, TokenKind::Percent),

            _ => Err(p.no_match(requested)),
        }
    }

    fn open(&self, p: &mut Probe<'_>, kind: TokenKind, frame: Frame) -> Result<Emit, ScanError> {
        self.check_push(p)?;
        p.advance();
        Ok(Emit::new(kind, Effect::Push(frame)))
    }

    fn close(
        &self,
        p: &mut Probe<'_>,
        kind: TokenKind,
        expected: FrameKind,
    ) -> Result<Emit, ScanError> {
        let pop = self.check_close(p, kind, expected)?;
        p.advance();
        Ok(Emit::new(kind, if pop { Effect::Pop } else { Effect::None }))
    }

    /// Whether `closer` matches the innermost frame. A mismatch is an error
    /// under [`DelimiterPolicy::Strict`] and a no-op close otherwise.
    fn check_close(
        &self,
        p: &Probe<'_>,
        closer: TokenKind,
        expected: FrameKind,
    ) -> Result<bool, ScanError> {
        let stack = &self.state.stack;
        let matches = match expected {
            FrameKind::Indented => stack.top_is_brace(),
            FrameKind::Paren | FrameKind::Bracket | FrameKind::Interpolation => {
                stack.top().kind() == expected
            }
        };
        if matches {
            return Ok(true);
        }
        let top = stack.top().kind();
        match self.config.delimiters {
            DelimiterPolicy::Strict => Err(ScanError::MismatchedClose {
                pos: p.origin(),
                closer,
                top,
            }),
            DelimiterPolicy::Lenient => {
                debug!(closer = closer.name(), ?top, "unmatched closer accepted");
                Ok(false)
            }
        }
    }
}

/// `#` line comment or `#| ... |#` block comment. Block comments nest; an
/// unterminated one runs to end of input.
fn comment(p: &mut Probe<'_>, requested: TokenSet) -> Result<Emit, ScanError> {
    if p.peek() == b'|' {
        if !requested.contains(TokenKind::BlockComment) {
            return Err(p.no_match(requested));
        }
        p.advance();
        p.advance();
        let mut depth = 1u32;
        while depth > 0 && !p.at_eof() {
            match p.lookahead() {
                b'#' => {
                    p.advance();
                    if p.at(b'|') {
                        p.advance();
                        depth += 1;
                    }
                }
                b'|' => {
                    p.advance();
                    if p.at(b'#') {
                        p.advance();
                        depth -= 1;
                    }
                }
                _ => p.advance_char(),
            }
        }
        return Ok(Emit::plain(TokenKind::BlockComment));
    }

    if !requested.contains(TokenKind::LineComment) {
        return Err(p.no_match(requested));
    }
    p.eat_until_newline_or_eof();
    Ok(Emit::plain(TokenKind::LineComment))
}

/// `'` starts a label (`'outer`) or a character literal (`'a'`, `'\n'`).
///
/// After a lowercase letter the identifier run decides: exactly one
/// character followed by `'` is a character literal when one is requested,
/// anything else is a label ending before any quote.
fn quote(p: &mut Probe<'_>, requested: TokenSet) -> Result<Emit, ScanError> {
    p.advance();

    if p.lookahead().is_ascii_lowercase() && requested.contains(TokenKind::Label) {
        let run_start = p.pos();
        p.eat_while(is_ident_continue);
        if p.pos() - run_start == 1
            && p.at(b'\'')
            && requested.contains(TokenKind::CharLiteral)
        {
            p.advance();
            return Ok(Emit::plain(TokenKind::CharLiteral));
        }
        return Ok(Emit::plain(TokenKind::Label));
    }

    if !requested.contains(TokenKind::CharLiteral) || p.at_eof() {
        return Err(p.no_match(requested));
    }
    match p.lookahead() {
        b'\'' => return Err(p.no_match(requested)),
        b'\\' => {
            p.advance();
            if !matches!(p.lookahead(), b'n' | b't' | b'r' | b'\\' | b'\'') {
                return Err(p.no_match(requested));
            }
            p.advance();
        }
        _ => p.advance_char(),
    }
    if !p.at(b'\'') {
        return Err(p.no_match(requested));
    }
    p.advance();
    Ok(Emit::plain(TokenKind::CharLiteral))
}

/// Identifiers, keywords and the `_` wildcard.
///
/// Leading underscores are part of the identifier; the case of the first
/// letter after them picks upper or lower. A run of underscores with no
/// letter after it is a single wildcard token.
fn identifier(p: &mut Probe<'_>, requested: TokenSet) -> Result<Emit, ScanError> {
    let start = p.pos();
    p.eat_while(|b| b == b'_');

    let kind = match p.lookahead() {
        b'A'..=b'Z' => {
            p.eat_while(is_ident_continue);
            keywords::upper_lookup(p.text_from(start))
                .filter(|&kw| requested.contains(kw))
                .unwrap_or(TokenKind::UpperId)
        }
        b'a'..=b'z' => {
            p.eat_while(is_ident_continue);
            keywords::lookup(p.text_from(start))
                .filter(|&kw| requested.contains(kw))
                .unwrap_or(TokenKind::LowerId)
        }
        _ => TokenKind::Underscore,
    };

    if requested.contains(kind) {
        Ok(Emit::plain(kind))
    } else {
        Err(p.no_match(requested))
    }
}

/// Decimal, `0x` hexadecimal and `0b` binary integers. `_` separates digits
/// anywhere after the first; a radix prefix needs at least one digit.
fn number(p: &mut Probe<'_>, requested: TokenSet) -> Result<Emit, ScanError> {
    if !requested.contains(TokenKind::IntLiteral) {
        return Err(p.no_match(requested));
    }

    let is_digit: fn(u8) -> bool = match (p.lookahead(), p.peek()) {
        (b'0', b'x' | b'X') => is_hex_digit,
        (b'0', b'b' | b'B') => is_binary_digit,
        _ => {
            p.eat_while(|b| b.is_ascii_digit() || b == b'_');
            return Ok(Emit::plain(TokenKind::IntLiteral));
        }
    };

    p.advance();
    p.advance();
    let mut digits = 0u32;
    loop {
        let b = p.lookahead();
        if is_digit(b) {
            digits += 1;
        } else if b != b'_' {
            break;
        }
        p.advance();
    }
    if digits == 0 {
        return Err(p.no_match(requested));
    }
    Ok(Emit::plain(TokenKind::IntLiteral))
}

fn is_hex_digit(b: u8) -> bool {
    b.is_ascii_hexdigit()
}

fn is_binary_digit(b: u8) -> bool {
    matches!(b, b'0' | b'1')
}

/// A one-byte operator, or a two-byte one when the second byte matches an
/// entry of `longer` whose kind is requested.
fn operator(
    p: &mut Probe<'_>,
    requested: TokenSet,
    short: TokenKind,
    longer: &[(u8, TokenKind)],
) -> Result<Emit, ScanError> {
    let second = p.peek();
    if let Some(&(_, kind)) = longer
        .iter()
        .find(|&&(b, kind)| b == second && requested.contains(kind))
    {
        p.advance();
        p.advance();
        return Ok(Emit::plain(kind));
    }
    single(p, requested, short)
}

fn single(p: &mut Probe<'_>, requested: TokenSet, kind: TokenKind) -> Result<Emit, ScanError> {
    if !requested.contains(kind) {
        return Err(p.no_match(requested));
    }
    p.advance();
    Ok(Emit::plain(kind))
}
