//! Running the scanner without a parser.
//!
//! A parser decides at every position which token kinds are acceptable.
//! Tools that only need a token stream (the CLI, benchmarks, tests) stand
//! in for it with a [`RequestPolicy`], and [`Driver`] feeds the policy's
//! requests to the scanner until input runs out.

use crate::{Cursor, Frame, ScanError, Scanner, Token, TokenKind, TokenSet};

/// Chooses the requested set for each scan call.
pub trait RequestPolicy {
    /// Kinds to request with the scanner about to read at `cursor`.
    fn requested(&mut self, scanner: &Scanner, cursor: Cursor<'_>) -> TokenSet;

    /// Called with every token the scanner produced.
    fn observe(&mut self, _token: &Token) {}
}

/// Requests every kind the grammar could plausibly accept, using the
/// previous significant token, the innermost frame and the rest of the
/// current line as context:
///
/// - after a `:` that ends its line, only a block open (or a comment
///   before it);
/// - never a block open anywhere else, so `x: I32` stays on one line;
/// - a separator only inside an indented block, and never twice in a row.
///
/// Comments do not count as the previous token.
#[derive(Clone, Debug, Default)]
pub struct PermissivePolicy {
    last: Option<TokenKind>,
}

impl PermissivePolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// The last non-comment token kind observed.
    pub fn last(&self) -> Option<TokenKind> {
        self.last
    }
}

const AFTER_COLON: TokenSet = TokenSet::single(TokenKind::StartBlock)
    .with(TokenKind::LineComment)
    .with(TokenKind::BlockComment);

impl RequestPolicy for PermissivePolicy {
    fn requested(&mut self, scanner: &Scanner, cursor: Cursor<'_>) -> TokenSet {
        if self.last == Some(TokenKind::Colon) && rest_of_line_is_blank(cursor) {
            return AFTER_COLON;
        }
        let mut set = TokenSet::all().without(TokenKind::StartBlock);
        let in_block = matches!(scanner.top_frame(), Frame::Indented { .. });
        if !in_block || self.last == Some(TokenKind::Newline) {
            set = set.without(TokenKind::Newline);
        }
        set
    }

    fn observe(&mut self, token: &Token) {
        if !token.kind.is_comment() {
            self.last = Some(token.kind);
        }
    }
}

/// Only whitespace or a comment between `cursor` and the next line break.
fn rest_of_line_is_blank(cursor: Cursor<'_>) -> bool {
    let rest = cursor.slice(cursor.pos(), cursor.source_len());
    let line = rest.lines().next().unwrap_or_default();
    let line = line.trim_start_matches([' ', '\t']);
    line.is_empty() || line.starts_with('#')
}

/// Iterator over the tokens of one source text.
///
/// Ends cleanly when nothing matches and only whitespace is left. Any
/// other failure is yielded once as an `Err`, after which the iterator is
/// exhausted.
pub struct Driver<'a, P> {
    scanner: Scanner,
    cursor: Cursor<'a>,
    policy: P,
    done: bool,
}

impl<'a, P: RequestPolicy> Driver<'a, P> {
    pub fn new(scanner: Scanner, cursor: Cursor<'a>, policy: P) -> Self {
        Driver {
            scanner,
            cursor,
            policy,
            done: false,
        }
    }

    pub fn scanner(&self) -> &Scanner {
        &self.scanner
    }

    pub fn cursor(&self) -> Cursor<'a> {
        self.cursor
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }

    pub fn into_parts(self) -> (Scanner, Cursor<'a>, P) {
        (self.scanner, self.cursor, self.policy)
    }

    /// Whether only whitespace remains after the cursor.
    fn at_end(&self) -> bool {
        self.cursor
            .slice(self.cursor.pos(), self.cursor.source_len())
            .trim()
            .is_empty()
    }
}

impl<P: RequestPolicy> Iterator for Driver<'_, P> {
    type Item = Result<Token, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let requested = self.policy.requested(&self.scanner, self.cursor);
        match self.scanner.scan(&mut self.cursor, requested) {
            Ok(token) => {
                self.policy.observe(&token);
                Some(Ok(token))
            }
            Err(ScanError::NoMatch { .. }) if self.at_end() => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap/expect for clarity"
)]
