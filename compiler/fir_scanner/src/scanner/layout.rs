//! Layout resolution: whitespace and newlines against the frame stack.
//!
//! Two modes, picked by the innermost frame:
//!
//! - **Grouped** (paren, bracket, interpolation on top): newlines are
//!   insignificant. A separator is produced only when the parser explicitly
//!   asks for one at a line break, and a block opened here starts at the
//!   column of the next non-blank character, wherever that is.
//! - **Indented** (a block or brace group on top): after a line break the
//!   first column is compared with the block column. Less closes blocks,
//!   equal separates statements, greater continues the previous line.
//!   A closing delimiter also closes every block opened inside its group.
//!
//! A `#` at the position where a block would open is left to the token
//! recognizer, so a comment after `:` is produced before the block opens.

use std::cmp::Ordering;

use tracing::debug;

use crate::{frame::clamp_column, Frame, ScanError, TokenKind, TokenSet};

use super::{probe::Probe, Effect, Emit, Scanner};

impl Scanner {
    /// A layout token for the current position, or `None` to fall through
    /// to token recognition with leading whitespace skipped.
    pub(super) fn resolve_layout(
        &self,
        p: &mut Probe<'_>,
        requested: TokenSet,
    ) -> Result<Option<Emit>, ScanError> {
        if self.state.stack.top().is_indented() {
            self.layout_indented(p, requested)
        } else {
            self.layout_grouped(p, requested)
        }
    }

    fn layout_grouped(
        &self,
        p: &mut Probe<'_>,
        requested: TokenSet,
    ) -> Result<Option<Emit>, ScanError> {
        p.skip_horizontal_ws();
        if requested.contains(TokenKind::Newline) && p.at_newline() {
            while p.at_newline() {
                p.skip();
                p.skip_horizontal_ws();
            }
            return Ok(Some(Emit::plain(TokenKind::Newline)));
        }

        p.skip_all_ws();
        if requested.contains(TokenKind::StartBlock) && !p.at_eof() && !p.at(b'#') {
            return self.open_block(p);
        }
        Ok(None)
    }

    fn layout_indented(
        &self,
        p: &mut Probe<'_>,
        requested: TokenSet,
    ) -> Result<Option<Emit>, ScanError> {
        p.skip_horizontal_ws();
        let mut at_line_start = false;
        while p.at_newline() {
            at_line_start = true;
            p.skip();
            p.skip_horizontal_ws();
        }

        if p.at_eof() {
            return Ok(None);
        }

        if requested.contains(TokenKind::StartBlock) && !p.at(b'#') {
            if let Some(emit) = self.open_block(p)? {
                return Ok(Some(emit));
            }
        }

        if matches!(p.lookahead(), b')' | b']' | b',' | b'}') {
            if let Some(emit) = self.close_group(requested) {
                return Ok(Some(emit));
            }
        }

        if at_line_start {
            return Ok(self.line_start(p, requested));
        }
        Ok(None)
    }

    /// A block at the current column, which must be right of the innermost
    /// enclosing block's column.
    fn open_block(&self, p: &Probe<'_>) -> Result<Option<Emit>, ScanError> {
        let column = clamp_column(p.column());
        let enclosing = self.state.stack.block_column();
        if column <= enclosing {
            debug!(column, enclosing, "block not indented, not opened");
            return Ok(None);
        }
        self.check_push(p)?;
        Ok(Some(Emit::new(
            TokenKind::StartBlock,
            Effect::Push(Frame::Indented { column }),
        )))
    }

    /// Close the blocks opened inside the group a closing delimiter (or a
    /// comma) ends. With a separator requested all of them are queued
    /// behind it; otherwise the innermost one closes now.
    fn close_group(&self, requested: TokenSet) -> Option<Emit> {
        let run = self.state.stack.indented_run_length();
        if run == 0 {
            return None;
        }
        if requested.contains(TokenKind::Newline) {
            debug!(run, "closer forces block closes");
            return Some(Emit::new(
                TokenKind::Newline,
                Effect::QueueDedents(count_u8(run)),
            ));
        }
        if requested.contains(TokenKind::EndBlock) {
            return Some(Emit::new(
                TokenKind::EndBlock,
                Effect::CloseBlock { remaining: 0 },
            ));
        }
        None
    }

    /// First token of a new line inside an indented block.
    fn line_start(&self, p: &Probe<'_>, requested: TokenSet) -> Option<Emit> {
        let column = clamp_column(p.column());
        let block = self.state.stack.top().column();
        match column.cmp(&block) {
            Ordering::Less => {
                let count = self.state.stack.dedent_count(column).max(1);
                debug!(column, block, count, "dedent");
                if requested.contains(TokenKind::Newline) {
                    Some(Emit::new(
                        TokenKind::Newline,
                        Effect::QueueDedents(count_u8(count)),
                    ))
                } else if requested.contains(TokenKind::EndBlock)
                    && self.state.stack.top_is_closable_block()
                {
                    Some(Emit::new(
                        TokenKind::EndBlock,
                        Effect::CloseBlock {
                            remaining: count_u8(count - 1),
                        },
                    ))
                } else {
                    None
                }
            }
            Ordering::Equal => requested
                .contains(TokenKind::Newline)
                .then(|| Emit::plain(TokenKind::Newline)),
            Ordering::Greater => None,
        }
    }
}

/// Block counts are bounded by the stack depth.
#[inline]
fn count_u8(count: usize) -> u8 {
    u8::try_from(count).unwrap_or(u8::MAX)
}
