//! Demand-driven, layout-aware scanner.
//!
//! The parser calls [`Scanner::scan`] with the set of token kinds it can
//! accept at the current position. The scanner produces one token of a
//! requested kind, or fails without consuming input or changing state.
//!
//! # Step Order
//!
//! Every call tries, in order:
//!
//! 1. **Pending block closes.** A dedent that closes several blocks
//!    announces itself with one separator and queues the rest; queued
//!    closes drain one per call.
//! 2. **String mode.** Between a string's quotes only literal content, the
//!    closing quote and an interpolation opener are recognized
//!    (see [`string`]).
//! 3. **Layout.** Whitespace and newlines are resolved against the frame
//!    stack into block opens, separators and block closes
//!    (see [`layout`]).
//! 4. **Tokens.** Comments, literals, identifiers, delimiters and
//!    operators (see [`recognize`]).
//!
//! # Transactions
//!
//! A scan runs on a [`Probe`] (a copy of the caller's cursor) and returns
//! the token kind together with an [`Effect`] describing the state change.
//! Only a successful scan applies the effect and writes the cursor back.

mod keywords;
mod layout;
mod probe;
mod recognize;
mod string;

use tracing::{debug, trace};

use crate::{
    Cursor, Frame, FrameStack, OverflowPolicy, ScanError, ScannerConfig, ScannerState,
    StateError, Token, TokenKind, TokenSet, MAX_DEPTH,
};

use probe::Probe;

/// State change applied when a token is committed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Effect {
    None,
    Push(Frame),
    Pop,
    /// Separator announcing a dedent or a forced close: queue block closes.
    QueueDedents(u8),
    /// Close the innermost block now, leaving `remaining` queued.
    CloseBlock { remaining: u8 },
    /// Close the innermost block from the queue.
    DrainDedent,
    EnterString,
    LeaveString,
    OpenInterpolation,
    /// Back into string literal mode, popping the interpolation frame if
    /// it is on top.
    CloseInterpolation { pop: bool },
    EofSeparator,
}

/// A recognized token kind and its effect.
#[derive(Clone, Copy, Debug)]
struct Emit {
    kind: TokenKind,
    effect: Effect,
}

impl Emit {
    #[inline]
    fn new(kind: TokenKind, effect: Effect) -> Self {
        Emit { kind, effect }
    }

    #[inline]
    fn plain(kind: TokenKind) -> Self {
        Emit::new(kind, Effect::None)
    }
}

/// The external scanner.
///
/// Holds the frame stack and flags that make up [`ScannerState`], plus the
/// construction-time [`ScannerConfig`].
#[derive(Clone, Debug, Default)]
pub struct Scanner {
    state: ScannerState,
    config: ScannerConfig,
}

impl Scanner {
    /// A scanner in the initial state with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ScannerConfig) -> Self {
        Scanner {
            state: ScannerState::new(),
            config,
        }
    }

    /// Return to the initial state. Configuration is kept.
    pub fn reset(&mut self) {
        self.state = ScannerState::new();
    }

    // === Accessors ===

    pub fn config(&self) -> ScannerConfig {
        self.config
    }

    pub fn state(&self) -> &ScannerState {
        &self.state
    }

    /// Number of open frames, root included.
    pub fn depth(&self) -> usize {
        self.state.stack.depth()
    }

    /// Open frames, bottom first.
    pub fn frames(&self) -> &[Frame] {
        self.state.stack.as_slice()
    }

    pub fn top_frame(&self) -> Frame {
        self.state.stack.top()
    }

    pub fn pending_dedents(&self) -> u8 {
        self.state.pending_dedents
    }

    pub fn in_string(&self) -> bool {
        self.state.in_string
    }

    pub fn eof_separator_emitted(&self) -> bool {
        self.state.eof_separator_emitted
    }

    // === Scanning ===

    /// Produce the next token of a kind in `requested`.
    ///
    /// On success `cursor` is moved to the end of the token. Layout tokens
    /// are zero-width and leave it after any whitespace they absorbed.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError`] when no requested kind matches or when a
    /// delimiter would break the nesting rules. On error neither `cursor`
    /// nor the scanner state has changed.
    pub fn scan(
        &mut self,
        cursor: &mut Cursor<'_>,
        requested: TokenSet,
    ) -> Result<Token, ScanError> {
        let mut probe = Probe::new(*cursor);
        let emit = match self.dispatch(&mut probe, requested) {
            Ok(emit) => emit,
            Err(err) => {
                trace!(pos = err.pos(), %err, "scan failed");
                return Err(err);
            }
        };
        debug_assert!(
            requested.contains(emit.kind),
            "scanner produced unrequested {:?}",
            emit.kind
        );

        let (token, end) = probe.finish(emit.kind);
        self.commit(emit.effect);
        *cursor = end;
        trace!(
            kind = emit.kind.name(),
            span_start = token.span.start,
            span_end = token.span.end,
            depth = self.depth(),
            pending = self.state.pending_dedents,
            "scan"
        );
        Ok(token)
    }

    fn dispatch(&self, p: &mut Probe<'_>, requested: TokenSet) -> Result<Emit, ScanError> {
        if self.state.pending_dedents > 0
            && requested.contains(TokenKind::EndBlock)
            && self.state.stack.top_is_closable_block()
        {
            return Ok(Emit::new(TokenKind::EndBlock, Effect::DrainDedent));
        }

        if self.state.in_string {
            return self.scan_string(p, requested);
        }

        if let Some(emit) = self.resolve_layout(p, requested)? {
            return Ok(emit);
        }

        self.recognize(p, requested)
    }

    /// Fail a push that would overflow the stack under
    /// [`OverflowPolicy::Reject`].
    fn check_push(&self, p: &Probe<'_>) -> Result<(), ScanError> {
        if self.state.stack.is_full() && self.config.overflow == OverflowPolicy::Reject {
            return Err(ScanError::NestingTooDeep {
                pos: p.origin(),
                limit: MAX_DEPTH,
            });
        }
        Ok(())
    }

    /// Separator and block closes at end of input: one separator, then one
    /// close per call until only the root remains.
    fn end_of_input(&self, requested: TokenSet) -> Option<Emit> {
        if requested.contains(TokenKind::Newline) && !self.state.eof_separator_emitted {
            return Some(Emit::new(TokenKind::Newline, Effect::EofSeparator));
        }
        if requested.contains(TokenKind::EndBlock) && self.state.stack.top_is_closable_block() {
            return Some(Emit::new(
                TokenKind::EndBlock,
                Effect::CloseBlock { remaining: 0 },
            ));
        }
        None
    }

    /// Apply a committed token's effect. Every token other than the
    /// block-close bookkeeping ones discards queued closes.
    fn commit(&mut self, effect: Effect) {
        let state = &mut self.state;
        let mut pending = 0;
        match effect {
            Effect::None => {}
            Effect::Push(frame) => push_frame(&mut state.stack, frame),
            Effect::Pop => {
                state.stack.pop();
            }
            Effect::QueueDedents(count) => pending = count,
            Effect::CloseBlock { remaining } => {
                state.stack.pop();
                pending = remaining;
            }
            Effect::DrainDedent => {
                state.stack.pop();
                pending = state.pending_dedents.saturating_sub(1);
            }
            Effect::EnterString => state.in_string = true,
            Effect::LeaveString => state.in_string = false,
            Effect::OpenInterpolation => {
                state.in_string = false;
                push_frame(&mut state.stack, Frame::Interpolation);
            }
            Effect::CloseInterpolation { pop } => {
                if pop {
                    state.stack.pop();
                }
                state.in_string = true;
            }
            Effect::EofSeparator => state.eof_separator_emitted = true,
        }
        state.pending_dedents = pending;
    }

    // === Persistence ===

    /// Encode the state into `buf`, returning the number of bytes written.
    ///
    /// # Errors
    ///
    /// [`StateError::BufferTooSmall`] if `buf` is shorter than the encoding.
    /// A buffer of [`SERIALIZATION_BUFFER_SIZE`](crate::SERIALIZATION_BUFFER_SIZE)
    /// bytes always suffices.
    pub fn serialize(&self, buf: &mut [u8]) -> Result<usize, StateError> {
        self.state.encode(buf)
    }

    /// Restore state written by [`serialize`](Self::serialize). An empty
    /// buffer restores the initial state.
    ///
    /// # Errors
    ///
    /// Returns [`StateError`] for malformed input; the scanner is left
    /// unchanged.
    pub fn deserialize(&mut self, buf: &[u8]) -> Result<(), StateError> {
        self.state = ScannerState::decode(buf)?;
        debug!(
            depth = self.depth(),
            pending = self.state.pending_dedents,
            in_string = self.state.in_string,
            "state restored"
        );
        Ok(())
    }

    /// The encoded state as an owned buffer.
    pub fn snapshot(&self) -> Vec<u8> {
        let mut buf = vec![0; self.state.encoded_len()];
        let written = self.state.encode(&mut buf).unwrap_or(0);
        buf.truncate(written);
        buf
    }
}

/// Push, dropping the frame when the stack is full. Only reachable under
/// [`OverflowPolicy::Truncate`]; `Reject` fails the scan before commit.
fn push_frame(stack: &mut FrameStack, frame: Frame) {
    if stack.push(frame).is_err() {
        debug!(?frame, limit = MAX_DEPTH, "frame stack full, push dropped");
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap/expect for clarity"
)]
mod tests;
