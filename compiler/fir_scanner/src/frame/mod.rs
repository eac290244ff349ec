//! Nesting-context stack.
//!
//! Every open indented block, parenthesized group, bracketed group and
//! string interpolation span is one [`Frame`]. The stack is a fixed-capacity
//! array: the bottom entry is always `Indented { column: 0 }` and is never
//! popped, and depth never exceeds [`MAX_DEPTH`].

/// Maximum nesting depth, root frame included.
pub const MAX_DEPTH: usize = 128;

/// Kind tag of a [`Frame`]. The discriminants are the serialized tags.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FrameKind {
    Indented = 0,
    Paren = 1,
    Bracket = 2,
    Interpolation = 3,
}

impl FrameKind {
    /// Decode a serialized tag.
    pub fn from_tag(tag: u8) -> Option<FrameKind> {
        match tag {
            0 => Some(FrameKind::Indented),
            1 => Some(FrameKind::Paren),
            2 => Some(FrameKind::Bracket),
            3 => Some(FrameKind::Interpolation),
            _ => None,
        }
    }

    /// Serialized tag.
    #[inline]
    pub const fn tag(self) -> u8 {
        self as u8
    }
}

/// One nesting context.
///
/// Only `Indented` carries a column: the column at which the block's
/// statements begin. Brace groups are `Indented` frames at column 0.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Frame {
    Indented { column: u16 },
    Paren,
    Bracket,
    Interpolation,
}

impl Frame {
    /// The bottom frame of every stack.
    pub const ROOT: Frame = Frame::Indented { column: 0 };

    /// An indented block starting at `column`, saturating at `u16::MAX`.
    pub fn indented(column: u32) -> Frame {
        Frame::Indented {
            column: clamp_column(column),
        }
    }

    /// Build a frame from its parts. The column is ignored for
    /// non-`Indented` kinds.
    pub fn from_parts(kind: FrameKind, column: u16) -> Frame {
        match kind {
            FrameKind::Indented => Frame::Indented { column },
            FrameKind::Paren => Frame::Paren,
            FrameKind::Bracket => Frame::Bracket,
            FrameKind::Interpolation => Frame::Interpolation,
        }
    }

    #[inline]
    pub fn kind(self) -> FrameKind {
        match self {
            Frame::Indented { .. } => FrameKind::Indented,
            Frame::Paren => FrameKind::Paren,
            Frame::Bracket => FrameKind::Bracket,
            Frame::Interpolation => FrameKind::Interpolation,
        }
    }

    /// Block column; 0 for frames that carry none.
    #[inline]
    pub fn column(self) -> u16 {
        match self {
            Frame::Indented { column } => column,
            Frame::Paren | Frame::Bracket | Frame::Interpolation => 0,
        }
    }

    #[inline]
    pub fn is_indented(self) -> bool {
        matches!(self, Frame::Indented { .. })
    }
}

/// Convert a cursor column to the stored width.
#[inline]
pub fn clamp_column(column: u32) -> u16 {
    u16::try_from(column).unwrap_or(u16::MAX)
}

/// A push was attempted on a full stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StackFull;

/// Fixed-capacity stack of [`Frame`]s.
#[derive(Clone)]
pub struct FrameStack {
    frames: [Frame; MAX_DEPTH],
    /// Always in `1..=MAX_DEPTH`.
    depth: usize,
}

impl FrameStack {
    /// A stack holding only the root frame.
    pub fn new() -> Self {
        Self {
            frames: [Frame::ROOT; MAX_DEPTH],
            depth: 1,
        }
    }

    /// Rebuild a stack from frames listed bottom first.
    ///
    /// Returns `None` unless `frames` is non-empty, fits in [`MAX_DEPTH`],
    /// and starts with [`Frame::ROOT`].
    pub fn from_frames(frames: &[Frame]) -> Option<Self> {
        if frames.is_empty() || frames.len() > MAX_DEPTH || frames[0] != Frame::ROOT {
            return None;
        }
        let mut stack = Self::new();
        stack.frames[..frames.len()].copy_from_slice(frames);
        stack.depth = frames.len();
        Some(stack)
    }

    /// Number of frames, root included. Always at least 1.
    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.depth == MAX_DEPTH
    }

    /// The innermost frame.
    #[inline]
    pub fn top(&self) -> Frame {
        self.frames[self.depth - 1]
    }

    /// Frames bottom first.
    #[inline]
    pub fn as_slice(&self) -> &[Frame] {
        &self.frames[..self.depth]
    }

    /// Push a frame. Fails without changing the stack when full.
    pub fn push(&mut self, frame: Frame) -> Result<(), StackFull> {
        if self.is_full() {
            return Err(StackFull);
        }
        self.frames[self.depth] = frame;
        self.depth += 1;
        Ok(())
    }

    /// Pop the innermost frame. The root is never popped.
    pub fn pop(&mut self) -> Option<Frame> {
        if self.depth > 1 {
            self.depth -= 1;
            Some(self.frames[self.depth])
        } else {
            None
        }
    }

    /// Whether the top frame is an `Indented` frame other than the root.
    #[inline]
    pub fn top_is_closable_block(&self) -> bool {
        self.depth > 1 && self.top().is_indented()
    }

    /// Consecutive indented blocks from the top, stopping at the first
    /// delimiter, interpolation or column-0 frame. Column-0 frames are the
    /// root and brace groups; neither is counted.
    pub fn indented_run_length(&self) -> usize {
        self.frames[1..self.depth]
            .iter()
            .rev()
            .take_while(|f| matches!(f, Frame::Indented { column } if *column > 0))
            .count()
    }

    /// Column of the innermost `Indented` frame, looking through
    /// delimiters and interpolations. Brace groups and the root give 0.
    pub fn block_column(&self) -> u16 {
        self.as_slice()
            .iter()
            .rev()
            .find_map(|f| match f {
                Frame::Indented { column } => Some(*column),
                _ => None,
            })
            .unwrap_or(0)
    }

    /// Whether the top frame is a brace group.
    #[inline]
    pub fn top_is_brace(&self) -> bool {
        self.depth > 1 && self.top() == Frame::Indented { column: 0 }
    }

    /// Number of blocks closed by a line starting at `column`: consecutive
    /// `Indented` frames from the top whose column exceeds it. The root is
    /// never counted.
    pub fn dedent_count(&self, column: u16) -> usize {
        self.frames[1..self.depth]
            .iter()
            .rev()
            .take_while(|f| matches!(f, Frame::Indented { column: c } if *c > column))
            .count()
    }

    /// Drop everything but the root frame.
    pub fn reset(&mut self) {
        self.depth = 1;
        self.frames[0] = Frame::ROOT;
    }
}

impl Default for FrameStack {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for FrameStack {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl Eq for FrameStack {}

impl std::fmt::Debug for FrameStack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap/expect for clarity"
)]
