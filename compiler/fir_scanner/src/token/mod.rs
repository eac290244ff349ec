//! Token kinds, spans and classified tokens.
//!
//! [`TokenKind`] is a fieldless `#[repr(u8)]` enum. Its discriminants are
//! dense (`0..TokenKind::COUNT`) so a requested-kinds set fits in one
//! `u128` (see [`TokenSet`](crate::TokenSet)). The order is part of the
//! grammar contract: the parser refers to kinds by index.

use std::fmt;

/// Generates [`TokenKind`] together with its name and lexeme tables so the
/// three can never drift apart.
macro_rules! token_kinds {
    (@lexeme) => {
        None
    };
    (@lexeme $lexeme:literal) => {
        Some($lexeme)
    };
    ($(
        $(#[$attr:meta])*
        $variant:ident => $name:literal $(, $lexeme:literal)?;
    )*) => {
        /// Every token kind the scanner can produce.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[repr(u8)]
        pub enum TokenKind {
            $(
                $(#[$attr])*
                $variant,
            )*
        }

        impl TokenKind {
            /// All kinds in discriminant order.
            pub const ALL: &'static [TokenKind] = &[$(TokenKind::$variant,)*];

            /// Human-readable name, used in diagnostics and tool output.
            pub const fn name(self) -> &'static str {
                match self {
                    $(TokenKind::$variant => $name,)*
                }
            }

            /// Fixed spelling, if this kind always has the same text.
            pub const fn lexeme(self) -> Option<&'static str> {
                match self {
                    $(TokenKind::$variant => token_kinds!(@lexeme $($lexeme)?),)*
                }
            }
        }
    };
}

token_kinds! {
    // === Layout (0-2) ===
    /// Opens an indented block. Emitted after `:` is consumed.
    StartBlock => "block open";
    /// Closes an indented block.
    EndBlock => "block close";
    /// Statement separator.
    Newline => "newline";

    // === Identifiers (3-5) ===
    /// `_*[A-Z][A-Za-z0-9_]*`
    UpperId => "upper-case identifier";
    /// `_*[a-z][A-Za-z0-9_]*`
    LowerId => "lower-case identifier";
    /// `'name` (no closing quote), used for loop labels.
    Label => "label";

    // === Literals (6-7) ===
    IntLiteral => "integer literal";
    CharLiteral => "character literal";

    // === Strings (8-12) ===
    BeginStr => "string start", "\"";
    EndStr => "string end", "\"";
    StringContent => "string content";
    BeginInterpolation => "interpolation start", "`";
    EndInterpolation => "interpolation end", "`";

    // === Comments (13-14) ===
    BlockComment => "block comment";
    LineComment => "line comment";

    // === Delimiters (15-21) ===
    LParen => "(", "(";
    RParen => ")", ")";
    LBracket => "[", "[";
    RBracket => "]", "]";
    LBrace => "{", "{";
    RBrace => "}", "}";
    /// `\(`, the lambda-introducing open parenthesis.
    BackslashLParen => "\\(", "\\(";

    // === Punctuation (22-29) ===
    Colon => ":", ":";
    Comma => ",", ",";
    Dot => ".", ".";
    DotDot => "..", "..";
    Eq => "=", "=";
    /// A run of underscores not followed by a letter.
    Underscore => "_";
    Slash => "/", "/";
    Semicolon => ";", ";";

    // === Operators (30-51) ===
    Plus => "+", "+";
    Minus => "-", "-";
    Star => "*", "*";
    EqEq => "==", "==";
    Neq => "!=", "!=";
    Lt => "<", "<";
    Gt => ">", ">";
    LtEq => "<=", "<=";
    GtEq => ">=", ">=";
    LShift => "<<", "<<";
    RShift => ">>", ">>";
    Amp => "&", "&";
    AmpAmp => "&&", "&&";
    Pipe => "|", "|";
    Tilde => "~", "~";
    Exclamation => "!", "!";
    Percent => "%", "%";
    Caret => "^", "^";
    PlusEq => "+=", "+=";
    MinusEq => "-=", "-=";
    StarEq => "*=", "*=";
    CaretEq => "^=", "^=";

    // === Keywords (52-78) ===
    KwAnd => "and", "and";
    KwAs => "as", "as";
    KwBreak => "break", "break";
    KwContinue => "continue", "continue";
    KwDo => "do", "do";
    KwElif => "elif", "elif";
    KwElse => "else", "else";
    KwFn => "fn", "fn";
    /// `Fn`, the function-type marker.
    KwUpperFn => "Fn", "Fn";
    KwFor => "for", "for";
    KwIf => "if", "if";
    KwImpl => "impl", "impl";
    KwImport => "import", "import";
    KwIn => "in", "in";
    KwIs => "is", "is";
    KwLet => "let", "let";
    KwLoop => "loop", "loop";
    KwMatch => "match", "match";
    KwNot => "not", "not";
    KwOr => "or", "or";
    KwPrim => "prim", "prim";
    KwReturn => "return", "return";
    KwTrait => "trait", "trait";
    KwType => "type", "type";
    KwValue => "value", "value";
    KwWhile => "while", "while";
    /// `row` is reserved so that `row[` splits into keyword and bracket.
    KwRow => "row", "row";
}

impl TokenKind {
    /// Number of token kinds.
    #[allow(
        clippy::cast_possible_truncation,
        reason = "ALL has fewer than 128 entries, checked below"
    )]
    pub const COUNT: u8 = Self::ALL.len() as u8;

    /// Dense index of this kind, `0..COUNT`.
    #[inline]
    pub const fn index(self) -> u8 {
        self as u8
    }

    /// Inverse of [`index`](Self::index).
    pub fn from_index(index: u8) -> Option<TokenKind> {
        Self::ALL.get(usize::from(index)).copied()
    }

    /// Synthetic layout tokens are zero-width and derived from whitespace.
    pub const fn is_layout(self) -> bool {
        matches!(
            self,
            TokenKind::StartBlock | TokenKind::EndBlock | TokenKind::Newline
        )
    }

    /// Comments are extras: the parser accepts them anywhere.
    pub const fn is_comment(self) -> bool {
        matches!(self, TokenKind::LineComment | TokenKind::BlockComment)
    }
}

const _: () = assert!(TokenKind::ALL.len() <= 128, "TokenSet is a u128 bitset");

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Source location span: half-open byte range `start..end`.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    /// Create a new span.
    #[inline]
    pub const fn new(start: u32, end: u32) -> Self {
        Span { start, end }
    }

    /// Zero-width span at `pos`.
    #[inline]
    pub const fn point(pos: u32) -> Self {
        Span {
            start: pos,
            end: pos,
        }
    }

    /// Length in bytes.
    #[inline]
    pub const fn len(&self) -> u32 {
        self.end - self.start
    }

    /// Returns `true` for zero-width spans.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// One classified token: kind plus consumed span.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    #[inline]
    pub const fn new(kind: TokenKind, span: Span) -> Self {
        Token { kind, span }
    }
}
