//! Sets of requested token kinds.
//!
//! Every scan call takes a [`TokenSet`] naming the kinds the grammar can
//! accept at that point, and the scanner only ever produces one of them.
//! [`TokenKind`] has fewer than 128 variants, so a set is one `u128` and
//! all the builders are `const`: a parser can keep its follow sets in
//! constants.

use std::fmt;

use crate::TokenKind;

/// Bitset over [`TokenKind`], indexed by discriminant.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TokenSet(u128);

const fn bit(kind: TokenKind) -> u128 {
    1 << kind.index()
}

impl TokenSet {
    /// The empty set.
    #[inline]
    pub const fn new() -> Self {
        TokenSet(0)
    }

    /// Every kind.
    #[inline]
    pub const fn all() -> Self {
        TokenSet(u128::MAX >> (u128::BITS - TokenKind::COUNT as u32))
    }

    #[inline]
    pub const fn single(kind: TokenKind) -> Self {
        TokenSet(bit(kind))
    }

    #[inline]
    #[must_use]
    pub const fn with(self, kind: TokenKind) -> Self {
        TokenSet(self.0 | bit(kind))
    }

    #[inline]
    #[must_use]
    pub const fn without(self, kind: TokenKind) -> Self {
        TokenSet(self.0 & !bit(kind))
    }

    #[inline]
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        TokenSet(self.0 | other.0)
    }

    #[inline]
    pub const fn contains(&self, kind: TokenKind) -> bool {
        self.0 & bit(kind) != 0
    }

    #[inline]
    pub fn insert(&mut self, kind: TokenKind) {
        self.0 |= bit(kind);
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn count(&self) -> u32 {
        self.0.count_ones()
    }

    /// Kinds in the set, lowest discriminant first.
    pub fn iter(&self) -> TokenSetIterator {
        TokenSetIterator { bits: self.0 }
    }

    /// English list of the kinds for diagnostics, e.g.
    /// "`)`, `,`, or `}`". An empty set renders as "nothing".
    pub fn format_expected(&self) -> String {
        let total = self.count();
        let mut out = String::new();
        for (i, kind) in (1..).zip(self.iter()) {
            if i > 1 && total > 2 {
                out.push_str(", ");
            }
            if i > 1 && i == total {
                out.push_str(if total == 2 { " or " } else { "or " });
            }
            out.push('`');
            out.push_str(kind.name());
            out.push('`');
        }
        if out.is_empty() {
            out.push_str("nothing");
        }
        out
    }
}

impl fmt::Debug for TokenSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl FromIterator<TokenKind> for TokenSet {
    fn from_iter<I: IntoIterator<Item = TokenKind>>(iter: I) -> Self {
        iter.into_iter().fold(TokenSet::new(), TokenSet::with)
    }
}

impl IntoIterator for TokenSet {
    type Item = TokenKind;
    type IntoIter = TokenSetIterator;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the kinds in a [`TokenSet`].
pub struct TokenSetIterator {
    bits: u128,
}

impl Iterator for TokenSetIterator {
    type Item = TokenKind;

    fn next(&mut self) -> Option<TokenKind> {
        while self.bits != 0 {
            let index = u8::try_from(self.bits.trailing_zeros()).unwrap_or(u8::MAX);
            self.bits &= self.bits - 1;
            if let Some(kind) = TokenKind::from_index(index) {
                return Some(kind);
            }
        }
        None
    }
}
