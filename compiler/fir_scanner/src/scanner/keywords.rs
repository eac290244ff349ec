//! Reserved-word lookup.
//!
//! Keywords are all lowercase ASCII, 2-8 bytes long. The identifier's length
//! is the first-pass filter; only keywords of that length are compared.
//! `Fn` (the function-type constructor) is the one uppercase reserved word
//! and is handled by [`upper_lookup`].
//!
//! A keyword is only a keyword when the caller requests it: the scanner
//! falls back to a plain identifier otherwise, so `type` or `row` can name
//! a field in positions where the grammar does not expect the keyword.

use crate::TokenKind;

/// Look up a lowercase reserved word.
#[inline]
pub(crate) fn lookup(text: &str) -> Option<TokenKind> {
    match text.len() {
        2 => match text {
            "as" => Some(TokenKind::KwAs),
            "do" => Some(TokenKind::KwDo),
            "fn" => Some(TokenKind::KwFn),
            "if" => Some(TokenKind::KwIf),
            "in" => Some(TokenKind::KwIn),
            "is" => Some(TokenKind::KwIs),
            "or" => Some(TokenKind::KwOr),
            _ => None,
        },
        3 => match text {
            "and" => Some(TokenKind::KwAnd),
            "for" => Some(TokenKind::KwFor),
            "let" => Some(TokenKind::KwLet),
            "not" => Some(TokenKind::KwNot),
            "row" => Some(TokenKind::KwRow),
            _ => None,
        },
        4 => match text {
            "elif" => Some(TokenKind::KwElif),
            "else" => Some(TokenKind::KwElse),
            "impl" => Some(TokenKind::KwImpl),
            "loop" => Some(TokenKind::KwLoop),
            "prim" => Some(TokenKind::KwPrim),
            "type" => Some(TokenKind::KwType),
            _ => None,
        },
        5 => match text {
            "break" => Some(TokenKind::KwBreak),
            "match" => Some(TokenKind::KwMatch),
            "trait" => Some(TokenKind::KwTrait),
            "value" => Some(TokenKind::KwValue),
            "while" => Some(TokenKind::KwWhile),
            _ => None,
        },
        6 => match text {
            "import" => Some(TokenKind::KwImport),
            "return" => Some(TokenKind::KwReturn),
            _ => None,
        },
        8 => match text {
            "continue" => Some(TokenKind::KwContinue),
            _ => None,
        },
        _ => None,
    }
}

/// Look up an uppercase reserved word.
#[inline]
pub(crate) fn upper_lookup(text: &str) -> Option<TokenKind> {
    (text == "Fn").then_some(TokenKind::KwUpperFn)
}
