use pretty_assertions::assert_eq;
use proptest::prelude::*;

use super::*;
use crate::{DelimiterPolicy, Driver, FrameKind, PermissivePolicy, SourceBuffer, Span};

use TokenKind::*;

// === Helpers ===

/// Lex `src` with the permissive policy, returning kinds and texts.
fn lex(src: &str) -> Vec<(TokenKind, String)> {
    let buf = SourceBuffer::new(src);
    let cursor = buf.cursor();
    Driver::new(Scanner::new(), cursor, PermissivePolicy::new())
        .map(|tok| {
            let tok = tok.expect("source lexes");
            (tok.kind, cursor.slice(tok.span.start, tok.span.end).to_owned())
        })
        .collect()
}

fn kinds(src: &str) -> Vec<TokenKind> {
    lex(src).into_iter().map(|(kind, _)| kind).collect()
}

fn set(kinds: &[TokenKind]) -> TokenSet {
    kinds.iter().copied().collect()
}

/// Everything but a block open, which would otherwise win at any position.
fn anything() -> TokenSet {
    TokenSet::all().without(StartBlock)
}

/// Scan one token from the start of `src` with a fresh scanner.
fn scan_one(src: &str, requested: TokenSet) -> Result<(TokenKind, String), ScanError> {
    let buf = SourceBuffer::new(src);
    let mut cursor = buf.cursor();
    let tok = Scanner::new().scan(&mut cursor, requested)?;
    Ok((tok.kind, cursor.slice(tok.span.start, tok.span.end).to_owned()))
}

// === Layout ===

#[test]
fn block_after_colon() {
    assert_eq!(
        kinds("f(x):\n  y\n"),
        vec![LowerId, LParen, LowerId, RParen, Colon, StartBlock, LowerId, Newline, EndBlock]
    );
}

#[test]
fn layout_tokens_are_zero_width() {
    let buf = SourceBuffer::new("f(x):\n  y\n");
    let tokens: Vec<Token> = Driver::new(Scanner::new(), buf.cursor(), PermissivePolicy::new())
        .collect::<Result<_, _>>()
        .expect("lexes");
    for tok in tokens.iter().filter(|t| t.kind.is_layout()) {
        assert!(tok.span.is_empty(), "{tok:?}");
    }
    let block_open = tokens.iter().find(|t| t.kind == StartBlock).expect("block");
    assert_eq!(block_open.span, Span::point(8));
}

#[test]
fn statements_at_block_column_are_separated() {
    assert_eq!(
        kinds("f():\n  a\n  b\n"),
        vec![
            LowerId, LParen, RParen, Colon, StartBlock, LowerId, Newline, LowerId, Newline,
            EndBlock
        ]
    );
}

#[test]
fn deeper_line_continues_statement() {
    assert_eq!(
        kinds("x = a +\n    b\n"),
        vec![LowerId, Eq, LowerId, Plus, LowerId, Newline]
    );
}

#[test]
fn dedent_closes_every_deeper_block() {
    assert_eq!(
        kinds("a:\n  b:\n    c\nd\n"),
        vec![
            LowerId, Colon, StartBlock, LowerId, Colon, StartBlock, LowerId, Newline, EndBlock,
            EndBlock, LowerId, Newline
        ]
    );
}

#[test]
fn dedent_between_block_columns() {
    assert_eq!(
        kinds("a:\n    b:\n        c\n  d\n"),
        vec![
            LowerId, Colon, StartBlock, LowerId, Colon, StartBlock, LowerId, Newline, EndBlock,
            EndBlock, LowerId, Newline
        ]
    );
}

#[test]
fn end_of_input_closes_open_blocks() {
    assert_eq!(
        kinds("a:\n  b:\n    c"),
        vec![
            LowerId, Colon, StartBlock, LowerId, Colon, StartBlock, LowerId, Newline, EndBlock,
            EndBlock
        ]
    );
}

#[test]
fn blank_lines_are_absorbed() {
    assert_eq!(
        kinds("f():\n  a\n\n   \n  b\n"),
        vec![
            LowerId, LParen, RParen, Colon, StartBlock, LowerId, Newline, LowerId, Newline,
            EndBlock
        ]
    );
}

#[test]
fn crlf_line_breaks() {
    assert_eq!(kinds("f():\r\n  a\r\n  b\r\n"), kinds("f():\n  a\n  b\n"));
}

#[test]
fn newlines_inside_parens_are_insignificant() {
    assert_eq!(
        kinds("f(a,\n  b)\n"),
        vec![LowerId, LParen, LowerId, Comma, LowerId, RParen, Newline]
    );
}

#[test]
fn separator_inside_parens_only_when_requested() {
    let buf = SourceBuffer::new("(\n  x)");
    let mut cursor = buf.cursor();
    let mut scanner = Scanner::new();
    scanner
        .scan(&mut cursor, TokenSet::single(LParen))
        .expect("paren");

    let tok = scanner
        .scan(&mut cursor, TokenSet::single(Newline))
        .expect("requested separator");
    assert_eq!(tok, Token::new(Newline, Span::point(4)));
    assert_eq!(cursor.pos(), 4);
    assert_eq!(scanner.top_frame(), Frame::Paren);
}

#[test]
fn block_inside_parens_starts_at_next_token() {
    assert_eq!(
        kinds("f(g():\n    a)\n"),
        vec![
            LowerId, LParen, LowerId, LParen, RParen, Colon, StartBlock, LowerId, Newline,
            EndBlock, RParen, Newline
        ]
    );
}

#[test]
fn closing_delimiter_closes_inner_blocks() {
    let buf = SourceBuffer::new("(a:\n    b:\n      c)");
    let mut cursor = buf.cursor();
    let mut scanner = Scanner::new();
    let mut next = |requested: TokenSet| scanner.scan(&mut cursor, requested).map(|t| t.kind);

    assert_eq!(next(set(&[LParen])), Ok(LParen));
    assert_eq!(next(set(&[LowerId])), Ok(LowerId));
    assert_eq!(next(set(&[Colon])), Ok(Colon));
    assert_eq!(next(set(&[StartBlock])), Ok(StartBlock));
    assert_eq!(next(set(&[LowerId])), Ok(LowerId));
    assert_eq!(next(set(&[Colon])), Ok(Colon));
    assert_eq!(next(set(&[StartBlock])), Ok(StartBlock));
    assert_eq!(next(set(&[LowerId])), Ok(LowerId));
    // Two blocks above the paren: one separator, then both closes.
    assert_eq!(next(set(&[Newline, EndBlock, RParen])), Ok(Newline));
    assert_eq!(next(set(&[EndBlock, RParen])), Ok(EndBlock));
    assert_eq!(next(set(&[EndBlock, RParen])), Ok(EndBlock));
    assert_eq!(next(set(&[EndBlock, RParen])), Ok(RParen));
    assert_eq!(scanner.frames(), &[Frame::ROOT]);
}

#[test]
fn forced_close_without_separator() {
    let buf = SourceBuffer::new("[\n  a:\n    b]");
    let mut cursor = buf.cursor();
    let mut scanner = Scanner::new();
    for requested in [
        set(&[LBracket]),
        set(&[LowerId]),
        set(&[Colon]),
        set(&[StartBlock]),
        set(&[LowerId]),
    ] {
        scanner.scan(&mut cursor, requested).expect("prefix");
    }
    let tok = scanner
        .scan(&mut cursor, set(&[EndBlock, RBracket]))
        .expect("forced close");
    assert_eq!(tok.kind, EndBlock);
    assert_eq!(scanner.pending_dedents(), 0);
    assert_eq!(scanner.top_frame(), Frame::Bracket);
}

#[test]
fn dedent_with_only_block_close_requested() {
    let buf = SourceBuffer::new("a:\n  b:\n    c\nd");
    let mut cursor = buf.cursor();
    let mut scanner = Scanner::new();
    for requested in [
        set(&[LowerId]),
        set(&[Colon]),
        set(&[StartBlock]),
        set(&[LowerId]),
        set(&[Colon]),
        set(&[StartBlock]),
        set(&[LowerId]),
    ] {
        scanner.scan(&mut cursor, requested).expect("prefix");
    }
    let close = set(&[EndBlock, LowerId]);
    assert_eq!(scanner.scan(&mut cursor, close).map(|t| t.kind), Ok(EndBlock));
    assert_eq!(scanner.pending_dedents(), 1);
    assert_eq!(scanner.scan(&mut cursor, close).map(|t| t.kind), Ok(EndBlock));
    assert_eq!(scanner.pending_dedents(), 0);
    assert_eq!(scanner.scan(&mut cursor, close).map(|t| t.kind), Ok(LowerId));
}

#[test]
fn queued_closes_are_dropped_by_other_tokens() {
    let buf = SourceBuffer::new("a:\n  b:\n    c\nd");
    let mut cursor = buf.cursor();
    let mut scanner = Scanner::new();
    for requested in [
        set(&[LowerId]),
        set(&[Colon]),
        set(&[StartBlock]),
        set(&[LowerId]),
        set(&[Colon]),
        set(&[StartBlock]),
        set(&[LowerId]),
        set(&[Newline]),
    ] {
        scanner.scan(&mut cursor, requested).expect("prefix");
    }
    assert_eq!(scanner.pending_dedents(), 2);
    scanner
        .scan(&mut cursor, set(&[LowerId]))
        .expect("identifier");
    assert_eq!(scanner.pending_dedents(), 0);
}

#[test]
fn brace_group_is_not_closed_by_comma() {
    assert_eq!(
        kinds("{a, b}\n"),
        vec![LBrace, LowerId, Comma, LowerId, RBrace, Newline]
    );
}

#[test]
fn brace_closes_blocks_opened_inside_it() {
    assert_eq!(
        kinds("{f():\n    a}\n"),
        vec![
            LBrace, LowerId, LParen, RParen, Colon, StartBlock, LowerId, Newline, EndBlock,
            RBrace, Newline
        ]
    );
}

#[test]
fn block_at_brace_column_is_not_opened() {
    let buf = SourceBuffer::new("{a:\nb}");
    let mut cursor = buf.cursor();
    let mut scanner = Scanner::new();
    let mut next = |requested: TokenSet| scanner.scan(&mut cursor, requested).map(|t| t.kind);

    assert_eq!(next(set(&[LBrace])), Ok(LBrace));
    assert_eq!(next(set(&[LowerId])), Ok(LowerId));
    assert_eq!(next(set(&[Colon])), Ok(Colon));
    assert!(matches!(
        next(set(&[StartBlock])),
        Err(ScanError::NoMatch { pos: 3, .. })
    ));
    assert_eq!(next(set(&[Newline, StartBlock])), Ok(Newline));
    assert_eq!(next(set(&[LowerId])), Ok(LowerId));
    assert_eq!(next(set(&[RBrace])), Ok(RBrace));
    assert_eq!(scanner.frames(), &[Frame::ROOT]);
}

#[test]
fn block_at_enclosing_column_is_not_opened() {
    let cases: [(&str, &[TokenKind], u32); 3] = [
        ("(a:\nb)", &[LParen, LowerId, Colon], 3),
        ("a:\n  b:\n  c", &[LowerId, Colon, StartBlock, LowerId, Colon], 7),
        ("a:\n  b:\n c", &[LowerId, Colon, StartBlock, LowerId, Colon], 7),
    ];
    for (src, prefix, colon_end) in cases {
        let buf = SourceBuffer::new(src);
        let mut cursor = buf.cursor();
        let mut scanner = Scanner::new();
        for &kind in prefix {
            scanner.scan(&mut cursor, set(&[kind])).expect("prefix");
        }
        let before = scanner.state().clone();
        assert!(
            matches!(
                scanner.scan(&mut cursor, set(&[StartBlock])),
                Err(ScanError::NoMatch { pos, .. }) if pos == colon_end
            ),
            "source {src:?}"
        );
        assert_eq!(scanner.state(), &before, "source {src:?}");
    }
}

#[test]
fn inline_block_body_opens_at_current_column() {
    let buf = SourceBuffer::new("if x: y\nz");
    let mut cursor = buf.cursor();
    let mut scanner = Scanner::new();
    for requested in [set(&[KwIf]), set(&[LowerId]), set(&[Colon])] {
        scanner.scan(&mut cursor, requested).expect("prefix");
    }
    assert_eq!(
        scanner.scan(&mut cursor, set(&[StartBlock])),
        Ok(Token::new(StartBlock, Span::point(6)))
    );
    assert_eq!(scanner.frames(), &[Frame::ROOT, Frame::Indented { column: 6 }]);

    let mut next = |requested: TokenSet| scanner.scan(&mut cursor, requested).map(|t| t.kind);
    assert_eq!(next(set(&[LowerId])), Ok(LowerId));
    let line_end = set(&[Newline, EndBlock, LowerId]);
    assert_eq!(next(line_end), Ok(Newline));
    assert_eq!(next(line_end), Ok(EndBlock));
    assert_eq!(next(line_end), Ok(LowerId));
    assert_eq!(scanner.frames(), &[Frame::ROOT]);
}

#[test]
fn end_of_input_separator_is_emitted_once() {
    let buf = SourceBuffer::new("x");
    let mut cursor = buf.cursor();
    let mut scanner = Scanner::new();
    scanner.scan(&mut cursor, set(&[LowerId])).expect("x");
    let tok = scanner.scan(&mut cursor, set(&[Newline])).expect("eof separator");
    assert_eq!(tok, Token::new(Newline, Span::point(1)));
    assert!(scanner.eof_separator_emitted());
    assert!(matches!(
        scanner.scan(&mut cursor, set(&[Newline])),
        Err(ScanError::NoMatch { pos: 1, .. })
    ));
}

// === Comments ===

#[test]
fn comment_after_colon_precedes_block() {
    assert_eq!(
        lex("f():  # note\n    x\n"),
        vec![
            (LowerId, "f".to_owned()),
            (LParen, "(".to_owned()),
            (RParen, ")".to_owned()),
            (Colon, ":".to_owned()),
            (LineComment, "# note".to_owned()),
            (StartBlock, String::new()),
            (LowerId, "x".to_owned()),
            (Newline, String::new()),
            (EndBlock, String::new()),
        ]
    );
}

#[test]
fn block_comments_nest() {
    let src = "#| outer #| inner |# still outer |#";
    assert_eq!(
        scan_one(src, anything()),
        Ok((BlockComment, src.to_owned()))
    );
}

#[test]
fn unterminated_block_comment_runs_to_end() {
    let src = "#| open #| closed |# x";
    assert_eq!(
        scan_one(src, set(&[BlockComment])),
        Ok((BlockComment, src.to_owned()))
    );
}

#[test]
fn comment_kinds_are_only_produced_when_requested() {
    assert!(scan_one("# hi", set(&[BlockComment])).is_err());
    assert!(scan_one("#| hi |#", set(&[LineComment])).is_err());
}

// === Quotes ===

#[test]
fn char_literal_and_label() {
    let both = set(&[Label, CharLiteral]);
    assert_eq!(scan_one("'a'", both), Ok((CharLiteral, "'a'".to_owned())));
    assert_eq!(scan_one("'abc", both), Ok((Label, "'abc".to_owned())));
    assert_eq!(scan_one("'a x", both), Ok((Label, "'a".to_owned())));
    assert_eq!(scan_one("'ab'", both), Ok((Label, "'ab".to_owned())));
}

#[test]
fn label_wins_when_char_is_not_requested() {
    assert_eq!(scan_one("'a'", set(&[Label])), Ok((Label, "'a".to_owned())));
}

#[test]
fn char_literal_forms() {
    let chars = set(&[CharLiteral]);
    assert_eq!(scan_one("'A'", chars), Ok((CharLiteral, "'A'".to_owned())));
    assert_eq!(scan_one("'\\n'", chars), Ok((CharLiteral, "'\\n'".to_owned())));
    assert_eq!(scan_one("'\\''", chars), Ok((CharLiteral, "'\\''".to_owned())));
    assert_eq!(scan_one("'é'", chars), Ok((CharLiteral, "'é'".to_owned())));
    assert_eq!(scan_one("'a'", chars), Ok((CharLiteral, "'a'".to_owned())));
    assert!(scan_one("''", chars).is_err());
    assert!(scan_one("'\\q'", chars).is_err());
    assert!(scan_one("'ab'", chars).is_err());
}

// === Strings ===

#[test]
fn string_with_interpolation() {
    assert_eq!(
        lex("\"a `x` b\""),
        vec![
            (BeginStr, "\"".to_owned()),
            (StringContent, "a ".to_owned()),
            (BeginInterpolation, "`".to_owned()),
            (LowerId, "x".to_owned()),
            (EndInterpolation, "`".to_owned()),
            (StringContent, " b".to_owned()),
            (EndStr, "\"".to_owned()),
            (Newline, String::new()),
        ]
    );
}

#[test]
fn interpolation_frame_is_pushed_and_popped() {
    let buf = SourceBuffer::new("\"`(x)`\"");
    let mut cursor = buf.cursor();
    let mut scanner = Scanner::new();
    scanner.scan(&mut cursor, set(&[BeginStr])).expect("quote");
    assert!(scanner.in_string());
    scanner
        .scan(&mut cursor, set(&[BeginInterpolation]))
        .expect("backquote");
    assert!(!scanner.in_string());
    assert_eq!(scanner.top_frame(), Frame::Interpolation);
    for kind in [LParen, LowerId, RParen] {
        assert_eq!(scanner.scan(&mut cursor, anything()).map(|t| t.kind), Ok(kind));
    }
    scanner
        .scan(&mut cursor, set(&[EndInterpolation]))
        .expect("closing backquote");
    assert!(scanner.in_string());
    assert_eq!(scanner.frames(), &[Frame::ROOT]);
    scanner.scan(&mut cursor, set(&[EndStr])).expect("quote");
    assert!(!scanner.in_string());
}

#[test]
fn escapes_and_line_continuations_stay_in_content() {
    let src = "\"a\\\"b\\\n   c\"";
    let tokens = lex(src);
    assert_eq!(tokens[1], (StringContent, "a\\\"b\\\n   c".to_owned()));
    assert_eq!(tokens[2], (EndStr, "\"".to_owned()));
}

#[test]
fn unterminated_string_fails_at_end_of_input() {
    assert_eq!(kinds("\"abc"), vec![BeginStr, StringContent]);

    let buf = SourceBuffer::new("\"abc");
    let mut cursor = buf.cursor();
    let mut scanner = Scanner::new();
    let in_string = set(&[EndStr, StringContent, BeginInterpolation]);
    assert_eq!(
        scanner.scan(&mut cursor, set(&[BeginStr])),
        Ok(Token::new(BeginStr, Span::new(0, 1)))
    );
    assert_eq!(
        scanner.scan(&mut cursor, in_string),
        Ok(Token::new(StringContent, Span::new(1, 4)))
    );
    assert!(matches!(
        scanner.scan(&mut cursor, in_string),
        Err(ScanError::NoMatch { pos: 4, .. })
    ));
    assert!(scanner.in_string());
}

// === Identifiers and keywords ===

#[test]
fn keywords_only_when_requested() {
    assert_eq!(scan_one("type", set(&[LowerId])), Ok((LowerId, "type".to_owned())));
    assert_eq!(
        scan_one("type", set(&[LowerId, KwType])),
        Ok((KwType, "type".to_owned()))
    );
    assert_eq!(scan_one("Fn", set(&[UpperId])), Ok((UpperId, "Fn".to_owned())));
    assert_eq!(
        scan_one("Fn", set(&[UpperId, KwUpperFn])),
        Ok((KwUpperFn, "Fn".to_owned()))
    );
    assert!(scan_one("type", set(&[UpperId])).is_err());
}

#[test]
fn underscores() {
    assert_eq!(scan_one("__ x", anything()), Ok((Underscore, "__".to_owned())));
    assert_eq!(scan_one("_foo", anything()), Ok((LowerId, "_foo".to_owned())));
    assert_eq!(scan_one("__Bar9", anything()), Ok((UpperId, "__Bar9".to_owned())));
}

#[test]
fn row_before_bracket_is_a_keyword() {
    assert_eq!(
        kinds("row[a]"),
        vec![KwRow, LBracket, LowerId, RBracket, Newline]
    );
}

// === Numbers and operators ===

#[test]
fn integer_literals() {
    let ints = set(&[IntLiteral]);
    for src in ["0", "42", "1_000", "0x1F_a0", "0XFF", "0b1010_1", "0B1"] {
        assert_eq!(scan_one(src, ints), Ok((IntLiteral, src.to_owned())), "{src}");
    }
    assert_eq!(scan_one("0b12", ints), Ok((IntLiteral, "0b1".to_owned())));
    assert!(scan_one("0x", ints).is_err());
    assert!(scan_one("0b_", ints).is_err());
    // The `0` alone is not taken either.
    assert!(matches!(
        scan_one("0xg", ints),
        Err(ScanError::NoMatch { pos: 0, .. })
    ));
}

#[test]
fn longest_requested_operator_wins() {
    let all = anything();
    for (src, kind) in [
        ("==", EqEq),
        ("!=", Neq),
        ("<=", LtEq),
        (">=", GtEq),
        ("<<", LShift),
        (">>", RShift),
        ("&&", AmpAmp),
        ("+=", PlusEq),
        ("-=", MinusEq),
        ("*=", StarEq),
        ("^=", CaretEq),
        ("..", DotDot),
    ] {
        assert_eq!(scan_one(src, all), Ok((kind, src.to_owned())), "{src}");
    }
}

#[test]
fn operator_falls_back_to_prefix() {
    assert_eq!(scan_one("==", set(&[Eq])), Ok((Eq, "=".to_owned())));
    assert_eq!(scan_one("<=", set(&[Lt, LShift])), Ok((Lt, "<".to_owned())));
    assert!(scan_one("==", set(&[Neq])).is_err());
}

#[test]
fn single_byte_punctuation() {
    assert_eq!(
        kinds("a | b ~ c / d % e; f"),
        vec![
            LowerId, Pipe, LowerId, Tilde, LowerId, Slash, LowerId, Percent, LowerId, Semicolon,
            LowerId, Newline
        ]
    );
}

// === Failures ===

#[test]
fn failed_scan_changes_nothing() {
    let buf = SourceBuffer::new("f(\n  x");
    let mut cursor = buf.cursor();
    let mut scanner = Scanner::new();
    scanner.scan(&mut cursor, set(&[LowerId])).expect("f");
    scanner.scan(&mut cursor, set(&[LParen])).expect("(");
    let before = scanner.snapshot();
    let pos = cursor.pos();

    let err = scanner
        .scan(&mut cursor, set(&[Comma]))
        .expect_err("no comma here");
    assert_eq!(
        err,
        ScanError::NoMatch {
            pos,
            requested: set(&[Comma])
        }
    );
    assert_eq!(cursor.pos(), pos);
    assert_eq!(scanner.snapshot(), before);
}

#[test]
fn mismatched_closer_is_rejected() {
    let buf = SourceBuffer::new("(]");
    let mut cursor = buf.cursor();
    let mut scanner = Scanner::new();
    scanner.scan(&mut cursor, anything()).expect("(");
    assert_eq!(
        scanner.scan(&mut cursor, anything()),
        Err(ScanError::MismatchedClose {
            pos: 1,
            closer: RBracket,
            top: FrameKind::Paren
        })
    );
    assert_eq!(scanner.depth(), 2);
}

#[test]
fn lenient_closer_leaves_stack_alone() {
    let config = ScannerConfig::default().with_delimiters(DelimiterPolicy::Lenient);
    let buf = SourceBuffer::new("(])");
    let mut cursor = buf.cursor();
    let mut scanner = Scanner::with_config(config);
    let kinds: Vec<TokenKind> = (0..3)
        .map(|_| scanner.scan(&mut cursor, anything()).expect("lenient").kind)
        .collect();
    assert_eq!(kinds, vec![LParen, RBracket, RParen]);
    assert_eq!(scanner.depth(), 1);
}

#[test]
fn stray_closing_brace_at_root_is_rejected() {
    assert!(matches!(
        scan_one("}", anything()),
        Err(ScanError::MismatchedClose { closer: RBrace, top: FrameKind::Indented, .. })
    ));
}

#[test]
fn nesting_limit_rejects_by_default() {
    let src = "(".repeat(MAX_DEPTH + 10);
    let buf = SourceBuffer::new(&src);
    let mut cursor = buf.cursor();
    let mut scanner = Scanner::new();
    for _ in 1..MAX_DEPTH {
        scanner.scan(&mut cursor, set(&[LParen])).expect("below limit");
    }
    let pos = cursor.pos();
    assert_eq!(
        scanner.scan(&mut cursor, set(&[LParen])),
        Err(ScanError::NestingTooDeep {
            pos,
            limit: MAX_DEPTH
        })
    );
    assert_eq!(scanner.depth(), MAX_DEPTH);
}

#[test]
fn nesting_limit_truncates_when_configured() {
    let config = ScannerConfig::default().with_overflow(OverflowPolicy::Truncate);
    let src = "(".repeat(MAX_DEPTH + 10);
    let buf = SourceBuffer::new(&src);
    let mut cursor = buf.cursor();
    let mut scanner = Scanner::with_config(config);
    for _ in 0..MAX_DEPTH + 10 {
        scanner.scan(&mut cursor, set(&[LParen])).expect("truncating");
    }
    assert_eq!(scanner.depth(), MAX_DEPTH);
}

// === Persistence ===

#[test]
fn reset_restores_initial_state() {
    let buf = SourceBuffer::new("(\"");
    let mut cursor = buf.cursor();
    let mut scanner = Scanner::new();
    scanner.scan(&mut cursor, anything()).expect("(");
    scanner.scan(&mut cursor, anything()).expect("quote");
    scanner.reset();
    assert_eq!(scanner.state(), &ScannerState::new());
}

#[test]
fn serialize_reports_small_buffer() {
    let scanner = Scanner::new();
    let mut buf = [0u8; 3];
    assert_eq!(
        scanner.serialize(&mut buf),
        Err(StateError::BufferTooSmall {
            needed: 7,
            available: 3
        })
    );
}

#[test]
fn bad_state_leaves_scanner_unchanged() {
    let buf = SourceBuffer::new("[");
    let mut cursor = buf.cursor();
    let mut scanner = Scanner::new();
    scanner.scan(&mut cursor, anything()).expect("[");
    let before = scanner.snapshot();
    assert!(scanner.deserialize(&[9, 9]).is_err());
    assert_eq!(scanner.snapshot(), before);
    scanner.deserialize(&[]).expect("empty resets");
    assert_eq!(scanner.frames(), &[Frame::ROOT]);
}

const PROGRAM: &str = "\
type Point(x: I32, y: I32)

fn main():
    let p = Point(x = 1, y = 0x2A)
    # comment
    for i in range(0, 10):
        if i == 'c':
            print(\"i = `i`, p = `p.x`\")
        elif not done:
            break 'outer
    #| trailing
       block |#
    return
";

fn lex_tokens(src: &SourceBuffer) -> Vec<Token> {
    Driver::new(Scanner::new(), src.cursor(), PermissivePolicy::new())
        .collect::<Result<_, _>>()
        .expect("program lexes")
}

#[test]
fn program_block_structure() {
    let buf = SourceBuffer::new(PROGRAM);
    let tokens = lex_tokens(&buf);
    let opens = tokens.iter().filter(|t| t.kind == StartBlock).count();
    let closes = tokens.iter().filter(|t| t.kind == EndBlock).count();
    assert_eq!((opens, closes), (4, 4));
    assert!(tokens.iter().any(|t| t.kind == KwElif));
    assert!(tokens.iter().any(|t| t.kind == Label));
    assert!(tokens.iter().any(|t| t.kind == CharLiteral));
    assert_eq!(tokens.iter().filter(|t| t.kind == BeginInterpolation).count(), 2);
}

#[test]
fn resuming_from_any_snapshot_gives_same_tokens() {
    let buf = SourceBuffer::new(PROGRAM);
    let full = lex_tokens(&buf);

    for split in 0..=full.len() {
        let mut driver = Driver::new(Scanner::new(), buf.cursor(), PermissivePolicy::new());
        let mut tokens: Vec<Token> = driver
            .by_ref()
            .take(split)
            .collect::<Result<_, _>>()
            .expect("prefix lexes");
        let (scanner, cursor, policy) = driver.into_parts();

        let mut restored = Scanner::new();
        restored
            .deserialize(&scanner.snapshot())
            .expect("snapshot restores");
        let mut resumed = buf.cursor();
        resumed.reset_to(cursor.pos());
        tokens.extend(
            Driver::new(restored, resumed, policy)
                .collect::<Result<Vec<_>, _>>()
                .expect("suffix lexes"),
        );
        assert_eq!(tokens, full, "split at {split}");
    }
}

// === Properties ===

/// Indentation depths of consecutive lines: start at 0, deepen by at most
/// one level per line.
fn arb_depths() -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec((any::<bool>(), 0usize..4), 1..40).prop_map(|steps| {
        let mut depths: Vec<usize> = vec![0];
        for (deeper, back) in steps {
            let last = *depths.last().unwrap_or(&0);
            depths.push(if deeper { last + 1 } else { last.saturating_sub(back) });
        }
        depths
    })
}

fn render(depths: &[usize], width: usize) -> String {
    let mut src = String::new();
    for (i, &depth) in depths.iter().enumerate() {
        src.push_str(&" ".repeat(depth * width));
        src.push('x');
        if depths.get(i + 1).is_some_and(|&next| next > depth) {
            src.push(':');
        }
        src.push('\n');
    }
    src
}

proptest! {
    /// Every block open is preceded by `:` and closed exactly once, and the
    /// close count never runs ahead of the open count.
    #[test]
    fn blocks_balance(depths in arb_depths(), width in 1usize..5) {
        let src = render(&depths, width);
        let buf = SourceBuffer::new(&src);
        let tokens: Vec<Token> = Driver::new(Scanner::new(), buf.cursor(), PermissivePolicy::new())
            .collect::<Result<_, _>>()
            .expect("lexes");

        let mut open = 0usize;
        let mut prev = None;
        for tok in &tokens {
            match tok.kind {
                StartBlock => {
                    prop_assert_eq!(prev, Some(Colon));
                    open += 1;
                }
                EndBlock => {
                    prop_assert!(open > 0);
                    open -= 1;
                }
                _ => {}
            }
            prev = Some(tok.kind);
        }
        prop_assert_eq!(open, 0);
        let expected_blocks = depths.windows(2).filter(|w| w[1] > w[0]).count();
        prop_assert_eq!(
            tokens.iter().filter(|t| t.kind == StartBlock).count(),
            expected_blocks
        );
    }

    /// A scanner restored from a snapshot continues exactly like the one
    /// that never stopped.
    #[test]
    fn snapshot_resume_matches(depths in arb_depths(), split in any::<prop::sample::Index>()) {
        let src = render(&depths, 2);
        let buf = SourceBuffer::new(&src);
        let full = lex_tokens(&buf);
        let split = split.index(full.len() + 1);

        let mut driver = Driver::new(Scanner::new(), buf.cursor(), PermissivePolicy::new());
        let mut tokens: Vec<Token> = driver
            .by_ref()
            .take(split)
            .collect::<Result<_, _>>()
            .expect("prefix lexes");
        let (scanner, cursor, policy) = driver.into_parts();

        let mut restored = Scanner::new();
        restored.deserialize(&scanner.snapshot()).expect("snapshot restores");
        prop_assert_eq!(restored.state(), scanner.state());
        tokens.extend(
            Driver::new(restored, cursor, policy)
                .collect::<Result<Vec<_>, _>>()
                .expect("suffix lexes"),
        );
        prop_assert_eq!(tokens, full);
    }

    /// Arbitrary input never panics and the permissive driver always
    /// terminates.
    #[test]
    fn arbitrary_input_terminates(src in "[ -~\n\t]{0,80}") {
        let buf = SourceBuffer::new(&src);
        let config = ScannerConfig::tolerant();
        let count = Driver::new(Scanner::with_config(config), buf.cursor(), PermissivePolicy::new())
            .take(10_000)
            .count();
        prop_assert!(count < 10_000);
    }
}
