//! Edge-case tests for the scanner.

use crate::{Scanner, TokenKind};
use proptest::prelude::*;

fn scan_all(source: &str) -> Vec<TokenKind> {
    let mut scanner = Scanner::new(source);
    let mut out = Vec::new();
    loop {
        let token = scanner.scan_token();
        out.push(token.kind);
        if token.kind == TokenKind::Eof {
            return out;
        }
    }
}

#[test]
fn test_empty_source() {
    assert_eq!(scan_all(""), vec![TokenKind::Eof]);
}

#[test]
fn test_whitespace_only_source() {
    assert_eq!(scan_all("  \t\r\n  \n"), vec![TokenKind::Eof]);
}

#[test]
fn test_comment_only_source() {
    assert_eq!(scan_all("// nothing here"), vec![TokenKind::Eof]);
}

#[test]
fn test_comment_at_end_without_newline() {
    assert_eq!(scan_all("1 //"), vec![TokenKind::Number, TokenKind::Eof]);
}

#[test]
fn test_slash_slash_inside_string_is_not_a_comment() {
    assert_eq!(
        scan_all("\"http://x\""),
        vec![TokenKind::String, TokenKind::Eof]
    );
}

#[test]
fn test_adjacent_operators_maximal_munch() {
    // "===" must scan as "==" then "=".
    assert_eq!(
        scan_all("==="),
        vec![TokenKind::EqualEqual, TokenKind::Equal, TokenKind::Eof]
    );
    assert_eq!(
        scan_all("!=="),
        vec![TokenKind::BangEqual, TokenKind::Equal, TokenKind::Eof]
    );
}

#[test]
fn test_identifier_with_digits_and_underscores() {
    let mut scanner = Scanner::new("_foo2_bar");
    let token = scanner.scan_token();
    assert_eq!(token.kind, TokenKind::Identifier);
    assert_eq!(token.lexeme, "_foo2_bar");
}

#[test]
fn test_keyword_followed_by_digit_is_identifier() {
    assert_eq!(scan_all("var1"), vec![TokenKind::Identifier, TokenKind::Eof]);
}

#[test]
fn test_leading_dot_is_not_a_number() {
    assert_eq!(
        scan_all(".5"),
        vec![TokenKind::Dot, TokenKind::Number, TokenKind::Eof]
    );
}

#[test]
fn test_trailing_dot_stays_separate() {
    assert_eq!(
        scan_all("5."),
        vec![TokenKind::Number, TokenKind::Dot, TokenKind::Eof]
    );
}

#[test]
fn test_non_ascii_bytes_become_errors_without_panicking() {
    let kinds = scan_all("1 § 2");
    assert!(kinds.contains(&TokenKind::Error));
    assert_eq!(kinds.iter().filter(|&&k| k == TokenKind::Number).count(), 2);
}

proptest! {
    /// The scanner terminates and ends with Eof on arbitrary input.
    #[test]
    fn scanner_always_terminates(source in "\\PC*") {
        let kinds = scan_all(&source);
        prop_assert_eq!(*kinds.last().unwrap(), TokenKind::Eof);
        // One token per iteration, each consuming at least one byte, plus
        // the Eof: the stream is bounded by the input length.
        prop_assert!(kinds.len() <= source.len() + 1);
    }

    /// Scanning is insensitive to trailing whitespace.
    #[test]
    fn trailing_whitespace_is_ignored(source in "[a-z ]{0,40}") {
        let padded = format!("{}  \n\t", source);
        prop_assert_eq!(scan_all(&source), scan_all(&padded));
    }
}
