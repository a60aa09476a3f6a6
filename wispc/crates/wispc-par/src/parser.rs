//! Parser state and error reporting.
//!
//! The parser owns the scanner and a two-token window: the token just
//! consumed (`previous`, the one handlers act on) and the lookahead
//! (`current`). Error tokens from the scanner are reported and skipped
//! here, so the rest of the compiler never sees them.

use wispc_lex::{Scanner, Token, TokenKind};

pub(crate) struct Parser<'src> {
    scanner: Scanner<'src>,
    pub(crate) current: Token<'src>,
    pub(crate) previous: Token<'src>,
    /// Sticky: once set, compilation fails, however far parsing gets.
    pub(crate) had_error: bool,
    /// Suppresses diagnostics until the next synchronization point.
    pub(crate) panic_mode: bool,
}

impl<'src> Parser<'src> {
    pub(crate) fn new(source: &'src str) -> Parser<'src> {
        let placeholder = Token {
            kind: TokenKind::Eof,
            lexeme: "",
            line: 0,
        };
        Parser {
            scanner: Scanner::new(source),
            current: placeholder,
            previous: placeholder,
            had_error: false,
            panic_mode: false,
        }
    }

    /// Step the token window forward, reporting any error tokens in the
    /// way. Afterwards `current` is always a real token (or Eof).
    pub(crate) fn advance(&mut self) {
        self.previous = self.current;
        loop {
            self.current = self.scanner.scan_token();
            if self.current.kind != TokenKind::Error {
                break;
            }
            // The lexeme of an error token is the scanner's message.
            let message = self.current.lexeme;
            self.error_at_current(message);
        }
    }

    /// Consume `kind` or report `message` against the lookahead.
    pub(crate) fn consume(&mut self, kind: TokenKind, message: &str) {
        if self.current.kind == kind {
            self.advance();
            return;
        }
        self.error_at_current(message);
    }

    pub(crate) fn check(&self, kind: TokenKind) -> bool {
        self.current.kind == kind
    }

    /// Consume the lookahead if it matches.
    pub(crate) fn match_kind(&mut self, kind: TokenKind) -> bool {
        if !self.check(kind) {
            return false;
        }
        self.advance();
        true
    }

    /// Report an error at the token just consumed.
    pub(crate) fn error(&mut self, message: &str) {
        let token = self.previous;
        self.error_at(token, message);
    }

    /// Report an error at the lookahead token.
    pub(crate) fn error_at_current(&mut self, message: &str) {
        let token = self.current;
        self.error_at(token, message);
    }

    fn error_at(&mut self, token: Token<'src>, message: &str) {
        if self.panic_mode {
            return;
        }
        self.panic_mode = true;

        eprint!("[line {}] Error", token.line);
        match token.kind {
            TokenKind::Eof => eprint!(" at end"),
            // Scanner errors already carry their message; no lexeme to show.
            TokenKind::Error => {}
            _ => eprint!(" at '{}'", token.lexeme),
        }
        eprintln!(": {}", message);

        self.had_error = true;
    }

    /// Leave panic mode by skipping to a statement boundary: just past a
    /// `;`, or in front of a token that can start a declaration.
    pub(crate) fn synchronize(&mut self) {
        self.panic_mode = false;
        while self.current.kind != TokenKind::Eof {
            if self.previous.kind == TokenKind::Semicolon {
                return;
            }
            match self.current.kind {
                TokenKind::Class
                | TokenKind::Fun
                | TokenKind::Var
                | TokenKind::For
                | TokenKind::If
                | TokenKind::While
                | TokenKind::Print
                | TokenKind::Return => return,
                _ => self.advance(),
            }
        }
    }
}
