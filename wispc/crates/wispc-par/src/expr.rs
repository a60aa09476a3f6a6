//! Expression parsing: the Pratt table and its handlers.
//!
//! Every token kind maps to a [`ParseRule`]: an optional prefix handler
//! (what to do when the token begins an expression), an optional infix
//! handler (what to do when it joins two), and the precedence its infix
//! form binds at. [`Compiler::parse_precedence`] threads them together.
//!
//! Handlers receive `can_assign`, true only when the surrounding
//! precedence admits assignment. It keeps `a * b = c` from silently
//! parsing `b = c`: the `=` is left unconsumed, and the caller reports it.

use wispc_core::{OpCode, Value};
use wispc_lex::TokenKind;

use crate::compiler::Compiler;

/// Binding tightness, weakest first. Binary handlers parse their right
/// operand one level tighter than themselves, which makes them
/// left-associative.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum Precedence {
    None,
    /// `=`
    Assignment,
    /// `or`
    Or,
    /// `and`
    And,
    /// `==` `!=`
    Equality,
    /// `<` `>` `<=` `>=`
    Comparison,
    /// `+` `-`
    Term,
    /// `*` `/`
    Factor,
    /// `!` `-` (prefix)
    Unary,
    /// `.` `()`
    Call,
    Primary,
}

impl Precedence {
    /// One level tighter.
    fn next(self) -> Precedence {
        match self {
            Precedence::None => Precedence::Assignment,
            Precedence::Assignment => Precedence::Or,
            Precedence::Or => Precedence::And,
            Precedence::And => Precedence::Equality,
            Precedence::Equality => Precedence::Comparison,
            Precedence::Comparison => Precedence::Term,
            Precedence::Term => Precedence::Factor,
            Precedence::Factor => Precedence::Unary,
            Precedence::Unary => Precedence::Call,
            Precedence::Call | Precedence::Primary => Precedence::Primary,
        }
    }
}

type ParseFn<'src, 'h> = fn(&mut Compiler<'src, 'h>, bool);

struct ParseRule<'src, 'h> {
    prefix: Option<ParseFn<'src, 'h>>,
    infix: Option<ParseFn<'src, 'h>>,
    precedence: Precedence,
}

/// The parse table, written as a match so the compiler checks coverage.
fn rule<'src, 'h>(kind: TokenKind) -> ParseRule<'src, 'h> {
    let (prefix, infix, precedence): (
        Option<ParseFn<'src, 'h>>,
        Option<ParseFn<'src, 'h>>,
        Precedence,
    ) = match kind {
        TokenKind::LeftParen => (Some(grouping), None, Precedence::None),
        TokenKind::Minus => (Some(unary), Some(binary), Precedence::Term),
        TokenKind::Plus => (None, Some(binary), Precedence::Term),
        TokenKind::Slash | TokenKind::Star => (None, Some(binary), Precedence::Factor),
        TokenKind::Bang => (Some(unary), None, Precedence::None),
        TokenKind::BangEqual | TokenKind::EqualEqual => {
            (None, Some(binary), Precedence::Equality)
        }
        TokenKind::Greater
        | TokenKind::GreaterEqual
        | TokenKind::Less
        | TokenKind::LessEqual => (None, Some(binary), Precedence::Comparison),
        TokenKind::Identifier => (Some(variable), None, Precedence::None),
        TokenKind::String => (Some(string), None, Precedence::None),
        TokenKind::Number => (Some(number), None, Precedence::None),
        TokenKind::And => (None, Some(and_), Precedence::And),
        TokenKind::Or => (None, Some(or_), Precedence::Or),
        TokenKind::False | TokenKind::Nil | TokenKind::True => {
            (Some(literal), None, Precedence::None)
        }
        _ => (None, None, Precedence::None),
    };
    ParseRule {
        prefix,
        infix,
        precedence,
    }
}

impl<'src, 'h> Compiler<'src, 'h> {
    /// The Pratt core. Parse one prefix expression, then fold in every
    /// infix operator binding at least as tightly as `precedence`.
    pub(crate) fn parse_precedence(&mut self, precedence: Precedence) {
        self.parser.advance();
        let Some(prefix) = rule(self.parser.previous.kind).prefix else {
            self.parser.error("Expected expression.");
            return;
        };

        let can_assign = precedence <= Precedence::Assignment;
        prefix(self, can_assign);

        while precedence <= rule(self.parser.current.kind).precedence {
            self.parser.advance();
            if let Some(infix) = rule(self.parser.previous.kind).infix {
                infix(self, can_assign);
            }
        }

        // A leftover `=` here means the target to its left was not
        // assignable and nothing else will consume it.
        if can_assign && self.parser.match_kind(TokenKind::Equal) {
            self.parser.error("Invalid assignment target.");
        }
    }
}

fn number(c: &mut Compiler, _can_assign: bool) {
    match c.parser.previous.lexeme.parse::<f64>() {
        Ok(value) => c.emit_constant(Value::Number(value)),
        Err(_) => c.parser.error("Invalid number literal."),
    }
}

/// Strip the surrounding quotes and intern. No escape sequences.
fn string(c: &mut Compiler, _can_assign: bool) {
    let lexeme = c.parser.previous.lexeme;
    let text = &lexeme[1..lexeme.len() - 1];
    let interned = c.heap.intern(text);
    c.emit_constant(Value::Str(interned));
}

fn literal(c: &mut Compiler, _can_assign: bool) {
    match c.parser.previous.kind {
        TokenKind::False => c.emit_op(OpCode::False),
        TokenKind::Nil => c.emit_op(OpCode::Nil),
        TokenKind::True => c.emit_op(OpCode::True),
        _ => unreachable!("literal handler registered for other token"),
    }
}

fn grouping(c: &mut Compiler, _can_assign: bool) {
    c.expression();
    c.parser
        .consume(TokenKind::RightParen, "Expected ')' after expression.");
}

/// The operand compiles first; the operator applies to whatever it left
/// on the stack.
fn unary(c: &mut Compiler, _can_assign: bool) {
    let operator = c.parser.previous.kind;
    c.parse_precedence(Precedence::Unary);
    match operator {
        TokenKind::Minus => c.emit_op(OpCode::Neg),
        TokenKind::Bang => c.emit_op(OpCode::Not),
        _ => unreachable!("unary handler registered for other token"),
    }
}

/// Composite comparisons are synthesized: `a != b` is `!(a == b)`,
/// `a >= b` is `!(a < b)`, `a <= b` is `!(a > b)`.
fn binary(c: &mut Compiler, _can_assign: bool) {
    let operator = c.parser.previous.kind;
    c.parse_precedence(rule(operator).precedence.next());

    match operator {
        TokenKind::BangEqual => {
            c.emit_op(OpCode::Equal);
            c.emit_op(OpCode::Not);
        }
        TokenKind::EqualEqual => c.emit_op(OpCode::Equal),
        TokenKind::Greater => c.emit_op(OpCode::Greater),
        TokenKind::GreaterEqual => {
            c.emit_op(OpCode::Less);
            c.emit_op(OpCode::Not);
        }
        TokenKind::Less => c.emit_op(OpCode::Less),
        TokenKind::LessEqual => {
            c.emit_op(OpCode::Greater);
            c.emit_op(OpCode::Not);
        }
        TokenKind::Plus => c.emit_op(OpCode::Add),
        TokenKind::Minus => c.emit_op(OpCode::Sub),
        TokenKind::Star => c.emit_op(OpCode::Mul),
        TokenKind::Slash => c.emit_op(OpCode::Div),
        _ => unreachable!("binary handler registered for other token"),
    }
}

/// `and` leaves the left value as the result when it is falsy, otherwise
/// discards it and evaluates the right.
fn and_(c: &mut Compiler, _can_assign: bool) {
    let end_jump = c.emit_jump(OpCode::JumpIfFalse);
    c.emit_op(OpCode::Pop);
    c.parse_precedence(Precedence::And);
    c.patch_jump(end_jump);
}

/// `or` with two jumps: falsy skips to the right operand, truthy skips
/// over it. Costs one more jump than necessary but stays correct.
fn or_(c: &mut Compiler, _can_assign: bool) {
    let else_jump = c.emit_jump(OpCode::JumpIfFalse);
    let end_jump = c.emit_jump(OpCode::Jump);

    c.patch_jump(else_jump);
    c.emit_op(OpCode::Pop);
    c.parse_precedence(Precedence::Or);
    c.patch_jump(end_jump);
}

fn variable(c: &mut Compiler, can_assign: bool) {
    named_variable(c, can_assign);
}

/// Resolve a name to a local slot or a global constant, then emit either
/// the read or, when an `=` follows in assignment position, the write.
fn named_variable(c: &mut Compiler, can_assign: bool) {
    let name = c.parser.previous;
    let (get_op, set_op, operand) = match c.resolve_local(&name) {
        Some(slot) => (OpCode::GetLocal, OpCode::SetLocal, slot),
        None => {
            let index = c.identifier_constant(&name);
            (OpCode::GetGlobal, OpCode::SetGlobal, index)
        }
    };

    if can_assign && c.parser.match_kind(TokenKind::Equal) {
        c.expression();
        c.emit_op(set_op);
        c.emit_byte(operand);
    } else {
        c.emit_op(get_op);
        c.emit_byte(operand);
    }
}
