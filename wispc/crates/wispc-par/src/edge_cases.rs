//! Edge-case tests for the compiler.

use crate::{compile, CompileError};
use wispc_core::{disasm, Heap, OpCode};

fn compiles(source: &str) -> bool {
    let mut heap = Heap::new();
    compile(source, &mut heap).is_ok()
}

#[test]
fn test_empty_source_is_a_valid_program() {
    let mut heap = Heap::new();
    let chunk = compile("", &mut heap).unwrap();
    assert_eq!(chunk.code(), &[u8::from(OpCode::Return)]);
}

#[test]
fn test_deeply_nested_grouping() {
    let source = format!("print {}1{};", "(".repeat(64), ")".repeat(64));
    assert!(compiles(&source));
}

#[test]
fn test_deeply_nested_blocks() {
    let source = format!("{}var a = 1;{}", "{".repeat(32), "}".repeat(32));
    assert!(compiles(&source));
}

#[test]
fn test_unclosed_brace_is_an_error() {
    assert!(!compiles("{ var a = 1;"));
}

#[test]
fn test_unclosed_paren_is_an_error() {
    assert!(!compiles("print (1 + 2;"));
}

#[test]
fn test_else_binds_to_nearest_if() {
    // Must parse; the dangling else attaches to the inner if.
    assert!(compiles("if (true) if (false) print 1; else print 2;"));
}

#[test]
fn test_if_condition_requires_parens() {
    assert!(!compiles("if true print 1;"));
    assert!(!compiles("while true print 1;"));
}

#[test]
fn test_keywords_are_not_variable_names() {
    assert!(!compiles("var class = 1;"));
    assert!(!compiles("var while = 1;"));
}

#[test]
fn test_assignment_to_literal_rejected() {
    assert!(!compiles("1 = 2;"));
    assert!(!compiles("\"s\" = 2;"));
    assert!(!compiles("(a) = 2;"));
}

#[test]
fn test_sync_recovers_per_statement() {
    // Three statements, the middle one bad; compilation fails but the
    // parser must get cleanly to the end.
    let mut heap = Heap::new();
    assert_eq!(
        compile("var a = 1; var = 2; var c = 3;", &mut heap),
        Err(CompileError)
    );
}

#[test]
fn test_error_inside_block_recovers_at_brace() {
    let mut heap = Heap::new();
    assert_eq!(
        compile("{ print ; } print 1;", &mut heap),
        Err(CompileError)
    );
}

#[test]
fn test_jump_over_large_then_branch() {
    // A then-branch of several thousand bytes needs the full 16-bit
    // operand; `true;` compiles to two bytes and no constants.
    let source = format!("if (true) {{ {} }}", "true;".repeat(5000));
    assert!(compiles(&source));
}

#[test]
fn test_jump_distance_overflow_is_an_error() {
    // Past 65535 bytes the forward jump cannot encode its target.
    let source = format!("if (true) {{ {} }}", "true;".repeat(33000));
    assert!(!compiles(&source));
}

#[test]
fn test_loop_body_overflow_is_an_error() {
    let source = format!("while (true) {{ {} }}", "true;".repeat(33000));
    assert!(!compiles(&source));
}

#[test]
fn test_while_with_logical_condition() {
    let chunk = {
        let mut heap = Heap::new();
        compile("var i = 0; while (i < 3 and true) i = i + 1;", &mut heap).unwrap()
    };
    let listing = disasm::disassemble(&chunk, "cond");
    // One jump from `and`, one loop exit.
    assert_eq!(listing.matches("OP_JUMP_IF_FALSE").count(), 2);
    assert_eq!(listing.matches("OP_LOOP").count(), 1);
}

#[test]
fn test_string_concatenation_expression_compiles() {
    assert!(compiles("print \"foo\" + \"bar\" + \"baz\";"));
}

#[test]
fn test_multiline_string_keeps_statement_line_sane() {
    let mut heap = Heap::new();
    let chunk = compile("print \"a\nb\";\nprint 2;", &mut heap).unwrap();
    let code = chunk.code();
    // The second print's constant is recorded on line 3.
    let last_const = code
        .iter()
        .rposition(|&b| b == u8::from(OpCode::Constant))
        .unwrap();
    assert_eq!(chunk.line(last_const), 3);
}

#[test]
fn test_expression_statement_pops_its_value() {
    let mut heap = Heap::new();
    let chunk = compile("1 + 2;", &mut heap).unwrap();
    let code = chunk.code();
    assert_eq!(code[code.len() - 2], u8::from(OpCode::Pop));
}
