//! End-to-end driver tests: literal scripts in, literal stdout and exit
//! codes out.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

fn wispc() -> Command {
    Command::cargo_bin("wispc").expect("binary builds")
}

fn script(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(contents.as_bytes()).expect("write script");
    file
}

fn run_script(contents: &str) -> assert_cmd::assert::Assert {
    let file = script(contents);
    wispc().arg(file.path()).assert()
}

// =============================================================================
// SUCCESS SCENARIOS
// =============================================================================

#[test]
fn test_arithmetic_precedence() {
    run_script("print 1 + 2 * 3;")
        .success()
        .stdout("7\n");
}

#[test]
fn test_string_concatenation() {
    run_script("print \"foo\" + \"bar\";")
        .success()
        .stdout("foobar\n");
}

#[test]
fn test_shadowing_restores_outer_binding() {
    run_script("var a = 1; { var a = 2; print a; } print a;")
        .success()
        .stdout("2\n1\n");
}

#[test]
fn test_while_loop() {
    run_script("var i = 0; while (i < 3) { print i; i = i + 1; }")
        .success()
        .stdout("0\n1\n2\n");
}

#[test]
fn test_for_loop() {
    run_script("for (var i = 0; i < 3; i = i + 1) print i;")
        .success()
        .stdout("0\n1\n2\n");
}

#[test]
fn test_equality_and_negation() {
    run_script("print \"a\" == \"a\"; print 1 != 2; print !nil;")
        .success()
        .stdout("true\ntrue\ntrue\n");
}

// =============================================================================
// FAILURE SCENARIOS
// =============================================================================

#[test]
fn test_negating_a_string_is_a_runtime_error() {
    run_script("print -\"x\";")
        .code(70)
        .stderr(predicate::str::contains("Operand must be a number."))
        .stderr(predicate::str::contains("[line 1] in script"));
}

#[test]
fn test_mixed_addition_is_a_runtime_error() {
    run_script("print 1 + \"x\";")
        .code(70)
        .stderr(predicate::str::contains(
            "Operands must be two numbers or two strings.",
        ));
}

#[test]
fn test_undefined_variable_is_a_runtime_error() {
    run_script("print foo;")
        .code(70)
        .stderr(predicate::str::contains("Undefined variable 'foo'."));
}

#[test]
fn test_runtime_error_reports_the_failing_line() {
    run_script("print 1;\nprint 2;\nprint -\"x\";")
        .code(70)
        .stdout("1\n2\n")
        .stderr(predicate::str::contains("[line 3] in script"));
}

#[test]
fn test_reading_local_in_its_own_initializer_is_a_compile_error() {
    run_script("{ var a = a; }")
        .code(65)
        .stderr(predicate::str::contains(
            "Can't read local variable in its own initializer.",
        ));
}

#[test]
fn test_duplicate_local_is_a_compile_error() {
    run_script("{ var a; var a; }")
        .code(65)
        .stderr(predicate::str::contains(
            "Already a variable with this name in this scope.",
        ));
}

#[test]
fn test_compile_error_format_includes_line_and_lexeme() {
    run_script("print 1 +;")
        .code(65)
        .stderr(predicate::str::contains("[line 1] Error at ';'"))
        .stderr(predicate::str::contains("Expected expression."));
}

#[test]
fn test_compile_error_at_end_of_input() {
    run_script("print 1")
        .code(65)
        .stderr(predicate::str::contains("Error at end"));
}

#[test]
fn test_nothing_runs_on_a_compile_error() {
    run_script("print 1; print ;")
        .code(65)
        .stdout("");
}

// =============================================================================
// DRIVER CONTRACT
// =============================================================================

#[test]
fn test_too_many_arguments_is_a_usage_error() {
    wispc()
        .args(["one.wisp", "two.wisp"])
        .assert()
        .code(64)
        .stderr(predicate::str::contains("Usage: wispc [script]"));
}

#[test]
fn test_unreadable_file_is_an_io_error() {
    wispc()
        .arg("no/such/file.wisp")
        .assert()
        .code(74)
        .stderr(predicate::str::contains("no/such/file.wisp"));
}

#[test]
fn test_repl_interprets_lines_from_stdin() {
    wispc()
        .write_stdin("print 1 + 2;\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("3\n"));
}

#[test]
fn test_repl_keeps_state_between_lines() {
    wispc()
        .write_stdin("var a = 40;\nprint a + 2;\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("42\n"));
}

#[test]
fn test_repl_survives_both_error_kinds() {
    wispc()
        .write_stdin("print -\"x\";\nprint 1 +;\nprint \"still here\";\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("still here\n"))
        .stderr(predicate::str::contains("Operand must be a number."))
        .stderr(predicate::str::contains("Expected expression."));
}

#[test]
fn test_trace_mode_disassembles_to_stderr() {
    let file = script("print 1;");
    wispc()
        .arg(file.path())
        .env("WISPC_TRACE", "1")
        .assert()
        .success()
        .stdout("1\n")
        .stderr(predicate::str::contains("== code =="))
        .stderr(predicate::str::contains("OP_PRINT"));
}
