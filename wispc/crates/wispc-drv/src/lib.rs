//! wispc-drv - Interpreter Driver
//!
//! The outermost shell: argument dispatch, the REPL, script execution, and
//! exit-code mapping. With no arguments `wispc` reads lines from stdin and
//! interprets each one against a single long-lived VM, so definitions and
//! errors from one line carry into the next. With one argument it runs the
//! named script. Anything else is a usage error.
//!
//! Exit codes follow the BSD `sysexits` convention.

use std::io::{self, BufRead, Write};

use anyhow::Context;
use wispc_vm::{InterpretError, Vm};

/// Command line usage error.
pub const EX_USAGE: u8 = 64;
/// The script failed to compile.
pub const EX_DATAERR: u8 = 65;
/// The script failed at runtime.
pub const EX_SOFTWARE: u8 = 70;
/// The script file could not be read.
pub const EX_IOERR: u8 = 74;

/// Run the driver with already-split arguments (program name excluded).
/// Returns the process exit code.
pub fn run(args: &[String]) -> u8 {
    let mut vm = Vm::new();
    if trace_enabled() {
        vm.set_trace(true);
    }

    match args {
        [] => repl(&mut vm),
        [path] => run_file(&mut vm, path),
        _ => {
            eprintln!("Usage: wispc [script]");
            EX_USAGE
        }
    }
}

/// `WISPC_TRACE` (any value but `0`) turns on chunk dumps and per-step
/// execution tracing on stderr.
fn trace_enabled() -> bool {
    match std::env::var_os("WISPC_TRACE") {
        Some(value) => value != "0",
        None => false,
    }
}

/// Read-eval-print loop: one interpreted line at a time until EOF. Errors
/// are reported per line and never end the session.
fn repl<W: Write>(vm: &mut Vm<W>) -> u8 {
    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        let _ = io::stdout().flush();

        line.clear();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => {
                println!();
                return 0;
            }
            Ok(_) => {
                let _ = vm.interpret(&line);
            }
            Err(error) => {
                eprintln!("error: {}", error);
                return EX_IOERR;
            }
        }
    }
}

fn run_file<W: Write>(vm: &mut Vm<W>, path: &str) -> u8 {
    let source = match read_source(path) {
        Ok(source) => source,
        Err(error) => {
            eprintln!("error: {:#}", error);
            return EX_IOERR;
        }
    };

    match vm.interpret(&source) {
        Ok(()) => 0,
        Err(InterpretError::Compile) => EX_DATAERR,
        Err(InterpretError::Runtime) => EX_SOFTWARE,
    }
}

fn read_source(path: &str) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("could not read file '{}'", path))
}
