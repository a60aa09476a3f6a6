//! wispc-par - Single-Pass Compiler
//!
//! A Pratt (top-down operator precedence) parser that emits bytecode as it
//! parses; there is no AST. The compiler drives the scanner one token at a
//! time, resolves local variables against a compile-time stack model, and
//! backpatches jump operands once their targets are known.
//!
//! # Operator precedence (lowest to highest)
//!
//! | Level | Operators | Associativity |
//! |-------|-----------|---------------|
//! | 1 | `=` | Right |
//! | 2 | `or` | Left |
//! | 3 | `and` | Left |
//! | 4 | `==`, `!=` | Left |
//! | 5 | `<`, `<=`, `>`, `>=` | Left |
//! | 6 | `+`, `-` | Left |
//! | 7 | `*`, `/` | Left |
//! | 8 | `!`, `-` (unary) | Prefix |
//!
//! Left associativity comes from each binary handler recursing at its own
//! precedence plus one.
//!
//! # Error recovery
//!
//! Diagnostics go to stderr in the form `[line N] Error at 'lexeme':
//! message`. The first error flips panic mode, which suppresses cascading
//! diagnostics until the parser resynchronizes at a statement boundary.
//! Any error makes [`compile`] fail; the partial chunk is discarded.

mod compiler;
mod expr;
mod parser;

#[cfg(test)]
mod edge_cases;

use thiserror::Error;
use wispc_core::{Chunk, Heap};

pub use compiler::Compiler;

/// Compilation failed; diagnostics were already written to stderr.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("compilation failed")]
pub struct CompileError;

/// Compile one source string into a chunk. Strings and identifiers are
/// interned into `heap`, which is why the caller lends it out.
pub fn compile(source: &str, heap: &mut Heap) -> Result<Chunk, CompileError> {
    Compiler::new(source, heap).compile()
}
