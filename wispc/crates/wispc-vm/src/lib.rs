//! wispc-vm - The Wisp Virtual Machine
//!
//! A stack machine over the one-byte opcode set in `wispc-core`. The VM
//! owns the process-wide interpreter state: the heap (string interner) and
//! the globals table, both of which outlive any single chunk. One [`Vm`]
//! serves many [`interpret`](Vm::interpret) calls, which is what the REPL
//! leans on: a failed line leaves the machine usable for the next one.
//!
//! Runtime errors print `message` then `[line N] in script` to stderr,
//! reset the operand stack, and surface as [`InterpretError::Runtime`].

mod error;
mod vm;

pub use error::InterpretError;
pub use vm::{Vm, STACK_MAX};
