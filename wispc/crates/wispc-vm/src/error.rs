//! Interpreter result classification.

use thiserror::Error;

/// Why an [`interpret`](crate::Vm::interpret) call failed. The diagnostics
/// themselves have already been written to stderr by the time this is
/// returned; the driver only needs the category for its exit code.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum InterpretError {
    /// The source did not compile; no code was run.
    #[error("compile error")]
    Compile,
    /// Execution halted on a runtime error; the stack was reset.
    #[error("runtime error")]
    Runtime,
}
