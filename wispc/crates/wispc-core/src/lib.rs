//! wispc-core - Runtime Core Types
//!
//! The foundation shared by the compiler and the virtual machine:
//!
//! - `value` - The tagged runtime value (`nil`, booleans, numbers, strings)
//! - `object` - Heap-allocated string data with its precomputed hash
//! - `heap` - The string interner; every live string has exactly one home
//! - `table` - Open-addressed hash table keyed by interned strings
//! - `chunk` - A compiled unit: bytecode, line table, and constant pool
//! - `disasm` - Human-readable chunk listings for debugging and tracing
//!
//! The compiler borrows the [`Heap`] while it builds a [`Chunk`]; the VM
//! owns the heap, a globals [`Table`], and executes chunks. Nothing in this
//! crate performs I/O.

pub mod chunk;
pub mod disasm;
pub mod heap;
pub mod object;
pub mod table;
pub mod value;

pub use chunk::{Chunk, OpCode, MAX_CONSTANTS};
pub use heap::Heap;
pub use object::WispStr;
pub use table::Table;
pub use value::Value;
