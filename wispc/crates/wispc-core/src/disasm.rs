//! Chunk disassembly.
//!
//! Renders bytecode into the listing format used by the trace flag and the
//! tests: a four-digit byte offset, the source line (or `|` when it repeats
//! the previous instruction's line), the opcode name, and any operand. The
//! output is returned as a `String` so callers decide where it goes.

use std::fmt::Write;

use crate::chunk::{Chunk, OpCode};

/// Disassemble a whole chunk under a `== name ==` header.
pub fn disassemble(chunk: &Chunk, name: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "== {} ==", name);
    let mut offset = 0;
    while offset < chunk.len() {
        offset = disassemble_instruction(chunk, offset, &mut out);
    }
    out
}

/// Disassemble the instruction at `offset` into `out`, returning the offset
/// of the next instruction.
pub fn disassemble_instruction(chunk: &Chunk, offset: usize, out: &mut String) -> usize {
    let _ = write!(out, "{:04} ", offset);
    if offset > 0 && chunk.line(offset) == chunk.line(offset - 1) {
        let _ = write!(out, "   | ");
    } else {
        let _ = write!(out, "{:4} ", chunk.line(offset));
    }

    let byte = chunk.code()[offset];
    let Ok(op) = OpCode::try_from(byte) else {
        let _ = writeln!(out, "Unknown opcode {}.", byte);
        return offset + 1;
    };

    match op {
        OpCode::Constant | OpCode::GetGlobal | OpCode::DefineGlobal | OpCode::SetGlobal => {
            constant_instruction(name_of(op), chunk, offset, out)
        }
        OpCode::GetLocal | OpCode::SetLocal => byte_instruction(name_of(op), chunk, offset, out),
        OpCode::Jump | OpCode::JumpIfFalse => jump_instruction(name_of(op), 1, chunk, offset, out),
        OpCode::Loop => jump_instruction(name_of(op), -1, chunk, offset, out),
        _ => {
            let _ = writeln!(out, "{}", name_of(op));
            offset + 1
        }
    }
}

fn name_of(op: OpCode) -> &'static str {
    match op {
        OpCode::Constant => "OP_CONSTANT",
        OpCode::Nil => "OP_NIL",
        OpCode::True => "OP_TRUE",
        OpCode::False => "OP_FALSE",
        OpCode::Pop => "OP_POP",
        OpCode::GetLocal => "OP_GET_LOCAL",
        OpCode::SetLocal => "OP_SET_LOCAL",
        OpCode::GetGlobal => "OP_GET_GLOBAL",
        OpCode::DefineGlobal => "OP_DEFINE_GLOBAL",
        OpCode::SetGlobal => "OP_SET_GLOBAL",
        OpCode::Equal => "OP_EQUAL",
        OpCode::Greater => "OP_GREATER",
        OpCode::Less => "OP_LESS",
        OpCode::Add => "OP_ADD",
        OpCode::Sub => "OP_SUB",
        OpCode::Mul => "OP_MUL",
        OpCode::Div => "OP_DIV",
        OpCode::Not => "OP_NOT",
        OpCode::Neg => "OP_NEG",
        OpCode::Print => "OP_PRINT",
        OpCode::Jump => "OP_JUMP",
        OpCode::JumpIfFalse => "OP_JUMP_IF_FALSE",
        OpCode::Loop => "OP_LOOP",
        OpCode::Return => "OP_RETURN",
    }
}

fn constant_instruction(name: &str, chunk: &Chunk, offset: usize, out: &mut String) -> usize {
    let index = chunk.code()[offset + 1];
    let _ = writeln!(out, "{:<16} {:4} '{}'", name, index, chunk.constant(index));
    offset + 2
}

fn byte_instruction(name: &str, chunk: &Chunk, offset: usize, out: &mut String) -> usize {
    let slot = chunk.code()[offset + 1];
    let _ = writeln!(out, "{:<16} {:4}", name, slot);
    offset + 2
}

fn jump_instruction(name: &str, sign: i64, chunk: &Chunk, offset: usize, out: &mut String) -> usize {
    let jump = u16::from_be_bytes([chunk.code()[offset + 1], chunk.code()[offset + 2]]);
    let target = offset as i64 + 3 + sign * i64::from(jump);
    let _ = writeln!(out, "{:<16} {:4} -> {}", name, offset, target);
    offset + 3
}
