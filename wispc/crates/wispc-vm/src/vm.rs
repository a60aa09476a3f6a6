//! The dispatch loop and interpreter state.

use std::io::{self, Write};
use std::rc::Rc;

use wispc_core::{disasm, Chunk, Heap, OpCode, Table, Value, WispStr};
use wispc_par::compile;

use crate::InterpretError;

/// Operand stack capacity. The compiler's 256-local bound means well-formed
/// programs can get close; pushing past it is a runtime error, not UB.
pub const STACK_MAX: usize = 256;

/// A runtime failure caught mid-dispatch: the message plus the offset of
/// the faulting instruction, from which the source line is recovered.
struct RuntimeError {
    message: String,
    offset: usize,
}

/// The virtual machine.
///
/// Generic over its output sink so tests can capture what `print` writes;
/// [`Vm::new`] wires it to stdout. Diagnostics always go to stderr.
pub struct Vm<W: Write> {
    heap: Heap,
    globals: Table,
    stack: Vec<Value>,
    out: W,
    trace: bool,
}

impl Vm<io::Stdout> {
    pub fn new() -> Vm<io::Stdout> {
        Vm::with_output(io::stdout())
    }
}

impl Default for Vm<io::Stdout> {
    fn default() -> Self {
        Vm::new()
    }
}

impl<W: Write> Vm<W> {
    pub fn with_output(out: W) -> Vm<W> {
        Vm {
            heap: Heap::new(),
            globals: Table::new(),
            stack: Vec::with_capacity(STACK_MAX),
            out,
            trace: false,
        }
    }

    /// Dump the compiled chunk and trace every dispatch step to stderr.
    pub fn set_trace(&mut self, trace: bool) {
        self.trace = trace;
    }

    /// The output sink, for callers that captured it.
    pub fn output(&self) -> &W {
        &self.out
    }

    /// Compile and run one source string. The chunk lives only for this
    /// call; interned strings and globals persist in the VM.
    pub fn interpret(&mut self, source: &str) -> Result<(), InterpretError> {
        let chunk = compile(source, &mut self.heap).map_err(|_| InterpretError::Compile)?;

        if self.trace {
            eprint!("{}", disasm::disassemble(&chunk, "code"));
        }

        match self.run(&chunk) {
            Ok(()) => Ok(()),
            Err(error) => {
                eprintln!("{}", error.message);
                eprintln!("[line {}] in script", chunk.line(error.offset));
                self.stack.clear();
                Err(InterpretError::Runtime)
            }
        }
    }

    fn run(&mut self, chunk: &Chunk) -> Result<(), RuntimeError> {
        let code = chunk.code();
        let mut ip = 0usize;

        loop {
            if self.trace {
                self.trace_step(chunk, ip);
            }

            // The offset of the opcode byte; its operands share its line.
            let at = ip;
            let byte = code[ip];
            ip += 1;

            let op = OpCode::try_from(byte).map_err(|_| RuntimeError {
                message: format!("Unknown opcode {}.", byte),
                offset: at,
            })?;

            match op {
                OpCode::Constant => {
                    let index = code[ip];
                    ip += 1;
                    let value = chunk.constant(index).clone();
                    self.push(value, at)?;
                }
                OpCode::Nil => self.push(Value::Nil, at)?,
                OpCode::True => self.push(Value::Bool(true), at)?,
                OpCode::False => self.push(Value::Bool(false), at)?,
                OpCode::Pop => {
                    self.pop();
                }
                OpCode::GetLocal => {
                    let slot = code[ip] as usize;
                    ip += 1;
                    // Locals live at fixed stack slots below the working
                    // area; re-pushing keeps every other opcode looking
                    // only at the top.
                    let value = self.stack[slot].clone();
                    self.push(value, at)?;
                }
                OpCode::SetLocal => {
                    let slot = code[ip] as usize;
                    ip += 1;
                    self.stack[slot] = self.peek(0).clone();
                }
                OpCode::GetGlobal => {
                    let name = self.global_name(chunk, code[ip]);
                    ip += 1;
                    match self.globals.get(&name) {
                        Some(value) => {
                            let value = value.clone();
                            self.push(value, at)?;
                        }
                        None => return Err(undefined_variable(&name, at)),
                    }
                }
                OpCode::DefineGlobal => {
                    let name = self.global_name(chunk, code[ip]);
                    ip += 1;
                    let value = self.peek(0).clone();
                    self.globals.set(name, value);
                    self.pop();
                }
                OpCode::SetGlobal => {
                    let name = self.global_name(chunk, code[ip]);
                    ip += 1;
                    let value = self.peek(0).clone();
                    // Assignment must not create a variable. A true result
                    // means the name was new: undo the insert and fail.
                    if self.globals.set(Rc::clone(&name), value) {
                        self.globals.delete(&name);
                        return Err(undefined_variable(&name, at));
                    }
                }
                OpCode::Equal => {
                    let rhs = self.pop();
                    let lhs = self.pop();
                    self.push(Value::Bool(lhs == rhs), at)?;
                }
                OpCode::Greater => {
                    let (lhs, rhs) = self.numeric_operands(at, "Operands must be numbers.")?;
                    self.push(Value::Bool(lhs > rhs), at)?;
                }
                OpCode::Less => {
                    let (lhs, rhs) = self.numeric_operands(at, "Operands must be numbers.")?;
                    self.push(Value::Bool(lhs < rhs), at)?;
                }
                OpCode::Add => self.add(at)?,
                OpCode::Sub => {
                    let (lhs, rhs) = self.numeric_operands(at, "Operands must be numbers.")?;
                    self.push(Value::Number(lhs - rhs), at)?;
                }
                OpCode::Mul => {
                    let (lhs, rhs) = self.numeric_operands(at, "Operands must be numbers.")?;
                    self.push(Value::Number(lhs * rhs), at)?;
                }
                OpCode::Div => {
                    let (lhs, rhs) = self.numeric_operands(at, "Operands must be numbers.")?;
                    self.push(Value::Number(lhs / rhs), at)?;
                }
                OpCode::Not => {
                    let value = self.pop();
                    self.push(Value::Bool(value.is_falsy()), at)?;
                }
                OpCode::Neg => {
                    if self.peek(0).as_number().is_none() {
                        return Err(RuntimeError {
                            message: "Operand must be a number.".to_string(),
                            offset: at,
                        });
                    }
                    let value = self.pop();
                    if let Some(number) = value.as_number() {
                        self.push(Value::Number(-number), at)?;
                    }
                }
                OpCode::Print => {
                    let value = self.pop();
                    let _ = writeln!(self.out, "{}", value);
                }
                OpCode::Jump => {
                    let offset = read_short(code, &mut ip);
                    ip += offset as usize;
                }
                OpCode::JumpIfFalse => {
                    let offset = read_short(code, &mut ip);
                    if self.peek(0).is_falsy() {
                        ip += offset as usize;
                    }
                }
                OpCode::Loop => {
                    let offset = read_short(code, &mut ip);
                    ip -= offset as usize;
                }
                OpCode::Return => return Ok(()),
            }
        }
    }

    /// `ADD` is the one polymorphic operator: two numbers add, two strings
    /// concatenate (through the interner), anything else is an error.
    fn add(&mut self, at: usize) -> Result<(), RuntimeError> {
        let concatenated = match (self.peek(1).as_str(), self.peek(0).as_str()) {
            (Some(lhs), Some(rhs)) => {
                let mut buffer = String::with_capacity(lhs.len() + rhs.len());
                buffer.push_str(lhs.as_str());
                buffer.push_str(rhs.as_str());
                Some(buffer)
            }
            _ => None,
        };

        if let Some(buffer) = concatenated {
            self.pop();
            self.pop();
            let result = self.heap.intern_owned(buffer);
            return self.push(Value::Str(result), at);
        }

        match (self.peek(1).as_number(), self.peek(0).as_number()) {
            (Some(lhs), Some(rhs)) => {
                self.pop();
                self.pop();
                self.push(Value::Number(lhs + rhs), at)
            }
            _ => Err(RuntimeError {
                message: "Operands must be two numbers or two strings.".to_string(),
                offset: at,
            }),
        }
    }

    /// Type-check the top two values as numbers before popping either, so
    /// a failure leaves the stack intact for the error report.
    fn numeric_operands(&mut self, at: usize, message: &str) -> Result<(f64, f64), RuntimeError> {
        let rhs = self.peek(0).as_number();
        let lhs = self.peek(1).as_number();
        match (lhs, rhs) {
            (Some(lhs), Some(rhs)) => {
                self.pop();
                self.pop();
                Ok((lhs, rhs))
            }
            _ => Err(RuntimeError {
                message: message.to_string(),
                offset: at,
            }),
        }
    }

    fn push(&mut self, value: Value, at: usize) -> Result<(), RuntimeError> {
        if self.stack.len() == STACK_MAX {
            return Err(RuntimeError {
                message: "Stack overflow.".to_string(),
                offset: at,
            });
        }
        self.stack.push(value);
        Ok(())
    }

    fn pop(&mut self) -> Value {
        self.stack.pop().expect("operand stack underflow")
    }

    fn peek(&self, distance: usize) -> &Value {
        &self.stack[self.stack.len() - 1 - distance]
    }

    /// Global-access operands index a string in the constant pool.
    fn global_name(&self, chunk: &Chunk, index: u8) -> Rc<WispStr> {
        let name = chunk
            .constant(index)
            .as_str()
            .expect("global operand names a string constant");
        Rc::clone(name)
    }

    fn trace_step(&self, chunk: &Chunk, ip: usize) {
        let mut stack_line = String::from("          ");
        for value in &self.stack {
            stack_line.push_str(&format!("[ {} ]", value));
        }
        eprintln!("{}", stack_line);
        let mut listing = String::new();
        disasm::disassemble_instruction(chunk, ip, &mut listing);
        eprint!("{}", listing);
    }
}

fn undefined_variable(name: &WispStr, at: usize) -> RuntimeError {
    RuntimeError {
        message: format!("Undefined variable '{}'.", name.as_str()),
        offset: at,
    }
}

fn read_short(code: &[u8], ip: &mut usize) -> u16 {
    let value = u16::from_be_bytes([code[*ip], code[*ip + 1]]);
    *ip += 2;
    value
}
