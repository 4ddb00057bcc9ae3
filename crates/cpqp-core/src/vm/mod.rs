//! Virtual Machine for the cpqp programming language
//!
//! This module provides a stack-based bytecode interpreter that executes a
//! compiled [`Chunk`]. Variables live in a name-keyed global table; there
//! are no call frames.

mod error;
pub(crate) mod ops;
mod output;

pub use error::{ErrorPolicy, RuntimeError, RuntimeErrorKind, RuntimeResult};
pub use output::{with_output_capture, OutputCapture};

pub(crate) use output::{write_error, write_line, write_prompt};

use std::collections::HashMap;
use std::fmt;
use std::io::{self, BufRead};

use tracing::{debug, trace, warn};

use crate::bytecode::{disassemble_instruction, Chunk, OpCode, Value};

/// Prompt shown before reading from stdin
const INPUT_PROMPT: &str = "> ";

/// What the dispatch loop does after an instruction
enum Flow {
    Continue,
    Halt,
}

/// The cpqp virtual machine
pub struct VM {
    /// Value stack
    stack: Vec<Value>,

    /// Global variables
    globals: HashMap<String, Value>,

    /// Instruction pointer into the running chunk
    ip: usize,

    /// Source for `INPUT`
    input: Box<dyn BufRead>,

    /// Whether to show a prompt before each read
    prompt: bool,

    /// Degraded errors reported during the last run
    diagnostics: Vec<RuntimeError>,
}

impl VM {
    /// Create a new VM reading input from stdin
    #[must_use]
    pub fn new() -> Self {
        let mut vm = Self::with_input(io::BufReader::new(io::stdin()));
        vm.prompt = true;
        vm
    }

    /// Create a new VM reading input from `input`, without prompting
    #[must_use]
    pub fn with_input(input: impl BufRead + 'static) -> Self {
        Self {
            stack: Vec::new(),
            globals: HashMap::new(),
            ip: 0,
            input: Box::new(input),
            prompt: false,
            diagnostics: Vec::new(),
        }
    }

    /// Execute a compiled chunk
    ///
    /// The stack, globals and diagnostics are reset first. Type errors are
    /// reported on the error channel and execution continues with `nil` in
    /// place of the result; every other error stops the run and is returned.
    pub fn run(&mut self, chunk: &Chunk) -> RuntimeResult<()> {
        self.stack.clear();
        self.globals.clear();
        self.diagnostics.clear();
        self.ip = 0;

        loop {
            let Some(byte) = chunk.read_byte(self.ip) else {
                debug!(ip = self.ip, "VM ran off the end of the chunk");
                return Ok(());
            };
            trace!(stack = ?self.stack, "{}", disassemble_instruction(chunk, self.ip));
            self.ip += 1;

            let flow = OpCode::try_from(byte)
                .map_err(RuntimeErrorKind::InvalidOpcode)
                .and_then(|op| self.execute(chunk, op));

            match flow {
                Ok(Flow::Continue) => {}
                Ok(Flow::Halt) => {
                    debug!(stack = self.stack.len(), "VM finished");
                    return Ok(());
                }
                Err(kind) => self.fail(chunk, kind)?,
            }
        }
    }

    /// Apply the error's policy: recover in place, or stop the run
    fn fail(&mut self, chunk: &Chunk, kind: RuntimeErrorKind) -> RuntimeResult<()> {
        let error = RuntimeError::new(kind, chunk.get_line(self.ip.saturating_sub(1)));
        match error.policy() {
            ErrorPolicy::Abort => Err(error),
            ErrorPolicy::RecoverWithPlaceholder => {
                warn!(line = error.line, "{}", error.kind);
                write_error(&error.to_string());
                self.diagnostics.push(error);
                self.stack.push(Value::Nil);
                Ok(())
            }
        }
    }

    /// Execute one decoded instruction
    fn execute(&mut self, chunk: &Chunk, op: OpCode) -> Result<Flow, RuntimeErrorKind> {
        match op {
            OpCode::Return => return Ok(Flow::Halt),

            OpCode::Constant => {
                let index = self.read_u8(chunk, op)?;
                let value = chunk
                    .get_constant(index)
                    .cloned()
                    .ok_or(RuntimeErrorKind::InvalidConstant(index))?;
                self.stack.push(value);
            }

            OpCode::Pop => {
                self.pop()?;
            }

            OpCode::Nil => self.stack.push(Value::Nil),
            OpCode::True => self.stack.push(Value::Bool(true)),
            OpCode::False => self.stack.push(Value::Bool(false)),

            OpCode::Negate => {
                let value = self.pop()?;
                self.stack.push(ops::negate(&value)?);
            }

            OpCode::Not => {
                let value = self.pop()?;
                self.stack.push(Value::Bool(!value.is_truthy()));
            }

            OpCode::Add => self.binary_op(ops::add)?,
            OpCode::Subtract => self.binary_op(ops::subtract)?,
            OpCode::Multiply => self.binary_op(ops::multiply)?,
            OpCode::Divide => self.binary_op(ops::divide)?,
            OpCode::Greater => self.binary_op(ops::greater)?,
            OpCode::Less => self.binary_op(ops::less)?,
            OpCode::Equal => self.binary_op(|a, b| Ok(ops::equal(a, b)))?,

            OpCode::DefineGlobal => {
                let name = self.read_name(chunk, op)?;
                let value = self.pop()?;
                self.globals.insert(name, value);
            }

            OpCode::GetGlobal => {
                let name = self.read_name(chunk, op)?;
                let value = self
                    .globals
                    .get(&name)
                    .cloned()
                    .ok_or(RuntimeErrorKind::UndefinedVariable(name))?;
                self.stack.push(value);
            }

            OpCode::SetGlobal => {
                let name = self.read_name(chunk, op)?;
                // Assignment is an expression: the value stays on the stack
                let value = self.peek()?.clone();
                match self.globals.get_mut(&name) {
                    Some(slot) => *slot = value,
                    None => return Err(RuntimeErrorKind::UndefinedVariable(name)),
                }
            }

            // Reserved; the compiler never emits them
            OpCode::GetLocal | OpCode::SetLocal => {
                return Err(RuntimeErrorKind::InvalidOpcode(op as u8));
            }

            OpCode::Jump => {
                let offset = self.read_u16(chunk, op)?;
                self.ip += usize::from(offset);
            }

            OpCode::JumpIfFalse => {
                let offset = self.read_u16(chunk, op)?;
                if !self.peek()?.is_truthy() {
                    self.ip += usize::from(offset);
                }
            }

            OpCode::Loop => {
                let offset = self.read_u16(chunk, op)?;
                self.ip = self
                    .ip
                    .checked_sub(usize::from(offset))
                    .ok_or(RuntimeErrorKind::InvalidJump)?;
            }

            OpCode::Print => {
                let value = self.pop()?;
                write_line(&value.to_string());
            }

            OpCode::Input => {
                let value = self.read_input()?;
                self.stack.push(value);
            }
        }
        Ok(Flow::Continue)
    }

    // ===== Stack operations =====

    fn pop(&mut self) -> Result<Value, RuntimeErrorKind> {
        self.stack.pop().ok_or(RuntimeErrorKind::StackUnderflow)
    }

    fn peek(&self) -> Result<&Value, RuntimeErrorKind> {
        self.stack.last().ok_or(RuntimeErrorKind::StackUnderflow)
    }

    /// Pop right, pop left, push `op(left, right)`
    fn binary_op(
        &mut self,
        op: impl FnOnce(&Value, &Value) -> Result<Value, RuntimeErrorKind>,
    ) -> Result<(), RuntimeErrorKind> {
        let right = self.pop()?;
        let left = self.pop()?;
        self.stack.push(op(&left, &right)?);
        Ok(())
    }

    // ===== Bytecode reading =====

    fn read_u8(&mut self, chunk: &Chunk, op: OpCode) -> Result<u8, RuntimeErrorKind> {
        let byte = chunk
            .read_byte(self.ip)
            .ok_or(RuntimeErrorKind::TruncatedInstruction(op.name()))?;
        self.ip += 1;
        Ok(byte)
    }

    fn read_u16(&mut self, chunk: &Chunk, op: OpCode) -> Result<u16, RuntimeErrorKind> {
        let value = chunk
            .read_u16(self.ip)
            .ok_or(RuntimeErrorKind::TruncatedInstruction(op.name()))?;
        self.ip += 2;
        Ok(value)
    }

    /// Read a constant index whose constant must be a variable name
    fn read_name(&mut self, chunk: &Chunk, op: OpCode) -> Result<String, RuntimeErrorKind> {
        let index = self.read_u8(chunk, op)?;
        match chunk.get_constant(index) {
            Some(Value::String(name)) => Ok(name.to_string()),
            _ => Err(RuntimeErrorKind::InvalidConstant(index)),
        }
    }

    fn read_input(&mut self) -> Result<Value, RuntimeErrorKind> {
        if self.prompt {
            write_prompt(INPUT_PROMPT);
        }
        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) => Err(RuntimeErrorKind::InputUnavailable("fim da entrada".to_string())),
            Ok(_) => {
                let line = line.strip_suffix('\n').unwrap_or(&line);
                let line = line.strip_suffix('\r').unwrap_or(line);
                Ok(Value::from_input(line))
            }
            Err(e) => Err(RuntimeErrorKind::InputUnavailable(e.to_string())),
        }
    }

    // ===== Inspection =====

    /// Global variables left by the last run
    pub fn globals(&self) -> &HashMap<String, Value> {
        &self.globals
    }

    /// Value stack left by the last run
    pub fn stack(&self) -> &[Value] {
        &self.stack
    }

    /// Degraded errors reported during the last run
    pub fn diagnostics(&self) -> &[RuntimeError] {
        &self.diagnostics
    }
}

impl Default for VM {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for VM {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VM")
            .field("ip", &self.ip)
            .field("stack", &self.stack)
            .field("globals", &self.globals.len())
            .finish_non_exhaustive()
    }
}
