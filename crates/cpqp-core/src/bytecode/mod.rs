//! Bytecode module for the cpqp virtual machine
//!
//! This module provides:
//! - `OpCode`: The bytecode instruction set
//! - `Value`: Runtime value representation
//! - `Chunk`: A sequence of bytecode instructions
//! - `Compiler`: AST to bytecode compilation
//! - Disassembler utilities for debugging

mod chunk;
mod compiler;
mod debug;
mod error;
mod opcode;
mod value;

pub use chunk::{Chunk, MAX_CONSTANTS, MAX_JUMP};
pub use compiler::{Compiler, CompilerOptions};
pub use debug::{disassemble_chunk, disassemble_instruction};
pub use error::{CompileError, CompileErrorKind, CompileResult};
pub use opcode::OpCode;
pub use value::Value;
