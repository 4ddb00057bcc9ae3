//! Compiler error types

use thiserror::Error;

use super::chunk::{MAX_CONSTANTS, MAX_JUMP};

/// A compilation error
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind} [linha {line}]")]
pub struct CompileError {
    /// The kind of error
    pub kind: CompileErrorKind,

    /// Source line of the node being compiled
    pub line: u32,
}

impl CompileError {
    /// Create a new compile error
    #[must_use]
    pub fn new(kind: CompileErrorKind, line: u32) -> Self {
        Self { kind, line }
    }
}

/// The kind of compilation error
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompileErrorKind {
    /// More than 256 constants in one chunk
    #[error("Constantes demais em um único programa (máximo {MAX_CONSTANTS}).")]
    TooManyConstants,

    /// Forward jump distance does not fit in 16 bits
    #[error("Salto grande demais ({0} bytes, máximo {MAX_JUMP}).")]
    JumpTooLarge(usize),

    /// Backward loop distance does not fit in 16 bits
    #[error("Corpo do laço grande demais ({0} bytes, máximo {MAX_JUMP}).")]
    LoopTooLarge(usize),

    /// Operator with no bytecode lowering
    #[error("Operador '{0}' não suportado pelo compilador.")]
    UnknownOperator(&'static str),

    /// Construct the bytecode path does not implement (strict mode only)
    #[error("{0} não é suportado pelo compilador de bytecode.")]
    Unsupported(&'static str),
}

/// Result type for compilation
pub type CompileResult<T> = Result<T, CompileError>;
