//! Runtime errors for the cpqp virtual machine and tree-walking interpreter

use thiserror::Error;

/// How execution continues after a runtime error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// Report the error and stop the run with failure
    Abort,

    /// Report the error, push `nil` in place of the result and keep going
    RecoverWithPlaceholder,
}

/// A runtime error that occurred during execution
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind} [linha {line}]")]
pub struct RuntimeError {
    /// The kind of error
    pub kind: RuntimeErrorKind,

    /// Source line of the instruction (or node) that failed
    pub line: u32,
}

impl RuntimeError {
    /// Create a new runtime error
    pub fn new(kind: RuntimeErrorKind, line: u32) -> Self {
        Self { kind, line }
    }

    /// The continuation policy for this error
    pub fn policy(&self) -> ErrorPolicy {
        self.kind.policy()
    }
}

/// The kind of runtime error
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeErrorKind {
    /// Arithmetic or comparison on non-numeric operands
    #[error("Operandos devem ser números para a operação '{operation}'.")]
    OperandsMustBeNumbers { operation: &'static str },

    /// Negation of a non-numeric operand
    #[error("Operando deve ser um número.")]
    OperandMustBeNumber,

    /// Integer division or remainder by zero
    #[error("Divisão por zero.")]
    DivisionByZero,

    /// Read or assignment of a variable that was never defined
    #[error("Variável '{0}' não definida.")]
    UndefinedVariable(String),

    /// Value is not callable
    #[error("Só é possível chamar funções (recebeu {0}).")]
    NotCallable(&'static str),

    /// Wrong number of arguments
    #[error("Esperava {expected} argumentos, mas recebeu {got}.")]
    ArityMismatch { expected: usize, got: usize },

    /// Too many nested function calls
    #[error("Profundidade máxima de chamadas ({0}) excedida.")]
    CallDepthExceeded(usize),

    /// `PAREI` outside of a loop or switch
    #[error("'PAREI' fora de um laço ou ESCOLHEAI.")]
    BreakOutsideLoop,

    /// `RETORNA` outside of a function
    #[error("'RETORNA' fora de uma função.")]
    ReturnOutsideFunction,

    /// The input source was closed or failed while reading
    #[error("Nenhuma entrada disponível: {0}")]
    InputUnavailable(String),

    /// Pop from an empty stack
    #[error("Pilha vazia (stack underflow).")]
    StackUnderflow,

    /// Byte that does not decode to an opcode
    #[error("Opcode inválido: {0}.")]
    InvalidOpcode(u8),

    /// Operand bytes missing at the end of the code
    #[error("Instrução {0} truncada.")]
    TruncatedInstruction(&'static str),

    /// Constant index outside the pool, or a name constant that is not a string
    #[error("Constante inválida no índice {0}.")]
    InvalidConstant(u8),

    /// Backward jump before the start of the code
    #[error("Salto para fora do código.")]
    InvalidJump,
}

impl RuntimeErrorKind {
    /// Which strategy applies when this error is raised inside the VM
    pub fn policy(&self) -> ErrorPolicy {
        match self {
            RuntimeErrorKind::OperandsMustBeNumbers { .. } | RuntimeErrorKind::OperandMustBeNumber => {
                ErrorPolicy::RecoverWithPlaceholder
            }
            _ => ErrorPolicy::Abort,
        }
    }
}

/// Result type for VM operations
pub type RuntimeResult<T> = Result<T, RuntimeError>;
