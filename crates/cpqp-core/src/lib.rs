//! cpqp Core - Language engine for the cpqp programming language
//!
//! This crate provides the core functionality:
//! - Lexer: Tokenization of source code
//! - AST: Abstract syntax tree definitions
//! - Parser: AST construction from token stream
//! - Bytecode: Instruction set, chunk and compiler
//! - VM: Bytecode execution
//! - Interpreter: Tree-walking execution of the full language
//! - HTML: AST visualization

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Lexer module - tokenization of cpqp source code
pub mod lexer;

/// Abstract Syntax Tree - parsed representation of cpqp source code
pub mod ast;

/// Parser module - converts tokens into AST
pub mod parser;

/// Bytecode module - instruction set and compiler
pub mod bytecode;

/// Virtual Machine module - bytecode execution
pub mod vm;

/// Tree-walking interpreter
pub mod interpreter;

/// AST to HTML rendering
pub mod html;

/// Test utilities - helpers for testing cpqp code
pub mod testutil;

/// Convenience re-export of lexer
pub use lexer::Lexer;

/// Convenience re-export of parser
pub use parser::Parser;

/// Convenience re-export of bytecode compiler
pub use bytecode::{Compiler, CompilerOptions};

/// Convenience re-export of VM
pub use vm::VM;

/// Convenience re-export of the tree-walking interpreter
pub use interpreter::Interpreter;

/// Convenience re-export of output capture utilities
pub use vm::{with_output_capture, OutputCapture};
