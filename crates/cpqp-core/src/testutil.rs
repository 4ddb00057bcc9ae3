//! Test utilities for cpqp
//!
//! This module provides common helpers for testing cpqp code: running a
//! program through either executor with captured output and scripted input.

use std::io::Cursor;

use crate::bytecode::{Chunk, Compiler};
use crate::interpreter::Interpreter;
use crate::parser::Parser;
use crate::vm::{with_output_capture, RuntimeError, VM};

/// Result type for test helpers
pub type TestResult<T> = Result<T, String>;

/// Everything observable about one run
#[derive(Debug)]
pub struct RunOutput {
    /// Lines printed by the program
    pub stdout: Vec<String>,

    /// Diagnostics written to the error channel
    pub stderr: Vec<String>,

    /// The run's own result
    pub result: Result<(), RuntimeError>,
}

impl RunOutput {
    /// Printed lines, failing if the run itself failed
    ///
    /// # Errors
    /// Returns the runtime error message if the run aborted
    pub fn lines(self) -> TestResult<Vec<String>> {
        self.result.map_err(|e| format!("Runtime error: {e}"))?;
        Ok(self.stdout)
    }
}

/// Parse and compile a program
///
/// # Errors
/// Returns error if parsing or compilation fails
pub fn compile(source: &str) -> TestResult<Chunk> {
    let program = Parser::parse_program(source).map_err(|e| format!("Parse error: {e:?}"))?;
    Compiler::new()
        .compile(&program)
        .map_err(|e| format!("Compile error: {e}"))
}

/// Compile a program and run it on the VM, feeding `input` to `LEIA`
///
/// # Errors
/// Returns error if parsing or compilation fails; runtime errors are in the output
pub fn run_vm(source: &str, input: &str) -> TestResult<RunOutput> {
    let chunk = compile(source)?;
    let mut vm = VM::with_input(Cursor::new(input.to_string()));
    let (result, output) = with_output_capture(|| vm.run(&chunk));
    Ok(RunOutput {
        stdout: output.stdout,
        stderr: output.stderr,
        result,
    })
}

/// Run a program on the tree-walking interpreter, feeding `input` to `LEIA`
///
/// # Errors
/// Returns error if parsing fails; runtime errors are in the output
pub fn run_tree(source: &str, input: &str) -> TestResult<RunOutput> {
    let program = Parser::parse_program(source).map_err(|e| format!("Parse error: {e:?}"))?;
    let mut interpreter = Interpreter::with_input(Cursor::new(input.to_string()));
    let (result, output) = with_output_capture(|| interpreter.interpret(&program));
    Ok(RunOutput {
        stdout: output.stdout,
        stderr: output.stderr,
        result,
    })
}

/// Run a program on the VM and return its printed lines
///
/// # Errors
/// Returns error if parsing, compilation, or execution fails
pub fn vm_lines(source: &str) -> TestResult<Vec<String>> {
    run_vm(source, "")?.lines()
}

/// Run a program on the tree-walking interpreter and return its printed lines
///
/// # Errors
/// Returns error if parsing or execution fails
pub fn tree_lines(source: &str) -> TestResult<Vec<String>> {
    run_tree(source, "")?.lines()
}

/// Run a program on the VM, expecting it to abort
///
/// # Errors
/// Returns error if the program fails to compile or runs to completion
pub fn expect_runtime_error(source: &str) -> TestResult<RuntimeError> {
    match run_vm(source, "")?.result {
        Ok(()) => Err("Expected runtime error, but execution succeeded".to_string()),
        Err(e) => Ok(e),
    }
}
