//! Bytecode compiler - transforms AST into bytecode
//!
//! A single pass over the statement list emits into one [`Chunk`]. All
//! variables are globals addressed by a name constant. Forward jumps are
//! emitted with a placeholder operand and backpatched once the target is
//! known; loops jump back with `LOOP`.

use tracing::{debug, warn};

use crate::ast::{BinOp, Expr, ExprKind, Ident, Literal, Stmt, StmtKind, UnaryOp};

use super::chunk::Chunk;
use super::error::{CompileError, CompileErrorKind, CompileResult};
use super::opcode::OpCode;
use super::value::Value;

/// Compiler configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompilerOptions {
    /// Reject constructs the bytecode path does not implement instead of
    /// compiling them to nothing (a call compiles to `NIL`)
    pub strict: bool,
}

/// Bytecode compiler
#[derive(Debug, Default)]
pub struct Compiler {
    /// The chunk under construction
    chunk: Chunk,

    options: CompilerOptions,
}

impl Compiler {
    /// Create a new compiler
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new compiler with explicit options
    #[must_use]
    pub fn with_options(options: CompilerOptions) -> Self {
        Self {
            chunk: Chunk::new(),
            options,
        }
    }

    /// Compile a program to a chunk
    ///
    /// The first error aborts compilation and no chunk is produced.
    pub fn compile(mut self, program: &[Stmt]) -> CompileResult<Chunk> {
        for stmt in program {
            self.statement(stmt)?;
        }

        let line = program.last().map_or(0, |stmt| stmt.line);
        self.emit_op(OpCode::Return, line);

        debug!(
            bytes = self.chunk.len(),
            constants = self.chunk.constants().len(),
            "compiled program"
        );
        Ok(self.chunk)
    }

    // ===== Statement Compilation =====

    fn statement(&mut self, stmt: &Stmt) -> CompileResult<()> {
        let line = stmt.line;
        match &stmt.kind {
            StmtKind::Expression(expr) => {
                self.expression(expr)?;
                self.emit_op(OpCode::Pop, line);
            }

            StmtKind::Var {
                name, initializer, ..
            } => {
                match initializer {
                    Some(value) => self.expression(value)?,
                    None => self.emit_op(OpCode::Nil, name.line),
                }
                let index = self.identifier_constant(name)?;
                self.emit_op_u8(OpCode::DefineGlobal, index, name.line);
            }

            StmtKind::Print(expr) => {
                self.expression(expr)?;
                self.emit_op(OpCode::Print, line);
            }

            StmtKind::Input(name) => {
                self.emit_op(OpCode::Input, line);
                let index = self.identifier_constant(name)?;
                self.emit_op_u8(OpCode::SetGlobal, index, name.line);
                // SET_GLOBAL only peeks
                self.emit_op(OpCode::Pop, line);
            }

            StmtKind::Block(stmts) => {
                for stmt in stmts {
                    self.statement(stmt)?;
                }
            }

            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.expression(condition)?;
                let then_jump = self.emit_jump(OpCode::JumpIfFalse, line);
                self.emit_op(OpCode::Pop, line);
                self.statement(then_branch)?;

                let else_jump = self.emit_jump(OpCode::Jump, line);
                self.patch_jump(then_jump, line)?;
                self.emit_op(OpCode::Pop, line);
                if let Some(else_branch) = else_branch {
                    self.statement(else_branch)?;
                }
                self.patch_jump(else_jump, line)?;
            }

            StmtKind::While { condition, body } => {
                let loop_start = self.chunk.current_offset();
                self.expression(condition)?;
                let exit_jump = self.emit_jump(OpCode::JumpIfFalse, line);
                self.emit_op(OpCode::Pop, line);
                self.statement(body)?;
                self.emit_loop(loop_start, line)?;

                self.patch_jump(exit_jump, line)?;
                self.emit_op(OpCode::Pop, line);
            }

            StmtKind::Function(_) => self.unsupported("FUNCAO", line)?,
            StmtKind::Return(_) => self.unsupported("RETORNA", line)?,
            StmtKind::Break => self.unsupported("PAREI", line)?,
            StmtKind::Switch { .. } => self.unsupported("ESCOLHEAI", line)?,
        }
        Ok(())
    }

    /// Constructs without a bytecode lowering compile to nothing, or fail in strict mode
    fn unsupported(&self, construct: &'static str, line: u32) -> CompileResult<()> {
        if self.options.strict {
            return Err(CompileError::new(CompileErrorKind::Unsupported(construct), line));
        }
        warn!(line, construct, "construct has no bytecode lowering; compiled as a no-op");
        Ok(())
    }

    // ===== Expression Compilation =====

    fn expression(&mut self, expr: &Expr) -> CompileResult<()> {
        let line = expr.line;
        match &expr.kind {
            ExprKind::Literal(literal) => self.literal(literal, line)?,

            ExprKind::Grouping(inner) => self.expression(inner)?,

            ExprKind::Unary { op, operand } => {
                self.expression(operand)?;
                let op = match op {
                    UnaryOp::Neg => OpCode::Negate,
                    UnaryOp::Not => OpCode::Not,
                };
                self.emit_op(op, line);
            }

            ExprKind::Binary { left, op, right } => {
                self.expression(left)?;
                self.expression(right)?;
                self.binary_op(*op, line)?;
            }

            ExprKind::Variable(name) => {
                let index = self.identifier_constant(name)?;
                self.emit_op_u8(OpCode::GetGlobal, index, name.line);
            }

            ExprKind::Assign { name, value } => {
                self.expression(value)?;
                let index = self.identifier_constant(name)?;
                self.emit_op_u8(OpCode::SetGlobal, index, name.line);
            }

            ExprKind::Increment(name) => self.step(name, OpCode::Add)?,
            ExprKind::Decrement(name) => self.step(name, OpCode::Subtract)?,

            ExprKind::Call { .. } => {
                self.unsupported("Chamada de função", line)?;
                // The call still has to leave a value for its consumer
                self.emit_op(OpCode::Nil, line);
            }
        }
        Ok(())
    }

    fn literal(&mut self, literal: &Literal, line: u32) -> CompileResult<()> {
        let value = match literal {
            Literal::Nil => {
                self.emit_op(OpCode::Nil, line);
                return Ok(());
            }
            Literal::Bool(true) => {
                self.emit_op(OpCode::True, line);
                return Ok(());
            }
            Literal::Bool(false) => {
                self.emit_op(OpCode::False, line);
                return Ok(());
            }
            Literal::Int(i) => Value::Int(*i),
            Literal::Float(f) => Value::Float(*f),
            Literal::String(s) => Value::string(s),
        };
        self.emit_constant(value, line)
    }

    fn binary_op(&mut self, op: BinOp, line: u32) -> CompileResult<()> {
        match op {
            BinOp::Add => self.emit_op(OpCode::Add, line),
            BinOp::Sub => self.emit_op(OpCode::Subtract, line),
            BinOp::Mul => self.emit_op(OpCode::Multiply, line),
            BinOp::Div => self.emit_op(OpCode::Divide, line),
            BinOp::Eq => self.emit_op(OpCode::Equal, line),
            BinOp::Gt => self.emit_op(OpCode::Greater, line),
            BinOp::Lt => self.emit_op(OpCode::Less, line),
            BinOp::Ne => {
                self.emit_op(OpCode::Equal, line);
                self.emit_op(OpCode::Not, line);
            }
            BinOp::Le => {
                self.emit_op(OpCode::Greater, line);
                self.emit_op(OpCode::Not, line);
            }
            BinOp::Ge => {
                self.emit_op(OpCode::Less, line);
                self.emit_op(OpCode::Not, line);
            }
            BinOp::Mod => {
                return Err(CompileError::new(
                    CompileErrorKind::UnknownOperator(op.as_str()),
                    line,
                ))
            }
        }
        Ok(())
    }

    /// `++x` / `--x`: GET_GLOBAL x; CONSTANT 1; ADD|SUBTRACT; SET_GLOBAL x
    fn step(&mut self, name: &Ident, op: OpCode) -> CompileResult<()> {
        let line = name.line;
        let index = self.identifier_constant(name)?;
        self.emit_op_u8(OpCode::GetGlobal, index, line);
        self.emit_constant(Value::Int(1), line)?;
        self.emit_op(op, line);
        self.emit_op_u8(OpCode::SetGlobal, index, line);
        Ok(())
    }

    // ===== Bytecode Emission Helpers =====

    fn emit_op(&mut self, op: OpCode, line: u32) {
        self.chunk.write_op(op, line);
    }

    fn emit_op_u8(&mut self, op: OpCode, operand: u8, line: u32) {
        self.chunk.write_op_u8(op, operand, line);
    }

    fn emit_constant(&mut self, value: Value, line: u32) -> CompileResult<()> {
        let index = self.make_constant(value, line)?;
        self.emit_op_u8(OpCode::Constant, index, line);
        Ok(())
    }

    fn make_constant(&mut self, value: Value, line: u32) -> CompileResult<u8> {
        self.chunk
            .add_constant(value)
            .ok_or_else(|| CompileError::new(CompileErrorKind::TooManyConstants, line))
    }

    fn identifier_constant(&mut self, name: &Ident) -> CompileResult<u8> {
        self.make_constant(Value::string(&name.name), name.line)
    }

    fn emit_jump(&mut self, op: OpCode, line: u32) -> usize {
        self.chunk.emit_jump(op, line)
    }

    fn patch_jump(&mut self, offset: usize, line: u32) -> CompileResult<()> {
        self.chunk
            .patch_jump(offset)
            .map_err(|distance| CompileError::new(CompileErrorKind::JumpTooLarge(distance), line))
    }

    fn emit_loop(&mut self, loop_start: usize, line: u32) -> CompileResult<()> {
        self.chunk
            .emit_loop(loop_start, line)
            .map_err(|distance| CompileError::new(CompileErrorKind::LoopTooLarge(distance), line))
    }
}
