//! Tree-walking interpreter for the cpqp language
//!
//! Executes the AST directly, with lexical scopes and user functions that the
//! bytecode path does not support. Values, operators and stringification are
//! the VM's, so both executors agree on every expression they share.
//!
//! Non-local control flow (`RETORNA`, `PAREI`) travels back up the evaluator
//! as a [`Completion`] value.

mod environment;

pub use environment::Environment;

use std::cell::RefCell;
use std::fmt;
use std::io::{self, BufRead};
use std::rc::Rc;

use tracing::debug;

use crate::ast::{BinOp, Expr, ExprKind, FunctionDecl, Ident, Literal, Stmt, StmtKind, UnaryOp};
use crate::bytecode::Value;
use crate::parser::Parser;
use crate::vm::{ops, write_line, write_prompt, RuntimeError, RuntimeErrorKind, RuntimeResult};

/// Maximum depth of nested function calls
///
/// Each cpqp call costs several evaluator frames of native stack. The limit
/// assumes an 8 MB stack (the main-thread default) in debug builds; smaller
/// threads overflow before it is reached.
const MAX_CALL_DEPTH: usize = 256;

/// Prompt shown before reading from stdin
const INPUT_PROMPT: &str = "> ";

/// How a statement finished
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    /// Fell through to the next statement
    Normal,

    /// `RETORNA` with its value
    Return(Value),

    /// `PAREI`
    Break,
}

/// A user function together with the scope it was declared in
pub struct Function {
    decl: Rc<FunctionDecl>,
    closure: Rc<RefCell<Environment>>,
}

impl Function {
    /// The declared name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.decl.name.name
    }

    /// Number of declared parameters
    #[must_use]
    pub fn arity(&self) -> usize {
        self.decl.params.len()
    }
}

impl fmt::Debug for Function {
    // The closure can reach this function again, so it is not printed
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.name())
            .field("arity", &self.arity())
            .finish_non_exhaustive()
    }
}

/// The tree-walking interpreter
///
/// Globals persist across calls to [`Interpreter::interpret`], which is what
/// the REPL relies on.
pub struct Interpreter {
    globals: Rc<RefCell<Environment>>,
    environment: Rc<RefCell<Environment>>,
    input: Box<dyn BufRead>,
    prompt: bool,
    /// Enclosing loops and switches that a `PAREI` may leave
    breakable_depth: usize,
    /// Active function calls
    call_depth: usize,
}

impl Interpreter {
    /// Create an interpreter reading input from stdin
    #[must_use]
    pub fn new() -> Self {
        let mut interpreter = Self::with_input(io::BufReader::new(io::stdin()));
        interpreter.prompt = true;
        interpreter
    }

    /// Create an interpreter reading input from `input`, without prompting
    #[must_use]
    pub fn with_input(input: impl BufRead + 'static) -> Self {
        let globals = Rc::new(RefCell::new(Environment::new()));
        Self {
            environment: Rc::clone(&globals),
            globals,
            input: Box::new(input),
            prompt: false,
            breakable_depth: 0,
            call_depth: 0,
        }
    }

    /// Execute a program, stopping at the first runtime error
    pub fn interpret(&mut self, program: &[Stmt]) -> RuntimeResult<()> {
        self.environment = Rc::clone(&self.globals);
        self.breakable_depth = 0;
        self.call_depth = 0;

        for stmt in program {
            self.execute(stmt)?;
        }
        debug!(statements = program.len(), "interpreter finished");
        Ok(())
    }

    /// Evaluate a single expression in the global scope
    pub fn evaluate(&mut self, expr: &Expr) -> RuntimeResult<Value> {
        self.environment = Rc::clone(&self.globals);
        self.expression(expr)
    }

    /// Look up a global variable
    #[must_use]
    pub fn global(&self, name: &str) -> Option<Value> {
        self.globals.borrow().get(name)
    }

    // ===== Statements =====

    fn execute(&mut self, stmt: &Stmt) -> RuntimeResult<Completion> {
        let line = stmt.line;
        match &stmt.kind {
            StmtKind::Print(expr) => {
                let value = self.expression(expr)?;
                write_line(&value.to_string());
            }

            StmtKind::Var {
                name, initializer, ..
            } => {
                let value = match initializer {
                    Some(expr) => self.expression(expr)?,
                    None => Value::Nil,
                };
                self.environment.borrow_mut().define(name.name.clone(), value);
            }

            StmtKind::Function(decl) => {
                let function = Function {
                    decl: Rc::clone(decl),
                    closure: Rc::clone(&self.environment),
                };
                self.environment
                    .borrow_mut()
                    .define(decl.name.name.clone(), Value::Function(Rc::new(function)));
            }

            StmtKind::Return(value) => {
                if self.call_depth == 0 {
                    return Err(RuntimeError::new(RuntimeErrorKind::ReturnOutsideFunction, line));
                }
                let value = match value {
                    Some(expr) => self.expression(expr)?,
                    None => Value::Nil,
                };
                return Ok(Completion::Return(value));
            }

            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.expression(condition)?.is_truthy() {
                    return self.execute(then_branch);
                } else if let Some(else_branch) = else_branch {
                    return self.execute(else_branch);
                }
            }

            StmtKind::Block(stmts) => {
                let scope = Environment::with_enclosing(Rc::clone(&self.environment));
                return self.execute_block(stmts, scope);
            }

            StmtKind::Expression(expr) => {
                self.expression(expr)?;
            }

            StmtKind::While { condition, body } => {
                return self.breakable(|this| {
                    while this.expression(condition)?.is_truthy() {
                        match this.execute(body)? {
                            Completion::Normal => {}
                            Completion::Break => break,
                            ret @ Completion::Return(_) => return Ok(ret),
                        }
                    }
                    Ok(Completion::Normal)
                });
            }

            StmtKind::Break => {
                if self.breakable_depth == 0 {
                    return Err(RuntimeError::new(RuntimeErrorKind::BreakOutsideLoop, line));
                }
                return Ok(Completion::Break);
            }

            StmtKind::Switch {
                subject,
                cases,
                default,
            } => {
                let subject = self.expression(subject)?;
                let mut body = default.as_deref();
                for case in cases {
                    if self.expression(&case.value)? == subject {
                        body = Some(&case.body);
                        break;
                    }
                }
                if let Some(body) = body {
                    return self.breakable(|this| match this.execute(body)? {
                        Completion::Break => Ok(Completion::Normal),
                        other => Ok(other),
                    });
                }
            }

            StmtKind::Input(name) => {
                let line_text = self.read_line(line)?;
                let value = self.input_value(&line_text);
                self.assign(name, value)?;
            }
        }
        Ok(Completion::Normal)
    }

    /// Run `stmts` in `scope`, restoring the current scope afterwards
    fn execute_block(&mut self, stmts: &[Stmt], scope: Environment) -> RuntimeResult<Completion> {
        let previous = std::mem::replace(&mut self.environment, Rc::new(RefCell::new(scope)));
        let mut result = Ok(Completion::Normal);
        for stmt in stmts {
            match self.execute(stmt) {
                Ok(Completion::Normal) => {}
                other => {
                    result = other;
                    break;
                }
            }
        }
        self.environment = previous;
        result
    }

    /// Run `f` with `PAREI` allowed
    fn breakable(
        &mut self,
        f: impl FnOnce(&mut Self) -> RuntimeResult<Completion>,
    ) -> RuntimeResult<Completion> {
        self.breakable_depth += 1;
        let result = f(self);
        self.breakable_depth -= 1;
        result
    }

    fn read_line(&mut self, line: u32) -> RuntimeResult<String> {
        if self.prompt {
            write_prompt(INPUT_PROMPT);
        }
        let mut text = String::new();
        let unavailable = |reason: String| {
            RuntimeError::new(RuntimeErrorKind::InputUnavailable(reason), line)
        };
        match self.input.read_line(&mut text) {
            Ok(0) => Err(unavailable("fim da entrada".to_string())),
            Ok(_) => {
                let trimmed = text.strip_suffix('\n').unwrap_or(&text);
                Ok(trimmed.strip_suffix('\r').unwrap_or(trimmed).to_string())
            }
            Err(e) => Err(unavailable(e.to_string())),
        }
    }

    /// An input line that is a valid expression takes that expression's value;
    /// anything else is coerced like the VM does
    fn input_value(&mut self, text: &str) -> Value {
        Parser::parse_expression(text)
            .ok()
            .and_then(|expr| self.expression(&expr).ok())
            .unwrap_or_else(|| Value::from_input(text))
    }

    // ===== Expressions =====

    fn expression(&mut self, expr: &Expr) -> RuntimeResult<Value> {
        let line = expr.line;
        let at_line = |kind: RuntimeErrorKind| RuntimeError::new(kind, line);

        match &expr.kind {
            ExprKind::Literal(literal) => Ok(match literal {
                Literal::Nil => Value::Nil,
                Literal::Bool(b) => Value::Bool(*b),
                Literal::Int(i) => Value::Int(*i),
                Literal::Float(f) => Value::Float(*f),
                Literal::String(s) => Value::string(s),
            }),

            ExprKind::Grouping(inner) => self.expression(inner),

            ExprKind::Unary { op, operand } => {
                let value = self.expression(operand)?;
                match op {
                    UnaryOp::Neg => ops::negate(&value).map_err(at_line),
                    UnaryOp::Not => Ok(Value::Bool(!value.is_truthy())),
                }
            }

            ExprKind::Binary { left, op, right } => {
                let left = self.expression(left)?;
                let right = self.expression(right)?;
                binary(*op, &left, &right).map_err(at_line)
            }

            ExprKind::Variable(name) => self.lookup(name),

            ExprKind::Assign { name, value } => {
                let value = self.expression(value)?;
                self.assign(name, value.clone())?;
                Ok(value)
            }

            ExprKind::Increment(name) => {
                let value = ops::add(&self.lookup(name)?, &Value::Int(1)).map_err(at_line)?;
                self.assign(name, value.clone())?;
                Ok(value)
            }

            ExprKind::Decrement(name) => {
                let value = ops::subtract(&self.lookup(name)?, &Value::Int(1)).map_err(at_line)?;
                self.assign(name, value.clone())?;
                Ok(value)
            }

            ExprKind::Call { callee, args } => {
                let callee = self.expression(callee)?;
                let function = match callee {
                    Value::Function(function) => function,
                    other => return Err(at_line(RuntimeErrorKind::NotCallable(other.type_name()))),
                };

                let mut arguments = Vec::with_capacity(args.len());
                for arg in args {
                    arguments.push(self.expression(arg)?);
                }
                if arguments.len() != function.arity() {
                    return Err(at_line(RuntimeErrorKind::ArityMismatch {
                        expected: function.arity(),
                        got: arguments.len(),
                    }));
                }
                self.call(&function, arguments, line)
            }
        }
    }

    fn call(&mut self, function: &Function, arguments: Vec<Value>, line: u32) -> RuntimeResult<Value> {
        if self.call_depth >= MAX_CALL_DEPTH {
            return Err(RuntimeError::new(
                RuntimeErrorKind::CallDepthExceeded(MAX_CALL_DEPTH),
                line,
            ));
        }

        let mut scope = Environment::with_enclosing(Rc::clone(&function.closure));
        for (param, value) in function.decl.params.iter().zip(arguments) {
            scope.define(param.name.clone(), value);
        }

        // A PAREI in the body cannot reach a loop around the call
        let breakable_depth = std::mem::take(&mut self.breakable_depth);
        self.call_depth += 1;
        let result = self.execute_block(&function.decl.body, scope);
        self.call_depth -= 1;
        self.breakable_depth = breakable_depth;

        match result? {
            Completion::Return(value) => Ok(value),
            Completion::Normal | Completion::Break => Ok(Value::Nil),
        }
    }

    fn lookup(&self, name: &Ident) -> RuntimeResult<Value> {
        self.environment.borrow().get(&name.name).ok_or_else(|| {
            RuntimeError::new(RuntimeErrorKind::UndefinedVariable(name.name.clone()), name.line)
        })
    }

    fn assign(&mut self, name: &Ident, value: Value) -> RuntimeResult<()> {
        if self.environment.borrow_mut().assign(&name.name, value) {
            Ok(())
        } else {
            Err(RuntimeError::new(
                RuntimeErrorKind::UndefinedVariable(name.name.clone()),
                name.line,
            ))
        }
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Interpreter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interpreter")
            .field("call_depth", &self.call_depth)
            .finish_non_exhaustive()
    }
}

fn binary(op: BinOp, left: &Value, right: &Value) -> Result<Value, RuntimeErrorKind> {
    match op {
        BinOp::Add => ops::add(left, right),
        BinOp::Sub => ops::subtract(left, right),
        BinOp::Mul => ops::multiply(left, right),
        BinOp::Div => ops::divide(left, right),
        BinOp::Mod => ops::remainder(left, right),
        BinOp::Eq => Ok(ops::equal(left, right)),
        BinOp::Ne => Ok(Value::Bool(left != right)),
        BinOp::Gt => ops::greater(left, right),
        BinOp::Lt => ops::less(left, right),
        BinOp::Ge => ops::less(left, right).map(|v| Value::Bool(!v.is_truthy())),
        BinOp::Le => ops::greater(left, right).map(|v| Value::Bool(!v.is_truthy())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vm::{with_output_capture, OutputCapture};

    fn run(source: &str, input: &str) -> (Interpreter, RuntimeResult<()>, OutputCapture) {
        let program = Parser::parse_program(source).expect("Parse error");
        let mut interpreter = Interpreter::with_input(io::Cursor::new(input.to_string()));
        let (result, output) = with_output_capture(|| interpreter.interpret(&program));
        (interpreter, result, output)
    }

    fn stdout(source: &str) -> Vec<String> {
        let (_, result, output) = run(source, "");
        result.expect("Runtime error");
        output.stdout
    }

    fn error(source: &str) -> RuntimeError {
        run(source, "").1.unwrap_err()
    }

    #[test]
    fn arithmetic_matches_the_vm() {
        assert_eq!(stdout("ESCREVEAI 1 + 1;"), ["2"]);
        assert_eq!(stdout("ESCREVEAI 5 / 2;"), ["2"]);
        assert_eq!(stdout("ESCREVEAI 5.0 / 2;"), ["2.5"]);
        assert_eq!(stdout("ESCREVEAI \"a\" + 1;"), ["a1"]);
        assert_eq!(stdout("ESCREVEAI 7 % 3; ESCREVEAI 7.5 % 2;"), ["1", "1.5"]);
        assert_eq!(stdout("ESCREVEAI 2 >= 2; ESCREVEAI 1 == 1.0;"), ["verdadeiro", "falso"]);
    }

    #[test]
    fn blocks_open_scopes() {
        let out = stdout("VAR a = 1; { VAR a = 2; ESCREVEAI a; a = 3; } ESCREVEAI a;");
        assert_eq!(out, ["2", "1"]);
        assert_eq!(stdout("VAR a = 1; { a = 5; } ESCREVEAI a;"), ["5"]);
    }

    #[test]
    fn block_locals_do_not_leak() {
        let err = error("{ VAR t = 1; }\nESCREVEAI t;");
        assert_eq!(err.kind, RuntimeErrorKind::UndefinedVariable("t".to_string()));
        assert_eq!(err.line, 2);
    }

    #[test]
    fn while_and_break() {
        let out = stdout(
            "VAR i = 0;
             VOLTAINFINITA (ISSOAI) { SE (i == 3) PAREI; ESCREVEAI i; ++i; }
             ESCREVEAI \"fim\";",
        );
        assert_eq!(out, ["0", "1", "2", "fim"]);
    }

    #[test]
    fn functions_and_recursion() {
        let out = stdout(
            "FUNCAO fat(n) { SE (n <= 1) RETORNA 1; RETORNA n * fat(n - 1); }
             ESCREVEAI fat(5);
             FUNCAO nada() { }
             ESCREVEAI nada();
             ESCREVEAI fat;",
        );
        assert_eq!(out, ["120", "nulo", "<função fat>"]);
    }

    #[test]
    fn closures_capture_their_scope() {
        let out = stdout(
            "FUNCAO contador() {
                VAR n = 0;
                FUNCAO inc() { ++n; RETORNA n; }
                RETORNA inc;
             }
             VAR c = contador();
             c(); c();
             ESCREVEAI c();",
        );
        assert_eq!(out, ["3"]);
    }

    #[test]
    fn return_exits_nested_loops() {
        let out = stdout(
            "FUNCAO f() { VOLTAINFINITA (ISSOAI) { VOLTAINFINITA (ISSOAI) { RETORNA \"ok\"; } } }
             ESCREVEAI f();",
        );
        assert_eq!(out, ["ok"]);
    }

    #[test]
    fn switch_runs_first_match_or_default() {
        let source = |subject: &str| {
            format!(
                "ESCOLHEAI {subject} {{
                    CASO 1: ESCREVEAI \"um\";
                    CASO 2: {{ ESCREVEAI \"dois\"; PAREI; ESCREVEAI \"nunca\"; }}
                    CASO 2: ESCREVEAI \"repetido\";
                    PADRAO: ESCREVEAI \"outro\";
                }}"
            )
        };
        assert_eq!(stdout(&source("1")), ["um"]);
        assert_eq!(stdout(&source("1 + 1")), ["dois"]);
        assert_eq!(stdout(&source("\"x\"")), ["outro"]);
        assert!(stdout("ESCOLHEAI 9 { CASO 1: ESCREVEAI 1; }").is_empty());
    }

    #[test]
    fn break_and_return_outside_their_constructs() {
        assert_eq!(error("PAREI;").kind, RuntimeErrorKind::BreakOutsideLoop);
        assert_eq!(error("RETORNA 1;").kind, RuntimeErrorKind::ReturnOutsideFunction);
        let err = error(
            "FUNCAO f() { PAREI; }\nVOLTAINFINITA (ISSOAI) {\n f();\n}",
        );
        assert_eq!(err.kind, RuntimeErrorKind::BreakOutsideLoop);
        assert_eq!(err.line, 1);
    }

    #[test]
    fn call_errors() {
        let err = error("VAR x = 1;\nx();");
        assert_eq!(err.kind, RuntimeErrorKind::NotCallable("inteiro"));
        assert_eq!(err.line, 2);

        let err = error("FUNCAO f(a, b) { }\nf(1);");
        assert_eq!(err.kind, RuntimeErrorKind::ArityMismatch { expected: 2, got: 1 });

        // Same stack as the main thread; test threads get less
        let kind = std::thread::Builder::new()
            .stack_size(8 * 1024 * 1024)
            .spawn(|| error("FUNCAO f(n) { RETORNA f(n + 1); }\nf(0);").kind)
            .unwrap()
            .join()
            .unwrap();
        assert_eq!(kind, RuntimeErrorKind::CallDepthExceeded(MAX_CALL_DEPTH));
    }

    #[test]
    fn type_errors_abort() {
        let (_, result, output) = run("ESCREVEAI 1;\nESCREVEAI -\"a\";\nESCREVEAI 2;", "");
        let err = result.unwrap_err();
        assert_eq!(err.kind, RuntimeErrorKind::OperandMustBeNumber);
        assert_eq!(err.line, 2);
        assert_eq!(output.stdout, ["1"]);
    }

    #[test]
    fn input_reads_expressions_then_coerces() {
        let (interpreter, result, _) = run(
            "VAR dez = 10; VAR a; VAR b; VAR c; VAR d; LEIA a; LEIA b; LEIA c; LEIA d;",
            "dez * 2\n2.5\nolá mundo\nninguem\n",
        );
        result.unwrap();
        assert_eq!(interpreter.global("a"), Some(Value::Int(20)));
        assert_eq!(interpreter.global("b"), Some(Value::Float(2.5)));
        assert_eq!(interpreter.global("c"), Some(Value::string("olá mundo")));
        // Parses, but the variable is undefined
        assert_eq!(interpreter.global("d"), Some(Value::string("ninguem")));
    }

    #[test]
    fn input_errors() {
        let (_, result, _) = run("LEIA x;", "1\n");
        assert_eq!(
            result.unwrap_err().kind,
            RuntimeErrorKind::UndefinedVariable("x".to_string())
        );
        let (_, result, _) = run("VAR x; LEIA x;", "");
        assert!(matches!(
            result.unwrap_err().kind,
            RuntimeErrorKind::InputUnavailable(_)
        ));
    }

    #[test]
    fn globals_persist_across_runs() {
        let mut interpreter = Interpreter::with_input(io::empty());
        let first = Parser::parse_program("VAR x = 40;").unwrap();
        let second = Parser::parse_program("x = x + 2;").unwrap();
        interpreter.interpret(&first).unwrap();
        interpreter.interpret(&second).unwrap();
        assert_eq!(interpreter.global("x"), Some(Value::Int(42)));

        let expr = Parser::parse_expression("x * 2").unwrap();
        assert_eq!(interpreter.evaluate(&expr), Ok(Value::Int(84)));
    }
}
