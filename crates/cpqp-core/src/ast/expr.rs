//! Expression AST nodes

use crate::lexer::Span;

use super::{Ident, Spanned};

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinOp {
    // Arithmetic
    /// Addition (+)
    Add,
    /// Subtraction (-)
    Sub,
    /// Multiplication (*)
    Mul,
    /// Division (/)
    Div,
    /// Remainder (%)
    Mod,

    // Comparison
    /// Equal (==)
    Eq,
    /// Not equal (!=)
    Ne,
    /// Less than (<)
    Lt,
    /// Less than or equal (<=)
    Le,
    /// Greater than (>)
    Gt,
    /// Greater than or equal (>=)
    Ge,
}

impl BinOp {
    /// Returns the precedence of the operator (higher = binds tighter)
    ///
    /// All binary operators are left-associative.
    #[must_use]
    pub const fn precedence(self) -> u8 {
        match self {
            BinOp::Eq | BinOp::Ne => 1,
            BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => 2,
            BinOp::Add | BinOp::Sub => 3,
            BinOp::Mul | BinOp::Div | BinOp::Mod => 4,
        }
    }

    /// Returns the symbol representation of the operator
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::Lt => "<",
            BinOp::Le => "<=",
            BinOp::Gt => ">",
            BinOp::Ge => ">=",
        }
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    /// Negation (-)
    Neg,
    /// Logical NOT (!)
    Not,
}

impl UnaryOp {
    /// Returns the symbol representation of the operator
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::Not => "!",
        }
    }
}

/// Literal values
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// `NULO`
    Nil,
    /// `ISSOAI` / `MENTIRA`
    Bool(bool),
    /// Integer literal
    Int(i32),
    /// Float literal
    Float(f64),
    /// String literal (without quotes)
    String(String),
}

impl std::fmt::Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Literal::Nil => write!(f, "NULO"),
            Literal::Bool(true) => write!(f, "ISSOAI"),
            Literal::Bool(false) => write!(f, "MENTIRA"),
            Literal::Int(i) => write!(f, "{i}"),
            Literal::Float(n) => write!(f, "{n:?}"),
            Literal::String(s) => write!(f, "\"{s}\""),
        }
    }
}

/// An expression with source location
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    /// The kind of expression
    pub kind: ExprKind,
    /// Source location
    pub span: Span,
    /// Source line
    pub line: u32,
}

impl Expr {
    /// Create a new expression
    #[must_use]
    pub fn new(kind: ExprKind, span: Span, line: u32) -> Self {
        Self { kind, span, line }
    }
}

impl Spanned for Expr {
    fn span(&self) -> Span {
        self.span
    }

    fn line(&self) -> u32 {
        self.line
    }
}

/// The kind of expression
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    /// Assignment to an existing variable (x = value)
    Assign {
        name: Ident,
        value: Box<Expr>,
    },

    /// Binary operation (a + b)
    Binary {
        left: Box<Expr>,
        op: BinOp,
        right: Box<Expr>,
    },

    /// Function call (f(a, b))
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },

    /// Parenthesized expression
    Grouping(Box<Expr>),

    /// Literal value
    Literal(Literal),

    /// Unary operation (-x, !x)
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },

    /// Variable read
    Variable(Ident),

    /// Prefix increment (++x): adds 1 and stores, yielding the new value
    Increment(Ident),

    /// Prefix decrement (--x): subtracts 1 and stores, yielding the new value
    Decrement(Ident),
}
