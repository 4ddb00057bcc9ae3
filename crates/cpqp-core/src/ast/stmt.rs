//! Statement AST nodes

use std::rc::Rc;

use crate::lexer::Span;

use super::{Expr, Ident, Spanned};

/// A statement with source location
#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    /// The kind of statement
    pub kind: StmtKind,
    /// Source location
    pub span: Span,
    /// Source line
    pub line: u32,
}

impl Stmt {
    /// Create a new statement
    #[must_use]
    pub fn new(kind: StmtKind, span: Span, line: u32) -> Self {
        Self { kind, span, line }
    }
}

impl Spanned for Stmt {
    fn span(&self) -> Span {
        self.span
    }

    fn line(&self) -> u32 {
        self.line
    }
}

/// Declared type of a typed variable declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarType {
    /// `INTEIRO`
    Inteiro,
    /// `QUEBRADO`
    Quebrado,
}

impl VarType {
    /// Keyword spelling
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            VarType::Inteiro => "INTEIRO",
            VarType::Quebrado => "QUEBRADO",
        }
    }
}

/// A function declaration (FUNCAO name(params) { body })
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    pub name: Ident,
    pub params: Vec<Ident>,
    pub body: Vec<Stmt>,
}

/// One `CASO value: stmt` arm of a switch
#[derive(Debug, Clone, PartialEq)]
pub struct SwitchCase {
    pub value: Expr,
    pub body: Stmt,
}

/// The kind of statement
#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    /// ESCREVEAI expr;
    Print(Expr),

    /// VAR x = value; (or INTEIRO / QUEBRADO)
    Var {
        /// Declared type, recorded but not enforced
        ty: Option<VarType>,
        name: Ident,
        initializer: Option<Expr>,
    },

    /// FUNCAO declaration
    Function(Rc<FunctionDecl>),

    /// RETORNA [expr];
    Return(Option<Expr>),

    /// SE (cond) then [SENAO else]
    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },

    /// { stmts }
    Block(Vec<Stmt>),

    /// Expression statement (expr;)
    Expression(Expr),

    /// VOLTAINFINITA (cond) { body }
    While {
        condition: Expr,
        body: Box<Stmt>,
    },

    /// PAREI;
    Break,

    /// ESCOLHEAI subject { CASO v: stmt ... PADRAO: stmt }
    Switch {
        subject: Expr,
        cases: Vec<SwitchCase>,
        default: Option<Box<Stmt>>,
    },

    /// LEIA name;
    Input(Ident),
}
