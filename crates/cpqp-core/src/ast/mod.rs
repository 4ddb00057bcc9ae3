//! Abstract Syntax Tree (AST) for the cpqp language
//!
//! Every node records its [`Span`] and the source line it starts on; the
//! line is what compilers and executors attach to their diagnostics.

mod expr;
mod stmt;

pub use expr::*;
pub use stmt::*;

pub use crate::lexer::Span;

/// A trait for AST nodes that have associated source location information
pub trait Spanned {
    /// Returns the source span of this node
    fn span(&self) -> Span;

    /// Returns the 1-based source line this node starts on
    fn line(&self) -> u32;
}

/// An identifier with its source location
#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    /// The identifier name
    pub name: String,
    /// Source location
    pub span: Span,
    /// Source line
    pub line: u32,
}

impl Ident {
    /// Create a new identifier
    #[must_use]
    pub fn new(name: impl Into<String>, span: Span, line: u32) -> Self {
        Self {
            name: name.into(),
            span,
            line,
        }
    }
}

impl Spanned for Ident {
    fn span(&self) -> Span {
        self.span
    }

    fn line(&self) -> u32 {
        self.line
    }
}

impl std::fmt::Display for Ident {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}
