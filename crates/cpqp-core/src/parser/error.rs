//! Parser error types

use crate::lexer::{LexError, LexErrorKind, Span, TokenKind};
use thiserror::Error;

/// A parser error with location information
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind} [linha {line}]")]
pub struct ParseError {
    /// The kind of error
    pub kind: ParseErrorKind,
    /// Source location where the error occurred
    pub span: Span,
    /// Source line where the error occurred
    pub line: u32,
}

impl ParseError {
    /// Create a new parse error
    #[must_use]
    pub fn new(kind: ParseErrorKind, span: Span, line: u32) -> Self {
        Self { kind, span, line }
    }
}

impl From<LexError> for ParseError {
    fn from(err: LexError) -> Self {
        Self::new(ParseErrorKind::Lex(err.kind), err.span, err.line)
    }
}

/// The kind of parse error
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseErrorKind {
    #[error("Esperava {expected}, encontrou '{found}'.")]
    UnexpectedToken {
        found: TokenKind,
        expected: ExpectedToken,
    },

    #[error("Esperava uma expressão, encontrou '{0}'.")]
    ExpectedExpression(TokenKind),

    #[error("Esperava um identificador, encontrou '{0}'.")]
    ExpectedIdentifier(TokenKind),

    #[error("Alvo de atribuição inválido.")]
    InvalidAssignmentTarget,

    #[error("'{0}' é reservado e ainda não é suportado.")]
    ReservedKeyword(TokenKind),

    #[error("{0}")]
    Lex(LexErrorKind),
}

/// What token was expected
#[derive(Debug, Clone, PartialEq)]
pub enum ExpectedToken {
    /// A specific token kind
    Token(TokenKind),
    /// A description of what was expected
    Description(&'static str),
}

impl std::fmt::Display for ExpectedToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExpectedToken::Token(kind) => write!(f, "'{kind}'"),
            ExpectedToken::Description(desc) => write!(f, "{desc}"),
        }
    }
}
