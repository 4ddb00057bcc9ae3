//! Lexer for the cpqp language
//!
//! The lexer converts source code into a stream of tokens, handling:
//! - Portuguese keywords, identifiers, and operators
//! - Integer, float and string literals
//! - Comments (line and block), which are dropped
//! - Source line tracking for diagnostics

#![allow(clippy::cast_possible_truncation)] // u32 offsets; files > 4GB are unsupported

mod span;
mod token;

pub use span::{LineIndex, Span};
pub use token::TokenKind;

use logos::Logos;
use thiserror::Error;

/// A token with its kind, span, source text and line
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// The kind of token
    pub kind: TokenKind,
    /// The span in the source code
    pub span: Span,
    /// The source text of the token
    pub lexeme: String,
    /// 1-based line of the first byte of the token
    pub line: u32,
}

impl Token {
    /// Create a new token
    #[must_use]
    pub fn new(kind: TokenKind, span: Span, lexeme: impl Into<String>, line: u32) -> Self {
        Self {
            kind,
            span,
            lexeme: lexeme.into(),
            line,
        }
    }
}

/// Lexer error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LexErrorKind {
    #[error("Caractere inesperado '{0}'.")]
    UnexpectedChar(char),
    #[error("Texto não finalizado.")]
    UnterminatedString,
    #[error("Número inválido '{0}'.")]
    InvalidNumber(String),
}

/// A lexer error with location information
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{kind} [linha {line}]")]
pub struct LexError {
    pub kind: LexErrorKind,
    pub span: Span,
    pub line: u32,
}

/// The cpqp lexer
pub struct Lexer<'source> {
    source: &'source str,
    lines: LineIndex,
    /// Collected errors during lexing
    errors: Vec<LexError>,
}

impl<'source> Lexer<'source> {
    /// Create a new lexer for the given source code
    #[must_use]
    pub fn new(source: &'source str) -> Self {
        Self {
            source,
            lines: LineIndex::new(source),
            errors: Vec::new(),
        }
    }

    /// Tokenize the entire source, returning all tokens and any errors
    ///
    /// The token list always ends with [`TokenKind::Eof`].
    #[must_use]
    pub fn tokenize(source: &str) -> (Vec<Token>, Vec<LexError>) {
        let mut lexer = Lexer::new(source);
        let tokens = lexer.collect_all();
        (tokens, lexer.errors)
    }

    /// Collect all tokens from the source
    pub fn collect_all(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        let mut logos_lexer = TokenKind::lexer(self.source);

        while let Some(result) = logos_lexer.next() {
            let span = Span::from_range(logos_lexer.span());
            let lexeme = logos_lexer.slice();
            let line = self.lines.line(span.start);

            match result {
                Ok(kind) if kind.is_trivia() => {}
                // A lone "/*" means the block comment regex failed: it runs to EOF
                Ok(TokenKind::Slash) if logos_lexer.remainder().starts_with('*') => break,
                Ok(kind) => {
                    if kind == TokenKind::Int && lexeme.parse::<i32>().is_err() {
                        self.error(LexErrorKind::InvalidNumber(lexeme.to_string()), span);
                    }
                    tokens.push(Token::new(kind, span, lexeme, line));
                }
                Err(()) => {
                    let Some(c) = lexeme.chars().next() else {
                        continue;
                    };
                    if c == '"' {
                        let rest = Span::new(span.start, self.source.len() as u32);
                        self.error(LexErrorKind::UnterminatedString, rest);
                        break;
                    }
                    self.error(LexErrorKind::UnexpectedChar(c), span);
                }
            }
        }

        let end = self.source.len() as u32;
        tokens.push(Token::new(
            TokenKind::Eof,
            Span::new(end, end),
            "",
            self.lines.line(end),
        ));
        tokens
    }

    fn error(&mut self, kind: LexErrorKind, span: Span) {
        let line = self.lines.line(span.start);
        self.errors.push(LexError { kind, span, line });
    }
}
