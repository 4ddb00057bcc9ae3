//! Parser for the cpqp language
//!
//! Statements are parsed by recursive descent; binary operators by precedence
//! climbing over [`BinOp::precedence`]. Errors are collected and the parser
//! resynchronizes at the next statement boundary, so a single pass reports
//! every independent mistake.
//!
//! # Example
//!
//! ```
//! use cpqp_core::parser::Parser;
//!
//! let program = Parser::parse_program("VAR x = 1 + 2; ESCREVEAI x;");
//! assert!(program.is_ok());
//!
//! let expr = Parser::parse_expression("1 + 2 * 3");
//! assert!(expr.is_ok());
//! ```

mod error;

pub use error::{ExpectedToken, ParseError, ParseErrorKind};

use std::rc::Rc;

use tracing::debug;

use crate::ast::{
    BinOp, Expr, ExprKind, FunctionDecl, Ident, Literal, Stmt, StmtKind, SwitchCase, UnaryOp,
    VarType,
};
use crate::lexer::{LexError, Lexer, Span, Token, TokenKind};

/// Result type for parsing operations
pub type ParseResult<T> = Result<T, ParseError>;

/// The cpqp parser
pub struct Parser {
    /// All tokens from the source, ending with `Eof`
    tokens: Vec<Token>,
    /// Current position in the token stream
    position: usize,
    /// Collected parse errors
    errors: Vec<ParseError>,
    /// Lexer errors (passed through)
    lex_errors: Vec<LexError>,
}

impl Parser {
    /// Create a new parser from source code
    #[must_use]
    pub fn new(source: &str) -> Self {
        let (tokens, lex_errors) = Lexer::tokenize(source);
        Self {
            tokens,
            position: 0,
            errors: Vec::new(),
            lex_errors,
        }
    }

    /// Parse a complete program
    pub fn parse_program(source: &str) -> Result<Vec<Stmt>, Vec<ParseError>> {
        let mut parser = Parser::new(source);
        let program = parser.program();
        parser.finish(program)
    }

    /// Parse a single expression that must span the whole input
    pub fn parse_expression(source: &str) -> Result<Expr, Vec<ParseError>> {
        let mut parser = Parser::new(source);
        let result = parser
            .expression()
            .and_then(|expr| parser.expect_eof().map(|()| expr));
        match result {
            Ok(expr) => parser.finish(expr),
            Err(e) => {
                parser.error(e);
                Err(parser.into_errors())
            }
        }
    }

    /// Return `value` if nothing went wrong, otherwise every error
    fn finish<T>(self, value: T) -> Result<T, Vec<ParseError>> {
        if self.errors.is_empty() && self.lex_errors.is_empty() {
            Ok(value)
        } else {
            debug!(
                lex_errors = self.lex_errors.len(),
                parse_errors = self.errors.len(),
                "parse failed"
            );
            Err(self.into_errors())
        }
    }

    /// All errors, lexer errors first
    fn into_errors(self) -> Vec<ParseError> {
        let mut errors: Vec<ParseError> =
            self.lex_errors.into_iter().map(ParseError::from).collect();
        errors.extend(self.errors);
        errors
    }

    // ==================== Token Management ====================

    /// Get the current token
    fn current(&self) -> &Token {
        // The stream always ends with Eof, and `advance` never moves past it
        &self.tokens[self.position.min(self.tokens.len() - 1)]
    }

    /// Get the current token kind
    fn current_kind(&self) -> TokenKind {
        self.current().kind
    }

    /// The most recently consumed token
    fn previous(&self) -> &Token {
        &self.tokens[self.position.saturating_sub(1).min(self.tokens.len() - 1)]
    }

    /// Check if we're at end of file
    fn is_eof(&self) -> bool {
        self.current_kind() == TokenKind::Eof
    }

    /// Advance to the next token
    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if !self.is_eof() {
            self.position += 1;
        }
        token
    }

    /// Check if the current token matches a kind
    fn check(&self, kind: TokenKind) -> bool {
        self.current_kind() == kind
    }

    /// Consume a token if it matches, returning it
    fn eat(&mut self, kind: TokenKind) -> Option<Token> {
        if self.check(kind) {
            Some(self.advance())
        } else {
            None
        }
    }

    /// Expect and consume a specific token, or error
    fn expect(&mut self, kind: TokenKind) -> ParseResult<Token> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.error_here(ParseErrorKind::UnexpectedToken {
                found: self.current_kind(),
                expected: ExpectedToken::Token(kind),
            }))
        }
    }

    /// Expect an identifier token
    fn expect_ident(&mut self) -> ParseResult<Ident> {
        if self.check(TokenKind::Ident) {
            let token = self.advance();
            Ok(Ident::new(token.lexeme, token.span, token.line))
        } else {
            Err(self.error_here(ParseErrorKind::ExpectedIdentifier(self.current_kind())))
        }
    }

    fn expect_eof(&mut self) -> ParseResult<()> {
        if self.is_eof() {
            Ok(())
        } else {
            Err(self.error_here(ParseErrorKind::UnexpectedToken {
                found: self.current_kind(),
                expected: ExpectedToken::Description("fim da entrada"),
            }))
        }
    }

    /// Build an error located at the current token
    fn error_here(&self, kind: ParseErrorKind) -> ParseError {
        let token = self.current();
        ParseError::new(kind, token.span, token.line)
    }

    /// Record an error but continue parsing
    fn error(&mut self, error: ParseError) {
        self.errors.push(error);
    }

    /// Span from `start` to the end of the last consumed token
    fn span_from(&self, start: Span) -> Span {
        start.merge(self.previous().span)
    }

    // ==================== Statements ====================

    /// Parse the whole token stream
    fn program(&mut self) -> Vec<Stmt> {
        let mut stmts = Vec::new();
        while !self.is_eof() {
            let start = self.position;
            match self.declaration() {
                Ok(stmt) => stmts.push(stmt),
                Err(e) => self.recover(e, start),
            }
        }
        stmts
    }

    /// Parse a declaration or statement
    fn declaration(&mut self) -> ParseResult<Stmt> {
        match self.current_kind() {
            TokenKind::Var => self.var_declaration(None),
            TokenKind::Inteiro => self.var_declaration(Some(VarType::Inteiro)),
            TokenKind::Quebrado => self.var_declaration(Some(VarType::Quebrado)),
            TokenKind::Funcao => self.function_declaration(),
            _ => self.statement(),
        }
    }

    /// VAR name [= expr];
    fn var_declaration(&mut self, ty: Option<VarType>) -> ParseResult<Stmt> {
        let keyword = self.advance();
        let name = self.expect_ident()?;
        let initializer = if self.eat(TokenKind::Eq).is_some() {
            Some(self.expression()?)
        } else {
            None
        };
        self.expect(TokenKind::Semicolon)?;
        Ok(Stmt::new(
            StmtKind::Var {
                ty,
                name,
                initializer,
            },
            self.span_from(keyword.span),
            keyword.line,
        ))
    }

    /// FUNCAO name(a, b) { body }
    fn function_declaration(&mut self) -> ParseResult<Stmt> {
        let keyword = self.advance();
        let name = self.expect_ident()?;
        self.expect(TokenKind::LParen)?;
        let mut params = Vec::new();
        if !self.check(TokenKind::RParen) {
            loop {
                params.push(self.expect_ident()?);
                if self.eat(TokenKind::Comma).is_none() {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen)?;
        self.expect(TokenKind::LBrace)?;
        let body = self.block_body()?;
        Ok(Stmt::new(
            StmtKind::Function(Rc::new(FunctionDecl { name, params, body })),
            self.span_from(keyword.span),
            keyword.line,
        ))
    }

    /// Parse a non-declaration statement
    fn statement(&mut self) -> ParseResult<Stmt> {
        match self.current_kind() {
            TokenKind::EscreveAi => {
                let keyword = self.advance();
                let value = self.expression()?;
                self.expect(TokenKind::Semicolon)?;
                Ok(self.finish_stmt(StmtKind::Print(value), &keyword))
            }
            TokenKind::Leia => {
                let keyword = self.advance();
                let name = self.expect_ident()?;
                self.expect(TokenKind::Semicolon)?;
                Ok(self.finish_stmt(StmtKind::Input(name), &keyword))
            }
            TokenKind::Parei => {
                let keyword = self.advance();
                self.expect(TokenKind::Semicolon)?;
                Ok(self.finish_stmt(StmtKind::Break, &keyword))
            }
            TokenKind::Retorna => {
                let keyword = self.advance();
                let value = if self.check(TokenKind::Semicolon) {
                    None
                } else {
                    Some(self.expression()?)
                };
                self.expect(TokenKind::Semicolon)?;
                Ok(self.finish_stmt(StmtKind::Return(value), &keyword))
            }
            TokenKind::Se => self.if_statement(),
            TokenKind::VoltaInfinita => self.while_statement(),
            TokenKind::EscolheAi => self.switch_statement(),
            TokenKind::LBrace => {
                let brace = self.advance();
                let stmts = self.block_body()?;
                Ok(self.finish_stmt(StmtKind::Block(stmts), &brace))
            }
            TokenKind::FazAVolta => Err(self.error_here(ParseErrorKind::ReservedKeyword(
                TokenKind::FazAVolta,
            ))),
            _ => {
                let expr = self.expression()?;
                self.expect(TokenKind::Semicolon)?;
                let (span, line) = (expr.span, expr.line);
                Ok(Stmt::new(StmtKind::Expression(expr), self.span_from(span), line))
            }
        }
    }

    fn finish_stmt(&self, kind: StmtKind, first: &Token) -> Stmt {
        Stmt::new(kind, self.span_from(first.span), first.line)
    }

    /// Statements up to and including the closing `}`; the `{` is already consumed
    fn block_body(&mut self) -> ParseResult<Vec<Stmt>> {
        let mut stmts = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.is_eof() {
            let start = self.position;
            match self.declaration() {
                Ok(stmt) => stmts.push(stmt),
                Err(e) => self.recover(e, start),
            }
        }
        self.expect(TokenKind::RBrace)?;
        Ok(stmts)
    }

    /// SE (cond) branch [SENAO branch]
    fn if_statement(&mut self) -> ParseResult<Stmt> {
        let keyword = self.advance();
        self.expect(TokenKind::LParen)?;
        let condition = self.expression()?;
        self.expect(TokenKind::RParen)?;
        let then_branch = Box::new(self.declaration()?);
        let else_branch = if self.eat(TokenKind::Senao).is_some() {
            Some(Box::new(self.declaration()?))
        } else {
            None
        };
        Ok(self.finish_stmt(
            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            },
            &keyword,
        ))
    }

    /// VOLTAINFINITA (cond) { body }
    fn while_statement(&mut self) -> ParseResult<Stmt> {
        let keyword = self.advance();
        self.expect(TokenKind::LParen)?;
        let condition = self.expression()?;
        self.expect(TokenKind::RParen)?;
        let brace = self.expect(TokenKind::LBrace)?;
        let stmts = self.block_body()?;
        let body = Box::new(self.finish_stmt(StmtKind::Block(stmts), &brace));
        Ok(self.finish_stmt(StmtKind::While { condition, body }, &keyword))
    }

    /// ESCOLHEAI subject { CASO v: stmt ... [PADRAO: stmt] }
    fn switch_statement(&mut self) -> ParseResult<Stmt> {
        let keyword = self.advance();
        let subject = self.expression()?;
        self.expect(TokenKind::LBrace)?;

        let mut cases = Vec::new();
        while self.eat(TokenKind::Caso).is_some() {
            let value = self.expression()?;
            self.expect(TokenKind::Colon)?;
            let body = self.declaration()?;
            cases.push(SwitchCase { value, body });
        }

        let default = if self.eat(TokenKind::Padrao).is_some() {
            self.expect(TokenKind::Colon)?;
            Some(Box::new(self.declaration()?))
        } else {
            None
        };

        self.expect(TokenKind::RBrace)?;
        Ok(self.finish_stmt(
            StmtKind::Switch {
                subject,
                cases,
                default,
            },
            &keyword,
        ))
    }

    // ==================== Expressions ====================

    /// Parse an expression
    pub(crate) fn expression(&mut self) -> ParseResult<Expr> {
        self.assignment()
    }

    /// Assignment is right-associative and only targets plain variables
    fn assignment(&mut self) -> ParseResult<Expr> {
        let target = self.parse_precedence(0)?;

        if let Some(equals) = self.eat(TokenKind::Eq) {
            let value = self.assignment()?;
            return match target.kind {
                ExprKind::Variable(name) => {
                    let span = target.span.merge(value.span);
                    Ok(Expr::new(
                        ExprKind::Assign {
                            name,
                            value: Box::new(value),
                        },
                        span,
                        target.line,
                    ))
                }
                _ => Err(ParseError::new(
                    ParseErrorKind::InvalidAssignmentTarget,
                    equals.span,
                    equals.line,
                )),
            };
        }

        Ok(target)
    }

    /// Parse expression with given minimum precedence
    fn parse_precedence(&mut self, min_prec: u8) -> ParseResult<Expr> {
        let mut left = self.prefix_expr()?;

        while let Some((op, prec)) = self.infix_op() {
            if prec < min_prec {
                break;
            }

            self.advance(); // consume operator
            let right = self.parse_precedence(prec + 1)?;

            let span = left.span.merge(right.span);
            let line = left.line;
            left = Expr::new(
                ExprKind::Binary {
                    left: Box::new(left),
                    op,
                    right: Box::new(right),
                },
                span,
                line,
            );
        }

        Ok(left)
    }

    /// Get current infix operator and its precedence
    fn infix_op(&self) -> Option<(BinOp, u8)> {
        let op = match self.current_kind() {
            TokenKind::Plus => BinOp::Add,
            TokenKind::Minus => BinOp::Sub,
            TokenKind::Star => BinOp::Mul,
            TokenKind::Slash => BinOp::Div,
            TokenKind::Percent => BinOp::Mod,
            TokenKind::EqEq => BinOp::Eq,
            TokenKind::NotEq => BinOp::Ne,
            TokenKind::Lt => BinOp::Lt,
            TokenKind::LtEq => BinOp::Le,
            TokenKind::Gt => BinOp::Gt,
            TokenKind::GtEq => BinOp::Ge,
            _ => return None,
        };
        Some((op, op.precedence()))
    }

    /// Parse a prefix expression (unary, increment, or call)
    fn prefix_expr(&mut self) -> ParseResult<Expr> {
        let op = match self.current_kind() {
            TokenKind::Minus => UnaryOp::Neg,
            TokenKind::Not => UnaryOp::Not,
            TokenKind::PlusPlus | TokenKind::MinusMinus => {
                let token = self.advance();
                let name = self.expect_ident()?;
                let kind = if token.kind == TokenKind::PlusPlus {
                    ExprKind::Increment(name)
                } else {
                    ExprKind::Decrement(name)
                };
                return Ok(Expr::new(kind, self.span_from(token.span), token.line));
            }
            _ => return self.call(),
        };

        let token = self.advance();
        let operand = self.prefix_expr()?;
        let span = token.span.merge(operand.span);
        Ok(Expr::new(
            ExprKind::Unary {
                op,
                operand: Box::new(operand),
            },
            span,
            token.line,
        ))
    }

    /// Primary expression followed by any number of call suffixes
    fn call(&mut self) -> ParseResult<Expr> {
        let mut expr = self.primary()?;

        while self.eat(TokenKind::LParen).is_some() {
            let mut args = Vec::new();
            if !self.check(TokenKind::RParen) {
                loop {
                    args.push(self.expression()?);
                    if self.eat(TokenKind::Comma).is_none() {
                        break;
                    }
                }
            }
            let close = self.expect(TokenKind::RParen)?;
            let span = expr.span.merge(close.span);
            let line = expr.line;
            expr = Expr::new(
                ExprKind::Call {
                    callee: Box::new(expr),
                    args,
                },
                span,
                line,
            );
        }

        Ok(expr)
    }

    /// Literals, variables and parenthesized expressions
    fn primary(&mut self) -> ParseResult<Expr> {
        let token = self.current().clone();
        let kind = match token.kind {
            TokenKind::Nulo => ExprKind::Literal(Literal::Nil),
            TokenKind::IssoAi => ExprKind::Literal(Literal::Bool(true)),
            TokenKind::Mentira => ExprKind::Literal(Literal::Bool(false)),
            // Out-of-range integers were already reported by the lexer
            TokenKind::Int => ExprKind::Literal(Literal::Int(token.lexeme.parse().unwrap_or(0))),
            TokenKind::Float => {
                ExprKind::Literal(Literal::Float(token.lexeme.parse().unwrap_or(0.0)))
            }
            TokenKind::String => {
                let text = &token.lexeme[1..token.lexeme.len() - 1];
                ExprKind::Literal(Literal::String(text.to_string()))
            }
            TokenKind::Ident => {
                ExprKind::Variable(Ident::new(token.lexeme.clone(), token.span, token.line))
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.expression()?;
                self.expect(TokenKind::RParen)?;
                return Ok(Expr::new(
                    ExprKind::Grouping(Box::new(inner)),
                    self.span_from(token.span),
                    token.line,
                ));
            }
            found => return Err(self.error_here(ParseErrorKind::ExpectedExpression(found))),
        };

        self.advance();
        Ok(Expr::new(kind, token.span, token.line))
    }

    // ==================== Error Recovery ====================

    /// Record `error` and skip to the next statement, always making progress
    fn recover(&mut self, error: ParseError, start: usize) {
        self.error(error);
        self.synchronize();
        if self.position == start {
            self.advance();
        }
    }

    /// Synchronize parser state after an error
    fn synchronize(&mut self) {
        while !self.is_eof() {
            if self.eat(TokenKind::Semicolon).is_some() {
                return;
            }
            let kind = self.current_kind();
            if kind.starts_statement() || kind == TokenKind::RBrace {
                return;
            }
            self.advance();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Vec<Stmt> {
        match Parser::parse_program(source) {
            Ok(stmts) => stmts,
            Err(errors) => panic!("parse failed: {errors:?}"),
        }
    }

    fn parse_expr(source: &str) -> Expr {
        match Parser::parse_expression(source) {
            Ok(expr) => expr,
            Err(errors) => panic!("parse failed: {errors:?}"),
        }
    }

    #[test]
    fn parse_literals() {
        assert!(matches!(parse_expr("42").kind, ExprKind::Literal(Literal::Int(42))));
        assert!(matches!(parse_expr("NULO").kind, ExprKind::Literal(Literal::Nil)));
        assert!(matches!(
            parse_expr("MENTIRA").kind,
            ExprKind::Literal(Literal::Bool(false))
        ));
        assert!(
            matches!(parse_expr("\"oi\"").kind, ExprKind::Literal(Literal::String(s)) if s == "oi")
        );
        if let ExprKind::Literal(Literal::Float(f)) = parse_expr("2.5").kind {
            assert!((f - 2.5).abs() < f64::EPSILON);
        } else {
            panic!("expected float literal");
        }
    }

    #[test]
    fn parse_precedence() {
        let expr = parse_expr("1 + 2 * 3");
        let ExprKind::Binary { op, right, .. } = expr.kind else {
            panic!("expected binary");
        };
        assert_eq!(op, BinOp::Add);
        assert!(matches!(right.kind, ExprKind::Binary { op: BinOp::Mul, .. }));
    }

    #[test]
    fn parse_left_associative() {
        let expr = parse_expr("10 - 4 - 3");
        let ExprKind::Binary { left, op, .. } = expr.kind else {
            panic!("expected binary");
        };
        assert_eq!(op, BinOp::Sub);
        assert!(matches!(left.kind, ExprKind::Binary { op: BinOp::Sub, .. }));
    }

    #[test]
    fn parse_comparison_below_equality() {
        let expr = parse_expr("1 < 2 == ISSOAI");
        assert!(matches!(expr.kind, ExprKind::Binary { op: BinOp::Eq, .. }));
    }

    #[test]
    fn parse_unary_and_increment() {
        assert!(matches!(
            parse_expr("-x").kind,
            ExprKind::Unary { op: UnaryOp::Neg, .. }
        ));
        assert!(matches!(
            parse_expr("!!x").kind,
            ExprKind::Unary { op: UnaryOp::Not, .. }
        ));
        assert!(matches!(parse_expr("++x").kind, ExprKind::Increment(ref n) if n.name == "x"));
        assert!(matches!(parse_expr("--x").kind, ExprKind::Decrement(ref n) if n.name == "x"));
    }

    #[test]
    fn parse_assignment_is_right_associative() {
        let expr = parse_expr("a = b = 1");
        let ExprKind::Assign { name, value } = expr.kind else {
            panic!("expected assignment");
        };
        assert_eq!(name.name, "a");
        assert!(matches!(value.kind, ExprKind::Assign { .. }));
    }

    #[test]
    fn invalid_assignment_target() {
        let errors = Parser::parse_program("a + b = 1;").unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ParseErrorKind::InvalidAssignmentTarget);
    }

    #[test]
    fn parse_call() {
        let expr = parse_expr("soma(1, 2)(3)");
        let ExprKind::Call { callee, args } = expr.kind else {
            panic!("expected call");
        };
        assert_eq!(args.len(), 1);
        assert!(matches!(callee.kind, ExprKind::Call { ref args, .. } if args.len() == 2));
    }

    #[test]
    fn parse_var_declarations() {
        let stmts = parse("VAR a; INTEIRO b = 1; QUEBRADO c = 2.0;");
        assert_eq!(stmts.len(), 3);
        assert!(matches!(
            &stmts[0].kind,
            StmtKind::Var { ty: None, initializer: None, name } if name.name == "a"
        ));
        assert!(matches!(
            &stmts[1].kind,
            StmtKind::Var { ty: Some(VarType::Inteiro), initializer: Some(_), .. }
        ));
        assert!(matches!(
            &stmts[2].kind,
            StmtKind::Var { ty: Some(VarType::Quebrado), .. }
        ));
    }

    #[test]
    fn parse_if_else() {
        let stmts = parse("SE (x > 1) ESCREVEAI 1; SENAO { ESCREVEAI 2; }");
        let StmtKind::If { then_branch, else_branch, .. } = &stmts[0].kind else {
            panic!("expected if");
        };
        assert!(matches!(then_branch.kind, StmtKind::Print(_)));
        assert!(matches!(
            else_branch.as_deref().map(|s| &s.kind),
            Some(StmtKind::Block(_))
        ));
    }

    #[test]
    fn parse_while_requires_block() {
        let stmts = parse("VOLTAINFINITA (i < 3) { i = i + 1; }");
        assert!(matches!(&stmts[0].kind, StmtKind::While { body, .. } if matches!(body.kind, StmtKind::Block(_))));

        assert!(Parser::parse_program("VOLTAINFINITA (i < 3) i = i + 1;").is_err());
    }

    #[test]
    fn parse_switch() {
        let stmts = parse(
            "ESCOLHEAI x { CASO 1: ESCREVEAI \"um\"; CASO 2: { ESCREVEAI \"dois\"; PAREI; } PADRAO: ESCREVEAI \"outro\"; }",
        );
        let StmtKind::Switch { cases, default, .. } = &stmts[0].kind else {
            panic!("expected switch");
        };
        assert_eq!(cases.len(), 2);
        assert!(default.is_some());
    }

    #[test]
    fn parse_function_and_return() {
        let stmts = parse("FUNCAO soma(a, b) { RETORNA a + b; } FUNCAO nada() { RETORNA; }");
        let StmtKind::Function(decl) = &stmts[0].kind else {
            panic!("expected function");
        };
        assert_eq!(decl.name.name, "soma");
        assert_eq!(decl.params.len(), 2);
        assert!(matches!(decl.body[0].kind, StmtKind::Return(Some(_))));

        let StmtKind::Function(decl) = &stmts[1].kind else {
            panic!("expected function");
        };
        assert!(decl.params.is_empty());
        assert!(matches!(decl.body[0].kind, StmtKind::Return(None)));
    }

    #[test]
    fn parse_input_and_break() {
        let stmts = parse("LEIA nome; PAREI;");
        assert!(matches!(&stmts[0].kind, StmtKind::Input(n) if n.name == "nome"));
        assert!(matches!(stmts[1].kind, StmtKind::Break));
    }

    #[test]
    fn statements_record_lines() {
        let stmts = parse("VAR a = 1;\n\nESCREVEAI\n  a;");
        assert_eq!(stmts[0].line, 1);
        assert_eq!(stmts[1].line, 3);
        let StmtKind::Print(expr) = &stmts[1].kind else {
            panic!("expected print");
        };
        assert_eq!(expr.line, 4);
    }

    #[test]
    fn error_recovery_reports_every_statement() {
        let errors = Parser::parse_program("VAR = 1;\nESCREVEAI 1\nVAR y = 2;\nESCREVEAI );").unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(matches!(errors[0].kind, ParseErrorKind::ExpectedIdentifier(_)));
        assert_eq!(errors[0].line, 1);
        assert_eq!(errors[1].line, 3);
        assert!(matches!(errors[2].kind, ParseErrorKind::ExpectedExpression(TokenKind::RParen)));
    }

    #[test]
    fn lex_errors_are_reported() {
        let errors = Parser::parse_program("VAR x = 1 @ 2;").unwrap_err();
        assert!(matches!(errors[0].kind, ParseErrorKind::Lex(_)));
    }

    #[test]
    fn logical_operators_are_not_expressions() {
        assert!(Parser::parse_program("ESCREVEAI a && b;").is_err());
    }

    #[test]
    fn for_keyword_is_reserved() {
        let errors = Parser::parse_program("FAZAVOLTA (x) {}").unwrap_err();
        assert_eq!(errors[0].kind, ParseErrorKind::ReservedKeyword(TokenKind::FazAVolta));
    }

    #[test]
    fn stray_closing_brace_does_not_hang() {
        let errors = Parser::parse_program("} ESCREVEAI 1;").unwrap_err();
        assert_eq!(errors.len(), 1);
    }
}
