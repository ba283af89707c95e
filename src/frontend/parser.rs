use thiserror::Error;

use crate::frontend::ast::{Expr, Function, Prototype};
use crate::frontend::lexer::{Lexer, Token};
use crate::session::SessionContext;

/// What can go wrong while turning tokens into AST nodes. A failed parse
/// never leaves a partial tree behind; the whole statement is discarded
/// and the driver decides how to recover.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SyntaxError {
    #[error("unknown token when expecting an expression")]
    ExpectedExpression,

    #[error("expected ')'")]
    ExpectedCloseParen,

    #[error("Expected ')' or ',' in argument list")]
    ExpectedArgumentDelimiter,

    #[error("Expected function name in prototype")]
    ExpectedPrototypeName,

    #[error("Expected '(' in prototype")]
    ExpectedPrototypeOpenParen,

    #[error("Expected ')' in prototype")]
    ExpectedPrototypeCloseParen,
}

pub type ParseResult<T> = Result<T, SyntaxError>;

/// Recursive-descent parser with one token of lookahead. Operator
/// precedence comes from the session context at parse time, so the
/// grammar itself never has to enumerate the operators.
#[derive(Debug)]
pub struct Parser<I> {
    lexer: Lexer<I>,
    current: Token,
}

impl<I: Iterator<Item = char>> Parser<I> {
    /// Build a parser and read the first token. This pulls from the
    /// character source, so on interactive input it blocks until the
    /// user types something.
    pub fn new(mut lexer: Lexer<I>) -> Self {
        let current = lexer.next_token();
        Self { lexer, current }
    }

    pub fn current(&self) -> &Token {
        &self.current
    }

    /// Refresh the lookahead token. Also the driver's one-token error
    /// recovery step.
    pub fn advance(&mut self) -> &Token {
        self.current = self.lexer.next_token();
        &self.current
    }

    /// definition ::= 'def' prototype expression
    pub fn parse_definition(&mut self, ctx: &SessionContext) -> ParseResult<Function> {
        self.advance(); // eat 'def'
        let proto = self.parse_prototype()?;
        let body = self.parse_expression(ctx)?;
        Ok(Function { proto, body })
    }

    /// external ::= 'extern' prototype
    pub fn parse_extern(&mut self) -> ParseResult<Prototype> {
        self.advance(); // eat 'extern'
        self.parse_prototype()
    }

    /// toplevelexpr ::= expression
    ///
    /// Wraps a bare expression in an anonymous nullary function so the
    /// backend can treat it like any other definition.
    pub fn parse_top_level_expr(&mut self, ctx: &SessionContext) -> ParseResult<Function> {
        let body = self.parse_expression(ctx)?;
        let proto = Prototype {
            name: crate::session::ANON_FN_NAME.to_string(),
            params: Vec::new(),
        };
        Ok(Function { proto, body })
    }

    /// expression ::= primary binoprhs
    pub fn parse_expression(&mut self, ctx: &SessionContext) -> ParseResult<Expr> {
        let lhs = self.parse_primary(ctx)?;
        self.parse_bin_op_rhs(ctx, 0, lhs)
    }

    /// prototype ::= id '(' id* ')'
    fn parse_prototype(&mut self) -> ParseResult<Prototype> {
        let name = match &self.current {
            Token::Identifier(name) => name.clone(),
            _ => return Err(SyntaxError::ExpectedPrototypeName),
        };
        self.advance();

        if self.current != Token::Char('(') {
            return Err(SyntaxError::ExpectedPrototypeOpenParen);
        }

        // Parameters are plain identifiers with no separators. Duplicate
        // names are accepted as-is.
        let mut params = Vec::new();
        while let Token::Identifier(param) = self.advance() {
            params.push(param.clone());
        }
        if self.current != Token::Char(')') {
            return Err(SyntaxError::ExpectedPrototypeCloseParen);
        }
        self.advance(); // eat ')'

        Ok(Prototype { name, params })
    }

    /// primary ::= identifierexpr | numberexpr | parenexpr
    fn parse_primary(&mut self, ctx: &SessionContext) -> ParseResult<Expr> {
        match &self.current {
            Token::Identifier(_) => self.parse_identifier_expr(ctx),
            Token::Number(_) => self.parse_number_expr(),
            Token::Char('(') => self.parse_paren_expr(ctx),
            _ => Err(SyntaxError::ExpectedExpression),
        }
    }

    /// numberexpr ::= number
    fn parse_number_expr(&mut self) -> ParseResult<Expr> {
        let value = match self.current {
            Token::Number(value) => value,
            _ => return Err(SyntaxError::ExpectedExpression),
        };
        self.advance();
        Ok(Expr::Number(value))
    }

    /// parenexpr ::= '(' expression ')'
    fn parse_paren_expr(&mut self, ctx: &SessionContext) -> ParseResult<Expr> {
        self.advance(); // eat '('
        let inner = self.parse_expression(ctx)?;
        if self.current != Token::Char(')') {
            return Err(SyntaxError::ExpectedCloseParen);
        }
        self.advance(); // eat ')'
        Ok(inner)
    }

    /// identifierexpr ::= identifier | identifier '(' expression* ')'
    fn parse_identifier_expr(&mut self, ctx: &SessionContext) -> ParseResult<Expr> {
        let name = match &self.current {
            Token::Identifier(name) => name.clone(),
            _ => return Err(SyntaxError::ExpectedExpression),
        };
        self.advance();

        if self.current != Token::Char('(') {
            return Ok(Expr::Variable(name));
        }

        self.advance(); // eat '('
        let mut args = Vec::new();
        if self.current != Token::Char(')') {
            loop {
                args.push(self.parse_expression(ctx)?);
                if self.current == Token::Char(')') {
                    break;
                }
                if self.current != Token::Char(',') {
                    return Err(SyntaxError::ExpectedArgumentDelimiter);
                }
                self.advance(); // eat ','
            }
        }
        self.advance(); // eat ')'

        Ok(Expr::Call { callee: name, args })
    }

    /// binoprhs ::= (operator primary)*
    ///
    /// Precedence climbing: keep absorbing operators that bind at least
    /// as tightly as `min_prec`; when the operator after the right-hand
    /// side binds tighter than the one just consumed, recurse so it
    /// claims that operand first. Equal ranks group left to right.
    fn parse_bin_op_rhs(
        &mut self,
        ctx: &SessionContext,
        min_prec: i32,
        mut lhs: Expr,
    ) -> ParseResult<Expr> {
        loop {
            let tok_prec = ctx.token_precedence(&self.current);

            // Not an operator, or one that binds too loosely: the
            // expression ends here.
            if tok_prec < min_prec {
                return Ok(lhs);
            }

            let op = match self.current {
                Token::Char(op) => op,
                // token_precedence only reports operators for Char tokens
                _ => return Ok(lhs),
            };
            self.advance(); // eat the operator

            let mut rhs = self.parse_primary(ctx)?;

            let next_prec = ctx.token_precedence(&self.current);
            if tok_prec < next_prec {
                rhs = self.parse_bin_op_rhs(ctx, tok_prec + 1, rhs)?;
            }

            lhs = Expr::Binary {
                op,
                left: Box::new(lhs),
                right: Box::new(rhs),
            };
        }
    }
}
