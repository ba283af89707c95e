use std::collections::HashMap;

use crate::frontend::ast::Prototype;
use crate::frontend::lexer::Token;

/// Name of the zero-argument function a bare top-level expression is
/// wrapped in for one-shot evaluation. Leading underscores keep it out of
/// the identifier grammar, so user code can never collide with it.
pub const ANON_FN_NAME: &str = "__anon_expr";

/// Cross-statement state for one REPL session: the binary-operator
/// precedence table and every prototype seen so far. One context value,
/// passed by reference to the parser and driver; no globals.
#[derive(Debug, Clone)]
pub struct SessionContext {
    /// Operator character -> precedence rank. Higher binds tighter. Filled
    /// once at session start; nothing mutates it afterwards.
    precedence: HashMap<char, i32>,
    /// Function name -> most recently seen prototype, refreshed by every
    /// `extern` and successful `def`.
    pub prototypes: HashMap<String, Prototype>,
}

impl Default for SessionContext {
    fn default() -> Self {
        // 1 is the lowest precedence.
        let mut precedence = HashMap::new();
        precedence.insert('<', 10);
        precedence.insert('+', 20);
        precedence.insert('-', 20);
        precedence.insert('*', 40);
        Self {
            precedence,
            prototypes: HashMap::new(),
        }
    }
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Precedence of the pending binary operator, or -1 if the current
    /// token is not a registered operator. Only characters present in the
    /// table with a positive rank count.
    pub fn token_precedence(&self, token: &Token) -> i32 {
        match token {
            Token::Char(c) => match self.precedence.get(c) {
                Some(&prec) if prec > 0 => prec,
                _ => -1,
            },
            _ => -1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registered_operators_have_positive_precedence() {
        let ctx = SessionContext::new();
        assert_eq!(ctx.token_precedence(&Token::Char('*')), 40);
        assert_eq!(ctx.token_precedence(&Token::Char('+')), 20);
        assert_eq!(ctx.token_precedence(&Token::Char('-')), 20);
        assert_eq!(ctx.token_precedence(&Token::Char('<')), 10);
        assert!(ctx.token_precedence(&Token::Char('+')) < ctx.token_precedence(&Token::Char('*')));
    }

    #[test]
    fn everything_else_is_not_an_operator() {
        let ctx = SessionContext::new();
        assert_eq!(ctx.token_precedence(&Token::Char('$')), -1);
        assert_eq!(ctx.token_precedence(&Token::Char('(')), -1);
        assert_eq!(ctx.token_precedence(&Token::Identifier("x".to_string())), -1);
        assert_eq!(ctx.token_precedence(&Token::Eof), -1);
    }
}
