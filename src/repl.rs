//! The interactive session driver: reads statements one at a time,
//! dispatches them on the current token, and feeds completed AST nodes
//! to the backend. Runs one statement fully to completion before reading
//! the next; the only blocking point is the input stream itself.

use std::fmt::Display;
use std::io::{self, Write};

use crate::backend::Backend;
use crate::frontend::lexer::{Lexer, Token};
use crate::frontend::parser::Parser;
use crate::session::SessionContext;

/// One REPL session: cross-statement state, a backend, and the stream
/// diagnostics and results are written to.
#[derive(Debug)]
pub struct Session<B, W> {
    ctx: SessionContext,
    backend: B,
    out: W,
}

impl<B: Backend, W: Write> Session<B, W> {
    pub fn new(backend: B, out: W) -> Self {
        Self {
            ctx: SessionContext::new(),
            backend,
            out,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn ctx(&self) -> &SessionContext {
        &self.ctx
    }

    /// Drive the session until end of input. Statement-level errors are
    /// reported and recovered from; only failures of the output stream
    /// itself end the session early.
    ///
    /// top ::= definition | external | expression | ';'
    pub fn run<I: Iterator<Item = char>>(&mut self, input: I) -> io::Result<()> {
        // Building the parser reads the first token, which blocks on
        // interactive input, so the first prompt goes out before that.
        self.prompt()?;
        let mut parser = Parser::new(Lexer::new(input));

        loop {
            self.prompt()?;
            match parser.current() {
                Token::Eof => return Ok(()),
                // ignore top-level semicolons
                Token::Char(';') => {
                    parser.advance();
                }
                Token::Def => self.handle_definition(&mut parser)?,
                Token::Extern => self.handle_extern(&mut parser)?,
                _ => self.handle_top_level_expression(&mut parser)?,
            }
        }
    }

    fn handle_definition<I: Iterator<Item = char>>(
        &mut self,
        parser: &mut Parser<I>,
    ) -> io::Result<()> {
        let func = match parser.parse_definition(&self.ctx) {
            Ok(func) => func,
            Err(err) => return self.recover(parser, err),
        };

        // If this name was declared earlier, re-emit that declaration so
        // the backend can connect the definition to it.
        if let Some(proto) = self.ctx.prototypes.get(&func.proto.name) {
            if let Err(err) = self.backend.declare_prototype(proto) {
                return self.recover(parser, err);
            }
        }

        match self.backend.define_function(&func) {
            Ok(_) => {
                self.ctx
                    .prototypes
                    .insert(func.proto.name.clone(), func.proto.clone());
                writeln!(self.out, "Read a function definition: {func}")
            }
            Err(err) => self.recover(parser, err),
        }
    }

    fn handle_extern<I: Iterator<Item = char>>(
        &mut self,
        parser: &mut Parser<I>,
    ) -> io::Result<()> {
        let proto = match parser.parse_extern() {
            Ok(proto) => proto,
            Err(err) => return self.recover(parser, err),
        };

        self.ctx
            .prototypes
            .insert(proto.name.clone(), proto.clone());

        match self.backend.declare_prototype(&proto) {
            Ok(_) => writeln!(self.out, "Read extern: {proto}"),
            Err(err) => self.recover(parser, err),
        }
    }

    fn handle_top_level_expression<I: Iterator<Item = char>>(
        &mut self,
        parser: &mut Parser<I>,
    ) -> io::Result<()> {
        let anon = match parser.parse_top_level_expr(&self.ctx) {
            Ok(anon) => anon,
            Err(err) => return self.recover(parser, err),
        };

        // The anonymous function gets its own single-use unit; the
        // backend releases it again whether or not the run succeeds.
        let result = self
            .backend
            .define_function(&anon)
            .and_then(|unit| self.backend.compile_and_run_unit(unit));

        match result {
            Ok(value) => writeln!(self.out, "Evaluated to {value}"),
            Err(err) => self.recover(parser, err),
        }
    }

    /// Best-effort recovery: report the error and skip exactly one token.
    /// This can desynchronize on cascading errors mid-construct, which is
    /// accepted; the next well-formed statement parses normally.
    fn recover<I: Iterator<Item = char>>(
        &mut self,
        parser: &mut Parser<I>,
        err: impl Display,
    ) -> io::Result<()> {
        writeln!(self.out, "Error: {err}")?;
        parser.advance();
        Ok(())
    }

    fn prompt(&mut self) -> io::Result<()> {
        write!(self.out, "ready> ")?;
        self.out.flush()
    }
}
