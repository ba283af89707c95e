//! Interactive frontend for a tiny expression language: a streaming
//! lexer, a recursive-descent parser with precedence climbing, and a
//! session driver that hands completed definitions and expressions to a
//! pluggable backend for immediate evaluation.

pub mod backend;
pub mod frontend;
pub mod repl;
pub mod session;

pub use backend::{Backend, BackendError, BackendResult};
pub use frontend::ast::{Expr, Function, Prototype};
pub use frontend::lexer::{Chars, Lexer, Token};
pub use frontend::parser::{Parser, SyntaxError};
pub use repl::Session;
pub use session::SessionContext;
