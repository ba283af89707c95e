//! The narrow interface the session driver talks to. The frontend hands
//! completed AST nodes across this boundary and only ever consumes
//! success or failure; what "code generation" means is entirely up to
//! the implementation behind the trait.

pub mod interp;

use thiserror::Error;

use crate::frontend::ast::{Expr, Function, Prototype};

/// Semantic errors reported back by a backend. These are recoverable:
/// the driver reports them and moves on to the next statement.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BackendError {
    #[error("Unknown variable name: {0}")]
    UnknownVariable(String),

    #[error("Unknown function referenced: {0}")]
    UnknownFunction(String),

    #[error("Incorrect # arguments passed: {callee} takes {expected}, got {found}")]
    ArityMismatch {
        callee: String,
        expected: usize,
        found: usize,
    },

    #[error("invalid binary operator '{0}'")]
    UnsupportedOperator(char),

    #[error("Function cannot be redefined: {0}")]
    Redefinition(String),
}

pub type BackendResult<T> = Result<T, BackendError>;

/// A code-generating collaborator. One emit entry point per expression
/// kind, plus declaration, definition, and one-shot execution of an
/// anonymous unit.
pub trait Backend {
    /// Handle for an emitted expression value.
    type Value;
    /// Handle for a declared or defined function.
    type FuncId;

    fn emit_constant(&mut self, value: f64) -> BackendResult<Self::Value>;

    /// Resolve a name against the current function's parameter bindings.
    /// The backend establishes those bindings when it enters a function
    /// body; outside one, every name is unknown.
    fn emit_variable_ref(&mut self, name: &str) -> BackendResult<Self::Value>;

    fn emit_binary(
        &mut self,
        op: char,
        left: Self::Value,
        right: Self::Value,
    ) -> BackendResult<Self::Value>;

    fn emit_call(&mut self, callee: &str, args: Vec<Self::Value>) -> BackendResult<Self::Value>;

    /// Declare a function signature without a body. Re-declaring an
    /// existing function refreshes its prototype and is not an error.
    fn declare_prototype(&mut self, proto: &Prototype) -> BackendResult<Self::FuncId>;

    /// Materialize a full definition. Fails with [`BackendError::Redefinition`]
    /// if the name already has a body; a declared-but-bodyless function may
    /// be completed. A failure while emitting the body must leave the
    /// backend as if the definition was never attempted.
    fn define_function(&mut self, function: &Function) -> BackendResult<Self::FuncId>;

    /// Compile and execute a zero-argument function once, returning its
    /// numeric result. Whatever unit-scoped resources the call acquires
    /// are released before it returns, success or failure, so nothing
    /// from the evaluation leaks into later statements.
    fn compile_and_run_unit(&mut self, unit: Self::FuncId) -> BackendResult<f64>;

    /// Emit a whole expression tree bottom-up. Exhaustive over the closed
    /// set of node kinds; backends get this dispatch for free and only
    /// implement the per-kind entry points.
    fn emit_expr(&mut self, expr: &Expr) -> BackendResult<Self::Value> {
        match expr {
            Expr::Number(value) => self.emit_constant(*value),
            Expr::Variable(name) => self.emit_variable_ref(name),
            Expr::Binary { op, left, right } => {
                let left = self.emit_expr(left)?;
                let right = self.emit_expr(right)?;
                self.emit_binary(*op, left, right)
            }
            Expr::Call { callee, args } => {
                let mut emitted = Vec::with_capacity(args.len());
                for arg in args {
                    emitted.push(self.emit_expr(arg)?);
                }
                self.emit_call(callee, emitted)
            }
        }
    }
}
