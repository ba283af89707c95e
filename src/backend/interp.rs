//! Reference backend: compiles function bodies into a slot-resolved form
//! at definition time and executes them on demand. It performs the same
//! checks a code generator would at `def` time (unbound variables,
//! unknown callees, call arity against the declared prototype), so the
//! driver sees the same error surface a JIT would produce.

use std::collections::HashMap;

use crate::backend::{Backend, BackendError, BackendResult};
use crate::frontend::ast::{Function, Prototype};

/// Executable form of an expression: variables are resolved to parameter
/// slots, operators are validated, callees are resolved by name.
#[derive(Debug, Clone, PartialEq)]
pub enum Code {
    Const(f64),
    Param(usize),
    Binary {
        op: char,
        left: Box<Code>,
        right: Box<Code>,
    },
    Call {
        callee: String,
        args: Vec<Code>,
    },
}

/// Native functions an `extern` declaration can bind to, standing in for
/// the JIT's symbol resolution against libm.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Builtin {
    Unary(fn(f64) -> f64),
    Binary(fn(f64, f64) -> f64),
}

impl Builtin {
    fn resolve(name: &str) -> Option<Builtin> {
        Some(match name {
            "sin" => Builtin::Unary(f64::sin),
            "cos" => Builtin::Unary(f64::cos),
            "tan" => Builtin::Unary(f64::tan),
            "atan" => Builtin::Unary(f64::atan),
            "sqrt" => Builtin::Unary(f64::sqrt),
            "exp" => Builtin::Unary(f64::exp),
            "log" => Builtin::Unary(f64::ln),
            "log10" => Builtin::Unary(f64::log10),
            "fabs" => Builtin::Unary(f64::abs),
            "floor" => Builtin::Unary(f64::floor),
            "ceil" => Builtin::Unary(f64::ceil),
            "pow" => Builtin::Binary(f64::powf),
            "atan2" => Builtin::Binary(f64::atan2),
            "fmin" => Builtin::Binary(f64::min),
            "fmax" => Builtin::Binary(f64::max),
            _ => return None,
        })
    }

    fn arity(self) -> usize {
        match self {
            Builtin::Unary(_) => 1,
            Builtin::Binary(_) => 2,
        }
    }

    fn call(self, callee: &str, args: &[f64]) -> BackendResult<f64> {
        match (self, args) {
            (Builtin::Unary(f), [x]) => Ok(f(*x)),
            (Builtin::Binary(f), [x, y]) => Ok(f(*x, *y)),
            _ => Err(BackendError::ArityMismatch {
                callee: callee.to_string(),
                expected: self.arity(),
                found: args.len(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum SlotKind {
    /// Declared via `extern` or reserved during definition; no body yet.
    Declared,
    /// Declared via `extern` and resolved to a native function.
    Native(Builtin),
    /// Fully defined with a compiled body.
    Defined(Code),
}

#[derive(Debug, Clone, PartialEq)]
struct Slot {
    proto: Prototype,
    kind: SlotKind,
}

/// The backend state: every function the session has declared or defined,
/// plus the parameter bindings of the body currently being compiled.
#[derive(Debug, Default)]
pub struct Interpreter {
    functions: HashMap<String, Slot>,
    bindings: HashMap<String, usize>,
}

impl Interpreter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a function of this name is currently known (declared or
    /// defined). Anonymous units are gone by the time they could be seen
    /// here.
    pub fn knows(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    fn eval(&self, code: &Code, frame: &[f64]) -> BackendResult<f64> {
        match code {
            Code::Const(value) => Ok(*value),
            Code::Param(slot) => frame
                .get(*slot)
                .copied()
                .ok_or_else(|| BackendError::UnknownVariable(format!("parameter #{slot}"))),
            Code::Binary { op, left, right } => {
                let left = self.eval(left, frame)?;
                let right = self.eval(right, frame)?;
                match op {
                    '+' => Ok(left + right),
                    '-' => Ok(left - right),
                    '*' => Ok(left * right),
                    // comparison produces 0.0 or 1.0, like a bool widened
                    // back to double
                    '<' => Ok(if left < right { 1.0 } else { 0.0 }),
                    _ => Err(BackendError::UnsupportedOperator(*op)),
                }
            }
            Code::Call { callee, args } => {
                let slot = self
                    .functions
                    .get(callee)
                    .ok_or_else(|| BackendError::UnknownFunction(callee.clone()))?;
                let mut frame_args = Vec::with_capacity(args.len());
                for arg in args {
                    frame_args.push(self.eval(arg, frame)?);
                }
                match &slot.kind {
                    SlotKind::Defined(body) => self.eval(body, &frame_args),
                    SlotKind::Native(builtin) => builtin.call(callee, &frame_args),
                    // Declared but never defined and not resolvable as a
                    // native function: the symbol fails at run time.
                    SlotKind::Declared => Err(BackendError::UnknownFunction(callee.clone())),
                }
            }
        }
    }
}

impl Backend for Interpreter {
    type Value = Code;
    type FuncId = String;

    fn emit_constant(&mut self, value: f64) -> BackendResult<Code> {
        Ok(Code::Const(value))
    }

    fn emit_variable_ref(&mut self, name: &str) -> BackendResult<Code> {
        match self.bindings.get(name) {
            Some(&slot) => Ok(Code::Param(slot)),
            None => Err(BackendError::UnknownVariable(name.to_string())),
        }
    }

    fn emit_binary(&mut self, op: char, left: Code, right: Code) -> BackendResult<Code> {
        match op {
            '+' | '-' | '*' | '<' => Ok(Code::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            }),
            _ => Err(BackendError::UnsupportedOperator(op)),
        }
    }

    fn emit_call(&mut self, callee: &str, args: Vec<Code>) -> BackendResult<Code> {
        let slot = self
            .functions
            .get(callee)
            .ok_or_else(|| BackendError::UnknownFunction(callee.to_string()))?;
        let expected = slot.proto.params.len();
        if args.len() != expected {
            return Err(BackendError::ArityMismatch {
                callee: callee.to_string(),
                expected,
                found: args.len(),
            });
        }
        Ok(Code::Call {
            callee: callee.to_string(),
            args,
        })
    }

    fn declare_prototype(&mut self, proto: &Prototype) -> BackendResult<String> {
        match self.functions.get_mut(&proto.name) {
            // A definition keeps its compiled prototype; re-declaring it
            // is a no-op. Bodyless declarations refresh to the newest
            // signature.
            Some(slot) => {
                if !matches!(slot.kind, SlotKind::Defined(_)) {
                    slot.proto = proto.clone();
                }
            }
            None => {
                let kind = match Builtin::resolve(&proto.name) {
                    Some(builtin) => SlotKind::Native(builtin),
                    None => SlotKind::Declared,
                };
                self.functions.insert(
                    proto.name.clone(),
                    Slot {
                        proto: proto.clone(),
                        kind,
                    },
                );
            }
        }
        Ok(proto.name.clone())
    }

    fn define_function(&mut self, function: &Function) -> BackendResult<String> {
        let name = function.proto.name.clone();
        if let Some(slot) = self.functions.get(&name) {
            if matches!(slot.kind, SlotKind::Defined(_)) {
                return Err(BackendError::Redefinition(name));
            }
        }

        // Reserve the slot with the definition's own prototype so the
        // body can call itself recursively with the right arity. Keep the
        // previous declaration around in case the body fails to compile.
        let previous = self.functions.insert(
            name.clone(),
            Slot {
                proto: function.proto.clone(),
                kind: SlotKind::Declared,
            },
        );

        self.bindings = function
            .proto
            .params
            .iter()
            .enumerate()
            .map(|(slot, param)| (param.clone(), slot))
            .collect();
        let compiled = self.emit_expr(&function.body);
        self.bindings.clear();

        match compiled {
            Ok(code) => {
                self.functions.insert(
                    name.clone(),
                    Slot {
                        proto: function.proto.clone(),
                        kind: SlotKind::Defined(code),
                    },
                );
                Ok(name)
            }
            Err(err) => {
                // Roll back: the failed definition must not be observable.
                match previous {
                    Some(slot) => {
                        self.functions.insert(name, slot);
                    }
                    None => {
                        self.functions.remove(&name);
                    }
                }
                Err(err)
            }
        }
    }

    fn compile_and_run_unit(&mut self, unit: String) -> BackendResult<f64> {
        let result = match self.functions.get(&unit) {
            Some(Slot {
                kind: SlotKind::Defined(code),
                ..
            }) => self.eval(code, &[]),
            Some(_) | None => Err(BackendError::UnknownFunction(unit.clone())),
        };
        // The unit is single-use: drop it whether or not it ran, so a
        // failed evaluation cannot leak into later statements.
        self.functions.remove(&unit);
        result
    }
}
