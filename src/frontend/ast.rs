use std::fmt;

use itertools::Itertools;

/// An expression tree. Each node exclusively owns its children, so the
/// whole tree drops when the statement that produced it is done.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    /// Reference to a parameter of the enclosing function; resolution
    /// happens in the backend, not here.
    Variable(String),
    Binary {
        op: char,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Call {
        callee: String,
        args: Vec<Expr>,
    },
}

/// A function signature: name plus ordered parameter names. Duplicate
/// parameter names are not rejected; the backend's binding rules decide
/// what they mean.
#[derive(Debug, Clone, PartialEq)]
pub struct Prototype {
    pub name: String,
    pub params: Vec<String>,
}

/// A full function definition: a prototype and its single-expression body.
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub proto: Prototype,
    pub body: Expr,
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Number(value) => write!(f, "{value}"),
            Expr::Variable(name) => write!(f, "{name}"),
            Expr::Binary { op, left, right } => write!(f, "({left} {op} {right})"),
            Expr::Call { callee, args } => {
                write!(f, "{callee}({})", args.iter().join(", "))
            }
        }
    }
}

impl fmt::Display for Prototype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, self.params.iter().join(" "))
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "def {} {}", self.proto, self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_round_trips_readably() {
        let func = Function {
            proto: Prototype {
                name: "foo".to_string(),
                params: vec!["a".to_string(), "b".to_string()],
            },
            body: Expr::Binary {
                op: '+',
                left: Box::new(Expr::Variable("a".to_string())),
                right: Box::new(Expr::Call {
                    callee: "bar".to_string(),
                    args: vec![Expr::Number(1.0), Expr::Variable("b".to_string())],
                }),
            },
        };
        assert_eq!(func.to_string(), "def foo(a b) (a + bar(1, b))");
    }
}
