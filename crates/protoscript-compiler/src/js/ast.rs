//! Expression and statement nodes for emitted registration code.

use serde::{Deserialize, Serialize};

/// An expression in the emitted program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    /// `null`
    Null,
    /// Boolean literal
    Bool(bool),
    /// Numeric literal
    Num(f64),
    /// String literal (single-quoted on output)
    Str(String),
    /// Plain identifier
    Ident(String),
    /// A reference to a registered type, resolved by the external
    /// linker/printer. Rendered as `{Name}`.
    TypeRef(String),
    /// `target.name`
    Member(Box<Expr>, String),
    /// `target[index]`
    Index(Box<Expr>, Box<Expr>),
    /// `callee(args...)`
    Call(Box<Expr>, Vec<Expr>),
    /// `new callee(args...)`
    New(Box<Expr>, Vec<Expr>),
    /// Anonymous function expression
    Function { params: Vec<String>, body: Vec<Stmt> },
    /// Object literal with ordered entries
    Object(Vec<(String, Expr)>),
    /// Array literal
    Array(Vec<Expr>),
    /// `lhs = rhs` (right-associative when chained)
    Assign(Box<Expr>, Box<Expr>),
    /// Verbatim expression text (mixin target expressions)
    Raw(String),
}

/// A statement in the emitted program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Stmt {
    /// Expression statement
    Expr(Expr),
    /// `var name = init;` (or a bare `var name;`)
    Var(String, Option<Expr>),
    /// `return expr;` (or a bare `return;`)
    Return(Option<Expr>),
    /// A verbatim comment line, written as-is
    Comment(String),
}

impl Expr {
    /// `target.name`
    pub fn member(self, name: impl Into<String>) -> Expr {
        Expr::Member(Box::new(self), name.into())
    }

    /// `callee(args...)`
    pub fn call(self, args: Vec<Expr>) -> Expr {
        Expr::Call(Box::new(self), args)
    }

    /// `self = rhs`
    pub fn assign(self, rhs: Expr) -> Expr {
        Expr::Assign(Box::new(self), Box::new(rhs))
    }

    pub fn ident(name: impl Into<String>) -> Expr {
        Expr::Ident(name.into())
    }

    pub fn str(value: impl Into<String>) -> Expr {
        Expr::Str(value.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_helpers() {
        let e = Expr::ident("$T").member("prototype").assign(Expr::Null);
        match e {
            Expr::Assign(lhs, rhs) => {
                assert_eq!(*rhs, Expr::Null);
                assert_eq!(*lhs, Expr::Member(Box::new(Expr::Ident("$T".into())), "prototype".into()));
            }
            other => panic!("unexpected expr: {:?}", other),
        }
    }
}
