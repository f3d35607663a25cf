//! Plain-text rendering of the emitted tree.
//!
//! Tab indentation, single-quoted strings, `{Name}` placeholders for
//! type references. Object literals render inline unless an entry value
//! is a function expression.

use super::ast::{Expr, Stmt};

/// Render a statement list at top level.
pub fn write_stmts(stmts: &[Stmt]) -> String {
    let mut out = String::new();
    for stmt in stmts {
        write_stmt(&mut out, stmt, 0);
    }
    out
}

fn indent(out: &mut String, level: usize) {
    for _ in 0..level {
        out.push('\t');
    }
}

fn write_stmt(out: &mut String, stmt: &Stmt, level: usize) {
    match stmt {
        Stmt::Comment(text) => {
            indent(out, level);
            out.push_str(text);
            out.push('\n');
        }
        Stmt::Var(name, init) => {
            indent(out, level);
            out.push_str("var ");
            out.push_str(name);
            if let Some(init) = init {
                out.push_str(" = ");
                write_expr(out, init, level);
            }
            out.push_str(";\n");
        }
        Stmt::Expr(expr) => {
            indent(out, level);
            write_expr(out, expr, level);
            out.push_str(";\n");
        }
        Stmt::Return(expr) => {
            indent(out, level);
            out.push_str("return");
            if let Some(expr) = expr {
                out.push(' ');
                write_expr(out, expr, level);
            }
            out.push_str(";\n");
        }
    }
}

fn write_expr(out: &mut String, expr: &Expr, level: usize) {
    match expr {
        Expr::Null => out.push_str("null"),
        Expr::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Expr::Num(n) => write_num(out, *n),
        Expr::Str(s) => write_str(out, s),
        Expr::Ident(name) => out.push_str(name),
        Expr::TypeRef(name) => {
            out.push('{');
            out.push_str(name);
            out.push('}');
        }
        Expr::Raw(text) => out.push_str(text),
        Expr::Member(target, name) => {
            write_expr(out, target, level);
            out.push('.');
            out.push_str(name);
        }
        Expr::Index(target, index) => {
            write_expr(out, target, level);
            out.push('[');
            write_expr(out, index, level);
            out.push(']');
        }
        Expr::Call(callee, args) => {
            write_expr(out, callee, level);
            write_args(out, args, level);
        }
        Expr::New(callee, args) => {
            out.push_str("new ");
            write_expr(out, callee, level);
            write_args(out, args, level);
        }
        Expr::Assign(lhs, rhs) => {
            write_expr(out, lhs, level);
            out.push_str(" = ");
            write_expr(out, rhs, level);
        }
        Expr::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_expr(out, item, level);
            }
            out.push(']');
        }
        Expr::Function { params, body } => {
            out.push_str("function(");
            out.push_str(&params.join(", "));
            out.push_str(") {\n");
            for stmt in body {
                write_stmt(out, stmt, level + 1);
            }
            indent(out, level);
            out.push('}');
        }
        Expr::Object(entries) => write_object(out, entries, level),
    }
}

fn write_args(out: &mut String, args: &[Expr], level: usize) {
    out.push('(');
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        write_expr(out, arg, level);
    }
    out.push(')');
}

fn write_object(out: &mut String, entries: &[(String, Expr)], level: usize) {
    if entries.is_empty() {
        out.push_str("{}");
        return;
    }
    let multiline = entries
        .iter()
        .any(|(_, v)| matches!(v, Expr::Function { .. }));
    if multiline {
        out.push_str("{\n");
        for (i, (key, value)) in entries.iter().enumerate() {
            indent(out, level + 1);
            out.push_str(key);
            out.push_str(": ");
            write_expr(out, value, level + 1);
            if i + 1 < entries.len() {
                out.push(',');
            }
            out.push('\n');
        }
        indent(out, level);
        out.push('}');
    } else {
        out.push_str("{ ");
        for (i, (key, value)) in entries.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            out.push_str(key);
            out.push_str(": ");
            write_expr(out, value, level);
        }
        out.push_str(" }");
    }
}

fn write_num(out: &mut String, n: f64) {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        out.push_str(&format!("{}", n as i64));
    } else {
        out.push_str(&format!("{}", n));
    }
}

fn write_str(out: &mut String, s: &str) {
    out.push('\'');
    for c in s.chars() {
        match c {
            '\'' => out.push_str("\\'"),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out.push('\'');
}
