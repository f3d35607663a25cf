//! Target-code model
//!
//! A small statement/expression tree the emitters produce. The real
//! pretty-printer lives outside this crate; the writer here renders the
//! tree in a fixed plain-text layout so emitted structure can be
//! observed by tests and demos.

pub mod ast;
pub mod writer;

pub use ast::{Expr, Stmt};
pub use writer::write_stmts;
