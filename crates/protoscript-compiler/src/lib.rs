//! ProtoScript Compiler
//!
//! Translation of a statically-typed object model into registration code
//! for a prototype-based script runtime.
//!
//! This crate provides:
//! - Typed descriptors for classes, interfaces, members, and attributes
//! - Reflection eligibility validation with numbered diagnostics
//! - Emission of constructor functions, prototypes, generic factories,
//!   and registration calls
//! - Reflection metadata emission (`setMetadata` descriptors)
//!
//! # Usage
//!
//! ```ignore
//! use protoscript_compiler::descriptor::TypeUniverse;
//! use protoscript_compiler::diagnostics::DiagnosticSink;
//! use protoscript_compiler::emit::emit_program;
//! use protoscript_compiler::js::write_stmts;
//!
//! let universe = TypeUniverse::from_descriptors(&types);
//! let mut sink = DiagnosticSink::new();
//! let stmts = emit_program(&types, &universe, &mut sink);
//! if sink.has_errors() {
//!     sink.emit()?;
//! } else {
//!     let script = write_stmts(&stmts);
//! }
//! ```

pub mod descriptor;
pub mod diagnostics;
pub mod emit;
pub mod js;
pub mod validator;

// Re-export main types
pub use descriptor::{
    AccessorDescriptor, AttributeInstance, MemberDescriptor, MemberKind, TypeDescriptor, TypeKind,
    TypeRef, TypeUniverse, Usability, Visibility,
};
pub use diagnostics::{Diagnostic, DiagnosticSeverity, DiagnosticSink};
pub use emit::{emit_program, emit_type};
pub use validator::{validate_member, validate_type, Verdict};
