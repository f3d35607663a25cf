//! Runtime faults.
//!
//! Faults are programmer errors raised synchronously at the point of
//! misuse. They terminate only the offending call; there is no retry or
//! recovery path.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FaultError {
    /// An instance member was invoked without a target.
    #[error("an instance member requires a non-null target")]
    TargetRequired,

    /// A static member was given a target.
    #[error("a static member must not be given a target")]
    TargetNotAllowed,

    /// The supplied type-argument count does not match the member's
    /// declared generic parameter count.
    #[error("expected {expected} type argument(s), got {actual}")]
    TypeArgumentCountMismatch { expected: usize, actual: usize },

    /// `make_generic_type` was applied to a non-generic type.
    #[error("the type is not a generic type definition")]
    NotGeneric,

    /// A generic factory was run with the wrong argument count.
    #[error("generic type of arity {expected} instantiated with {actual} argument(s)")]
    ArityMismatch { expected: usize, actual: usize },

    /// No script entity exists for the requested member.
    #[error("member not found: {0}")]
    MemberNotFound(String),

    /// The resolved value cannot be called.
    #[error("value is not invokable: {0}")]
    NotInvokable(String),
}
