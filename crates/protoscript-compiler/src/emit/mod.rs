//! Registration-code emission
//!
//! Turns validated type descriptors into the registration constructs the
//! script runtime consumes: constructor functions, prototype objects,
//! static members, generic factories, registration calls, and reflection
//! metadata.

pub mod class_emitter;
pub mod metadata;
pub mod type_refs;

pub use class_emitter::{emit_program, emit_type};

use crate::descriptor::{TypeDescriptor, Visibility};

/// The name under which a type is registered with the runtime. Internal
/// types get a `$` prefix and `$`-separated nesting; generic types that
/// carry their arguments append `$<arity>`.
pub fn registered_name(ty: &TypeDescriptor) -> String {
    let mut name = if ty.visibility == Visibility::Internal {
        format!("${}", ty.name.replace('.', "$"))
    } else {
        ty.name.clone()
    };
    if ty.carries_generic_arguments() {
        name.push('$');
        name.push_str(&ty.generic_arity.to_string());
    }
    name
}

/// The local variable the type (or its factory) is bound to.
pub fn local_binding(ty: &TypeDescriptor) -> String {
    format!("${}", registered_name(ty).replace('.', "_"))
}
