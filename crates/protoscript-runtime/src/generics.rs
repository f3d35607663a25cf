//! Generic type machinery
//!
//! Open generic types store a factory of the given arity. Instantiation
//! runs the factory once per distinct argument list; results are
//! memoized by key purely as an optimization. Base and interface
//! references of an instance are deferred thunks so mutually recursive
//! instantiations never resolve eagerly.

use std::rc::Rc;

use crate::host::{ScriptHost, TypeHandle};

/// Builds one concrete instance of an open generic type. The factory
/// registers the instance with the host and returns its handle.
pub type GenericFactory = Rc<dyn Fn(&ScriptHost, &[TypeHandle]) -> TypeHandle>;

/// Deferred base-type reference of a generic class instance.
pub type BaseThunk = Box<dyn Fn() -> Option<TypeHandle>>;

/// Deferred interface list of a generic instance.
pub type InterfacesThunk = Box<dyn Fn() -> Vec<TypeHandle>>;

/// Factory and arity of an open generic type.
pub struct GenericInfo {
    pub factory: GenericFactory,
    pub arity: usize,
}

/// Memoization key of an instantiation.
pub fn instantiation_key(open: &TypeHandle, args: &[TypeHandle]) -> String {
    let mut key = open.name().to_string();
    key.push('[');
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            key.push(',');
        }
        key.push_str(&arg.full_name());
    }
    key.push(']');
    key
}
