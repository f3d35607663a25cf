//! ProtoScript Runtime
//!
//! Type registration, generic instantiation, and reflection for
//! prototype-based registered types.
//!
//! This crate provides:
//! - A dynamically-typed value model (`Rc`/`RefCell`, single-threaded)
//! - A script host owning containers and the type registry
//! - Generic type factories with memoized instantiation and deferred
//!   base/interface thunks
//! - A reflection API: member queries, invocation, delegate creation,
//!   field/property access, event add/remove, attribute retrieval
//!
//! # Usage
//!
//! ```ignore
//! use protoscript_runtime::{BindingFlags, Container, ScriptHost, TypeDef, Value};
//!
//! let host = ScriptHost::new();
//! let ty = host.register_class(Container::Global, "My.Class", def, None, vec![]);
//! host.set_metadata(&ty, metadata);
//!
//! for member in ty.members(BindingFlags::DEFAULT) {
//!     println!("{}", member.name());
//! }
//! ```

pub mod error;
pub mod generics;
pub mod host;
pub mod metadata;
pub mod reflect;
pub mod value;

// Re-export main types
pub use error::FaultError;
pub use generics::{BaseThunk, GenericFactory, InterfacesThunk};
pub use host::{Container, ScriptHost, TypeDef, TypeHandle, TypeObjectKind};
pub use metadata::{
    AccessorSpec, AttributeSpec, ConstructorSpec, EventSpec, FieldSpec, MemberSpec, MemberSpecKind,
    MethodSpec, PropertySpec, TypeMetadata,
};
pub use reflect::{
    BindingFlags, ConstructorInfo, EventInfo, FieldInfo, MemberInfo, MethodInfo, PropertyInfo,
};
pub use value::{native, NativeFn, Value};
