//! Script value model
//!
//! Dynamically-typed values as the registered code sees them. Equality
//! is structural for primitives and identity for objects, functions,
//! and type handles. Everything is single-threaded `Rc`/`RefCell`
//! sharing; callers serialize their own mutation.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::error::FaultError;
use crate::host::TypeHandle;

/// A native closure: `(this, args) -> result`.
pub type NativeFn = Rc<dyn Fn(Value, &[Value]) -> Result<Value, FaultError>>;

/// Shared mutable field map backing script objects.
pub type ObjectRef = Rc<RefCell<FxHashMap<String, Value>>>;

/// Wrap a closure as a [`NativeFn`].
pub fn native(f: impl Fn(Value, &[Value]) -> Result<Value, FaultError> + 'static) -> NativeFn {
    Rc::new(f)
}

#[derive(Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Num(f64),
    Str(Rc<str>),
    Array(Rc<RefCell<Vec<Value>>>),
    Object(ObjectRef),
    Fn(NativeFn),
    Type(TypeHandle),
}

impl Value {
    /// A fresh empty object.
    pub fn object() -> Value {
        Value::Object(Rc::new(RefCell::new(FxHashMap::default())))
    }

    pub fn str(s: impl AsRef<str>) -> Value {
        Value::Str(Rc::from(s.as_ref()))
    }

    pub fn array(items: Vec<Value>) -> Value {
        Value::Array(Rc::new(RefCell::new(items)))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Call the value as a function.
    pub fn call(&self, this: Value, args: &[Value]) -> Result<Value, FaultError> {
        match self {
            Value::Fn(f) => f(this, args),
            other => Err(FaultError::NotInvokable(format!("{:?}", other))),
        }
    }

    /// Read an own field of an object; `Null` when absent.
    pub fn get_field(&self, name: &str) -> Result<Value, FaultError> {
        match self {
            Value::Object(fields) => Ok(fields.borrow().get(name).cloned().unwrap_or(Value::Null)),
            Value::Null => Err(FaultError::TargetRequired),
            other => Err(FaultError::MemberNotFound(format!("{}.{:?}", name, other))),
        }
    }

    /// Write an own field of an object.
    pub fn set_field(&self, name: &str, value: Value) -> Result<(), FaultError> {
        match self {
            Value::Object(fields) => {
                fields.borrow_mut().insert(name.to_string(), value);
                Ok(())
            }
            Value::Null => Err(FaultError::TargetRequired),
            other => Err(FaultError::MemberNotFound(format!("{}.{:?}", name, other))),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_num(&self) -> Option<f64> {
        match self {
            Value::Num(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_type(&self) -> Option<&TypeHandle> {
        match self {
            Value::Type(t) => Some(t),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Num(a), Value::Num(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b),
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            (Value::Fn(a), Value::Fn(b)) => Rc::ptr_eq(a, b),
            (Value::Type(a), Value::Type(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Num(n) => write!(f, "{}", n),
            Value::Str(s) => write!(f, "{:?}", s),
            Value::Array(items) => write!(f, "{:?}", items.borrow()),
            Value::Object(_) => write!(f, "[object]"),
            Value::Fn(_) => write!(f, "[function]"),
            Value::Type(t) => write!(f, "[type {}]", t.full_name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_equality_is_structural() {
        assert_eq!(Value::Num(1.0), Value::Num(1.0));
        assert_eq!(Value::str("a"), Value::str("a"));
        assert_ne!(Value::str("a"), Value::str("b"));
        assert_ne!(Value::Null, Value::Bool(false));
    }

    #[test]
    fn test_object_equality_is_identity() {
        let a = Value::object();
        let b = Value::object();
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }

    #[test]
    fn test_function_equality_is_identity() {
        let f = Value::Fn(native(|_, _| Ok(Value::Null)));
        let g = Value::Fn(native(|_, _| Ok(Value::Null)));
        assert_eq!(f, f.clone());
        assert_ne!(f, g);
    }

    #[test]
    fn test_field_round_trip() {
        let obj = Value::object();
        obj.set_field("x", Value::Num(3.0)).unwrap();
        assert_eq!(obj.get_field("x").unwrap(), Value::Num(3.0));
        assert_eq!(obj.get_field("missing").unwrap(), Value::Null);
    }

    #[test]
    fn test_calling_a_non_function_faults() {
        let err = Value::Num(1.0).call(Value::Null, &[]).unwrap_err();
        assert!(matches!(err, FaultError::NotInvokable(_)));
    }
}
