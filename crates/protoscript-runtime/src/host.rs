//! Script host: containers and the type registry
//!
//! The host owns the global namespace object, per-module exports
//! objects, and the append-only type registry. Registration operations
//! mirror the vocabulary the compiler emits; nothing here is removed or
//! replaced once registered.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use once_cell::unsync::OnceCell;
use rustc_hash::FxHashMap;

use crate::error::FaultError;
use crate::generics::{instantiation_key, BaseThunk, GenericFactory, GenericInfo, InterfacesThunk};
use crate::metadata::TypeMetadata;
use crate::value::{NativeFn, ObjectRef, Value};

/// Where a registered type is exported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Container<'a> {
    /// The global namespace root.
    Global,
    /// A module's exports object.
    Module(&'a str),
    /// Not exported (internal visibility); the type is still defined.
    None,
}

/// Classification of a registered type object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeObjectKind {
    Class,
    Interface,
    GenericClassDefinition,
    GenericInterfaceDefinition,
    /// Built-in types such as the universal type.
    Builtin,
}

pub(crate) struct TypeObject {
    name: String,
    kind: TypeObjectKind,
    non_reflectable: bool,
    ctor: Option<NativeFn>,
    named_ctors: FxHashMap<String, NativeFn>,
    prototype: FxHashMap<String, Value>,
    statics: RefCell<FxHashMap<String, Value>>,
    base: OnceCell<Option<TypeHandle>>,
    base_thunk: RefCell<Option<BaseThunk>>,
    interfaces: OnceCell<Vec<TypeHandle>>,
    interfaces_thunk: RefCell<Option<InterfacesThunk>>,
    generic: Option<GenericInfo>,
    /// For generic instances: the open type and the argument list.
    instance_of: Option<(TypeHandle, Vec<TypeHandle>)>,
    metadata: RefCell<Option<Rc<TypeMetadata>>>,
}

impl TypeObject {
    fn new(name: &str, kind: TypeObjectKind) -> TypeObject {
        TypeObject {
            name: name.to_string(),
            kind,
            non_reflectable: false,
            ctor: None,
            named_ctors: FxHashMap::default(),
            prototype: FxHashMap::default(),
            statics: RefCell::new(FxHashMap::default()),
            base: OnceCell::new(),
            base_thunk: RefCell::new(None),
            interfaces: OnceCell::new(),
            interfaces_thunk: RefCell::new(None),
            generic: None,
            instance_of: None,
            metadata: RefCell::new(None),
        }
    }
}

/// Shared handle to a registered type object. Equality is identity.
#[derive(Clone)]
pub struct TypeHandle(Rc<TypeObject>);

thread_local! {
    static OBJECT_TYPE: TypeHandle =
        TypeHandle(Rc::new(TypeObject::new("Object", TypeObjectKind::Builtin)));
}

impl TypeHandle {
    /// The universal type; also the rendering of void and erased
    /// positions.
    pub fn object() -> TypeHandle {
        OBJECT_TYPE.with(|t| t.clone())
    }

    /// Registered name (open generic definitions carry their arity
    /// suffix here).
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Display name: registered name for named types, `Name[args]` for
    /// generic instances.
    pub fn full_name(&self) -> String {
        match &self.0.instance_of {
            Some((open, args)) => instantiation_key(open, args),
            None => self.0.name.clone(),
        }
    }

    pub fn kind(&self) -> TypeObjectKind {
        self.0.kind
    }

    pub fn is_non_reflectable(&self) -> bool {
        self.0.non_reflectable
    }

    /// Base type, resolving a deferred thunk on first access.
    pub fn base(&self) -> Option<TypeHandle> {
        self.0
            .base
            .get_or_init(|| match self.0.base_thunk.borrow_mut().take() {
                Some(thunk) => thunk(),
                None => None,
            })
            .clone()
    }

    /// Implemented interfaces, resolving a deferred thunk on first
    /// access.
    pub fn interfaces(&self) -> Vec<TypeHandle> {
        self.0
            .interfaces
            .get_or_init(|| match self.0.interfaces_thunk.borrow_mut().take() {
                Some(thunk) => thunk(),
                None => Vec::new(),
            })
            .clone()
    }

    /// The open type and arguments when this is a generic instance.
    pub fn generic_instance_of(&self) -> Option<(TypeHandle, Vec<TypeHandle>)> {
        self.0.instance_of.clone()
    }

    pub(crate) fn ctor_fn(&self) -> Option<NativeFn> {
        self.0.ctor.clone()
    }

    pub(crate) fn named_ctor(&self, name: &str) -> Option<NativeFn> {
        self.0.named_ctors.get(name).cloned()
    }

    /// Prototype lookup, walking the base chain.
    pub(crate) fn prototype_value(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.0.prototype.get(name) {
            return Some(value.clone());
        }
        self.base().and_then(|b| b.prototype_value(name))
    }

    pub(crate) fn static_value(&self, name: &str) -> Option<Value> {
        self.0.statics.borrow().get(name).cloned()
    }

    pub(crate) fn set_static(&self, name: &str, value: Value) {
        self.0.statics.borrow_mut().insert(name.to_string(), value);
    }

    /// Attached reflection metadata, when any was registered.
    pub fn metadata(&self) -> Option<Rc<TypeMetadata>> {
        self.0.metadata.borrow().clone()
    }

    pub(crate) fn generic_info(&self) -> Option<&GenericInfo> {
        self.0.generic.as_ref()
    }
}

impl PartialEq for TypeHandle {
    fn eq(&self, other: &TypeHandle) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for TypeHandle {}

impl fmt::Debug for TypeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeHandle({})", self.full_name())
    }
}

/// Shape of a type being registered: its constructor functions and
/// member implementations. Mirrors what emitted registration code
/// attaches to a type identifier before the registration call.
#[derive(Default)]
pub struct TypeDef {
    ctor: Option<NativeFn>,
    named_ctors: FxHashMap<String, NativeFn>,
    prototype: FxHashMap<String, Value>,
    statics: FxHashMap<String, Value>,
    non_reflectable: bool,
}

impl TypeDef {
    pub fn new() -> TypeDef {
        TypeDef::default()
    }

    /// The unnamed constructor, bound to the type identifier itself.
    pub fn ctor(mut self, f: NativeFn) -> TypeDef {
        self.ctor = Some(f);
        self
    }

    /// A named constructor sharing the type's prototype. Serializable
    /// `$ctor` functions land here too.
    pub fn named_ctor(mut self, name: &str, f: NativeFn) -> TypeDef {
        self.named_ctors.insert(name.to_string(), f);
        self
    }

    /// An instance member implementation on the prototype.
    pub fn instance_method(mut self, name: &str, f: NativeFn) -> TypeDef {
        self.prototype.insert(name.to_string(), Value::Fn(f));
        self
    }

    pub fn static_method(mut self, name: &str, f: NativeFn) -> TypeDef {
        self.statics.insert(name.to_string(), Value::Fn(f));
        self
    }

    pub fn static_field(mut self, name: &str, value: Value) -> TypeDef {
        self.statics.insert(name.to_string(), value);
        self
    }

    /// Mark the type as never surfacing through attribute retrieval.
    pub fn non_reflectable(mut self) -> TypeDef {
        self.non_reflectable = true;
        self
    }

    fn into_object(self, name: &str, kind: TypeObjectKind) -> TypeObject {
        let mut obj = TypeObject::new(name, kind);
        obj.ctor = self.ctor;
        obj.named_ctors = self.named_ctors;
        obj.prototype = self.prototype;
        obj.statics = RefCell::new(self.statics);
        obj.non_reflectable = self.non_reflectable;
        obj
    }
}

/// Owns containers and the type registry.
pub struct ScriptHost {
    global: ObjectRef,
    modules: RefCell<FxHashMap<String, ObjectRef>>,
    registry: RefCell<FxHashMap<String, TypeHandle>>,
    /// Memoized generic instantiations, purely an optimization.
    instances: RefCell<FxHashMap<String, TypeHandle>>,
}

impl Default for ScriptHost {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptHost {
    pub fn new() -> ScriptHost {
        ScriptHost {
            global: Rc::new(RefCell::new(FxHashMap::default())),
            modules: RefCell::new(FxHashMap::default()),
            registry: RefCell::new(FxHashMap::default()),
            instances: RefCell::new(FxHashMap::default()),
        }
    }

    /// The universal type handle.
    pub fn object_type(&self) -> TypeHandle {
        TypeHandle::object()
    }

    /// Register a class with an optional base and interface list.
    pub fn register_class(
        &self,
        container: Container<'_>,
        name: &str,
        def: TypeDef,
        base: Option<TypeHandle>,
        interfaces: Vec<TypeHandle>,
    ) -> TypeHandle {
        let obj = def.into_object(name, TypeObjectKind::Class);
        let _ = obj.base.set(base);
        let _ = obj.interfaces.set(interfaces);
        self.finish_registration(container, name, obj)
    }

    /// Register an interface. The definition carries the interface's
    /// type function and null member placeholders.
    pub fn register_interface(
        &self,
        container: Container<'_>,
        name: &str,
        def: TypeDef,
        interfaces: Vec<TypeHandle>,
    ) -> TypeHandle {
        let obj = def.into_object(name, TypeObjectKind::Interface);
        let _ = obj.interfaces.set(interfaces);
        self.finish_registration(container, name, obj)
    }

    pub fn register_generic_class(
        &self,
        container: Container<'_>,
        name: &str,
        factory: GenericFactory,
        arity: usize,
    ) -> TypeHandle {
        let mut obj = TypeObject::new(name, TypeObjectKind::GenericClassDefinition);
        obj.generic = Some(GenericInfo { factory, arity });
        self.finish_registration(container, name, obj)
    }

    pub fn register_generic_interface(
        &self,
        container: Container<'_>,
        name: &str,
        factory: GenericFactory,
        arity: usize,
    ) -> TypeHandle {
        let mut obj = TypeObject::new(name, TypeObjectKind::GenericInterfaceDefinition);
        obj.generic = Some(GenericInfo { factory, arity });
        self.finish_registration(container, name, obj)
    }

    /// Build one concrete instance of an open generic class. Called
    /// from inside a generic factory; base and interfaces stay deferred
    /// until first access.
    pub fn register_generic_class_instance(
        &self,
        def: TypeDef,
        open: &TypeHandle,
        args: &[TypeHandle],
        base: BaseThunk,
        interfaces: InterfacesThunk,
    ) -> TypeHandle {
        let mut obj = def.into_object(&instantiation_key(open, args), TypeObjectKind::Class);
        obj.instance_of = Some((open.clone(), args.to_vec()));
        obj.base_thunk = RefCell::new(Some(base));
        obj.interfaces_thunk = RefCell::new(Some(interfaces));
        TypeHandle(Rc::new(obj))
    }

    pub fn register_generic_interface_instance(
        &self,
        open: &TypeHandle,
        args: &[TypeHandle],
        interfaces: InterfacesThunk,
    ) -> TypeHandle {
        let mut obj = TypeObject::new(&instantiation_key(open, args), TypeObjectKind::Interface);
        obj.instance_of = Some((open.clone(), args.to_vec()));
        obj.interfaces_thunk = RefCell::new(Some(interfaces));
        TypeHandle(Rc::new(obj))
    }

    /// Register a plain value (resources form).
    pub fn register_type(&self, container: Container<'_>, name: &str, value: Value) {
        self.export(container, name, value);
    }

    /// Resolve a generic instantiation. Results are memoized per
    /// (open type, argument list); repeated resolutions return the same
    /// handle.
    pub fn make_generic_type(
        &self,
        open: &TypeHandle,
        args: &[TypeHandle],
    ) -> Result<TypeHandle, FaultError> {
        let info_arity = match open.generic_info() {
            Some(info) => info.arity,
            None => return Err(FaultError::NotGeneric),
        };
        if args.len() != info_arity {
            return Err(FaultError::ArityMismatch {
                expected: info_arity,
                actual: args.len(),
            });
        }
        let key = instantiation_key(open, args);
        if let Some(existing) = self.instances.borrow().get(&key) {
            return Ok(existing.clone());
        }
        let factory = match open.generic_info() {
            Some(info) => info.factory.clone(),
            None => return Err(FaultError::NotGeneric),
        };
        let instance = factory(self, args);
        self.instances.borrow_mut().insert(key, instance.clone());
        Ok(instance)
    }

    /// Attach reflection metadata to a type.
    pub fn set_metadata(&self, ty: &TypeHandle, metadata: TypeMetadata) {
        *ty.0.metadata.borrow_mut() = Some(Rc::new(metadata));
    }

    /// Look a registered type up by its registered name.
    pub fn find_type(&self, name: &str) -> Option<TypeHandle> {
        self.registry.borrow().get(name).cloned()
    }

    /// Read an entry of the global namespace object.
    pub fn global_get(&self, name: &str) -> Value {
        self.global.borrow().get(name).cloned().unwrap_or(Value::Null)
    }

    /// Read an entry of a module's exports object.
    pub fn exports_get(&self, module: &str, name: &str) -> Value {
        self.modules
            .borrow()
            .get(module)
            .and_then(|m| m.borrow().get(name).cloned())
            .unwrap_or(Value::Null)
    }

    fn finish_registration(
        &self,
        container: Container<'_>,
        name: &str,
        obj: TypeObject,
    ) -> TypeHandle {
        let handle = TypeHandle(Rc::new(obj));
        self.registry
            .borrow_mut()
            .insert(name.to_string(), handle.clone());
        self.export(container, name, Value::Type(handle.clone()));
        handle
    }

    fn export(&self, container: Container<'_>, name: &str, value: Value) {
        match container {
            Container::Global => {
                self.global.borrow_mut().insert(name.to_string(), value);
            }
            Container::Module(module) => {
                let mut modules = self.modules.borrow_mut();
                let exports = modules
                    .entry(module.to_string())
                    .or_insert_with(|| Rc::new(RefCell::new(FxHashMap::default())));
                exports.borrow_mut().insert(name.to_string(), value);
            }
            Container::None => {}
        }
    }
}
