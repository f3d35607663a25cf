//! Typed descriptor model
//!
//! The immutable compile-time input: per-type descriptors produced by
//! the external semantic analyzer. Descriptors are built once and never
//! mutated; the validator and emitters only read them.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::js;

/// A reference to a type as it appears in member signatures and
/// inheritance lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TypeRef {
    /// A declared or imported type, by namespace-qualified name.
    Named(String),
    /// An instantiation of an open generic type.
    Generic { def: String, args: Vec<TypeRef> },
    /// The enclosing type's generic parameter at the given index.
    Param(usize),
    /// The enclosing method's generic parameter at the given index.
    MethodParam(usize),
    /// The universal type (erased stand-in, also used for void).
    Any,
}

impl TypeRef {
    pub fn named(name: impl Into<String>) -> TypeRef {
        TypeRef::Named(name.into())
    }

    pub fn generic(def: impl Into<String>, args: Vec<TypeRef>) -> TypeRef {
        TypeRef::Generic { def: def.into(), args }
    }

    /// The name of the referenced declaration: the named type itself,
    /// or the open definition of a generic instantiation.
    pub fn declared_name(&self) -> Option<&str> {
        match self {
            TypeRef::Named(name) => Some(name),
            TypeRef::Generic { def, .. } => Some(def),
            _ => None,
        }
    }
}

/// Kind of a declared type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeKind {
    Class,
    Interface,
}

/// Export visibility of a declared type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Visibility {
    Public,
    Internal,
}

/// How a member is realized in the target runtime. Anything other than
/// `Normal` has no callable script entity and cannot surface through
/// reflection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Usability {
    Normal,
    /// Implemented via inline code substitution at each call site.
    InlineCode,
    /// Constructor realized as an object literal.
    ObjectLiteralCtor,
    /// Excluded from script entirely.
    NonScriptable,
    /// Lowered to a native operator.
    NativeOperator,
}

impl Usability {
    /// Human-readable reason used in diagnostics.
    pub fn reason(self) -> &'static str {
        match self {
            Usability::Normal => "usable",
            Usability::InlineCode => "implemented as inline code",
            Usability::ObjectLiteralCtor => "an object literal constructor",
            Usability::NonScriptable => "not usable from script",
            Usability::NativeOperator => "a native operator",
        }
    }
}

/// An attribute applied to a type, member, or accessor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeInstance {
    /// Qualified name of the attribute type.
    pub attr_type: String,
    /// Constant constructor arguments, in order.
    pub args: Vec<js::Expr>,
}

/// A property or event accessor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessorDescriptor {
    /// Script name of the accessor function.
    pub name: String,
    pub usability: Usability,
    pub attributes: Vec<AttributeInstance>,
    /// The compiled accessor function (`js::Expr::Function`); `None`
    /// for abstract accessors.
    pub body: Option<js::Expr>,
}

impl AccessorDescriptor {
    pub fn new(name: impl Into<String>, body: Option<js::Expr>) -> Self {
        Self {
            name: name.into(),
            usability: Usability::Normal,
            attributes: Vec::new(),
            body,
        }
    }
}

/// Kind-specific payload of a member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MemberKind {
    Constructor {
        params: Vec<TypeRef>,
        /// The compiled constructor function (`js::Expr::Function`).
        body: Option<js::Expr>,
        /// True when the constructor is bound to the type identifier
        /// itself. At most one per type.
        unnamed: bool,
    },
    Method {
        params: Vec<TypeRef>,
        /// Return type; void is modeled as [`TypeRef::Any`].
        return_type: TypeRef,
        generic_arity: usize,
        /// Names of the method's generic parameters, `generic_arity`
        /// entries. Unused when generic arguments are dropped.
        type_param_names: Vec<String>,
        /// When false, the method is emitted as if non-generic and its
        /// type parameters are erased.
        include_generic_arguments: bool,
        body: Option<js::Expr>,
        is_abstract: bool,
    },
    Field {
        field_type: TypeRef,
        /// Constant value; required for resources types.
        value: Option<js::Expr>,
    },
    Property {
        property_type: TypeRef,
        /// Indexer parameters, empty for simple properties.
        index_params: Vec<TypeRef>,
        getter: Option<AccessorDescriptor>,
        setter: Option<AccessorDescriptor>,
    },
    Event {
        handler_type: TypeRef,
        adder: Option<AccessorDescriptor>,
        remover: Option<AccessorDescriptor>,
    },
}

impl MemberKind {
    /// The member-kind word used in diagnostics.
    pub fn kind_word(&self) -> &'static str {
        match self {
            MemberKind::Constructor { .. } => "constructor",
            MemberKind::Method { .. } => "method",
            MemberKind::Field { .. } => "field",
            MemberKind::Property { .. } => "property",
            MemberKind::Event { .. } => "event",
        }
    }
}

/// One member of a type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberDescriptor {
    /// Source-level member name (overloads share it).
    pub name: String,
    /// Target-runtime identifier, independent of the source name.
    pub script_name: String,
    pub is_static: bool,
    /// Explicit opt-in to reflection metadata emission.
    pub reflectable: bool,
    pub usability: Usability,
    pub attributes: Vec<AttributeInstance>,
    pub kind: MemberKind,
}

impl MemberDescriptor {
    pub fn new(name: impl Into<String>, script_name: impl Into<String>, kind: MemberKind) -> Self {
        Self {
            name: name.into(),
            script_name: script_name.into(),
            is_static: false,
            reflectable: false,
            usability: Usability::Normal,
            attributes: Vec::new(),
            kind,
        }
    }

    pub fn static_member(mut self) -> Self {
        self.is_static = true;
        self
    }

    pub fn reflectable(mut self) -> Self {
        self.reflectable = true;
        self
    }

    pub fn with_usability(mut self, usability: Usability) -> Self {
        self.usability = usability;
        self
    }
}

/// One declared type, as handed over by the semantic analyzer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDescriptor {
    /// Dotted namespace-qualified name.
    pub name: String,
    pub kind: TypeKind,
    pub visibility: Visibility,
    pub base: Option<TypeRef>,
    pub interfaces: Vec<TypeRef>,
    pub generic_arity: usize,
    /// Names of the generic parameters, `generic_arity` entries.
    pub type_param_names: Vec<String>,
    /// When false, a generic type collapses to its non-generic form.
    pub include_generic_arguments: bool,
    pub members: Vec<MemberDescriptor>,
    pub attributes: Vec<AttributeInstance>,
    /// Externally supplied type (script library), not compiled here.
    pub is_imported: bool,
    /// Imported types only: participates normally in inheritance and
    /// interface lists instead of being erased to the universal type.
    pub obeys_type_system: bool,
    /// Attribute types only: instances never surface through
    /// introspection.
    pub non_reflectable: bool,
    pub is_serializable: bool,
    /// Static methods become free functions on the container.
    pub global_methods: bool,
    /// The type is a plain key/value mapping of its constant fields.
    pub is_resources: bool,
    /// Static methods attach to this target expression; no registration.
    pub mixin_target: Option<String>,
    /// Export to this module's exports object instead of the global.
    pub module_name: Option<String>,
    /// Static initializer statements, run after registration.
    pub static_init: Vec<js::Stmt>,
}

impl TypeDescriptor {
    pub fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            visibility: Visibility::Public,
            base: None,
            interfaces: Vec::new(),
            generic_arity: 0,
            type_param_names: Vec::new(),
            include_generic_arguments: true,
            members: Vec::new(),
            attributes: Vec::new(),
            is_imported: false,
            obeys_type_system: false,
            non_reflectable: false,
            is_serializable: false,
            global_methods: false,
            is_resources: false,
            mixin_target: None,
            module_name: None,
            static_init: Vec::new(),
        }
    }

    /// True when the type is generic and carries its arguments through
    /// to the runtime.
    pub fn carries_generic_arguments(&self) -> bool {
        self.generic_arity > 0 && self.include_generic_arguments
    }
}

/// Facts the emitter needs about any referenced type.
#[derive(Debug, Clone, Default)]
pub struct TypeFacts {
    pub is_imported: bool,
    pub obeys_type_system: bool,
    /// Attribute types only: never surfaced through introspection.
    pub non_reflectable: bool,
}

impl TypeFacts {
    /// An imported type that does not obey the type system is erased to
    /// the universal type in inheritance and type-argument positions.
    pub fn erased_in_inheritance(&self) -> bool {
        self.is_imported && !self.obeys_type_system
    }
}

/// Lookup table over every type the program references, built from the
/// full descriptor set before emission. Unknown names resolve to
/// default facts (a well-behaved external type).
#[derive(Debug, Default)]
pub struct TypeUniverse {
    facts: FxHashMap<String, TypeFacts>,
}

impl TypeUniverse {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a universe from the descriptors being compiled.
    pub fn from_descriptors<'a>(types: impl IntoIterator<Item = &'a TypeDescriptor>) -> Self {
        let mut universe = Self::new();
        for ty in types {
            universe.insert(
                ty.name.clone(),
                TypeFacts {
                    is_imported: ty.is_imported,
                    obeys_type_system: ty.obeys_type_system,
                    non_reflectable: ty.non_reflectable,
                },
            );
        }
        universe
    }

    pub fn insert(&mut self, name: String, facts: TypeFacts) {
        self.facts.insert(name, facts);
    }

    pub fn facts(&self, name: &str) -> TypeFacts {
        self.facts.get(name).cloned().unwrap_or_default()
    }
}
