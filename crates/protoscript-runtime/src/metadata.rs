//! Member metadata attached to registered types.
//!
//! Registration code hands the runtime one descriptor per reflectable
//! member. These structures are built once and never mutated; the
//! reflection API reads them to synthesize member infos.

use crate::host::TypeHandle;
use crate::value::Value;

/// Everything `set_metadata` attaches to a type.
#[derive(Clone, Default)]
pub struct TypeMetadata {
    pub attributes: Vec<AttributeSpec>,
    pub members: Vec<MemberSpec>,
}

impl TypeMetadata {
    pub fn new(members: Vec<MemberSpec>) -> TypeMetadata {
        TypeMetadata {
            attributes: Vec::new(),
            members,
        }
    }

    pub fn with_attributes(mut self, attributes: Vec<AttributeSpec>) -> TypeMetadata {
        self.attributes = attributes;
        self
    }
}

/// One applied attribute: the attribute type and its constructor
/// arguments. Retrieval constructs a live instance from these.
#[derive(Clone)]
pub struct AttributeSpec {
    pub attr_type: TypeHandle,
    pub args: Vec<Value>,
}

impl AttributeSpec {
    pub fn new(attr_type: TypeHandle, args: Vec<Value>) -> AttributeSpec {
        AttributeSpec { attr_type, args }
    }
}

/// One member descriptor.
#[derive(Clone)]
pub struct MemberSpec {
    /// Source-level name; overloads share it.
    pub name: String,
    pub is_static: bool,
    pub attributes: Vec<AttributeSpec>,
    pub kind: MemberSpecKind,
}

impl MemberSpec {
    pub fn new(name: &str, kind: MemberSpecKind) -> MemberSpec {
        MemberSpec {
            name: name.to_string(),
            is_static: false,
            attributes: Vec::new(),
            kind,
        }
    }

    pub fn static_member(mut self) -> MemberSpec {
        self.is_static = true;
        self
    }

    pub fn with_attributes(mut self, attributes: Vec<AttributeSpec>) -> MemberSpec {
        self.attributes = attributes;
        self
    }
}

#[derive(Clone)]
pub enum MemberSpecKind {
    Constructor(ConstructorSpec),
    Method(MethodSpec),
    Field(FieldSpec),
    Property(PropertySpec),
    Event(EventSpec),
}

#[derive(Clone)]
pub struct ConstructorSpec {
    /// Script name of a named constructor; `None` for the unnamed
    /// constructor bound to the type identifier.
    pub sname: Option<String>,
    pub params: Vec<TypeHandle>,
}

#[derive(Clone)]
pub struct MethodSpec {
    /// Script name resolving the implementation on the prototype or the
    /// statics.
    pub sname: String,
    pub params: Vec<TypeHandle>,
    /// Void surfaces as the universal type.
    pub returns: TypeHandle,
    pub type_parameter_count: usize,
}

impl MethodSpec {
    pub fn new(sname: &str, params: Vec<TypeHandle>, returns: TypeHandle) -> MethodSpec {
        MethodSpec {
            sname: sname.to_string(),
            params,
            returns,
            type_parameter_count: 0,
        }
    }

    pub fn generic(mut self, type_parameter_count: usize) -> MethodSpec {
        self.type_parameter_count = type_parameter_count;
        self
    }
}

#[derive(Clone)]
pub struct FieldSpec {
    pub sname: String,
    pub field_type: TypeHandle,
}

#[derive(Clone)]
pub struct PropertySpec {
    pub property_type: TypeHandle,
    /// Empty for simple properties.
    pub index_params: Vec<TypeHandle>,
    pub getter: Option<AccessorSpec>,
    pub setter: Option<AccessorSpec>,
}

#[derive(Clone)]
pub struct EventSpec {
    pub handler_type: TypeHandle,
    pub adder: Option<AccessorSpec>,
    pub remover: Option<AccessorSpec>,
}

/// A property or event accessor implementation reference.
#[derive(Clone)]
pub struct AccessorSpec {
    pub sname: String,
    pub attributes: Vec<AttributeSpec>,
}

impl AccessorSpec {
    pub fn new(sname: &str) -> AccessorSpec {
        AccessorSpec {
            sname: sname.to_string(),
            attributes: Vec::new(),
        }
    }

    pub fn with_attributes(mut self, attributes: Vec<AttributeSpec>) -> AccessorSpec {
        self.attributes = attributes;
        self
    }
}
