//! Reflection API
//!
//! Member queries over attached metadata, invocation, delegate
//! creation, field/property access, and attribute retrieval. Shape
//! violations (wrong target presence, wrong type-argument count) fault
//! at the call site, never deferred.

use std::ops::BitOr;

use crate::error::FaultError;
use crate::host::TypeHandle;
use crate::metadata::{
    AttributeSpec, ConstructorSpec, EventSpec, FieldSpec, MemberSpec, MemberSpecKind, MethodSpec,
    PropertySpec,
};
use crate::value::{native, Value};

/// Member filter for [`TypeHandle::members`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BindingFlags(u8);

impl BindingFlags {
    pub const INSTANCE: BindingFlags = BindingFlags(1);
    pub const STATIC: BindingFlags = BindingFlags(2);
    pub const DEFAULT: BindingFlags = BindingFlags(3);

    /// Whether a member with the given staticness passes the filter.
    pub fn admits(self, is_static: bool) -> bool {
        if is_static {
            self.0 & BindingFlags::STATIC.0 != 0
        } else {
            self.0 & BindingFlags::INSTANCE.0 != 0
        }
    }
}

impl BitOr for BindingFlags {
    type Output = BindingFlags;

    fn bitor(self, rhs: BindingFlags) -> BindingFlags {
        BindingFlags(self.0 | rhs.0)
    }
}

/// One reflected member.
#[derive(Clone)]
pub enum MemberInfo {
    Constructor(ConstructorInfo),
    Method(MethodInfo),
    Field(FieldInfo),
    Property(PropertyInfo),
    Event(EventInfo),
}

impl MemberInfo {
    pub fn name(&self) -> &str {
        match self {
            MemberInfo::Constructor(c) => c.name(),
            MemberInfo::Method(m) => &m.name,
            MemberInfo::Field(f) => &f.name,
            MemberInfo::Property(p) => &p.name,
            MemberInfo::Event(e) => &e.name,
        }
    }

    pub fn is_static(&self) -> bool {
        match self {
            MemberInfo::Constructor(_) => false,
            MemberInfo::Method(m) => m.is_static,
            MemberInfo::Field(f) => f.is_static,
            MemberInfo::Property(p) => p.is_static,
            MemberInfo::Event(e) => e.is_static,
        }
    }

    pub fn declaring_type(&self) -> &TypeHandle {
        match self {
            MemberInfo::Constructor(c) => &c.declaring,
            MemberInfo::Method(m) => &m.declaring,
            MemberInfo::Field(f) => &f.declaring,
            MemberInfo::Property(p) => &p.declaring,
            MemberInfo::Event(e) => &e.declaring,
        }
    }

    /// Construct the member's attributes, optionally filtered by
    /// attribute type. The `inherit` flag is accepted but performs no
    /// member-inheritance walk.
    pub fn custom_attributes(
        &self,
        filter: Option<&TypeHandle>,
        inherit: bool,
    ) -> Result<Vec<Value>, FaultError> {
        let attrs = match self {
            MemberInfo::Constructor(c) => &c.attributes,
            MemberInfo::Method(m) => &m.attributes,
            MemberInfo::Field(f) => &f.attributes,
            MemberInfo::Property(p) => &p.attributes,
            MemberInfo::Event(e) => &e.attributes,
        };
        let _ = inherit;
        construct_attributes(attrs, filter)
    }
}

impl TypeHandle {
    /// All reflectable members passing the binding-flags filter, in
    /// metadata order. Types without metadata have no reflectable
    /// members.
    pub fn members(&self, flags: BindingFlags) -> Vec<MemberInfo> {
        let metadata = match self.metadata() {
            Some(md) => md,
            None => return Vec::new(),
        };
        metadata
            .members
            .iter()
            .filter(|m| flags.admits(member_is_static(m)))
            .map(|m| member_info(self, m))
            .collect()
    }

    pub fn constructors(&self) -> Vec<ConstructorInfo> {
        self.members(BindingFlags::DEFAULT)
            .into_iter()
            .filter_map(|m| match m {
                MemberInfo::Constructor(c) => Some(c),
                _ => None,
            })
            .collect()
    }

    pub fn get_method(&self, name: &str) -> Option<MethodInfo> {
        self.members(BindingFlags::DEFAULT)
            .into_iter()
            .find_map(|m| match m {
                MemberInfo::Method(m) if m.name == name => Some(m),
                _ => None,
            })
    }

    pub fn get_field(&self, name: &str) -> Option<FieldInfo> {
        self.members(BindingFlags::DEFAULT)
            .into_iter()
            .find_map(|m| match m {
                MemberInfo::Field(f) if f.name == name => Some(f),
                _ => None,
            })
    }

    pub fn get_property(&self, name: &str) -> Option<PropertyInfo> {
        self.members(BindingFlags::DEFAULT)
            .into_iter()
            .find_map(|m| match m {
                MemberInfo::Property(p) if p.name == name => Some(p),
                _ => None,
            })
    }

    pub fn get_event(&self, name: &str) -> Option<EventInfo> {
        self.members(BindingFlags::DEFAULT)
            .into_iter()
            .find_map(|m| match m {
                MemberInfo::Event(e) if e.name == name => Some(e),
                _ => None,
            })
    }

    /// Type-level attributes.
    pub fn custom_attributes(
        &self,
        filter: Option<&TypeHandle>,
        inherit: bool,
    ) -> Result<Vec<Value>, FaultError> {
        let _ = inherit;
        match self.metadata() {
            Some(md) => construct_attributes(&md.attributes, filter),
            None => Ok(Vec::new()),
        }
    }
}

fn member_is_static(spec: &MemberSpec) -> bool {
    match spec.kind {
        // Constructors always report non-static.
        MemberSpecKind::Constructor(_) => false,
        _ => spec.is_static,
    }
}

fn member_info(declaring: &TypeHandle, spec: &MemberSpec) -> MemberInfo {
    match &spec.kind {
        MemberSpecKind::Constructor(c) => MemberInfo::Constructor(ConstructorInfo {
            declaring: declaring.clone(),
            attributes: spec.attributes.clone(),
            spec: c.clone(),
        }),
        MemberSpecKind::Method(m) => MemberInfo::Method(MethodInfo {
            declaring: declaring.clone(),
            name: spec.name.clone(),
            is_static: spec.is_static,
            attributes: spec.attributes.clone(),
            spec: m.clone(),
        }),
        MemberSpecKind::Field(f) => MemberInfo::Field(FieldInfo {
            declaring: declaring.clone(),
            name: spec.name.clone(),
            is_static: spec.is_static,
            attributes: spec.attributes.clone(),
            spec: f.clone(),
        }),
        MemberSpecKind::Property(p) => MemberInfo::Property(PropertyInfo {
            declaring: declaring.clone(),
            name: spec.name.clone(),
            is_static: spec.is_static,
            attributes: spec.attributes.clone(),
            spec: p.clone(),
        }),
        MemberSpecKind::Event(e) => MemberInfo::Event(EventInfo {
            declaring: declaring.clone(),
            name: spec.name.clone(),
            is_static: spec.is_static,
            attributes: spec.attributes.clone(),
            spec: e.clone(),
        }),
    }
}

/// A reflected constructor. Name is always `.ctor`, never static.
#[derive(Clone)]
pub struct ConstructorInfo {
    declaring: TypeHandle,
    attributes: Vec<AttributeSpec>,
    spec: ConstructorSpec,
}

impl ConstructorInfo {
    pub fn name(&self) -> &str {
        ".ctor"
    }

    pub fn is_static(&self) -> bool {
        false
    }

    pub fn declaring_type(&self) -> &TypeHandle {
        &self.declaring
    }

    pub fn parameter_types(&self) -> &[TypeHandle] {
        &self.spec.params
    }

    /// Construct a new instance through the resolved (possibly named)
    /// constructor.
    pub fn invoke(&self, args: &[Value]) -> Result<Value, FaultError> {
        let ctor = match &self.spec.sname {
            None => self.declaring.ctor_fn(),
            Some(sname) => self.declaring.named_ctor(sname),
        }
        .ok_or_else(|| {
            FaultError::MemberNotFound(format!("{}..ctor", self.declaring.full_name()))
        })?;
        construct(&Value::Fn(ctor), args)
    }

    pub fn custom_attributes(
        &self,
        filter: Option<&TypeHandle>,
        _inherit: bool,
    ) -> Result<Vec<Value>, FaultError> {
        construct_attributes(&self.attributes, filter)
    }
}

/// A reflected method, possibly a generic method definition.
#[derive(Clone)]
pub struct MethodInfo {
    declaring: TypeHandle,
    name: String,
    is_static: bool,
    attributes: Vec<AttributeSpec>,
    spec: MethodSpec,
}

impl MethodInfo {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn script_name(&self) -> &str {
        &self.spec.sname
    }

    pub fn is_static(&self) -> bool {
        self.is_static
    }

    pub fn declaring_type(&self) -> &TypeHandle {
        &self.declaring
    }

    pub fn parameter_types(&self) -> &[TypeHandle] {
        &self.spec.params
    }

    pub fn return_type(&self) -> &TypeHandle {
        &self.spec.returns
    }

    pub fn type_parameter_count(&self) -> usize {
        self.spec.type_parameter_count
    }

    pub fn is_generic_method_definition(&self) -> bool {
        self.spec.type_parameter_count > 0
    }

    /// Invoke with the rule table applied: instance methods require a
    /// target, static methods forbid one, and the type-argument count
    /// must equal the declared generic parameter count exactly.
    pub fn invoke(
        &self,
        target: Value,
        type_args: &[TypeHandle],
        args: &[Value],
    ) -> Result<Value, FaultError> {
        let f = self.bound_implementation(&target, type_args)?;
        f.call(target, args)
    }

    /// Bind target and type arguments into a reusable invocable. The
    /// same rule table applies at creation time.
    pub fn create_delegate(
        &self,
        target: Value,
        type_args: &[TypeHandle],
    ) -> Result<Value, FaultError> {
        let f = self.bound_implementation(&target, type_args)?;
        Ok(Value::Fn(native(move |_, args| f.call(target.clone(), args))))
    }

    pub fn custom_attributes(
        &self,
        filter: Option<&TypeHandle>,
        _inherit: bool,
    ) -> Result<Vec<Value>, FaultError> {
        construct_attributes(&self.attributes, filter)
    }

    fn bound_implementation(
        &self,
        target: &Value,
        type_args: &[TypeHandle],
    ) -> Result<Value, FaultError> {
        self.check_shape(target, type_args)?;
        let f = self.implementation()?;
        if self.spec.type_parameter_count == 0 {
            return Ok(f);
        }
        // Generic methods are stored as a wrapper over the type
        // parameters returning the real implementation.
        let handles: Vec<Value> = type_args.iter().cloned().map(Value::Type).collect();
        f.call(Value::Null, &handles)
    }

    fn check_shape(&self, target: &Value, type_args: &[TypeHandle]) -> Result<(), FaultError> {
        if self.is_static {
            if !target.is_null() {
                return Err(FaultError::TargetNotAllowed);
            }
        } else if target.is_null() {
            return Err(FaultError::TargetRequired);
        }
        if type_args.len() != self.spec.type_parameter_count {
            return Err(FaultError::TypeArgumentCountMismatch {
                expected: self.spec.type_parameter_count,
                actual: type_args.len(),
            });
        }
        Ok(())
    }

    fn implementation(&self) -> Result<Value, FaultError> {
        let found = if self.is_static {
            self.declaring.static_value(&self.spec.sname)
        } else {
            self.declaring.prototype_value(&self.spec.sname)
        };
        found.ok_or_else(|| {
            FaultError::MemberNotFound(format!(
                "{}.{}",
                self.declaring.full_name(),
                self.spec.sname
            ))
        })
    }
}

/// A reflected field with direct storage access.
#[derive(Clone)]
pub struct FieldInfo {
    declaring: TypeHandle,
    name: String,
    is_static: bool,
    attributes: Vec<AttributeSpec>,
    spec: FieldSpec,
}

impl FieldInfo {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_static(&self) -> bool {
        self.is_static
    }

    pub fn declaring_type(&self) -> &TypeHandle {
        &self.declaring
    }

    pub fn field_type(&self) -> &TypeHandle {
        &self.spec.field_type
    }

    /// Read the storage. The target is ignored for static fields.
    pub fn get_value(&self, target: &Value) -> Result<Value, FaultError> {
        if self.is_static {
            Ok(self
                .declaring
                .static_value(&self.spec.sname)
                .unwrap_or(Value::Null))
        } else {
            target.get_field(&self.spec.sname)
        }
    }

    /// Write the storage. The target is ignored for static fields.
    pub fn set_value(&self, target: &Value, value: Value) -> Result<(), FaultError> {
        if self.is_static {
            self.declaring.set_static(&self.spec.sname, value);
            Ok(())
        } else {
            target.set_field(&self.spec.sname, value)
        }
    }

    pub fn custom_attributes(
        &self,
        filter: Option<&TypeHandle>,
        _inherit: bool,
    ) -> Result<Vec<Value>, FaultError> {
        construct_attributes(&self.attributes, filter)
    }
}

/// A reflected property or indexer.
#[derive(Clone)]
pub struct PropertyInfo {
    declaring: TypeHandle,
    name: String,
    is_static: bool,
    attributes: Vec<AttributeSpec>,
    spec: PropertySpec,
}

impl PropertyInfo {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_static(&self) -> bool {
        self.is_static
    }

    pub fn declaring_type(&self) -> &TypeHandle {
        &self.declaring
    }

    pub fn property_type(&self) -> &TypeHandle {
        &self.spec.property_type
    }

    /// Indexer parameter types; empty for simple properties.
    pub fn index_parameter_types(&self) -> &[TypeHandle] {
        &self.spec.index_params
    }

    pub fn can_read(&self) -> bool {
        self.spec.getter.is_some()
    }

    pub fn can_write(&self) -> bool {
        self.spec.setter.is_some()
    }

    /// Synthesized getter method; `get_<Name>` taking the index
    /// parameters and returning the property type.
    pub fn get_method(&self) -> Option<MethodInfo> {
        self.spec.getter.as_ref().map(|accessor| MethodInfo {
            declaring: self.declaring.clone(),
            name: format!("get_{}", self.name),
            is_static: self.is_static,
            attributes: accessor.attributes.clone(),
            spec: MethodSpec::new(
                &accessor.sname,
                self.spec.index_params.clone(),
                self.spec.property_type.clone(),
            ),
        })
    }

    /// Synthesized setter method; `set_<Name>` taking the index
    /// parameters plus the value and returning the universal type.
    pub fn set_method(&self) -> Option<MethodInfo> {
        self.spec.setter.as_ref().map(|accessor| {
            let mut params = self.spec.index_params.clone();
            params.push(self.spec.property_type.clone());
            MethodInfo {
                declaring: self.declaring.clone(),
                name: format!("set_{}", self.name),
                is_static: self.is_static,
                attributes: accessor.attributes.clone(),
                spec: MethodSpec::new(&accessor.sname, params, TypeHandle::object()),
            }
        })
    }

    pub fn get_value(&self, target: Value, index: &[Value]) -> Result<Value, FaultError> {
        let getter = self.get_method().ok_or_else(|| {
            FaultError::MemberNotFound(format!("get_{} on {}", self.name, self.declaring.full_name()))
        })?;
        getter.invoke(target, &[], index)
    }

    pub fn set_value(&self, target: Value, index: &[Value], value: Value) -> Result<(), FaultError> {
        let setter = self.set_method().ok_or_else(|| {
            FaultError::MemberNotFound(format!("set_{} on {}", self.name, self.declaring.full_name()))
        })?;
        let mut args = index.to_vec();
        args.push(value);
        setter.invoke(target, &[], &args)?;
        Ok(())
    }

    pub fn custom_attributes(
        &self,
        filter: Option<&TypeHandle>,
        _inherit: bool,
    ) -> Result<Vec<Value>, FaultError> {
        construct_attributes(&self.attributes, filter)
    }
}

/// A reflected event with synthesized add/remove methods.
#[derive(Clone)]
pub struct EventInfo {
    declaring: TypeHandle,
    name: String,
    is_static: bool,
    attributes: Vec<AttributeSpec>,
    spec: EventSpec,
}

impl EventInfo {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_static(&self) -> bool {
        self.is_static
    }

    pub fn declaring_type(&self) -> &TypeHandle {
        &self.declaring
    }

    pub fn handler_type(&self) -> &TypeHandle {
        &self.spec.handler_type
    }

    /// Synthesized `add_<Name>`: one handler parameter, returns the
    /// universal type.
    pub fn add_method(&self) -> Option<MethodInfo> {
        self.accessor_method(self.spec.adder.as_ref(), "add")
    }

    /// Synthesized `remove_<Name>`.
    pub fn remove_method(&self) -> Option<MethodInfo> {
        self.accessor_method(self.spec.remover.as_ref(), "remove")
    }

    pub fn add_event_handler(&self, target: Value, handler: Value) -> Result<(), FaultError> {
        let add = self.add_method().ok_or_else(|| {
            FaultError::MemberNotFound(format!("add_{} on {}", self.name, self.declaring.full_name()))
        })?;
        add.invoke(target, &[], &[handler])?;
        Ok(())
    }

    pub fn remove_event_handler(&self, target: Value, handler: Value) -> Result<(), FaultError> {
        let remove = self.remove_method().ok_or_else(|| {
            FaultError::MemberNotFound(format!(
                "remove_{} on {}",
                self.name,
                self.declaring.full_name()
            ))
        })?;
        remove.invoke(target, &[], &[handler])?;
        Ok(())
    }

    pub fn custom_attributes(
        &self,
        filter: Option<&TypeHandle>,
        _inherit: bool,
    ) -> Result<Vec<Value>, FaultError> {
        construct_attributes(&self.attributes, filter)
    }

    fn accessor_method(
        &self,
        accessor: Option<&crate::metadata::AccessorSpec>,
        prefix: &str,
    ) -> Option<MethodInfo> {
        accessor.map(|a| MethodInfo {
            declaring: self.declaring.clone(),
            name: format!("{}_{}", prefix, self.name),
            is_static: self.is_static,
            attributes: a.attributes.clone(),
            spec: MethodSpec::new(
                &a.sname,
                vec![self.spec.handler_type.clone()],
                TypeHandle::object(),
            ),
        })
    }
}

/// Run a constructor function against a fresh object. Constructors
/// either mutate `this` (class form) or allocate and return their own
/// instance (serializable form).
fn construct(ctor: &Value, args: &[Value]) -> Result<Value, FaultError> {
    let instance = Value::object();
    let result = ctor.call(instance.clone(), args)?;
    Ok(if result.is_null() { instance } else { result })
}

/// Build live attribute instances, skipping non-reflectable attribute
/// types regardless of filter.
fn construct_attributes(
    attrs: &[AttributeSpec],
    filter: Option<&TypeHandle>,
) -> Result<Vec<Value>, FaultError> {
    let mut out = Vec::new();
    for spec in attrs {
        if spec.attr_type.is_non_reflectable() {
            continue;
        }
        if let Some(wanted) = filter {
            if *wanted != spec.attr_type {
                continue;
            }
        }
        let ctor = spec.attr_type.ctor_fn().ok_or_else(|| {
            FaultError::MemberNotFound(format!("{}..ctor", spec.attr_type.full_name()))
        })?;
        out.push(construct(&Value::Fn(ctor), &spec.args)?);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binding_flags_admit() {
        assert!(BindingFlags::INSTANCE.admits(false));
        assert!(!BindingFlags::INSTANCE.admits(true));
        assert!(BindingFlags::STATIC.admits(true));
        assert!(!BindingFlags::STATIC.admits(false));
        assert!(BindingFlags::DEFAULT.admits(true));
        assert!(BindingFlags::DEFAULT.admits(false));
        assert_eq!(BindingFlags::INSTANCE | BindingFlags::STATIC, BindingFlags::DEFAULT);
    }

    #[test]
    fn test_members_without_metadata_are_empty() {
        let ty = TypeHandle::object();
        assert!(ty.members(BindingFlags::DEFAULT).is_empty());
    }
}
