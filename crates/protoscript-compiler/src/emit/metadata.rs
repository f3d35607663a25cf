//! Reflection metadata emission
//!
//! Builds the `setMetadata` call that makes a type introspectable at
//! runtime. Only members whose validation verdict allows it contribute
//! an entry; attributes whose own type is marked non-reflectable are
//! filtered out of every attribute list.

use crate::descriptor::{
    AccessorDescriptor, AttributeInstance, MemberDescriptor, MemberKind, TypeDescriptor, TypeRef,
};
use crate::diagnostics::DiagnosticSink;
use crate::js::{Expr, Stmt};
use crate::validator::Verdict;

use super::type_refs::{render, universal, Position, RefScope};

/// Member-kind codes stored in each entry's `type` key.
pub const KIND_CONSTRUCTOR: f64 = 1.0;
pub const KIND_EVENT: f64 = 2.0;
pub const KIND_FIELD: f64 = 4.0;
pub const KIND_METHOD: f64 = 8.0;
pub const KIND_PROPERTY: f64 = 16.0;

/// Emit the metadata statement for a type, or `None` when nothing is
/// reflectable. `target` is the expression the metadata attaches to (the
/// local type binding, or `$type` inside a generic factory).
pub fn emit_metadata(
    ty: &TypeDescriptor,
    verdicts: &[Verdict],
    target: Expr,
    scope: &RefScope<'_>,
    sink: &mut DiagnosticSink,
) -> Option<Stmt> {
    let type_attrs = render_attributes(&ty.attributes, scope);
    let members: Vec<Expr> = ty
        .members
        .iter()
        .zip(verdicts)
        .filter(|(_, v)| v.emits())
        .map(|(m, _)| member_entry(ty, m, scope, sink))
        .collect();

    if type_attrs.is_none() && members.is_empty() {
        return None;
    }

    let mut descriptor = Vec::new();
    if let Some(attrs) = type_attrs {
        descriptor.push(("attr".to_string(), attrs));
    }
    if !members.is_empty() {
        descriptor.push(("members".to_string(), Expr::Array(members)));
    }

    Some(Stmt::Expr(
        Expr::TypeRef("Script".into())
            .member("setMetadata")
            .call(vec![target, Expr::Object(descriptor)]),
    ))
}

fn member_entry(
    ty: &TypeDescriptor,
    member: &MemberDescriptor,
    scope: &RefScope<'_>,
    sink: &mut DiagnosticSink,
) -> Expr {
    let mut entry = Vec::new();
    if let Some(attrs) = render_attributes(&member.attributes, scope) {
        entry.push(("attr".to_string(), attrs));
    }
    entry.push(("name".to_string(), Expr::str(member.name.clone())));

    match &member.kind {
        MemberKind::Constructor { params, unnamed, .. } => {
            entry.push(("type".to_string(), Expr::Num(KIND_CONSTRUCTOR)));
            entry.push((
                "params".to_string(),
                render_types(params, Position::Signature, scope, sink),
            ));
            if ty.is_serializable {
                let sname = if *unnamed {
                    "$ctor".to_string()
                } else {
                    member.script_name.clone()
                };
                entry.push(("sname".to_string(), Expr::str(sname)));
            } else if !unnamed {
                entry.push(("sname".to_string(), Expr::str(member.script_name.clone())));
            }
        }
        MemberKind::Method {
            params,
            return_type,
            generic_arity,
            type_param_names,
            include_generic_arguments,
            ..
        } => {
            entry.push(("type".to_string(), Expr::Num(KIND_METHOD)));
            if member.is_static {
                entry.push(("isStatic".to_string(), Expr::Bool(true)));
            }
            entry.push(("sname".to_string(), Expr::str(member.script_name.clone())));
            let carried = *generic_arity > 0 && *include_generic_arguments;
            if carried {
                entry.push(("tpcount".to_string(), Expr::Num(*generic_arity as f64)));
            }
            let method_scope =
                method_scope(scope, if carried { type_param_names.as_slice() } else { &[] });
            entry.push((
                "returns".to_string(),
                render(return_type, Position::Signature, &method_scope, sink),
            ));
            entry.push((
                "params".to_string(),
                render_types(params, Position::Signature, &method_scope, sink),
            ));
        }
        MemberKind::Field { field_type, .. } => {
            entry.push(("type".to_string(), Expr::Num(KIND_FIELD)));
            if member.is_static {
                entry.push(("isStatic".to_string(), Expr::Bool(true)));
            }
            entry.push((
                "returnType".to_string(),
                render(field_type, Position::Signature, scope, sink),
            ));
            entry.push(("sname".to_string(), Expr::str(member.script_name.clone())));
        }
        MemberKind::Property {
            property_type,
            index_params,
            getter,
            setter,
        } => {
            entry.push(("type".to_string(), Expr::Num(KIND_PROPERTY)));
            if member.is_static {
                entry.push(("isStatic".to_string(), Expr::Bool(true)));
            }
            entry.push((
                "returnType".to_string(),
                render(property_type, Position::Signature, scope, sink),
            ));
            if !index_params.is_empty() {
                entry.push((
                    "indexParams".to_string(),
                    render_types(index_params, Position::Signature, scope, sink),
                ));
            }
            if let Some(getter) = getter {
                entry.push((
                    "getter".to_string(),
                    accessor_entry(
                        getter,
                        format!("get_{}", member.name),
                        index_params,
                        Some(property_type),
                        scope,
                        sink,
                    ),
                ));
            }
            if let Some(setter) = setter {
                let mut params = index_params.to_vec();
                params.push(property_type.clone());
                entry.push((
                    "setter".to_string(),
                    accessor_entry(
                        setter,
                        format!("set_{}", member.name),
                        &params,
                        None,
                        scope,
                        sink,
                    ),
                ));
            }
        }
        MemberKind::Event {
            handler_type,
            adder,
            remover,
        } => {
            entry.push(("type".to_string(), Expr::Num(KIND_EVENT)));
            if member.is_static {
                entry.push(("isStatic".to_string(), Expr::Bool(true)));
            }
            let params = [handler_type.clone()];
            if let Some(adder) = adder {
                entry.push((
                    "adder".to_string(),
                    accessor_entry(adder, format!("add_{}", member.name), &params, None, scope, sink),
                ));
            }
            if let Some(remover) = remover {
                entry.push((
                    "remover".to_string(),
                    accessor_entry(
                        remover,
                        format!("remove_{}", member.name),
                        &params,
                        None,
                        scope,
                        sink,
                    ),
                ));
            }
        }
    }

    Expr::Object(entry)
}

/// Accessors surface as method-shaped descriptors. A missing return
/// type means the accessor returns nothing and is described with the
/// universal type.
fn accessor_entry(
    accessor: &AccessorDescriptor,
    name: String,
    params: &[TypeRef],
    returns: Option<&TypeRef>,
    scope: &RefScope<'_>,
    sink: &mut DiagnosticSink,
) -> Expr {
    let mut entry = Vec::new();
    if let Some(attrs) = render_attributes(&accessor.attributes, scope) {
        entry.push(("attr".to_string(), attrs));
    }
    entry.push(("name".to_string(), Expr::str(name)));
    entry.push(("type".to_string(), Expr::Num(KIND_METHOD)));
    entry.push(("sname".to_string(), Expr::str(accessor.name.clone())));
    let rendered_returns = match returns {
        Some(tr) => render(tr, Position::Signature, scope, sink),
        None => universal(),
    };
    entry.push(("returns".to_string(), rendered_returns));
    entry.push((
        "params".to_string(),
        render_types(params, Position::Signature, scope, sink),
    ));
    Expr::Object(entry)
}

fn render_types(
    types: &[TypeRef],
    pos: Position,
    scope: &RefScope<'_>,
    sink: &mut DiagnosticSink,
) -> Expr {
    Expr::Array(types.iter().map(|t| render(t, pos, scope, sink)).collect())
}

/// Attribute instances become constructor calls; attributes of
/// non-reflectable attribute types are dropped. `None` when nothing
/// remains.
fn render_attributes(attributes: &[AttributeInstance], scope: &RefScope<'_>) -> Option<Expr> {
    let rendered: Vec<Expr> = attributes
        .iter()
        .filter(|a| !scope.universe.facts(&a.attr_type).non_reflectable)
        .map(|a| {
            Expr::New(
                Box::new(Expr::TypeRef(a.attr_type.clone())),
                a.args.clone(),
            )
        })
        .collect();
    if rendered.is_empty() {
        None
    } else {
        Some(Expr::Array(rendered))
    }
}

fn method_scope<'a>(scope: &RefScope<'a>, method_params: &'a [String]) -> RefScope<'a> {
    RefScope {
        universe: scope.universe,
        self_name: scope.self_name,
        type_params: scope.type_params,
        method_params,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{TypeFacts, TypeKind, TypeUniverse, Usability};
    use crate::js::write_stmts;

    fn text_of(ty: &TypeDescriptor, universe: &TypeUniverse) -> Option<String> {
        let mut sink = DiagnosticSink::new();
        let verdicts = crate::validator::validate_type(ty, &mut sink);
        let scope = RefScope::new(universe, &ty.name);
        emit_metadata(ty, &verdicts, Expr::ident("$C"), &scope, &mut sink)
            .map(|s| write_stmts(&[s]))
    }

    fn reflectable_method(name: &str, sname: &str, params: Vec<TypeRef>, returns: TypeRef) -> MemberDescriptor {
        MemberDescriptor::new(
            name,
            sname,
            MemberKind::Method {
                params,
                return_type: returns,
                generic_arity: 0,
                type_param_names: vec![],
                include_generic_arguments: true,
                body: None,
                is_abstract: false,
            },
        )
        .reflectable()
    }

    #[test]
    fn test_no_reflectable_members_emits_nothing() {
        let mut ty = TypeDescriptor::new("C", TypeKind::Class);
        ty.members.push(
            reflectable_method("M", "m", vec![], TypeRef::Any).with_usability(Usability::Normal),
        );
        ty.members[0].reflectable = false;
        assert_eq!(text_of(&ty, &TypeUniverse::new()), None);
    }

    #[test]
    fn test_method_entry_shape() {
        let mut ty = TypeDescriptor::new("C", TypeKind::Class);
        ty.members.push(reflectable_method(
            "M1",
            "m1",
            vec![TypeRef::named("Int32")],
            TypeRef::Any,
        ));
        let text = text_of(&ty, &TypeUniverse::new()).unwrap();
        assert_eq!(
            text,
            "{Script}.setMetadata($C, { members: [{ name: 'M1', type: 8, sname: 'm1', returns: {Object}, params: [{Int32}] }] });\n"
        );
    }

    #[test]
    fn test_static_method_marks_is_static() {
        let mut ty = TypeDescriptor::new("C", TypeKind::Class);
        ty.members
            .push(reflectable_method("S1", "s1", vec![], TypeRef::named("String")).static_member());
        let text = text_of(&ty, &TypeUniverse::new()).unwrap();
        assert!(text.contains("{ name: 'S1', type: 8, isStatic: true, sname: 's1', returns: {String}, params: [] }"));
    }

    #[test]
    fn test_generic_method_carries_tpcount_and_parameter_identifiers() {
        let mut ty = TypeDescriptor::new("C", TypeKind::Class);
        let mut m = reflectable_method(
            "G",
            "g",
            vec![TypeRef::MethodParam(0), TypeRef::named("String")],
            TypeRef::MethodParam(1),
        );
        if let MemberKind::Method {
            generic_arity,
            type_param_names,
            ..
        } = &mut m.kind
        {
            *generic_arity = 2;
            *type_param_names = vec!["T1".into(), "T2".into()];
        }
        ty.members.push(m);
        let text = text_of(&ty, &TypeUniverse::new()).unwrap();
        assert!(text.contains("tpcount: 2"));
        assert!(text.contains("returns: T2"));
        assert!(text.contains("params: [T1, {String}]"));
    }

    #[test]
    fn test_erased_generic_method_parameters_become_universal() {
        let mut ty = TypeDescriptor::new("C", TypeKind::Class);
        let mut m = reflectable_method("G", "g", vec![TypeRef::MethodParam(0)], TypeRef::Any);
        if let MemberKind::Method {
            generic_arity,
            type_param_names,
            include_generic_arguments,
            ..
        } = &mut m.kind
        {
            *generic_arity = 1;
            *type_param_names = vec!["T1".into()];
            *include_generic_arguments = false;
        }
        ty.members.push(m);
        let text = text_of(&ty, &TypeUniverse::new()).unwrap();
        assert!(!text.contains("tpcount"));
        assert!(text.contains("params: [{Object}]"));
    }

    #[test]
    fn test_unnamed_constructor_has_no_sname() {
        let mut ty = TypeDescriptor::new("C", TypeKind::Class);
        ty.members.push(
            MemberDescriptor::new(
                ".ctor",
                "",
                MemberKind::Constructor {
                    params: vec![TypeRef::named("Int32")],
                    body: None,
                    unnamed: true,
                },
            )
            .reflectable(),
        );
        let text = text_of(&ty, &TypeUniverse::new()).unwrap();
        assert!(text.contains("{ name: '.ctor', type: 1, params: [{Int32}] }"));
    }

    #[test]
    fn test_named_and_serializable_constructors_carry_sname() {
        let mut ty = TypeDescriptor::new("C", TypeKind::Class);
        ty.members.push(
            MemberDescriptor::new(
                ".ctor",
                "named",
                MemberKind::Constructor {
                    params: vec![],
                    body: None,
                    unnamed: false,
                },
            )
            .reflectable(),
        );
        let text = text_of(&ty, &TypeUniverse::new()).unwrap();
        assert!(text.contains("sname: 'named'"));

        let mut ser = TypeDescriptor::new("S", TypeKind::Class);
        ser.is_serializable = true;
        ser.members.push(
            MemberDescriptor::new(
                ".ctor",
                "",
                MemberKind::Constructor {
                    params: vec![],
                    body: None,
                    unnamed: true,
                },
            )
            .reflectable(),
        );
        let text = text_of(&ser, &TypeUniverse::new()).unwrap();
        assert!(text.contains("sname: '$ctor'"));
    }

    #[test]
    fn test_field_entry_shape() {
        let mut ty = TypeDescriptor::new("C", TypeKind::Class);
        ty.members.push(
            MemberDescriptor::new(
                "F1",
                "f1",
                MemberKind::Field {
                    field_type: TypeRef::named("Int32"),
                    value: None,
                },
            )
            .reflectable(),
        );
        let text = text_of(&ty, &TypeUniverse::new()).unwrap();
        assert!(text.contains("{ name: 'F1', type: 4, returnType: {Int32}, sname: 'f1' }"));
    }

    #[test]
    fn test_property_accessor_entries() {
        let mut ty = TypeDescriptor::new("C", TypeKind::Class);
        ty.members.push(
            MemberDescriptor::new(
                "P1",
                "p1",
                MemberKind::Property {
                    property_type: TypeRef::named("Int32"),
                    index_params: vec![],
                    getter: Some(AccessorDescriptor::new("get_p1", None)),
                    setter: Some(AccessorDescriptor::new("set_p1", None)),
                },
            )
            .reflectable(),
        );
        let text = text_of(&ty, &TypeUniverse::new()).unwrap();
        assert!(text.contains("name: 'P1', type: 16, returnType: {Int32}"));
        assert!(text.contains(
            "getter: { name: 'get_P1', type: 8, sname: 'get_p1', returns: {Int32}, params: [] }"
        ));
        // Setter returns nothing and takes the value as its only param.
        assert!(text.contains(
            "setter: { name: 'set_P1', type: 8, sname: 'set_p1', returns: {Object}, params: [{Int32}] }"
        ));
    }

    #[test]
    fn test_indexer_setter_params_append_value() {
        let mut ty = TypeDescriptor::new("C", TypeKind::Class);
        ty.members.push(
            MemberDescriptor::new(
                "Item",
                "item",
                MemberKind::Property {
                    property_type: TypeRef::named("String"),
                    index_params: vec![TypeRef::named("Int32"), TypeRef::named("String")],
                    getter: Some(AccessorDescriptor::new("get_item", None)),
                    setter: Some(AccessorDescriptor::new("set_item", None)),
                },
            )
            .reflectable(),
        );
        let text = text_of(&ty, &TypeUniverse::new()).unwrap();
        assert!(text.contains("indexParams: [{Int32}, {String}]"));
        assert!(text.contains(
            "getter: { name: 'get_Item', type: 8, sname: 'get_item', returns: {String}, params: [{Int32}, {String}] }"
        ));
        assert!(text.contains(
            "setter: { name: 'set_Item', type: 8, sname: 'set_item', returns: {Object}, params: [{Int32}, {String}, {String}] }"
        ));
    }

    #[test]
    fn test_event_accessor_entries() {
        let mut ty = TypeDescriptor::new("C", TypeKind::Class);
        ty.members.push(
            MemberDescriptor::new(
                "E1",
                "e1",
                MemberKind::Event {
                    handler_type: TypeRef::named("Delegate"),
                    adder: Some(AccessorDescriptor::new("add_e1", None)),
                    remover: Some(AccessorDescriptor::new("remove_e1", None)),
                },
            )
            .reflectable(),
        );
        let text = text_of(&ty, &TypeUniverse::new()).unwrap();
        assert!(text.contains("name: 'E1', type: 2"));
        assert!(text.contains(
            "adder: { name: 'add_E1', type: 8, sname: 'add_e1', returns: {Object}, params: [{Delegate}] }"
        ));
        assert!(text.contains(
            "remover: { name: 'remove_E1', type: 8, sname: 'remove_e1', returns: {Object}, params: [{Delegate}] }"
        ));
    }

    #[test]
    fn test_attributes_render_as_constructor_calls() {
        let mut ty = TypeDescriptor::new("C", TypeKind::Class);
        ty.attributes.push(AttributeInstance {
            attr_type: "A1".into(),
            args: vec![],
        });
        let mut m = reflectable_method("M1", "m1", vec![], TypeRef::Any);
        m.attributes.push(AttributeInstance {
            attr_type: "A2".into(),
            args: vec![Expr::str("x"), Expr::Num(42.0)],
        });
        ty.members.push(m);
        let text = text_of(&ty, &TypeUniverse::new()).unwrap();
        assert!(text.contains("attr: [new {A1}()], members:"));
        assert!(text.contains("attr: [new {A2}('x', 42)], name: 'M1'"));
    }

    #[test]
    fn test_non_reflectable_attribute_types_are_dropped() {
        let mut universe = TypeUniverse::new();
        universe.insert(
            "Hidden".into(),
            TypeFacts {
                is_imported: false,
                obeys_type_system: true,
                non_reflectable: true,
            },
        );
        let mut ty = TypeDescriptor::new("C", TypeKind::Class);
        let mut m = reflectable_method("M1", "m1", vec![], TypeRef::Any);
        m.attributes.push(AttributeInstance {
            attr_type: "Hidden".into(),
            args: vec![],
        });
        m.attributes.push(AttributeInstance {
            attr_type: "Shown".into(),
            args: vec![],
        });
        ty.members.push(m);
        let text = text_of(&ty, &universe).unwrap();
        assert!(!text.contains("{Hidden}"));
        assert!(text.contains("attr: [new {Shown}()]"));
    }

    #[test]
    fn test_descriptor_built_universe_drops_non_reflectable_attributes() {
        let mut hidden = TypeDescriptor::new("Hidden", TypeKind::Class);
        hidden.non_reflectable = true;
        let mut ty = TypeDescriptor::new("C", TypeKind::Class);
        let mut m = reflectable_method("M1", "m1", vec![], TypeRef::Any);
        m.attributes.push(AttributeInstance {
            attr_type: "Hidden".into(),
            args: vec![],
        });
        ty.members.push(m);

        let universe = TypeUniverse::from_descriptors([&hidden, &ty]);
        let text = text_of(&ty, &universe).unwrap();
        assert!(!text.contains("{Hidden}"));
        assert!(!text.contains("attr:"));
    }

    #[test]
    fn test_withheld_member_contributes_no_entry() {
        let mut ty = TypeDescriptor::new("C", TypeKind::Class);
        ty.members.push(
            reflectable_method("Bad", "bad", vec![], TypeRef::Any)
                .with_usability(Usability::InlineCode),
        );
        ty.members.push(reflectable_method("Good", "good", vec![], TypeRef::Any));
        let mut sink = DiagnosticSink::new();
        let verdicts = crate::validator::validate_type(&ty, &mut sink);
        let universe = TypeUniverse::new();
        let scope = RefScope::new(&universe, "C");
        let stmt = emit_metadata(&ty, &verdicts, Expr::ident("$C"), &scope, &mut sink).unwrap();
        let text = write_stmts(&[stmt]);
        assert!(!text.contains("'Bad'"));
        assert!(text.contains("'Good'"));
        assert_eq!(sink.len(), 1);
    }
}
