//! Class and interface emission
//!
//! Turns one `TypeDescriptor` into its registration statements:
//! constructor functions, the prototype literal, statics, the
//! registration call, reflection metadata, and the trailing static
//! initializer. Generic types that carry their arguments wrap the whole
//! shape in a factory function; resources, global-methods, and mixin
//! types replace it entirely.

use crate::descriptor::{
    MemberDescriptor, MemberKind, TypeDescriptor, TypeKind, TypeUniverse, Usability, Visibility,
};
use crate::diagnostics::DiagnosticSink;
use crate::js::{Expr, Stmt};
use crate::validator::{validate_type, Verdict};

use super::metadata;
use super::type_refs::{render, universal, Position, RefScope};
use super::{local_binding, registered_name};

/// Emit registration statements for a whole program, one type after
/// another in input order.
pub fn emit_program(
    types: &[TypeDescriptor],
    universe: &TypeUniverse,
    sink: &mut DiagnosticSink,
) -> Vec<Stmt> {
    types
        .iter()
        .flat_map(|ty| emit_type(ty, universe, sink))
        .collect()
}

/// Emit the full statement sequence for one type.
pub fn emit_type(
    ty: &TypeDescriptor,
    universe: &TypeUniverse,
    sink: &mut DiagnosticSink,
) -> Vec<Stmt> {
    let verdicts = validate_type(ty, sink);

    let mut out = vec![
        Stmt::Comment("/".repeat(80)),
        Stmt::Comment(format!("// {}", ty.name)),
    ];

    if ty.is_resources {
        emit_resources(ty, &mut out);
    } else if ty.global_methods {
        emit_global_methods(ty, &mut out);
    } else if let Some(target) = &ty.mixin_target {
        emit_mixin(ty, target, &mut out);
    } else if ty.carries_generic_arguments() {
        emit_generic(ty, universe, &verdicts, &mut out, sink);
    } else {
        emit_plain(ty, universe, &verdicts, &mut out, sink);
    }

    out
}

// ============================================================================
// Plain (non-generic) classes and interfaces
// ============================================================================

fn emit_plain(
    ty: &TypeDescriptor,
    universe: &TypeUniverse,
    verdicts: &[Verdict],
    out: &mut Vec<Stmt>,
    sink: &mut DiagnosticSink,
) {
    let scope = RefScope::new(universe, &ty.name);
    let local = local_binding(ty);
    let target = Expr::ident(local.clone());

    emit_type_shape(ty, &target, &scope, out, sink);

    out.push(registration_call(ty, universe, &scope, &local, sink));
    if let Some(md) = metadata::emit_metadata(ty, verdicts, target, &scope, sink) {
        out.push(md);
    }
    out.extend(ty.static_init.iter().cloned());
}

// ============================================================================
// Generic factory wrapping
// ============================================================================

fn emit_generic(
    ty: &TypeDescriptor,
    universe: &TypeUniverse,
    verdicts: &[Verdict],
    out: &mut Vec<Stmt>,
    sink: &mut DiagnosticSink,
) {
    let scope = RefScope::new(universe, &ty.name).with_type_params(&ty.type_param_names);
    let local = local_binding(ty);
    let target = Expr::ident("$type");

    let mut body = Vec::new();
    emit_type_shape_into(ty, &target, "$type", &scope, &mut body, sink);

    body.push(generic_instance_registration(ty, universe, &scope, sink));
    if let Some(md) = metadata::emit_metadata(ty, verdicts, target, &scope, sink) {
        body.push(md);
    }
    body.extend(ty.static_init.iter().cloned());
    body.push(Stmt::Return(Some(Expr::ident("$type"))));

    out.push(Stmt::Var(
        local.clone(),
        Some(Expr::Function {
            params: ty.type_param_names.clone(),
            body,
        }),
    ));

    let register = match ty.kind {
        TypeKind::Class => "registerGenericClass",
        TypeKind::Interface => "registerGenericInterface",
    };
    out.push(Stmt::Expr(Expr::TypeRef("Script".into()).member(register).call(vec![
        container(ty),
        Expr::str(registered_name(ty)),
        Expr::ident(local),
        Expr::Num(ty.generic_arity as f64),
    ])));
}

fn generic_instance_registration(
    ty: &TypeDescriptor,
    universe: &TypeUniverse,
    scope: &RefScope<'_>,
    sink: &mut DiagnosticSink,
) -> Stmt {
    let interfaces = rendered_interfaces(ty, universe, scope, sink);
    let interfaces_thunk = Expr::Function {
        params: vec![],
        body: vec![Stmt::Return(Some(Expr::Array(interfaces)))],
    };

    let mut args = vec![
        Expr::ident("$type"),
        Expr::TypeRef(ty.name.clone()),
        Expr::Array(ty.type_param_names.iter().map(|p| Expr::ident(p.clone())).collect()),
    ];

    let register = match ty.kind {
        TypeKind::Class => {
            let base = match &ty.base {
                Some(base) => render(base, Position::Inheritance, scope, sink),
                None => universal(),
            };
            args.push(Expr::Function {
                params: vec![],
                body: vec![Stmt::Return(Some(base))],
            });
            args.push(interfaces_thunk);
            "registerGenericClassInstance"
        }
        TypeKind::Interface => {
            args.push(interfaces_thunk);
            "registerGenericInterfaceInstance"
        }
    };

    Stmt::Expr(Expr::TypeRef("Script".into()).member(register).call(args))
}

// ============================================================================
// The shared type shape: constructors, prototype, statics
// ============================================================================

fn emit_type_shape(
    ty: &TypeDescriptor,
    target: &Expr,
    scope: &RefScope<'_>,
    out: &mut Vec<Stmt>,
    sink: &mut DiagnosticSink,
) {
    emit_type_shape_into(ty, target, &local_binding(ty), scope, out, sink);
}

fn emit_type_shape_into(
    ty: &TypeDescriptor,
    target: &Expr,
    binding: &str,
    scope: &RefScope<'_>,
    out: &mut Vec<Stmt>,
    sink: &mut DiagnosticSink,
) {
    let ctors: Vec<&MemberDescriptor> = ty
        .members
        .iter()
        .filter(|m| usable(m) && matches!(m.kind, MemberKind::Constructor { .. }))
        .collect();
    let unnamed = ctors.iter().copied().find(|m| is_unnamed(m));

    // The type identifier's own function.
    let type_fn = if ty.is_serializable || ty.kind == TypeKind::Interface {
        empty_function()
    } else if let Some(ctor) = unnamed.or_else(|| ctors.first().copied()) {
        instance_ctor_fn(ty, ctor, scope, sink)
    } else {
        empty_function()
    };
    out.push(Stmt::Var(binding.to_string(), Some(type_fn)));

    // Prototype literal.
    let entries = prototype_entries(ty);
    if !entries.is_empty() {
        out.push(Stmt::Expr(
            target.clone().member("prototype").assign(Expr::Object(entries)),
        ));
    }

    if ty.is_serializable {
        emit_serializable_ctors(ty, target, &ctors, unnamed, scope, out, sink);
    } else {
        // Named constructors hang off the type identifier and share its
        // prototype through one chained assignment.
        let named: Vec<&MemberDescriptor> =
            ctors.iter().copied().filter(|m| !is_unnamed(m)).collect();
        for ctor in &named {
            out.push(Stmt::Expr(
                target
                    .clone()
                    .member(ctor.script_name.clone())
                    .assign(instance_ctor_fn(ty, ctor, scope, sink)),
            ));
        }
        if !named.is_empty() {
            let mut chain = target.clone().member("prototype");
            for ctor in named.iter().rev() {
                chain = target
                    .clone()
                    .member(ctor.script_name.clone())
                    .member("prototype")
                    .assign(chain);
            }
            out.push(Stmt::Expr(chain));
        }
    }

    emit_statics(ty, target, out);
}

fn emit_serializable_ctors(
    ty: &TypeDescriptor,
    target: &Expr,
    ctors: &[&MemberDescriptor],
    unnamed: Option<&MemberDescriptor>,
    scope: &RefScope<'_>,
    out: &mut Vec<Stmt>,
    sink: &mut DiagnosticSink,
) {
    if unnamed.is_some() {
        out.push(Stmt::Expr(target.clone().member("createInstance").assign(
            Expr::Function {
                params: vec![],
                body: vec![Stmt::Return(Some(
                    Expr::TypeRef(registered_name(ty)).member("$ctor").call(vec![]),
                ))],
            },
        )));
    }
    for ctor in ctors {
        let name = if is_unnamed(ctor) {
            "$ctor".to_string()
        } else {
            ctor.script_name.clone()
        };
        out.push(Stmt::Expr(
            target
                .clone()
                .member(name)
                .assign(serializable_ctor_fn(ty, ctor, scope, sink)),
        ));
    }
}

fn emit_statics(ty: &TypeDescriptor, target: &Expr, out: &mut Vec<Stmt>) {
    for member in ty.members.iter().filter(|m| usable(m) && m.is_static) {
        match &member.kind {
            MemberKind::Method { .. } => {
                if let Some(value) = method_value(member) {
                    out.push(Stmt::Expr(
                        target.clone().member(member.script_name.clone()).assign(value),
                    ));
                }
            }
            MemberKind::Field { value: Some(value), .. } => {
                out.push(Stmt::Expr(
                    target
                        .clone()
                        .member(member.script_name.clone())
                        .assign(value.clone()),
                ));
            }
            MemberKind::Property { getter, setter, .. } => {
                for accessor in [getter, setter].into_iter().flatten() {
                    if accessor.usability == Usability::Normal {
                        if let Some(body) = &accessor.body {
                            out.push(Stmt::Expr(
                                target.clone().member(accessor.name.clone()).assign(body.clone()),
                            ));
                        }
                    }
                }
            }
            MemberKind::Event { adder, remover, .. } => {
                for accessor in [adder, remover].into_iter().flatten() {
                    if accessor.usability == Usability::Normal {
                        if let Some(body) = &accessor.body {
                            out.push(Stmt::Expr(
                                target.clone().member(accessor.name.clone()).assign(body.clone()),
                            ));
                        }
                    }
                }
            }
            _ => {}
        }
    }
}

// ============================================================================
// Special forms
// ============================================================================

fn emit_resources(ty: &TypeDescriptor, out: &mut Vec<Stmt>) {
    let internal = ty.visibility == Visibility::Internal;
    let entries: Vec<(String, Expr)> = ty
        .members
        .iter()
        .filter(|m| usable(m))
        .filter_map(|m| match &m.kind {
            MemberKind::Field { value: Some(value), .. } => {
                let key = if internal {
                    format!("${}", m.script_name)
                } else {
                    m.script_name.clone()
                };
                Some((key, value.clone()))
            }
            _ => None,
        })
        .collect();

    let local = local_binding(ty);
    out.push(Stmt::Var(local.clone(), Some(Expr::Object(entries))));

    if !internal {
        out.push(Stmt::Expr(
            Expr::TypeRef("Script".into()).member("registerType").call(vec![
                container(ty),
                Expr::str(registered_name(ty)),
                Expr::ident(local),
            ]),
        ));
    }
}

fn emit_global_methods(ty: &TypeDescriptor, out: &mut Vec<Stmt>) {
    let dest = if ty.module_name.is_some() {
        Expr::ident("exports")
    } else {
        Expr::ident("global")
    };
    for member in ty.members.iter().filter(|m| usable(m) && m.is_static) {
        if matches!(member.kind, MemberKind::Method { .. }) {
            if let Some(value) = method_value(member) {
                out.push(Stmt::Expr(
                    dest.clone().member(member.script_name.clone()).assign(value),
                ));
            }
        }
    }
    out.extend(ty.static_init.iter().cloned());
}

fn emit_mixin(ty: &TypeDescriptor, mixin_target: &str, out: &mut Vec<Stmt>) {
    let dest = Expr::Raw(mixin_target.to_string());
    for member in ty.members.iter().filter(|m| usable(m) && m.is_static) {
        if matches!(member.kind, MemberKind::Method { .. }) {
            if let Some(value) = method_value(member) {
                out.push(Stmt::Expr(
                    dest.clone().member(member.script_name.clone()).assign(value),
                ));
            }
        }
    }
    out.extend(ty.static_init.iter().cloned());
}

// ============================================================================
// Registration calls
// ============================================================================

fn registration_call(
    ty: &TypeDescriptor,
    universe: &TypeUniverse,
    scope: &RefScope<'_>,
    local: &str,
    sink: &mut DiagnosticSink,
) -> Stmt {
    let interfaces = rendered_interfaces(ty, universe, scope, sink);
    let mut args = vec![
        container(ty),
        Expr::str(registered_name(ty)),
        Expr::ident(local.to_string()),
    ];

    let register = match ty.kind {
        TypeKind::Interface => {
            if !interfaces.is_empty() {
                args.push(Expr::Array(interfaces));
            }
            "registerInterface"
        }
        TypeKind::Class => {
            // Trailing arguments are omitted when empty; an explicit
            // null base is written only when interfaces follow it.
            let base = ty
                .base
                .as_ref()
                .map(|b| render(b, Position::Inheritance, scope, sink));
            match (base, interfaces.is_empty()) {
                (Some(base), true) => args.push(base),
                (Some(base), false) => {
                    args.push(base);
                    args.push(Expr::Array(interfaces));
                }
                (None, false) => {
                    args.push(Expr::Null);
                    args.push(Expr::Array(interfaces));
                }
                (None, true) => {}
            }
            "registerClass"
        }
    };

    Stmt::Expr(Expr::TypeRef("Script".into()).member(register).call(args))
}

/// Interfaces marked imported-and-not-obeying are dropped from every
/// interface list.
fn rendered_interfaces(
    ty: &TypeDescriptor,
    universe: &TypeUniverse,
    scope: &RefScope<'_>,
    sink: &mut DiagnosticSink,
) -> Vec<Expr> {
    ty.interfaces
        .iter()
        .filter(|i| match i.declared_name() {
            Some(n) => !universe.facts(n).erased_in_inheritance(),
            None => true,
        })
        .map(|i| render(i, Position::Inheritance, scope, sink))
        .collect()
}

fn container(ty: &TypeDescriptor) -> Expr {
    if ty.visibility == Visibility::Internal {
        Expr::Null
    } else if ty.module_name.is_some() {
        Expr::ident("exports")
    } else {
        Expr::ident("global")
    }
}

// ============================================================================
// Member helpers
// ============================================================================

fn usable(member: &MemberDescriptor) -> bool {
    member.usability == Usability::Normal
}

fn is_unnamed(member: &MemberDescriptor) -> bool {
    matches!(member.kind, MemberKind::Constructor { unnamed: true, .. })
}

fn empty_function() -> Expr {
    Expr::Function {
        params: vec![],
        body: vec![],
    }
}

fn function_parts(body: Option<&Expr>) -> (Vec<String>, Vec<Stmt>) {
    match body {
        Some(Expr::Function { params, body }) => (params.clone(), body.clone()),
        _ => (Vec::new(), Vec::new()),
    }
}

/// A constructor function with the base-construction call chained in
/// front of its own statements. The chain is skipped when there is no
/// base or the base is imported without obeying the type system.
fn instance_ctor_fn(
    ty: &TypeDescriptor,
    ctor: &MemberDescriptor,
    scope: &RefScope<'_>,
    sink: &mut DiagnosticSink,
) -> Expr {
    let body = match &ctor.kind {
        MemberKind::Constructor { body, .. } => body.as_ref(),
        _ => None,
    };
    let (params, mut stmts) = function_parts(body);
    if let Some(chain) = base_chain(ty, scope, sink) {
        stmts.insert(0, chain);
    }
    Expr::Function { params, body: stmts }
}

fn base_chain(ty: &TypeDescriptor, scope: &RefScope<'_>, sink: &mut DiagnosticSink) -> Option<Stmt> {
    let base = ty.base.as_ref()?;
    if let Some(name) = base.declared_name() {
        if scope.universe.facts(name).erased_in_inheritance() {
            return None;
        }
    }
    let base_expr = render(base, Position::Inheritance, scope, sink);
    Some(Stmt::Expr(
        base_expr.member("call").call(vec![Expr::ident("this")]),
    ))
}

/// Serializable constructors allocate and return `$this` instead of
/// mutating `this`; the base chain becomes base `$ctor` delegation.
fn serializable_ctor_fn(
    ty: &TypeDescriptor,
    ctor: &MemberDescriptor,
    scope: &RefScope<'_>,
    sink: &mut DiagnosticSink,
) -> Expr {
    let body = match &ctor.kind {
        MemberKind::Constructor { body, .. } => body.as_ref(),
        _ => None,
    };
    let (params, body_stmts) = function_parts(body);
    let init = match &ty.base {
        Some(base) => render(base, Position::Inheritance, scope, sink)
            .member("$ctor")
            .call(vec![]),
        None => Expr::Object(vec![]),
    };
    let mut stmts = vec![Stmt::Var("$this".into(), Some(init))];
    stmts.extend(body_stmts);
    stmts.push(Stmt::Return(Some(Expr::ident("$this"))));
    Expr::Function { params, body: stmts }
}

/// The value a method contributes to the prototype or statics. Generic
/// methods that carry their arguments become an outer function over the
/// type parameters returning the real body; abstract methods have no
/// value here (prototype uses null placeholders instead).
fn method_value(member: &MemberDescriptor) -> Option<Expr> {
    match &member.kind {
        MemberKind::Method {
            body: Some(body),
            generic_arity,
            type_param_names,
            include_generic_arguments,
            is_abstract: false,
            ..
        } => {
            if *generic_arity > 0 && *include_generic_arguments {
                Some(Expr::Function {
                    params: type_param_names.clone(),
                    body: vec![Stmt::Return(Some(body.clone()))],
                })
            } else {
                Some(body.clone())
            }
        }
        _ => None,
    }
}

/// Prototype entries in declaration order: instance methods, property
/// accessors, event accessors. Interface members and abstract methods
/// appear as null placeholders.
fn prototype_entries(ty: &TypeDescriptor) -> Vec<(String, Expr)> {
    let placeholder_only = ty.kind == TypeKind::Interface;
    let mut entries = Vec::new();
    for member in ty.members.iter().filter(|m| usable(m) && !m.is_static) {
        match &member.kind {
            MemberKind::Method { .. } => {
                let value = if placeholder_only {
                    Expr::Null
                } else {
                    method_value(member).unwrap_or(Expr::Null)
                };
                entries.push((member.script_name.clone(), value));
            }
            MemberKind::Property { getter, setter, .. } => {
                for accessor in [getter, setter].into_iter().flatten() {
                    if accessor.usability != Usability::Normal {
                        continue;
                    }
                    let value = if placeholder_only {
                        Expr::Null
                    } else {
                        accessor.body.clone().unwrap_or(Expr::Null)
                    };
                    entries.push((accessor.name.clone(), value));
                }
            }
            MemberKind::Event { adder, remover, .. } => {
                for accessor in [adder, remover].into_iter().flatten() {
                    if accessor.usability != Usability::Normal {
                        continue;
                    }
                    let value = if placeholder_only {
                        Expr::Null
                    } else {
                        accessor.body.clone().unwrap_or(Expr::Null)
                    };
                    entries.push((accessor.name.clone(), value));
                }
            }
            _ => {}
        }
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::TypeRef;
    use crate::js::write_stmts;

    fn simple_fn(params: &[&str], stmts: Vec<Stmt>) -> Expr {
        Expr::Function {
            params: params.iter().map(|p| p.to_string()).collect(),
            body: stmts,
        }
    }

    fn assign_zero(name: &str) -> Stmt {
        Stmt::Expr(Expr::ident(name).assign(Expr::Num(0.0)))
    }

    fn method(name: &str, script_name: &str, params: &[&str], stmts: Vec<Stmt>) -> MemberDescriptor {
        MemberDescriptor::new(
            name,
            script_name,
            MemberKind::Method {
                params: vec![],
                return_type: TypeRef::Any,
                generic_arity: 0,
                type_param_names: vec![],
                include_generic_arguments: true,
                body: Some(simple_fn(params, stmts)),
                is_abstract: false,
            },
        )
    }

    fn ctor(params: &[&str], stmts: Vec<Stmt>, unnamed: bool, script_name: &str) -> MemberDescriptor {
        MemberDescriptor::new(
            ".ctor",
            script_name,
            MemberKind::Constructor {
                params: vec![],
                body: Some(simple_fn(params, stmts)),
                unnamed,
            },
        )
    }

    fn emit_text(ty: &TypeDescriptor, universe: &TypeUniverse) -> String {
        let mut sink = DiagnosticSink::new();
        let stmts = emit_type(ty, universe, &mut sink);
        assert!(sink.is_empty(), "unexpected diagnostics: {:?}", sink.diagnostics());
        write_stmts(&stmts)
    }

    #[test]
    fn test_class_with_only_name_has_minimal_registration() {
        let mut ty = TypeDescriptor::new("MyClass", TypeKind::Class);
        ty.members.push(ctor(&["x"], vec![assign_zero("x")], true, ""));
        let text = emit_text(&ty, &TypeUniverse::new());
        assert_eq!(
            text,
            "////////////////////////////////////////////////////////////////////////////////\n\
             // MyClass\n\
             var $MyClass = function(x) {\n\
             \tx = 0;\n\
             };\n\
             {Script}.registerClass(global, 'MyClass', $MyClass);\n"
        );
    }

    #[test]
    fn test_base_chain_prepended_and_interfaces_listed() {
        let mut ty = TypeDescriptor::new("MyClass", TypeKind::Class);
        ty.base = Some(TypeRef::named("TheBaseClass"));
        ty.interfaces = vec![TypeRef::named("Interface1"), TypeRef::named("Interface2")];
        ty.members.push(ctor(&["x"], vec![assign_zero("x")], true, ""));
        let text = emit_text(&ty, &TypeUniverse::new());
        assert!(text.contains("var $MyClass = function(x) {\n\t{TheBaseClass}.call(this);\n\tx = 0;\n};\n"));
        assert!(text.contains(
            "{Script}.registerClass(global, 'MyClass', $MyClass, {TheBaseClass}, [{Interface1}, {Interface2}]);\n"
        ));
    }

    #[test]
    fn test_interfaces_only_passes_null_base() {
        let mut ty = TypeDescriptor::new("MyClass", TypeKind::Class);
        ty.interfaces = vec![TypeRef::named("Interface1")];
        ty.members.push(ctor(&[], vec![], true, ""));
        let text = emit_text(&ty, &TypeUniverse::new());
        assert!(text.contains("{Script}.registerClass(global, 'MyClass', $MyClass, null, [{Interface1}]);\n"));
    }

    #[test]
    fn test_prototype_omitted_without_instance_methods() {
        let mut ty = TypeDescriptor::new("MyClass", TypeKind::Class);
        ty.members.push(ctor(&[], vec![], true, ""));
        ty.members
            .push(method("S1", "s1", &["f"], vec![assign_zero("f")]).static_member());
        let text = emit_text(&ty, &TypeUniverse::new());
        assert!(!text.contains(".prototype ="));
        assert!(text.contains("$MyClass.s1 = function(f) {\n\tf = 0;\n};\n"));
    }

    #[test]
    fn test_named_constructors_share_prototype() {
        let mut ty = TypeDescriptor::new("MyClass", TypeKind::Class);
        ty.members.push(ctor(&[], vec![], true, ""));
        ty.members.push(ctor(&["b"], vec![assign_zero("b")], false, "$ctor1"));
        ty.members.push(ctor(&["c"], vec![assign_zero("c")], false, "$ctor2"));
        ty.members.push(method("M1", "m1", &["d"], vec![assign_zero("d")]));
        let text = emit_text(&ty, &TypeUniverse::new());
        assert!(text.contains("$MyClass.$ctor1 = function(b) {\n\tb = 0;\n};\n"));
        assert!(text.contains("$MyClass.$ctor1.prototype = $MyClass.$ctor2.prototype = $MyClass.prototype;\n"));
    }

    #[test]
    fn test_type_without_unnamed_constructor_uses_first_named() {
        let mut ty = TypeDescriptor::new("MyClass", TypeKind::Class);
        ty.members.push(ctor(&["x"], vec![], false, "someName"));
        ty.members.push(method("M1", "m1", &[], vec![]));
        let text = emit_text(&ty, &TypeUniverse::new());
        assert!(text.contains("var $MyClass = function(x) {\n};\n"));
        assert!(text.contains("$MyClass.someName = function(x) {\n};\n"));
        assert!(text.contains("$MyClass.someName.prototype = $MyClass.prototype;\n"));
    }

    #[test]
    fn test_interface_members_are_null_placeholders() {
        let mut ty = TypeDescriptor::new("IMyInterface", TypeKind::Interface);
        ty.interfaces = vec![TypeRef::named("Interface1")];
        ty.members.push(method("M1", "m1", &[], vec![]));
        ty.members.push(method("M2", "m2", &[], vec![]));
        let text = emit_text(&ty, &TypeUniverse::new());
        assert!(text.contains("var $IMyInterface = function() {\n};\n"));
        assert!(text.contains("$IMyInterface.prototype = { m1: null, m2: null };\n"));
        assert!(text.contains(
            "{Script}.registerInterface(global, 'IMyInterface', $IMyInterface, [{Interface1}]);\n"
        ));
    }

    #[test]
    fn test_internal_type_registers_with_null_container_and_mangled_name() {
        let mut ty = TypeDescriptor::new("Outer.Inner", TypeKind::Class);
        ty.visibility = Visibility::Internal;
        let text = emit_text(&ty, &TypeUniverse::new());
        assert!(text.contains("var $$Outer$Inner = function() {\n};\n"));
        assert!(text.contains("{Script}.registerClass(null, '$Outer$Inner', $$Outer$Inner);\n"));
    }

    #[test]
    fn test_module_name_exports_container() {
        let mut ty = TypeDescriptor::new("NormalClass", TypeKind::Class);
        ty.module_name = Some("mymodule".into());
        let text = emit_text(&ty, &TypeUniverse::new());
        assert!(text.contains("{Script}.registerClass(exports, 'NormalClass', $NormalClass);\n"));
    }

    #[test]
    fn test_static_initializer_follows_registration() {
        let mut ty = TypeDescriptor::new("MyClass", TypeKind::Class);
        ty.members.push(ctor(&[], vec![], true, ""));
        ty.static_init = vec![
            Stmt::Var("h".into(), Some(Expr::Num(0.0))),
            Stmt::Var("i".into(), Some(Expr::Num(0.0))),
        ];
        let text = emit_text(&ty, &TypeUniverse::new());
        let reg = text.find("registerClass").unwrap();
        let init = text.find("var h = 0;").unwrap();
        assert!(init > reg);
        assert!(text.ends_with("var h = 0;\nvar i = 0;\n"));
    }

    #[test]
    fn test_generic_class_factory() {
        let mut ty = TypeDescriptor::new("GenericClass", TypeKind::Class);
        ty.generic_arity = 1;
        ty.type_param_names = vec!["T1".into()];
        let text = emit_text(&ty, &TypeUniverse::new());
        assert_eq!(
            text,
            "////////////////////////////////////////////////////////////////////////////////\n\
             // GenericClass\n\
             var $GenericClass$1 = function(T1) {\n\
             \tvar $type = function() {\n\
             \t};\n\
             \t{Script}.registerGenericClassInstance($type, {GenericClass}, [T1], function() {\n\
             \t\treturn {Object};\n\
             \t}, function() {\n\
             \t\treturn [];\n\
             \t});\n\
             \treturn $type;\n\
             };\n\
             {Script}.registerGenericClass(global, 'GenericClass$1', $GenericClass$1, 1);\n"
        );
    }

    #[test]
    fn test_generic_interface_factory() {
        let mut ty = TypeDescriptor::new("GenericInterface", TypeKind::Interface);
        ty.visibility = Visibility::Internal;
        ty.generic_arity = 1;
        ty.type_param_names = vec!["T1".into()];
        let text = emit_text(&ty, &TypeUniverse::new());
        assert!(text.contains("var $$GenericInterface$1 = function(T1) {\n"));
        assert!(text.contains(
            "\t{Script}.registerGenericInterfaceInstance($type, {GenericInterface}, [T1], function() {\n\t\treturn [];\n\t});\n"
        ));
        assert!(text.contains(
            "{Script}.registerGenericInterface(null, '$GenericInterface$1', $$GenericInterface$1, 1);\n"
        ));
    }

    #[test]
    fn test_generic_base_uses_instantiation_in_chain_and_thunk() {
        let mut ty = TypeDescriptor::new("MyClass", TypeKind::Class);
        ty.generic_arity = 2;
        ty.type_param_names = vec!["T1".into(), "T2".into()];
        ty.base = Some(TypeRef::generic("TheBaseClass", vec![TypeRef::Param(0)]));
        ty.members.push(ctor(&[], vec![assign_zero("a")], true, ""));
        let text = emit_text(&ty, &TypeUniverse::new());
        assert!(text.contains(
            "\tvar $type = function() {\n\t\t{Script}.makeGenericType({TheBaseClass}, [T1]).call(this);\n\t\ta = 0;\n\t};\n"
        ));
        assert!(text.contains(
            "function() {\n\t\treturn {Script}.makeGenericType({TheBaseClass}, [T1]);\n\t}"
        ));
    }

    #[test]
    fn test_generic_method_wrapping() {
        let mut ty = TypeDescriptor::new("MyClass", TypeKind::Class);
        ty.members.push(ctor(&[], vec![], true, ""));
        let mut m = method("M1", "m1", &["a"], vec![Stmt::Var("x".into(), Some(Expr::Num(0.0)))]);
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
        let text = emit_text(&ty, &TypeUniverse::new());
        assert!(text.contains(
            "$MyClass.prototype = {\n\tm1: function(T1, T2) {\n\t\treturn function(a) {\n\t\t\tvar x = 0;\n\t\t};\n\t}\n};\n"
        ));
    }

    #[test]
    fn test_resources_forms() {
        let mut ty = TypeDescriptor::new("MyClass", TypeKind::Class);
        ty.is_resources = true;
        ty.members.push(MemberDescriptor::new(
            "Field1",
            "field1",
            MemberKind::Field {
                field_type: TypeRef::named("String"),
                value: Some(Expr::str("the value")),
            },
        ));
        ty.members.push(MemberDescriptor::new(
            "Field2",
            "field2",
            MemberKind::Field {
                field_type: TypeRef::named("Int32"),
                value: Some(Expr::Num(42.0)),
            },
        ));
        let text = emit_text(&ty, &TypeUniverse::new());
        assert!(text.contains("var $MyClass = { field1: 'the value', field2: 42 };\n"));
        assert!(text.contains("{Script}.registerType(global, 'MyClass', $MyClass);\n"));

        // Internal resources mangle keys and skip registration.
        ty.visibility = Visibility::Internal;
        let text = emit_text(&ty, &TypeUniverse::new());
        assert!(text.contains("var $$MyClass = { $field1: 'the value', $field2: 42 };\n"));
        assert!(!text.contains("registerType"));
    }

    #[test]
    fn test_global_methods_attach_to_container() {
        let mut ty = TypeDescriptor::new("MyClass", TypeKind::Class);
        ty.global_methods = true;
        ty.members
            .push(method("S1", "s1", &["a"], vec![assign_zero("a")]).static_member());
        ty.static_init = vec![Stmt::Var("c".into(), Some(Expr::Num(0.0)))];
        let text = emit_text(&ty, &TypeUniverse::new());
        assert!(text.contains("global.s1 = function(a) {\n\ta = 0;\n};\n"));
        assert!(text.contains("var c = 0;\n"));
        assert!(!text.contains("register"));
    }

    #[test]
    fn test_mixin_attaches_to_target_expression() {
        let mut ty = TypeDescriptor::new("MyClass", TypeKind::Class);
        ty.mixin_target = Some("$.fn".into());
        ty.members
            .push(method("Method1", "method1", &["x"], vec![assign_zero("x")]).static_member());
        let text = emit_text(&ty, &TypeUniverse::new());
        assert!(text.contains("$.fn.method1 = function(x) {\n\tx = 0;\n};\n"));
        assert!(!text.contains("register"));
    }

    #[test]
    fn test_imported_base_kept_in_registration_but_not_chained() {
        let mut universe = TypeUniverse::new();
        universe.insert(
            "B".into(),
            crate::descriptor::TypeFacts {
                is_imported: true,
                obeys_type_system: false,
                non_reflectable: false,
            },
        );
        let mut ty = TypeDescriptor::new("D", TypeKind::Class);
        ty.base = Some(TypeRef::named("B"));
        ty.members.push(ctor(&[], vec![], true, ""));
        let text = emit_text(&ty, &universe);
        assert!(text.contains("var $D = function() {\n};\n"), "no chain call: {}", text);
        assert!(text.contains("{Script}.registerClass(global, 'D', $D, {B});\n"));
    }

    #[test]
    fn test_imported_interfaces_filtered() {
        let mut universe = TypeUniverse::new();
        universe.insert(
            "I1".into(),
            crate::descriptor::TypeFacts {
                is_imported: true,
                obeys_type_system: false,
                non_reflectable: false,
            },
        );
        let mut ty = TypeDescriptor::new("D", TypeKind::Class);
        ty.interfaces = vec![TypeRef::named("I1"), TypeRef::named("I2")];
        let text = emit_text(&ty, &universe);
        assert!(text.contains("{Script}.registerClass(global, 'D', $D, null, [{I2}]);\n"));
    }

    #[test]
    fn test_instantiations_of_imported_interfaces_filtered() {
        let mut universe = TypeUniverse::new();
        universe.insert(
            "I1$1".into(),
            crate::descriptor::TypeFacts {
                is_imported: true,
                obeys_type_system: false,
                non_reflectable: false,
            },
        );
        let mut ty = TypeDescriptor::new("D", TypeKind::Class);
        ty.interfaces = vec![
            TypeRef::named("I1$1"),
            TypeRef::generic("I1$1", vec![TypeRef::named("Int32")]),
        ];
        let text = emit_text(&ty, &universe);
        assert!(!text.contains("makeGenericType"), "{}", text);
        assert!(text.contains("{Script}.registerClass(global, 'D', $D);\n"));
    }

    #[test]
    fn test_instantiation_of_imported_base_not_chained() {
        let mut universe = TypeUniverse::new();
        universe.insert(
            "B$1".into(),
            crate::descriptor::TypeFacts {
                is_imported: true,
                obeys_type_system: false,
                non_reflectable: false,
            },
        );
        let mut ty = TypeDescriptor::new("D", TypeKind::Class);
        ty.base = Some(TypeRef::generic("B$1", vec![TypeRef::named("Int32")]));
        ty.members.push(ctor(&[], vec![], true, ""));
        let text = emit_text(&ty, &universe);
        assert!(text.contains("var $D = function() {\n};\n"), "no chain call: {}", text);
        assert!(text.contains(
            "{Script}.registerClass(global, 'D', $D, {Script}.makeGenericType({B$1}, [{Int32}]));\n"
        ));
    }

    #[test]
    fn test_abstract_method_with_leftover_body_stays_null() {
        let mut ty = TypeDescriptor::new("MyClass", TypeKind::Class);
        ty.members.push(ctor(&[], vec![], true, ""));
        let mut m = method("M1", "m1", &["x"], vec![assign_zero("x")]);
        if let MemberKind::Method { is_abstract, .. } = &mut m.kind {
            *is_abstract = true;
        }
        ty.members.push(m);
        let text = emit_text(&ty, &TypeUniverse::new());
        assert!(text.contains("$MyClass.prototype = { m1: null };\n"), "{}", text);
    }

    #[test]
    fn test_serializable_class_shape() {
        let mut ty = TypeDescriptor::new("D", TypeKind::Class);
        ty.is_serializable = true;
        ty.base = Some(TypeRef::named("B"));
        ty.members.push(ctor(&[], vec![], true, ""));
        let text = emit_text(&ty, &TypeUniverse::new());
        assert_eq!(
            text,
            "////////////////////////////////////////////////////////////////////////////////\n\
             // D\n\
             var $D = function() {\n\
             };\n\
             $D.createInstance = function() {\n\
             \treturn {D}.$ctor();\n\
             };\n\
             $D.$ctor = function() {\n\
             \tvar $this = {B}.$ctor();\n\
             \treturn $this;\n\
             };\n\
             {Script}.registerClass(global, 'D', $D, {B});\n"
        );
    }

    #[test]
    fn test_serializable_without_base_allocates_object_literal() {
        let mut ty = TypeDescriptor::new("C11", TypeKind::Class);
        ty.is_serializable = true;
        ty.members.push(ctor(
            &["dt"],
            vec![Stmt::Expr(
                Expr::ident("$this").member("d").assign(Expr::ident("dt")),
            )],
            true,
            "",
        ));
        let text = emit_text(&ty, &TypeUniverse::new());
        assert!(text.contains(
            "$C11.$ctor = function(dt) {\n\tvar $this = {};\n\t$this.d = dt;\n\treturn $this;\n};\n"
        ));
    }
}
