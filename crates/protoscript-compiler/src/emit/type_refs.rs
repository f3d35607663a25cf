//! Type-reference rendering
//!
//! One substitution function applied uniformly to parameter lists,
//! return types, and inheritance references. "Erase" substitutes the
//! universal type; "close" substitutes the factory-scoped parameter
//! identifiers. Imported types that do not obey the type system collapse
//! to the universal type in type-argument positions of inheritance
//! lists.

use crate::descriptor::{TypeRef, TypeUniverse};
use crate::diagnostics::{DiagnosticSink, CODE_ERASED_GENERIC_ARGUMENT};
use crate::js::Expr;

/// Rendered name of the universal type.
pub const UNIVERSAL_TYPE: &str = "Object";

/// Where a reference occurs; controls imported-type erasure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    /// Base-class and interface-list expressions (and their arguments).
    Inheritance,
    /// Member signatures surfaced through reflection metadata.
    Signature,
}

/// Everything substitution needs to know about the enclosing scope.
pub struct RefScope<'a> {
    pub universe: &'a TypeUniverse,
    /// Qualified name of the type being emitted.
    pub self_name: &'a str,
    /// Factory parameter identifiers; empty unless the type carries its
    /// generic arguments.
    pub type_params: &'a [String],
    /// Identifiers of the enclosing method's carried type parameters.
    pub method_params: &'a [String],
}

impl<'a> RefScope<'a> {
    pub fn new(universe: &'a TypeUniverse, self_name: &'a str) -> Self {
        RefScope {
            universe,
            self_name,
            type_params: &[],
            method_params: &[],
        }
    }

    pub fn with_type_params(mut self, params: &'a [String]) -> Self {
        self.type_params = params;
        self
    }

    pub fn with_method_params(mut self, params: &'a [String]) -> Self {
        self.method_params = params;
        self
    }
}

/// The universal type reference.
pub fn universal() -> Expr {
    Expr::TypeRef(UNIVERSAL_TYPE.into())
}

/// Render a type reference. Diagnostics (erased type parameters used as
/// generic arguments) go to the sink; the offending position renders as
/// the universal type so emission can continue.
pub fn render(
    tr: &TypeRef,
    pos: Position,
    scope: &RefScope<'_>,
    sink: &mut DiagnosticSink,
) -> Expr {
    render_inner(tr, pos, false, scope, sink)
}

fn render_inner(
    tr: &TypeRef,
    pos: Position,
    in_type_arg: bool,
    scope: &RefScope<'_>,
    sink: &mut DiagnosticSink,
) -> Expr {
    match tr {
        TypeRef::Any => universal(),
        TypeRef::Named(name) => {
            // Type arguments in inheritance lists lose imported types
            // that do not obey the type system. Bases and signatures
            // keep them.
            if in_type_arg
                && pos == Position::Inheritance
                && scope.universe.facts(name).erased_in_inheritance()
            {
                universal()
            } else {
                Expr::TypeRef(name.clone())
            }
        }
        TypeRef::Param(i) => render_param(scope.type_params, *i, in_type_arg, scope, sink),
        TypeRef::MethodParam(i) => render_param(scope.method_params, *i, in_type_arg, scope, sink),
        TypeRef::Generic { def, args } => {
            if is_self_reference(def, args, scope) {
                return Expr::ident("$type");
            }
            let rendered: Vec<Expr> = args
                .iter()
                .map(|a| render_inner(a, pos, true, scope, sink))
                .collect();
            Expr::TypeRef("Script".into())
                .member("makeGenericType")
                .call(vec![Expr::TypeRef(def.clone()), Expr::Array(rendered)])
        }
    }
}

fn render_param(
    params: &[String],
    index: usize,
    in_type_arg: bool,
    scope: &RefScope<'_>,
    sink: &mut DiagnosticSink,
) -> Expr {
    match params.get(index) {
        Some(name) => Expr::ident(name.clone()),
        None => {
            // The parameter was erased. In a signature that silently
            // becomes the universal type; as a generic argument it is an
            // error because no value exists to substitute.
            if in_type_arg {
                sink.error(
                    CODE_ERASED_GENERIC_ARGUMENT,
                    format!(
                        "Cannot use a type parameter of type {0} as a generic argument because \
                         type {0} has IncludeGenericArguments(false) applied to it",
                        scope.self_name
                    ),
                );
            }
            universal()
        }
    }
}

/// A reference to the enclosing generic type with its own parameters in
/// declaration order resolves to the factory-local `$type` binding.
fn is_self_reference(def: &str, args: &[TypeRef], scope: &RefScope<'_>) -> bool {
    def == scope.self_name
        && !scope.type_params.is_empty()
        && args.len() == scope.type_params.len()
        && args
            .iter()
            .enumerate()
            .all(|(i, a)| matches!(a, TypeRef::Param(j) if *j == i))
}
