//! Reflection eligibility validation
//!
//! A member may opt into reflection metadata only if it has a callable
//! script entity. Members realized as inline code, object literals,
//! native operators, or excluded from script entirely have nothing the
//! runtime could bind to, so requesting reflection on them is an error.
//!
//! Validation never mutates descriptors and never aborts emission: an
//! ineligible member is still emitted structurally, only its metadata
//! is withheld. Exactly one diagnostic is reported per offending member.

use crate::descriptor::{AccessorDescriptor, MemberDescriptor, MemberKind, TypeDescriptor, Usability};
use crate::diagnostics::{
    DiagnosticSink, CODE_ACCESSOR_NOT_REFLECTABLE, CODE_CTOR_NOT_REFLECTABLE,
    CODE_MEMBER_NOT_REFLECTABLE,
};

/// Whether a member's reflection metadata should be emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Metadata is emitted.
    Emit,
    /// Member never asked for reflection; nothing to emit, no error.
    NotRequested,
    /// Reflection was requested but the member is ineligible.
    Withheld,
}

impl Verdict {
    pub fn emits(self) -> bool {
        self == Verdict::Emit
    }
}

/// Validate every member of a type. Returns one verdict per member, in
/// declaration order; diagnostics go to the sink.
pub fn validate_type(ty: &TypeDescriptor, sink: &mut DiagnosticSink) -> Vec<Verdict> {
    ty.members
        .iter()
        .map(|member| validate_member(&ty.name, member, sink))
        .collect()
}

/// Validate a single member's reflection request.
pub fn validate_member(
    type_name: &str,
    member: &MemberDescriptor,
    sink: &mut DiagnosticSink,
) -> Verdict {
    if !member.reflectable {
        return Verdict::NotRequested;
    }

    match &member.kind {
        MemberKind::Constructor { .. } => {
            if member.usability != Usability::Normal {
                sink.error(
                    CODE_CTOR_NOT_REFLECTABLE,
                    format!(
                        "The constructor of type {} cannot be used with reflection because it is {}",
                        type_name,
                        member.usability.reason()
                    ),
                );
                return Verdict::Withheld;
            }
        }
        MemberKind::Method { .. } | MemberKind::Field { .. } => {
            if member.usability != Usability::Normal {
                sink.error(
                    CODE_MEMBER_NOT_REFLECTABLE,
                    member_message(type_name, member),
                );
                return Verdict::Withheld;
            }
        }
        MemberKind::Property { getter, setter, .. } => {
            if member.usability != Usability::Normal {
                sink.error(
                    CODE_MEMBER_NOT_REFLECTABLE,
                    member_message(type_name, member),
                );
                return Verdict::Withheld;
            }
            if let Some(bad) = first_unusable(&[(getter.as_ref(), "getter"), (setter.as_ref(), "setter")]) {
                report_accessor(type_name, member, bad, sink);
                return Verdict::Withheld;
            }
        }
        MemberKind::Event { adder, remover, .. } => {
            if member.usability != Usability::Normal {
                sink.error(
                    CODE_MEMBER_NOT_REFLECTABLE,
                    member_message(type_name, member),
                );
                return Verdict::Withheld;
            }
            if let Some(bad) = first_unusable(&[
                (adder.as_ref(), "add accessor"),
                (remover.as_ref(), "remove accessor"),
            ]) {
                report_accessor(type_name, member, bad, sink);
                return Verdict::Withheld;
            }
        }
    }

    Verdict::Emit
}

fn member_message(type_name: &str, member: &MemberDescriptor) -> String {
    format!(
        "The member {}.{} cannot be used with reflection because the {} is {}",
        type_name,
        member.name,
        member.kind.kind_word(),
        member.usability.reason()
    )
}

fn first_unusable(
    accessors: &[(Option<&AccessorDescriptor>, &'static str)],
) -> Option<(&'static str, Usability)> {
    for (accessor, word) in accessors {
        if let Some(accessor) = accessor {
            if accessor.usability != Usability::Normal {
                return Some((word, accessor.usability));
            }
        }
    }
    None
}

fn report_accessor(
    type_name: &str,
    member: &MemberDescriptor,
    (word, usability): (&'static str, Usability),
    sink: &mut DiagnosticSink,
) {
    sink.error(
        CODE_ACCESSOR_NOT_REFLECTABLE,
        format!(
            "The member {}.{} cannot be used with reflection because the {} of the {} is {}",
            type_name,
            member.name,
            word,
            member.kind.kind_word(),
            usability.reason()
        ),
    );
}
