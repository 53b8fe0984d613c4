//! Declared-plus-inherited member lists.
//!
//! Walk order is depth-first pre-order: a type's own members come first, followed by those of
//! each super-interface in declaration order and then, for classes, those of the superclass.
//! Members are concatenated as-is; shadowed or diamond-inherited members appear once per path.
//!
//! [`flatten`] assumes an acyclic supertype graph and does not terminate on a cyclic one.
//! [`try_flatten`] returns the same result on acyclic graphs and reports cycles as errors.

use keystone_core::ModelError;

use crate::{ClassInfo, ClassNode, Member, MemberKind};

/// Declared and inherited members of `kind`, without deduplication.
pub fn flatten(node: &ClassNode, kind: MemberKind) -> Vec<Member> {
    flatten_by(node, &|class: &ClassNode| declared(class, kind))
}

/// Like [`flatten`], but fails with [`ModelError::CyclicHierarchy`] instead of recursing forever.
pub fn try_flatten(node: &ClassNode, kind: MemberKind) -> Result<Vec<Member>, ModelError> {
    let mut out = Vec::new();
    let mut ancestry = Vec::new();
    collect_checked(node, kind, &mut ancestry, &mut out)?;
    Ok(out)
}

pub(crate) fn flatten_by<M>(node: &ClassNode, declared: &dyn Fn(&ClassNode) -> Vec<M>) -> Vec<M> {
    let mut out = Vec::new();
    collect(node, declared, &mut out);
    out
}

fn collect<M>(node: &ClassNode, declared: &dyn Fn(&ClassNode) -> Vec<M>, out: &mut Vec<M>) {
    out.extend(declared(node));
    for interface in node.interfaces() {
        collect(&interface, declared, out);
    }
    if !node.is_interface() {
        if let Some(superclass) = node.superclass() {
            collect(&superclass, declared, out);
        }
    }
}

fn collect_checked(
    node: &ClassNode,
    kind: MemberKind,
    ancestry: &mut Vec<ClassNode>,
    out: &mut Vec<Member>,
) -> Result<(), ModelError> {
    if ancestry.contains(node) {
        return Err(ModelError::CyclicHierarchy {
            class: node.qualified_name().to_owned(),
        });
    }
    out.extend(declared(node, kind));

    ancestry.push(node.clone());
    let result = (|| {
        for interface in node.interfaces() {
            collect_checked(&interface, kind, ancestry, out)?;
        }
        match node.superclass() {
            Some(superclass) if !node.is_interface() => {
                collect_checked(&superclass, kind, ancestry, out)
            }
            _ => Ok(()),
        }
    })();
    ancestry.pop();
    result
}

fn declared(node: &ClassNode, kind: MemberKind) -> Vec<Member> {
    match kind {
        MemberKind::Field => node
            .declared_fields()
            .into_iter()
            .map(Member::Field)
            .collect(),
        MemberKind::Method => node
            .declared_methods()
            .into_iter()
            .map(Member::Method)
            .collect(),
    }
}
