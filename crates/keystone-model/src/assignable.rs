//! Subtype test over the class graph.

use keystone_core::ModelError;

use crate::{ClassInfo, ClassNode};

fn is_value_type(class: &ClassNode) -> bool {
    class.is_primitive_type() || class.is_void_type()
}

/// Whether a value of type `other` may be used where `target` is expected.
///
/// Primitives (and `void`) only match themselves. The hierarchy root accepts every object type.
/// Otherwise `other` qualifies when it is `target`, or when one of its interfaces or its
/// superclass does, checked depth-first with interfaces before the superclass.
///
/// Assumes an acyclic supertype graph; see [`try_is_assignable_from`].
pub fn is_assignable_from(target: &ClassNode, other: &ClassNode) -> bool {
    if is_value_type(target) || is_value_type(other) {
        return target.qualified_name() == other.qualified_name();
    }
    if target.is_object_type() {
        return true;
    }
    assignable_recursively(target.qualified_name(), other)
}

fn assignable_recursively(target: &str, other: &ClassNode) -> bool {
    if other.qualified_name() == target {
        return true;
    }
    if other
        .interfaces()
        .iter()
        .any(|interface| assignable_recursively(target, interface))
    {
        return true;
    }
    other
        .superclass()
        .is_some_and(|superclass| assignable_recursively(target, &superclass))
}

/// Like [`is_assignable_from`], but reports a cyclic supertype graph instead of diverging.
pub fn try_is_assignable_from(target: &ClassNode, other: &ClassNode) -> Result<bool, ModelError> {
    if is_value_type(target) || is_value_type(other) {
        return Ok(target.qualified_name() == other.qualified_name());
    }
    if target.is_object_type() {
        return Ok(true);
    }
    let mut ancestry = Vec::new();
    assignable_checked(target.qualified_name(), other, &mut ancestry)
}

fn assignable_checked(
    target: &str,
    other: &ClassNode,
    ancestry: &mut Vec<ClassNode>,
) -> Result<bool, ModelError> {
    if other.qualified_name() == target {
        return Ok(true);
    }
    if ancestry.contains(other) {
        return Err(ModelError::CyclicHierarchy {
            class: other.qualified_name().to_owned(),
        });
    }

    ancestry.push(other.clone());
    let result = (|| {
        for interface in other.interfaces() {
            if assignable_checked(target, &interface, ancestry)? {
                return Ok(true);
            }
        }
        match other.superclass() {
            Some(superclass) => assignable_checked(target, &superclass, ancestry),
            None => Ok(false),
        }
    })();
    ancestry.pop();
    result
}
