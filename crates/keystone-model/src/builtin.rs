use std::collections::HashMap;
use std::sync::{Arc, Weak};

use keystone_config::ModelSettings;
use keystone_core::{package_of, simple_name_of};

use crate::class::TypeKind;
use crate::{ClassLookup, ClassNode};

pub const PRIMITIVE_TYPES: [&str; 8] = [
    "boolean", "byte", "char", "short", "int", "long", "float", "double",
];

pub const VOID_TYPE: &str = "void";

/// Classes every loader knows without asking a source: the primitives, `void` and the root class.
pub(crate) fn builtin_classes(
    lookup: &Weak<dyn ClassLookup>,
    settings: &Arc<ModelSettings>,
) -> HashMap<String, ClassNode> {
    let mut out = HashMap::with_capacity(PRIMITIVE_TYPES.len() + 2);
    let mut insert = |package: &str, simple: &str, kind: TypeKind| {
        let node = ClassNode::with_kind(package, simple, kind, lookup.clone(), settings.clone());
        out.insert(node.to_string(), node);
    };

    for name in PRIMITIVE_TYPES {
        insert("", name, TypeKind::Primitive);
    }
    insert("", VOID_TYPE, TypeKind::Void);

    let root = settings.root_class.as_str();
    insert(package_of(root), simple_name_of(root), TypeKind::Builtin);

    out
}
