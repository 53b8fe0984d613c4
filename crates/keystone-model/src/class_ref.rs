use std::fmt;
use std::sync::{Arc, OnceLock, Weak};

use keystone_core::{qualify, simple_name_of};

use crate::class::{ClassInner, ClassNode};
use crate::{ClassInfo, ClassLookup, ImportSpec};

/// What an unqualified name needs from the class that wrote it.
pub trait ReferenceContext {
    /// Package of the declaring class (`""` for the default package).
    fn package(&self) -> &str;

    /// Import declarations in source order.
    fn import_specs(&self) -> Vec<ImportSpec>;

    /// The lookup collaborator, if it is still alive.
    fn class_lookup(&self) -> Option<Arc<dyn ClassLookup>>;
}

/// How a reference was written by the producer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RefKind {
    Direct,
    Qualified,
    Unqualified,
}

/// A possibly-unresolved pointer to a class.
///
/// Resolution happens on first use and is memoized for the lifetime of the reference (clones
/// share the memo). Concurrent first resolutions observe one result.
#[derive(Clone)]
pub struct ClassReference(Arc<RefInner>);

struct RefInner {
    target: RefTarget,
    resolved: OnceLock<ClassNode>,
}

enum RefTarget {
    Direct(ClassNode),
    Qualified {
        name: String,
        context: Weak<ClassInner>,
    },
    Unqualified {
        name: String,
        context: Weak<ClassInner>,
    },
}

impl ClassReference {
    fn from_target(target: RefTarget) -> Self {
        Self(Arc::new(RefInner {
            target,
            resolved: OnceLock::new(),
        }))
    }

    /// A reference to an already materialized class.
    pub fn direct(class: &ClassNode) -> Self {
        Self::from_target(RefTarget::Direct(class.clone()))
    }

    /// A fully qualified name, looked up verbatim through `context`'s lookup collaborator.
    pub fn qualified(name: impl Into<String>, context: &ClassNode) -> Self {
        Self::qualified_in(name.into(), context.downgrade())
    }

    /// A bare name, resolved against `context`'s package and imports.
    pub fn unqualified(name: impl Into<String>, context: &ClassNode) -> Self {
        Self::unqualified_in(name.into(), context.downgrade())
    }

    pub(crate) fn qualified_in(name: String, context: Weak<ClassInner>) -> Self {
        Self::from_target(RefTarget::Qualified { name, context })
    }

    pub(crate) fn unqualified_in(name: String, context: Weak<ClassInner>) -> Self {
        Self::from_target(RefTarget::Unqualified { name, context })
    }

    pub fn kind(&self) -> RefKind {
        match &self.0.target {
            RefTarget::Direct(_) => RefKind::Direct,
            RefTarget::Qualified { .. } => RefKind::Qualified,
            RefTarget::Unqualified { .. } => RefKind::Unqualified,
        }
    }

    /// The name as written by the producer. Never triggers resolution.
    pub fn name(&self) -> &str {
        match &self.0.target {
            RefTarget::Direct(class) => class.qualified_name(),
            RefTarget::Qualified { name, .. } | RefTarget::Unqualified { name, .. } => name,
        }
    }

    /// Qualified name of the target. Only unqualified references need to resolve for this.
    pub fn qualified_name(&self) -> String {
        match &self.0.target {
            RefTarget::Direct(class) => class.qualified_name().to_owned(),
            RefTarget::Qualified { name, .. } => name.clone(),
            RefTarget::Unqualified { .. } => self.resolve().qualified_name().to_owned(),
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self.0.target, RefTarget::Direct(_)) || self.0.resolved.get().is_some()
    }

    /// Resolve the reference, producing an unresolved placeholder when nothing matches.
    pub fn resolve(&self) -> ClassNode {
        match &self.0.target {
            RefTarget::Direct(class) => class.clone(),
            RefTarget::Qualified { name, context } => self
                .0
                .resolved
                .get_or_init(|| resolve_qualified_in(name, context))
                .clone(),
            RefTarget::Unqualified { name, context } => self
                .0
                .resolved
                .get_or_init(|| resolve_unqualified_in(name, context))
                .clone(),
        }
    }

    /// Whether both handles share one reference (and therefore one memo).
    pub fn ptr_eq(&self, other: &ClassReference) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for ClassReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassReference")
            .field("kind", &self.kind())
            .field("name", &self.name())
            .field("resolved", &self.is_resolved())
            .finish()
    }
}

fn resolve_qualified_in(name: &str, context: &Weak<ClassInner>) -> ClassNode {
    let Some(context) = ClassNode::upgrade(context) else {
        return ClassNode::detached_placeholder(name);
    };
    let found = context.class_lookup().and_then(|lookup| {
        tracing::trace!(target: "keystone.resolve", candidate = name, "probing qualified name");
        lookup.lookup(name)
    });
    found.unwrap_or_else(|| placeholder(name, &context))
}

fn resolve_unqualified_in(name: &str, context: &Weak<ClassInner>) -> ClassNode {
    let Some(context) = ClassNode::upgrade(context) else {
        return ClassNode::detached_placeholder(name);
    };
    resolve_unqualified(name, &context).unwrap_or_else(|| placeholder(name, &context))
}

fn placeholder(name: &str, context: &ClassNode) -> ClassNode {
    tracing::debug!(
        target: "keystone.resolve",
        name,
        from = context.qualified_name(),
        "class reference did not resolve; using placeholder"
    );
    context.placeholder(name)
}

/// Resolve a bare `name` the way source code sees it from `context`.
///
/// Probes, in order: the context's own package, single-type imports whose simple name is `name`,
/// on-demand imports in declaration order, and finally the lookup collaborator's default
/// resolution. The first hit wins.
pub fn resolve_unqualified(name: &str, context: &dyn ReferenceContext) -> Option<ClassNode> {
    let lookup = context.class_lookup()?;
    let probe = |candidate: &str| {
        tracing::trace!(target: "keystone.resolve", candidate, "probing");
        lookup.lookup(candidate)
    };

    if let Some(found) = probe(&qualify(context.package(), name)) {
        return Some(found);
    }

    let imports = context.import_specs();
    for import in &imports {
        if let ImportSpec::Single(path) = import {
            if simple_name_of(path) == name {
                if let Some(found) = probe(path) {
                    return Some(found);
                }
            }
        }
    }

    for import in &imports {
        if let ImportSpec::OnDemand(prefix) = import {
            if let Some(found) = probe(&qualify(prefix, name)) {
                return Some(found);
            }
        }
    }

    tracing::trace!(target: "keystone.resolve", name, "falling back to default resolution");
    lookup.lookup_default(name)
}
