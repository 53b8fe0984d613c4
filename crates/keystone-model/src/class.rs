use std::fmt;
use std::sync::{Arc, Weak};

use keystone_config::ModelSettings;
use keystone_core::{
    package_of, qualify, simple_name_of, validate_class_name, validate_identifier,
    validate_package_name, ModelError,
};
use parking_lot::{RwLock, RwLockWriteGuard};

use crate::class_ref::{ClassReference, ReferenceContext};
use crate::member::{Constructor, Field, Method};
use crate::visitor::{EditableElementVisitor, ElementVisitor};
use crate::{assignable, flatten, ClassLookup, ClassLoader, ImportSpec, Modifiers};

/// Broad category of a class node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    /// A class or interface populated by a producer (or an unresolved placeholder for one).
    Declared,
    /// The hierarchy root provided by the loader.
    Builtin,
    /// `int`, `boolean`, ...
    Primitive,
    Void,
}

/// Shared handle to a class or interface in the model.
///
/// Cloning is cheap; clones refer to the same node and compare equal.
#[derive(Clone)]
pub struct ClassNode(Arc<ClassInner>);

pub(crate) struct ClassInner {
    package: String,
    simple_name: String,
    qualified_name: String,
    kind: TypeKind,
    lookup: Weak<dyn ClassLookup>,
    settings: Arc<ModelSettings>,
    state: RwLock<ClassState>,
}

#[derive(Default)]
struct ClassState {
    modifiers: Modifiers,
    is_interface: bool,
    is_annotation_type: bool,
    is_unresolved: bool,
    superclass: Option<ClassReference>,
    interfaces: Vec<ClassReference>,
    imports: Vec<ImportSpec>,
    fields: Vec<Field>,
    methods: Vec<Method>,
    constructors: Vec<Constructor>,
    next_field: u32,
    next_method: u32,
}

impl ClassNode {
    /// Create a declared class attached to `lookup`.
    ///
    /// Most producers go through [`ClassLoader::define_class`], which also registers the node.
    pub fn new(
        package: &str,
        simple_name: &str,
        lookup: Weak<dyn ClassLookup>,
        settings: Arc<ModelSettings>,
    ) -> Result<Self, ModelError> {
        validate_package_name(package)?;
        validate_identifier(simple_name)?;
        crate::lookup::check_settings(&settings)?;
        Ok(Self::with_kind(
            package,
            simple_name,
            TypeKind::Declared,
            lookup,
            settings,
        ))
    }

    pub(crate) fn with_kind(
        package: &str,
        simple_name: &str,
        kind: TypeKind,
        lookup: Weak<dyn ClassLookup>,
        settings: Arc<ModelSettings>,
    ) -> Self {
        Self(Arc::new(ClassInner {
            package: package.to_owned(),
            simple_name: simple_name.to_owned(),
            qualified_name: qualify(package, simple_name),
            kind,
            lookup,
            settings,
            state: RwLock::new(ClassState::default()),
        }))
    }

    /// An `is_unresolved` stand-in for `name`, sharing this node's lookup and settings.
    pub(crate) fn placeholder(&self, name: &str) -> ClassNode {
        self.class_lookup()
            .and_then(|lookup| lookup.placeholder(name))
            .unwrap_or_else(|| {
                Self::unresolved(name, self.0.lookup.clone(), self.0.settings.clone())
            })
    }

    pub(crate) fn unresolved(
        name: &str,
        lookup: Weak<dyn ClassLookup>,
        settings: Arc<ModelSettings>,
    ) -> ClassNode {
        let node = Self::with_kind(
            package_of(name),
            simple_name_of(name),
            TypeKind::Declared,
            lookup,
            settings,
        );
        node.0.state.write().is_unresolved = true;
        node
    }

    /// Placeholder for a reference whose declaring class no longer exists.
    pub(crate) fn detached_placeholder(name: &str) -> ClassNode {
        let lookup: Weak<dyn ClassLookup> = Weak::<ClassLoader>::new();
        Self::unresolved(name, lookup, Arc::new(ModelSettings::default()))
    }

    pub(crate) fn downgrade(&self) -> Weak<ClassInner> {
        Arc::downgrade(&self.0)
    }

    pub(crate) fn upgrade(inner: &Weak<ClassInner>) -> Option<ClassNode> {
        inner.upgrade().map(ClassNode)
    }

    pub fn kind(&self) -> TypeKind {
        self.0.kind
    }

    pub fn settings(&self) -> &ModelSettings {
        &self.0.settings
    }

    pub(crate) fn shared_settings(&self) -> Arc<ModelSettings> {
        self.0.settings.clone()
    }

    pub fn ptr_eq(&self, other: &ClassNode) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    fn edit(&self) -> Result<RwLockWriteGuard<'_, ClassState>, ModelError> {
        if self.0.kind != TypeKind::Declared {
            return Err(ModelError::unsupported(format!(
                "builtin type `{}` cannot be modified",
                self.0.qualified_name
            )));
        }
        Ok(self.0.state.write())
    }

    fn default_member_name(&self, ordinal: u32) -> String {
        format!("{}{}", self.0.settings.default_member_prefix, ordinal)
    }
}

impl PartialEq for ClassNode {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for ClassNode {}

impl fmt::Debug for ClassNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassNode")
            .field("name", &self.0.qualified_name)
            .field("kind", &self.0.kind)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for ClassNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.qualified_name)
    }
}

impl ReferenceContext for ClassNode {
    fn package(&self) -> &str {
        &self.0.package
    }

    fn import_specs(&self) -> Vec<ImportSpec> {
        self.0.state.read().imports.clone()
    }

    fn class_lookup(&self) -> Option<Arc<dyn ClassLookup>> {
        self.0.lookup.upgrade()
    }
}

/// Read-only view of a class: identity, flags, supertypes and members.
pub trait ClassInfo {
    fn simple_name(&self) -> &str;
    fn package_name(&self) -> &str;
    /// `package.SimpleName`, or just the simple name in the default package.
    fn qualified_name(&self) -> &str;
    fn modifiers(&self) -> Modifiers;

    fn is_public(&self) -> bool {
        self.modifiers().is_public()
    }
    fn is_final(&self) -> bool {
        self.modifiers().is_final()
    }
    fn is_static(&self) -> bool {
        self.modifiers().is_static()
    }
    fn is_abstract(&self) -> bool {
        self.modifiers().is_abstract()
    }

    fn is_interface(&self) -> bool;
    fn is_annotation_type(&self) -> bool;
    /// Set on placeholders for names the lookup collaborator could not materialize.
    fn is_unresolved(&self) -> bool;
    fn is_primitive_type(&self) -> bool;
    fn is_void_type(&self) -> bool;
    fn is_builtin_type(&self) -> bool;
    /// Whether this is the configured hierarchy root (`java.lang.Object` by default).
    fn is_object_type(&self) -> bool;

    fn superclass_ref(&self) -> Option<ClassReference>;
    fn interface_refs(&self) -> Vec<ClassReference>;
    fn imports(&self) -> Vec<ImportSpec>;

    fn superclass(&self) -> Option<ClassNode>;
    /// Implemented (or, for interfaces, extended) interfaces in declaration order.
    fn interfaces(&self) -> Vec<ClassNode>;

    fn declared_fields(&self) -> Vec<Field>;
    fn declared_methods(&self) -> Vec<Method>;
    fn declared_constructors(&self) -> Vec<Constructor>;

    /// Declared plus inherited fields, see [`flatten`](crate::flatten()).
    fn fields(&self) -> Vec<Field>;
    /// Declared plus inherited methods, see [`flatten`](crate::flatten()).
    fn methods(&self) -> Vec<Method>;

    /// Whether a value of type `other` can be used where this type is expected.
    fn is_assignable_from(&self, other: &ClassNode) -> bool;

    /// Load `name` through this class's lookup collaborator.
    fn for_name(&self, name: &str) -> ClassNode;

    fn accept(&self, visitor: &mut dyn ElementVisitor);
    /// Visit this class, then its declared fields, constructors and methods, in that order.
    fn accept_and_walk(&self, visitor: &mut dyn ElementVisitor);
}

/// Mutation surface used by producers while populating the model.
pub trait EditableClass: ClassInfo {
    /// Class names are fixed at construction; always fails.
    fn set_simple_name(&self, name: &str) -> Result<(), ModelError>;

    fn set_superclass(&self, qualified_name: &str) -> Result<(), ModelError>;
    fn set_superclass_unqualified(&self, name: &str) -> Result<(), ModelError>;
    /// `None` clears the superclass.
    fn set_superclass_class(&self, class: Option<&ClassNode>) -> Result<(), ModelError>;
    fn clear_superclass(&self) -> Result<(), ModelError> {
        self.set_superclass_class(None)
    }

    fn add_interface(&self, qualified_name: &str) -> Result<(), ModelError>;
    fn add_interface_unqualified(&self, name: &str) -> Result<(), ModelError>;
    fn add_interface_class(&self, class: &ClassNode) -> Result<(), ModelError>;
    /// Remove every interface entry whose qualified name is `qualified_name`.
    fn remove_interface(&self, qualified_name: &str) -> Result<(), ModelError>;
    fn remove_interface_class(&self, class: &ClassNode) -> Result<(), ModelError> {
        self.remove_interface(class.qualified_name())
    }

    fn add_import(&self, import: ImportSpec) -> Result<(), ModelError>;

    fn add_new_field(&self) -> Result<Field, ModelError>;
    fn remove_field(&self, field: &Field) -> Result<(), ModelError>;
    fn add_new_method(&self) -> Result<Method, ModelError>;
    fn remove_method(&self, method: &Method) -> Result<(), ModelError>;
    fn add_new_constructor(&self) -> Result<Constructor, ModelError>;
    fn remove_constructor(&self, constructor: &Constructor) -> Result<(), ModelError>;

    fn set_is_interface(&self, value: bool) -> Result<(), ModelError>;
    fn set_is_annotation_type(&self, value: bool) -> Result<(), ModelError>;
    fn set_is_unresolved(&self, value: bool) -> Result<(), ModelError>;
    fn set_modifiers(&self, modifiers: Modifiers) -> Result<(), ModelError>;

    fn accept_editable(&self, visitor: &mut dyn EditableElementVisitor);
    fn accept_and_walk_editable(&self, visitor: &mut dyn EditableElementVisitor);
}

impl ClassInfo for ClassNode {
    fn simple_name(&self) -> &str {
        &self.0.simple_name
    }

    fn package_name(&self) -> &str {
        &self.0.package
    }

    fn qualified_name(&self) -> &str {
        &self.0.qualified_name
    }

    fn modifiers(&self) -> Modifiers {
        self.0.state.read().modifiers
    }

    fn is_interface(&self) -> bool {
        self.0.state.read().is_interface
    }

    fn is_annotation_type(&self) -> bool {
        self.0.state.read().is_annotation_type
    }

    fn is_unresolved(&self) -> bool {
        self.0.state.read().is_unresolved
    }

    fn is_primitive_type(&self) -> bool {
        self.0.kind == TypeKind::Primitive
    }

    fn is_void_type(&self) -> bool {
        self.0.kind == TypeKind::Void
    }

    fn is_builtin_type(&self) -> bool {
        self.0.kind != TypeKind::Declared
    }

    fn is_object_type(&self) -> bool {
        self.0.qualified_name == self.0.settings.root_class
    }

    fn superclass_ref(&self) -> Option<ClassReference> {
        let state = self.0.state.read();
        if state.is_unresolved {
            return None;
        }
        state.superclass.clone()
    }

    fn interface_refs(&self) -> Vec<ClassReference> {
        let state = self.0.state.read();
        if state.is_unresolved {
            return Vec::new();
        }
        state.interfaces.clone()
    }

    fn imports(&self) -> Vec<ImportSpec> {
        self.import_specs()
    }

    fn superclass(&self) -> Option<ClassNode> {
        // Resolve outside the lock: lookups may re-enter this node.
        self.superclass_ref().map(|reference| reference.resolve())
    }

    fn interfaces(&self) -> Vec<ClassNode> {
        self.interface_refs()
            .iter()
            .map(ClassReference::resolve)
            .collect()
    }

    fn declared_fields(&self) -> Vec<Field> {
        let state = self.0.state.read();
        if state.is_unresolved {
            return Vec::new();
        }
        state.fields.clone()
    }

    fn declared_methods(&self) -> Vec<Method> {
        let state = self.0.state.read();
        if state.is_unresolved {
            return Vec::new();
        }
        state.methods.clone()
    }

    fn declared_constructors(&self) -> Vec<Constructor> {
        let state = self.0.state.read();
        if state.is_unresolved {
            return Vec::new();
        }
        state.constructors.clone()
    }

    fn fields(&self) -> Vec<Field> {
        flatten::flatten_by(self, &|class: &ClassNode| class.declared_fields())
    }

    fn methods(&self) -> Vec<Method> {
        flatten::flatten_by(self, &|class: &ClassNode| class.declared_methods())
    }

    fn is_assignable_from(&self, other: &ClassNode) -> bool {
        assignable::is_assignable_from(self, other)
    }

    fn for_name(&self, name: &str) -> ClassNode {
        self.class_lookup()
            .and_then(|lookup| lookup.lookup(name))
            .unwrap_or_else(|| self.placeholder(name))
    }

    fn accept(&self, visitor: &mut dyn ElementVisitor) {
        visitor.visit_class(self);
    }

    fn accept_and_walk(&self, visitor: &mut dyn ElementVisitor) {
        self.accept(visitor);
        for field in self.declared_fields() {
            visitor.visit_field(&field);
        }
        for constructor in self.declared_constructors() {
            visitor.visit_constructor(&constructor);
        }
        for method in self.declared_methods() {
            visitor.visit_method(&method);
        }
    }
}

impl EditableClass for ClassNode {
    fn set_simple_name(&self, _name: &str) -> Result<(), ModelError> {
        Err(ModelError::unsupported(format!(
            "class names cannot be changed (`{}`)",
            self.0.qualified_name
        )))
    }

    fn set_superclass(&self, qualified_name: &str) -> Result<(), ModelError> {
        validate_class_name(qualified_name)?;
        let reference = ClassReference::qualified_in(qualified_name.to_owned(), self.downgrade());
        self.edit()?.superclass = Some(reference);
        Ok(())
    }

    fn set_superclass_unqualified(&self, name: &str) -> Result<(), ModelError> {
        validate_class_name(name)?;
        let reference = ClassReference::unqualified_in(name.to_owned(), self.downgrade());
        self.edit()?.superclass = Some(reference);
        Ok(())
    }

    fn set_superclass_class(&self, class: Option<&ClassNode>) -> Result<(), ModelError> {
        self.edit()?.superclass = class.map(ClassReference::direct);
        Ok(())
    }

    fn add_interface(&self, qualified_name: &str) -> Result<(), ModelError> {
        validate_class_name(qualified_name)?;
        let reference = ClassReference::qualified_in(qualified_name.to_owned(), self.downgrade());
        self.edit()?.interfaces.push(reference);
        Ok(())
    }

    fn add_interface_unqualified(&self, name: &str) -> Result<(), ModelError> {
        validate_class_name(name)?;
        let reference = ClassReference::unqualified_in(name.to_owned(), self.downgrade());
        self.edit()?.interfaces.push(reference);
        Ok(())
    }

    fn add_interface_class(&self, class: &ClassNode) -> Result<(), ModelError> {
        self.edit()?.interfaces.push(ClassReference::direct(class));
        Ok(())
    }

    fn remove_interface(&self, qualified_name: &str) -> Result<(), ModelError> {
        if qualified_name.is_empty() {
            return Err(ModelError::illegal_argument("empty interface name"));
        }
        // Matching an unqualified entry resolves it, so compute names before taking the lock.
        let current = self.0.state.read().interfaces.clone();
        let doomed: Vec<ClassReference> = current
            .into_iter()
            .filter(|reference| reference.qualified_name() == qualified_name)
            .collect();
        if doomed.is_empty() {
            return Ok(());
        }
        self.edit()?
            .interfaces
            .retain(|reference| !doomed.iter().any(|d| d.ptr_eq(reference)));
        Ok(())
    }

    fn add_import(&self, import: ImportSpec) -> Result<(), ModelError> {
        self.edit()?.imports.push(import);
        Ok(())
    }

    fn add_new_field(&self) -> Result<Field, ModelError> {
        let mut state = self.edit()?;
        let ordinal = state.next_field;
        state.next_field += 1;
        let field = Field::new(
            self,
            self.default_member_name(ordinal),
            &self.0.settings.default_field_type,
        );
        state.fields.push(field.clone());
        Ok(field)
    }

    fn remove_field(&self, field: &Field) -> Result<(), ModelError> {
        self.edit()?.fields.retain(|existing| existing != field);
        Ok(())
    }

    fn add_new_method(&self) -> Result<Method, ModelError> {
        let mut state = self.edit()?;
        let ordinal = state.next_method;
        state.next_method += 1;
        let method = Method::new(
            self,
            self.default_member_name(ordinal),
            &self.0.settings.default_return_type,
        );
        state.methods.push(method.clone());
        Ok(method)
    }

    fn remove_method(&self, method: &Method) -> Result<(), ModelError> {
        self.edit()?.methods.retain(|existing| existing != method);
        Ok(())
    }

    fn add_new_constructor(&self) -> Result<Constructor, ModelError> {
        let mut state = self.edit()?;
        let constructor = Constructor::new(self);
        state.constructors.push(constructor.clone());
        Ok(constructor)
    }

    fn remove_constructor(&self, constructor: &Constructor) -> Result<(), ModelError> {
        self.edit()?
            .constructors
            .retain(|existing| existing != constructor);
        Ok(())
    }

    fn set_is_interface(&self, value: bool) -> Result<(), ModelError> {
        self.edit()?.is_interface = value;
        Ok(())
    }

    fn set_is_annotation_type(&self, value: bool) -> Result<(), ModelError> {
        self.edit()?.is_annotation_type = value;
        Ok(())
    }

    fn set_is_unresolved(&self, value: bool) -> Result<(), ModelError> {
        self.edit()?.is_unresolved = value;
        Ok(())
    }

    fn set_modifiers(&self, modifiers: Modifiers) -> Result<(), ModelError> {
        self.edit()?.modifiers = modifiers;
        Ok(())
    }

    fn accept_editable(&self, visitor: &mut dyn EditableElementVisitor) {
        visitor.visit_class(self);
    }

    fn accept_and_walk_editable(&self, visitor: &mut dyn EditableElementVisitor) {
        // Members are captured up front so visitors may add or remove members while walking.
        let (fields, constructors, methods) = {
            let state = self.0.state.read();
            (
                state.fields.clone(),
                state.constructors.clone(),
                state.methods.clone(),
            )
        };
        self.accept_editable(visitor);
        for field in fields {
            visitor.visit_field(&field);
        }
        for constructor in constructors {
            visitor.visit_constructor(&constructor);
        }
        for method in methods {
            visitor.visit_method(&method);
        }
    }
}
