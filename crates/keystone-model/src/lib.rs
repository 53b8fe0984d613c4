//! Mutable, lazily-resolved model of classes, interfaces and their members.
//!
//! Producers (parsers, bytecode readers, test fixtures) populate the model through
//! [`EditableClass`] and friends; consumers query it through [`ClassInfo`]. Class references are
//! recorded as written and resolved on first use through a [`ClassLookup`], with unresolvable
//! names standing in as `is_unresolved` placeholders instead of errors.
//!
//! ```
//! use keystone_config::ModelSettings;
//! use keystone_model::{ClassInfo, ClassLoader, EditableClass};
//!
//! let loader = ClassLoader::new(ModelSettings::default()).unwrap();
//! let animal = loader.define_class("zoo", "Animal", []).unwrap();
//! let dog = loader.define_class("zoo", "Dog", []).unwrap();
//! dog.set_superclass_unqualified("Animal").unwrap();
//!
//! assert!(animal.is_assignable_from(&dog));
//! assert!(!dog.is_assignable_from(&animal));
//! ```

mod assignable;
mod builtin;
mod class;
mod class_ref;
mod flatten;
mod import;
mod lookup;
mod member;
mod modifiers;
mod snapshot;
mod visitor;

pub use assignable::{is_assignable_from, try_is_assignable_from};
pub use builtin::{PRIMITIVE_TYPES, VOID_TYPE};
pub use class::{ClassInfo, ClassNode, EditableClass, TypeKind};
pub use class_ref::{resolve_unqualified, ClassReference, RefKind, ReferenceContext};
pub use flatten::{flatten, try_flatten};
pub use import::ImportSpec;
pub use lookup::{ClassLoader, ClassLoaderBuilder, ClassLookup, ClassSource};
pub use member::{
    Constructor, ConstructorInfo, EditableConstructor, EditableField, EditableMethod, Field,
    FieldInfo, Member, MemberKind, Method, MethodInfo, Parameter,
};
pub use modifiers::Modifiers;
pub use snapshot::{
    ClassSnapshot, ConstructorSnapshot, FieldSnapshot, MethodSnapshot, ModelSnapshot,
    ParameterSnapshot, RefSnapshot, SnapshotError, MODEL_SNAPSHOT_SCHEMA_VERSION,
};
pub use visitor::{EditableElementVisitor, ElementVisitor};

pub use keystone_core::{InvalidNameReason, ModelError};
