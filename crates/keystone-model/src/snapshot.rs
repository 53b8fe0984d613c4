//! Serializable picture of a loader's declared classes.
//!
//! References are recorded the way they were written: unqualified names stay unqualified so a
//! restored model resolves them against the same package and imports. Direct references are
//! recorded as qualified names.

use std::sync::Arc;

use keystone_config::ModelSettings;
use keystone_core::ModelError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    ClassInfo, ClassLoader, ClassNode, ClassReference, ConstructorInfo, EditableClass,
    EditableConstructor, EditableField, EditableMethod, FieldInfo, ImportSpec, MethodInfo,
    Modifiers, Parameter, RefKind,
};

pub const MODEL_SNAPSHOT_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error("unsupported snapshot schema version {found} (expected {expected})")]
    SchemaVersion { found: u32, expected: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "name")]
pub enum RefSnapshot {
    Qualified(String),
    Unqualified(String),
}

impl RefSnapshot {
    fn capture(reference: &ClassReference) -> Self {
        match reference.kind() {
            RefKind::Direct | RefKind::Qualified => Self::Qualified(reference.name().to_owned()),
            RefKind::Unqualified => Self::Unqualified(reference.name().to_owned()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterSnapshot {
    pub name: String,
    pub ty: RefSnapshot,
}

impl ParameterSnapshot {
    fn capture(parameter: &Parameter) -> Self {
        Self {
            name: parameter.name().to_owned(),
            ty: RefSnapshot::capture(parameter.type_ref()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSnapshot {
    pub name: String,
    #[serde(default)]
    pub modifiers: Modifiers,
    pub ty: RefSnapshot,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodSnapshot {
    pub name: String,
    #[serde(default)]
    pub modifiers: Modifiers,
    pub return_type: RefSnapshot,
    #[serde(default)]
    pub parameters: Vec<ParameterSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstructorSnapshot {
    #[serde(default)]
    pub modifiers: Modifiers,
    #[serde(default)]
    pub parameters: Vec<ParameterSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassSnapshot {
    pub package: String,
    pub simple_name: String,
    #[serde(default)]
    pub modifiers: Modifiers,
    #[serde(default)]
    pub is_interface: bool,
    #[serde(default)]
    pub is_annotation_type: bool,
    #[serde(default)]
    pub is_unresolved: bool,
    /// Import declarations in source form (`a.b.C`, `a.b.*`).
    #[serde(default)]
    pub imports: Vec<String>,
    #[serde(default)]
    pub superclass: Option<RefSnapshot>,
    #[serde(default)]
    pub interfaces: Vec<RefSnapshot>,
    #[serde(default)]
    pub fields: Vec<FieldSnapshot>,
    #[serde(default)]
    pub methods: Vec<MethodSnapshot>,
    #[serde(default)]
    pub constructors: Vec<ConstructorSnapshot>,
}

impl ClassSnapshot {
    fn capture(class: &ClassNode) -> Self {
        Self {
            package: class.package_name().to_owned(),
            simple_name: class.simple_name().to_owned(),
            modifiers: class.modifiers(),
            is_interface: class.is_interface(),
            is_annotation_type: class.is_annotation_type(),
            is_unresolved: class.is_unresolved(),
            imports: class.imports().iter().map(ToString::to_string).collect(),
            superclass: class.superclass_ref().as_ref().map(RefSnapshot::capture),
            interfaces: class
                .interface_refs()
                .iter()
                .map(RefSnapshot::capture)
                .collect(),
            fields: class
                .declared_fields()
                .iter()
                .map(|field| FieldSnapshot {
                    name: field.name(),
                    modifiers: field.modifiers(),
                    ty: RefSnapshot::capture(&field.type_ref()),
                })
                .collect(),
            methods: class
                .declared_methods()
                .iter()
                .map(|method| MethodSnapshot {
                    name: method.name(),
                    modifiers: method.modifiers(),
                    return_type: RefSnapshot::capture(&method.return_type_ref()),
                    parameters: method
                        .parameters()
                        .iter()
                        .map(ParameterSnapshot::capture)
                        .collect(),
                })
                .collect(),
            constructors: class
                .declared_constructors()
                .iter()
                .map(|constructor| ConstructorSnapshot {
                    modifiers: constructor.modifiers(),
                    parameters: constructor
                        .parameters()
                        .iter()
                        .map(ParameterSnapshot::capture)
                        .collect(),
                })
                .collect(),
        }
    }

    /// Replay this class's structure onto a freshly defined `class`.
    fn restore_into(&self, class: &ClassNode) -> Result<(), ModelError> {
        class.set_modifiers(self.modifiers)?;
        class.set_is_interface(self.is_interface)?;
        class.set_is_annotation_type(self.is_annotation_type)?;

        match &self.superclass {
            Some(RefSnapshot::Qualified(name)) => class.set_superclass(name)?,
            Some(RefSnapshot::Unqualified(name)) => class.set_superclass_unqualified(name)?,
            None => {}
        }
        for interface in &self.interfaces {
            match interface {
                RefSnapshot::Qualified(name) => class.add_interface(name)?,
                RefSnapshot::Unqualified(name) => class.add_interface_unqualified(name)?,
            }
        }

        for snapshot in &self.fields {
            let field = class.add_new_field()?;
            field.set_name(&snapshot.name)?;
            field.set_modifiers(snapshot.modifiers);
            match &snapshot.ty {
                RefSnapshot::Qualified(name) => field.set_type(name)?,
                RefSnapshot::Unqualified(name) => field.set_type_unqualified(name)?,
            }
        }

        for snapshot in &self.methods {
            let method = class.add_new_method()?;
            method.set_name(&snapshot.name)?;
            method.set_modifiers(snapshot.modifiers);
            match &snapshot.return_type {
                RefSnapshot::Qualified(name) => method.set_return_type(name)?,
                RefSnapshot::Unqualified(name) => method.set_return_type_unqualified(name)?,
            }
            for parameter in &snapshot.parameters {
                match &parameter.ty {
                    RefSnapshot::Qualified(ty) => method.add_parameter(&parameter.name, ty)?,
                    RefSnapshot::Unqualified(ty) => {
                        method.add_parameter_unqualified(&parameter.name, ty)?
                    }
                }
            }
        }

        for snapshot in &self.constructors {
            let constructor = class.add_new_constructor()?;
            constructor.set_modifiers(snapshot.modifiers);
            for parameter in &snapshot.parameters {
                match &parameter.ty {
                    RefSnapshot::Qualified(ty) => constructor.add_parameter(&parameter.name, ty)?,
                    RefSnapshot::Unqualified(ty) => {
                        constructor.add_parameter_unqualified(&parameter.name, ty)?
                    }
                }
            }
        }

        // Last: unresolved nodes hide their structure from queries.
        class.set_is_unresolved(self.is_unresolved)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSnapshot {
    pub schema_version: u32,
    pub classes: Vec<ClassSnapshot>,
}

impl ModelSnapshot {
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        let snapshot: Self = serde_json::from_str(json)?;
        if snapshot.schema_version != MODEL_SNAPSHOT_SCHEMA_VERSION {
            return Err(SnapshotError::SchemaVersion {
                found: snapshot.schema_version,
                expected: MODEL_SNAPSHOT_SCHEMA_VERSION,
            });
        }
        Ok(snapshot)
    }
}

impl ClassLoader {
    /// Capture every class defined so far, sorted by qualified name.
    pub fn snapshot(&self) -> ModelSnapshot {
        ModelSnapshot {
            schema_version: MODEL_SNAPSHOT_SCHEMA_VERSION,
            classes: self.classes().iter().map(ClassSnapshot::capture).collect(),
        }
    }

    /// Rebuild a model from `snapshot` through the public mutation API.
    ///
    /// Every class is defined before any structure is replayed, so references between restored
    /// classes resolve regardless of snapshot order.
    pub fn from_snapshot(
        settings: ModelSettings,
        snapshot: &ModelSnapshot,
    ) -> Result<Arc<ClassLoader>, SnapshotError> {
        let loader = ClassLoader::new(settings)?;

        let mut defined = Vec::with_capacity(snapshot.classes.len());
        for class in &snapshot.classes {
            let imports = ImportSpec::parse_all(&class.imports)?;
            defined.push(loader.define_class(&class.package, &class.simple_name, imports)?);
        }
        for (class, node) in snapshot.classes.iter().zip(&defined) {
            class.restore_into(node)?;
        }

        tracing::debug!(
            target: "keystone.loader",
            classes = defined.len(),
            "restored model from snapshot"
        );
        Ok(loader)
    }
}
