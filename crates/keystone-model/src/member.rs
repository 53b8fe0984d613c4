//! Fields, methods and constructors owned by a [`ClassNode`].
//!
//! Member handles are shared and compare by identity: two handles are equal only when they point
//! at the same member, regardless of name.

use std::fmt;
use std::sync::{Arc, Weak};

use keystone_config::ModelSettings;
use keystone_core::{qualify, validate_class_name, validate_identifier, ModelError};
use parking_lot::RwLock;

use crate::class::{ClassInner, ClassNode};
use crate::{ClassInfo, ClassReference, Modifiers};

struct MemberInner<S> {
    declaring: Weak<ClassInner>,
    settings: Arc<ModelSettings>,
    state: RwLock<S>,
}

impl<S> MemberInner<S> {
    fn new(declaring: &ClassNode, state: S) -> Arc<Self> {
        Arc::new(Self {
            declaring: declaring.downgrade(),
            settings: declaring.shared_settings(),
            state: RwLock::new(state),
        })
    }

    fn declaring_class(&self) -> Option<ClassNode> {
        ClassNode::upgrade(&self.declaring)
    }

    fn qualify(&self, name: &str) -> String {
        match self.declaring_class() {
            Some(class) => qualify(class.qualified_name(), name),
            None => name.to_owned(),
        }
    }

    fn type_reference(&self, name: &str, kind: TypeNameKind) -> Result<ClassReference, ModelError> {
        validate_class_name(name)?;
        let context = self.declaring.clone();
        Ok(match kind {
            TypeNameKind::Qualified => ClassReference::qualified_in(name.to_owned(), context),
            TypeNameKind::Unqualified => ClassReference::unqualified_in(name.to_owned(), context),
        })
    }
}

#[derive(Clone, Copy)]
enum TypeNameKind {
    Qualified,
    Unqualified,
}

/// A named, typed parameter of a method or constructor.
#[derive(Clone, Debug)]
pub struct Parameter {
    name: String,
    ty: ClassReference,
}

impl Parameter {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_ref(&self) -> &ClassReference {
        &self.ty
    }

    pub fn parameter_type(&self) -> ClassNode {
        self.ty.resolve()
    }
}

#[derive(Default)]
struct Parameters {
    list: Vec<Parameter>,
    next: u32,
}

impl Parameters {
    fn push(&mut self, name: &str, ty: ClassReference) -> Result<(), ModelError> {
        validate_identifier(name)?;
        self.list.push(Parameter {
            name: name.to_owned(),
            ty,
        });
        self.next += 1;
        Ok(())
    }

    fn push_default<S>(&mut self, inner: &MemberInner<S>) -> Parameter {
        let parameter = Parameter {
            name: format!("{}{}", inner.settings.default_member_prefix, self.next),
            ty: ClassReference::qualified_in(
                inner.settings.default_field_type.clone(),
                inner.declaring.clone(),
            ),
        };
        self.next += 1;
        self.list.push(parameter.clone());
        parameter
    }

    fn remove(&mut self, index: usize) -> Result<Parameter, ModelError> {
        if index >= self.list.len() {
            return Err(ModelError::illegal_argument(format!(
                "parameter index {index} out of range (len {})",
                self.list.len()
            )));
        }
        Ok(self.list.remove(index))
    }
}

struct FieldState {
    name: String,
    modifiers: Modifiers,
    ty: ClassReference,
}

#[derive(Clone)]
pub struct Field(Arc<MemberInner<FieldState>>);

pub trait FieldInfo {
    fn name(&self) -> String;
    /// `DeclaringClass.name`
    fn qualified_name(&self) -> String;
    fn modifiers(&self) -> Modifiers;
    fn declaring_class(&self) -> Option<ClassNode>;
    fn type_ref(&self) -> ClassReference;

    fn field_type(&self) -> ClassNode {
        self.type_ref().resolve()
    }
}

pub trait EditableField: FieldInfo {
    fn set_name(&self, name: &str) -> Result<(), ModelError>;
    fn set_modifiers(&self, modifiers: Modifiers);
    fn set_type(&self, qualified_name: &str) -> Result<(), ModelError>;
    fn set_type_unqualified(&self, name: &str) -> Result<(), ModelError>;
    fn set_type_class(&self, class: &ClassNode);
}

impl Field {
    pub(crate) fn new(declaring: &ClassNode, name: String, type_name: &str) -> Self {
        let ty = ClassReference::qualified_in(type_name.to_owned(), declaring.downgrade());
        Self(MemberInner::new(
            declaring,
            FieldState {
                name,
                modifiers: Modifiers::NONE,
                ty,
            },
        ))
    }
}

impl FieldInfo for Field {
    fn name(&self) -> String {
        self.0.state.read().name.clone()
    }

    fn qualified_name(&self) -> String {
        self.0.qualify(&self.name())
    }

    fn modifiers(&self) -> Modifiers {
        self.0.state.read().modifiers
    }

    fn declaring_class(&self) -> Option<ClassNode> {
        self.0.declaring_class()
    }

    fn type_ref(&self) -> ClassReference {
        self.0.state.read().ty.clone()
    }
}

impl EditableField for Field {
    fn set_name(&self, name: &str) -> Result<(), ModelError> {
        validate_identifier(name)?;
        self.0.state.write().name = name.to_owned();
        Ok(())
    }

    fn set_modifiers(&self, modifiers: Modifiers) {
        self.0.state.write().modifiers = modifiers;
    }

    fn set_type(&self, qualified_name: &str) -> Result<(), ModelError> {
        let ty = self.0.type_reference(qualified_name, TypeNameKind::Qualified)?;
        self.0.state.write().ty = ty;
        Ok(())
    }

    fn set_type_unqualified(&self, name: &str) -> Result<(), ModelError> {
        let ty = self.0.type_reference(name, TypeNameKind::Unqualified)?;
        self.0.state.write().ty = ty;
        Ok(())
    }

    fn set_type_class(&self, class: &ClassNode) {
        self.0.state.write().ty = ClassReference::direct(class);
    }
}

struct MethodState {
    name: String,
    modifiers: Modifiers,
    return_type: ClassReference,
    parameters: Parameters,
}

#[derive(Clone)]
pub struct Method(Arc<MemberInner<MethodState>>);

pub trait MethodInfo {
    fn name(&self) -> String;
    fn qualified_name(&self) -> String;
    fn modifiers(&self) -> Modifiers;
    fn declaring_class(&self) -> Option<ClassNode>;
    fn return_type_ref(&self) -> ClassReference;
    fn parameters(&self) -> Vec<Parameter>;

    fn return_type(&self) -> ClassNode {
        self.return_type_ref().resolve()
    }

    fn parameter_types(&self) -> Vec<ClassNode> {
        self.parameters()
            .iter()
            .map(Parameter::parameter_type)
            .collect()
    }
}

pub trait EditableMethod: MethodInfo {
    fn set_name(&self, name: &str) -> Result<(), ModelError>;
    fn set_modifiers(&self, modifiers: Modifiers);
    fn set_return_type(&self, qualified_name: &str) -> Result<(), ModelError>;
    fn set_return_type_unqualified(&self, name: &str) -> Result<(), ModelError>;
    fn add_parameter(&self, name: &str, qualified_type: &str) -> Result<(), ModelError>;
    fn add_parameter_unqualified(&self, name: &str, type_name: &str) -> Result<(), ModelError>;
    /// Append a default-named parameter of the default field type.
    fn add_new_parameter(&self) -> Parameter;
    fn remove_parameter(&self, index: usize) -> Result<Parameter, ModelError>;
}

impl Method {
    pub(crate) fn new(declaring: &ClassNode, name: String, return_type: &str) -> Self {
        let return_type =
            ClassReference::qualified_in(return_type.to_owned(), declaring.downgrade());
        Self(MemberInner::new(
            declaring,
            MethodState {
                name,
                modifiers: Modifiers::NONE,
                return_type,
                parameters: Parameters::default(),
            },
        ))
    }
}

impl MethodInfo for Method {
    fn name(&self) -> String {
        self.0.state.read().name.clone()
    }

    fn qualified_name(&self) -> String {
        self.0.qualify(&self.name())
    }

    fn modifiers(&self) -> Modifiers {
        self.0.state.read().modifiers
    }

    fn declaring_class(&self) -> Option<ClassNode> {
        self.0.declaring_class()
    }

    fn return_type_ref(&self) -> ClassReference {
        self.0.state.read().return_type.clone()
    }

    fn parameters(&self) -> Vec<Parameter> {
        self.0.state.read().parameters.list.clone()
    }
}

impl EditableMethod for Method {
    fn set_name(&self, name: &str) -> Result<(), ModelError> {
        validate_identifier(name)?;
        self.0.state.write().name = name.to_owned();
        Ok(())
    }

    fn set_modifiers(&self, modifiers: Modifiers) {
        self.0.state.write().modifiers = modifiers;
    }

    fn set_return_type(&self, qualified_name: &str) -> Result<(), ModelError> {
        let ty = self.0.type_reference(qualified_name, TypeNameKind::Qualified)?;
        self.0.state.write().return_type = ty;
        Ok(())
    }

    fn set_return_type_unqualified(&self, name: &str) -> Result<(), ModelError> {
        let ty = self.0.type_reference(name, TypeNameKind::Unqualified)?;
        self.0.state.write().return_type = ty;
        Ok(())
    }

    fn add_parameter(&self, name: &str, qualified_type: &str) -> Result<(), ModelError> {
        let ty = self.0.type_reference(qualified_type, TypeNameKind::Qualified)?;
        self.0.state.write().parameters.push(name, ty)
    }

    fn add_parameter_unqualified(&self, name: &str, type_name: &str) -> Result<(), ModelError> {
        let ty = self.0.type_reference(type_name, TypeNameKind::Unqualified)?;
        self.0.state.write().parameters.push(name, ty)
    }

    fn add_new_parameter(&self) -> Parameter {
        self.0.state.write().parameters.push_default(&self.0)
    }

    fn remove_parameter(&self, index: usize) -> Result<Parameter, ModelError> {
        self.0.state.write().parameters.remove(index)
    }
}

struct ConstructorState {
    modifiers: Modifiers,
    parameters: Parameters,
}

#[derive(Clone)]
pub struct Constructor(Arc<MemberInner<ConstructorState>>);

pub trait ConstructorInfo {
    /// Constructors are named after their declaring class.
    fn name(&self) -> String;
    fn qualified_name(&self) -> String;
    fn modifiers(&self) -> Modifiers;
    fn declaring_class(&self) -> Option<ClassNode>;
    fn parameters(&self) -> Vec<Parameter>;

    fn parameter_types(&self) -> Vec<ClassNode> {
        self.parameters()
            .iter()
            .map(Parameter::parameter_type)
            .collect()
    }
}

pub trait EditableConstructor: ConstructorInfo {
    fn set_modifiers(&self, modifiers: Modifiers);
    fn add_parameter(&self, name: &str, qualified_type: &str) -> Result<(), ModelError>;
    fn add_parameter_unqualified(&self, name: &str, type_name: &str) -> Result<(), ModelError>;
    fn add_new_parameter(&self) -> Parameter;
    fn remove_parameter(&self, index: usize) -> Result<Parameter, ModelError>;
}

impl Constructor {
    pub(crate) fn new(declaring: &ClassNode) -> Self {
        Self(MemberInner::new(
            declaring,
            ConstructorState {
                modifiers: Modifiers::NONE,
                parameters: Parameters::default(),
            },
        ))
    }
}

impl ConstructorInfo for Constructor {
    fn name(&self) -> String {
        self.0
            .declaring_class()
            .map(|class| class.simple_name().to_owned())
            .unwrap_or_default()
    }

    fn qualified_name(&self) -> String {
        self.0.qualify(&self.name())
    }

    fn modifiers(&self) -> Modifiers {
        self.0.state.read().modifiers
    }

    fn declaring_class(&self) -> Option<ClassNode> {
        self.0.declaring_class()
    }

    fn parameters(&self) -> Vec<Parameter> {
        self.0.state.read().parameters.list.clone()
    }
}

impl EditableConstructor for Constructor {
    fn set_modifiers(&self, modifiers: Modifiers) {
        self.0.state.write().modifiers = modifiers;
    }

    fn add_parameter(&self, name: &str, qualified_type: &str) -> Result<(), ModelError> {
        let ty = self.0.type_reference(qualified_type, TypeNameKind::Qualified)?;
        self.0.state.write().parameters.push(name, ty)
    }

    fn add_parameter_unqualified(&self, name: &str, type_name: &str) -> Result<(), ModelError> {
        let ty = self.0.type_reference(type_name, TypeNameKind::Unqualified)?;
        self.0.state.write().parameters.push(name, ty)
    }

    fn add_new_parameter(&self) -> Parameter {
        self.0.state.write().parameters.push_default(&self.0)
    }

    fn remove_parameter(&self, index: usize) -> Result<Parameter, ModelError> {
        self.0.state.write().parameters.remove(index)
    }
}

macro_rules! identity_eq {
    ($($ty:ident => $info:ident),* $(,)?) => {
        $(
            impl PartialEq for $ty {
                fn eq(&self, other: &Self) -> bool {
                    Arc::ptr_eq(&self.0, &other.0)
                }
            }

            impl Eq for $ty {}

            impl fmt::Debug for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.debug_tuple(stringify!($ty))
                        .field(&$info::qualified_name(self))
                        .finish()
                }
            }
        )*
    };
}

identity_eq!(
    Field => FieldInfo,
    Method => MethodInfo,
    Constructor => ConstructorInfo,
);

/// Which kind of inheritable member to flatten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
    Field,
    Method,
}

/// Any member of a class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Member {
    Field(Field),
    Method(Method),
    Constructor(Constructor),
}

impl Member {
    pub fn name(&self) -> String {
        match self {
            Member::Field(field) => field.name(),
            Member::Method(method) => method.name(),
            Member::Constructor(constructor) => constructor.name(),
        }
    }

    pub fn qualified_name(&self) -> String {
        match self {
            Member::Field(field) => field.qualified_name(),
            Member::Method(method) => method.qualified_name(),
            Member::Constructor(constructor) => constructor.qualified_name(),
        }
    }

    pub fn declaring_class(&self) -> Option<ClassNode> {
        match self {
            Member::Field(field) => field.declaring_class(),
            Member::Method(method) => method.declaring_class(),
            Member::Constructor(constructor) => constructor.declaring_class(),
        }
    }

    pub fn as_field(&self) -> Option<&Field> {
        match self {
            Member::Field(field) => Some(field),
            _ => None,
        }
    }

    pub fn as_method(&self) -> Option<&Method> {
        match self {
            Member::Method(method) => Some(method),
            _ => None,
        }
    }
}

impl From<Field> for Member {
    fn from(value: Field) -> Self {
        Member::Field(value)
    }
}

impl From<Method> for Member {
    fn from(value: Method) -> Self {
        Member::Method(value)
    }
}

impl From<Constructor> for Member {
    fn from(value: Constructor) -> Self {
        Member::Constructor(value)
    }
}
