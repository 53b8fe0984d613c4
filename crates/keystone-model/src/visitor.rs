//! Structural traversal over a class and its declared members.
//!
//! [`ElementVisitor`] only sees the query surface; [`EditableElementVisitor`] also receives the
//! mutation surface. Both are driven by `accept`/`accept_and_walk` on the class, which visit the
//! class and then (when walking) its fields, constructors and methods in declaration order.

use crate::{
    ClassInfo, ConstructorInfo, EditableClass, EditableConstructor, EditableField, EditableMethod,
    FieldInfo, MethodInfo,
};

pub trait ElementVisitor {
    fn visit_class(&mut self, _class: &dyn ClassInfo) {}
    fn visit_field(&mut self, _field: &dyn FieldInfo) {}
    fn visit_constructor(&mut self, _constructor: &dyn ConstructorInfo) {}
    fn visit_method(&mut self, _method: &dyn MethodInfo) {}
}

pub trait EditableElementVisitor {
    fn visit_class(&mut self, _class: &dyn EditableClass) {}
    fn visit_field(&mut self, _field: &dyn EditableField) {}
    fn visit_constructor(&mut self, _constructor: &dyn EditableConstructor) {}
    fn visit_method(&mut self, _method: &dyn EditableMethod) {}
}
