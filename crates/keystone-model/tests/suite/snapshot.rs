use std::sync::Arc;

use keystone_config::ModelSettings;
use keystone_model::{
    flatten, ClassInfo, ClassLoader, ClassLookup, ClassNode, EditableClass, EditableField,
    EditableMethod, ImportSpec, Member, MemberKind, MethodInfo, ModelSnapshot, Modifiers,
};
use pretty_assertions::assert_eq;

/// `zoo.Animal <- zoo.Dog`, `Dog implements pets.Pet`, plus a few members and imports.
fn build_zoo() -> Arc<ClassLoader> {
    let loader = ClassLoader::new(ModelSettings::default()).unwrap();

    let pet = loader.define_class("pets", "Pet", []).unwrap();
    pet.set_is_interface(true).unwrap();
    pet.set_modifiers(Modifiers::PUBLIC | Modifiers::ABSTRACT).unwrap();
    pet.add_new_method().unwrap().set_name("name").unwrap();

    let animal = loader.define_class("zoo", "Animal", []).unwrap();
    animal.add_new_field().unwrap().set_name("legs").unwrap();

    let dog = loader
        .define_class("zoo", "Dog", ImportSpec::parse_all(["pets.*"]).unwrap())
        .unwrap();
    dog.set_superclass_class(Some(&animal)).unwrap();
    dog.add_interface_unqualified("Pet").unwrap();
    let tail = dog.add_new_field().unwrap();
    tail.set_name("tail").unwrap();
    tail.set_type("int").unwrap();
    let bark = dog.add_new_method().unwrap();
    bark.set_name("bark").unwrap();
    bark.set_return_type_unqualified("String").unwrap();
    bark.add_parameter_unqualified("target", "Animal").unwrap();
    dog.add_new_constructor().unwrap();

    loader
}

fn class(loader: &ClassLoader, name: &str) -> ClassNode {
    loader.lookup(name).unwrap()
}

fn flattened(node: &ClassNode, kind: MemberKind) -> Vec<String> {
    flatten(node, kind).iter().map(Member::qualified_name).collect()
}

#[test]
fn round_trip_preserves_queries() {
    let original = build_zoo();
    let json = original.snapshot().to_json().unwrap();
    let snapshot = ModelSnapshot::from_json(&json).unwrap();
    let restored = ClassLoader::from_snapshot(ModelSettings::default(), &snapshot).unwrap();

    let names = ["pets.Pet", "zoo.Animal", "zoo.Dog"];
    for target in names {
        for other in names {
            assert_eq!(
                class(&restored, target).is_assignable_from(&class(&restored, other)),
                class(&original, target).is_assignable_from(&class(&original, other)),
                "{target} <- {other}"
            );
        }
    }
    for name in names {
        for kind in [MemberKind::Field, MemberKind::Method] {
            assert_eq!(
                flattened(&class(&restored, name), kind),
                flattened(&class(&original, name), kind)
            );
        }
    }

    let dog = class(&restored, "zoo.Dog");
    let bark = dog.declared_methods()[0].clone();
    // Nothing defines `String`, so both models fall back to the same placeholder name.
    assert!(bark.return_type().is_unresolved());
    assert_eq!(bark.return_type().qualified_name(), "String");
    assert_eq!(bark.parameter_types()[0], class(&restored, "zoo.Animal"));
    assert_eq!(dog.declared_constructors().len(), 1);
    assert!(class(&restored, "pets.Pet").is_abstract());
}

#[test]
fn snapshots_are_stable_across_a_round_trip() {
    let original = build_zoo();
    let first = original.snapshot();
    let restored = ClassLoader::from_snapshot(ModelSettings::default(), &first).unwrap();
    assert_eq!(restored.snapshot(), first);
}

#[test]
fn unresolved_classes_survive_restoration() {
    let loader = ClassLoader::new(ModelSettings::default()).unwrap();
    let stub = loader.define_class("gen", "Stub", []).unwrap();
    stub.set_superclass("gen.Base").unwrap();
    stub.set_is_unresolved(true).unwrap();

    let restored = ClassLoader::from_snapshot(ModelSettings::default(), &loader.snapshot()).unwrap();
    let stub = class(&restored, "gen.Stub");
    assert!(stub.is_unresolved());
    assert_eq!(stub.superclass(), None);
}
