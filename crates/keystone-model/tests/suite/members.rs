use keystone_config::ModelSettings;
use keystone_model::{
    ClassInfo, ClassLoader, ConstructorInfo, EditableClass, EditableConstructor, EditableField,
    EditableMethod, FieldInfo, ImportSpec, MethodInfo, ModelError, Modifiers,
};
use pretty_assertions::assert_eq;

#[test]
fn default_names_stay_distinct_across_removals() {
    let loader = ClassLoader::new(ModelSettings::default()).unwrap();
    let class = loader.define_class("m", "Holder", []).unwrap();

    let first = class.add_new_field().unwrap();
    let second = class.add_new_field().unwrap();
    class.remove_field(&first).unwrap();
    let third = class.add_new_field().unwrap();

    let names: Vec<String> = class.declared_fields().iter().map(FieldInfo::name).collect();
    assert_eq!(names, vec!["unnamed_1", "unnamed_2"]);
    assert_eq!(second.name(), "unnamed_1");
    assert_eq!(third.name(), "unnamed_2");
}

#[test]
fn fields_and_methods_count_independently() {
    let loader = ClassLoader::new(ModelSettings::default()).unwrap();
    let class = loader.define_class("m", "Holder", []).unwrap();

    class.add_new_field().unwrap();
    let method = class.add_new_method().unwrap();
    let method_b = class.add_new_method().unwrap();
    class.remove_method(&method).unwrap();

    assert_eq!(method.name(), "unnamed_0");
    assert_eq!(method_b.name(), "unnamed_1");
    assert_eq!(class.declared_methods(), vec![method_b]);
}

#[test]
fn configured_prefix_and_types_apply_to_new_members() {
    let settings = ModelSettings {
        default_member_prefix: "member".to_string(),
        default_field_type: "int".to_string(),
        ..ModelSettings::default()
    };
    let loader = ClassLoader::new(settings).unwrap();
    let class = loader.define_class("m", "Holder", []).unwrap();

    let field = class.add_new_field().unwrap();
    assert_eq!(field.name(), "member0");
    assert!(field.field_type().is_primitive_type());
}

#[test]
fn member_edits_validate_names_and_types() {
    let loader = ClassLoader::new(ModelSettings::default()).unwrap();
    let class = loader.define_class("m", "Holder", []).unwrap();
    let field = class.add_new_field().unwrap();

    assert!(matches!(
        field.set_name(""),
        Err(ModelError::InvalidName { .. })
    ));
    assert!(field.set_type("a..B").is_err());
    assert_eq!(field.type_ref().name(), "java.lang.Object");

    field.set_type_unqualified("Holder").unwrap();
    assert_eq!(field.field_type(), class);
}

#[test]
fn constructors_carry_parameters_and_modifiers() {
    let loader = ClassLoader::new(ModelSettings::default()).unwrap();
    let class = loader.define_class("m", "Point", []).unwrap();
    let constructor = class.add_new_constructor().unwrap();
    constructor.set_modifiers(Modifiers::PUBLIC);
    constructor.add_parameter("x", "int").unwrap();
    constructor.add_parameter_unqualified("origin", "Point").unwrap();

    assert_eq!(constructor.name(), "Point");
    assert!(constructor.modifiers().is_public());
    let types: Vec<String> = constructor
        .parameter_types()
        .iter()
        .map(|ty| ty.qualified_name().to_string())
        .collect();
    assert_eq!(types, vec!["int", "m.Point"]);

    class.remove_constructor(&constructor).unwrap();
    assert!(class.declared_constructors().is_empty());
}

#[test]
fn method_signatures_resolve_through_imports() {
    let loader = ClassLoader::new(ModelSettings::default()).unwrap();
    let list = loader.define_class("util", "List", []).unwrap();
    let class = loader
        .define_class("m", "Service", ImportSpec::parse_all(["util.*"]).unwrap())
        .unwrap();
    let method = class.add_new_method().unwrap();
    method.set_name("items").unwrap();
    method.set_return_type_unqualified("List").unwrap();
    method.add_parameter_unqualified("limit", "int").unwrap();

    assert_eq!(method.return_type(), list);
    assert_eq!(method.qualified_name(), "m.Service.items");
    assert!(method.parameter_types()[0].is_primitive_type());
}

#[test]
fn loaders_refuse_settings_that_mint_malformed_names() {
    let digit_prefix = ModelSettings {
        default_member_prefix: "9".to_string(),
        ..ModelSettings::default()
    };
    assert!(matches!(
        ClassLoader::new(digit_prefix),
        Err(ModelError::IllegalArgument(_))
    ));

    let bad_field_type = ModelSettings {
        default_field_type: "a..B".to_string(),
        ..ModelSettings::default()
    };
    assert!(ClassLoader::builder()
        .settings(bad_field_type)
        .build()
        .is_err());

    let bad_root = ModelSettings {
        root_class: "".to_string(),
        ..ModelSettings::default()
    };
    assert!(ClassLoader::new(bad_root).is_err());
}

#[test]
fn members_from_configured_defaults_survive_a_snapshot() {
    let settings = ModelSettings {
        default_member_prefix: "slot".to_string(),
        ..ModelSettings::default()
    };
    let loader = ClassLoader::new(settings.clone()).unwrap();
    let class = loader.define_class("m", "Holder", []).unwrap();
    class.add_new_field().unwrap();
    let method = class.add_new_method().unwrap();
    let parameter = method.add_new_parameter();
    assert_eq!(parameter.name(), "slot0");

    let restored = ClassLoader::from_snapshot(settings, &loader.snapshot()).unwrap();
    assert_eq!(restored.snapshot(), loader.snapshot());
}
