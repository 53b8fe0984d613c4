use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use keystone_config::ModelSettings;
use keystone_model::{
    ClassInfo, ClassLoader, ClassLookup, ClassNode, ClassSource, EditableClass, ImportSpec,
};
use pretty_assertions::assert_eq;

/// Pretends to parse `package.Name extends Super` declarations on demand.
#[derive(Default)]
struct DeclarationSource {
    loads: AtomicUsize,
}

impl DeclarationSource {
    /// Superclass (as written) and imports of each known declaration.
    fn declaration(name: &str) -> Option<(&'static str, &'static [&'static str])> {
        match name {
            "lib.Base" | "other.Helper" => Some(("", &[])),
            "lib.Derived" => Some(("Base", &["other.*"])),
            _ => None,
        }
    }
}

impl ClassSource for DeclarationSource {
    fn load(&self, loader: &ClassLoader, qualified_name: &str) -> Option<ClassNode> {
        let (superclass, imports) = Self::declaration(qualified_name)?;
        self.loads.fetch_add(1, Ordering::SeqCst);

        let (package, simple) = qualified_name.rsplit_once('.')?;
        let imports = ImportSpec::parse_all(imports.iter()).ok()?;
        let class = loader.define_class(package, simple, imports).ok()?;
        if !superclass.is_empty() {
            // Recorded only; resolved later by whoever asks.
            class.set_superclass_unqualified(superclass).ok()?;
        }
        Some(class)
    }
}

#[test]
fn sources_materialize_classes_on_first_lookup() {
    let source = Arc::new(DeclarationSource::default());
    let loader = ClassLoader::builder()
        .source({
            let source = source.clone();
            move |loader: &ClassLoader, name: &str| source.load(loader, name)
        })
        .build()
        .unwrap();

    assert!(loader.classes().is_empty());
    let derived = loader.lookup("lib.Derived").unwrap();
    assert_eq!(source.loads.load(Ordering::SeqCst), 1);

    // Resolving the superclass pulls the next declaration in.
    let base = derived.superclass().unwrap();
    assert_eq!(base.qualified_name(), "lib.Base");
    assert!(!base.is_unresolved());
    assert_eq!(source.loads.load(Ordering::SeqCst), 2);

    let names: Vec<String> = loader
        .classes()
        .iter()
        .map(|class| class.qualified_name().to_string())
        .collect();
    assert_eq!(names, vec!["lib.Base", "lib.Derived"]);

    assert_eq!(loader.lookup("lib.Derived"), Some(derived));
    assert_eq!(source.loads.load(Ordering::SeqCst), 2);
}

#[test]
fn sources_are_consulted_in_order() {
    let first = |loader: &ClassLoader, name: &str| {
        if name != "a.Shared" {
            return None;
        }
        loader.define_class("a", "Shared", []).ok()
    };
    let second = |loader: &ClassLoader, name: &str| {
        let (package, simple) = name.rsplit_once('.')?;
        let class = loader.define_class(package, simple, []).ok()?;
        class.set_is_interface(true).ok()?;
        Some(class)
    };
    let loader = ClassLoader::builder().source(first).source(second).build().unwrap();

    assert!(!loader.lookup("a.Shared").unwrap().is_interface());
    assert!(loader.lookup("b.Other").unwrap().is_interface());
}

#[test]
fn wildcard_imports_reach_source_backed_classes() {
    let loader = ClassLoader::builder()
        .source(DeclarationSource::default())
        .build()
        .unwrap();
    let user = loader
        .define_class("app", "Main", ImportSpec::parse_all(["other.*"]).unwrap())
        .unwrap();
    user.add_interface_unqualified("Helper").unwrap();

    let helper = user.interfaces().remove(0);
    assert_eq!(helper.qualified_name(), "other.Helper");
    assert!(!helper.is_unresolved());
}

#[test]
fn custom_default_packages_drive_bare_name_fallback() {
    let settings = ModelSettings {
        root_class: "base.Root".to_string(),
        default_packages: vec!["base".to_string(), "extra".to_string()],
        ..ModelSettings::default()
    };
    let loader = ClassLoader::new(settings).unwrap();
    let helper = loader.define_class("extra", "Helper", []).unwrap();
    let user = loader.define_class("app", "User", []).unwrap();
    user.set_superclass_unqualified("Root").unwrap();
    user.add_interface_unqualified("Helper").unwrap();

    let root = user.superclass().unwrap();
    assert!(root.is_object_type());
    assert!(root.is_builtin_type());
    assert_eq!(user.interfaces(), vec![helper]);
    assert!(loader.lookup("java.lang.Object").is_none());
}
