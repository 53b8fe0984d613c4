use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use keystone_config::ModelSettings;
use keystone_model::{ClassInfo, ClassLoader, ClassLookup, ClassNode, EditableClass};

const THREADS: usize = 8;

#[test]
fn concurrent_first_resolutions_agree() {
    let loader = ClassLoader::new(ModelSettings::default()).unwrap();
    let base = loader.define_class("c", "Base", []).unwrap();
    let class = loader.define_class("c", "Leaf", []).unwrap();
    class.set_superclass_unqualified("Base").unwrap();
    let reference = class.superclass_ref().unwrap();

    let resolved: Vec<ClassNode> = thread::scope(|scope| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| scope.spawn(|| reference.resolve()))
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect()
    });

    assert!(resolved.iter().all(|node| node.ptr_eq(&base)));
}

#[test]
fn concurrent_misses_load_each_name_once() {
    let loads = Arc::new(AtomicUsize::new(0));
    let loader = ClassLoader::builder()
        .source({
            let loads = loads.clone();
            move |loader: &ClassLoader, name: &str| {
                loads.fetch_add(1, Ordering::SeqCst);
                let (package, simple) = name.rsplit_once('.')?;
                // Widen the window in which other threads pile up behind this load.
                thread::sleep(std::time::Duration::from_millis(5));
                loader.define_class(package, simple, []).ok()
            }
        })
        .build()
        .unwrap();

    let found: Vec<ClassNode> = thread::scope(|scope| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| scope.spawn(|| loader.lookup("lazy.Thing").unwrap()))
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect()
    });

    assert_eq!(loads.load(Ordering::SeqCst), 1);
    assert!(found.windows(2).all(|pair| pair[0] == pair[1]));
    assert_eq!(found[0].qualified_name(), "lazy.Thing");
}

#[test]
fn readers_share_a_populated_model() {
    let loader = ClassLoader::new(ModelSettings::default()).unwrap();
    let root = loader.define_class("c", "Root", []).unwrap();
    let mut previous = root.clone();
    for depth in 0..16 {
        let next = loader.define_class("c", &format!("Level{depth}"), []).unwrap();
        next.set_superclass_class(Some(&previous)).unwrap();
        next.add_new_field().unwrap();
        previous = next;
    }
    let deepest = previous;

    thread::scope(|scope| {
        for _ in 0..THREADS {
            scope.spawn(|| {
                assert!(root.is_assignable_from(&deepest));
                assert_eq!(deepest.fields().len(), 16);
            });
        }
    });
}
