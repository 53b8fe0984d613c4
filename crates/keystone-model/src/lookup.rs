use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Weak};

use keystone_config::ModelSettings;
use keystone_core::{qualify, validate_identifier, validate_package_name, ModelError};
use parking_lot::{ReentrantMutex, RwLock};

use crate::builtin::builtin_classes;
use crate::{ClassInfo, ClassNode, EditableClass, ImportSpec};

/// Maps qualified names to classes.
///
/// Implementations must be idempotent: asking twice for the same name yields the same node (or
/// `None` both times). They may block, e.g. to parse a file on demand.
pub trait ClassLookup: Send + Sync {
    fn lookup(&self, qualified_name: &str) -> Option<ClassNode>;

    /// Last-resort resolution of a bare name (builtins, implicitly imported packages, ...).
    fn lookup_default(&self, name: &str) -> Option<ClassNode> {
        self.lookup(name)
    }

    /// Shared stand-in for a name nothing resolves; `None` leaves the caller to mint its own.
    fn placeholder(&self, _name: &str) -> Option<ClassNode> {
        None
    }
}

/// On-demand producer consulted by a [`ClassLoader`] on a cache miss.
///
/// A source typically parses or reads the requested type and populates it through
/// [`ClassLoader::define_class`]. Sources must not resolve class references while loading.
pub trait ClassSource: Send + Sync {
    fn load(&self, loader: &ClassLoader, qualified_name: &str) -> Option<ClassNode>;
}

impl<F> ClassSource for F
where
    F: Fn(&ClassLoader, &str) -> Option<ClassNode> + Send + Sync,
{
    fn load(&self, loader: &ClassLoader, qualified_name: &str) -> Option<ClassNode> {
        self(loader, qualified_name)
    }
}

/// Thread-safe registry of the classes of one model.
///
/// Holds the builtin types, every class defined by a producer, and an ordered chain of
/// [`ClassSource`]s used to materialize unknown names on demand. Classes keep only a weak handle
/// back to their loader, so the loader must outlive the queries made against its classes.
pub struct ClassLoader {
    this: Weak<ClassLoader>,
    settings: Arc<ModelSettings>,
    builtins: HashMap<String, ClassNode>,
    classes: RwLock<BTreeMap<String, ClassNode>>,
    sources: Vec<Box<dyn ClassSource>>,
    /// Names currently being loaded by a source on the lock-holding thread.
    loading: ReentrantMutex<RefCell<HashSet<String>>>,
    /// One unresolved stand-in per missing name, so repeated misses compare equal.
    placeholders: RwLock<HashMap<String, ClassNode>>,
}

#[derive(Default)]
pub struct ClassLoaderBuilder {
    settings: ModelSettings,
    sources: Vec<Box<dyn ClassSource>>,
}

impl ClassLoaderBuilder {
    #[must_use]
    pub fn settings(mut self, settings: ModelSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Append a source; sources are consulted in the order they were added.
    #[must_use]
    pub fn source(mut self, source: impl ClassSource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    /// Fails with [`ModelError::IllegalArgument`] when the settings would let the loader mint
    /// malformed names (a bad root class, default type or member prefix).
    pub fn build(self) -> Result<Arc<ClassLoader>, ModelError> {
        check_settings(&self.settings)?;
        let settings = Arc::new(self.settings);
        let sources = self.sources;
        Ok(Arc::new_cyclic(|this: &Weak<ClassLoader>| {
            let lookup: Weak<dyn ClassLookup> = this.clone();
            ClassLoader {
                this: this.clone(),
                builtins: builtin_classes(&lookup, &settings),
                settings,
                classes: RwLock::new(BTreeMap::new()),
                sources,
                loading: ReentrantMutex::new(RefCell::new(HashSet::new())),
                placeholders: RwLock::new(HashMap::new()),
            }
        }))
    }
}

pub(crate) fn check_settings(settings: &ModelSettings) -> Result<(), ModelError> {
    settings
        .validate()
        .map_err(|err| ModelError::illegal_argument(err.to_string()))
}

impl ClassLoader {
    pub fn new(settings: ModelSettings) -> Result<Arc<Self>, ModelError> {
        Self::builder().settings(settings).build()
    }

    pub fn builder() -> ClassLoaderBuilder {
        ClassLoaderBuilder::default()
    }

    pub fn settings(&self) -> &ModelSettings {
        &self.settings
    }

    /// Create and register a new declared class.
    ///
    /// Fails with [`ModelError::InvalidName`] on malformed names and with
    /// [`ModelError::IllegalArgument`] when the qualified name is already taken.
    pub fn define_class(
        &self,
        package: &str,
        simple_name: &str,
        imports: impl IntoIterator<Item = ImportSpec>,
    ) -> Result<ClassNode, ModelError> {
        validate_package_name(package)?;
        validate_identifier(simple_name)?;
        let qualified_name = qualify(package, simple_name);
        if self.builtins.contains_key(&qualified_name) {
            return Err(ModelError::illegal_argument(format!(
                "`{qualified_name}` is a builtin type"
            )));
        }

        let lookup: Weak<dyn ClassLookup> = self.this.clone();
        let node = ClassNode::new(package, simple_name, lookup, self.settings.clone())?;
        for import in imports {
            node.add_import(import)?;
        }

        let mut classes = self.classes.write();
        if classes.contains_key(&qualified_name) {
            return Err(ModelError::illegal_argument(format!(
                "class `{qualified_name}` is already defined"
            )));
        }
        classes.insert(qualified_name.clone(), node.clone());
        drop(classes);
        self.placeholders.write().remove(&qualified_name);

        tracing::debug!(target: "keystone.loader", class = %qualified_name, "defined class");
        Ok(node)
    }

    /// Look `name` up, falling back to an unresolved placeholder.
    pub fn load_class(&self, name: &str) -> ClassNode {
        self.lookup(name).unwrap_or_else(|| {
            tracing::debug!(target: "keystone.loader", name, "class not found; using placeholder");
            self.placeholder_for(name)
        })
    }

    fn placeholder_for(&self, name: &str) -> ClassNode {
        if let Some(existing) = self.placeholders.read().get(name) {
            return existing.clone();
        }
        let lookup: Weak<dyn ClassLookup> = self.this.clone();
        let fresh = ClassNode::unresolved(name, lookup, self.settings.clone());
        self.placeholders
            .write()
            .entry(name.to_owned())
            .or_insert(fresh)
            .clone()
    }

    /// Every class defined so far (builtins excluded), sorted by qualified name.
    pub fn classes(&self) -> Vec<ClassNode> {
        self.classes.read().values().cloned().collect()
    }

    pub fn builtin_classes(&self) -> Vec<ClassNode> {
        let mut out: Vec<ClassNode> = self.builtins.values().cloned().collect();
        out.sort_by(|a, b| a.qualified_name().cmp(b.qualified_name()));
        out
    }

    fn cached(&self, name: &str) -> Option<ClassNode> {
        if let Some(builtin) = self.builtins.get(name) {
            return Some(builtin.clone());
        }
        self.classes.read().get(name).cloned()
    }

    fn load_from_sources(&self, name: &str) -> Option<ClassNode> {
        // Serializes on-demand loads across threads; the same thread may re-enter for other names.
        let loading = self.loading.lock();

        // Another thread may have loaded it while we waited.
        if let Some(found) = self.cached(name) {
            return Some(found);
        }
        if !loading.borrow_mut().insert(name.to_owned()) {
            tracing::trace!(target: "keystone.loader", name, "re-entrant load; giving up");
            return None;
        }

        let found = self
            .sources
            .iter()
            .find_map(|source| source.load(self, name));
        loading.borrow_mut().remove(name);

        let found = found?;
        tracing::debug!(
            target: "keystone.loader",
            requested = name,
            class = found.qualified_name(),
            "loaded class on demand"
        );
        self.classes
            .write()
            .entry(found.qualified_name().to_owned())
            .or_insert_with(|| found.clone());
        Some(found)
    }
}

impl ClassLookup for ClassLoader {
    fn lookup(&self, qualified_name: &str) -> Option<ClassNode> {
        if let Some(found) = self.cached(qualified_name) {
            return Some(found);
        }
        if self.sources.is_empty() {
            return None;
        }
        self.load_from_sources(qualified_name)
    }

    fn lookup_default(&self, name: &str) -> Option<ClassNode> {
        if let Some(builtin) = self.builtins.get(name) {
            return Some(builtin.clone());
        }
        for package in &self.settings.default_packages {
            if let Some(found) = self.lookup(&qualify(package, name)) {
                return Some(found);
            }
        }
        self.lookup(name)
    }

    fn placeholder(&self, name: &str) -> Option<ClassNode> {
        Some(self.placeholder_for(name))
    }
}
