//! Schema-wide class registry.

use super::class::ClassDescriptor;
use super::ops::SchemaOp;
use crate::emit::layout;
use crate::error::{Error, Result};
use std::collections::{BTreeMap, HashMap};

/// All classes of one run, keyed by moniker.
///
/// Copying a schema into another namespace goes through
/// [`SchemaRegistry::rebind`], which rewrites every class path and
/// relationship target.
#[derive(Debug)]
pub struct SchemaRegistry {
    namespace: String,
    classes: BTreeMap<String, ClassDescriptor>,
    /// Table name (original and lower-cased) to moniker.
    monikers: HashMap<String, String>,
    /// Moniker to the table that owns it.
    owners: HashMap<String, String>,
    /// Artifact module name to the moniker written there.
    modules: HashMap<String, String>,
}

impl SchemaRegistry {
    /// Create an empty registry for classes under `namespace`.
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            classes: BTreeMap::new(),
            monikers: HashMap::new(),
            owners: HashMap::new(),
            modules: HashMap::new(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Reserve `moniker` for `table` under both its original and lower-cased name.
    ///
    /// Two distinct tables mapping to the same moniker is an error, and so
    /// are two monikers whose artifacts land on the same path.
    pub fn register_moniker(&mut self, table: &str, moniker: &str) -> Result<()> {
        if let Some(existing) = self.owners.get(moniker).filter(|t| *t != table) {
            return Err(Error::MonikerClash {
                moniker: moniker.to_string(),
                first: existing.clone(),
                second: table.to_string(),
            });
        }
        let module = layout::module_name(moniker);
        if let Some(existing) = self.modules.get(&module).filter(|m| *m != moniker) {
            return Err(Error::ArtifactClash {
                path: layout::class_file(&self.namespace, moniker),
                first: self.class_path(existing),
                second: self.class_path(moniker),
            });
        }
        self.modules.insert(module, moniker.to_string());
        self.owners.insert(moniker.to_string(), table.to_string());
        self.monikers.insert(table.to_string(), moniker.to_string());
        self.monikers
            .entry(table.to_lowercase())
            .or_insert_with(|| moniker.to_string());
        Ok(())
    }

    /// Register a class, keyed by its moniker.
    pub fn register(&mut self, class: ClassDescriptor) -> Result<()> {
        self.register_moniker(&class.table, &class.moniker)?;
        self.classes.insert(class.moniker.clone(), class);
        Ok(())
    }

    /// Moniker of `table`, trying the exact name before the lower-cased one.
    pub fn moniker_for(&self, table: &str) -> Option<&str> {
        self.monikers
            .get(table)
            .or_else(|| self.monikers.get(&table.to_lowercase()))
            .map(String::as_str)
    }

    pub fn class(&self, moniker: &str) -> Option<&ClassDescriptor> {
        self.classes.get(moniker)
    }

    pub fn class_mut(&mut self, moniker: &str) -> Option<&mut ClassDescriptor> {
        self.classes.get_mut(moniker)
    }

    /// Class registered for `table`.
    pub fn class_for_table(&self, table: &str) -> Option<&ClassDescriptor> {
        self.moniker_for(table).and_then(|m| self.classes.get(m))
    }

    /// Classes sorted by moniker.
    pub fn classes(&self) -> impl Iterator<Item = &ClassDescriptor> {
        self.classes.values()
    }

    pub(crate) fn classes_mut(&mut self) -> impl Iterator<Item = &mut ClassDescriptor> {
        self.classes.values_mut()
    }

    /// Sorted monikers.
    pub fn monikers(&self) -> Vec<&str> {
        self.classes.keys().map(String::as_str).collect()
    }

    /// Table to moniker pairs, sorted by table, original names only.
    pub fn moniker_map(&self) -> BTreeMap<&str, &str> {
        self.classes
            .values()
            .map(|c| (c.table.as_str(), c.moniker.as_str()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Full class path of `moniker` in this namespace.
    pub fn class_path(&self, moniker: &str) -> String {
        format!("{}::{}", self.namespace, moniker)
    }

    /// Schema-level operations: one class load per class, in moniker order.
    pub fn ops(&self) -> Vec<SchemaOp> {
        self.classes
            .values()
            .map(|c| SchemaOp::LoadClass {
                module: layout::module_name(&c.moniker),
                class_path: c.class_path(),
            })
            .collect()
    }

    /// Copy the schema into `namespace`.
    pub fn rebind(&self, namespace: impl Into<String>) -> SchemaRegistry {
        let namespace = namespace.into();
        let classes = self
            .classes
            .iter()
            .map(|(moniker, class)| {
                let mut class = class.clone();
                class.rebind(&namespace);
                (moniker.clone(), class)
            })
            .collect();

        SchemaRegistry {
            namespace,
            classes,
            monikers: self.monikers.clone(),
            owners: self.owners.clone(),
            modules: self.modules.clone(),
        }
    }
}
