//! Per-table class construction.

use super::class::{ClassDescriptor, Composition};
use super::registry::SchemaRegistry;
use crate::catalog::CatalogDriver;
use crate::error::{Error, Result};
use crate::extension::ExtensionLookup;
use crate::naming::{is_valid_moniker, NameMapper};
use crate::warning::{Warning, Warnings};

/// Builds one [`ClassDescriptor`] per selected table.
pub struct SchemaBuilder<'a> {
    names: &'a NameMapper,
    composition: &'a Composition,
}

impl<'a> SchemaBuilder<'a> {
    pub fn new(names: &'a NameMapper, composition: &'a Composition) -> Self {
        Self { names, composition }
    }

    /// Build classes for `tables`, in order, into `registry`.
    ///
    /// Any driver failure aborts the build. A table without columns is
    /// treated as having vanished mid-run, which is also fatal.
    pub fn build(
        &self,
        tables: &[String],
        driver: &mut dyn CatalogDriver,
        registry: &mut SchemaRegistry,
        warnings: &mut Warnings,
    ) -> Result<()> {
        for table in tables {
            let class = self.build_table(table, driver, registry, warnings)?;
            registry.register(class)?;
        }
        Ok(())
    }

    fn build_table(
        &self,
        table: &str,
        driver: &mut dyn CatalogDriver,
        registry: &mut SchemaRegistry,
        warnings: &mut Warnings,
    ) -> Result<ClassDescriptor> {
        let moniker = self.names.moniker(table);
        if !is_valid_moniker(&moniker) {
            return Err(Error::InvalidMoniker {
                table: table.to_string(),
                moniker,
            });
        }
        registry.register_moniker(table, &moniker)?;
        tracing::debug!(table, moniker = %moniker, "building class");

        let columns = driver.columns(table).map_err(|e| Error::MissingColumns {
            table: table.to_string(),
            reason: e.to_string(),
        })?;
        if columns.is_empty() {
            return Err(Error::MissingColumns {
                table: table.to_string(),
                reason: "driver reported no columns".to_string(),
            });
        }

        let primary_key = driver.primary_key(table)?;
        if primary_key.is_empty() {
            warnings.push(Warning::NoPrimaryKey {
                table: table.to_string(),
            });
        }

        let uniques = driver.unique_constraints(table)?;

        let mut class = ClassDescriptor::new(moniker, registry.namespace(), table);
        class.compose(self.composition);
        class.bind_table();
        class.add_columns(columns);
        class.set_primary_key(primary_key);
        for unique in uniques {
            class.add_unique_constraint(unique);
        }

        Ok(class)
    }
}

/// Attach hand-written extensions to every class that has one.
pub fn attach_extensions(
    registry: &mut SchemaRegistry,
    lookup: &dyn ExtensionLookup,
) -> Result<()> {
    for class in registry.classes_mut() {
        if let Some(extension) = lookup.find(class)? {
            tracing::debug!(
                class = %class.class_path(),
                path = %extension.path.display(),
                "loaded extension"
            );
            class.extension = Some(extension);
        }
    }
    Ok(())
}
