//! The per-run pipeline.

use crate::catalog::CatalogDriver;
use crate::config::LoaderOptions;
use crate::emit::{DebugEmitter, DumpEmitter, DumpReport, Emitter};
use crate::error::Result;
use crate::extension::{DirExtensionLookup, ExtensionLookup, NoExtensions};
use crate::naming::{Inflector, NameMapper};
use crate::relationship::{resolve_foreign_keys, RelationshipBuilder};
use crate::schema::{attach_extensions, Composition, SchemaBuilder, SchemaRegistry};
use crate::selector::select_tables;
use crate::warning::{Warning, Warnings};
use tracing::info;

/// State owned by a single run.
#[derive(Debug)]
pub struct RunContext {
    pub registry: SchemaRegistry,
    pub warnings: Warnings,
}

impl RunContext {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            registry: SchemaRegistry::new(namespace),
            warnings: Warnings::new(),
        }
    }
}

/// Result of a successful run.
#[derive(Debug)]
pub struct LoadReport {
    pub registry: SchemaRegistry,
    pub warnings: Vec<Warning>,
    /// Present when a dump directory was configured.
    pub dump: Option<DumpReport>,
    /// Trace lines, populated in debug mode.
    pub trace: Vec<String>,
}

/// Loads a schema from a catalog driver.
///
/// A loader holds no per-run state and can be reused across drivers.
pub struct Loader {
    options: LoaderOptions,
    names: NameMapper,
    composition: Composition,
    extensions: Box<dyn ExtensionLookup>,
}

impl Loader {
    /// Validate `options` and prepare a loader.
    pub fn new(options: LoaderOptions) -> Result<Self> {
        options.validate()?;
        let extensions: Box<dyn ExtensionLookup> = if options.extension_dirs.is_empty() {
            Box::new(NoExtensions)
        } else {
            Box::new(DirExtensionLookup::new(options.extension_dirs.clone()))
        };

        Ok(Self {
            names: options.name_mapper(),
            composition: options.composition(),
            extensions,
            options,
        })
    }

    /// Replace the inflector, keeping the configured overrides.
    pub fn with_inflector(mut self, inflector: Box<dyn Inflector>) -> Self {
        self.names = self.options.name_mapper_with(inflector);
        self
    }

    /// Replace the extension lookup.
    pub fn with_extension_lookup(mut self, lookup: impl ExtensionLookup + 'static) -> Self {
        self.extensions = Box::new(lookup);
        self
    }

    pub fn options(&self) -> &LoaderOptions {
        &self.options
    }

    /// Run the whole pipeline against `driver`.
    pub fn load(&self, driver: &mut dyn CatalogDriver) -> Result<LoadReport> {
        let mut ctx = RunContext::new(self.options.schema_name.as_str());
        for warning in &self.options.deprecations {
            ctx.warnings.push(warning.clone());
        }

        let tables = select_tables(
            driver.list_tables()?,
            self.options.constraint.as_ref(),
            self.options.exclude.as_ref(),
            &mut ctx.warnings,
        );

        SchemaBuilder::new(&self.names, &self.composition).build(
            &tables,
            driver,
            &mut ctx.registry,
            &mut ctx.warnings,
        )?;

        if self.options.relationships {
            let edges = resolve_foreign_keys(&ctx.registry, driver, &mut ctx.warnings)?;
            RelationshipBuilder::new(&self.names).setup_relationships(&mut ctx.registry, &edges);
        }

        attach_extensions(&mut ctx.registry, self.extensions.as_ref())?;

        let dump = match &self.options.dump_directory {
            Some(dir) => Some(DumpEmitter::new(dir, self.options.dump_policy()).emit(&ctx.registry)?),
            None => None,
        };
        let trace = if self.options.debug {
            DebugEmitter::new().emit(&ctx.registry)?
        } else {
            Vec::new()
        };

        info!(
            schema = %ctx.registry.namespace(),
            classes = ctx.registry.len(),
            warnings = ctx.warnings.len(),
            "schema loaded"
        );

        Ok(LoadReport {
            registry: ctx.registry,
            warnings: ctx.warnings.into_vec(),
            dump,
            trace,
        })
    }
}
