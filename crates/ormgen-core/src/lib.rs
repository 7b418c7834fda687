//! ormgen core - catalog introspection, relationship inference and schema dumps.
//!
//! A [`Loader`] reads a database catalog through a [`CatalogDriver`], builds one
//! class descriptor per selected table, infers relationship accessors from
//! foreign keys and emits the result to disk, to trace lines, or into a live
//! runtime through [`SchemaSink`].

pub mod catalog;
pub mod config;
pub mod emit;
pub mod error;
pub mod extension;
pub mod loader;
pub mod naming;
pub mod relationship;
pub mod schema;
pub mod selector;
pub mod warning;

pub use catalog::{
    CatalogDriver, CatalogSnapshot, ForeignKey, SnapshotDriver, TableSnapshot, UniqueConstraint,
};
#[cfg(feature = "sqlite")]
pub use catalog::SqliteDriver;
pub use config::{LoaderConfig, LoaderOptions, DEFAULT_SCHEMA_NAME};
pub use emit::{
    ClassBuilder, DebugEmitter, DumpEmitter, DumpPolicy, DumpReport, Emitter, LiveEmitter,
    SchemaSink,
};
pub use error::{Error, Result};
pub use extension::{DirExtensionLookup, Extension, ExtensionLookup, NoExtensions};
pub use loader::{LoadReport, Loader, RunContext};
pub use naming::{Cardinality, EnglishInflector, Inflector, LegacyInflector, NameMapper, NameOverride};
pub use relationship::{resolve_foreign_keys, RelationshipBuilder, ResolvedForeignKey};
pub use schema::{
    ClassDescriptor, ClassOp, RelationshipAccessor, RelationshipKind, SchemaOp, SchemaRegistry,
};
pub use selector::select_tables;
pub use warning::{Warning, Warnings};
