//! Catalog access for ormgen.
//!
//! A [`CatalogDriver`] reports tables, columns, keys and constraints for one
//! database engine. The loader only talks to the catalog through this trait.

mod driver;
mod snapshot;
#[cfg(feature = "sqlite")]
mod sqlite;

pub use driver::{CatalogDriver, ForeignKey, UniqueConstraint};
pub use snapshot::{CatalogSnapshot, SnapshotDriver, TableSnapshot};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDriver;
