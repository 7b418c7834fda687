//! The catalog driver seam and the metadata it reports.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// A named unique constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniqueConstraint {
    /// Constraint name as reported by the catalog.
    pub name: String,
    /// Columns that must be unique together, in constraint order.
    pub columns: Vec<String>,
}

impl UniqueConstraint {
    /// Create a unique constraint.
    pub fn new(
        name: impl Into<String>,
        columns: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            name: name.into(),
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }
}

/// A foreign key as reported by a driver, scoped to the referencing table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKey {
    /// Columns on the referencing table.
    pub local_columns: Vec<String>,
    /// Referenced table name.
    pub remote_table: String,
    /// Referenced columns, positionally paired with `local_columns`.
    ///
    /// Empty means the remote primary key.
    #[serde(default)]
    pub remote_columns: Vec<String>,
}

impl ForeignKey {
    /// Create a foreign key.
    pub fn new(
        local_columns: impl IntoIterator<Item = impl Into<String>>,
        remote_table: impl Into<String>,
        remote_columns: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            local_columns: local_columns.into_iter().map(Into::into).collect(),
            remote_table: remote_table.into(),
            remote_columns: remote_columns.into_iter().map(Into::into).collect(),
        }
    }
}

/// Per-engine catalog access.
///
/// Methods take `&mut self` so drivers can cache per-table query results.
/// Such caches must be keyed to the table being inspected and never serve
/// another table's data.
pub trait CatalogDriver {
    /// Enumerate every table visible in the connected schema.
    fn list_tables(&mut self) -> Result<Vec<String>>;

    /// Column names of `table` in ordinal order.
    fn columns(&mut self, table: &str) -> Result<Vec<String>>;

    /// Primary key columns of `table` in key order. May be empty.
    fn primary_key(&mut self, table: &str) -> Result<Vec<String>>;

    /// Unique constraints of `table`, excluding the primary key.
    fn unique_constraints(&mut self, _table: &str) -> Result<Vec<UniqueConstraint>> {
        Err(Error::MissingCapability("unique_constraints"))
    }

    /// Foreign keys declared on `table`.
    fn foreign_keys(&mut self, _table: &str) -> Result<Vec<ForeignKey>> {
        Err(Error::MissingCapability("foreign_keys"))
    }
}

impl<D: CatalogDriver + ?Sized> CatalogDriver for Box<D> {
    fn list_tables(&mut self) -> Result<Vec<String>> {
        (**self).list_tables()
    }

    fn columns(&mut self, table: &str) -> Result<Vec<String>> {
        (**self).columns(table)
    }

    fn primary_key(&mut self, table: &str) -> Result<Vec<String>> {
        (**self).primary_key(table)
    }

    fn unique_constraints(&mut self, table: &str) -> Result<Vec<UniqueConstraint>> {
        (**self).unique_constraints(table)
    }

    fn foreign_keys(&mut self, table: &str) -> Result<Vec<ForeignKey>> {
        (**self).foreign_keys(table)
    }
}
