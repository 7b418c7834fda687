//! Catalog snapshots: a serializable catalog and the driver serving it.

use super::driver::{CatalogDriver, ForeignKey, UniqueConstraint};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Metadata of one table inside a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSnapshot {
    pub name: String,
    pub columns: Vec<String>,
    #[serde(default)]
    pub primary_key: Vec<String>,
    #[serde(default)]
    pub unique_constraints: Vec<UniqueConstraint>,
    #[serde(default)]
    pub foreign_keys: Vec<ForeignKey>,
}

impl TableSnapshot {
    /// Create a table with no columns or keys.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            primary_key: Vec::new(),
            unique_constraints: Vec::new(),
            foreign_keys: Vec::new(),
        }
    }

    /// Set the columns.
    pub fn with_columns(mut self, columns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Set the primary key.
    pub fn with_primary_key(
        mut self,
        columns: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.primary_key = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Add a unique constraint.
    pub fn with_unique(mut self, constraint: UniqueConstraint) -> Self {
        self.unique_constraints.push(constraint);
        self
    }

    /// Add a foreign key.
    pub fn with_foreign_key(mut self, fk: ForeignKey) -> Self {
        self.foreign_keys.push(fk);
        self
    }
}

/// A complete catalog, usually stored as JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    pub tables: Vec<TableSnapshot>,
}

impl CatalogSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a table.
    pub fn with_table(mut self, table: TableSnapshot) -> Self {
        self.tables.push(table);
        self
    }

    /// Parse a snapshot from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a snapshot from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Serialize as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Record everything `driver` reports into a snapshot.
    pub fn capture(driver: &mut dyn CatalogDriver) -> Result<Self> {
        let mut names = driver.list_tables()?;
        names.sort();
        names.dedup();

        let mut tables = Vec::with_capacity(names.len());
        for name in names {
            tables.push(TableSnapshot {
                columns: driver.columns(&name)?,
                primary_key: driver.primary_key(&name)?,
                unique_constraints: driver.unique_constraints(&name)?,
                foreign_keys: driver.foreign_keys(&name)?,
                name,
            });
        }

        Ok(Self { tables })
    }
}

/// Driver answering catalog queries from a [`CatalogSnapshot`].
#[derive(Debug, Clone)]
pub struct SnapshotDriver {
    tables: BTreeMap<String, TableSnapshot>,
}

impl SnapshotDriver {
    pub fn new(snapshot: CatalogSnapshot) -> Self {
        let tables = snapshot
            .tables
            .into_iter()
            .map(|t| (t.name.clone(), t))
            .collect();
        Self { tables }
    }

    /// Remove a table, as if it was dropped between enumeration and inspection.
    pub fn drop_table(&mut self, name: &str) -> Option<TableSnapshot> {
        self.tables.remove(name)
    }

    fn table(&self, name: &str) -> Result<&TableSnapshot> {
        self.tables
            .get(name)
            .ok_or_else(|| Error::driver(name, format!("no such table: {name}")))
    }
}

impl From<CatalogSnapshot> for SnapshotDriver {
    fn from(snapshot: CatalogSnapshot) -> Self {
        Self::new(snapshot)
    }
}

impl CatalogDriver for SnapshotDriver {
    fn list_tables(&mut self) -> Result<Vec<String>> {
        Ok(self.tables.keys().cloned().collect())
    }

    fn columns(&mut self, table: &str) -> Result<Vec<String>> {
        Ok(self.table(table)?.columns.clone())
    }

    fn primary_key(&mut self, table: &str) -> Result<Vec<String>> {
        Ok(self.table(table)?.primary_key.clone())
    }

    fn unique_constraints(&mut self, table: &str) -> Result<Vec<UniqueConstraint>> {
        Ok(self.table(table)?.unique_constraints.clone())
    }

    fn foreign_keys(&mut self, table: &str) -> Result<Vec<ForeignKey>> {
        Ok(self.table(table)?.foreign_keys.clone())
    }
}
