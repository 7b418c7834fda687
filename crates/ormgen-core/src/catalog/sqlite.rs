//! SQLite catalog driver.

use super::driver::{CatalogDriver, ForeignKey, UniqueConstraint};
use crate::error::Result;
use rusqlite::{params, Connection, OpenFlags};
use std::path::Path;

/// One row of `pragma_index_list`.
#[derive(Debug, Clone)]
struct IndexEntry {
    name: String,
    unique: bool,
    origin: String,
}

/// Query results for the table currently being inspected.
#[derive(Debug, Default)]
struct TableCache {
    table: String,
    /// `(column name, position in primary key)`; position 0 means not in the key.
    columns: Option<Vec<(String, i64)>>,
    indexes: Option<Vec<IndexEntry>>,
}

/// Catalog driver reading SQLite's schema pragmas.
///
/// Column names are lower-cased.
pub struct SqliteDriver {
    conn: Connection,
    cache: TableCache,
}

impl SqliteDriver {
    /// Wrap an open connection.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn,
            cache: TableCache::default(),
        }
    }

    /// Open a database file read-only.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(Self::new(conn))
    }

    /// Access the underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    fn cache_for(&mut self, table: &str) -> &mut TableCache {
        if self.cache.table != table {
            self.cache = TableCache {
                table: table.to_string(),
                ..TableCache::default()
            };
        }
        &mut self.cache
    }

    fn table_info(&mut self, table: &str) -> Result<Vec<(String, i64)>> {
        if let Some(columns) = &self.cache_for(table).columns {
            return Ok(columns.clone());
        }

        let mut stmt = self
            .conn
            .prepare("SELECT name, pk FROM pragma_table_info(?1) ORDER BY cid")?;
        let columns = stmt
            .query_map(params![table], |row| {
                Ok((row.get::<_, String>(0)?.to_lowercase(), row.get::<_, i64>(1)?))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        drop(stmt);

        self.cache.columns = Some(columns.clone());
        Ok(columns)
    }

    fn index_list(&mut self, table: &str) -> Result<Vec<IndexEntry>> {
        if let Some(indexes) = &self.cache_for(table).indexes {
            return Ok(indexes.clone());
        }

        let mut stmt = self
            .conn
            .prepare(r#"SELECT name, "unique", origin FROM pragma_index_list(?1)"#)?;
        let mut indexes = stmt
            .query_map(params![table], |row| {
                Ok(IndexEntry {
                    name: row.get(0)?,
                    unique: row.get::<_, i64>(1)? != 0,
                    origin: row.get(2)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        drop(stmt);

        indexes.sort_by(|a, b| a.name.cmp(&b.name));
        self.cache.indexes = Some(indexes.clone());
        Ok(indexes)
    }

    fn index_columns(&self, index: &str) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM pragma_index_info(?1) ORDER BY seqno")?;
        let columns = stmt
            .query_map(params![index], |row| {
                Ok(row.get::<_, Option<String>>(0)?.unwrap_or_default().to_lowercase())
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(columns)
    }
}

impl CatalogDriver for SqliteDriver {
    fn list_tables(&mut self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%'",
        )?;
        let tables = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(tables)
    }

    fn columns(&mut self, table: &str) -> Result<Vec<String>> {
        Ok(self
            .table_info(table)?
            .into_iter()
            .map(|(name, _)| name)
            .collect())
    }

    fn primary_key(&mut self, table: &str) -> Result<Vec<String>> {
        let mut key: Vec<_> = self
            .table_info(table)?
            .into_iter()
            .filter(|(_, pk)| *pk > 0)
            .collect();
        key.sort_by_key(|(_, pk)| *pk);
        Ok(key.into_iter().map(|(name, _)| name).collect())
    }

    fn unique_constraints(&mut self, table: &str) -> Result<Vec<UniqueConstraint>> {
        let mut constraints = Vec::new();
        for index in self.index_list(table)? {
            if !index.unique || index.origin == "pk" {
                continue;
            }
            let columns = self.index_columns(&index.name)?;
            constraints.push(UniqueConstraint {
                name: index.name,
                columns,
            });
        }
        Ok(constraints)
    }

    fn foreign_keys(&mut self, table: &str) -> Result<Vec<ForeignKey>> {
        let mut stmt = self.conn.prepare(
            r#"SELECT id, "table", "from", "to" FROM pragma_foreign_key_list(?1) ORDER BY id, seq"#,
        )?;
        let rows = stmt
            .query_map(params![table], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, Option<String>>(3)?,
                ))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut keys: Vec<(i64, ForeignKey)> = Vec::new();
        for (id, remote_table, from, to) in rows {
            if keys.last().map(|(last, _)| *last) != Some(id) {
                keys.push((
                    id,
                    ForeignKey {
                        local_columns: Vec::new(),
                        remote_table,
                        remote_columns: Vec::new(),
                    },
                ));
            }
            if let Some((_, fk)) = keys.last_mut() {
                fk.local_columns.push(from.to_lowercase());
                // A missing target column means the remote primary key.
                if let Some(to) = to {
                    fk.remote_columns.push(to.to_lowercase());
                }
            }
        }

        Ok(keys.into_iter().map(|(_, fk)| fk).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn driver() -> SqliteDriver {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            r#"
            CREATE TABLE foo (
                id INTEGER PRIMARY KEY,
                Name TEXT NOT NULL UNIQUE
            );
            CREATE TABLE bar (
                id INTEGER NOT NULL,
                rev INTEGER NOT NULL,
                foo_id INTEGER REFERENCES foo(id),
                PRIMARY KEY (rev, id)
            );
            CREATE TABLE loose (note TEXT, owner INTEGER REFERENCES foo);
            "#,
        )
        .unwrap();
        SqliteDriver::new(conn)
    }

    #[test]
    fn test_list_tables() {
        let mut driver = driver();
        let mut tables = driver.list_tables().unwrap();
        tables.sort();
        assert_eq!(tables, vec!["bar", "foo", "loose"]);
    }

    #[test]
    fn test_columns_are_lowercased() {
        let mut driver = driver();
        assert_eq!(driver.columns("foo").unwrap(), vec!["id", "name"]);
    }

    #[test]
    fn test_composite_primary_key_order() {
        let mut driver = driver();
        assert_eq!(driver.primary_key("bar").unwrap(), vec!["rev", "id"]);
        assert!(driver.primary_key("loose").unwrap().is_empty());
    }

    #[test]
    fn test_unique_constraints() {
        let mut driver = driver();
        let uniques = driver.unique_constraints("foo").unwrap();
        assert_eq!(uniques.len(), 1);
        assert_eq!(uniques[0].columns, vec!["name"]);
        assert!(driver.unique_constraints("bar").unwrap().is_empty());
    }

    #[test]
    fn test_foreign_keys() {
        let mut driver = driver();
        let fks = driver.foreign_keys("bar").unwrap();
        assert_eq!(fks, vec![ForeignKey::new(["foo_id"], "foo", ["id"])]);

        let fks = driver.foreign_keys("loose").unwrap();
        assert_eq!(fks[0].local_columns, vec!["owner"]);
        assert!(fks[0].remote_columns.is_empty());
    }

    #[test]
    fn test_cache_does_not_leak_between_tables() {
        let mut driver = driver();
        assert_eq!(driver.columns("foo").unwrap(), vec!["id", "name"]);
        assert_eq!(driver.columns("bar").unwrap(), vec!["id", "rev", "foo_id"]);
        assert_eq!(driver.primary_key("foo").unwrap(), vec!["id"]);
    }

    #[test]
    fn test_missing_table_has_no_columns() {
        let mut driver = driver();
        assert!(driver.columns("vanished").unwrap().is_empty());
    }
}
