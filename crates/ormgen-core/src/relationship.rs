//! Relationship inference from foreign keys.
//!
//! Every resolved foreign key produces a pair of accessors: a to-one
//! `belongs_to` on the referencing class and a to-many `has_many` on the
//! referenced class, joined on the same columns in opposite directions.
//!
//! # Naming
//!
//! | Side | Default name |
//! |------|--------------|
//! | to-one | singular of the lower-cased remote moniker |
//! | to-many | plural of the lower-cased referencing moniker |
//! | self reference | `parent` / `children` |
//!
//! Monikers that are not a single alphanumeric word (usually overrides such
//! as `Legacy::User`) fall back to the lower-cased table name.
//!
//! When several foreign keys connect the same pair of classes, all of their
//! accessors get a `_by_<local columns>` suffix. A name that still clashes
//! with an accessor or column already on the class gets the same suffix,
//! then `_2`, `_3`, ... until it is free.

use crate::catalog::CatalogDriver;
use crate::error::{Error, Result};
use crate::naming::{is_plain_moniker, Cardinality, NameMapper};
use crate::schema::{
    ClassDescriptor, JoinColumn, RelationshipAccessor, RelationshipKind, SchemaRegistry,
};
use crate::warning::{Warning, Warnings};
use std::collections::HashMap;

/// A foreign key whose tables are resolved to monikers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedForeignKey {
    pub local_moniker: String,
    pub local_columns: Vec<String>,
    pub remote_moniker: String,
    /// Paired positionally with `local_columns`.
    pub remote_columns: Vec<String>,
}

/// Fetch and resolve foreign keys for every registered class.
///
/// Keys to tables outside the registry are dropped silently. Keys that name
/// no remote columns use the remote primary key; if there is none the key
/// is skipped with a warning.
pub fn resolve_foreign_keys(
    registry: &SchemaRegistry,
    driver: &mut dyn CatalogDriver,
    warnings: &mut Warnings,
) -> Result<Vec<ResolvedForeignKey>> {
    let mut edges = Vec::new();

    for class in registry.classes() {
        for fk in driver.foreign_keys(&class.table)? {
            let Some(remote) = registry.class_for_table(&fk.remote_table) else {
                tracing::debug!(
                    table = %class.table,
                    remote_table = %fk.remote_table,
                    "dropping foreign key to unselected table"
                );
                continue;
            };

            let remote_columns = if fk.remote_columns.is_empty() {
                remote.primary_key.clone()
            } else {
                fk.remote_columns
            };
            if remote_columns.is_empty() {
                warnings.push(Warning::UnjoinableForeignKey {
                    table: class.table.clone(),
                    remote_table: remote.table.clone(),
                });
                continue;
            }
            if remote_columns.len() != fk.local_columns.len() {
                return Err(Error::ForeignKeyArity {
                    table: class.table.clone(),
                    remote_table: remote.table.clone(),
                    local: fk.local_columns.len(),
                    remote: remote_columns.len(),
                });
            }

            edges.push(ResolvedForeignKey {
                local_moniker: class.moniker.clone(),
                local_columns: fk.local_columns,
                remote_moniker: remote.moniker.clone(),
                remote_columns,
            });
        }
    }

    Ok(edges)
}

/// Turns resolved foreign keys into relationship accessors.
pub struct RelationshipBuilder<'a> {
    names: &'a NameMapper,
}

impl<'a> RelationshipBuilder<'a> {
    pub fn new(names: &'a NameMapper) -> Self {
        Self { names }
    }

    /// Add accessors for every edge, in order.
    ///
    /// Must run after every selected table has its class registered.
    pub fn setup_relationships(
        &self,
        registry: &mut SchemaRegistry,
        edges: &[ResolvedForeignKey],
    ) {
        let mut pair_counts: HashMap<(&str, &str), usize> = HashMap::new();
        for edge in edges {
            *pair_counts
                .entry((edge.local_moniker.as_str(), edge.remote_moniker.as_str()))
                .or_default() += 1;
        }

        for edge in edges {
            let key = (edge.local_moniker.as_str(), edge.remote_moniker.as_str());
            let shared = pair_counts[&key] > 1;
            self.add_edge(registry, edge, shared);
        }
    }

    fn base_word(registry: &SchemaRegistry, moniker: &str) -> String {
        if is_plain_moniker(moniker) {
            return moniker.to_lowercase();
        }
        registry
            .class(moniker)
            .map(|c| c.table.to_lowercase())
            .unwrap_or_else(|| moniker.to_lowercase())
    }

    fn add_edge(&self, registry: &mut SchemaRegistry, edge: &ResolvedForeignKey, shared: bool) {
        if registry.class(&edge.local_moniker).is_none()
            || registry.class(&edge.remote_moniker).is_none()
        {
            tracing::debug!(
                local = %edge.local_moniker,
                remote = %edge.remote_moniker,
                "dropping edge between unregistered classes"
            );
            return;
        }

        let (to_one, to_many) = if edge.local_moniker == edge.remote_moniker {
            ("parent".to_string(), "children".to_string())
        } else {
            let remote_word = Self::base_word(registry, &edge.remote_moniker);
            let local_word = Self::base_word(registry, &edge.local_moniker);
            (
                self.names.relationship_name(&remote_word, Cardinality::ToOne),
                self.names.relationship_name(&local_word, Cardinality::ToMany),
            )
        };
        let by_columns = format!("_by_{}", edge.local_columns.join("_"));
        let local_path = registry.class_path(&edge.local_moniker);
        let remote_path = registry.class_path(&edge.remote_moniker);

        if let Some(local) = registry.class_mut(&edge.local_moniker) {
            let (name, suffix) = free_name(local, &to_one, shared, &by_columns);
            tracing::debug!(class = %edge.local_moniker, accessor = %name, "belongs_to");
            local.add_relationship(
                RelationshipAccessor {
                    kind: RelationshipKind::BelongsTo,
                    name,
                    target: edge.remote_moniker.clone(),
                    join: pair(&edge.local_columns, &edge.remote_columns),
                    suffix,
                },
                remote_path,
            );
        }

        if let Some(remote) = registry.class_mut(&edge.remote_moniker) {
            let (name, suffix) = free_name(remote, &to_many, shared, &by_columns);
            tracing::debug!(class = %edge.remote_moniker, accessor = %name, "has_many");
            remote.add_relationship(
                RelationshipAccessor {
                    kind: RelationshipKind::HasMany,
                    name,
                    target: edge.local_moniker.clone(),
                    join: pair(&edge.remote_columns, &edge.local_columns),
                    suffix,
                },
                local_path,
            );
        }
    }
}

fn pair(local: &[String], remote: &[String]) -> Vec<JoinColumn> {
    local
        .iter()
        .zip(remote)
        .map(|(l, r)| JoinColumn {
            local: l.clone(),
            remote: r.clone(),
        })
        .collect()
}

/// Pick an unused accessor name on `class` starting from `base`.
fn free_name(
    class: &ClassDescriptor,
    base: &str,
    force_suffix: bool,
    by_columns: &str,
) -> (String, Option<String>) {
    let taken = |name: &str| class.has_accessor(name) || class.has_column(name);

    if !force_suffix && !taken(base) {
        return (base.to_string(), None);
    }

    let mut suffix = by_columns.to_string();
    let mut n = 2;
    while taken(&format!("{base}{suffix}")) {
        suffix = format!("{by_columns}_{n}");
        n += 1;
    }
    (format!("{base}{suffix}"), Some(suffix))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CatalogSnapshot, ForeignKey, SnapshotDriver, TableSnapshot};
    use crate::naming::NameOverride;
    use crate::schema::{Composition, SchemaBuilder};

    fn load(snapshot: CatalogSnapshot, names: &NameMapper) -> (SchemaRegistry, Warnings) {
        let mut driver = SnapshotDriver::new(snapshot);
        let mut tables = driver.list_tables().unwrap();
        tables.sort();
        let mut registry = SchemaRegistry::new("s");
        let mut warnings = Warnings::new();
        let composition = Composition::default();

        SchemaBuilder::new(names, &composition)
            .build(&tables, &mut driver, &mut registry, &mut warnings)
            .unwrap();
        let edges = resolve_foreign_keys(&registry, &mut driver, &mut warnings).unwrap();
        RelationshipBuilder::new(names).setup_relationships(&mut registry, &edges);
        (registry, warnings)
    }

    fn foo_bar() -> CatalogSnapshot {
        CatalogSnapshot::new()
            .with_table(
                TableSnapshot::new("foo")
                    .with_columns(["id", "name"])
                    .with_primary_key(["id"]),
            )
            .with_table(
                TableSnapshot::new("bar")
                    .with_columns(["id", "foo_id"])
                    .with_primary_key(["id"])
                    .with_foreign_key(ForeignKey::new(["foo_id"], "foo", ["id"])),
            )
    }

    #[test]
    fn test_belongs_to_and_has_many() {
        let (registry, _) = load(foo_bar(), &NameMapper::default());

        let bar = registry.class("Bar").unwrap();
        let foo_rel = bar.accessor("foo").unwrap();
        assert_eq!(foo_rel.kind, RelationshipKind::BelongsTo);
        assert_eq!(foo_rel.target, "Foo");
        assert_eq!(
            foo_rel.join,
            vec![JoinColumn {
                local: "foo_id".to_string(),
                remote: "id".to_string()
            }]
        );

        let foo = registry.class("Foo").unwrap();
        let bars = foo.accessor("bars").unwrap();
        assert_eq!(bars.kind, RelationshipKind::HasMany);
        assert_eq!(bars.target, "Bar");
        assert_eq!(bars.join[0].local, "id");
        assert_eq!(bars.join[0].remote, "foo_id");
    }

    #[test]
    fn test_two_keys_to_same_table_are_disambiguated() {
        let snapshot = CatalogSnapshot::new()
            .with_table(
                TableSnapshot::new("luser")
                    .with_columns(["id"])
                    .with_primary_key(["id"]),
            )
            .with_table(
                TableSnapshot::new("message")
                    .with_columns(["id", "sender_id", "recipient_id"])
                    .with_primary_key(["id"])
                    .with_foreign_key(ForeignKey::new(["sender_id"], "luser", ["id"]))
                    .with_foreign_key(ForeignKey::new(["recipient_id"], "luser", ["id"])),
            );
        let (registry, _) = load(snapshot, &NameMapper::default());

        let message = registry.class("Message").unwrap();
        let names: Vec<_> = message.relationships.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["luser_by_sender_id", "luser_by_recipient_id"]);
        assert_eq!(
            message.relationships[0].suffix.as_deref(),
            Some("_by_sender_id")
        );

        let luser = registry.class("Luser").unwrap();
        let names: Vec<_> = luser.relationships.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["messages_by_sender_id", "messages_by_recipient_id"]
        );
    }

    #[test]
    fn test_plural_collision_across_tables() {
        // Both referencing tables pluralize to `data`.
        let names =
            NameMapper::default().with_plural(Some(NameOverride::map([("datum", "data")])));
        let snapshot = CatalogSnapshot::new()
            .with_table(
                TableSnapshot::new("source")
                    .with_columns(["id"])
                    .with_primary_key(["id"]),
            )
            .with_table(
                TableSnapshot::new("data")
                    .with_columns(["id", "source_id"])
                    .with_foreign_key(ForeignKey::new(["source_id"], "source", ["id"])),
            )
            .with_table(
                TableSnapshot::new("datum")
                    .with_columns(["id", "origin_id"])
                    .with_foreign_key(ForeignKey::new(["origin_id"], "source", ["id"])),
            );
        let (registry, _) = load(snapshot, &names);

        let source = registry.class("Source").unwrap();
        let names: Vec<_> = source.relationships.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["data", "data_by_origin_id"]);
    }

    #[test]
    fn test_self_reference() {
        let snapshot = CatalogSnapshot::new().with_table(
            TableSnapshot::new("category")
                .with_columns(["id", "parent_id"])
                .with_primary_key(["id"])
                .with_foreign_key(ForeignKey::new(["parent_id"], "category", ["id"])),
        );
        let (registry, _) = load(snapshot, &NameMapper::default());

        let category = registry.class("Category").unwrap();
        assert_eq!(
            category.accessor("parent").unwrap().kind,
            RelationshipKind::BelongsTo
        );
        assert_eq!(
            category.accessor("children").unwrap().kind,
            RelationshipKind::HasMany
        );
    }

    #[test]
    fn test_accessor_clashing_with_column() {
        let snapshot = CatalogSnapshot::new()
            .with_table(
                TableSnapshot::new("owner")
                    .with_columns(["id"])
                    .with_primary_key(["id"]),
            )
            .with_table(
                TableSnapshot::new("pet")
                    .with_columns(["id", "owner"])
                    .with_foreign_key(ForeignKey::new(["owner"], "owner", ["id"])),
            );
        let (registry, _) = load(snapshot, &NameMapper::default());

        let pet = registry.class("Pet").unwrap();
        assert!(pet.has_accessor("owner_by_owner"));
        assert!(!pet.has_accessor("owner"));
    }

    #[test]
    fn test_foreign_key_outside_selection_dropped_silently() {
        let snapshot = CatalogSnapshot::new().with_table(
            TableSnapshot::new("bar")
                .with_columns(["id", "foo_id"])
                .with_primary_key(["id"])
                .with_foreign_key(ForeignKey::new(["foo_id"], "foo", ["id"])),
        );
        let (registry, warnings) = load(snapshot, &NameMapper::default());

        assert!(registry.class("Bar").unwrap().relationships.is_empty());
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_implicit_remote_columns_use_primary_key() {
        let snapshot = CatalogSnapshot::new()
            .with_table(
                TableSnapshot::new("foo")
                    .with_columns(["code"])
                    .with_primary_key(["code"]),
            )
            .with_table(
                TableSnapshot::new("bar")
                    .with_columns(["id", "foo_code"])
                    .with_primary_key(["id"])
                    .with_foreign_key(ForeignKey::new(["foo_code"], "foo", Vec::<String>::new())),
            );
        let (registry, _) = load(snapshot, &NameMapper::default());

        let rel = registry.class("Bar").unwrap().accessor("foo").unwrap();
        assert_eq!(rel.join[0].remote, "code");
    }

    #[test]
    fn test_keyless_remote_warns() {
        let snapshot = CatalogSnapshot::new()
            .with_table(TableSnapshot::new("foo").with_columns(["code"]))
            .with_table(
                TableSnapshot::new("bar")
                    .with_columns(["id", "foo_code"])
                    .with_primary_key(["id"])
                    .with_foreign_key(ForeignKey::new(["foo_code"], "foo", Vec::<String>::new())),
            );
        let (registry, warnings) = load(snapshot, &NameMapper::default());

        assert!(registry.class("Bar").unwrap().relationships.is_empty());
        assert!(warnings.contains(&Warning::UnjoinableForeignKey {
            table: "bar".to_string(),
            remote_table: "foo".to_string(),
        }));
    }

    #[test]
    fn test_arity_mismatch_is_fatal() {
        let snapshot = CatalogSnapshot::new()
            .with_table(
                TableSnapshot::new("foo")
                    .with_columns(["a", "b"])
                    .with_primary_key(["a", "b"]),
            )
            .with_table(
                TableSnapshot::new("bar")
                    .with_columns(["id", "foo_a"])
                    .with_foreign_key(ForeignKey::new(["foo_a"], "foo", ["a", "b"])),
            );
        let mut driver = SnapshotDriver::new(snapshot);
        let names = NameMapper::default();
        let composition = Composition::default();
        let mut registry = SchemaRegistry::new("s");
        let mut warnings = Warnings::new();
        SchemaBuilder::new(&names, &composition)
            .build(
                &["bar".to_string(), "foo".to_string()],
                &mut driver,
                &mut registry,
                &mut warnings,
            )
            .unwrap();

        let err = resolve_foreign_keys(&registry, &mut driver, &mut warnings).unwrap_err();
        assert!(matches!(err, Error::ForeignKeyArity { local: 1, remote: 2, .. }));
    }

    #[test]
    fn test_overridden_moniker_uses_table_name() {
        let names = NameMapper::default()
            .with_moniker_map(Some(NameOverride::map([("luser", "Legacy::User")])));
        let snapshot = CatalogSnapshot::new()
            .with_table(
                TableSnapshot::new("luser")
                    .with_columns(["id"])
                    .with_primary_key(["id"]),
            )
            .with_table(
                TableSnapshot::new("post")
                    .with_columns(["id", "luser_id"])
                    .with_primary_key(["id"])
                    .with_foreign_key(ForeignKey::new(["luser_id"], "luser", ["id"])),
            );
        let (registry, _) = load(snapshot, &names);

        let post = registry.class("Post").unwrap();
        assert_eq!(post.accessor("luser").unwrap().target, "Legacy::User");
        assert!(registry.class("Legacy::User").unwrap().has_accessor("posts"));
    }
}
