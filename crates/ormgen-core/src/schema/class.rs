//! Class descriptors and relationship accessors.

use super::ops::ClassOp;
use crate::catalog::UniqueConstraint;
use crate::extension::Extension;
use crate::naming::Cardinality;

/// Kind of relationship accessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationshipKind {
    /// Foreign key owner side.
    BelongsTo,
    /// Foreign key target side.
    HasMany,
}

impl RelationshipKind {
    pub fn cardinality(self) -> Cardinality {
        match self {
            RelationshipKind::BelongsTo => Cardinality::ToOne,
            RelationshipKind::HasMany => Cardinality::ToMany,
        }
    }
}

/// One positional column pairing of a join.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinColumn {
    /// Column on the class owning the accessor.
    pub local: String,
    /// Column on the target class.
    pub remote: String,
}

/// A relationship accessor owned by one class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationshipAccessor {
    /// Accessor kind.
    pub kind: RelationshipKind,
    /// Accessor name, unique within the class.
    pub name: String,
    /// Moniker of the target class.
    pub target: String,
    /// Join columns, in foreign key order.
    pub join: Vec<JoinColumn>,
    /// Suffix appended to the default name to resolve a collision.
    pub suffix: Option<String>,
}

impl RelationshipAccessor {
    pub fn cardinality(&self) -> Cardinality {
        self.kind.cardinality()
    }
}

/// Composition applied to every generated class.
///
/// Replaces base class injection: the runtime applies these in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Composition {
    /// Modules brought into scope.
    pub uses: Vec<String>,
    /// Mixins, highest precedence first.
    pub mixins: Vec<String>,
    pub components: Vec<String>,
    pub resultset_components: Vec<String>,
}

/// Description of one generated class.
#[derive(Debug, Clone)]
pub struct ClassDescriptor {
    /// Class identifier.
    pub moniker: String,
    /// Namespace the class lives in, e.g. `my_app::schema`.
    pub namespace: String,
    /// Source table.
    pub table: String,
    pub columns: Vec<String>,
    pub primary_key: Vec<String>,
    pub unique_constraints: Vec<UniqueConstraint>,
    pub relationships: Vec<RelationshipAccessor>,
    pub composition: Composition,
    /// Hand-written extension found for this class.
    pub extension: Option<Extension>,
    ops: Vec<ClassOp>,
}

impl ClassDescriptor {
    /// Create an empty class bound to `table`.
    ///
    /// Nothing is recorded until a mutator is called.
    pub fn new(
        moniker: impl Into<String>,
        namespace: impl Into<String>,
        table: impl Into<String>,
    ) -> Self {
        Self {
            moniker: moniker.into(),
            namespace: namespace.into(),
            table: table.into(),
            columns: Vec::new(),
            primary_key: Vec::new(),
            unique_constraints: Vec::new(),
            relationships: Vec::new(),
            composition: Composition::default(),
            extension: None,
            ops: Vec::new(),
        }
    }

    /// Full class path.
    pub fn class_path(&self) -> String {
        format!("{}::{}", self.namespace, self.moniker)
    }

    /// Recorded operations in emission order.
    pub fn ops(&self) -> &[ClassOp] {
        &self.ops
    }

    /// Apply composition, recording one operation per non-empty list.
    pub fn compose(&mut self, composition: &Composition) {
        if !composition.uses.is_empty() {
            self.ops.push(ClassOp::UseClasses(composition.uses.clone()));
        }
        if !composition.mixins.is_empty() {
            self.ops.push(ClassOp::ApplyMixins(composition.mixins.clone()));
        }
        if !composition.components.is_empty() {
            self.ops
                .push(ClassOp::LoadComponents(composition.components.clone()));
        }
        if !composition.resultset_components.is_empty() {
            self.ops.push(ClassOp::LoadResultsetComponents(
                composition.resultset_components.clone(),
            ));
        }
        self.composition = composition.clone();
    }

    /// Record the table binding.
    pub fn bind_table(&mut self) {
        self.ops.push(ClassOp::Table(self.table.clone()));
    }

    pub fn add_columns(&mut self, columns: Vec<String>) {
        self.ops.push(ClassOp::AddColumns(columns.clone()));
        self.columns.extend(columns);
    }

    /// Set the primary key. An empty key is not recorded.
    pub fn set_primary_key(&mut self, columns: Vec<String>) {
        if !columns.is_empty() {
            self.ops.push(ClassOp::SetPrimaryKey(columns.clone()));
        }
        self.primary_key = columns;
    }

    pub fn add_unique_constraint(&mut self, constraint: UniqueConstraint) {
        self.ops.push(ClassOp::AddUniqueConstraint {
            name: constraint.name.clone(),
            columns: constraint.columns.clone(),
        });
        self.unique_constraints.push(constraint);
    }

    /// Add a relationship accessor; `target_path` is the target's full class path.
    pub fn add_relationship(&mut self, accessor: RelationshipAccessor, target_path: String) {
        let join = accessor
            .join
            .iter()
            .map(|j| (j.local.clone(), j.remote.clone()))
            .collect();
        let op = match accessor.kind {
            RelationshipKind::BelongsTo => ClassOp::BelongsTo {
                name: accessor.name.clone(),
                target: target_path,
                join,
            },
            RelationshipKind::HasMany => ClassOp::HasMany {
                name: accessor.name.clone(),
                target: target_path,
                join,
            },
        };
        self.ops.push(op);
        self.relationships.push(accessor);
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    pub fn has_accessor(&self, name: &str) -> bool {
        self.relationships.iter().any(|r| r.name == name)
    }

    /// Get an accessor by name.
    pub fn accessor(&self, name: &str) -> Option<&RelationshipAccessor> {
        self.relationships.iter().find(|r| r.name == name)
    }

    /// Accessors of one kind, in insertion order.
    pub fn accessors(&self, kind: RelationshipKind) -> impl Iterator<Item = &RelationshipAccessor> {
        self.relationships.iter().filter(move |r| r.kind == kind)
    }

    /// Move this class to another namespace, rewriting recorded targets.
    pub(crate) fn rebind(&mut self, namespace: &str) {
        for op in &mut self.ops {
            op.rebind(&self.namespace, namespace);
        }
        self.namespace = namespace.to_string();
    }
}
