//! Replayable operation log.
//!
//! Every structural change made to a class is recorded as a [`ClassOp`].
//! The dump writer, the debug trace and live replay all consume this log,
//! so the three can never disagree about what a class contains.

use crate::emit::{ClassBuilder, SchemaSink};
use std::fmt;

/// One recorded mutation of a class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassOp {
    /// Bring extra modules into scope.
    UseClasses(Vec<String>),
    /// Compose mixins, highest precedence first.
    ApplyMixins(Vec<String>),
    LoadComponents(Vec<String>),
    LoadResultsetComponents(Vec<String>),
    /// Bind the class to its table.
    Table(String),
    AddColumns(Vec<String>),
    SetPrimaryKey(Vec<String>),
    AddUniqueConstraint {
        name: String,
        columns: Vec<String>,
    },
    /// To-one accessor on the referencing class.
    BelongsTo {
        name: String,
        /// Full path of the target class.
        target: String,
        /// `(self column, foreign column)` pairs.
        join: Vec<(String, String)>,
    },
    /// To-many accessor on the referenced class.
    HasMany {
        name: String,
        target: String,
        join: Vec<(String, String)>,
    },
}

fn strs(items: &[String]) -> Vec<&str> {
    items.iter().map(String::as_str).collect()
}

fn pairs(items: &[(String, String)]) -> Vec<(&str, &str)> {
    items.iter().map(|(a, b)| (a.as_str(), b.as_str())).collect()
}

struct List<'a>(&'a [String]);

impl fmt::Display for List<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("&[")?;
        for (i, item) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{item:?}")?;
        }
        f.write_str("]")
    }
}

struct Pairs<'a>(&'a [(String, String)]);

impl fmt::Display for Pairs<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("&[")?;
        for (i, (a, b)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "({a:?}, {b:?})")?;
        }
        f.write_str("]")
    }
}

impl ClassOp {
    /// Name of the builder method this operation calls.
    pub fn method(&self) -> &'static str {
        match self {
            ClassOp::UseClasses(_) => "use_classes",
            ClassOp::ApplyMixins(_) => "apply_mixins",
            ClassOp::LoadComponents(_) => "load_components",
            ClassOp::LoadResultsetComponents(_) => "load_resultset_components",
            ClassOp::Table(_) => "table",
            ClassOp::AddColumns(_) => "add_columns",
            ClassOp::SetPrimaryKey(_) => "set_primary_key",
            ClassOp::AddUniqueConstraint { .. } => "add_unique_constraint",
            ClassOp::BelongsTo { .. } => "belongs_to",
            ClassOp::HasMany { .. } => "has_many",
        }
    }

    /// Replay this operation against a live builder.
    pub fn apply(&self, builder: &mut dyn ClassBuilder) {
        match self {
            ClassOp::UseClasses(classes) => builder.use_classes(&strs(classes)),
            ClassOp::ApplyMixins(mixins) => builder.apply_mixins(&strs(mixins)),
            ClassOp::LoadComponents(c) => builder.load_components(&strs(c)),
            ClassOp::LoadResultsetComponents(c) => builder.load_resultset_components(&strs(c)),
            ClassOp::Table(table) => builder.table(table),
            ClassOp::AddColumns(columns) => builder.add_columns(&strs(columns)),
            ClassOp::SetPrimaryKey(columns) => builder.set_primary_key(&strs(columns)),
            ClassOp::AddUniqueConstraint { name, columns } => {
                builder.add_unique_constraint(name, &strs(columns))
            }
            ClassOp::BelongsTo { name, target, join } => {
                builder.belongs_to(name, target, &pairs(join))
            }
            ClassOp::HasMany { name, target, join } => builder.has_many(name, target, &pairs(join)),
        }
    }

    /// Move relationship targets from namespace `from` to namespace `to`.
    pub(crate) fn rebind(&mut self, from: &str, to: &str) {
        if let ClassOp::BelongsTo { target, .. } | ClassOp::HasMany { target, .. } = self {
            if let Some(rest) = target.strip_prefix(from).and_then(|r| r.strip_prefix("::")) {
                *target = format!("{to}::{rest}");
            }
        }
    }
}

/// Renders as a method call, e.g. `add_columns(&["id", "name"])`.
impl fmt::Display for ClassOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.method())?;
        match self {
            ClassOp::UseClasses(items)
            | ClassOp::ApplyMixins(items)
            | ClassOp::LoadComponents(items)
            | ClassOp::LoadResultsetComponents(items)
            | ClassOp::AddColumns(items)
            | ClassOp::SetPrimaryKey(items) => write!(f, "{}", List(items))?,
            ClassOp::Table(table) => write!(f, "{table:?}")?,
            ClassOp::AddUniqueConstraint { name, columns } => {
                write!(f, "{name:?}, {}", List(columns))?
            }
            ClassOp::BelongsTo { name, target, join } | ClassOp::HasMany { name, target, join } => {
                write!(f, "{name:?}, {target:?}, {}", Pairs(join))?
            }
        }
        f.write_str(")")
    }
}

/// One recorded schema-level operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaOp {
    /// Register a class; `module` is the dump module holding its definition.
    LoadClass { module: String, class_path: String },
}

impl SchemaOp {
    /// Replay against a live schema, feeding the class's own log.
    pub fn apply(&self, sink: &mut dyn SchemaSink, class_ops: &[ClassOp]) {
        match self {
            SchemaOp::LoadClass { class_path, .. } => {
                let builder = sink.load_class(class_path);
                for op in class_ops {
                    op.apply(builder);
                }
            }
        }
    }
}

impl fmt::Display for SchemaOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaOp::LoadClass { class_path, .. } => write!(f, "load_class({class_path:?})"),
        }
    }
}
