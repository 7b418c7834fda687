//! Non-fatal conditions collected during a run.

use std::fmt;

/// A reportable condition that does not abort the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// The catalog enumeration returned nothing.
    NoTablesFound,
    /// Every table was filtered out by `constraint` / `exclude`.
    AllTablesExcluded,
    /// A selected table has no primary key.
    NoPrimaryKey {
        /// The key-less table.
        table: String,
    },
    /// A deprecated configuration option was used.
    DeprecatedOption {
        /// The deprecated key.
        option: String,
        /// The option that replaces it.
        replacement: String,
    },
    /// A foreign key points at a table with no primary key and names no remote columns.
    UnjoinableForeignKey {
        /// Referencing table.
        table: String,
        /// Referenced table.
        remote_table: String,
    },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::NoTablesFound => write!(f, "no tables found in catalog"),
            Warning::AllTablesExcluded => {
                write!(f, "all tables excluded by constraint/exclude patterns")
            }
            Warning::NoPrimaryKey { table } => write!(f, "table `{table}` has no primary key"),
            Warning::DeprecatedOption {
                option,
                replacement,
            } => write!(f, "option `{option}` is deprecated, use `{replacement}`"),
            Warning::UnjoinableForeignKey {
                table,
                remote_table,
            } => write!(
                f,
                "foreign key from `{table}` to `{remote_table}` skipped: remote table has no primary key"
            ),
        }
    }
}

/// Ordered collection of warnings for one run.
#[derive(Debug, Default, Clone)]
pub struct Warnings {
    items: Vec<Warning>,
}

impl Warnings {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a warning and log it.
    pub fn push(&mut self, warning: Warning) {
        tracing::warn!("{}", warning);
        self.items.push(warning);
    }

    /// Append every warning from another collection.
    pub fn extend(&mut self, other: Warnings) {
        self.items.extend(other.items);
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Warning> {
        self.items.iter()
    }

    /// Check whether a warning equal to `warning` was recorded.
    pub fn contains(&self, warning: &Warning) -> bool {
        self.items.contains(warning)
    }

    pub fn into_vec(self) -> Vec<Warning> {
        self.items
    }
}
