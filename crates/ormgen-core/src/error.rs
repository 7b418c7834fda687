//! Core error types.

use std::path::PathBuf;
use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort a loader run.
///
/// Anything recoverable is reported as a [`crate::Warning`] instead.
#[derive(Debug, Error)]
pub enum Error {
    /// The catalog driver failed.
    #[error("catalog driver error: {message}")]
    Driver {
        /// Table being inspected, if any.
        table: Option<String>,
        /// Driver supplied message.
        message: String,
    },

    /// The driver does not implement a capability the loader needs.
    #[error("catalog driver does not support `{0}`")]
    MissingCapability(&'static str),

    /// A selected table could not report its columns.
    #[error("table `{table}` has no columns: {reason}")]
    MissingColumns {
        /// The offending table.
        table: String,
        /// Why the columns are missing.
        reason: String,
    },

    /// Two tables map to the same moniker.
    #[error("tables `{first}` and `{second}` both map to moniker `{moniker}`")]
    MonikerClash {
        /// The contested moniker.
        moniker: String,
        /// Table that claimed it first.
        first: String,
        /// Table that clashed.
        second: String,
    },

    /// A moniker is not a `::` separated list of identifiers.
    #[error("table `{table}` maps to invalid moniker `{moniker}`")]
    InvalidMoniker {
        /// The offending table.
        table: String,
        /// The rejected moniker.
        moniker: String,
    },

    /// Two classes would be written to the same artifact.
    #[error("classes `{first}` and `{second}` would both be written to {}", path.display())]
    ArtifactClash {
        /// Artifact path relative to the dump directory.
        path: PathBuf,
        /// Class registered first.
        first: String,
        /// Class that clashed.
        second: String,
    },

    /// Local and remote column lists of a foreign key differ in length.
    #[error(
        "foreign key on `{table}` has {local} local column(s) but {remote} remote column(s) on `{remote_table}`"
    )]
    ForeignKeyArity {
        /// Referencing table.
        table: String,
        /// Referenced table.
        remote_table: String,
        /// Number of local columns.
        local: usize,
        /// Number of remote columns.
        remote: usize,
    },

    /// A dump target already exists.
    #[error("{} already exists, aborting dump", path.display())]
    DumpCollision {
        /// Existing artifact.
        path: PathBuf,
    },

    /// The generated region of an existing artifact was edited by hand.
    #[error("generated region of {} was modified since the last dump, refusing to overwrite", path.display())]
    ModifiedGeneratedRegion {
        /// Modified artifact.
        path: PathBuf,
    },

    /// An extension file exists but could not be read.
    #[error("failed to load extension {}: {source}", path.display())]
    Extension {
        /// Extension path.
        path: PathBuf,
        /// Underlying failure.
        #[source]
        source: std::io::Error,
    },

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Invalid table filter pattern.
    #[error("invalid table pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// Snapshot or config decoding failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// SQLite error.
    #[cfg(feature = "sqlite")]
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

impl Error {
    /// Create a driver error scoped to a table.
    pub fn driver(table: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Driver {
            table: Some(table.into()),
            message: message.into(),
        }
    }

    /// Table the error refers to, if it names one.
    pub fn table(&self) -> Option<&str> {
        match self {
            Error::Driver { table, .. } => table.as_deref(),
            Error::MissingColumns { table, .. }
            | Error::InvalidMoniker { table, .. }
            | Error::ForeignKeyArity { table, .. } => Some(table),
            _ => None,
        }
    }
}
