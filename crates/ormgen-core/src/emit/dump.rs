//! Writing artifacts to a dump directory.

use super::render::{render_all, split_marker, GeneratedFile, DEFAULT_CUSTOM};
use super::Emitter;
use crate::error::{Error, Result};
use crate::schema::SchemaRegistry;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// What to do when an artifact already exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DumpPolicy {
    /// Abort before writing anything.
    #[default]
    Refuse,
    /// Delete and rewrite.
    Erase,
    /// Rewrite the generated region, keep everything below the marker.
    Merge,
}

/// Outcome of a dump.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DumpReport {
    /// Files written, in write order.
    pub written: Vec<PathBuf>,
    /// Existing files deleted before rewrite.
    pub deleted: Vec<PathBuf>,
    /// Merged files whose content did not change.
    pub unchanged: Vec<PathBuf>,
}

enum Action {
    Create(String),
    Replace(String),
    Merge(String),
    Unchanged,
}

/// Writes one artifact per class, plus the schema artifact, under a directory.
///
/// Every target is checked before the first write, so a refused dump leaves
/// the directory untouched.
#[derive(Debug, Clone)]
pub struct DumpEmitter {
    dir: PathBuf,
    policy: DumpPolicy,
}

impl DumpEmitter {
    pub fn new(dir: impl Into<PathBuf>, policy: DumpPolicy) -> Self {
        Self {
            dir: dir.into(),
            policy,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn plan(&self, file: &GeneratedFile, path: &Path) -> Result<Action> {
        if !path.exists() {
            return Ok(Action::Create(file.contents(DEFAULT_CUSTOM)));
        }

        match self.policy {
            DumpPolicy::Refuse => Err(Error::DumpCollision {
                path: path.to_path_buf(),
            }),
            DumpPolicy::Erase => Ok(Action::Replace(file.contents(DEFAULT_CUSTOM))),
            DumpPolicy::Merge => {
                let existing = fs::read_to_string(path)?;
                let Some(split) = split_marker(&existing) else {
                    return Err(Error::DumpCollision {
                        path: path.to_path_buf(),
                    });
                };
                if !split.is_intact() {
                    return Err(Error::ModifiedGeneratedRegion {
                        path: path.to_path_buf(),
                    });
                }
                let merged = file.contents(split.custom);
                if merged == existing {
                    Ok(Action::Unchanged)
                } else {
                    Ok(Action::Merge(merged))
                }
            }
        }
    }
}

fn write(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)?;
    Ok(())
}

impl Emitter for DumpEmitter {
    type Output = DumpReport;

    fn emit(&mut self, registry: &SchemaRegistry) -> Result<DumpReport> {
        let files = render_all(registry);

        let mut planned = Vec::with_capacity(files.len());
        for file in &files {
            let path = self.dir.join(&file.path);
            let action = self.plan(file, &path)?;
            planned.push((path, action));
        }

        let mut report = DumpReport::default();
        for (path, action) in planned {
            match action {
                Action::Create(contents) | Action::Merge(contents) => {
                    write(&path, &contents)?;
                    info!(path = %path.display(), "dumped");
                    report.written.push(path);
                }
                Action::Replace(contents) => {
                    warn!(
                        "Deleting existing file '{}' due to 'really_erase_my_files' setting",
                        path.display()
                    );
                    fs::remove_file(&path)?;
                    report.deleted.push(path.clone());
                    write(&path, &contents)?;
                    info!(path = %path.display(), "dumped");
                    report.written.push(path);
                }
                Action::Unchanged => {
                    debug!(path = %path.display(), "unchanged");
                    report.unchanged.push(path);
                }
            }
        }

        info!(
            dir = %self.dir.display(),
            written = report.written.len(),
            deleted = report.deleted.len(),
            unchanged = report.unchanged.len(),
            "dump complete"
        );
        Ok(report)
    }
}
