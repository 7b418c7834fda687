//! Lookup of hand-written per-class extensions.
//!
//! An extension is an existing source file for a class, found outside the
//! dump directory. Its contents are carried into the dumped artifact.

use crate::emit::layout;
use crate::error::{Error, Result};
use crate::schema::ClassDescriptor;
use std::io::ErrorKind;
use std::path::PathBuf;

/// Loaded extension source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extension {
    /// Where it was found.
    pub path: PathBuf,
    pub content: String,
}

/// Finds the extension for a class.
///
/// Absence is `Ok(None)`; any other failure is an error.
pub trait ExtensionLookup {
    fn find(&self, class: &ClassDescriptor) -> Result<Option<Extension>>;
}

/// Lookup that never finds anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoExtensions;

impl ExtensionLookup for NoExtensions {
    fn find(&self, _class: &ClassDescriptor) -> Result<Option<Extension>> {
        Ok(None)
    }
}

/// Searches directories, in order, for the class's dump-relative path.
#[derive(Debug, Clone, Default)]
pub struct DirExtensionLookup {
    dirs: Vec<PathBuf>,
}

impl DirExtensionLookup {
    pub fn new(dirs: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        Self {
            dirs: dirs.into_iter().map(Into::into).collect(),
        }
    }
}

impl ExtensionLookup for DirExtensionLookup {
    fn find(&self, class: &ClassDescriptor) -> Result<Option<Extension>> {
        let relative = layout::class_file(&class.namespace, &class.moniker);
        for dir in &self.dirs {
            let path = dir.join(&relative);
            match std::fs::read_to_string(&path) {
                Ok(content) => return Ok(Some(Extension { path, content })),
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(source) => return Err(Error::Extension { path, source }),
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_extension_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let lookup = DirExtensionLookup::new([dir.path()]);
        let class = ClassDescriptor::new("Foo", "my_app::schema", "foo");

        assert!(lookup.find(&class).unwrap().is_none());
    }

    #[test]
    fn test_first_directory_wins() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        for (dir, text) in [(&first, "// first\n"), (&second, "// second\n")] {
            let path = dir.path().join("my_app/schema/luser_group.rs");
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(&path, text).unwrap();
        }

        let lookup = DirExtensionLookup::new([first.path(), second.path()]);
        let class = ClassDescriptor::new("LuserGroup", "my_app::schema", "luser_group");
        let found = lookup.find(&class).unwrap().unwrap();

        assert_eq!(found.content, "// first\n");
        assert!(found.path.starts_with(first.path()));
    }

    #[test]
    fn test_unreadable_extension_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the file should be cannot be read as text.
        std::fs::create_dir_all(dir.path().join("s/foo.rs")).unwrap();

        let lookup = DirExtensionLookup::new([dir.path()]);
        let class = ClassDescriptor::new("Foo", "s", "foo");

        assert!(matches!(
            lookup.find(&class),
            Err(Error::Extension { .. })
        ));
    }
}
