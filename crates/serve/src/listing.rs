// crates/serve/src/listing.rs

use crate::Error;
use std::fs;
use std::path::Path;

/// Lists the entry names under a template-sets root.
#[cfg_attr(test, mockall::automock)]
pub trait TemplateSetSource: Send + Sync {
    fn list(&self, root: &Path) -> Result<Vec<String>, Error>;
}

/// Reads entry names straight from the filesystem.
///
/// Every entry counts, not only directories; entries whose names are not
/// valid UTF-8 cannot be addressed by a request path and are skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsTemplateSetSource;

impl TemplateSetSource for FsTemplateSetSource {
    #[tracing::instrument(skip_all, fields(root = %root.display()))]
    fn list(&self, root: &Path) -> Result<Vec<String>, Error> {
        let entries = fs::read_dir(root).map_err(|e| Error::unreadable(root, e))?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| Error::unreadable(root, e))?;
            if let Ok(name) = entry.file_name().into_string() {
                names.push(name);
            }
        }
        names.sort();

        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn lists_directories_and_files_sorted() {
        let tmp = tempdir().unwrap();
        fs::create_dir(tmp.path().join("client-b")).unwrap();
        fs::create_dir(tmp.path().join("client-a")).unwrap();
        fs::write(tmp.path().join("README"), "x").unwrap();

        let names = FsTemplateSetSource.list(tmp.path()).unwrap();
        assert_eq!(names, vec!["README", "client-a", "client-b"]);
    }

    #[test]
    fn empty_root_lists_nothing() {
        let tmp = tempdir().unwrap();
        assert!(FsTemplateSetSource.list(tmp.path()).unwrap().is_empty());
    }

    #[test]
    fn missing_root_is_unreadable() {
        let tmp = tempdir().unwrap();
        let missing = tmp.path().join("nope");

        match FsTemplateSetSource.list(&missing) {
            Err(Error::DirectoryUnreadable { path, .. }) => assert_eq!(path, missing),
            other => panic!("expected DirectoryUnreadable, got {other:?}"),
        }
    }
}
