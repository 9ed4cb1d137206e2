//! Source file enumeration for a fetched repository tree.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Recursively collect all files under `root` with the given extension.
///
/// The traversal is read-only and the result is sorted, so repeated runs over
/// the same tree enumerate units in the same order. An empty result is not an
/// error; a missing or unreadable `root` is.
pub fn enumerate_sources(root: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    walk(root, extension, &mut found)?;
    found.sort();
    Ok(found)
}

fn walk(dir: &Path, extension: &str, found: &mut Vec<PathBuf>) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            // .git and friends hold no compilable sources.
            if path
                .file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.starts_with('.'))
                .unwrap_or(false)
            {
                continue;
            }
            walk(&path, extension, found)?;
        } else if file_type.is_file()
            && path.extension().and_then(|e| e.to_str()) == Some(extension)
        {
            found.push(path);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        File::create(path).unwrap();
    }

    #[test]
    fn test_enumerate_recursive_and_sorted() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("zeta.c"));
        touch(&dir.path().join("sub/alpha.c"));
        touch(&dir.path().join("sub/deep/beta.c"));
        touch(&dir.path().join("readme.md"));
        touch(&dir.path().join("header.h"));

        let sources = enumerate_sources(dir.path(), "c").unwrap();
        assert_eq!(sources.len(), 3);
        let names: Vec<_> = sources
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, vec!["alpha.c", "beta.c", "zeta.c"]);
    }

    #[test]
    fn test_enumerate_skips_hidden_dirs() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join(".git/hooks/sample.c"));
        touch(&dir.path().join("main.c"));

        let sources = enumerate_sources(dir.path(), "c").unwrap();
        assert_eq!(sources.len(), 1);
    }

    #[test]
    fn test_enumerate_empty_tree_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let sources = enumerate_sources(dir.path(), "c").unwrap();
        assert!(sources.is_empty());
    }

    #[test]
    fn test_enumerate_missing_root_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("does-not-exist");
        assert!(enumerate_sources(&missing, "c").is_err());
    }
}
