//! Working-copy file operations.

use std::fs;
use std::io;
use std::path::Path;

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::{StoreError, StoreResult};
use crate::layout::RepositoryLayout;

/// Every regular file of the working copy, as sorted repository paths.
///
/// The metadata directory is skipped entirely. Files whose path is not
/// valid UTF-8 cannot be named by a repository path and are skipped with a
/// warning.
pub fn list_working_files(layout: &RepositoryLayout) -> StoreResult<Vec<String>> {
    let root = layout.workdir();
    let metadata = layout.metadata_name();
    let walker = WalkDir::new(root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !(entry.depth() == 1 && entry.file_name() == metadata));

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry.map_err(io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        match to_repo_path(relative) {
            Some(path) => files.push(path),
            None => warn!(path = %relative.display(), "skipping non UTF-8 working file"),
        }
    }
    files.sort();
    Ok(files)
}

/// Delete one working file and prune directories it leaves empty.
///
/// Pruning stops at the working-copy root, which is never removed.
pub fn remove_working_file(layout: &RepositoryLayout, repo_path: &str) -> StoreResult<()> {
    let path = layout.working_path(repo_path);
    if !path.is_file() {
        return Err(StoreError::NonexistentFileDeletion {
            path: repo_path.to_string(),
        });
    }
    fs::remove_file(&path)?;
    debug!(path = repo_path, "removed working file");
    prune_empty_parents(layout.workdir(), &path)?;
    Ok(())
}

/// Delete everything in the working copy except the metadata directory.
pub fn clear_working_copy(layout: &RepositoryLayout) -> StoreResult<()> {
    for entry in fs::read_dir(layout.workdir())? {
        let entry = entry?;
        if entry.file_name() == layout.metadata_name() {
            continue;
        }
        if entry.file_type()?.is_dir() {
            fs::remove_dir_all(entry.path())?;
        } else {
            fs::remove_file(entry.path())?;
        }
    }
    debug!(workdir = %layout.workdir().display(), "cleared working copy");
    Ok(())
}

fn prune_empty_parents(root: &Path, removed: &Path) -> StoreResult<()> {
    let mut current = removed.parent();
    while let Some(dir) = current {
        if dir == root || !dir.starts_with(root) {
            break;
        }
        if fs::read_dir(dir)?.next().is_some() {
            break;
        }
        fs::remove_dir(dir)?;
        current = dir.parent();
    }
    Ok(())
}

fn to_repo_path(relative: &Path) -> Option<String> {
    let parts = relative
        .components()
        .map(|c| c.as_os_str().to_str())
        .collect::<Option<Vec<_>>>()?;
    Some(parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (tempfile::TempDir, RepositoryLayout) {
        let dir = tempfile::tempdir().unwrap();
        let layout = RepositoryLayout::with_default_metadata(dir.path());
        fs::create_dir_all(layout.metadata_dir().join("files")).unwrap();
        fs::write(layout.metadata_dir().join("header"), b"h").unwrap();
        (dir, layout)
    }

    fn write(layout: &RepositoryLayout, repo_path: &str, data: &[u8]) {
        let path = layout.working_path(repo_path);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, data).unwrap();
    }

    #[test]
    fn listing_skips_metadata_and_sorts() {
        let (_dir, layout) = setup();
        write(&layout, "b.txt", b"b");
        write(&layout, "a/z.txt", b"z");
        write(&layout, "a/b/c.txt", b"c");
        let files = list_working_files(&layout).unwrap();
        assert_eq!(files, vec!["a/b/c.txt", "a/z.txt", "b.txt"]);
    }

    #[test]
    fn removing_last_file_prunes_directories() {
        let (_dir, layout) = setup();
        write(&layout, "x/y/z.txt", b"z");
        write(&layout, "x/keep.txt", b"k");
        remove_working_file(&layout, "x/y/z.txt").unwrap();
        assert!(!layout.working_path("x/y").exists());
        assert!(layout.working_path("x/keep.txt").exists());

        remove_working_file(&layout, "x/keep.txt").unwrap();
        assert!(!layout.working_path("x").exists());
        assert!(layout.workdir().exists());
    }

    #[test]
    fn removing_missing_file_fails() {
        let (_dir, layout) = setup();
        let err = remove_working_file(&layout, "ghost.txt").unwrap_err();
        assert!(matches!(err, StoreError::NonexistentFileDeletion { .. }));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn listing_skips_non_utf8_names() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let (_dir, layout) = setup();
        let bad = layout.workdir().join(OsStr::from_bytes(b"bad\xffname"));
        fs::write(&bad, b"x").unwrap();
        write(&layout, "stray.txt", b"s");

        let files = list_working_files(&layout).unwrap();
        assert_eq!(files, vec!["stray.txt"]);
        for path in &files {
            remove_working_file(&layout, path).unwrap();
        }
        assert!(bad.exists());
    }

    #[test]
    fn clearing_keeps_metadata() {
        let (_dir, layout) = setup();
        write(&layout, "a.txt", b"a");
        write(&layout, "d/e.txt", b"e");
        clear_working_copy(&layout).unwrap();
        assert!(list_working_files(&layout).unwrap().is_empty());
        assert!(layout.metadata_dir().join("header").exists());
    }
}
