//! Where everything lives on disk.
//!
//! ```text
//! <workdir>/
//!   <metadata>/          default ".liteVCS"
//!     versions/<hex>     version node envelopes
//!     descriptors/<hex>  content descriptor envelopes
//!     commits/<hex>      commit envelopes
//!     files/<hex>        raw blob bytes
//!     branches/<name>    branch envelopes
//!     header             header envelope
//!     stage              stage envelope
//! ```

use std::path::{Component, Path, PathBuf};

use lvcs_types::ObjectId;

use crate::error::{StoreError, StoreResult};
use crate::record::RecordKind;

/// Default name of the metadata directory inside the working copy.
pub const DEFAULT_METADATA_DIR: &str = ".liteVCS";

const BLOBS_DIR: &str = "files";

/// Resolved paths of one repository.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RepositoryLayout {
    workdir: PathBuf,
    metadata_name: String,
}

impl RepositoryLayout {
    pub fn new(workdir: impl Into<PathBuf>, metadata_name: impl Into<String>) -> Self {
        Self {
            workdir: workdir.into(),
            metadata_name: metadata_name.into(),
        }
    }

    /// Layout with the default metadata directory name.
    pub fn with_default_metadata(workdir: impl Into<PathBuf>) -> Self {
        Self::new(workdir, DEFAULT_METADATA_DIR)
    }

    /// Root of the working copy.
    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// Name of the metadata directory, relative to the working copy.
    pub fn metadata_name(&self) -> &str {
        &self.metadata_name
    }

    pub fn metadata_dir(&self) -> PathBuf {
        self.workdir.join(&self.metadata_name)
    }

    /// Directories created by `init`, in creation order.
    pub fn namespace_dirs(&self) -> Vec<PathBuf> {
        [
            RecordKind::Version.namespace(),
            RecordKind::Descriptor.namespace(),
            RecordKind::Commit.namespace(),
            BLOBS_DIR,
            RecordKind::Branch.namespace(),
        ]
        .iter()
        .map(|name| self.metadata_dir().join(name))
        .collect()
    }

    /// Directory holding records of `kind`. For singletons this is the
    /// metadata root itself.
    pub fn namespace_dir(&self, kind: RecordKind) -> PathBuf {
        match kind {
            RecordKind::Header | RecordKind::Stage => self.metadata_dir(),
            other => self.metadata_dir().join(other.namespace()),
        }
    }

    /// File of the immutable record `kind`/`key`.
    pub fn record_path(&self, kind: RecordKind, key: &ObjectId) -> PathBuf {
        self.namespace_dir(kind).join(key.to_hex())
    }

    pub fn blobs_dir(&self) -> PathBuf {
        self.metadata_dir().join(BLOBS_DIR)
    }

    pub fn blob_path(&self, key: &ObjectId) -> PathBuf {
        self.blobs_dir().join(key.to_hex())
    }

    pub fn branches_dir(&self) -> PathBuf {
        self.namespace_dir(RecordKind::Branch)
    }

    pub fn branch_path(&self, name: &str) -> PathBuf {
        self.branches_dir().join(name)
    }

    pub fn header_path(&self) -> PathBuf {
        self.metadata_dir().join(RecordKind::Header.namespace())
    }

    pub fn stage_path(&self) -> PathBuf {
        self.metadata_dir().join(RecordKind::Stage.namespace())
    }

    /// Absolute location of a normalized repository path.
    pub fn working_path(&self, repo_path: &str) -> PathBuf {
        repo_path
            .split('/')
            .fold(self.workdir.clone(), |acc, part| acc.join(part))
    }

    /// Turn a user-supplied path into the forward-slash, workdir-relative form
    /// used as a descriptor key.
    ///
    /// Relative paths are taken relative to the working copy. Absolute paths
    /// must lie inside it. `.` and `..` are resolved lexically. Paths that
    /// escape the working copy, name its root, or point into the metadata
    /// directory are rejected with [`StoreError::OutsideWorkingCopy`].
    pub fn normalize_path(&self, path: &Path) -> StoreResult<String> {
        let outside = || StoreError::OutsideWorkingCopy {
            path: path.display().to_string(),
        };

        let relative = if path.is_absolute() {
            path.strip_prefix(&self.workdir).map_err(|_| outside())?
        } else {
            path
        };

        let mut parts: Vec<String> = Vec::new();
        for component in relative.components() {
            match component {
                Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
                Component::CurDir => {}
                Component::ParentDir => {
                    parts.pop().ok_or_else(outside)?;
                }
                Component::RootDir | Component::Prefix(_) => return Err(outside()),
            }
        }

        match parts.first() {
            None => Err(outside()),
            Some(first) if *first == self.metadata_name => Err(outside()),
            Some(_) => Ok(parts.join("/")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> RepositoryLayout {
        RepositoryLayout::with_default_metadata("/work")
    }

    #[test]
    fn record_paths_are_namespaced() {
        let l = layout();
        let key = ObjectId::from_hash([0xab; 32]);
        let path = l.record_path(RecordKind::Commit, &key);
        assert_eq!(path, PathBuf::from("/work/.liteVCS/commits").join(key.to_hex()));
        assert_eq!(l.branch_path("dev"), PathBuf::from("/work/.liteVCS/branches/dev"));
        assert_eq!(l.header_path(), PathBuf::from("/work/.liteVCS/header"));
        assert_eq!(l.stage_path(), PathBuf::from("/work/.liteVCS/stage"));
        assert_eq!(l.namespace_dir(RecordKind::Stage), l.metadata_dir());
    }

    #[test]
    fn relative_paths_normalize() {
        let l = layout();
        assert_eq!(l.normalize_path(Path::new("a.txt")).unwrap(), "a.txt");
        assert_eq!(l.normalize_path(Path::new("./dir/b.txt")).unwrap(), "dir/b.txt");
        assert_eq!(l.normalize_path(Path::new("dir/../c.txt")).unwrap(), "c.txt");
    }

    #[test]
    fn absolute_paths_inside_workdir_normalize() {
        let l = layout();
        assert_eq!(
            l.normalize_path(Path::new("/work/dir/x.txt")).unwrap(),
            "dir/x.txt"
        );
    }

    #[test]
    fn escaping_paths_are_rejected() {
        let l = layout();
        for bad in ["../x", "/elsewhere/x", ".", "", "dir/../../x"] {
            assert!(
                matches!(
                    l.normalize_path(Path::new(bad)),
                    Err(StoreError::OutsideWorkingCopy { .. })
                ),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn metadata_paths_are_rejected() {
        let l = layout();
        assert!(l.normalize_path(Path::new(".liteVCS/header")).is_err());
        assert!(l.normalize_path(Path::new("/work/.liteVCS")).is_err());
    }

    #[test]
    fn working_path_joins_components() {
        let l = layout();
        assert_eq!(l.working_path("a/b/c.txt"), PathBuf::from("/work/a/b/c.txt"));
    }
}
