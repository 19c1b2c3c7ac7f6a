//! The on-disk repository store.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, info};

use lvcs_types::{
    Branch, Commit, ContentDescriptor, ContentHasher, Header, ObjectId, Stage, VersionNode,
};

use crate::error::{StoreError, StoreResult};
use crate::layout::RepositoryLayout;
use crate::record::{self, Record, RecordKind};
use crate::traits::RecordStore;
use crate::workdir;

/// Values written by [`FileStore::init_repository`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RepositorySeed {
    /// Name of the branch created at the root version.
    pub initial_branch: String,
    /// Author stored in the initial header.
    pub author: String,
    pub initial_commit_message: String,
    pub initial_commit_author: String,
}

impl Default for RepositorySeed {
    fn default() -> Self {
        Self {
            initial_branch: "master".into(),
            author: "Unknown".into(),
            initial_commit_message: "Initial commit".into(),
            initial_commit_author: "lVCS".into(),
        }
    }
}

/// Repository store backed by the metadata directory of a working copy.
///
/// Immutable records go to `versions/`, `descriptors/` and `commits/` under
/// their content keys; blobs go to `files/` as raw bytes. Branches, the
/// header and the stage are overwritten in place. Every file is written to
/// a temporary sibling first and renamed over its final name.
#[derive(Clone, Debug)]
pub struct FileStore {
    layout: RepositoryLayout,
}

impl FileStore {
    pub fn new(layout: RepositoryLayout) -> Self {
        Self { layout }
    }

    /// Store for `workdir` using the default metadata directory name.
    pub fn open(workdir: impl Into<PathBuf>) -> Self {
        Self::new(RepositoryLayout::with_default_metadata(workdir))
    }

    pub fn layout(&self) -> &RepositoryLayout {
        &self.layout
    }

    /// Returns `true` once `init_repository` has created the metadata directory.
    pub fn is_initialized(&self) -> bool {
        self.layout.metadata_dir().is_dir()
    }

    pub fn ensure_initialized(&self) -> StoreResult<()> {
        if self.is_initialized() {
            Ok(())
        } else {
            Err(self.not_initialized())
        }
    }

    /// Create the metadata layout and seed it with an empty descriptor, the
    /// initial commit, the root version node, the initial branch, a header
    /// and an empty stage.
    ///
    /// Returns the key of the root version node.
    pub fn init_repository(&self, seed: &RepositorySeed) -> StoreResult<ObjectId> {
        let metadata = self.layout.metadata_dir();
        if metadata.exists() {
            return Err(StoreError::RecreatingRepository { path: metadata });
        }
        for dir in self.layout.namespace_dirs() {
            fs::create_dir_all(dir)?;
        }

        let descriptor = self.add(&ContentDescriptor::empty())?;
        let commit = self.add(&Commit::new(
            descriptor,
            seed.initial_commit_message.clone(),
            seed.initial_commit_author.clone(),
        ))?;
        let root = self.add(&VersionNode::root(commit))?;

        self.put_branch(&Branch::new(seed.initial_branch.clone(), root))?;
        self.put_header(&Header::new(seed.author.clone(), seed.initial_branch.clone()))?;
        self.put_stage(&Stage::empty())?;

        info!(
            path = %metadata.display(),
            branch = %seed.initial_branch,
            root = %root.short_hex(),
            "initialized repository"
        );
        Ok(root)
    }

    /// Delete the metadata directory, leaving the working files alone.
    pub fn uninstall_repository(&self) -> StoreResult<()> {
        self.ensure_initialized()?;
        let metadata = self.layout.metadata_dir();
        fs::remove_dir_all(&metadata)?;
        info!(path = %metadata.display(), "uninstalled repository");
        Ok(())
    }

    // -- paths and working copy --------------------------------------------

    /// See [`RepositoryLayout::normalize_path`].
    pub fn normalize_path(&self, path: &Path) -> StoreResult<String> {
        self.layout.normalize_path(path)
    }

    pub fn list_working_files(&self) -> StoreResult<Vec<String>> {
        workdir::list_working_files(&self.layout)
    }

    pub fn remove_working_file(&self, repo_path: &str) -> StoreResult<()> {
        workdir::remove_working_file(&self.layout, repo_path)
    }

    pub fn clear_working_copy(&self) -> StoreResult<()> {
        workdir::clear_working_copy(&self.layout)
    }

    // -- blobs -------------------------------------------------------------

    /// Copy the working file at `repo_path` into the blob store.
    ///
    /// Identical contents are stored once; the returned key is the same for
    /// every file with these bytes.
    pub fn add_blob(&self, repo_path: &str) -> StoreResult<ObjectId> {
        let source = self.layout.working_path(repo_path);
        if !source.is_file() {
            return Err(StoreError::NonexistentFileAddition {
                path: repo_path.to_string(),
            });
        }
        let blobs = self.layout.blobs_dir();
        if !blobs.is_dir() {
            return Err(self.not_initialized());
        }

        let data = fs::read(&source)?;
        let key = ContentHasher::BLOB.hash(&data);
        let target = self.layout.blob_path(&key);
        if target.exists() {
            debug!(path = repo_path, blob = %key.short_hex(), "blob already stored");
        } else {
            write_atomic(&blobs, &target, &data)?;
            debug!(path = repo_path, blob = %key.short_hex(), bytes = data.len(), "stored blob");
        }
        Ok(key)
    }

    pub fn has_blob(&self, key: &ObjectId) -> StoreResult<bool> {
        self.ensure_initialized()?;
        Ok(self.layout.blob_path(key).is_file())
    }

    pub fn read_blob(&self, key: &ObjectId) -> StoreResult<Vec<u8>> {
        self.read_file(&self.layout.blob_path(key))
    }

    /// Blob key the working file would get, or `None` if it does not exist.
    pub fn hash_working_file(&self, repo_path: &str) -> StoreResult<Option<ObjectId>> {
        let path = self.layout.working_path(repo_path);
        if !path.is_file() {
            return Ok(None);
        }
        let data = fs::read(&path)?;
        Ok(Some(ContentHasher::BLOB.hash(&data)))
    }

    /// Write the blob `key` to `repo_path`, creating parent directories and
    /// replacing whatever is there.
    pub fn restore_file(&self, key: &ObjectId, repo_path: &str) -> StoreResult<()> {
        let data = self.read_blob(key)?;
        let target = self.layout.working_path(repo_path);
        let root = self.layout.workdir();
        let parent = target.parent().unwrap_or(root);
        // A file standing where a directory of the target belongs is replaced.
        let blocking: Vec<&Path> = parent
            .ancestors()
            .take_while(|dir| *dir != root && dir.starts_with(root))
            .filter(|dir| dir.is_file())
            .collect();
        for file in blocking {
            fs::remove_file(file)?;
        }
        fs::create_dir_all(parent)?;
        if target.is_dir() {
            fs::remove_dir_all(&target)?;
        }
        write_atomic(parent, &target, &data)?;
        debug!(path = repo_path, blob = %key.short_hex(), "restored working file");
        Ok(())
    }

    // -- branches ----------------------------------------------------------

    pub fn has_branch(&self, name: &str) -> StoreResult<bool> {
        self.ensure_initialized()?;
        Ok(self.layout.branch_path(name).is_file())
    }

    pub fn get_branch(&self, name: &str) -> StoreResult<Branch> {
        self.ensure_initialized()?;
        self.read_record(&self.layout.branch_path(name))
    }

    pub fn put_branch(&self, branch: &Branch) -> StoreResult<()> {
        self.ensure_initialized()?;
        let path = self.layout.branch_path(&branch.name);
        self.write_record(&self.layout.branches_dir(), &path, branch)?;
        debug!(branch = %branch.name, tip = %branch.tip.short_hex(), "wrote branch");
        Ok(())
    }

    pub fn remove_branch(&self, name: &str) -> StoreResult<()> {
        self.ensure_initialized()?;
        let path = self.layout.branch_path(name);
        if !path.is_file() {
            return Err(StoreError::LostFile { path });
        }
        fs::remove_file(&path)?;
        debug!(branch = name, "removed branch");
        Ok(())
    }

    /// Names of all branches, sorted.
    pub fn list_branches(&self) -> StoreResult<Vec<String>> {
        self.ensure_initialized()?;
        let mut names = Vec::new();
        for entry in fs::read_dir(self.layout.branches_dir())? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            // in-flight temporary files
            if name.starts_with('.') {
                continue;
            }
            names.push(name);
        }
        names.sort();
        Ok(names)
    }

    // -- header and stage --------------------------------------------------

    pub fn get_header(&self) -> StoreResult<Header> {
        self.ensure_initialized()?;
        self.read_record(&self.layout.header_path())
    }

    pub fn put_header(&self, header: &Header) -> StoreResult<()> {
        self.ensure_initialized()?;
        self.write_record(&self.layout.metadata_dir(), &self.layout.header_path(), header)
    }

    pub fn get_stage(&self) -> StoreResult<Stage> {
        self.ensure_initialized()?;
        self.read_record(&self.layout.stage_path())
    }

    pub fn put_stage(&self, stage: &Stage) -> StoreResult<()> {
        self.ensure_initialized()?;
        self.write_record(&self.layout.metadata_dir(), &self.layout.stage_path(), stage)
    }

    // -- helpers -----------------------------------------------------------

    fn not_initialized(&self) -> StoreError {
        StoreError::RepositoryNotInitialized {
            path: self.layout.metadata_dir(),
        }
    }

    fn read_file(&self, path: &Path) -> StoreResult<Vec<u8>> {
        match fs::read(path) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                if self.is_initialized() {
                    Err(StoreError::LostFile {
                        path: path.to_path_buf(),
                    })
                } else {
                    Err(self.not_initialized())
                }
            }
            Err(e) => Err(e.into()),
        }
    }

    fn read_record<R: Record>(&self, path: &Path) -> StoreResult<R> {
        let bytes = self.read_file(path)?;
        record::decode(&bytes, path)
    }

    fn write_record<R: Record>(&self, dir: &Path, path: &Path, value: &R) -> StoreResult<()> {
        let bytes = record::encode(value)?;
        write_atomic(dir, path, &bytes)
    }
}

impl RecordStore for FileStore {
    fn put_raw(&self, kind: RecordKind, key: &ObjectId, envelope: &[u8]) -> StoreResult<()> {
        let dir = self.layout.namespace_dir(kind);
        if !dir.is_dir() {
            return Err(self.not_initialized());
        }
        let path = self.layout.record_path(kind, key);
        if path.exists() {
            return Ok(());
        }
        write_atomic(&dir, &path, envelope)?;
        debug!(kind = %kind, key = %key.short_hex(), "wrote record");
        Ok(())
    }

    fn get_raw(&self, kind: RecordKind, key: &ObjectId) -> StoreResult<Vec<u8>> {
        self.read_file(&self.layout.record_path(kind, key))
    }

    fn contains(&self, kind: RecordKind, key: &ObjectId) -> StoreResult<bool> {
        Ok(self.layout.record_path(kind, key).is_file())
    }
}

/// Write `data` to a temporary file in `dir`, then rename it over `target`.
fn write_atomic(dir: &Path, target: &Path, data: &[u8]) -> StoreResult<()> {
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(data)?;
    tmp.as_file().sync_all()?;
    tmp.persist(target).map_err(|e| StoreError::Io(e.error))?;
    Ok(())
}
