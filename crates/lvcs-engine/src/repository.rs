use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use lvcs_graph::{all_parents, create_version_node, lowest_common_ancestor};
use lvcs_store::{FileStore, RecordStore, RepositoryLayout};
use lvcs_types::{Branch, Commit, ContentDescriptor, Header, ObjectId, Stage, VersionNode};

use crate::config::VcsConfig;
use crate::error::{VcsError, VcsResult};
use crate::merge::{merge_descriptors, MergeOutcome};
use crate::status::{self, FileStatus, StageStatus};

/// One entry of [`LiteVcs::history`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistoryEntry {
    /// Key of the version node.
    pub version: ObjectId,
    pub commit: Commit,
}

/// A LiteVCS repository rooted at a working directory.
///
/// The handle itself holds no repository state: every operation reads the
/// header, branches and stage from the store and writes them back before
/// returning.
#[derive(Clone, Debug)]
pub struct LiteVcs {
    store: FileStore,
    config: VcsConfig,
}

impl LiteVcs {
    /// Repository in `workdir` with the default configuration.
    pub fn open(workdir: impl Into<PathBuf>) -> Self {
        Self::with_config(workdir, VcsConfig::default())
    }

    pub fn with_config(workdir: impl Into<PathBuf>, config: VcsConfig) -> Self {
        let layout = RepositoryLayout::new(workdir, config.metadata_dir.clone());
        Self {
            store: FileStore::new(layout),
            config,
        }
    }

    pub fn store(&self) -> &FileStore {
        &self.store
    }

    pub fn config(&self) -> &VcsConfig {
        &self.config
    }

    pub fn workdir(&self) -> &Path {
        self.store.layout().workdir()
    }

    // ---- Repository lifecycle ----

    /// Create an empty repository with one branch and the initial commit.
    pub fn init(&self) -> VcsResult<()> {
        let root = self.store.init_repository(&self.config.seed())?;
        info!(
            workdir = %self.workdir().display(),
            branch = %self.config.initial_branch,
            root = %root.short_hex(),
            "initialized LiteVCS repository"
        );
        Ok(())
    }

    /// Delete the repository metadata. Working files stay.
    pub fn uninstall(&self) -> VcsResult<()> {
        self.store.uninstall_repository()?;
        info!(workdir = %self.workdir().display(), "removed LiteVCS repository");
        Ok(())
    }

    /// Set the author recorded on subsequent commits.
    pub fn hello(&self, author: &str) -> VcsResult<()> {
        self.store.ensure_initialized()?;
        let header = self.store.get_header()?;
        self.store.put_header(&header.with_author(author))?;
        info!(author, "set author");
        Ok(())
    }

    // ---- Staging ----

    /// Store the file's contents and stage it for the next commit.
    pub fn add(&self, path: impl AsRef<Path>) -> VcsResult<ObjectId> {
        self.store.ensure_initialized()?;
        let path = self.store.normalize_path(path.as_ref())?;
        let blob = self.store.add_blob(&path)?;

        let mut stage = self.store.get_stage()?;
        stage.add_file(path.clone(), blob);
        self.store.put_stage(&stage)?;
        debug!(path = %path, blob = %blob.short_hex(), "staged file");
        Ok(blob)
    }

    /// Delete the working file and, if it is tracked, stage its removal.
    pub fn remove(&self, path: impl AsRef<Path>) -> VcsResult<()> {
        self.store.ensure_initialized()?;
        let path = self.store.normalize_path(path.as_ref())?;
        let last = self.last_descriptor()?;
        let mut stage = self.store.get_stage()?;
        self.store.remove_working_file(&path)?;

        let tracked = last.contains(&path) || stage.added_blob(&path).is_some();
        if tracked && !stage.is_removed(&path) {
            stage.remove_file(path.clone());
            self.store.put_stage(&stage)?;
            debug!(path = %path, "staged removal");
        }
        Ok(())
    }

    /// Restore the committed contents of `path` and drop anything staged
    /// for it.
    pub fn reset(&self, path: impl AsRef<Path>) -> VcsResult<()> {
        self.store.ensure_initialized()?;
        let path = self.store.normalize_path(path.as_ref())?;
        let last = self.last_descriptor()?;
        let blob = *last
            .get(&path)
            .ok_or_else(|| VcsError::UnobservedFile(path.clone()))?;

        self.store.restore_file(&blob, &path)?;
        let mut stage = self.store.get_stage()?;
        if stage.reset(&path) {
            self.store.put_stage(&stage)?;
        }
        debug!(path = %path, "reset file");
        Ok(())
    }

    /// Delete working files that are neither committed nor staged.
    ///
    /// Returns the deleted paths.
    pub fn clean(&self) -> VcsResult<Vec<String>> {
        self.store.ensure_initialized()?;
        let last = self.last_descriptor()?;
        let stage = self.store.get_stage()?;

        let mut removed = Vec::new();
        for path in self.store.list_working_files()? {
            if last.contains(&path) || stage.added_blob(&path).is_some() {
                continue;
            }
            self.store.remove_working_file(&path)?;
            removed.push(path);
        }
        info!(count = removed.len(), "cleaned untracked files");
        Ok(removed)
    }

    // ---- Commits ----

    /// Record the staged changes on the current branch.
    ///
    /// Returns the key of the new version node.
    pub fn commit(&self, message: &str) -> VcsResult<ObjectId> {
        self.store.ensure_initialized()?;
        let header = self.store.get_header()?;
        let branch = self.store.get_branch(&header.current_branch)?;
        let stage = self.store.get_stage()?;

        let last = self.descriptor_at(&branch.tip)?;
        let mut builder = ContentDescriptor::builder().add_all(&last);
        for path in stage.removed() {
            builder = builder.remove_file(path);
        }
        for (path, blob) in stage.added() {
            builder = builder.add_file(path.clone(), *blob);
        }
        let descriptor = builder.build();

        let tip = self.record_version(&header, &branch, &descriptor, message)?;
        self.store.put_stage(&Stage::empty())?;
        info!(
            branch = %branch.name,
            version = %tip.short_hex(),
            files = descriptor.len(),
            message,
            "committed"
        );
        Ok(tip)
    }

    /// Commits of the current branch, newest first, at most `limit`.
    pub fn history(&self, limit: usize) -> VcsResult<Vec<HistoryEntry>> {
        self.store.ensure_initialized()?;
        let tip = self.head()?;
        all_parents(&tip, limit, &self.store)?
            .into_iter()
            .map(|version| -> VcsResult<HistoryEntry> {
                let node: VersionNode = self.store.fetch(&version)?;
                let commit: Commit = self.store.fetch(&node.commit)?;
                Ok(HistoryEntry { version, commit })
            })
            .collect()
    }

    /// Replace the working copy with the snapshot `descriptor`.
    pub fn checkout(&self, descriptor: &ObjectId) -> VcsResult<()> {
        self.store.ensure_initialized()?;
        let snapshot: ContentDescriptor = self.store.fetch(descriptor)?;
        self.store.clear_working_copy()?;
        for (path, blob) in snapshot.files() {
            self.store.restore_file(blob, path)?;
        }
        debug!(descriptor = %descriptor.short_hex(), files = snapshot.len(), "checked out snapshot");
        Ok(())
    }

    // ---- Branches ----

    pub fn active_branch(&self) -> VcsResult<String> {
        self.store.ensure_initialized()?;
        Ok(self.store.get_header()?.current_branch)
    }

    /// All branch names, sorted.
    pub fn branches(&self) -> VcsResult<Vec<String>> {
        self.store.ensure_initialized()?;
        Ok(self.store.list_branches()?)
    }

    /// Key of the version node at the tip of the current branch.
    pub fn head(&self) -> VcsResult<ObjectId> {
        self.store.ensure_initialized()?;
        let header = self.store.get_header()?;
        Ok(self.store.get_branch(&header.current_branch)?.tip)
    }

    /// Create `name` at the current tip.
    pub fn create_branch(&self, name: &str) -> VcsResult<()> {
        self.store.ensure_initialized()?;
        validate_branch_name(name)?;
        if self.store.has_branch(name)? {
            return Err(VcsError::ConflictName(name.to_string()));
        }
        let tip = self.head()?;
        self.store.put_branch(&Branch::new(name, tip))?;
        info!(branch = name, tip = %tip.short_hex(), "created branch");
        Ok(())
    }

    pub fn remove_branch(&self, name: &str) -> VcsResult<()> {
        self.store.ensure_initialized()?;
        if self.store.get_header()?.current_branch == name {
            return Err(VcsError::RemoveActiveBranch(name.to_string()));
        }
        self.require_branch(name)?;
        self.store.remove_branch(name)?;
        info!(branch = name, "removed branch");
        Ok(())
    }

    /// Make `name` the current branch and replace the working copy with its
    /// last snapshot.
    pub fn switch_branch(&self, name: &str) -> VcsResult<()> {
        self.store.ensure_initialized()?;
        let header = self.store.get_header()?;
        if header.current_branch == name {
            return Err(VcsError::SwitchOnCurrentBranch(name.to_string()));
        }
        if !self.store.get_stage()?.is_empty() {
            return Err(VcsError::UncommittedChanges);
        }
        let target = self.require_branch(name)?;

        let node: VersionNode = self.store.fetch(&target.tip)?;
        let commit: Commit = self.store.fetch(&node.commit)?;
        self.checkout(&commit.descriptor)?;
        self.store.put_header(&header.on_branch(name))?;
        info!(from = %header.current_branch, to = name, "switched branch");
        Ok(())
    }

    /// Merge branch `name` into the current branch.
    ///
    /// The result is recorded as a new version on top of the current tip.
    /// The working copy is left alone; `reset` or `switch_branch` bring the
    /// merged files onto disk. On conflict nothing is written.
    pub fn merge_branch(&self, name: &str, message: Option<&str>) -> VcsResult<ObjectId> {
        self.store.ensure_initialized()?;
        let header = self.store.get_header()?;
        if header.current_branch == name {
            return Err(VcsError::IllegalBranchToMerge(name.to_string()));
        }
        let theirs = self.require_branch(name)?;
        if !self.store.get_stage()?.is_empty() {
            return Err(VcsError::UncommittedChanges);
        }
        let ours = self.store.get_branch(&header.current_branch)?;

        let base = lowest_common_ancestor(&ours.tip, &theirs.tip, &self.store)?;
        debug!(
            ours = %ours.tip.short_hex(),
            theirs = %theirs.tip.short_hex(),
            base = %base.short_hex(),
            "merging"
        );

        let outcome = merge_descriptors(
            &self.descriptor_at(&base)?,
            &self.descriptor_at(&ours.tip)?,
            &self.descriptor_at(&theirs.tip)?,
        );
        let merged = match outcome {
            MergeOutcome::Merged(descriptor) => descriptor,
            MergeOutcome::Conflicts(conflicts) => {
                warn!(branch = name, conflicts = ?conflicts, "merge conflict");
                return Err(VcsError::ConflictMerge { conflicts });
            }
        };

        let default_message = format!("Merge branch {name}");
        let message = message.unwrap_or(&default_message);
        let tip = self.record_version(&header, &ours, &merged, message)?;
        info!(
            into = %ours.name,
            from = name,
            version = %tip.short_hex(),
            "merged branch"
        );
        Ok(tip)
    }

    // ---- Status ----

    /// Staged paths compared with the last commit.
    pub fn stage_status(&self) -> VcsResult<BTreeMap<String, StageStatus>> {
        self.store.ensure_initialized()?;
        let stage = self.store.get_stage()?;
        Ok(status::stage_status(&stage, &self.last_descriptor()?))
    }

    /// Working files compared with what the next commit would record.
    pub fn working_copy_status(&self) -> VcsResult<BTreeMap<String, FileStatus>> {
        self.store.ensure_initialized()?;
        let stage = self.store.get_stage()?;
        let last = self.last_descriptor()?;
        let files = self.store.list_working_files()?;
        Ok(status::working_copy_status(&stage, &last, &files, |path| {
            self.store.hash_working_file(path)
        })?)
    }

    /// Snapshot recorded by the tip of the current branch.
    pub fn last_descriptor(&self) -> VcsResult<ContentDescriptor> {
        let tip = self.head()?;
        self.descriptor_at(&tip)
    }

    // ---- Internals ----

    fn descriptor_at(&self, version: &ObjectId) -> VcsResult<ContentDescriptor> {
        let node: VersionNode = self.store.fetch(version)?;
        let commit: Commit = self.store.fetch(&node.commit)?;
        Ok(self.store.fetch(&commit.descriptor)?)
    }

    /// Persist `descriptor` as a new commit on top of `branch` and advance it.
    fn record_version(
        &self,
        header: &Header,
        branch: &Branch,
        descriptor: &ContentDescriptor,
        message: &str,
    ) -> VcsResult<ObjectId> {
        let descriptor_key = self.store.add(descriptor)?;
        let commit = Commit::new(descriptor_key, message, header.author.clone());
        let commit_key = self.store.add(&commit)?;
        debug!(commit = %commit.summary(), key = %commit_key.short_hex(), "recorded commit");
        let node = create_version_node(commit_key, &branch.tip, &self.store)?;
        let node_key = self.store.add(&node)?;
        self.store.put_branch(&branch.advanced_to(node_key))?;
        Ok(node_key)
    }

    fn require_branch(&self, name: &str) -> VcsResult<Branch> {
        if validate_branch_name(name).is_err() || !self.store.has_branch(name)? {
            return Err(VcsError::UnknownBranch(name.to_string()));
        }
        Ok(self.store.get_branch(name)?)
    }
}

/// Check that `name` can be used as a branch (and file) name.
pub fn validate_branch_name(name: &str) -> VcsResult<()> {
    let reason = if name.is_empty() {
        Some("name is empty")
    } else if name.starts_with('.') {
        Some("name starts with '.'")
    } else if name.contains("..") {
        Some("name contains '..'")
    } else if name.contains(|c: char| c == '/' || c == '\\') {
        Some("name contains a path separator")
    } else if name.chars().any(char::is_whitespace) {
        Some("name contains whitespace")
    } else if name.chars().any(char::is_control) {
        Some("name contains control characters")
    } else {
        None
    };
    match reason {
        Some(reason) => Err(VcsError::InvalidBranchName {
            name: name.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}
