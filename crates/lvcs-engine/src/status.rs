//! Stage and working-copy status.

use std::collections::BTreeMap;

use lvcs_store::StoreResult;
use lvcs_types::{ContentDescriptor, ObjectId, Stage};

/// How a staged path differs from the last commit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StageStatus {
    /// Staged, not tracked by the last commit.
    Added,
    /// Staged with content different from the last commit.
    Modified,
    /// Staged with the content the last commit already has.
    Unchanged,
    /// Removal staged.
    Removed,
}

/// How a working file differs from what the next commit would record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FileStatus {
    Unchanged,
    Modified,
    /// Tracked but absent from the working copy.
    Missing,
    /// Present but neither committed nor staged.
    Untracked,
}

/// Status of every staged path.
pub fn stage_status(stage: &Stage, last: &ContentDescriptor) -> BTreeMap<String, StageStatus> {
    let mut out = BTreeMap::new();
    for (path, blob) in stage.added() {
        let status = match last.get(path) {
            None => StageStatus::Added,
            Some(committed) if committed == blob => StageStatus::Unchanged,
            Some(_) => StageStatus::Modified,
        };
        out.insert(path.clone(), status);
    }
    for path in stage.removed() {
        out.insert(path.clone(), StageStatus::Removed);
    }
    out
}

/// Status of every tracked or present working file.
///
/// A path is expected to hold its staged blob if one is staged, otherwise
/// its committed blob. Paths with a staged removal are not tracked.
/// `working_files` lists the files present; `hash` returns the key of a
/// working file, or `None` if it does not exist.
pub fn working_copy_status<F>(
    stage: &Stage,
    last: &ContentDescriptor,
    working_files: &[String],
    mut hash: F,
) -> StoreResult<BTreeMap<String, FileStatus>>
where
    F: FnMut(&str) -> StoreResult<Option<ObjectId>>,
{
    let mut expected: BTreeMap<&str, &ObjectId> = last
        .files()
        .iter()
        .map(|(p, b)| (p.as_str(), b))
        .collect();
    for (path, blob) in stage.added() {
        expected.insert(path.as_str(), blob);
    }
    for path in stage.removed() {
        expected.remove(path.as_str());
    }

    let mut out = BTreeMap::new();
    for (path, blob) in &expected {
        let status = match hash(*path)? {
            None => FileStatus::Missing,
            Some(actual) if actual == **blob => FileStatus::Unchanged,
            Some(_) => FileStatus::Modified,
        };
        out.insert(path.to_string(), status);
    }
    for path in working_files {
        if !expected.contains_key(path.as_str()) {
            out.insert(path.clone(), FileStatus::Untracked);
        }
    }
    Ok(out)
}
