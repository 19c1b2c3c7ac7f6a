//! Three-way merge of content descriptors.
//!
//! For every path, with `b` the blob in the merge base, `o` the blob on the
//! current branch and `t` the blob on the merged branch (any of them may be
//! absent):
//!
//! - the path conflicts iff `o != t && o != b && t != b`
//! - otherwise the result is `t` if `o == b`, else `o`
//!
//! An absent result drops the path. Once every path is resolved, a
//! surviving file whose path is also a directory of another surviving file
//! conflicts too.

use std::collections::{BTreeMap, BTreeSet};

use lvcs_types::{ContentDescriptor, ObjectId};

/// Result of [`merge_descriptors`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MergeOutcome {
    /// Every path resolved.
    Merged(ContentDescriptor),
    /// Conflicting paths, sorted.
    Conflicts(Vec<String>),
}

/// Resolution of one path, or `Err(())` when both sides diverged.
fn resolve(
    base: Option<&ObjectId>,
    ours: Option<&ObjectId>,
    theirs: Option<&ObjectId>,
) -> Result<Option<ObjectId>, ()> {
    if ours != theirs && ours != base && theirs != base {
        return Err(());
    }
    Ok(if ours == base { theirs } else { ours }.copied())
}

/// Merge `theirs` into `ours` relative to their common ancestor `base`.
pub fn merge_descriptors(
    base: &ContentDescriptor,
    ours: &ContentDescriptor,
    theirs: &ContentDescriptor,
) -> MergeOutcome {
    let paths: BTreeSet<&str> = base
        .paths()
        .chain(ours.paths())
        .chain(theirs.paths())
        .collect();

    let mut conflicts = BTreeSet::new();
    let mut merged = BTreeMap::new();
    for path in paths {
        match resolve(base.get(path), ours.get(path), theirs.get(path)) {
            Ok(Some(blob)) => {
                merged.insert(path.to_string(), blob);
            }
            Ok(None) => {}
            Err(()) => {
                conflicts.insert(path.to_string());
            }
        }
    }

    for path in merged.keys() {
        let dir = format!("{path}/");
        let shadows = merged
            .range(dir.clone()..)
            .next()
            .is_some_and(|(other, _)| other.starts_with(&dir));
        if shadows {
            conflicts.insert(path.clone());
        }
    }

    if !conflicts.is_empty() {
        return MergeOutcome::Conflicts(conflicts.into_iter().collect());
    }

    let descriptor = merged
        .into_iter()
        .fold(ContentDescriptor::builder(), |b, (path, blob)| b.add_file(path, blob))
        .build();
    MergeOutcome::Merged(descriptor)
}
