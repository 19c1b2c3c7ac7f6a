use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::object::ObjectId;

/// Pending changes for the next commit.
///
/// Holds staged additions (path to blob key) and staged removals. A path is
/// never in both sets: every mutator clears the path from the other one.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    added: BTreeMap<String, ObjectId>,
    removed: BTreeSet<String>,
}

impl Stage {
    /// A stage with no pending changes.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Stage `path` at `blob`, cancelling a pending removal.
    pub fn add_file(&mut self, path: impl Into<String>, blob: ObjectId) {
        let path = path.into();
        self.removed.remove(&path);
        self.added.insert(path, blob);
    }

    /// Stage the removal of `path`, cancelling a pending addition.
    pub fn remove_file(&mut self, path: impl Into<String>) {
        let path = path.into();
        self.added.remove(&path);
        self.removed.insert(path);
    }

    /// Forget anything staged for `path`. Returns `true` if there was an entry.
    pub fn reset(&mut self, path: &str) -> bool {
        let was_added = self.added.remove(path).is_some();
        let was_removed = self.removed.remove(path);
        was_added || was_removed
    }

    /// Staged additions.
    pub fn added(&self) -> &BTreeMap<String, ObjectId> {
        &self.added
    }

    /// Staged removals.
    pub fn removed(&self) -> &BTreeSet<String> {
        &self.removed
    }

    /// Blob staged for `path`, if any.
    pub fn added_blob(&self, path: &str) -> Option<&ObjectId> {
        self.added.get(path)
    }

    /// Returns `true` if the removal of `path` is staged.
    pub fn is_removed(&self, path: &str) -> bool {
        self.removed.contains(path)
    }

    /// Returns `true` if nothing is staged.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(byte: u8) -> ObjectId {
        ObjectId::from_hash([byte; 32])
    }

    #[test]
    fn new_stage_is_empty() {
        assert!(Stage::empty().is_empty());
    }

    #[test]
    fn add_cancels_removal() {
        let mut stage = Stage::empty();
        stage.remove_file("a.txt");
        assert!(stage.is_removed("a.txt"));

        stage.add_file("a.txt", id(1));
        assert!(!stage.is_removed("a.txt"));
        assert_eq!(stage.added_blob("a.txt"), Some(&id(1)));
    }

    #[test]
    fn remove_cancels_addition() {
        let mut stage = Stage::empty();
        stage.add_file("a.txt", id(1));
        stage.remove_file("a.txt");
        assert!(stage.added_blob("a.txt").is_none());
        assert!(stage.is_removed("a.txt"));
        assert!(!stage.is_empty());
    }

    #[test]
    fn reset_drops_both_kinds() {
        let mut stage = Stage::empty();
        stage.add_file("a.txt", id(1));
        stage.remove_file("b.txt");

        assert!(stage.reset("a.txt"));
        assert!(stage.reset("b.txt"));
        assert!(!stage.reset("c.txt"));
        assert!(stage.is_empty());
    }
}
