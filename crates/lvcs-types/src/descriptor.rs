//! Tree snapshots: which blob every tracked path holds in one version.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::object::ObjectId;

/// An immutable snapshot of the tracked tree.
///
/// Maps repository-relative paths (forward-slash separated) to blob keys.
/// Instances are only produced by [`DescriptorBuilder`], so a descriptor never
/// changes after it has been written to the store.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentDescriptor {
    files: BTreeMap<String, ObjectId>,
}

impl ContentDescriptor {
    /// The snapshot with no files, used by the initial commit.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Start building a new descriptor.
    pub fn builder() -> DescriptorBuilder {
        DescriptorBuilder::default()
    }

    /// Blob key of `path`, if tracked.
    pub fn get(&self, path: &str) -> Option<&ObjectId> {
        self.files.get(path)
    }

    /// Returns `true` if `path` is tracked.
    pub fn contains(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    /// Tracked paths with their blob keys, in path order.
    pub fn files(&self) -> &BTreeMap<String, ObjectId> {
        &self.files
    }

    /// Iterate tracked paths in order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    /// Number of tracked files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Returns `true` if no file is tracked.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Accumulates entries for a [`ContentDescriptor`].
#[derive(Clone, Debug, Default)]
pub struct DescriptorBuilder {
    files: BTreeMap<String, ObjectId>,
}

impl DescriptorBuilder {
    /// Track `path` at `blob`, replacing any previous entry.
    pub fn add_file(mut self, path: impl Into<String>, blob: ObjectId) -> Self {
        self.files.insert(path.into(), blob);
        self
    }

    /// Copy every entry of `descriptor`, overriding entries already present.
    pub fn add_all(mut self, descriptor: &ContentDescriptor) -> Self {
        self.files
            .extend(descriptor.files.iter().map(|(p, id)| (p.clone(), *id)));
        self
    }

    /// Stop tracking `path`.
    pub fn remove_file(mut self, path: &str) -> Self {
        self.files.remove(path);
        self
    }

    /// Freeze the accumulated entries.
    pub fn build(self) -> ContentDescriptor {
        ContentDescriptor { files: self.files }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(byte: u8) -> ObjectId {
        ObjectId::from_hash([byte; 32])
    }

    #[test]
    fn empty_descriptor_tracks_nothing() {
        let d = ContentDescriptor::empty();
        assert!(d.is_empty());
        assert_eq!(d.len(), 0);
        assert!(!d.contains("a.txt"));
    }

    #[test]
    fn builder_overlays_in_order() {
        let base = ContentDescriptor::builder()
            .add_file("a.txt", id(1))
            .add_file("b.txt", id(2))
            .build();
        let next = ContentDescriptor::builder()
            .add_all(&base)
            .add_file("a.txt", id(3))
            .remove_file("b.txt")
            .add_file("dir/c.txt", id(4))
            .build();

        assert_eq!(next.get("a.txt"), Some(&id(3)));
        assert!(!next.contains("b.txt"));
        assert_eq!(next.paths().collect::<Vec<_>>(), vec!["a.txt", "dir/c.txt"]);
        // The source descriptor is untouched.
        assert_eq!(base.get("a.txt"), Some(&id(1)));
        assert!(base.contains("b.txt"));
    }

    #[test]
    fn bincode_roundtrip() {
        let d = ContentDescriptor::builder().add_file("x", id(9)).build();
        let bytes = bincode::serialize(&d).unwrap();
        let back: ContentDescriptor = bincode::deserialize(&bytes).unwrap();
        assert_eq!(back, d);
    }
}
