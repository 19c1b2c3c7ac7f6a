use std::collections::HashMap;

use lvcs_store::{FileStore, InMemoryRecordStore, RecordKind, RecordStore, StoreError, StoreResult};
use lvcs_types::{ObjectId, VersionNode};

/// Anything version nodes can be loaded from.
///
/// The graph algorithms only ever read nodes, so they are written against
/// this trait instead of a concrete store.
pub trait NodeSource {
    /// Load the node stored under `key`.
    ///
    /// A missing node must be reported as [`StoreError::LostFile`].
    fn fetch_node(&self, key: &ObjectId) -> StoreResult<VersionNode>;
}

impl NodeSource for FileStore {
    fn fetch_node(&self, key: &ObjectId) -> StoreResult<VersionNode> {
        self.fetch(key)
    }
}

impl NodeSource for InMemoryRecordStore {
    fn fetch_node(&self, key: &ObjectId) -> StoreResult<VersionNode> {
        self.fetch(key)
    }
}

/// Plain node map, keyed however the caller likes. Used for large
/// synthetic histories where encoding every node would dominate.
impl NodeSource for HashMap<ObjectId, VersionNode> {
    fn fetch_node(&self, key: &ObjectId) -> StoreResult<VersionNode> {
        self.get(key).cloned().ok_or_else(|| StoreError::LostFile {
            path: RecordKind::Version.location(key),
        })
    }
}

impl<S: NodeSource + ?Sized> NodeSource for &S {
    fn fetch_node(&self, key: &ObjectId) -> StoreResult<VersionNode> {
        (**self).fetch_node(key)
    }
}
