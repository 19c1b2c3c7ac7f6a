use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use lvcs_types::ObjectId;

use crate::error::{StoreError, StoreResult};
use crate::record::RecordKind;
use crate::traits::RecordStore;

/// In-memory, HashMap-based record store.
///
/// Intended for tests and for driving the version graph without a working
/// copy. Envelopes are held behind a `RwLock` and cloned on read.
pub struct InMemoryRecordStore {
    records: RwLock<HashMap<(RecordKind, ObjectId), Vec<u8>>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }

    /// Number of records currently stored.
    pub fn len(&self) -> usize {
        self.records.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.records.read().unwrap_or_else(PoisonError::into_inner).is_empty()
    }

    /// Number of records of one kind.
    pub fn count(&self, kind: RecordKind) -> usize {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .filter(|(k, _)| *k == kind)
            .count()
    }
}

impl Default for InMemoryRecordStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InMemoryRecordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryRecordStore")
            .field("records", &self.len())
            .finish()
    }
}

impl RecordStore for InMemoryRecordStore {
    fn put_raw(&self, kind: RecordKind, key: &ObjectId, envelope: &[u8]) -> StoreResult<()> {
        let mut map = self.records.write().unwrap_or_else(PoisonError::into_inner);
        map.entry((kind, *key)).or_insert_with(|| envelope.to_vec());
        Ok(())
    }

    fn get_raw(&self, kind: RecordKind, key: &ObjectId) -> StoreResult<Vec<u8>> {
        let map = self.records.read().unwrap_or_else(PoisonError::into_inner);
        map.get(&(kind, *key))
            .cloned()
            .ok_or_else(|| StoreError::LostFile {
                path: kind.location(key),
            })
    }

    fn contains(&self, kind: RecordKind, key: &ObjectId) -> StoreResult<bool> {
        let map = self.records.read().unwrap_or_else(PoisonError::into_inner);
        Ok(map.contains_key(&(kind, *key)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record;
    use lvcs_types::{Commit, ContentDescriptor, VersionNode};

    #[test]
    fn add_then_fetch() {
        let store = InMemoryRecordStore::new();
        assert!(store.is_empty());
        let descriptor = ContentDescriptor::builder()
            .add_file("a.txt", ObjectId::from_hash([1; 32]))
            .build();
        let key = store.add(&descriptor).unwrap();
        let back: ContentDescriptor = store.fetch(&key).unwrap();
        assert_eq!(back, descriptor);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn equal_records_share_a_key() {
        let store = InMemoryRecordStore::new();
        let a = store.add(&ContentDescriptor::empty()).unwrap();
        let b = store.add(&ContentDescriptor::empty()).unwrap();
        assert_eq!(a, b);
        assert_eq!(store.count(RecordKind::Descriptor), 1);
    }

    #[test]
    fn different_kinds_with_same_payload_do_not_collide() {
        let store = InMemoryRecordStore::new();
        let commit = Commit::new(ObjectId::from_hash([0; 32]), "m", "a");
        let commit_key = store.add(&commit).unwrap();
        let node_key = store.add(&VersionNode::root(commit_key)).unwrap();
        assert_ne!(commit_key, node_key);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn missing_key_is_lost() {
        let store = InMemoryRecordStore::new();
        let err = store
            .fetch::<Commit>(&ObjectId::from_hash([9; 32]))
            .unwrap_err();
        assert!(matches!(err, StoreError::LostFile { .. }));
    }

    #[test]
    fn record_under_foreign_key_is_broken() {
        let store = InMemoryRecordStore::new();
        let envelope = record::encode(&ContentDescriptor::empty()).unwrap();
        let wrong = ObjectId::from_hash([7; 32]);
        store
            .put_raw(RecordKind::Descriptor, &wrong, &envelope)
            .unwrap();
        let err = store.fetch::<ContentDescriptor>(&wrong).unwrap_err();
        assert!(matches!(err, StoreError::BrokenFile { .. }));
    }
}
