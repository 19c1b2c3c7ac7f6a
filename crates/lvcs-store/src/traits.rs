use lvcs_types::ObjectId;

use crate::error::{StoreError, StoreResult};
use crate::record::{self, KeyedRecord, RecordKind};

/// Content-addressed record store.
///
/// Implementations hold sealed envelopes (see [`record`](crate::record))
/// keyed by `(kind, key)`. They never interpret the bytes; decoding and
/// key verification happen in the provided [`add`](Self::add) and
/// [`fetch`](Self::fetch) methods.
///
/// - Records are immutable once written. Writing an existing key is a no-op.
/// - A missing key is [`StoreError::LostFile`], never `Ok(None)`.
/// - All I/O errors are propagated, never silently ignored.
pub trait RecordStore: Send + Sync {
    /// Store a sealed envelope under `key`.
    fn put_raw(&self, kind: RecordKind, key: &ObjectId, envelope: &[u8]) -> StoreResult<()>;

    /// Read the sealed envelope stored under `key`.
    fn get_raw(&self, kind: RecordKind, key: &ObjectId) -> StoreResult<Vec<u8>>;

    /// Check whether a record exists.
    fn contains(&self, kind: RecordKind, key: &ObjectId) -> StoreResult<bool>;

    /// Persist `record` and return its content-derived key.
    fn add<R: KeyedRecord>(&self, record: &R) -> StoreResult<ObjectId>
    where
        Self: Sized,
    {
        let payload = record::encode_payload(record)?;
        let key = R::HASHER.hash(&payload);
        if !self.contains(R::KIND, &key)? {
            self.put_raw(R::KIND, &key, &record::seal(R::KIND, &payload))?;
        }
        Ok(key)
    }

    /// Load the record stored under `key`.
    ///
    /// The payload is re-hashed and compared against `key`, so a file that
    /// decodes cleanly but holds another record is still reported broken.
    fn fetch<R: KeyedRecord>(&self, key: &ObjectId) -> StoreResult<R>
    where
        Self: Sized,
    {
        let location = R::KIND.location(key);
        let bytes = self.get_raw(R::KIND, key)?;
        let payload = record::open(&bytes, R::KIND, &location)?;
        if !R::HASHER.verify(payload, key) {
            return Err(StoreError::BrokenFile {
                path: location,
                reason: "content does not match its key".into(),
            });
        }
        record::decode_payload(payload, &location)
    }
}
