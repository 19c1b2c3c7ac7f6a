//! Object storage for LiteVCS.
//!
//! The store persists everything the version-control engine needs, analogous
//! to git's `.git/` directory:
//!
//! - immutable records (content descriptors, commits, version nodes) keyed
//!   by the domain-separated BLAKE3 hash of their payload
//! - blobs (raw working-file bytes) keyed by the hash of their contents
//! - mutable references: branches, the header and the stage
//!
//! Records are wrapped in a checksummed, versioned envelope (see
//! [`record`]). A key with no file is [`StoreError::LostFile`]; a file that
//! fails any envelope or decoding check is [`StoreError::BrokenFile`].
//!
//! # Storage Backends
//!
//! All backends implement the [`RecordStore`] trait:
//!
//! - [`FileStore`] -- the metadata directory of a working copy
//! - [`InMemoryRecordStore`] -- `HashMap`-based store for tests and embedding
//!
//! # Design Rules
//!
//! 1. Records are immutable once written; writing an existing key is a no-op.
//! 2. Every file is written to a temporary sibling and renamed into place.
//! 3. All I/O errors are propagated, never silently ignored.

pub mod disk;
pub mod error;
pub mod layout;
pub mod memory;
pub mod record;
pub mod traits;
pub mod workdir;

pub use disk::{FileStore, RepositorySeed};
pub use error::{StoreError, StoreResult};
pub use layout::{RepositoryLayout, DEFAULT_METADATA_DIR};
pub use memory::InMemoryRecordStore;
pub use record::{KeyedRecord, Record, RecordKind};
pub use traits::RecordStore;
