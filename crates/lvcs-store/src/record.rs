//! Record kinds and the on-disk record envelope.
//!
//! Every record file holds exactly one record wrapped in a fixed header:
//!
//! ```text
//! [4 bytes: magic "LVCS"]
//! [1 byte:  format version]
//! [1 byte:  record kind tag]
//! [4 bytes: payload length (little-endian u32)]
//! [4 bytes: CRC32 of payload (little-endian u32)]
//! [N bytes: payload (bincode-serialized record)]
//! ```
//!
//! Any mismatch in magic, version, kind, length or checksum is reported as
//! [`StoreError::BrokenFile`].

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use lvcs_types::{Branch, Commit, ContentDescriptor, ContentHasher, Header, ObjectId, Stage, VersionNode};

use crate::error::{StoreError, StoreResult};

const MAGIC: &[u8; 4] = b"LVCS";

/// Current envelope format version.
pub const FORMAT_VERSION: u8 = 1;

/// magic + version + kind + length + crc
const HEADER_SIZE: usize = 4 + 1 + 1 + 4 + 4;

/// The type of a stored record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Version,
    Descriptor,
    Commit,
    Branch,
    Header,
    Stage,
}

impl RecordKind {
    /// Tag byte written into the envelope.
    pub fn tag(&self) -> u8 {
        match self {
            Self::Version => 1,
            Self::Descriptor => 2,
            Self::Commit => 3,
            Self::Branch => 4,
            Self::Header => 5,
            Self::Stage => 6,
        }
    }

    /// Inverse of [`tag`](Self::tag).
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            1 => Some(Self::Version),
            2 => Some(Self::Descriptor),
            3 => Some(Self::Commit),
            4 => Some(Self::Branch),
            5 => Some(Self::Header),
            6 => Some(Self::Stage),
            _ => None,
        }
    }

    /// Directory (relative to the metadata root) holding records of this kind.
    pub fn namespace(&self) -> &'static str {
        match self {
            Self::Version => "versions",
            Self::Descriptor => "descriptors",
            Self::Commit => "commits",
            Self::Branch => "branches",
            Self::Header => "header",
            Self::Stage => "stage",
        }
    }

    /// Namespace-relative location of a keyed record, for error messages.
    pub fn location(&self, id: &ObjectId) -> PathBuf {
        Path::new(self.namespace()).join(id.to_hex())
    }
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Version => write!(f, "version node"),
            Self::Descriptor => write!(f, "content descriptor"),
            Self::Commit => write!(f, "commit"),
            Self::Branch => write!(f, "branch"),
            Self::Header => write!(f, "header"),
            Self::Stage => write!(f, "stage"),
        }
    }
}

/// A type that can be persisted as a record.
pub trait Record: Serialize + DeserializeOwned {
    const KIND: RecordKind;
}

/// An immutable record stored under the hash of its own payload.
pub trait KeyedRecord: Record {
    const HASHER: ContentHasher;
}

impl Record for VersionNode {
    const KIND: RecordKind = RecordKind::Version;
}

impl KeyedRecord for VersionNode {
    const HASHER: ContentHasher = ContentHasher::VERSION;
}

impl Record for ContentDescriptor {
    const KIND: RecordKind = RecordKind::Descriptor;
}

impl KeyedRecord for ContentDescriptor {
    const HASHER: ContentHasher = ContentHasher::DESCRIPTOR;
}

impl Record for Commit {
    const KIND: RecordKind = RecordKind::Commit;
}

impl KeyedRecord for Commit {
    const HASHER: ContentHasher = ContentHasher::COMMIT;
}

impl Record for Branch {
    const KIND: RecordKind = RecordKind::Branch;
}

impl Record for Header {
    const KIND: RecordKind = RecordKind::Header;
}

impl Record for Stage {
    const KIND: RecordKind = RecordKind::Stage;
}

/// Serialize a record into its payload bytes.
pub fn encode_payload<R: Record>(record: &R) -> StoreResult<Vec<u8>> {
    bincode::serialize(record).map_err(|e| StoreError::Encoding(e.to_string()))
}

/// Wrap a payload into an envelope.
pub fn seal(kind: RecordKind, payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(HEADER_SIZE + payload.len());
    out.extend_from_slice(MAGIC);
    out.push(FORMAT_VERSION);
    out.push(kind.tag());
    out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    out.extend_from_slice(&crc32fast::hash(payload).to_le_bytes());
    out.extend_from_slice(payload);
    out
}

/// Encode a record straight into an envelope.
pub fn encode<R: Record>(record: &R) -> StoreResult<Vec<u8>> {
    let payload = encode_payload(record)?;
    Ok(seal(R::KIND, &payload))
}

/// Validate an envelope of the `expected` kind and return its payload.
///
/// `path` is only used to label errors.
pub fn open<'a>(bytes: &'a [u8], expected: RecordKind, path: &Path) -> StoreResult<&'a [u8]> {
    let broken = |reason: String| StoreError::BrokenFile {
        path: path.to_path_buf(),
        reason,
    };

    if bytes.len() < HEADER_SIZE {
        return Err(broken(format!("truncated header ({} bytes)", bytes.len())));
    }
    if &bytes[0..4] != MAGIC {
        return Err(broken("not a LiteVCS record".into()));
    }
    if bytes[4] != FORMAT_VERSION {
        return Err(broken(format!("unsupported format version {}", bytes[4])));
    }
    match RecordKind::from_tag(bytes[5]) {
        Some(kind) if kind == expected => {}
        Some(kind) => return Err(broken(format!("expected {expected} record, found {kind}"))),
        None => return Err(broken(format!("unknown record kind tag {}", bytes[5]))),
    }

    let length = u32::from_le_bytes([bytes[6], bytes[7], bytes[8], bytes[9]]) as usize;
    let crc = u32::from_le_bytes([bytes[10], bytes[11], bytes[12], bytes[13]]);
    let payload = &bytes[HEADER_SIZE..];
    if payload.len() != length {
        return Err(broken(format!(
            "payload length mismatch: header says {length}, found {}",
            payload.len()
        )));
    }
    if crc32fast::hash(payload) != crc {
        return Err(broken("checksum mismatch".into()));
    }
    Ok(payload)
}

/// Deserialize a payload produced by [`encode_payload`].
pub fn decode_payload<R: Record>(payload: &[u8], path: &Path) -> StoreResult<R> {
    bincode::deserialize(payload).map_err(|e| StoreError::BrokenFile {
        path: path.to_path_buf(),
        reason: format!("cannot decode {}: {e}", R::KIND),
    })
}

/// Validate an envelope and decode the record inside it.
pub fn decode<R: Record>(bytes: &[u8], path: &Path) -> StoreResult<R> {
    let payload = open(bytes, R::KIND, path)?;
    decode_payload(payload, path)
}
