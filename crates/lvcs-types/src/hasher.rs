use crate::object::ObjectId;

/// Domain-separated BLAKE3 content hasher.
///
/// Each hasher carries a domain tag (e.g. `"lvcs-blob-v1"`) that is prepended
/// to every hash computation, so a blob and a commit record with identical
/// bytes never share a key.
pub struct ContentHasher {
    domain: &'static str,
}

impl ContentHasher {
    /// Hasher for working-copy file contents.
    pub const BLOB: Self = Self::new("lvcs-blob-v1");
    /// Hasher for content descriptors.
    pub const DESCRIPTOR: Self = Self::new("lvcs-descriptor-v1");
    /// Hasher for commit records.
    pub const COMMIT: Self = Self::new("lvcs-commit-v1");
    /// Hasher for version nodes.
    pub const VERSION: Self = Self::new("lvcs-version-v1");

    /// Create a hasher with a custom domain tag.
    pub const fn new(domain: &'static str) -> Self {
        Self { domain }
    }

    /// Hash raw bytes with domain separation.
    pub fn hash(&self, data: &[u8]) -> ObjectId {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.domain.as_bytes());
        hasher.update(b":");
        hasher.update(data);
        ObjectId::from_hash(*hasher.finalize().as_bytes())
    }

    /// Verify that data produces the expected key.
    pub fn verify(&self, data: &[u8], expected: &ObjectId) -> bool {
        self.hash(data) == *expected
    }
}
