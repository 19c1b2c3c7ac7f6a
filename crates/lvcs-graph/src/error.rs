//! Error types for version graph queries.

use lvcs_store::StoreError;
use lvcs_types::ObjectId;

/// Errors that can occur while building or walking the version tree.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// A node could not be loaded. Passed through untouched so callers see
    /// the underlying `LostFile` / `BrokenFile`.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The two versions descend from different roots.
    #[error("versions {} and {} share no common ancestor", .left.short_hex(), .right.short_hex())]
    DisjointHistories { left: ObjectId, right: ObjectId },
}

/// Convenience alias for graph results.
pub type GraphResult<T> = Result<T, GraphError>;
