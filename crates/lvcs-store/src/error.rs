use std::path::PathBuf;

/// Errors from object store operations.
///
/// `LostFile` and `BrokenFile` stay distinct: callers stop on a missing
/// record but report repair hints for an unreadable one.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The metadata directory (or one of its namespaces) does not exist.
    #[error("repository not initialized at {}", .path.display())]
    RepositoryNotInitialized { path: PathBuf },

    /// `init` was called where a repository already exists.
    #[error("repository already exists at {}", .path.display())]
    RecreatingRepository { path: PathBuf },

    /// A referenced record, blob or ref does not exist.
    #[error("lost file: {} does not exist", .path.display())]
    LostFile { path: PathBuf },

    /// A record exists but cannot be decoded as the expected type.
    #[error("broken file {}: {reason}", .path.display())]
    BrokenFile { path: PathBuf, reason: String },

    /// The path to stage is not an existing regular file.
    #[error("cannot add {path}: no such file")]
    NonexistentFileAddition { path: String },

    /// The path to delete is not an existing regular file.
    #[error("cannot delete {path}: no such file")]
    NonexistentFileDeletion { path: String },

    /// The path escapes the working root or points into the metadata directory.
    #[error("path is outside the working copy: {path}")]
    OutsideWorkingCopy { path: String },

    /// A record could not be serialized.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// I/O error from the underlying filesystem.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
