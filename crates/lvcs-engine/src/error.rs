use lvcs_graph::GraphError;
use lvcs_store::StoreError;

/// Errors returned by [`LiteVcs`](crate::LiteVcs) operations.
///
/// Each variant names one refusal the engine can make; store failures pass
/// through unchanged in [`VcsError::Store`].
#[derive(Debug, thiserror::Error)]
pub enum VcsError {
    #[error("branch {0} already exists")]
    ConflictName(String),

    #[error("cannot remove the active branch {0}")]
    RemoveActiveBranch(String),

    #[error("unknown branch {0}")]
    UnknownBranch(String),

    #[error("already on branch {0}")]
    SwitchOnCurrentBranch(String),

    /// The stage is not empty.
    #[error("uncommitted changes in the stage; commit or reset them first")]
    UncommittedChanges,

    /// Merging the active branch into itself.
    #[error("cannot merge branch {0} into itself")]
    IllegalBranchToMerge(String),

    /// Both sides changed the same paths; nothing was written.
    #[error("merge conflict in {}", .conflicts.join(", "))]
    ConflictMerge { conflicts: Vec<String> },

    /// `reset` was asked for a path the last commit does not track.
    #[error("{0} is not tracked by the last commit")]
    UnobservedFile(String),

    #[error("invalid branch name {name:?}: {reason}")]
    InvalidBranchName { name: String, reason: &'static str },

    /// The two tips share no root.
    #[error("branches have no common history")]
    DisjointHistories,

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<GraphError> for VcsError {
    fn from(err: GraphError) -> Self {
        match err {
            GraphError::Store(e) => Self::Store(e),
            GraphError::DisjointHistories { .. } => Self::DisjointHistories,
        }
    }
}

/// Convenience alias for engine results.
pub type VcsResult<T> = Result<T, VcsError>;
