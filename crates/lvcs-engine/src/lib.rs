//! LiteVCS: a small version-control engine.
//!
//! [`LiteVcs`] is the entry point. It works on a single working directory
//! whose metadata lives in a hidden subdirectory (`.liteVCS` by default) and
//! offers the usual operations: staging (`add`, `remove`, `reset`),
//! `commit`, branches (`create_branch`, `switch_branch`, `remove_branch`),
//! three-way `merge_branch`, `history` and status reporting.
//!
//! ```no_run
//! use lvcs_engine::LiteVcs;
//!
//! # fn main() -> lvcs_engine::VcsResult<()> {
//! let repo = LiteVcs::open("/path/to/project");
//! repo.init()?;
//! repo.add("README.md")?;
//! repo.commit("add readme")?;
//! repo.create_branch("feature")?;
//! # Ok(())
//! # }
//! ```
//!
//! Versions form a tree: a merge records the merged snapshot as a single
//! child of the current tip, and merge bases are found with the
//! binary-lifting queries of `lvcs-graph`.

pub mod config;
pub mod error;
pub mod merge;
pub mod repository;
pub mod status;

pub use config::VcsConfig;
pub use error::{VcsError, VcsResult};
pub use merge::{merge_descriptors, MergeOutcome};
pub use repository::{validate_branch_name, HistoryEntry, LiteVcs};
pub use status::{FileStatus, StageStatus};
