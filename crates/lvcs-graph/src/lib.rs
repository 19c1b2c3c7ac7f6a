//! Version tree algorithms for LiteVCS.
//!
//! Versions form a tree: every [`VersionNode`](lvcs_types::VersionNode)
//! except the root has exactly one parent. This crate builds each node's
//! binary-lifting ancestor table and answers ancestry queries with it:
//!
//! - [`create_root_node`], [`create_version_node`]
//! - [`all_parents`] -- a node and its ancestors, nearest first
//! - [`jump`] -- the ancestor `n` levels up
//! - [`lowest_common_ancestor`] -- the merge base of two versions
//!
//! Nodes are read through [`NodeSource`], so every query runs equally against
//! the on-disk store, the in-memory store, or a plain map of nodes.

pub mod error;
pub mod lifting;
pub mod source;

pub use error::{GraphError, GraphResult};
pub use lifting::{all_parents, create_root_node, create_version_node, jump, lowest_common_ancestor};
pub use source::NodeSource;
