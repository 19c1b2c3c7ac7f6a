//! Version nodes: a commit's position in the version tree.
//!
//! Every [`VersionNode`] carries a binary-lifting table of
//! [`ANCESTOR_TABLE_SIZE`] entries: entry `i` names the ancestor exactly `2^i`
//! versions above the node. Entries that would reach past the root hold
//! [`Ancestor::Root`] instead of a key.

use serde::{Deserialize, Serialize};

use crate::object::ObjectId;

/// Number of entries in every ancestor table.
pub const ANCESTOR_TABLE_SIZE: usize = 16;

/// One slot of an ancestor table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ancestor {
    /// No ancestor exists this far up.
    Root,
    /// The version node at this distance.
    Node(ObjectId),
}

impl Ancestor {
    /// The referenced key, or `None` past the root.
    pub fn node(&self) -> Option<ObjectId> {
        match self {
            Self::Root => None,
            Self::Node(id) => Some(*id),
        }
    }

    /// Returns `true` for [`Ancestor::Root`].
    pub fn is_root(&self) -> bool {
        matches!(self, Self::Root)
    }
}

/// A node of the version tree.
///
/// Nodes are immutable: the table is computed once when the node is created
/// and written to the store together with it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionNode {
    /// Key of the associated [`Commit`](crate::Commit).
    pub commit: ObjectId,
    /// Distance from the root, counting the root as 1.
    pub depth: u64,
    /// `ancestors[i]` is the ancestor `2^i` levels above.
    pub ancestors: [Ancestor; ANCESTOR_TABLE_SIZE],
}

impl VersionNode {
    /// The first node of a repository: depth 1, no ancestors.
    pub fn root(commit: ObjectId) -> Self {
        Self {
            commit,
            depth: 1,
            ancestors: [Ancestor::Root; ANCESTOR_TABLE_SIZE],
        }
    }

    /// Returns `true` if this node has no parent.
    pub fn is_root(&self) -> bool {
        self.ancestors[0].is_root()
    }

    /// Key of the direct parent, or `None` for the root.
    pub fn parent(&self) -> Option<ObjectId> {
        self.ancestors[0].node()
    }

    /// The ancestor `2^level` versions above this node.
    ///
    /// # Panics
    ///
    /// Panics if `level >= ANCESTOR_TABLE_SIZE`.
    pub fn ancestor(&self, level: usize) -> Ancestor {
        self.ancestors[level]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_node_has_no_ancestors() {
        let node = VersionNode::root(ObjectId::from_hash([1; 32]));
        assert!(node.is_root());
        assert_eq!(node.depth, 1);
        assert!(node.parent().is_none());
        assert!(node.ancestors.iter().all(Ancestor::is_root));
    }

    #[test]
    fn parent_is_first_table_entry() {
        let parent = ObjectId::from_hash([2; 32]);
        let mut ancestors = [Ancestor::Root; ANCESTOR_TABLE_SIZE];
        ancestors[0] = Ancestor::Node(parent);
        let node = VersionNode {
            commit: ObjectId::from_hash([3; 32]),
            depth: 2,
            ancestors,
        };
        assert!(!node.is_root());
        assert_eq!(node.parent(), Some(parent));
        assert_eq!(node.ancestor(1), Ancestor::Root);
    }

    #[test]
    fn bincode_roundtrip() {
        let node = VersionNode::root(ObjectId::from_hash([4; 32]));
        let bytes = bincode::serialize(&node).unwrap();
        let back: VersionNode = bincode::deserialize(&bytes).unwrap();
        assert_eq!(back, node);
    }
}
