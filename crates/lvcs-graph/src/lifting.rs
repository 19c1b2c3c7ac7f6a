//! Binary lifting over the version tree.
//!
//! Every [`VersionNode`] stores `ancestors[i]`, the node `2^i` levels above
//! it. Tables are filled in when a node is created, from the tables of nodes
//! already in the store:
//!
//! ```text
//! ancestors[0] = parent
//! ancestors[i] = ancestors[i - 1].ancestors[i - 1]
//! ```
//!
//! With the table in place, moving `n` levels up costs one fetch per set bit
//! of `n` (plus one per `2^(K-1)` block for jumps longer than the table
//! covers), and the lowest common ancestor of two nodes is found in
//! `O(K + depth / 2^(K-1))` fetches.

use tracing::debug;

use lvcs_store::{RecordKind, StoreError};
use lvcs_types::{Ancestor, ObjectId, VersionNode, ANCESTOR_TABLE_SIZE};

use crate::error::{GraphError, GraphResult};
use crate::source::NodeSource;

const TOP_LEVEL: usize = ANCESTOR_TABLE_SIZE - 1;

/// The node of a repository's first commit.
pub fn create_root_node(commit: ObjectId) -> VersionNode {
    VersionNode::root(commit)
}

/// Build the node for `commit` as a child of the node stored under `parent`.
///
/// The returned node is not persisted; store it and use the returned key as
/// the new tip.
pub fn create_version_node<S: NodeSource + ?Sized>(
    commit: ObjectId,
    parent: &ObjectId,
    source: &S,
) -> GraphResult<VersionNode> {
    let parent_node = source.fetch_node(parent)?;

    let mut ancestors = [Ancestor::Root; ANCESTOR_TABLE_SIZE];
    ancestors[0] = Ancestor::Node(*parent);
    for level in 1..ANCESTOR_TABLE_SIZE {
        ancestors[level] = match ancestors[level - 1] {
            Ancestor::Root => break,
            Ancestor::Node(key) if key == *parent => parent_node.ancestor(level - 1),
            Ancestor::Node(key) => source.fetch_node(&key)?.ancestor(level - 1),
        };
    }

    let node = VersionNode {
        commit,
        depth: parent_node.depth + 1,
        ancestors,
    };
    debug!(
        commit = %commit.short_hex(),
        parent = %parent.short_hex(),
        depth = node.depth,
        "built version node"
    );
    Ok(node)
}

/// Keys from `start` towards the root, nearest first.
///
/// `start` itself is the first entry. At most `limit` keys are returned;
/// fewer if the root is reached first.
pub fn all_parents<S: NodeSource + ?Sized>(
    start: &ObjectId,
    limit: usize,
    source: &S,
) -> GraphResult<Vec<ObjectId>> {
    let mut chain = Vec::new();
    let mut current = Some(*start);
    while let Some(key) = current {
        if chain.len() >= limit {
            break;
        }
        chain.push(key);
        current = source.fetch_node(&key)?.parent();
    }
    Ok(chain)
}

/// The ancestor `length` levels above `node`.
///
/// Lengths past the root are clamped, so the result is never further up
/// than the root itself.
pub fn jump<S: NodeSource + ?Sized>(
    node: &ObjectId,
    length: u64,
    source: &S,
) -> GraphResult<ObjectId> {
    let start = source.fetch_node(node)?;
    let remaining = length.min(start.depth.saturating_sub(1));
    let (key, _) = lift(*node, start, remaining, source)?;
    Ok(key)
}

/// The deepest node that is an ancestor of both `a` and `b`.
///
/// A node counts as its own ancestor, so `lowest_common_ancestor(x, x)` is
/// `x` and the LCA of a node and one of its ancestors is that ancestor.
pub fn lowest_common_ancestor<S: NodeSource + ?Sized>(
    a: &ObjectId,
    b: &ObjectId,
    source: &S,
) -> GraphResult<ObjectId> {
    let left = source.fetch_node(a)?;
    let right = source.fetch_node(b)?;

    let ((x, mut x_node), (y, mut y_node)) = if left.depth >= right.depth {
        let diff = left.depth - right.depth;
        (lift(*a, left, diff, source)?, (*b, right))
    } else {
        let diff = right.depth - left.depth;
        ((*a, left), lift(*b, right, diff, source)?)
    };

    if x == y {
        return Ok(x);
    }

    // histories deeper than the table spans: skip whole top-level blocks
    while let (Ancestor::Node(up_x), Ancestor::Node(up_y)) =
        (x_node.ancestor(TOP_LEVEL), y_node.ancestor(TOP_LEVEL))
    {
        if up_x == up_y {
            break;
        }
        x_node = source.fetch_node(&up_x)?;
        y_node = source.fetch_node(&up_y)?;
    }

    for level in (0..ANCESTOR_TABLE_SIZE).rev() {
        if let (Ancestor::Node(up_x), Ancestor::Node(up_y)) =
            (x_node.ancestor(level), y_node.ancestor(level))
        {
            if up_x != up_y {
                x_node = source.fetch_node(&up_x)?;
                y_node = source.fetch_node(&up_y)?;
            }
        }
    }

    match (x_node.parent(), y_node.parent()) {
        (Some(px), Some(py)) if px == py => {
            debug!(a = %a.short_hex(), b = %b.short_hex(), lca = %px.short_hex(), "resolved common ancestor");
            Ok(px)
        }
        _ => Err(GraphError::DisjointHistories {
            left: *a,
            right: *b,
        }),
    }
}

/// Move `distance` levels up from `key`, which must not exceed its depth.
fn lift<S: NodeSource + ?Sized>(
    mut key: ObjectId,
    mut node: VersionNode,
    mut distance: u64,
    source: &S,
) -> GraphResult<(ObjectId, VersionNode)> {
    while distance > 0 {
        let level = (distance.ilog2() as usize).min(TOP_LEVEL);
        let next = node.ancestor(level).node().ok_or_else(|| StoreError::BrokenFile {
            path: RecordKind::Version.location(&key),
            reason: format!("ancestor table ends before level {level} at depth {}", node.depth),
        })?;
        node = source.fetch_node(&next)?;
        key = next;
        distance -= 1 << level;
    }
    Ok((key, node))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use chrono::{TimeZone, Utc};
    use lvcs_store::{InMemoryRecordStore, RecordStore};
    use lvcs_types::{Commit, ContentHasher};

    use super::*;

    /// Parent of node `i` is `FIXTURE_PARENTS[i]`; node 0 is the root.
    const FIXTURE_PARENTS: [usize; 16] = [0, 0, 0, 2, 3, 3, 4, 1, 7, 1, 2, 5, 4, 6, 8, 4];

    fn commit_key(store: &InMemoryRecordStore, i: usize) -> ObjectId {
        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let commit = Commit::at(
            ContentHasher::DESCRIPTOR.hash(b""),
            format!("version {i}"),
            "tests",
            ts,
        );
        store.add(&commit).unwrap()
    }

    /// Builds the 16-node fixture tree through the real store.
    fn fixture() -> (InMemoryRecordStore, Vec<ObjectId>) {
        let store = InMemoryRecordStore::new();
        let mut keys = Vec::new();
        for (i, &parent) in FIXTURE_PARENTS.iter().enumerate() {
            let commit = commit_key(&store, i);
            let node = if i == 0 {
                create_root_node(commit)
            } else {
                create_version_node(commit, &keys[parent], &store).unwrap()
            };
            keys.push(store.add(&node).unwrap());
        }
        (store, keys)
    }

    fn synthetic_key(i: usize) -> ObjectId {
        ContentHasher::VERSION.hash(&(i as u64).to_le_bytes())
    }

    /// A chain of `len` nodes in a plain map; `keys[0]` is the root.
    fn chain(len: usize) -> (HashMap<ObjectId, VersionNode>, Vec<ObjectId>) {
        let mut nodes = HashMap::with_capacity(len);
        let mut keys = Vec::with_capacity(len);
        for i in 0..len {
            let key = synthetic_key(i);
            let node = if i == 0 {
                create_root_node(key)
            } else {
                create_version_node(key, &keys[i - 1], &nodes).unwrap()
            };
            nodes.insert(key, node);
            keys.push(key);
        }
        (nodes, keys)
    }

    /// A tree in a plain map from a parent array.
    fn tree(parents: &[usize]) -> (HashMap<ObjectId, VersionNode>, Vec<ObjectId>) {
        let mut nodes = HashMap::new();
        let mut keys = Vec::new();
        for (i, &parent) in parents.iter().enumerate() {
            let key = synthetic_key(i);
            let node = if i == 0 {
                create_root_node(key)
            } else {
                create_version_node(key, &keys[parent], &nodes).unwrap()
            };
            nodes.insert(key, node);
            keys.push(key);
        }
        (nodes, keys)
    }

    fn naive_lca(parents: &[usize], a: usize, b: usize) -> usize {
        let mut seen = std::collections::HashSet::new();
        let mut x = a;
        loop {
            seen.insert(x);
            if x == 0 {
                break;
            }
            x = parents[x];
        }
        let mut y = b;
        while !seen.contains(&y) {
            y = parents[y];
        }
        y
    }

    #[test]
    fn fixture_tables_are_correct() {
        let (store, keys) = fixture();
        // 13 -> 6 -> 4 -> 3 -> 2 -> 0
        let node = store.fetch_node(&keys[13]).unwrap();
        assert_eq!(node.depth, 6);
        assert_eq!(node.ancestor(0), Ancestor::Node(keys[6]));
        assert_eq!(node.ancestor(1), Ancestor::Node(keys[4]));
        assert_eq!(node.ancestor(2), Ancestor::Node(keys[2]));
        assert_eq!(node.ancestor(3), Ancestor::Root);
    }

    #[test]
    fn fixture_lowest_common_ancestors() {
        let (store, k) = fixture();
        let cases = [
            (14, 13, 0),
            (12, 13, 4),
            (13, 3, 3),
            (1, 15, 0),
            (0, 15, 0),
            (10, 11, 2),
            (14, 9, 1),
            (8, 8, 8),
        ];
        for (a, b, expected) in cases {
            let lca = lowest_common_ancestor(&k[a], &k[b], &store).unwrap();
            assert_eq!(lca, k[expected], "LCA({a}, {b})");
            let swapped = lowest_common_ancestor(&k[b], &k[a], &store).unwrap();
            assert_eq!(swapped, k[expected], "LCA({b}, {a})");
        }
    }

    #[test]
    fn fixture_parent_chains() {
        let (store, k) = fixture();
        let chain = all_parents(&k[13], 7, &store).unwrap();
        let expected: Vec<_> = [13, 6, 4, 3, 2, 0].iter().map(|&i| k[i]).collect();
        assert_eq!(chain, expected);

        let chain = all_parents(&k[14], 4, &store).unwrap();
        let expected: Vec<_> = [14, 8, 7, 1].iter().map(|&i| k[i]).collect();
        assert_eq!(chain, expected);

        assert_eq!(all_parents(&k[0], 10, &store).unwrap(), vec![k[0]]);
        assert!(all_parents(&k[5], 0, &store).unwrap().is_empty());
    }

    #[test]
    fn jump_clamps_at_root() {
        let (store, k) = fixture();
        assert_eq!(jump(&k[13], 0, &store).unwrap(), k[13]);
        assert_eq!(jump(&k[13], 3, &store).unwrap(), k[3]);
        assert_eq!(jump(&k[13], 5, &store).unwrap(), k[0]);
        assert_eq!(jump(&k[13], 500, &store).unwrap(), k[0]);
    }

    #[test]
    fn missing_node_is_lost() {
        let (store, k) = fixture();
        let ghost = ObjectId::from_hash([0xee; 32]);
        let err = lowest_common_ancestor(&k[3], &ghost, &store).unwrap_err();
        assert!(matches!(err, GraphError::Store(StoreError::LostFile { .. })));
        let err = create_version_node(ghost, &ghost, &store).unwrap_err();
        assert!(matches!(err, GraphError::Store(StoreError::LostFile { .. })));
    }

    #[test]
    fn separate_roots_are_disjoint() {
        let (mut nodes, keys) = chain(5);
        let other_root = ObjectId::from_hash([0x42; 32]);
        nodes.insert(other_root, create_root_node(other_root));
        let other_child = ObjectId::from_hash([0x43; 32]);
        let child = create_version_node(other_child, &other_root, &nodes).unwrap();
        nodes.insert(other_child, child);

        let err = lowest_common_ancestor(&keys[4], &other_child, &nodes).unwrap_err();
        assert!(matches!(err, GraphError::DisjointHistories { .. }));
    }

    #[test]
    fn long_chain_common_ancestors() {
        let (nodes, keys) = chain(100_000);
        let tip = keys[99_999];
        assert_eq!(nodes[&tip].depth, 100_000);
        for i in [0, 1, 7, 34, 53, 9_934, 32_768, 65_535, 65_536, 99_998, 99_999] {
            assert_eq!(
                lowest_common_ancestor(&keys[i], &tip, &nodes).unwrap(),
                keys[i],
                "LCA({i}, 99999)"
            );
        }
        assert_eq!(jump(&tip, 99_999, &nodes).unwrap(), keys[0]);
        assert_eq!(jump(&tip, 70_000, &nodes).unwrap(), keys[29_999]);
    }

    #[test]
    fn long_branches_meet_deep_in_history() {
        // two arms of 40_000 nodes forking from node 1_000 of a trunk
        let mut parents: Vec<usize> = (0..2_000usize).map(|i| i.saturating_sub(1)).collect();
        let fork = 1_000;
        let arm_len = 40_000;
        let left_start = parents.len();
        for j in 0..arm_len {
            parents.push(if j == 0 { fork } else { left_start + j - 1 });
        }
        let right_start = parents.len();
        for j in 0..arm_len {
            parents.push(if j == 0 { fork } else { right_start + j - 1 });
        }
        let (nodes, keys) = tree(&parents);
        let left_tip = keys[right_start - 1];
        let right_tip = keys[parents.len() - 1];
        assert_eq!(
            lowest_common_ancestor(&left_tip, &right_tip, &nodes).unwrap(),
            keys[fork]
        );
    }

    proptest::proptest! {
        #[test]
        fn lca_matches_naive_walk(
            picks in proptest::collection::vec(proptest::prelude::any::<proptest::sample::Index>(), 1..80),
            a in proptest::prelude::any::<proptest::sample::Index>(),
            b in proptest::prelude::any::<proptest::sample::Index>(),
        ) {
            let mut parents = vec![0usize];
            for (i, pick) in picks.iter().enumerate() {
                parents.push(pick.index(i + 1));
            }
            let (nodes, keys) = tree(&parents);
            let a = a.index(parents.len());
            let b = b.index(parents.len());

            let lca = lowest_common_ancestor(&keys[a], &keys[b], &nodes).unwrap();
            proptest::prop_assert_eq!(lca, keys[naive_lca(&parents, a, b)]);
            let swapped = lowest_common_ancestor(&keys[b], &keys[a], &nodes).unwrap();
            proptest::prop_assert_eq!(swapped, lca);
            let own = lowest_common_ancestor(&keys[a], &keys[a], &nodes).unwrap();
            proptest::prop_assert_eq!(own, keys[a]);
        }
    }
}
