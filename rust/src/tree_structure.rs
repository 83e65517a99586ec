//! Tree structure management operations for BPlusTree.
//!
//! Size queries, clearing, node counting, and arena statistics.

use crate::arena::ArenaStats;
use crate::types::{BPlusTree, NodeRef};

// ============================================================================
// TREE STRUCTURE OPERATIONS
// ============================================================================

impl<K, V, C> BPlusTree<K, V, C> {
    /// Returns the number of entries in the tree, counting duplicates.
    pub fn len(&self) -> usize {
        self.leaves().map(|leaf| leaf.len()).sum()
    }

    /// Returns true if the tree holds no entries.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Returns true if the root is a leaf node.
    pub fn is_leaf_root(&self) -> bool {
        matches!(self.root, Some(NodeRef::Leaf(_, _)))
    }

    /// Number of levels from the root down to the leaves; 0 for an empty tree.
    pub fn height(&self) -> usize {
        let mut height = 0;
        let mut current = self.root;
        while let Some(node) = current {
            height += 1;
            current = match node {
                NodeRef::Leaf(_, _) => None,
                NodeRef::Branch(id, _) => self
                    .get_branch(id)
                    .and_then(|branch| branch.children.first().copied()),
            };
        }
        height
    }

    /// Returns the number of leaf nodes in the tree.
    pub fn leaf_count(&self) -> usize {
        self.count_nodes_in_tree().0
    }

    /// Remove every entry and release all nodes.
    pub fn clear(&mut self) {
        self.leaf_arena.clear();
        self.branch_arena.clear();
        self.root = None;
    }

    /// Count the leaf and branch nodes reachable from the root.
    pub fn count_nodes_in_tree(&self) -> (usize, usize) {
        match self.root {
            Some(root) => self.count_nodes_recursive(root),
            None => (0, 0),
        }
    }

    fn count_nodes_recursive(&self, node: NodeRef<K, V>) -> (usize, usize) {
        match node {
            NodeRef::Leaf(_, _) => (1, 0),
            NodeRef::Branch(id, _) => {
                let Some(branch) = self.get_branch(id) else {
                    return (0, 0);
                };
                branch
                    .children
                    .iter()
                    .map(|child| self.count_nodes_recursive(*child))
                    .fold((0, 1), |(leaves, branches), (l, b)| (leaves + l, branches + b))
            }
        }
    }

    /// The smallest entry (the earliest inserted among equal keys).
    pub fn first(&self) -> Option<(&K, &V)> {
        self.iter().next()
    }

    /// The largest entry (the latest inserted among equal keys).
    pub fn last(&self) -> Option<(&K, &V)> {
        let mut current = self.root?;
        loop {
            match current {
                NodeRef::Leaf(id, _) => {
                    let leaf = self.get_leaf(id)?;
                    return leaf.keys.last().zip(leaf.values.last());
                }
                NodeRef::Branch(id, _) => current = *self.get_branch(id)?.children.last()?,
            }
        }
    }

    // ============================================================================
    // ARENA STATISTICS
    // ============================================================================

    pub fn leaf_arena_stats(&self) -> ArenaStats {
        self.leaf_arena.stats()
    }

    pub fn branch_arena_stats(&self) -> ArenaStats {
        self.branch_arena.stats()
    }
}
