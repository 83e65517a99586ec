//! DELETE operations for BPlusTree.
//!
//! Removing an entry can leave a non-root node below minimum occupancy. Such a
//! node is paired with an adjacent sibling (the previous one when it exists)
//! and either coalesced with it, when both fit in one node, or topped up by
//! moving a single entry across the separator. Coalescing removes a separator
//! from the parent, so the same step repeats one level up; a root left with a
//! single child is replaced by that child.
//!
//! The parent of each node is resolved before the node is modified, so a failed
//! lookup aborts the operation before anything changes.

use tracing::{debug, error, trace};

use crate::comparator::KeyComparator;
use crate::error::{BPlusTreeError, BTreeResultExt, ModifyResult, TreeResult};
use crate::types::{BPlusTree, NodeId, NodeRef};

/// Where an underfull node sits relative to the sibling chosen to rebalance it.
struct SiblingPair {
    parent_id: NodeId,
    /// Index in the parent of the separator between the two siblings.
    separator_index: usize,
    sibling_id: NodeId,
    sibling_is_left: bool,
}

impl<K: Clone, V, C: KeyComparator<K>> BPlusTree<K, V, C> {
    /// Delete the entry holding exactly `key` and `value`.
    ///
    /// When several equal entries match, the earliest-inserted one is removed.
    /// Returns `Err(BPlusTreeError::KeyNotFound)` and leaves the tree untouched
    /// when no entry matches.
    ///
    /// # Examples
    ///
    /// ```
    /// use bplus_index::{BPlusTree, BPlusTreeError};
    ///
    /// let mut tree = BPlusTree::new(4).unwrap();
    /// tree.insert("a", 1);
    /// tree.insert("a", 2);
    ///
    /// assert_eq!(tree.delete(&"a", &3), Err(BPlusTreeError::KeyNotFound));
    /// assert_eq!(tree.delete(&"a", &2), Ok(()));
    /// assert_eq!(tree.get_all(&"a"), vec![&1]);
    /// ```
    pub fn delete(&mut self, key: &K, value: &V) -> ModifyResult<()>
    where
        V: PartialEq,
    {
        let (leaf_id, index) = self
            .locate_entry(key, |candidate| candidate == value)
            .ok_or(BPlusTreeError::KeyNotFound)?;
        self.delete_leaf_entry(leaf_id, index)
            .map(|_| ())
            .with_operation("delete")
    }

    /// Remove the earliest-inserted entry for `key`, returning its value.
    ///
    /// # Panics
    ///
    /// Panics if the tree's structural invariants turn out to be broken.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let (leaf_id, index) = self.locate_entry(key, |_| true)?;
        match self.delete_leaf_entry(leaf_id, index) {
            Ok((_, value)) => Some(value),
            Err(err) => {
                error!(%err, "remove aborted on a broken tree");
                panic!("B+ tree invariant violated during remove: {}", err);
            }
        }
    }

    // ============================================================================
    // ENTRY REMOVAL
    // ============================================================================

    /// Remove entry `index` from a leaf and restore occupancy.
    fn delete_leaf_entry(&mut self, leaf_id: NodeId, index: usize) -> TreeResult<(K, V)> {
        let node = NodeRef::leaf(leaf_id);
        let parent = self.find_parent(node)?;

        let leaf = self.leaf_mut(leaf_id)?;
        if index >= leaf.len() {
            return Err(BPlusTreeError::invariant(
                "delete",
                &format!("entry {} out of bounds for leaf {}", index, leaf_id),
            ));
        }
        let entry = leaf.remove_at(index);
        let (is_empty, is_underfull) = (leaf.is_empty(), leaf.is_underfull());

        match parent {
            None if is_empty => {
                self.leaf_arena.deallocate(leaf_id);
                self.root = None;
                debug!(leaf = leaf_id, "removed last entry, tree is empty");
            }
            None => {}
            Some((parent_id, child_index)) if is_underfull => {
                self.rebalance(node, parent_id, child_index)?;
            }
            Some(_) => {}
        }
        Ok(entry)
    }

    /// Remove `keys[separator_index]` and the child to its right from a branch
    /// and restore occupancy.
    fn delete_branch_entry(&mut self, branch_id: NodeId, separator_index: usize) -> TreeResult<()> {
        let node = NodeRef::branch(branch_id);
        let parent = self.find_parent(node)?;

        let branch = self.branch_mut(branch_id)?;
        branch.remove_separator(separator_index).ok_or_else(|| {
            BPlusTreeError::invariant(
                "delete",
                &format!("separator {} out of bounds for branch {}", separator_index, branch_id),
            )
        })?;
        let is_underfull = branch.is_underfull();
        let sole_child = (branch.children.len() == 1).then(|| branch.children[0]);

        match parent {
            None => {
                if let Some(child) = sole_child {
                    self.branch_arena.deallocate(branch_id);
                    self.root = Some(child);
                    debug!(old_root = branch_id, new_root = ?child, "collapsed root");
                }
            }
            Some((parent_id, child_index)) if is_underfull => {
                self.rebalance(node, parent_id, child_index)?;
            }
            Some(_) => {}
        }
        Ok(())
    }

    // ============================================================================
    // REBALANCING
    // ============================================================================

    fn rebalance(&mut self, node: NodeRef<K, V>, parent_id: NodeId, child_index: usize) -> TreeResult<()> {
        let pair = self.sibling_pair(parent_id, child_index)?;
        match node {
            NodeRef::Leaf(id, _) => self.rebalance_leaf(id, pair),
            NodeRef::Branch(id, _) => self.rebalance_branch(id, pair),
        }
    }

    /// Choose the previous sibling when there is one, else the next.
    fn sibling_pair(&self, parent_id: NodeId, child_index: usize) -> TreeResult<SiblingPair> {
        let parent = self.branch(parent_id)?;
        let (separator_index, sibling_index, sibling_is_left) = if child_index > 0 {
            (child_index - 1, child_index - 1, true)
        } else {
            (0, 1, false)
        };
        let sibling = parent.children.get(sibling_index).ok_or_else(|| {
            BPlusTreeError::invariant(
                "rebalance",
                &format!("branch {} has no sibling for child {}", parent_id, child_index),
            )
        })?;

        Ok(SiblingPair {
            parent_id,
            separator_index,
            sibling_id: sibling.id(),
            sibling_is_left,
        })
    }

    fn rebalance_leaf(&mut self, leaf_id: NodeId, pair: SiblingPair) -> TreeResult<()> {
        let sibling_id = pair.sibling_id;
        let (left_id, right_id) = if pair.sibling_is_left {
            (sibling_id, leaf_id)
        } else {
            (leaf_id, sibling_id)
        };

        let combined = self.leaf(leaf_id)?.len() + self.leaf(sibling_id)?.len();
        if combined <= self.fanout - 1 {
            let mut absorbed = self
                .leaf_arena
                .deallocate(right_id)
                .ok_or_else(|| BPlusTreeError::missing_node("leaf", right_id))?;
            self.leaf_mut(left_id)?.merge_from(&mut absorbed);
            trace!(left = left_id, absorbed = right_id, "coalesced leaves");
            return self.delete_branch_entry(pair.parent_id, pair.separator_index);
        }

        let new_separator = if pair.sibling_is_left {
            let (key, value) = self
                .leaf_mut(sibling_id)?
                .borrow_last()
                .ok_or_else(|| BPlusTreeError::invariant("redistribute", "left leaf is empty"))?;
            let separator = key.clone();
            self.leaf_mut(leaf_id)?.accept_from_left(key, value);
            separator
        } else {
            let sibling = self.leaf_mut(sibling_id)?;
            let (key, value) = sibling
                .borrow_first()
                .ok_or_else(|| BPlusTreeError::invariant("redistribute", "right leaf is empty"))?;
            let separator = sibling
                .first_key()
                .cloned()
                .ok_or_else(|| BPlusTreeError::invariant("redistribute", "right leaf drained"))?;
            self.leaf_mut(leaf_id)?.accept_from_right(key, value);
            separator
        };

        self.branch_mut(pair.parent_id)?.keys[pair.separator_index] = new_separator;
        trace!(leaf = leaf_id, sibling = sibling_id, "redistributed leaf entry");
        Ok(())
    }

    fn rebalance_branch(&mut self, branch_id: NodeId, pair: SiblingPair) -> TreeResult<()> {
        let sibling_id = pair.sibling_id;
        let (left_id, right_id) = if pair.sibling_is_left {
            (sibling_id, branch_id)
        } else {
            (branch_id, sibling_id)
        };

        let separator = self
            .branch(pair.parent_id)?
            .keys
            .get(pair.separator_index)
            .cloned()
            .ok_or_else(|| BPlusTreeError::invariant("rebalance", "separator index out of bounds"))?;

        let combined = self.branch(branch_id)?.children.len() + self.branch(sibling_id)?.children.len();
        if combined <= self.fanout {
            let mut absorbed = self
                .branch_arena
                .deallocate(right_id)
                .ok_or_else(|| BPlusTreeError::missing_node("branch", right_id))?;
            self.branch_mut(left_id)?.merge_from(separator, &mut absorbed);
            trace!(left = left_id, absorbed = right_id, "coalesced branches");
            return self.delete_branch_entry(pair.parent_id, pair.separator_index);
        }

        let new_separator = if pair.sibling_is_left {
            let (moved_key, moved_child) = self
                .branch_mut(sibling_id)?
                .borrow_last()
                .ok_or_else(|| BPlusTreeError::invariant("redistribute", "left branch has no keys"))?;
            self.branch_mut(branch_id)?
                .accept_from_left(separator, moved_key, moved_child)
        } else {
            let (moved_key, moved_child) = self
                .branch_mut(sibling_id)?
                .borrow_first()
                .ok_or_else(|| BPlusTreeError::invariant("redistribute", "right branch has no keys"))?;
            self.branch_mut(branch_id)?
                .accept_from_right(separator, moved_key, moved_child)
        };

        self.branch_mut(pair.parent_id)?.keys[pair.separator_index] = new_separator;
        trace!(branch = branch_id, sibling = sibling_id, "redistributed branch child");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree_with(fanout: usize, keys: impl IntoIterator<Item = i32>) -> BPlusTree<i32, i32> {
        let mut tree = BPlusTree::new(fanout).unwrap();
        for key in keys {
            tree.insert(key, key);
        }
        tree
    }

    #[test]
    fn test_delete_scenario_fanout_4() {
        let mut tree = tree_with(4, [5, 10, 15, 20]);
        assert_eq!(tree.leaf_sizes(), vec![2, 2]);

        tree.delete(&5, &5).unwrap();
        tree.check_invariants_detailed().unwrap();
        // [10] and [15, 20] fit in one leaf, so they coalesce and the root collapses.
        assert_eq!(tree.height(), 1);
        assert_eq!(tree.keys().copied().collect::<Vec<_>>(), vec![10, 15, 20]);
        assert_eq!((tree.leaf_arena.len(), tree.branch_arena.len()), (1, 0));
    }

    #[test]
    fn test_delete_redistributes_from_right_sibling() {
        let mut tree = tree_with(4, [5, 10, 15, 20, 25]);
        assert_eq!(tree.leaf_sizes(), vec![2, 3]);

        tree.delete(&5, &5).unwrap();
        tree.check_invariants_detailed().unwrap();
        assert_eq!(tree.leaf_sizes(), vec![2, 2]);
        assert_eq!(tree.render_structure(), "[20]\n  [10, 15]\n  [20, 25]\n");
    }

    #[test]
    fn test_delete_redistributes_from_left_sibling() {
        let mut tree = tree_with(4, [10, 15, 20, 25, 5]);
        assert_eq!(tree.leaf_sizes(), vec![3, 2]);

        tree.delete(&25, &25).unwrap();
        tree.check_invariants_detailed().unwrap();
        assert_eq!(tree.leaf_sizes(), vec![2, 2]);
        assert_eq!(tree.render_structure(), "[15]\n  [5, 10]\n  [15, 20]\n");
    }

    #[test]
    fn test_delete_missing_entry_is_noop() {
        let mut tree = tree_with(4, 0..30);
        let before = tree.render_structure();

        assert_eq!(tree.delete(&100, &100), Err(BPlusTreeError::KeyNotFound));
        assert_eq!(tree.delete(&3, &4), Err(BPlusTreeError::KeyNotFound));
        assert_eq!(tree.render_structure(), before);
        assert_eq!(tree.len(), 30);
    }

    #[test]
    fn test_delete_everything_empties_tree() {
        let mut tree = tree_with(3, 0..50);
        for key in 0..50 {
            tree.delete(&key, &key).unwrap();
            tree.check_invariants_detailed().unwrap();
        }
        assert!(tree.is_empty());
        assert!(tree.root.is_none());
        assert_eq!((tree.leaf_arena.len(), tree.branch_arena.len()), (0, 0));

        tree.insert(7, 7);
        assert_eq!(tree.get(&7), Some(&7));
    }

    #[test]
    fn test_delete_in_reverse_and_middle_out() {
        for fanout in [3, 4, 5, 7] {
            let mut tree = tree_with(fanout, 0..120);
            for key in (0..120).rev().step_by(2) {
                tree.delete(&key, &key).unwrap();
                tree.check_invariants_detailed().unwrap();
            }
            for key in (0..120).step_by(2) {
                tree.delete(&key, &key).unwrap();
                tree.check_invariants_detailed().unwrap();
            }
            assert!(tree.is_empty(), "fanout {}", fanout);
        }
    }

    #[test]
    fn test_branch_underflow_propagates() {
        let mut tree = tree_with(3, 0..40);
        let initial_height = tree.height();
        for key in 0..36 {
            tree.delete(&key, &key).unwrap();
        }
        tree.check_invariants_detailed().unwrap();
        assert!(tree.height() < initial_height);
        assert_eq!(tree.keys().copied().collect::<Vec<_>>(), vec![36, 37, 38, 39]);
    }

    #[test]
    fn test_remove_returns_earliest_value() {
        let mut tree = BPlusTree::new(3).unwrap();
        for value in 0..10 {
            tree.insert(1, value);
        }
        assert_eq!(tree.remove(&1), Some(0));
        assert_eq!(tree.remove(&1), Some(1));
        assert_eq!(tree.remove(&2), None);
        assert_eq!(tree.get_all(&1).len(), 8);
        tree.check_invariants_detailed().unwrap();
    }

    #[test]
    fn test_delete_duplicate_in_earlier_leaf() {
        let mut tree = BPlusTree::new(3).unwrap();
        for value in 0..9 {
            tree.insert(4, value);
        }
        tree.delete(&4, &0).unwrap();
        tree.delete(&4, &5).unwrap();
        tree.check_invariants_detailed().unwrap();
        let remaining: Vec<i32> = tree.get_all(&4).into_iter().copied().collect();
        assert_eq!(remaining, vec![1, 2, 3, 4, 6, 7, 8]);
    }
}
