//! INSERT operations for BPlusTree.
//!
//! Insertion locates the target leaf top-down, then splits bottom-up: a full
//! leaf splits and hands its separator to `insert_in_parent`, which either
//! absorbs it or splits the parent in turn. A split of the root grows the tree
//! by one level.

use tracing::{debug, error, trace};

use crate::comparator::KeyComparator;
use crate::error::{BPlusTreeError, BTreeResultExt, ModifyResult, TreeResult};
use crate::types::{BPlusTree, BranchNode, InsertResult, LeafNode, NodeId, NodeRef, SplitNodeData};

impl<K: Clone, V, C: KeyComparator<K>> BPlusTree<K, V, C> {
    /// Insert a key-value pair.
    ///
    /// Equal keys are kept as separate entries; the new entry is placed after
    /// the existing ones.
    ///
    /// # Panics
    ///
    /// Panics if the tree's structural invariants turn out to be broken, which
    /// can only result from a bug in this crate or an inconsistent comparator.
    pub fn insert(&mut self, key: K, value: V) {
        if let Err(err) = self.try_insert(key, value) {
            error!(%err, "insert aborted on a broken tree");
            panic!("B+ tree invariant violated during insert: {}", err);
        }
    }

    /// Insert a key-value pair, reporting invariant violations as errors.
    pub fn try_insert(&mut self, key: K, value: V) -> ModifyResult<()> {
        self.insert_entry(key, value).with_operation("insert")
    }

    fn insert_entry(&mut self, key: K, value: V) -> TreeResult<()> {
        let leaf_id = match self.root {
            None => self.create_root_leaf()?,
            Some(_) => self
                .find_leaf_id(&key)
                .ok_or_else(|| BPlusTreeError::invariant("insert", "descent did not reach a leaf"))?,
        };

        let leaf = self
            .leaf_arena
            .get_mut(leaf_id)
            .ok_or_else(|| BPlusTreeError::missing_node("leaf", leaf_id))?;
        match leaf.insert(key, value, &self.comparator) {
            InsertResult::Fitted => Ok(()),
            InsertResult::Split {
                new_node_data: SplitNodeData::Leaf(new_leaf),
                separator_key,
            } => {
                let new_id = self.leaf_arena.allocate(new_leaf)?;
                self.leaf_mut(leaf_id)?.next = new_id;
                trace!(leaf = leaf_id, new_leaf = new_id, "split leaf");
                self.insert_in_parent(NodeRef::leaf(leaf_id), separator_key, NodeRef::leaf(new_id))
            }
            InsertResult::Split { .. } => Err(BPlusTreeError::invariant(
                "insert",
                "leaf split produced a branch",
            )),
        }
    }

    fn create_root_leaf(&mut self) -> TreeResult<NodeId> {
        let id = self.leaf_arena.allocate(LeafNode::new(self.fanout))?;
        self.root = Some(NodeRef::leaf(id));
        debug!(leaf = id, "created root leaf");
        Ok(id)
    }

    /// Link `new_node` into the tree right after `node`, separated by `key`.
    pub(crate) fn insert_in_parent(
        &mut self,
        node: NodeRef<K, V>,
        key: K,
        new_node: NodeRef<K, V>,
    ) -> TreeResult<()> {
        let Some((parent_id, child_index)) = self.find_parent(node)? else {
            return self.grow_root(node, key, new_node);
        };

        match self.branch_mut(parent_id)?.insert_child(child_index, key, new_node) {
            InsertResult::Fitted => Ok(()),
            InsertResult::Split {
                new_node_data: SplitNodeData::Branch(new_branch),
                separator_key,
            } => {
                let new_id = self.branch_arena.allocate(new_branch)?;
                trace!(branch = parent_id, new_branch = new_id, "split branch");
                self.insert_in_parent(NodeRef::branch(parent_id), separator_key, NodeRef::branch(new_id))
            }
            InsertResult::Split { .. } => Err(BPlusTreeError::invariant(
                "insert_in_parent",
                "branch split produced a leaf",
            )),
        }
    }

    /// Replace the root with a branch over the two halves of the old root.
    fn grow_root(&mut self, left: NodeRef<K, V>, key: K, right: NodeRef<K, V>) -> TreeResult<()> {
        let mut new_root = BranchNode::new(self.fanout);
        new_root.keys.push(key);
        new_root.children.push(left);
        new_root.children.push(right);

        let root_id = self.branch_arena.allocate(new_root)?;
        self.root = Some(NodeRef::branch(root_id));
        debug!(root = root_id, height = self.height(), "grew new root");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_insert_creates_root_leaf() {
        let mut tree = BPlusTree::new(4).unwrap();
        tree.insert(1, "one");
        assert!(matches!(tree.root, Some(NodeRef::Leaf(_, _))));
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.get(&1), Some(&"one"));
    }

    #[test]
    fn test_leaf_with_room_does_not_split() {
        let mut tree = BPlusTree::new(4).unwrap();
        for key in [5, 10, 15] {
            tree.insert(key, ());
        }
        assert_eq!(tree.leaf_count(), 1);
        assert_eq!(tree.height(), 1);
    }

    #[test]
    fn test_root_split_scenario() {
        let mut tree = BPlusTree::new(4).unwrap();
        for key in [5, 10, 15, 20] {
            tree.insert(key, key);
        }

        let root_id = match tree.root {
            Some(NodeRef::Branch(id, _)) => id,
            other => panic!("expected branch root, got {:?}", other),
        };
        let root = tree.get_branch(root_id).unwrap();
        assert_eq!(root.keys, vec![15]);
        assert_eq!(tree.leaf_sizes(), vec![2, 2]);
        assert_eq!(tree.keys().copied().collect::<Vec<_>>(), vec![5, 10, 15, 20]);
        tree.check_invariants_detailed().unwrap();
    }

    #[test]
    fn test_branch_split_grows_height() {
        let mut tree = BPlusTree::new(3).unwrap();
        for key in 0..32 {
            tree.insert(key, key);
            tree.check_invariants_detailed().unwrap();
        }
        assert!(tree.height() >= 4);
        assert_eq!(tree.len(), 32);
    }

    #[test]
    fn test_descending_and_interleaved_inserts() {
        let mut tree = BPlusTree::new(5).unwrap();
        for key in (0..100).rev() {
            tree.insert(key, key);
        }
        for key in (100..200).step_by(2).chain((101..200).step_by(2)) {
            tree.insert(key, key);
        }
        tree.check_invariants_detailed().unwrap();
        assert_eq!(tree.keys().copied().collect::<Vec<_>>(), (0..200).collect::<Vec<_>>());
    }

    #[test]
    fn test_duplicates_keep_insertion_order() {
        let mut tree = BPlusTree::new(3).unwrap();
        for value in 0..25 {
            tree.insert(value % 3, value);
        }
        tree.check_invariants_detailed().unwrap();
        let zeros: Vec<i32> = tree.get_all(&0).into_iter().copied().collect();
        assert_eq!(zeros, (0..25).filter(|v| v % 3 == 0).collect::<Vec<_>>());
    }

    #[test]
    fn test_try_insert_succeeds() {
        let mut tree = BPlusTree::new(4).unwrap();
        assert!(tree.try_insert(1, 1).is_ok());
        assert!(tree.contains_entry(&1, &1));
    }
}
