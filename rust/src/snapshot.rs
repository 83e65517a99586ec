//! Deep copies of a tree.
//!
//! A snapshot rebuilds both arenas from the reachable nodes only, so node ids
//! in the copy are dense and unrelated to the original's. Leaf chain links are
//! rewritten through an id map once every leaf has been copied.

use std::collections::HashMap;

use tracing::{debug, error};

use crate::error::{BPlusTreeError, InitResult, TreeResult};
use crate::types::{BPlusTree, BranchNode, LeafNode, NodeId, NodeRef, NULL_NODE};

impl<K: Clone, V: Clone, C: Clone> BPlusTree<K, V, C> {
    /// Produce an independent copy of the tree.
    ///
    /// Later mutations of either tree are not visible in the other.
    ///
    /// # Examples
    ///
    /// ```
    /// use bplus_index::BPlusTree;
    ///
    /// let mut tree = BPlusTree::new(4).unwrap();
    /// for key in 0..10 {
    ///     tree.insert(key, key);
    /// }
    /// let copy = tree.try_snapshot().unwrap();
    /// tree.remove(&3);
    ///
    /// assert_eq!(copy.get(&3), Some(&3));
    /// assert_eq!(tree.get(&3), None);
    /// ```
    pub fn try_snapshot(&self) -> InitResult<Self> {
        let mut copy = Self::empty_with(self.fanout, self.comparator.clone());
        let Some(root) = self.root else {
            return Ok(copy);
        };

        let mut leaf_ids = HashMap::with_capacity(self.leaf_arena.len());
        copy.root = Some(self.copy_node(root, &mut copy, &mut leaf_ids)?);

        for (&old_id, &new_id) in &leaf_ids {
            let old_next = self.leaf(old_id)?.next;
            let new_next = if old_next == NULL_NODE {
                NULL_NODE
            } else {
                *leaf_ids.get(&old_next).ok_or_else(|| {
                    BPlusTreeError::invariant("snapshot", &format!("leaf chain points at {}", old_next))
                })?
            };
            copy.leaf_mut(new_id)?.next = new_next;
        }

        debug!(
            leaves = copy.leaf_arena.len(),
            branches = copy.branch_arena.len(),
            "snapshot complete"
        );
        Ok(copy)
    }

    fn copy_node(
        &self,
        node: NodeRef<K, V>,
        copy: &mut Self,
        leaf_ids: &mut HashMap<NodeId, NodeId>,
    ) -> TreeResult<NodeRef<K, V>> {
        match node {
            NodeRef::Leaf(id, _) => {
                let leaf = self.leaf(id)?;
                let new_leaf = LeafNode {
                    fanout: leaf.fanout,
                    keys: leaf.keys.clone(),
                    values: leaf.values.clone(),
                    next: NULL_NODE,
                };
                let new_id = copy.leaf_arena.allocate(new_leaf)?;
                leaf_ids.insert(id, new_id);
                Ok(NodeRef::leaf(new_id))
            }
            NodeRef::Branch(id, _) => {
                let branch = self.branch(id)?;
                let mut new_branch = BranchNode::new(branch.fanout);
                new_branch.keys = branch.keys.clone();
                for child in &branch.children {
                    let new_child = self.copy_node(*child, copy, leaf_ids)?;
                    new_branch.children.push(new_child);
                }
                Ok(NodeRef::branch(copy.branch_arena.allocate(new_branch)?))
            }
        }
    }
}

impl<K: Clone, V: Clone, C: Clone> Clone for BPlusTree<K, V, C> {
    /// # Panics
    ///
    /// Panics if the source tree's structural invariants are broken.
    fn clone(&self) -> Self {
        match self.try_snapshot() {
            Ok(copy) => copy,
            Err(err) => {
                error!(%err, "snapshot of a broken tree");
                panic!("B+ tree invariant violated during clone: {}", err);
            }
        }
    }
}
