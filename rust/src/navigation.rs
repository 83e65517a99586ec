//! Navigation and lookup operations for BPlusTree.
//!
//! `find` performs the key-to-leaf descent. `find_parent` recovers the parent
//! of any node by descending again from the root, since nodes keep no parent
//! links. Lookups that must see every equal key start at the leftmost leaf that
//! can hold the key and follow the leaf chain.

use std::cmp::Ordering;

use crate::comparator::KeyComparator;
use crate::error::{BPlusTreeError, TreeResult};
use crate::iteration::LeafRef;
use crate::types::{BPlusTree, BranchNode, LeafNode, NodeId, NodeRef};

impl<K, V, C: KeyComparator<K>> BPlusTree<K, V, C> {
    // ============================================================================
    // DESCENT
    // ============================================================================

    /// Find the leaf that holds `key`, or the leaf it would be inserted into.
    ///
    /// When equal keys span several leaves, the leaf holding the earliest of
    /// them is returned. Returns `None` for an empty tree.
    ///
    /// # Examples
    ///
    /// ```
    /// use bplus_index::BPlusTree;
    ///
    /// let mut tree = BPlusTree::new(4).unwrap();
    /// for key in [5, 10, 15, 20] {
    ///     tree.insert(key, ());
    /// }
    /// let leaf = tree.find(&15).unwrap();
    /// assert_eq!(leaf.keys(), &[15, 20]);
    /// assert!(leaf.next_leaf().is_none());
    /// ```
    pub fn find(&self, key: &K) -> Option<LeafRef<'_, K, V>> {
        let id = match self.locate_entry(key, |_| true) {
            Some((id, _)) => id,
            None => self.find_leaf_id(key)?,
        };
        LeafRef::new(self, id)
    }

    /// Insertion descent: every separator `<= key` is passed, so an exact
    /// separator match continues in the right subtree.
    pub(crate) fn find_leaf_id(&self, key: &K) -> Option<NodeId> {
        let mut current = self.root?;
        loop {
            match current {
                NodeRef::Leaf(id, _) => return Some(id),
                NodeRef::Branch(id, _) => {
                    let branch = self.get_branch(id)?;
                    current = *branch
                        .children
                        .get(branch.find_child_index(key, &self.comparator))?;
                }
            }
        }
    }

    /// Descend to the leftmost leaf whose range can hold `key`.
    fn find_first_candidate_leaf(&self, key: &K) -> Option<NodeId> {
        let mut current = self.root?;
        loop {
            match current {
                NodeRef::Leaf(id, _) => return Some(id),
                NodeRef::Branch(id, _) => {
                    let branch = self.get_branch(id)?;
                    current = *branch
                        .children
                        .get(branch.lower_child_index(key, &self.comparator))?;
                }
            }
        }
    }

    /// Locate the earliest entry with `key` whose value satisfies `matches`.
    pub(crate) fn locate_entry<F>(&self, key: &K, mut matches: F) -> Option<(NodeId, usize)>
    where
        F: FnMut(&V) -> bool,
    {
        let mut leaf_id = self.find_first_candidate_leaf(key)?;
        loop {
            let leaf = self.get_leaf(leaf_id)?;
            let start = leaf.lower_bound(key, &self.comparator);
            for index in start..leaf.keys.len() {
                if self.comparator.compare(&leaf.keys[index], key) != Ordering::Equal {
                    return None;
                }
                if matches(&leaf.values[index]) {
                    return Some((leaf_id, index));
                }
            }
            leaf_id = leaf.next_id()?;
        }
    }

    // ============================================================================
    // PARENT RECOVERY
    // ============================================================================

    /// Recover the parent of `node` and the node's position among its children.
    ///
    /// Returns `Ok(None)` for the root. The node's first key steers a fresh
    /// descent from the root; every child whose separator range admits that
    /// key is considered, so runs of equal keys spanning several children are
    /// handled. The node must still hold at least one key.
    pub(crate) fn find_parent(&self, node: NodeRef<K, V>) -> TreeResult<Option<(NodeId, usize)>> {
        let root = self
            .root
            .ok_or_else(|| BPlusTreeError::invariant("find_parent", "tree is empty"))?;
        if root == node {
            return Ok(None);
        }

        let probe = match node {
            NodeRef::Leaf(id, _) => self.leaf(id)?.first_key(),
            NodeRef::Branch(id, _) => self.branch(id)?.keys.first(),
        }
        .ok_or_else(|| BPlusTreeError::invariant("find_parent", "node holds no keys"))?;

        let NodeRef::Branch(root_id, _) = root else {
            return Err(BPlusTreeError::invariant(
                "find_parent",
                &format!("root is a leaf but {:?} is not the root", node),
            ));
        };

        self.search_parent(root_id, node, probe).map(Some).ok_or_else(|| {
            BPlusTreeError::invariant("find_parent", &format!("no parent found for {:?}", node))
        })
    }

    fn search_parent(&self, branch_id: NodeId, target: NodeRef<K, V>, probe: &K) -> Option<(NodeId, usize)> {
        let branch = self.get_branch(branch_id)?;
        let first = branch.lower_child_index(probe, &self.comparator);
        let last = branch.find_child_index(probe, &self.comparator);
        let candidates = &branch.children[first..=last];

        if let Some(offset) = candidates.iter().position(|child| *child == target) {
            return Some((branch_id, first + offset));
        }
        candidates.iter().find_map(|child| match *child {
            NodeRef::Branch(child_id, _) => self.search_parent(child_id, target, probe),
            NodeRef::Leaf(_, _) => None,
        })
    }

    // ============================================================================
    // GET OPERATIONS
    // ============================================================================

    /// Get the earliest-inserted value stored under `key`.
    pub fn get(&self, key: &K) -> Option<&V> {
        let (leaf_id, index) = self.locate_entry(key, |_| true)?;
        self.get_leaf(leaf_id).map(|leaf| &leaf.values[index])
    }

    /// Get every value stored under `key`, in insertion order.
    pub fn get_all(&self, key: &K) -> Vec<&V> {
        let mut values = Vec::new();
        let Some((mut leaf_id, mut index)) = self.locate_entry(key, |_| true) else {
            return values;
        };

        while let Some(leaf) = self.get_leaf(leaf_id) {
            for position in index..leaf.keys.len() {
                if self.comparator.compare(&leaf.keys[position], key) != Ordering::Equal {
                    return values;
                }
                values.push(&leaf.values[position]);
            }
            match leaf.next_id() {
                Some(next) => {
                    leaf_id = next;
                    index = 0;
                }
                None => break,
            }
        }
        values
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.locate_entry(key, |_| true).is_some()
    }

    /// Returns true if the exact key/value pair is stored.
    pub fn contains_entry(&self, key: &K, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.locate_entry(key, |candidate| candidate == value).is_some()
    }
}

impl<K, V, C> BPlusTree<K, V, C> {
    // ============================================================================
    // ARENA ACCESS METHODS
    // ============================================================================

    pub(crate) fn get_leaf(&self, id: NodeId) -> Option<&LeafNode<K, V>> {
        self.leaf_arena.get(id)
    }

    pub(crate) fn get_branch(&self, id: NodeId) -> Option<&BranchNode<K, V>> {
        self.branch_arena.get(id)
    }

    /// Arena lookup that treats a dangling id as an invariant violation.
    pub(crate) fn leaf(&self, id: NodeId) -> TreeResult<&LeafNode<K, V>> {
        self.leaf_arena
            .get(id)
            .ok_or_else(|| BPlusTreeError::missing_node("leaf", id))
    }

    pub(crate) fn leaf_mut(&mut self, id: NodeId) -> TreeResult<&mut LeafNode<K, V>> {
        self.leaf_arena
            .get_mut(id)
            .ok_or_else(|| BPlusTreeError::missing_node("leaf", id))
    }

    pub(crate) fn branch(&self, id: NodeId) -> TreeResult<&BranchNode<K, V>> {
        self.branch_arena
            .get(id)
            .ok_or_else(|| BPlusTreeError::missing_node("branch", id))
    }

    pub(crate) fn branch_mut(&mut self, id: NodeId) -> TreeResult<&mut BranchNode<K, V>> {
        self.branch_arena
            .get_mut(id)
            .ok_or_else(|| BPlusTreeError::missing_node("branch", id))
    }

    /// Get the ID of the first (leftmost) leaf in the tree
    pub(crate) fn first_leaf_id(&self) -> Option<NodeId> {
        let mut current = self.root?;
        loop {
            match current {
                NodeRef::Leaf(id, _) => return Some(id),
                NodeRef::Branch(id, _) => current = *self.get_branch(id)?.children.first()?,
            }
        }
    }
}
