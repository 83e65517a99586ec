//! Node implementations for BPlusTree.
//!
//! Node-local operations: ordered insertion, splitting, removal, and the
//! borrow/accept/merge helpers used when a sibling pair is rebalanced. None of
//! these touch the arena; the tree-level engines wire results into it.

use std::cmp::Ordering;

use crate::comparator::KeyComparator;
use crate::types::{BranchNode, InsertResult, LeafNode, NodeId, NodeRef, SplitNodeData, NULL_NODE};

// ============================================================================
// LEAF NODE IMPLEMENTATION
// ============================================================================

impl<K, V> LeafNode<K, V> {
    /// Returns the number of entries in this leaf.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Maximum number of entries: `fanout - 1`.
    pub fn max_keys(&self) -> usize {
        self.fanout - 1
    }

    /// Minimum entries for a non-root leaf: `ceil((fanout - 1) / 2)`.
    pub fn min_keys(&self) -> usize {
        self.fanout / 2
    }

    pub fn is_full(&self) -> bool {
        self.keys.len() >= self.max_keys()
    }

    pub fn is_underfull(&self) -> bool {
        self.keys.len() < self.min_keys()
    }

    pub fn first_key(&self) -> Option<&K> {
        self.keys.first()
    }

    pub fn last_key(&self) -> Option<&K> {
        self.keys.last()
    }

    /// Index just past every key equal to `key`, so equal keys keep insertion order.
    pub(crate) fn upper_bound<C: KeyComparator<K>>(&self, key: &K, cmp: &C) -> usize {
        self.keys
            .partition_point(|probe| cmp.compare(probe, key) != Ordering::Greater)
    }

    /// Index of the first key not less than `key`.
    pub(crate) fn lower_bound<C: KeyComparator<K>>(&self, key: &K, cmp: &C) -> usize {
        self.keys
            .partition_point(|probe| cmp.compare(probe, key) == Ordering::Less)
    }

    /// Insert an entry after any equal keys, splitting when the leaf overflows.
    ///
    /// On a split this leaf keeps the first `ceil(fanout / 2)` of the `fanout`
    /// entries and the returned right half takes the rest together with this
    /// leaf's old chain link. The caller links this leaf to the right half once
    /// it has an id.
    pub(crate) fn insert<C: KeyComparator<K>>(&mut self, key: K, value: V, cmp: &C) -> InsertResult<K, V>
    where
        K: Clone,
    {
        let index = self.upper_bound(&key, cmp);
        let overflow = self.is_full();
        self.keys.insert(index, key);
        self.values.insert(index, value);

        if !overflow {
            return InsertResult::Fitted;
        }

        let new_right = self.split();
        let separator_key = new_right.keys[0].clone();
        InsertResult::Split {
            new_node_data: SplitNodeData::Leaf(new_right),
            separator_key,
        }
    }

    /// Split an overfull leaf, returning the new right node.
    fn split(&mut self) -> LeafNode<K, V> {
        let mid = self.fanout.div_ceil(2);
        let right_keys = self.keys.split_off(mid);
        let right_values = self.values.split_off(mid);

        let mut new_right = LeafNode::new(self.fanout);
        new_right.keys.extend(right_keys);
        new_right.values.extend(right_values);
        new_right.next = self.next;
        self.next = NULL_NODE;
        new_right
    }

    /// Remove the entry at `index`.
    pub(crate) fn remove_at(&mut self, index: usize) -> (K, V) {
        (self.keys.remove(index), self.values.remove(index))
    }

    // ============================================================================
    // BORROWING AND MERGING HELPERS
    // ============================================================================

    /// Give up the last entry (this leaf is the left sibling).
    pub(crate) fn borrow_last(&mut self) -> Option<(K, V)> {
        Some((self.keys.pop()?, self.values.pop()?))
    }

    /// Give up the first entry (this leaf is the right sibling).
    pub(crate) fn borrow_first(&mut self) -> Option<(K, V)> {
        if self.keys.is_empty() {
            return None;
        }
        Some(self.remove_at(0))
    }

    pub(crate) fn accept_from_left(&mut self, key: K, value: V) {
        self.keys.insert(0, key);
        self.values.insert(0, value);
    }

    pub(crate) fn accept_from_right(&mut self, key: K, value: V) {
        self.keys.push(key);
        self.values.push(value);
    }

    /// Absorb every entry of the right neighbour and take over its chain link.
    pub(crate) fn merge_from(&mut self, other: &mut LeafNode<K, V>) {
        self.keys.append(&mut other.keys);
        self.values.append(&mut other.values);
        self.next = other.next;
        other.next = NULL_NODE;
    }

    pub(crate) fn next_id(&self) -> Option<NodeId> {
        (self.next != NULL_NODE).then_some(self.next)
    }
}

// ============================================================================
// BRANCH NODE IMPLEMENTATION
// ============================================================================

impl<K, V> BranchNode<K, V> {
    /// Returns the number of separator keys.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn max_keys(&self) -> usize {
        self.fanout - 1
    }

    /// Minimum children for a non-root branch: `ceil(fanout / 2)`.
    pub fn min_children(&self) -> usize {
        self.fanout.div_ceil(2)
    }

    pub fn is_full(&self) -> bool {
        self.keys.len() >= self.max_keys()
    }

    pub fn is_underfull(&self) -> bool {
        self.children.len() < self.min_children()
    }

    /// Index of the child to descend into for `key`: past every separator `<= key`.
    pub fn find_child_index<C: KeyComparator<K>>(&self, key: &K, cmp: &C) -> usize {
        self.keys
            .partition_point(|sep| cmp.compare(sep, key) != Ordering::Greater)
    }

    /// Index of the leftmost child whose range can hold `key`.
    pub fn lower_child_index<C: KeyComparator<K>>(&self, key: &K, cmp: &C) -> usize {
        self.keys
            .partition_point(|sep| cmp.compare(sep, key) == Ordering::Less)
    }

    /// Position of `child` among this branch's children.
    pub fn child_position(&self, child: NodeRef<K, V>) -> Option<usize> {
        self.children.iter().position(|candidate| *candidate == child)
    }

    /// Insert `separator_key` and `new_child` right after the child at `child_index`.
    ///
    /// A full branch is split: of the `fanout` keys and `fanout + 1` children,
    /// this branch keeps the first `m - 1` keys and `m` children
    /// (`m = ceil(fanout / 2)`), key `m - 1` is promoted, and the returned right
    /// branch takes the rest.
    pub(crate) fn insert_child(
        &mut self,
        child_index: usize,
        separator_key: K,
        new_child: NodeRef<K, V>,
    ) -> InsertResult<K, V> {
        let overflow = self.is_full();
        self.keys.insert(child_index, separator_key);
        self.children.insert(child_index + 1, new_child);

        if !overflow {
            return InsertResult::Fitted;
        }

        let (new_right, promoted_key) = self.split();
        InsertResult::Split {
            new_node_data: SplitNodeData::Branch(new_right),
            separator_key: promoted_key,
        }
    }

    fn split(&mut self) -> (BranchNode<K, V>, K) {
        let mid = self.fanout.div_ceil(2);
        let right_keys = self.keys.split_off(mid);
        let right_children = self.children.split_off(mid);
        // keys.len() == mid >= 2 here; the last remaining key moves up.
        let promoted_key = self.keys.remove(mid - 1);

        let mut new_right = BranchNode::new(self.fanout);
        new_right.keys.extend(right_keys);
        new_right.children.extend(right_children);
        (new_right, promoted_key)
    }

    /// Remove `keys[left_index]` and the child to its right.
    pub(crate) fn remove_separator(&mut self, left_index: usize) -> Option<(K, NodeRef<K, V>)> {
        if left_index >= self.keys.len() {
            return None;
        }
        let key = self.keys.remove(left_index);
        let child = self.children.remove(left_index + 1);
        Some((key, child))
    }

    // ============================================================================
    // BORROWING AND MERGING HELPERS
    // ============================================================================

    /// Give up the last key and child (this branch is the left sibling).
    pub(crate) fn borrow_last(&mut self) -> Option<(K, NodeRef<K, V>)> {
        if self.keys.is_empty() {
            return None;
        }
        Some((self.keys.pop()?, self.children.pop()?))
    }

    /// Give up the first key and child (this branch is the right sibling).
    pub(crate) fn borrow_first(&mut self) -> Option<(K, NodeRef<K, V>)> {
        if self.keys.is_empty() {
            return None;
        }
        Some((self.keys.remove(0), self.children.remove(0)))
    }

    /// Take a child from the left sibling. The parent separator comes down as
    /// the first key; the returned key is the new parent separator.
    pub(crate) fn accept_from_left(&mut self, separator: K, moved_key: K, moved_child: NodeRef<K, V>) -> K {
        self.keys.insert(0, separator);
        self.children.insert(0, moved_child);
        moved_key
    }

    /// Take a child from the right sibling. The parent separator comes down as
    /// the last key; the returned key is the new parent separator.
    pub(crate) fn accept_from_right(&mut self, separator: K, moved_key: K, moved_child: NodeRef<K, V>) -> K {
        self.keys.push(separator);
        self.children.push(moved_child);
        moved_key
    }

    /// Absorb the right neighbour, pulling the parent separator down between them.
    pub(crate) fn merge_from(&mut self, separator: K, other: &mut BranchNode<K, V>) {
        self.keys.push(separator);
        self.keys.append(&mut other.keys);
        self.children.append(&mut other.children);
    }
}
