//! Iterator implementations for BPlusTree.
//!
//! All ordered traversal follows the leaf chain from the leftmost leaf; branch
//! nodes are only visited once, to find that leaf.

use std::fmt;
use std::iter::FusedIterator;

use crate::arena::NodeArena;
use crate::types::{BPlusTree, LeafNode, NodeId};

// ============================================================================
// LEAF HANDLE
// ============================================================================

/// Read-only handle to a leaf node.
///
/// Obtained from `BPlusTree::find` or `BPlusTree::first_leaf`. Following
/// `next_leaf` visits the remaining leaves in ascending key order.
pub struct LeafRef<'a, K, V> {
    arena: &'a NodeArena<LeafNode<K, V>>,
    id: NodeId,
    leaf: &'a LeafNode<K, V>,
}

impl<'a, K, V> LeafRef<'a, K, V> {
    pub(crate) fn new<C>(tree: &'a BPlusTree<K, V, C>, id: NodeId) -> Option<Self> {
        Self::from_arena(&tree.leaf_arena, id)
    }

    fn from_arena(arena: &'a NodeArena<LeafNode<K, V>>, id: NodeId) -> Option<Self> {
        let leaf = arena.get(id)?;
        Some(Self { arena, id, leaf })
    }

    /// Arena id of this leaf. Stable until the leaf is coalesced away.
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn keys(&self) -> &'a [K] {
        &self.leaf.keys
    }

    pub fn values(&self) -> &'a [V] {
        &self.leaf.values
    }

    pub fn entries(&self) -> impl Iterator<Item = (&'a K, &'a V)> + 'a {
        self.leaf.keys.iter().zip(self.leaf.values.iter())
    }

    pub fn len(&self) -> usize {
        self.leaf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leaf.is_empty()
    }

    /// The next leaf along the chain, `None` for the last leaf.
    pub fn next_leaf(&self) -> Option<LeafRef<'a, K, V>> {
        Self::from_arena(self.arena, self.leaf.next_id()?)
    }
}

impl<K, V> Clone for LeafRef<'_, K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V> Copy for LeafRef<'_, K, V> {}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for LeafRef<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LeafRef")
            .field("id", &self.id)
            .field("keys", &self.leaf.keys)
            .field("values", &self.leaf.values)
            .finish()
    }
}

// ============================================================================
// ITERATOR STRUCTS
// ============================================================================

/// Iterator over the leaves of the tree, following the leaf chain.
pub struct Leaves<'a, K, V> {
    current: Option<LeafRef<'a, K, V>>,
}

/// Iterator over key-value pairs in key order (insertion order among equal keys).
pub struct Iter<'a, K, V> {
    current_leaf: Option<LeafRef<'a, K, V>>,
    index: usize,
}

/// Iterator over keys in the B+ tree.
pub struct Keys<'a, K, V> {
    items: Iter<'a, K, V>,
}

/// Iterator over values in key order.
pub struct Values<'a, K, V> {
    items: Iter<'a, K, V>,
}

// ============================================================================
// BPLUSTREE ITERATOR METHODS
// ============================================================================

impl<K, V, C> BPlusTree<K, V, C> {
    /// The leftmost leaf, where ordered traversal starts.
    pub fn first_leaf(&self) -> Option<LeafRef<'_, K, V>> {
        LeafRef::new(self, self.first_leaf_id()?)
    }

    /// Returns an iterator over all leaves along the leaf chain.
    pub fn leaves(&self) -> Leaves<'_, K, V> {
        Leaves {
            current: self.first_leaf(),
        }
    }

    /// Returns an iterator over all key-value pairs in sorted order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            current_leaf: self.first_leaf(),
            index: 0,
        }
    }

    /// Returns an iterator over all keys in sorted order.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { items: self.iter() }
    }

    /// Returns an iterator over all values in key order.
    pub fn values(&self) -> Values<'_, K, V> {
        Values { items: self.iter() }
    }
}

impl<'a, K, V, C> IntoIterator for &'a BPlusTree<K, V, C> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// ============================================================================
// ITERATOR IMPLEMENTATIONS
// ============================================================================

impl<'a, K, V> Iterator for Leaves<'a, K, V> {
    type Item = LeafRef<'a, K, V>;

    fn next(&mut self) -> Option<Self::Item> {
        let leaf = self.current.take()?;
        self.current = leaf.next_leaf();
        Some(leaf)
    }
}

impl<K, V> FusedIterator for Leaves<'_, K, V> {}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let leaf = self.current_leaf?;
            if self.index < leaf.len() {
                let item = (&leaf.keys()[self.index], &leaf.values()[self.index]);
                self.index += 1;
                return Some(item);
            }
            self.current_leaf = leaf.next_leaf();
            self.index = 0;
        }
    }
}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.items.next().map(|(k, _)| k)
    }
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.items.next().map(|(_, v)| v)
    }
}

#[cfg(test)]
mod tests {
    use crate::types::BPlusTree;

    #[test]
    fn test_iteration_spans_leaves() {
        let mut tree = BPlusTree::new(4).unwrap();
        for i in (0..20).rev() {
            tree.insert(i, i * 100);
        }

        let items: Vec<_> = tree.iter().map(|(k, v)| (*k, *v)).collect();
        let expected: Vec<_> = (0..20).map(|i| (i, i * 100)).collect();
        assert_eq!(items, expected);
        assert_eq!(tree.keys().count(), 20);
        assert_eq!(tree.values().copied().max(), Some(1900));
        assert_eq!((&tree).into_iter().count(), 20);
    }

    #[test]
    fn test_leaf_chain_walk() {
        let mut tree = BPlusTree::new(4).unwrap();
        for i in 0..12 {
            tree.insert(i, ());
        }

        let leaves: Vec<_> = tree.leaves().collect();
        assert!(leaves.len() > 1);
        let concatenated: Vec<i32> = leaves.iter().flat_map(|leaf| leaf.keys().to_vec()).collect();
        assert_eq!(concatenated, (0..12).collect::<Vec<_>>());

        let first = tree.first_leaf().unwrap();
        assert_eq!(first.id(), leaves[0].id());
        assert_eq!(first.next_leaf().map(|leaf| leaf.id()), Some(leaves[1].id()));
        assert!(leaves.last().unwrap().next_leaf().is_none());
    }

    #[test]
    fn test_empty_tree_iteration() {
        let tree = BPlusTree::<i32, i32>::new(4).unwrap();
        assert!(tree.first_leaf().is_none());
        assert_eq!(tree.iter().next(), None);
        assert_eq!(tree.leaves().count(), 0);
    }

    #[test]
    fn test_leaf_entries() {
        let mut tree = BPlusTree::new(8).unwrap();
        tree.insert("b", 2);
        tree.insert("a", 1);
        let leaf = tree.first_leaf().unwrap();
        let entries: Vec<_> = leaf.entries().collect();
        assert_eq!(entries, vec![(&"a", &1), (&"b", &2)]);
        assert_eq!(leaf.values(), &[1, 2]);
        assert!(!leaf.is_empty());
    }
}
