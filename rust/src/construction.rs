//! Construction and initialization logic for BPlusTree and nodes.
//!
//! A tree starts with no root. The first insertion creates the root leaf.

use crate::arena::NodeArena;
use crate::comparator::{KeyComparator, NaturalOrder};
use crate::error::{BPlusTreeError, BTreeResult, InitResult};
use crate::types::{BPlusTree, BranchNode, LeafNode, DEFAULT_FANOUT, MIN_FANOUT, NULL_NODE};

/// Validate that a fanout is usable as a tree order parameter.
pub fn validate_fanout(fanout: usize) -> BTreeResult<()> {
    if fanout < MIN_FANOUT {
        Err(BPlusTreeError::invalid_fanout(fanout, MIN_FANOUT))
    } else {
        Ok(())
    }
}

impl<K: Ord, V> BPlusTree<K, V, NaturalOrder> {
    /// Create an empty tree ordered by `K: Ord`.
    ///
    /// # Arguments
    ///
    /// * `fanout` - Maximum number of child pointers per node (minimum 3)
    ///
    /// # Examples
    ///
    /// ```
    /// use bplus_index::BPlusTree;
    ///
    /// let tree = BPlusTree::<i32, String>::new(16).unwrap();
    /// assert!(tree.is_empty());
    /// assert!(BPlusTree::<i32, String>::new(2).is_err());
    /// ```
    pub fn new(fanout: usize) -> InitResult<Self> {
        Self::with_comparator(fanout, NaturalOrder)
    }

    /// Create an empty tree with `DEFAULT_FANOUT`.
    pub fn with_default_fanout() -> Self {
        Self::empty_with(DEFAULT_FANOUT, NaturalOrder)
    }
}

impl<K, V, C: KeyComparator<K>> BPlusTree<K, V, C> {
    /// Create an empty tree ordered by `comparator`.
    pub fn with_comparator(fanout: usize, comparator: C) -> InitResult<Self> {
        validate_fanout(fanout)?;
        Ok(Self::empty_with(fanout, comparator))
    }
}

impl<K, V, C> BPlusTree<K, V, C> {
    pub(crate) fn empty_with(fanout: usize, comparator: C) -> Self {
        Self {
            fanout,
            root: None,
            leaf_arena: NodeArena::new(),
            branch_arena: NodeArena::new(),
            comparator,
        }
    }

    /// The order parameter this tree was built with.
    pub fn fanout(&self) -> usize {
        self.fanout
    }

    pub fn comparator(&self) -> &C {
        &self.comparator
    }
}

impl<K, V> LeafNode<K, V> {
    /// Creates an empty leaf for a tree of the given fanout.
    pub(crate) fn new(fanout: usize) -> Self {
        // One spare slot: a full leaf briefly holds `fanout` entries before splitting.
        Self {
            fanout,
            keys: Vec::with_capacity(fanout),
            values: Vec::with_capacity(fanout),
            next: NULL_NODE,
        }
    }
}

impl<K, V> BranchNode<K, V> {
    /// Creates an empty branch for a tree of the given fanout.
    pub(crate) fn new(fanout: usize) -> Self {
        Self {
            fanout,
            keys: Vec::with_capacity(fanout),
            children: Vec::with_capacity(fanout + 1),
        }
    }
}

impl<K: Ord, V> Default for BPlusTree<K, V, NaturalOrder> {
    fn default() -> Self {
        Self::with_default_fanout()
    }
}
