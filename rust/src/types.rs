//! Core types and data structures for BPlusTree.
//!
//! This module contains the fundamental data structures, type definitions,
//! and constants used throughout the B+ tree implementation.

use std::fmt;
use std::marker::PhantomData;

use crate::arena::NodeArena;
use crate::comparator::NaturalOrder;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Smallest order parameter a tree accepts.
pub const MIN_FANOUT: usize = 3;

/// Order parameter used by `with_default_fanout` and `Default`.
pub const DEFAULT_FANOUT: usize = 16;

// ============================================================================
// TYPE DEFINITIONS
// ============================================================================

/// Node ID type for arena-based allocation
pub type NodeId = u32;

/// Marks the end of the leaf chain.
pub const NULL_NODE: NodeId = u32::MAX;

// ============================================================================
// CORE DATA STRUCTURES
// ============================================================================

/// In-memory B+ tree multimap.
///
/// Every node holds at most `fanout - 1` keys; internal nodes hold at most
/// `fanout` children. All entries live in leaves, which are chained in key
/// order for sequential traversal. Equal keys are kept as distinct entries in
/// insertion order.
///
/// Nodes do not store parent links. Insertion and deletion recover a node's
/// parent by descending again from the root.
///
/// # Type Parameters
///
/// * `K` - Key type, ordered by `C`
/// * `V` - Value type
/// * `C` - Key comparator, `NaturalOrder` (`K: Ord`) by default
///
/// # Examples
///
/// ```
/// use bplus_index::BPlusTree;
///
/// let mut tree = BPlusTree::new(4).unwrap();
/// for key in [5, 10, 15, 20] {
///     tree.insert(key, key * 10);
/// }
///
/// assert_eq!(tree.get(&15), Some(&150));
/// assert_eq!(tree.height(), 2);
///
/// tree.delete(&5, &50).unwrap();
/// assert!(tree.delete(&5, &50).is_err());
/// assert_eq!(tree.keys().copied().collect::<Vec<_>>(), vec![10, 15, 20]);
/// ```
#[derive(Debug)]
pub struct BPlusTree<K, V, C = NaturalOrder> {
    /// Maximum number of child pointers per node.
    pub(crate) fanout: usize,
    /// The root node, `None` while the tree is empty.
    pub(crate) root: Option<NodeRef<K, V>>,
    /// Arena storage for leaf nodes.
    pub(crate) leaf_arena: NodeArena<LeafNode<K, V>>,
    /// Arena storage for branch nodes.
    pub(crate) branch_arena: NodeArena<BranchNode<K, V>>,
    /// Total order over keys.
    pub(crate) comparator: C,
}

/// Leaf node containing key-value entries.
///
/// Nodes are only created by the tree, which validates the fanout first:
///
/// ```compile_fail
/// use bplus_index::LeafNode;
///
/// let leaf = LeafNode::<i32, i32>::new(0);
/// ```
#[derive(Debug, Clone)]
pub struct LeafNode<K, V> {
    /// Order parameter of the owning tree.
    pub(crate) fanout: usize,
    /// Keys in non-decreasing order.
    pub(crate) keys: Vec<K>,
    /// Values, parallel to `keys`.
    pub(crate) values: Vec<V>,
    /// Next leaf in key order, or `NULL_NODE` for the last leaf.
    pub(crate) next: NodeId,
}

/// Internal (branch) node containing separator keys and child pointers.
///
/// ```compile_fail
/// use bplus_index::BranchNode;
///
/// let branch = BranchNode::<i32, i32>::new(1);
/// ```
#[derive(Debug, Clone)]
pub struct BranchNode<K, V> {
    /// Order parameter of the owning tree.
    pub(crate) fanout: usize,
    /// Separator keys; `keys[i]` bounds `children[i]` above and `children[i + 1]` below.
    pub(crate) keys: Vec<K>,
    /// Child nodes, always one more than `keys`.
    pub(crate) children: Vec<NodeRef<K, V>>,
}

// ============================================================================
// ENUMS AND RESULT TYPES
// ============================================================================

/// Reference to a node in one of the two arenas.
pub enum NodeRef<K, V> {
    Leaf(NodeId, PhantomData<(K, V)>),
    Branch(NodeId, PhantomData<(K, V)>),
}

impl<K, V> NodeRef<K, V> {
    pub fn leaf(id: NodeId) -> Self {
        NodeRef::Leaf(id, PhantomData)
    }

    pub fn branch(id: NodeId) -> Self {
        NodeRef::Branch(id, PhantomData)
    }

    /// Return the raw node ID.
    pub fn id(&self) -> NodeId {
        match *self {
            NodeRef::Leaf(id, _) => id,
            NodeRef::Branch(id, _) => id,
        }
    }

    /// Returns true if this reference points to a leaf node.
    pub fn is_leaf(&self) -> bool {
        matches!(self, NodeRef::Leaf(_, _))
    }
}

// Manual impls: the phantom parameters must not pick up bounds on K and V.
impl<K, V> Clone for NodeRef<K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V> Copy for NodeRef<K, V> {}

impl<K, V> PartialEq for NodeRef<K, V> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (NodeRef::Leaf(a, _), NodeRef::Leaf(b, _)) => a == b,
            (NodeRef::Branch(a, _), NodeRef::Branch(b, _)) => a == b,
            _ => false,
        }
    }
}

impl<K, V> Eq for NodeRef<K, V> {}

impl<K, V> fmt::Debug for NodeRef<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeRef::Leaf(id, _) => write!(f, "Leaf({})", id),
            NodeRef::Branch(id, _) => write!(f, "Branch({})", id),
        }
    }
}

/// Node data that must be allocated in the arena after a split.
pub(crate) enum SplitNodeData<K, V> {
    Leaf(LeafNode<K, V>),
    Branch(BranchNode<K, V>),
}

/// Result of inserting into a node.
pub(crate) enum InsertResult<K, V> {
    /// The node had room.
    Fitted,
    /// The node overflowed and was split; the right half still needs an arena slot.
    Split {
        new_node_data: SplitNodeData<K, V>,
        separator_key: K,
    },
}
