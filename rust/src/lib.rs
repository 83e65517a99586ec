//! In-memory B+ tree multimap.
//!
//! [`BPlusTree`] maps keys to values under a pluggable total order and keeps
//! duplicate keys as separate entries in insertion order. Nodes live in two
//! arenas addressed by stable [`NodeId`]s; leaves are chained for in-order
//! traversal starting from [`BPlusTree::first_leaf`] or any leaf returned by
//! [`BPlusTree::find`].
//!
//! ```
//! use bplus_index::BPlusTree;
//!
//! let mut index = BPlusTree::new(8).unwrap();
//! index.insert("ferris", 1);
//! index.insert("crab", 2);
//! index.insert("ferris", 3);
//!
//! assert_eq!(index.get_all(&"ferris"), vec![&1, &3]);
//! assert_eq!(index.keys().copied().collect::<Vec<_>>(), ["crab", "ferris", "ferris"]);
//! ```
//!
//! Structural events are reported through `tracing`: `trace!` for node splits,
//! coalesces and redistributions, `debug!` for root growth and collapse.

mod arena;
mod comparator;
mod construction;
mod delete_operations;
mod error;
mod insert_operations;
mod iteration;
mod navigation;
mod node;
mod snapshot;
mod tree_structure;
mod types;
mod validation;

pub use arena::ArenaStats;
pub use comparator::{FnComparator, KeyComparator, NaturalOrder};
pub use construction::validate_fanout;
pub use error::{BPlusTreeError, BTreeResult, BTreeResultExt, InitResult, ModifyResult};
pub use iteration::{Iter, Keys, LeafRef, Leaves, Values};
pub use types::{BPlusTree, BranchNode, LeafNode, NodeId, NodeRef, DEFAULT_FANOUT, MIN_FANOUT, NULL_NODE};
