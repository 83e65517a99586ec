//! Validation and debugging utilities for BPlusTree.
//!
//! `check_invariants_detailed` walks the whole tree and reports the first
//! structural violation it finds. Tests call it after every mutation.

use std::cmp::Ordering;
use std::fmt::{self, Write as _};

use crate::comparator::KeyComparator;
use crate::error::{BPlusTreeError, BTreeResult};
use crate::types::{BPlusTree, NodeId, NodeRef};

/// Bounds inherited from the ancestors' separators.
struct KeyBounds<'a, K> {
    lower: Option<&'a K>,
    upper: Option<&'a K>,
}

// Manual impls: only references are held, so no `K: Copy` bound.
impl<K> Clone for KeyBounds<'_, K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K> Copy for KeyBounds<'_, K> {}

/// What the recursive walk accumulates.
struct WalkState {
    leaf_ids: Vec<NodeId>,
    leaf_depth: Option<usize>,
    branch_count: usize,
}

// ============================================================================
// VALIDATION METHODS
// ============================================================================

impl<K, V, C: KeyComparator<K>> BPlusTree<K, V, C> {
    /// Check if the tree maintains B+ tree invariants.
    pub fn check_invariants(&self) -> bool {
        self.check_invariants_detailed().is_ok()
    }

    /// Check invariants, describing the first violation found.
    pub fn check_invariants_detailed(&self) -> BTreeResult<()> {
        let Some(root) = self.root else {
            if !self.leaf_arena.is_empty() || !self.branch_arena.is_empty() {
                return Err(violation(format_args!(
                    "empty tree still holds {} leaves and {} branches",
                    self.leaf_arena.len(),
                    self.branch_arena.len()
                )));
            }
            return Ok(());
        };

        let mut state = WalkState {
            leaf_ids: Vec::new(),
            leaf_depth: None,
            branch_count: 0,
        };
        let unbounded = KeyBounds { lower: None, upper: None };
        self.check_node(root, unbounded, 0, true, &mut state)?;

        self.check_leaf_chain(&state.leaf_ids)?;
        self.check_arena_consistency(state.leaf_ids.len(), state.branch_count)
    }

    /// Alias for `check_invariants_detailed`.
    pub fn validate(&self) -> BTreeResult<()> {
        self.check_invariants_detailed()
    }

    fn check_node(
        &self,
        node: NodeRef<K, V>,
        bounds: KeyBounds<'_, K>,
        depth: usize,
        is_root: bool,
        state: &mut WalkState,
    ) -> BTreeResult<()> {
        match node {
            NodeRef::Leaf(id, _) => {
                let leaf = self.leaf(id)?;
                if leaf.keys.len() != leaf.values.len() {
                    return Err(violation(format_args!(
                        "leaf {} has {} keys but {} values",
                        id,
                        leaf.keys.len(),
                        leaf.values.len()
                    )));
                }
                if leaf.len() > leaf.max_keys() {
                    return Err(violation(format_args!("leaf {} holds {} keys", id, leaf.len())));
                }
                if leaf.is_empty() || (!is_root && leaf.is_underfull()) {
                    return Err(violation(format_args!(
                        "leaf {} holds {} keys, below the minimum",
                        id,
                        leaf.len()
                    )));
                }
                self.check_keys("leaf", id, &leaf.keys, bounds)?;

                match state.leaf_depth {
                    Some(expected) if expected != depth => {
                        return Err(violation(format_args!(
                            "leaf {} at depth {} but other leaves at depth {}",
                            id, depth, expected
                        )));
                    }
                    _ => state.leaf_depth = Some(depth),
                }
                state.leaf_ids.push(id);
                Ok(())
            }
            NodeRef::Branch(id, _) => {
                let branch = self.branch(id)?;
                state.branch_count += 1;
                if branch.children.len() != branch.keys.len() + 1 {
                    return Err(violation(format_args!(
                        "branch {} has {} keys but {} children",
                        id,
                        branch.keys.len(),
                        branch.children.len()
                    )));
                }
                if branch.children.len() > self.fanout {
                    return Err(violation(format_args!(
                        "branch {} has {} children",
                        id,
                        branch.children.len()
                    )));
                }
                let min_children = if is_root { 2 } else { branch.min_children() };
                if branch.children.len() < min_children {
                    return Err(violation(format_args!(
                        "branch {} has {} children, below the minimum of {}",
                        id,
                        branch.children.len(),
                        min_children
                    )));
                }
                self.check_keys("branch", id, &branch.keys, bounds)?;

                for (i, child) in branch.children.iter().enumerate() {
                    let child_bounds = KeyBounds {
                        lower: if i == 0 { bounds.lower } else { branch.keys.get(i - 1) },
                        upper: branch.keys.get(i).or(bounds.upper),
                    };
                    self.check_node(*child, child_bounds, depth + 1, false, state)?;
                }
                Ok(())
            }
        }
    }

    /// Keys must be non-decreasing and lie within the inherited bounds.
    fn check_keys(&self, kind: &str, id: NodeId, keys: &[K], bounds: KeyBounds<'_, K>) -> BTreeResult<()> {
        let cmp = &self.comparator;
        if let Some(i) = (1..keys.len()).find(|&i| cmp.compare(&keys[i - 1], &keys[i]) == Ordering::Greater) {
            return Err(violation(format_args!("{} {} keys out of order at index {}", kind, id, i)));
        }
        let (Some(first), Some(last)) = (keys.first(), keys.last()) else {
            return Ok(());
        };
        if bounds
            .lower
            .is_some_and(|lower| cmp.compare(first, lower) == Ordering::Less)
        {
            return Err(violation(format_args!("{} {} has a key below its subtree bound", kind, id)));
        }
        if bounds
            .upper
            .is_some_and(|upper| cmp.compare(last, upper) == Ordering::Greater)
        {
            return Err(violation(format_args!("{} {} has a key above its subtree bound", kind, id)));
        }
        Ok(())
    }

    /// The chain must visit exactly the in-order leaves and end at `NULL_NODE`.
    fn check_leaf_chain(&self, in_order: &[NodeId]) -> BTreeResult<()> {
        let mut chain = Vec::with_capacity(in_order.len());
        let mut current = self.first_leaf_id();
        while let Some(id) = current {
            if chain.len() > in_order.len() {
                return Err(violation(format_args!("leaf chain does not terminate")));
            }
            chain.push(id);
            current = self.leaf(id)?.next_id();
        }
        if chain != in_order {
            return Err(violation(format_args!(
                "leaf chain {:?} differs from tree order {:?}",
                chain, in_order
            )));
        }
        Ok(())
    }

    fn check_arena_consistency(&self, leaves: usize, branches: usize) -> BTreeResult<()> {
        if leaves != self.leaf_arena.len() {
            return Err(BPlusTreeError::arena_error(
                "leaf consistency check",
                &format!("{} in tree vs {} in arena", leaves, self.leaf_arena.len()),
            ));
        }
        if branches != self.branch_arena.len() {
            return Err(BPlusTreeError::arena_error(
                "branch consistency check",
                &format!("{} in tree vs {} in arena", branches, self.branch_arena.len()),
            ));
        }
        Ok(())
    }
}

fn violation(details: fmt::Arguments<'_>) -> BPlusTreeError {
    BPlusTreeError::invariant("check_invariants", &details.to_string())
}

// ============================================================================
// DEBUGGING AND TESTING UTILITIES
// ============================================================================

impl<K, V, C> BPlusTree<K, V, C> {
    /// Returns the sizes of all leaf nodes in key order.
    pub fn leaf_sizes(&self) -> Vec<usize> {
        self.leaves().map(|leaf| leaf.len()).collect()
    }

    /// Render the tree one node per line, children indented under their parent.
    ///
    /// ```
    /// use bplus_index::BPlusTree;
    ///
    /// let mut tree = BPlusTree::new(4).unwrap();
    /// for key in [5, 10, 15, 20] {
    ///     tree.insert(key, ());
    /// }
    /// assert_eq!(tree.render_structure(), "[15]\n  [5, 10]\n  [15, 20]\n");
    /// ```
    pub fn render_structure(&self) -> String
    where
        K: fmt::Debug,
    {
        let mut out = String::new();
        if let Some(root) = self.root {
            // Writing into a String cannot fail.
            if self.render_node(root, 0, &mut out).is_err() {
                out.clear();
            }
        }
        out
    }

    fn render_node(&self, node: NodeRef<K, V>, depth: usize, out: &mut String) -> fmt::Result
    where
        K: fmt::Debug,
    {
        let indent = "  ".repeat(depth);
        match node {
            NodeRef::Leaf(id, _) => match self.get_leaf(id) {
                Some(leaf) => writeln!(out, "{}{:?}", indent, leaf.keys),
                None => writeln!(out, "{}<missing leaf {}>", indent, id),
            },
            NodeRef::Branch(id, _) => {
                let Some(branch) = self.get_branch(id) else {
                    return writeln!(out, "{}<missing branch {}>", indent, id);
                };
                writeln!(out, "{}{:?}", indent, branch.keys)?;
                for child in &branch.children {
                    self.render_node(*child, depth + 1, out)?;
                }
                Ok(())
            }
        }
    }
}
