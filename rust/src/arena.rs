//! Slot arena that hands out stable `NodeId`s.
//!
//! Freed slots go on a free list and are reused by later allocations, so an
//! id stays valid exactly as long as its node is reachable from the tree.

use std::convert::TryFrom;

use crate::error::{BPlusTreeError, TreeResult};
use crate::types::{NodeId, NULL_NODE};

/// Statistics for a node arena
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArenaStats {
    pub total_slots: usize,
    pub allocated_count: usize,
    pub free_count: usize,
    pub utilization: f64,
}

#[derive(Debug, Clone)]
pub struct NodeArena<T> {
    slots: Vec<Option<T>>,
    free_list: Vec<NodeId>,
}

impl<T> NodeArena<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
        }
    }

    /// Store `item` and return its id.
    pub fn allocate(&mut self, item: T) -> TreeResult<NodeId> {
        if let Some(id) = self.free_list.pop() {
            self.slots[id as usize] = Some(item);
            return Ok(id);
        }

        // NULL_NODE is reserved for the end of the leaf chain.
        let id = NodeId::try_from(self.slots.len())
            .ok()
            .filter(|&id| id != NULL_NODE)
            .ok_or_else(|| BPlusTreeError::allocation_error("node", "arena id space exhausted"))?;
        self.slots.push(Some(item));
        Ok(id)
    }

    /// Remove the node at `id`, returning it. `None` if the slot is not allocated.
    pub fn deallocate(&mut self, id: NodeId) -> Option<T> {
        let item = self.slots.get_mut(usize::try_from(id).ok()?)?.take()?;
        self.free_list.push(id);
        Some(item)
    }

    #[inline]
    pub fn get(&self, id: NodeId) -> Option<&T> {
        self.slots.get(usize::try_from(id).ok()?)?.as_ref()
    }

    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut T> {
        self.slots.get_mut(usize::try_from(id).ok()?)?.as_mut()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    /// Number of allocated nodes.
    pub fn len(&self) -> usize {
        self.slots.len() - self.free_list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn free_count(&self) -> usize {
        self.free_list.len()
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.free_list.clear();
    }

    pub fn stats(&self) -> ArenaStats {
        let total_slots = self.slots.len();
        let allocated_count = self.len();
        let utilization = if total_slots > 0 {
            allocated_count as f64 / total_slots as f64
        } else {
            0.0
        };

        ArenaStats {
            total_slots,
            allocated_count,
            free_count: self.free_list.len(),
            utilization,
        }
    }
}

impl<T> Default for NodeArena<T> {
    fn default() -> Self {
        Self::new()
    }
}
