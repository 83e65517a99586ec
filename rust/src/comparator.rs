//! Key ordering supplied to the tree at construction.
//!
//! The tree never looks inside keys; every placement decision goes through a
//! `KeyComparator`, which must describe a strict total order.

use std::cmp::Ordering;

/// Total order over keys.
pub trait KeyComparator<K: ?Sized> {
    fn compare(&self, a: &K, b: &K) -> Ordering;
}

/// Orders keys by their `Ord` implementation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NaturalOrder;

impl<K: Ord + ?Sized> KeyComparator<K> for NaturalOrder {
    #[inline]
    fn compare(&self, a: &K, b: &K) -> Ordering {
        a.cmp(b)
    }
}

/// Adapts a closure into a comparator.
///
/// ```
/// use bplus_index::{BPlusTree, FnComparator};
///
/// // Case-insensitive keys.
/// let by_lowercase = FnComparator::new(|a: &String, b: &String| {
///     a.to_lowercase().cmp(&b.to_lowercase())
/// });
/// let mut tree = BPlusTree::with_comparator(4, by_lowercase).unwrap();
/// tree.insert("Beta".to_string(), 2);
/// tree.insert("alpha".to_string(), 1);
///
/// assert_eq!(tree.get(&"ALPHA".to_string()), Some(&1));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct FnComparator<F> {
    compare: F,
}

impl<F> FnComparator<F> {
    pub fn new(compare: F) -> Self {
        Self { compare }
    }
}

impl<K: ?Sized, F> KeyComparator<K> for FnComparator<F>
where
    F: Fn(&K, &K) -> Ordering,
{
    #[inline]
    fn compare(&self, a: &K, b: &K) -> Ordering {
        (self.compare)(a, b)
    }
}
