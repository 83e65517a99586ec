//! Walk-through of a small tree at fanout 4: one leaf, a root split, then an
//! underflow that coalesces the two leaves and collapses the root.

mod common;

use bplus_index::{BPlusTree, BPlusTreeError};
use common::init_tracing;

#[test]
fn test_fanout_4_walkthrough() {
    init_tracing();
    let mut tree = BPlusTree::new(4).unwrap();

    for key in [5, 10, 15] {
        tree.insert(key, key.to_string());
    }
    assert_eq!(tree.leaf_count(), 1);
    assert!(tree.is_leaf_root());
    assert_eq!(tree.render_structure(), "[5, 10, 15]\n");

    tree.insert(20, "20".to_string());
    assert_eq!(tree.render_structure(), "[15]\n  [5, 10]\n  [15, 20]\n");
    assert_eq!(tree.height(), 2);
    tree.check_invariants_detailed().unwrap();

    let first = tree.first_leaf().unwrap();
    let second = first.next_leaf().unwrap();
    assert_eq!(first.keys(), &[5, 10]);
    assert_eq!(second.keys(), &[15, 20]);
    assert!(second.next_leaf().is_none());

    tree.delete(&5, &"5".to_string()).unwrap();
    assert_eq!(tree.render_structure(), "[10, 15, 20]\n");
    assert!(tree.is_leaf_root());
    assert_eq!(tree.count_nodes_in_tree(), (1, 0));
    tree.check_invariants_detailed().unwrap();

    assert_eq!(
        tree.delete(&5, &"5".to_string()),
        Err(BPlusTreeError::KeyNotFound)
    );
    let err = tree.delete(&10, &"ten".to_string()).unwrap_err();
    assert!(err.is_not_found());
    assert!(!err.is_invariant_violation());
    assert_eq!(tree.render_structure(), "[10, 15, 20]\n");
}

#[test]
fn test_emptied_tree_accepts_inserts() {
    init_tracing();
    let mut tree = BPlusTree::new(4).unwrap();
    tree.insert(1, 'a');
    tree.delete(&1, &'a').unwrap();
    assert!(tree.is_empty());
    assert_eq!(tree.find(&1).map(|leaf| leaf.id()), None);

    tree.insert(2, 'b');
    assert_eq!(tree.get(&2), Some(&'b'));
    assert!(tree.check_invariants());
}

#[test]
fn test_leaf_ids_are_stable_across_unrelated_inserts() {
    let mut tree = BPlusTree::new(8).unwrap();
    for key in 0..50 {
        tree.insert(key, ());
    }
    let id = tree.find(&3).unwrap().id();
    tree.insert(45, ());
    assert_eq!(tree.find(&3).unwrap().id(), id);
}
