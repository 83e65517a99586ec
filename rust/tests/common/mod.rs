//! Shared helpers for integration tests.
//!
//! Set `RUST_LOG=bplus_index=trace` to see every split, coalesce and
//! redistribution while a test runs.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Once;

use bplus_index::BPlusTree;
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Install a test-writer subscriber. Only the first call takes effect.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

/// Multimap oracle: every key maps to its values in insertion order.
pub type Oracle = BTreeMap<i32, Vec<i32>>;

pub fn oracle_insert(oracle: &mut Oracle, key: i32, value: i32) {
    oracle.entry(key).or_default().push(value);
}

/// Remove the earliest `(key, value)` entry, mirroring `BPlusTree::delete`.
pub fn oracle_delete(oracle: &mut Oracle, key: i32, value: i32) -> bool {
    let Some(values) = oracle.get_mut(&key) else {
        return false;
    };
    let Some(position) = values.iter().position(|v| *v == value) else {
        return false;
    };
    values.remove(position);
    if values.is_empty() {
        oracle.remove(&key);
    }
    true
}

pub fn oracle_entries(oracle: &Oracle) -> Vec<(i32, i32)> {
    oracle
        .iter()
        .flat_map(|(key, values)| values.iter().map(move |value| (*key, *value)))
        .collect()
}

pub fn tree_entries(tree: &BPlusTree<i32, i32>) -> Vec<(i32, i32)> {
    tree.iter().map(|(k, v)| (*k, *v)).collect()
}

/// Compare contents and structure against the oracle.
pub fn assert_matches_oracle(tree: &BPlusTree<i32, i32>, oracle: &Oracle) {
    if let Err(err) = tree.check_invariants_detailed() {
        panic!("{}\n{}", err, tree.render_structure());
    }
    assert_eq!(tree_entries(tree), oracle_entries(oracle));
    assert_eq!(tree.is_empty(), oracle.is_empty());
}
