use bplus_index::BPlusTree;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::BTreeMap;

const SIZE: i32 = 10_000;

fn shuffled_keys(seed: u64) -> Vec<i32> {
    let mut keys: Vec<i32> = (0..SIZE).collect();
    keys.shuffle(&mut StdRng::seed_from_u64(seed));
    keys
}

fn build_tree(fanout: usize, keys: &[i32]) -> BPlusTree<i32, i32> {
    let mut tree = BPlusTree::new(fanout).unwrap();
    for &key in keys {
        tree.insert(key, key * 10);
    }
    tree
}

fn insert_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert");
    let keys = shuffled_keys(1);

    for fanout in [4, 16, 64] {
        group.bench_with_input(BenchmarkId::new("bplus_tree", fanout), &fanout, |b, &fanout| {
            b.iter(|| black_box(build_tree(fanout, &keys)))
        });
    }

    group.bench_function("std_btreemap", |b| {
        b.iter(|| {
            let mut map = BTreeMap::new();
            for &key in &keys {
                map.insert(key, key * 10);
            }
            black_box(map)
        })
    });

    group.finish();
}

fn lookup_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("lookup");
    let keys = shuffled_keys(2);

    for fanout in [4, 16, 64] {
        let tree = build_tree(fanout, &keys);
        group.bench_with_input(BenchmarkId::new("bplus_tree", fanout), &tree, |b, tree| {
            b.iter(|| {
                for key in (0..SIZE).step_by(7) {
                    black_box(tree.get(black_box(&key)));
                }
            })
        });
    }

    group.finish();
}

fn delete_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("delete");
    let keys = shuffled_keys(3);

    for fanout in [4, 16, 64] {
        let tree = build_tree(fanout, &keys);
        group.bench_with_input(BenchmarkId::new("bplus_tree", fanout), &tree, |b, tree| {
            b.iter_batched(
                || tree.clone(),
                |mut tree| {
                    for &key in &keys {
                        tree.delete(&key, &(key * 10)).unwrap();
                    }
                    tree
                },
                criterion::BatchSize::LargeInput,
            )
        });
    }

    group.finish();
}

fn iteration_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("iteration");
    let tree = build_tree(16, &shuffled_keys(4));

    group.bench_function("iter", |b| b.iter(|| black_box(tree.iter().count())));
    group.bench_function("leaf_chain", |b| {
        b.iter(|| black_box(tree.leaves().map(|leaf| leaf.len()).sum::<usize>()))
    });

    group.finish();
}

criterion_group!(
    benches,
    insert_benchmark,
    lookup_benchmark,
    delete_benchmark,
    iteration_benchmark
);
criterion_main!(benches);
