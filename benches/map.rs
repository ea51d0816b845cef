extern crate deuxtrois;

use criterion::{Criterion, criterion_group, criterion_main};

fn insert(c: &mut Criterion) {
    let mut map = deuxtrois::Map::<usize, ()>::new();
    c.bench_function("deuxtrois_insert", |b| {
        b.iter(|| {
            for k in 0..100 {
                map.insert(k, ()).unwrap();
            }
        })
    });
    let mut tree = rbtree::RBTree::<usize, ()>::new();
    c.bench_function("rbtree_insert", |b| {
        b.iter(|| {
            for k in 0..100 {
                tree.insert(k, ());
            }
        })
    });
}

criterion_group!(benches, insert);
criterion_main!(benches);
