use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use kdthree::{BoundedPriorityQueue, KdTree};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const SIZES: [usize; 3] = [1000, 10_000, 100_000];
const K: usize = 10;

fn random_points(count: usize, seed: u64) -> Vec<[f64; 3]> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            [
                rng.gen_range(0.0..100.0),
                rng.gen_range(0.0..100.0),
                rng.gen_range(0.0..100.0),
            ]
        })
        .collect()
}

/// Exhaustive scan through a bounded queue, the baseline the tree must beat.
fn brute_force(points: &[[f64; 3]], query: [f64; 3], queue: &mut BoundedPriorityQueue) {
    queue.initialize(K).unwrap();
    for (i, p) in points.iter().enumerate() {
        let dx = p[0] - query[0];
        let dy = p[1] - query[1];
        let dz = p[2] - query[2];
        queue.insert(i, dx * dx + dy * dy + dz * dz);
    }
}

fn benchmark_compare_knn(c: &mut Criterion) {
    let mut group = c.benchmark_group("knn");

    for &size in &SIZES {
        let points = random_points(size, 11);
        let queries = random_points(100, 13);
        let tree = KdTree::build(&points).unwrap();

        group.bench_with_input(BenchmarkId::new("kdtree", size), &size, |b, _| {
            let mut queue = BoundedPriorityQueue::new();
            b.iter(|| {
                for query in &queries {
                    tree.k_nearest(black_box(*query), K, &mut queue).unwrap();
                    black_box(queue.top_weight());
                }
            })
        });

        group.bench_with_input(BenchmarkId::new("brute_force", size), &size, |b, _| {
            let mut queue = BoundedPriorityQueue::new();
            b.iter(|| {
                for query in &queries {
                    brute_force(&points, black_box(*query), &mut queue);
                    black_box(queue.top_weight());
                }
            })
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_compare_knn);
criterion_main!(benches);
