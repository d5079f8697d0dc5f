use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::rc::Rc;
use strided_array::{
    ArrayFactory, ArrayOperation, DoubleArray, IndexArray, Indexer, NaiveRoutines,
};

fn random_matrix(f: &ArrayFactory, rng: &mut StdRng, rows: usize, cols: usize) -> DoubleArray {
    f.from_fn(&[rows, cols], |_| rng.gen_range(-1.0..1.0))
}

fn bench_copy_transposed(c: &mut Criterion) {
    let f = ArrayFactory::default();
    let mut rng = StdRng::seed_from_u64(0);
    let mut group = c.benchmark_group("copy_transposed");
    for size in [100usize, 500, 1000] {
        group.throughput(Throughput::Elements((size * size) as u64));
        let a = random_matrix(&f, &mut rng, size, size);
        let a_t = match a.transpose() {
            Ok(t) => t,
            Err(err) => panic!("transpose failed: {err}"),
        };

        group.bench_with_input(BenchmarkId::new("contiguous", size), &size, |b, _| {
            b.iter(|| a.copy());
        });
        group.bench_with_input(BenchmarkId::new("transposed", size), &size, |b, _| {
            b.iter(|| a_t.copy());
        });
    }
    group.finish();
}

fn bench_broadcast_plus(c: &mut Criterion) {
    let f = ArrayFactory::default();
    let mut rng = StdRng::seed_from_u64(1);
    let mut group = c.benchmark_group("broadcast_plus");
    for size in [100usize, 500] {
        group.throughput(Throughput::Elements((size * size) as u64));
        let a = random_matrix(&f, &mut rng, size, size);
        let row = random_matrix(&f, &mut rng, 1, size);

        group.bench_with_input(BenchmarkId::new("plus", size), &size, |b, _| {
            b.iter(|| a.plus(&row));
        });
        group.bench_with_input(BenchmarkId::new("plus_assign", size), &size, |b, _| {
            b.iter(|| a.plus_assign(&row));
        });
    }
    group.finish();
}

fn bench_reduce_vectors(c: &mut Criterion) {
    let f = ArrayFactory::default();
    let mut rng = StdRng::seed_from_u64(2);
    let mut group = c.benchmark_group("sum_dim");
    for size in [100usize, 500] {
        let a = random_matrix(&f, &mut rng, size, size);
        for dim in [0usize, 1] {
            group.bench_with_input(BenchmarkId::new(format!("dim{dim}"), size), &size, |b, _| {
                b.iter(|| a.sum_dim(dim));
            });
        }
    }
    group.finish();
}

fn bench_advanced_indexing(c: &mut Criterion) {
    let f = ArrayFactory::default();
    let mut rng = StdRng::seed_from_u64(3);
    let mut group = c.benchmark_group("advanced_indexing");
    for size in [100usize, 500] {
        let a = random_matrix(&f, &mut rng, size, size);
        let picks: IndexArray = f.array((0..size).map(|_| rng.gen_range(0..size)).collect());
        let indexers = [Indexer::Array(picks.clone()), Indexer::Array(picks)];

        group.bench_with_input(BenchmarkId::new("pairs", size), &size, |b, _| {
            b.iter(|| a.get_indexed(&indexers));
        });
        group.bench_with_input(BenchmarkId::new("rows", size), &size, |b, _| {
            b.iter(|| a.get_indexed(&indexers[..1]));
        });
    }
    group.finish();
}

fn bench_mmul(c: &mut Criterion) {
    let strided = ArrayFactory::default();
    let naive = ArrayFactory::builder()
        .routines(Rc::new(NaiveRoutines))
        .build();
    let mut rng = StdRng::seed_from_u64(4);
    let mut group = c.benchmark_group("mmul");
    for size in [32usize, 128] {
        let a = random_matrix(&strided, &mut rng, size, size);
        let b = random_matrix(&strided, &mut rng, size, size);

        group.bench_with_input(BenchmarkId::new("naive", size), &size, |bench, _| {
            bench.iter(|| naive.mmul(&a, &b));
        });
        group.bench_with_input(BenchmarkId::new("strided", size), &size, |bench, _| {
            bench.iter(|| strided.mmul(&a, &b));
        });
        group.bench_with_input(BenchmarkId::new("strided_at", size), &size, |bench, _| {
            bench.iter(|| strided.mmul_op(ArrayOperation::Transpose, &a, ArrayOperation::Keep, &b));
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_copy_transposed,
    bench_broadcast_plus,
    bench_reduce_vectors,
    bench_advanced_indexing,
    bench_mmul
);
criterion_main!(benches);
