use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use gbarray::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn random_triples(n: u64, nnz: usize, seed: u64) -> (Vec<u64>, Vec<u64>, Vec<f64>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let rows = (0..nnz).map(|_| rng.gen_range(1..=n)).collect();
    let cols = (0..nnz).map(|_| rng.gen_range(1..=n)).collect();
    let values = (0..nnz).map(|_| rng.gen::<f64>()).collect();
    (rows, cols, values)
}

fn random_matrix(n: u64, nnz: usize) -> GbMatrix<f64> {
    let (rows, cols, values) = random_triples(n, nnz, 7);
    GbMatrix::from_triples(n, n, &rows, &cols, &values).unwrap()
}

// ---------------------------------------------------------------------------
// build
// ---------------------------------------------------------------------------

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_f64");
    for &nnz in &[1_000usize, 100_000] {
        let (rows, cols, values) = random_triples(10_000, nnz, 42);
        group.bench_with_input(BenchmarkId::from_parameter(nnz), &nnz, |b, _| {
            b.iter(|| {
                let mut m = GbMatrix::<f64>::new(10_000, 10_000).unwrap();
                m.build(&rows, &cols, &values, Dup::Plus).unwrap();
                black_box(m)
            })
        });
    }
    group.finish();
}

// ---------------------------------------------------------------------------
// findnz
// ---------------------------------------------------------------------------

fn bench_findnz(c: &mut Criterion) {
    let mut group = c.benchmark_group("findnz_f64");
    for &nnz in &[1_000usize, 100_000] {
        let m = random_matrix(10_000, nnz);
        group.bench_with_input(BenchmarkId::from_parameter(nnz), &m, |b, m| {
            b.iter(|| black_box(m.findnz().unwrap()))
        });
    }
    group.finish();
}

// ---------------------------------------------------------------------------
// subassign
// ---------------------------------------------------------------------------

fn bench_subassign(c: &mut Criterion) {
    let mut group = c.benchmark_group("subassign_f64");
    let source = random_matrix(500, 20_000);
    let opts = AssignOptions::new();
    group.bench_function("block_500", |b| {
        b.iter(|| {
            let mut dest = GbMatrix::<f64>::new(2_000, 2_000).unwrap();
            dest.subassign(&source, Selector::Range(501..=1000), Selector::Range(1..=500), &opts)
                .unwrap();
            black_box(dest)
        })
    });
    group.bench_function("scalar_rows", |b| {
        let rows: Vec<u64> = (1..=2_000).step_by(3).collect();
        b.iter(|| {
            let mut dest = GbMatrix::<f64>::new(2_000, 2_000).unwrap();
            dest.subassign_scalar(1.0, &rows, Selector::Range(1..=100), &opts).unwrap();
            black_box(dest)
        })
    });
    group.finish();
}

criterion_group!(benches, bench_build, bench_findnz, bench_subassign);
criterion_main!(benches);
