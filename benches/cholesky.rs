use criterion::*;
use matrix_core::config::DEFAULT_EPSILON;
use matrix_core::matrix::symmetric::SymmetricMatrixBuilder;
use matrix_core::solve::cholesky;
use matrix_core::Executor;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;

fn random_spd(n: usize, rng: &mut Pcg64) -> matrix_core::matrix::symmetric::SymmetricMatrix {
    let mut b = SymmetricMatrixBuilder::zero_builder(n).unwrap();
    for i in 0..n {
        for j in i..n {
            let x: f64 = rng.random_range(-1.0..1.0);
            b.set_value(i, j, if i == j { 2.0 * n as f64 } else { x }).unwrap();
        }
    }
    b.build().unwrap()
}

fn cholesky_small(c: &mut Criterion) {
    let mut group = c.benchmark_group("cholesky");
    let mut rng = Pcg64::seed_from_u64(0x5EED);
    for &n in &[4, 8, 16, 32, 64, 128] {
        let a = random_spd(n, &mut rng);
        group.bench_with_input(BenchmarkId::new("dense", n), &n, |b, _| {
            b.iter(|| cholesky::executor().execute(black_box(&a), DEFAULT_EPSILON).unwrap())
        });
    }
}

criterion_group!(cholesky, cholesky_small);
criterion_main!(cholesky);
