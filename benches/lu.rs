use criterion::*;
use matrix_core::config::DEFAULT_EPSILON;
use matrix_core::matrix::general::GeneralMatrixBuilder;
use matrix_core::solve::lu;
use matrix_core::{Executor, MatrixDim};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;

fn random_matrix(n: usize, rng: &mut Pcg64) -> matrix_core::matrix::general::GeneralMatrix {
    let mut b = GeneralMatrixBuilder::zero_builder(MatrixDim::square(n).unwrap()).unwrap();
    for i in 0..n {
        for j in 0..n {
            let x: f64 = rng.random_range(-1.0..1.0);
            b.set_value(i, j, if i == j { x + n as f64 } else { x }).unwrap();
        }
    }
    b.build().unwrap()
}

fn lu_small(c: &mut Criterion) {
    let mut group = c.benchmark_group("lu");
    let mut rng = Pcg64::seed_from_u64(0x5EED);
    for &n in &[4, 8, 16, 32, 64, 128] {
        let a = random_matrix(n, &mut rng);
        group.bench_with_input(BenchmarkId::new("dense", n), &n, |b, _| {
            b.iter(|| lu::executor().execute(black_box(&a), DEFAULT_EPSILON).unwrap())
        });
    }
}

criterion_group!(lu, lu_small);
criterion_main!(lu);
