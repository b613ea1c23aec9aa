use criterion::*;
use matrix_core::config::DEFAULT_EPSILON;
use matrix_core::matrix::general::GeneralMatrixBuilder;
use matrix_core::solve::qr;
use matrix_core::{Executor, MatrixDim};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;

fn random_tall(rows: usize, cols: usize, rng: &mut Pcg64) -> matrix_core::matrix::general::GeneralMatrix {
    let mut b = GeneralMatrixBuilder::zero_builder(MatrixDim::new(rows, cols).unwrap()).unwrap();
    for i in 0..rows {
        for j in 0..cols {
            let x: f64 = rng.random_range(-1.0..1.0);
            b.set_value(i, j, x).unwrap();
        }
    }
    b.build().unwrap()
}

fn qr_small(c: &mut Criterion) {
    let mut group = c.benchmark_group("qr");
    let mut rng = Pcg64::seed_from_u64(0x5EED);
    for &n in &[4, 8, 16, 32, 64, 128] {
        let a = random_tall(n, n, &mut rng);
        group.bench_with_input(BenchmarkId::new("square", n), &n, |b, _| {
            b.iter(|| qr::executor().execute(black_box(&a), DEFAULT_EPSILON).unwrap())
        });
    }
}

criterion_group!(qr, qr_small);
criterion_main!(qr);
