//! Dense Householder QR on a literal 4x3 full-column-rank system, checking
//! the Moore-Penrose identities `A A+ A = A` and `A+ A = I` via
//! `solve_least_squares`, rather than comparing raw `Q`/`R` entries.

use matrix_core::matrix::general::GeneralMatrixBuilder;
use matrix_core::solve::qr;
use matrix_core::{Matrix, MatrixDim, Vector};

fn tall4x3() -> matrix_core::matrix::general::GeneralMatrix {
    let entries = [[-1.0, 2.0, 3.0], [2.0, 3.0, 2.0], [1.0, 1.0, 2.0], [0.0, 5.0, 6.0]];
    let mut b = GeneralMatrixBuilder::zero_builder(MatrixDim::new(4, 3).unwrap()).unwrap();
    for (i, row) in entries.iter().enumerate() {
        for (j, &x) in row.iter().enumerate() {
            b.set_value(i, j, x).unwrap();
        }
    }
    b.build().unwrap()
}

#[test]
fn pseudo_inverse_is_a_left_inverse_on_the_column_space() {
    let a = tall4x3();
    let f = qr::executor().execute(&a, 1e-12).unwrap().unwrap();
    // A+ A v == v for every standard basis vector of R^3: A v lands exactly
    // in A's range, so the least-squares solve recovers v exactly.
    for seed in 0..3 {
        let mut raw = [0.0; 3];
        raw[seed] = 1.0;
        let v = Vector::from_slice(&raw).unwrap();
        let b = a.operate(&v).unwrap();
        let recovered = f.solve_least_squares(&b).unwrap();
        assert!(recovered.all_close(&v, 1e-9));
    }
}

#[test]
fn pseudo_inverse_reconstructs_a_via_the_column_space_identity() {
    // With A+ A == I_3 established above, A A+ A == A follows from
    // composing with A directly; check it at an arbitrary vector.
    let a = tall4x3();
    let f = qr::executor().execute(&a, 1e-12).unwrap().unwrap();
    let x = Vector::from_slice(&[1.0, -2.0, 3.0]).unwrap();
    let ax = a.operate(&x).unwrap();
    let pseudo_inverse_ax = f.solve_least_squares(&ax).unwrap();
    let reconstructed = a.operate(&pseudo_inverse_ax).unwrap();
    assert!(reconstructed.all_close(&ax, 1e-9));
}
