//! Partial-pivoted LU against a literal 4x4 system with a known
//! determinant, checked independently of the in-module unit tests.

use matrix_core::matrix::general::GeneralMatrixBuilder;
use matrix_core::solve::lu;
use matrix_core::{Determinantable, Invertible, Matrix, MatrixDim, Vector};

fn matrix4() -> matrix_core::matrix::general::GeneralMatrix {
    let entries = [
        [1.0, 2.0, 3.0, 4.0],
        [2.0, 5.0, 9.0, 3.0],
        [2.0, 6.0, 3.0, 1.0],
        [-1.0, 0.0, 1.0, 1.0],
    ];
    let mut b = GeneralMatrixBuilder::zero_builder(MatrixDim::square(4).unwrap()).unwrap();
    for (i, row) in entries.iter().enumerate() {
        for (j, &x) in row.iter().enumerate() {
            b.set_value(i, j, x).unwrap();
        }
    }
    b.build().unwrap()
}

#[test]
fn determinant_matches_known_value() {
    let a = matrix4();
    let f = lu::executor().execute(&a, 1e-12).unwrap().unwrap();
    assert!((f.determinant() - (-129.0)).abs() < 1e-7);
    assert_eq!(f.sign_of_determinant(), -1);
    assert!((f.log_abs_determinant() - 129f64.ln()).abs() < 1e-9);
}

#[test]
fn inverse_matches_independently_computed_column() {
    let a = matrix4();
    let f = lu::executor().execute(&a, 1e-12).unwrap().unwrap();
    let e0 = Vector::from_slice(&[1.0, 0.0, 0.0, 0.0]).unwrap();
    let col = f.inverse().operate(&e0).unwrap();
    let expected = Vector::from_slice(&[26.0 / 129.0, -8.0 / 129.0, -5.0 / 43.0, 41.0 / 129.0]).unwrap();
    assert!(col.all_close(&expected, 1e-9));
}

#[test]
fn factors_reconstruct_original_via_p_l_u() {
    let a = matrix4();
    let f = lu::executor().execute(&a, 1e-12).unwrap().unwrap();
    for seed in 0..4 {
        let mut raw = [0.0; 4];
        raw[seed] = 1.0;
        let e = Vector::from_slice(&raw).unwrap();
        let direct = a.operate(&e).unwrap();
        let via_factors = f.operate(&e).unwrap();
        assert!(direct.all_close(&via_factors, 1e-9));
    }
}

#[test]
fn singular_matrix_is_reported_as_empty_rather_than_corrupted() {
    // rows 1 and 2 are linearly dependent (row2 = 2 * row1): exactly singular
    let entries = [[1.0, 2.0, 3.0, 4.0], [2.0, 4.0, 6.0, 8.0], [0.0, 1.0, 0.0, 2.0], [1.0, 0.0, 1.0, 0.0]];
    let mut b = GeneralMatrixBuilder::zero_builder(MatrixDim::square(4).unwrap()).unwrap();
    for (i, row) in entries.iter().enumerate() {
        for (j, &x) in row.iter().enumerate() {
            b.set_value(i, j, x).unwrap();
        }
    }
    let a = b.build().unwrap();
    assert!(lu::executor().execute(&a, 1e-12).unwrap().is_none());
}
