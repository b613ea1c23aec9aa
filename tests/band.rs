//! The banded solvers, checked against dense-equivalent reconstructions:
//! banded LU on a non-symmetric pentadiagonal-ish matrix, banded Cholesky
//! and banded modified Cholesky on symmetric band matrices.

use matrix_core::matrix::band::GeneralBandMatrixBuilder;
use matrix_core::matrix::symmetric_band::SymmetricBandMatrixBuilder;
use matrix_core::solve::{cholesky_band, lu_band, modified_cholesky_band};
use matrix_core::{BandDim, Determinantable, Matrix, Vector};

fn tridiag_general() -> matrix_core::matrix::band::GeneralBandMatrix {
    let band = BandDim::new(5, 1, 1).unwrap();
    let mut b = GeneralBandMatrixBuilder::zero_builder(band).unwrap();
    for i in 0..5 {
        b.set_value(i, i, 6.0 + i as f64).unwrap();
    }
    for i in 0..4 {
        b.set_value(i, i + 1, -2.0).unwrap();
        b.set_value(i + 1, i, -1.0).unwrap();
    }
    b.build().unwrap()
}

#[test]
fn banded_lu_reconstructs_original_operate() {
    let a = tridiag_general();
    let f = lu_band::executor().execute(&a, 1e-12).unwrap().unwrap();
    let v = Vector::from_slice(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
    assert!(a.operate(&v).unwrap().all_close(&f.operate(&v).unwrap(), 1e-8));
}

fn spd_band() -> matrix_core::matrix::symmetric_band::SymmetricBandMatrix {
    let mut b = SymmetricBandMatrixBuilder::zero_builder(5, 1).unwrap();
    for i in 0..5 {
        b.set_value(i, i, 10.0).unwrap();
    }
    for i in 0..4 {
        b.set_value(i, i + 1, -1.0).unwrap();
    }
    b.build().unwrap()
}

#[test]
fn banded_cholesky_reconstructs_original_operate() {
    let a = spd_band();
    let f = cholesky_band::executor().execute(&a, 1e-12).unwrap().unwrap();
    let v = Vector::from_slice(&[1.0, -1.0, 2.0, -2.0, 3.0]).unwrap();
    assert!(a.operate(&v).unwrap().all_close(&f.operate(&v).unwrap(), 1e-8));
}

#[test]
fn banded_modified_cholesky_matches_banded_cholesky_on_a_positive_definite_band() {
    // strictly diagonally dominant band is positive definite, so the
    // modified (pivoted) factorization should use only 1x1 blocks and
    // agree with plain banded Cholesky's determinant.
    let a = spd_band();
    let plain = cholesky_band::executor().execute(&a, 1e-12).unwrap().unwrap();
    let modified = modified_cholesky_band::executor().execute(&a, 1e-12).unwrap().unwrap();
    assert!((plain.determinant() - modified.determinant()).abs() < 1e-6);
}
