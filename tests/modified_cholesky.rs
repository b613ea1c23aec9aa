//! Modified (pivoted) Cholesky's `L D L^T`, exercised both at the
//! `BlockDiagonalMatrix` level (a literal `D` with two 1x1 and two 2x2
//! blocks) and through the executor on a symmetric indefinite matrix that
//! forces the look-ahead 2x2 pairing.

use matrix_core::matrix::ldlt::{BlockDiagonalMatrix, PivotBlock};
use matrix_core::matrix::symmetric::SymmetricMatrixBuilder;
use matrix_core::solve::modified_cholesky;
use matrix_core::{Determinantable, Matrix, Vector};

#[test]
fn block_diagonal_determinant_combines_every_block() {
    let d = BlockDiagonalMatrix::new(vec![
        PivotBlock::Two { a: -13.0, b: 3.0, d: 14.0 },
        PivotBlock::One(-15.0),
        PivotBlock::Two { a: 16.0, b: 2.0, d: 17.0 },
        PivotBlock::One(-18.0),
    ])
    .unwrap();
    assert!((d.determinant() - (-13_820_760.0)).abs() < 1e-3);
    assert_eq!(d.sign_of_determinant(), -1);
}

#[test]
fn executor_pairs_an_indefinite_leading_entry_into_a_2x2_block() {
    // a[0][0] == 0 forces the look-ahead 2x2 pivot at k=0.
    let mut b = SymmetricMatrixBuilder::zero_builder(4).unwrap();
    b.set_value(0, 1, 1.0).unwrap();
    b.set_value(1, 1, 2.0).unwrap();
    b.set_value(2, 2, 6.0).unwrap();
    b.set_value(3, 3, 7.0).unwrap();
    let a = b.build().unwrap();

    let f = modified_cholesky::executor().execute(&a, 1e-12).unwrap().unwrap();
    // det(A) = det([[0,1],[1,2]]) * 6 * 7 = -1 * 42 = -42
    assert!((f.determinant() - (-42.0)).abs() < 1e-7);

    for seed in 0..4 {
        let mut raw = [0.0; 4];
        raw[seed] = 1.0;
        let e = Vector::from_slice(&raw).unwrap();
        assert!(a.operate(&e).unwrap().all_close(&f.operate(&e).unwrap(), 1e-9));
    }
}
