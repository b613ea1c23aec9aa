//! Dense [`Vector`] arithmetic invariants and its interop with
//! [`LocalSparseVector`] through the shared `dot`/`to_vector` surface.

use matrix_core::{LocalSparseVector, SparseVector, Vector};

#[test]
fn plus_c_times_matches_manual_combination() {
    let a = Vector::from_slice(&[1.0, 2.0, 3.0]).unwrap();
    let b = Vector::from_slice(&[4.0, 5.0, 6.0]).unwrap();
    let combined = a.plus_c_times(&b, 2.0).unwrap();
    assert_eq!(combined.entry_as_array(), vec![9.0, 12.0, 15.0]);
}

#[test]
fn dot_is_symmetric() {
    let a = Vector::from_slice(&[1.0, -2.0, 3.0]).unwrap();
    let b = Vector::from_slice(&[4.0, 0.5, -1.0]).unwrap();
    assert_eq!(a.dot(&b).unwrap(), b.dot(&a).unwrap());
}

#[test]
fn norm2_square_equals_self_dot() {
    let a = Vector::from_slice(&[3.0, -4.0]).unwrap();
    assert!((a.norm2_square() - a.dot(&a).unwrap()).abs() < 1e-12);
    assert!((a.norm2() - 5.0).abs() < 1e-12);
}

#[test]
fn local_sparse_vector_dot_matches_materializing_then_dotting() {
    let dense = Vector::from_slice(&[10.0, 1.0, 1.0, 10.0, 0.0]).unwrap();
    let sparse = LocalSparseVector::new(5, 1, &[2.0, 3.0]).unwrap();
    let via_sparse = sparse.dot(&dense).unwrap();
    let via_materialized = sparse.to_vector().unwrap().dot(&dense).unwrap();
    assert!((via_sparse - via_materialized).abs() < 1e-12);
}

#[test]
fn all_close_is_false_outside_tolerance() {
    let a = Vector::from_slice(&[1.0, 2.0]).unwrap();
    let b = Vector::from_slice(&[1.0, 2.01]).unwrap();
    assert!(!a.all_close(&b, 1e-6));
    assert!(a.all_close(&b, 1e-1));
}
