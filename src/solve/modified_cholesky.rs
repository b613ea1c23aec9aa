//! Modified (pivoted) Cholesky for symmetric indefinite matrices:
//! `A = L D L^T` with `D` block-diagonal (`1x1`/`2x2` pivots), found with
//! no row/column permutation — only look-ahead pairing of a pivot with its
//! immediate neighbor, the scheme that also works unmodified on banded
//! input since it never swaps rows.

use crate::config::validate_epsilon;
use crate::error::{LinalgError, Result};
use crate::matrix::ldlt::{BlockDiagonalMatrix, PivotBlock, SymmetricMultiplied};
use crate::matrix::unitriangular::UnitriangularMatrix;
use crate::matrix::{Determinantable, EntryReadable, Invertible, Matrix, Symmetric};
use crate::solve::{Acceptance, Executor};

pub struct ModifiedCholeskyExecutor;

pub fn executor() -> ModifiedCholeskyExecutor {
    ModifiedCholeskyExecutor
}

pub type ModifiedCholesky = SymmetricMultiplied<BlockDiagonalMatrix>;

impl<M: Symmetric + EntryReadable> Executor<M> for ModifiedCholeskyExecutor {
    type Output = ModifiedCholesky;

    fn accepts(&self, matrix: &M) -> Acceptance {
        if matrix.dim().is_square() {
            Acceptance::Accepted
        } else {
            Acceptance::rejected(format!("modified Cholesky requires a square matrix, got {}", matrix.dim()))
        }
    }

    fn execute(&self, matrix: &M, epsilon: f64) -> Result<Option<ModifiedCholesky>> {
        tracing::debug!(dim = %matrix.dim(), epsilon, "modified_cholesky: starting look-ahead elimination");
        validate_epsilon(epsilon)?;
        let dim = matrix.dim();
        if !dim.is_square() {
            return Err(LinalgError::NotSquare { rows: dim.rows(), cols: dim.cols() });
        }
        let n = dim.rows();
        let scale = matrix.entry_norm_max().max(crate::config::STABILITY_ANCHOR);
        let threshold = epsilon * scale;

        let mut a = vec![0.0; n * n];
        for i in 0..n {
            for j in 0..=i {
                a[i * n + j] = matrix.value_at(i, j)?;
            }
        }
        let mut l = vec![0.0; n * n];
        let mut blocks = Vec::new();

        let mut k = 0;
        while k < n {
            if k == n - 1 || a[k * n + k].abs() > threshold {
                let d = a[k * n + k];
                let safe_d = if d == 0.0 { 1.0 } else { d };
                for i in (k + 1)..n {
                    l[i * n + k] = a[i * n + k] / safe_d;
                }
                for i in (k + 1)..n {
                    for j in (k + 1)..=i {
                        a[i * n + j] -= l[i * n + k] * a[j * n + k];
                    }
                }
                tracing::trace!(step = k, pivot = d, "modified_cholesky: 1x1 block accepted");
                blocks.push(PivotBlock::One(d));
                k += 1;
            } else {
                let (ak, akk1, ak1) = (a[k * n + k], a[(k + 1) * n + k], a[(k + 1) * n + k + 1]);
                let det2 = ak * ak1 - akk1 * akk1;
                if det2.abs() > threshold * threshold {
                    for i in (k + 2)..n {
                        let (ai_k, ai_k1) = (a[i * n + k], a[i * n + k + 1]);
                        l[i * n + k] = (ai_k * ak1 - ai_k1 * akk1) / det2;
                        l[i * n + k + 1] = (ai_k1 * ak - ai_k * akk1) / det2;
                    }
                    for i in (k + 2)..n {
                        for j in (k + 2)..=i {
                            a[i * n + j] -= l[i * n + k] * a[j * n + k] + l[i * n + k + 1] * a[j * n + k + 1];
                        }
                    }
                    tracing::trace!(step = k, det2, "modified_cholesky: 2x2 block accepted");
                    blocks.push(PivotBlock::Two { a: ak, b: akk1, d: ak1 });
                    k += 2;
                } else {
                    // neither a 1x1 nor an adjacent 2x2 pivot is acceptable
                    // with no permutation available to this scheme: the
                    // matrix is not factorable this way to working precision
                    tracing::warn!(step = k, pivot = ak, det2, "modified_cholesky: no acceptable pivot");
                    return Ok(None);
                }
            }
        }

        let l_mat = UnitriangularMatrix::from_strictly_lower(n, |i, j| l[i * n + j])?;
        let d_mat = BlockDiagonalMatrix::new(blocks)?;
        Ok(Some(SymmetricMultiplied::new(l_mat, d_mat)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_EPSILON;
    use crate::matrix::symmetric::SymmetricMatrixBuilder;
    use crate::vector::Vector;

    #[test]
    fn indefinite_matrix_factors_with_a_2x2_block() {
        // A = [[0, 1], [1, 0]] is symmetric indefinite: no 1x1 pivot works
        // at k=0, but the full 2x2 block is exactly invertible.
        let mut b = SymmetricMatrixBuilder::zero_builder(2).unwrap();
        b.set_value(0, 1, 1.0).unwrap();
        let a = b.build().unwrap();

        let f = executor().execute(&a, DEFAULT_EPSILON).unwrap().unwrap();
        assert!((f.determinant() - (-1.0)).abs() < 1e-9);

        let v = Vector::from_slice(&[1.0, 2.0]).unwrap();
        assert!(a.operate(&v).unwrap().all_close(&f.operate(&v).unwrap(), 1e-9));
    }

    #[test]
    fn positive_definite_matrix_uses_only_1x1_blocks() {
        let mut b = SymmetricMatrixBuilder::zero_builder(3).unwrap();
        b.set_value(0, 0, 4.0).unwrap();
        b.set_value(1, 1, 5.0).unwrap();
        b.set_value(2, 2, 6.0).unwrap();
        let a = b.build().unwrap();
        let f = executor().execute(&a, DEFAULT_EPSILON).unwrap().unwrap();
        assert!((f.determinant() - 120.0).abs() < 1e-6);
    }

    #[test]
    fn inverse_round_trips_for_indefinite_matrix() {
        let mut b = SymmetricMatrixBuilder::zero_builder(2).unwrap();
        b.set_value(0, 1, 1.0).unwrap();
        let a = b.build().unwrap();
        let f = executor().execute(&a, DEFAULT_EPSILON).unwrap().unwrap();
        let v = Vector::from_slice(&[1.0, 0.0]).unwrap();
        let av = a.operate(&v).unwrap();
        let back = f.inverse().operate(&av).unwrap();
        assert!(back.all_close(&v, 1e-8));
    }
}
