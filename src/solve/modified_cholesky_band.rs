//! Banded modified Cholesky: the same look-ahead `1x1`/`2x2` block
//! pivoting as [`crate::solve::modified_cholesky`], restricted to a band
//! window so `L` never grows beyond `A`'s bandwidth.

use crate::config::validate_epsilon;
use crate::error::{LinalgError, Result};
use crate::matrix::ldlt::{BlockDiagonalMatrix, PivotBlock, SymmetricMultiplied};
use crate::matrix::unitriangular::UnitriangularMatrix;
use crate::matrix::{Band, Determinantable, EntryReadable, Invertible, Matrix, Symmetric};
use crate::solve::{Acceptance, Executor};

pub struct ModifiedCholeskyBandExecutor;

pub fn executor() -> ModifiedCholeskyBandExecutor {
    ModifiedCholeskyBandExecutor
}

pub type ModifiedCholeskyBand = SymmetricMultiplied<BlockDiagonalMatrix>;

impl<M: Symmetric + Band + EntryReadable> Executor<M> for ModifiedCholeskyBandExecutor {
    type Output = ModifiedCholeskyBand;

    fn accepts(&self, matrix: &M) -> Acceptance {
        if matrix.dim().is_square() {
            Acceptance::Accepted
        } else {
            Acceptance::rejected(format!("banded modified Cholesky requires a square matrix, got {}", matrix.dim()))
        }
    }

    fn execute(&self, matrix: &M, epsilon: f64) -> Result<Option<ModifiedCholeskyBand>> {
        tracing::debug!(dim = %matrix.dim(), epsilon, "modified_cholesky_band: starting look-ahead elimination");
        validate_epsilon(epsilon)?;
        let dim = matrix.dim();
        if !dim.is_square() {
            return Err(LinalgError::NotSquare { rows: dim.rows(), cols: dim.cols() });
        }
        let band = matrix.band_dim();
        let n = band.n();
        let bw = band.lower();
        let scale = matrix.entry_norm_max().max(crate::config::STABILITY_ANCHOR);
        let threshold = epsilon * scale;

        // dense working copy, same simplification `lu_band` documents: the
        // band window bounds which entries are read and updated, but the
        // scratch buffer itself is not packed
        let mut a = vec![0.0; n * n];
        for i in 0..n {
            let lo = i.saturating_sub(bw);
            for j in lo..=i {
                a[i * n + j] = matrix.value_at(i, j)?;
            }
        }
        let mut l = vec![0.0; n * n];
        let mut blocks = Vec::new();

        let mut k = 0;
        while k < n {
            let row_hi = (k + bw).min(n - 1);
            if k == n - 1 || a[k * n + k].abs() > threshold {
                let d = a[k * n + k];
                let safe_d = if d == 0.0 { 1.0 } else { d };
                for i in (k + 1)..=row_hi {
                    l[i * n + k] = a[i * n + k] / safe_d;
                }
                for i in (k + 1)..=row_hi {
                    for j in (k + 1)..=i.min(row_hi) {
                        a[i * n + j] -= l[i * n + k] * a[j * n + k];
                    }
                }
                tracing::trace!(step = k, pivot = d, "modified_cholesky_band: 1x1 block accepted");
                blocks.push(PivotBlock::One(d));
                k += 1;
            } else {
                let (ak, akk1, ak1) = (a[k * n + k], a[(k + 1) * n + k], a[(k + 1) * n + k + 1]);
                let det2 = ak * ak1 - akk1 * akk1;
                if det2.abs() > threshold * threshold {
                    let row_hi2 = (k + 1 + bw).min(n - 1);
                    for i in (k + 2)..=row_hi2 {
                        let (ai_k, ai_k1) = (a[i * n + k], a[i * n + k + 1]);
                        l[i * n + k] = (ai_k * ak1 - ai_k1 * akk1) / det2;
                        l[i * n + k + 1] = (ai_k1 * ak - ai_k * akk1) / det2;
                    }
                    for i in (k + 2)..=row_hi2 {
                        for j in (k + 2)..=i.min(row_hi2) {
                            a[i * n + j] -= l[i * n + k] * a[j * n + k] + l[i * n + k + 1] * a[j * n + k + 1];
                        }
                    }
                    tracing::trace!(step = k, det2, "modified_cholesky_band: 2x2 block accepted");
                    blocks.push(PivotBlock::Two { a: ak, b: akk1, d: ak1 });
                    k += 2;
                } else {
                    tracing::warn!(step = k, pivot = ak, det2, "modified_cholesky_band: no acceptable pivot");
                    return Ok(None);
                }
            }
        }

        let l_mat = UnitriangularMatrix::from_band(n, bw, |i, j| a[i * n + j])?;
        let d_mat = BlockDiagonalMatrix::new(blocks)?;
        Ok(Some(SymmetricMultiplied::new(l_mat, d_mat)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_EPSILON;
    use crate::matrix::symmetric_band::SymmetricBandMatrixBuilder;
    use crate::vector::Vector;

    #[test]
    fn tridiagonal_spd_uses_only_1x1_blocks() {
        let mut b = SymmetricBandMatrixBuilder::zero_builder(4, 1).unwrap();
        for i in 0..4 {
            b.set_value(i, i, 4.0).unwrap();
        }
        for i in 0..3 {
            b.set_value(i, i + 1, -1.0).unwrap();
        }
        let a = b.build().unwrap();
        let f = executor().execute(&a, DEFAULT_EPSILON).unwrap().unwrap();
        let v = Vector::from_slice(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert!(a.operate(&v).unwrap().all_close(&f.operate(&v).unwrap(), 1e-9));
    }

    #[test]
    fn indefinite_tridiagonal_uses_a_2x2_block() {
        // zero diagonal forces a 2x2 pivot at the very first step
        let mut b = SymmetricBandMatrixBuilder::zero_builder(3, 1).unwrap();
        b.set_value(0, 1, 1.0).unwrap();
        b.set_value(1, 1, 0.0).unwrap();
        b.set_value(1, 2, 1.0).unwrap();
        b.set_value(2, 2, 2.0).unwrap();
        let a = b.build().unwrap();
        let f = executor().execute(&a, DEFAULT_EPSILON).unwrap().unwrap();
        let v = Vector::from_slice(&[1.0, 1.0, 1.0]).unwrap();
        assert!(a.operate(&v).unwrap().all_close(&f.operate(&v).unwrap(), 1e-9));
    }

    #[test]
    fn inverse_round_trips() {
        let mut b = SymmetricBandMatrixBuilder::zero_builder(3, 1).unwrap();
        for i in 0..3 {
            b.set_value(i, i, 3.0).unwrap();
        }
        for i in 0..2 {
            b.set_value(i, i + 1, 1.0).unwrap();
        }
        let a = b.build().unwrap();
        let f = executor().execute(&a, DEFAULT_EPSILON).unwrap().unwrap();
        let v = Vector::from_slice(&[1.0, 0.0, 0.0]).unwrap();
        let av = a.operate(&v).unwrap();
        let back = f.inverse().operate(&av).unwrap();
        assert!(back.all_close(&v, 1e-8));
    }
}
