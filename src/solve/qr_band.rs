//! Banded Householder QR. A banded matrix's column `k` is already zero
//! below row `k + lower`, so each reflector only needs support on rows
//! `k ..= k + lower` — the same band-window restriction `lu_band` applies
//! to pivoting. `R` absorbs `lower` extra superdiagonals of fill-in, same
//! as banded LU's `U`; `Q` itself is generally dense, as it is in any
//! banded QR.

use std::sync::Arc;

use crate::config::validate_epsilon;
use crate::dim::{BandDim, MatrixDim};
use crate::error::{LinalgError, Result};
use crate::matrix::band::{GeneralBandMatrix, GeneralBandMatrixBuilder};
use crate::matrix::householder::HouseholderMatrix;
use crate::matrix::orthogonal_product::OrthogonalProduct;
use crate::matrix::{check_right_operable, Band, EntryReadable, Matrix};
use crate::solve::{Acceptance, Executor};
use crate::vector::{canonicalize, Vector};

pub struct QrBandHouseholderExecutor;

pub fn executor() -> QrBandHouseholderExecutor {
    QrBandHouseholderExecutor
}

impl<M: Band + EntryReadable> Executor<M> for QrBandHouseholderExecutor {
    type Output = QrBandHouseholder;

    fn accepts(&self, matrix: &M) -> Acceptance {
        if matrix.dim().is_square() {
            Acceptance::Accepted
        } else {
            Acceptance::rejected(format!("banded QR requires a square matrix, got {}", matrix.dim()))
        }
    }

    fn execute(&self, matrix: &M, epsilon: f64) -> Result<Option<QrBandHouseholder>> {
        tracing::debug!(dim = %matrix.dim(), epsilon, "qr_band: starting Householder reflection");
        validate_epsilon(epsilon)?;
        let dim = matrix.dim();
        if !dim.is_square() {
            return Err(LinalgError::NotSquare { rows: dim.rows(), cols: dim.cols() });
        }
        let band = matrix.band_dim();
        let n = band.n();
        let (bl, bu) = (band.lower(), band.upper());
        let rbu = bl + bu;
        let scale = matrix.entry_norm_max().max(crate::config::STABILITY_ANCHOR);
        let threshold = epsilon * scale;

        // `a` is allocated to the widened `n x n` scratch size up front;
        // only the source matrix's own band is populated, the rest starts
        // zero and fills in as reflectors are applied.
        let mut a = vec![0.0; n * n];
        for i in 0..n {
            let lo = i.saturating_sub(bl);
            let hi = (i + bu).min(n - 1);
            for j in lo..=hi {
                a[i * n + j] = matrix.value_at(i, j)?;
            }
        }

        let mut reflectors: Vec<Arc<dyn Matrix>> = Vec::new();
        for k in 0..n {
            let row_hi = (k + bl).min(n - 1);
            if row_hi == k {
                continue;
            }
            let x: Vec<f64> = (k..=row_hi).map(|i| a[i * n + k]).collect();
            let norm_x = x.iter().map(|v| v * v).sum::<f64>().sqrt();
            if norm_x <= threshold {
                tracing::warn!(column = k, norm_x, "qr_band: column is rank-deficient, matrix is not factorable to working precision");
                return Ok(None);
            }
            let sign = if x[0] >= 0.0 { 1.0 } else { -1.0 };
            let alpha = -sign * norm_x;
            let mut v = x.clone();
            v[0] -= alpha;
            let norm_v = v.iter().map(|c| c * c).sum::<f64>().sqrt();
            if norm_v <= threshold {
                tracing::warn!(column = k, norm_v, "qr_band: degenerate reflector, matrix is not factorable to working precision");
                return Ok(None);
            }
            tracing::trace!(column = k, norm_x, "qr_band: reflecting column");
            let mut u_full = vec![0.0; n];
            for (offset, c) in v.iter().enumerate() {
                u_full[k + offset] = c / norm_v;
            }
            let window_u = &u_full[k..=row_hi];
            let col_hi = (k + rbu).min(n - 1);
            for j in k..=col_hi {
                let col: Vec<f64> = (k..=row_hi).map(|i| a[i * n + j]).collect();
                let dot: f64 = window_u.iter().zip(col.iter()).map(|(u, x)| u * x).sum();
                for (offset, (&x, &u)) in col.iter().zip(window_u.iter()).enumerate() {
                    a[(k + offset) * n + j] = canonicalize(x - 2.0 * dot * u);
                }
            }
            let reflector = HouseholderMatrix::from_unit_vector(Vector::from_slice(&u_full)?);
            reflectors.push(Arc::new(reflector));
        }

        let r_band = BandDim::new(n, 0, rbu)?;
        let mut r_builder = GeneralBandMatrixBuilder::zero_builder(r_band)?;
        for i in 0..n {
            for j in i..=(i + rbu).min(n - 1) {
                r_builder.set_value(i, j, a[i * n + j])?;
            }
        }
        let r = r_builder.build()?;

        let sign = if reflectors.len() % 2 == 0 { 1 } else { -1 };
        let q = OrthogonalProduct::new(reflectors, sign)?;

        Ok(Some(QrBandHouseholder { q, r, dim }))
    }
}

/// `A = Q R`, `R` packed with `lower + upper` superdiagonals absorbing
/// the fill-in partial reflection introduces.
#[derive(Clone)]
pub struct QrBandHouseholder {
    q: OrthogonalProduct,
    r: GeneralBandMatrix,
    dim: MatrixDim,
}

impl QrBandHouseholder {
    pub fn q(&self) -> &OrthogonalProduct {
        &self.q
    }

    pub fn r(&self) -> &GeneralBandMatrix {
        &self.r
    }

    /// Solves `A x = b` via `x = R^{-1} Q^T b`, exact when `A` is
    /// nonsingular (the square case this solver targets).
    pub fn solve(&self, b: &Vector) -> Result<Vector> {
        check_right_operable(self.dim, b)?;
        let n = self.dim.rows();
        let upper = self.r.band_dim().upper();
        let qtb = self.q.transpose().operate(b)?;
        let qtb = qtb.as_slice();

        let mut x = vec![0.0; n];
        for i in (0..n).rev() {
            let mut acc = qtb[i];
            for j in (i + 1)..=(i + upper).min(n - 1) {
                acc -= self.r.value_at(i, j)? * x[j];
            }
            let diag = self.r.value_at(i, i)?;
            if diag.abs() <= crate::config::DEFAULT_EPSILON * self.r.entry_norm_max().max(crate::config::STABILITY_ANCHOR) {
                return Err(LinalgError::IllegalArgument(format!("R is singular at row {i}")));
            }
            x[i] = canonicalize(acc / diag);
        }
        Vector::from_slice(&x)
    }
}

impl Matrix for QrBandHouseholder {
    fn dim(&self) -> MatrixDim {
        self.dim
    }

    fn operate(&self, v: &Vector) -> Result<Vector> {
        check_right_operable(self.dim, v)?;
        let rv = self.r.operate(v)?;
        self.q.operate(&rv)
    }

    fn operate_transpose(&self, v: &Vector) -> Result<Vector> {
        let qtv = self.q.operate_transpose(v)?;
        self.r.operate_transpose(&qtv)
    }

    fn transpose(&self) -> Arc<dyn Matrix> {
        crate::matrix::create_transposed_of(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_EPSILON;
    use crate::matrix::band::GeneralBandMatrixBuilder;

    fn tridiag4() -> GeneralBandMatrix {
        let band = BandDim::new(4, 1, 1).unwrap();
        let mut b = GeneralBandMatrixBuilder::zero_builder(band).unwrap();
        for i in 0..4 {
            b.set_value(i, i, 4.0).unwrap();
        }
        for i in 0..3 {
            b.set_value(i, i + 1, -1.0).unwrap();
            b.set_value(i + 1, i, -1.0).unwrap();
        }
        b.build().unwrap()
    }

    #[test]
    fn factorization_reconstructs_original_operate() {
        let a = tridiag4();
        let f = executor().execute(&a, DEFAULT_EPSILON).unwrap().unwrap();
        let v = Vector::from_slice(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert!(a.operate(&v).unwrap().all_close(&f.operate(&v).unwrap(), 1e-8));
    }

    #[test]
    fn solve_recovers_known_solution() {
        let a = tridiag4();
        let x = Vector::from_slice(&[1.0, -1.0, 2.0, 0.5]).unwrap();
        let b = a.operate(&x).unwrap();
        let f = executor().execute(&a, DEFAULT_EPSILON).unwrap().unwrap();
        let recovered = f.solve(&b).unwrap();
        assert!(recovered.all_close(&x, 1e-7));
    }
}
