//! Dense Householder QR: `A = Q R`, `Q` an [`OrthogonalProduct`] of
//! reflectors, `R` upper trapezoidal. Accepts rectangular `rows >= cols`
//! input and exposes a least-squares solve built directly on the
//! factorization, the natural use for the over-determined case.

use std::sync::Arc;

use crate::config::validate_epsilon;
use crate::dim::MatrixDim;
use crate::error::{LinalgError, Result};
use crate::matrix::general::{GeneralMatrix, GeneralMatrixBuilder};
use crate::matrix::householder::HouseholderMatrix;
use crate::matrix::orthogonal_product::OrthogonalProduct;
use crate::matrix::{check_right_operable, EntryReadable, Matrix};
use crate::solve::{Acceptance, Executor};
use crate::vector::{canonicalize, Vector};

pub struct QrHouseholderExecutor;

pub fn executor() -> QrHouseholderExecutor {
    QrHouseholderExecutor
}

impl<M: EntryReadable> Executor<M> for QrHouseholderExecutor {
    type Output = QrHouseholder;

    fn accepts(&self, matrix: &M) -> Acceptance {
        let dim = matrix.dim();
        if dim.rows() >= dim.cols() {
            Acceptance::Accepted
        } else {
            Acceptance::rejected(format!(
                "Householder QR requires rows >= cols, got {}",
                dim
            ))
        }
    }

    fn execute(&self, matrix: &M, epsilon: f64) -> Result<Option<QrHouseholder>> {
        tracing::debug!(dim = %matrix.dim(), epsilon, "qr: starting Householder reflection");
        validate_epsilon(epsilon)?;
        let dim = matrix.dim();
        let (rows, cols) = (dim.rows(), dim.cols());
        if rows < cols {
            return Err(LinalgError::IllegalArgument(format!(
                "Householder QR requires rows >= cols, got {dim}"
            )));
        }
        let scale = matrix.entry_norm_max().max(crate::config::STABILITY_ANCHOR);
        let threshold = epsilon * scale;

        let mut a = vec![0.0; rows * cols];
        for i in 0..rows {
            for j in 0..cols {
                a[i * cols + j] = matrix.value_at(i, j)?;
            }
        }

        let mut reflectors: Vec<Arc<dyn Matrix>> = Vec::new();
        for k in 0..cols {
            let x: Vec<f64> = (k..rows).map(|i| a[i * cols + k]).collect();
            let norm_x = x.iter().map(|v| v * v).sum::<f64>().sqrt();
            if norm_x <= threshold {
                // column already (numerically) zero below the diagonal: A is
                // rank-deficient and has no Householder QR to working precision
                tracing::warn!(column = k, norm_x, "qr: column is rank-deficient, matrix is not factorable to working precision");
                return Ok(None);
            }
            let sign = if x[0] >= 0.0 { 1.0 } else { -1.0 };
            let alpha = -sign * norm_x;
            let mut v = x.clone();
            v[0] -= alpha;
            let norm_v = v.iter().map(|c| c * c).sum::<f64>().sqrt();
            if norm_v <= threshold {
                tracing::warn!(column = k, norm_v, "qr: degenerate reflector, matrix is not factorable to working precision");
                return Ok(None);
            }
            tracing::trace!(column = k, norm_x, "qr: reflecting column");
            let mut u_full = vec![0.0; rows];
            for (offset, c) in v.iter().enumerate() {
                u_full[k + offset] = c / norm_v;
            }
            let reflector = HouseholderMatrix::from_unit_vector(Vector::from_slice(&u_full)?);

            for j in k..cols {
                let col = Vector::from_slice(&(0..rows).map(|i| a[i * cols + j]).collect::<Vec<_>>())?;
                let reflected = reflector.operate(&col)?;
                for (i, value) in reflected.entry_as_array().into_iter().enumerate() {
                    a[i * cols + j] = canonicalize(value);
                }
            }
            reflectors.push(Arc::new(reflector));
        }

        let mut r_builder = GeneralMatrixBuilder::zero_builder(dim)?;
        for i in 0..rows {
            for j in i..cols {
                r_builder.set_value(i, j, a[i * cols + j])?;
            }
        }
        let r = r_builder.build()?;

        let sign = if reflectors.len() % 2 == 0 { 1 } else { -1 };
        let q = OrthogonalProduct::new(reflectors, sign)?;

        Ok(Some(QrHouseholder { q, r, dim }))
    }
}

/// `A = Q R`.
#[derive(Clone)]
pub struct QrHouseholder {
    q: OrthogonalProduct,
    r: GeneralMatrix,
    dim: MatrixDim,
}

impl QrHouseholder {
    pub fn q(&self) -> &OrthogonalProduct {
        &self.q
    }

    pub fn r(&self) -> &GeneralMatrix {
        &self.r
    }

    /// The least-squares solution to `A x ~= b` (the unique solution when
    /// `A` has full column rank): `x = R^{-1} Q^T b` restricted to `R`'s
    /// square `cols x cols` leading block.
    pub fn solve_least_squares(&self, b: &Vector) -> Result<Vector> {
        crate::matrix::check_left_operable(self.dim, b)?;
        let cols = self.dim.cols();
        let qtb = self.q.transpose().operate(b)?;
        let qtb = qtb.as_slice();

        let mut x = vec![0.0; cols];
        for i in (0..cols).rev() {
            let mut acc = qtb[i];
            for j in (i + 1)..cols {
                acc -= self.r.value_at(i, j)? * x[j];
            }
            let diag = self.r.value_at(i, i)?;
            if diag.abs() <= crate::config::DEFAULT_EPSILON * self.r.entry_norm_max().max(crate::config::STABILITY_ANCHOR) {
                return Err(LinalgError::IllegalArgument(format!(
                    "R is singular at row {i}: least squares solution is not unique"
                )));
            }
            x[i] = canonicalize(acc / diag);
        }
        Vector::from_slice(&x)
    }
}

impl Matrix for QrHouseholder {
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

    fn tall_4x3() -> GeneralMatrix {
        // full column rank, no special structure
        let entries = [
            [1.0, 1.0, 0.0],
            [1.0, 0.0, 1.0],
            [0.0, 1.0, 1.0],
            [1.0, 1.0, 1.0],
        ];
        let mut b = GeneralMatrixBuilder::zero_builder(MatrixDim::new(4, 3).unwrap()).unwrap();
        for (i, row) in entries.iter().enumerate() {
            for (j, &x) in row.iter().enumerate() {
                b.set_value(i, j, x).unwrap();
            }
        }
        b.build().unwrap()
    }

    #[test]
    fn factorization_reconstructs_original_operate() {
        let a = tall_4x3();
        let f = executor().execute(&a, DEFAULT_EPSILON).unwrap().unwrap();
        let v = Vector::from_slice(&[1.0, 2.0, 3.0]).unwrap();
        assert!(a.operate(&v).unwrap().all_close(&f.operate(&v).unwrap(), 1e-8));
    }

    #[test]
    fn q_is_orthogonal() {
        let a = tall_4x3();
        let f = executor().execute(&a, DEFAULT_EPSILON).unwrap().unwrap();
        let v = Vector::from_slice(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        let roundtrip = f.q().operate(&f.q().operate_transpose(&v).unwrap()).unwrap();
        assert!(roundtrip.all_close(&v, 1e-8));
    }

    #[test]
    fn solves_least_squares_consistent_system_exactly() {
        // pick x, form b = A x exactly, recover x via least squares
        let a = tall_4x3();
        let x = Vector::from_slice(&[1.0, -2.0, 3.0]).unwrap();
        let b = a.operate(&x).unwrap();
        let f = executor().execute(&a, DEFAULT_EPSILON).unwrap().unwrap();
        let recovered = f.solve_least_squares(&b).unwrap();
        assert!(recovered.all_close(&x, 1e-7));
    }

    #[test]
    fn accepts_rejects_wide_matrix() {
        let mut b = GeneralMatrixBuilder::zero_builder(MatrixDim::new(2, 3).unwrap()).unwrap();
        b.set_value(0, 0, 1.0).unwrap();
        let a = b.build().unwrap();
        assert!(!executor().accepts(&a).is_accepted());
    }
}
