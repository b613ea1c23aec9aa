//! Banded Cholesky factorization: `A = L L^T` with `L` confined to the
//! same bandwidth as `A` (Cholesky introduces no fill-in, unlike pivoted
//! LU).

use std::sync::Arc;

use crate::config::validate_epsilon;
use crate::det::DeterminantValue;
use crate::dim::MatrixDim;
use crate::error::{LinalgError, Result};
use crate::matrix::{check_left_operable, check_right_operable, Band, Determinantable, EntryReadable, Invertible, Matrix, Symmetric};
use crate::solve::{Acceptance, Executor};
use crate::vector::{canonicalize, Vector};

pub struct CholeskyBandExecutor;

pub fn executor() -> CholeskyBandExecutor {
    CholeskyBandExecutor
}

impl<M: Symmetric + Band + EntryReadable> Executor<M> for CholeskyBandExecutor {
    type Output = CholeskyBand;

    fn accepts(&self, matrix: &M) -> Acceptance {
        if matrix.dim().is_square() {
            Acceptance::Accepted
        } else {
            Acceptance::rejected(format!("banded Cholesky requires a square matrix, got {}", matrix.dim()))
        }
    }

    fn execute(&self, matrix: &M, epsilon: f64) -> Result<Option<CholeskyBand>> {
        tracing::debug!(dim = %matrix.dim(), epsilon, "cholesky_band: starting elimination");
        validate_epsilon(epsilon)?;
        let dim = matrix.dim();
        if !dim.is_square() {
            return Err(LinalgError::NotSquare { rows: dim.rows(), cols: dim.cols() });
        }
        let band = matrix.band_dim();
        let n = band.n();
        let bw = band.lower();
        let scale = matrix.entry_norm_max().max(crate::config::STABILITY_ANCHOR);

        // packed the same way as `BandedLowerFactor` below: row `i` holds
        // `L(i, j)` for `j` in `max(0, i - bw) ..= i`.
        let width = bw + 1;
        let mut l = vec![0.0; n * width];
        let slot = |i: usize, j: usize| i * width + (j - i.saturating_sub(bw));

        for i in 0..n {
            let lo = i.saturating_sub(bw);
            for j in lo..=i {
                let mut sum = matrix.value_at(i, j)?;
                let kk_lo = lo.max(j.saturating_sub(bw));
                for k in kk_lo..j {
                    sum -= l[slot(i, k)] * l[slot(j, k)];
                }
                if i == j {
                    if sum <= epsilon * scale {
                        tracing::warn!(row = i, pivot = sum, "cholesky_band: matrix is not positive definite");
                        return Ok(None);
                    }
                    tracing::trace!(row = i, pivot = sum, "cholesky_band: diagonal pivot accepted");
                    l[slot(i, i)] = canonicalize(sum.sqrt());
                } else {
                    l[slot(i, j)] = canonicalize(sum / l[slot(j, j)]);
                }
            }
        }

        let l_factor = BandedLowerFactor { n, bw, values: Arc::new(l) };
        let det: DeterminantValue = (0..n)
            .map(|i| DeterminantValue::of_scalar(l_factor.diag(i)))
            .map(|d| d.combine(&d))
            .collect();
        Ok(Some(CholeskyBand { l: l_factor, det, dim }))
    }
}

#[derive(Clone)]
struct BandedLowerFactor {
    n: usize,
    bw: usize,
    values: Arc<Vec<f64>>,
}

impl BandedLowerFactor {
    fn diag(&self, i: usize) -> f64 {
        self.at(i, i)
    }

    fn at(&self, i: usize, j: usize) -> f64 {
        if j > i || i - j > self.bw {
            0.0
        } else {
            let width = self.bw + 1;
            self.values[i * width + (j - i.saturating_sub(self.bw))]
        }
    }

    fn solve(&self, v: &Vector) -> Result<Vector> {
        let mut x = vec![0.0; self.n];
        for i in 0..self.n {
            let lo = i.saturating_sub(self.bw);
            let mut acc = v.as_slice()[i];
            for j in lo..i {
                acc -= self.at(i, j) * x[j];
            }
            x[i] = canonicalize(acc / self.diag(i));
        }
        Vector::from_slice(&x)
    }

    fn solve_transpose(&self, v: &Vector) -> Result<Vector> {
        let mut x = vec![0.0; self.n];
        for i in (0..self.n).rev() {
            let mut acc = v.as_slice()[i];
            for j in (i + 1)..(i + self.bw + 1).min(self.n) {
                acc -= self.at(j, i) * x[j];
            }
            x[i] = canonicalize(acc / self.diag(i));
        }
        Vector::from_slice(&x)
    }
}

impl Matrix for BandedLowerFactor {
    fn dim(&self) -> MatrixDim {
        MatrixDim::square(self.n).expect("already validated")
    }

    fn operate(&self, v: &Vector) -> Result<Vector> {
        check_right_operable(self.dim(), v)?;
        let mut out = vec![0.0; self.n];
        for i in 0..self.n {
            let lo = i.saturating_sub(self.bw);
            let acc: f64 = (lo..=i).map(|j| self.at(i, j) * v.as_slice()[j]).sum();
            out[i] = canonicalize(acc);
        }
        Vector::from_slice(&out)
    }

    fn operate_transpose(&self, v: &Vector) -> Result<Vector> {
        check_left_operable(self.dim(), v)?;
        let mut out = vec![0.0; self.n];
        for j in 0..self.n {
            let hi = (j + self.bw).min(self.n - 1);
            let acc: f64 = (j..=hi).map(|i| self.at(i, j) * v.as_slice()[i]).sum();
            out[j] = canonicalize(acc);
        }
        Vector::from_slice(&out)
    }

    fn transpose(&self) -> Arc<dyn Matrix> {
        crate::matrix::create_transposed_of(self)
    }
}

/// `A = L L^T`, `L` banded with the same lower bandwidth as `A`.
#[derive(Clone)]
pub struct CholeskyBand {
    l: BandedLowerFactor,
    det: DeterminantValue,
    dim: MatrixDim,
}

impl CholeskyBand {
    pub fn l(&self) -> impl Matrix + Clone {
        self.l.clone()
    }
}

impl Matrix for CholeskyBand {
    fn dim(&self) -> MatrixDim {
        self.dim
    }

    fn operate(&self, v: &Vector) -> Result<Vector> {
        let ltv = self.l.operate_transpose(v)?;
        self.l.operate(&ltv)
    }

    fn operate_transpose(&self, v: &Vector) -> Result<Vector> {
        self.operate(v)
    }

    fn transpose(&self) -> Arc<dyn Matrix> {
        Arc::new(self.clone())
    }
}

impl Symmetric for CholeskyBand {}

impl Determinantable for CholeskyBand {
    fn determinant_value(&self) -> DeterminantValue {
        self.det
    }
}

impl Invertible for CholeskyBand {
    fn inverse(&self) -> Arc<dyn Matrix> {
        Arc::new(CholeskyBandInverse { l: self.l.clone(), dim: self.dim })
    }
}

#[derive(Clone)]
struct CholeskyBandInverse {
    l: BandedLowerFactor,
    dim: MatrixDim,
}

impl Matrix for CholeskyBandInverse {
    fn dim(&self) -> MatrixDim {
        self.dim
    }

    fn operate(&self, v: &Vector) -> Result<Vector> {
        check_right_operable(self.dim, v)?;
        let y = self.l.solve(v)?;
        self.l.solve_transpose(&y)
    }

    fn operate_transpose(&self, v: &Vector) -> Result<Vector> {
        self.operate(v)
    }

    fn transpose(&self) -> Arc<dyn Matrix> {
        Arc::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dim::BandDim;
    use crate::matrix::symmetric_band::SymmetricBandMatrixBuilder;

    fn spd_tridiag4() -> crate::matrix::symmetric_band::SymmetricBandMatrix {
        let mut b = SymmetricBandMatrixBuilder::zero_builder(4, 1).unwrap();
        for i in 0..4 {
            b.set_value(i, i, 4.0).unwrap();
        }
        for i in 0..3 {
            b.set_value(i, i + 1, -1.0).unwrap();
        }
        b.build().unwrap()
    }

    #[test]
    fn factorization_reconstructs_original_operate() {
        let a = spd_tridiag4();
        let f = executor().execute(&a, crate::config::DEFAULT_EPSILON).unwrap().unwrap();
        let v = Vector::from_slice(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert!(a.operate(&v).unwrap().all_close(&f.operate(&v).unwrap(), 1e-9));
    }

    #[test]
    fn inverse_round_trips() {
        let a = spd_tridiag4();
        let f = executor().execute(&a, crate::config::DEFAULT_EPSILON).unwrap().unwrap();
        let v = Vector::from_slice(&[1.0, 0.0, 0.0, 0.0]).unwrap();
        let av = a.operate(&v).unwrap();
        let back = f.inverse().operate(&av).unwrap();
        assert!(back.all_close(&v, 1e-8));
    }

    #[test]
    fn band_dim_matches_input() {
        let a = spd_tridiag4();
        let _ = BandDim::new(4, 1, 1).unwrap();
        assert_eq!(a.band_dim().lower(), 1);
    }
}
