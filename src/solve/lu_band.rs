//! Banded LU factorization with partial pivoting restricted to each
//! column's band window. Elimination itself works over a dense scratch
//! buffer for clarity; what is packed and returned is band-aware:
//! `L` keeps the original lower bandwidth, `U` is allocated `lower` extra
//! superdiagonals to absorb the fill-in partial pivoting introduces.

use std::sync::Arc;

use crate::config::validate_epsilon;
use crate::det::DeterminantValue;
use crate::dim::{BandDim, MatrixDim};
use crate::error::{LinalgError, Result};
use crate::matrix::band::{GeneralBandMatrix, GeneralBandMatrixBuilder};
use crate::matrix::permutation::PermutationMatrix;
use crate::matrix::unitriangular::UnitriangularMatrix;
use crate::matrix::{check_right_operable, Band, Determinantable, EntryReadable, Invertible, Matrix};
use crate::solve::{Acceptance, Executor};
use crate::vector::{canonicalize, Vector};

pub struct LuBandPivotingExecutor;

pub fn executor() -> LuBandPivotingExecutor {
    LuBandPivotingExecutor
}

impl<M: Band + EntryReadable> Executor<M> for LuBandPivotingExecutor {
    type Output = LuBandPivoting;

    fn accepts(&self, matrix: &M) -> Acceptance {
        if matrix.dim().is_square() {
            Acceptance::Accepted
        } else {
            Acceptance::rejected(format!("banded LU requires a square matrix, got {}", matrix.dim()))
        }
    }

    fn execute(&self, matrix: &M, epsilon: f64) -> Result<Option<LuBandPivoting>> {
        tracing::debug!(dim = %matrix.dim(), epsilon, "lu_band: starting partial-pivoted elimination");
        validate_epsilon(epsilon)?;
        let dim = matrix.dim();
        if !dim.is_square() {
            return Err(LinalgError::NotSquare { rows: dim.rows(), cols: dim.cols() });
        }
        let band = matrix.band_dim();
        let n = band.n();
        let (bl, bu) = (band.lower(), band.upper());
        let ubu = bl + bu; // U absorbs up to `bl` extra superdiagonals of fill-in

        let mut a = vec![0.0; n * n];
        for i in 0..n {
            let lo = i.saturating_sub(bl);
            let hi = (i + bu).min(n - 1);
            for j in lo..=hi {
                a[i * n + j] = matrix.value_at(i, j)?;
            }
        }

        let scale = (0..n)
            .map(|i| (0..n).map(|j| a[i * n + j].abs()).sum::<f64>())
            .fold(0.0, f64::max)
            .max(crate::config::STABILITY_ANCHOR);

        let mut perm: Vec<usize> = (0..n).collect();

        for k in 0..n {
            // partial pivoting in a band matrix can only ever need a row
            // from the original lower-bandwidth window below k
            let candidate_hi = (k + bl).min(n - 1);
            let (pivot_row, _) = (k..=candidate_hi)
                .map(|r| (r, a[r * n + k].abs()))
                .fold((k, -1.0), |best, cand| if cand.1 > best.1 { cand } else { best });
            if pivot_row != k {
                for j in 0..n {
                    a.swap(k * n + j, pivot_row * n + j);
                }
                perm.swap(k, pivot_row);
            }
            let pivot = a[k * n + k];
            if pivot.abs() <= epsilon * scale {
                tracing::warn!(step = k, pivot, "lu_band: singular pivot, matrix is not factorable to working precision");
                return Ok(None);
            }
            tracing::trace!(step = k, pivot, "lu_band: eliminating column");
            let elim_hi = (k + bl).min(n - 1);
            let row_hi = (k + ubu).min(n - 1);
            for i in (k + 1)..=elim_hi {
                let factor = a[i * n + k] / pivot;
                a[i * n + k] = factor;
                for j in (k + 1)..=row_hi {
                    a[i * n + j] = canonicalize(a[i * n + j] - factor * a[k * n + j]);
                }
            }
        }

        let l = UnitriangularMatrix::from_band(n, bl, |i, j| a[i * n + j])?;
        let u_band = BandDim::new(n, 0, ubu)?;
        let mut u_builder = GeneralBandMatrixBuilder::zero_builder(u_band)?;
        for i in 0..n {
            for j in i..=(i + ubu).min(n - 1) {
                u_builder.set_value(i, j, a[i * n + j])?;
            }
        }
        let u = u_builder.build()?;

        let mut image = vec![0usize; n];
        for (k, &orig) in perm.iter().enumerate() {
            image[orig] = k;
        }
        let p = PermutationMatrix::from_image(&image)?;

        let u_det: DeterminantValue = (0..n).map(|i| DeterminantValue::of_scalar(a[i * n + i])).collect();
        let det = p.determinant_value().combine(&u_det);

        Ok(Some(LuBandPivoting { p, l, u, det, dim }))
    }
}

/// `A = P^T L U`, `L` packed to the original lower bandwidth, `U` packed
/// to `lower + upper` superdiagonals.
#[derive(Clone)]
pub struct LuBandPivoting {
    p: PermutationMatrix,
    l: UnitriangularMatrix,
    u: GeneralBandMatrix,
    det: DeterminantValue,
    dim: MatrixDim,
}

impl LuBandPivoting {
    pub fn p(&self) -> &PermutationMatrix {
        &self.p
    }

    pub fn l(&self) -> &UnitriangularMatrix {
        &self.l
    }

    pub fn u(&self) -> &GeneralBandMatrix {
        &self.u
    }
}

impl Matrix for LuBandPivoting {
    fn dim(&self) -> MatrixDim {
        self.dim
    }

    fn operate(&self, v: &Vector) -> Result<Vector> {
        check_right_operable(self.dim, v)?;
        let uv = self.u.operate(v)?;
        let luv = self.l.operate(&uv)?;
        self.p.operate_transpose(&luv)
    }

    fn operate_transpose(&self, v: &Vector) -> Result<Vector> {
        let pv = self.p.operate(v)?;
        let ltpv = self.l.operate_transpose(&pv)?;
        self.u.operate_transpose(&ltpv)
    }

    fn transpose(&self) -> Arc<dyn Matrix> {
        crate::matrix::create_transposed_of(self)
    }
}

impl Determinantable for LuBandPivoting {
    fn determinant_value(&self) -> DeterminantValue {
        self.det
    }
}

impl Invertible for LuBandPivoting {
    fn inverse(&self) -> Arc<dyn Matrix> {
        Arc::new(LuBandInverse {
            p: self.p.clone(),
            l_inv: self.l.inverse(),
            u: self.u.clone(),
            dim: self.dim,
        })
    }
}

#[derive(Clone)]
struct LuBandInverse {
    p: PermutationMatrix,
    l_inv: Arc<dyn Matrix>,
    u: GeneralBandMatrix,
    dim: MatrixDim,
}

impl LuBandInverse {
    fn n(&self) -> usize {
        self.dim.rows()
    }

    fn solve_upper(&self, v: &Vector) -> Result<Vector> {
        let n = self.n();
        let upper = self.u.band_dim().upper();
        let mut x = vec![0.0; n];
        for i in (0..n).rev() {
            let mut acc = v.as_slice()[i];
            for j in (i + 1)..=(i + upper).min(n - 1) {
                acc -= self.u.value_at(i, j)? * x[j];
            }
            let diag = self.u.value_at(i, i)?;
            x[i] = canonicalize(acc / diag);
        }
        Vector::from_slice(&x)
    }

    fn solve_upper_transpose(&self, v: &Vector) -> Result<Vector> {
        let n = self.n();
        let upper = self.u.band_dim().upper();
        let mut x = vec![0.0; n];
        for i in 0..n {
            let mut acc = v.as_slice()[i];
            for j in i.saturating_sub(upper)..i {
                acc -= self.u.value_at(j, i)? * x[j];
            }
            let diag = self.u.value_at(i, i)?;
            x[i] = canonicalize(acc / diag);
        }
        Vector::from_slice(&x)
    }
}

impl Matrix for LuBandInverse {
    fn dim(&self) -> MatrixDim {
        self.dim
    }

    fn operate(&self, v: &Vector) -> Result<Vector> {
        check_right_operable(self.dim, v)?;
        let pv = self.p.operate(v)?;
        let lv = self.l_inv.operate(&pv)?;
        self.solve_upper(&lv)
    }

    fn operate_transpose(&self, v: &Vector) -> Result<Vector> {
        let uv = self.solve_upper_transpose(v)?;
        let lv = self.l_inv.transpose().operate(&uv)?;
        self.p.operate_transpose(&lv)
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
        assert!(a.operate(&v).unwrap().all_close(&f.operate(&v).unwrap(), 1e-9));
    }

    #[test]
    fn inverse_round_trips() {
        let a = tridiag4();
        let f = executor().execute(&a, DEFAULT_EPSILON).unwrap().unwrap();
        let v = Vector::from_slice(&[1.0, 0.0, 0.0, 0.0]).unwrap();
        let av = a.operate(&v).unwrap();
        let back = f.inverse().operate(&av).unwrap();
        assert!(back.all_close(&v, 1e-8));
    }
}
