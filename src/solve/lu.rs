//! Dense LU factorization with partial pivoting: `P A = L U`.

use std::sync::Arc;

use crate::config::validate_epsilon;
use crate::det::DeterminantValue;
use crate::dim::MatrixDim;
use crate::error::{LinalgError, Result};
use crate::matrix::general::{GeneralMatrix, GeneralMatrixBuilder};
use crate::matrix::permutation::PermutationMatrix;
use crate::matrix::unitriangular::UnitriangularMatrix;
use crate::matrix::{check_right_operable, Determinantable, EntryReadable, Invertible, Matrix};
use crate::solve::{Acceptance, Executor};
use crate::vector::{canonicalize, Vector};

/// The `LuPivoting` executor: Doolittle elimination with partial (row)
/// pivoting, accepting any square `EntryReadable` matrix.
pub struct LuPivotingExecutor;

pub fn executor() -> LuPivotingExecutor {
    LuPivotingExecutor
}

impl<M: EntryReadable> Executor<M> for LuPivotingExecutor {
    type Output = LuPivoting;

    fn accepts(&self, matrix: &M) -> Acceptance {
        if matrix.dim().is_square() {
            Acceptance::Accepted
        } else {
            Acceptance::rejected(format!("LU requires a square matrix, got {}", matrix.dim()))
        }
    }

    fn execute(&self, matrix: &M, epsilon: f64) -> Result<Option<LuPivoting>> {
        tracing::debug!(dim = %matrix.dim(), epsilon, "lu: starting partial-pivoted elimination");
        validate_epsilon(epsilon)?;
        let dim = matrix.dim();
        if !dim.is_square() {
            return Err(LinalgError::NotSquare { rows: dim.rows(), cols: dim.cols() });
        }
        let n = dim.rows();

        let mut a = vec![0.0; n * n];
        for i in 0..n {
            for j in 0..n {
                a[i * n + j] = matrix.value_at(i, j)?;
            }
        }

        // initial infinity norm, fixed for the whole elimination per the
        // stability anchor used to judge a pivot numerically zero
        let scale = (0..n)
            .map(|i| (0..n).map(|j| a[i * n + j].abs()).sum::<f64>())
            .fold(0.0, f64::max)
            .max(crate::config::STABILITY_ANCHOR);

        let mut perm: Vec<usize> = (0..n).collect();

        for k in 0..n {
            let (pivot_row, _) = (k..n)
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
                tracing::warn!(step = k, pivot, "lu: singular pivot, matrix is not factorable to working precision");
                return Ok(None);
            }
            tracing::trace!(step = k, pivot, "lu: eliminating column");
            for i in (k + 1)..n {
                let factor = a[i * n + k] / pivot;
                a[i * n + k] = factor;
                for j in (k + 1)..n {
                    a[i * n + j] = canonicalize(a[i * n + j] - factor * a[k * n + j]);
                }
            }
        }

        let l = UnitriangularMatrix::from_strictly_lower(n, |i, j| a[i * n + j])?;
        let mut u_builder = GeneralMatrixBuilder::zero_builder(MatrixDim::square(n)?)?;
        for i in 0..n {
            for j in i..n {
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

        Ok(Some(LuPivoting { p, l, u, det, dim }))
    }
}

/// The factorization object: `A = P^T L U`.
#[derive(Clone)]
pub struct LuPivoting {
    p: PermutationMatrix,
    l: UnitriangularMatrix,
    u: GeneralMatrix,
    det: DeterminantValue,
    dim: MatrixDim,
}

impl LuPivoting {
    pub fn p(&self) -> &PermutationMatrix {
        &self.p
    }

    pub fn l(&self) -> &UnitriangularMatrix {
        &self.l
    }

    pub fn u(&self) -> &GeneralMatrix {
        &self.u
    }
}

impl Matrix for LuPivoting {
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

impl Determinantable for LuPivoting {
    fn determinant_value(&self) -> DeterminantValue {
        self.det
    }
}

impl Invertible for LuPivoting {
    fn inverse(&self) -> Arc<dyn Matrix> {
        Arc::new(LuInverse {
            p: self.p.clone(),
            l_inv: self.l.inverse(),
            u: self.u.clone(),
            dim: self.dim,
        })
    }
}

/// `A^{-1} = U^{-1} L^{-1} P`.
struct LuInverse {
    p: PermutationMatrix,
    l_inv: Arc<dyn Matrix>,
    u: GeneralMatrix,
    dim: MatrixDim,
}

impl LuInverse {
    fn n(&self) -> usize {
        self.dim.rows()
    }

    /// Solves `U x = v` by back substitution (`U` upper, nonzero diagonal).
    fn solve_upper(&self, v: &Vector) -> Result<Vector> {
        let n = self.n();
        let mut x = vec![0.0; n];
        for i in (0..n).rev() {
            let mut acc = v.as_slice()[i];
            for j in (i + 1)..n {
                acc -= self.u.value_at(i, j)? * x[j];
            }
            let diag = self.u.value_at(i, i)?;
            x[i] = canonicalize(acc / diag);
        }
        Vector::from_slice(&x)
    }

    /// Solves `U^T x = v` by forward substitution.
    fn solve_upper_transpose(&self, v: &Vector) -> Result<Vector> {
        let n = self.n();
        let mut x = vec![0.0; n];
        for i in 0..n {
            let mut acc = v.as_slice()[i];
            for j in 0..i {
                acc -= self.u.value_at(j, i)? * x[j];
            }
            let diag = self.u.value_at(i, i)?;
            x[i] = canonicalize(acc / diag);
        }
        Vector::from_slice(&x)
    }
}

impl Matrix for LuInverse {
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

impl Clone for LuInverse {
    fn clone(&self) -> Self {
        LuInverse {
            p: self.p.clone(),
            l_inv: self.l_inv.clone(),
            u: self.u.clone(),
            dim: self.dim,
        }
    }
}
